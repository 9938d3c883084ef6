//! Mokcha CLI
//!
//! Plain-text front-end over the corpus index: outline tree, search,
//! statistics, and question listing.

mod commands;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mokcha_core::{ChapterCatalog, ContentStore, CorpusService, DirStore, HttpStore, QuestionBank};
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Parser)]
#[command(
    name = "mokcha",
    version,
    about = "Browse and search an exam-question study outline"
)]
struct Cli {
    /// Directory holding chapter sources (and a concepts/ subdirectory)
    #[arg(long, default_value = "chapter")]
    content_dir: PathBuf,

    /// Base URL serving chapter sources; overrides --content-dir
    #[arg(long)]
    content_url: Option<Url>,

    /// Question bank JSON file
    #[arg(long, default_value = "question_bank.json")]
    bank: PathBuf,

    /// Chapter catalog TOML; defaults to scanning --content-dir for *.md
    #[arg(long)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the outline tree with per-node question counts
    Tree {
        /// Restrict to a single chapter number
        #[arg(long)]
        chapter: Option<String>,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Search the corpus and print ranked matches
    Search {
        query: String,
        /// Maximum results to print
        #[arg(long, default_value_t = 20)]
        limit: usize,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Corpus statistics: per-year totals, globally and by chapter
    Stats {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print the questions filed under a composite key or item label
    Questions {
        /// `"<chapter> | <section> | <item>"`, or a label to derive it from
        key: String,
    },
    /// Fetch supplementary concept text for an item
    Concept {
        /// `"<chapter> | <section> | <item>"`, or a label to derive it from
        key: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let bank = QuestionBank::load_from_path(&cli.bank)
        .await
        .with_context(|| format!("loading question bank from {}", cli.bank.display()))?;

    let catalog = match &cli.catalog {
        Some(path) => ChapterCatalog::load_from_path(path)
            .await
            .with_context(|| format!("loading catalog from {}", path.display()))?,
        None => commands::scan_catalog(&cli.content_dir).await.with_context(|| {
            format!(
                "scanning {} for chapter sources",
                cli.content_dir.display()
            )
        })?,
    };

    let store: Arc<dyn ContentStore> = match cli.content_url {
        Some(base) => {
            tracing::debug!(%base, "using http content store");
            Arc::new(HttpStore::new(base))
        }
        None => Arc::new(DirStore::new(&cli.content_dir)),
    };

    let service = CorpusService::build(catalog, bank, store).await;

    match cli.command {
        Command::Tree { chapter, json } => commands::tree(&service, chapter.as_deref(), json),
        Command::Search { query, limit, json } => commands::search(&service, &query, limit, json),
        Command::Stats { json } => commands::stats(&service, json),
        Command::Questions { key } => {
            commands::questions(&service, &key);
            Ok(())
        }
        Command::Concept { key } => {
            commands::concept(&service, &key).await;
            Ok(())
        }
    }
}
