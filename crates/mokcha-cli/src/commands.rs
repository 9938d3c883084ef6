//! Subcommand implementations

use std::path::Path;

use anyhow::Result;
use mokcha_core::text::strip_markup;
use mokcha_core::{
    Breakdown, Chapter, ChapterCatalog, CompositeKey, ConceptEntry, CorpusService, EntryKind,
};
use serde_json::json;

/// Build a catalog by scanning a directory for `*.md` chapter sources,
/// ordered by their leading chapter number
pub async fn scan_catalog(dir: &Path) -> Result<ChapterCatalog> {
    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(".md") {
            names.push(name);
        }
    }
    names.sort_by_key(|name| {
        let number = Chapter::from_file_name(name)
            .number
            .parse::<u64>()
            .unwrap_or(0);
        (number, name.clone())
    });
    Ok(ChapterCatalog::from_file_names(names))
}

/// `(N 문제) 21:1 23:0 ...` count chips, two-digit years like the study site
fn format_breakdown(breakdown: &Breakdown) -> String {
    let chips: Vec<String> = breakdown
        .per_year
        .iter()
        .map(|(year, count)| format!("{}:{}", year.get(2..).unwrap_or(year), count))
        .collect();
    if chips.is_empty() {
        format!("({} 문제)", breakdown.total)
    } else {
        format!("({} 문제) {}", breakdown.total, chips.join(" "))
    }
}

/// A user-supplied key: either a composite string or a label to derive from
fn parse_key(raw: &str) -> CompositeKey {
    if raw.contains('|') {
        let parts: Vec<&str> = raw.split('|').map(str::trim).collect();
        CompositeKey::from_parts(
            parts.first().copied().unwrap_or("0"),
            parts.get(1).copied().unwrap_or("0"),
            parts.get(2).copied().unwrap_or("0"),
        )
    } else {
        CompositeKey::from_label(raw)
    }
}

pub fn tree(service: &CorpusService, chapter: Option<&str>, json: bool) -> Result<()> {
    let aggregates = service.aggregates();

    if json {
        let chapters: Vec<_> = service
            .catalog()
            .iter()
            .filter(|c| chapter.is_none_or(|n| c.number == n))
            .map(|c| {
                json!({
                    "number": c.number,
                    "title": c.title,
                    "breakdown": aggregates.chapter(&c.number),
                    "outline": service.outline(&c.number),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&chapters)?);
        return Ok(());
    }

    println!("목차 {}", format_breakdown(aggregates.global()));
    for c in service.catalog().iter() {
        if chapter.is_some_and(|n| c.number != n) {
            continue;
        }
        let breakdown = aggregates.chapter(&c.number);
        println!(
            "제{} {}",
            c.title,
            breakdown.map(format_breakdown).unwrap_or_default()
        );

        let Some(outline) = service.outline(&c.number) else {
            continue;
        };
        for section in &outline.sections {
            let breakdown = aggregates.section(&c.number, &section.section_key);
            println!(
                "  {} {}",
                section.raw_title,
                breakdown.map(format_breakdown).unwrap_or_default()
            );
            for item in &section.items {
                let breakdown = aggregates.item(&item.key);
                println!(
                    "    - {} {}",
                    item.label,
                    breakdown.map(format_breakdown).unwrap_or_default()
                );
            }
        }
    }
    Ok(())
}

pub fn search(service: &CorpusService, query: &str, limit: usize, json: bool) -> Result<()> {
    let hits = service.search(query);

    if json {
        let out: Vec<_> = hits.iter().take(limit).collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if hits.is_empty() {
        println!("검색 결과가 없습니다: {query}");
        return Ok(());
    }

    for (rank, entry) in hits.iter().take(limit).enumerate() {
        let location = match entry.kind {
            EntryKind::Section => format!("{} > {}", entry.chapter_title, entry.section_title),
            EntryKind::Item => format!(
                "{} > {} > {}",
                entry.chapter_title,
                entry.section_title,
                entry.item_label.as_deref().unwrap_or("")
            ),
        };
        println!("{:>3}. {} ({} 문제)", rank + 1, location, entry.question_count);
    }
    if hits.len() > limit {
        println!("... 외 {}건", hits.len() - limit);
    }
    Ok(())
}

pub fn stats(service: &CorpusService, json: bool) -> Result<()> {
    let aggregates = service.aggregates();

    if json {
        let chapters: Vec<_> = service
            .catalog()
            .iter()
            .map(|c| {
                json!({
                    "number": c.number,
                    "title": c.title,
                    "breakdown": aggregates.chapter(&c.number),
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "global": aggregates.global(),
                "years": aggregates.years(),
                "chapters": chapters,
            }))?
        );
        return Ok(());
    }

    println!("전체 {}", format_breakdown(aggregates.global()));
    for c in service.catalog().iter() {
        if let Some(breakdown) = aggregates.chapter(&c.number) {
            println!("  {} {}", c.title, format_breakdown(breakdown));
        }
    }
    Ok(())
}

pub fn questions(service: &CorpusService, raw_key: &str) {
    let key = parse_key(raw_key);
    let questions = service.bank().questions_for(&key);

    if questions.is_empty() {
        println!("{key} 항목에 연결된 문제가 없습니다.");
        return;
    }

    for question in questions {
        let year = question.year();
        let number = question.id.split('-').nth(1).unwrap_or("?");
        let label = if question.item_key.is_empty() {
            key.as_str()
        } else {
            &question.item_key
        };
        println!("{year}년 {number}번 ({label})");
        let body = strip_markup(&question.question_text);
        if !body.is_empty() {
            println!("  {body}");
        }
        let options = strip_markup(&question.options_html);
        if !options.is_empty() {
            println!("  {options}");
        }
        println!();
    }
}

pub async fn concept(service: &CorpusService, raw_key: &str) {
    let key = parse_key(raw_key);
    match service.load_concept(&key).await {
        ConceptEntry::Ready(text) => println!("{text}"),
        ConceptEntry::Empty => println!("{key}: 개념 문서가 비어 있습니다."),
        ConceptEntry::Missing => println!("{key}: 개념 문서가 없습니다."),
    }
}
