//! Corpus service
//!
//! Owns the loaders, caches, and built indexes behind one documented
//! lifecycle: everything is built when the corpus loads and rebuilt
//! wholesale on reload. No ambient module state.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::aggregate::AggregationIndex;
use crate::bank::QuestionBank;
use crate::catalog::ChapterCatalog;
use crate::concept::{ConceptCache, ConceptEntry};
use crate::key::CompositeKey;
use crate::outline::{ChapterLoader, ChapterOutline};
use crate::search::{SearchEntry, SearchIndex};
use crate::store::ContentStore;

/// The assembled index and query surface over one corpus load
pub struct CorpusService {
    catalog: ChapterCatalog,
    bank: Arc<QuestionBank>,
    store: Arc<dyn ContentStore>,
    loader: ChapterLoader,
    concepts: ConceptCache,
    outlines: HashMap<String, Arc<ChapterOutline>>,
    aggregates: AggregationIndex,
    // RwLock only for the documented concept-text append; queries take
    // the read side
    search: RwLock<SearchIndex>,
}

impl CorpusService {
    /// Preload every chapter (fan-out, joined as a set) and build both
    /// indexes over the result. Infallible: unavailable sources degrade
    /// to synthesized outlines inside the loader.
    pub async fn build(
        catalog: ChapterCatalog,
        bank: QuestionBank,
        store: Arc<dyn ContentStore>,
    ) -> Self {
        let bank = Arc::new(bank);
        let loader = ChapterLoader::new(store.clone(), bank.clone());
        let outlines = loader.preload_all(&catalog).await;
        let aggregates = AggregationIndex::build(&catalog, &outlines, &bank);
        let search = SearchIndex::build(&catalog, &outlines, &bank);
        let concepts = ConceptCache::new(store.clone());
        info!(
            chapters = catalog.len(),
            questions = bank.question_count(),
            entries = search.len(),
            "corpus indexes built"
        );

        Self {
            catalog,
            bank,
            store,
            loader,
            concepts,
            outlines,
            aggregates,
            search: RwLock::new(search),
        }
    }

    /// Replace the question corpus and rebuild all derived state wholesale
    pub async fn reload(&mut self, bank: QuestionBank) {
        *self = Self::build(self.catalog.clone(), bank, self.store.clone()).await;
    }

    pub fn catalog(&self) -> &ChapterCatalog {
        &self.catalog
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    /// Outline of a chapter preloaded at build time
    pub fn outline(&self, number: &str) -> Option<&Arc<ChapterOutline>> {
        self.outlines.get(number)
    }

    /// Resolve a chapter through the memoized loader; a cache hit after
    /// build, but also covers chapters added to the catalog lazily
    pub async fn chapter_outline(&self, number: &str) -> Option<Arc<ChapterOutline>> {
        let chapter = self.catalog.get(number)?;
        Some(self.loader.load(chapter).await)
    }

    pub fn aggregates(&self) -> &AggregationIndex {
        &self.aggregates
    }

    /// Ranked substring search over the whole corpus
    pub fn search(&self, query: &str) -> Vec<SearchEntry> {
        self.search.read().query(query).into_iter().cloned().collect()
    }

    /// Load supplementary concept text for an item.
    ///
    /// A `Ready` result is folded into the search index; the fold is
    /// idempotent so repeated loads are harmless.
    pub async fn load_concept(&self, key: &CompositeKey) -> ConceptEntry {
        let entry = self.concepts.load(key).await;
        if let ConceptEntry::Ready(text) = &entry {
            self.search.write().append_concept_text(key, text);
        }
        entry
    }
}
