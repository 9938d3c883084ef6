//! Chapter outline resolution
//!
//! Resolves a chapter to its parsed outline, preferring authored source
//! text and falling back to synthesis from the question bank. The first
//! load per chapter issues exactly one store request; callers arriving
//! while it is in flight share the same pending load, and later callers
//! hit the cache for the lifetime of the loader.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::bank::QuestionBank;
use crate::catalog::{Chapter, ChapterCatalog};
use crate::store::ContentStore;

use super::{parser, synth, Section};

/// How an outline came to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlineOrigin {
    /// Parsed from authored source text
    Parsed,
    /// Reconstructed from repository keys
    Synthesized,
}

/// A chapter's resolved outline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterOutline {
    pub sections: Vec<Section>,
    pub origin: OutlineOrigin,
}

/// Memoized, request-coalescing outline loader
pub struct ChapterLoader {
    store: Arc<dyn ContentStore>,
    bank: Arc<QuestionBank>,
    cells: DashMap<String, Arc<OnceCell<Arc<ChapterOutline>>>>,
}

impl ChapterLoader {
    pub fn new(store: Arc<dyn ContentStore>, bank: Arc<QuestionBank>) -> Self {
        Self {
            store,
            bank,
            cells: DashMap::new(),
        }
    }

    /// Resolve a chapter's outline, memoized per chapter number.
    ///
    /// The cell is registered in the map before any await, so concurrent
    /// callers attach to the in-flight resolution instead of issuing a
    /// duplicate request. Never fails: fetch problems degrade to a
    /// synthesized outline.
    pub async fn load(&self, chapter: &Chapter) -> Arc<ChapterOutline> {
        let cell = self
            .cells
            .entry(chapter.number.clone())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();
        cell.get_or_init(|| self.resolve(chapter)).await.clone()
    }

    /// Fan out loads for every cataloged chapter and join on the whole set
    pub async fn preload_all(&self, catalog: &ChapterCatalog) -> HashMap<String, Arc<ChapterOutline>> {
        let loads = catalog.iter().map(|chapter| async move {
            (chapter.number.clone(), self.load(chapter).await)
        });
        futures::future::join_all(loads).await.into_iter().collect()
    }

    async fn resolve(&self, chapter: &Chapter) -> Arc<ChapterOutline> {
        let Some(locator) = chapter.source.as_deref() else {
            debug!(chapter = %chapter.number, "no source locator, synthesizing outline");
            return Arc::new(self.synthesize(chapter));
        };

        match self.store.fetch_outline(locator).await {
            Ok(raw) => Arc::new(ChapterOutline {
                sections: parser::parse(&chapter.number, &raw),
                origin: OutlineOrigin::Parsed,
            }),
            Err(err) => {
                warn!(chapter = %chapter.number, error = %err, "outline fetch failed, synthesizing");
                Arc::new(self.synthesize(chapter))
            }
        }
    }

    fn synthesize(&self, chapter: &Chapter) -> ChapterOutline {
        ChapterOutline {
            sections: synth::synthesize(&chapter.number, &self.bank),
            origin: OutlineOrigin::Synthesized,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::key::CompositeKey;
    use crate::store::StoreError;

    struct CountingStore {
        outline: Option<String>,
        calls: AtomicUsize,
    }

    impl CountingStore {
        fn serving(text: &str) -> Self {
            Self {
                outline: Some(text.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                outline: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ContentStore for CountingStore {
        async fn fetch_outline(&self, locator: &str) -> Result<String, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            // force a suspension so concurrent callers really overlap
            tokio::task::yield_now().await;
            match &self.outline {
                Some(text) => Ok(text.clone()),
                None => Err(StoreError::Status {
                    status: 500,
                    locator: locator.to_string(),
                }),
            }
        }

        async fn fetch_concept(&self, _key: &CompositeKey) -> Result<Option<String>, StoreError> {
            Ok(None)
        }
    }

    fn chapter(number: &str, source: Option<&str>) -> Chapter {
        Chapter {
            number: number.to_string(),
            title: format!("{number}장"),
            source: source.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_concurrent_loads_share_one_fetch() {
        let store = Arc::new(CountingStore::serving("# 1절 서론\n- 1. 개요"));
        let loader = ChapterLoader::new(store.clone(), Arc::new(QuestionBank::default()));
        let chapter = chapter("1", Some("1장 서론.md"));

        let (a, b) = tokio::join!(loader.load(&chapter), loader.load(&chapter));

        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.origin, OutlineOrigin::Parsed);
    }

    #[tokio::test]
    async fn test_second_load_hits_cache() {
        let store = Arc::new(CountingStore::serving("# 1절 서론\n- 1. 개요"));
        let loader = ChapterLoader::new(store.clone(), Arc::new(QuestionBank::default()));
        let chapter = chapter("1", Some("1장 서론.md"));

        let first = loader.load(&chapter).await;
        let second = loader.load(&chapter).await;

        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_fetch_failure_degrades_to_synthesized() {
        let bank = QuestionBank::from_json_str(r#"{"7 | 1 | 1": [], "7 | 2 | 1": []}"#).unwrap();
        let store = Arc::new(CountingStore::failing());
        let loader = ChapterLoader::new(store.clone(), Arc::new(bank));

        let outline = loader.load(&chapter("7", Some("7장.md"))).await;

        assert_eq!(outline.origin, OutlineOrigin::Synthesized);
        assert_eq!(outline.sections.len(), 2);
        // the failed resolution is cached too: no retry storm
        loader.load(&chapter("7", Some("7장.md"))).await;
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_locator_synthesizes_without_touching_store() {
        let bank = QuestionBank::from_json_str(r#"{"7 | 1 | 1": [], "7 | 2 | 1": []}"#).unwrap();
        let store = Arc::new(CountingStore::serving("unused"));
        let loader = ChapterLoader::new(store.clone(), Arc::new(bank));

        let outline = loader.load(&chapter("7", None)).await;

        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
        assert_eq!(outline.origin, OutlineOrigin::Synthesized);
        let keys: Vec<_> = outline.sections.iter().map(|s| s.section_key.as_str()).collect();
        assert_eq!(keys, ["1", "2"]);
    }

    #[tokio::test]
    async fn test_preload_all_loads_every_chapter() {
        let store = Arc::new(CountingStore::serving("# 1절 서론\n- 1. 개요"));
        let loader = ChapterLoader::new(store.clone(), Arc::new(QuestionBank::default()));
        let catalog = ChapterCatalog::new(vec![
            chapter("1", Some("1장.md")),
            chapter("2", Some("2장.md")),
            chapter("3", None),
        ]);

        let outlines = loader.preload_all(&catalog).await;

        assert_eq!(outlines.len(), 3);
        assert_eq!(store.calls.load(Ordering::SeqCst), 2);
        assert_eq!(outlines["3"].origin, OutlineOrigin::Synthesized);
    }
}
