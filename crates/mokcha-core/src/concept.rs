//! Memoized concept text loading
//!
//! Supplementary free-text content is fetched lazily per composite key with
//! the same request-coalescing discipline as the chapter loader. Negative
//! results are cached too, so known-absent content is fetched at most once.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::key::CompositeKey;
use crate::store::ContentStore;

/// Outcome of a concept lookup, immutable once resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConceptEntry {
    /// Content exists and was fetched
    Ready(String),
    /// Content exists but is blank
    Empty,
    /// The store has nothing for this key, or the fetch failed
    Missing,
}

/// Memoized, request-coalescing concept loader
pub struct ConceptCache {
    store: Arc<dyn ContentStore>,
    cells: DashMap<CompositeKey, Arc<OnceCell<ConceptEntry>>>,
}

impl ConceptCache {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self {
            store,
            cells: DashMap::new(),
        }
    }

    /// Load concept text for a key, coalescing concurrent requests.
    ///
    /// Never fails: store errors resolve to `Missing` and are cached like
    /// any other result.
    pub async fn load(&self, key: &CompositeKey) -> ConceptEntry {
        let cell = self
            .cells
            .entry(key.clone())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();
        cell.get_or_init(|| self.fetch(key)).await.clone()
    }

    async fn fetch(&self, key: &CompositeKey) -> ConceptEntry {
        match self.store.fetch_concept(key).await {
            Ok(Some(text)) if !text.trim().is_empty() => ConceptEntry::Ready(text),
            Ok(Some(_)) => ConceptEntry::Empty,
            Ok(None) => {
                debug!(%key, "no concept text");
                ConceptEntry::Missing
            }
            Err(err) => {
                warn!(%key, error = %err, "concept fetch failed");
                ConceptEntry::Missing
            }
        }
    }
}
