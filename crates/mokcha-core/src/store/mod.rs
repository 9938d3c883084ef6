//! Content store interface
//!
//! Raw outline text and supplementary concept text come from an external
//! store with request/response semantics. Failures are signaled explicitly
//! here and absorbed by the loaders, which degrade to fallbacks instead of
//! propagating.

use async_trait::async_trait;
use thiserror::Error;

use crate::key::CompositeKey;

pub mod dir;
pub mod http;

pub use dir::DirStore;
pub use http::HttpStore;

/// Errors a content store can surface
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("http request failed")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {status} for `{locator}`")]
    Status { status: u16, locator: String },
    #[error("invalid locator `{0}`")]
    Locator(String),
    #[error("failed to read `{locator}`")]
    Io {
        locator: String,
        #[source]
        source: std::io::Error,
    },
}

/// Source of raw outline and concept text
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Fetch the raw outline text behind a chapter locator
    async fn fetch_outline(&self, locator: &str) -> Result<String, StoreError>;

    /// Fetch supplementary concept text for an item key.
    ///
    /// `Ok(None)` means the store knows the key has no content.
    async fn fetch_concept(&self, key: &CompositeKey) -> Result<Option<String>, StoreError>;
}

/// Relative locator for a key's concept text, shared by the store backends
pub(crate) fn concept_locator(key: &CompositeKey) -> String {
    format!(
        "concepts/{}_{}_{}.md",
        key.chapter(),
        key.section(),
        key.item()
    )
}
