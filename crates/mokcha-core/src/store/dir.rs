//! Directory-backed content store
//!
//! Serves chapter sources from a local directory, with concept text under a
//! `concepts/` subdirectory named `<chapter>_<section>_<item>.md`.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use super::{concept_locator, ContentStore, StoreError};
use crate::key::CompositeKey;

pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ContentStore for DirStore {
    async fn fetch_outline(&self, locator: &str) -> Result<String, StoreError> {
        let path = self.root.join(locator);
        fs::read_to_string(&path)
            .await
            .map_err(|source| StoreError::Io {
                locator: locator.to_string(),
                source,
            })
    }

    async fn fetch_concept(&self, key: &CompositeKey) -> Result<Option<String>, StoreError> {
        let locator = concept_locator(key);
        let path = self.root.join(&locator);
        match fs::read_to_string(&path).await {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { locator, source }),
        }
    }
}
