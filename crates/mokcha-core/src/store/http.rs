//! HTTP-backed content store

use async_trait::async_trait;
use reqwest::header::CACHE_CONTROL;
use reqwest::{Client, StatusCode};
use url::Url;

use super::{concept_locator, ContentStore, StoreError};
use crate::key::CompositeKey;

/// Fetches chapter sources and concept text relative to a base URL
pub struct HttpStore {
    client: Client,
    base: Url,
}

impl HttpStore {
    pub fn new(base: Url) -> Self {
        Self {
            client: Client::new(),
            base,
        }
    }

    /// Use a preconfigured client (proxies, timeouts)
    pub fn with_client(client: Client, base: Url) -> Self {
        Self { client, base }
    }

    fn resolve(&self, locator: &str) -> Result<Url, StoreError> {
        self.base
            .join(locator)
            .map_err(|_| StoreError::Locator(locator.to_string()))
    }
}

#[async_trait]
impl ContentStore for HttpStore {
    async fn fetch_outline(&self, locator: &str) -> Result<String, StoreError> {
        let url = self.resolve(locator)?;
        // sources change between corpus releases; never serve a stale copy
        let response = self
            .client
            .get(url)
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(StoreError::Status {
                status: response.status().as_u16(),
                locator: locator.to_string(),
            });
        }
        Ok(response.text().await?)
    }

    async fn fetch_concept(&self, key: &CompositeKey) -> Result<Option<String>, StoreError> {
        let locator = concept_locator(key);
        let url = self.resolve(&locator)?;
        let response = self.client.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(StoreError::Status {
                status: response.status().as_u16(),
                locator,
            });
        }
        Ok(Some(response.text().await?))
    }
}
