//! HTTP client for a REST-style JSON document store.
//!
//! Every document lives at `{base_url}/{path}{suffix}` (suffix defaults to
//! `.json`). `GET` returning the literal `null` means "no document".

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::RemoteStore;
use crate::error::{StoreError, StoreResult};

/// Connection settings for [`HttpRemoteStore`].
#[derive(Debug, Clone)]
pub struct HttpRemoteConfig {
    pub base_url: String,
    pub document_suffix: String,
    /// Per-request ceiling enforced by the HTTP client itself.
    pub request_timeout: Duration,
    /// Sent as the `auth` query parameter when present.
    pub auth_token: Option<String>,
}

impl HttpRemoteConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        HttpRemoteConfig {
            base_url: base_url.into(),
            document_suffix: ".json".to_string(),
            request_timeout: Duration::from_secs(5),
            auth_token: None,
        }
    }
}

/// Remote store over `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpRemoteStore {
    client: reqwest::Client,
    base_url: Url,
    suffix: String,
    auth_token: Option<String>,
}

impl HttpRemoteStore {
    pub fn new(config: HttpRemoteConfig) -> StoreResult<Self> {
        let base_url = Url::parse(&config.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::InvalidUrl(config.base_url));
        }

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| StoreError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(HttpRemoteStore {
            client,
            base_url,
            suffix: config.document_suffix,
            auth_token: config.auth_token,
        })
    }

    /// Full URL of the document at `path`.
    pub fn document_url(&self, path: &str) -> StoreResult<Url> {
        let mut segments: Vec<String> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        let Some(last) = segments.last_mut() else {
            return Err(StoreError::InvalidUrl(format!("empty document path: {path:?}")));
        };
        last.push_str(&self.suffix);

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(&segments);

        if let Some(token) = &self.auth_token {
            url.query_pairs_mut().append_pair("auth", token);
        }
        Ok(url)
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn fetch(&self, path: &str) -> StoreResult<Option<Value>> {
        let url = self.document_url(path)?;
        debug!(path = %path, "GET remote document");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            warn!(path = %path, status = status.as_u16(), "Remote fetch rejected");
            return Err(StoreError::RemoteStatus {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }

        let body: Value = response.json().await?;
        Ok(if body.is_null() { None } else { Some(body) })
    }

    async fn put(&self, path: &str, document: &Value) -> StoreResult<()> {
        let url = self.document_url(path)?;
        debug!(path = %path, "PUT remote document");

        let response = self.client.put(url).json(document).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(path = %path, status = status.as_u16(), "Remote write rejected");
            return Err(StoreError::RemoteStatus {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }
        Ok(())
    }
}
