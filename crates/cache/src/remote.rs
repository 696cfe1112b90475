//! Remote blob-store cache tier
//!
//! The remote cache is an opaque key/blob store reached over HTTP: `HEAD`,
//! `GET`, and `PUT` against `{endpoint}/v1/artifacts/{key}` with optional
//! bearer authentication. Every transport failure maps to
//! [`Error::RemoteUnavailable`]; the fallback provider decides whether that
//! matters (it never fails a task).

use crate::artifact::CacheArtifact;
use crate::tier::CacheTier;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use strider_core::{Error, Result};

/// Configuration for the remote blob store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteStorageConfig {
    /// Blob store endpoint, e.g. `https://cache.example.com`
    pub endpoint: String,

    /// Bearer token sent with every request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl RemoteStorageConfig {
    /// Config for an endpoint with defaults for everything else.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            auth_token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

/// HTTP client for the remote tier.
pub struct HttpCacheTier {
    client: reqwest::Client,
    config: RemoteStorageConfig,
}

impl HttpCacheTier {
    /// Build the tier, validating configuration up front.
    ///
    /// Configuration problems (empty endpoint, malformed client options) are
    /// fatal at construction; reachability problems are not checked here.
    pub fn new(config: RemoteStorageConfig) -> Result<Self> {
        let endpoint = config.endpoint.trim();
        if endpoint.is_empty() {
            return Err(Error::configuration("Remote cache endpoint is empty"));
        }
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(Error::configuration(format!(
                "Remote cache endpoint must be an http(s) URL, got '{endpoint}'"
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    fn artifact_url(&self, key: &str) -> String {
        format!(
            "{}/v1/artifacts/{key}",
            self.config.endpoint.trim_end_matches('/')
        )
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl CacheTier for HttpCacheTier {
    async fn exists(&self, key: &str) -> Result<bool> {
        let response = self
            .authorize(self.client.head(self.artifact_url(key)))
            .send()
            .await
            .map_err(|e| Error::remote_unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            status => Err(Error::remote_unavailable(format!(
                "Unexpected status {status} probing key {key}"
            ))),
        }
    }

    async fn fetch(&self, key: &str) -> Result<Option<CacheArtifact>> {
        let response = self
            .authorize(self.client.get(self.artifact_url(key)))
            .send()
            .await
            .map_err(|e| Error::remote_unavailable(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Error::remote_unavailable(format!(
                "Unexpected status {} fetching key {key}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::remote_unavailable(e.to_string()))?;
        let artifact = CacheArtifact::from_wire_bytes(&bytes)?;
        tracing::debug!(key = %key, size = bytes.len(), "Remote cache hit");
        Ok(Some(artifact))
    }

    async fn store(&self, key: &str, artifact: &CacheArtifact) -> Result<()> {
        let body = artifact.to_wire_bytes()?;
        let size = body.len();
        let response = self
            .authorize(self.client.put(self.artifact_url(key)).body(body))
            .send()
            .await
            .map_err(|e| Error::remote_unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::remote_unavailable(format!(
                "Unexpected status {} storing key {key}",
                response.status()
            )));
        }
        tracing::debug!(key = %key, size, "Stored remote cache entry");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}
