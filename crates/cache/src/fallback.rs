//! Remote fallback cache provider
//!
//! Composes an optional local tier and an optional remote tier behind one
//! [`CacheTier`]-shaped façade:
//!
//! - fetch: local first; on a miss, remote; a remote hit is backfilled into
//!   the local tier so the next fetch is served locally
//! - store: always local when present; remote only when the write policy
//!   (resolved once at construction) allows it
//! - remote failures never propagate: fetches degrade to a miss and stores
//!   degrade to local-only, with a warning
//!
//! Entries are content-addressed and immutable once written, so no cross-key
//! locking is needed; duplicate concurrent writes are wasted work, not a
//! correctness problem.

use crate::artifact::CacheArtifact;
use crate::tier::CacheTier;
use async_trait::async_trait;
use std::sync::Arc;
use strider_core::Result;

/// Policy façade over the local and remote cache tiers.
pub struct RemoteFallbackCacheProvider {
    local: Option<Arc<dyn CacheTier>>,
    remote: Option<Arc<dyn CacheTier>>,
    write_remote: bool,
}

impl RemoteFallbackCacheProvider {
    /// Compose the tiers. `write_remote` is the pre-computed write policy:
    /// explicit configuration, environment override, or CI detection.
    #[must_use]
    pub fn new(
        local: Option<Arc<dyn CacheTier>>,
        remote: Option<Arc<dyn CacheTier>>,
        write_remote: bool,
    ) -> Self {
        Self {
            local,
            remote,
            write_remote,
        }
    }

    /// Whether a local tier is configured.
    #[must_use]
    pub fn has_local(&self) -> bool {
        self.local.is_some()
    }

    /// Whether a remote tier is configured.
    #[must_use]
    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Whether stores are written through to the remote tier.
    #[must_use]
    pub fn writes_remote(&self) -> bool {
        self.write_remote && self.remote.is_some()
    }
}

#[async_trait]
impl CacheTier for RemoteFallbackCacheProvider {
    async fn exists(&self, key: &str) -> Result<bool> {
        if let Some(local) = &self.local {
            if local.exists(key).await.unwrap_or(false) {
                return Ok(true);
            }
        }
        if let Some(remote) = &self.remote {
            match remote.exists(key).await {
                Ok(found) => return Ok(found),
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Remote existence check failed, treating as miss");
                }
            }
        }
        Ok(false)
    }

    async fn fetch(&self, key: &str) -> Result<Option<CacheArtifact>> {
        if let Some(local) = &self.local {
            match local.fetch(key).await {
                Ok(Some(artifact)) => return Ok(Some(artifact)),
                Ok(None) => {}
                Err(e) => {
                    // Fall through to the remote tier; a broken local read
                    // should not hide a remote hit
                    tracing::warn!(key = %key, error = %e, "Local cache fetch failed");
                }
            }
        }

        if let Some(remote) = &self.remote {
            match remote.fetch(key).await {
                Ok(Some(artifact)) => {
                    if let Some(local) = &self.local {
                        if let Err(e) = local.store(key, &artifact).await {
                            tracing::warn!(key = %key, error = %e, "Failed to backfill local cache");
                        }
                    }
                    return Ok(Some(artifact));
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Remote cache fetch degraded to miss");
                }
            }
        }

        Ok(None)
    }

    async fn store(&self, key: &str, artifact: &CacheArtifact) -> Result<()> {
        // Local failures surface: the local tier is assumed reliable and a
        // broken local cache is worth reporting. The caller still treats
        // caching as best-effort with respect to the task result.
        if let Some(local) = &self.local {
            local.store(key, artifact).await?;
        }

        if self.write_remote {
            if let Some(remote) = &self.remote {
                if let Err(e) = remote.store(key, artifact).await {
                    tracing::warn!(key = %key, error = %e, "Remote cache store failed");
                }
            }
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "fallback"
    }
}
