//! Cache tier capability
//!
//! Every storage backend (the local disk tier, the remote blob store, and
//! the fallback façade composing them) implements [`CacheTier`]. Keys are
//! content-addressed salts: an entry stored for key K is valid for any
//! future fetch of K, and storing the same key twice is a no-op in effect.

use crate::artifact::CacheArtifact;
use async_trait::async_trait;
use strider_core::Result;

/// One cache storage backend, keyed by opaque content-addressed strings.
#[async_trait]
pub trait CacheTier: Send + Sync {
    /// Whether an entry exists for `key`.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Fetch the artifact stored for `key`. `Ok(None)` is a normal miss,
    /// not an error.
    async fn fetch(&self, key: &str) -> Result<Option<CacheArtifact>>;

    /// Store `artifact` under `key`. Idempotent: re-storing an identical
    /// key overwrites with equivalent content.
    async fn store(&self, key: &str, artifact: &CacheArtifact) -> Result<()>;

    /// Tier name for logging ("local", "remote", ...).
    fn name(&self) -> &'static str;
}
