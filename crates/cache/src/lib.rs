//! Tiered task artifact caching for strider
//!
//! This crate composes the cache tiers a task runner fetches from and stores
//! to, keyed by the deterministic salts computed in `strider-hasher`:
//!
//! - [`CacheTier`]: the capability every tier implements (exists / fetch /
//!   store by opaque key)
//! - [`LocalCacheTier`]: on-disk entries under the user cache directory
//! - [`HttpCacheTier`]: an opaque HTTP key/blob store
//! - [`RemoteFallbackCacheProvider`]: the policy façade, local first with
//!   remote fallback, backfill, and conditional remote writes
//! - [`create_cache`]: builds the provider pair from configuration and
//!   environment signals, once per process invocation
//!
//! The cache is a performance optimization, not an execution dependency:
//! a miss is a normal outcome and remote failures never fail a task.

pub mod artifact;
pub mod factory;
pub mod fallback;
pub mod local;
pub mod remote;
pub mod tier;

pub use artifact::{ArtifactMeta, CacheArtifact};
pub use factory::{CacheOptions, CacheProviderOptions, TaskCache, create_cache};
pub use fallback::RemoteFallbackCacheProvider;
pub use local::LocalCacheTier;
pub use remote::{HttpCacheTier, RemoteStorageConfig};
pub use tier::CacheTier;
