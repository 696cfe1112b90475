//! Cache construction
//!
//! [`create_cache`] is called once per process invocation: it decides which
//! tiers exist, computes the remote write policy from its three signals, and
//! returns the provider together with a configured [`TargetHasher`] sharing
//! one process-scoped [`EnvHashCache`].

use crate::fallback::RemoteFallbackCacheProvider;
use crate::local::LocalCacheTier;
use crate::remote::{HttpCacheTier, RemoteStorageConfig};
use crate::tier::CacheTier;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use strider_core::{EnvSignals, Error, Result};
use strider_hasher::{EnvHashCache, TargetHasher, TargetHasherOptions};

/// Per-run cache configuration, typically loaded from the runner's config
/// file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CacheOptions {
    /// Glob patterns for environment-sensitive files (lockfiles, tool
    /// configs) folded into every cache key
    pub environment_glob: Vec<String>,

    /// Explicit cache-key override; bypasses glob-based salting when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_key: Option<String>,

    /// Explicit opt-in for writing to the remote cache
    pub write_remote_cache: bool,

    /// Local cache folder relative to the repo root; defaults to the
    /// per-user cache directory when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_cache_folder: Option<PathBuf>,

    /// Remote blob store configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteStorageConfig>,
}

/// Everything `create_cache` needs, gathered by the caller at startup.
#[derive(Debug, Clone)]
pub struct CacheProviderOptions {
    /// Repository root
    pub root: PathBuf,
    /// Cache configuration from the runner's config file
    pub cache_options: CacheOptions,
    /// Skip the local tier entirely (requires a remote tier)
    pub skip_local_cache: bool,
    /// CLI arguments declared to affect caching
    pub cli_args: Vec<String>,
    /// Environment signals resolved once at startup
    pub signals: EnvSignals,
}

/// The two objects the scheduler talks to, plus the shared env-hash cache
/// for test teardown.
pub struct TaskCache {
    /// Tiered cache provider
    pub provider: RemoteFallbackCacheProvider,
    /// Per-target cache-key computation
    pub hasher: TargetHasher,
    /// Process-scoped environment hash memo
    pub env_cache: Arc<EnvHashCache>,
}

/// Build the cache provider and target hasher for this invocation.
///
/// Remote is only instantiated when remote storage configuration is present
/// (explicit config or environment-derived). The remote write policy is the
/// OR of three signals: the explicit config flag, the environment override,
/// and CI detection.
pub fn create_cache(options: CacheProviderOptions) -> Result<TaskCache> {
    let CacheProviderOptions {
        root,
        cache_options,
        skip_local_cache,
        cli_args,
        signals,
    } = options;

    let remote_config = cache_options.remote.clone().or_else(|| {
        signals.remote_endpoint.as_ref().map(|endpoint| {
            let mut config = RemoteStorageConfig::new(endpoint.clone());
            config.auth_token = signals.remote_auth_token.clone();
            config
        })
    });

    if skip_local_cache && remote_config.is_none() {
        return Err(Error::configuration(
            "skip_local_cache is set but no remote cache is configured; there would be no cache at all",
        ));
    }

    let local: Option<Arc<dyn CacheTier>> = if skip_local_cache {
        None
    } else {
        let tier = match &cache_options.internal_cache_folder {
            Some(folder) => LocalCacheTier::new(root.join(folder)),
            None => LocalCacheTier::from_environment()?,
        };
        tracing::debug!(root = %tier.root().display(), "Local cache tier ready");
        Some(Arc::new(tier))
    };

    // Configuration errors here are fatal at startup, before any task runs
    let remote: Option<Arc<dyn CacheTier>> = match remote_config {
        Some(config) => Some(Arc::new(HttpCacheTier::new(config)?)),
        None => None,
    };

    let write_remote = cache_options.write_remote_cache
        || signals.write_remote_override
        || signals.running_in_ci;

    if write_remote
        && remote.is_none()
        && (cache_options.write_remote_cache || signals.write_remote_override)
    {
        // Writes were asked for explicitly but there is nowhere to write
        tracing::warn!("Remote cache writes enabled but no remote cache is configured");
    }

    let env_cache = Arc::new(EnvHashCache::new());
    let hasher = TargetHasher::new(
        TargetHasherOptions {
            root,
            environment_glob: cache_options.environment_glob,
            cache_key: cache_options.cache_key,
            cli_args,
        },
        Arc::clone(&env_cache),
    );

    Ok(TaskCache {
        provider: RemoteFallbackCacheProvider::new(local, remote, write_remote),
        hasher,
        env_cache,
    })
}
