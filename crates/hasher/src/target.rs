//! Per-target cache-key computation
//!
//! [`TargetHasher`] is the scheduler-facing façade over the salting layer:
//! it carries the per-run configuration (repo root, environment glob list,
//! optional explicit cache-key override, cache-relevant CLI arguments) and
//! turns one [`Target`] into its salt.

use crate::env_hash::EnvHashCache;
use crate::salt;
use std::path::PathBuf;
use std::sync::Arc;
use strider_core::Result;

/// The task identity the scheduler hands in: a command executed in a package
/// directory. Callers that need per-task cache entries combine the salt with
/// the target name themselves; the salt covers command + environment only.
#[derive(Debug, Clone)]
pub struct Target {
    /// Unique task name, e.g. `"web#build"`
    pub name: String,
    /// Package directory the command runs in, relative to the repo root
    pub package_dir: PathBuf,
    /// Command string executed for this target
    pub command: String,
}

/// Configuration for a [`TargetHasher`]. Immutable for the run.
#[derive(Debug, Clone, Default)]
pub struct TargetHasherOptions {
    /// Repository root all glob patterns are resolved against
    pub root: PathBuf,
    /// Environment glob files whose contents affect every cache key
    pub environment_glob: Vec<String>,
    /// Explicit cache-key override; when set, glob-based salting is bypassed
    pub cache_key: Option<String>,
    /// CLI arguments declared to affect caching for the whole run
    pub cli_args: Vec<String>,
}

/// Computes the cache key for one target. Stateless beyond its immutable
/// configuration and the shared [`EnvHashCache`].
#[derive(Debug)]
pub struct TargetHasher {
    options: TargetHasherOptions,
    env_cache: Arc<EnvHashCache>,
}

impl TargetHasher {
    /// Create a hasher sharing the process-scoped environment hash cache.
    #[must_use]
    pub fn new(options: TargetHasherOptions, env_cache: Arc<EnvHashCache>) -> Self {
        Self { options, env_cache }
    }

    /// The shared environment hash cache (for test teardown).
    #[must_use]
    pub fn env_cache(&self) -> &Arc<EnvHashCache> {
        &self.env_cache
    }

    /// Compute the salt for `target`.
    ///
    /// With an explicit cache-key override the key derives from the override,
    /// the command, and the CLI args alone: no filesystem scan happens.
    /// Otherwise the environment glob digests are folded in and the CLI args
    /// become the custom-key component.
    pub async fn hash(&self, target: &Target) -> Result<String> {
        if let Some(key) = &self.options.cache_key {
            return Ok(salt::hash_strings(
                [key.as_str(), target.command.as_str()]
                    .into_iter()
                    .chain(self.options.cli_args.iter().map(String::as_str)),
            ));
        }

        let custom_key = salt::hash_strings(self.options.cli_args.iter().map(String::as_str));
        salt::salt(
            &self.env_cache,
            &self.options.environment_glob,
            &target.command,
            &self.options.root,
            &custom_key,
        )
        .await
    }
}
