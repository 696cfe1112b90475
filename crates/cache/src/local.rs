//! Local disk cache tier
//!
//! Entries live under a per-user cache root as
//! `<root>/<key>/{metadata.json, outputs.tar.zst}`. The root is resolved
//! once from a candidate chain (explicit override, XDG, OS cache dir, home,
//! tmp), probing each candidate for writability; some CI environments mount
//! read-only cache directories under `$HOME`.

use crate::artifact::{ArtifactMeta, CacheArtifact};
use crate::tier::CacheTier;
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use strider_core::{Error, Result};

const METADATA_FILE: &str = "metadata.json";
const PAYLOAD_FILE: &str = "outputs.tar.zst";

/// Explicit cache directory override.
const CACHE_DIR_VAR: &str = "STRIDER_CACHE_DIR";

/// Inputs for cache-root resolution, separated from the environment for
/// testability.
#[derive(Debug, Clone)]
pub struct CacheRootInputs {
    /// Explicit override (highest priority)
    pub override_dir: Option<PathBuf>,
    /// `$XDG_CACHE_HOME`
    pub xdg_cache_home: Option<PathBuf>,
    /// OS-reported cache directory
    pub os_cache_dir: Option<PathBuf>,
    /// Home directory (legacy location)
    pub home_dir: Option<PathBuf>,
    /// Always-available fallback
    pub temp_dir: PathBuf,
}

impl CacheRootInputs {
    /// Snapshot the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            override_dir: std::env::var(CACHE_DIR_VAR)
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            xdg_cache_home: std::env::var("XDG_CACHE_HOME")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            os_cache_dir: dirs::cache_dir(),
            home_dir: dirs::home_dir(),
            temp_dir: std::env::temp_dir(),
        }
    }
}

/// Resolve the first writable cache root from the candidate chain.
pub fn resolve_cache_root(inputs: CacheRootInputs) -> Result<PathBuf> {
    // Resolution order (first writable wins):
    // 1) explicit override
    // 2) $XDG_CACHE_HOME/strider/tasks
    // 3) OS cache dir/strider/tasks
    // 4) ~/.strider/cache/tasks (legacy)
    // 5) TMPDIR/strider/cache/tasks (fallback)
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Some(dir) = inputs.override_dir.filter(|p| !p.as_os_str().is_empty()) {
        candidates.push(dir);
    }
    if let Some(xdg) = inputs.xdg_cache_home {
        candidates.push(xdg.join("strider/tasks"));
    }
    if let Some(os_cache) = inputs.os_cache_dir {
        candidates.push(os_cache.join("strider/tasks"));
    }
    if let Some(home) = inputs.home_dir {
        candidates.push(home.join(".strider/cache/tasks"));
    }
    candidates.push(inputs.temp_dir.join("strider/cache/tasks"));

    for path in candidates {
        if path.exists() {
            let probe = path.join(".write_probe");
            match fs::OpenOptions::new()
                .create(true)
                .truncate(true)
                .write(true)
                .open(&probe)
            {
                Ok(_) => {
                    let _ = fs::remove_file(&probe);
                    return Ok(path);
                }
                Err(_) => {
                    // Not writable, try next candidate
                    continue;
                }
            }
        }
        if fs::create_dir_all(&path).is_ok() {
            return Ok(path);
        }
    }
    Err(Error::configuration(
        "Failed to determine a writable cache directory",
    ))
}

/// Disk-backed cache tier.
#[derive(Debug, Clone)]
pub struct LocalCacheTier {
    root: PathBuf,
}

impl LocalCacheTier {
    /// Tier rooted at an explicit directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Tier rooted at the default per-user cache directory.
    pub fn from_environment() -> Result<Self> {
        Ok(Self::new(resolve_cache_root(CacheRootInputs::from_env())?))
    }

    /// The resolved cache root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_dir(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl CacheTier for LocalCacheTier {
    async fn exists(&self, key: &str) -> Result<bool> {
        let dir = self.entry_dir(key);
        Ok(dir.join(METADATA_FILE).is_file() && dir.join(PAYLOAD_FILE).is_file())
    }

    async fn fetch(&self, key: &str) -> Result<Option<CacheArtifact>> {
        let dir = self.entry_dir(key);
        let meta_path = dir.join(METADATA_FILE);
        let payload_path = dir.join(PAYLOAD_FILE);
        if !meta_path.is_file() || !payload_path.is_file() {
            return Ok(None);
        }

        let meta_bytes = fs::read(&meta_path).map_err(|e| Error::io(e, &meta_path, "read"))?;
        let meta: ArtifactMeta = match serde_json::from_slice(&meta_bytes) {
            Ok(meta) => meta,
            Err(e) => {
                // A corrupt entry heals on the next store; treat as a miss
                tracing::warn!(key = %key, error = %e, "Discarding unreadable local cache entry");
                return Ok(None);
            }
        };
        let payload = fs::read(&payload_path).map_err(|e| Error::io(e, &payload_path, "read"))?;

        tracing::debug!(key = %key, size = payload.len(), "Local cache hit");
        Ok(Some(CacheArtifact { meta, payload }))
    }

    async fn store(&self, key: &str, artifact: &CacheArtifact) -> Result<()> {
        let dir = self.entry_dir(key);
        fs::create_dir_all(&dir).map_err(|e| Error::io(e, &dir, "create_dir_all"))?;

        let meta_path = dir.join(METADATA_FILE);
        let json = serde_json::to_vec_pretty(&artifact.meta)
            .map_err(|e| Error::serialization(format!("Failed to serialize metadata: {e}")))?;
        fs::write(&meta_path, json).map_err(|e| Error::io(e, &meta_path, "write"))?;

        let payload_path = dir.join(PAYLOAD_FILE);
        fs::write(&payload_path, &artifact.payload)
            .map_err(|e| Error::io(e, &payload_path, "write"))?;

        tracing::debug!(key = %key, size = artifact.payload.len(), "Stored local cache entry");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
