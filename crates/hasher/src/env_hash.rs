//! Memoized environment-file hashing
//!
//! [`EnvHashCache`] maps a canonical set of glob patterns to the list of
//! content digests of the files they match. The underlying scan is
//! comparatively expensive and a single run uses only a handful of distinct
//! pattern sets, so all scans are serialized through one async mutex: at most
//! one filesystem scan is in flight per process, and every caller re-checks
//! the memo table under the lock immediately before its turn to compute.
//!
//! Entries are never evicted or invalidated. A process that wants to observe
//! filesystem changes restarts; [`EnvHashCache::reset`] exists for test
//! isolation only.

use crate::inputs;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use strider_core::Result;
use tokio::sync::Mutex;

/// Separator for the memo key. NUL can never appear inside a glob pattern.
const KEY_SEPARATOR: &str = "\0";

/// Process-scoped memo table for environment digest lists.
///
/// Construct one per process (typically inside the cache factory) and share
/// it via `Arc`; do not create one per task.
#[derive(Debug, Default)]
pub struct EnvHashCache {
    // The mutex is both the memo guard and the scan serialization queue:
    // lock acquisition order is the FIFO computation order.
    memo: Mutex<HashMap<String, Arc<Vec<String>>>>,
}

impl EnvHashCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Content digests for the files matched by `patterns` under `root`.
    ///
    /// Pattern order does not matter: permutations of one set share a memo
    /// entry. An empty pattern set resolves to an empty list without touching
    /// the filesystem. A failed scan is not memoized, so a later call for the
    /// same key retries.
    pub async fn get(&self, patterns: &[String], root: &Path) -> Result<Arc<Vec<String>>> {
        let key = memo_key(patterns);

        let mut memo = self.memo.lock().await;
        if let Some(hit) = memo.get(&key) {
            return Ok(Arc::clone(hit));
        }

        let digests = if patterns.is_empty() {
            Vec::new()
        } else {
            tracing::debug!(pattern_count = patterns.len(), root = %root.display(), "Scanning environment files");
            let files = inputs::resolve_globs(patterns, root)?;
            // BTreeMap ordering keeps the digest list ordered by path
            inputs::hash_files(&files, root)?.into_values().collect()
        };

        let published = Arc::new(digests);
        memo.insert(key, Arc::clone(&published));
        Ok(published)
    }

    /// Clear all memoized entries. Test isolation only; production code
    /// relies on process restart for invalidation.
    pub async fn reset(&self) {
        self.memo.lock().await.clear();
    }
}

/// Canonical memo key: sorted patterns joined by a separator that cannot
/// occur inside a pattern.
fn memo_key(patterns: &[String]) -> String {
    let mut sorted: Vec<&str> = patterns.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted.join(KEY_SEPARATOR)
}
