//! Salt computation
//!
//! The salt is the final deterministic cache key string for one task:
//! a SHA-256 over the environment digest list, the command string, and the
//! custom key, combined in that fixed order.

use crate::env_hash::EnvHashCache;
use sha2::{Digest, Sha256};
use std::path::Path;
use strider_core::Result;

/// Hash a sequence of strings into one stable hex digest.
///
/// Each part is framed with its byte length before hashing so that
/// `["ab", "c"]` and `["a", "bc"]` produce distinct digests.
pub fn hash_strings<'a, I>(parts: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(u64::try_from(part.len()).unwrap_or(u64::MAX).to_le_bytes());
        hasher.update(part.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Compute the salt for one task.
///
/// Delegates the environment digests to `env_cache` (memoized, serialized),
/// then combines digests, `command`, and `custom_key` in that order.
/// Identical inputs yield an identical salt for the process lifetime,
/// independent of call order or concurrency.
pub async fn salt(
    env_cache: &EnvHashCache,
    env_globs: &[String],
    command: &str,
    root: &Path,
    custom_key: &str,
) -> Result<String> {
    let env_digests = env_cache.get(env_globs, root).await?;
    Ok(hash_strings(
        env_digests
            .iter()
            .map(String::as_str)
            .chain([command, custom_key]),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn hash_strings_is_stable() {
        let a = hash_strings(["x", "y"]);
        let b = hash_strings(["x", "y"]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn hash_strings_frames_parts() {
        // Without length framing these would collide
        assert_ne!(hash_strings(["ab", "c"]), hash_strings(["a", "bc"]));
        assert_ne!(hash_strings(["ab"]), hash_strings(["a", "b"]));
    }

    #[tokio::test]
    async fn salt_reflects_environment_file_contents() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "env/a.json", "A");
        write(tmp.path(), "env/b.json", "B");
        let globs = vec!["env/*.json".to_string()];

        let cache = EnvHashCache::new();
        let first = salt(&cache, &globs, "build", tmp.path(), "").await.unwrap();
        let again = salt(&cache, &globs, "build", tmp.path(), "").await.unwrap();
        assert_eq!(first, again);

        // A fresh process (fresh cache) with swapped contents must disagree
        write(tmp.path(), "env/a.json", "B");
        write(tmp.path(), "env/b.json", "A");
        let swapped_cache = EnvHashCache::new();
        let swapped = salt(&swapped_cache, &globs, "build", tmp.path(), "")
            .await
            .unwrap();
        assert_ne!(first, swapped);

        // And a fresh process with the original contents must reproduce it
        write(tmp.path(), "env/a.json", "A");
        write(tmp.path(), "env/b.json", "B");
        let fresh_cache = EnvHashCache::new();
        let reproduced = salt(&fresh_cache, &globs, "build", tmp.path(), "")
            .await
            .unwrap();
        assert_eq!(first, reproduced);
    }

    #[tokio::test]
    async fn salt_distinguishes_command_and_custom_key() {
        let tmp = TempDir::new().unwrap();
        let cache = EnvHashCache::new();

        let build = salt(&cache, &[], "build", tmp.path(), "").await.unwrap();
        let test = salt(&cache, &[], "test", tmp.path(), "").await.unwrap();
        let keyed = salt(&cache, &[], "build", tmp.path(), "v2").await.unwrap();

        assert_ne!(build, test);
        assert_ne!(build, keyed);
    }
}
