//! Glob matching and content hashing primitives
//!
//! These are the filesystem-facing capabilities the salting layer builds on:
//! resolving a set of glob patterns to the files they match, and hashing the
//! matched files' contents. Digests are SHA-256 over file bytes, so they are
//! stable for identical contents regardless of mtime or path casing games.

use globset::{Glob, GlobSet, GlobSetBuilder};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use strider_core::{Error, Result};
use walkdir::WalkDir;

/// Resolve glob patterns to the relative paths of matching files.
///
/// Patterns without glob metacharacters are treated as explicit file paths
/// (missing ones are skipped with a warning). Each glob pattern only walks
/// the directory subtree under its literal prefix, not the whole root.
/// Results are deduplicated and sorted for deterministic downstream hashing.
pub fn resolve_globs(patterns: &[String], root: &Path) -> Result<Vec<PathBuf>> {
    let mut explicit_files: Vec<String> = Vec::new();
    let mut walks: Vec<(String, GlobSet)> = Vec::new();

    for raw in patterns {
        let pattern = raw.trim();
        if pattern.is_empty() {
            continue;
        }
        if looks_like_glob(pattern) {
            let glob = Glob::new(pattern).map_err(|e| {
                Error::configuration(format!("Invalid glob pattern '{pattern}': {e}"))
            })?;
            let set = GlobSetBuilder::new()
                .add(glob)
                .build()
                .map_err(|e| Error::configuration(format!("Failed to build glob set: {e}")))?;
            walks.push((glob_base(pattern), set));
        } else {
            explicit_files.push(pattern.to_string());
        }
    }

    let mut seen: BTreeSet<PathBuf> = BTreeSet::new();

    for raw in &explicit_files {
        let abs = root.join(raw);
        if abs.is_file() {
            seen.insert(normalize_rel_path(Path::new(raw)));
        } else {
            tracing::warn!(path = %raw, "Environment file not found");
        }
    }

    for (base, globset) in &walks {
        let walk_root = root.join(base);
        if !walk_root.exists() {
            tracing::debug!(dir = %base, "Glob base directory does not exist, skipping");
            continue;
        }
        for entry in WalkDir::new(&walk_root)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_dir() {
                continue;
            }
            // Relative to the configured root, not the walk root
            let Ok(rel) = path.strip_prefix(root) else {
                continue;
            };
            let rel = normalize_rel_path(rel);
            if globset.is_match(rel.as_path()) {
                seen.insert(rel);
            }
        }
    }

    Ok(seen.into_iter().collect())
}

/// Hash the given files (paths relative to `root`) with SHA-256.
///
/// Returns a map from relative path to hex digest, ordered by path. Any
/// unreadable file is a [`Error::HashComputation`]: a cache key computed
/// from a partial environment scan would be silently wrong.
pub fn hash_files(paths: &[PathBuf], root: &Path) -> Result<BTreeMap<String, String>> {
    let mut digests = BTreeMap::new();
    for rel in paths {
        let abs = root.join(rel);
        let digest = sha256_file(&abs)?;
        digests.insert(rel.to_string_lossy().into_owned(), digest);
    }
    tracing::debug!(file_count = digests.len(), "Hashed environment files");
    Ok(digests)
}

/// Streaming SHA-256 of one file's contents.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = fs::File::open(path).map_err(|e| {
        Error::hash_computation(format!("Failed to open {}: {e}", path.display()))
    })?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 1024 * 64];
    loop {
        let n = file.read(&mut buf).map_err(|e| {
            Error::hash_computation(format!("Failed to read {}: {e}", path.display()))
        })?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

fn looks_like_glob(pattern: &str) -> bool {
    pattern.contains('*')
        || pattern.contains('{')
        || pattern.contains('?')
        || pattern.contains('[')
}

/// Literal directory prefix of a glob pattern.
///
/// `env/**/*.json` -> `env`, `**/*.lock` -> `` (the root itself).
fn glob_base(pattern: &str) -> String {
    let mut parts = Vec::new();
    for part in pattern.split('/') {
        if looks_like_glob(part) {
            break;
        }
        if !part.is_empty() {
            parts.push(part);
        }
    }
    parts.join("/")
}

fn normalize_rel_path(p: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in p.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(s) => out.push(s),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn resolves_glob_patterns_under_base_dir() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "env/a.json", "{}");
        write(tmp.path(), "env/b.json", "{}");
        write(tmp.path(), "env/notes.txt", "n");
        write(tmp.path(), "src/c.json", "{}");

        let files = resolve_globs(&["env/*.json".to_string()], tmp.path()).unwrap();
        assert_eq!(
            files,
            vec![PathBuf::from("env/a.json"), PathBuf::from("env/b.json")]
        );
    }

    #[test]
    fn resolves_explicit_files_and_skips_missing() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "package-lock.json", "{}");

        let files = resolve_globs(
            &["package-lock.json".to_string(), "missing.lock".to_string()],
            tmp.path(),
        )
        .unwrap();
        assert_eq!(files, vec![PathBuf::from("package-lock.json")]);
    }

    #[test]
    fn deduplicates_overlapping_patterns() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "env/a.json", "{}");

        let files = resolve_globs(
            &["env/*.json".to_string(), "env/a.json".to_string()],
            tmp.path(),
        )
        .unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn rejects_invalid_glob() {
        let tmp = TempDir::new().unwrap();
        let result = resolve_globs(&["env/[".to_string()], tmp.path());
        assert!(matches!(
            result,
            Err(Error::Configuration { .. })
        ));
    }

    #[test]
    fn hash_is_content_addressed() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.txt", "same");
        write(tmp.path(), "b.txt", "same");
        write(tmp.path(), "c.txt", "different");

        let paths = vec![
            PathBuf::from("a.txt"),
            PathBuf::from("b.txt"),
            PathBuf::from("c.txt"),
        ];
        let digests = hash_files(&paths, tmp.path()).unwrap();
        assert_eq!(digests["a.txt"], digests["b.txt"]);
        assert_ne!(digests["a.txt"], digests["c.txt"]);
    }

    #[test]
    fn hash_of_unreadable_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let result = hash_files(&[PathBuf::from("gone.txt")], tmp.path());
        assert!(matches!(result, Err(Error::HashComputation { .. })));
    }

    #[test]
    fn glob_base_extraction() {
        assert_eq!(glob_base("env/*.json"), "env");
        assert_eq!(glob_base("a/b/*.rs"), "a/b");
        assert_eq!(glob_base("**/*.lock"), "");
    }
}
