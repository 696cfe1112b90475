//! Cache artifact model
//!
//! A cache entry is a metadata envelope plus an opaque payload: the task's
//! output files archived with tar + zstd. Both tiers move artifacts around
//! as a single blob (`to_wire_bytes` / `from_wire_bytes`), so the remote
//! store never needs to understand the contents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use strider_core::{Error, Result};

/// Metadata stored alongside every cached artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactMeta {
    /// Name of the task that produced the outputs
    pub task_name: String,
    /// When the artifact was created
    pub created_at: DateTime<Utc>,
    /// Version of the runner that created this entry
    pub runner_version: String,
    /// Platform identifier, e.g. `linux-x86_64`
    pub platform: String,
    /// Size of the archived payload in bytes
    pub payload_size: u64,
}

/// One cached task result: metadata plus the archived output files.
#[derive(Debug, Clone)]
pub struct CacheArtifact {
    /// Metadata envelope
    pub meta: ArtifactMeta,
    /// tar + zstd archive of the task's output directory
    pub payload: Vec<u8>,
}

impl CacheArtifact {
    /// Archive the output directory of `task_name` into an artifact.
    ///
    /// A missing or empty output directory yields an empty archive rather
    /// than an error: a task may legitimately produce no files.
    pub fn from_outputs(task_name: impl Into<String>, outputs_root: &Path) -> Result<Self> {
        let payload = pack_outputs(outputs_root)?;
        let payload_size = payload.len() as u64;
        Ok(Self {
            meta: ArtifactMeta {
                task_name: task_name.into(),
                created_at: Utc::now(),
                runner_version: env!("CARGO_PKG_VERSION").to_string(),
                platform: format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH),
                payload_size,
            },
            payload,
        })
    }

    /// Unpack the payload into `destination`, creating it if needed.
    pub fn materialize(&self, destination: &Path) -> Result<()> {
        unpack_payload(&self.payload, destination)
    }

    /// Encode the artifact as one opaque blob: a JSON metadata line followed
    /// by the raw payload bytes.
    pub fn to_wire_bytes(&self) -> Result<Vec<u8>> {
        let mut out = serde_json::to_vec(&self.meta)
            .map_err(|e| Error::serialization(format!("Failed to encode artifact meta: {e}")))?;
        out.push(b'\n');
        out.extend_from_slice(&self.payload);
        Ok(out)
    }

    /// Decode an artifact from its wire encoding.
    pub fn from_wire_bytes(bytes: &[u8]) -> Result<Self> {
        let split = bytes
            .iter()
            .position(|b| *b == b'\n')
            .ok_or_else(|| Error::serialization("Artifact blob is missing its metadata header"))?;
        let meta: ArtifactMeta = serde_json::from_slice(&bytes[..split])
            .map_err(|e| Error::serialization(format!("Failed to decode artifact meta: {e}")))?;
        Ok(Self {
            meta,
            payload: bytes[split + 1..].to_vec(),
        })
    }
}

/// Create a zstd-compressed tar archive of a directory, in memory.
pub fn pack_outputs(src_root: &Path) -> Result<Vec<u8>> {
    let enc = zstd::Encoder::new(Vec::new(), 3)
        .map_err(|e| Error::serialization(format!("zstd encoder error: {e}")))?;
    let mut builder = tar::Builder::new(enc);

    if src_root.is_dir() {
        builder
            .append_dir_all(".", src_root)
            .map_err(|e| Error::io(e, src_root, "archive"))?;
    } else {
        tracing::debug!(root = %src_root.display(), "No outputs directory, packing empty archive");
    }

    let enc = builder
        .into_inner()
        .map_err(|e| Error::serialization(format!("tar finalize failed: {e}")))?;
    enc.finish()
        .map_err(|e| Error::serialization(format!("zstd finish failed: {e}")))
}

/// Unpack an archived payload into `destination`.
pub fn unpack_payload(payload: &[u8], destination: &Path) -> Result<()> {
    fs::create_dir_all(destination).map_err(|e| Error::io(e, destination, "create_dir_all"))?;
    let dec = zstd::Decoder::new(payload)
        .map_err(|e| Error::serialization(format!("zstd decoder error: {e}")))?;
    let mut archive = tar::Archive::new(dec);
    archive
        .unpack(destination)
        .map_err(|e| Error::io(e, destination, "unpack"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn pack_and_materialize_roundtrip() {
        let outputs = TempDir::new().unwrap();
        fs::create_dir_all(outputs.path().join("dist/assets")).unwrap();
        fs::write(outputs.path().join("dist/app.js"), b"bundle").unwrap();
        fs::write(outputs.path().join("dist/assets/logo.svg"), b"<svg/>").unwrap();

        let artifact = CacheArtifact::from_outputs("web#build", outputs.path()).unwrap();
        assert_eq!(artifact.meta.task_name, "web#build");
        assert_eq!(artifact.meta.payload_size, artifact.payload.len() as u64);

        let dest = TempDir::new().unwrap();
        artifact.materialize(dest.path()).unwrap();
        assert_eq!(
            fs::read(dest.path().join("dist/app.js")).unwrap(),
            b"bundle"
        );
        assert_eq!(
            fs::read(dest.path().join("dist/assets/logo.svg")).unwrap(),
            b"<svg/>"
        );
    }

    #[test]
    fn missing_outputs_dir_packs_empty_archive() {
        let tmp = TempDir::new().unwrap();
        let artifact =
            CacheArtifact::from_outputs("noop", &tmp.path().join("does-not-exist")).unwrap();

        let dest = TempDir::new().unwrap();
        artifact.materialize(dest.path()).unwrap();
        assert_eq!(fs::read_dir(dest.path()).unwrap().count(), 0);
    }

    #[test]
    fn wire_encoding_roundtrip() {
        let outputs = TempDir::new().unwrap();
        fs::write(outputs.path().join("out.txt"), b"payload\nwith newline").unwrap();

        let artifact = CacheArtifact::from_outputs("unit", outputs.path()).unwrap();
        let wire = artifact.to_wire_bytes().unwrap();
        let decoded = CacheArtifact::from_wire_bytes(&wire).unwrap();

        assert_eq!(decoded.meta.task_name, "unit");
        assert_eq!(decoded.payload, artifact.payload);
    }

    #[test]
    fn truncated_wire_blob_is_a_serialization_error() {
        let result = CacheArtifact::from_wire_bytes(b"{\"no-newline\": true}");
        assert!(matches!(
            result,
            Err(strider_core::Error::Serialization { .. })
        ));
    }
}
