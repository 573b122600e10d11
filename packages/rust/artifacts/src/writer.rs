//! Rendering and writing artifacts.
//!
//! Writes are two-phase: every artifact is first written to a hidden temp file
//! next to its target, and only once all temp files exist are they renamed into
//! place. A failure in the first phase leaves the previous artifacts untouched.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};

use pepindex_shared::{PepIndexError, Result};

/// Metadata for a single artifact file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactMeta {
    pub filename: String,
    pub sha256: String,
    pub size_bytes: usize,
}

/// An artifact rendered to its final bytes, not yet written.
#[derive(Debug, Clone)]
pub struct RenderedArtifact {
    pub filename: &'static str,
    pub content: String,
}

impl RenderedArtifact {
    pub fn render<T: Serialize>(filename: &'static str, value: &T) -> Result<Self> {
        Ok(Self {
            filename,
            content: render_json(value)?,
        })
    }

    pub fn meta(&self) -> ArtifactMeta {
        ArtifactMeta {
            filename: self.filename.to_string(),
            sha256: sha256_hex(self.content.as_bytes()),
            size_bytes: self.content.len(),
        }
    }
}

/// Pretty JSON (two-space indent) with a trailing newline.
pub fn render_json<T: Serialize>(value: &T) -> Result<String> {
    let mut out = serde_json::to_string_pretty(value)
        .map_err(|e| PepIndexError::validation(format!("failed to serialize artifact: {e}")))?;
    out.push('\n');
    Ok(out)
}

/// Lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Write every artifact into `dir` and return their metadata, in input order.
#[instrument(skip_all, fields(dir = %dir.display(), artifact_count = artifacts.len()))]
pub fn write_artifacts(dir: &Path, artifacts: &[RenderedArtifact]) -> Result<Vec<ArtifactMeta>> {
    fs::create_dir_all(dir).map_err(|e| PepIndexError::io(dir, e))?;

    let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let target = dir.join(artifact.filename);
        let temp = dir.join(format!(".{}.tmp", artifact.filename));
        if let Err(e) = fs::write(&temp, &artifact.content) {
            discard(&staged);
            let _ = fs::remove_file(&temp);
            return Err(PepIndexError::io(&temp, e));
        }
        staged.push((temp, target));
    }

    for (temp, target) in &staged {
        fs::rename(temp, target).map_err(|e| PepIndexError::io(target, e))?;
    }

    let metas: Vec<ArtifactMeta> = artifacts.iter().map(RenderedArtifact::meta).collect();
    for meta in &metas {
        debug!(file = %meta.filename, size = meta.size_bytes, "wrote artifact");
    }
    info!(count = metas.len(), "artifacts written");

    Ok(metas)
}

fn discard(staged: &[(PathBuf, PathBuf)]) {
    for (temp, _) in staged {
        if let Err(e) = fs::remove_file(temp) {
            warn!(path = %temp.display(), error = %e, "failed to remove staged artifact");
        }
    }
}

/// Read and decode a previously written artifact.
pub fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| PepIndexError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| PepIndexError::parse(path, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("pepindex-artifacts-{}", uuid::Uuid::now_v7()))
    }

    #[test]
    fn render_is_pretty_with_trailing_newline() {
        let out = render_json(&json!({"version": "v1", "terms": []})).unwrap();
        assert!(out.ends_with("}\n"));
        assert!(out.contains("\n  \"version\": \"v1\""));
    }

    #[test]
    fn render_keeps_non_ascii() {
        let out = render_json(&json!({"label": "β-Alanine"})).unwrap();
        assert!(out.contains("β-Alanine"));
    }

    #[test]
    fn sha256_known_value() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn write_then_read_back() {
        let dir = temp_dir();
        let artifacts = vec![
            RenderedArtifact::render("a_v1.json", &json!({"n": 1})).unwrap(),
            RenderedArtifact::render("b_v1.json", &json!({"n": 2})).unwrap(),
        ];

        let metas = write_artifacts(&dir, &artifacts).unwrap();
        assert_eq!(metas.len(), 2);
        assert_eq!(metas[0].filename, "a_v1.json");
        assert_eq!(metas[1].size_bytes, artifacts[1].content.len());

        let on_disk = fs::read_to_string(dir.join("b_v1.json")).unwrap();
        assert_eq!(sha256_hex(on_disk.as_bytes()), metas[1].sha256);
        assert!(!dir.join(".a_v1.json.tmp").exists());

        let back: serde_json::Value = read_artifact(&dir.join("a_v1.json")).unwrap();
        assert_eq!(back["n"], 1);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn read_missing_artifact_is_io_error() {
        let err = read_artifact::<serde_json::Value>(&temp_dir().join("nope.json")).unwrap_err();
        assert!(matches!(err, PepIndexError::Io { .. }));
    }
}
