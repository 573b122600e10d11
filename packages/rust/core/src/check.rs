//! Drift check: rebuild in memory and compare with the artifacts on disk.

use std::fmt;
use std::fs;

use tracing::{info, instrument, warn};

use pepindex_artifacts::{RenderedArtifact, sha256_hex};
use pepindex_shared::{PepIndexError, Result};

use crate::pipeline::{BuildOptions, BuildProgress, build_in_memory};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriftStatus {
    UpToDate,
    Changed,
    Missing,
}

impl fmt::Display for DriftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::UpToDate => "up to date",
            Self::Changed => "changed",
            Self::Missing => "missing",
        })
    }
}

#[derive(Debug, Clone)]
pub struct ArtifactDrift {
    pub filename: String,
    pub status: DriftStatus,
    /// SHA-256 of the freshly built artifact.
    pub expected_sha256: String,
    /// SHA-256 of the file on disk, if present.
    pub actual_sha256: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    pub artifacts: Vec<ArtifactDrift>,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.artifacts.iter().all(|a| a.status == DriftStatus::UpToDate)
    }

    pub fn drifted(&self) -> impl Iterator<Item = &ArtifactDrift> {
        self.artifacts.iter().filter(|a| a.status != DriftStatus::UpToDate)
    }
}

/// Compare rendered artifacts with what is currently in `options.output_dir`.
pub(crate) fn diff_artifacts(options: &BuildOptions, rendered: &[RenderedArtifact]) -> Result<CheckReport> {
    let mut report = CheckReport::default();
    for artifact in rendered {
        let path = options.output_dir.join(artifact.filename);
        let expected = sha256_hex(artifact.content.as_bytes());

        let actual = match fs::read(&path) {
            Ok(bytes) => Some(sha256_hex(&bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(PepIndexError::io(&path, e)),
        };

        let status = match &actual {
            None => DriftStatus::Missing,
            Some(sha) if *sha == expected => DriftStatus::UpToDate,
            Some(_) => DriftStatus::Changed,
        };
        report.artifacts.push(ArtifactDrift {
            filename: artifact.filename.to_string(),
            status,
            expected_sha256: expected,
            actual_sha256: actual,
        });
    }
    Ok(report)
}

/// Rebuild every index in memory and report artifacts that differ on disk.
#[instrument(skip_all, fields(output_dir = %options.output_dir.display()))]
pub fn run_check(options: &BuildOptions, progress: &dyn BuildProgress) -> Result<CheckReport> {
    let rendered = build_in_memory(options, progress)?.render()?;
    let report = diff_artifacts(options, &rendered)?;

    for drift in report.drifted() {
        warn!(file = %drift.filename, status = %drift.status, "artifact drift");
    }
    info!(
        checked = report.artifacts.len(),
        clean = report.is_clean(),
        "drift check complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn options(dir: &Path) -> BuildOptions {
        BuildOptions {
            content_root: dir.join("content"),
            output_dir: dir.join("out"),
            blend_mapping: None,
            tool_version: "test".into(),
        }
    }

    #[test]
    fn classifies_missing_changed_and_current() {
        let dir = std::env::temp_dir().join(format!("pepindex-check-{}", uuid::Uuid::now_v7()));
        let opts = options(&dir);
        fs::create_dir_all(&opts.output_dir).unwrap();

        let rendered = vec![
            RenderedArtifact { filename: "a_v1.json", content: "{}\n".into() },
            RenderedArtifact { filename: "b_v1.json", content: "[]\n".into() },
            RenderedArtifact { filename: "c_v1.json", content: "1\n".into() },
        ];
        fs::write(opts.output_dir.join("a_v1.json"), "{}\n").unwrap();
        fs::write(opts.output_dir.join("b_v1.json"), "[1]\n").unwrap();

        let report = diff_artifacts(&opts, &rendered).unwrap();
        let statuses: Vec<_> = report.artifacts.iter().map(|a| a.status).collect();
        assert_eq!(
            statuses,
            [DriftStatus::UpToDate, DriftStatus::Changed, DriftStatus::Missing]
        );
        assert!(!report.is_clean());
        assert_eq!(report.drifted().count(), 2);
        assert!(report.artifacts[2].actual_sha256.is_none());

        let _ = fs::remove_dir_all(&dir);
    }
}
