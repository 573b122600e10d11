//! `build_manifest.json`: one record per build run.
//!
//! Unlike the artifacts themselves the manifest changes on every run, so it is
//! excluded from drift checks.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use pepindex_shared::Result;

use crate::writer::{ArtifactMeta, RenderedArtifact, write_artifacts};

pub const MANIFEST_FILENAME: &str = "build_manifest.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildManifest {
    pub run_id: Uuid,
    pub tool_version: String,
    pub built_at: DateTime<Utc>,
    pub artifacts: Vec<ArtifactMeta>,
}

impl BuildManifest {
    pub fn new(tool_version: impl Into<String>, artifacts: Vec<ArtifactMeta>) -> Self {
        Self {
            run_id: Uuid::now_v7(),
            tool_version: tool_version.into(),
            built_at: Utc::now(),
            artifacts,
        }
    }

    pub fn write(&self, dir: &Path) -> Result<()> {
        let rendered = RenderedArtifact::render(MANIFEST_FILENAME, self)?;
        write_artifacts(dir, &[rendered])?;
        Ok(())
    }

    pub fn artifact(&self, filename: &str) -> Option<&ArtifactMeta> {
        self.artifacts.iter().find(|a| a.filename == filename)
    }
}
