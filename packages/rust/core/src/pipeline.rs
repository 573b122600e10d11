//! End-to-end build: content → entities → categories → risk → interactions →
//! search routes → artifacts.
//!
//! Every index is built in memory before anything is written. A failing stage
//! aborts the run and leaves existing artifacts as they were.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{info, instrument};
use uuid::Uuid;

use pepindex_artifacts::{
    ArtifactMeta, BuildManifest, CATEGORIES_FILENAME, CategoriesIndex, ENTITIES_FILENAME,
    EntitiesIndex, INTERACTIONS_FILENAME, InteractionsIndex, RISK_FILENAME, RenderedArtifact,
    RiskIndex, SEARCH_ROUTES_FILENAME, SearchRoutesIndex, write_artifacts,
};
use pepindex_content::ContentStore;
use pepindex_shared::{AppConfig, Result};

use crate::categories::build_categories;
use crate::entities::build_entities;
use crate::interactions::build_interactions;
use crate::risk::build_risk;
use crate::search_routes::build_search_routes;

/// Inputs of a build or check run.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub content_root: PathBuf,
    pub output_dir: PathBuf,
    /// Overrides the built-in category mapping.
    pub blend_mapping: Option<BTreeMap<String, Vec<String>>>,
    pub tool_version: String,
}

impl BuildOptions {
    pub fn from_config(config: &AppConfig, tool_version: impl Into<String>) -> Self {
        Self {
            content_root: config.paths.content_root.clone(),
            output_dir: config.paths.output_dir.clone(),
            blend_mapping: config.categories.blend_mapping.clone(),
            tool_version: tool_version.into(),
        }
    }
}

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    LoadContent,
    Entities,
    Categories,
    Risk,
    Interactions,
    SearchRoutes,
    Write,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::LoadContent => "Loading content",
            Self::Entities => "Building entity index",
            Self::Categories => "Building category index",
            Self::Risk => "Building risk index",
            Self::Interactions => "Building interactions index",
            Self::SearchRoutes => "Building search routes index",
            Self::Write => "Writing artifacts",
        })
    }
}

/// Progress callback for reporting pipeline status.
pub trait BuildProgress: Send + Sync {
    /// Called when a stage begins.
    fn stage_started(&self, stage: Stage);
    /// Called when a stage completes with the number of records it produced.
    fn stage_finished(&self, stage: Stage, records: usize);
    /// Called once the artifacts are on disk.
    fn done(&self, summary: &BuildSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl BuildProgress for SilentProgress {
    fn stage_started(&self, _stage: Stage) {}
    fn stage_finished(&self, _stage: Stage, _records: usize) {}
    fn done(&self, _summary: &BuildSummary) {}
}

/// All five indexes of one build, in memory.
#[derive(Debug, Clone)]
pub struct BuiltIndexes {
    pub entities: EntitiesIndex,
    pub categories: CategoriesIndex,
    pub risk: RiskIndex,
    pub interactions: InteractionsIndex,
    pub search_routes: SearchRoutesIndex,
}

impl BuiltIndexes {
    /// Render every index to its final bytes, in pipeline order.
    pub fn render(&self) -> Result<Vec<RenderedArtifact>> {
        Ok(vec![
            RenderedArtifact::render(ENTITIES_FILENAME, &self.entities)?,
            RenderedArtifact::render(CATEGORIES_FILENAME, &self.categories)?,
            RenderedArtifact::render(RISK_FILENAME, &self.risk)?,
            RenderedArtifact::render(INTERACTIONS_FILENAME, &self.interactions)?,
            RenderedArtifact::render(SEARCH_ROUTES_FILENAME, &self.search_routes)?,
        ])
    }
}

/// Result of a completed build.
#[derive(Debug)]
pub struct BuildSummary {
    pub output_dir: PathBuf,
    pub run_id: Uuid,
    pub artifacts: Vec<ArtifactMeta>,
    pub elapsed: Duration,
}

/// Run every builder, in order, against an already loaded store.
pub fn build_all(
    store: &ContentStore,
    blend_mapping: Option<&BTreeMap<String, Vec<String>>>,
    progress: &dyn BuildProgress,
) -> Result<BuiltIndexes> {
    progress.stage_started(Stage::Entities);
    let entities = build_entities(store)?;
    progress.stage_finished(Stage::Entities, entities.counts.total);

    progress.stage_started(Stage::Categories);
    let categories = build_categories(store, &entities, blend_mapping)?;
    progress.stage_finished(Stage::Categories, categories.categories.len());

    progress.stage_started(Stage::Risk);
    let risk = build_risk(store, &entities)?;
    progress.stage_finished(Stage::Risk, risk.entities.len());

    progress.stage_started(Stage::Interactions);
    let interactions = build_interactions(store, &entities)?;
    progress.stage_finished(Stage::Interactions, interactions.mapping.len());

    progress.stage_started(Stage::SearchRoutes);
    let search_routes = build_search_routes(store, &entities)?;
    progress.stage_finished(Stage::SearchRoutes, search_routes.terms.len());

    Ok(BuiltIndexes {
        entities,
        categories,
        risk,
        interactions,
        search_routes,
    })
}

/// Load content and build all indexes without touching the output directory.
pub fn build_in_memory(options: &BuildOptions, progress: &dyn BuildProgress) -> Result<BuiltIndexes> {
    progress.stage_started(Stage::LoadContent);
    let store = ContentStore::load(&options.content_root)?;
    progress.stage_finished(Stage::LoadContent, store.peptides.len() + store.blend_registry.len());

    build_all(&store, options.blend_mapping.as_ref(), progress)
}

/// Run the full build and write artifacts plus `build_manifest.json`.
#[instrument(skip_all, fields(content_root = %options.content_root.display(), output_dir = %options.output_dir.display()))]
pub fn run_build(options: &BuildOptions, progress: &dyn BuildProgress) -> Result<BuildSummary> {
    let start = Instant::now();

    let indexes = build_in_memory(options, progress)?;
    let rendered = indexes.render()?;

    progress.stage_started(Stage::Write);
    let artifacts = write_artifacts(&options.output_dir, &rendered)?;
    let manifest = BuildManifest::new(options.tool_version.clone(), artifacts.clone());
    manifest.write(&options.output_dir)?;
    progress.stage_finished(Stage::Write, artifacts.len());

    let summary = BuildSummary {
        output_dir: options.output_dir.clone(),
        run_id: manifest.run_id,
        artifacts,
        elapsed: start.elapsed(),
    };
    info!(
        run_id = %summary.run_id,
        artifacts = summary.artifacts.len(),
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "build complete"
    );
    progress.done(&summary);

    Ok(summary)
}
