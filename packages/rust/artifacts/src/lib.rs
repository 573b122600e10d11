//! Index artifact schemas and the write discipline around them.
//!
//! - [`schema`]: serde shapes of the five index artifacts
//! - [`writer`]: deterministic rendering, checksums and atomic writes
//! - [`manifest`]: the per-build manifest recorded next to the artifacts

pub mod manifest;
pub mod schema;
pub mod writer;

pub use manifest::{BuildManifest, MANIFEST_FILENAME};
pub use schema::{
    BlendEntity, CategoriesIndex, CategoryBlendItem, CategoryCounts, CategoryGroup,
    CategoryItems, CategoryMapping, CategoryPeptideItem, CategoryTotals, EntitiesIndex,
    EntityCounts, InteractionPeptide, InteractionStats, InteractionsIndex, PeptideEntity,
    RiskCounts, RiskEntry, RiskIndex, RiskSnapshot, RouteType, SearchCounts, SearchRoute,
    SearchRoutesIndex, SearchTerm, ARTIFACT_VERSION, INTERACTIONS_SCHEMA_VERSION,
};
pub use writer::{ArtifactMeta, RenderedArtifact, read_artifact, render_json, sha256_hex, write_artifacts};

/// Artifact file names, in pipeline order.
pub const ENTITIES_FILENAME: &str = "entities_v1.json";
pub const CATEGORIES_FILENAME: &str = "categories_v1.json";
pub const RISK_FILENAME: &str = "risk_index_v1.json";
pub const INTERACTIONS_FILENAME: &str = "interactions_to_peptides_v1.json";
pub const SEARCH_ROUTES_FILENAME: &str = "search_routes_v1.json";
