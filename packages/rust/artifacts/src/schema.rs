//! Serde shapes of the index artifacts.
//!
//! Field declaration order is the JSON key order, and every map is a
//! `BTreeMap`, so rendering the same value always yields the same bytes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use pepindex_shared::{EntityKind, EvidenceGrade, Likelihood, RiskTier, Severity};

/// `version` field carried by every `*_v1` artifact.
pub const ARTIFACT_VERSION: &str = "v1";

/// `schema_version` field of the interactions reverse index.
pub const INTERACTIONS_SCHEMA_VERSION: &str = "interactions_to_peptides_v1";

// ---------------------------------------------------------------------------
// Entity index
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitiesIndex {
    pub version: String,
    pub counts: EntityCounts,
    pub peptides: Vec<PeptideEntity>,
    pub blends: Vec<BlendEntity>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityCounts {
    pub peptides: usize,
    pub blends: usize,
    pub total: usize,
}

/// Denormalized peptide snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeptideEntity {
    pub kind: EntityKind,
    pub slug: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub status_category: String,
    pub entity_kind: String,
    pub taxonomy_keys: Vec<String>,
    pub appears_in_blends: Vec<String>,
    pub source_path: String,
}

impl PeptideEntity {
    pub fn route(&self) -> String {
        EntityKind::Peptide.route(&self.slug)
    }
}

/// Denormalized blend snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlendEntity {
    pub kind: EntityKind,
    pub slug: String,
    pub display_name: String,
    pub taxonomy_keys: Vec<String>,
    /// Resolved component peptide slugs.
    pub components: Vec<String>,
    pub components_unresolved: Vec<String>,
    pub evidence_count: usize,
    pub source_path: String,
}

impl BlendEntity {
    pub fn route(&self) -> String {
        EntityKind::Blend.route(&self.slug)
    }
}

// ---------------------------------------------------------------------------
// Category index
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoriesIndex {
    pub version: String,
    pub mapping: CategoryMapping,
    pub counts: CategoryTotals,
    pub categories: Vec<CategoryGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMapping {
    pub peptide_key_to_blend_keys: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotals {
    pub categories: usize,
    pub peptide_classes: usize,
}

/// One browsing group, keyed by a peptide taxonomy key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub key: String,
    pub label: String,
    pub mapped_blend_taxonomy_keys: Vec<String>,
    pub counts: CategoryCounts,
    pub items: CategoryItems,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub peptides: usize,
    pub blends: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryItems {
    pub peptides: Vec<CategoryPeptideItem>,
    pub blends: Vec<CategoryBlendItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPeptideItem {
    pub kind: EntityKind,
    pub slug: String,
    pub display_name: String,
    pub status_category: String,
    pub taxonomy_keys: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBlendItem {
    pub kind: EntityKind,
    pub slug: String,
    pub display_name: String,
    pub taxonomy_keys: Vec<String>,
    pub components: Vec<String>,
    pub components_unresolved: Vec<String>,
}

// ---------------------------------------------------------------------------
// Risk index
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskIndex {
    pub version: String,
    pub counts: RiskCounts,
    pub entities: Vec<RiskEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskCounts {
    pub entities: usize,
    pub peptides: usize,
    pub blends: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskEntry {
    pub route: String,
    pub kind: EntityKind,
    pub slug: String,
    pub risk: RiskSnapshot,
    pub safety_links: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskSnapshot {
    pub risk_score: u8,
    pub risk_tier: RiskTier,
    pub severity: Option<Severity>,
    pub likelihood: Option<Likelihood>,
    pub evidence_grade: Option<EvidenceGrade>,
    pub developmental_risk: bool,
    pub unknowns_penalty: bool,
    /// Blends only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub computed_from_components: Option<bool>,
    /// Blends only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_slugs: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// Interactions reverse index
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionsIndex {
    pub schema_version: String,
    pub stats: InteractionStats,
    /// Canonical interaction class slug to the peptides declaring it.
    pub mapping: BTreeMap<String, Vec<InteractionPeptide>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionStats {
    pub peptides_total: usize,
    pub peptides_with_any_interactions: usize,
    pub drug_items_total: usize,
    pub supp_items_total: usize,
    pub peptide_items_total: usize,
    pub unresolved_total: usize,
    pub unresolved_drug: usize,
    pub unresolved_supplement: usize,
    pub unresolved_peptide: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InteractionPeptide {
    pub peptide_slug: String,
    pub peptide_name: String,
}

// ---------------------------------------------------------------------------
// Search routes index
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRoutesIndex {
    pub version: String,
    pub counts: SearchCounts,
    /// Sorted by `term`, unique.
    pub terms: Vec<SearchTerm>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCounts {
    pub terms: usize,
    pub peptides: usize,
    pub blends: usize,
    pub categories: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTerm {
    /// Normalized term.
    pub term: String,
    pub routes: Vec<SearchRoute>,
    /// Provenance labels, sorted.
    pub sources: Vec<String>,
    /// Set when a strict single-target entity or blend synonym claims this term.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direct_route: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteType {
    Entity,
    Category,
}

impl RouteType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Entity => "entity",
            Self::Category => "category",
        }
    }
}

/// One typed destination of a search term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchRoute {
    #[serde(rename = "type")]
    pub route_type: RouteType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<EntityKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxonomy_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub route: String,
}

impl SearchRoute {
    pub fn entity(kind: EntityKind, slug: &str) -> Self {
        Self {
            route_type: RouteType::Entity,
            kind: Some(kind),
            slug: Some(slug.to_string()),
            taxonomy_key: None,
            label: None,
            route: kind.route(slug),
        }
    }

    pub fn category(key: &str, label: &str) -> Self {
        Self {
            route_type: RouteType::Category,
            kind: None,
            slug: None,
            taxonomy_key: Some(key.to_string()),
            label: Some(label.to_string()),
            route: format!("category:{key}"),
        }
    }

    /// Ordering key within a term: type name, kind name, route string.
    pub fn sort_key(&self) -> (&'static str, &'static str, &str) {
        (
            self.route_type.as_str(),
            self.kind.map(EntityKind::as_str).unwrap_or(""),
            &self.route,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_route_json_shape() {
        let route = SearchRoute::category("sleep_circadian", "Sleep & Circadian");
        let json = serde_json::to_value(&route).unwrap();
        assert_eq!(json["type"], "category");
        assert_eq!(json["route"], "category:sleep_circadian");
        assert!(json.get("kind").is_none());
        assert!(json.get("slug").is_none());

        let route = SearchRoute::entity(EntityKind::Blend, "wolverine");
        let json = serde_json::to_value(&route).unwrap();
        assert_eq!(json["kind"], "blend");
        assert_eq!(json["route"], "blend:wolverine");
        assert!(json.get("taxonomy_key").is_none());
    }

    #[test]
    fn route_sort_key_orders_by_type_name_first() {
        let mut routes = vec![
            SearchRoute::entity(EntityKind::Peptide, "cjc-1295"),
            SearchRoute::category("cjc", "CJC"),
            SearchRoute::entity(EntityKind::Blend, "cjc-ipamorelin"),
        ];
        routes.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        let order: Vec<_> = routes.iter().map(|r| r.route.as_str()).collect();
        assert_eq!(order, ["category:cjc", "blend:cjc-ipamorelin", "peptide:cjc-1295"]);
    }

    #[test]
    fn blend_risk_fields_only_when_set() {
        let snapshot = RiskSnapshot {
            risk_score: 4,
            risk_tier: RiskTier::Moderate,
            severity: None,
            likelihood: Some(Likelihood::Possible),
            evidence_grade: None,
            developmental_risk: false,
            unknowns_penalty: false,
            computed_from_components: None,
            component_slugs: None,
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["risk_tier"], "moderate");
        assert!(json["severity"].is_null());
        assert!(json.get("component_slugs").is_none());
    }
}
