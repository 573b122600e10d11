//! Peptide, blend and governance documents.
//!
//! Raw serde shapes stay private; the `decode_*` functions turn them into the
//! typed records the builders consume. A field of the wrong type fails the whole
//! document. Nothing is coerced.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Deserialize;

use pepindex_shared::{EvidenceGrade, Likelihood, PepIndexError, Result, Severity};

// ---------------------------------------------------------------------------
// Interaction tokens
// ---------------------------------------------------------------------------

/// One declared interaction, decoded from either `"free text"` or `{"slug": ..}` / `{"name": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InteractionToken {
    /// Author declared a taxonomy slug.
    Slug(String),
    /// Free text naming a class, drug or supplement.
    Named(String),
}

impl InteractionToken {
    pub fn text(&self) -> &str {
        match self {
            Self::Slug(s) | Self::Named(s) => s,
        }
    }
}

/// The three buckets a peptide can declare interactions in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InteractionBucket {
    Drug,
    Supplement,
    Peptide,
}

impl InteractionBucket {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Drug => "drug",
            Self::Supplement => "supplement",
            Self::Peptide => "peptide",
        }
    }
}

/// A peptide's declared interactions, per bucket, in authored order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionDeclarations {
    pub drug: Vec<InteractionToken>,
    pub supplement: Vec<InteractionToken>,
    pub peptide: Vec<InteractionToken>,
}

impl InteractionDeclarations {
    pub fn buckets(&self) -> [(InteractionBucket, &[InteractionToken]); 3] {
        [
            (InteractionBucket::Drug, self.drug.as_slice()),
            (InteractionBucket::Supplement, self.supplement.as_slice()),
            (InteractionBucket::Peptide, self.peptide.as_slice()),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.drug.is_empty() && self.supplement.is_empty() && self.peptide.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Peptides
// ---------------------------------------------------------------------------

/// Authored risk rating of a single peptide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredRisk {
    /// 1–10.
    pub score: u8,
    pub severity: Option<Severity>,
    pub likelihood: Option<Likelihood>,
    pub evidence_grade: Option<EvidenceGrade>,
    pub developmental_risk: bool,
    pub unknowns_penalty: bool,
}

/// A decoded `peptides/<slug>.json` document.
#[derive(Debug, Clone)]
pub struct PeptideDoc {
    /// File stem; unique across peptides.
    pub slug: String,
    /// Canonical display name (falls back to the slug).
    pub canonical_name: String,
    pub short_name: Option<String>,
    pub aliases: Vec<String>,
    /// Raw status category string as authored (may be empty).
    pub status_category: String,
    pub entity_kind: Option<String>,
    /// Document-declared taxonomy keys (empty when the document declares none).
    pub taxonomy_keys: Vec<String>,
    pub appears_in_blends: Vec<String>,
    pub risk: DeclaredRisk,
    pub interactions: InteractionDeclarations,
    /// Path relative to the content root.
    pub source_path: String,
}

#[derive(Deserialize)]
struct RawPeptideFile {
    peptide: RawPeptide,
}

#[derive(Deserialize)]
struct RawPeptide {
    slug: Option<String>,
    canonical_name: Option<String>,
    short_name: Option<String>,
    aliases: Option<Vec<String>>,
    status: Option<RawStatus>,
    entity_kind: Option<String>,
    taxonomy_keys: Option<Vec<String>>,
    meta: Option<RawMeta>,
    risk: Option<RawRisk>,
    interactions: Option<RawInteractions>,
}

#[derive(Deserialize)]
struct RawStatus {
    category: Option<String>,
}

#[derive(Deserialize)]
struct RawMeta {
    taxonomy_keys: Option<Vec<String>>,
    appears_in_blends: Option<Vec<String>>,
    entity_kind: Option<String>,
}

#[derive(Deserialize)]
struct RawRisk {
    #[serde(alias = "current_score")]
    risk_score: Option<i64>,
    severity: Option<Severity>,
    likelihood: Option<Likelihood>,
    evidence_grade: Option<EvidenceGrade>,
    #[serde(default)]
    developmental_risk: bool,
    #[serde(default)]
    unknowns_penalty: bool,
}

#[derive(Deserialize)]
struct RawInteractions {
    drug_classes: Option<Vec<RawToken>>,
    supplement_classes: Option<Vec<RawToken>>,
    peptides: Option<Vec<RawToken>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawToken {
    Text(String),
    Object {
        slug: Option<String>,
        name: Option<String>,
    },
}

/// Decode one peptide document whose file stem is `slug`.
pub fn decode_peptide(path: &Path, slug: &str, content: &str) -> Result<PeptideDoc> {
    let raw: RawPeptideFile =
        serde_json::from_str(content).map_err(|e| PepIndexError::parse(path, e.to_string()))?;
    let pep = raw.peptide;

    if let Some(declared) = non_empty(pep.slug.as_deref()) {
        if declared != slug {
            return Err(PepIndexError::integrity(format!(
                "peptide document {} declares slug '{declared}' but its file stem is '{slug}'",
                path.display()
            )));
        }
    }

    let risk = pep
        .risk
        .ok_or_else(|| PepIndexError::parse(path, "missing peptide.risk block"))?;
    let score = risk
        .risk_score
        .ok_or_else(|| PepIndexError::parse(path, "missing peptide.risk.risk_score"))?;
    let score = u8::try_from(score)
        .ok()
        .filter(|s| (1..=10).contains(s))
        .ok_or_else(|| {
            PepIndexError::parse(path, format!("risk score must be an integer 1–10, got {score}"))
        })?;

    let meta = pep.meta;
    let mut taxonomy_keys = clean_list(pep.taxonomy_keys.unwrap_or_default());
    if taxonomy_keys.is_empty() {
        taxonomy_keys = clean_list(
            meta.as_ref()
                .and_then(|m| m.taxonomy_keys.clone())
                .unwrap_or_default(),
        );
    }
    let entity_kind = non_empty(pep.entity_kind.as_deref())
        .or_else(|| meta.as_ref().and_then(|m| non_empty(m.entity_kind.as_deref())))
        .map(str::to_string);
    let appears_in_blends = clean_list(
        meta.and_then(|m| m.appears_in_blends)
            .unwrap_or_default(),
    );

    let interactions = match pep.interactions {
        Some(raw) => InteractionDeclarations {
            drug: decode_tokens(path, raw.drug_classes)?,
            supplement: decode_tokens(path, raw.supplement_classes)?,
            peptide: decode_tokens(path, raw.peptides)?,
        },
        None => InteractionDeclarations::default(),
    };

    Ok(PeptideDoc {
        slug: slug.to_string(),
        canonical_name: non_empty(pep.canonical_name.as_deref())
            .unwrap_or(slug)
            .to_string(),
        short_name: non_empty(pep.short_name.as_deref()).map(str::to_string),
        aliases: clean_list(pep.aliases.unwrap_or_default()),
        status_category: pep
            .status
            .and_then(|s| s.category)
            .map(|c| c.trim().to_string())
            .unwrap_or_default(),
        entity_kind,
        taxonomy_keys,
        appears_in_blends,
        risk: DeclaredRisk {
            score,
            severity: risk.severity,
            likelihood: risk.likelihood,
            evidence_grade: risk.evidence_grade,
            developmental_risk: risk.developmental_risk,
            unknowns_penalty: risk.unknowns_penalty,
        },
        interactions,
        source_path: format!("peptides/{slug}.json"),
    })
}

fn decode_tokens(path: &Path, raw: Option<Vec<RawToken>>) -> Result<Vec<InteractionToken>> {
    let mut out = Vec::new();
    for token in raw.unwrap_or_default() {
        match token {
            RawToken::Text(text) => {
                if let Some(text) = non_empty(Some(text.as_str())) {
                    out.push(InteractionToken::Named(text.to_string()));
                }
            }
            RawToken::Object { slug, name } => {
                if let Some(slug) = non_empty(slug.as_deref()) {
                    out.push(InteractionToken::Slug(slug.to_string()));
                } else if let Some(name) = non_empty(name.as_deref()) {
                    out.push(InteractionToken::Named(name.to_string()));
                } else {
                    return Err(PepIndexError::parse(
                        path,
                        "interaction token object needs a non-empty 'slug' or 'name'",
                    ));
                }
            }
        }
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Blends
// ---------------------------------------------------------------------------

/// One entry of `blends/_index.json`, the canonical list of blends.
#[derive(Debug, Clone)]
pub struct BlendRegistryEntry {
    pub slug: String,
    pub display_name: Option<String>,
    pub taxonomy_keys: Vec<String>,
    pub components: Vec<String>,
    pub components_unresolved: Vec<String>,
}

/// A decoded `blends/<slug>.json` document.
#[derive(Debug, Clone)]
pub struct BlendDoc {
    pub slug: String,
    pub taxonomy_keys: Vec<String>,
    pub components: Vec<String>,
    pub components_unresolved: Vec<String>,
    pub evidence_count: usize,
    pub source_path: String,
}

#[derive(Deserialize)]
struct RawRegistry {
    blends: Vec<RawRegistryBlend>,
}

#[derive(Deserialize)]
struct RawRegistryBlend {
    slug: String,
    display_name: Option<String>,
    taxonomy_keys: Option<Vec<String>>,
    components: Option<Vec<String>>,
    components_unresolved: Option<Vec<String>>,
}

#[derive(Deserialize, Default)]
struct RawBlendBody {
    taxonomy_keys: Option<Vec<String>>,
    components: Option<Vec<String>>,
    components_unresolved: Option<Vec<String>>,
    evidence: Option<Vec<serde_json::Value>>,
}

#[derive(Deserialize)]
struct RawBlendFile {
    #[serde(flatten)]
    top: RawBlendBody,
    blend: Option<RawBlendBody>,
}

/// Decode the blends registry. Duplicate or empty slugs are rejected.
pub fn decode_blend_registry(path: &Path, content: &str) -> Result<Vec<BlendRegistryEntry>> {
    let raw: RawRegistry =
        serde_json::from_str(content).map_err(|e| PepIndexError::parse(path, e.to_string()))?;

    let mut seen = BTreeSet::new();
    let mut out = Vec::with_capacity(raw.blends.len());
    for b in raw.blends {
        let slug = b.slug.trim().to_string();
        if slug.is_empty() {
            return Err(PepIndexError::parse(path, "blend registry entry with empty 'slug'"));
        }
        if !seen.insert(slug.clone()) {
            return Err(PepIndexError::integrity(format!(
                "blend registry lists '{slug}' more than once"
            )));
        }
        out.push(BlendRegistryEntry {
            display_name: non_empty(b.display_name.as_deref()).map(str::to_string),
            taxonomy_keys: clean_list(b.taxonomy_keys.unwrap_or_default()),
            components: clean_list(b.components.unwrap_or_default()),
            components_unresolved: clean_list(b.components_unresolved.unwrap_or_default()),
            slug,
        });
    }
    Ok(out)
}

/// Decode one blend document. Top-level fields win over a nested `blend` object.
pub fn decode_blend(path: &Path, slug: &str, content: &str) -> Result<BlendDoc> {
    let raw: RawBlendFile =
        serde_json::from_str(content).map_err(|e| PepIndexError::parse(path, e.to_string()))?;
    let nested = raw.blend.unwrap_or_default();
    let top = raw.top;

    let evidence = top.evidence.or(nested.evidence).unwrap_or_default();

    Ok(BlendDoc {
        slug: slug.to_string(),
        taxonomy_keys: clean_list(top.taxonomy_keys.or(nested.taxonomy_keys).unwrap_or_default()),
        components: clean_list(top.components.or(nested.components).unwrap_or_default()),
        components_unresolved: clean_list(
            top.components_unresolved
                .or(nested.components_unresolved)
                .unwrap_or_default(),
        ),
        evidence_count: evidence.iter().filter(|e| e.is_object()).count(),
        source_path: format!("blends/{slug}.json"),
    })
}

// ---------------------------------------------------------------------------
// Governance
// ---------------------------------------------------------------------------

/// Fallback taxonomy keys from the coverage checklist.
#[derive(Debug, Clone, Default)]
pub struct Governance {
    pub peptides: BTreeMap<String, Vec<String>>,
    pub blends: BTreeMap<String, Vec<String>>,
}

impl Governance {
    pub fn peptide_keys(&self, slug: &str) -> &[String] {
        self.peptides.get(slug).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn blend_keys(&self, slug: &str) -> &[String] {
        self.blends.get(slug).map(Vec::as_slice).unwrap_or_default()
    }
}

#[derive(Deserialize)]
struct RawGovernance {
    #[serde(default)]
    peptides: Vec<RawGovernanceEntry>,
    #[serde(default)]
    blends: Vec<RawGovernanceEntry>,
}

#[derive(Deserialize)]
struct RawGovernanceEntry {
    slug: String,
    #[serde(default)]
    taxonomy_keys: Vec<String>,
}

pub fn decode_governance(path: &Path, content: &str) -> Result<Governance> {
    let raw: RawGovernance =
        serde_json::from_str(content).map_err(|e| PepIndexError::parse(path, e.to_string()))?;

    let collect = |entries: Vec<RawGovernanceEntry>| {
        entries
            .into_iter()
            .filter(|e| !e.slug.trim().is_empty())
            .map(|e| (e.slug.trim().to_string(), clean_list(e.taxonomy_keys)))
            .collect::<BTreeMap<_, _>>()
    };

    Ok(Governance {
        peptides: collect(raw.peptides),
        blends: collect(raw.blends),
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Trim entries, drop empties and repeats, keep first-seen order.
pub(crate) fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .collect()
}

pub(crate) fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}
