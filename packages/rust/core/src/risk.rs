//! Risk Index: per-entity risk snapshots and safety links.
//!
//! Peptide ratings are copied as authored. Blend ratings are derived from the
//! components and never authored.

use std::collections::BTreeSet;

use tracing::{debug, info, instrument};

use pepindex_artifacts::{
    ARTIFACT_VERSION, EntitiesIndex, RiskCounts, RiskEntry, RiskIndex, RiskSnapshot,
};
use pepindex_content::{ContentStore, DeclaredRisk, PeptideDoc};
use pepindex_shared::{
    EntityKind, EvidenceGrade, Likelihood, PepIndexError, Result, RiskTier, Severity,
};

/// Score given to a blend with no resolved components.
pub const EMPTY_BLEND_SCORE: u8 = 5;

/// Components at or above this score count as high-risk when stacking.
const HIGH_COMPONENT_SCORE: u8 = 6;

pub const SAFETY_ADOLESCENTS_DEVELOPMENT: &str = "safety_adolescents_development";
pub const SAFETY_ENDOCRINE_AXES: &str = "safety_endocrine_axes";
pub const SAFETY_INTERACTIONS: &str = "safety_interactions";
pub const SAFETY_EVIDENCE_GRADES: &str = "safety_evidence_grades";
pub const SAFETY_RISK_SCORING: &str = "safety_risk_scoring";

/// Coarsen a score into a tier, applying the escalation rules first.
pub fn risk_tier(
    score: u8,
    severity: Option<Severity>,
    developmental_risk: bool,
    unknowns_penalty: bool,
) -> RiskTier {
    if matches!(severity, Some(Severity::High | Severity::Critical)) {
        return RiskTier::High;
    }
    if (developmental_risk || unknowns_penalty) && score >= 6 {
        return RiskTier::High;
    }
    match score {
        0..=3 => RiskTier::Low,
        4..=6 => RiskTier::Moderate,
        _ => RiskTier::High,
    }
}

/// Conservative aggregate of a blend's component ratings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlendRisk {
    pub score: u8,
    pub severity: Option<Severity>,
    pub likelihood: Option<Likelihood>,
    pub evidence_grade: Option<EvidenceGrade>,
    pub developmental_risk: bool,
    pub unknowns_penalty: bool,
}

/// Aggregate component ratings: max score (+1 when two or more components are
/// high-risk, capped at 10), worst severity and likelihood, weakest evidence,
/// OR'd flags.
pub fn aggregate_blend(components: &[&DeclaredRisk]) -> BlendRisk {
    let Some(base) = components.iter().map(|r| r.score).max() else {
        return BlendRisk {
            score: EMPTY_BLEND_SCORE,
            severity: None,
            likelihood: None,
            evidence_grade: None,
            developmental_risk: false,
            unknowns_penalty: false,
        };
    };

    let high = components
        .iter()
        .filter(|r| r.score >= HIGH_COMPONENT_SCORE)
        .count();
    let score = if high >= 2 { (base + 1).min(10) } else { base };

    BlendRisk {
        score,
        severity: components.iter().filter_map(|r| r.severity).max(),
        likelihood: components.iter().filter_map(|r| r.likelihood).max(),
        evidence_grade: components.iter().filter_map(|r| r.evidence_grade).min(),
        developmental_risk: components.iter().any(|r| r.developmental_risk),
        unknowns_penalty: components.iter().any(|r| r.unknowns_penalty),
    }
}

/// Safety page ids for a set of flags, in fixed order, without duplicates.
pub fn safety_links(
    developmental_risk: bool,
    unknowns_penalty: bool,
    has_interactions: bool,
) -> Vec<&'static str> {
    let mut links = Vec::new();
    if developmental_risk {
        links.push(SAFETY_ADOLESCENTS_DEVELOPMENT);
        links.push(SAFETY_ENDOCRINE_AXES);
    }
    if has_interactions {
        links.push(SAFETY_INTERACTIONS);
    }
    if unknowns_penalty {
        links.push(SAFETY_EVIDENCE_GRADES);
    }
    links.push(SAFETY_RISK_SCORING);

    let mut seen = BTreeSet::new();
    links.retain(|l| seen.insert(*l));
    links
}

/// Keep only links present in the registry. An absent or empty registry keeps all.
fn filter_links(links: Vec<&'static str>, registry: Option<&BTreeSet<String>>) -> Vec<String> {
    links
        .into_iter()
        .filter(|l| match registry {
            Some(known) if !known.is_empty() => known.contains(*l),
            _ => true,
        })
        .map(str::to_string)
        .collect()
}

fn declares_interactions(doc: &PeptideDoc) -> bool {
    !doc.interactions.is_empty()
}

#[instrument(skip_all, fields(peptides = entities.peptides.len(), blends = entities.blends.len()))]
pub fn build_risk(store: &ContentStore, entities: &EntitiesIndex) -> Result<RiskIndex> {
    let registry = store.safety_registry.as_ref();
    let lookup = |slug: &str| {
        store.peptide(slug).ok_or_else(|| {
            PepIndexError::integrity(format!("risk index: no peptide document for '{slug}'"))
        })
    };

    let mut entries = Vec::with_capacity(entities.counts.total);

    for peptide in &entities.peptides {
        let doc = lookup(peptide.slug.as_str())?;
        let r = &doc.risk;
        let links = safety_links(r.developmental_risk, r.unknowns_penalty, declares_interactions(doc));

        entries.push(RiskEntry {
            route: peptide.route(),
            kind: EntityKind::Peptide,
            slug: peptide.slug.clone(),
            risk: RiskSnapshot {
                risk_score: r.score,
                risk_tier: risk_tier(r.score, r.severity, r.developmental_risk, r.unknowns_penalty),
                severity: r.severity,
                likelihood: r.likelihood,
                evidence_grade: r.evidence_grade,
                developmental_risk: r.developmental_risk,
                unknowns_penalty: r.unknowns_penalty,
                computed_from_components: None,
                component_slugs: None,
            },
            safety_links: filter_links(links, registry),
        });
    }

    for blend in &entities.blends {
        let docs = blend
            .components
            .iter()
            .map(|c| lookup(c.as_str()))
            .collect::<Result<Vec<_>>>()?;
        let ratings: Vec<&DeclaredRisk> = docs.iter().map(|d| &d.risk).collect();
        let agg = aggregate_blend(&ratings);
        let has_interactions = docs.iter().any(|d| declares_interactions(d));

        if blend.components.is_empty() {
            debug!(slug = %blend.slug, "blend has no resolved components, using default score");
        }

        let links = safety_links(agg.developmental_risk, agg.unknowns_penalty, has_interactions);
        entries.push(RiskEntry {
            route: blend.route(),
            kind: EntityKind::Blend,
            slug: blend.slug.clone(),
            risk: RiskSnapshot {
                risk_score: agg.score,
                risk_tier: risk_tier(agg.score, agg.severity, agg.developmental_risk, agg.unknowns_penalty),
                severity: agg.severity,
                likelihood: agg.likelihood,
                evidence_grade: agg.evidence_grade,
                developmental_risk: agg.developmental_risk,
                unknowns_penalty: agg.unknowns_penalty,
                computed_from_components: Some(true),
                component_slugs: Some(blend.components.clone()),
            },
            safety_links: filter_links(links, registry),
        });
    }

    let counts = RiskCounts {
        entities: entries.len(),
        peptides: entities.peptides.len(),
        blends: entities.blends.len(),
    };
    info!(entities = counts.entities, "risk index built");

    Ok(RiskIndex {
        version: ARTIFACT_VERSION.to_string(),
        counts,
        entities: entries,
    })
}
