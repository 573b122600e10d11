//! Category Index: browse groups keyed by peptide taxonomy key.
//!
//! Blends join a group through a peptide-key → blend-key table, the one place
//! the two vocabularies are coupled.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, instrument};

use pepindex_artifacts::{
    ARTIFACT_VERSION, BlendEntity, CategoriesIndex, CategoryBlendItem, CategoryCounts,
    CategoryGroup, CategoryItems, CategoryMapping, CategoryPeptideItem, CategoryTotals,
    EntitiesIndex, PeptideEntity,
};
use pepindex_content::ContentStore;
use pepindex_shared::{PepIndexError, Result, StatusCategory};

/// Built-in peptide-category → blend-category table.
pub const DEFAULT_BLEND_MAPPING: &[(&str, &[&str])] = &[
    ("regenerative_repair", &["regenerative_blend"]),
    ("metabolic_weight", &["metabolic_weight_blend"]),
    ("endocrine_hormonal", &["gh_axis_blend"]),
    ("sexual_health_reproduction", &["sexual_health_blend"]),
    ("neurocognitive_mood", &["neurocognitive_blend"]),
    ("cosmetic_topical", &["cosmetic_blend"]),
    ("sleep_circadian", &[]),
    ("immunomodulatory_inflammation", &[]),
    ("antimicrobial_innate", &[]),
    ("mitochondrial_longevity", &[]),
    ("muscle_performance", &[]),
];

pub fn default_blend_mapping() -> BTreeMap<String, Vec<String>> {
    DEFAULT_BLEND_MAPPING
        .iter()
        .map(|(key, blends)| {
            (
                key.to_string(),
                blends.iter().map(|b| b.to_string()).collect(),
            )
        })
        .collect()
}

/// Build the category index. `mapping` overrides [`DEFAULT_BLEND_MAPPING`].
#[instrument(skip_all, fields(categories = store.peptide_categories.len()))]
pub fn build_categories(
    store: &ContentStore,
    entities: &EntitiesIndex,
    mapping: Option<&BTreeMap<String, Vec<String>>>,
) -> Result<CategoriesIndex> {
    let mapping = mapping.cloned().unwrap_or_else(default_blend_mapping);
    validate_mapping(store, &mapping)?;

    let mut groups = Vec::with_capacity(store.peptide_categories.len());
    for category in &store.peptide_categories {
        let mapped = mapping.get(&category.key).cloned().unwrap_or_default();
        let mapped_set: BTreeSet<&str> = mapped.iter().map(String::as_str).collect();

        let mut peptides: Vec<&PeptideEntity> = entities
            .peptides
            .iter()
            .filter(|p| p.taxonomy_keys.contains(&category.key))
            .collect();
        peptides.sort_by_cached_key(|p| {
            (
                StatusCategory::parse(&p.status_category).rank(),
                p.display_name.to_lowercase(),
                p.slug.clone(),
            )
        });

        let mut blends: Vec<&BlendEntity> = entities
            .blends
            .iter()
            .filter(|b| b.taxonomy_keys.iter().any(|k| mapped_set.contains(k.as_str())))
            .collect();
        blends.sort_by_cached_key(|b| (b.display_name.to_lowercase(), b.slug.clone()));

        debug!(
            key = %category.key,
            peptides = peptides.len(),
            blends = blends.len(),
            "category group"
        );

        groups.push(CategoryGroup {
            key: category.key.clone(),
            label: category.label.clone(),
            counts: CategoryCounts {
                peptides: peptides.len(),
                blends: blends.len(),
                total: peptides.len() + blends.len(),
            },
            mapped_blend_taxonomy_keys: mapped,
            items: CategoryItems {
                peptides: peptides.into_iter().map(peptide_item).collect(),
                blends: blends.into_iter().map(blend_item).collect(),
            },
        });
    }

    info!(categories = groups.len(), "category index built");

    Ok(CategoriesIndex {
        version: ARTIFACT_VERSION.to_string(),
        mapping: CategoryMapping {
            peptide_key_to_blend_keys: mapping,
        },
        counts: CategoryTotals {
            categories: groups.len(),
            peptide_classes: store.peptide_categories.len(),
        },
        categories: groups,
    })
}

fn validate_mapping(store: &ContentStore, mapping: &BTreeMap<String, Vec<String>>) -> Result<()> {
    let peptide_keys: BTreeSet<&str> = store.peptide_categories.iter().map(|c| c.key.as_str()).collect();
    let blend_keys: BTreeSet<&str> = store.blend_categories.iter().map(|c| c.key.as_str()).collect();

    let unknown: Vec<&str> = mapping
        .keys()
        .map(String::as_str)
        .filter(|k| !peptide_keys.contains(k))
        .collect();
    if !unknown.is_empty() {
        return Err(PepIndexError::integrity(format!(
            "category mapping references unknown peptide taxonomy keys: {}",
            unknown.join(", ")
        )));
    }

    let missing: BTreeSet<&str> = mapping
        .values()
        .flatten()
        .map(String::as_str)
        .filter(|k| !blend_keys.contains(k))
        .collect();
    if !missing.is_empty() {
        return Err(PepIndexError::integrity(format!(
            "category mapping references unknown blend taxonomy keys: {}",
            missing.into_iter().collect::<Vec<_>>().join(", ")
        )));
    }
    Ok(())
}

fn peptide_item(p: &PeptideEntity) -> CategoryPeptideItem {
    CategoryPeptideItem {
        kind: p.kind,
        slug: p.slug.clone(),
        display_name: p.display_name.clone(),
        status_category: p.status_category.clone(),
        taxonomy_keys: p.taxonomy_keys.clone(),
    }
}

fn blend_item(b: &BlendEntity) -> CategoryBlendItem {
    CategoryBlendItem {
        kind: b.kind,
        slug: b.slug.clone(),
        display_name: b.display_name.clone(),
        taxonomy_keys: b.taxonomy_keys.clone(),
        components: b.components.clone(),
        components_unresolved: b.components_unresolved.clone(),
    }
}
