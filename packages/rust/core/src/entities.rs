//! Entity Index: the canonical roster of peptides and blends.
//!
//! This is the only place taxonomy-key precedence is decided. Downstream
//! builders read the keys off the records produced here.

use std::collections::BTreeSet;

use tracing::{debug, info, instrument, warn};

use pepindex_artifacts::{ARTIFACT_VERSION, BlendEntity, EntitiesIndex, EntityCounts, PeptideEntity};
use pepindex_content::{BlendRegistryEntry, CategoryEntry, ContentStore, PeptideDoc};
use pepindex_shared::{EntityKind, PepIndexError, Result};

const DEFAULT_ENTITY_KIND: &str = "peptide";

#[instrument(skip_all, fields(peptides = store.peptides.len(), blends = store.blend_registry.len()))]
pub fn build_entities(store: &ContentStore) -> Result<EntitiesIndex> {
    let peptide_vocab = vocab_keys(&store.peptide_categories);
    let blend_vocab = vocab_keys(&store.blend_categories);

    let mut peptides = store
        .peptides
        .iter()
        .map(|doc| peptide_entity(store, doc, &peptide_vocab))
        .collect::<Result<Vec<_>>>()?;
    peptides.sort_by(|a, b| a.slug.cmp(&b.slug));

    let peptide_slugs: BTreeSet<&str> = peptides.iter().map(|p| p.slug.as_str()).collect();
    let mut blends = store
        .blend_registry
        .iter()
        .map(|entry| blend_entity(store, entry, &blend_vocab, &peptide_slugs))
        .collect::<Result<Vec<_>>>()?;
    blends.sort_by(|a, b| a.slug.cmp(&b.slug));

    let blend_slugs: BTreeSet<String> = blends.iter().map(|b| b.slug.clone()).collect();
    for PeptideEntity { slug: owner, appears_in_blends, .. } in &mut peptides {
        appears_in_blends.retain(|slug| {
            let known = blend_slugs.contains(slug);
            if !known {
                warn!(peptide = %owner, blend = %slug, "dropping unknown appears_in_blends entry");
            }
            known
        });
    }

    let counts = EntityCounts {
        peptides: peptides.len(),
        blends: blends.len(),
        total: peptides.len() + blends.len(),
    };
    info!(peptides = counts.peptides, blends = counts.blends, "entity index built");

    Ok(EntitiesIndex {
        version: ARTIFACT_VERSION.to_string(),
        counts,
        peptides,
        blends,
    })
}

fn peptide_entity(
    store: &ContentStore,
    doc: &PeptideDoc,
    vocab: &BTreeSet<&str>,
) -> Result<PeptideEntity> {
    let taxonomy_keys = if doc.taxonomy_keys.is_empty() {
        let fallback = store.governance.peptide_keys(&doc.slug).to_vec();
        if !fallback.is_empty() {
            debug!(slug = %doc.slug, "peptide taxonomy keys from governance");
        }
        fallback
    } else {
        doc.taxonomy_keys.clone()
    };
    check_keys(EntityKind::Peptide, &doc.slug, &taxonomy_keys, vocab)?;

    Ok(PeptideEntity {
        kind: EntityKind::Peptide,
        slug: doc.slug.clone(),
        display_name: doc.canonical_name.clone(),
        short_name: doc.short_name.clone(),
        aliases: doc.aliases.clone(),
        status_category: doc.status_category.clone(),
        entity_kind: doc
            .entity_kind
            .clone()
            .unwrap_or_else(|| DEFAULT_ENTITY_KIND.to_string()),
        taxonomy_keys,
        appears_in_blends: doc.appears_in_blends.clone(),
        source_path: doc.source_path.clone(),
    })
}

fn blend_entity(
    store: &ContentStore,
    entry: &BlendRegistryEntry,
    vocab: &BTreeSet<&str>,
    peptide_slugs: &BTreeSet<&str>,
) -> Result<BlendEntity> {
    let slug = &entry.slug;
    let doc = store.blend_docs.get(slug).ok_or_else(|| {
        PepIndexError::integrity(format!(
            "blend registry entry '{slug}' has no document blends/{slug}.json"
        ))
    })?;

    // document > registry > governance
    let taxonomy_keys = [
        doc.taxonomy_keys.as_slice(),
        entry.taxonomy_keys.as_slice(),
        store.governance.blend_keys(slug),
    ]
    .into_iter()
    .find(|keys| !keys.is_empty())
    .unwrap_or_default()
    .to_vec();
    check_keys(EntityKind::Blend, slug, &taxonomy_keys, vocab)?;

    let components = if doc.components.is_empty() {
        entry.components.clone()
    } else {
        doc.components.clone()
    };
    if let Some(unknown) = components.iter().find(|c| !peptide_slugs.contains(c.as_str())) {
        return Err(PepIndexError::integrity(format!(
            "blend '{slug}' lists unknown component peptide '{unknown}'"
        )));
    }

    let unresolved_source = if doc.components_unresolved.is_empty() {
        &entry.components_unresolved
    } else {
        &doc.components_unresolved
    };
    let components_unresolved: Vec<String> = unresolved_source
        .iter()
        .filter(|name| !components.contains(*name))
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    Ok(BlendEntity {
        kind: EntityKind::Blend,
        slug: slug.clone(),
        display_name: entry.display_name.clone().unwrap_or_else(|| slug.clone()),
        taxonomy_keys,
        components,
        components_unresolved,
        evidence_count: doc.evidence_count,
        source_path: doc.source_path.clone(),
    })
}

fn vocab_keys(entries: &[CategoryEntry]) -> BTreeSet<&str> {
    entries.iter().map(|c| c.key.as_str()).collect()
}

fn check_keys(kind: EntityKind, slug: &str, keys: &[String], vocab: &BTreeSet<&str>) -> Result<()> {
    match keys.iter().find(|k| !vocab.contains(k.as_str())) {
        Some(unknown) => Err(PepIndexError::integrity(format!(
            "{kind} '{slug}' uses unknown taxonomy key '{unknown}'"
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{blend_doc, fixture_store, registry_entry};

    #[test]
    fn roster_is_sorted_and_counted() {
        let index = build_entities(&fixture_store()).unwrap();
        let slugs: Vec<_> = index.peptides.iter().map(|p| p.slug.as_str()).collect();
        let mut sorted = slugs.clone();
        sorted.sort();
        assert_eq!(slugs, sorted);
        assert_eq!(index.counts.total, index.peptides.len() + index.blends.len());
        assert_eq!(index.version, "v1");
    }

    #[test]
    fn peptide_keys_fall_back_to_governance() {
        let mut store = fixture_store();
        let dsip = store.peptides.iter_mut().find(|p| p.slug == "dsip").unwrap();
        dsip.taxonomy_keys.clear();
        store
            .governance
            .peptides
            .insert("dsip".into(), vec!["neurocognitive_mood".into()]);

        let index = build_entities(&store).unwrap();
        let dsip = index.peptides.iter().find(|p| p.slug == "dsip").unwrap();
        assert_eq!(dsip.taxonomy_keys, vec!["neurocognitive_mood"]);
        assert_eq!(dsip.entity_kind, "peptide");
    }

    #[test]
    fn blend_keys_prefer_document() {
        let mut store = fixture_store();
        let mut doc = blend_doc("wolverine", &["bpc-157", "tb-500"]);
        doc.taxonomy_keys = vec!["cosmetic_blend".into()];
        store.blend_docs.insert("wolverine".into(), doc);

        let index = build_entities(&store).unwrap();
        let wolverine = index.blends.iter().find(|b| b.slug == "wolverine").unwrap();
        assert_eq!(wolverine.taxonomy_keys, vec!["cosmetic_blend"]);
    }

    #[test]
    fn unresolved_components_are_deduped_and_exclude_resolved() {
        let mut store = fixture_store();
        let mut entry = registry_entry("stack", "Stack", &["bpc-157"], &[]);
        entry.components_unresolved = vec!["Zinc".into(), "bpc-157".into(), "Arginine".into()];
        store.blend_registry.push(entry);
        store.blend_docs.insert("stack".into(), blend_doc("stack", &[]));

        let index = build_entities(&store).unwrap();
        let stack = index.blends.iter().find(|b| b.slug == "stack").unwrap();
        assert_eq!(stack.components, vec!["bpc-157"]);
        assert_eq!(stack.components_unresolved, vec!["Arginine", "Zinc"]);
    }

    #[test]
    fn registry_entry_without_document_is_fatal() {
        let mut store = fixture_store();
        store.blend_docs.remove("wolverine");
        let err = build_entities(&store).unwrap_err();
        assert!(matches!(err, PepIndexError::Integrity { .. }));
        assert!(err.to_string().contains("wolverine"));
    }

    #[test]
    fn unknown_taxonomy_key_is_fatal() {
        let mut store = fixture_store();
        store.peptides[0].taxonomy_keys = vec!["not_a_category".into()];
        let err = build_entities(&store).unwrap_err();
        assert!(err.to_string().contains("not_a_category"));
    }

    #[test]
    fn unknown_component_is_fatal() {
        let mut store = fixture_store();
        store
            .blend_docs
            .insert("wolverine".into(), blend_doc("wolverine", &["bpc-157", "ghost"]));
        let err = build_entities(&store).unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn unknown_appears_in_blends_entries_are_dropped() {
        let mut store = fixture_store();
        store.peptides[0].appears_in_blends = vec!["wolverine".into(), "retired-blend".into()];
        let slug = store.peptides[0].slug.clone();

        let index = build_entities(&store).unwrap();
        let peptide = index.peptides.iter().find(|p| p.slug == slug).unwrap();
        assert_eq!(peptide.appears_in_blends, vec!["wolverine"]);
    }
}
