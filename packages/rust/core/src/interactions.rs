//! Interactions Reverse Index: interaction class → peptides declaring it.
//!
//! Declared tokens are canonicalized against the interaction taxonomy in three
//! passes: exact slug, normalized title or alternate name, then slugified form.
//! Tokens that match nothing are dropped and counted. Their text never becomes
//! a key.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, instrument, warn};

use pepindex_artifacts::{
    EntitiesIndex, INTERACTIONS_SCHEMA_VERSION, InteractionPeptide, InteractionStats,
    InteractionsIndex,
};
use pepindex_content::{
    ContentStore, InteractionBucket, InteractionClass, InteractionTaxonomy, InteractionToken,
};
use pepindex_shared::{PepIndexError, Result, normalize, slugify};

/// Lookup tables over one list of interaction classes. Earlier classes win
/// when two classes share a name.
#[derive(Debug, Default)]
pub struct Canonicalizer {
    by_slug: BTreeMap<String, String>,
    by_name: BTreeMap<String, String>,
    by_slugified: BTreeMap<String, String>,
}

impl Canonicalizer {
    pub fn new<'a>(classes: impl IntoIterator<Item = &'a InteractionClass>) -> Self {
        let mut this = Self::default();
        for class in classes {
            let slug = &class.slug;
            this.by_slug.entry(slug.clone()).or_insert_with(|| slug.clone());

            for name in std::iter::once(&class.title).chain(&class.alternate_names) {
                let key = normalize(name);
                if !key.is_empty() {
                    this.by_name.entry(key).or_insert_with(|| slug.clone());
                }
            }

            for text in [slug, &class.title].into_iter().chain(&class.alternate_names) {
                let key = slugify(text);
                if !key.is_empty() {
                    this.by_slugified.entry(key).or_insert_with(|| slug.clone());
                }
            }
        }
        this
    }

    /// Canonical slug for `token`, if any pass matches.
    pub fn resolve(&self, token: &InteractionToken) -> Option<&str> {
        let text = token.text().trim();
        if let Some(slug) = self.by_slug.get(text) {
            return Some(slug.as_str());
        }
        if let InteractionToken::Named(name) = token {
            if let Some(slug) = self.by_name.get(&normalize(name)) {
                return Some(slug.as_str());
            }
        }
        self.by_slugified.get(&slugify(text)).map(String::as_str)
    }
}

/// One canonicalizer per bucket.
struct BucketVocabularies {
    drug: Canonicalizer,
    supplement: Canonicalizer,
    peptide: Canonicalizer,
}

impl BucketVocabularies {
    fn new(taxonomy: &InteractionTaxonomy) -> Self {
        Self {
            drug: Canonicalizer::new(&taxonomy.drug_classes),
            supplement: Canonicalizer::new(&taxonomy.supplement_classes),
            // the peptide bucket may name either kind of class
            peptide: Canonicalizer::new(taxonomy.iter()),
        }
    }

    fn for_bucket(&self, bucket: InteractionBucket) -> &Canonicalizer {
        match bucket {
            InteractionBucket::Drug => &self.drug,
            InteractionBucket::Supplement => &self.supplement,
            InteractionBucket::Peptide => &self.peptide,
        }
    }
}

#[instrument(skip_all, fields(peptides = entities.peptides.len()))]
pub fn build_interactions(store: &ContentStore, entities: &EntitiesIndex) -> Result<InteractionsIndex> {
    let vocabularies = BucketVocabularies::new(&store.interactions);

    let mut pairs: BTreeMap<String, BTreeSet<InteractionPeptide>> = BTreeMap::new();
    let mut stats = InteractionStats {
        peptides_total: entities.peptides.len(),
        ..InteractionStats::default()
    };
    let mut dropped: Vec<String> = Vec::new();

    for peptide in &entities.peptides {
        let doc = store.peptide(&peptide.slug).ok_or_else(|| {
            PepIndexError::integrity(format!(
                "interactions index: no peptide document for '{}'",
                peptide.slug
            ))
        })?;

        let mut resolved_any = false;
        for (bucket, tokens) in doc.interactions.buckets() {
            let canonicalizer = vocabularies.for_bucket(bucket);
            for token in tokens {
                match bucket {
                    InteractionBucket::Drug => stats.drug_items_total += 1,
                    InteractionBucket::Supplement => stats.supp_items_total += 1,
                    InteractionBucket::Peptide => stats.peptide_items_total += 1,
                }

                match canonicalizer.resolve(token) {
                    Some(class) => {
                        debug!(peptide = %peptide.slug, token = token.text(), %class, "resolved interaction");
                        resolved_any = true;
                        pairs.entry(class.to_string()).or_default().insert(InteractionPeptide {
                            peptide_slug: peptide.slug.clone(),
                            peptide_name: peptide.display_name.clone(),
                        });
                    }
                    None => {
                        stats.unresolved_total += 1;
                        match bucket {
                            InteractionBucket::Drug => stats.unresolved_drug += 1,
                            InteractionBucket::Supplement => stats.unresolved_supplement += 1,
                            InteractionBucket::Peptide => stats.unresolved_peptide += 1,
                        }
                        dropped.push(format!(
                            "{}:{}:{}",
                            peptide.slug,
                            bucket.as_str(),
                            token.text()
                        ));
                    }
                }
            }
        }
        if resolved_any {
            stats.peptides_with_any_interactions += 1;
        }
    }

    if !dropped.is_empty() {
        warn!(
            count = dropped.len(),
            tokens = %dropped.join(", "),
            "dropped unresolvable interaction tokens"
        );
    }

    let mapping: BTreeMap<String, Vec<InteractionPeptide>> = pairs
        .into_iter()
        .map(|(class, peptides)| {
            let mut list: Vec<InteractionPeptide> = peptides.into_iter().collect();
            list.sort_by(|a, b| {
                (a.peptide_name.as_str(), a.peptide_slug.as_str())
                    .cmp(&(b.peptide_name.as_str(), b.peptide_slug.as_str()))
            });
            (class, list)
        })
        .collect();

    info!(
        classes = mapping.len(),
        with_interactions = stats.peptides_with_any_interactions,
        unresolved = stats.unresolved_total,
        "interactions index built"
    );

    Ok(InteractionsIndex {
        schema_version: INTERACTIONS_SCHEMA_VERSION.to_string(),
        stats,
        mapping,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::build_entities;
    use crate::test_support::{fixture_store, peptide};

    fn build(store: &ContentStore) -> InteractionsIndex {
        let entities = build_entities(store).unwrap();
        build_interactions(store, &entities).unwrap()
    }

    fn canonicalizer() -> Canonicalizer {
        Canonicalizer::new(fixture_store().interactions.iter())
    }

    #[test]
    fn exact_slug_then_name_then_slugified() {
        let c = canonicalizer();
        assert_eq!(c.resolve(&InteractionToken::Slug("anticoagulants".into())), Some("anticoagulants"));
        assert_eq!(c.resolve(&InteractionToken::Named("Blood  Thinners".into())), Some("anticoagulants"));
        assert_eq!(c.resolve(&InteractionToken::Named("FISH OIL".into())), Some("fish_oil"));
        assert_eq!(c.resolve(&InteractionToken::Slug("Fish-Oil".into())), Some("fish_oil"));
        assert_eq!(c.resolve(&InteractionToken::Named("grapefruit".into())), None);
    }

    #[test]
    fn keys_are_canonical_slugs_only() {
        let store = fixture_store();
        let index = build(&store);
        for key in index.mapping.keys() {
            assert!(store.interactions.contains(key), "{key} is not a taxonomy slug");
        }
        assert!(!index.mapping.contains_key("moon dust"));
        assert_eq!(index.schema_version, "interactions_to_peptides_v1");
    }

    #[test]
    fn unresolved_tokens_are_counted_not_raised() {
        let index = build(&fixture_store());
        assert_eq!(index.stats.unresolved_total, 1);
        assert_eq!(index.stats.unresolved_supplement, 1);
        assert_eq!(index.stats.drug_items_total, 2);
        assert_eq!(index.stats.supp_items_total, 2);
        // bremelanotide still counts: one of its tokens resolved
        assert_eq!(index.stats.peptides_with_any_interactions, 3);
        assert_eq!(index.stats.peptides_total, 6);
    }

    #[test]
    fn supplement_bucket_does_not_match_drug_classes() {
        let mut store = fixture_store();
        store.peptides[0].interactions.supplement = vec![InteractionToken::Named("anticoagulants".into())];
        let index = build(&store);
        assert_eq!(index.stats.unresolved_supplement, 2);
    }

    #[test]
    fn peptide_bucket_matches_either_vocabulary() {
        let mut store = fixture_store();
        store.peptides[0].interactions.peptide = vec![
            InteractionToken::Named("omega 3".into()),
            InteractionToken::Slug("antihypertensives".into()),
        ];
        let index = build(&store);
        assert_eq!(index.stats.unresolved_peptide, 0);
        assert_eq!(index.stats.peptide_items_total, 2);
    }

    #[test]
    fn lists_are_deduped_and_sorted_by_name() {
        let mut store = fixture_store();
        let mut extra = peptide("aod-9604", "AOD-9604", "preclinical", 3, &["metabolic_weight"]);
        extra.interactions.drug = vec![
            InteractionToken::Slug("anticoagulants".into()),
            InteractionToken::Named("blood thinners".into()),
        ];
        store.peptides.push(extra);
        store.peptides.sort_by(|a, b| a.slug.cmp(&b.slug));

        let index = build(&store);
        let list = &index.mapping["anticoagulants"];
        let slugs: Vec<_> = list.iter().map(|p| p.peptide_slug.as_str()).collect();
        assert_eq!(slugs, ["aod-9604", "bpc-157"]);
    }
}
