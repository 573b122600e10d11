//! Controlled vocabularies: categories, interaction classes, search synonyms and
//! the safety-page registry.

use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;

use pepindex_shared::{PepIndexError, Result};

use crate::documents::{clean_list, non_empty};

// ---------------------------------------------------------------------------
// Category vocabularies
// ---------------------------------------------------------------------------

/// One `{key, label}` entry of a category vocabulary. Order is authoritative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryEntry {
    pub key: String,
    pub label: String,
}

#[derive(Deserialize)]
struct RawCategoryFile {
    peptide_classes: Option<Vec<RawCategory>>,
    blend_classes: Option<Vec<RawCategory>>,
}

#[derive(Deserialize)]
struct RawCategory {
    key: String,
    label: Option<String>,
}

/// Decode a category vocabulary stored under `array_field`
/// (`peptide_classes` or `blend_classes`).
pub fn decode_categories(path: &Path, content: &str, array_field: &str) -> Result<Vec<CategoryEntry>> {
    let raw: RawCategoryFile =
        serde_json::from_str(content).map_err(|e| PepIndexError::parse(path, e.to_string()))?;

    let classes = match array_field {
        "peptide_classes" => raw.peptide_classes,
        "blend_classes" => raw.blend_classes,
        other => {
            return Err(PepIndexError::validation(format!(
                "unknown category vocabulary field '{other}'"
            )));
        }
    }
    .ok_or_else(|| PepIndexError::parse(path, format!("missing '{array_field}' array")))?;

    let mut seen = BTreeSet::new();
    let mut out = Vec::with_capacity(classes.len());
    for (i, c) in classes.into_iter().enumerate() {
        let key = c.key.trim().to_string();
        if key.is_empty() {
            return Err(PepIndexError::parse(path, format!("{array_field}[{i}].key is empty")));
        }
        if !seen.insert(key.clone()) {
            return Err(PepIndexError::validation(format!(
                "{} has duplicate key '{key}'",
                path.display()
            )));
        }
        let label = non_empty(c.label.as_deref()).unwrap_or(&key).to_string();
        out.push(CategoryEntry { key, label });
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Interaction classes
// ---------------------------------------------------------------------------

/// Which of the two parallel interaction vocabularies a class belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InteractionVocabulary {
    Drug,
    Supplement,
}

/// A canonical interaction class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionClass {
    pub slug: String,
    pub title: String,
    pub alternate_names: Vec<String>,
    pub vocabulary: InteractionVocabulary,
}

/// Both interaction vocabularies, each in authored order.
#[derive(Debug, Clone, Default)]
pub struct InteractionTaxonomy {
    pub drug_classes: Vec<InteractionClass>,
    pub supplement_classes: Vec<InteractionClass>,
}

impl InteractionTaxonomy {
    /// All classes, drug vocabulary first.
    pub fn iter(&self) -> impl Iterator<Item = &InteractionClass> {
        self.drug_classes.iter().chain(self.supplement_classes.iter())
    }

    pub fn vocabulary(&self, vocab: InteractionVocabulary) -> &[InteractionClass] {
        match vocab {
            InteractionVocabulary::Drug => &self.drug_classes,
            InteractionVocabulary::Supplement => &self.supplement_classes,
        }
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.iter().any(|c| c.slug == slug)
    }
}

#[derive(Deserialize)]
struct RawInteractionFile {
    #[serde(default)]
    drug_classes: Vec<RawInteractionClass>,
    #[serde(default)]
    supplement_classes: Vec<RawInteractionClass>,
}

#[derive(Deserialize)]
struct RawInteractionClass {
    slug: String,
    title: Option<String>,
    aliases: Option<Vec<String>>,
    alternate_names: Option<Vec<String>>,
}

pub fn decode_interaction_taxonomy(path: &Path, content: &str) -> Result<InteractionTaxonomy> {
    let raw: RawInteractionFile =
        serde_json::from_str(content).map_err(|e| PepIndexError::parse(path, e.to_string()))?;

    let decode = |classes: Vec<RawInteractionClass>, vocabulary: InteractionVocabulary| {
        let mut seen = BTreeSet::new();
        let mut out = Vec::with_capacity(classes.len());
        for c in classes {
            let slug = c.slug.trim().to_string();
            if slug.is_empty() {
                return Err(PepIndexError::parse(path, "interaction class with empty slug"));
            }
            if !seen.insert(slug.clone()) {
                return Err(PepIndexError::validation(format!(
                    "interaction class '{slug}' appears twice in the {vocabulary:?} vocabulary"
                )));
            }
            let mut names = c.aliases.unwrap_or_default();
            names.extend(c.alternate_names.unwrap_or_default());
            out.push(InteractionClass {
                title: non_empty(c.title.as_deref()).unwrap_or(&slug).to_string(),
                alternate_names: clean_list(names),
                slug,
                vocabulary,
            });
        }
        Ok(out)
    };

    Ok(InteractionTaxonomy {
        drug_classes: decode(raw.drug_classes, InteractionVocabulary::Drug)?,
        supplement_classes: decode(raw.supplement_classes, InteractionVocabulary::Supplement)?,
    })
}

// ---------------------------------------------------------------------------
// Search synonyms
// ---------------------------------------------------------------------------

/// What a synonym row's targets refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SynonymScope {
    /// Peptide slugs.
    Entity,
    /// Blend slugs.
    Blend,
    /// Peptide category keys.
    Category,
}

impl SynonymScope {
    /// Provenance label recorded on search terms.
    pub fn source(self) -> &'static str {
        match self {
            Self::Entity => "synonyms:entity_synonyms",
            Self::Blend => "synonyms:blend_synonyms",
            Self::Category => "synonyms:category_synonyms",
        }
    }
}

/// One row of the synonyms table: a free-text term and its targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynonymRow {
    pub term: String,
    pub scope: SynonymScope,
    pub targets: Vec<String>,
}

#[derive(Deserialize)]
struct RawSynonymFile {
    #[serde(default)]
    entity_synonyms: Vec<RawEntitySynonym>,
    #[serde(default)]
    blend_synonyms: Vec<RawBlendSynonym>,
    #[serde(default)]
    category_synonyms: Vec<RawCategorySynonym>,
}

#[derive(Deserialize)]
struct RawEntitySynonym {
    term: Option<String>,
    slugs: Vec<String>,
}

#[derive(Deserialize)]
struct RawBlendSynonym {
    term: Option<String>,
    blend_slugs: Vec<String>,
}

#[derive(Deserialize)]
struct RawCategorySynonym {
    term: Option<String>,
    taxonomy_keys: Vec<String>,
}

/// Decode the synonyms table. Rows with an empty term are skipped.
pub fn decode_synonyms(path: &Path, content: &str) -> Result<Vec<SynonymRow>> {
    let raw: RawSynonymFile =
        serde_json::from_str(content).map_err(|e| PepIndexError::parse(path, e.to_string()))?;

    let rows = raw
        .entity_synonyms
        .into_iter()
        .map(|r| (r.term, SynonymScope::Entity, r.slugs))
        .chain(
            raw.blend_synonyms
                .into_iter()
                .map(|r| (r.term, SynonymScope::Blend, r.blend_slugs)),
        )
        .chain(
            raw.category_synonyms
                .into_iter()
                .map(|r| (r.term, SynonymScope::Category, r.taxonomy_keys)),
        )
        .filter_map(|(term, scope, targets)| {
            let term = non_empty(term.as_deref())?.to_string();
            Some(SynonymRow {
                term,
                scope,
                targets: clean_list(targets),
            })
        })
        .collect();

    Ok(rows)
}

// ---------------------------------------------------------------------------
// Safety registry
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct RawSafetyIndex {
    #[serde(default)]
    pages: Vec<RawSafetyPage>,
}

#[derive(Deserialize)]
struct RawSafetyPage {
    safety_id: String,
}

/// Decode `safety/_safety_index.json` into the set of known safety page ids.
pub fn decode_safety_registry(path: &Path, content: &str) -> Result<BTreeSet<String>> {
    let raw: RawSafetyIndex =
        serde_json::from_str(content).map_err(|e| PepIndexError::parse(path, e.to_string()))?;
    Ok(raw
        .pages
        .into_iter()
        .map(|p| p.safety_id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect())
}
