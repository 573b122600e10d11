//! Loading the content tree into an immutable [`ContentStore`].

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use pepindex_shared::{PepIndexError, Result};

use crate::documents::{self, BlendDoc, BlendRegistryEntry, Governance, PeptideDoc};
use crate::taxonomy::{self, CategoryEntry, InteractionTaxonomy, SynonymRow};

/// Well-known locations inside a content root.
#[derive(Debug, Clone)]
pub struct ContentPaths {
    pub root: PathBuf,
}

impl ContentPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn peptides_dir(&self) -> PathBuf {
        self.root.join("peptides")
    }

    pub fn blends_dir(&self) -> PathBuf {
        self.root.join("blends")
    }

    pub fn blend_registry(&self) -> PathBuf {
        self.blends_dir().join("_index.json")
    }

    pub fn governance(&self) -> PathBuf {
        self.root.join("_governance").join("coverage_checklist_v1.json")
    }

    pub fn peptide_categories(&self) -> PathBuf {
        self.taxonomy_dir().join("peptide_categories_v1.json")
    }

    pub fn blend_categories(&self) -> PathBuf {
        self.taxonomy_dir().join("blend_categories_v1.json")
    }

    pub fn interaction_classes(&self) -> PathBuf {
        self.taxonomy_dir().join("interaction_classes_v1.json")
    }

    pub fn search_synonyms(&self) -> PathBuf {
        self.taxonomy_dir().join("search_synonyms_v1.json")
    }

    pub fn safety_registry(&self) -> PathBuf {
        self.root.join("safety").join("_safety_index.json")
    }

    fn taxonomy_dir(&self) -> PathBuf {
        self.root.join("_taxonomy")
    }
}

/// Everything the builders read, decoded once per invocation.
#[derive(Debug, Clone)]
pub struct ContentStore {
    pub paths: ContentPaths,
    /// Peptide documents, ordered by slug.
    pub peptides: Vec<PeptideDoc>,
    /// Blend registry in authored order.
    pub blend_registry: Vec<BlendRegistryEntry>,
    /// Blend documents keyed by file stem.
    pub blend_docs: BTreeMap<String, BlendDoc>,
    pub governance: Governance,
    pub peptide_categories: Vec<CategoryEntry>,
    pub blend_categories: Vec<CategoryEntry>,
    pub interactions: InteractionTaxonomy,
    pub synonyms: Vec<SynonymRow>,
    /// Known safety page ids; `None` when the registry file is absent.
    pub safety_registry: Option<BTreeSet<String>>,
}

impl ContentStore {
    /// Read and decode the whole content tree under `root`.
    #[instrument(skip_all, fields(root = %root.as_ref().display()))]
    pub fn load(root: impl AsRef<Path>) -> Result<Self> {
        let paths = ContentPaths::new(root.as_ref());

        let mut peptides = Vec::new();
        for (slug, path) in list_documents(&paths.peptides_dir())? {
            let content = read(&path)?;
            peptides.push(documents::decode_peptide(&path, &slug, &content)?);
        }

        let registry_path = paths.blend_registry();
        let blend_registry =
            documents::decode_blend_registry(&registry_path, &read(&registry_path)?)?;

        let mut blend_docs = BTreeMap::new();
        for (slug, path) in list_documents(&paths.blends_dir())? {
            let content = read(&path)?;
            let doc = documents::decode_blend(&path, &slug, &content)?;
            blend_docs.insert(slug, doc);
        }

        let governance = match read_optional(&paths.governance())? {
            Some(content) => documents::decode_governance(&paths.governance(), &content)?,
            None => Governance::default(),
        };

        let peptide_categories = taxonomy::decode_categories(
            &paths.peptide_categories(),
            &read(&paths.peptide_categories())?,
            "peptide_classes",
        )?;
        let blend_categories = taxonomy::decode_categories(
            &paths.blend_categories(),
            &read(&paths.blend_categories())?,
            "blend_classes",
        )?;
        let interactions = taxonomy::decode_interaction_taxonomy(
            &paths.interaction_classes(),
            &read(&paths.interaction_classes())?,
        )?;
        let synonyms = taxonomy::decode_synonyms(
            &paths.search_synonyms(),
            &read(&paths.search_synonyms())?,
        )?;
        let safety_registry = read_optional(&paths.safety_registry())?
            .map(|content| taxonomy::decode_safety_registry(&paths.safety_registry(), &content))
            .transpose()?;

        info!(
            peptides = peptides.len(),
            blends = blend_registry.len(),
            blend_docs = blend_docs.len(),
            synonyms = synonyms.len(),
            "content store loaded"
        );

        Ok(Self {
            paths,
            peptides,
            blend_registry,
            blend_docs,
            governance,
            peptide_categories,
            blend_categories,
            interactions,
            synonyms,
            safety_registry,
        })
    }

    pub fn peptide(&self, slug: &str) -> Option<&PeptideDoc> {
        self.peptides
            .binary_search_by(|p| p.slug.as_str().cmp(slug))
            .ok()
            .map(|i| &self.peptides[i])
    }
}

/// `(stem, path)` for every `*.json` in `dir` not starting with `_`, sorted by stem.
fn list_documents(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let entries = fs::read_dir(dir).map_err(|e| PepIndexError::io(dir, e))?;

    let mut out = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| PepIndexError::io(dir, e))?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if stem.starts_with('_') {
            debug!(path = %path.display(), "skipping underscore file");
            continue;
        }
        out.push((stem.to_string(), path));
    }
    out.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(out)
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| PepIndexError::io(path, e))
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(PepIndexError::io(path, e)),
    }
}
