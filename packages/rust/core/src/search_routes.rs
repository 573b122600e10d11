//! Search Routes Index: normalized term → typed routes.
//!
//! Terms are merged additively from entity slugs, names and aliases, category
//! keys and labels, and the synonyms table. A synonym that names an unknown
//! slug or key fails the build.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{info, instrument, warn};

use pepindex_artifacts::{
    ARTIFACT_VERSION, EntitiesIndex, SearchCounts, SearchRoute, SearchRoutesIndex, SearchTerm,
};
use pepindex_content::{ContentStore, SynonymRow, SynonymScope};
use pepindex_shared::{EntityKind, PepIndexError, Result, normalize};

pub const SOURCE_SLUG: &str = "slug";
pub const SOURCE_PEPTIDE_NAME: &str = "peptide:canonical_name";
pub const SOURCE_PEPTIDE_SHORT_NAME: &str = "peptide:short_name";
pub const SOURCE_PEPTIDE_ALIASES: &str = "peptide:aliases";
pub const SOURCE_BLEND_NAME: &str = "blend_registry:display_name";
pub const SOURCE_CATEGORY_KEY: &str = "category:key";
pub const SOURCE_CATEGORY_LABEL: &str = "category:label";

/// Strict fast-path state of one term.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Direct {
    Unset,
    Route(String),
    Conflict,
}

#[derive(Debug)]
struct TermBuilder {
    /// Keyed by route string.
    routes: BTreeMap<String, SearchRoute>,
    sources: BTreeSet<String>,
    direct: Direct,
}

impl Default for TermBuilder {
    fn default() -> Self {
        Self {
            routes: BTreeMap::new(),
            sources: BTreeSet::new(),
            direct: Direct::Unset,
        }
    }
}

#[derive(Debug, Default)]
struct TermMap {
    terms: BTreeMap<String, TermBuilder>,
}

impl TermMap {
    /// Add `route` under the normalized form of `raw`. Returns the term, or
    /// `None` when it normalizes to nothing.
    fn add(&mut self, raw: &str, route: SearchRoute, source: &str) -> Option<String> {
        let term = normalize(raw);
        if term.is_empty() {
            return None;
        }
        let entry = self.terms.entry(term.clone()).or_default();
        entry.routes.entry(route.route.clone()).or_insert(route);
        entry.sources.insert(source.to_string());
        Some(term)
    }

    fn claim_direct(&mut self, term: &str, route: &str) {
        let Some(entry) = self.terms.get_mut(term) else {
            return;
        };
        entry.direct = match &entry.direct {
            Direct::Unset => Direct::Route(route.to_string()),
            Direct::Route(existing) if existing == route => Direct::Route(route.to_string()),
            Direct::Route(existing) => {
                warn!(term, existing = %existing, other = route, "conflicting single-target synonyms, no direct route");
                Direct::Conflict
            }
            Direct::Conflict => Direct::Conflict,
        };
    }

    fn finish(self) -> Vec<SearchTerm> {
        self.terms
            .into_iter()
            .map(|(term, builder)| {
                let mut routes: Vec<SearchRoute> = builder.routes.into_values().collect();
                routes.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
                SearchTerm {
                    term,
                    routes,
                    sources: builder.sources.into_iter().collect(),
                    direct_route: match builder.direct {
                        Direct::Route(route) => Some(route),
                        Direct::Unset | Direct::Conflict => None,
                    },
                }
            })
            .collect()
    }
}

#[instrument(skip_all, fields(synonyms = store.synonyms.len()))]
pub fn build_search_routes(store: &ContentStore, entities: &EntitiesIndex) -> Result<SearchRoutesIndex> {
    let mut map = TermMap::default();

    for p in &entities.peptides {
        map.add(&p.slug, SearchRoute::entity(EntityKind::Peptide, &p.slug), SOURCE_SLUG);
    }
    for b in &entities.blends {
        map.add(&b.slug, SearchRoute::entity(EntityKind::Blend, &b.slug), SOURCE_SLUG);
    }

    for p in &entities.peptides {
        let route = SearchRoute::entity(EntityKind::Peptide, &p.slug);
        map.add(&p.display_name, route.clone(), SOURCE_PEPTIDE_NAME);
        if let Some(short) = &p.short_name {
            map.add(short, route.clone(), SOURCE_PEPTIDE_SHORT_NAME);
        }
        for alias in &p.aliases {
            map.add(alias, route.clone(), SOURCE_PEPTIDE_ALIASES);
        }
    }
    for b in &entities.blends {
        map.add(
            &b.display_name,
            SearchRoute::entity(EntityKind::Blend, &b.slug),
            SOURCE_BLEND_NAME,
        );
    }

    let labels: BTreeMap<&str, &str> = store
        .peptide_categories
        .iter()
        .map(|c| (c.key.as_str(), c.label.as_str()))
        .collect();
    for c in &store.peptide_categories {
        let route = SearchRoute::category(&c.key, &c.label);
        map.add(&c.key, route.clone(), SOURCE_CATEGORY_KEY);
        map.add(&c.label, route, SOURCE_CATEGORY_LABEL);
    }

    let peptide_slugs: BTreeSet<&str> = entities.peptides.iter().map(|p| p.slug.as_str()).collect();
    let blend_slugs: BTreeSet<&str> = entities.blends.iter().map(|b| b.slug.as_str()).collect();

    for row in &store.synonyms {
        add_synonym(&mut map, row, &peptide_slugs, &blend_slugs, &labels)?;
    }

    let terms = map.finish();
    let counts = SearchCounts {
        terms: terms.len(),
        peptides: peptide_slugs.len(),
        blends: blend_slugs.len(),
        categories: store.peptide_categories.len(),
    };
    info!(
        terms = counts.terms,
        direct = terms.iter().filter(|t| t.direct_route.is_some()).count(),
        "search routes index built"
    );

    Ok(SearchRoutesIndex {
        version: ARTIFACT_VERSION.to_string(),
        counts,
        terms,
    })
}

fn add_synonym(
    map: &mut TermMap,
    row: &SynonymRow,
    peptide_slugs: &BTreeSet<&str>,
    blend_slugs: &BTreeSet<&str>,
    labels: &BTreeMap<&str, &str>,
) -> Result<()> {
    let source = row.scope.source();
    let mut routes = Vec::with_capacity(row.targets.len());
    for target in &row.targets {
        let route = match row.scope {
            SynonymScope::Entity if peptide_slugs.contains(target.as_str()) => {
                SearchRoute::entity(EntityKind::Peptide, target)
            }
            SynonymScope::Blend if blend_slugs.contains(target.as_str()) => {
                SearchRoute::entity(EntityKind::Blend, target)
            }
            SynonymScope::Category => match labels.get(target.as_str()) {
                Some(label) => SearchRoute::category(target, label),
                None => return Err(unknown_target(row, "taxonomy key", target)),
            },
            SynonymScope::Entity => return Err(unknown_target(row, "peptide slug", target)),
            SynonymScope::Blend => return Err(unknown_target(row, "blend slug", target)),
        };
        routes.push(route);
    }

    let mut term = None;
    for route in &routes {
        term = map.add(&row.term, route.clone(), source);
    }

    if let (Some(term), [only]) = (term, routes.as_slice()) {
        if row.scope != SynonymScope::Category {
            map.claim_direct(&term, &only.route);
        }
    }
    Ok(())
}

fn unknown_target(row: &SynonymRow, what: &str, target: &str) -> PepIndexError {
    PepIndexError::integrity(format!(
        "{} row '{}' references unknown {what} '{target}'",
        row.scope.source(),
        row.term
    ))
}
