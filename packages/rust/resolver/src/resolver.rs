//! The query resolver.
//!
//! Resolution order, first match wins:
//! 1. empty normalized query → [`Intent::Empty`]
//! 2. term with a strict single-target synonym → [`Intent::DirectEntity`]
//! 3. exact term: one route is direct, several are [`Intent::SearchResults`]
//! 4. any token that is a category term → [`Intent::DirectCategory`]
//! 5. prefix matches plus close-match suggestions → [`Intent::SearchResults`]

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use pepindex_artifacts::{ARTIFACT_VERSION, RouteType, SearchRoute, SearchRoutesIndex, SearchTerm, read_artifact};
use pepindex_shared::{EntityKind, ResolverConfig, Result, normalize};

use crate::similarity::close_matches;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    DirectEntity,
    DirectCategory,
    SearchResults,
    Empty,
}

/// One possible destination for a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub route: String,
    #[serde(rename = "type")]
    pub route_type: RouteType,
    pub kind: Option<EntityKind>,
    pub slug: Option<String>,
    pub taxonomy_key: Option<String>,
    /// Index term the candidate came from.
    pub source_term: String,
    pub source_sources: Vec<String>,
}

impl Candidate {
    fn from_route(term: &SearchTerm, route: &SearchRoute) -> Self {
        Self {
            route: route.route.clone(),
            route_type: route.route_type,
            kind: route.kind,
            slug: route.slug.clone(),
            taxonomy_key: route.taxonomy_key.clone(),
            source_term: term.term.clone(),
            source_sources: term.sources.clone(),
        }
    }

    /// Peptides, then blends, then categories.
    fn rank(&self) -> u8 {
        match (self.route_type, self.kind) {
            (RouteType::Entity, Some(EntityKind::Peptide)) => 0,
            (RouteType::Entity, Some(EntityKind::Blend)) => 1,
            (RouteType::Entity, None) => 2,
            (RouteType::Category, _) => 3,
        }
    }

    fn order(a: &Self, b: &Self) -> Ordering {
        (a.rank(), a.route.as_str()).cmp(&(b.rank(), b.route.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub version: &'static str,
    pub query_raw: String,
    pub query_norm: String,
    pub intent: Intent,
    pub route: Option<String>,
    pub candidates: Vec<Candidate>,
    pub did_you_mean: Vec<String>,
}

impl Resolution {
    fn new(raw: &str, norm: String, intent: Intent) -> Self {
        Self {
            version: ARTIFACT_VERSION,
            query_raw: raw.to_string(),
            query_norm: norm,
            intent,
            route: None,
            candidates: Vec::new(),
            did_you_mean: Vec::new(),
        }
    }

    fn direct(mut self, candidates: Vec<Candidate>) -> Self {
        self.route = candidates.first().map(|c| c.route.clone());
        self.candidates = candidates;
        self
    }
}

/// Immutable resolver over one search routes index.
#[derive(Debug, Clone)]
pub struct Resolver {
    terms: BTreeMap<String, SearchTerm>,
    config: ResolverConfig,
}

impl Resolver {
    pub fn new(index: SearchRoutesIndex, config: ResolverConfig) -> Self {
        let terms = index
            .terms
            .into_iter()
            .map(|t| (t.term.clone(), t))
            .collect();
        Self { terms, config }
    }

    /// Load `search_routes_v1.json` from disk.
    pub fn from_path(path: &Path, config: ResolverConfig) -> Result<Self> {
        let index: SearchRoutesIndex = read_artifact(path)?;
        info!(path = %path.display(), terms = index.terms.len(), "search routes index loaded");
        Ok(Self::new(index, config))
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Resolve one free-text query. Never fails.
    pub fn resolve(&self, raw: &str) -> Resolution {
        let norm = normalize(raw);
        if norm.is_empty() {
            return Resolution::new(raw, norm, Intent::Empty);
        }

        if let Some(term) = self.terms.get(&norm) {
            if let Some(direct) = self.direct_candidate(term) {
                debug!(query = %norm, route = %direct.route, "strict synonym fast path");
                return Resolution::new(raw, norm, Intent::DirectEntity).direct(vec![direct]);
            }

            let candidates = sorted(candidates_of(term));
            return match candidates.as_slice() {
                [only] => {
                    let intent = match only.route_type {
                        RouteType::Entity => Intent::DirectEntity,
                        RouteType::Category => Intent::DirectCategory,
                    };
                    Resolution::new(raw, norm, intent).direct(candidates)
                }
                _ => {
                    let mut res = Resolution::new(raw, norm, Intent::SearchResults);
                    res.candidates = candidates;
                    res
                }
            };
        }

        let category_hits: Vec<Candidate> = norm
            .split(' ')
            .filter_map(|token| self.terms.get(token))
            .flat_map(candidates_of)
            .filter(|c| c.route_type == RouteType::Category)
            .collect();
        if !category_hits.is_empty() {
            let hits = dedupe(sorted(category_hits));
            return Resolution::new(raw, norm, Intent::DirectCategory).direct(hits);
        }

        let prefixed: Vec<Candidate> = self
            .terms
            .range(norm.clone()..)
            .take_while(|(term, _)| term.starts_with(&norm))
            .take(self.config.prefix_limit)
            .flat_map(|(_, term)| candidates_of(term))
            .collect();
        let mut candidates = dedupe(sorted(prefixed));
        candidates.truncate(self.config.candidate_limit);

        let did_you_mean = close_matches(
            &norm,
            self.terms.keys().map(String::as_str),
            self.config.suggestion_limit,
            self.config.suggestion_cutoff,
        )
        .into_iter()
        .map(str::to_string)
        .collect();

        let mut res = Resolution::new(raw, norm, Intent::SearchResults);
        res.candidates = candidates;
        res.did_you_mean = did_you_mean;
        res
    }

    fn direct_candidate(&self, term: &SearchTerm) -> Option<Candidate> {
        let direct = term.direct_route.as_deref()?;
        term.routes
            .iter()
            .find(|r| r.route == direct)
            .map(|r| Candidate::from_route(term, r))
    }
}

fn candidates_of(term: &SearchTerm) -> Vec<Candidate> {
    term.routes
        .iter()
        .map(|r| Candidate::from_route(term, r))
        .collect()
}

fn sorted(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.sort_by(Candidate::order);
    candidates
}

/// Keep the first candidate for each route.
fn dedupe(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen = BTreeSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.route.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pepindex_artifacts::SearchCounts;

    fn term(t: &str, routes: Vec<SearchRoute>, sources: &[&str], direct: Option<&str>) -> SearchTerm {
        SearchTerm {
            term: t.to_string(),
            routes,
            sources: sources.iter().map(|s| s.to_string()).collect(),
            direct_route: direct.map(str::to_string),
        }
    }

    fn peptide(slug: &str) -> SearchRoute {
        SearchRoute::entity(EntityKind::Peptide, slug)
    }

    fn blend(slug: &str) -> SearchRoute {
        SearchRoute::entity(EntityKind::Blend, slug)
    }

    fn category(key: &str) -> SearchRoute {
        SearchRoute::category(key, key)
    }

    fn resolver() -> Resolver {
        let mut terms = vec![
            term("bpc-157", vec![peptide("bpc-157")], &["slug"], None),
            term("bremelanotide", vec![peptide("bremelanotide")], &["slug"], None),
            term("cjc", vec![blend("cjc-ipamorelin"), peptide("cjc-1295")], &["synonyms:entity_synonyms"], None),
            term("cjc-1295", vec![peptide("cjc-1295")], &["slug"], None),
            term("cjc-ipamorelin", vec![blend("cjc-ipamorelin")], &["slug"], None),
            term(
                "pt141",
                vec![peptide("bremelanotide"), peptide("pt-141-analog")],
                &["synonyms:entity_synonyms"],
                Some("peptide:bremelanotide"),
            ),
            term("semaglutide", vec![peptide("semaglutide")], &["slug"], None),
            term("sleep", vec![category("sleep_circadian")], &["synonyms:category_synonyms"], None),
            term("sleep circadian", vec![category("sleep_circadian")], &["category:key"], None),
            term("metabolic", vec![category("metabolic_weight")], &["synonyms:category_synonyms"], None),
        ];
        terms.sort_by(|a, b| a.term.cmp(&b.term));
        let index = SearchRoutesIndex {
            version: "v1".into(),
            counts: SearchCounts {
                terms: terms.len(),
                peptides: 5,
                blends: 1,
                categories: 2,
            },
            terms,
        };
        Resolver::new(index, ResolverConfig::default())
    }

    #[test]
    fn empty_query() {
        let res = resolver().resolve("   ?! ");
        assert_eq!(res.intent, Intent::Empty);
        assert_eq!(res.route, None);
        assert!(res.candidates.is_empty());
        assert_eq!(res.query_norm, "");
    }

    #[test]
    fn strict_synonym_wins_over_multiple_routes() {
        let res = resolver().resolve("PT141");
        assert_eq!(res.intent, Intent::DirectEntity);
        assert_eq!(res.route.as_deref(), Some("peptide:bremelanotide"));
        assert_eq!(res.candidates.len(), 1);
    }

    #[test]
    fn exact_single_route_is_direct() {
        let res = resolver().resolve("BPC-157");
        assert_eq!(res.intent, Intent::DirectEntity);
        assert_eq!(res.route.as_deref(), Some("peptide:bpc-157"));

        let res = resolver().resolve("Sleep & Circadian");
        assert_eq!(res.intent, Intent::DirectCategory);
        assert_eq!(res.route.as_deref(), Some("category:sleep_circadian"));
    }

    #[test]
    fn ambiguous_term_is_never_auto_picked() {
        let res = resolver().resolve("cjc");
        assert_eq!(res.intent, Intent::SearchResults);
        assert_eq!(res.route, None);
        let routes: Vec<_> = res.candidates.iter().map(|c| c.route.as_str()).collect();
        // peptides before blends
        assert_eq!(routes, ["peptide:cjc-1295", "blend:cjc-ipamorelin"]);
    }

    #[test]
    fn token_category_detection() {
        let res = resolver().resolve("best sleep peptide");
        assert_eq!(res.intent, Intent::DirectCategory);
        assert_eq!(res.route.as_deref(), Some("category:sleep_circadian"));

        // first category in route order wins
        let res = resolver().resolve("sleep metabolic");
        assert_eq!(res.route.as_deref(), Some("category:metabolic_weight"));
        assert_eq!(res.candidates.len(), 2);
    }

    #[test]
    fn prefix_candidates_are_deduped() {
        let res = resolver().resolve("cj");
        assert_eq!(res.intent, Intent::SearchResults);
        let routes: Vec<_> = res.candidates.iter().map(|c| c.route.as_str()).collect();
        assert_eq!(routes, ["peptide:cjc-1295", "blend:cjc-ipamorelin"]);
    }

    #[test]
    fn candidate_limit_applies() {
        let config = ResolverConfig {
            candidate_limit: 1,
            ..ResolverConfig::default()
        };
        let r = resolver();
        let limited = Resolver::new(
            SearchRoutesIndex {
                version: "v1".into(),
                counts: SearchCounts { terms: 0, peptides: 0, blends: 0, categories: 0 },
                terms: r.terms.into_values().collect(),
            },
            config,
        );
        assert_eq!(limited.resolve("cj").candidates.len(), 1);
    }

    #[test]
    fn misspelling_gets_suggestions() {
        let res = resolver().resolve("semaglutdie");
        assert_eq!(res.intent, Intent::SearchResults);
        assert!(res.candidates.is_empty());
        assert_eq!(res.did_you_mean, vec!["semaglutide"]);
    }

    #[test]
    fn resolution_json_shape() {
        let json = serde_json::to_value(resolver().resolve("")).unwrap();
        assert_eq!(json["intent"], "empty");
        assert!(json["route"].is_null());

        let json = serde_json::to_value(resolver().resolve("sleep")).unwrap();
        assert_eq!(json["candidates"][0]["type"], "category");
        assert_eq!(json["candidates"][0]["taxonomy_key"], "sleep_circadian");
        assert!(json["candidates"][0]["slug"].is_null());
    }
}
