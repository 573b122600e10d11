//! In-memory content fixture shared by the builder tests.

use std::collections::BTreeMap;

use pepindex_content::{
    BlendDoc, BlendRegistryEntry, CategoryEntry, ContentPaths, ContentStore, DeclaredRisk,
    Governance, InteractionClass, InteractionDeclarations, InteractionTaxonomy, InteractionToken,
    InteractionVocabulary, PeptideDoc, SynonymRow, SynonymScope,
};
use pepindex_shared::{EvidenceGrade, Likelihood, Severity};

pub const PEPTIDE_CATEGORIES: &[(&str, &str)] = &[
    ("regenerative_repair", "Regenerative & Repair"),
    ("metabolic_weight", "Metabolic & Weight"),
    ("endocrine_hormonal", "Endocrine & Hormonal"),
    ("sexual_health_reproduction", "Sexual Health & Reproduction"),
    ("neurocognitive_mood", "Neurocognitive & Mood"),
    ("cosmetic_topical", "Cosmetic & Topical"),
    ("sleep_circadian", "Sleep & Circadian"),
    ("immunomodulatory_inflammation", "Immunomodulatory & Inflammation"),
    ("antimicrobial_innate", "Antimicrobial & Innate"),
    ("mitochondrial_longevity", "Mitochondrial & Longevity"),
    ("muscle_performance", "Muscle & Performance"),
];

pub const BLEND_CATEGORIES: &[(&str, &str)] = &[
    ("regenerative_blend", "Regenerative Blends"),
    ("metabolic_weight_blend", "Metabolic Blends"),
    ("gh_axis_blend", "GH Axis Blends"),
    ("sexual_health_blend", "Sexual Health Blends"),
    ("neurocognitive_blend", "Neurocognitive Blends"),
    ("cosmetic_blend", "Cosmetic Blends"),
];

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn categories(items: &[(&str, &str)]) -> Vec<CategoryEntry> {
    items
        .iter()
        .map(|(key, label)| CategoryEntry {
            key: key.to_string(),
            label: label.to_string(),
        })
        .collect()
}

pub fn peptide(slug: &str, name: &str, status: &str, score: u8, keys: &[&str]) -> PeptideDoc {
    PeptideDoc {
        slug: slug.to_string(),
        canonical_name: name.to_string(),
        short_name: None,
        aliases: Vec::new(),
        status_category: status.to_string(),
        entity_kind: None,
        taxonomy_keys: strings(keys),
        appears_in_blends: Vec::new(),
        risk: DeclaredRisk {
            score,
            severity: None,
            likelihood: None,
            evidence_grade: None,
            developmental_risk: false,
            unknowns_penalty: false,
        },
        interactions: InteractionDeclarations::default(),
        source_path: format!("peptides/{slug}.json"),
    }
}

pub fn blend_doc(slug: &str, components: &[&str]) -> BlendDoc {
    BlendDoc {
        slug: slug.to_string(),
        taxonomy_keys: Vec::new(),
        components: strings(components),
        components_unresolved: Vec::new(),
        evidence_count: 0,
        source_path: format!("blends/{slug}.json"),
    }
}

pub fn registry_entry(slug: &str, name: &str, components: &[&str], keys: &[&str]) -> BlendRegistryEntry {
    BlendRegistryEntry {
        slug: slug.to_string(),
        display_name: Some(name.to_string()),
        taxonomy_keys: strings(keys),
        components: strings(components),
        components_unresolved: Vec::new(),
    }
}

fn class(slug: &str, title: &str, alternate: &[&str], vocabulary: InteractionVocabulary) -> InteractionClass {
    InteractionClass {
        slug: slug.to_string(),
        title: title.to_string(),
        alternate_names: strings(alternate),
        vocabulary,
    }
}

fn synonym(term: &str, scope: SynonymScope, targets: &[&str]) -> SynonymRow {
    SynonymRow {
        term: term.to_string(),
        scope,
        targets: strings(targets),
    }
}

/// Six peptides, three blends, the full category vocabularies, a small
/// interaction taxonomy and a handful of synonyms.
pub fn fixture_store() -> ContentStore {
    let mut bpc = peptide("bpc-157", "BPC-157", "preclinical", 4, &["regenerative_repair"]);
    bpc.risk.severity = Some(Severity::Mild);
    bpc.risk.likelihood = Some(Likelihood::Possible);
    bpc.risk.evidence_grade = Some(EvidenceGrade::Animal);
    bpc.interactions.drug = vec![InteractionToken::Named("Blood Thinners".into())];
    bpc.appears_in_blends = strings(&["wolverine"]);

    let mut tb = peptide(
        "tb-500",
        "TB-500",
        "preclinical",
        6,
        &["regenerative_repair", "muscle_performance"],
    );
    tb.risk.severity = Some(Severity::Moderate);
    tb.risk.likelihood = Some(Likelihood::Possible);
    tb.risk.evidence_grade = Some(EvidenceGrade::Animal);
    tb.risk.unknowns_penalty = true;

    let mut pt = peptide(
        "bremelanotide",
        "Bremelanotide",
        "approved_human",
        5,
        &["sexual_health_reproduction"],
    );
    pt.short_name = Some("PT-141".into());
    pt.risk.severity = Some(Severity::Moderate);
    pt.risk.evidence_grade = Some(EvidenceGrade::RegulatoryLabel);
    pt.interactions.drug = vec![InteractionToken::Slug("antihypertensives".into())];
    pt.interactions.supplement = vec![InteractionToken::Named("moon dust".into())];

    let mut cjc = peptide("cjc-1295", "CJC-1295", "investigational_human", 6, &["endocrine_hormonal"]);
    cjc.risk.severity = Some(Severity::Moderate);
    cjc.risk.likelihood = Some(Likelihood::Likely);
    cjc.risk.evidence_grade = Some(EvidenceGrade::HumanInterventional);
    cjc.risk.developmental_risk = true;

    let mut ipa = peptide("ipamorelin", "Ipamorelin", "investigational_human", 6, &["endocrine_hormonal"]);
    ipa.risk.evidence_grade = Some(EvidenceGrade::HumanObservational);
    ipa.interactions.supplement = vec![InteractionToken::Named("Omega-3".into())];

    let mut dsip = peptide("dsip", "DSIP", "preclinical", 3, &["sleep_circadian"]);
    dsip.aliases = strings(&["Delta sleep-inducing peptide"]);

    let mut peptides = vec![bpc, tb, pt, cjc, ipa, dsip];
    peptides.sort_by(|a, b| a.slug.cmp(&b.slug));

    let mut cjc_blend = registry_entry(
        "cjc-ipamorelin",
        "CJC-1295 / Ipamorelin",
        &["cjc-1295", "ipamorelin"],
        &["gh_axis_blend"],
    );
    cjc_blend.components_unresolved = strings(&["Mod GRF 1-29"]);
    let blend_registry = vec![
        registry_entry("wolverine", "Wolverine Stack", &["bpc-157", "tb-500"], &["regenerative_blend"]),
        cjc_blend,
        registry_entry("mystery-blend", "Mystery Blend", &[], &[]),
    ];
    let blend_docs: BTreeMap<String, BlendDoc> = [
        blend_doc("wolverine", &["bpc-157", "tb-500"]),
        blend_doc("cjc-ipamorelin", &[]),
        blend_doc("mystery-blend", &[]),
    ]
    .into_iter()
    .map(|doc| (doc.slug.clone(), doc))
    .collect();

    ContentStore {
        paths: ContentPaths::new("content"),
        peptides,
        blend_registry,
        blend_docs,
        governance: Governance::default(),
        peptide_categories: categories(PEPTIDE_CATEGORIES),
        blend_categories: categories(BLEND_CATEGORIES),
        interactions: InteractionTaxonomy {
            drug_classes: vec![
                class("anticoagulants", "Anticoagulants", &["blood thinners"], InteractionVocabulary::Drug),
                class("antihypertensives", "Antihypertensives", &[], InteractionVocabulary::Drug),
            ],
            supplement_classes: vec![class(
                "fish_oil",
                "Fish Oil",
                &["omega-3", "omega 3"],
                InteractionVocabulary::Supplement,
            )],
        },
        synonyms: vec![
            synonym("pt141", SynonymScope::Entity, &["bremelanotide"]),
            synonym("cjc", SynonymScope::Entity, &["cjc-1295"]),
            synonym("wolverine", SynonymScope::Blend, &["wolverine"]),
            synonym("cjc", SynonymScope::Blend, &["cjc-ipamorelin"]),
            synonym("sleep", SynonymScope::Category, &["sleep_circadian"]),
        ],
        safety_registry: None,
    }
}
