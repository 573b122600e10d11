//! Vocabulary types shared by the content loader, the builders and the resolver.
//!
//! The rated vocabularies (severity, likelihood, evidence grade) derive `Ord` in
//! declaration order, so `max()`/`min()` pick the worst value directly.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// EntityKind
// ---------------------------------------------------------------------------

/// The two kinds of indexed entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Peptide,
    Blend,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Peptide => "peptide",
            Self::Blend => "blend",
        }
    }

    /// Routable destination for an entity of this kind, e.g. `peptide:bpc-157`.
    pub fn route(self, slug: &str) -> String {
        format!("{}:{slug}", self.as_str())
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// StatusCategory
// ---------------------------------------------------------------------------

/// Regulatory/human-use status of a peptide. Only used for ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatusCategory {
    ApprovedHuman,
    InvestigationalHuman,
    Preclinical,
    TheoreticalUnmanufactured,
    Unknown,
}

impl StatusCategory {
    /// Map an authored status string; anything unrecognized is `Unknown`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "approved_human" => Self::ApprovedHuman,
            "investigational_human" => Self::InvestigationalHuman,
            "preclinical" => Self::Preclinical,
            "theoretical_unmanufactured" => Self::TheoreticalUnmanufactured,
            _ => Self::Unknown,
        }
    }

    /// Sort rank: lower sorts first.
    pub fn rank(self) -> u8 {
        self as u8
    }
}

// ---------------------------------------------------------------------------
// Risk vocabularies
// ---------------------------------------------------------------------------

/// Declared harm severity, mildest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Minimal,
    Mild,
    Moderate,
    High,
    Critical,
}

/// Declared likelihood of harm, least likely first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Likelihood {
    Unlikely,
    Possible,
    Likely,
    VeryLikely,
}

/// Strength of the supporting evidence, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceGrade {
    Unknown,
    MechanisticOnly,
    InVitro,
    Animal,
    HumanObservational,
    HumanInterventional,
    Rct,
    RctMeta,
    RegulatoryLabel,
}

/// Three-level coarsening of the 1–10 risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Low,
    Moderate,
    High,
}
