//! Shared types, error model, configuration and text normalization for pepindex.
//!
//! This crate is the foundation depended on by all other pepindex crates.
//! It provides:
//! - [`PepIndexError`] — the unified error type
//! - Vocabulary types ([`EntityKind`], [`StatusCategory`], [`Severity`], [`Likelihood`],
//!   [`EvidenceGrade`], [`RiskTier`])
//! - Configuration ([`AppConfig`], config loading)
//! - The one [`normalize`] and one [`slugify`] used by every builder and the resolver

pub mod config;
pub mod error;
pub mod text;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CategoriesConfig, PathsConfig, ResolverConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from,
};
pub use error::{PepIndexError, Result};
pub use text::{normalize, slugify};
pub use types::{EntityKind, EvidenceGrade, Likelihood, RiskTier, Severity, StatusCategory};
