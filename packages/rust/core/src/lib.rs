//! Index builders and pipeline orchestration for pepindex.
//!
//! Builders are pure functions over a loaded [`ContentStore`](pepindex_content::ContentStore)
//! and, for everything after the entity stage, the in-memory entity index.
//! [`pipeline`] runs them in a fixed order and owns the write phase;
//! [`check`] rebuilds in memory and reports drift against the files on disk.

pub mod categories;
pub mod check;
pub mod entities;
pub mod interactions;
pub mod pipeline;
pub mod risk;
pub mod search_routes;

#[cfg(test)]
pub(crate) mod test_support;

pub use check::{ArtifactDrift, CheckReport, DriftStatus, run_check};
pub use pipeline::{
    BuildOptions, BuildProgress, BuildSummary, BuiltIndexes, SilentProgress, Stage, build_all,
    build_in_memory, run_build,
};
