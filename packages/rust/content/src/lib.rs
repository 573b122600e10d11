//! Read-only access to the authored content store.
//!
//! Every document is decoded once here into typed records; builders never look
//! at raw JSON. Dynamic token shapes (`"text"` vs `{"slug": ..}`) are resolved
//! into [`InteractionToken`] at this boundary.

pub mod documents;
pub mod store;
pub mod taxonomy;

pub use documents::{
    BlendDoc, BlendRegistryEntry, DeclaredRisk, Governance, InteractionBucket,
    InteractionDeclarations, InteractionToken, PeptideDoc,
};
pub use store::{ContentPaths, ContentStore};
pub use taxonomy::{
    CategoryEntry, InteractionClass, InteractionTaxonomy, InteractionVocabulary, SynonymRow,
    SynonymScope,
};
