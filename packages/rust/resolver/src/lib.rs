//! Query resolution against a prebuilt search routes index.
//!
//! [`Resolver`] is immutable after construction; `resolve` takes `&self`, does
//! no I/O and can be shared across threads.

pub mod resolver;
pub mod similarity;

pub use resolver::{Candidate, Intent, Resolution, Resolver};
pub use similarity::{close_matches, ratio};
