//! Alias recall
//!
//! Alias matching produces candidates only. A candidate is a hint that a
//! coverage name might refer to a canonical code; it is never a decision.

mod errors;
mod index;
mod loader;
mod normalize;
mod store;
mod types;

pub use errors::{AliasError, AliasResult};
pub use index::AliasIndex;
pub use loader::AliasTableLoader;
pub use normalize::normalize;
pub use store::AliasStore;
pub use types::{AliasEntry, CandidateSet, IndexedAlias};
