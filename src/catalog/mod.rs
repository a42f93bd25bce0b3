//! Canonical code catalog
//!
//! The catalog is the closed universe of codes a decision may reference.
//! Nothing outside it is ever decided.

mod errors;
mod loader;
mod types;

pub use errors::{CatalogError, CatalogResult};
pub use loader::CatalogLoader;
pub use types::{CanonicalCode, CatalogSet, DomainCatalog, Mention, SubCode};
