//! Coverage universe
//!
//! An insurer's universe is the set of rows its own proposal actually
//! offers. Only UNIVERSE_COVERAGE rows may take part in a comparison.

mod amount;
mod classifier;
mod types;

pub use amount::parse_amount;
pub use classifier::{KeywordFamily, MetaRowClassifier};
pub use types::{LockClass, RawCoverageRow, RowRef, UniverseLockRecord};
