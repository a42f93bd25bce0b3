//! Cross-insurer comparison
//!
//! Combines per-insurer decisions and universe membership into one of six
//! terminal states. Pure; no I/O.

mod resolver;
mod types;

pub use resolver::{
    ComparisonStateResolver, RULE_COMPARABLE, RULE_DISJOINT, RULE_MISSING_SLOTS,
    RULE_OUT_OF_UNIVERSE, RULE_UNDECIDED, RULE_UNMAPPED,
};
pub use types::{
    ComparisonOutcome, ComparisonState, Guidance, InsurerComparisonInput, InsurerGuidance,
    MessageCode, NextAction, RuleCheck,
};
