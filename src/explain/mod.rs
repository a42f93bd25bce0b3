//! Explanations
//!
//! Structured records of the rules evaluated for a decision or a
//! comparison. Explanations are read-only views; building one never changes
//! an outcome.

pub mod comparison;
pub mod decision;
pub mod model;
pub mod rules;

pub use comparison::ComparisonExplainer;
pub use decision::DecisionExplainer;
pub use model::{
    Conclusion, ConclusionStatus, Evidence, Explanation, ExplanationType, ObservedSnapshot,
    RuleApplication, RuleEvaluation,
};
pub use rules::{RuleDefinition, RuleRegistry};
