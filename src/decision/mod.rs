//! Canonical decisions
//!
//! Turns typed policy evidence into a per-insurer set of canonical codes.
//! Alias recall may propose candidates; only policy evidence decides.

mod engine;
mod invariant;
mod scope;
mod types;

pub use engine::{CanonicalDecisionEngine, DEFAULT_MAX_EVIDENCE_SPANS};
pub use invariant::ensure_within_catalog;
pub use scope::ScopeFlags;
pub use types::{
    DecidedCodes, Decision, DecisionMethod, DecisionRecord, DecisionStatus, EvidenceRef,
    FlagAction, FlagChange, SupportingRefs, TraceStep, UndecidedReason, Verdict,
};
