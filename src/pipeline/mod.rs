//! Comparison pipeline
//!
//! Wires classifier, alias recall, evidence retrieval and typing, the
//! decision engine, and the resolver into one request-scoped run.

mod errors;
mod membership;
mod runner;
mod slots;

pub use errors::{PipelineError, PipelineResult};
pub use membership::{find_universe_row, UniverseMatch};
pub use runner::{
    ComparisonPipeline, ComparisonReport, ComparisonRequest, InsurerSubmission, InsurerUniverse,
    PipelineSettings, DEFAULT_DOMAIN,
};
pub use slots::{missing_slots, RequiredSlot};
