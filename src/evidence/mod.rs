//! Policy evidence
//!
//! Spans are located, verbatim excerpts. They are typed by literal pattern
//! families only; no span is ever paraphrased or scored.

mod retrieval;
mod typer;
mod types;

pub use retrieval::{
    keyword_hits, order_by_contract, retrieve_or_empty, EvidenceRetriever, InMemoryRetriever,
    RetrievalError, RetrievalOutcome,
};
pub use typer::{EvidenceTyper, PatternFamily};
pub use types::{EvidenceSpan, EvidenceType, SourceDocType, TypedEvidence};
