//! Command-line interface
//!
//! Thin JSON-in, JSON-out commands over the library:
//! - classify: label proposal rows
//! - recall: alias recall for a name
//! - type-evidence: type policy spans
//! - decide: one insurer's canonical decision
//! - compare: full cross-insurer comparison
//! - check-config: validate configuration and inputs

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{
    handle_check_config, handle_classify, handle_compare, handle_decide, handle_recall,
    handle_type_evidence, load_context, run, run_command, ClassifyRequest, CompareInsurer,
    CompareRequest, Context, DecideRequest, RecallRequest, TypeEvidenceRequest,
};
pub use config::{Config, MAX_EVIDENCE_SPANS_LIMIT};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{parse_request, read_request, write_error, write_response};
