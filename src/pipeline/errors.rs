//! Pipeline errors
//!
//! The pipeline itself never fails on evidence or recall conditions; those
//! become comparison states. Only malformed requests are errors.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("Unknown semantic domain '{0}'")]
    UnknownDomain(String),

    #[error("Query text is empty")]
    EmptyQuery,

    #[error("Insurer '{0}' appears more than once in the request")]
    DuplicateInsurer(String),
}

impl PipelineError {
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::UnknownDomain(_) => "COVER_PIPELINE_UNKNOWN_DOMAIN",
            PipelineError::EmptyQuery => "COVER_PIPELINE_EMPTY_QUERY",
            PipelineError::DuplicateInsurer(_) => "COVER_PIPELINE_DUPLICATE_INSURER",
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
