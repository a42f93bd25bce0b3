//! Alias table errors
//!
//! A table that fails to load or validate is never swapped in; the
//! previous snapshot stays current.

use thiserror::Error;

/// Result type for alias operations
pub type AliasResult<T> = Result<T, AliasError>;

#[derive(Debug, Error)]
pub enum AliasError {
    #[error("Failed to read alias table '{path}': {reason}")]
    Unreadable { path: String, reason: String },

    #[error("Malformed alias table '{path}': {reason}")]
    Malformed { path: String, reason: String },

    #[error("Alias '{alias}' (entry {entry}) normalizes to an empty key")]
    EmptyAlias { entry: usize, alias: String },

    #[error("Alias '{alias}' maps to code '{code}' which is not in the catalog")]
    UnknownCanonicalCode { alias: String, code: String },
}

impl AliasError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            AliasError::Unreadable { .. } => "COVER_ALIAS_UNREADABLE",
            AliasError::Malformed { .. } => "COVER_ALIAS_MALFORMED",
            AliasError::EmptyAlias { .. } => "COVER_ALIAS_EMPTY_KEY",
            AliasError::UnknownCanonicalCode { .. } => "COVER_ALIAS_UNKNOWN_CODE",
        }
    }
}
