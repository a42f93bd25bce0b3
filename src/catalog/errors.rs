//! Catalog loading errors
//!
//! Catalog problems are detected before any decision is made. A catalog
//! that fails to load prevents startup; it is never partially applied.

use thiserror::Error;

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file '{path}': {reason}")]
    Unreadable { path: String, reason: String },

    #[error("Malformed catalog file '{path}': {reason}")]
    Malformed { path: String, reason: String },

    #[error("Invalid catalog domain: {0}")]
    InvalidDomain(String),

    #[error("Duplicate catalog domain: {0}")]
    DuplicateDomain(String),

    #[error("Code '{code}' is listed by more than one domain")]
    SharedCode { code: String },
}

impl CatalogError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            CatalogError::Unreadable { .. } => "COVER_CATALOG_UNREADABLE",
            CatalogError::Malformed { .. } => "COVER_CATALOG_MALFORMED",
            CatalogError::InvalidDomain(_) => "COVER_CATALOG_INVALID_DOMAIN",
            CatalogError::DuplicateDomain(_) => "COVER_CATALOG_DUPLICATE_DOMAIN",
            CatalogError::SharedCode { .. } => "COVER_CATALOG_SHARED_CODE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            CatalogError::InvalidDomain("x".into()).code(),
            "COVER_CATALOG_INVALID_DOMAIN"
        );
        assert_eq!(
            CatalogError::SharedCode { code: "A".into() }.code(),
            "COVER_CATALOG_SHARED_CODE"
        );
    }

    #[test]
    fn test_display_includes_path() {
        let err = CatalogError::Malformed {
            path: "/tmp/catalog.json".into(),
            reason: "expected value".into(),
        };
        assert!(err.to_string().contains("/tmp/catalog.json"));
    }
}
