//! Catalog closure check
//!
//! A decided code outside the domain catalog means the fold produced a
//! value it had no right to produce. That is a programming error, so the
//! check logs at FATAL and panics rather than returning an error.

use super::types::DecidedCodes;
use crate::catalog::DomainCatalog;
use crate::observability::{Event, Logger};

/// Panics if any decided code is not part of `catalog`.
pub fn ensure_within_catalog(insurer_id: &str, catalog: &DomainCatalog, codes: &DecidedCodes) {
    for code in codes.codes() {
        if !catalog.contains(code) {
            Logger::fatal(
                Event::CatalogInvariantViolation.as_str(),
                &[
                    ("insurer_id", insurer_id),
                    ("domain_id", catalog.domain_id.as_str()),
                    ("code", code.as_str()),
                ],
            );
            panic!(
                "decided code '{}' is not in catalog '{}'",
                code, catalog.domain_id
            );
        }
    }
}
