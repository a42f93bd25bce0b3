//! Catalog loader
//!
//! Reads the governed catalog file once at startup:
//!
//! ```json
//! { "domains": [ { "domain_id": "CANCER", "sub_codes": [ ... ] } ] }
//! ```

use serde::Deserialize;
use std::fs;
use std::path::Path;

use super::errors::{CatalogError, CatalogResult};
use super::types::{CatalogSet, DomainCatalog};
use crate::observability::{Event, Logger};

#[derive(Debug, Deserialize)]
struct CatalogFile {
    domains: Vec<DomainCatalog>,
}

/// Loads and validates catalog files.
pub struct CatalogLoader;

impl CatalogLoader {
    /// Loads a catalog set from a JSON file.
    pub fn load(path: &Path) -> CatalogResult<CatalogSet> {
        let content = fs::read_to_string(path).map_err(|e| CatalogError::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let set = Self::parse(&content).map_err(|e| match e {
            CatalogError::Malformed { reason, .. } => CatalogError::Malformed {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })?;

        Logger::info(
            Event::CatalogLoaded.as_str(),
            &[
                ("path", path.display().to_string().as_str()),
                ("domains", set.domain_count().to_string().as_str()),
                ("codes", set.code_count().to_string().as_str()),
            ],
        );
        Ok(set)
    }

    /// Parses and validates catalog JSON.
    pub fn parse(content: &str) -> CatalogResult<CatalogSet> {
        let file: CatalogFile =
            serde_json::from_str(content).map_err(|e| CatalogError::Malformed {
                path: "<in-memory>".into(),
                reason: e.to_string(),
            })?;
        Self::assemble(file.domains)
    }

    /// Validates domains and assembles them into a set.
    ///
    /// Each code belongs to exactly one domain.
    pub fn assemble(domains: Vec<DomainCatalog>) -> CatalogResult<CatalogSet> {
        let mut seen: Vec<&DomainCatalog> = Vec::new();
        for domain in &domains {
            domain
                .validate_structure()
                .map_err(CatalogError::InvalidDomain)?;

            if seen.iter().any(|d| d.domain_id == domain.domain_id) {
                return Err(CatalogError::DuplicateDomain(domain.domain_id.clone()));
            }
            for sub in &domain.sub_codes {
                if seen.iter().any(|d| d.contains(&sub.code)) {
                    return Err(CatalogError::SharedCode {
                        code: sub.code.to_string(),
                    });
                }
            }
            seen.push(domain);
        }
        Ok(CatalogSet::new(domains))
    }
}
