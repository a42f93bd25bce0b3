//! Alias table loader
//!
//! The governed spreadsheet is exported as one JSON document:
//!
//! ```json
//! {
//!   "source": "alias_master_2024Q4.xlsx",
//!   "entries": [ { "alias": "암진단비", "canonical_code": "GENERAL", "insurer_id": "A" } ]
//! }
//! ```
//!
//! Every entry must map to a code listed in the catalog. The loader never
//! infers or edits entries.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use super::errors::{AliasError, AliasResult};
use super::index::AliasIndex;
use super::types::AliasEntry;
use crate::catalog::CatalogSet;
use crate::observability::{Event, Logger};

#[derive(Debug, Deserialize)]
struct AliasTableFile {
    #[serde(default)]
    source: Option<String>,
    entries: Vec<AliasEntry>,
}

/// Loads alias tables into index snapshots.
pub struct AliasTableLoader;

impl AliasTableLoader {
    /// Reads, validates, and builds an index from an alias table file.
    pub fn load(path: &Path, catalog: &CatalogSet) -> AliasResult<AliasIndex> {
        let content = fs::read_to_string(path).map_err(|e| AliasError::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let file: AliasTableFile =
            serde_json::from_str(&content).map_err(|e| AliasError::Malformed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let source = file
            .source
            .unwrap_or_else(|| path.display().to_string());
        let index = Self::build_checked(source, file.entries, catalog)?;

        Logger::info(
            Event::AliasIndexBuilt.as_str(),
            &[
                ("source", index.source()),
                ("entries", index.entry_count().to_string().as_str()),
                ("aliases", index.alias_count().to_string().as_str()),
                ("fingerprint", index.fingerprint()),
            ],
        );
        Ok(index)
    }

    /// Validates entries against the catalog, then builds.
    pub fn build_checked(
        source: impl Into<String>,
        entries: Vec<AliasEntry>,
        catalog: &CatalogSet,
    ) -> AliasResult<AliasIndex> {
        if let Some(entry) = entries
            .iter()
            .find(|e| !catalog.contains_code(&e.canonical_code))
        {
            return Err(AliasError::UnknownCanonicalCode {
                alias: entry.alias.clone(),
                code: entry.canonical_code.to_string(),
            });
        }
        AliasIndex::build_from_source(source, entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_table(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("aliases.json");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_valid_table() {
        let dir = TempDir::new().unwrap();
        let path = write_table(
            &dir,
            r#"{
                "source": "alias_master.xlsx",
                "entries": [
                    { "alias": "암진단비", "canonical_code": "GENERAL", "insurer_id": "A" },
                    { "alias": "유사암 진단비", "canonical_code": "SIMILAR" }
                ]
            }"#,
        );

        let index = AliasTableLoader::load(&path, &CatalogSet::builtin()).unwrap();
        assert_eq!(index.entry_count(), 2);
        assert_eq!(index.source(), "alias_master.xlsx");
        assert!(!index.recall("유사암진단비").is_empty());
    }

    #[test]
    fn test_source_defaults_to_path() {
        let dir = TempDir::new().unwrap();
        let path = write_table(&dir, r#"{ "entries": [] }"#);
        let index = AliasTableLoader::load(&path, &CatalogSet::builtin()).unwrap();
        assert!(index.source().ends_with("aliases.json"));
        assert_eq!(index.entry_count(), 0);
    }

    #[test]
    fn test_unknown_code_rejected() {
        let err = AliasTableLoader::build_checked(
            "test",
            vec![AliasEntry::new("뇌출혈진단비", "HEMORRHAGE")],
            &CatalogSet::builtin(),
        )
        .unwrap_err();
        assert_eq!(err.code(), "COVER_ALIAS_UNKNOWN_CODE");
    }

    #[test]
    fn test_malformed_table() {
        let dir = TempDir::new().unwrap();
        let path = write_table(&dir, r#"{ "entries": [ { "alias": 1 } ] }"#);
        let err = AliasTableLoader::load(&path, &CatalogSet::builtin()).unwrap_err();
        assert_eq!(err.code(), "COVER_ALIAS_MALFORMED");
    }

    #[test]
    fn test_missing_table() {
        let dir = TempDir::new().unwrap();
        let err =
            AliasTableLoader::load(&dir.path().join("none.json"), &CatalogSet::builtin())
                .unwrap_err();
        assert_eq!(err.code(), "COVER_ALIAS_UNREADABLE");
    }
}
