//! Extracted row and universe lock types

use serde::{Deserialize, Serialize};
use std::fmt;

/// One row as extracted from an insurer's proposal table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCoverageRow {
    pub insurer_id: String,
    pub template_version: String,
    pub row_index: u32,
    pub page: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub raw_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_amount_text: Option<String>,
}

impl RawCoverageRow {
    pub fn new(
        insurer_id: impl Into<String>,
        row_index: u32,
        raw_name: impl Into<String>,
        raw_amount_text: Option<&str>,
    ) -> Self {
        Self {
            insurer_id: insurer_id.into(),
            template_version: "v1".into(),
            row_index,
            page: 1,
            category: None,
            raw_name: raw_name.into(),
            raw_amount_text: raw_amount_text.map(|s| s.to_string()),
        }
    }

    pub fn row_ref(&self) -> RowRef {
        RowRef {
            insurer_id: self.insurer_id.clone(),
            template_version: self.template_version.clone(),
            row_index: self.row_index,
        }
    }
}

/// Stable reference to an extracted row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RowRef {
    pub insurer_id: String,
    pub template_version: String,
    pub row_index: u32,
}

impl fmt::Display for RowRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.insurer_id, self.template_version, self.row_index)
    }
}

/// Universe classification of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LockClass {
    /// A real coverage the insurer offers
    UniverseCoverage,
    /// Customer, header, or summary metadata
    NonUniverseMeta,
    /// Neither; reported, not blocking
    Unclassified,
}

impl LockClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            LockClass::UniverseCoverage => "UNIVERSE_COVERAGE",
            LockClass::NonUniverseMeta => "NON_UNIVERSE_META",
            LockClass::Unclassified => "UNCLASSIFIED",
        }
    }
}

impl fmt::Display for LockClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification result for one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniverseLockRecord {
    pub row_ref: RowRef,
    pub lock_class: LockClass,
    pub lock_reason: String,
    /// Parsed amount in won, when the amount text parsed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_won: Option<u64>,
}

impl UniverseLockRecord {
    pub fn is_universe(&self) -> bool {
        self.lock_class == LockClass::UniverseCoverage
    }
}
