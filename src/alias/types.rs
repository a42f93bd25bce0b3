//! Alias table types

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::catalog::CanonicalCode;

/// One row of the governed alias table, as exported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasEntry {
    /// Alias as written in the source table
    pub alias: String,
    /// Canonical code the alias may refer to
    pub canonical_code: CanonicalCode,
    /// Insurer whose documents use this alias
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurer_id: Option<String>,
}

impl AliasEntry {
    pub fn new(alias: impl Into<String>, canonical_code: &str) -> Self {
        Self {
            alias: alias.into(),
            canonical_code: CanonicalCode::new(canonical_code),
            insurer_id: None,
        }
    }

    pub fn for_insurer(mut self, insurer_id: impl Into<String>) -> Self {
        self.insurer_id = Some(insurer_id.into());
        self
    }
}

/// An alias entry after normalization, as held by an index snapshot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct IndexedAlias {
    pub normalized_alias: String,
    pub canonical_code: CanonicalCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insurer_id: Option<String>,
}

/// Canonical codes recalled for one query.
///
/// Carries no score and no order of preference; iteration is lexical so
/// serialized output is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateSet(BTreeSet<CanonicalCode>);

impl CandidateSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, code: &CanonicalCode) -> bool {
        self.0.contains(code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CanonicalCode> {
        self.0.iter()
    }

    /// Returns true if the two sets share at least one code.
    pub fn intersects(&self, other: &CandidateSet) -> bool {
        self.0.iter().any(|c| other.0.contains(c))
    }
}

impl FromIterator<CanonicalCode> for CandidateSet {
    fn from_iter<I: IntoIterator<Item = CanonicalCode>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
