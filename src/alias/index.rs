//! Immutable alias index snapshot
//!
//! Recall is an exact match on the normalized key. The index never invents,
//! scores, or ranks codes; an empty candidate set is a normal answer.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};

use super::errors::{AliasError, AliasResult};
use super::normalize::normalize;
use super::types::{AliasEntry, CandidateSet, IndexedAlias};
use crate::catalog::CanonicalCode;

/// One immutable build of the alias table.
#[derive(Debug, Clone)]
pub struct AliasIndex {
    /// Normalized alias -> codes it may refer to
    by_alias: BTreeMap<String, BTreeSet<CanonicalCode>>,
    /// Every entry as loaded, duplicates included
    entries: Vec<IndexedAlias>,
    fingerprint: String,
    source: String,
    built_at: DateTime<Utc>,
    generation: u64,
}

impl AliasIndex {
    /// Builds an index from table entries.
    pub fn build(entries: Vec<AliasEntry>) -> AliasResult<Self> {
        Self::build_from_source("<in-memory>", entries)
    }

    /// Builds an index, recording where the entries came from.
    pub fn build_from_source(
        source: impl Into<String>,
        entries: Vec<AliasEntry>,
    ) -> AliasResult<Self> {
        let mut by_alias: BTreeMap<String, BTreeSet<CanonicalCode>> = BTreeMap::new();
        let mut indexed = Vec::with_capacity(entries.len());

        for (i, entry) in entries.into_iter().enumerate() {
            let key = normalize(&entry.alias);
            if key.is_empty() {
                return Err(AliasError::EmptyAlias {
                    entry: i,
                    alias: entry.alias,
                });
            }
            by_alias
                .entry(key.clone())
                .or_default()
                .insert(entry.canonical_code.clone());
            indexed.push(IndexedAlias {
                normalized_alias: key,
                canonical_code: entry.canonical_code,
                insurer_id: entry.insurer_id,
            });
        }

        let fingerprint = fingerprint(&indexed);

        Ok(Self {
            by_alias,
            entries: indexed,
            fingerprint,
            source: source.into(),
            built_at: Utc::now(),
            generation: 0,
        })
    }

    /// Returns the candidate codes for a query.
    pub fn recall(&self, query_text: &str) -> CandidateSet {
        let key = normalize(query_text);
        if key.is_empty() {
            return CandidateSet::empty();
        }
        self.by_alias
            .get(&key)
            .map(|codes| codes.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// All loaded entries sharing the normalized form of `alias`.
    pub fn entries_for(&self, alias: &str) -> Vec<&IndexedAlias> {
        let key = normalize(alias);
        self.entries
            .iter()
            .filter(|e| e.normalized_alias == key)
            .collect()
    }

    /// Every code referenced by the table.
    pub fn referenced_codes(&self) -> BTreeSet<&CanonicalCode> {
        self.entries.iter().map(|e| &e.canonical_code).collect()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Number of distinct normalized aliases.
    pub fn alias_count(&self) -> usize {
        self.by_alias.len()
    }

    /// Content fingerprint; independent of entry order.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    /// Store generation this snapshot was published under (0 = unpublished).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(super) fn with_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }
}

fn fingerprint(entries: &[IndexedAlias]) -> String {
    let mut sorted: Vec<&IndexedAlias> = entries.iter().collect();
    sorted.sort();

    let mut hasher = Sha256::new();
    for entry in sorted {
        hasher.update(entry.normalized_alias.as_bytes());
        hasher.update(b"\t");
        hasher.update(entry.canonical_code.as_str().as_bytes());
        hasher.update(b"\t");
        hasher.update(entry.insurer_id.as_deref().unwrap_or("").as_bytes());
        hasher.update(b"\n");
    }
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}
