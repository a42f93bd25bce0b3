//! Canonical code catalog types
//!
//! A semantic domain owns a closed, ordered list of sub-codes. Each sub-code
//! carries the literal keywords that name it in policy text and an optional
//! parent, which defines the parent/narrower relation used during folding.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Externally governed identifier for one semantic coverage concept.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalCode(String);

impl CanonicalCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CanonicalCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

/// One entry of a domain's closed catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubCode {
    /// Canonical code for this sub-category
    pub code: CanonicalCode,
    /// Literal terms that name this sub-category in policy text
    pub keywords: Vec<String>,
    /// Broader sub-code this one is narrower than
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<CanonicalCode>,
}

impl SubCode {
    pub fn new(code: &str, keywords: &[&str], parent: Option<&str>) -> Self {
        Self {
            code: CanonicalCode::new(code),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            parent: parent.map(CanonicalCode::new),
        }
    }
}

/// A code occurrence located in evidence text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention {
    /// Index of the sub-code inside the catalog
    pub position: usize,
    /// Keyword that produced the match (whitespace-stripped)
    pub keyword: String,
    /// Byte offset of the keyword in the whitespace-stripped text
    pub offset: usize,
}

impl Mention {
    /// Byte offset just past the keyword in the stripped text.
    pub fn end(&self) -> usize {
        self.offset + self.keyword.len()
    }
}

/// Closed catalog for one semantic domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainCatalog {
    pub domain_id: String,
    pub sub_codes: Vec<SubCode>,
}

impl DomainCatalog {
    pub fn new(domain_id: impl Into<String>, sub_codes: Vec<SubCode>) -> Self {
        Self {
            domain_id: domain_id.into(),
            sub_codes,
        }
    }

    /// The built-in cancer domain.
    pub fn cancer() -> Self {
        Self::new(
            "CANCER",
            vec![
                SubCode::new("GENERAL", &["일반암", "암"], None),
                SubCode::new(
                    "SIMILAR",
                    &["유사암", "소액암", "갑상선암", "기타피부암"],
                    Some("GENERAL"),
                ),
                SubCode::new("IN_SITU", &["제자리암", "상피내암"], Some("SIMILAR")),
                SubCode::new("BORDERLINE", &["경계성종양", "경계성 종양"], Some("SIMILAR")),
            ],
        )
    }

    /// Codes in catalog order.
    pub fn codes(&self) -> Vec<CanonicalCode> {
        self.sub_codes.iter().map(|s| s.code.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.sub_codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sub_codes.is_empty()
    }

    pub fn position(&self, code: &CanonicalCode) -> Option<usize> {
        self.sub_codes.iter().position(|s| &s.code == code)
    }

    pub fn contains(&self, code: &CanonicalCode) -> bool {
        self.position(code).is_some()
    }

    pub fn code_at(&self, position: usize) -> &CanonicalCode {
        &self.sub_codes[position].code
    }

    /// Returns true if `ancestor` is a strict ancestor of `code`.
    pub fn is_ancestor(&self, ancestor: usize, code: usize) -> bool {
        let mut current = self.parent_position(code);
        // Bounded by catalog length so a malformed cycle cannot spin.
        let mut hops = 0;
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            hops += 1;
            if hops > self.sub_codes.len() {
                return false;
            }
            current = self.parent_position(p);
        }
        false
    }

    /// Number of strict ancestors; top-level codes have depth 0.
    pub fn depth(&self, position: usize) -> usize {
        (0..self.sub_codes.len())
            .filter(|&a| self.is_ancestor(a, position))
            .count()
    }

    /// The code a coverage row name is scoped to: its first mention.
    ///
    /// "암진단비(유사암제외)" is scoped to GENERAL, "유사암진단비" to SIMILAR.
    pub fn row_scope(&self, row_name: &str) -> Option<&CanonicalCode> {
        self.mentions(row_name)
            .first()
            .map(|m| self.code_at(m.position))
    }

    fn parent_position(&self, position: usize) -> Option<usize> {
        self.sub_codes[position]
            .parent
            .as_ref()
            .and_then(|p| self.position(p))
    }

    /// All keywords of the domain, deduplicated, in catalog order.
    ///
    /// Used as the keyword set handed to evidence retrieval.
    pub fn keywords(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for sub in &self.sub_codes {
            for kw in &sub.keywords {
                if !out.contains(kw) {
                    out.push(kw.clone());
                }
            }
        }
        out
    }

    /// Locates code mentions in `text`.
    ///
    /// Scans left to right over the whitespace-stripped text, taking the
    /// longest keyword at each position, so "유사암" is never also read as
    /// "암". Mentions are deduplicated by code, keeping first occurrence order.
    pub fn mentions(&self, text: &str) -> Vec<Mention> {
        let stripped: String = text.chars().filter(|c| !c.is_whitespace()).collect();

        let mut keywords: Vec<(String, usize)> = Vec::new();
        for (position, sub) in self.sub_codes.iter().enumerate() {
            for kw in &sub.keywords {
                let kw: String = kw.chars().filter(|c| !c.is_whitespace()).collect();
                if !kw.is_empty() && !keywords.iter().any(|(k, _)| *k == kw) {
                    keywords.push((kw, position));
                }
            }
        }
        // Longest first; ties keep catalog order.
        keywords.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()));

        let mut found: Vec<Mention> = Vec::new();
        let mut offset = 0;
        while offset < stripped.len() {
            let rest = &stripped[offset..];
            match keywords.iter().find(|(kw, _)| rest.starts_with(kw.as_str())) {
                Some((kw, position)) => {
                    if !found.iter().any(|m| m.position == *position) {
                        found.push(Mention {
                            position: *position,
                            keyword: kw.clone(),
                            offset,
                        });
                    }
                    offset += kw.len();
                }
                None => {
                    let step = rest.chars().next().map(|c| c.len_utf8()).unwrap_or(1);
                    offset += step;
                }
            }
        }
        found
    }

    /// Validates the catalog structure itself.
    pub fn validate_structure(&self) -> Result<(), String> {
        if self.domain_id.trim().is_empty() {
            return Err("domain_id must not be empty".into());
        }
        if self.sub_codes.is_empty() {
            return Err(format!("domain '{}' has no sub-codes", self.domain_id));
        }
        for (i, sub) in self.sub_codes.iter().enumerate() {
            if sub.code.as_str().trim().is_empty() {
                return Err(format!("domain '{}' has an empty code", self.domain_id));
            }
            if self.sub_codes[..i].iter().any(|s| s.code == sub.code) {
                return Err(format!("duplicate code '{}'", sub.code));
            }
            if sub.keywords.iter().all(|k| k.trim().is_empty()) {
                return Err(format!("code '{}' has no keywords", sub.code));
            }
            if let Some(parent) = &sub.parent {
                if !self.contains(parent) {
                    return Err(format!(
                        "code '{}' names unknown parent '{}'",
                        sub.code, parent
                    ));
                }
                if self.is_ancestor(i, i) {
                    return Err(format!("code '{}' is its own ancestor", sub.code));
                }
            }
        }
        Ok(())
    }
}

/// All configured domains, keyed by domain id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSet {
    pub domains: BTreeMap<String, DomainCatalog>,
}

impl CatalogSet {
    pub fn new(domains: Vec<DomainCatalog>) -> Self {
        Self {
            domains: domains
                .into_iter()
                .map(|d| (d.domain_id.clone(), d))
                .collect(),
        }
    }

    /// Catalog set with only the built-in cancer domain.
    pub fn builtin() -> Self {
        Self::new(vec![DomainCatalog::cancer()])
    }

    pub fn get(&self, domain_id: &str) -> Option<&DomainCatalog> {
        self.domains.get(domain_id)
    }

    /// Returns true if any domain lists `code`.
    pub fn contains_code(&self, code: &CanonicalCode) -> bool {
        self.domains.values().any(|d| d.contains(code))
    }

    pub fn domain_count(&self) -> usize {
        self.domains.len()
    }

    pub fn code_count(&self) -> usize {
        self.domains.values().map(|d| d.len()).sum()
    }
}
