//! Evidence retrieval boundary
//!
//! Retrieval is an external collaborator. This module fixes its contract:
//! given an insurer and a keyword set, return a finite list ordered by page
//! ascending, then keyword-hit count descending. A failed or timed-out
//! retrieval is folded as zero evidence by the caller, never raised.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use super::types::EvidenceSpan;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RetrievalError {
    #[error("Evidence source unavailable for insurer '{0}'")]
    Unavailable(String),

    #[error("Evidence retrieval timed out after {0}ms")]
    Timeout(u64),

    #[error("Evidence retrieval failed: {0}")]
    Failed(String),
}

/// Source of located policy excerpts.
pub trait EvidenceRetriever: Send + Sync {
    /// Returns spans for `insurer_id` matching any of `keywords`, in
    /// contract order.
    fn retrieve(
        &self,
        insurer_id: &str,
        keywords: &[String],
    ) -> Result<Vec<EvidenceSpan>, RetrievalError>;
}

/// What retrieval produced for one insurer after downgrading errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalOutcome {
    pub spans: Vec<EvidenceSpan>,
    /// Set when retrieval failed and `spans` is empty for that reason
    pub unavailable: Option<RetrievalError>,
}

impl RetrievalOutcome {
    pub fn is_unavailable(&self) -> bool {
        self.unavailable.is_some()
    }
}

/// Calls the retriever and converts any failure into zero evidence.
pub fn retrieve_or_empty(
    retriever: &dyn EvidenceRetriever,
    insurer_id: &str,
    keywords: &[String],
) -> RetrievalOutcome {
    match retriever.retrieve(insurer_id, keywords) {
        Ok(spans) => RetrievalOutcome {
            spans,
            unavailable: None,
        },
        Err(e) => RetrievalOutcome {
            spans: Vec::new(),
            unavailable: Some(e),
        },
    }
}

/// Number of distinct keywords occurring in the span text.
pub fn keyword_hits(span: &EvidenceSpan, keywords: &[String]) -> usize {
    let text: String = span.span_text.chars().filter(|c| !c.is_whitespace()).collect();
    keywords
        .iter()
        .map(|k| k.chars().filter(|c| !c.is_whitespace()).collect::<String>())
        .filter(|k| !k.is_empty())
        .collect::<BTreeSet<_>>()
        .iter()
        .filter(|k| text.contains(k.as_str()))
        .count()
}

/// Keeps spans with at least one keyword hit, in contract order.
///
/// The sort is stable, so spans tied on page and hits keep source order.
pub fn order_by_contract(spans: Vec<EvidenceSpan>, keywords: &[String]) -> Vec<EvidenceSpan> {
    let mut scored: Vec<(usize, EvidenceSpan)> = spans
        .into_iter()
        .map(|s| (keyword_hits(&s, keywords), s))
        .filter(|(hits, _)| *hits > 0)
        .collect();
    scored.sort_by(|(ha, a), (hb, b)| a.page.cmp(&b.page).then(hb.cmp(ha)));
    scored.into_iter().map(|(_, s)| s).collect()
}

/// In-memory retriever over pre-extracted spans.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRetriever {
    spans: BTreeMap<String, Vec<EvidenceSpan>>,
    unavailable: BTreeSet<String>,
}

impl InMemoryRetriever {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, insurer_id: impl Into<String>, span: EvidenceSpan) {
        self.spans.entry(insurer_id.into()).or_default().push(span);
    }

    pub fn add_all(&mut self, insurer_id: impl Into<String>, spans: Vec<EvidenceSpan>) {
        self.spans.entry(insurer_id.into()).or_default().extend(spans);
    }

    /// Makes every retrieval for `insurer_id` fail.
    pub fn mark_unavailable(&mut self, insurer_id: impl Into<String>) {
        self.unavailable.insert(insurer_id.into());
    }
}

impl EvidenceRetriever for InMemoryRetriever {
    fn retrieve(
        &self,
        insurer_id: &str,
        keywords: &[String],
    ) -> Result<Vec<EvidenceSpan>, RetrievalError> {
        if self.unavailable.contains(insurer_id) {
            return Err(RetrievalError::Unavailable(insurer_id.to_string()));
        }
        let spans = self.spans.get(insurer_id).cloned().unwrap_or_default();
        Ok(order_by_contract(spans, keywords))
    }
}
