//! Evidence span types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of document an excerpt was located in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceDocType {
    /// 약관
    PolicyTerms,
    /// 사업방법서
    BusinessMethod,
    /// 상품요약서
    ProductSummary,
    /// 가입설계서
    Proposal,
}

impl SourceDocType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceDocType::PolicyTerms => "POLICY_TERMS",
            SourceDocType::BusinessMethod => "BUSINESS_METHOD",
            SourceDocType::ProductSummary => "PRODUCT_SUMMARY",
            SourceDocType::Proposal => "PROPOSAL",
        }
    }
}

/// A located, verbatim excerpt of a source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceSpan {
    pub document_id: String,
    pub page: u32,
    pub span_text: String,
    pub source_doc_type: SourceDocType,
}

impl EvidenceSpan {
    pub fn new(
        document_id: impl Into<String>,
        page: u32,
        span_text: impl Into<String>,
        source_doc_type: SourceDocType,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            page,
            span_text: span_text.into(),
            source_doc_type,
        }
    }

    /// Policy-terms span; the common case in tests and fixtures.
    pub fn policy(document_id: impl Into<String>, page: u32, span_text: impl Into<String>) -> Self {
        Self::new(document_id, page, span_text, SourceDocType::PolicyTerms)
    }
}

/// Evidentiary role of a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvidenceType {
    /// The span defines a term and names what it includes
    DefinitionIncluded,
    /// The span excludes named sub-categories
    Exclusion,
    /// The span frames a sub-category as paid separately
    SeparateBenefit,
    /// No pattern matched
    Unknown,
}

impl EvidenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceType::DefinitionIncluded => "DEFINITION_INCLUDED",
            EvidenceType::Exclusion => "EXCLUSION",
            EvidenceType::SeparateBenefit => "SEPARATE_BENEFIT",
            EvidenceType::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for EvidenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A span with its evidentiary role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedEvidence {
    pub span: EvidenceSpan,
    pub evidence_type: EvidenceType,
    /// Trigger literal that decided the type; empty for UNKNOWN
    pub matched_trigger: String,
}
