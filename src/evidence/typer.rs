//! Evidence typing
//!
//! Pattern families are checked in a fixed priority and the first match
//! wins. SEPARATE_BENEFIT precedes DEFINITION_INCLUDED: text that both reads
//! as "included" and "paid separately" must be typed as separate, because
//! that framing makes the sub-category independent of its parent.

use super::types::{EvidenceSpan, EvidenceType, TypedEvidence};

/// An ordered list of trigger literals for one evidence type.
#[derive(Debug, Clone)]
pub struct PatternFamily {
    pub evidence_type: EvidenceType,
    pub triggers: Vec<String>,
}

impl PatternFamily {
    pub fn new(evidence_type: EvidenceType, triggers: &[&str]) -> Self {
        Self {
            evidence_type,
            triggers: triggers.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// First trigger found in whitespace-stripped text.
    fn find(&self, stripped: &str) -> Option<&str> {
        self.triggers
            .iter()
            .find(|t| stripped.contains(&strip_whitespace(t)))
            .map(|t| t.as_str())
    }
}

/// Stateless span classifier.
#[derive(Debug, Clone)]
pub struct EvidenceTyper {
    families: Vec<PatternFamily>,
}

impl Default for EvidenceTyper {
    fn default() -> Self {
        Self::standard()
    }
}

impl EvidenceTyper {
    /// The standard priority: separate benefit, exclusion, definition.
    pub fn standard() -> Self {
        Self {
            families: vec![
                PatternFamily::new(
                    EvidenceType::SeparateBenefit,
                    &["별도 지급", "별도로 지급", "별도 담보", "별도의 보험금", "별도로 보장"],
                ),
                PatternFamily::new(
                    EvidenceType::Exclusion,
                    &["제외", "면책", "보장하지 않", "지급하지 않"],
                ),
                PatternFamily::new(
                    EvidenceType::DefinitionIncluded,
                    &["포함", "해당", "정의", "이라 함은", "라 함은"],
                ),
            ],
        }
    }

    /// Typer with caller-supplied families, checked in the given order.
    pub fn with_families(families: Vec<PatternFamily>) -> Self {
        Self { families }
    }

    pub fn families(&self) -> &[PatternFamily] {
        &self.families
    }

    /// Types one span.
    pub fn type_evidence(&self, span: &EvidenceSpan) -> TypedEvidence {
        let stripped = strip_whitespace(&span.span_text);
        for family in &self.families {
            if let Some(trigger) = family.find(&stripped) {
                return TypedEvidence {
                    span: span.clone(),
                    evidence_type: family.evidence_type,
                    matched_trigger: trigger.to_string(),
                };
            }
        }
        TypedEvidence {
            span: span.clone(),
            evidence_type: EvidenceType::Unknown,
            matched_trigger: String::new(),
        }
    }

    /// Types spans, preserving their order.
    pub fn type_all(&self, spans: &[EvidenceSpan]) -> Vec<TypedEvidence> {
        spans.iter().map(|s| self.type_evidence(s)).collect()
    }
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}
