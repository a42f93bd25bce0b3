//! Explanation object model
//!
//! Every explanation has the same shape:
//! - explanation_type
//! - observed_snapshot: { fingerprint, generation } of the alias index used
//! - inputs: { ... }
//! - rules_applied: [ { rule_id, description, evaluation, evidence } ]
//! - conclusion: { ... }
//!
//! Explanations are structured records of what was evaluated, never prose.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExplanationType {
    /// Why a comparison resolved to its state.
    #[serde(rename = "comparison.resolution")]
    ComparisonResolution,
    /// How one insurer's decision was reached.
    #[serde(rename = "decision.canonical")]
    CanonicalDecision,
}

/// Alias snapshot the explained request observed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObservedSnapshot {
    pub fingerprint: String,
    pub generation: u64,
}

impl ObservedSnapshot {
    pub fn new(fingerprint: impl Into<String>, generation: u64) -> Self {
        Self {
            fingerprint: fingerprint.into(),
            generation,
        }
    }
}

/// Rule evaluation result; always explicit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RuleEvaluation {
    True,
    False,
}

/// Raw state backing a rule evaluation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Evidence {
    #[serde(flatten)]
    pub data: BTreeMap<String, serde_json::Value>,
}

impl Evidence {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with(key: impl Into<String>, value: impl Serialize) -> Self {
        let mut evidence = Self::empty();
        evidence.add(key, value);
        evidence
    }

    pub fn add(&mut self, key: impl Into<String>, value: impl Serialize) {
        self.data
            .insert(key.into(), serde_json::to_value(value).unwrap_or_default());
    }

    /// Chaining form of [`Evidence::add`].
    pub fn and(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        self.add(key, value);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuleApplication {
    /// Stable rule identifier (e.g. "CMP-3", "DEC-1")
    pub rule_id: String,
    pub description: String,
    pub evaluation: RuleEvaluation,
    pub evidence: Evidence,
}

impl RuleApplication {
    pub fn satisfied(
        rule_id: impl Into<String>,
        description: impl Into<String>,
        evidence: Evidence,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            description: description.into(),
            evaluation: RuleEvaluation::True,
            evidence,
        }
    }

    pub fn not_satisfied(
        rule_id: impl Into<String>,
        description: impl Into<String>,
        evidence: Evidence,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            description: description.into(),
            evaluation: RuleEvaluation::False,
            evidence,
        }
    }

    pub fn evaluated(
        rule_id: impl Into<String>,
        description: impl Into<String>,
        holds: bool,
        evidence: Evidence,
    ) -> Self {
        if holds {
            Self::satisfied(rule_id, description, evidence)
        } else {
            Self::not_satisfied(rule_id, description, evidence)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConclusionStatus {
    Determined,
    /// Evidence was missing; the reason says which
    Undetermined,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Conclusion {
    pub status: ConclusionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Conclusion {
    pub fn determined(result: impl Serialize) -> Self {
        Self {
            status: ConclusionStatus::Determined,
            result: Some(serde_json::to_value(result).unwrap_or_default()),
            reason: None,
        }
    }

    pub fn undetermined(reason: impl Into<String>) -> Self {
        Self {
            status: ConclusionStatus::Undetermined,
            result: None,
            reason: Some(reason.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Explanation {
    pub explanation_type: ExplanationType,
    pub observed_snapshot: ObservedSnapshot,
    pub inputs: BTreeMap<String, serde_json::Value>,
    /// Rules in evaluation order
    pub rules_applied: Vec<RuleApplication>,
    pub conclusion: Conclusion,
}

impl Explanation {
    pub fn builder(
        explanation_type: ExplanationType,
        snapshot: ObservedSnapshot,
    ) -> ExplanationBuilder {
        ExplanationBuilder::new(explanation_type, snapshot)
    }

    pub fn rule(&self, rule_id: &str) -> Option<&RuleApplication> {
        self.rules_applied.iter().find(|r| r.rule_id == rule_id)
    }
}

pub struct ExplanationBuilder {
    explanation_type: ExplanationType,
    observed_snapshot: ObservedSnapshot,
    inputs: BTreeMap<String, serde_json::Value>,
    rules_applied: Vec<RuleApplication>,
}

impl ExplanationBuilder {
    pub fn new(explanation_type: ExplanationType, snapshot: ObservedSnapshot) -> Self {
        Self {
            explanation_type,
            observed_snapshot: snapshot,
            inputs: BTreeMap::new(),
            rules_applied: Vec::new(),
        }
    }

    pub fn input(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        self.inputs
            .insert(key.into(), serde_json::to_value(value).unwrap_or_default());
        self
    }

    pub fn rule(mut self, rule: RuleApplication) -> Self {
        self.rules_applied.push(rule);
        self
    }

    pub fn conclude(self, result: impl Serialize) -> Explanation {
        self.finish(Conclusion::determined(result))
    }

    pub fn undetermined(self, reason: impl Into<String>) -> Explanation {
        self.finish(Conclusion::undetermined(reason))
    }

    fn finish(self, conclusion: Conclusion) -> Explanation {
        Explanation {
            explanation_type: self.explanation_type,
            observed_snapshot: self.observed_snapshot,
            inputs: self.inputs,
            rules_applied: self.rules_applied,
            conclusion,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explanation_type_serialization() {
        assert_eq!(
            serde_json::to_string(&ExplanationType::ComparisonResolution).unwrap(),
            "\"comparison.resolution\""
        );
    }

    #[test]
    fn test_evaluated_picks_result() {
        let rule = RuleApplication::evaluated("CMP-1", "universe", false, Evidence::empty());
        assert_eq!(rule.evaluation, RuleEvaluation::False);
    }

    #[test]
    fn test_builder() {
        let explanation = Explanation::builder(
            ExplanationType::CanonicalDecision,
            ObservedSnapshot::new("abc", 2),
        )
        .input("insurer_id", "A")
        .rule(RuleApplication::satisfied(
            "DEC-1",
            "evidence present",
            Evidence::with("evidence_count", 3).and("candidates", vec!["SIMILAR"]),
        ))
        .conclude("DECIDED");

        assert_eq!(explanation.observed_snapshot.generation, 2);
        assert_eq!(explanation.rules_applied.len(), 1);
        assert_eq!(explanation.conclusion.status, ConclusionStatus::Determined);

        let json = serde_json::to_value(&explanation).unwrap();
        assert_eq!(json["rules_applied"][0]["evidence"]["evidence_count"], 3);
        assert_eq!(json["rules_applied"][0]["evaluation"], "true");
    }

    #[test]
    fn test_undetermined_conclusion() {
        let explanation = Explanation::builder(
            ExplanationType::CanonicalDecision,
            ObservedSnapshot::new("abc", 1),
        )
        .undetermined("no_evidence");
        assert_eq!(explanation.conclusion.status, ConclusionStatus::Undetermined);
        assert_eq!(explanation.conclusion.reason.as_deref(), Some("no_evidence"));
    }
}
