//! Canonical decision explanation
//!
//! Type: decision.canonical

use super::model::{Evidence, Explanation, ExplanationType, ObservedSnapshot, RuleApplication};
use super::rules::RuleRegistry;
use crate::decision::{Decision, DecisionMethod, FlagAction};

pub struct DecisionExplainer {
    rules: RuleRegistry,
}

impl Default for DecisionExplainer {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionExplainer {
    pub fn new() -> Self {
        Self {
            rules: RuleRegistry::new(),
        }
    }

    pub fn explain(&self, snapshot: ObservedSnapshot, decision: &Decision) -> Explanation {
        let trace = decision.trace();
        let candidates: Vec<String> = decision.candidates().iter().map(|c| c.to_string()).collect();

        let mut builder = Explanation::builder(ExplanationType::CanonicalDecision, snapshot)
            .input("insurer_id", decision.insurer_id())
            .input("domain_id", decision.domain_id())
            .input("evidence_count", trace.len())
            .input("candidates", &candidates);
        if let Some(original) = decision.truncated_from() {
            builder = builder.input("truncated_from", original);
        }

        builder = builder.rule(RuleApplication::evaluated(
            "DEC-1",
            self.rules.description("DEC-1"),
            decision.method() != DecisionMethod::NoEvidence,
            Evidence::with("evidence_count", trace.len()).and("candidates", &candidates),
        ));

        if decision.method() == DecisionMethod::NoEvidence {
            return builder.undetermined(DecisionMethod::NoEvidence.as_str());
        }

        builder = builder.rule(RuleApplication::satisfied(
            "DEC-2",
            self.rules.description("DEC-2"),
            Evidence::with("steps", trace).and("contradictions", decision.contradiction_count()),
        ));

        let mut locked: Vec<String> = trace
            .iter()
            .flat_map(|s| s.changes.iter())
            .filter(|c| c.action == FlagAction::Exclude)
            .map(|c| c.code.to_string())
            .collect();
        locked.sort();
        locked.dedup();
        let blocked = trace
            .iter()
            .flat_map(|s| s.changes.iter())
            .filter(|c| c.action == FlagAction::BlockedByExclusion)
            .count();
        builder = builder.rule(RuleApplication::evaluated(
            "DEC-3",
            self.rules.description("DEC-3"),
            !locked.is_empty(),
            Evidence::with("locked_codes", &locked).and("blocked_inclusions", blocked),
        ));

        let record = decision.record();
        builder = builder.rule(RuleApplication::evaluated(
            "DEC-4",
            self.rules.description("DEC-4"),
            decision.is_decided(),
            Evidence::with("decided_codes", &record.decided_codes)
                .and("evidence_refs", &record.evidence_refs),
        ));

        if decision.is_decided() {
            builder.conclude(serde_json::json!({
                "status": record.status,
                "decided_codes": record.decided_codes,
                "decision_method": record.decision_method,
            }))
        } else {
            builder.undetermined(record.decision_method.as_str())
        }
    }
}
