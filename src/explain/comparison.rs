//! Comparison resolution explanation
//!
//! Type: comparison.resolution
//! One rule application per priority rule the resolver evaluated, ending
//! with the rule that decided the state.

use serde::Serialize;

use super::model::{Evidence, Explanation, ExplanationType, ObservedSnapshot, RuleApplication};
use super::rules::RuleRegistry;
use crate::comparison::{ComparisonOutcome, InsurerComparisonInput};

#[derive(Debug, Serialize)]
struct InsurerSummary<'a> {
    insurer_id: &'a str,
    in_universe: bool,
    status: &'static str,
    candidates: usize,
    decided_codes: Vec<String>,
    required_slots_present: bool,
}

pub struct ComparisonExplainer {
    rules: RuleRegistry,
}

impl Default for ComparisonExplainer {
    fn default() -> Self {
        Self::new()
    }
}

impl ComparisonExplainer {
    pub fn new() -> Self {
        Self {
            rules: RuleRegistry::new(),
        }
    }

    pub fn explain(
        &self,
        snapshot: ObservedSnapshot,
        inputs: &[InsurerComparisonInput],
        outcome: &ComparisonOutcome,
    ) -> Explanation {
        let insurers: Vec<InsurerSummary<'_>> = inputs
            .iter()
            .map(|i| InsurerSummary {
                insurer_id: i.insurer_id(),
                in_universe: i.in_universe,
                status: i.decision.status().as_str(),
                candidates: i.decision.candidates().len(),
                decided_codes: i
                    .decision
                    .decided_codes()
                    .iter()
                    .map(|c| c.to_string())
                    .collect(),
                required_slots_present: i.required_slots_present,
            })
            .collect();

        let mut builder = Explanation::builder(ExplanationType::ComparisonResolution, snapshot)
            .input("query", &outcome.query)
            .input("insurers", insurers);

        for check in &outcome.checks {
            builder = builder.rule(RuleApplication::evaluated(
                &check.rule_id,
                self.rules.description(&check.rule_id),
                check.matched,
                Evidence::with("insurers", &check.insurers),
            ));
        }

        builder.conclude(serde_json::json!({
            "state": outcome.state,
            "next_action": outcome.next_action,
            "message_code": outcome.message_code,
            "overlap_codes": outcome.overlap_codes,
        }))
    }
}
