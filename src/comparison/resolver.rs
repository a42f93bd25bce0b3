//! Comparison state resolver
//!
//! Priority rules, first match wins:
//!
//! | Rule  | Condition                                   | State                  |
//! |-------|---------------------------------------------|------------------------|
//! | CMP-1 | any insurer lacks the coverage in universe  | `out_of_universe`      |
//! | CMP-2 | every insurer recalled no candidate         | `unmapped`             |
//! | CMP-3 | any insurer UNDECIDED                       | `undecided`            |
//! | CMP-4 | decided code sets share no code             | `non_comparable`       |
//! | CMP-5 | any insurer missing required slots          | `comparable_with_gaps` |
//! | CMP-6 | otherwise                                   | `comparable`           |
//!
//! An empty insurer list falls through to CMP-2 and resolves `unmapped`.

use std::collections::BTreeSet;

use super::types::{
    ComparisonOutcome, ComparisonState, Guidance, InsurerComparisonInput, InsurerGuidance,
    RuleCheck,
};
use crate::catalog::CanonicalCode;
use crate::decision::{DecisionMethod, DecisionStatus};

pub const RULE_OUT_OF_UNIVERSE: &str = "CMP-1";
pub const RULE_UNMAPPED: &str = "CMP-2";
pub const RULE_UNDECIDED: &str = "CMP-3";
pub const RULE_DISJOINT: &str = "CMP-4";
pub const RULE_MISSING_SLOTS: &str = "CMP-5";
pub const RULE_COMPARABLE: &str = "CMP-6";

/// Stateless; safe to share across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComparisonStateResolver;

impl ComparisonStateResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(&self, query: &str, inputs: &[InsurerComparisonInput]) -> ComparisonOutcome {
        let mut checks = Vec::with_capacity(6);
        let guidance = collect_guidance(inputs);

        let finish = |state: ComparisonState,
                      overlap: BTreeSet<CanonicalCode>,
                      checks: Vec<RuleCheck>| ComparisonOutcome {
            query: query.to_string(),
            state,
            next_action: state.next_action(),
            message_code: state.message_code(),
            overlap_codes: overlap,
            guidance: guidance.clone(),
            checks,
        };

        let outside = offenders(inputs, |i| !i.in_universe);
        if push_check(&mut checks, RULE_OUT_OF_UNIVERSE, !outside.is_empty(), outside) {
            return finish(ComparisonState::OutOfUniverse, BTreeSet::new(), checks);
        }

        let all_unmapped = inputs.iter().all(|i| i.decision.candidates().is_empty());
        let unmapped = offenders(inputs, |i| i.decision.candidates().is_empty());
        if push_check(&mut checks, RULE_UNMAPPED, all_unmapped, unmapped) {
            return finish(ComparisonState::Unmapped, BTreeSet::new(), checks);
        }

        let undecided = offenders(inputs, |i| i.decision.status() == DecisionStatus::Undecided);
        if push_check(&mut checks, RULE_UNDECIDED, !undecided.is_empty(), undecided) {
            return finish(ComparisonState::Undecided, BTreeSet::new(), checks);
        }

        let overlap = common_codes(inputs);
        let disjoint = overlap.is_empty();
        let all: Vec<String> = if disjoint {
            inputs.iter().map(|i| i.insurer_id().to_string()).collect()
        } else {
            Vec::new()
        };
        if push_check(&mut checks, RULE_DISJOINT, disjoint, all) {
            return finish(ComparisonState::NonComparable, overlap, checks);
        }

        let gaps = offenders(inputs, |i| !i.required_slots_present);
        if push_check(&mut checks, RULE_MISSING_SLOTS, !gaps.is_empty(), gaps) {
            return finish(ComparisonState::ComparableWithGaps, overlap, checks);
        }

        push_check(&mut checks, RULE_COMPARABLE, true, Vec::new());
        finish(ComparisonState::Comparable, overlap, checks)
    }
}

fn push_check(
    checks: &mut Vec<RuleCheck>,
    rule_id: &str,
    matched: bool,
    insurers: Vec<String>,
) -> bool {
    checks.push(RuleCheck {
        rule_id: rule_id.to_string(),
        matched,
        insurers,
    });
    matched
}

fn offenders<F>(inputs: &[InsurerComparisonInput], pred: F) -> Vec<String>
where
    F: Fn(&InsurerComparisonInput) -> bool,
{
    inputs
        .iter()
        .filter(|i| pred(i))
        .map(|i| i.insurer_id().to_string())
        .collect()
}

/// Intersection of all decided code sets. Empty input yields an empty set.
fn common_codes(inputs: &[InsurerComparisonInput]) -> BTreeSet<CanonicalCode> {
    let mut sets = inputs.iter().map(|i| i.decision.decided_codes());
    let Some(first) = sets.next() else {
        return BTreeSet::new();
    };
    sets.fold(first, |acc, codes| acc.intersection(&codes).cloned().collect())
}

/// Every condition observed per insurer, in input order.
fn collect_guidance(inputs: &[InsurerComparisonInput]) -> Vec<InsurerGuidance> {
    let overlap = common_codes(inputs);
    let all_decided = inputs.iter().all(|i| i.decision.is_decided());
    let mut out = Vec::new();

    for input in inputs {
        let mut push = |guidance: Guidance| {
            out.push(InsurerGuidance {
                insurer_id: input.insurer_id().to_string(),
                guidance,
            })
        };

        if !input.in_universe {
            push(Guidance::UniverseMiss);
        }
        if input.decision.candidates().is_empty() {
            push(Guidance::RecallMiss);
        }
        if input.retrieval_unavailable {
            push(Guidance::RetrievalUnavailable);
        }
        match input.decision.method() {
            DecisionMethod::NoEvidence => push(Guidance::NoEvidence),
            DecisionMethod::EvidenceInconclusive => push(Guidance::EvidenceInconclusive),
            DecisionMethod::PolicyEvidence => {
                if all_decided && overlap.is_empty() && inputs.len() > 1 {
                    push(Guidance::CodeSetDisjoint);
                }
            }
        }
        if !input.required_slots_present {
            push(Guidance::MissingSlot);
        }
    }
    out
}
