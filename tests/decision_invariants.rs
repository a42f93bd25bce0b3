//! Decision Invariant Tests
//!
//! Tests for canonical decisions built from typed policy text:
//! - Definition, separate-benefit, and exclusion scenarios
//! - Subjects follow the catalog hierarchy, not sentence order
//! - Exclusion is monotonic: an excluded code never comes back
//! - Decided codes are catalog codes mentioned by supporting evidence
//! - Decisions are deterministic

use covercanon::alias::CandidateSet;
use covercanon::catalog::{CanonicalCode, DomainCatalog};
use covercanon::decision::{
    CanonicalDecisionEngine, Decision, DecisionMethod, DecisionStatus, FlagAction, Verdict,
};
use covercanon::evidence::{EvidenceSpan, EvidenceTyper};
use std::collections::BTreeSet;

// =============================================================================
// Helper Functions
// =============================================================================

fn decide(texts: &[&str]) -> Decision {
    let typed = EvidenceTyper::standard().type_all(&spans_of(texts));
    CanonicalDecisionEngine::default().decide(
        "A",
        &DomainCatalog::cancer(),
        CandidateSet::empty(),
        &typed,
    )
}

/// Decides for the coverage row named `row_name`.
fn decide_for_row(row_name: &str, texts: &[&str]) -> Decision {
    let catalog = DomainCatalog::cancer();
    let typed = EvidenceTyper::standard().type_all(&spans_of(texts));
    CanonicalDecisionEngine::default().decide_in_scope(
        "A",
        &catalog,
        catalog.row_scope(row_name),
        CandidateSet::empty(),
        &typed,
    )
}

fn spans_of(texts: &[&str]) -> Vec<EvidenceSpan> {
    texts
        .iter()
        .enumerate()
        .map(|(i, t)| EvidenceSpan::policy("terms-A", 10 + i as u32, *t))
        .collect()
}

fn codes(list: &[&str]) -> BTreeSet<CanonicalCode> {
    list.iter().map(|c| CanonicalCode::new(*c)).collect()
}

const POLICY_TEXTS: &[&str] = &[
    "유사암은 갑상선암, 제자리암을 포함한다",
    "제자리암은 유사암과 별도 담보로 별도 지급한다",
    "암(유사암, 제자리암, 경계성종양은 제외한다)",
    "경계성종양은 보장하지 않는다",
    "일반암이라 함은 악성신생물을 말한다",
    "보험기간 중 진단 확정 시 지급한다",
];

// =============================================================================
// Scenario Tests
// =============================================================================

/// Definition includes the subject and suppresses narrower codes.
#[test]
fn test_definition_scenario() {
    let decision = decide(&["유사암은 갑상선암, 제자리암을 포함한다"]);

    assert_eq!(decision.status(), DecisionStatus::Decided);
    assert_eq!(decision.method(), DecisionMethod::PolicyEvidence);
    assert_eq!(decision.decided_codes(), codes(&["SIMILAR"]));

    let actions: Vec<FlagAction> = decision.trace()[0].changes.iter().map(|c| c.action).collect();
    assert!(actions.contains(&FlagAction::SuppressNarrower));
}

/// Separate benefit includes the subject and clears its parent.
#[test]
fn test_separate_benefit_scenario() {
    let decision = decide(&["제자리암은 유사암과 별도 담보로 별도 지급한다"]);

    assert_eq!(decision.decided_codes(), codes(&["IN_SITU"]));
    let actions: Vec<FlagAction> = decision.trace()[0].changes.iter().map(|c| c.action).collect();
    assert_eq!(actions, vec![FlagAction::Include, FlagAction::ClearParent]);
}

/// Exclusion list inside a broader scope keeps the broader code.
#[test]
fn test_exclusion_carve_out_scenario() {
    let decision = decide(&["암(유사암, 제자리암, 경계성종양은 제외한다)"]);

    assert_eq!(decision.decided_codes(), codes(&["GENERAL"]));
    let changes = &decision.trace()[0].changes;
    assert_eq!(changes[0].action, FlagAction::CarveScope);
    assert!(changes[1..].iter().all(|c| c.action == FlagAction::Exclude));
}

/// Exclusion list under a general-scope row keeps the row's scope.
#[test]
fn test_exclusion_on_general_row_scenario() {
    let text = "... 유사암, 제자리암, 경계성종양은 제외한다";

    let decision = decide_for_row("암진단비(유사암제외)", &[text]);
    assert_eq!(decision.decided_codes(), codes(&["GENERAL"]));
    assert_eq!(decision.row_scope(), Some(&CanonicalCode::new("GENERAL")));
    let changes = &decision.trace()[0].changes;
    assert_eq!(changes[0].action, FlagAction::CarveScope);
    assert_eq!(changes[0].code.as_str(), "GENERAL");
    assert!(changes[1..].iter().all(|c| c.action == FlagAction::Exclude));

    // Without a row scope nothing is left to carve out.
    let decision = decide(&[text]);
    assert_eq!(decision.status(), DecisionStatus::Undecided);
    assert_eq!(decision.method(), DecisionMethod::EvidenceInconclusive);
}

/// A definition names its scope wherever the broader code sits in the sentence.
#[test]
fn test_definition_with_parent_named_last() {
    let decision = decide(&["제자리암은 유사암에 포함된다"]);

    assert_eq!(decision.decided_codes(), codes(&["SIMILAR"]));
    let changes = &decision.trace()[0].changes;
    assert_eq!(changes[0].code.as_str(), "SIMILAR");
    assert_eq!(changes[1].code.as_str(), "IN_SITU");
    assert_eq!(changes[1].action, FlagAction::SuppressNarrower);
}

/// A separate benefit pays the narrower code wherever the parent sits.
#[test]
fn test_separate_benefit_with_parent_named_first() {
    let decision = decide(&["유사암과 별도로 제자리암 진단비를 별도 지급한다"]);

    assert_eq!(decision.decided_codes(), codes(&["IN_SITU"]));
    let changes = &decision.trace()[0].changes;
    assert_eq!(changes[0].code.as_str(), "IN_SITU");
    assert_eq!(changes[1].code.as_str(), "SIMILAR");
    assert_eq!(changes[1].action, FlagAction::ClearParent);
}

/// No policy text means no decision.
#[test]
fn test_no_evidence_is_undecided() {
    let decision = decide(&[]);
    assert_eq!(decision.status(), DecisionStatus::Undecided);
    assert_eq!(decision.method(), DecisionMethod::NoEvidence);
    assert!(decision.decided_codes().is_empty());
}

/// Text that mentions nothing or types as unknown decides nothing.
#[test]
fn test_unusable_evidence_is_inconclusive() {
    let decision = decide(&["보험기간 중 진단 확정 시 지급한다", "경계성종양은 보장하지 않는다"]);
    assert_eq!(decision.status(), DecisionStatus::Undecided);
    assert_eq!(decision.method(), DecisionMethod::EvidenceInconclusive);
}

// =============================================================================
// Monotonic Exclusion Tests
// =============================================================================

/// Later inclusions of an excluded code are blocked.
#[test]
fn test_exclusion_is_monotonic() {
    let decision = decide(&[
        "유사암은 보장하지 않는다",
        "유사암은 갑상선암을 포함한다",
        "유사암 진단 시 별도 지급한다",
    ]);

    assert!(!decision.decided_codes().contains(&CanonicalCode::new("SIMILAR")));
    assert_eq!(decision.method(), DecisionMethod::EvidenceInconclusive);

    for step in &decision.trace()[1..] {
        let change = &step.changes[0];
        assert_eq!(change.action, FlagAction::BlockedByExclusion);
        assert!(change.contradiction_resolved);
        assert!(!change.to);
    }
    assert_eq!(decision.contradiction_count(), 2);
}

/// Exclusion lists naming several codes never decide any of them, alone or
/// mixed with inclusions, in any order, with or without a row scope.
#[test]
fn test_multi_code_exclusion_is_monotonic() {
    let catalog = DomainCatalog::cancer();
    let exclusions = [
        "암 및 유사암은 보장하지 않는다",
        "유사암, 제자리암, 경계성종양은 제외한다",
        "보험금 지급사유에서 유사암, 제자리암, 경계성종양은 제외한다",
        "제자리암과 경계성종양은 보장하지 않는다",
        "암(유사암, 제자리암, 경계성종양은 제외한다)",
    ];
    let inclusions = [
        "유사암은 갑상선암, 제자리암을 포함한다",
        "제자리암은 유사암과 별도 담보로 별도 지급한다",
        "일반암이라 함은 악성신생물을 말한다",
        "경계성종양은 유사암에 해당한다",
    ];
    let rows = ["", "암진단비", "유사암진단비"];

    for exclusion in exclusions {
        let typed = EvidenceTyper::standard().type_all(&spans_of(&[exclusion]));
        let step = CanonicalDecisionEngine::default()
            .decide("A", &catalog, CandidateSet::empty(), &typed);
        let listed: Vec<CanonicalCode> = step.trace()[0]
            .changes
            .iter()
            .filter(|c| c.action == FlagAction::Exclude)
            .map(|c| c.code.clone())
            .collect();
        assert!(!listed.is_empty(), "{}", exclusion);

        for row in rows {
            let alone = decide_for_row(row, &[exclusion]);
            for code in &listed {
                assert!(!alone.decided_codes().contains(code), "{} / {}", exclusion, row);
            }

            for inclusion in inclusions {
                for texts in [[exclusion, inclusion], [inclusion, exclusion]] {
                    let decided = decide_for_row(row, &texts).decided_codes();
                    for code in &listed {
                        assert!(!decided.contains(code), "{:?} / {} / {}", texts, row, code);
                    }
                }
            }
        }
    }
}

/// An exclusion with no scope of its own or of the row decides nothing.
#[test]
fn test_exclusion_only_lists_are_undecided() {
    for text in [
        "암 및 유사암은 보장하지 않는다",
        "유사암, 제자리암, 경계성종양은 제외한다",
        "보험금 지급사유에서 유사암, 제자리암, 경계성종양은 제외한다",
    ] {
        let decision = decide(&[text]);
        assert_eq!(decision.status(), DecisionStatus::Undecided, "{}", text);
        assert!(decision.trace()[0]
            .changes
            .iter()
            .all(|c| c.action == FlagAction::Exclude && !c.to));
    }

    // A row scoped to a listed code has nothing to carve out.
    let decision = decide_for_row("암진단비", &["암 및 유사암은 보장하지 않는다"]);
    assert_eq!(decision.status(), DecisionStatus::Undecided);
}

/// Exclusion after inclusion removes the code regardless of order.
#[test]
fn test_exclusion_overrides_earlier_inclusion() {
    let decision = decide(&[
        "제자리암은 유사암과 별도 담보로 별도 지급한다",
        "제자리암은 보장하지 않는다",
    ]);
    assert!(decision.decided_codes().is_empty());
    assert!(decision.trace()[1].changes[0].contradiction_resolved);
}

// =============================================================================
// No-Fabrication and Evidence-Backing Tests
// =============================================================================

/// Every decided code is in the catalog and backed by a span mentioning it.
#[test]
fn test_decided_codes_backed_by_mentions() {
    let catalog = DomainCatalog::cancer();
    for window in 1..=POLICY_TEXTS.len() {
        for texts in POLICY_TEXTS.windows(window) {
            let decision = decide(texts);
            let Verdict::Decided(decided) = decision.verdict() else {
                continue;
            };

            for (code, refs) in decided.iter() {
                assert!(catalog.contains(code));
                assert!(!refs.as_slice().is_empty());
                for r in refs.as_slice() {
                    let step = &decision.trace()[r.evidence_index];
                    assert!(step.mentioned.contains(code));
                    assert_eq!(step.page, r.page);
                }
            }
        }
    }
}

/// Alias candidates never become decided codes on their own.
#[test]
fn test_candidates_do_not_decide() {
    let candidates: CandidateSet = vec![CanonicalCode::new("GENERAL")].into_iter().collect();
    let decision = CanonicalDecisionEngine::default().decide(
        "A",
        &DomainCatalog::cancer(),
        candidates,
        &[],
    );
    assert_eq!(decision.status(), DecisionStatus::Undecided);
    assert_eq!(decision.candidates().len(), 1);
}

// =============================================================================
// Determinism Tests
// =============================================================================

/// Same evidence, same decision record.
#[test]
fn test_decision_is_deterministic() {
    let first = serde_json::to_value(decide(POLICY_TEXTS).record()).unwrap();
    for _ in 0..50 {
        let again = serde_json::to_value(decide(POLICY_TEXTS).record()).unwrap();
        assert_eq!(again, first);
    }
}

/// The evidence cap limits folding and is recorded.
#[test]
fn test_cap_truncates() {
    let spans: Vec<EvidenceSpan> = (0..5)
        .map(|i| EvidenceSpan::policy("terms-A", i, "유사암은 갑상선암을 포함한다"))
        .collect();
    let typed = EvidenceTyper::standard().type_all(&spans);
    let decision = CanonicalDecisionEngine::new(2).decide(
        "A",
        &DomainCatalog::cancer(),
        CandidateSet::empty(),
        &typed,
    );

    assert_eq!(decision.trace().len(), 2);
    assert_eq!(decision.truncated_from(), Some(5));
}
