//! Comparison outcome types
//!
//! Every outcome field is a closed enumeration or a set of catalog codes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::catalog::CanonicalCode;
use crate::decision::Decision;

/// The six terminal comparison states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonState {
    Comparable,
    ComparableWithGaps,
    NonComparable,
    Unmapped,
    Undecided,
    OutOfUniverse,
}

impl ComparisonState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonState::Comparable => "comparable",
            ComparisonState::ComparableWithGaps => "comparable_with_gaps",
            ComparisonState::NonComparable => "non_comparable",
            ComparisonState::Unmapped => "unmapped",
            ComparisonState::Undecided => "undecided",
            ComparisonState::OutOfUniverse => "out_of_universe",
        }
    }

    pub fn next_action(&self) -> NextAction {
        match self {
            ComparisonState::Comparable => NextAction::Compare,
            ComparisonState::ComparableWithGaps => NextAction::VerifyPolicy,
            ComparisonState::NonComparable
            | ComparisonState::Unmapped
            | ComparisonState::Undecided
            | ComparisonState::OutOfUniverse => NextAction::RequestMoreInfo,
        }
    }

    pub fn message_code(&self) -> MessageCode {
        match self {
            ComparisonState::Comparable => MessageCode::CoverageComparable,
            ComparisonState::ComparableWithGaps => MessageCode::RequiredSlotsMissing,
            ComparisonState::NonComparable => MessageCode::CoverageScopeDisjoint,
            ComparisonState::Unmapped => MessageCode::CoverageUnmapped,
            ComparisonState::Undecided => MessageCode::InsufficientPolicyEvidence,
            ComparisonState::OutOfUniverse => MessageCode::CoverageNotInUniverse,
        }
    }
}

impl fmt::Display for ComparisonState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NextAction {
    RequestMoreInfo,
    VerifyPolicy,
    Compare,
}

/// Fixed message code per state, rendered by the response assembler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageCode {
    CoverageComparable,
    RequiredSlotsMissing,
    CoverageScopeDisjoint,
    CoverageUnmapped,
    InsufficientPolicyEvidence,
    CoverageNotInUniverse,
}

impl MessageCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageCode::CoverageComparable => "COVERAGE_COMPARABLE",
            MessageCode::RequiredSlotsMissing => "REQUIRED_SLOTS_MISSING",
            MessageCode::CoverageScopeDisjoint => "COVERAGE_SCOPE_DISJOINT",
            MessageCode::CoverageUnmapped => "COVERAGE_UNMAPPED",
            MessageCode::InsufficientPolicyEvidence => "INSUFFICIENT_POLICY_EVIDENCE",
            MessageCode::CoverageNotInUniverse => "COVERAGE_NOT_IN_UNIVERSE",
        }
    }
}

/// Per-insurer condition behind a non-comparable result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Guidance {
    NoEvidence,
    EvidenceInconclusive,
    UniverseMiss,
    RecallMiss,
    CodeSetDisjoint,
    MissingSlot,
    RetrievalUnavailable,
}

impl Guidance {
    /// The state this condition leads to when it is the deciding one.
    pub fn terminal_state(&self) -> ComparisonState {
        match self {
            Guidance::NoEvidence
            | Guidance::EvidenceInconclusive
            | Guidance::RetrievalUnavailable => ComparisonState::Undecided,
            Guidance::UniverseMiss => ComparisonState::OutOfUniverse,
            Guidance::RecallMiss => ComparisonState::Unmapped,
            Guidance::CodeSetDisjoint => ComparisonState::NonComparable,
            Guidance::MissingSlot => ComparisonState::ComparableWithGaps,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsurerGuidance {
    pub insurer_id: String,
    pub guidance: Guidance,
}

/// One insurer's contribution to a comparison.
#[derive(Debug, Clone)]
pub struct InsurerComparisonInput {
    pub decision: Decision,
    /// The coverage exists in this insurer's own proposal universe
    pub in_universe: bool,
    pub required_slots_present: bool,
    /// Evidence retrieval failed and was treated as zero evidence
    pub retrieval_unavailable: bool,
}

impl InsurerComparisonInput {
    pub fn new(decision: Decision, in_universe: bool, required_slots_present: bool) -> Self {
        Self {
            decision,
            in_universe,
            required_slots_present,
            retrieval_unavailable: false,
        }
    }

    pub fn with_retrieval_unavailable(mut self) -> Self {
        self.retrieval_unavailable = true;
        self
    }

    pub fn insurer_id(&self) -> &str {
        self.decision.insurer_id()
    }
}

/// Evaluation of one priority rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleCheck {
    pub rule_id: String,
    pub matched: bool,
    /// Insurers that triggered the rule, in input order
    pub insurers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonOutcome {
    pub query: String,
    pub state: ComparisonState,
    pub next_action: NextAction,
    pub message_code: MessageCode,
    /// Codes every insurer decided; empty unless the intersection was evaluated
    pub overlap_codes: BTreeSet<CanonicalCode>,
    pub guidance: Vec<InsurerGuidance>,
    /// Priority rules evaluated, up to and including the one that matched
    pub checks: Vec<RuleCheck>,
}

impl ComparisonOutcome {
    /// Rule id of the matching rule.
    pub fn matched_rule(&self) -> Option<&str> {
        self.checks
            .iter()
            .find(|c| c.matched)
            .map(|c| c.rule_id.as_str())
    }
}
