//! Decision types
//!
//! A DECIDED verdict can only be built from a non-empty map of codes, each
//! backed by a non-empty list of evidence references. An evidence-free
//! DECIDED value cannot be constructed.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::alias::CandidateSet;
use crate::catalog::CanonicalCode;
use crate::evidence::{EvidenceType, TypedEvidence};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionStatus {
    Decided,
    Undecided,
}

impl DecisionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionStatus::Decided => "DECIDED",
            DecisionStatus::Undecided => "UNDECIDED",
        }
    }
}

impl fmt::Display for DecisionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionMethod {
    NoEvidence,
    EvidenceInconclusive,
    PolicyEvidence,
}

impl DecisionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionMethod::NoEvidence => "no_evidence",
            DecisionMethod::EvidenceInconclusive => "evidence_inconclusive",
            DecisionMethod::PolicyEvidence => "policy_evidence",
        }
    }
}

impl fmt::Display for DecisionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a decision stayed UNDECIDED.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndecidedReason {
    /// No evidence reached the fold
    NoEvidence,
    /// Evidence was folded but no code ended up included
    EvidenceInconclusive,
}

/// Pointer to one folded evidence item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceRef {
    /// Position in the folded evidence list
    pub evidence_index: usize,
    pub document_id: String,
    pub page: u32,
    pub evidence_type: EvidenceType,
}

impl EvidenceRef {
    pub fn new(evidence_index: usize, evidence: &TypedEvidence) -> Self {
        Self {
            evidence_index,
            document_id: evidence.span.document_id.clone(),
            page: evidence.span.page,
            evidence_type: evidence.evidence_type,
        }
    }
}

/// Non-empty list of evidence references supporting one code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportingRefs(Vec<EvidenceRef>);

impl SupportingRefs {
    /// Returns `None` for an empty list.
    pub fn new(refs: Vec<EvidenceRef>) -> Option<Self> {
        if refs.is_empty() {
            None
        } else {
            Some(Self(refs))
        }
    }

    pub fn as_slice(&self) -> &[EvidenceRef] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Non-empty set of decided codes with their support.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecidedCodes(BTreeMap<CanonicalCode, SupportingRefs>);

impl DecidedCodes {
    /// Returns `None` for an empty map.
    pub fn new(codes: BTreeMap<CanonicalCode, SupportingRefs>) -> Option<Self> {
        if codes.is_empty() {
            None
        } else {
            Some(Self(codes))
        }
    }

    pub fn codes(&self) -> impl Iterator<Item = &CanonicalCode> {
        self.0.keys()
    }

    pub fn support(&self, code: &CanonicalCode) -> Option<&SupportingRefs> {
        self.0.get(code)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CanonicalCode, &SupportingRefs)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Decided(DecidedCodes),
    Undecided(UndecidedReason),
}

/// What a fold step did to one flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagAction {
    /// Subject of a definition or separate benefit set true
    Include,
    /// Narrower code named inside a definition forced false
    SuppressNarrower,
    /// Parent named by a separate-benefit framing cleared
    ClearParent,
    /// Code named by an exclusion forced false and locked
    Exclude,
    /// Scope qualified by an exclusion list set true
    CarveScope,
    /// Inclusion refused because the code is locked by an exclusion
    BlockedByExclusion,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagChange {
    pub code: CanonicalCode,
    pub action: FlagAction,
    pub from: Option<bool>,
    pub to: bool,
    /// This step reversed, or was refused against, an earlier value
    pub contradiction_resolved: bool,
}

/// One fold step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceStep {
    /// 1-based position in the fold
    pub step: usize,
    pub evidence_index: usize,
    pub document_id: String,
    pub page: u32,
    pub evidence_type: EvidenceType,
    pub matched_trigger: String,
    /// Codes named in the span, in order of first mention
    pub mentioned: Vec<CanonicalCode>,
    pub changes: Vec<FlagChange>,
}

/// Per-insurer verdict for one semantic domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    insurer_id: String,
    domain_id: String,
    verdict: Verdict,
    candidates: CandidateSet,
    trace: Vec<TraceStep>,
    truncated_from: Option<usize>,
    row_scope: Option<CanonicalCode>,
}

impl Decision {
    pub(crate) fn new(
        insurer_id: impl Into<String>,
        domain_id: impl Into<String>,
        verdict: Verdict,
        candidates: CandidateSet,
        trace: Vec<TraceStep>,
        truncated_from: Option<usize>,
    ) -> Self {
        Self {
            insurer_id: insurer_id.into(),
            domain_id: domain_id.into(),
            verdict,
            candidates,
            trace,
            truncated_from,
            row_scope: None,
        }
    }

    pub(crate) fn with_row_scope(mut self, row_scope: Option<CanonicalCode>) -> Self {
        self.row_scope = row_scope;
        self
    }

    pub fn insurer_id(&self) -> &str {
        &self.insurer_id
    }

    pub fn domain_id(&self) -> &str {
        &self.domain_id
    }

    pub fn verdict(&self) -> &Verdict {
        &self.verdict
    }

    pub fn status(&self) -> DecisionStatus {
        match self.verdict {
            Verdict::Decided(_) => DecisionStatus::Decided,
            Verdict::Undecided(_) => DecisionStatus::Undecided,
        }
    }

    pub fn is_decided(&self) -> bool {
        self.status() == DecisionStatus::Decided
    }

    pub fn method(&self) -> DecisionMethod {
        match self.verdict {
            Verdict::Decided(_) => DecisionMethod::PolicyEvidence,
            Verdict::Undecided(UndecidedReason::NoEvidence) => DecisionMethod::NoEvidence,
            Verdict::Undecided(UndecidedReason::EvidenceInconclusive) => {
                DecisionMethod::EvidenceInconclusive
            }
        }
    }

    /// Decided codes; empty exactly when UNDECIDED.
    pub fn decided_codes(&self) -> BTreeSet<CanonicalCode> {
        match &self.verdict {
            Verdict::Decided(codes) => codes.codes().cloned().collect(),
            Verdict::Undecided(_) => BTreeSet::new(),
        }
    }

    /// All evidence supporting decided codes, ordered by fold position.
    pub fn evidence_refs(&self) -> Vec<EvidenceRef> {
        let mut refs: Vec<EvidenceRef> = Vec::new();
        if let Verdict::Decided(codes) = &self.verdict {
            for (_, support) in codes.iter() {
                for r in support.as_slice() {
                    if !refs.iter().any(|e| e.evidence_index == r.evidence_index) {
                        refs.push(r.clone());
                    }
                }
            }
        }
        refs.sort_by_key(|r| r.evidence_index);
        refs
    }

    /// Recalled candidates; audit only, never promoted.
    pub fn candidates(&self) -> &CandidateSet {
        &self.candidates
    }

    pub fn trace(&self) -> &[TraceStep] {
        &self.trace
    }

    /// Original evidence count when the list was cut to the fold limit.
    pub fn truncated_from(&self) -> Option<usize> {
        self.truncated_from
    }

    /// Scope of the coverage row the decision was made for, if its name
    /// named one.
    pub fn row_scope(&self) -> Option<&CanonicalCode> {
        self.row_scope.as_ref()
    }

    /// Number of flag changes that reversed or resisted earlier evidence.
    pub fn contradiction_count(&self) -> usize {
        self.trace
            .iter()
            .flat_map(|s| s.changes.iter())
            .filter(|c| c.contradiction_resolved)
            .count()
    }

    /// Serializable form for hosts and the CLI.
    pub fn record(&self) -> DecisionRecord {
        DecisionRecord {
            insurer_id: self.insurer_id.clone(),
            domain_id: self.domain_id.clone(),
            status: self.status(),
            decided_codes: self.decided_codes().into_iter().collect(),
            decision_method: self.method(),
            evidence_refs: self.evidence_refs(),
            candidates: self.candidates.clone(),
            trace: self.trace.clone(),
            truncated_from: self.truncated_from,
            row_scope: self.row_scope.clone(),
        }
    }
}

/// Flat, serializable view of a decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub insurer_id: String,
    pub domain_id: String,
    pub status: DecisionStatus,
    pub decided_codes: Vec<CanonicalCode>,
    pub decision_method: DecisionMethod,
    pub evidence_refs: Vec<EvidenceRef>,
    pub candidates: CandidateSet,
    pub trace: Vec<TraceStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncated_from: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_scope: Option<CanonicalCode>,
}
