//! Canonical decision engine
//!
//! Folds typed policy evidence, in retrieval order, over the scope flags of
//! one domain catalog. Which code a span is about comes from the catalog
//! hierarchy, never from where the code appears in the sentence:
//!
//! - DEFINITION_INCLUDED: the broadest code named is the defined scope and
//!   is set true; narrower codes named alongside it are forced false.
//! - SEPARATE_BENEFIT: the narrowest code named is paid on its own and is
//!   set true; broader codes named alongside it are cleared.
//! - EXCLUSION: every listed code is forced false and locked. An exclusion
//!   never sets a listed code true. It can carve out a scope only when that
//!   scope sits outside the list: a head code followed by `(`, `중` or
//!   `에서` before the list ("암(유사암 제외)"), or otherwise the scope of
//!   the coverage row being decided, when it is broader than every listed
//!   code.
//! - UNKNOWN: no effect.
//!
//! A locked code stays false for the rest of the fold, whatever follows.
//! Later inclusion and narrowing steps override earlier ones, and every
//! reversal is marked in the trace.
//!
//! Recalled candidates are carried for audit only. Nothing here reads them
//! when deciding.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use super::invariant::ensure_within_catalog;
use super::scope::ScopeFlags;
use super::types::{
    DecidedCodes, Decision, EvidenceRef, FlagAction, FlagChange, SupportingRefs, TraceStep,
    UndecidedReason, Verdict,
};
use crate::alias::CandidateSet;
use crate::catalog::{CanonicalCode, DomainCatalog, Mention};
use crate::evidence::{EvidenceType, TypedEvidence};

/// Default cap on folded evidence items per decision.
pub const DEFAULT_MAX_EVIDENCE_SPANS: usize = 50;

#[derive(Debug, Clone)]
pub struct CanonicalDecisionEngine {
    max_evidence_spans: usize,
}

impl Default for CanonicalDecisionEngine {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_EVIDENCE_SPANS)
    }
}

impl CanonicalDecisionEngine {
    /// `max_evidence_spans` below 1 is raised to 1.
    pub fn new(max_evidence_spans: usize) -> Self {
        Self {
            max_evidence_spans: max_evidence_spans.max(1),
        }
    }

    pub fn max_evidence_spans(&self) -> usize {
        self.max_evidence_spans
    }

    /// Decides the canonical codes `insurer_id` covers in `catalog`.
    ///
    /// Deterministic: the same inputs always produce the same decision and
    /// trace.
    pub fn decide(
        &self,
        insurer_id: &str,
        catalog: &DomainCatalog,
        candidates: CandidateSet,
        evidence: &[TypedEvidence],
    ) -> Decision {
        self.decide_in_scope(insurer_id, catalog, None, candidates, evidence)
    }

    /// Like [`decide`](Self::decide), for a coverage row whose own name is
    /// scoped to `row_scope` (see [`DomainCatalog::row_scope`]).
    ///
    /// The row scope is only read by exclusion spans that carry no head of
    /// their own: "유사암, 제자리암은 제외한다" on a row scoped to GENERAL
    /// carves GENERAL out. It is never a decided code without such a span.
    pub fn decide_in_scope(
        &self,
        insurer_id: &str,
        catalog: &DomainCatalog,
        row_scope: Option<&CanonicalCode>,
        candidates: CandidateSet,
        evidence: &[TypedEvidence],
    ) -> Decision {
        let scope_position = row_scope.and_then(|code| catalog.position(code));
        let row_scope = scope_position.map(|p| catalog.code_at(p).clone());

        if evidence.is_empty() {
            return Decision::new(
                insurer_id,
                catalog.domain_id.clone(),
                Verdict::Undecided(UndecidedReason::NoEvidence),
                candidates,
                Vec::new(),
                None,
            )
            .with_row_scope(row_scope);
        }

        let (folded, truncated_from) = if evidence.len() > self.max_evidence_spans {
            (&evidence[..self.max_evidence_spans], Some(evidence.len()))
        } else {
            (evidence, None)
        };

        let mut flags = ScopeFlags::new(catalog);
        let mut trace = Vec::with_capacity(folded.len());

        for (index, item) in folded.iter().enumerate() {
            let mentions = catalog.mentions(&item.span.span_text);
            let mentioned: Vec<usize> = mentions.iter().map(|m| m.position).collect();
            let evref = EvidenceRef::new(index, item);

            let changes = match item.evidence_type {
                EvidenceType::DefinitionIncluded => {
                    fold_definition(catalog, &mut flags, &mentioned, &evref)
                }
                EvidenceType::SeparateBenefit => {
                    fold_separate_benefit(catalog, &mut flags, &mentioned, &evref)
                }
                EvidenceType::Exclusion => {
                    let exclusion = ExclusionSpan {
                        text: &item.span.span_text,
                        mentions: &mentions,
                        row_scope: scope_position,
                    };
                    fold_exclusion(catalog, &mut flags, &exclusion, &evref)
                }
                EvidenceType::Unknown => Vec::new(),
            };

            trace.push(TraceStep {
                step: index + 1,
                evidence_index: index,
                document_id: item.span.document_id.clone(),
                page: item.span.page,
                evidence_type: item.evidence_type,
                matched_trigger: item.matched_trigger.clone(),
                mentioned: mentioned
                    .iter()
                    .map(|&p| catalog.code_at(p).clone())
                    .collect(),
                changes,
            });
        }

        let included: BTreeMap<_, _> = flags
            .into_included()
            .into_iter()
            .filter_map(|(code, refs)| SupportingRefs::new(refs).map(|s| (code, s)))
            .collect();

        let verdict = match DecidedCodes::new(included) {
            Some(codes) => {
                ensure_within_catalog(insurer_id, catalog, &codes);
                Verdict::Decided(codes)
            }
            None => Verdict::Undecided(UndecidedReason::EvidenceInconclusive),
        };

        Decision::new(
            insurer_id,
            catalog.domain_id.clone(),
            verdict,
            candidates,
            trace,
            truncated_from,
        )
        .with_row_scope(row_scope)
    }
}

/// Stripped-text markers that put a head code outside the list after it.
const HEAD_MARKERS: &[&str] = &["(", "（", "중", "에서", "가운데", "의경우"];

fn fold_definition(
    catalog: &DomainCatalog,
    flags: &mut ScopeFlags,
    mentioned: &[usize],
    evref: &EvidenceRef,
) -> Vec<FlagChange> {
    let Some(subject) = mentioned.iter().copied().min_by_key(|&p| catalog.depth(p)) else {
        return Vec::new();
    };
    let mut changes = vec![flags.set_true(subject, FlagAction::Include, evref)];
    for &other in mentioned {
        if catalog.is_ancestor(subject, other) {
            changes.push(flags.set_false(other, FlagAction::SuppressNarrower, false));
        }
    }
    changes
}

fn fold_separate_benefit(
    catalog: &DomainCatalog,
    flags: &mut ScopeFlags,
    mentioned: &[usize],
    evref: &EvidenceRef,
) -> Vec<FlagChange> {
    let Some(subject) = mentioned
        .iter()
        .copied()
        .min_by_key(|&p| Reverse(catalog.depth(p)))
    else {
        return Vec::new();
    };
    let mut changes = vec![flags.set_true(subject, FlagAction::Include, evref)];
    for &other in mentioned {
        if catalog.is_ancestor(other, subject) {
            changes.push(flags.set_false(other, FlagAction::ClearParent, false));
        }
    }
    changes
}

struct ExclusionSpan<'a> {
    text: &'a str,
    mentions: &'a [Mention],
    row_scope: Option<usize>,
}

impl ExclusionSpan<'_> {
    /// The first mention, when a marker after it sets it apart from a list
    /// of strictly narrower codes.
    fn head(&self, catalog: &DomainCatalog) -> Option<usize> {
        let (first, rest) = self.mentions.split_first()?;
        let next = rest.first()?;
        let stripped: String = self.text.chars().filter(|c| !c.is_whitespace()).collect();
        let between = stripped.get(first.end()..next.offset)?;
        let marked = HEAD_MARKERS.iter().any(|&m| between.contains(m));
        let broader = rest.iter().all(|m| catalog.is_ancestor(first.position, m.position));
        (marked && broader).then_some(first.position)
    }
}

fn fold_exclusion(
    catalog: &DomainCatalog,
    flags: &mut ScopeFlags,
    span: &ExclusionSpan<'_>,
    evref: &EvidenceRef,
) -> Vec<FlagChange> {
    if span.mentions.is_empty() {
        return Vec::new();
    }

    let head = span.head(catalog);
    let listed: Vec<usize> = span
        .mentions
        .iter()
        .map(|m| m.position)
        .filter(|&p| Some(p) != head)
        .collect();
    let scope = head.or_else(|| {
        span.row_scope
            .filter(|&s| listed.iter().all(|&p| catalog.is_ancestor(s, p)))
    });

    let mut changes = Vec::with_capacity(listed.len() + 1);
    if let Some(scope) = scope {
        changes.push(flags.set_true(scope, FlagAction::CarveScope, evref));
    }
    for code in listed {
        changes.push(flags.set_false(code, FlagAction::Exclude, true));
    }
    changes
}
