//! Metrics registry
//!
//! - Counters only
//! - Monotonic increase
//! - Reset only on process start

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::comparison::ComparisonState;
use crate::universe::LockClass;

/// Operational counters for the pipeline.
///
/// All counters use Relaxed ordering; they are exact totals, not a
/// synchronization mechanism.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    rows_universe: AtomicU64,
    rows_meta: AtomicU64,
    rows_unclassified: AtomicU64,
    recalls: AtomicU64,
    recall_misses: AtomicU64,
    retrieval_degradations: AtomicU64,
    evidence_truncations: AtomicU64,
    decisions_decided: AtomicU64,
    decisions_undecided: AtomicU64,
    outcomes_comparable: AtomicU64,
    outcomes_comparable_with_gaps: AtomicU64,
    outcomes_non_comparable: AtomicU64,
    outcomes_unmapped: AtomicU64,
    outcomes_out_of_universe: AtomicU64,
    outcomes_undecided: AtomicU64,
    alias_swaps: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Universe

    pub fn record_row(&self, class: LockClass) {
        let counter = match class {
            LockClass::UniverseCoverage => &self.rows_universe,
            LockClass::NonUniverseMeta => &self.rows_meta,
            LockClass::Unclassified => &self.rows_unclassified,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    // Recall

    /// Counts one recall; `hit` is false when no candidate came back.
    pub fn record_recall(&self, hit: bool) {
        self.recalls.fetch_add(1, Ordering::Relaxed);
        if !hit {
            self.recall_misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn increment_retrieval_degradations(&self) {
        self.retrieval_degradations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_evidence_truncations(&self) {
        self.evidence_truncations.fetch_add(1, Ordering::Relaxed);
    }

    // Decisions

    pub fn record_decision(&self, decided: bool) {
        let counter = if decided {
            &self.decisions_decided
        } else {
            &self.decisions_undecided
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    // Comparison

    pub fn record_outcome(&self, state: ComparisonState) {
        let counter = match state {
            ComparisonState::Comparable => &self.outcomes_comparable,
            ComparisonState::ComparableWithGaps => &self.outcomes_comparable_with_gaps,
            ComparisonState::NonComparable => &self.outcomes_non_comparable,
            ComparisonState::Unmapped => &self.outcomes_unmapped,
            ComparisonState::OutOfUniverse => &self.outcomes_out_of_universe,
            ComparisonState::Undecided => &self.outcomes_undecided,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_alias_swaps(&self) {
        self.alias_swaps.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time values of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            rows_universe: self.rows_universe.load(Ordering::Relaxed),
            rows_meta: self.rows_meta.load(Ordering::Relaxed),
            rows_unclassified: self.rows_unclassified.load(Ordering::Relaxed),
            recalls: self.recalls.load(Ordering::Relaxed),
            recall_misses: self.recall_misses.load(Ordering::Relaxed),
            retrieval_degradations: self.retrieval_degradations.load(Ordering::Relaxed),
            evidence_truncations: self.evidence_truncations.load(Ordering::Relaxed),
            decisions_decided: self.decisions_decided.load(Ordering::Relaxed),
            decisions_undecided: self.decisions_undecided.load(Ordering::Relaxed),
            outcomes_comparable: self.outcomes_comparable.load(Ordering::Relaxed),
            outcomes_comparable_with_gaps: self
                .outcomes_comparable_with_gaps
                .load(Ordering::Relaxed),
            outcomes_non_comparable: self.outcomes_non_comparable.load(Ordering::Relaxed),
            outcomes_unmapped: self.outcomes_unmapped.load(Ordering::Relaxed),
            outcomes_out_of_universe: self.outcomes_out_of_universe.load(Ordering::Relaxed),
            outcomes_undecided: self.outcomes_undecided.load(Ordering::Relaxed),
            alias_swaps: self.alias_swaps.load(Ordering::Relaxed),
        }
    }

    /// Snapshot rendered as a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self.snapshot()).unwrap_or(serde_json::Value::Null)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub rows_universe: u64,
    pub rows_meta: u64,
    pub rows_unclassified: u64,
    pub recalls: u64,
    pub recall_misses: u64,
    pub retrieval_degradations: u64,
    pub evidence_truncations: u64,
    pub decisions_decided: u64,
    pub decisions_undecided: u64,
    pub outcomes_comparable: u64,
    pub outcomes_comparable_with_gaps: u64,
    pub outcomes_non_comparable: u64,
    pub outcomes_unmapped: u64,
    pub outcomes_out_of_universe: u64,
    pub outcomes_undecided: u64,
    pub alias_swaps: u64,
}
