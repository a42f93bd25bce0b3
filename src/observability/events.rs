//! Observable events
//!
//! Events are explicit and typed.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Setup
    ConfigLoaded,
    CatalogLoaded,
    AliasIndexBuilt,
    AliasIndexSwapped,

    // Universe
    RowsClassified,

    // Recall and evidence
    RecallMiss,
    RetrievalDegraded,
    EvidenceTruncated,

    // Decisions
    DecisionDecided,
    DecisionUndecided,
    CatalogInvariantViolation,

    // Comparison
    ComparisonResolved,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::CatalogLoaded => "CATALOG_LOADED",
            Event::AliasIndexBuilt => "ALIAS_INDEX_BUILT",
            Event::AliasIndexSwapped => "ALIAS_INDEX_SWAPPED",
            Event::RowsClassified => "ROWS_CLASSIFIED",
            Event::RecallMiss => "RECALL_MISS",
            Event::RetrievalDegraded => "RETRIEVAL_DEGRADED",
            Event::EvidenceTruncated => "EVIDENCE_TRUNCATED",
            Event::DecisionDecided => "DECISION_DECIDED",
            Event::DecisionUndecided => "DECISION_UNDECIDED",
            Event::CatalogInvariantViolation => "CATALOG_INVARIANT_VIOLATION",
            Event::ComparisonResolved => "COMPARISON_RESOLVED",
        }
    }

    /// Returns true if this event indicates a broken invariant
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::CatalogInvariantViolation)
    }

    /// Degraded but recoverable conditions
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Event::RecallMiss | Event::RetrievalDegraded | Event::EvidenceTruncated
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::ConfigLoaded,
            Event::CatalogLoaded,
            Event::AliasIndexBuilt,
            Event::AliasIndexSwapped,
            Event::RowsClassified,
            Event::RecallMiss,
            Event::RetrievalDegraded,
            Event::EvidenceTruncated,
            Event::DecisionDecided,
            Event::DecisionUndecided,
            Event::CatalogInvariantViolation,
            Event::ComparisonResolved,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_fatal_events() {
        assert!(Event::CatalogInvariantViolation.is_fatal());
        assert!(!Event::DecisionUndecided.is_fatal());
        assert!(Event::RetrievalDegraded.is_warning());
    }
}
