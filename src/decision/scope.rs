//! Scope flags over a domain catalog
//!
//! One slot per catalog sub-code. During a fold a slot is unset, true, or
//! false; an exclusion additionally locks the slot so no later step can set
//! it true again.

use std::collections::BTreeMap;

use super::types::{EvidenceRef, FlagAction, FlagChange};
use crate::catalog::{CanonicalCode, DomainCatalog};

#[derive(Debug, Clone)]
pub struct ScopeFlags {
    codes: Vec<CanonicalCode>,
    values: Vec<Option<bool>>,
    locked: Vec<bool>,
    /// Evidence that set each slot true since it was last set false
    support: Vec<Vec<EvidenceRef>>,
}

impl ScopeFlags {
    pub fn new(catalog: &DomainCatalog) -> Self {
        let n = catalog.len();
        Self {
            codes: catalog.codes(),
            values: vec![None; n],
            locked: vec![false; n],
            support: vec![Vec::new(); n],
        }
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn value(&self, position: usize) -> Option<bool> {
        self.values[position]
    }

    pub fn is_locked(&self, position: usize) -> bool {
        self.locked[position]
    }

    /// Sets a slot true unless an exclusion locked it.
    pub fn set_true(
        &mut self,
        position: usize,
        action: FlagAction,
        evidence: &EvidenceRef,
    ) -> FlagChange {
        let from = self.values[position];
        if self.locked[position] {
            return FlagChange {
                code: self.codes[position].clone(),
                action: FlagAction::BlockedByExclusion,
                from,
                to: false,
                contradiction_resolved: true,
            };
        }
        self.values[position] = Some(true);
        self.support[position].push(evidence.clone());
        FlagChange {
            code: self.codes[position].clone(),
            action,
            from,
            to: true,
            contradiction_resolved: from == Some(false),
        }
    }

    /// Forces a slot false; `lock` makes it permanent for this fold.
    pub fn set_false(&mut self, position: usize, action: FlagAction, lock: bool) -> FlagChange {
        let from = self.values[position];
        self.values[position] = Some(false);
        self.support[position].clear();
        if lock {
            self.locked[position] = true;
        }
        FlagChange {
            code: self.codes[position].clone(),
            action,
            from,
            to: false,
            contradiction_resolved: from == Some(true),
        }
    }

    /// The flag vector as plain booleans; unset reads as false.
    pub fn as_bools(&self) -> Vec<bool> {
        self.values.iter().map(|v| *v == Some(true)).collect()
    }

    /// Codes whose slot ended true, with their support.
    pub fn into_included(self) -> BTreeMap<CanonicalCode, Vec<EvidenceRef>> {
        self.codes
            .into_iter()
            .zip(self.values)
            .zip(self.support)
            .filter(|((_, value), _)| *value == Some(true))
            .map(|((code, _), support)| (code, support))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::{EvidenceSpan, EvidenceType, TypedEvidence};

    fn evref(index: usize) -> EvidenceRef {
        EvidenceRef::new(
            index,
            &TypedEvidence {
                span: EvidenceSpan::policy("terms", 1, "x"),
                evidence_type: EvidenceType::DefinitionIncluded,
                matched_trigger: "포함".into(),
            },
        )
    }

    #[test]
    fn test_starts_unset() {
        let flags = ScopeFlags::new(&DomainCatalog::cancer());
        assert_eq!(flags.len(), 4);
        assert!((0..4).all(|i| flags.value(i).is_none()));
        assert_eq!(flags.as_bools(), vec![false; 4]);
    }

    #[test]
    fn test_reversal_marks_contradiction() {
        let mut flags = ScopeFlags::new(&DomainCatalog::cancer());
        let first = flags.set_true(2, FlagAction::Include, &evref(0));
        assert!(!first.contradiction_resolved);

        let second = flags.set_false(2, FlagAction::SuppressNarrower, false);
        assert!(second.contradiction_resolved);
        assert_eq!(second.from, Some(true));
    }

    #[test]
    fn test_lock_blocks_later_inclusion() {
        let mut flags = ScopeFlags::new(&DomainCatalog::cancer());
        flags.set_false(1, FlagAction::Exclude, true);
        let change = flags.set_true(1, FlagAction::Include, &evref(1));

        assert_eq!(change.action, FlagAction::BlockedByExclusion);
        assert!(!change.to);
        assert!(change.contradiction_resolved);
        assert_eq!(flags.value(1), Some(false));
        assert!(flags.is_locked(1));
    }

    #[test]
    fn test_support_cleared_on_false() {
        let mut flags = ScopeFlags::new(&DomainCatalog::cancer());
        flags.set_true(0, FlagAction::Include, &evref(0));
        flags.set_false(0, FlagAction::ClearParent, false);
        flags.set_true(0, FlagAction::Include, &evref(3));

        let included = flags.into_included();
        let support = &included[&CanonicalCode::new("GENERAL")];
        assert_eq!(support.len(), 1);
        assert_eq!(support[0].evidence_index, 3);
    }
}
