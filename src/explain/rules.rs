//! Rule registry
//!
//! Every rule referenced in an explanation has a stable identifier and a
//! fixed description. Free-form rules are not allowed.

use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct RuleDefinition {
    pub rule_id: String,
    /// Component that evaluates the rule
    pub component: String,
    pub description: String,
}

impl RuleDefinition {
    pub fn new(
        rule_id: impl Into<String>,
        component: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            component: component.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct RuleRegistry {
    rules: BTreeMap<String, RuleDefinition>,
}

impl RuleRegistry {
    /// Registry with all known rules.
    pub fn new() -> Self {
        let mut registry = Self::default();
        registry.register_comparison_rules();
        registry.register_decision_rules();
        registry
    }

    pub fn register(&mut self, rule: RuleDefinition) {
        self.rules.insert(rule.rule_id.clone(), rule);
    }

    pub fn get(&self, rule_id: &str) -> Option<&RuleDefinition> {
        self.rules.get(rule_id)
    }

    pub fn contains(&self, rule_id: &str) -> bool {
        self.rules.contains_key(rule_id)
    }

    pub fn description(&self, rule_id: &str) -> String {
        self.rules
            .get(rule_id)
            .map(|r| r.description.clone())
            .unwrap_or_else(|| format!("Unknown rule: {}", rule_id))
    }

    fn register_comparison_rules(&mut self) {
        let rules = [
            ("CMP-1", "Coverage absent from any insurer's own universe: out_of_universe"),
            ("CMP-2", "No insurer recalled a canonical candidate: unmapped"),
            ("CMP-3", "Any insurer without an evidence-backed decision: undecided"),
            ("CMP-4", "Decided code sets share no common code: non_comparable"),
            ("CMP-5", "Common scope exists but required slots are missing: comparable_with_gaps"),
            ("CMP-6", "Common scope and all required slots present: comparable"),
        ];
        for (id, description) in rules {
            self.register(RuleDefinition::new(id, "comparison::resolver", description));
        }
    }

    fn register_decision_rules(&mut self) {
        let rules = [
            ("DEC-1", "Policy evidence is present; recalled candidates alone never decide"),
            ("DEC-2", "Evidence is folded in retrieval order into per-code scope flags"),
            ("DEC-3", "An excluded code is locked false for the rest of the fold"),
            ("DEC-4", "DECIDED only when at least one code is set true by evidence"),
        ];
        for (id, description) in rules {
            self.register(RuleDefinition::new(id, "decision::engine", description));
        }
    }
}
