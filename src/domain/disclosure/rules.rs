//! Declarative disclosure rules.
//!
//! The rule set is configuration, not user data: it is loaded once and
//! never mutated. Each rule ties a field target to a condition, a priority
//! (lower evaluated first for tie-breaks), a confidence weight, and a
//! human-readable reason surfaced in the UI.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Confidence, ExpertiseLevel, FieldId, FieldValue};

/// Comparison operator applied by a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Equals,
    GreaterThan,
    LessThan,
    Contains,
    Exists,
    NotExists,
}

/// Which field(s) a rule applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldTarget {
    /// A single named field.
    Exact(FieldId),
    /// Every field.
    All,
    /// Glob pattern where `*` matches any run of characters.
    Pattern(String),
}

impl FieldTarget {
    /// Returns true if this target covers the given field.
    pub fn matches(&self, field: &FieldId) -> bool {
        match self {
            FieldTarget::Exact(id) => id == field,
            FieldTarget::All => true,
            FieldTarget::Pattern(pattern) => glob_match(pattern, field.as_str()),
        }
    }
}

/// Simple glob matcher supporting `*` as an any-length wildcard.
fn glob_match(pattern: &str, text: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == text;
    }

    let mut remaining = text;
    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        if i == 0 {
            // Pattern does not start with '*': part must anchor the front.
            match remaining.strip_prefix(part) {
                Some(rest) => remaining = rest,
                None => return false,
            }
        } else if i == parts.len() - 1 {
            // Pattern does not end with '*': part must anchor the back.
            return remaining.ends_with(part);
        } else {
            match remaining.find(part) {
                Some(pos) => remaining = &remaining[pos + part.len()..],
                None => return false,
            }
        }
    }
    true
}

/// Condition controlling whether a rule votes to show its field.
///
/// Exactly one variant is active per rule. `DependencyChain` is evaluated
/// with the same semantics as `FieldValue`; it exists so rule authors can
/// express "this field depends on that one" directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DisclosureCondition {
    FieldValue {
        field: FieldId,
        operator: ConditionOperator,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<FieldValue>,
    },
    CompletionRate {
        operator: ConditionOperator,
        threshold: f64,
    },
    ConfidenceLevel {
        operator: ConditionOperator,
        threshold: f64,
    },
    UserExpertise {
        level: ExpertiseLevel,
    },
    DependencyChain {
        field: FieldId,
        operator: ConditionOperator,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<FieldValue>,
    },
}

/// A single disclosure rule. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisclosureRule {
    pub id: String,
    pub target: FieldTarget,
    pub condition: DisclosureCondition,
    /// Lower priorities are evaluated first and win confidence ties.
    pub priority: u8,
    pub confidence: Confidence,
    pub reason: String,
}

impl DisclosureRule {
    /// Returns true if this rule applies to the given field.
    pub fn applies_to(&self, field: &FieldId) -> bool {
        self.target.matches(field)
    }
}

/// The canonical rule set for the financial-goal form.
///
/// The original product carried several inconsistent copies of these
/// rules; this set is the authoritative one (see DESIGN.md).
pub static CANONICAL_RULES: Lazy<Vec<DisclosureRule>> = Lazy::new(|| {
    vec![
        DisclosureRule {
            id: "target-amount-after-title".into(),
            target: FieldTarget::Exact(FieldId::from("targetAmount")),
            condition: DisclosureCondition::FieldValue {
                field: FieldId::from("title"),
                operator: ConditionOperator::Exists,
                value: None,
            },
            priority: 10,
            confidence: Confidence::new(0.9),
            reason: "Title provides context for amount estimation".into(),
        },
        DisclosureRule {
            id: "deadline-after-amount".into(),
            target: FieldTarget::Exact(FieldId::from("deadline")),
            condition: DisclosureCondition::FieldValue {
                field: FieldId::from("targetAmount"),
                operator: ConditionOperator::Exists,
                value: None,
            },
            priority: 10,
            confidence: Confidence::new(0.8),
            reason: "An amount is set; a deadline makes the goal actionable".into(),
        },
        DisclosureRule {
            id: "expense-breakdown-large-goal".into(),
            target: FieldTarget::Exact(FieldId::from("expenseBreakdown")),
            condition: DisclosureCondition::FieldValue {
                field: FieldId::from("targetAmount"),
                operator: ConditionOperator::GreaterThan,
                value: Some(FieldValue::Number(10_000.0)),
            },
            priority: 20,
            confidence: Confidence::new(0.85),
            reason: "Goals over $10,000 warrant a detailed expense breakdown".into(),
        },
        DisclosureRule {
            id: "breakdowns-need-amount".into(),
            target: FieldTarget::Pattern("*Breakdown".into()),
            condition: DisclosureCondition::DependencyChain {
                field: FieldId::from("targetAmount"),
                operator: ConditionOperator::Exists,
                value: None,
            },
            priority: 25,
            confidence: Confidence::new(0.4),
            reason: "Breakdown fields depend on a target amount".into(),
        },
        DisclosureRule {
            id: "clarification-low-confidence".into(),
            target: FieldTarget::Exact(FieldId::from("clarificationFields")),
            condition: DisclosureCondition::ConfidenceLevel {
                operator: ConditionOperator::LessThan,
                threshold: 0.6,
            },
            priority: 30,
            confidence: Confidence::new(0.7),
            reason: "Overall confidence is low; ask clarifying questions".into(),
        },
        DisclosureRule {
            id: "funding-sources-advanced".into(),
            target: FieldTarget::Exact(FieldId::from("fundingSources")),
            condition: DisclosureCondition::UserExpertise {
                level: ExpertiseLevel::Advanced,
            },
            priority: 40,
            confidence: Confidence::new(0.75),
            reason: "Advanced users can break the goal into funding sources".into(),
        },
        DisclosureRule {
            id: "category-midway".into(),
            target: FieldTarget::Exact(FieldId::from("category")),
            condition: DisclosureCondition::CompletionRate {
                operator: ConditionOperator::GreaterThan,
                threshold: 0.5,
            },
            priority: 50,
            confidence: Confidence::new(0.6),
            reason: "The form is half complete; categorizing helps tracking".into(),
        },
        DisclosureRule {
            id: "notes-after-category".into(),
            target: FieldTarget::Exact(FieldId::from("notes")),
            condition: DisclosureCondition::DependencyChain {
                field: FieldId::from("category"),
                operator: ConditionOperator::Exists,
                value: None,
            },
            priority: 60,
            confidence: Confidence::new(0.55),
            reason: "A category is chosen; notes can add detail".into(),
        },
    ]
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_target_matches_only_its_field() {
        let target = FieldTarget::Exact(FieldId::from("deadline"));
        assert!(target.matches(&FieldId::from("deadline")));
        assert!(!target.matches(&FieldId::from("title")));
    }

    #[test]
    fn all_target_matches_everything() {
        assert!(FieldTarget::All.matches(&FieldId::from("anything")));
    }

    #[test]
    fn pattern_target_matches_suffix_glob() {
        let target = FieldTarget::Pattern("*Breakdown".into());
        assert!(target.matches(&FieldId::from("expenseBreakdown")));
        assert!(!target.matches(&FieldId::from("expenseTotal")));
    }

    #[test]
    fn glob_match_handles_prefix_and_middle_wildcards() {
        assert!(glob_match("funding*", "fundingSources"));
        assert!(glob_match("*arget*", "targetAmount"));
        assert!(glob_match("*", "anything"));
        assert!(!glob_match("funding*", "expenseBreakdown"));
    }

    #[test]
    fn glob_match_without_wildcard_is_exact() {
        assert!(glob_match("title", "title"));
        assert!(!glob_match("title", "titles"));
    }

    #[test]
    fn canonical_rules_cover_every_condition_variant() {
        let rules = &*CANONICAL_RULES;
        assert!(rules.iter().any(|r| matches!(
            r.condition,
            DisclosureCondition::FieldValue { .. }
        )));
        assert!(rules.iter().any(|r| matches!(
            r.condition,
            DisclosureCondition::CompletionRate { .. }
        )));
        assert!(rules.iter().any(|r| matches!(
            r.condition,
            DisclosureCondition::ConfidenceLevel { .. }
        )));
        assert!(rules.iter().any(|r| matches!(
            r.condition,
            DisclosureCondition::UserExpertise { .. }
        )));
        assert!(rules.iter().any(|r| matches!(
            r.condition,
            DisclosureCondition::DependencyChain { .. }
        )));
    }

    #[test]
    fn canonical_rule_ids_are_unique() {
        let rules = &*CANONICAL_RULES;
        let mut ids: Vec<&str> = rules.iter().map(|r| r.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), rules.len());
    }

    #[test]
    fn rules_serialize_with_tagged_conditions() {
        let rule = &CANONICAL_RULES[0];
        let json = serde_json::to_string(rule).unwrap();
        assert!(json.contains("\"type\":\"field_value\""));
        let back: DisclosureRule = serde_json::from_str(&json).unwrap();
        assert_eq!(&back, rule);
    }
}
