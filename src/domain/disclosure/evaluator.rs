//! Disclosure evaluator - decides per-field visibility.
//!
//! Applicable rules each cast a confidence-weighted vote: `+confidence`
//! when their condition holds, `-confidence` when it does not. The field
//! is visible when the weighted sum is positive, so a single very
//! confident "hide" vote can outvote several weak "show" votes. This is
//! deliberately not an AND/OR combination.
//!
//! Evaluation never fails: every path (unknown operator pairings,
//! missing fields) resolves to a boolean vote.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Confidence, ExpertiseLevel, FieldId, FieldValue};

use super::context::{self, DisclosureContext};
use super::rules::{
    ConditionOperator, DisclosureCondition, DisclosureRule, CANONICAL_RULES,
};

/// Tolerance for floating-point equality in rule thresholds.
const EQ_EPSILON: f64 = 1e-9;

/// Reason reported when no rule voted to show a field.
const NO_SIGNAL_REASON: &str = "No disclosure rule voted to show this field";

/// Derived visibility decision for one field. Computed fresh per
/// evaluation call and never cached: any context change invalidates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDisclosureState {
    pub is_visible: bool,
    pub is_required: bool,
    pub is_highlighted: bool,
    pub show_help_text: bool,
    pub reason: String,
    pub confidence: Confidence,
    pub suggested_order: u8,
}

/// Evaluates disclosure rules against a context.
#[derive(Debug, Clone)]
pub struct DisclosureEvaluator {
    rules: Vec<DisclosureRule>,
}

impl DisclosureEvaluator {
    /// Creates an evaluator over a custom rule set.
    pub fn new(mut rules: Vec<DisclosureRule>) -> Self {
        // Lower priority first; stable so same-priority rules keep their
        // declared order for tie-breaks.
        rules.sort_by_key(|r| r.priority);
        Self { rules }
    }

    /// Creates an evaluator over the canonical rule set.
    pub fn canonical() -> Self {
        Self::new(CANONICAL_RULES.clone())
    }

    /// Returns the loaded rules, in evaluation order.
    pub fn rules(&self) -> &[DisclosureRule] {
        &self.rules
    }

    /// Evaluates the disclosure state of a single field.
    pub fn evaluate_field(&self, field: &FieldId, ctx: &DisclosureContext) -> FieldDisclosureState {
        let applicable: Vec<&DisclosureRule> =
            self.rules.iter().filter(|r| r.applies_to(field)).collect();

        let (is_visible, reason, confidence) = if applicable.is_empty() {
            self.default_decision(field)
        } else {
            self.vote(&applicable, ctx)
        };

        FieldDisclosureState {
            is_visible,
            is_required: context::is_basic_field(field),
            is_highlighted: ctx
                .confidence_scores
                .get(field)
                .map(Confidence::is_low)
                .unwrap_or(false),
            show_help_text: ctx.has_uncertainty_for(field)
                || ctx.expertise == ExpertiseLevel::Beginner,
            reason,
            confidence,
            suggested_order: context::suggested_order(field),
        }
    }

    /// Static fallback when no rule applies: basic fields are visible and
    /// required, everything else stays hidden.
    fn default_decision(&self, field: &FieldId) -> (bool, String, Confidence) {
        if context::is_basic_field(field) {
            (
                true,
                "Basic field, always shown".into(),
                Confidence::BASELINE,
            )
        } else {
            (
                false,
                "Hidden until earlier answers provide context".into(),
                Confidence::NEUTRAL,
            )
        }
    }

    /// Confidence-weighted majority vote across applicable rules.
    fn vote(
        &self,
        applicable: &[&DisclosureRule],
        ctx: &DisclosureContext,
    ) -> (bool, String, Confidence) {
        let mut sum = 0.0;
        let mut best_show: Option<&DisclosureRule> = None;

        for rule in applicable {
            let should_show = condition_holds(&rule.condition, ctx);
            if should_show {
                sum += rule.confidence.value();
                // Strict greater-than: the earliest (lowest-priority-value)
                // rule wins confidence ties.
                if best_show.map_or(true, |b| rule.confidence.value() > b.confidence.value()) {
                    best_show = Some(rule);
                }
            } else {
                sum -= rule.confidence.value();
            }
        }

        let is_visible = sum > 0.0;
        match best_show {
            Some(rule) => (is_visible, rule.reason.clone(), rule.confidence),
            None => (is_visible, NO_SIGNAL_REASON.into(), Confidence::NEUTRAL),
        }
    }
}

/// Evaluates one condition against the context. Total: never errors.
fn condition_holds(condition: &DisclosureCondition, ctx: &DisclosureContext) -> bool {
    match condition {
        DisclosureCondition::FieldValue {
            field,
            operator,
            value,
        }
        | DisclosureCondition::DependencyChain {
            field,
            operator,
            value,
        } => field_value_holds(ctx, field, *operator, value.as_ref()),
        DisclosureCondition::CompletionRate {
            operator,
            threshold,
        } => numeric_holds(*operator, ctx.completion_rate(), *threshold),
        DisclosureCondition::ConfidenceLevel {
            operator,
            threshold,
        } => numeric_holds(*operator, ctx.average_confidence(), *threshold),
        DisclosureCondition::UserExpertise { level } => ctx.expertise == *level,
    }
}

fn field_value_holds(
    ctx: &DisclosureContext,
    field: &FieldId,
    operator: ConditionOperator,
    expected: Option<&FieldValue>,
) -> bool {
    let actual = ctx.form_data.get(field);
    let present = actual.map(|v| v.is_present()).unwrap_or(false);

    match operator {
        ConditionOperator::Exists => present,
        ConditionOperator::NotExists => !present,
        ConditionOperator::Equals => match (actual, expected) {
            (Some(a), Some(e)) => a == e,
            _ => false,
        },
        ConditionOperator::GreaterThan => match (
            actual.and_then(|v| v.as_number()),
            expected.and_then(|v| v.as_number()),
        ) {
            (Some(a), Some(e)) => a > e,
            _ => false,
        },
        ConditionOperator::LessThan => match (
            actual.and_then(|v| v.as_number()),
            expected.and_then(|v| v.as_number()),
        ) {
            (Some(a), Some(e)) => a < e,
            _ => false,
        },
        ConditionOperator::Contains => match (actual, expected.and_then(|v| v.as_text())) {
            (Some(a), Some(needle)) => a.contains_text(needle),
            _ => false,
        },
    }
}

/// Numeric comparison for rate/level conditions. Operators that make no
/// sense for scalars (contains, exists) resolve to false.
fn numeric_holds(operator: ConditionOperator, actual: f64, threshold: f64) -> bool {
    match operator {
        ConditionOperator::Equals => (actual - threshold).abs() < EQ_EPSILON,
        ConditionOperator::GreaterThan => actual > threshold,
        ConditionOperator::LessThan => actual < threshold,
        ConditionOperator::Contains
        | ConditionOperator::Exists
        | ConditionOperator::NotExists => false,
    }
}
