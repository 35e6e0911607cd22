//! Disclosure context - the sole input to rule evaluation.
//!
//! The context is rebuilt (not mutated in place) on every field update so
//! evaluation stays a pure function of its input; there are no hidden
//! globals feeding the rule engine.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::foundation::{Confidence, ExpertiseLevel, FieldId, FieldValue};
use crate::domain::validation::ValidationOutcome;

/// Canonical ordering of the goal form's fields. Index in this list is a
/// field's `suggested_order`; fields not listed sort last (order 99).
pub static CANONICAL_FIELD_ORDER: Lazy<Vec<FieldId>> = Lazy::new(|| {
    [
        "title",
        "description",
        "targetAmount",
        "deadline",
        "category",
        "expenseBreakdown",
        "fundingSources",
        "clarificationFields",
        "notes",
    ]
    .into_iter()
    .map(FieldId::from)
    .collect()
});

/// The basic fields: always visible and required even with no applicable
/// rules.
pub static BASIC_FIELDS: Lazy<Vec<FieldId>> = Lazy::new(|| {
    ["title", "description", "targetAmount", "deadline"]
        .into_iter()
        .map(FieldId::from)
        .collect()
});

/// Order assigned to fields outside the canonical list.
pub const UNORDERED: u8 = 99;

/// Why an uncertainty flag was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UncertaintySource {
    /// AI assistance failed or timed out; degraded defaults are in effect.
    AiUnavailable,
    /// A field's inferred value has low confidence.
    LowConfidence,
    /// An unresolved conflict touches the field.
    ConflictPending,
}

/// A flag telling the UI to surface help or a notice for a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UncertaintyFlag {
    /// The affected field; `None` for session-wide notices.
    pub field: Option<FieldId>,
    pub message: String,
    pub source: UncertaintySource,
}

impl UncertaintyFlag {
    /// Session-wide notice that AI assistance is unavailable.
    pub fn ai_unavailable(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
            source: UncertaintySource::AiUnavailable,
        }
    }

    /// Field-scoped low-confidence flag.
    pub fn low_confidence(field: impl Into<FieldId>, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            message: message.into(),
            source: UncertaintySource::LowConfidence,
        }
    }
}

/// Everything rule evaluation may look at.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisclosureContext {
    pub form_data: BTreeMap<FieldId, FieldValue>,
    pub completed_fields: BTreeSet<FieldId>,
    pub confidence_scores: BTreeMap<FieldId, Confidence>,
    pub expertise: ExpertiseLevel,
    pub current_phase: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationOutcome>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub uncertainty_flags: Vec<UncertaintyFlag>,
}

impl DisclosureContext {
    /// Creates an empty context for a fresh form.
    pub fn new() -> Self {
        Self {
            current_phase: "initial".into(),
            ..Self::default()
        }
    }

    /// Builder-style field value setter (test and seed convenience).
    pub fn with_field(mut self, field: impl Into<FieldId>, value: FieldValue) -> Self {
        self.form_data.insert(field.into(), value);
        self
    }

    /// Builder-style confidence setter.
    pub fn with_confidence(mut self, field: impl Into<FieldId>, confidence: Confidence) -> Self {
        self.confidence_scores.insert(field.into(), confidence);
        self
    }

    /// Builder-style expertise setter.
    pub fn with_expertise(mut self, expertise: ExpertiseLevel) -> Self {
        self.expertise = expertise;
        self
    }

    /// Completed fields divided by the number of fields with data;
    /// zero when the form is untouched.
    pub fn completion_rate(&self) -> f64 {
        let total = self.form_data.len().max(1);
        self.completed_fields.len() as f64 / total as f64
    }

    /// Mean of all recorded confidence scores; full confidence when none
    /// have been recorded yet.
    pub fn average_confidence(&self) -> f64 {
        Confidence::mean(self.confidence_scores.values())
            .unwrap_or(Confidence::FULL)
            .value()
    }

    /// Returns true if an uncertainty flag targets the field (or the whole
    /// session).
    pub fn has_uncertainty_for(&self, field: &FieldId) -> bool {
        self.uncertainty_flags
            .iter()
            .any(|flag| flag.field.as_ref().is_none() || flag.field.as_ref() == Some(field))
    }
}

/// Position of a field in the canonical ordering.
pub fn suggested_order(field: &FieldId) -> u8 {
    CANONICAL_FIELD_ORDER
        .iter()
        .position(|f| f == field)
        .map_or(UNORDERED, |i| i as u8)
}

/// Whether a field is one of the always-required basics.
pub fn is_basic_field(field: &FieldId) -> bool {
    BASIC_FIELDS.iter().any(|f| f == field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_rate_of_empty_form_is_zero() {
        assert_eq!(DisclosureContext::new().completion_rate(), 0.0);
    }

    #[test]
    fn completion_rate_divides_completed_by_filled() {
        let mut ctx = DisclosureContext::new()
            .with_field("title", FieldValue::Text("Tuition".into()))
            .with_field("description", FieldValue::Text("Fall term".into()));
        ctx.completed_fields.insert(FieldId::from("title"));

        assert!((ctx.completion_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn average_confidence_defaults_to_full() {
        assert_eq!(DisclosureContext::new().average_confidence(), 1.0);
    }

    #[test]
    fn average_confidence_is_arithmetic_mean() {
        let ctx = DisclosureContext::new()
            .with_confidence("title", Confidence::new(0.9))
            .with_confidence("targetAmount", Confidence::new(0.85));
        assert!((ctx.average_confidence() - 0.875).abs() < 1e-9);
    }

    #[test]
    fn session_wide_flags_cover_every_field() {
        let mut ctx = DisclosureContext::new();
        ctx.uncertainty_flags
            .push(UncertaintyFlag::ai_unavailable("AI assistance unavailable"));
        assert!(ctx.has_uncertainty_for(&FieldId::from("deadline")));
    }

    #[test]
    fn field_scoped_flags_cover_only_their_field() {
        let mut ctx = DisclosureContext::new();
        ctx.uncertainty_flags
            .push(UncertaintyFlag::low_confidence("deadline", "check this date"));
        assert!(ctx.has_uncertainty_for(&FieldId::from("deadline")));
        assert!(!ctx.has_uncertainty_for(&FieldId::from("title")));
    }

    #[test]
    fn suggested_order_follows_canonical_list() {
        assert_eq!(suggested_order(&FieldId::from("title")), 0);
        assert_eq!(suggested_order(&FieldId::from("expenseBreakdown")), 5);
        assert_eq!(suggested_order(&FieldId::from("unknownField")), UNORDERED);
    }

    #[test]
    fn basic_fields_are_the_first_four() {
        assert!(is_basic_field(&FieldId::from("title")));
        assert!(is_basic_field(&FieldId::from("deadline")));
        assert!(!is_basic_field(&FieldId::from("notes")));
    }
}
