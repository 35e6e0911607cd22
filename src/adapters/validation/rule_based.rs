//! Rule-based validator.
//!
//! Checks the financial-goal business rules directly against the form
//! data. It is deterministic and infallible as a service: every call
//! produces an outcome, and findings are reported inside it.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use crate::domain::disclosure::DisclosureContext;
use crate::domain::foundation::{Confidence, ConflictId, FieldId, FieldValue};
use crate::domain::validation::{
    ConflictDescriptor, ConflictSeverity, Suggestion, ValidationIssue, ValidationOutcome,
};
use crate::ports::{FormValidator, ValidatorError};

const BASE_CONFIDENCE: f64 = 0.9;
const ERROR_PENALTY: f64 = 0.2;
const WARNING_PENALTY: f64 = 0.05;
const CONFIDENCE_FLOOR: f64 = 0.1;

const MIN_DESCRIPTION_CHARS: usize = 20;
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Validates goal forms against fixed business rules.
#[derive(Debug, Default)]
pub struct RuleBasedValidator;

impl RuleBasedValidator {
    pub fn new() -> Self {
        Self
    }

    fn deadline_date(context: &DisclosureContext) -> Option<Result<NaiveDate, ()>> {
        let value = context.form_data.get(&FieldId::from("deadline"))?;
        let text = value.as_text()?;
        if text.trim().is_empty() {
            return None;
        }
        Some(NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).map_err(|_| ()))
    }

    fn target_amount(context: &DisclosureContext) -> Option<f64> {
        context
            .form_data
            .get(&FieldId::from("targetAmount"))
            .and_then(FieldValue::as_number)
    }
}

#[async_trait]
impl FormValidator for RuleBasedValidator {
    async fn validate(
        &self,
        context: &DisclosureContext,
    ) -> Result<ValidationOutcome, ValidatorError> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let mut suggestions = Vec::new();

        let amount = Self::target_amount(context);
        match amount {
            Some(value) if value <= 0.0 => {
                errors.push(ValidationIssue::for_field(
                    "targetAmount",
                    "Target amount must be greater than zero",
                ));
            }
            Some(_) => {}
            None => {
                if context
                    .form_data
                    .contains_key(&FieldId::from("targetAmount"))
                {
                    errors.push(ValidationIssue::for_field(
                        "targetAmount",
                        "Target amount must be a number",
                    ));
                }
            }
        }

        let today = Utc::now().date_naive();
        let deadline = match Self::deadline_date(context) {
            Some(Ok(date)) => {
                if date <= today {
                    errors.push(ValidationIssue::for_field(
                        "deadline",
                        "Deadline must be in the future",
                    ));
                    None
                } else {
                    Some(date)
                }
            }
            Some(Err(())) => {
                errors.push(ValidationIssue::for_field(
                    "deadline",
                    "Deadline must be an ISO date (YYYY-MM-DD)",
                ));
                None
            }
            None => None,
        };

        match context
            .form_data
            .get(&FieldId::from("description"))
            .and_then(FieldValue::as_text)
        {
            Some(text) if text.trim().len() < MIN_DESCRIPTION_CHARS => {
                warnings.push(ValidationIssue::for_field(
                    "description",
                    "A longer description helps reviewers understand the goal",
                ));
            }
            _ => {}
        }

        // Feasibility: monthly contributions have to reach the target
        // before the deadline.
        if let (Some(target), Some(date), Some(monthly)) = (
            amount,
            deadline,
            context
                .form_data
                .get(&FieldId::from("monthlyContribution"))
                .and_then(FieldValue::as_number),
        ) {
            if monthly > 0.0 && target > 0.0 {
                let days_left = (date - today).num_days().max(0) as f64;
                let months_left = days_left / 30.0;
                if monthly * months_left < target {
                    warnings.push(ValidationIssue::for_field(
                        "monthlyContribution",
                        "Planned contributions will not reach the target by the deadline",
                    ));
                    suggestions.push(Suggestion {
                        field: Some(FieldId::from("monthlyContribution")),
                        message: format!(
                            "Contributing at least {:.2} per month would reach the target in time",
                            target / months_left.max(1.0)
                        ),
                    });
                }
            }
        }

        let confidence = (BASE_CONFIDENCE
            - ERROR_PENALTY * errors.len() as f64
            - WARNING_PENALTY * warnings.len() as f64)
            .max(CONFIDENCE_FLOOR);

        Ok(ValidationOutcome {
            errors,
            warnings,
            suggestions,
            overall_confidence: Confidence::new(confidence),
        })
    }

    async fn detect_conflicts(
        &self,
        context: &DisclosureContext,
    ) -> Result<Vec<ConflictDescriptor>, ValidatorError> {
        let mut conflicts = Vec::new();

        let amount = Self::target_amount(context);
        let expenses = context
            .form_data
            .get(&FieldId::from("expenseBreakdown"))
            .and_then(FieldValue::as_number);

        if let (Some(target), Some(total)) = (amount, expenses) {
            if total > target {
                conflicts.push(ConflictDescriptor::new(
                    ConflictId::new("expense-exceeds-target"),
                    vec![
                        FieldId::from("expenseBreakdown"),
                        FieldId::from("targetAmount"),
                    ],
                    format!(
                        "Planned expenses ({total:.2}) exceed the target amount ({target:.2})"
                    ),
                    ConflictSeverity::High,
                ));
            }
        }

        if amount.is_some() {
            if let Some(Ok(date)) = Self::deadline_date(context) {
                if date <= Utc::now().date_naive() {
                    conflicts.push(ConflictDescriptor::new(
                        ConflictId::new("deadline-already-passed"),
                        vec![FieldId::from("deadline"), FieldId::from("targetAmount")],
                        "The deadline has already passed for a goal that still needs funding",
                        ConflictSeverity::Medium,
                    ));
                }
            }
        }

        Ok(conflicts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn future_date(days: i64) -> String {
        (Utc::now().date_naive() + Duration::days(days))
            .format(DATE_FORMAT)
            .to_string()
    }

    fn context_with(fields: &[(&str, FieldValue)]) -> DisclosureContext {
        let mut ctx = DisclosureContext::new();
        for (field, value) in fields {
            ctx = ctx.with_field(FieldId::from(*field), value.clone());
        }
        ctx
    }

    #[tokio::test]
    async fn clean_form_passes_with_high_confidence() {
        let ctx = context_with(&[
            (
                "description",
                FieldValue::Text("Save for first-year tuition and housing".into()),
            ),
            ("targetAmount", FieldValue::Number(5_000.0)),
            ("deadline", FieldValue::Text(future_date(365))),
        ]);

        let outcome = RuleBasedValidator::new().validate(&ctx).await.unwrap();
        assert!(outcome.is_passing());
        assert!(outcome.warnings.is_empty());
        assert!((outcome.overall_confidence.value() - 0.9).abs() < 1e-9);
    }

    #[tokio::test]
    async fn non_positive_amount_is_an_error() {
        let ctx = context_with(&[("targetAmount", FieldValue::Number(0.0))]);
        let outcome = RuleBasedValidator::new().validate(&ctx).await.unwrap();
        assert!(!outcome.is_passing());
        assert_eq!(
            outcome.errors[0].field,
            Some(FieldId::from("targetAmount"))
        );
    }

    #[tokio::test]
    async fn past_deadline_is_an_error() {
        let ctx = context_with(&[("deadline", FieldValue::Text(future_date(-1)))]);
        let outcome = RuleBasedValidator::new().validate(&ctx).await.unwrap();
        assert!(!outcome.is_passing());
    }

    #[tokio::test]
    async fn unparseable_deadline_is_an_error() {
        let ctx = context_with(&[("deadline", FieldValue::Text("next spring".into()))]);
        let outcome = RuleBasedValidator::new().validate(&ctx).await.unwrap();
        assert!(outcome.errors.iter().any(|e| e.message.contains("ISO")));
    }

    #[tokio::test]
    async fn short_description_is_only_a_warning() {
        let ctx = context_with(&[("description", FieldValue::Text("Tuition".into()))]);
        let outcome = RuleBasedValidator::new().validate(&ctx).await.unwrap();
        assert!(outcome.is_passing());
        assert_eq!(outcome.warnings.len(), 1);
        assert!((outcome.overall_confidence.value() - 0.85).abs() < 1e-9);
    }

    #[tokio::test]
    async fn infeasible_contribution_warns_and_suggests() {
        let ctx = context_with(&[
            ("targetAmount", FieldValue::Number(12_000.0)),
            ("deadline", FieldValue::Text(future_date(90))),
            ("monthlyContribution", FieldValue::Number(100.0)),
        ]);

        let outcome = RuleBasedValidator::new().validate(&ctx).await.unwrap();
        assert!(outcome
            .warnings
            .iter()
            .any(|w| w.field == Some(FieldId::from("monthlyContribution"))));
        assert_eq!(outcome.suggestions.len(), 1);
    }

    #[tokio::test]
    async fn confidence_never_drops_below_the_floor() {
        let ctx = context_with(&[
            ("targetAmount", FieldValue::Number(-5.0)),
            ("deadline", FieldValue::Text("whenever".into())),
            ("description", FieldValue::Text("x".into())),
        ]);

        let outcome = RuleBasedValidator::new().validate(&ctx).await.unwrap();
        assert!(outcome.overall_confidence.value() >= CONFIDENCE_FLOOR - 1e-9);
    }

    #[tokio::test]
    async fn expenses_above_target_raise_a_high_severity_conflict() {
        let ctx = context_with(&[
            ("targetAmount", FieldValue::Number(10_000.0)),
            ("expenseBreakdown", FieldValue::Number(12_500.0)),
        ]);

        let conflicts = RuleBasedValidator::new()
            .detect_conflicts(&ctx)
            .await
            .unwrap();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].severity, ConflictSeverity::High);
        assert_eq!(conflicts[0].id, ConflictId::new("expense-exceeds-target"));
    }

    #[tokio::test]
    async fn conflict_ids_are_stable_across_runs() {
        let ctx = context_with(&[
            ("targetAmount", FieldValue::Number(10_000.0)),
            ("expenseBreakdown", FieldValue::Number(12_500.0)),
        ]);

        let validator = RuleBasedValidator::new();
        let first = validator.detect_conflicts(&ctx).await.unwrap();
        let second = validator.detect_conflicts(&ctx).await.unwrap();
        assert_eq!(first[0].id, second[0].id);
    }

    #[tokio::test]
    async fn matching_expenses_raise_no_conflict() {
        let ctx = context_with(&[
            ("targetAmount", FieldValue::Number(10_000.0)),
            ("expenseBreakdown", FieldValue::Number(10_000.0)),
        ]);

        let conflicts = RuleBasedValidator::new()
            .detect_conflicts(&ctx)
            .await
            .unwrap();
        assert!(conflicts.is_empty());
    }
}
