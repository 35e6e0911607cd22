//! Inline task runner.
//!
//! Runs heavy tasks directly on the caller's async task. Suitable for
//! tests and single-user deployments where a worker pool buys nothing.

use std::sync::Arc;

use async_trait::async_trait;

use crate::ports::{FormValidator, HeavyTask, HeavyTaskOutput, TaskError, TaskRunner};

/// Executes tasks by calling the validator in place.
pub struct InlineTaskRunner {
    validator: Arc<dyn FormValidator>,
}

impl InlineTaskRunner {
    pub fn new(validator: Arc<dyn FormValidator>) -> Self {
        Self { validator }
    }
}

#[async_trait]
impl TaskRunner for InlineTaskRunner {
    async fn run(&self, task: HeavyTask) -> Result<HeavyTaskOutput, TaskError> {
        match task {
            HeavyTask::Validate { context } => self
                .validator
                .validate(&context)
                .await
                .map(HeavyTaskOutput::Validation)
                .map_err(|e| TaskError::Failed(e.to_string())),
            HeavyTask::DetectConflicts { context } => self
                .validator
                .detect_conflicts(&context)
                .await
                .map(HeavyTaskOutput::Conflicts)
                .map_err(|e| TaskError::Failed(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::validation::RuleBasedValidator;
    use crate::domain::disclosure::DisclosureContext;
    use crate::domain::foundation::FieldValue;

    #[tokio::test]
    async fn runs_validation_through_the_wrapped_validator() {
        let runner = InlineTaskRunner::new(Arc::new(RuleBasedValidator::new()));
        let context =
            DisclosureContext::new().with_field("targetAmount", FieldValue::Number(-1.0));

        let output = runner.run(HeavyTask::Validate { context }).await.unwrap();
        match output {
            HeavyTaskOutput::Validation(outcome) => assert!(!outcome.is_passing()),
            other => panic!("unexpected output: {other:?}"),
        }
    }

    #[tokio::test]
    async fn runs_conflict_detection() {
        let runner = InlineTaskRunner::new(Arc::new(RuleBasedValidator::new()));
        let context = DisclosureContext::new()
            .with_field("targetAmount", FieldValue::Number(1_000.0))
            .with_field("expenseBreakdown", FieldValue::Number(2_000.0));

        let output = runner
            .run(HeavyTask::DetectConflicts { context })
            .await
            .unwrap();
        match output {
            HeavyTaskOutput::Conflicts(conflicts) => assert_eq!(conflicts.len(), 1),
            other => panic!("unexpected output: {other:?}"),
        }
    }
}
