//! Worker task runner.
//!
//! Spawns each heavy task onto the tokio runtime so a slow validation
//! pass never blocks the update path that requested it.

use std::sync::Arc;

use async_trait::async_trait;

use crate::ports::{FormValidator, HeavyTask, HeavyTaskOutput, TaskError, TaskRunner};

/// Executes tasks on spawned tokio tasks.
pub struct WorkerTaskRunner {
    validator: Arc<dyn FormValidator>,
}

impl WorkerTaskRunner {
    pub fn new(validator: Arc<dyn FormValidator>) -> Self {
        Self { validator }
    }
}

#[async_trait]
impl TaskRunner for WorkerTaskRunner {
    async fn run(&self, task: HeavyTask) -> Result<HeavyTaskOutput, TaskError> {
        let validator = Arc::clone(&self.validator);
        let handle = tokio::spawn(async move {
            match task {
                HeavyTask::Validate { context } => validator
                    .validate(&context)
                    .await
                    .map(HeavyTaskOutput::Validation)
                    .map_err(|e| TaskError::Failed(e.to_string())),
                HeavyTask::DetectConflicts { context } => validator
                    .detect_conflicts(&context)
                    .await
                    .map(HeavyTaskOutput::Conflicts)
                    .map_err(|e| TaskError::Failed(e.to_string())),
            }
        });

        match handle.await {
            Ok(result) => result,
            Err(join_err) if join_err.is_cancelled() => Err(TaskError::Cancelled),
            Err(join_err) => Err(TaskError::Failed(join_err.to_string())),
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
    async fn spawned_validation_matches_inline_results() {
        let runner = WorkerTaskRunner::new(Arc::new(RuleBasedValidator::new()));
        let context =
            DisclosureContext::new().with_field("targetAmount", FieldValue::Number(500.0));

        let output = runner.run(HeavyTask::Validate { context }).await.unwrap();
        match output {
            HeavyTaskOutput::Validation(outcome) => assert!(outcome.is_passing()),
            other => panic!("unexpected output: {other:?}"),
        }
    }
}
