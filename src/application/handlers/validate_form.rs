//! On-demand full-form validation.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, SessionId};
use crate::domain::validation::ValidationOutcome;
use crate::ports::{ContextStore, ContextStoreError, HeavyTask, HeavyTaskOutput, TaskRunner};

use crate::application::engine::FormEngine;

/// Errors raised while validating a form.
#[derive(Debug, Error)]
pub enum ValidateError {
    #[error(transparent)]
    Store(#[from] ContextStoreError),

    #[error("Validation could not complete: {0}")]
    Unavailable(String),
}

impl ValidateError {
    /// Maps the error onto the coded envelope exposed at the API
    /// boundary.
    pub fn to_domain_error(&self) -> DomainError {
        match self {
            ValidateError::Store(ContextStoreError::NotFound(_)) => {
                DomainError::new(ErrorCode::SessionNotFound, self.to_string())
            }
            ValidateError::Store(ContextStoreError::SerializationFailed(_)) => {
                DomainError::new(ErrorCode::SerializationError, self.to_string())
            }
            ValidateError::Store(ContextStoreError::Backend(_)) => {
                DomainError::new(ErrorCode::InternalError, self.to_string())
            }
            ValidateError::Unavailable(_) => {
                DomainError::new(ErrorCode::AiUnavailable, self.to_string())
            }
        }
    }
}

/// Runs a full validation pass outside the update pipeline, typically
/// before submission.
pub struct ValidateFormHandler {
    task_runner: Arc<dyn TaskRunner>,
    context_store: Arc<dyn ContextStore>,
}

impl ValidateFormHandler {
    pub fn new(task_runner: Arc<dyn TaskRunner>, context_store: Arc<dyn ContextStore>) -> Self {
        Self {
            task_runner,
            context_store,
        }
    }

    pub async fn handle(
        &self,
        engine: &FormEngine,
        session_id: SessionId,
    ) -> Result<ValidationOutcome, ValidateError> {
        let mut context = self.context_store.load(session_id).await?;
        let budget = Duration::from_millis(engine.config().validation_timeout_ms);

        let result = tokio::time::timeout(
            budget,
            self.task_runner.run(HeavyTask::Validate {
                context: context.disclosure.clone(),
            }),
        )
        .await;

        let outcome = match result {
            Ok(Ok(HeavyTaskOutput::Validation(outcome))) => outcome,
            Ok(Ok(other)) => {
                return Err(ValidateError::Unavailable(format!(
                    "mismatched task output: {other:?}"
                )))
            }
            Ok(Err(e)) => return Err(ValidateError::Unavailable(e.to_string())),
            Err(_) => {
                return Err(ValidateError::Unavailable(format!(
                    "timed out after {}ms",
                    budget.as_millis()
                )))
            }
        };

        context.disclosure.validation = Some(outcome.clone());
        self.context_store.save(&context).await?;
        Ok(outcome)
    }
}
