//! Form Validator Port - Interface for validating form state.
//!
//! Validation is a collaborator, not part of the engine: the engine asks
//! a validator for an outcome and carries on (degraded) if the validator
//! is unavailable.

use async_trait::async_trait;

use crate::domain::disclosure::DisclosureContext;
use crate::domain::validation::{ConflictDescriptor, ValidationOutcome};

/// Errors a validator can raise.
#[derive(Debug, thiserror::Error)]
pub enum ValidatorError {
    #[error("Validator unavailable: {0}")]
    Unavailable(String),

    #[error("Validator rejected the input: {0}")]
    InvalidInput(String),
}

/// Port for validating form state and detecting conflicts.
#[async_trait]
pub trait FormValidator: Send + Sync {
    /// Validate the current form state.
    ///
    /// Business-rule violations are reported inside the outcome, not as
    /// errors; `Err` means the validator itself could not run.
    async fn validate(&self, context: &DisclosureContext)
        -> Result<ValidationOutcome, ValidatorError>;

    /// Detect cross-field conflicts in the current form state.
    async fn detect_conflicts(
        &self,
        context: &DisclosureContext,
    ) -> Result<Vec<ConflictDescriptor>, ValidatorError>;
}
