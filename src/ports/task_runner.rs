//! Task Runner Port - Interface for executing heavy operations.
//!
//! Validation and conflict detection can be slow, so the engine hands
//! them to a runner and awaits the result under a timeout. Where the
//! work actually runs (inline, worker pool, remote service) is the
//! adapter's business.

use async_trait::async_trait;

use crate::domain::disclosure::DisclosureContext;
use crate::domain::validation::{ConflictDescriptor, ValidationOutcome};

/// A unit of heavy work the engine delegates.
#[derive(Debug, Clone)]
pub enum HeavyTask {
    Validate { context: DisclosureContext },
    DetectConflicts { context: DisclosureContext },
}

/// Result of a completed heavy task.
#[derive(Debug, Clone)]
pub enum HeavyTaskOutput {
    Validation(ValidationOutcome),
    Conflicts(Vec<ConflictDescriptor>),
}

/// Errors raised while running a heavy task.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("Task timed out after {0}ms")]
    Timeout(u64),

    #[error("Task was cancelled")]
    Cancelled,

    #[error("Task failed: {0}")]
    Failed(String),
}

/// Port for executing heavy tasks off the update path.
#[async_trait]
pub trait TaskRunner: Send + Sync {
    /// Run one task to completion.
    ///
    /// # Errors
    /// Returns `TaskError::Failed` when the underlying worker errored;
    /// timeouts are enforced by the caller, not the runner.
    async fn run(&self, task: HeavyTask) -> Result<HeavyTaskOutput, TaskError>;
}
