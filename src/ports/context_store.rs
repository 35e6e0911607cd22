//! Context Store Port - Interface for persisting form contexts.

use async_trait::async_trait;

use crate::domain::form::AiFormContext;
use crate::domain::foundation::SessionId;

/// Errors that can occur during context storage operations.
#[derive(Debug, thiserror::Error)]
pub enum ContextStoreError {
    #[error("No context found for session: {0}")]
    NotFound(SessionId),

    #[error("Failed to serialize context: {0}")]
    SerializationFailed(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Port for saving and loading per-session form contexts.
#[async_trait]
pub trait ContextStore: Send + Sync {
    /// Save a context, replacing any previous revision.
    async fn save(&self, context: &AiFormContext) -> Result<(), ContextStoreError>;

    /// Load the latest context for a session.
    ///
    /// # Errors
    /// Returns `ContextStoreError::NotFound` if the session has none.
    async fn load(&self, session_id: SessionId) -> Result<AiFormContext, ContextStoreError>;

    /// Check whether a context exists for a session.
    async fn exists(&self, session_id: SessionId) -> Result<bool, ContextStoreError>;

    /// Delete a session's context.
    async fn delete(&self, session_id: SessionId) -> Result<(), ContextStoreError>;
}
