//! Conflict resolution.
//!
//! A conflict stays attached to the form until the user deals with it;
//! resolving one may change field values, so disclosure is re-evaluated
//! afterwards.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::foundation::{ConflictId, DomainError, ErrorCode, SessionId};
use crate::domain::form::AiFormContext;
use crate::domain::validation::ConflictResolution;
use crate::ports::{ContextStore, ContextStoreError, EngineEvent, EventPublisher};

use crate::application::engine::FormEngine;

/// Errors raised while resolving a conflict.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Store(#[from] ContextStoreError),

    #[error("No such conflict: {0}")]
    ConflictNotFound(ConflictId),
}

impl ResolveError {
    /// Maps the error onto the coded envelope exposed at the API
    /// boundary.
    pub fn to_domain_error(&self) -> DomainError {
        match self {
            ResolveError::ConflictNotFound(id) => {
                DomainError::new(ErrorCode::ConflictNotFound, self.to_string())
                    .with_detail("conflict_id", id.as_str())
            }
            ResolveError::Store(ContextStoreError::NotFound(_)) => {
                DomainError::new(ErrorCode::SessionNotFound, self.to_string())
            }
            ResolveError::Store(ContextStoreError::SerializationFailed(_)) => {
                DomainError::new(ErrorCode::SerializationError, self.to_string())
            }
            ResolveError::Store(ContextStoreError::Backend(_)) => {
                DomainError::new(ErrorCode::InternalError, self.to_string())
            }
        }
    }
}

/// Applies the user's decision to an open conflict.
pub struct ResolveConflictHandler {
    context_store: Arc<dyn ContextStore>,
    events: Arc<dyn EventPublisher>,
}

impl ResolveConflictHandler {
    pub fn new(context_store: Arc<dyn ContextStore>, events: Arc<dyn EventPublisher>) -> Self {
        Self {
            context_store,
            events,
        }
    }

    pub async fn handle(
        &self,
        engine: &FormEngine,
        session_id: SessionId,
        conflict_id: &ConflictId,
        resolution: ConflictResolution,
    ) -> Result<AiFormContext, ResolveError> {
        let context = self.context_store.load(session_id).await?;

        if !context.conflicts.iter().any(|c| &c.id == conflict_id) {
            return Err(ResolveError::ConflictNotFound(conflict_id.clone()));
        }

        let mut context = match resolution {
            ConflictResolution::ReplaceValue { field, value } => {
                context.apply_field(field, value)
            }
            ConflictResolution::KeepCurrent | ConflictResolution::Dismiss => context,
        };

        for conflict in &mut context.conflicts {
            if &conflict.id == conflict_id {
                conflict.resolved = true;
            }
        }

        // Resolution may have changed values; re-derive what is visible.
        if engine.progressive_enabled() {
            let states = engine.evaluate_disclosure(&context.disclosure);
            context.visible_fields = engine.visible_fields(&states);
            context.recommendations = engine.recommend(&context.disclosure);
        }

        self.context_store.save(&context).await?;
        let _ = self
            .events
            .publish(EngineEvent::ConflictResolved {
                session_id,
                conflict_id: conflict_id.clone(),
            })
            .await;

        Ok(context)
    }
}
