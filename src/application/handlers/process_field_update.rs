//! Field update pipeline.
//!
//! The single entry point for "the user (or the AI) changed a field".
//! One pass merges the value, validates, re-evaluates disclosure, and
//! feeds the safety layer. Validator failures degrade the pass instead
//! of failing it: the raw value is always kept.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::disclosure::UncertaintyFlag;
use crate::domain::foundation::{
    Confidence, DomainError, ErrorCode, FieldId, FieldValue, SessionId, Timestamp,
};
use crate::domain::form::AiFormContext;
use crate::domain::safety::OperationKind;
use crate::domain::validation::ConflictDescriptor;
use crate::ports::{
    ContextStore, ContextStoreError, EngineEvent, EventPublisher, HeavyTask, HeavyTaskOutput,
    SessionGateway, SessionGatewayError, TaskRunner,
};

use crate::application::engine::{EngineError, FormEngine, SafetyReport};

/// Where a field update came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateSource {
    UserInput,
    AiInference,
    Import,
}

/// One requested field change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldUpdate {
    pub field_id: FieldId,
    pub value: FieldValue,
    pub timestamp: Timestamp,
    pub source: UpdateSource,
}

impl FieldUpdate {
    pub fn now(field_id: impl Into<FieldId>, value: FieldValue, source: UpdateSource) -> Self {
        Self {
            field_id: field_id.into(),
            value,
            timestamp: Timestamp::now(),
            source,
        }
    }
}

/// Outcome of one pass through the pipeline.
#[derive(Debug)]
pub struct ProcessFieldUpdateResult {
    pub context: AiFormContext,
    /// True when the validator could not run and degraded defaults are
    /// in effect.
    pub degraded: bool,
    /// True when the session is frozen and only the raw value was kept.
    pub emergency: bool,
    /// True when the outcome is uncertain enough to want a human look.
    pub needs_manual_intervention: bool,
    pub safety: SafetyReport,
}

/// Errors that abort the pipeline outright.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error(transparent)]
    Session(#[from] SessionGatewayError),

    #[error(transparent)]
    Store(#[from] ContextStoreError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Update for {field} is older than the stored context")]
    StaleUpdate { field: FieldId },
}

impl ProcessError {
    /// Maps the error onto the coded envelope exposed at the API
    /// boundary.
    pub fn to_domain_error(&self) -> DomainError {
        match self {
            ProcessError::Session(SessionGatewayError::Unknown(_)) => {
                DomainError::new(ErrorCode::SessionNotFound, self.to_string())
            }
            ProcessError::Session(SessionGatewayError::Backend(_)) => {
                DomainError::new(ErrorCode::InternalError, self.to_string())
            }
            ProcessError::Store(ContextStoreError::NotFound(_)) => {
                DomainError::new(ErrorCode::SessionNotFound, self.to_string())
            }
            ProcessError::Store(ContextStoreError::SerializationFailed(_))
            | ProcessError::Engine(_) => {
                DomainError::new(ErrorCode::SerializationError, self.to_string())
            }
            ProcessError::Store(ContextStoreError::Backend(_)) => {
                DomainError::new(ErrorCode::InternalError, self.to_string())
            }
            ProcessError::StaleUpdate { field } => {
                DomainError::new(ErrorCode::StaleUpdate, self.to_string())
                    .with_detail("field", field.as_str())
            }
        }
    }
}

/// Handles field updates end to end.
pub struct ProcessFieldUpdateHandler {
    task_runner: Arc<dyn TaskRunner>,
    context_store: Arc<dyn ContextStore>,
    session_gateway: Arc<dyn SessionGateway>,
    events: Arc<dyn EventPublisher>,
}

impl ProcessFieldUpdateHandler {
    pub fn new(
        task_runner: Arc<dyn TaskRunner>,
        context_store: Arc<dyn ContextStore>,
        session_gateway: Arc<dyn SessionGateway>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            task_runner,
            context_store,
            session_gateway,
            events,
        }
    }

    pub async fn handle(
        &self,
        engine: &mut FormEngine,
        update: FieldUpdate,
    ) -> Result<ProcessFieldUpdateResult, ProcessError> {
        let session_id = engine.session_id();

        // 1. Load the context, creating one for a fresh session.
        let (previous, is_new) = self.load_or_create(session_id).await?;

        // 2. A stale update would silently undo newer input. A freshly
        //    created context postdates the update by construction, so
        //    only stored contexts are checked.
        if !is_new && update.timestamp.is_before(&previous.updated_at) {
            return Err(ProcessError::StaleUpdate {
                field: update.field_id,
            });
        }

        // 3. Emergency mode keeps the raw value and nothing else.
        if engine.is_emergency() {
            let context = previous.apply_field(update.field_id.clone(), update.value.clone());
            self.context_store.save(&context).await?;
            self.publish_field_updated(&context, &update.field_id).await;
            return Ok(ProcessFieldUpdateResult {
                context,
                degraded: false,
                emergency: true,
                needs_manual_intervention: true,
                safety: SafetyReport::default(),
            });
        }

        // 4. Merge the value and score it.
        let mut context = previous.apply_field(update.field_id.clone(), update.value.clone());
        let heuristic = engine.score_value(&update.value);
        context
            .disclosure
            .confidence_scores
            .insert(update.field_id.clone(), heuristic);

        // 5. Validation and conflict detection, under the timeout.
        let (degraded, success, op_confidence) = match self.run_validation(engine, &context).await {
            Some((outcome, conflicts)) => {
                let op_confidence = outcome.overall_confidence;
                context.disclosure.validation = Some(outcome);
                self.merge_conflicts(&mut context, conflicts).await;
                (false, true, op_confidence)
            }
            None => {
                self.enter_degraded(&mut context).await;
                (true, false, Confidence::NEUTRAL)
            }
        };

        // 6. Re-evaluate disclosure, unless it has been disabled or the
        //    pass degraded (a degraded pass keeps what was visible).
        if degraded {
            context.visible_fields = previous.visible_fields.clone();
            context.recommendations = previous.recommendations.clone();
        } else if engine.progressive_enabled() {
            let states = engine.evaluate_disclosure(&context.disclosure);
            context.visible_fields = engine.visible_fields(&states);
            // Recommendations are assistance; they stop when AI is off.
            context.recommendations = if engine.ai_enabled() {
                engine.recommend(&context.disclosure)
            } else {
                Vec::new()
            };
        } else {
            // Progressive disclosure off: show everything we know about.
            let states = engine.evaluate_disclosure(&context.disclosure);
            context.visible_fields = states.keys().cloned().collect();
            context.recommendations = Vec::new();
        }

        // 7. Feed the safety layer and honor whatever it demands.
        let safety = engine
            .record_outcome(OperationKind::FieldUpdate, success, op_confidence)
            .await;
        if let Some(snapshot) = &safety.restored {
            let revision = context.revision;
            context.disclosure = snapshot.progressive_state.context.clone();
            context.visible_fields = snapshot.progressive_state.visible_fields.clone();
            context.revision = revision + 1;
            context.updated_at = Timestamp::now();
        }
        let emergency = safety.emergency_activated;
        // Only healthy passes are worth checkpointing; a degraded pass
        // could capture exactly the state rollback exists to escape.
        if success && !emergency {
            engine.maybe_interval_snapshot(&context).await?;
        }

        let needs_manual_intervention = op_confidence.value()
            < engine.config().intervention_floor
            || context.has_unresolved_conflicts();

        self.context_store.save(&context).await?;
        self.publish_field_updated(&context, &update.field_id).await;
        debug!(
            session_id = %session_id,
            field = %update.field_id.as_str(),
            revision = context.revision,
            degraded,
            "field update processed"
        );

        Ok(ProcessFieldUpdateResult {
            context,
            degraded,
            emergency,
            needs_manual_intervention,
            safety,
        })
    }

    async fn load_or_create(
        &self,
        session_id: SessionId,
    ) -> Result<(AiFormContext, bool), ProcessError> {
        match self.context_store.load(session_id).await {
            Ok(context) => Ok((context, false)),
            Err(ContextStoreError::NotFound(_)) => {
                let info = self.session_gateway.session_info(session_id).await?;
                let mut context = AiFormContext::new(info.user_id, session_id);
                context.disclosure.expertise = info.expertise;
                Ok((context, true))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Runs validation and conflict detection; `None` means the
    /// validator could not produce an answer in time.
    async fn run_validation(
        &self,
        engine: &FormEngine,
        context: &AiFormContext,
    ) -> Option<(
        crate::domain::validation::ValidationOutcome,
        Vec<ConflictDescriptor>,
    )> {
        let budget = Duration::from_millis(engine.config().validation_timeout_ms);

        let validation = tokio::time::timeout(
            budget,
            self.task_runner.run(HeavyTask::Validate {
                context: context.disclosure.clone(),
            }),
        )
        .await;
        let outcome = match validation {
            Ok(Ok(HeavyTaskOutput::Validation(outcome))) => outcome,
            Ok(Ok(other)) => {
                warn!(output = ?other, "task runner returned mismatched output");
                return None;
            }
            Ok(Err(e)) => {
                warn!(error = %e, "validation task failed");
                return None;
            }
            Err(_) => {
                warn!(budget_ms = budget.as_millis() as u64, "validation timed out");
                return None;
            }
        };

        let conflicts = tokio::time::timeout(
            budget,
            self.task_runner.run(HeavyTask::DetectConflicts {
                context: context.disclosure.clone(),
            }),
        )
        .await;
        let conflicts = match conflicts {
            Ok(Ok(HeavyTaskOutput::Conflicts(conflicts))) => conflicts,
            _ => return None,
        };

        Some((outcome, conflicts))
    }

    /// Replaces unresolved conflicts with the fresh detection results,
    /// keeping conflicts the user already resolved.
    async fn merge_conflicts(
        &self,
        context: &mut AiFormContext,
        detected: Vec<ConflictDescriptor>,
    ) {
        let mut merged: Vec<ConflictDescriptor> = context
            .conflicts
            .iter()
            .filter(|c| c.resolved)
            .cloned()
            .collect();

        for conflict in detected {
            if merged.iter().any(|c| c.id == conflict.id) {
                continue;
            }
            let is_new = !context.conflicts.iter().any(|c| c.id == conflict.id);
            if is_new {
                let _ = self
                    .events
                    .publish(EngineEvent::ConflictDetected {
                        session_id: context.session_id,
                        conflict_id: conflict.id.clone(),
                    })
                    .await;
            }
            merged.push(conflict);
        }
        context.conflicts = merged;
    }

    async fn enter_degraded(&self, context: &mut AiFormContext) {
        let already_flagged = context
            .disclosure
            .uncertainty_flags
            .iter()
            .any(|f| f.field.is_none());
        if !already_flagged {
            context.disclosure.uncertainty_flags.push(
                UncertaintyFlag::ai_unavailable(
                    "AI assistance is temporarily unavailable; your input is saved",
                ),
            );
        }
        let _ = self
            .events
            .publish(EngineEvent::DegradedModeEntered {
                session_id: context.session_id,
                reason: "validator unavailable".into(),
            })
            .await;
    }

    async fn publish_field_updated(&self, context: &AiFormContext, field_id: &FieldId) {
        let _ = self
            .events
            .publish(EngineEvent::FieldUpdated {
                session_id: context.session_id,
                field_id: field_id.clone(),
                revision: context.revision,
            })
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_update_maps_to_its_error_code() {
        let err = ProcessError::StaleUpdate {
            field: FieldId::from("title"),
        };
        let domain = err.to_domain_error();
        assert_eq!(domain.code, ErrorCode::StaleUpdate);
        assert_eq!(domain.details.get("field"), Some(&"title".to_string()));
    }

    #[test]
    fn unknown_session_maps_to_not_found() {
        let err = ProcessError::Session(SessionGatewayError::Unknown(SessionId::new()));
        assert_eq!(err.to_domain_error().code, ErrorCode::SessionNotFound);
    }
}
