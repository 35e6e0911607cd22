//! The per-session form engine.
//!
//! Owns everything stateful about one session: the disclosure evaluator,
//! the snapshot store, the safety monitor, and the degradation switches.
//! Handlers drive it; it never touches the context store itself.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::domain::disclosure::{
    DisclosureContext, DisclosureEvaluator, FieldDisclosureState, FieldRecommendation,
    RecommendationGenerator, CANONICAL_FIELD_ORDER,
};
use crate::domain::form::AiFormContext;
use crate::domain::foundation::{Confidence, FieldId, FieldValue, SessionId, SnapshotId};
use crate::domain::safety::{
    OperationKind, SafetyAction, SafetyEvent, SafetyMetrics, SafetyMonitor, TriggerFiring,
    TriggerKind,
};
use crate::domain::snapshot::{
    AiStateSummary, FormStateSnapshot, ProgressiveStateSummary, SnapshotError, SnapshotInfo,
    SnapshotLookup, SnapshotStore,
};
use crate::ports::{EngineEvent, EventPublisher};

/// Errors raised by engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// What the safety layer did in response to one recorded outcome.
#[derive(Debug, Default)]
pub struct SafetyReport {
    /// Triggers that fired on this outcome.
    pub firings: Vec<TriggerFiring>,
    /// Snapshot restored by an automatic rollback, if one happened.
    pub restored: Option<FormStateSnapshot>,
    /// True when this outcome pushed the session into emergency mode.
    pub emergency_activated: bool,
}

impl SafetyReport {
    pub fn is_quiet(&self) -> bool {
        self.firings.is_empty()
    }
}

/// Heuristic confidence for a directly entered value.
///
/// User input is trusted more than inference, but sparse input still
/// reads as uncertain: a two-word description says less than a paragraph.
pub fn heuristic_confidence(value: &FieldValue) -> Confidence {
    match value {
        FieldValue::Empty => Confidence::new(0.2),
        FieldValue::Text(text) => {
            let len = text.trim().len() as f64;
            Confidence::new(0.4 + (len / 100.0).min(0.5))
        }
        FieldValue::Number(n) if *n > 0.0 => Confidence::new(0.9),
        FieldValue::Number(_) => Confidence::NEUTRAL,
        FieldValue::Flag(_) => Confidence::new(0.8),
    }
}

/// Stateful engine for one form-filling session.
pub struct FormEngine {
    session_id: SessionId,
    config: EngineConfig,
    evaluator: DisclosureEvaluator,
    snapshots: SnapshotStore,
    monitor: SafetyMonitor,
    events: Arc<dyn EventPublisher>,
    scorer: fn(&FieldValue) -> Confidence,
    ai_enabled: bool,
    progressive_enabled: bool,
    emergency: bool,
    updates_since_snapshot: u64,
}

impl FormEngine {
    pub fn new(
        session_id: SessionId,
        config: EngineConfig,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        let snapshots = SnapshotStore::with_capacity(
            session_id,
            config.snapshot_capacity,
            config.rollback_confidence_floor,
        );
        let monitor = SafetyMonitor::with_baseline(Confidence::new(config.confidence_baseline));
        Self {
            session_id,
            config,
            evaluator: DisclosureEvaluator::canonical(),
            snapshots,
            monitor,
            events,
            scorer: heuristic_confidence,
            ai_enabled: true,
            progressive_enabled: true,
            emergency: false,
            updates_since_snapshot: 0,
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn ai_enabled(&self) -> bool {
        self.ai_enabled && !self.emergency
    }

    pub fn progressive_enabled(&self) -> bool {
        self.progressive_enabled && !self.emergency
    }

    pub fn is_emergency(&self) -> bool {
        self.emergency
    }

    pub fn safety_metrics(&self) -> &SafetyMetrics {
        self.monitor.metrics()
    }

    pub fn safety_events(&self) -> &[SafetyEvent] {
        self.monitor.events()
    }

    /// Scores a field value with the engine's confidence heuristic.
    pub fn score_value(&self, value: &FieldValue) -> Confidence {
        (self.scorer)(value)
    }

    /// Evaluates disclosure for every canonical field plus any extra
    /// fields present in the form data.
    pub fn evaluate_disclosure(
        &self,
        ctx: &DisclosureContext,
    ) -> BTreeMap<FieldId, FieldDisclosureState> {
        let mut states = BTreeMap::new();
        for field in CANONICAL_FIELD_ORDER.iter() {
            states.insert(field.clone(), self.evaluator.evaluate_field(field, ctx));
        }
        for field in ctx.form_data.keys() {
            if !states.contains_key(field) {
                states.insert(field.clone(), self.evaluator.evaluate_field(field, ctx));
            }
        }
        states
    }

    /// Fields the current disclosure pass marks visible, in canonical
    /// order.
    pub fn visible_fields(
        &self,
        states: &BTreeMap<FieldId, FieldDisclosureState>,
    ) -> Vec<FieldId> {
        let mut fields: Vec<(&FieldId, &FieldDisclosureState)> =
            states.iter().filter(|(_, s)| s.is_visible).collect();
        fields.sort_by_key(|(_, s)| s.suggested_order);
        fields.into_iter().map(|(f, _)| f.clone()).collect()
    }

    /// Recommends the next fields to surface.
    pub fn recommend(&self, ctx: &DisclosureContext) -> Vec<FieldRecommendation> {
        RecommendationGenerator::new(&self.evaluator)
            .recommend_next_fields(ctx, self.config.recommendation_limit)
    }

    /// Creates a checkpoint of the current context, optionally labelled.
    pub async fn create_snapshot(
        &mut self,
        context: &AiFormContext,
        label: Option<&str>,
    ) -> Result<SnapshotId, EngineError> {
        let (ai_state, progressive_state) = summarize(context);
        let id = self.snapshots.create_snapshot(
            &context.disclosure.form_data,
            &ai_state,
            &progressive_state,
            label,
        )?;
        self.updates_since_snapshot = 0;
        self.publish(EngineEvent::SnapshotCreated {
            session_id: self.session_id,
            snapshot_id: id.clone(),
        })
        .await;
        Ok(id)
    }

    /// Counts one applied update and snapshots automatically when the
    /// configured interval is reached.
    pub async fn maybe_interval_snapshot(
        &mut self,
        context: &AiFormContext,
    ) -> Result<Option<SnapshotId>, EngineError> {
        let Some(interval) = self.config.snapshot_interval else {
            return Ok(None);
        };
        self.updates_since_snapshot += 1;
        if self.updates_since_snapshot < interval {
            return Ok(None);
        }
        let id = self.create_snapshot(context, None).await?;
        Ok(Some(id))
    }

    /// Rolls back to a specific snapshot. Corrupt snapshots count as
    /// integrity failures and feed the safety monitor.
    pub async fn rollback_to(&mut self, id: &SnapshotId) -> Option<FormStateSnapshot> {
        match self.snapshots.lookup(id) {
            SnapshotLookup::Restored(snapshot) => {
                self.publish(EngineEvent::RollbackPerformed {
                    session_id: self.session_id,
                    snapshot_id: id.clone(),
                })
                .await;
                Some(*snapshot)
            }
            SnapshotLookup::Corrupted => {
                warn!(session_id = %self.session_id, snapshot_id = %id, "corrupt snapshot");
                let firings = self.monitor.record_corruption();
                self.execute_actions(&firings).await;
                None
            }
            SnapshotLookup::NotFound => None,
        }
    }

    /// Rolls back to the best qualifying snapshot, if any.
    pub async fn rollback_to_last_good_state(&mut self) -> Option<FormStateSnapshot> {
        let snapshot = self.snapshots.rollback_to_last_good_state()?;
        self.publish(EngineEvent::RollbackPerformed {
            session_id: self.session_id,
            snapshot_id: snapshot.id.clone(),
        })
        .await;
        Some(snapshot)
    }

    /// Lists stored snapshots, oldest first.
    pub fn snapshots(&self) -> Vec<SnapshotInfo> {
        self.snapshots.snapshots()
    }

    /// Records one operation outcome and executes whatever the safety
    /// monitor demands.
    pub async fn record_outcome(
        &mut self,
        kind: OperationKind,
        success: bool,
        confidence: Confidence,
    ) -> SafetyReport {
        let firings = self.monitor.record_operation(kind, success, confidence);
        self.execute_actions(&firings).await
    }

    /// Records an invalid-state observation (always an emergency).
    pub async fn flag_invalid_state(&mut self) -> SafetyReport {
        let firings = self.monitor.flag_invalid_state();
        self.execute_actions(&firings).await
    }

    /// Re-arms the session after a recovery. Safety state and switches
    /// reset; stored snapshots are kept so history survives the reset.
    pub async fn reset(&mut self) {
        self.monitor.reset();
        self.ai_enabled = true;
        self.progressive_enabled = true;
        self.emergency = false;
        self.updates_since_snapshot = 0;
        self.publish(EngineEvent::SessionReset {
            session_id: self.session_id,
        })
        .await;
        info!(session_id = %self.session_id, "session reset");
    }

    async fn execute_actions(&mut self, firings: &[TriggerFiring]) -> SafetyReport {
        let mut report = SafetyReport {
            firings: firings.to_vec(),
            ..Default::default()
        };

        for firing in firings {
            self.publish(EngineEvent::SafetyTriggerFired {
                session_id: self.session_id,
                kind: firing.kind,
                action: firing.action,
            })
            .await;

            match firing.action {
                SafetyAction::DisableAi => {
                    self.ai_enabled = false;
                }
                SafetyAction::DisableProgressive => {
                    self.progressive_enabled = false;
                }
                SafetyAction::FullEmergency => {
                    self.enter_emergency(&mut report).await;
                }
                SafetyAction::Rollback => {
                    match self.snapshots.rollback_to_last_good_state() {
                        Some(snapshot) => {
                            self.publish(EngineEvent::RollbackPerformed {
                                session_id: self.session_id,
                                snapshot_id: snapshot.id.clone(),
                            })
                            .await;
                            report.restored = Some(snapshot);
                        }
                        None => {
                            // An integrity problem with nothing safe to
                            // restore leaves only one option.
                            if firing.kind == TriggerKind::DataIntegrity {
                                warn!(
                                    session_id = %self.session_id,
                                    "no rollback target after integrity failure"
                                );
                                self.enter_emergency(&mut report).await;
                            }
                        }
                    }
                }
            }
        }

        report
    }

    async fn enter_emergency(&mut self, report: &mut SafetyReport) {
        if self.emergency {
            return;
        }
        self.emergency = true;
        report.emergency_activated = true;
        warn!(session_id = %self.session_id, "emergency mode activated");
        self.publish(EngineEvent::EmergencyActivated {
            session_id: self.session_id,
        })
        .await;
    }

    async fn publish(&self, event: EngineEvent) {
        // Events are observational; a publish failure is logged, never
        // propagated.
        if let Err(e) = self.events.publish(event).await {
            warn!(session_id = %self.session_id, error = %e, "event publish failed");
        }
    }
}

/// Builds the snapshot summaries from a live context.
pub fn summarize(context: &AiFormContext) -> (AiStateSummary, ProgressiveStateSummary) {
    let ai_state = AiStateSummary {
        phase: context.disclosure.current_phase.clone(),
        completed_sections: context
            .disclosure
            .completed_fields
            .iter()
            .map(|f| f.as_str().to_string())
            .collect(),
        confidence_scores: context.disclosure.confidence_scores.clone(),
        inferred_data: BTreeMap::new(),
    };
    let progressive_state = ProgressiveStateSummary {
        context: context.disclosure.clone(),
        visible_fields: context.visible_fields.clone(),
        expertise: context.disclosure.expertise,
    };
    (ai_state, progressive_state)
}
