//! Safety monitor for one session.
//!
//! The monitor watches metrics and decides WHICH protective actions are
//! warranted; it never executes them. The engine owns the snapshot store
//! and the AI/disclosure switches, so it carries out the actions the
//! monitor reports.
//!
//! Triggers are edge-triggered: once a trigger fires it is latched and
//! will not fire again until the monitor is reset. Without latching a
//! stuck-bad metric would demand the same rollback after every
//! subsequent keystroke.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::foundation::{Confidence, Timestamp};

use super::metrics::SafetyMetrics;
use super::triggers::{SafetyAction, TriggerInput, TriggerKind, TRIGGERS};

/// What kind of operation produced a recorded outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    FieldUpdate,
    Validation,
    ConflictResolution,
    SnapshotRestore,
}

/// A trigger that tripped during the latest check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerFiring {
    pub kind: TriggerKind,
    pub action: SafetyAction,
}

/// Audit record of a firing, kept for the session's lifetime.
///
/// `operation` names the operation whose outcome tripped the trigger;
/// it is absent for firings raised outside an operation (corruption
/// reports, invalid-state flags).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyEvent {
    pub kind: TriggerKind,
    pub action: SafetyAction,
    pub operation: Option<OperationKind>,
    pub occurred_at: Timestamp,
    pub metrics: SafetyMetrics,
}

/// Accumulates operation outcomes and evaluates the trigger table.
#[derive(Debug)]
pub struct SafetyMonitor {
    metrics: SafetyMetrics,
    baseline: Confidence,
    confidence_sum: f64,
    confidence_count: u32,
    invalid_state: bool,
    fired: HashSet<TriggerKind>,
    events: Vec<SafetyEvent>,
}

impl Default for SafetyMonitor {
    fn default() -> Self {
        Self::with_baseline(Confidence::BASELINE)
    }
}

impl SafetyMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a monitor that measures confidence drift against the
    /// given baseline instead of the default.
    pub fn with_baseline(baseline: Confidence) -> Self {
        Self {
            metrics: SafetyMetrics::default(),
            baseline,
            confidence_sum: 0.0,
            confidence_count: 0,
            invalid_state: false,
            fired: HashSet::new(),
            events: Vec::new(),
        }
    }

    /// Folds in one operation outcome and returns any newly tripped
    /// triggers.
    pub fn record_operation(
        &mut self,
        kind: OperationKind,
        success: bool,
        confidence: Confidence,
    ) -> Vec<TriggerFiring> {
        self.metrics.record(success, confidence, self.baseline);
        self.confidence_sum += confidence.value();
        self.confidence_count += 1;
        self.evaluate(Some(kind))
    }

    /// Notes a checksum failure on stored state.
    pub fn record_corruption(&mut self) -> Vec<TriggerFiring> {
        self.metrics.data_corruption_count += 1;
        self.evaluate(None)
    }

    /// Notes that the engine observed structurally invalid state.
    pub fn flag_invalid_state(&mut self) -> Vec<TriggerFiring> {
        self.invalid_state = true;
        self.evaluate(None)
    }

    /// Running mean of per-operation confidence.
    pub fn average_confidence(&self) -> Option<f64> {
        if self.confidence_count == 0 {
            return None;
        }
        Some(self.confidence_sum / f64::from(self.confidence_count))
    }

    pub fn metrics(&self) -> &SafetyMetrics {
        &self.metrics
    }

    /// Firings recorded since the last reset, oldest first.
    pub fn events(&self) -> &[SafetyEvent] {
        &self.events
    }

    /// Whether the given trigger is currently latched.
    pub fn has_fired(&self, kind: TriggerKind) -> bool {
        self.fired.contains(&kind)
    }

    /// Clears metrics, latches, and the audit trail. Used after a
    /// successful recovery so the session starts from a clean slate.
    /// The drift baseline survives the reset.
    pub fn reset(&mut self) {
        self.metrics = SafetyMetrics::default();
        self.confidence_sum = 0.0;
        self.confidence_count = 0;
        self.invalid_state = false;
        self.fired.clear();
        self.events.clear();
    }

    fn evaluate(&mut self, operation: Option<OperationKind>) -> Vec<TriggerFiring> {
        let input = TriggerInput {
            metrics: &self.metrics,
            average_confidence: self.average_confidence(),
            invalid_state: self.invalid_state,
        };

        let mut firings = Vec::new();
        for trigger in TRIGGERS {
            if self.fired.contains(&trigger.kind) || !(trigger.condition)(&input) {
                continue;
            }
            firings.push(TriggerFiring {
                kind: trigger.kind,
                action: trigger.action,
            });
        }

        for firing in &firings {
            self.fired.insert(firing.kind);
            warn!(
                kind = ?firing.kind,
                action = ?firing.action,
                error_rate = self.metrics.error_rate(),
                consecutive_failures = self.metrics.consecutive_failures,
                "safety trigger fired"
            );
            self.events.push(SafetyEvent {
                kind: firing.kind,
                action: firing.action,
                operation,
                occurred_at: Timestamp::now(),
                metrics: self.metrics.clone(),
            });
        }

        firings
    }
}
