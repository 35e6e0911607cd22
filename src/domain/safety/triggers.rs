//! Static safety trigger table.
//!
//! Each trigger pairs a condition over the session metrics with the
//! action to take when it trips. The table is fixed at compile time;
//! tuning happens through the threshold constants, not by swapping
//! entries at runtime.

use serde::{Deserialize, Serialize};

use super::metrics::SafetyMetrics;

/// Failures in a row before the session is shut down entirely.
pub const MAX_CONSECUTIVE_FAILURES: u32 = 5;

/// Error-rate ceiling before AI assistance is cut off.
pub const ERROR_RATE_LIMIT: f64 = 0.3;

/// Error rate is noise over tiny samples; it is only judged once this
/// many operations have been recorded.
pub const ERROR_RATE_WARMUP: u32 = 4;

/// Floor on the running average confidence before rolling back.
pub const MIN_AVERAGE_CONFIDENCE: f64 = 0.4;

/// Ceiling on the distance between the latest confidence and baseline.
pub const MAX_CONFIDENCE_DRIFT: f64 = 0.5;

/// Identifies which condition tripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    ConsecutiveFailures,
    HighErrorRate,
    LowAverageConfidence,
    DataIntegrity,
    ConfidenceDrift,
    InvalidState,
}

/// What the engine does when a trigger trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyAction {
    /// Restore the best checksum-valid snapshot.
    Rollback,
    /// Keep the form usable but stop consulting the AI.
    DisableAi,
    /// Show all fields; stop progressive reveal decisions.
    DisableProgressive,
    /// Freeze everything except raw field persistence.
    FullEmergency,
}

/// Inputs a trigger condition is judged against.
#[derive(Debug, Clone, Copy)]
pub struct TriggerInput<'a> {
    pub metrics: &'a SafetyMetrics,
    /// Running mean of per-operation confidence; `None` before the
    /// first operation.
    pub average_confidence: Option<f64>,
    /// Set when the engine observed structurally invalid state.
    pub invalid_state: bool,
}

/// One row of the trigger table.
pub struct SafetyTrigger {
    pub kind: TriggerKind,
    pub action: SafetyAction,
    pub condition: fn(&TriggerInput<'_>) -> bool,
}

/// The full trigger table, checked in order after every operation.
pub static TRIGGERS: &[SafetyTrigger] = &[
    SafetyTrigger {
        kind: TriggerKind::ConsecutiveFailures,
        action: SafetyAction::FullEmergency,
        condition: |input| input.metrics.consecutive_failures > MAX_CONSECUTIVE_FAILURES,
    },
    SafetyTrigger {
        kind: TriggerKind::HighErrorRate,
        action: SafetyAction::DisableAi,
        condition: |input| {
            input.metrics.total_operations >= ERROR_RATE_WARMUP
                && input.metrics.error_rate() > ERROR_RATE_LIMIT
        },
    },
    SafetyTrigger {
        kind: TriggerKind::LowAverageConfidence,
        action: SafetyAction::Rollback,
        condition: |input| {
            input
                .average_confidence
                .map(|avg| avg < MIN_AVERAGE_CONFIDENCE)
                .unwrap_or(false)
        },
    },
    SafetyTrigger {
        kind: TriggerKind::DataIntegrity,
        action: SafetyAction::Rollback,
        condition: |input| input.metrics.data_corruption_count > 0,
    },
    SafetyTrigger {
        kind: TriggerKind::ConfidenceDrift,
        action: SafetyAction::DisableProgressive,
        condition: |input| input.metrics.confidence_drift > MAX_CONFIDENCE_DRIFT,
    },
    SafetyTrigger {
        kind: TriggerKind::InvalidState,
        action: SafetyAction::FullEmergency,
        condition: |input| input.invalid_state,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    fn input(metrics: &SafetyMetrics) -> TriggerInput<'_> {
        TriggerInput {
            metrics,
            average_confidence: Some(0.8),
            invalid_state: false,
        }
    }

    fn trigger(kind: TriggerKind) -> &'static SafetyTrigger {
        TRIGGERS
            .iter()
            .find(|t| t.kind == kind)
            .unwrap_or_else(|| panic!("missing trigger {:?}", kind))
    }

    #[test]
    fn consecutive_failures_trips_strictly_above_the_limit() {
        let mut metrics = SafetyMetrics::default();
        metrics.consecutive_failures = MAX_CONSECUTIVE_FAILURES;
        let t = trigger(TriggerKind::ConsecutiveFailures);
        assert!(!(t.condition)(&input(&metrics)));

        metrics.consecutive_failures = MAX_CONSECUTIVE_FAILURES + 1;
        assert!((t.condition)(&input(&metrics)));
        assert_eq!(t.action, SafetyAction::FullEmergency);
    }

    #[test]
    fn error_rate_ignored_during_warmup() {
        let mut metrics = SafetyMetrics::default();
        metrics.total_operations = 2;
        metrics.error_count = 2;
        let t = trigger(TriggerKind::HighErrorRate);
        assert!(!(t.condition)(&input(&metrics)));

        metrics.total_operations = 4;
        assert!((t.condition)(&input(&metrics)));
    }

    #[test]
    fn low_average_confidence_needs_observations() {
        let metrics = SafetyMetrics::default();
        let t = trigger(TriggerKind::LowAverageConfidence);
        let mut i = input(&metrics);
        i.average_confidence = None;
        assert!(!(t.condition)(&i));

        i.average_confidence = Some(0.39);
        assert!((t.condition)(&i));
        assert_eq!(t.action, SafetyAction::Rollback);
    }

    #[test]
    fn any_corruption_demands_a_rollback() {
        let mut metrics = SafetyMetrics::default();
        metrics.data_corruption_count = 1;
        let t = trigger(TriggerKind::DataIntegrity);
        assert!((t.condition)(&input(&metrics)));
        assert_eq!(t.action, SafetyAction::Rollback);
    }

    #[test]
    fn drift_disables_progressive_disclosure() {
        let mut metrics = SafetyMetrics::default();
        metrics.confidence_drift = 0.51;
        let t = trigger(TriggerKind::ConfidenceDrift);
        assert!((t.condition)(&input(&metrics)));
        assert_eq!(t.action, SafetyAction::DisableProgressive);
    }

    #[test]
    fn invalid_state_is_a_full_emergency() {
        let metrics = SafetyMetrics::default();
        let mut i = input(&metrics);
        i.invalid_state = true;
        let t = trigger(TriggerKind::InvalidState);
        assert!((t.condition)(&i));
        assert_eq!(t.action, SafetyAction::FullEmergency);
    }
}
