//! Operational health metrics for one session.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Confidence, Timestamp};

/// Counters the safety monitor accumulates across operations.
///
/// `confidence_drift` tracks how far the most recent operation's
/// confidence sits from the expected baseline; it is a last-value gauge,
/// not an average, so one wild result surfaces immediately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyMetrics {
    pub error_count: u32,
    pub total_operations: u32,
    pub consecutive_failures: u32,
    pub last_successful_operation: Option<Timestamp>,
    pub confidence_drift: f64,
    pub data_corruption_count: u32,
}

impl Default for SafetyMetrics {
    fn default() -> Self {
        Self {
            error_count: 0,
            total_operations: 0,
            consecutive_failures: 0,
            last_successful_operation: None,
            confidence_drift: 0.0,
            data_corruption_count: 0,
        }
    }
}

impl SafetyMetrics {
    /// Fraction of operations that failed; 0.0 before any operation.
    pub fn error_rate(&self) -> f64 {
        if self.total_operations == 0 {
            return 0.0;
        }
        f64::from(self.error_count) / f64::from(self.total_operations)
    }

    /// Folds one operation outcome into the counters, measuring drift
    /// against the caller's baseline.
    pub fn record(&mut self, success: bool, confidence: Confidence, baseline: Confidence) {
        self.total_operations += 1;
        self.confidence_drift = confidence.drift_from(baseline);
        if success {
            self.consecutive_failures = 0;
            self.last_successful_operation = Some(Timestamp::now());
        } else {
            self.error_count += 1;
            self.consecutive_failures += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_rate_is_zero_before_any_operation() {
        assert_eq!(SafetyMetrics::default().error_rate(), 0.0);
    }

    #[test]
    fn success_resets_consecutive_failures_only() {
        let mut metrics = SafetyMetrics::default();
        metrics.record(false, Confidence::new(0.5), Confidence::BASELINE);
        metrics.record(false, Confidence::new(0.5), Confidence::BASELINE);
        metrics.record(true, Confidence::new(0.8), Confidence::BASELINE);

        assert_eq!(metrics.consecutive_failures, 0);
        assert_eq!(metrics.error_count, 2);
        assert_eq!(metrics.total_operations, 3);
        assert!(metrics.last_successful_operation.is_some());
    }

    #[test]
    fn failures_accumulate_both_counters() {
        let mut metrics = SafetyMetrics::default();
        for _ in 0..4 {
            metrics.record(false, Confidence::new(0.3), Confidence::BASELINE);
        }
        assert_eq!(metrics.consecutive_failures, 4);
        assert_eq!(metrics.error_count, 4);
        assert_eq!(metrics.error_rate(), 1.0);
    }

    #[test]
    fn drift_tracks_the_latest_confidence() {
        let mut metrics = SafetyMetrics::default();
        metrics.record(true, Confidence::new(0.2), Confidence::BASELINE);
        assert!((metrics.confidence_drift - 0.6).abs() < 1e-9);
        metrics.record(true, Confidence::new(0.8), Confidence::BASELINE);
        assert!(metrics.confidence_drift.abs() < 1e-9);
    }

    #[test]
    fn drift_uses_the_supplied_baseline() {
        let mut metrics = SafetyMetrics::default();
        metrics.record(true, Confidence::new(0.2), Confidence::new(0.2));
        assert!(metrics.confidence_drift.abs() < 1e-9);
    }
}
