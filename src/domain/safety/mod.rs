//! Safety monitoring - metrics, trigger table, and the monitor itself.

mod metrics;
mod monitor;
mod triggers;

pub use metrics::SafetyMetrics;
pub use monitor::{OperationKind, SafetyEvent, SafetyMonitor, TriggerFiring};
pub use triggers::{
    SafetyAction, SafetyTrigger, TriggerInput, TriggerKind, ERROR_RATE_LIMIT, ERROR_RATE_WARMUP,
    MAX_CONFIDENCE_DRIFT, MAX_CONSECUTIVE_FAILURES, MIN_AVERAGE_CONFIDENCE, TRIGGERS,
};
