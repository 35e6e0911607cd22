//! Engine configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Tunables for the form engine and its safety layer.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Snapshots retained per session before FIFO eviction.
    #[serde(default = "default_snapshot_capacity")]
    pub snapshot_capacity: usize,

    /// Automatic snapshot every N applied updates; `None` disables
    /// interval snapshots (manual checkpoints still work).
    #[serde(default = "default_snapshot_interval")]
    pub snapshot_interval: Option<u64>,

    /// Budget for one validation pass before the engine degrades.
    #[serde(default = "default_validation_timeout_ms")]
    pub validation_timeout_ms: u64,

    /// Maximum number of next-field recommendations returned.
    #[serde(default = "default_recommendation_limit")]
    pub recommendation_limit: usize,

    /// Minimum mean snapshot confidence to qualify as a rollback target.
    #[serde(default = "default_rollback_confidence_floor")]
    pub rollback_confidence_floor: f64,

    /// Confidence below which an update is flagged for manual review.
    #[serde(default = "default_intervention_floor")]
    pub intervention_floor: f64,

    /// Expected confidence a healthy operation should sit near.
    #[serde(default = "default_confidence_baseline")]
    pub confidence_baseline: f64,
}

fn default_snapshot_capacity() -> usize {
    10
}

fn default_snapshot_interval() -> Option<u64> {
    Some(5)
}

fn default_validation_timeout_ms() -> u64 {
    2000
}

fn default_recommendation_limit() -> usize {
    3
}

fn default_rollback_confidence_floor() -> f64 {
    0.7
}

fn default_intervention_floor() -> f64 {
    0.5
}

fn default_confidence_baseline() -> f64 {
    0.8
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            snapshot_capacity: default_snapshot_capacity(),
            snapshot_interval: default_snapshot_interval(),
            validation_timeout_ms: default_validation_timeout_ms(),
            recommendation_limit: default_recommendation_limit(),
            rollback_confidence_floor: default_rollback_confidence_floor(),
            intervention_floor: default_intervention_floor(),
            confidence_baseline: default_confidence_baseline(),
        }
    }
}

impl EngineConfig {
    /// Validate the engine configuration.
    ///
    /// # Errors
    /// Returns `ValidationError` if any value is out of range.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.snapshot_capacity == 0 {
            return Err(ValidationError::InvalidSnapshotCapacity);
        }
        if self.snapshot_interval == Some(0) {
            return Err(ValidationError::InvalidSnapshotInterval);
        }
        if self.validation_timeout_ms == 0 {
            return Err(ValidationError::InvalidValidationTimeout);
        }
        if self.recommendation_limit == 0 {
            return Err(ValidationError::InvalidRecommendationLimit);
        }
        for (name, value) in [
            ("rollback_confidence_floor", self.rollback_confidence_floor),
            ("intervention_floor", self.intervention_floor),
            ("confidence_baseline", self.confidence_baseline),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ValidationError::ConfidenceOutOfRange(name));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let config = EngineConfig {
            snapshot_capacity: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidSnapshotCapacity)
        ));
    }

    #[test]
    fn zero_interval_is_rejected_but_none_is_fine() {
        let config = EngineConfig {
            snapshot_interval: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = EngineConfig {
            snapshot_interval: None,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn confidence_thresholds_must_be_in_unit_range() {
        let config = EngineConfig {
            intervention_floor: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::ConfidenceOutOfRange("intervention_floor"))
        ));
    }
}
