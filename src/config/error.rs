//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Snapshot capacity must be at least 1")]
    InvalidSnapshotCapacity,

    #[error("Snapshot interval must be at least 1 when set")]
    InvalidSnapshotInterval,

    #[error("Validation timeout must be greater than zero")]
    InvalidValidationTimeout,

    #[error("Recommendation limit must be at least 1")]
    InvalidRecommendationLimit,

    #[error("Confidence threshold {0} must be within 0.0..=1.0")]
    ConfidenceOutOfRange(&'static str),
}
