//! Confidence value object (0.0 to 1.0 scale).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Threshold below which a field's confidence is considered low enough
/// to highlight for the user.
const LOW_CONFIDENCE_THRESHOLD: f64 = 0.6;

/// A trustworthiness estimate between 0.0 and 1.0 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Confidence(f64);

impl Confidence {
    /// No confidence at all.
    pub const ZERO: Self = Self(0.0);

    /// Full confidence.
    pub const FULL: Self = Self(1.0);

    /// The neutral confidence assigned when no better signal exists.
    pub const NEUTRAL: Self = Self(0.5);

    /// The default baseline for AI-assisted operations; drift is measured
    /// against the configured baseline, which defaults to this value.
    pub const BASELINE: Self = Self(0.8);

    /// Creates a new Confidence, clamping to the valid range.
    pub fn new(value: f64) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    /// Creates a Confidence, returning an error if out of range or not finite.
    pub fn try_new(value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(ValidationError::out_of_range("confidence", 0.0, 1.0, value));
        }
        Ok(Self(value))
    }

    /// Returns the inner value.
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Returns true if this confidence is low enough to highlight a field.
    pub fn is_low(&self) -> bool {
        self.0 < LOW_CONFIDENCE_THRESHOLD
    }

    /// Absolute drift from the given baseline.
    pub fn drift_from(&self, baseline: Confidence) -> f64 {
        (self.0 - baseline.0).abs()
    }

    /// Arithmetic mean of a set of confidences.
    ///
    /// Returns `None` for an empty set; callers decide what an absent
    /// average means (the disclosure evaluator treats it as full confidence,
    /// the rollback scan treats it as disqualifying).
    pub fn mean<'a, I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Confidence>,
    {
        let mut sum = 0.0;
        let mut count = 0u32;
        for c in values {
            sum += c.0;
            count += 1;
        }
        if count == 0 {
            None
        } else {
            Some(Self::new(sum / f64::from(count)))
        }
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_new_clamps_out_of_range_values() {
        assert_eq!(Confidence::new(1.5).value(), 1.0);
        assert_eq!(Confidence::new(-0.3).value(), 0.0);
        assert_eq!(Confidence::new(0.42).value(), 0.42);
    }

    #[test]
    fn confidence_try_new_accepts_valid_values() {
        assert!(Confidence::try_new(0.0).is_ok());
        assert!(Confidence::try_new(0.7).is_ok());
        assert!(Confidence::try_new(1.0).is_ok());
    }

    #[test]
    fn confidence_try_new_rejects_invalid_values() {
        assert!(Confidence::try_new(1.01).is_err());
        assert!(Confidence::try_new(-0.01).is_err());
        assert!(Confidence::try_new(f64::NAN).is_err());
    }

    #[test]
    fn confidence_is_low_below_threshold() {
        assert!(Confidence::new(0.59).is_low());
        assert!(!Confidence::new(0.6).is_low());
        assert!(!Confidence::new(0.9).is_low());
    }

    #[test]
    fn confidence_drift_is_absolute_distance_from_baseline() {
        assert!((Confidence::new(0.1).drift_from(Confidence::BASELINE) - 0.7).abs() < f64::EPSILON);
        assert!((Confidence::new(0.9).drift_from(Confidence::BASELINE) - 0.1).abs() < 1e-9);
        assert!(Confidence::new(0.2).drift_from(Confidence::new(0.2)).abs() < 1e-9);
    }

    #[test]
    fn confidence_mean_of_empty_set_is_none() {
        assert_eq!(Confidence::mean([].iter()), None);
    }

    #[test]
    fn confidence_mean_averages_values() {
        let values = [Confidence::new(0.9), Confidence::new(0.85)];
        let mean = Confidence::mean(values.iter()).unwrap();
        assert!((mean.value() - 0.875).abs() < 1e-9);
    }

    #[test]
    fn confidence_serializes_transparently() {
        let json = serde_json::to_string(&Confidence::new(0.25)).unwrap();
        assert_eq!(json, "0.25");
    }

    #[test]
    fn confidence_default_is_neutral() {
        assert_eq!(Confidence::default(), Confidence::NEUTRAL);
    }
}
