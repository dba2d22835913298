use serde::{Deserialize, Serialize};
use std::fmt;

/// Confidence score clamped to [0.0, 1.0].
/// Represents how strongly the evidence supports a pattern.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Confidence(f64);

impl Confidence {
    /// Create a new Confidence, clamping to [0.0, 1.0]. NaN becomes 0.0.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self(0.0);
        }
        Self(value.clamp(0.0, 1.0))
    }

    /// Calibrate from an evidence count: `evidence / (evidence + prior_weight)`.
    ///
    /// Non-decreasing in `evidence`, so more evidence never lowers confidence.
    pub fn from_evidence(evidence: u64, prior_weight: f64) -> Self {
        let e = evidence as f64;
        let prior = if prior_weight > 0.0 { prior_weight } else { 1.0 };
        Self::new(e / (e + prior))
    }

    /// Get the raw f64 value.
    pub fn value(self) -> f64 {
        self.0
    }

    /// The larger of two confidences.
    pub fn max(self, other: Self) -> Self {
        if other.0 > self.0 {
            other
        } else {
            self
        }
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Self(0.0)
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

impl From<f64> for Confidence {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Confidence> for f64 {
    fn from(c: Confidence) -> Self {
        c.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_out_of_range() {
        assert_eq!(Confidence::new(1.7).value(), 1.0);
        assert_eq!(Confidence::new(-0.2).value(), 0.0);
        assert_eq!(Confidence::new(f64::NAN).value(), 0.0);
    }

    #[test]
    fn calibration_examples() {
        assert!((Confidence::from_evidence(1, 1.0).value() - 0.5).abs() < 1e-12);
        assert!((Confidence::from_evidence(3, 1.0).value() - 0.75).abs() < 1e-12);
        assert_eq!(Confidence::from_evidence(0, 1.0).value(), 0.0);
    }
}
