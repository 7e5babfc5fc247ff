use serde::{Deserialize, Serialize};
use std::fmt;

/// Bounded interval around a probability-like point estimate.
/// Invariant: `0 <= lower <= point <= upper <= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UncertaintyBounds {
    pub point: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Qualitative label for a point estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLabel {
    High,
    Moderate,
    Low,
    VeryLow,
}

impl fmt::Display for ConfidenceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfidenceLabel::High => write!(f, "high"),
            ConfidenceLabel::Moderate => write!(f, "moderate"),
            ConfidenceLabel::Low => write!(f, "low"),
            ConfidenceLabel::VeryLow => write!(f, "very_low"),
        }
    }
}

impl UncertaintyBounds {
    /// Approximate 95% interval around `point`, tightened as supporting
    /// evidence grows. Half-width is `0.35 / sqrt(evidence_count + 1)`,
    /// clamped to [0.02, 0.35]; bounds are clamped to [0, 1].
    pub fn around(point: f64, evidence_count: usize) -> Self {
        let point = point.clamp(0.0, 1.0);
        let half_width = (0.35 / ((evidence_count as f64) + 1.0).sqrt()).clamp(0.02, 0.35);
        UncertaintyBounds {
            point,
            lower: (point - half_width).max(0.0),
            upper: (point + half_width).min(1.0),
        }
    }

    pub fn label(&self) -> ConfidenceLabel {
        if self.point >= 0.8 {
            ConfidenceLabel::High
        } else if self.point >= 0.6 {
            ConfidenceLabel::Moderate
        } else if self.point >= 0.4 {
            ConfidenceLabel::Low
        } else {
            ConfidenceLabel::VeryLow
        }
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}
