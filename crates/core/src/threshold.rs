//! SDQA thresholds and pass/fail evaluation.
//!
//! A [`Threshold`] is one record of the `sdqa_threshold` table: the upper
//! and lower bounds a metric's value must stay within, and when the bounds
//! were set. A metric may have several thresholds over time; the most
//! recently created one is in force.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Evaluation result
// ---------------------------------------------------------------------------

/// Outcome of checking a value against a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdStatus {
    Pass,
    BelowLower,
    AboveUpper,
}

impl ThresholdStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::BelowLower => "below_lower",
            Self::AboveUpper => "above_upper",
        }
    }

    pub fn is_pass(self) -> bool {
        self == Self::Pass
    }
}

// ---------------------------------------------------------------------------
// Threshold
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    id: DbId,
    metric_id: DbId,
    upper_threshold: f64,
    lower_threshold: f64,
    created_date: Timestamp,
}

impl Threshold {
    pub fn new(
        id: DbId,
        metric_id: DbId,
        upper_threshold: f64,
        lower_threshold: f64,
        created_date: Timestamp,
    ) -> Self {
        Self {
            id,
            metric_id,
            upper_threshold,
            lower_threshold,
            created_date,
        }
    }

    /// Overwrite every field at once.
    pub fn set(
        &mut self,
        id: DbId,
        metric_id: DbId,
        upper_threshold: f64,
        lower_threshold: f64,
        created_date: Timestamp,
    ) {
        *self = Self::new(id, metric_id, upper_threshold, lower_threshold, created_date);
    }

    pub fn id(&self) -> DbId {
        self.id
    }

    pub fn metric_id(&self) -> DbId {
        self.metric_id
    }

    pub fn upper_threshold(&self) -> f64 {
        self.upper_threshold
    }

    pub fn lower_threshold(&self) -> f64 {
        self.lower_threshold
    }

    pub fn created_date(&self) -> Timestamp {
        self.created_date
    }

    /// Check `value` against the bounds. Both bounds are inclusive.
    ///
    /// A NaN value passes neither comparison and is reported as
    /// `BelowLower`.
    pub fn evaluate(&self, value: f64) -> ThresholdStatus {
        if value > self.upper_threshold {
            ThresholdStatus::AboveUpper
        } else if value >= self.lower_threshold {
            ThresholdStatus::Pass
        } else {
            ThresholdStatus::BelowLower
        }
    }
}

/// Validate a bound pair before it is stored.
///
/// Both bounds must be finite and `lower <= upper`.
pub fn validate_bounds(lower: f64, upper: f64) -> Result<(), CoreError> {
    if !lower.is_finite() || !upper.is_finite() {
        return Err(CoreError::Validation(format!(
            "threshold bounds must be finite, got lower={lower} upper={upper}"
        )));
    }
    if lower > upper {
        return Err(CoreError::Validation(format!(
            "lower_threshold ({lower}) must be <= upper_threshold ({upper})"
        )));
    }
    Ok(())
}
