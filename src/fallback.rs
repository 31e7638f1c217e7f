//! Local GPA estimate used when the scoring service cannot answer.
//!
//! The coefficients are heuristic and have not been validated against real
//! outcomes; they are kept in [`FallbackModel`] so they can be tuned from a
//! config file.

use serde::{Deserialize, Serialize};

use crate::models::FeatureRecord;

pub const DEFAULT_AGE: f64 = 18.0;
pub const DEFAULT_STUDY_HOURS: f64 = 1.0;
pub const DEFAULT_WAEC_AVERAGE: f64 = 4.0;

pub const GPA_MIN: f64 = 0.0;
pub const GPA_MAX: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackModel {
    pub intercept: f64,
    /// Per study hour per day.
    pub study: f64,
    /// Applied to age in decades.
    pub age: f64,
    /// Applied to the inverted WAEC average.
    pub waec: f64,
}

impl Default for FallbackModel {
    fn default() -> Self {
        Self {
            intercept: 1.2,
            study: 0.30,
            age: 0.02,
            waec: 0.40,
        }
    }
}

fn or_default(value: f64, default: f64) -> f64 {
    if value == 0.0 || value.is_nan() {
        default
    } else {
        value
    }
}

/// Rounds half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl FallbackModel {
    pub fn predict(&self, features: &FeatureRecord) -> f64 {
        self.predict_raw(features.age, features.study_hours_per_day, features.waec_average)
    }

    /// Zero or NaN inputs are treated as missing and replaced by defaults.
    pub fn predict_raw(&self, age: f64, study: f64, waec_average: f64) -> f64 {
        let age = or_default(age, DEFAULT_AGE);
        let study = or_default(study, DEFAULT_STUDY_HOURS);
        let waec = or_default(waec_average, DEFAULT_WAEC_AVERAGE);

        // Lower WAEC codes are better grades, so invert the scale before weighting.
        let waec_strength = (6.0 - (waec - 1.0)) / 6.0 * 2.0;
        let gpa = self.intercept + self.study * study + self.age * (age / 10.0) + self.waec * waec_strength;

        if gpa.is_nan() {
            return GPA_MIN;
        }
        round2(gpa.clamp(GPA_MIN, GPA_MAX))
    }
}
