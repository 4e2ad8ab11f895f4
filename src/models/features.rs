//! Feature vector for the regression model.
//!
//! The order of `MlFeatures::to_array` is the order the model coefficients were
//! trained in. Every feature is clamped to the range seen in training.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Measurements, SubjectProfile};
use crate::math::round_to;

pub const FEATURE_COUNT: usize = 9;

pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "age",
    "bmi",
    "sex",
    "shoulder_width",
    "hip_width",
    "height_ratio",
    "waist_ratio",
    "volume_indicator",
    "waist_prominence",
];

const AGE_RANGE: (f64, f64) = (16.0, 100.0);
const BMI_RANGE: (f64, f64) = (12.0, 50.0);
const SHOULDER_RANGE: (f64, f64) = (0.30, 0.55);
const HIP_RANGE: (f64, f64) = (0.25, 0.50);
const WAIST_RATIO_RANGE: (f64, f64) = (0.35, 0.85);
const VOLUME_RANGE: (f64, f64) = (0.08, 0.35);
const PROMINENCE_RANGE: (f64, f64) = (-0.02, 0.10);

const DEFAULT_HEIGHT_RATIO: f64 = 0.90;
const DEFAULT_WAIST_RATIO: f64 = 0.60;
const DEFAULT_VOLUME: f64 = 0.15;
const DEFAULT_PROMINENCE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MlFeatures {
    pub age: f64,
    pub bmi: f64,
    /// 1 = male, 0 = female.
    pub sex: f64,
    pub shoulder_width: f64,
    pub hip_width: f64,
    pub height_ratio: f64,
    pub waist_ratio: f64,
    pub volume_indicator: f64,
    pub waist_prominence: f64,
}

fn clamp_logged(name: &str, value: f64, (lo, hi): (f64, f64)) -> f64 {
    if !(lo..=hi).contains(&value) {
        debug!(feature = name, value, lo, hi, "feature outside training range, clamping");
    }
    value.clamp(lo, hi)
}

impl MlFeatures {
    pub fn build(profile: &SubjectProfile, m: &Measurements) -> Self {
        Self {
            age: clamp_logged("age", f64::from(profile.age), AGE_RANGE),
            bmi: round_to(clamp_logged("bmi", profile.bmi(), BMI_RANGE), 2),
            sex: profile.sex.encoded(),
            shoulder_width: round_to(
                clamp_logged("shoulder_width", m.shoulder_width, SHOULDER_RANGE),
                4,
            ),
            hip_width: round_to(clamp_logged("hip_width", m.hip_width, HIP_RANGE), 4),
            height_ratio: round_to(m.height_ratio.unwrap_or(DEFAULT_HEIGHT_RATIO), 4),
            waist_ratio: round_to(
                clamp_logged(
                    "waist_ratio",
                    m.waist_ratio.unwrap_or(DEFAULT_WAIST_RATIO),
                    WAIST_RATIO_RANGE,
                ),
                4,
            ),
            volume_indicator: round_to(
                clamp_logged(
                    "volume_indicator",
                    m.volume_indicator.unwrap_or(DEFAULT_VOLUME),
                    VOLUME_RANGE,
                ),
                4,
            ),
            waist_prominence: round_to(
                clamp_logged(
                    "waist_prominence",
                    m.waist_prominence.unwrap_or(DEFAULT_PROMINENCE),
                    PROMINENCE_RANGE,
                ),
                4,
            ),
        }
    }

    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.age,
            self.bmi,
            self.sex,
            self.shoulder_width,
            self.hip_width,
            self.height_ratio,
            self.waist_ratio,
            self.volume_indicator,
            self.waist_prominence,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Sex;

    fn profile(sex: Sex) -> SubjectProfile {
        SubjectProfile {
            age: 30,
            weight_kg: 80.0,
            height_cm: 180.0,
            sex,
        }
    }

    #[test]
    fn missing_optionals_use_defaults() {
        let f = MlFeatures::build(&profile(Sex::Male), &Measurements::new(0.42, 0.32, 0.25, 0.5));
        assert_eq!(f.sex, 1.0);
        assert_eq!(f.height_ratio, DEFAULT_HEIGHT_RATIO);
        assert_eq!(f.waist_ratio, DEFAULT_WAIST_RATIO);
        assert_eq!(f.volume_indicator, DEFAULT_VOLUME);
        assert_eq!(f.waist_prominence, DEFAULT_PROMINENCE);
        assert_eq!(f.bmi, 24.69);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let m = Measurements {
            volume_indicator: Some(0.5),
            waist_prominence: Some(-0.1),
            ..Measurements::new(0.20, 0.60, 0.25, 0.5)
        };
        let f = MlFeatures::build(&profile(Sex::Female), &m);
        assert_eq!(f.sex, 0.0);
        assert_eq!(f.shoulder_width, 0.30);
        assert_eq!(f.hip_width, 0.50);
        assert_eq!(f.volume_indicator, 0.35);
        assert_eq!(f.waist_prominence, -0.02);
    }

    #[test]
    fn array_order_matches_names() {
        let f = MlFeatures::build(&profile(Sex::Male), &Measurements::new(0.42, 0.32, 0.25, 0.5));
        let arr = f.to_array();
        assert_eq!(arr.len(), FEATURE_NAMES.len());
        assert_eq!(arr[0], 30.0);
        assert_eq!(arr[3], 0.42);
        assert_eq!(arr[8], DEFAULT_PROMINENCE);
    }
}
