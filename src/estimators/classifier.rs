//! Body-type classifier.
//!
//! Decision table (sex-conditioned):
//!
//! | rule                         | male                       | female                     |
//! |------------------------------|----------------------------|----------------------------|
//! | BMI override -> overweight   | BMI >= 28                  | BMI >= 28                  |
//! | muscular                     | w/s < 0.40 and h/s < 0.85  | w/s < 0.45 and h/s < 0.90  |
//! | overweight                   | w/s > 0.60                 | w/s > 0.60                 |
//! | lean                         | otherwise                  | otherwise                  |
//!
//! The BMI override is checked first so a high BMI wins regardless of ratios.

use crate::domain::{BodyType, Ratios, Sex};

/// BMI at or above which the subject is bucketed as overweight.
pub const OVERWEIGHT_BMI: f64 = 28.0;

/// Waist/shoulder ratio above which the subject is bucketed as overweight.
const OVERWEIGHT_WAIST_RATIO: f64 = 0.60;

/// `(max waist/shoulder, max hip/shoulder)` for a muscular build.
fn muscular_limits(sex: Sex) -> (f64, f64) {
    match sex {
        Sex::Male => (0.40, 0.85),
        Sex::Female => (0.45, 0.90),
    }
}

/// Bucket a subject into a coarse somatotype.
pub fn classify_body_type(ratios: &Ratios, sex: Sex, bmi: Option<f64>) -> BodyType {
    if bmi.is_some_and(|b| b >= OVERWEIGHT_BMI) {
        return BodyType::Overweight;
    }

    let (max_waist, max_hip) = muscular_limits(sex);
    if ratios.waist_to_shoulder < max_waist && ratios.hip_to_shoulder < max_hip {
        BodyType::Muscular
    } else if ratios.waist_to_shoulder > OVERWEIGHT_WAIST_RATIO {
        BodyType::Overweight
    } else {
        BodyType::Lean
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratios(w: f64, h: f64) -> Ratios {
        Ratios {
            waist_to_shoulder: w,
            hip_to_shoulder: h,
            torso_to_shoulder: 1.2,
        }
    }

    #[test]
    fn male_thresholds() {
        assert_eq!(classify_body_type(&ratios(0.38, 0.80), Sex::Male, Some(23.0)), BodyType::Muscular);
        assert_eq!(classify_body_type(&ratios(0.55, 0.80), Sex::Male, Some(23.0)), BodyType::Lean);
        assert_eq!(classify_body_type(&ratios(0.62, 0.80), Sex::Male, None), BodyType::Overweight);
    }

    #[test]
    fn female_muscular_threshold_is_wider() {
        let r = ratios(0.43, 0.88);
        assert_eq!(classify_body_type(&r, Sex::Female, Some(22.0)), BodyType::Muscular);
        assert_eq!(classify_body_type(&r, Sex::Male, Some(22.0)), BodyType::Lean);
    }

    #[test]
    fn high_bmi_overrides_ratios() {
        let r = ratios(0.38, 0.80);
        assert_eq!(classify_body_type(&r, Sex::Male, Some(28.0)), BodyType::Overweight);
        assert_eq!(classify_body_type(&r, Sex::Male, Some(27.9)), BodyType::Muscular);
    }
}
