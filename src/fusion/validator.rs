//! Physiological validator.
//!
//! Four override rules, evaluated in order against the *original* candidate.
//! Each one that fires replaces the running value with a sex-specific linear
//! anchor, so when several fire the last one wins. The result is clamped to
//! the sex bounds and rounded to one decimal.

use tracing::info;

use crate::domain::{Measurements, Ratios, Sex, ValidationOutcome, ValidationRule};
use crate::math::{LinearAnchor, round_to};

const DEFAULT_VOLUME: f64 = 0.15;

/// Everything a validation rule looks at.
#[derive(Debug, Clone, Copy)]
struct Context {
    estimate: f64,
    bmi: f64,
    sex: Sex,
    waist_to_shoulder: f64,
    volume: f64,
}

impl ValidationRule {
    pub const ORDER: [ValidationRule; 4] = [
        ValidationRule::LowBmi,
        ValidationRule::AthleticBuild,
        ValidationRule::HighBmi,
        ValidationRule::WideWaist,
    ];

    fn triggers(self, ctx: &Context) -> bool {
        match self {
            ValidationRule::LowBmi => ctx.bmi < 22.0 && ctx.estimate > 20.0,
            ValidationRule::AthleticBuild => {
                ctx.waist_to_shoulder < 0.50
                    && ctx.volume > 0.20
                    && (20.0..=26.0).contains(&ctx.bmi)
                    && ctx.estimate > 18.0
            }
            ValidationRule::HighBmi => ctx.bmi > 28.0 && ctx.estimate < 20.0,
            ValidationRule::WideWaist => ctx.waist_to_shoulder > 0.70 && ctx.estimate < 22.0,
        }
    }

    /// Linear anchor the replacement value is read from, and its input.
    fn replacement(self, ctx: &Context) -> f64 {
        let female = ctx.sex == Sex::Female;
        let pick = |male: f64, female_base: f64| if female { female_base } else { male };
        match self {
            ValidationRule::LowBmi => LinearAnchor::new(pick(8.0, 16.0), 18.0, 2.0).eval(ctx.bmi),
            ValidationRule::AthleticBuild => {
                LinearAnchor::new(pick(8.0, 16.0), 0.0, 20.0).eval(ctx.waist_to_shoulder)
            }
            ValidationRule::HighBmi => LinearAnchor::new(pick(20.0, 28.0), 28.0, 1.5).eval(ctx.bmi),
            ValidationRule::WideWaist => {
                LinearAnchor::new(pick(22.0, 30.0), 0.70, 40.0).eval(ctx.waist_to_shoulder)
            }
        }
    }

    fn reason(self, ctx: &Context) -> String {
        match self {
            ValidationRule::LowBmi => format!("BMI {:.1} too low for a high body-fat estimate", ctx.bmi),
            ValidationRule::AthleticBuild => {
                "Athletic build detected (narrow waist, high volume)".to_string()
            }
            ValidationRule::HighBmi => format!("BMI {:.1} too high for a low body-fat estimate", ctx.bmi),
            ValidationRule::WideWaist => "Very wide waist indicates high body fat".to_string(),
        }
    }
}

/// Check a candidate estimate for physiological plausibility.
pub fn validate_estimate(
    estimate: f64,
    bmi: f64,
    sex: Sex,
    measurements: &Measurements,
    ratios: &Ratios,
) -> ValidationOutcome {
    let ctx = Context {
        estimate,
        bmi,
        sex,
        waist_to_shoulder: ratios.waist_to_shoulder,
        volume: measurements.volume_indicator.unwrap_or(DEFAULT_VOLUME),
    };

    let mut adjusted = estimate;
    let mut fired = None;
    for rule in ValidationRule::ORDER {
        if rule.triggers(&ctx) {
            adjusted = rule.replacement(&ctx);
            fired = Some(rule);
        }
    }
    let adjusted = round_to(sex.clamp_bf(adjusted), 1);

    if let Some(rule) = fired {
        info!(?rule, original = estimate, adjusted, "physiological override");
    }
    ValidationOutcome {
        original: round_to(estimate, 1),
        adjusted,
        was_adjusted: fired.is_some(),
        rule: fired,
        reason: fired.map(|r| r.reason(&ctx)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratios(w: f64) -> Ratios {
        Ratios {
            waist_to_shoulder: w,
            hip_to_shoulder: 0.8,
            torso_to_shoulder: 1.2,
        }
    }

    fn measurements(volume: Option<f64>) -> Measurements {
        Measurements {
            volume_indicator: volume,
            ..Measurements::new(0.42, 0.33, 0.24, 0.5)
        }
    }

    #[test]
    fn plausible_estimate_passes_through() {
        let out = validate_estimate(16.04, 24.0, Sex::Male, &measurements(None), &ratios(0.58));
        assert!(!out.was_adjusted);
        assert_eq!(out.adjusted, 16.0);
        assert!(out.rule.is_none());
        assert!(out.reason.is_none());
    }

    #[test]
    fn low_bmi_high_estimate_is_corrected() {
        let out = validate_estimate(30.0, 20.0, Sex::Male, &measurements(None), &ratios(0.58));
        assert!(out.was_adjusted);
        assert_eq!(out.rule, Some(ValidationRule::LowBmi));
        // 8 + (20 - 18) * 2
        assert_eq!(out.adjusted, 12.0);
        assert!((8.0..=16.0).contains(&out.adjusted));
        assert_eq!(out.original, 30.0);
    }

    #[test]
    fn female_anchors_are_higher() {
        let out = validate_estimate(30.0, 20.0, Sex::Female, &measurements(None), &ratios(0.58));
        assert_eq!(out.adjusted, 20.0);
    }

    #[test]
    fn athletic_build_overrides() {
        let out = validate_estimate(22.0, 24.0, Sex::Male, &measurements(Some(0.24)), &ratios(0.45));
        assert_eq!(out.rule, Some(ValidationRule::AthleticBuild));
        assert_eq!(out.adjusted, 17.0);
    }

    #[test]
    fn athletic_build_needs_volume() {
        let out = validate_estimate(22.0, 24.0, Sex::Male, &measurements(None), &ratios(0.45));
        assert!(!out.was_adjusted);
    }

    #[test]
    fn high_bmi_low_estimate_is_raised() {
        let out = validate_estimate(14.0, 32.0, Sex::Male, &measurements(None), &ratios(0.6));
        assert_eq!(out.rule, Some(ValidationRule::HighBmi));
        assert_eq!(out.adjusted, 26.0);
    }

    #[test]
    fn last_rule_wins() {
        // high BMI and wide waist both fire; the wide-waist anchor is kept
        let out = validate_estimate(15.0, 30.0, Sex::Male, &measurements(None), &ratios(0.75));
        assert_eq!(out.rule, Some(ValidationRule::WideWaist));
        assert_eq!(out.adjusted, 24.0);
    }

    #[test]
    fn clamps_to_sex_bounds() {
        let out = validate_estimate(60.0, 24.0, Sex::Male, &measurements(None), &ratios(0.6));
        assert!(!out.was_adjusted);
        assert_eq!(out.adjusted, 45.0);
    }
}
