//! Rule-based body-fat estimator.
//!
//! `bf = base(body_type, sex) + bmi_step + waist_step + visual_steps + noise`,
//! clamped to the sex bounds and rounded to one decimal.
//!
//! Every term is a step table (see `math::bands`), so holding the body type
//! fixed, the estimate is non-decreasing in BMI, waist/shoulder ratio, volume
//! and waist prominence.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Uniform};

use crate::domain::{BodyType, Measurements, NoiseConfig, Ratios, Sex};
use crate::math::{Step, round_to, step_above, step_below};

/// BMI step adjustment (ascending upper bounds); BMI >= 32.5 gets +14.
const BMI_STEPS: [Step; 6] = [
    Step::new(18.5, -3.0),
    Step::new(22.0, -1.0),
    Step::new(25.0, 1.0),
    Step::new(27.5, 4.0),
    Step::new(30.0, 7.0),
    Step::new(32.5, 10.0),
];
const BMI_STEP_TOP: f64 = 14.0;

/// Men carry more abdominal fat at the same waist ratio, hence the larger steps.
const WAIST_STEPS_MALE: [Step; 4] = [
    Step::new(0.70, 6.0),
    Step::new(0.65, 4.0),
    Step::new(0.58, 2.0),
    Step::new(0.52, 1.0),
];
const WAIST_STEPS_FEMALE: [Step; 4] = [
    Step::new(0.75, 5.0),
    Step::new(0.70, 3.0),
    Step::new(0.62, 2.0),
    Step::new(0.55, 1.0),
];

const VOLUME_STEPS: [Step; 3] = [
    Step::new(0.25, 3.0),
    Step::new(0.20, 2.0),
    Step::new(0.15, 1.0),
];
const PROMINENCE_STEPS: [Step; 3] = [
    Step::new(0.03, 4.0),
    Step::new(0.01, 2.0),
    Step::new(0.0, 1.0),
];

/// Everything the rule model looks at.
#[derive(Debug, Clone, Copy)]
pub struct RuleInputs<'a> {
    pub body_type: BodyType,
    pub bmi: f64,
    pub sex: Sex,
    pub ratios: &'a Ratios,
    pub measurements: &'a Measurements,
}

/// Starting value before any adjustment.
pub fn base_value(body_type: BodyType, sex: Sex) -> f64 {
    match (body_type, sex) {
        (BodyType::Lean, Sex::Male) => 10.0,
        (BodyType::Lean, Sex::Female) => 18.0,
        (BodyType::Muscular, Sex::Male) => 15.0,
        (BodyType::Muscular, Sex::Female) => 23.0,
        (BodyType::Overweight, Sex::Male) => 25.0,
        (BodyType::Overweight, Sex::Female) => 32.0,
    }
}

pub fn bmi_adjustment(bmi: f64) -> f64 {
    step_below(bmi, &BMI_STEPS, BMI_STEP_TOP)
}

pub fn waist_adjustment(waist_to_shoulder: f64, sex: Sex) -> f64 {
    let table: &[Step] = match sex {
        Sex::Male => &WAIST_STEPS_MALE,
        Sex::Female => &WAIST_STEPS_FEMALE,
    };
    step_above(waist_to_shoulder, table, 0.0)
}

/// Volume and waist-prominence steps. Missing signals contribute nothing.
pub fn visual_adjustment(m: &Measurements) -> f64 {
    let volume = m.volume_indicator.unwrap_or(0.0);
    let prominence = m.waist_prominence.unwrap_or(0.0);
    step_above(volume, &VOLUME_STEPS, 0.0) + step_above(prominence, &PROMINENCE_STEPS, 0.0)
}

/// Rule-based estimate with an explicit additive `noise` term.
pub fn estimate_rules(inputs: &RuleInputs<'_>, noise: f64) -> f64 {
    let raw = base_value(inputs.body_type, inputs.sex)
        + bmi_adjustment(inputs.bmi)
        + waist_adjustment(inputs.ratios.waist_to_shoulder, inputs.sex)
        + visual_adjustment(inputs.measurements)
        + noise;
    round_to(inputs.sex.clamp_bf(raw), 1)
}

/// Source of the uniform `[-amplitude, amplitude]` perturbation.
///
/// With a zero amplitude no random numbers are drawn at all.
pub struct RuleNoise {
    amplitude: f64,
    rng: Option<StdRng>,
}

impl RuleNoise {
    pub fn from_config(config: &NoiseConfig) -> Self {
        if !config.is_enabled() {
            return Self::disabled();
        }
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            amplitude: config.amplitude,
            rng: Some(rng),
        }
    }

    pub fn disabled() -> Self {
        Self {
            amplitude: 0.0,
            rng: None,
        }
    }

    pub fn sample(&mut self) -> f64 {
        match self.rng.as_mut() {
            Some(rng) => Uniform::new_inclusive(-self.amplitude, self.amplitude).sample(rng),
            None => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measurements(volume: f64, prominence: f64) -> Measurements {
        Measurements {
            volume_indicator: Some(volume),
            waist_prominence: Some(prominence),
            ..Measurements::new(0.42, 0.32, 0.25, 0.50)
        }
    }

    fn ratios(w: f64) -> Ratios {
        Ratios {
            waist_to_shoulder: w,
            hip_to_shoulder: 0.76,
            torso_to_shoulder: 1.19,
        }
    }

    #[test]
    fn bmi_bands_cover_seven_steps() {
        let samples = [17.0, 20.0, 23.0, 26.0, 28.0, 31.0, 35.0];
        let expected = [-3.0, -1.0, 1.0, 4.0, 7.0, 10.0, 14.0];
        for (bmi, want) in samples.iter().zip(expected) {
            assert_eq!(bmi_adjustment(*bmi), want, "bmi={bmi}");
        }
        assert_eq!(bmi_adjustment(32.5), 14.0);
    }

    #[test]
    fn male_waist_penalty_is_larger() {
        assert_eq!(waist_adjustment(0.72, Sex::Male), 6.0);
        assert_eq!(waist_adjustment(0.72, Sex::Female), 3.0);
        assert_eq!(waist_adjustment(0.50, Sex::Male), 0.0);
    }

    #[test]
    fn worked_example_lean_male() {
        let m = measurements(0.18, 0.005);
        let r = ratios(0.60);
        let inputs = RuleInputs {
            body_type: BodyType::Lean,
            bmi: 23.5,
            sex: Sex::Male,
            ratios: &r,
            measurements: &m,
        };
        // 10 + 1 (bmi) + 2 (waist) + 1 (volume) + 1 (prominence)
        assert_eq!(estimate_rules(&inputs, 0.0), 15.0);
    }

    #[test]
    fn estimate_is_clamped_to_sex_bounds() {
        let m = measurements(0.30, 0.05);
        let r = ratios(0.80);
        let inputs = RuleInputs {
            body_type: BodyType::Overweight,
            bmi: 40.0,
            sex: Sex::Male,
            ratios: &r,
            measurements: &m,
        };
        assert_eq!(estimate_rules(&inputs, 0.0), 45.0);

        let m = Measurements::new(0.42, 0.32, 0.18, 0.50);
        let r = ratios(0.43);
        let inputs = RuleInputs {
            body_type: BodyType::Lean,
            bmi: 17.0,
            sex: Sex::Female,
            ratios: &r,
            measurements: &m,
        };
        // 18 - 3 = 15 stays inside [12, 50]
        assert_eq!(estimate_rules(&inputs, 0.0), 15.0);
    }

    #[test]
    fn monotone_in_waist_ratio() {
        let m = measurements(0.17, 0.02);
        let mut prev = f64::MIN;
        for sex in [Sex::Male, Sex::Female] {
            prev = f64::MIN;
            for i in 0..60 {
                let r = ratios(0.35 + i as f64 * 0.01);
                let inputs = RuleInputs {
                    body_type: BodyType::Lean,
                    bmi: 24.0,
                    sex,
                    ratios: &r,
                    measurements: &m,
                };
                let bf = estimate_rules(&inputs, 0.0);
                assert!(bf >= prev, "{sex}: estimate fell at w/s={}", r.waist_to_shoulder);
                prev = bf;
            }
        }
        assert!(prev > f64::MIN);
    }

    #[test]
    fn disabled_noise_is_zero_and_seeded_noise_is_reproducible() {
        let mut off = RuleNoise::from_config(&NoiseConfig::default());
        assert_eq!(off.sample(), 0.0);

        let config = NoiseConfig {
            amplitude: 0.5,
            seed: Some(7),
        };
        let mut a = RuleNoise::from_config(&config);
        let mut b = RuleNoise::from_config(&config);
        for _ in 0..10 {
            let x = a.sample();
            assert!((-0.5..=0.5).contains(&x));
            assert_eq!(x, b.sample());
        }
    }
}
