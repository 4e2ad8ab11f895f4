//! Texture estimator: image-texture scores -> body-fat estimate.
//!
//! Steps:
//! 1. visual score = `definition*0.40 + abs_visibility*0.35 + vascularity*0.25`
//! 2. multiplicative central-fat penalty (tiers above 0.50 / 0.60 / 0.70)
//! 3. sex-specific piecewise-linear mapping (four bands, falling with the score)
//! 4. BMI sanity override for very low / very high BMI
//! 5. additive central-fat correction above 0.65 / 0.75
//! 6. clamp to sex bounds, round to one decimal

use crate::domain::{Sex, TextureSignals};
use crate::math::{LinearAnchor, Step, round_to, step_above};

/// `(threshold, factor)`: first `central_fat > threshold` scales the visual score.
const CENTRAL_FAT_PENALTY: [Step; 3] = [
    Step::new(0.70, 0.70),
    Step::new(0.60, 0.80),
    Step::new(0.50, 0.90),
];

/// `(threshold, points)`: additive correction after the mapping.
const CENTRAL_FAT_CORRECTION: [Step; 2] = [Step::new(0.75, 5.0), Step::new(0.65, 3.0)];

/// A mapping band: applies when the visual score is above `above`.
#[derive(Debug, Clone, Copy)]
struct MappingBand {
    above: f64,
    anchor: LinearAnchor,
}

const fn band(above: f64, base: f64, origin: f64, slope: f64) -> MappingBand {
    MappingBand {
        above,
        anchor: LinearAnchor::new(base, origin, slope),
    }
}

const MALE_BANDS: [MappingBand; 4] = [
    band(0.85, 7.0, 1.0, -27.0),
    band(0.70, 11.0, 0.85, -33.0),
    band(0.50, 16.0, 0.70, -40.0),
    band(f64::NEG_INFINITY, 24.0, 0.50, -50.0),
];

const FEMALE_BANDS: [MappingBand; 4] = [
    band(0.80, 14.0, 1.0, -30.0),
    band(0.60, 20.0, 0.80, -30.0),
    band(0.40, 26.0, 0.60, -40.0),
    band(f64::NEG_INFINITY, 34.0, 0.40, -50.0),
];

const LOW_BMI_LIMIT: f64 = 20.0;
const LOW_BMI_MAX_BF: f64 = 16.0;
const LOW_BMI_ANCHOR: LinearAnchor = LinearAnchor::new(9.0, 18.0, 3.0);

const HIGH_BMI_LIMIT: f64 = 30.0;
const HIGH_BMI_MIN_BF: f64 = 20.0;
const HIGH_BMI_ANCHOR: LinearAnchor = LinearAnchor::new(20.0, 30.0, 2.5);

/// Weighted blend of the three definition signals.
pub fn visual_score(signals: &TextureSignals) -> f64 {
    signals.definition_score * 0.40 + signals.abs_visibility * 0.35 + signals.vascularity * 0.25
}

/// Multiplicative penalty factor for a given `central_fat` signal.
pub fn central_fat_penalty(central_fat: f64) -> f64 {
    step_above(central_fat, &CENTRAL_FAT_PENALTY, 1.0)
}

/// Map a (penalized) visual score to a body-fat estimate.
pub fn map_visual_score(score: f64, sex: Sex) -> f64 {
    let bands: &[MappingBand] = match sex {
        Sex::Male => &MALE_BANDS,
        Sex::Female => &FEMALE_BANDS,
    };
    // The last band has a -inf threshold, so a NaN score is the only miss.
    bands
        .iter()
        .find(|b| score > b.above)
        .unwrap_or(&bands[bands.len() - 1])
        .anchor
        .eval(score)
}

/// Pull the estimate back in line with an extreme BMI.
pub fn bmi_sanity_override(bf: f64, bmi: f64) -> f64 {
    if bmi < LOW_BMI_LIMIT && bf > LOW_BMI_MAX_BF {
        LOW_BMI_ANCHOR.eval(bmi)
    } else if bmi > HIGH_BMI_LIMIT && bf < HIGH_BMI_MIN_BF {
        HIGH_BMI_ANCHOR.eval(bmi)
    } else {
        bf
    }
}

/// Texture-based estimate for one subject.
pub fn estimate_texture(signals: &TextureSignals, sex: Sex, bmi: f64) -> f64 {
    let score = visual_score(signals) * central_fat_penalty(signals.central_fat);
    let mapped = map_visual_score(score, sex);
    let sane = bmi_sanity_override(mapped, bmi);
    let corrected = sane + step_above(signals.central_fat, &CENTRAL_FAT_CORRECTION, 0.0);
    round_to(sex.clamp_bf(corrected), 1)
}
