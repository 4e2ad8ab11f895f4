//! Per-method confidences and the special-case adjustments applied to them.
//!
//! The special cases are an ordered list of pure transforms over a
//! `MethodConfidences` record:
//!
//! 1. athlete                  -> texture x1.4 (cap 1), rules x0.9
//! 2. overweight               -> rules x1.3 (cap 1), texture x0.85
//! 3. suspicious measurements  -> texture x1.6 (cap 1), rules x0.7
//! 4. low image quality        -> rules x1.2 (cap 1), texture x0.8
//!
//! Each case reads the record produced by the previous one, so the adjustments
//! compound. The adjustments are multiplicative so the relative weighting of
//! the methods is preserved.

use tracing::info;

use crate::domain::{Measurements, MethodConfidences, Ratios, SpecialCases, TextureSignals};

/// Fixed confidence assigned to the rule-based estimate.
pub const RULES_BASE_CONFIDENCE: f64 = 0.7;

/// Base confidence of the black-box regression estimate.
pub const ML_BASE_CONFIDENCE: f64 = 0.5;

/// Texture confidence below which the image is treated as low quality.
pub const LOW_IMAGE_QUALITY: f64 = 0.4;

/// Neutral defaults when an optional measurement is missing.
const DEFAULT_VOLUME: f64 = 0.15;

/// Whether the landmark extraction looks degenerate (partial body, occlusion,
/// non-person image) rather than describing a real physique.
pub fn measurements_suspicious(m: &Measurements, ratios: &Ratios) -> bool {
    m.shoulder_width < 0.25 || m.hip_width < 0.15 || ratios.waist_to_shoulder > 0.80
}

/// Confidence in the regression estimate, discounted for every input that
/// falls outside the typical training range.
pub fn ml_confidence(bmi: f64, ratios: &Ratios, m: &Measurements) -> f64 {
    let mut confidence = ML_BASE_CONFIDENCE;
    if !(18.0..=35.0).contains(&bmi) {
        confidence *= 0.8;
    }
    if !(0.35..=0.80).contains(&ratios.waist_to_shoulder) {
        confidence *= 0.85;
    }
    let volume = m.volume_indicator.unwrap_or(DEFAULT_VOLUME);
    if !(0.10..=0.35).contains(&volume) {
        confidence *= 0.9;
    }
    confidence
}

/// Inputs the special-case detectors look at.
#[derive(Debug, Clone, Copy)]
pub struct CaseContext {
    pub definition_score: f64,
    pub abs_visibility: f64,
    pub central_fat: f64,
    pub bmi: f64,
    pub waist_to_shoulder: f64,
    pub measurements_suspicious: bool,
}

impl CaseContext {
    pub fn new(signals: &TextureSignals, bmi: f64, ratios: &Ratios, suspicious: bool) -> Self {
        Self {
            definition_score: signals.definition_score,
            abs_visibility: signals.abs_visibility,
            central_fat: signals.central_fat,
            bmi,
            waist_to_shoulder: ratios.waist_to_shoulder,
            measurements_suspicious: suspicious,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialCase {
    Athlete,
    Overweight,
    SuspiciousMeasurements,
    LowImageQuality,
}

impl SpecialCase {
    /// Evaluation order. Later cases see the confidences left by earlier ones.
    pub const ORDER: [SpecialCase; 4] = [
        SpecialCase::Athlete,
        SpecialCase::Overweight,
        SpecialCase::SuspiciousMeasurements,
        SpecialCase::LowImageQuality,
    ];

    pub fn triggers(self, ctx: &CaseContext, conf: &MethodConfidences) -> bool {
        match self {
            SpecialCase::Athlete => {
                ctx.definition_score > 0.65
                    && ctx.abs_visibility > 0.60
                    && ctx.central_fat < 0.45
                    && (20.0..=26.0).contains(&ctx.bmi)
            }
            SpecialCase::Overweight => ctx.bmi >= 28.0 && ctx.waist_to_shoulder > 0.65,
            SpecialCase::SuspiciousMeasurements => ctx.measurements_suspicious,
            SpecialCase::LowImageQuality => conf.texture < LOW_IMAGE_QUALITY,
        }
    }

    pub fn adjust(self, conf: MethodConfidences) -> MethodConfidences {
        let (texture, rules) = match self {
            SpecialCase::Athlete => (boost(conf.texture, 1.4), conf.rules * 0.9),
            SpecialCase::Overweight => (conf.texture * 0.85, boost(conf.rules, 1.3)),
            SpecialCase::SuspiciousMeasurements => (boost(conf.texture, 1.6), conf.rules * 0.7),
            SpecialCase::LowImageQuality => (conf.texture * 0.8, boost(conf.rules, 1.2)),
        };
        MethodConfidences {
            rules,
            texture,
            ml: conf.ml,
        }
    }

    pub fn note(self) -> &'static str {
        match self {
            SpecialCase::Athlete => "Athletic physique detected: prioritizing visual analysis",
            SpecialCase::Overweight => "Overweight profile detected: prioritizing physiological rules",
            SpecialCase::SuspiciousMeasurements => {
                "Partial body detection: prioritizing visual analysis"
            }
            SpecialCase::LowImageQuality => "Low image quality: prioritizing physiological rules",
        }
    }

    fn mark(self, cases: &mut SpecialCases) {
        match self {
            SpecialCase::Athlete => cases.is_athlete = true,
            SpecialCase::Overweight => cases.is_overweight = true,
            SpecialCase::SuspiciousMeasurements => cases.measurements_suspicious = true,
            SpecialCase::LowImageQuality => cases.low_image_quality = true,
        }
    }
}

fn boost(value: f64, factor: f64) -> f64 {
    (value * factor).min(1.0)
}

/// Confidences after all special cases, plus the flags and audit notes.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseAdjustment {
    pub confidences: MethodConfidences,
    pub cases: SpecialCases,
    pub notes: Vec<String>,
}

/// Run every special case in `SpecialCase::ORDER` over `base`.
pub fn apply_special_cases(ctx: &CaseContext, base: MethodConfidences) -> CaseAdjustment {
    let mut out = CaseAdjustment {
        confidences: base,
        cases: SpecialCases::default(),
        notes: Vec::new(),
    };
    for case in SpecialCase::ORDER {
        if !case.triggers(ctx, &out.confidences) {
            continue;
        }
        info!(?case, "special case detected");
        out.confidences = case.adjust(out.confidences);
        case.mark(&mut out.cases);
        out.notes.push(case.note().to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(texture: f64) -> MethodConfidences {
        MethodConfidences {
            rules: RULES_BASE_CONFIDENCE,
            texture,
            ml: Some(0.5),
        }
    }

    fn ctx() -> CaseContext {
        CaseContext {
            definition_score: 0.5,
            abs_visibility: 0.5,
            central_fat: 0.5,
            bmi: 24.0,
            waist_to_shoulder: 0.55,
            measurements_suspicious: false,
        }
    }

    #[test]
    fn no_case_leaves_confidences_untouched() {
        let out = apply_special_cases(&ctx(), base(0.6));
        assert_eq!(out.confidences, base(0.6));
        assert_eq!(out.cases, SpecialCases::default());
        assert!(out.notes.is_empty());
    }

    #[test]
    fn athlete_boosts_texture_with_cap() {
        let c = CaseContext {
            definition_score: 0.7,
            abs_visibility: 0.65,
            central_fat: 0.4,
            ..ctx()
        };
        let out = apply_special_cases(&c, base(0.8));
        assert!(out.cases.is_athlete);
        assert_eq!(out.confidences.texture, 1.0);
        assert!((out.confidences.rules - 0.63).abs() < 1e-12);
    }

    #[test]
    fn athlete_requires_normal_bmi() {
        let c = CaseContext {
            definition_score: 0.7,
            abs_visibility: 0.65,
            central_fat: 0.4,
            bmi: 27.0,
            ..ctx()
        };
        assert!(!SpecialCase::Athlete.triggers(&c, &base(0.6)));
    }

    #[test]
    fn overweight_boosts_rules() {
        let c = CaseContext {
            bmi: 28.0,
            waist_to_shoulder: 0.68,
            ..ctx()
        };
        let out = apply_special_cases(&c, base(0.6));
        assert!(out.cases.is_overweight);
        assert!((out.confidences.rules - 0.91).abs() < 1e-12);
        assert!((out.confidences.texture - 0.51).abs() < 1e-12);
    }

    #[test]
    fn cases_compound_in_order() {
        // overweight drops texture 0.45 -> 0.3825, which then trips low image quality
        let c = CaseContext {
            bmi: 30.0,
            waist_to_shoulder: 0.70,
            ..ctx()
        };
        let out = apply_special_cases(&c, base(0.45));
        assert!(out.cases.is_overweight);
        assert!(out.cases.low_image_quality);
        assert!((out.confidences.texture - 0.45 * 0.85 * 0.8).abs() < 1e-12);
        assert_eq!(out.confidences.rules, 1.0);
        assert_eq!(out.notes.len(), 2);
        assert_eq!(out.notes[0], SpecialCase::Overweight.note());
    }

    #[test]
    fn suspicious_measurements_shift_weight_to_texture() {
        let c = CaseContext {
            measurements_suspicious: true,
            ..ctx()
        };
        let out = apply_special_cases(&c, base(0.5));
        assert!(out.cases.measurements_suspicious);
        assert!(!out.cases.low_image_quality);
        assert!((out.confidences.texture - 0.8).abs() < 1e-12);
        assert!((out.confidences.rules - 0.49).abs() < 1e-12);
        assert_eq!(out.confidences.ml, Some(0.5));
        assert_eq!(out.notes, vec![SpecialCase::SuspiciousMeasurements.note().to_string()]);

        let capped = apply_special_cases(&c, base(0.7));
        assert_eq!(capped.confidences.texture, 1.0);
    }

    #[test]
    fn suspicious_measurements_compound_with_low_image_quality() {
        // 0.2 x1.6 = 0.32 is still under the quality threshold
        let c = CaseContext {
            measurements_suspicious: true,
            ..ctx()
        };
        let out = apply_special_cases(&c, base(0.2));
        assert!(out.cases.measurements_suspicious);
        assert!(out.cases.low_image_quality);
        assert!((out.confidences.texture - 0.2 * 1.6 * 0.8).abs() < 1e-12);
        assert!((out.confidences.rules - 0.7 * 0.7 * 1.2).abs() < 1e-12);
        assert_eq!(
            out.notes,
            vec![
                SpecialCase::SuspiciousMeasurements.note().to_string(),
                SpecialCase::LowImageQuality.note().to_string(),
            ]
        );
    }

    #[test]
    fn suspicious_measurements_flag() {
        let m = Measurements::new(0.22, 0.30, 0.15, 0.5);
        let r = Ratios {
            waist_to_shoulder: 0.68,
            hip_to_shoulder: 1.36,
            torso_to_shoulder: 2.27,
        };
        assert!(measurements_suspicious(&m, &r));

        let m = Measurements::new(0.40, 0.30, 0.26, 0.5);
        let r = Ratios {
            waist_to_shoulder: 0.65,
            ..r
        };
        assert!(!measurements_suspicious(&m, &r));
    }

    #[test]
    fn ml_confidence_discounts_out_of_range_inputs() {
        let m = Measurements {
            volume_indicator: Some(0.2),
            ..Measurements::new(0.4, 0.3, 0.24, 0.5)
        };
        let typical = Ratios {
            waist_to_shoulder: 0.6,
            hip_to_shoulder: 0.75,
            torso_to_shoulder: 1.25,
        };
        assert_eq!(ml_confidence(24.0, &typical, &m), 0.5);

        let odd = Ratios {
            waist_to_shoulder: 0.9,
            ..typical
        };
        let m_odd = Measurements {
            volume_indicator: Some(0.05),
            ..m
        };
        let c = ml_confidence(40.0, &odd, &m_odd);
        assert!((c - 0.5 * 0.8 * 0.85 * 0.9).abs() < 1e-12);
    }
}
