//! Fusion engine: blends the per-method estimates into a `FinalResult`.
//!
//! Stages:
//! 1. measurement quality check
//! 2. base confidences (rules fixed, texture from the image, ML from input ranges)
//! 3. special-case adjustments (`confidence::apply_special_cases`)
//! 4. SAFE blend of rules + texture, always computed
//! 5. EXPERIMENTAL blend including ML, only on request and only with an ML value
//! 6. physiological validation of the SAFE value
//! 7. agreement-based final confidence, discounted on strong ML divergence
//!
//! The ML estimate never reaches the SAFE number. Outside experimental mode it
//! is only a divergence signal.

use tracing::{debug, info, warn};

use crate::domain::{
    ConfidenceImpact, ConfidenceLevel, FinalResult, FusionMode, FusionWeights, Measurements,
    MethodConfidences, MlAnalysis, MlStatus, Ratios, Sex, TextureSignals,
};
use crate::fusion::confidence::{
    CaseContext, RULES_BASE_CONFIDENCE, apply_special_cases, measurements_suspicious,
    ml_confidence,
};
use crate::fusion::validator::validate_estimate;
use crate::math::{mean, normalize, round_to, std_dev};

/// ML/rules gap above which the ML confidence is cut in the experimental blend.
pub const ML_DISCOUNT_DIVERGENCE: f64 = 10.0;
pub const ML_DISCOUNT_FACTOR: f64 = 0.3;

/// ML/rules gap above which the final confidence is reduced.
pub const CONFIDENCE_DIVERGENCE: f64 = 15.0;
pub const CONFIDENCE_DIVERGENCE_FACTOR: f64 = 0.85;

/// Std-dev of the two estimates at which agreement reaches zero.
const AGREEMENT_SCALE: f64 = 20.0;
const MIN_CONFIDENCE: f64 = 0.3;

/// Everything the engine needs for one subject.
#[derive(Debug, Clone, Copy)]
pub struct FusionInputs<'a> {
    pub rules_estimate: f64,
    pub texture_estimate: f64,
    /// `None` when the regression model is unavailable.
    pub ml_estimate: Option<f64>,
    pub signals: &'a TextureSignals,
    pub bmi: f64,
    pub sex: Sex,
    pub measurements: &'a Measurements,
    pub ratios: &'a Ratios,
}

/// Fuse the per-method estimates.
///
/// Pure apart from tracing: identical inputs give identical results.
pub fn fuse(inputs: &FusionInputs<'_>, use_experimental_ml: bool) -> FinalResult {
    let mut notes = Vec::new();
    let m = inputs.measurements;

    let suspicious = measurements_suspicious(m, inputs.ratios);
    if suspicious {
        warn!(
            shoulder = m.shoulder_width,
            hip = m.hip_width,
            waist_to_shoulder = inputs.ratios.waist_to_shoulder,
            "suspicious measurements"
        );
        notes.push(format!(
            "Suspicious measurements (shoulder={:.3}, hip={:.3})",
            m.shoulder_width, m.hip_width
        ));
    }

    let base = MethodConfidences {
        rules: RULES_BASE_CONFIDENCE,
        texture: inputs.signals.confidence,
        ml: inputs
            .ml_estimate
            .map(|_| ml_confidence(inputs.bmi, inputs.ratios, m)),
    };
    let ctx = CaseContext::new(inputs.signals, inputs.bmi, inputs.ratios, suspicious);
    let cases = apply_special_cases(&ctx, base);
    notes.extend(cases.notes);
    let mut confidences = cases.confidences;

    let safe_weights = blend_weights(0.0, confidences.rules, confidences.texture);
    let safe_raw = inputs.rules_estimate * safe_weights.rules
        + inputs.texture_estimate * safe_weights.texture;
    debug!(
        rules = inputs.rules_estimate,
        texture = inputs.texture_estimate,
        w_rules = safe_weights.rules,
        w_texture = safe_weights.texture,
        safe = safe_raw,
        "safe blend"
    );

    let divergence = inputs
        .ml_estimate
        .map(|ml| (ml - inputs.rules_estimate).abs());

    let mut experimental = None;
    match (inputs.ml_estimate, confidences.ml) {
        (Some(ml), Some(mut ml_conf)) if use_experimental_ml => {
            let gap = (ml - inputs.rules_estimate).abs();
            if gap > ML_DISCOUNT_DIVERGENCE {
                warn!(divergence = gap, "ML estimate diverges from rules");
                notes.push(format!("ML diverges {gap:.1}% from rules"));
                ml_conf *= ML_DISCOUNT_FACTOR;
                confidences.ml = Some(ml_conf);
            }
            let weights = blend_weights(ml_conf, confidences.rules, confidences.texture);
            let value = ml * weights.ml
                + inputs.rules_estimate * weights.rules
                + inputs.texture_estimate * weights.texture;
            debug!(
                ml,
                w_ml = weights.ml,
                w_rules = weights.rules,
                w_texture = weights.texture,
                experimental = value,
                "experimental blend"
            );
            experimental = Some((value, weights));
        }
        (None, _) => {
            if use_experimental_ml {
                info!("experimental mode requested without an ML estimate, falling back to SAFE");
            }
            notes.push("ML estimate unavailable: SAFE fusion only (ML weight 0)".to_string());
        }
        _ => {}
    }

    let validation = validate_estimate(safe_raw, inputs.bmi, inputs.sex, m, inputs.ratios);
    if let Some(reason) = validation.reason.as_deref() {
        notes.push(format!(
            "Validation: {:.1}% -> {:.1}% ({reason})",
            safe_raw, validation.adjusted
        ));
    }

    let mut confidence = agreement_confidence(
        inputs.rules_estimate,
        inputs.texture_estimate,
        &confidences,
    );
    let impact = match divergence {
        Some(gap) if gap > CONFIDENCE_DIVERGENCE => {
            confidence *= CONFIDENCE_DIVERGENCE_FACTOR;
            notes.push(format!(
                "Confidence reduced due to ML divergence ({gap:.1}%)"
            ));
            ConfidenceImpact::Reduced
        }
        _ => ConfidenceImpact::Neutral,
    };

    let (mode, final_prediction) = match experimental {
        Some((value, _)) => (FusionMode::Experimental, round_to(inputs.sex.clamp_bf(value), 1)),
        None => (FusionMode::Safe, validation.adjusted),
    };
    let status = match mode {
        FusionMode::Experimental => MlStatus::Active,
        FusionMode::Safe => MlStatus::Quarantine,
    };

    FinalResult {
        final_prediction,
        safe_prediction: validation.adjusted,
        experimental_prediction: experimental.map(|(v, _)| round_to(v, 1)),
        ml_prediction: inputs.ml_estimate.map(|v| round_to(v, 1)),
        rules_prediction: round_to(inputs.rules_estimate, 1),
        texture_prediction: round_to(inputs.texture_estimate, 1),
        safe_weights,
        experimental_weights: experimental.map(|(_, w)| w),
        mode,
        confidence,
        confidence_level: ConfidenceLevel::from_score(confidence),
        confidences,
        adjustments: notes,
        special_cases: cases.cases,
        ml_analysis: MlAnalysis {
            prediction: inputs.ml_estimate.map(|v| round_to(v, 1)),
            divergence: divergence.map(|d| round_to(d, 1)),
            confidence_impact: impact,
            status,
        },
        validation,
    }
}

/// Normalize the three confidences into weights summing to 1.
///
/// All-zero confidences fall back to an even rules/texture split.
fn blend_weights(ml: f64, rules: f64, texture: f64) -> FusionWeights {
    match normalize(&[ml, rules, texture]).as_deref() {
        Some(&[ml, rules, texture]) => FusionWeights { ml, rules, texture },
        _ => FusionWeights {
            ml: 0.0,
            rules: 0.5,
            texture: 0.5,
        },
    }
}

/// `agreement * 0.6 + mean(rules, texture confidence) * 0.4`, clamped to [0.3, 1].
fn agreement_confidence(rules: f64, texture: f64, conf: &MethodConfidences) -> f64 {
    let spread = std_dev(&[rules, texture]).unwrap_or(0.0);
    let agreement = (1.0 - spread / AGREEMENT_SCALE).max(0.0);
    let avg = mean(&[conf.rules, conf.texture]).unwrap_or(0.0);
    (agreement * 0.6 + avg * 0.4).clamp(MIN_CONFIDENCE, 1.0)
}
