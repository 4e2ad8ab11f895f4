//! Shared estimation pipeline used by the `estimate` and `batch` commands.
//!
//! ratios -> body type -> rules + texture estimates -> fusion (+ validation)
//!
//! `estimate` is the core operation over already-extracted signals.
//! `run_request` adds what surrounds it in a real request: profile checks,
//! texture fallback, the optional regressor, and the detailed analysis.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{
    AGE_LIMITS, BodyType, EstimateConfig, FinalResult, Measurements, Ratios, Sex, TextureSignals,
};
use crate::error::{EstimateError, Result};
use crate::estimators::{
    RuleInputs, RuleNoise, calculate_ratios, classify_body_type, estimate_rules, estimate_texture,
};
use crate::fusion::{FusionInputs, fuse};
use crate::io::EstimateRequest;
use crate::math::round_to;
use crate::models::{MlFeatures, Regressor};
use crate::report::{DetailedAnalysis, detailed_analysis};

/// Upstream signals for one subject.
#[derive(Debug, Clone, Copy)]
pub struct EstimateInputs<'a> {
    pub measurements: &'a Measurements,
    pub signals: &'a TextureSignals,
    pub ml_estimate: Option<f64>,
    pub bmi: f64,
    pub sex: Sex,
    pub age: u32,
}

/// `FinalResult` plus the intermediate values it was derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct Estimate {
    pub ratios: Ratios,
    pub body_type: BodyType,
    pub result: FinalResult,
}

/// Core estimation: signals in, fused result out.
pub fn estimate(inputs: &EstimateInputs<'_>, config: &EstimateConfig) -> Result<FinalResult> {
    estimate_detailed(inputs, config).map(|e| e.result)
}

pub fn estimate_detailed(inputs: &EstimateInputs<'_>, config: &EstimateConfig) -> Result<Estimate> {
    if !(inputs.bmi.is_finite() && inputs.bmi > 0.0) {
        return Err(EstimateError::InvalidBmi(inputs.bmi));
    }
    let (age_min, age_max) = AGE_LIMITS;
    if !(age_min..=age_max).contains(&inputs.age) {
        return Err(EstimateError::InvalidProfile(format!(
            "age must be between {age_min} and {age_max}, got {}",
            inputs.age
        )));
    }
    inputs.signals.validate()?;
    config.noise.validate()?;

    let ratios = calculate_ratios(inputs.measurements)?;
    let body_type = classify_body_type(&ratios, inputs.sex, Some(inputs.bmi));

    let mut noise = RuleNoise::from_config(&config.noise);
    let rules = estimate_rules(
        &RuleInputs {
            body_type,
            bmi: inputs.bmi,
            sex: inputs.sex,
            ratios: &ratios,
            measurements: inputs.measurements,
        },
        noise.sample(),
    );
    let texture = estimate_texture(inputs.signals, inputs.sex, inputs.bmi);

    let ml_estimate = match inputs.ml_estimate {
        Some(v) if !v.is_finite() => {
            warn!(value = v, "ignoring non-finite ML estimate");
            None
        }
        other => other,
    };
    debug!(body_type = body_type.as_str(), rules, texture, ?ml_estimate, "per-method estimates");

    let result = fuse(
        &FusionInputs {
            rules_estimate: rules,
            texture_estimate: texture,
            ml_estimate,
            signals: inputs.signals,
            bmi: inputs.bmi,
            sex: inputs.sex,
            measurements: inputs.measurements,
            ratios: &ratios,
        },
        config.use_experimental_ml,
    );

    Ok(Estimate {
        ratios,
        body_type,
        result,
    })
}

/// Everything produced for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateOutput {
    pub id: Option<String>,
    pub bmi: f64,
    pub body_type: BodyType,
    pub ratios: Ratios,
    pub result: FinalResult,
    pub analysis: DetailedAnalysis,
    /// Pipeline-level notes (fallbacks taken before fusion).
    pub alerts: Vec<String>,
}

/// Run one request end to end.
///
/// A loaded `regressor` takes precedence over the request's `ml_estimate`.
/// A regressor failure is not an error: the request proceeds without ML.
pub fn run_request(
    request: &EstimateRequest,
    config: &EstimateConfig,
    regressor: Option<&dyn Regressor>,
) -> Result<EstimateOutput> {
    let subject = &request.subject;
    subject.validate()?;
    let bmi = subject.bmi();
    let mut alerts = Vec::new();

    let signals = match request.texture {
        Some(signals) => signals,
        None => {
            alerts.push("Texture analysis unavailable: using fallback signals".to_string());
            TextureSignals::fallback()
        }
    };

    let ml_estimate = match regressor {
        Some(model) => {
            let features = MlFeatures::build(subject, &request.measurements);
            match model.predict(&features) {
                Ok(v) => Some(round_to(subject.sex.clamp_bf(v), 1)),
                Err(e) => {
                    warn!(error = %e, "regressor unavailable, continuing without ML");
                    alerts.push(format!("ML model unavailable: {e}"));
                    None
                }
            }
        }
        None => request.ml_estimate,
    };

    let est = estimate_detailed(
        &EstimateInputs {
            measurements: &request.measurements,
            signals: &signals,
            ml_estimate,
            bmi,
            sex: subject.sex,
            age: subject.age,
        },
        config,
    )?;

    let analysis = detailed_analysis(est.result.safe_prediction, subject, &est.ratios);

    Ok(EstimateOutput {
        id: request.id.clone(),
        bmi,
        body_type: est.body_type,
        ratios: est.ratios,
        result: est.result,
        analysis,
        alerts,
    })
}

/// Outcome of one request within a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEntry {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<EstimateOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Run every request in parallel. Failures are kept per entry, in input order.
pub fn run_batch(
    requests: &[EstimateRequest],
    config: &EstimateConfig,
    regressor: Option<&dyn Regressor>,
) -> Vec<BatchEntry> {
    requests
        .par_iter()
        .enumerate()
        .map(|(idx, request)| {
            let id = request.label(idx);
            match run_request(request, config, regressor) {
                Ok(output) => BatchEntry {
                    id,
                    output: Some(output),
                    error: None,
                },
                Err(e) => {
                    warn!(request = %id, error = %e, "request failed");
                    BatchEntry {
                        id,
                        output: None,
                        error: Some(e.to_string()),
                    }
                }
            }
        })
        .collect()
}
