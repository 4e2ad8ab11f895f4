//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - read from JSON requests produced by the external image pipelines
//! - passed by reference through the estimators and the fusion engine
//! - exported to JSON for auditing

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EstimateError, Result};

/// Physiological body-fat bounds for men, in percent.
pub const BF_BOUNDS_MALE: (f64, f64) = (5.0, 45.0);

/// Physiological body-fat bounds for women, in percent.
pub const BF_BOUNDS_FEMALE: (f64, f64) = (12.0, 50.0);

/// Accepted subject age range (years, inclusive).
pub const AGE_LIMITS: (u32, u32) = (16, 100);

/// Accepted subject weight range (kg, inclusive).
pub const WEIGHT_LIMITS_KG: (f64, f64) = (30.0, 300.0);

/// Accepted subject height range (cm, inclusive).
pub const HEIGHT_LIMITS_CM: (f64, f64) = (100.0, 250.0);

/// Biological sex used to condition every threshold table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn as_str(self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }

    /// `(min, max)` body-fat percentage considered physiologically possible.
    pub fn bf_bounds(self) -> (f64, f64) {
        match self {
            Sex::Male => BF_BOUNDS_MALE,
            Sex::Female => BF_BOUNDS_FEMALE,
        }
    }

    /// Clamp a body-fat value into this sex's physiological bounds.
    pub fn clamp_bf(self, bf: f64) -> f64 {
        let (lo, hi) = self.bf_bounds();
        bf.clamp(lo, hi)
    }

    /// Numeric encoding used by the regression model (1 = male, 0 = female).
    pub fn encoded(self) -> f64 {
        match self {
            Sex::Male => 1.0,
            Sex::Female => 0.0,
        }
    }
}

impl FromStr for Sex {
    type Err = EstimateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Sex::Male),
            "female" | "f" => Ok(Sex::Female),
            other => Err(EstimateError::InvalidProfile(format!(
                "sex must be 'male' or 'female', got '{other}'"
            ))),
        }
    }
}

impl TryFrom<String> for Sex {
    type Error = EstimateError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse somatotype used to seed the rule-based estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyType {
    Lean,
    Muscular,
    Overweight,
}

impl BodyType {
    pub fn as_str(self) -> &'static str {
        match self {
            BodyType::Lean => "lean",
            BodyType::Muscular => "muscular",
            BodyType::Overweight => "overweight",
        }
    }
}

/// Self-reported subject data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectProfile {
    pub age: u32,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub sex: Sex,
}

impl SubjectProfile {
    /// Reject values outside the accepted input limits.
    pub fn validate(&self) -> Result<()> {
        let (age_min, age_max) = AGE_LIMITS;
        if !(age_min..=age_max).contains(&self.age) {
            return Err(EstimateError::InvalidProfile(format!(
                "age must be between {age_min} and {age_max}, got {}",
                self.age
            )));
        }
        let (w_min, w_max) = WEIGHT_LIMITS_KG;
        if !(self.weight_kg.is_finite() && (w_min..=w_max).contains(&self.weight_kg)) {
            return Err(EstimateError::InvalidProfile(format!(
                "weight must be between {w_min} and {w_max} kg, got {}",
                self.weight_kg
            )));
        }
        let (h_min, h_max) = HEIGHT_LIMITS_CM;
        if !(self.height_cm.is_finite() && (h_min..=h_max).contains(&self.height_cm)) {
            return Err(EstimateError::InvalidProfile(format!(
                "height must be between {h_min} and {h_max} cm, got {}",
                self.height_cm
            )));
        }
        Ok(())
    }

    /// Body-mass index, `weight / height_m²`.
    pub fn bmi(&self) -> f64 {
        let height_m = self.height_cm / 100.0;
        self.weight_kg / (height_m * height_m)
    }
}

/// Landmark-derived anthropometric signals, normalized to image scale.
///
/// The four widths/heights are required. The remaining signals are optional
/// because older landmark extractors do not produce them; each consumer picks
/// its own neutral default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurements {
    pub shoulder_width: f64,
    pub hip_width: f64,
    pub waist_width: f64,
    pub torso_height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_indicator: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waist_prominence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waist_ratio: Option<f64>,
}

impl Measurements {
    /// Measurements with only the required fields set.
    pub fn new(shoulder_width: f64, hip_width: f64, waist_width: f64, torso_height: f64) -> Self {
        Self {
            shoulder_width,
            hip_width,
            waist_width,
            torso_height,
            volume_indicator: None,
            waist_prominence: None,
            height_ratio: None,
            waist_ratio: None,
        }
    }
}

/// Dimensionless ratios derived from `Measurements` (shoulder width is the divisor).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ratios {
    pub waist_to_shoulder: f64,
    pub hip_to_shoulder: f64,
    pub torso_to_shoulder: f64,
}

/// Image-texture scores produced by the external texture pipeline.
///
/// Every field is a score in `[0, 1]`. `central_fat` is a penalty signal
/// (smooth, low-contrast abdominal skin) and `confidence` is an image
/// quality estimate.
///
/// The definition scores, `central_fat` and `confidence` are required. The
/// raw sub-scores are informational and default to neutral when absent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextureSignals {
    pub definition_score: f64,
    pub abs_visibility: f64,
    pub vascularity: f64,
    pub central_fat: f64,
    pub confidence: f64,
    #[serde(default = "neutral_sub_score")]
    pub muscle_separation: f64,
    #[serde(default = "neutral_sub_score")]
    pub subcutaneous_fat: f64,
    #[serde(default = "neutral_sub_score")]
    pub texture_complexity: f64,
    #[serde(default = "neutral_sub_score")]
    pub local_contrast: f64,
}

fn neutral_sub_score() -> f64 {
    0.5
}

impl TextureSignals {
    /// Neutral signals used when the texture pipeline produced nothing usable.
    pub const fn fallback() -> Self {
        Self {
            definition_score: 0.5,
            abs_visibility: 0.5,
            vascularity: 0.5,
            central_fat: 0.5,
            confidence: 0.3,
            muscle_separation: 0.5,
            subcutaneous_fat: 0.5,
            texture_complexity: 0.5,
            local_contrast: 0.5,
        }
    }

    /// Ensure every score is finite and within `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("definition_score", self.definition_score),
            ("abs_visibility", self.abs_visibility),
            ("vascularity", self.vascularity),
            ("central_fat", self.central_fat),
            ("confidence", self.confidence),
            ("muscle_separation", self.muscle_separation),
            ("subcutaneous_fat", self.subcutaneous_fat),
            ("texture_complexity", self.texture_complexity),
            ("local_contrast", self.local_contrast),
        ];
        for (field, value) in fields {
            if !(value.is_finite() && (0.0..=1.0).contains(&value)) {
                return Err(EstimateError::InvalidSignal { field, value });
            }
        }
        Ok(())
    }
}

/// Per-method confidences feeding the weight normalization.
///
/// `ml` is `None` when no regression estimate is available.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MethodConfidences {
    pub rules: f64,
    pub texture: f64,
    pub ml: Option<f64>,
}

/// Normalized fusion weights. `ml` is 0 in the SAFE blend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionWeights {
    pub ml: f64,
    pub rules: f64,
    pub texture: f64,
}

impl FusionWeights {
    pub fn sum(&self) -> f64 {
        self.ml + self.rules + self.texture
    }
}

/// Special-case flags detected during fusion. They only steer the weights.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialCases {
    pub is_athlete: bool,
    pub is_overweight: bool,
    pub measurements_suspicious: bool,
    pub low_image_quality: bool,
}

/// Which blend produced the published headline value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FusionMode {
    Safe,
    Experimental,
}

impl FusionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            FusionMode::Safe => "SAFE",
            FusionMode::Experimental => "EXPERIMENTAL",
        }
    }
}

/// Five-tier label for the final confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    #[serde(rename = "Very High")]
    VeryHigh,
    High,
    Medium,
    Low,
    #[serde(rename = "Very Low")]
    VeryLow,
}

impl ConfidenceLevel {
    pub fn from_score(confidence: f64) -> Self {
        if confidence >= 0.85 {
            ConfidenceLevel::VeryHigh
        } else if confidence >= 0.70 {
            ConfidenceLevel::High
        } else if confidence >= 0.55 {
            ConfidenceLevel::Medium
        } else if confidence >= 0.40 {
            ConfidenceLevel::Low
        } else {
            ConfidenceLevel::VeryLow
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ConfidenceLevel::VeryHigh => "Very High",
            ConfidenceLevel::High => "High",
            ConfidenceLevel::Medium => "Medium",
            ConfidenceLevel::Low => "Low",
            ConfidenceLevel::VeryLow => "Very Low",
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether the regression estimate took part in the published blend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MlStatus {
    /// Recorded for divergence analysis only.
    Quarantine,
    /// Blended into the experimental headline value.
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceImpact {
    Neutral,
    Reduced,
}

/// How the regression estimate relates to the rule-based one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MlAnalysis {
    pub prediction: Option<f64>,
    /// `|ml - rules|`, absent when no regression estimate exists.
    pub divergence: Option<f64>,
    pub confidence_impact: ConfidenceImpact,
    pub status: MlStatus,
}

/// Physiological override rules, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationRule {
    LowBmi,
    AthleticBuild,
    HighBmi,
    WideWaist,
}

/// Result of running the physiological validator on one candidate estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub original: f64,
    pub adjusted: f64,
    pub was_adjusted: bool,
    /// Last rule that fired (later rules overwrite earlier ones).
    pub rule: Option<ValidationRule>,
    pub reason: Option<String>,
}

/// Terminal artifact of the estimation core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalResult {
    /// Published headline value (validated SAFE value, or the experimental
    /// blend when experimental mode is active).
    pub final_prediction: f64,
    /// Validated SAFE value. Always present.
    pub safe_prediction: f64,
    pub experimental_prediction: Option<f64>,
    pub ml_prediction: Option<f64>,
    pub rules_prediction: f64,
    pub texture_prediction: f64,
    pub safe_weights: FusionWeights,
    pub experimental_weights: Option<FusionWeights>,
    pub mode: FusionMode,
    pub confidence: f64,
    pub confidence_level: ConfidenceLevel,
    /// Confidences after special-case and divergence adjustments.
    pub confidences: MethodConfidences,
    /// Human-readable audit trail, in the order the notes were produced.
    pub adjustments: Vec<String>,
    pub special_cases: SpecialCases,
    pub ml_analysis: MlAnalysis,
    pub validation: ValidationOutcome,
}

/// Uniform noise added to the rule-based estimate before clamping.
///
/// The amplitude defaults to zero so repeated calls are reproducible. A fixed
/// `seed` makes non-zero noise reproducible too.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NoiseConfig {
    pub amplitude: f64,
    pub seed: Option<u64>,
}

/// Largest accepted rule-noise amplitude, in body-fat percentage points.
pub const MAX_NOISE_AMPLITUDE: f64 = 5.0;

impl NoiseConfig {
    pub fn is_enabled(&self) -> bool {
        self.amplitude.is_finite() && self.amplitude > 0.0
    }

    pub fn validate(&self) -> Result<()> {
        let a = self.amplitude;
        if !(a.is_finite() && (0.0..=MAX_NOISE_AMPLITUDE).contains(&a)) {
            return Err(EstimateError::InvalidNoise(a));
        }
        Ok(())
    }
}

/// Per-call configuration of the estimation core.
///
/// This is derived from the environment (see `config`) plus CLI overrides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EstimateConfig {
    pub use_experimental_ml: bool,
    pub noise: NoiseConfig,
}
