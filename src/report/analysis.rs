//! Detailed body-composition breakdown for a published estimate.
//!
//! Presentation only: nothing here feeds back into the estimate.

use serde::{Deserialize, Serialize};

use crate::domain::{Ratios, Sex, SubjectProfile};
use crate::math::round_to;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BfCategory {
    Essential,
    Athletic,
    Fit,
    Average,
    Overweight,
}

/// Upper bounds (exclusive) of essential, athletic, fit and average.
fn category_limits(sex: Sex) -> [f64; 4] {
    match sex {
        Sex::Male => [6.0, 14.0, 18.0, 25.0],
        Sex::Female => [14.0, 21.0, 25.0, 32.0],
    }
}

impl BfCategory {
    pub fn classify(bf: f64, sex: Sex) -> Self {
        const ORDER: [BfCategory; 4] = [
            BfCategory::Essential,
            BfCategory::Athletic,
            BfCategory::Fit,
            BfCategory::Average,
        ];
        category_limits(sex)
            .iter()
            .zip(ORDER)
            .find(|(limit, _)| bf < **limit)
            .map(|(_, c)| c)
            .unwrap_or(BfCategory::Overweight)
    }

    pub fn label(self) -> &'static str {
        match self {
            BfCategory::Essential => "Essential (extreme)",
            BfCategory::Athletic => "Athletic",
            BfCategory::Fit => "Fitness",
            BfCategory::Average => "Average",
            BfCategory::Overweight => "Overweight",
        }
    }

    pub fn description(self, sex: Sex) -> &'static str {
        match (self, sex) {
            (BfCategory::Essential, _) => "Minimum level for survival. Health risk.",
            (BfCategory::Athletic, Sex::Male) => "Well-defined muscles, visible vascularity.",
            (BfCategory::Athletic, Sex::Female) => "Defined muscles, low body fat.",
            (BfCategory::Fit, Sex::Male) => "Healthy, athletic appearance.",
            (BfCategory::Fit, Sex::Female) => "Healthy, toned appearance.",
            (BfCategory::Average, Sex::Male) => "Common range for adult men.",
            (BfCategory::Average, Sex::Female) => "Common range for adult women.",
            (BfCategory::Overweight, _) => "Visible excess body fat.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyShape {
    VShape,
    Rectangular,
    Oval,
    Round,
}

impl BodyShape {
    pub fn from_waist_ratio(waist_to_shoulder: f64) -> Self {
        if waist_to_shoulder < 0.45 {
            BodyShape::VShape
        } else if waist_to_shoulder < 0.55 {
            BodyShape::Rectangular
        } else if waist_to_shoulder < 0.65 {
            BodyShape::Oval
        } else {
            BodyShape::Round
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BodyShape::VShape => "Inverted triangle (V-shape)",
            BodyShape::Rectangular => "Rectangular",
            BodyShape::Oval => "Oval",
            BodyShape::Round => "Round/Apple",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            BodyShape::VShape => "Broad shoulders, narrow waist: athletic shape",
            BodyShape::Rectangular => "Balanced proportions",
            BodyShape::Oval => "Slightly wider waist",
            BodyShape::Round => "Fat accumulation in the abdominal region",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    BodyFatTooLow,
    BodyFatHigh,
    Underweight,
    Overweight,
    IndividualAssessment,
}

const HEALTHY_BMI: (f64, f64) = (18.5, 24.9);

fn healthy_bf(sex: Sex) -> (f64, f64) {
    match sex {
        Sex::Male => (10.0, 22.0),
        Sex::Female => (18.0, 30.0),
    }
}

impl HealthStatus {
    pub fn assess(bf: f64, bmi: f64, sex: Sex) -> Self {
        let (bf_lo, bf_hi) = healthy_bf(sex);
        let (bmi_lo, bmi_hi) = HEALTHY_BMI;
        let bf_ok = (bf_lo..=bf_hi).contains(&bf);
        let bmi_ok = (bmi_lo..=bmi_hi).contains(&bmi);
        if bf_ok && bmi_ok {
            HealthStatus::Healthy
        } else if bf < bf_lo {
            HealthStatus::BodyFatTooLow
        } else if bf > bf_hi {
            HealthStatus::BodyFatHigh
        } else if bmi < bmi_lo {
            HealthStatus::Underweight
        } else if bmi > bmi_hi {
            HealthStatus::Overweight
        } else {
            HealthStatus::IndividualAssessment
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            HealthStatus::Healthy => "Healthy",
            HealthStatus::BodyFatTooLow => "Body fat very low",
            HealthStatus::BodyFatHigh => "Body fat elevated",
            HealthStatus::Underweight => "Below ideal weight",
            HealthStatus::Overweight => "Overweight",
            HealthStatus::IndividualAssessment => "Individual assessment recommended",
        }
    }
}

fn recommendations(bf: f64, sex: Sex, category: BfCategory) -> Vec<String> {
    let average_limit = match sex {
        Sex::Male => 18.0,
        Sex::Female => 25.0,
    };
    let recs = match category {
        BfCategory::Essential => vec![
            "See a doctor: very low body fat can be harmful",
            "Consider increasing calorie intake gradually",
        ],
        BfCategory::Athletic => vec![
            "Keep up strength training and a balanced diet",
            "Monitor hydration and muscle recovery",
        ],
        BfCategory::Fit => vec![
            "Continue with your current healthy habits",
            "Vary exercises to keep progressing",
        ],
        BfCategory::Average if bf > average_limit => vec![
            "Consider increasing physical activity gradually",
            "Adjust your diet towards a mild calorie deficit",
        ],
        BfCategory::Average => Vec::new(),
        BfCategory::Overweight => vec![
            "Recommended: aerobic exercise 3-5x per week",
            "Consider professional nutritional guidance",
            "Focus on a sustainable calorie deficit (300-500 kcal/day)",
        ],
    };
    recs.into_iter().map(String::from).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedAnalysis {
    pub bf_percentage: f64,
    pub category: BfCategory,
    pub category_label: String,
    pub category_description: String,
    pub body_shape: BodyShape,
    pub shape_description: String,
    pub fat_mass_kg: f64,
    pub lean_mass_kg: f64,
    pub health_status: HealthStatus,
    pub recommendations: Vec<String>,
}

/// Build the breakdown for `bf` using the subject's real weight.
pub fn detailed_analysis(bf: f64, profile: &SubjectProfile, ratios: &Ratios) -> DetailedAnalysis {
    let sex = profile.sex;
    let category = BfCategory::classify(bf, sex);
    let shape = BodyShape::from_waist_ratio(ratios.waist_to_shoulder);
    let fat_mass = profile.weight_kg * bf / 100.0;

    DetailedAnalysis {
        bf_percentage: bf,
        category,
        category_label: category.label().to_string(),
        category_description: category.description(sex).to_string(),
        body_shape: shape,
        shape_description: shape.description().to_string(),
        fat_mass_kg: round_to(fat_mass, 1),
        lean_mass_kg: round_to(profile.weight_kg - fat_mass, 1),
        health_status: HealthStatus::assess(bf, profile.bmi(), sex),
        recommendations: recommendations(bf, sex, category),
    }
}
