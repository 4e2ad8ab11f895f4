//! Regression model seam.
//!
//! The fusion engine only ever sees an `Option<f64>` ML estimate. Producing it
//! goes through the `Regressor` trait, loaded once per process and shared
//! read-only across requests. Regressors return the raw prediction; bounding
//! it to the subject's physiological range is the caller's job.

use std::fs::File;
use std::path::Path;

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::error::{EstimateError, Result};
use crate::models::features::{FEATURE_COUNT, MlFeatures};

/// A body-fat regressor over the nine-feature vector.
pub trait Regressor: Send + Sync {
    fn predict(&self, features: &MlFeatures) -> Result<f64>;
}

/// On-disk form of a linear model.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LinearModelFile {
    intercept: f64,
    coefficients: Vec<f64>,
}

/// `intercept + coefficients · features`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearRegressor {
    intercept: f64,
    coefficients: DVector<f64>,
}

impl LinearRegressor {
    pub fn new(intercept: f64, coefficients: &[f64]) -> Result<Self> {
        if coefficients.len() != FEATURE_COUNT {
            return Err(EstimateError::Model(format!(
                "expected {FEATURE_COUNT} coefficients, got {}",
                coefficients.len()
            )));
        }
        if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err(EstimateError::Model("non-finite model parameter".into()));
        }
        Ok(Self {
            intercept,
            coefficients: DVector::from_row_slice(coefficients),
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            EstimateError::Model(format!("Failed to open model '{}': {e}", path.display()))
        })?;
        let raw: LinearModelFile = serde_json::from_reader(file)
            .map_err(|e| EstimateError::Model(format!("Invalid model JSON: {e}")))?;
        Self::new(raw.intercept, &raw.coefficients)
    }
}

impl Regressor for LinearRegressor {
    fn predict(&self, features: &MlFeatures) -> Result<f64> {
        let x = DVector::from_row_slice(&features.to_array());
        let raw = self.intercept + self.coefficients.dot(&x);
        if !raw.is_finite() {
            return Err(EstimateError::Model(format!("non-finite prediction {raw}")));
        }
        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Measurements, Sex, SubjectProfile};
    use std::io::Write;

    fn features(sex: Sex) -> MlFeatures {
        let profile = SubjectProfile {
            age: 30,
            weight_kg: 80.0,
            height_cm: 180.0,
            sex,
        };
        MlFeatures::build(&profile, &Measurements::new(0.42, 0.32, 0.25, 0.5))
    }

    #[test]
    fn linear_prediction_is_dot_product() {
        // only the BMI coefficient is non-zero: 2 + 24.69
        let mut coef = [0.0; FEATURE_COUNT];
        coef[1] = 1.0;
        let model = LinearRegressor::new(2.0, &coef).unwrap();
        let bf = model.predict(&features(Sex::Male)).unwrap();
        assert!((bf - 26.69).abs() < 1e-9);
    }

    #[test]
    fn prediction_is_not_bounded() {
        let model = LinearRegressor::new(-3.0, &[0.0; FEATURE_COUNT]).unwrap();
        assert_eq!(model.predict(&features(Sex::Female)).unwrap(), -3.0);
    }

    #[test]
    fn wrong_coefficient_count_is_rejected() {
        let err = LinearRegressor::new(1.0, &[0.1, 0.2]).unwrap_err();
        assert!(matches!(err, EstimateError::Model(_)));
    }

    #[test]
    fn loads_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"intercept": 20.0, "coefficients": [0,0,0,0,0,0,0,0,0]}}"#
        )
        .unwrap();
        let model = LinearRegressor::from_file(file.path()).unwrap();
        assert_eq!(model.predict(&features(Sex::Male)).unwrap(), 20.0);

        let missing = LinearRegressor::from_file(Path::new("/nonexistent/model.json"));
        assert!(missing.is_err());
    }
}
