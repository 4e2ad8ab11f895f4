//! Error types.
//!
//! - `EstimateError` is the typed error of the estimation core. It only covers
//!   invalid upstream signals and regressor failures; physiologically odd
//!   estimates are corrected, never reported as errors.
//! - `AppError` is the process-level error used by the `bfe` binary. It carries
//!   the exit code the binary should terminate with.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimateError {
    #[error("Division by zero: '{field}' is zero or missing")]
    Division { field: &'static str },

    #[error("Invalid measurement '{field}': {value} (must be finite and > 0)")]
    InvalidMeasurement { field: &'static str, value: f64 },

    #[error("Invalid texture signal '{field}': {value} (must be within [0, 1])")]
    InvalidSignal { field: &'static str, value: f64 },

    #[error("Invalid subject profile: {0}")]
    InvalidProfile(String),

    #[error("Invalid BMI: {0}")]
    InvalidBmi(f64),

    #[error("Invalid noise amplitude: {0} (must be within [0, 5])")]
    InvalidNoise(f64),

    #[error("Regression model error: {0}")]
    Model(String),
}

pub type Result<T> = std::result::Result<T, EstimateError>;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<EstimateError> for AppError {
    fn from(err: EstimateError) -> Self {
        let exit_code = match err {
            EstimateError::Model(_) => 4,
            _ => 2,
        };
        AppError::new(exit_code, err.to_string())
    }
}
