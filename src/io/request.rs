//! Estimation request JSON.
//!
//! A request bundles what the upstream collaborators produce for one subject:
//! the profile, the landmark measurements, the texture signals (optional) and
//! a precomputed ML estimate (optional). Batch files are a JSON array of
//! requests.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{Measurements, SubjectProfile, TextureSignals};
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateRequest {
    #[serde(default)]
    pub id: Option<String>,
    pub subject: SubjectProfile,
    pub measurements: Measurements,
    /// Missing texture analysis falls back to `TextureSignals::fallback()`.
    #[serde(default)]
    pub texture: Option<TextureSignals>,
    /// Precomputed regression estimate. A loaded model takes precedence.
    #[serde(default)]
    pub ml_estimate: Option<f64>,
}

impl EstimateRequest {
    /// Id used in reports: the request id or its position in a batch.
    pub fn label(&self, index: usize) -> String {
        self.id.clone().unwrap_or_else(|| format!("#{}", index + 1))
    }
}

fn open(path: &Path) -> Result<File, AppError> {
    File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open request JSON '{}': {e}", path.display())))
}

/// Read a single request.
pub fn read_request(path: &Path) -> Result<EstimateRequest, AppError> {
    serde_json::from_reader(open(path)?)
        .map_err(|e| AppError::new(2, format!("Invalid request JSON: {e}")))
}

/// Read a batch (a JSON array of requests).
pub fn read_batch(path: &Path) -> Result<Vec<EstimateRequest>, AppError> {
    let batch: Vec<EstimateRequest> = serde_json::from_reader(open(path)?)
        .map_err(|e| AppError::new(2, format!("Invalid batch JSON: {e}")))?;
    if batch.is_empty() {
        return Err(AppError::new(2, "Batch JSON contains no requests."));
    }
    Ok(batch)
}
