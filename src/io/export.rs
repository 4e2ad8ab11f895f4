//! Export pipeline outputs to JSON.
//!
//! Each record is stamped with the export time (UTC) so files from different
//! runs can be told apart.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::AppError;

#[derive(Debug, Clone, Serialize)]
pub struct ExportRecord<'a, T: Serialize> {
    pub tool: &'static str,
    pub id: Option<&'a str>,
    pub exported_at: DateTime<Utc>,
    pub output: &'a T,
}

impl<'a, T: Serialize> ExportRecord<'a, T> {
    pub fn new(id: Option<&'a str>, output: &'a T) -> Self {
        Self::at(id, output, Utc::now())
    }

    pub fn at(id: Option<&'a str>, output: &'a T, exported_at: DateTime<Utc>) -> Self {
        Self {
            tool: "bfe",
            id,
            exported_at,
            output,
        }
    }
}

/// Write any serializable export (a record or a list of records).
pub fn write_export_json<T: Serialize>(path: &Path, export: &T) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, export)
        .map_err(|e| AppError::new(2, format!("Failed to write export JSON: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn record_carries_id_and_timestamp() {
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let output = serde_json::json!({"final_prediction": 18.0});
        let record = ExportRecord::at(Some("s1"), &output, at);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_export_json(&path, &record).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["tool"], "bfe");
        assert_eq!(value["id"], "s1");
        assert_eq!(value["exported_at"], "2026-01-02T03:04:05Z");
        assert_eq!(value["output"]["final_prediction"], 18.0);
    }

    #[test]
    fn unwritable_path_is_an_input_error() {
        let output = serde_json::json!({});
        let record = ExportRecord::new(None, &output);
        let err = write_export_json(Path::new("/nonexistent/dir/out.json"), &record).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
