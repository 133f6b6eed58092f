//! Analysis Service Wire Types
//!
//! Shapes exchanged with the remote analysis service. Deserialization is
//! tolerant: unknown fields are ignored so the client keeps working as the
//! backend grows its responses.

use serde::{Deserialize, Serialize};

use crate::types::session::Row;

// =============================================================================
// Upload
// =============================================================================

/// Response from `POST /api/analysis/upload`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub session_id: String,
    #[serde(default)]
    pub sample_data: Vec<Row>,
}

// =============================================================================
// Profile
// =============================================================================

/// Row/column counts reported by the profiling endpoint
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Dimensions {
    pub rows: u64,
    pub columns: u64,
}

/// Dataset statistics returned by `POST /api/analysis/profile/{session_id}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetProfile {
    pub dimensions: Dimensions,
    /// Inferred type per column, when the service reports them
    #[serde(default)]
    pub column_types: std::collections::BTreeMap<String, String>,
    /// Missing-value count per column, when reported
    #[serde(default)]
    pub missing_values: std::collections::BTreeMap<String, u64>,
}

// =============================================================================
// Preprocess
// =============================================================================

/// One transformation applied (or recorded) during preprocessing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessStep {
    pub name: String,
    #[serde(default)]
    pub detail: String,
}

impl PreprocessStep {
    pub fn new(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            detail: detail.into(),
        }
    }
}

/// Ordered transformation log, remote or locally synthesized
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessLog {
    pub steps: Vec<PreprocessStep>,
    /// True when the log was synthesized locally because the remote stage
    /// was not wired
    pub synthesized: bool,
}

// =============================================================================
// Train
// =============================================================================

/// Forecast series produced by training
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Forecast {
    pub predictions: Vec<f64>,
    #[serde(default)]
    pub dates: Vec<String>,
}

/// Quality metrics reported alongside the forecast
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metrics {
    /// Mean absolute percentage error
    #[serde(default)]
    pub mape: Option<f64>,
    #[serde(default)]
    pub rmse: Option<f64>,
    #[serde(default)]
    pub mae: Option<f64>,
    #[serde(default)]
    pub r2: Option<f64>,
}

/// Final result of `POST /api/analysis/train/{session_id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingResult {
    pub forecast: Forecast,
    #[serde(default)]
    pub metrics: Metrics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_response_tolerates_missing_sample() {
        let resp: UploadResponse = serde_json::from_str(r#"{"session_id":"abc123"}"#).unwrap();
        assert_eq!(resp.session_id, "abc123");
        assert!(resp.sample_data.is_empty());
    }

    #[test]
    fn test_profile_ignores_unknown_fields() {
        let json = r#"{
            "dimensions": {"rows": 3, "columns": 2},
            "column_types": {"date": "datetime", "sales": "numeric"},
            "skew": {"sales": 0.4}
        }"#;
        let profile: DatasetProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.dimensions.rows, 3);
        assert_eq!(profile.dimensions.columns, 2);
        assert_eq!(profile.column_types["sales"], "numeric");
    }

    #[test]
    fn test_training_result_minimal_shape() {
        let json = r#"{"forecast":{"predictions":[1.0,2.0,3.0]},"metrics":{"mape":5.0}}"#;
        let result: TrainingResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.forecast.predictions, vec![1.0, 2.0, 3.0]);
        assert_eq!(result.metrics.mape, Some(5.0));
        assert!(result.metrics.rmse.is_none());
    }
}
