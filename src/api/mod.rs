//! Analysis Service Abstraction
//!
//! The remote forecasting service is consumed only through this trait; the
//! pipeline controller never sees HTTP details. `HttpAnalysisClient` is the
//! production implementation, tests substitute mocks.

mod client;
mod retry;

use std::sync::Arc;

use async_trait::async_trait;

use crate::types::{
    ColumnMapping, DatasetProfile, PreprocessStep, Result, TrainingResult, UploadResponse,
};

pub use client::HttpAnalysisClient;
pub use retry::{retry_policy, with_session_retry};

/// HTTP contract of the remote analysis service
#[async_trait]
pub trait AnalysisApi: Send + Sync {
    /// `POST /api/analysis/upload`: multipart form, field `file`.
    /// Mints a session for the dataset and returns a small sample.
    async fn upload(
        &self,
        file_name: &str,
        csv: Vec<u8>,
        mapping: &ColumnMapping,
    ) -> Result<UploadResponse>;

    /// `POST /api/analysis/profile/{session_id}`: dataset statistics for
    /// the mapped columns.
    async fn profile(&self, session_id: &str, mapping: &ColumnMapping) -> Result<DatasetProfile>;

    /// `POST /api/analysis/preprocess/{session_id}`: transformation log.
    async fn preprocess(
        &self,
        session_id: &str,
        row_hint: Option<u64>,
    ) -> Result<Vec<PreprocessStep>>;

    /// `POST /api/analysis/train/{session_id}`: model fitting; returns the
    /// final forecast and metrics.
    async fn train(&self, session_id: &str, mapping: &ColumnMapping) -> Result<TrainingResult>;
}

/// Shared service handle for the controller and CLI
pub type SharedApi = Arc<dyn AnalysisApi>;
