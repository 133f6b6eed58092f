//! HTTP Analysis Client
//!
//! Reqwest-backed implementation of the analysis service contract.
//! Non-success responses are classified by status so the retry policy can
//! distinguish a missing session from terminal failures.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{debug, info};

use super::AnalysisApi;
use crate::config::ServiceConfig;
use crate::types::{
    ApiError, ColumnMapping, DatasetProfile, ForecastError, PreprocessStep, Result, TrainingResult,
    UploadResponse,
};

/// Analysis service client with secure token handling
pub struct HttpAnalysisClient {
    base_url: String,
    /// Bearer token stored securely - never exposed in logs or debug output
    api_token: Option<SecretString>,
    client: reqwest::Client,
}

impl std::fmt::Debug for HttpAnalysisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpAnalysisClient")
            .field("base_url", &self.base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[derive(Serialize)]
struct ProfileRequest<'a> {
    target_col: &'a str,
    date_col: &'a str,
}

#[derive(Serialize)]
struct PreprocessRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    total_rows: Option<u64>,
}

impl HttpAnalysisClient {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                ForecastError::Config(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_token {
            Some(token) => builder.header(
                "Authorization",
                format!("Bearer {}", token.expose_secret()),
            ),
            None => builder,
        }
    }

    /// Send a request, classifying transport failures and non-success
    /// statuses for the given endpoint name.
    async fn send(
        &self,
        builder: reqwest::RequestBuilder,
        endpoint: &str,
    ) -> Result<reqwest::Response> {
        let response = self
            .request(builder)
            .send()
            .await
            .map_err(|e| ApiError::network(e.to_string(), endpoint))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                status.to_string()
            } else {
                body
            };
            return Err(ApiError::from_status(status.as_u16(), message, endpoint).into());
        }

        Ok(response)
    }
}

#[async_trait]
impl AnalysisApi for HttpAnalysisClient {
    async fn upload(
        &self,
        file_name: &str,
        csv: Vec<u8>,
        mapping: &ColumnMapping,
    ) -> Result<UploadResponse> {
        info!(file = file_name, "Uploading dataset");

        let part = multipart::Part::bytes(csv)
            .file_name(file_name.to_string())
            .mime_str("text/csv")
            .map_err(|e| ForecastError::Input(format!("invalid upload payload: {}", e)))?;
        let form = multipart::Form::new()
            .part("file", part)
            .text("target_col", mapping.target_col.clone())
            .text("date_col", mapping.date_col.clone());

        let builder = self
            .client
            .post(self.url("/api/analysis/upload"))
            .multipart(form);
        let response = self.send(builder, "upload").await?;

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| ApiError::network(format!("malformed upload response: {}", e), "upload"))?;

        if body.session_id.trim().is_empty() {
            return Err(ForecastError::Session(
                "upload succeeded but the service returned an empty session id".to_string(),
            ));
        }

        debug!(session_id = %body.session_id, sample_rows = body.sample_data.len(), "Upload accepted");
        Ok(body)
    }

    async fn profile(&self, session_id: &str, mapping: &ColumnMapping) -> Result<DatasetProfile> {
        debug!(session_id, "Requesting dataset profile");

        let builder = self
            .client
            .post(self.url(&format!("/api/analysis/profile/{}", session_id)))
            .json(&ProfileRequest {
                target_col: &mapping.target_col,
                date_col: &mapping.date_col,
            });
        let response = self.send(builder, "profile").await?;

        response.json().await.map_err(|e| {
            ApiError::network(format!("malformed profile response: {}", e), "profile").into()
        })
    }

    async fn preprocess(
        &self,
        session_id: &str,
        row_hint: Option<u64>,
    ) -> Result<Vec<PreprocessStep>> {
        debug!(session_id, ?row_hint, "Requesting preprocess log");

        let builder = self
            .client
            .post(self.url(&format!("/api/analysis/preprocess/{}", session_id)))
            .json(&PreprocessRequest {
                total_rows: row_hint,
            });
        let response = self.send(builder, "preprocess").await?;

        response.json().await.map_err(|e| {
            ApiError::network(format!("malformed preprocess response: {}", e), "preprocess").into()
        })
    }

    async fn train(&self, session_id: &str, mapping: &ColumnMapping) -> Result<TrainingResult> {
        info!(session_id, "Requesting model training");

        let builder = self
            .client
            .post(self.url(&format!("/api/analysis/train/{}", session_id)))
            .json(&ProfileRequest {
                target_col: &mapping.target_col,
                date_col: &mapping.date_col,
            });
        let response = self.send(builder, "train").await?;

        response.json().await.map_err(|e| {
            ApiError::network(format!("malformed train response: {}", e), "train").into()
        })
    }
}
