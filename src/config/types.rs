//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/forecastai/) and project (.forecastai/) level
//! configuration.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

use crate::constants::{network, retry, upload};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Remote analysis service settings
    pub service: ServiceConfig,

    /// Profiling retry policy
    pub retry: RetryConfig,

    /// Durable storage settings
    pub storage: StorageConfig,

    /// Upload stage settings
    pub upload: UploadConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            service: ServiceConfig::default(),
            retry: RetryConfig::default(),
            storage: StorageConfig::default(),
            upload: UploadConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `ForecastError::Config` on validation failure.
    pub fn validate(&self) -> crate::types::Result<()> {
        Url::parse(&self.service.base_url).map_err(|e| {
            crate::types::ForecastError::Config(format!(
                "service.base_url '{}' is not a valid URL: {}",
                self.service.base_url, e
            ))
        })?;

        if self.service.timeout_secs == 0 {
            return Err(crate::types::ForecastError::Config(
                "service.timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.retry.max_attempts == 0 {
            return Err(crate::types::ForecastError::Config(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }

        if self.retry.backoff_factor < 1.0 {
            return Err(crate::types::ForecastError::Config(format!(
                "retry.backoff_factor must be >= 1.0, got {}",
                self.retry.backoff_factor
            )));
        }

        if self.upload.sample_rows == 0 {
            return Err(crate::types::ForecastError::Config(
                "upload.sample_rows must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Service Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL of the analysis service
    pub base_url: String,

    /// Optional bearer token for the service; prefer the
    /// FORECASTAI_SERVICE__API_TOKEN env var over committing it to a file.
    /// Serialized output only ever shows a redaction marker.
    #[serde(
        serialize_with = "serialize_redacted",
        skip_serializing_if = "Option::is_none"
    )]
    pub api_token: Option<SecretString>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

fn serialize_redacted<S>(
    token: &Option<SecretString>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match token {
        Some(_) => serializer.serialize_some("[REDACTED]"),
        None => serializer.serialize_none(),
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: network::DEFAULT_BASE_URL.to_string(),
            api_token: None,
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
        }
    }
}

// =============================================================================
// Retry Configuration
// =============================================================================

/// Retry policy for session-not-found failures during profiling.
///
/// Delay before retry N (1-based) is `base_delay_ms * backoff_factor^(N-1)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts including the first
    pub max_attempts: usize,
    pub base_delay_ms: u64,
    pub backoff_factor: f32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: retry::MAX_ATTEMPTS,
            base_delay_ms: retry::BASE_DELAY_MS,
            backoff_factor: retry::BACKOFF_FACTOR,
        }
    }
}

// =============================================================================
// Storage Configuration
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Override for the durable data directory; defaults to the platform
    /// data dir (e.g. ~/.local/share/forecastai)
    pub data_dir: Option<PathBuf>,
}

impl StorageConfig {
    /// Resolve the durable data directory
    pub fn resolve_data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        directories::ProjectDirs::from("", "", "forecastai")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".forecastai"))
    }
}

// =============================================================================
// Upload Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Rows kept as the local preview sample
    pub sample_rows: usize,

    /// Whether the remote preprocessing endpoint is wired; when false the
    /// preprocess stage synthesizes a local log instead of calling out
    pub preprocess_remote: bool,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            sample_rows: upload::MAX_SAMPLE_ROWS,
            preprocess_remote: true,
        }
    }
}
