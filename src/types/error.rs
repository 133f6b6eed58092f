//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//! Provides error classification for the profiling retry policy and
//! for deciding which failures surface as blocking alerts.
//!
//! ## Error Categories
//!
//! - **SessionNotFound**: the remote service does not know the session yet
//!   (the only category the retry budget covers)
//! - **Transient**: 5xx-class server issues
//! - **Auth / BadRequest**: fail fast, fix the request
//! - **Network**: connectivity issues
//!
//! ## Design Principles
//!
//! - Single unified error type (ForecastError) for the entire application
//! - Structured API errors with category-based routing
//! - No panic/unwrap - all errors are recoverable

use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// Categories for remote analysis-service failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Session unknown to the remote service (HTTP 404-equivalent)
    SessionNotFound,
    /// Temporary server issues (5xx)
    Transient,
    /// Authentication failed - fail fast, don't retry
    Auth,
    /// Invalid request - don't retry, fix request
    BadRequest,
    /// Network/connectivity issues
    Network,
    /// Service endpoint not wired or disabled
    Unavailable,
    /// Unknown error
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SessionNotFound => write!(f, "SESSION_NOT_FOUND"),
            Self::Transient => write!(f, "TRANSIENT"),
            Self::Auth => write!(f, "AUTH"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::Network => write!(f, "NETWORK"),
            Self::Unavailable => write!(f, "UNAVAILABLE"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl ErrorCategory {
    /// Whether the profiling retry budget covers this category.
    ///
    /// The pipeline retries only when the session was not found remotely;
    /// every other failure type terminates immediately.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::SessionNotFound)
    }
}

// =============================================================================
// API Error
// =============================================================================

/// Structured analysis-service error with category and request context
#[derive(Debug, Clone)]
pub struct ApiError {
    /// Error category for retry routing
    pub category: ErrorCategory,
    /// Detailed error message
    pub message: String,
    /// HTTP status, when the failure came from a response
    pub status: Option<u16>,
    /// Endpoint that produced the error
    pub endpoint: Option<String>,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.endpoint, self.status) {
            (Some(ep), Some(code)) => {
                write!(f, "[{}:{} {}] {}", ep, code, self.category, self.message)
            }
            (Some(ep), None) => write!(f, "[{}:{}] {}", ep, self.category, self.message),
            _ => write!(f, "[{}] {}", self.category, self.message),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Create a new API error
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            status: None,
            endpoint: None,
        }
    }

    /// Add endpoint context
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Classify an HTTP status code into an API error
    pub fn from_status(status: u16, message: impl Into<String>, endpoint: impl Into<String>) -> Self {
        let category = match status {
            404 => ErrorCategory::SessionNotFound,
            401 | 403 => ErrorCategory::Auth,
            400 | 422 => ErrorCategory::BadRequest,
            500..=599 => ErrorCategory::Transient,
            _ => ErrorCategory::Unknown,
        };
        Self {
            category,
            message: message.into(),
            status: Some(status),
            endpoint: Some(endpoint.into()),
        }
    }

    /// Wrap a transport-level failure (no response received)
    pub fn network(message: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Network, message).endpoint(endpoint)
    }

    pub fn is_retryable(&self) -> bool {
        self.category.is_retryable()
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum ForecastError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // -------------------------------------------------------------------------
    // Remote Service Errors
    // -------------------------------------------------------------------------
    /// Structured analysis-service error with category
    #[error("Analysis service error: {0}")]
    Api(ApiError),

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    /// Local input validation failure; never triggers a network call
    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    /// Pipeline stage failure with recovery context
    #[error("Pipeline error in stage {stage}: {message}")]
    Pipeline {
        stage: &'static str,
        message: String,
        recoverable: bool,
    },
}

impl From<ApiError> for ForecastError {
    fn from(err: ApiError) -> Self {
        ForecastError::Api(err)
    }
}

pub type Result<T> = std::result::Result<T, ForecastError>;

// =============================================================================
// Helper Functions
// =============================================================================

impl ForecastError {
    /// Create an input validation error
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input(message.into())
    }

    /// Create a pipeline error
    pub fn pipeline(stage: &'static str, message: impl Into<String>) -> Self {
        Self::Pipeline {
            stage,
            message: message.into(),
            recoverable: false,
        }
    }

    /// Create a recoverable pipeline error
    pub fn pipeline_recoverable(stage: &'static str, message: impl Into<String>) -> Self {
        Self::Pipeline {
            stage,
            message: message.into(),
            recoverable: true,
        }
    }

    /// Whether this failure indicates the remote session is missing.
    ///
    /// Drives the profiling retry policy: only these errors are retried.
    pub fn is_session_not_found(&self) -> bool {
        matches!(self, Self::Api(e) if e.category == ErrorCategory::SessionNotFound)
    }

    /// Check if this error is recoverable (the user can retry the action)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Api(e) => e.is_retryable(),
            Self::Pipeline { recoverable, .. } => *recoverable,
            Self::Input(_) => true,
            _ => false,
        }
    }
}

/// Context extension trait for adding context to storage-layer errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn with_context<C: Into<String>>(self, context: C) -> Result<T>;
}

impl<T, E: std::error::Error + Send + Sync + 'static> ResultExt<T> for std::result::Result<T, E> {
    fn with_context<C: Into<String>>(self, context: C) -> Result<T> {
        self.map_err(|e| ForecastError::Storage(format!("{}: {}", context.into(), e)))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::SessionNotFound.to_string(), "SESSION_NOT_FOUND");
        assert_eq!(ErrorCategory::Transient.to_string(), "TRANSIENT");
        assert_eq!(ErrorCategory::Auth.to_string(), "AUTH");
    }

    #[test]
    fn test_only_session_not_found_is_retryable() {
        assert!(ErrorCategory::SessionNotFound.is_retryable());
        assert!(!ErrorCategory::Transient.is_retryable());
        assert!(!ErrorCategory::Network.is_retryable());
        assert!(!ErrorCategory::Auth.is_retryable());
        assert!(!ErrorCategory::BadRequest.is_retryable());
    }

    #[test]
    fn test_classify_status() {
        let missing = ApiError::from_status(404, "session not found", "profile");
        assert_eq!(missing.category, ErrorCategory::SessionNotFound);
        assert!(missing.is_retryable());

        let auth = ApiError::from_status(401, "unauthorized", "upload");
        assert_eq!(auth.category, ErrorCategory::Auth);

        let bad = ApiError::from_status(422, "bad mapping", "profile");
        assert_eq!(bad.category, ErrorCategory::BadRequest);

        let server = ApiError::from_status(503, "overloaded", "train");
        assert_eq!(server.category, ErrorCategory::Transient);
        assert!(!server.is_retryable());
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::from_status(404, "no such session", "profile");
        assert_eq!(
            err.to_string(),
            "[profile:404 SESSION_NOT_FOUND] no such session"
        );

        let net = ApiError::network("connection refused", "upload");
        assert_eq!(net.to_string(), "[upload:NETWORK] connection refused");
    }

    #[test]
    fn test_is_session_not_found() {
        let err: ForecastError = ApiError::from_status(404, "missing", "profile").into();
        assert!(err.is_session_not_found());

        let other: ForecastError = ApiError::from_status(500, "boom", "profile").into();
        assert!(!other.is_session_not_found());

        assert!(!ForecastError::input("bad header").is_session_not_found());
    }

    #[test]
    fn test_with_context_wraps_as_storage_error() {
        let failed: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::other("disk full"));

        let err = failed.with_context("persist flow state").unwrap_err();
        assert!(matches!(err, ForecastError::Storage(_)));
        assert!(err.to_string().contains("persist flow state"));
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_recoverable() {
        assert!(ForecastError::input("empty file").is_recoverable());
        assert!(ForecastError::pipeline_recoverable("Profile", "retry later").is_recoverable());
        assert!(!ForecastError::pipeline("Train", "fatal").is_recoverable());
    }
}
