//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Retry policy constants for the profiling client
pub mod retry {
    /// Total attempts, including the first one
    pub const MAX_ATTEMPTS: usize = 3;

    /// Base delay before the first retry (milliseconds)
    pub const BASE_DELAY_MS: u64 = 500;

    /// Backoff multiplier between retries
    pub const BACKOFF_FACTOR: f32 = 2.0;
}

/// Upload stage constants
pub mod upload {
    /// Fallback column name used when no date column is mapped
    pub const DEFAULT_DATE_COLUMN: &str = "date";

    /// Maximum rows kept as the local preview sample
    pub const MAX_SAMPLE_ROWS: usize = 20;
}

/// HTTP/Network constants
pub mod network {
    /// Default request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

    /// Default analysis service base URL
    pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
}

/// Persisted state layout
pub mod storage {
    /// File name of the durable flow database
    pub const FLOW_DB_FILE: &str = "flow.db";

    /// Durable key holding the full flow state
    pub const FLOW_KEY: &str = "forecastai_flow";

    /// Ephemeral key holding the bare session identifier
    pub const SESSION_KEY: &str = "currentSessionId";
}

/// Idempotency keys for one-shot pipeline operations
pub mod guard {
    /// Key guarding the session repair procedure against duplicate runs
    pub const REPAIR_SESSION: &str = "repair-session";
}
