//! Session Retry Policy
//!
//! A freshly minted session can take a moment to become visible to the
//! profiling endpoint, so "session not found" is treated as transient and
//! retried with exponential backoff. Every other failure terminates
//! immediately. The policy lives in `RetryConfig` rather than as scattered
//! literals; defaults are 3 attempts with 500ms then 1000ms delays.

use std::future::Future;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use tracing::warn;

use crate::config::RetryConfig;
use crate::types::{ForecastError, Result};

/// Build the backoff schedule from a retry configuration.
///
/// `max_times` counts retries after the first attempt, so total attempts are
/// `max_attempts`. Jitter is off: the schedule is part of the contract.
pub fn retry_policy(config: &RetryConfig) -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(config.base_delay_ms))
        .with_factor(config.backoff_factor)
        .with_max_times(config.max_attempts.saturating_sub(1))
}

/// Run an operation, retrying only session-not-found failures.
pub async fn with_session_retry<T, F, Fut>(
    config: &RetryConfig,
    operation: &'static str,
    op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    op.retry(retry_policy(config))
        .when(ForecastError::is_session_not_found)
        .notify(|err: &ForecastError, delay: Duration| {
            warn!(
                operation,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Session not found yet, retrying"
            );
        })
        .await
}
