//! Bounded retry for idempotent reads
//!
//! Writes are never retried here: the caller owns retry semantics for
//! writes, and a retried append is an accepted duplicate-message risk.

use std::future::Future;
use std::time::Duration;

use crate::error::Result;

/// Retry policy for idempotent read paths
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Initial retry interval
    pub initial_interval: Duration,
    /// Backoff coefficient (multiplier for each retry)
    pub backoff_coefficient: f64,
    /// Maximum retry interval
    pub maximum_interval: Duration,
    /// Maximum number of attempts (minimum 1)
    pub maximum_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(50),
            backoff_coefficient: 2.0,
            maximum_interval: Duration::from_secs(2),
            maximum_attempts: 3,
        }
    }
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// No retries - fail immediately
    pub fn no_retry() -> Self {
        Self {
            maximum_attempts: 1,
            ..Default::default()
        }
    }

    pub fn with_maximum_attempts(mut self, attempts: u32) -> Self {
        self.maximum_attempts = attempts.max(1);
        self
    }

    fn interval_for(&self, attempt: u32) -> Duration {
        let factor = self.backoff_coefficient.powi(attempt as i32);
        let millis = self.initial_interval.as_millis() as f64 * factor;
        Duration::from_millis(millis as u64).min(self.maximum_interval)
    }
}

/// Run an idempotent read, retrying transient failures per the policy.
///
/// Only `BazaarError::Unavailable` is retried; terminal client errors
/// (invalid argument, forbidden, not found) propagate immediately.
pub async fn with_read_retries<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt + 1 < policy.maximum_attempts.max(1) => {
                tracing::debug!(attempt, error = %err, "Transient read failure, retrying");
                tokio::time::sleep(policy.interval_for(attempt)).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
