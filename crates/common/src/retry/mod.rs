//! Retry policy for fallible I/O calls
//!
//! A [`RetryPolicy`] bounds the number of attempts, decides which errors are
//! worth another attempt and spaces attempts with exponential backoff. On
//! exhaustion the caller either gets the last error back ([`RetryPolicy::run`])
//! or a logged `None` ([`RetryPolicy::run_or_skip`]).

use crate::errors::{AppError, Result};
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// Attempts made by the pipeline for page fetches and model calls
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Retry policy applied around a single operation
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_interval: Duration,
    max_interval: Duration,
    retry_on: fn(&AppError) -> bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_interval: Duration::from_millis(200),
            max_interval: Duration::from_secs(2),
            retry_on: AppError::is_retryable,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Retry immediately, without sleeping between attempts
    pub fn without_delay(mut self) -> Self {
        self.initial_interval = Duration::ZERO;
        self.max_interval = Duration::ZERO;
        self
    }

    /// Restrict which errors qualify for another attempt
    pub fn retry_on(mut self, predicate: fn(&AppError) -> bool) -> Self {
        self.retry_on = predicate;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_interval)
            .with_max_interval(self.max_interval)
            .with_max_elapsed_time(None)
            .build()
    }

    /// Run `op` until it succeeds or attempts run out, returning the last error
    pub async fn run<T, F, Fut>(&self, operation: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let attempt = AtomicU32::new(0);
        let max_attempts = self.max_attempts;
        let retry_on = self.retry_on;

        backoff::future::retry(self.backoff(), || {
            let current = attempt.fetch_add(1, Ordering::Relaxed) + 1;
            let fut = op();
            async move {
                fut.await.map_err(|err| {
                    if current >= max_attempts || !retry_on(&err) {
                        backoff::Error::permanent(err)
                    } else {
                        tracing::warn!(
                            operation,
                            attempt = current,
                            max_attempts,
                            error = %err,
                            "Attempt failed, retrying"
                        );
                        backoff::Error::transient(err)
                    }
                })
            }
        })
        .await
    }

    /// Run `op` like [`RetryPolicy::run`], logging and discarding the final error
    pub async fn run_or_skip<T, F, Fut>(&self, operation: &str, op: F) -> Option<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        match self.run(operation, op).await {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::error!(operation, error = %err, "Giving up after retries");
                None
            }
        }
    }
}
