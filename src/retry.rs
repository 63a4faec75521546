//! Reusable retry-with-backoff policy
//!
//! Every outbound call that can transiently fail (embedding provider, corpus
//! store upsert) goes through one of these policies instead of an ad hoc
//! retry loop at the call site.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::errors::CounselRagError;
use crate::errors::Result;

/// Exponential-backoff retry policy
///
/// Delays double on each attempt starting from `base_delay`, capped at
/// `max_delay`.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub const fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay,
        }
    }

    /// Policy for embedding provider calls: 3 attempts, 1s base delay
    #[must_use]
    pub const fn embedding() -> Self {
        Self::new(3, Duration::from_secs(1), Duration::from_secs(8))
    }

    /// Policy for corpus upserts during ingestion: 5 attempts, capped at 30s
    #[must_use]
    pub const fn ingestion_upsert() -> Self {
        Self::new(5, Duration::from_secs(1), Duration::from_secs(30))
    }

    /// Delay before the given retry (1-based attempt that just failed)
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2_u32.saturating_pow(attempt.saturating_sub(1));
        let delay = self.base_delay.saturating_mul(factor);
        delay.min(self.max_delay)
    }

    /// Run `operation` until it succeeds or attempts are exhausted
    ///
    /// # Errors
    /// Returns `CounselRagError::RetryExhausted` wrapping the last failure
    /// once `max_attempts` calls have failed.
    pub async fn run<T, F, Fut>(&self, op_name: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= self.max_attempts => {
                    return Err(CounselRagError::RetryExhausted {
                        attempts: attempt,
                        message: format!("{op_name}: {e}"),
                    });
                }
                Err(e) => {
                    let delay = self.delay_for_attempt(attempt);
                    warn!(
                        "{} failed (attempt {}/{}), retrying in {:?}: {}",
                        op_name, attempt, self.max_attempts, delay, e
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
