//! Exponential backoff for throttled requests.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use storyforge_error::RetryableError;
use tokio_retry2::{Retry, RetryError};
use tracing::{debug, warn};

/// Retries an operation while it fails with a throttling signal.
///
/// The first retry waits `initial_delay`, and each further retry doubles
/// the wait, up to `max_retries` retries. Errors that are not throttling
/// propagate immediately without a retry, including transient server
/// errors, which are only logged more loudly.
///
/// # Example
///
/// ```rust,ignore
/// let retry = ThrottleRetry::default();
/// let image = retry.run(|| driver.generate(&request)).await?;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_getters::Getters)]
pub struct ThrottleRetry {
    /// Number of retries after the first attempt.
    max_retries: usize,
    /// Wait before the first retry.
    initial_delay: Duration,
}

impl Default for ThrottleRetry {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(2000))
    }
}

impl ThrottleRetry {
    /// Create a retry wrapper with the given budget.
    pub fn new(max_retries: usize, initial_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
        }
    }

    /// The waits before each retry, in order.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + use<> {
        let initial = self.initial_delay;
        (0..self.max_retries).map(move |n| {
            let factor = u32::try_from(n)
                .ok()
                .and_then(|n| 1u32.checked_shl(n))
                .unwrap_or(u32::MAX);
            initial.saturating_mul(factor)
        })
    }

    /// Run `operation`, retrying throttled failures with backoff.
    ///
    /// The operation is invoked once per attempt, so it must build a fresh
    /// future each time.
    pub async fn run<F, Fut, R, E>(&self, mut operation: F) -> Result<R, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<R, E>>,
        E: RetryableError + Display,
    {
        let mut attempt = 0usize;
        let max_retries = self.max_retries;

        Retry::spawn(self.delays(), || {
            attempt += 1;
            let current = attempt;
            let fut = operation();
            async move {
                match fut.await {
                    Ok(value) => {
                        if current > 1 {
                            debug!(attempt = current, "Request succeeded after retry");
                        }
                        Ok(value)
                    }
                    Err(e) if e.is_throttled() => {
                        warn!(
                            attempt = current,
                            max_retries,
                            error = %e,
                            "Request throttled, backing off"
                        );
                        Err(RetryError::Transient {
                            err: e,
                            retry_after: None,
                        })
                    }
                    Err(e) if e.is_retryable() => {
                        warn!(attempt = current, error = %e, "Transient error, not retrying");
                        Err(RetryError::Permanent(e))
                    }
                    Err(e) => {
                        debug!(attempt = current, error = %e, "Permanent error, not retrying");
                        Err(RetryError::Permanent(e))
                    }
                }
            }
        })
        .await
    }
}
