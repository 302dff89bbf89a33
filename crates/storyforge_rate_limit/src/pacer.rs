//! Pauses between consecutive requests of a sequential batch.
//!
//! A batch holds one request in flight at a time and issues them in
//! order. The pacer only decides how long to wait before the next one.

use crate::limiter::DirectRateLimiter;
use governor::{Quota, RateLimiter as GovernorRateLimiter};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use storyforge_error::{ConfigError, StoryforgeResult};
use tracing::{debug, trace};

/// Pacing strategy names as they appear in configuration.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum PacingMode {
    /// Fixed pause between requests
    #[default]
    #[display("fixed")]
    Fixed,
    /// Token bucket with a sustained per-minute rate
    #[display("token_bucket")]
    TokenBucket,
    /// No pause at all
    #[display("immediate")]
    Immediate,
}

/// Decides when the next request of a batch may start.
#[derive(Clone)]
pub enum RequestPacer {
    /// Requests start back to back.
    Immediate,
    /// A fixed pause between the end of one request and the start of the next.
    Fixed(Duration),
    /// A GCRA token bucket allowing `per_minute` requests with a burst of one.
    TokenBucket {
        /// Sustained rate
        per_minute: NonZeroU32,
        /// Shared bucket state
        limiter: Arc<DirectRateLimiter>,
    },
}

impl std::fmt::Debug for RequestPacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Immediate => write!(f, "Immediate"),
            Self::Fixed(delay) => f.debug_tuple("Fixed").field(delay).finish(),
            Self::TokenBucket { per_minute, .. } => f
                .debug_struct("TokenBucket")
                .field("per_minute", per_minute)
                .finish_non_exhaustive(),
        }
    }
}

impl Default for RequestPacer {
    fn default() -> Self {
        Self::Fixed(Duration::from_millis(4000))
    }
}

impl RequestPacer {
    /// Pacer with a fixed pause between requests.
    pub fn fixed(delay: Duration) -> Self {
        Self::Fixed(delay)
    }

    /// Pacer backed by a token bucket.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `per_minute` is zero.
    pub fn token_bucket(per_minute: u32) -> StoryforgeResult<Self> {
        let per_minute = NonZeroU32::new(per_minute)
            .ok_or_else(|| ConfigError::new("pacing.per_minute must be greater than zero"))?;
        let quota = Quota::per_minute(per_minute).allow_burst(NonZeroU32::MIN);
        Ok(Self::TokenBucket {
            per_minute,
            limiter: Arc::new(GovernorRateLimiter::direct(quota)),
        })
    }

    /// Start a new batch.
    pub fn session(&self) -> PacedSession<'_> {
        PacedSession {
            pacer: self,
            issued: 0,
        }
    }
}

/// One batch worth of pacing state.
#[derive(Debug)]
pub struct PacedSession<'a> {
    pacer: &'a RequestPacer,
    issued: usize,
}

impl PacedSession<'_> {
    /// Wait until the next request may start.
    ///
    /// The first request of a fixed-pause session starts immediately.
    pub async fn ready(&mut self) {
        match self.pacer {
            RequestPacer::Immediate => {}
            RequestPacer::Fixed(delay) => {
                if self.issued > 0 && !delay.is_zero() {
                    trace!(delay_ms = delay.as_millis() as u64, "Pausing before next request");
                    tokio::time::sleep(*delay).await;
                }
            }
            RequestPacer::TokenBucket { limiter, .. } => {
                limiter.until_ready().await;
            }
        }
        self.issued += 1;
        debug!(request = self.issued, "Request slot ready");
    }

    /// Number of requests released so far.
    pub fn issued(&self) -> usize {
        self.issued
    }
}
