//! Rate limiter implementation using governor and Tokio Semaphore.
//!
//! Enforces a tier's quotas in front of every request a driver sends:
//! - Governor (GCRA) for RPM and RPD limits
//! - Tokio Semaphore for concurrent request limits

use crate::Tier;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as GovernorRateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, instrument};

pub(crate) type DirectRateLimiter = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Rate limiter that owns a tiered value and gates access to it.
///
/// # Type Parameters
///
/// * `T` - Any type implementing [`Tier`], typically a client paired with
///   its tier configuration.
///
/// # Example
///
/// ```rust,ignore
/// let limiter = RateLimiter::new(tiered_client);
/// let _guard = limiter.acquire().await;
/// let client = &limiter.inner().client;
/// ```
#[derive(Clone)]
pub struct RateLimiter<T: Tier> {
    inner: T,
    rpm_limiter: Option<Arc<DirectRateLimiter>>,
    rpd_limiter: Option<Arc<DirectRateLimiter>>,
    concurrent_semaphore: Arc<Semaphore>,
}

impl<T: Tier + std::fmt::Debug> std::fmt::Debug for RateLimiter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("inner", &self.inner)
            .field("rpm_limited", &self.rpm_limiter.is_some())
            .field("rpd_limited", &self.rpd_limiter.is_some())
            .finish_non_exhaustive()
    }
}

impl<T: Tier> RateLimiter<T> {
    /// Create a new rate limiter from a tier.
    ///
    /// Every non-`None` limit of the tier is enforced.
    pub fn new(tier: T) -> Self {
        let rpm_limiter = tier.rpm().and_then(NonZeroU32::new).map(|n| {
            Arc::new(GovernorRateLimiter::direct(Quota::per_minute(n)))
        });

        // A day-long replenishment period with the full daily budget as burst.
        let rpd_limiter = tier.rpd().and_then(NonZeroU32::new).and_then(|n| {
            let period = std::time::Duration::from_secs(SECONDS_PER_DAY / u64::from(n.get()));
            Quota::with_period(period)
                .map(|quota| Arc::new(GovernorRateLimiter::direct(quota.allow_burst(n))))
        });

        let max_concurrent = tier.max_concurrent().unwrap_or(u32::MAX).max(1);
        let permits = (max_concurrent as usize).min(Semaphore::MAX_PERMITS);
        let concurrent_semaphore = Arc::new(Semaphore::new(permits));

        debug!(
            tier = tier.name(),
            rpm = ?tier.rpm(),
            rpd = ?tier.rpd(),
            max_concurrent = permits,
            "Created rate limiter"
        );

        Self {
            inner: tier,
            rpm_limiter,
            rpd_limiter,
            concurrent_semaphore,
        }
    }

    /// Get a reference to the inner tiered value.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Wait until every limit allows one more request.
    ///
    /// Returns a guard that releases the concurrent slot when dropped.
    #[instrument(skip(self), fields(tier = self.inner.name()))]
    pub async fn acquire(&self) -> RateLimiterGuard {
        if let Some(limiter) = &self.rpm_limiter {
            limiter.until_ready().await;
        }

        if let Some(limiter) = &self.rpd_limiter {
            limiter.until_ready().await;
        }

        // Acquire the concurrent slot last to avoid holding it while waiting.
        // The semaphore is never closed, so acquisition only fails on shutdown.
        let permit = self.concurrent_semaphore.clone().acquire_owned().await.ok();

        RateLimiterGuard { _permit: permit }
    }

    /// Try to acquire without waiting. Returns `None` if any limit would block.
    pub fn try_acquire(&self) -> Option<RateLimiterGuard> {
        if let Some(limiter) = &self.rpm_limiter {
            limiter.check().ok()?;
        }

        if let Some(limiter) = &self.rpd_limiter {
            limiter.check().ok()?;
        }

        let permit = self.concurrent_semaphore.clone().try_acquire_owned().ok()?;

        Some(RateLimiterGuard {
            _permit: Some(permit),
        })
    }
}

/// RAII guard for rate limiter.
///
/// Releases the concurrent request slot when dropped.
pub struct RateLimiterGuard {
    _permit: Option<OwnedSemaphorePermit>,
}
