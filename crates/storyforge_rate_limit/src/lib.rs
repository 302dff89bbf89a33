//! Configuration, rate limiting and retry for Storyforge.
//!
//! This crate provides:
//! - [`StoryforgeConfig`]: layered TOML configuration
//! - [`RateLimiter`]: tier-based RPM/RPD/concurrency limits using governor
//! - [`ThrottleRetry`]: exponential backoff for throttled requests
//! - [`RequestPacer`]: pauses between the requests of a sequential batch

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod limiter;
mod pacer;
mod retry;
mod tier;

pub use config::{
    DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL, ModelConfig, ModelTierConfig, PacingConfig,
    PlaceholderConfig, ProviderConfig, RetryConfig, StoryforgeConfig, TierConfig,
};
pub use limiter::{RateLimiter, RateLimiterGuard};
pub use pacer::{PacedSession, PacingMode, RequestPacer};
pub use retry::ThrottleRetry;
pub use tier::Tier;
