//! Error types for Storyforge.
//!
//! This crate provides the foundation error types used throughout the Storyforge workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! [`RetryableError`] classifies failures for the retry wrapper: throttling
//! errors are retried, everything else is surfaced.
//!
//! # Examples
//!
//! ```
//! use storyforge_error::{StoryforgeResult, HttpError};
//!
//! fn fetch_data() -> StoryforgeResult<String> {
//!     Err(HttpError::new("Connection refused"))?
//! }
//!
//! assert!(fetch_data().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod config;
mod ebook;
mod error;
mod gemini;
mod http;
mod json;

pub use backend::BackendError;
pub use config::ConfigError;
pub use ebook::{EbookError, EbookErrorKind};
pub use error::{StoryforgeError, StoryforgeErrorKind, StoryforgeResult};
pub use gemini::{API_KEY_ENV, GeminiError, GeminiErrorKind, RetryableError};
pub use http::HttpError;
pub use json::JsonError;
