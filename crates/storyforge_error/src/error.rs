//! Top-level error wrapper types.

use crate::{
    BackendError, ConfigError, EbookError, GeminiError, HttpError, JsonError,
    RetryableError,
};

/// Every error condition a Storyforge crate can surface.
///
/// # Examples
///
/// ```
/// use storyforge_error::{StoryforgeError, HttpError};
///
/// let http_err = HttpError::new("Connection failed");
/// let err: StoryforgeError = http_err.into();
/// assert!(format!("{}", err).contains("HTTP Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum StoryforgeErrorKind {
    /// HTTP error
    #[from(HttpError)]
    Http(HttpError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Generic backend error
    #[from(BackendError)]
    Backend(BackendError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Gemini error
    #[from(GeminiError)]
    Gemini(GeminiError),
    /// Ebook state or media error
    #[from(EbookError)]
    Ebook(EbookError),
}

/// Storyforge error with kind discrimination.
///
/// # Examples
///
/// ```
/// use storyforge_error::{StoryforgeResult, ConfigError};
///
/// fn might_fail() -> StoryforgeResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Storyforge Error: {}", _0)]
pub struct StoryforgeError(Box<StoryforgeErrorKind>);

impl StoryforgeError {
    /// Create a new error from a kind.
    pub fn new(kind: StoryforgeErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &StoryforgeErrorKind {
        &self.0
    }

    /// Short message suitable for showing to a user after a failed action.
    ///
    /// The full error (with source location) belongs in the log; this is
    /// the one-line advisory a host displays next to a retry affordance.
    ///
    /// # Examples
    ///
    /// ```
    /// use storyforge_error::{GeminiError, GeminiErrorKind, StoryforgeError};
    ///
    /// let err = StoryforgeError::from(GeminiError::new(GeminiErrorKind::HttpError {
    ///     status_code: 429,
    ///     message: "quota".to_string(),
    /// }));
    /// assert!(err.advisory().contains("busy"));
    /// ```
    pub fn advisory(&self) -> &'static str {
        match self.kind() {
            StoryforgeErrorKind::Gemini(e) if e.is_throttled() => {
                "The AI service is busy. Wait a moment and try again."
            }
            StoryforgeErrorKind::Gemini(e) if e.is_retryable() => {
                "The AI service is temporarily unavailable. Try again shortly."
            }
            StoryforgeErrorKind::Gemini(e) => match e.kind {
                crate::GeminiErrorKind::MissingApiKey => {
                    "No API key is configured. Set GEMINI_API_KEY and try again."
                }
                crate::GeminiErrorKind::HttpError {
                    status_code: 401 | 403,
                    ..
                } => "The API key was rejected. Check it and try again.",
                crate::GeminiErrorKind::NoImageData => {
                    "The AI service did not return an image. Try again."
                }
                _ => "The AI service request failed. Try again.",
            },
            StoryforgeErrorKind::Http(_) => "Could not reach the AI service. Check your connection.",
            StoryforgeErrorKind::Config(_) => "The configuration is invalid.",
            StoryforgeErrorKind::Ebook(_) => "The book could not be updated.",
            StoryforgeErrorKind::Json(_) | StoryforgeErrorKind::Backend(_) => {
                "Something went wrong. Try again."
            }
        }
    }
}

impl RetryableError for StoryforgeError {
    fn is_throttled(&self) -> bool {
        match self.kind() {
            StoryforgeErrorKind::Gemini(e) => e.is_throttled(),
            _ => false,
        }
    }

    fn is_retryable(&self) -> bool {
        match self.kind() {
            StoryforgeErrorKind::Gemini(e) => e.is_retryable(),
            _ => false,
        }
    }
}

// Generic From implementation for any type that converts to StoryforgeErrorKind
impl<T> From<T> for StoryforgeError
where
    T: Into<StoryforgeErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Storyforge operations.
pub type StoryforgeResult<T> = std::result::Result<T, StoryforgeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{API_KEY_ENV, GeminiError, GeminiErrorKind};

    fn http(status_code: u16, message: &str) -> StoryforgeError {
        GeminiError::new(GeminiErrorKind::HttpError {
            status_code,
            message: message.to_string(),
        })
        .into()
    }

    #[test]
    fn test_server_error_advisory_differs_from_throttling() {
        let unavailable = http(503, "UNAVAILABLE");
        assert!(unavailable.is_retryable());
        assert!(!unavailable.is_throttled());
        assert!(unavailable.advisory().contains("temporarily unavailable"));

        assert!(http(429, "RESOURCE_EXHAUSTED").advisory().contains("busy"));
    }

    #[test]
    fn test_forbidden_quota_wording_is_a_key_problem() {
        let err = http(403, "PERMISSION_DENIED: quota project not set");
        assert!(!err.is_retryable());
        assert_eq!(
            err.advisory(),
            "The API key was rejected. Check it and try again."
        );
    }

    #[test]
    fn test_missing_key_names_the_variable() {
        let err: StoryforgeError = GeminiError::new(GeminiErrorKind::MissingApiKey).into();
        assert!(err.to_string().contains(API_KEY_ENV));
        assert!(err.advisory().contains(API_KEY_ENV));
    }
}
