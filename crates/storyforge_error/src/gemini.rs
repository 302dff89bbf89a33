//! Gemini-specific error types and retry classification.

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Gemini-specific error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum GeminiErrorKind {
    /// API key not found in environment
    #[display("GEMINI_API_KEY environment variable not set")]
    MissingApiKey,
    /// Failed to create the HTTP client
    #[display("Failed to create Gemini client: {}", _0)]
    ClientCreation(String),
    /// API request failed without an HTTP status
    #[display("Gemini API request failed: {}", _0)]
    ApiRequest(String),
    /// HTTP error with status code and message
    #[display("HTTP {} error: {}", status_code, message)]
    HttpError {
        /// HTTP status code
        status_code: u16,
        /// Error message
        message: String,
    },
    /// The reply carried no candidate content at all
    #[display("Gemini returned an empty response")]
    EmptyResponse,
    /// A successful reply whose body could not be parsed
    #[display("Malformed Gemini response: {}", _0)]
    MalformedResponse(String),
    /// An image was requested but the reply carried no inline image data
    #[display("No image data in Gemini response")]
    NoImageData,
    /// Base64 decoding of inline data failed
    #[display("Base64 decode error: {}", _0)]
    Base64Decode(String),
}

/// Markers that signal throttling whatever the status code.
///
/// Looser words such as "quota" also appear in unrelated 400/403 bodies
/// ("quota project"), so they only count together with a 429.
const THROTTLE_MARKERS: &[&str] = &["resource_exhausted", "too many requests"];

impl GeminiErrorKind {
    /// True when the service signalled that the caller exceeded its quota.
    ///
    /// Matches HTTP 429 as well as error bodies carrying the canonical
    /// `RESOURCE_EXHAUSTED` status, which some gateways return with a
    /// different status code.
    pub fn is_throttled(&self) -> bool {
        match self {
            GeminiErrorKind::HttpError {
                status_code,
                message,
            } => *status_code == 429 || has_throttle_marker(message),
            GeminiErrorKind::ApiRequest(message) => {
                message.contains("429") || has_throttle_marker(message)
            }
            _ => false,
        }
    }

    /// Check if this error type could succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            GeminiErrorKind::HttpError { status_code, .. } => {
                self.is_throttled() || matches!(*status_code, 408 | 500 | 502 | 503 | 504)
            }
            other => other.is_throttled(),
        }
    }

    /// True when the service answered but the reply holds nothing usable.
    ///
    /// Blocked prompts, reasoning-only replies, unparsable bodies and broken
    /// inline data fall here; text operations recover from these with a
    /// placeholder.
    pub fn is_unusable_reply(&self) -> bool {
        matches!(
            self,
            GeminiErrorKind::EmptyResponse
                | GeminiErrorKind::MalformedResponse(_)
                | GeminiErrorKind::Base64Decode(_)
        )
    }
}

fn has_throttle_marker(message: &str) -> bool {
    let lower = message.to_lowercase();
    THROTTLE_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Gemini error with source location tracking.
///
/// # Examples
///
/// ```
/// use storyforge_error::{GeminiError, GeminiErrorKind};
///
/// let err = GeminiError::new(GeminiErrorKind::MissingApiKey);
/// assert!(format!("{}", err).contains("GEMINI_API_KEY"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Gemini Error: {} at line {} in {}", kind, line, file)]
pub struct GeminiError {
    /// The kind of error that occurred
    pub kind: GeminiErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl GeminiError {
    /// Create a new GeminiError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: GeminiErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

/// Trait for errors that carry retry classification.
///
/// # Examples
///
/// ```
/// use storyforge_error::{GeminiError, GeminiErrorKind, RetryableError};
///
/// let err = GeminiError::new(GeminiErrorKind::HttpError {
///     status_code: 429,
///     message: "Resource has been exhausted".to_string(),
/// });
///
/// assert!(err.is_throttled());
/// assert!(err.is_retryable());
/// ```
pub trait RetryableError {
    /// Returns true if the caller exceeded its request quota.
    fn is_throttled(&self) -> bool;

    /// Returns true if this error could succeed on a later attempt.
    ///
    /// Defaults to the throttling classification.
    fn is_retryable(&self) -> bool {
        self.is_throttled()
    }
}

impl RetryableError for GeminiError {
    fn is_throttled(&self) -> bool {
        self.kind.is_throttled()
    }

    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_429_is_throttled() {
        let kind = GeminiErrorKind::HttpError {
            status_code: 429,
            message: "Too many".to_string(),
        };
        assert!(kind.is_throttled());
    }

    #[test]
    fn test_resource_exhausted_marker_is_throttled() {
        let kind = GeminiErrorKind::HttpError {
            status_code: 400,
            message: r#"{"error":{"status":"RESOURCE_EXHAUSTED"}}"#.to_string(),
        };
        assert!(kind.is_throttled());

        let kind = GeminiErrorKind::ApiRequest("got 429 from upstream".to_string());
        assert!(kind.is_throttled());
    }

    #[test]
    fn test_other_errors_are_not_throttled() {
        let unauthorized = GeminiErrorKind::HttpError {
            status_code: 401,
            message: "API key not valid".to_string(),
        };
        assert!(!unauthorized.is_throttled());
        assert!(!unauthorized.is_retryable());

        let overloaded = GeminiErrorKind::HttpError {
            status_code: 503,
            message: "The model is overloaded".to_string(),
        };
        assert!(!overloaded.is_throttled());
        assert!(overloaded.is_retryable());

        assert!(!GeminiErrorKind::NoImageData.is_throttled());
        assert!(!GeminiErrorKind::MissingApiKey.is_throttled());
    }

    #[test]
    fn test_quota_wording_without_429_is_not_throttled() {
        let forbidden = GeminiErrorKind::HttpError {
            status_code: 403,
            message: "PERMISSION_DENIED: quota project not set for this API".to_string(),
        };
        assert!(!forbidden.is_throttled());

        let bad_request = GeminiErrorKind::HttpError {
            status_code: 400,
            message: "rate limit settings are invalid".to_string(),
        };
        assert!(!bad_request.is_throttled());

        let quota_429 = GeminiErrorKind::HttpError {
            status_code: 429,
            message: "Quota exceeded".to_string(),
        };
        assert!(quota_429.is_throttled());
    }

    #[test]
    fn test_unusable_reply_classification() {
        assert!(GeminiErrorKind::EmptyResponse.is_unusable_reply());
        assert!(GeminiErrorKind::MalformedResponse("eof".to_string()).is_unusable_reply());
        assert!(!GeminiErrorKind::ApiRequest("connection reset".to_string()).is_unusable_reply());
        assert!(
            !GeminiErrorKind::HttpError {
                status_code: 429,
                message: "RESOURCE_EXHAUSTED".to_string(),
            }
            .is_unusable_reply()
        );
    }
}
