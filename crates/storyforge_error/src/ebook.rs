//! Ebook state and media error types.

/// Specific error conditions for ebook operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum EbookErrorKind {
    /// A string could not be parsed as a `data:<mime>;base64,<data>` URI
    #[display("Invalid data URI: {}", _0)]
    InvalidDataUri(String),
    /// No panel carries the requested sequence index
    #[display("No panel with index {}", _0)]
    UnknownPanel(u32),
    /// The script contains no panels to illustrate
    #[display("Script has no panels")]
    EmptyScript,
    /// No story has been selected in the application context
    #[display("No story selected")]
    NoStorySelected,
    /// A string names neither the cover nor a panel index
    #[display("Invalid slot: {}", _0)]
    InvalidSlot(String),
    /// Failed to read or write a book file or exported image
    #[display("I/O error: {}", _0)]
    Io(String),
}

/// Error type for ebook operations.
///
/// # Examples
///
/// ```
/// use storyforge_error::{EbookError, EbookErrorKind};
///
/// let err = EbookError::new(EbookErrorKind::UnknownPanel(7));
/// assert!(format!("{}", err).contains("index 7"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Ebook Error: {} at line {} in {}", kind, line, file)]
pub struct EbookError {
    /// The specific error condition
    pub kind: EbookErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl EbookError {
    /// Create a new EbookError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: EbookErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
