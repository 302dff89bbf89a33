//! Input types for generation requests.

use crate::MediaSource;
use serde::{Deserialize, Serialize};

/// Content parts a request can carry.
///
/// # Examples
///
/// ```
/// use storyforge_core::{Input, MediaSource};
///
/// let text = Input::Text("Make the sky stormy".to_string());
///
/// let image = Input::Image {
///     mime: Some("image/png".to_string()),
///     source: MediaSource::Binary(vec![0x89, 0x50, 0x4E, 0x47]),
/// };
/// # let _ = (text, image);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Input {
    /// Plain text input.
    Text(String),

    /// Image input, used when asking the model to edit an existing picture.
    Image {
        /// MIME type, e.g., "image/png" or "image/jpeg"
        mime: Option<String>,
        /// Media source (base64 or raw bytes)
        source: MediaSource,
    },
}
