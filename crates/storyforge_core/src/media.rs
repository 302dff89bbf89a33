//! Media sources and generated image payloads.
//!
//! Images travel between the service, the book state and any export target
//! as data URIs (`data:image/png;base64,<data>`). [`GeneratedImage`] holds
//! the decoded bytes and converts in both directions.

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use storyforge_error::{EbookError, EbookErrorKind, StoryforgeResult};

/// Where media content is sourced from.
///
/// # Examples
///
/// ```
/// use storyforge_core::MediaSource;
///
/// let base64 = MediaSource::Base64("iVBORw0KGgo=".to_string());
/// let binary = MediaSource::Binary(vec![0x89, 0x50, 0x4E, 0x47]);
/// # let _ = (base64, binary);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaSource {
    /// Base64-encoded content
    Base64(String),
    /// Raw binary data
    Binary(Vec<u8>),
}

impl MediaSource {
    /// Base64 text for this source, encoding raw bytes when needed.
    pub fn to_base64(&self) -> String {
        match self {
            MediaSource::Base64(data) => data.clone(),
            MediaSource::Binary(bytes) => STANDARD.encode(bytes),
        }
    }
}

/// MIME type assumed when a data URI or reply does not name one.
pub const DEFAULT_IMAGE_MIME: &str = "image/png";

const DATA_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

/// A generated image: MIME type plus decoded bytes.
///
/// Serializes as a data URI string so saved books stay self-contained.
///
/// # Examples
///
/// ```
/// use storyforge_core::GeneratedImage;
///
/// let image = GeneratedImage::new("image/png", vec![1, 2, 3]);
/// let uri = image.to_data_uri();
/// assert_eq!(uri, "data:image/png;base64,AQID");
///
/// let decoded = GeneratedImage::from_data_uri(&uri).unwrap();
/// assert_eq!(decoded, image);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_getters::Getters)]
#[serde(into = "String", try_from = "String")]
pub struct GeneratedImage {
    mime: String,
    data: Vec<u8>,
}

impl GeneratedImage {
    /// Wrap raw image bytes with their MIME type.
    pub fn new(mime: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            data,
        }
    }

    /// Decode base64 inline data as returned by the service.
    pub fn from_base64(mime: impl Into<String>, encoded: &str) -> StoryforgeResult<Self> {
        let data = STANDARD.decode(encoded.trim()).map_err(|e| {
            EbookError::new(EbookErrorKind::InvalidDataUri(format!(
                "base64 payload did not decode: {}",
                e
            )))
        })?;
        Ok(Self::new(mime, data))
    }

    /// Base64 encoding of the image bytes.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }

    /// Encode as `data:<mime>;base64,<data>`.
    pub fn to_data_uri(&self) -> String {
        format!("{}{}{}{}", DATA_PREFIX, self.mime, BASE64_MARKER, self.to_base64())
    }

    /// Parse a `data:<mime>;base64,<data>` URI back into bytes.
    ///
    /// A missing MIME type (`data:;base64,...`) falls back to PNG.
    pub fn from_data_uri(uri: &str) -> StoryforgeResult<Self> {
        let rest = uri.trim().strip_prefix(DATA_PREFIX).ok_or_else(|| {
            EbookError::new(EbookErrorKind::InvalidDataUri(
                "missing 'data:' prefix".to_string(),
            ))
        })?;
        let (mime, payload) = rest.split_once(BASE64_MARKER).ok_or_else(|| {
            EbookError::new(EbookErrorKind::InvalidDataUri(
                "only base64 data URIs are supported".to_string(),
            ))
        })?;
        let mime = if mime.is_empty() {
            DEFAULT_IMAGE_MIME
        } else {
            mime
        };
        Self::from_base64(mime, payload)
    }

    /// Conventional file extension for the MIME type.
    pub fn extension(&self) -> &'static str {
        match self.mime.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "png",
        }
    }

    /// Consume the image, returning its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Present this image as a request input (for edit requests).
    pub fn to_input(&self) -> crate::Input {
        crate::Input::Image {
            mime: Some(self.mime.clone()),
            source: MediaSource::Base64(self.to_base64()),
        }
    }
}

impl From<GeneratedImage> for String {
    fn from(image: GeneratedImage) -> Self {
        image.to_data_uri()
    }
}

impl TryFrom<String> for GeneratedImage {
    type Error = storyforge_error::StoryforgeError;

    fn try_from(uri: String) -> Result<Self, Self::Error> {
        Self::from_data_uri(&uri)
    }
}
