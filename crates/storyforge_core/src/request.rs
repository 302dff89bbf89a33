//! Request and response types for generation.

use crate::{GeneratedImage, Message, Output};
use serde::{Deserialize, Serialize};

/// Output modalities a request can ask for.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    strum::EnumIter,
)]
pub enum Modality {
    /// Text output
    #[display("TEXT")]
    Text,
    /// Image output
    #[display("IMAGE")]
    Image,
}

/// Generic generation request.
///
/// `response_schema` declares the JSON shape the service should honor;
/// `grounding` turns on search augmentation. The two are mutually exclusive
/// on the Gemini API, so drivers drop the schema when grounding is set.
///
/// # Examples
///
/// ```
/// use storyforge_core::{GenerateRequest, Message};
///
/// let request = GenerateRequest::builder()
///     .messages(vec![Message::user_text("Hello!")])
///     .max_tokens(Some(100))
///     .model(Some("gemini-2.5-flash".to_string()))
///     .build()
///     .unwrap();
///
/// assert_eq!(request.messages.len(), 1);
/// assert_eq!(request.max_tokens, Some(100));
/// assert!(request.response_schema.is_none());
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    Default,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(default)]
pub struct GenerateRequest {
    /// The conversation messages to send
    pub messages: Vec<Message>,
    /// Maximum number of tokens to generate
    pub max_tokens: Option<u32>,
    /// Sampling temperature (0.0 to 2.0)
    pub temperature: Option<f32>,
    /// Model identifier to use (driver default when `None`)
    pub model: Option<String>,
    /// JSON schema the reply must conform to
    pub response_schema: Option<serde_json::Value>,
    /// Augment the request with web search results
    pub grounding: bool,
    /// Requested output modalities (driver default when empty)
    pub response_modalities: Vec<Modality>,
}

impl GenerateRequest {
    /// Start building a request.
    pub fn builder() -> GenerateRequestBuilder {
        GenerateRequestBuilder::default()
    }
}

/// The unified response object.
///
/// # Examples
///
/// ```
/// use storyforge_core::{GenerateResponse, Output};
///
/// let response = GenerateResponse {
///     outputs: vec![Output::Text("{\"title\":".to_string()), Output::Text("\"Dawn\"}".to_string())],
/// };
///
/// assert_eq!(response.text(), "{\"title\":\"Dawn\"}");
/// assert!(response.first_image().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The generated outputs from the model
    pub outputs: Vec<Output>,
}

impl GenerateResponse {
    /// Concatenation of every text part, in order.
    pub fn text(&self) -> String {
        self.outputs
            .iter()
            .filter_map(|output| match output {
                Output::Text(text) => Some(text.as_str()),
                Output::Image(_) => None,
            })
            .collect()
    }

    /// The first image part, if any.
    pub fn first_image(&self) -> Option<&GeneratedImage> {
        self.outputs.iter().find_map(|output| match output {
            Output::Image(image) => Some(image),
            Output::Text(_) => None,
        })
    }
}
