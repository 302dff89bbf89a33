//! Generative model provider integrations for Storyforge.
//!
//! Currently one provider is implemented: Google Gemini over REST.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod gemini;

pub use gemini::{
    DEFAULT_BASE_URL, GeminiCandidate, GeminiClient, GeminiContent, GeminiErrorBody,
    GeminiErrorEnvelope, GeminiPart, GeminiRequest, GeminiResponse, GeminiResult, GeminiTool,
    GenerationConfig, GoogleSearch, InlineData, PromptFeedback,
};
