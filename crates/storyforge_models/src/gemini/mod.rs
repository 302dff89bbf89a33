//! Google Gemini API client implementation.
//!
//! The REST client supports:
//! - Per-request model selection, with a separate default for image output
//! - Per-model rate limiting from the configured tier
//! - Schema-constrained JSON output and search grounding
//! - Inline image input and output

mod client;
mod conversion;
mod dto;

pub use client::{DEFAULT_BASE_URL, GeminiClient};
pub use dto::{
    GeminiCandidate, GeminiContent, GeminiErrorBody, GeminiErrorEnvelope, GeminiPart,
    GeminiRequest, GeminiResponse, GeminiTool, GenerationConfig, GoogleSearch, InlineData,
    PromptFeedback,
};

/// Result type for Gemini operations.
pub type GeminiResult<T> = Result<T, storyforge_error::GeminiError>;
