//! Core type definitions for the driver interface.

/// Information about model capabilities and limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelMetadata {
    /// Provider name (e.g., "gemini")
    pub provider: &'static str,
    /// Default text model identifier
    pub model: String,
    /// Model used for image generation and editing
    pub image_model: String,
    /// Maximum output tokens per request
    pub max_output_tokens: usize,
    /// Supports schema-constrained JSON output
    pub supports_json_mode: bool,
    /// Supports search-grounded generation
    pub supports_grounding: bool,
    /// Supports image output
    pub supports_image_generation: bool,
}
