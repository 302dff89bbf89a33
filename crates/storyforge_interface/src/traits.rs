//! Trait definitions for generative model backends.

use crate::ModelMetadata;
use async_trait::async_trait;
use storyforge_core::{GenerateRequest, GenerateResponse};
use storyforge_error::StoryforgeResult;

/// Core trait that every generative backend implements.
///
/// A single request/response call covers text, structured output, search
/// grounding and image generation; the request selects which.
#[async_trait]
pub trait StoryforgeDriver: Send + Sync {
    /// Generate model output given a multimodal request.
    async fn generate(&self, req: &GenerateRequest) -> StoryforgeResult<GenerateResponse>;

    /// Provider name (e.g., "gemini").
    fn provider_name(&self) -> &'static str;

    /// Default model identifier used when a request names none.
    fn model_name(&self) -> &str;
}

/// Trait for backends that can describe their capabilities.
pub trait Metadata: StoryforgeDriver {
    /// Capabilities of the default model.
    fn metadata(&self) -> ModelMetadata;
}

#[async_trait]
impl<D> StoryforgeDriver for std::sync::Arc<D>
where
    D: StoryforgeDriver + ?Sized,
{
    async fn generate(&self, req: &GenerateRequest) -> StoryforgeResult<GenerateResponse> {
        (**self).generate(req).await
    }

    fn provider_name(&self) -> &'static str {
        (**self).provider_name()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}
