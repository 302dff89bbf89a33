//! Google Gemini REST client.
//!
//! The [`GeminiClient`] sends every request to the `generateContent`
//! endpoint of the model the request names (or the configured default),
//! through a per-model rate limiter built from the configured tier.
//!
//! # Example
//!
//! ```no_run
//! use storyforge_models::GeminiClient;
//! use storyforge_core::{GenerateRequest, Message};
//! use storyforge_interface::StoryforgeDriver;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GeminiClient::new()?;
//!
//! let request = GenerateRequest {
//!     messages: vec![Message::user_text("Hello")],
//!     ..Default::default()
//! };
//! let response = client.generate(&request).await?;
//! println!("{}", response.text());
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::env;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, instrument, warn};

use storyforge_core::{GenerateRequest, GenerateResponse, Modality};
use storyforge_error::{API_KEY_ENV, GeminiError, GeminiErrorKind, StoryforgeResult};
use storyforge_interface::{Metadata, ModelMetadata, StoryforgeDriver};
use storyforge_rate_limit::{RateLimiter, StoryforgeConfig, Tier, TierConfig};

use super::GeminiResult;
use super::conversion::{error_from_status, from_gemini_response, to_gemini_request};
use super::dto::GeminiResponse;

/// Production endpoint root.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const MAX_OUTPUT_TOKENS: usize = 65_536;

/// Client for the Google Gemini API with per-model rate limiting.
///
/// Limiters are created lazily, one per model, from the base tier with
/// that model's overrides applied.
#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    api_key: String,
    base_url: String,
    /// Default model for text requests
    model_name: String,
    /// Default model for requests asking for image output
    image_model: String,
    base_tier: TierConfig,
    limiters: Arc<Mutex<HashMap<String, RateLimiter<TierConfig>>>>,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("model_name", &self.model_name)
            .field("image_model", &self.image_model)
            .field("base_tier", &self.base_tier.name())
            .finish_non_exhaustive()
    }
}

/// Tier used when configuration names none.
fn default_tier() -> TierConfig {
    TierConfig {
        name: "Free".to_string(),
        rpm: Some(10),
        tpm: Some(250_000),
        rpd: Some(250),
        max_concurrent: Some(1),
        models: HashMap::new(),
    }
}

impl GeminiClient {
    /// Create a client from the layered configuration.
    ///
    /// Reads the API key from `GEMINI_API_KEY`.
    #[instrument(name = "gemini_client_new")]
    pub fn new() -> StoryforgeResult<Self> {
        let config = StoryforgeConfig::load().unwrap_or_default();
        Self::from_config(&config, None)
    }

    /// Create a client from an explicit configuration and optional tier name.
    ///
    /// Reads the API key from `GEMINI_API_KEY`.
    #[instrument(name = "gemini_client_from_config", skip(config))]
    pub fn from_config(config: &StoryforgeConfig, tier_name: Option<&str>) -> StoryforgeResult<Self> {
        let api_key = env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| GeminiError::new(GeminiErrorKind::MissingApiKey))?;
        Ok(Self::with_api_key(api_key, config, tier_name)?)
    }

    /// Create a client with an explicit API key.
    pub fn with_api_key(
        api_key: impl Into<String>,
        config: &StoryforgeConfig,
        tier_name: Option<&str>,
    ) -> GeminiResult<Self> {
        let http = Client::builder()
            .build()
            .map_err(|e| GeminiError::new(GeminiErrorKind::ClientCreation(e.to_string())))?;

        let base_tier = config
            .get_tier("gemini", tier_name)
            .unwrap_or_else(default_tier);

        debug!(
            tier = base_tier.name(),
            text_model = %config.models.text,
            image_model = %config.models.image,
            "Created Gemini client"
        );

        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model_name: config.models.text.clone(),
            image_model: config.models.image.clone(),
            base_tier,
            limiters: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Point the client at a different endpoint root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Model used when a request asking for image output names none.
    pub fn image_model(&self) -> &str {
        &self.image_model
    }

    /// Resolve which model serves `req`.
    fn resolve_model<'a>(&'a self, req: &'a GenerateRequest) -> &'a str {
        match req.model.as_deref() {
            Some(model) => model,
            None if req.response_modalities.contains(&Modality::Image) => &self.image_model,
            None => &self.model_name,
        }
    }

    /// Limiter for `model`, creating it on first use.
    fn limiter_for(&self, model: &str) -> RateLimiter<TierConfig> {
        let mut limiters = self
            .limiters
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        limiters
            .entry(model.to_string())
            .or_insert_with(|| {
                debug!(model, "Creating rate limiter for model");
                RateLimiter::new(self.base_tier.for_model(model))
            })
            .clone()
    }

    async fn send(&self, model: &str, req: &GenerateRequest) -> GeminiResult<GenerateResponse> {
        let body = to_gemini_request(req);
        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        let limiter = self.limiter_for(model);
        let _guard = limiter.acquire().await;

        debug!(
            url = %url,
            grounding = req.grounding,
            structured = body.generation_config.as_ref().is_some_and(|c| c.response_schema.is_some()),
            "Sending Gemini request"
        );

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GeminiError::new(GeminiErrorKind::ApiRequest(e.to_string())))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GeminiError::new(GeminiErrorKind::ApiRequest(e.to_string())))?;

        if !status.is_success() {
            let err = error_from_status(status.as_u16(), &text);
            if err.kind.is_throttled() {
                warn!(status = status.as_u16(), error = %err, "Gemini request throttled");
            } else {
                error!(status = status.as_u16(), error = %err, "Gemini request failed");
            }
            return Err(err);
        }

        let parsed: GeminiResponse = serde_json::from_str(&text).map_err(|e| {
            error!(error = %e, "Gemini response body did not parse");
            GeminiError::new(GeminiErrorKind::MalformedResponse(e.to_string()))
        })?;

        from_gemini_response(parsed)
    }
}

#[async_trait]
impl StoryforgeDriver for GeminiClient {
    #[instrument(skip(self, req))]
    async fn generate(&self, req: &GenerateRequest) -> StoryforgeResult<GenerateResponse> {
        let model = self.resolve_model(req).to_string();
        Ok(self.send(&model, req).await?)
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

impl Metadata for GeminiClient {
    fn metadata(&self) -> ModelMetadata {
        ModelMetadata {
            provider: self.provider_name(),
            model: self.model_name.clone(),
            image_model: self.image_model.clone(),
            max_output_tokens: MAX_OUTPUT_TOKENS,
            supports_json_mode: true,
            supports_grounding: true,
            supports_image_generation: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyforge_core::Message;

    fn client() -> GeminiClient {
        GeminiClient::with_api_key("test-key", &StoryforgeConfig::default(), None).unwrap()
    }

    #[test]
    fn test_image_requests_default_to_image_model() {
        let client = client();
        let text = GenerateRequest {
            messages: vec![Message::user_text("hi")],
            ..Default::default()
        };
        let image = GenerateRequest {
            response_modalities: vec![Modality::Text, Modality::Image],
            ..text.clone()
        };
        let explicit = GenerateRequest {
            model: Some("gemini-2.5-pro".to_string()),
            ..image.clone()
        };

        assert_eq!(client.resolve_model(&text), "gemini-2.5-flash");
        assert_eq!(client.resolve_model(&image), "gemini-2.5-flash-image");
        assert_eq!(client.resolve_model(&explicit), "gemini-2.5-pro");
    }

    #[test]
    fn test_limiters_are_cached_per_model() {
        let client = client();
        let _ = client.limiter_for("a");
        let _ = client.limiter_for("a");
        let _ = client.limiter_for("b");
        assert_eq!(client.limiters.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_metadata_reports_models() {
        let meta = client().metadata();
        assert_eq!(meta.provider, "gemini");
        assert_eq!(meta.image_model, "gemini-2.5-flash-image");
        assert!(meta.supports_grounding);
    }
}
