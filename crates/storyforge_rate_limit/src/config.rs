//! Configuration structures for Storyforge.
//!
//! Configuration is TOML, layered with the `config` crate:
//! - Bundled defaults (include_str! from storyforge.toml)
//! - User overrides (~/.config/storyforge/storyforge.toml, then ./storyforge.toml)
//! - Later sources take precedence field by field

use crate::{PacingMode, RequestPacer, ThrottleRetry, Tier};
use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use storyforge_error::{ConfigError, StoryforgeError, StoryforgeResult};
use tracing::{debug, instrument};

/// Default text model identifier.
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";

/// Default image model identifier.
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

/// Model-specific rate limit overrides.
///
/// Only specified fields override the tier defaults.
///
/// ```toml
/// [providers.gemini.tiers.free.models."gemini-2.5-flash-image"]
/// rpm = 10
/// rpd = 100
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct ModelTierConfig {
    /// Requests per minute limit (overrides tier default)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpm: Option<u32>,

    /// Tokens per minute limit (overrides tier default)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tpm: Option<u64>,

    /// Requests per day limit (overrides tier default)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpd: Option<u32>,

    /// Maximum concurrent requests (overrides tier default)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrent: Option<u32>,
}

/// Configuration for a specific API tier.
///
/// `None` in any limit means unlimited.
///
/// ```toml
/// [providers.gemini.tiers.free]
/// name = "Free"
/// rpm = 10
/// tpm = 250_000
/// rpd = 250
/// max_concurrent = 1
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TierConfig {
    /// Name of the tier (e.g., "Free", "Tier 1")
    pub name: String,

    /// Requests per minute limit
    #[serde(default)]
    pub rpm: Option<u32>,

    /// Tokens per minute limit (informational, not enforced)
    #[serde(default)]
    pub tpm: Option<u64>,

    /// Requests per day limit
    #[serde(default)]
    pub rpd: Option<u32>,

    /// Maximum concurrent requests
    #[serde(default)]
    pub max_concurrent: Option<u32>,

    /// Model-specific rate limit overrides
    #[serde(default)]
    pub models: HashMap<String, ModelTierConfig>,
}

impl Tier for TierConfig {
    fn rpm(&self) -> Option<u32> {
        self.rpm
    }

    fn rpd(&self) -> Option<u32> {
        self.rpd
    }

    fn max_concurrent(&self) -> Option<u32> {
        self.max_concurrent
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TierConfig {
    /// Tier limits with the overrides for `model_name` applied.
    ///
    /// Returns a clone of the tier defaults when the model has no overrides.
    pub fn for_model(&self, model_name: &str) -> TierConfig {
        match self.models.get(model_name) {
            Some(model_config) => TierConfig {
                name: self.name.clone(),
                rpm: model_config.rpm.or(self.rpm),
                tpm: model_config.tpm.or(self.tpm),
                rpd: model_config.rpd.or(self.rpd),
                max_concurrent: model_config.max_concurrent.or(self.max_concurrent),
                models: HashMap::new(),
            },
            None => self.clone(),
        }
    }
}

/// Configuration for a specific provider.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// Name of the default tier for this provider
    pub default_tier: String,

    /// Map of tier name to tier configuration
    pub tiers: HashMap<String, TierConfig>,
}

/// Model identifiers used for each kind of request.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model used for text and structured requests
    pub text: String,
    /// Model used for image generation and editing
    pub image: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            text: DEFAULT_TEXT_MODEL.to_string(),
            image: DEFAULT_IMAGE_MODEL.to_string(),
        }
    }
}

/// Retry budget for throttled image requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Number of retries after the first attempt
    pub max_retries: usize,
    /// Delay before the first retry; doubled for each further retry
    pub initial_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 2000,
        }
    }
}

impl RetryConfig {
    /// Build the retry wrapper described by this configuration.
    pub fn throttle_retry(&self) -> ThrottleRetry {
        ThrottleRetry::new(
            self.max_retries,
            Duration::from_millis(self.initial_delay_ms),
        )
    }
}

/// Pause policy between consecutive batch requests.
///
/// ```toml
/// [pacing]
/// mode = "fixed"      # or "token_bucket"
/// delay_ms = 4000
/// per_minute = 15
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Which pacing strategy to use
    pub mode: PacingMode,
    /// Pause between requests in fixed mode
    pub delay_ms: u64,
    /// Sustained request rate in token bucket mode
    pub per_minute: u32,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            mode: PacingMode::Fixed,
            delay_ms: 4000,
            per_minute: 15,
        }
    }
}

impl PacingConfig {
    /// Build the pacer described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if token bucket mode is selected with a zero rate.
    pub fn pacer(&self) -> StoryforgeResult<RequestPacer> {
        match self.mode {
            PacingMode::Fixed => Ok(RequestPacer::fixed(Duration::from_millis(self.delay_ms))),
            PacingMode::TokenBucket => RequestPacer::token_bucket(self.per_minute),
            PacingMode::Immediate => Ok(RequestPacer::Immediate),
        }
    }
}

/// Texts returned when a service reply cannot be decoded.
///
/// These are user-facing labels, not a contract; every field can be
/// overridden under `[placeholders]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PlaceholderConfig {
    /// Title of the single fallback search result
    pub search_title: String,
    /// Summary of the single fallback search result
    pub search_summary: String,
    /// Title of a story that could not be drafted
    pub story_title: String,
    /// Summary of a story that could not be drafted
    pub story_summary: String,
    /// Character design of a fallback script
    pub character_design: String,
    /// Action description of the single fallback script panel
    pub script_action: String,
    /// Caption of the single fallback script panel
    pub script_caption: String,
    /// Critique of a fallback analysis
    pub analysis_critique: String,
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self {
            search_title: "Trend search unavailable".to_string(),
            search_summary: "The search results could not be read. Try another query or write your own story prompt.".to_string(),
            story_title: "Untitled Story".to_string(),
            story_summary: "The story could not be drafted from this prompt. Edit this summary or try again.".to_string(),
            character_design: "Character design unavailable.".to_string(),
            script_action: "Placeholder scene: the script could not be drafted.".to_string(),
            script_caption: "Script generation failed. Edit this caption or draft the script again.".to_string(),
            analysis_critique: "The analysis could not be read. Run the analysis again.".to_string(),
        }
    }
}

/// Top-level Storyforge configuration.
///
/// # Example
///
/// ```no_run
/// use storyforge_rate_limit::StoryforgeConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = StoryforgeConfig::load()?;
/// let tier = config.get_tier("gemini", None);
/// println!("Text model: {}", config.models.text);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct StoryforgeConfig {
    /// Map of provider name to provider configuration
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    /// Model identifiers
    #[serde(default)]
    pub models: ModelConfig,

    /// Throttle retry budget
    #[serde(default)]
    pub retry: RetryConfig,

    /// Batch pacing
    #[serde(default)]
    pub pacing: PacingConfig,

    /// Fallback texts for undecodable replies
    #[serde(default)]
    pub placeholders: PlaceholderConfig,
}

impl StoryforgeConfig {
    /// Load configuration from a specific file path.
    ///
    /// Fields missing from the file take their built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> StoryforgeResult<Self> {
        debug!("Loading configuration from file");

        Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                StoryforgeError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                StoryforgeError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Load configuration with precedence: current dir > home dir > bundled defaults.
    ///
    /// User config files are optional and silently skipped if absent.
    #[instrument]
    pub fn load() -> StoryforgeResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        const DEFAULT_CONFIG: &str = include_str!("../../../storyforge.toml");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/storyforge/storyforge.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("storyforge").required(false));

        builder
            .build()
            .map_err(|e| {
                StoryforgeError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                StoryforgeError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Get tier configuration for a provider.
    ///
    /// Uses the provider's default tier when `tier_name` is `None`.
    #[instrument(skip(self))]
    pub fn get_tier(&self, provider: &str, tier_name: Option<&str>) -> Option<TierConfig> {
        let provider_config = self.providers.get(provider)?;

        let tier = tier_name.unwrap_or(&provider_config.default_tier);

        debug!(provider, tier, "Looking up tier configuration");

        provider_config.tiers.get(tier).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_model_applies_overrides() {
        let mut models = HashMap::new();
        models.insert(
            "gemini-2.5-flash-image".to_string(),
            ModelTierConfig {
                rpm: Some(2),
                ..Default::default()
            },
        );
        let tier = TierConfig {
            name: "Free".to_string(),
            rpm: Some(10),
            tpm: None,
            rpd: Some(250),
            max_concurrent: Some(1),
            models,
        };

        let image = tier.for_model("gemini-2.5-flash-image");
        assert_eq!(image.rpm(), Some(2));
        assert_eq!(image.rpd(), Some(250));

        let text = tier.for_model("gemini-2.5-flash");
        assert_eq!(text.rpm(), Some(10));
    }

    #[test]
    fn test_defaults_match_documented_budget() {
        let config = StoryforgeConfig::default();
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.retry.initial_delay_ms, 2000);
        assert_eq!(config.pacing.mode, PacingMode::Fixed);
        assert_eq!(config.pacing.delay_ms, 4000);
        assert_eq!(config.models.text, DEFAULT_TEXT_MODEL);
    }
}
