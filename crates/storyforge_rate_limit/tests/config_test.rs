//! Tests for layered configuration.

use std::io::Write;
use storyforge_rate_limit::{PacingMode, RequestPacer, StoryforgeConfig, Tier};
use tempfile::Builder;

#[test]
fn test_load_bundled_defaults() -> anyhow::Result<()> {
    let config = StoryforgeConfig::load()?;

    let gemini = &config.providers["gemini"];
    assert_eq!(gemini.default_tier, "free");

    let free = &gemini.tiers["free"];
    assert_eq!(free.name, "Free");
    assert_eq!(free.rpm, Some(10));
    assert_eq!(free.rpd, Some(250));

    assert_eq!(config.retry.max_retries, 3);
    assert_eq!(config.retry.initial_delay_ms, 2000);
    Ok(())
}

#[test]
fn test_get_tier_with_default_and_specific_name() -> anyhow::Result<()> {
    let config = StoryforgeConfig::load()?;

    let default_tier = config
        .get_tier("gemini", None)
        .ok_or_else(|| anyhow::anyhow!("missing default tier"))?;
    assert_eq!(default_tier.name(), "Free");

    let tier1 = config
        .get_tier("gemini", Some("tier1"))
        .ok_or_else(|| anyhow::anyhow!("missing tier1"))?;
    assert_eq!(tier1.max_concurrent(), Some(4));

    assert!(config.get_tier("gemini", Some("nonexistent")).is_none());
    assert!(config.get_tier("openai", None).is_none());
    Ok(())
}

#[test]
fn test_image_model_override() -> anyhow::Result<()> {
    let config = StoryforgeConfig::load()?;
    let tier = config
        .get_tier("gemini", None)
        .ok_or_else(|| anyhow::anyhow!("missing default tier"))?;

    let image = tier.for_model(&config.models.image);
    assert_eq!(image.rpd(), Some(100));
    Ok(())
}

#[test]
fn test_config_from_file_fills_missing_sections() -> anyhow::Result<()> {
    let mut temp_file = Builder::new().suffix(".toml").tempfile()?;
    writeln!(
        temp_file,
        r#"
[models]
text = "custom-text-model"

[pacing]
mode = "token_bucket"
per_minute = 30

[placeholders]
story_title = "Draft Pending"
"#
    )?;

    let config = StoryforgeConfig::from_file(temp_file.path())?;

    assert_eq!(config.models.text, "custom-text-model");
    assert_eq!(config.models.image, "gemini-2.5-flash-image");
    assert_eq!(config.pacing.mode, PacingMode::TokenBucket);
    assert_eq!(config.pacing.per_minute, 30);
    assert_eq!(config.pacing.delay_ms, 4000);
    assert_eq!(config.placeholders.story_title, "Draft Pending");
    assert_eq!(config.placeholders.search_title, "Trend search unavailable");
    assert_eq!(config.retry.max_retries, 3);

    assert!(matches!(
        config.pacing.pacer()?,
        RequestPacer::TokenBucket { .. }
    ));
    Ok(())
}

#[test]
fn test_config_from_missing_file_is_an_error() {
    let result = StoryforgeConfig::from_file("/nonexistent/storyforge.toml");
    assert!(result.is_err());
}

#[test]
fn test_retry_config_builds_wrapper() -> anyhow::Result<()> {
    let config = StoryforgeConfig::load()?;
    let retry = config.retry.throttle_retry();
    assert_eq!(*retry.max_retries(), 3);
    assert_eq!(retry.initial_delay().as_millis(), 2000);
    Ok(())
}
