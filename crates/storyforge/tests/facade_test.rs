//! Tests that the facade wires the workspace crates together.

use std::time::Duration;
use storyforge::{
    GeminiClient, Metadata, RequestPacer, StoryStudio, StoryforgeConfig, StoryforgeDriver,
    log_filter,
};
use tracing_subscriber::filter::LevelFilter;

#[test]
fn test_verbose_filter_enables_debug() {
    assert_eq!(log_filter(true).max_level_hint(), Some(LevelFilter::DEBUG));
}

#[test]
fn test_studio_from_bundled_config() -> anyhow::Result<()> {
    let config = StoryforgeConfig::load()?;
    let client = GeminiClient::with_api_key("test-key", &config, None)?;

    assert_eq!(client.provider_name(), "gemini");
    assert_eq!(client.model_name(), config.models.text);
    assert_eq!(client.image_model(), config.models.image);
    assert!(client.metadata().supports_image_generation);

    let studio = StoryStudio::from_config(client, &config)?;
    assert!(matches!(
        studio.pacer(),
        RequestPacer::Fixed(delay) if *delay == Duration::from_millis(4000)
    ));
    Ok(())
}

#[test]
fn test_explicit_config_file_overrides_pacing() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("storyforge.toml");
    std::fs::write(
        &path,
        r#"
[pacing]
mode = "immediate"
"#,
    )?;

    let config = StoryforgeConfig::from_file(&path)?;
    let studio = StoryStudio::from_config(
        GeminiClient::with_api_key("test-key", &config, None)?,
        &config,
    )?;

    assert!(matches!(studio.pacer(), RequestPacer::Immediate));
    Ok(())
}
