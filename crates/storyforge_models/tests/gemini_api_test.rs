#![cfg(feature = "api")]

// Live Gemini API tests.
//
// These call the real service and need GEMINI_API_KEY. Run with:
//     cargo test -p storyforge_models --features api

use storyforge_core::{GenerateRequest, Message, Modality};
use storyforge_interface::StoryforgeDriver;
use storyforge_models::GeminiClient;

#[tokio::test]
async fn test_live_text_generation() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let client = GeminiClient::new()?;

    let request = GenerateRequest::builder()
        .messages(vec![Message::user_text("Reply with the single word: ready")])
        .max_tokens(Some(20))
        .build()?;
    let response = client.generate(&request).await?;

    assert!(!response.text().trim().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_live_structured_output() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let client = GeminiClient::new()?;

    let request = GenerateRequest::builder()
        .messages(vec![Message::user_text(
            "Invent a one-line story. Return its title and summary.",
        )])
        .response_schema(Some(serde_json::json!({
            "type": "OBJECT",
            "properties": {
                "title": {"type": "STRING"},
                "summary": {"type": "STRING"}
            },
            "required": ["title", "summary"]
        })))
        .build()?;
    let response = client.generate(&request).await?;

    let value: serde_json::Value = serde_json::from_str(&response.text())?;
    assert!(value["title"].is_string());
    Ok(())
}

#[tokio::test]
async fn test_live_image_generation() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let client = GeminiClient::new()?;

    let request = GenerateRequest::builder()
        .messages(vec![Message::user_text("A small red circle on white.")])
        .response_modalities(vec![Modality::Text, Modality::Image])
        .build()?;
    let response = client.generate(&request).await?;

    assert!(response.first_image().is_some());
    Ok(())
}
