//! Gemini client tests against a local scripted endpoint.
//!
//! These exercise the full request path (wire building, headers, status
//! mapping, reply decoding) without calling the real API.

mod test_utils;

use std::time::Duration;
use storyforge_core::{GenerateRequest, GeneratedImage, Message, Modality};
use storyforge_error::{GeminiErrorKind, RetryableError, StoryforgeErrorKind};
use storyforge_interface::StoryforgeDriver;
use storyforge_models::GeminiClient;
use storyforge_rate_limit::{StoryforgeConfig, ThrottleRetry};
use test_utils::{CannedServer, image_reply, text_reply, throttled_reply};

fn client(server: &CannedServer) -> anyhow::Result<GeminiClient> {
    Ok(
        GeminiClient::with_api_key("test-key", &StoryforgeConfig::default(), None)?
            .with_base_url(&server.base_url),
    )
}

#[tokio::test]
async fn test_text_request_round_trip() -> anyhow::Result<()> {
    let server = CannedServer::start(vec![text_reply("Once upon a time")]).await?;
    let client = client(&server)?;

    let request = GenerateRequest::builder()
        .messages(vec![Message::user_text("Tell me a story")])
        .response_schema(Some(serde_json::json!({"type": "OBJECT"})))
        .build()?;
    let response = client.generate(&request).await?;

    assert_eq!(response.text(), "Once upon a time");

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    let captured = &requests[0];
    assert_eq!(captured.path, "/models/gemini-2.5-flash:generateContent");
    assert_eq!(captured.header("x-goog-api-key"), Some("test-key"));
    assert_eq!(
        captured.body["contents"][0]["parts"][0]["text"],
        "Tell me a story"
    );
    assert_eq!(
        captured.body["generationConfig"]["responseMimeType"],
        "application/json"
    );
    Ok(())
}

#[tokio::test]
async fn test_image_request_uses_image_model() -> anyhow::Result<()> {
    let server = CannedServer::start(vec![image_reply("image/png", "AQID")]).await?;
    let client = client(&server)?;

    let request = GenerateRequest::builder()
        .messages(vec![Message::user_text("Draw a fox")])
        .response_modalities(vec![Modality::Text, Modality::Image])
        .build()?;
    let response = client.generate(&request).await?;

    let image = response
        .first_image()
        .ok_or_else(|| anyhow::anyhow!("no image in reply"))?;
    assert_eq!(image, &GeneratedImage::new("image/png", vec![1, 2, 3]));
    assert_eq!(
        server.requests()[0].path,
        "/models/gemini-2.5-flash-image:generateContent"
    );
    Ok(())
}

#[tokio::test]
async fn test_quota_reply_is_throttled_error() -> anyhow::Result<()> {
    let server = CannedServer::start(vec![throttled_reply()]).await?;
    let client = client(&server)?;

    let request = GenerateRequest {
        messages: vec![Message::user_text("hi")],
        ..Default::default()
    };
    let err = client
        .generate(&request)
        .await
        .err()
        .ok_or_else(|| anyhow::anyhow!("expected an error"))?;

    assert!(err.is_throttled());
    match err.kind() {
        StoryforgeErrorKind::Gemini(gemini) => {
            assert!(matches!(
                gemini.kind,
                GeminiErrorKind::HttpError {
                    status_code: 429,
                    ..
                }
            ));
        }
        other => anyhow::bail!("unexpected error kind: {other}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_auth_failure_is_not_throttled() -> anyhow::Result<()> {
    let body = serde_json::json!({
        "error": {"code": 403, "message": "API key not valid", "status": "PERMISSION_DENIED"}
    });
    let server = CannedServer::start(vec![(403, body.to_string())]).await?;
    let client = client(&server)?;

    let request = GenerateRequest {
        messages: vec![Message::user_text("hi")],
        ..Default::default()
    };
    let err = client
        .generate(&request)
        .await
        .err()
        .ok_or_else(|| anyhow::anyhow!("expected an error"))?;

    assert!(!err.is_throttled());
    assert!(err.to_string().contains("PERMISSION_DENIED"));
    Ok(())
}

#[tokio::test]
async fn test_throttle_retry_recovers_from_quota_reply() -> anyhow::Result<()> {
    let server = CannedServer::start(vec![
        throttled_reply(),
        image_reply("image/png", "AQID"),
    ])
    .await?;
    let client = client(&server)?;
    let retry = ThrottleRetry::new(3, Duration::from_millis(10));

    let request = GenerateRequest::builder()
        .messages(vec![Message::user_text("Draw a fox")])
        .response_modalities(vec![Modality::Image])
        .build()?;
    let response = retry.run(|| client.generate(&request)).await?;

    assert!(response.first_image().is_some());
    assert_eq!(server.requests().len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_reply_without_candidates_is_empty_response() -> anyhow::Result<()> {
    let server = CannedServer::start(vec![(200, "{}".to_string())]).await?;
    let client = client(&server)?;

    let request = GenerateRequest {
        messages: vec![Message::user_text("hi")],
        ..Default::default()
    };
    let err = client
        .generate(&request)
        .await
        .err()
        .ok_or_else(|| anyhow::anyhow!("expected an error"))?;

    assert!(matches!(
        err.kind(),
        StoryforgeErrorKind::Gemini(gemini) if gemini.kind == GeminiErrorKind::EmptyResponse
    ));
    Ok(())
}

#[tokio::test]
async fn test_unparsable_success_body_is_malformed_response() -> anyhow::Result<()> {
    let server = CannedServer::start(vec![(200, "<html>gateway</html>".to_string())]).await?;
    let client = client(&server)?;

    let request = GenerateRequest {
        messages: vec![Message::user_text("hi")],
        ..Default::default()
    };
    let err = client
        .generate(&request)
        .await
        .err()
        .ok_or_else(|| anyhow::anyhow!("expected an error"))?;

    match err.kind() {
        StoryforgeErrorKind::Gemini(gemini) => {
            assert!(matches!(gemini.kind, GeminiErrorKind::MalformedResponse(_)));
            assert!(gemini.kind.is_unusable_reply());
        }
        other => anyhow::bail!("unexpected error kind: {other}"),
    }
    assert!(!err.is_throttled());
    Ok(())
}
