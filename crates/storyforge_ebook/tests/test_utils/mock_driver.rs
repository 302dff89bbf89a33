//! Mock driver for testing.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use storyforge_core::{GenerateRequest, GenerateResponse, GeneratedImage, Output};
use storyforge_error::{GeminiError, GeminiErrorKind, StoryforgeError, StoryforgeResult};
use storyforge_interface::StoryforgeDriver;
use tokio::time::Instant;

/// A single mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Reply with one text part
    Text(String),
    /// Reply with a caption and an inline image
    Image(GeneratedImage),
    /// Fail with the given error
    Error(GeminiErrorKind),
}

/// Behavior configuration for mock responses.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Always return the same response
    Always(MockResponse),
    /// Return responses in order; fail once exhausted
    Sequence(Vec<MockResponse>),
}

/// A request the mock received.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// The request as sent
    pub request: GenerateRequest,
    /// When it arrived (tokio clock, so paused tests see virtual time)
    pub at: Instant,
}

impl RecordedCall {
    /// All text inputs of the request, joined.
    pub fn prompt(&self) -> String {
        self.request
            .messages
            .iter()
            .flat_map(|m| m.content.iter())
            .filter_map(|input| match input {
                storyforge_core::Input::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Mock driver that replays scripted responses and records every call.
#[derive(Clone)]
pub struct MockDriver {
    behavior: MockBehavior,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockDriver {
    /// A mock that always replies with `text`.
    pub fn new_text(text: impl Into<String>) -> Self {
        Self::new_with_behavior(MockBehavior::Always(MockResponse::Text(text.into())))
    }

    /// A mock that always replies with `image`.
    pub fn new_image(image: GeneratedImage) -> Self {
        Self::new_with_behavior(MockBehavior::Always(MockResponse::Image(image)))
    }

    /// A mock that always fails with `error`.
    pub fn new_error(error: GeminiErrorKind) -> Self {
        Self::new_with_behavior(MockBehavior::Always(MockResponse::Error(error)))
    }

    /// A mock replaying `responses` in order.
    pub fn new_sequence(responses: Vec<MockResponse>) -> Self {
        Self::new_with_behavior(MockBehavior::Sequence(responses))
    }

    /// A mock with custom behavior.
    pub fn new_with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of generate() calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Every recorded call, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn next_response(&self, call_index: usize) -> StoryforgeResult<GenerateResponse> {
        let response = match &self.behavior {
            MockBehavior::Always(response) => response.clone(),
            MockBehavior::Sequence(responses) => match responses.get(call_index) {
                Some(response) => response.clone(),
                None => MockResponse::Error(GeminiErrorKind::ApiRequest(format!(
                    "Mock sequence exhausted (call {} beyond {} responses)",
                    call_index + 1,
                    responses.len()
                ))),
            },
        };

        match response {
            MockResponse::Text(text) => Ok(GenerateResponse {
                outputs: vec![Output::Text(text)],
            }),
            MockResponse::Image(image) => Ok(GenerateResponse {
                outputs: vec![
                    Output::Text("Here is the illustration.".to_string()),
                    Output::Image(image),
                ],
            }),
            MockResponse::Error(kind) => Err(StoryforgeError::from(GeminiError::new(kind))),
        }
    }
}

#[async_trait]
impl StoryforgeDriver for MockDriver {
    async fn generate(&self, req: &GenerateRequest) -> StoryforgeResult<GenerateResponse> {
        let call_index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(RecordedCall {
                request: req.clone(),
                at: Instant::now(),
            });
            calls.len() - 1
        };
        self.next_response(call_index)
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// A 429 quota error.
pub fn throttled() -> GeminiErrorKind {
    GeminiErrorKind::HttpError {
        status_code: 429,
        message: "RESOURCE_EXHAUSTED: quota exceeded".to_string(),
    }
}
