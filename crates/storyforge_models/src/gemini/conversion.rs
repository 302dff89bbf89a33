//! Conversion between Storyforge requests and Gemini wire types.

use super::GeminiResult;
use super::dto::{
    GeminiContent, GeminiErrorEnvelope, GeminiPart, GeminiRequest, GeminiResponse, GeminiTool,
    GenerationConfig,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use storyforge_core::{
    DEFAULT_IMAGE_MIME, GenerateRequest, GenerateResponse, GeneratedImage, Input, Output, Role,
};
use storyforge_error::{GeminiError, GeminiErrorKind};
use tracing::{debug, warn};

const JSON_MIME: &str = "application/json";

/// Build the wire request for `req`.
///
/// System messages become the system instruction. A response schema is
/// dropped when grounding is requested, because the endpoint rejects the
/// combination.
pub fn to_gemini_request(req: &GenerateRequest) -> GeminiRequest {
    let mut system_parts = Vec::new();
    let mut contents = Vec::new();

    for message in &req.messages {
        let parts: Vec<GeminiPart> = message.content.iter().map(input_to_part).collect();
        match message.role {
            Role::System => system_parts.extend(parts),
            Role::User => contents.push(GeminiContent {
                role: Some("user".to_string()),
                parts,
            }),
            Role::Assistant => contents.push(GeminiContent {
                role: Some("model".to_string()),
                parts,
            }),
        }
    }

    let system_instruction = (!system_parts.is_empty()).then(|| GeminiContent {
        role: None,
        parts: system_parts,
    });

    let response_schema = match (&req.response_schema, req.grounding) {
        (Some(_), true) => {
            debug!("Grounded request cannot carry a response schema; dropping schema");
            None
        }
        (schema, _) => schema.clone(),
    };

    let response_modalities: Vec<String> = req
        .response_modalities
        .iter()
        .map(ToString::to_string)
        .collect();

    let generation_config = if req.max_tokens.is_some()
        || req.temperature.is_some()
        || response_schema.is_some()
        || !response_modalities.is_empty()
    {
        Some(GenerationConfig {
            max_output_tokens: req.max_tokens,
            temperature: req.temperature,
            response_mime_type: response_schema.as_ref().map(|_| JSON_MIME.to_string()),
            response_schema,
            response_modalities,
        })
    } else {
        None
    };

    let tools = if req.grounding {
        vec![GeminiTool::google_search()]
    } else {
        Vec::new()
    };

    GeminiRequest {
        contents,
        system_instruction,
        generation_config,
        tools,
    }
}

fn input_to_part(input: &Input) -> GeminiPart {
    match input {
        Input::Text(text) => GeminiPart::text(text.clone()),
        Input::Image { mime, source } => GeminiPart::inline(
            mime.clone().unwrap_or_else(|| DEFAULT_IMAGE_MIME.to_string()),
            source.to_base64(),
        ),
    }
}

/// Convert a wire reply into outputs.
///
/// Text parts and inline images of the first candidate are kept in order;
/// reasoning parts are skipped.
///
/// # Errors
///
/// `EmptyResponse` when there is no candidate content (including blocked
/// prompts), `Base64Decode` when inline data is not valid base64.
pub fn from_gemini_response(response: GeminiResponse) -> GeminiResult<GenerateResponse> {
    let candidate = response.candidates.into_iter().next();

    let Some(content) = candidate.as_ref().and_then(|c| c.content.as_ref()) else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .or_else(|| candidate.and_then(|c| c.finish_reason))
            .unwrap_or_else(|| "UNKNOWN".to_string());
        warn!(reason = %reason, "Gemini reply carried no content");
        return Err(GeminiError::new(GeminiErrorKind::EmptyResponse));
    };

    let mut outputs = Vec::with_capacity(content.parts.len());
    for part in &content.parts {
        if part.thought == Some(true) {
            continue;
        }
        if let Some(text) = &part.text {
            outputs.push(Output::Text(text.clone()));
        }
        if let Some(inline) = &part.inline_data {
            let data = STANDARD.decode(inline.data.trim()).map_err(|e| {
                GeminiError::new(GeminiErrorKind::Base64Decode(e.to_string()))
            })?;
            let mime = if inline.mime_type.is_empty() {
                DEFAULT_IMAGE_MIME.to_string()
            } else {
                inline.mime_type.clone()
            };
            outputs.push(Output::Image(GeneratedImage::new(mime, data)));
        }
    }

    if outputs.is_empty() {
        return Err(GeminiError::new(GeminiErrorKind::EmptyResponse));
    }

    Ok(GenerateResponse { outputs })
}

/// Map a non-success HTTP reply to an error.
///
/// The canonical status (e.g. `RESOURCE_EXHAUSTED`) is kept in the message
/// so throttle classification can see it.
pub fn error_from_status(status_code: u16, body: &str) -> GeminiError {
    let message = match serde_json::from_str::<GeminiErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.status.is_empty() => {
            format!("{}: {}", envelope.error.status, envelope.error.message)
        }
        Ok(envelope) => envelope.error.message,
        Err(_) => body.trim().to_string(),
    };

    GeminiError::new(GeminiErrorKind::HttpError {
        status_code,
        message,
    })
}
