//! Decoding structured data from model replies.
//!
//! Replies are supposed to be bare JSON, but models wrap it in markdown
//! fences, prepend chatter, or (with search grounding) cannot be
//! schema-constrained at all. [`decode_structured`] runs a chain of
//! extraction strategies and returns the first candidate that deserializes
//! into the requested type.

use serde::de::DeserializeOwned;
use storyforge_error::{BackendError, StoryforgeResult};
use tracing::{debug, warn};

/// Top-level JSON shape a caller expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum JsonShape {
    /// `[ ... ]`
    #[display("array")]
    Array,
    /// `{ ... }`
    #[display("object")]
    Object,
}

impl JsonShape {
    fn delimiters(self) -> (char, char) {
        match self {
            JsonShape::Array => ('[', ']'),
            JsonShape::Object => ('{', '}'),
        }
    }
}

/// One way of pulling candidate JSON text out of a reply.
pub trait ExtractionStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Candidate JSON texts, most likely first.
    fn candidates(&self, raw: &str, shape: JsonShape) -> Vec<String>;
}

/// The whole reply is the JSON value (schema-constrained output).
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictJson;

impl ExtractionStrategy for StrictJson {
    fn name(&self) -> &'static str {
        "strict"
    }

    fn candidates(&self, raw: &str, _shape: JsonShape) -> Vec<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Vec::new()
        } else {
            vec![trimmed.to_string()]
        }
    }
}

/// The JSON sits inside a markdown code fence.
#[derive(Debug, Clone, Copy, Default)]
pub struct FencedBlock;

impl ExtractionStrategy for FencedBlock {
    fn name(&self) -> &'static str {
        "fenced"
    }

    fn candidates(&self, raw: &str, _shape: JsonShape) -> Vec<String> {
        extract_from_code_block(raw, "json").into_iter().collect()
    }
}

/// The first balanced bracket-delimited value in the text.
///
/// Every opening delimiter is tried in order, so a stray `[1]` citation
/// ahead of the real array does not hide it.
#[derive(Debug, Clone, Copy, Default)]
pub struct BracketScan;

impl ExtractionStrategy for BracketScan {
    fn name(&self) -> &'static str {
        "bracket-scan"
    }

    fn candidates(&self, raw: &str, shape: JsonShape) -> Vec<String> {
        let (open, close) = shape.delimiters();
        raw.match_indices(open)
            .filter_map(|(start, _)| extract_balanced(&raw[start..], open, close))
            .collect()
    }
}

/// An ordered chain of extraction strategies.
pub struct StructuredDecoder {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl std::fmt::Debug for StructuredDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.strategies.iter().map(|s| s.name()).collect();
        f.debug_struct("StructuredDecoder")
            .field("strategies", &names)
            .finish()
    }
}

impl Default for StructuredDecoder {
    /// Strict, then fenced, then bracket scan.
    fn default() -> Self {
        Self::new(vec![
            Box::new(StrictJson),
            Box::new(FencedBlock),
            Box::new(BracketScan),
        ])
    }
}

impl StructuredDecoder {
    /// A decoder running `strategies` in order.
    pub fn new(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Decode `raw` into `T`.
    ///
    /// # Errors
    ///
    /// Returns a backend error when no strategy yields a candidate that
    /// deserializes into `T`.
    pub fn decode<T: DeserializeOwned>(&self, raw: &str, shape: JsonShape) -> StoryforgeResult<T> {
        let mut last_error = None;

        for strategy in &self.strategies {
            for candidate in strategy.candidates(raw, shape) {
                match serde_json::from_str::<T>(&candidate) {
                    Ok(value) => {
                        debug!(strategy = strategy.name(), %shape, "Decoded structured reply");
                        return Ok(value);
                    }
                    Err(e) => {
                        debug!(strategy = strategy.name(), error = %e, "Candidate rejected");
                        last_error = Some(e.to_string());
                    }
                }
            }
        }

        let preview: String = raw.chars().take(100).collect();
        warn!(
            response_length = raw.len(),
            preview = %preview,
            "No structured {} found in reply",
            shape
        );

        Err(BackendError::new(format!(
            "No {} found in reply (length: {}){}",
            shape,
            raw.len(),
            last_error
                .map(|e| format!(", last parse error: {}", e))
                .unwrap_or_default()
        ))
        .into())
    }
}

/// Decode `raw` into `T` with the default strategy chain.
///
/// # Examples
///
/// ```
/// use storyforge_ebook::{decode_structured, JsonShape};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Idea {
///     title: String,
/// }
///
/// let reply = "Sure! Here you go:\n```json\n{\"title\": \"Dawn\"}\n```";
/// let idea: Idea = decode_structured(reply, JsonShape::Object).unwrap();
/// assert_eq!(idea.title, "Dawn");
/// ```
pub fn decode_structured<T: DeserializeOwned>(raw: &str, shape: JsonShape) -> StoryforgeResult<T> {
    StructuredDecoder::default().decode(raw, shape)
}

/// Extract content from a markdown code block.
///
/// Prefers a fence tagged with `language`, then any fence. An unclosed
/// fence (truncated reply) yields everything after it.
fn extract_from_code_block(response: &str, language: &str) -> Option<String> {
    let pattern = format!("```{}", language);

    if let Some(start) = response.find(&pattern) {
        let content_start = start + pattern.len();
        return Some(match response[content_start..].find("```") {
            Some(end) => response[content_start..content_start + end].trim().to_string(),
            None => response[content_start..].trim().to_string(),
        });
    }

    let start = response.find("```")?;
    let content_start = start + 3;
    let skip_to = response[content_start..]
        .find('\n')
        .map(|n| content_start + n + 1)
        .unwrap_or(content_start);

    Some(match response[skip_to..].find("```") {
        Some(end) => response[skip_to..skip_to + end].trim().to_string(),
        None => response[skip_to..].trim().to_string(),
    })
}

/// Extract the balanced value starting at the first character of `text`.
fn extract_balanced(text: &str, open: char, close: char) -> Option<String> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in text.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            c if c == open && !in_string => depth += 1,
            c if c == close && !in_string => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(text[..i + ch.len_utf8()].to_string());
                }
            }
            _ => {}
        }
    }

    None
}
