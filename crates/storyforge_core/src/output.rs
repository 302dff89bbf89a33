//! Output types from model responses.

use crate::GeneratedImage;
use serde::{Deserialize, Serialize};

/// Content parts a response can carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Output {
    /// Plain text output (including JSON emitted as text).
    Text(String),

    /// Generated image output.
    Image(GeneratedImage),
}
