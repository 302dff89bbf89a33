//! Panels and the script drafts they are created from.

use crate::GeneratedImage;
use serde::{Deserialize, Serialize};

/// One page of the ebook: prompt, caption and (eventually) an illustration.
///
/// `index` is assigned when the script is drafted and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Panel {
    /// Sequence index, unique within a book
    pub index: u32,
    /// Prompt text used to generate the illustration
    pub prompt: String,
    /// Caption text shown on the page
    pub caption: String,
    /// Generated illustration, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<GeneratedImage>,
    /// An image request for this panel is in flight
    #[serde(default)]
    pub is_generating: bool,
    /// The last image request for this panel failed
    #[serde(default)]
    pub failed: bool,
}

impl Panel {
    /// A fresh panel without an image.
    pub fn new(index: u32, prompt: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            index,
            prompt: prompt.into(),
            caption: caption.into(),
            image: None,
            is_generating: false,
            failed: false,
        }
    }

    /// True when a batch pass should request an image for this panel.
    pub fn needs_image(&self) -> bool {
        self.image.is_none() && !self.is_generating
    }
}

/// One panel of a drafted script, as the service describes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptPanel {
    /// What happens in the illustration
    pub action_description: String,
    /// Text shown on the page
    #[serde(default)]
    pub caption: String,
}

/// A drafted multi-panel script.
///
/// # Examples
///
/// ```
/// use storyforge_core::ScriptDraft;
///
/// let json = r#"{
///     "visualStyle": "soft watercolor",
///     "characterDesign": "a girl in a yellow raincoat",
///     "panels": [{"actionDescription": "She opens the door", "caption": "It began to rain."}]
/// }"#;
/// let draft: ScriptDraft = serde_json::from_str(json).unwrap();
/// assert_eq!(draft.panels.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptDraft {
    /// Free-text description of the art direction
    #[serde(default)]
    pub visual_style: String,
    /// Description of the recurring characters, reused in every image prompt
    #[serde(default)]
    pub character_design: String,
    /// Ordered panels
    pub panels: Vec<ScriptPanel>,
}
