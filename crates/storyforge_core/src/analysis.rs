//! Marketability analysis and refinement proposals.

use serde::{Deserialize, Deserializer, Serialize};

/// Qualitative label for how well a book might sell.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    derive_more::Display,
    strum::EnumIter,
)]
#[serde(from = "String", into = "String")]
pub enum ViralPotential {
    /// Unlikely to find an audience
    #[default]
    #[display("Low")]
    Low,
    /// Some appeal
    #[display("Medium")]
    Medium,
    /// Strong appeal
    #[display("High")]
    High,
    /// Exceptional appeal
    #[display("Viral Hit")]
    ViralHit,
}

impl From<String> for ViralPotential {
    fn from(raw: String) -> Self {
        let normalized: String = raw
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "medium" => ViralPotential::Medium,
            "high" => ViralPotential::High,
            "viralhit" | "viral" => ViralPotential::ViralHit,
            _ => ViralPotential::Low,
        }
    }
}

impl From<ViralPotential> for String {
    fn from(value: ViralPotential) -> Self {
        value.to_string()
    }
}

/// Highest marketability score.
pub const MAX_SCORE: f32 = 10.0;

/// Snapshot of a marketability critique. Replaced on every analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Score from 0 to 10
    #[serde(deserialize_with = "clamped_score")]
    pub score: f32,
    /// Qualitative label
    pub viral_potential: ViralPotential,
    /// Whether text and images tell the same story
    #[serde(default)]
    pub coherence_check: String,
    /// Overall critique
    #[serde(default)]
    pub critique: String,
    /// Assessment of the captions
    #[serde(default)]
    pub text_quality: String,
    /// Assessment of the illustrations
    #[serde(default)]
    pub visual_quality: String,
    /// Concrete improvement suggestions
    #[serde(default)]
    pub suggestions: Vec<String>,
}

fn clamped_score<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f32::deserialize(deserializer)?;
    Ok(if raw.is_nan() { 0.0 } else { raw.clamp(0.0, MAX_SCORE) })
}

/// Replacement caption for one panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefinedPanel {
    /// Sequence index of the panel to update
    #[serde(deserialize_with = "lenient_index")]
    pub id: u32,
    /// New caption text
    pub caption: String,
}

/// Accepts `3`, `"3"` or `"panel-3"` style identifiers.
fn lenient_index<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| D::Error::custom(format!("panel id out of range: {}", n))),
        serde_json::Value::String(s) => {
            let digits: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
            digits
                .parse()
                .map_err(|_| D::Error::custom(format!("panel id is not numeric: {}", s)))
        }
        other => Err(D::Error::custom(format!("unexpected panel id: {}", other))),
    }
}

/// A proposed rewrite of title, summary and captions, applied wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinedContent {
    /// Replacement title
    pub new_title: String,
    /// Replacement summary
    #[serde(default)]
    pub new_summary: String,
    /// Replacement captions keyed by panel index
    #[serde(default)]
    pub refined_panels: Vec<RefinedPanel>,
}
