//! Response schemas for schema-constrained requests.
//!
//! Schemas use the OpenAPI subset the Gemini API accepts (`OBJECT`,
//! `ARRAY`, `STRING`, `NUMBER`, `enum`, `required`).

use serde_json::{Value, json};
use storyforge_core::ViralPotential;
use strum::IntoEnumIterator;

fn viral_labels() -> Vec<String> {
    ViralPotential::iter().map(|p| p.to_string()).collect()
}

/// `{title, summary}` for a story drafted from a prompt.
pub fn story_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": {"type": "STRING"},
            "summary": {"type": "STRING"}
        },
        "required": ["title", "summary"]
    })
}

/// `{visualStyle, characterDesign, panels:[{actionDescription, caption}]}`
/// with exactly `panel_count` panels.
pub fn script_schema(panel_count: u32) -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "visualStyle": {"type": "STRING"},
            "characterDesign": {"type": "STRING"},
            "panels": {
                "type": "ARRAY",
                "minItems": panel_count,
                "maxItems": panel_count,
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "actionDescription": {"type": "STRING"},
                        "caption": {"type": "STRING"}
                    },
                    "required": ["actionDescription", "caption"]
                }
            }
        },
        "required": ["visualStyle", "characterDesign", "panels"]
    })
}

/// Marketability analysis with a 0-10 score and a fixed potential scale.
pub fn analysis_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "score": {"type": "NUMBER"},
            "viralPotential": {"type": "STRING", "enum": viral_labels()},
            "coherenceCheck": {"type": "STRING"},
            "critique": {"type": "STRING"},
            "textQuality": {"type": "STRING"},
            "visualQuality": {"type": "STRING"},
            "suggestions": {"type": "ARRAY", "items": {"type": "STRING"}}
        },
        "required": [
            "score",
            "viralPotential",
            "coherenceCheck",
            "critique",
            "textQuality",
            "visualQuality",
            "suggestions"
        ]
    })
}

/// `{newTitle, newSummary, refinedPanels:[{id, caption}]}`.
pub fn refinement_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "newTitle": {"type": "STRING"},
            "newSummary": {"type": "STRING"},
            "refinedPanels": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": {"type": "NUMBER"},
                        "caption": {"type": "STRING"}
                    },
                    "required": ["id", "caption"]
                }
            }
        },
        "required": ["newTitle", "newSummary", "refinedPanels"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_schema_pins_panel_count() {
        let schema = script_schema(4);
        assert_eq!(schema["properties"]["panels"]["minItems"], 4);
        assert_eq!(schema["properties"]["panels"]["maxItems"], 4);
    }

    #[test]
    fn test_analysis_schema_lists_potential_scale() {
        let schema = analysis_schema();
        assert_eq!(
            schema["properties"]["viralPotential"]["enum"],
            json!(["Low", "Medium", "High", "Viral Hit"])
        );
    }
}
