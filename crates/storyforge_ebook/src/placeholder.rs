//! Clearly labelled results returned when a reply cannot be decoded.

use crate::Book;
use storyforge_core::{
    AnalysisResult, RefinedContent, ScriptDraft, ScriptPanel, Story, TargetAudience,
    ViralPotential,
};
use storyforge_rate_limit::PlaceholderConfig;

/// Id of the single fallback search result.
pub const FALLBACK_SEARCH_ID: &str = "fallback-1";

/// Source label of the single fallback search result.
pub const FALLBACK_SEARCH_SOURCE: &str = "Search System";

/// Source label of stories authored from a prompt.
pub const USER_PROMPT_SOURCE: &str = "User Prompt";

/// The single entry returned when search results are unreadable.
pub fn search_results(texts: &PlaceholderConfig, audience: TargetAudience) -> Vec<Story> {
    let mut story = Story::new(
        texts.search_title.clone(),
        texts.search_summary.clone(),
        FALLBACK_SEARCH_SOURCE,
    );
    story.id = FALLBACK_SEARCH_ID.to_string();
    story.audience = audience;
    vec![story]
}

/// A story standing in for one that could not be drafted.
pub fn story(texts: &PlaceholderConfig, audience: TargetAudience) -> Story {
    let mut story = Story::new(
        texts.story_title.clone(),
        texts.story_summary.clone(),
        USER_PROMPT_SOURCE,
    );
    story.audience = audience;
    story
}

/// A one-panel script standing in for one that could not be drafted.
pub fn script(texts: &PlaceholderConfig, story: &Story) -> ScriptDraft {
    ScriptDraft {
        visual_style: story.visual_style.to_string(),
        character_design: texts.character_design.clone(),
        panels: vec![ScriptPanel {
            action_description: texts.script_action.clone(),
            caption: texts.script_caption.clone(),
        }],
    }
}

/// A zero-score analysis explaining that the reply was unreadable.
pub fn analysis(texts: &PlaceholderConfig) -> AnalysisResult {
    AnalysisResult {
        score: 0.0,
        viral_potential: ViralPotential::Low,
        coherence_check: String::new(),
        critique: texts.analysis_critique.clone(),
        text_quality: String::new(),
        visual_quality: String::new(),
        suggestions: Vec::new(),
    }
}

/// A refinement that keeps the book as it is.
pub fn refinement(book: &Book) -> RefinedContent {
    RefinedContent {
        new_title: book.story.title.clone(),
        new_summary: book.story.summary.clone(),
        refined_panels: Vec::new(),
    }
}
