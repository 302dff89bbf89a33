//! Instruction text for each request the studio sends.

use crate::Book;
use storyforge_core::{AnalysisResult, Panel, Story, TargetAudience};

/// Trend search over the web, answered as a JSON array.
pub fn search_prompt(query: &str, audience: TargetAudience) -> String {
    format!(
        "Search the web for stories, news items, legends or viral posts that are trending right now \
         and match this theme: \"{query}\".\n\
         Pick up to 5 that would make a compelling short illustrated book for a {audience} audience.\n\
         Respond with ONLY a JSON array, no commentary. Each element must be an object with the keys \
         \"title\" (a catchy book title), \"summary\" (two or three sentences) and \"source\" \
         (the site or outlet the story came from)."
    )
}

/// Turn a free-form idea into a titled story.
pub fn story_prompt(prompt: &str, audience: TargetAudience) -> String {
    format!(
        "Develop this idea into a story for a short illustrated book aimed at a {audience} audience:\n\
         \"{prompt}\"\n\
         Return a JSON object with a catchy \"title\" and a \"summary\" of two or three sentences."
    )
}

/// Break a story into exactly [`Story::requested_panels`] illustrated pages.
pub fn script_prompt(story: &Story) -> String {
    format!(
        "Write the script for an illustrated book.\n\
         Title: {title}\n\
         Summary: {summary}\n\
         Audience: {audience}\n\
         Art style: {style}\n\
         Layout: {layout}\n\n\
         Produce exactly {count} panels in reading order. For each panel give an \
         \"actionDescription\" (a concrete visual description of the scene for an illustrator) and a \
         \"caption\" (the text printed on the page, at most two sentences).\n\
         Also give \"visualStyle\" (art direction that fits the requested style) and \
         \"characterDesign\" (a precise description of every recurring character so they look the \
         same on every page).",
        title = story.title,
        summary = story.summary,
        audience = story.audience,
        style = story.visual_style,
        layout = story.layout,
        count = story.requested_panels(),
    )
}

fn manuscript(book: &Book) -> String {
    book.panels
        .iter()
        .map(|p| {
            format!(
                "Panel {}: {}\n  Illustration: {}{}",
                p.index,
                p.caption,
                p.prompt,
                if p.image.is_some() { "" } else { " (not yet illustrated)" }
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Critique the book's marketability on a 0-10 scale.
pub fn analysis_prompt(book: &Book) -> String {
    format!(
        "You are an acquisitions editor for illustrated books. Assess this book for a {audience} \
         audience.\n\
         Title: {title}\n\
         Summary: {summary}\n\
         Art style: {style}\n\n\
         {manuscript}\n\n\
         Return a JSON object with: \"score\" (0 to 10), \"viralPotential\" (one of Low, Medium, \
         High, Viral Hit), \"coherenceCheck\" (does the story hold together page to page), \
         \"critique\" (overall assessment), \"textQuality\", \"visualQuality\" and \"suggestions\" \
         (a list of concrete improvements).",
        audience = book.story.audience,
        title = book.story.title,
        summary = book.story.summary,
        style = book.story.visual_style,
        manuscript = manuscript(book),
    )
}

/// Rewrite title, summary and captions following an analysis.
pub fn refine_prompt(book: &Book, analysis: &AnalysisResult) -> String {
    let suggestions = if analysis.suggestions.is_empty() {
        "(none)".to_string()
    } else {
        analysis
            .suggestions
            .iter()
            .map(|s| format!("- {}", s))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "Improve this illustrated book using the editor's feedback.\n\
         Title: {title}\n\
         Summary: {summary}\n\n\
         {manuscript}\n\n\
         Critique: {critique}\n\
         Suggestions:\n{suggestions}\n\n\
         Return a JSON object with \"newTitle\", \"newSummary\" and \"refinedPanels\": a list of \
         {{\"id\", \"caption\"}} objects, where \"id\" is the panel number. Only include panels whose \
         caption you changed.",
        title = book.story.title,
        summary = book.story.summary,
        manuscript = manuscript(book),
        critique = analysis.critique,
    )
}

/// Cover art for the whole book.
pub fn cover_prompt(book: &Book) -> String {
    format!(
        "Create the cover illustration for a book titled \"{title}\".\n\
         Story: {summary}\n\
         Art style: {style}. {art_direction}\n\
         Characters: {characters}\n\
         Make it eye-catching for a {audience} audience. Leave space for the title but do not draw \
         any lettering.",
        title = book.story.title,
        summary = book.story.summary,
        style = book.story.visual_style,
        art_direction = book.art_direction,
        characters = book.character_design,
        audience = book.story.audience,
    )
}

/// Illustration for one panel.
pub fn panel_prompt(book: &Book, panel: &Panel) -> String {
    format!(
        "Illustrate page {index} of the book \"{title}\".\n\
         Scene: {scene}\n\
         Art style: {style}. {art_direction}\n\
         Characters: {characters}\n\
         Layout: {layout}. Keep characters consistent with the description. Do not draw any text, \
         captions or speech bubbles.",
        index = panel.index,
        title = book.story.title,
        scene = panel.prompt,
        style = book.story.visual_style,
        art_direction = book.art_direction,
        characters = book.character_design,
        layout = book.story.layout,
    )
}

/// Edit an existing illustration.
pub fn edit_prompt(instruction: &str) -> String {
    format!(
        "Edit the attached illustration as follows: {instruction}\n\
         Keep the composition, art style and characters unchanged except where the instruction says \
         otherwise. Return the edited image."
    )
}
