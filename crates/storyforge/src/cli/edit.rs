//! Command handlers that work on a saved book.

use super::Session;
use super::draft::{print_json, print_report};
use super::session::load_book;
use std::path::Path;
use storyforge::{
    AnalysisResult, CheckpointObserver, EbookError, EbookErrorKind, RefinedContent, Slot,
    StoryforgeResult,
};
use tracing::{info, instrument};

/// Illustrate every slot that still needs an image, then save.
#[instrument(skip(config))]
pub async fn illustrate(config: Option<&Path>, path: &Path) -> StoryforgeResult<()> {
    let mut session = Session::with_book(config, path).await?;
    let (studio, book) = session.studio_and_book()?;

    let report = studio.illustrate_book(book, &mut CheckpointObserver::new(path)).await;
    book.save(path).await?;

    print_report(&report);
    Ok(())
}

/// Run a marketability analysis, store it on the book and print it.
#[instrument(skip(config))]
pub async fn analyze(config: Option<&Path>, path: &Path) -> StoryforgeResult<()> {
    let mut session = Session::with_book(config, path).await?;
    let (studio, book) = session.studio_and_book()?;

    let analysis = studio.analyze_marketability(book).await?;
    print_analysis(&analysis);
    book.analysis = Some(analysis);
    book.save(path).await?;
    Ok(())
}

/// Propose a refinement; with `apply`, accept it wholesale and save.
///
/// Uses the stored analysis, running a fresh one when the book has none.
#[instrument(skip(config))]
pub async fn refine(config: Option<&Path>, path: &Path, apply: bool) -> StoryforgeResult<()> {
    let mut session = Session::with_book(config, path).await?;
    let (studio, book) = session.studio_and_book()?;

    let analysis = match book.analysis.clone() {
        Some(analysis) => analysis,
        None => {
            info!("Book has no analysis yet; analyzing first");
            let analysis = studio.analyze_marketability(book).await?;
            book.analysis = Some(analysis.clone());
            analysis
        }
    };

    let refinement = studio.refine_content(book, &analysis).await?;
    print_refinement(&refinement);

    if apply {
        let changed = book.apply_refinement(&refinement);
        println!("Applied: {} captions updated", changed);
    }
    book.save(path).await?;
    Ok(())
}

/// Replace one caption and save.
#[instrument(skip(text))]
pub async fn caption(path: &Path, index: u32, text: &str) -> StoryforgeResult<()> {
    let mut book = load_book(path).await?;
    book.set_caption(index, text)?;
    book.save(path).await?;
    println!("Panel {} caption updated", index);
    Ok(())
}

/// Edit the image in `slot` following `instruction` and save.
#[instrument(skip(config))]
pub async fn edit_image(
    config: Option<&Path>,
    path: &Path,
    slot: Slot,
    instruction: &str,
) -> StoryforgeResult<()> {
    let mut session = Session::with_book(config, path).await?;
    let (studio, book) = session.studio_and_book()?;

    let current = match slot {
        Slot::Cover => book.cover.image.clone(),
        Slot::Panel(index) => book
            .panel(index)
            .ok_or_else(|| EbookError::new(EbookErrorKind::UnknownPanel(index)))?
            .image
            .clone(),
    }
    .ok_or_else(|| {
        EbookError::new(EbookErrorKind::InvalidSlot(format!(
            "{} has no image to edit",
            slot
        )))
    })?;

    let edited = studio.edit_image(&current, instruction).await?;
    book.set_image(slot, edited)?;
    book.save(path).await?;
    println!("Edited {}", slot);
    Ok(())
}

/// Write every illustration to `dir`.
#[instrument]
pub async fn export(path: &Path, dir: &Path) -> StoryforgeResult<()> {
    let book = load_book(path).await?;
    let written = book.export_images(dir).await?;

    if written.is_empty() {
        println!("The book has no illustrations yet.");
    }
    for file in &written {
        println!("{}", file.display());
    }
    Ok(())
}

fn print_analysis(analysis: &AnalysisResult) {
    println!("Score: {:.1}/10 ({})", analysis.score, analysis.viral_potential);
    if !analysis.critique.is_empty() {
        println!("Critique: {}", analysis.critique);
    }
    if !analysis.coherence_check.is_empty() {
        println!("Coherence: {}", analysis.coherence_check);
    }
    if !analysis.text_quality.is_empty() {
        println!("Text: {}", analysis.text_quality);
    }
    if !analysis.visual_quality.is_empty() {
        println!("Visuals: {}", analysis.visual_quality);
    }
    for suggestion in &analysis.suggestions {
        println!("  - {}", suggestion);
    }
}

fn print_refinement(refinement: &RefinedContent) {
    if let Err(e) = print_json(refinement) {
        tracing::warn!(error = %e, "Could not print refinement");
    }
}
