//! Discovery and drafting command handlers.

use super::{OutputFormat, Session};
use std::path::Path;
use storyforge::{
    CheckpointObserver, EbookError, EbookErrorKind, IllustrationReport, JsonError, Story, StoryforgeResult,
    TargetAudience,
};
use tracing::{info, instrument};

/// File name of a saved book inside an output directory.
pub const BOOK_FILE: &str = "book.json";

/// Search for trending stories and print them.
#[instrument(skip(config))]
pub async fn discover(
    config: Option<&Path>,
    query: &str,
    audience: TargetAudience,
    format: OutputFormat,
) -> StoryforgeResult<()> {
    let session = Session::open(config)?;
    let stories = session.studio.find_trending_stories(query, audience).await?;

    match format {
        OutputFormat::Json => print_json(&stories)?,
        OutputFormat::Human => {
            if stories.is_empty() {
                println!("No stories found for \"{}\".", query);
            }
            for story in &stories {
                print_story(story);
            }
        }
    }
    Ok(())
}

/// Develop an idea into a story and print it.
#[instrument(skip(config, prompt))]
pub async fn create_story(
    config: Option<&Path>,
    prompt: &str,
    audience: TargetAudience,
    format: OutputFormat,
) -> StoryforgeResult<()> {
    let session = Session::open(config)?;
    let story = session.studio.draft_story_from_prompt(prompt, audience).await?;

    match format {
        OutputFormat::Json => print_json(&story)?,
        OutputFormat::Human => print_story(&story),
    }
    Ok(())
}

/// Script `story`, illustrate it and save the book under `out`.
///
/// The book is saved once scripted and again after every illustrated or
/// failed slot, so an interrupted batch can be resumed with
/// `storyforge illustrate`.
#[instrument(skip(config, story), fields(title = %story.title))]
pub async fn make_book(config: Option<&Path>, story: Story, out: &Path) -> StoryforgeResult<()> {
    let mut session = Session::open(config)?;
    session.context.select_story(story);
    let story = session.context.require_story()?.clone();

    let mut book = session.studio.create_book(story).await?;
    tokio::fs::create_dir_all(out).await.map_err(|e| {
        EbookError::new(EbookErrorKind::Io(format!(
            "Failed to create {}: {}",
            out.display(),
            e
        )))
    })?;
    let path = out.join(BOOK_FILE);
    book.save(&path).await?;
    info!(panels = book.panels.len(), path = %path.display(), "Script saved");

    let mut observer = CheckpointObserver::new(&path);
    let report = session.studio.illustrate_book(&mut book, &mut observer).await;
    book.save(&path).await?;

    print_report(&report);
    println!("Saved {}", path.display());
    Ok(())
}

pub(super) fn print_story(story: &Story) {
    println!("[{}] {}", story.id, story.title);
    println!("    {}", story.summary);
    println!("    source: {} | audience: {}", story.source, story.audience);
}

pub(super) fn print_report(report: &IllustrationReport) {
    println!(
        "Illustrations: {} generated, {} skipped, {} failed",
        report.generated.len(),
        report.skipped.len(),
        report.failed.len()
    );
    for failed in &report.failed {
        println!("  {}: {}", failed.slot, failed.advisory);
    }
}

pub(super) fn print_json<T: serde::Serialize>(value: &T) -> StoryforgeResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| JsonError::new(format!("Failed to serialize output: {}", e)))?;
    println!("{}", json);
    Ok(())
}
