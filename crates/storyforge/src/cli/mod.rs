//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the storyforge binary.

mod commands;
mod draft;
mod edit;
mod session;

pub use commands::{Cli, Commands, OutputFormat};
pub use draft::{create_story, discover, make_book};
pub use edit::{analyze, caption, edit_image, export, illustrate, refine};
pub use session::Session;

use storyforge::{Story, StoryforgeResult, placeholder};

/// Dispatch a parsed command line.
pub async fn run_command(cli: Cli) -> StoryforgeResult<()> {
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Discover {
            query,
            audience,
            format,
        } => discover(config, &query, audience, format).await,

        Commands::Create {
            prompt,
            audience,
            format,
        } => create_story(config, &prompt, audience, format).await,

        Commands::Book {
            title,
            summary,
            panels,
            style,
            layout,
            audience,
            out,
        } => {
            let story = Story::new(title, summary, placeholder::USER_PROMPT_SOURCE)
                .with_selections(style, audience)
                .with_layout(layout)
                .with_panel_count(panels);
            make_book(config, story, &out).await
        }

        Commands::Illustrate { book } => illustrate(config, &book).await,

        Commands::Analyze { book } => analyze(config, &book).await,

        Commands::Refine { book, apply } => refine(config, &book, apply).await,

        Commands::Caption { book, index, text } => caption(&book, index, &text).await,

        Commands::EditImage {
            book,
            slot,
            instruction,
        } => edit_image(config, &book, slot, &instruction).await,

        Commands::Export { book, dir } => export(&book, &dir).await,
    }
}
