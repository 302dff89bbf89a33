//! Storyforge CLI binary.
//!
//! This binary provides command-line access to Storyforge's functionality:
//! - Discover trending stories or develop an idea
//! - Script and illustrate a book, saved as JSON
//! - Analyze, refine, re-caption and edit a saved book
//! - Export illustrations to image files

use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, run_command};

    // Parse command-line arguments
    let cli = Cli::parse();

    // Load .env before anything reads GEMINI_API_KEY
    let _ = dotenvy::dotenv();

    // Initialize tracing
    storyforge::init_tracing(cli.verbose)?;

    // Execute the requested command
    if let Err(e) = run_command(cli).await {
        tracing::error!(error = %e, "Command failed");
        eprintln!("{}", e.advisory());
        std::process::exit(1);
    }

    Ok(())
}
