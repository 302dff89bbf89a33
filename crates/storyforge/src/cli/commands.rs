//! CLI command definitions.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use storyforge::{DEFAULT_PANEL_COUNT, LayoutChoice, Slot, TargetAudience, VisualStyle};

/// Storyforge - AI-assisted illustrated ebook creation
#[derive(Parser, Debug)]
#[command(name = "storyforge")]
#[command(about = "Turn trending stories or your own ideas into illustrated ebooks", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file to use instead of the layered defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search the web for trending stories
    Discover {
        /// Topic to search for
        #[arg(long)]
        query: String,

        /// Intended readership
        #[arg(long, default_value = "General")]
        audience: TargetAudience,

        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },

    /// Develop a free-form idea into a story
    Create {
        /// The idea to develop
        #[arg(long)]
        prompt: String,

        /// Intended readership
        #[arg(long, default_value = "General")]
        audience: TargetAudience,

        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },

    /// Script and illustrate a book, then save it
    Book {
        /// Story title
        #[arg(long)]
        title: String,

        /// Story summary
        #[arg(long)]
        summary: String,

        /// Number of panels to script
        #[arg(long, default_value_t = DEFAULT_PANEL_COUNT)]
        panels: u32,

        /// Art style
        #[arg(long, default_value = "Cinematic")]
        style: VisualStyle,

        /// Page layout
        #[arg(long, default_value = "Full Page")]
        layout: LayoutChoice,

        /// Intended readership
        #[arg(long, default_value = "General")]
        audience: TargetAudience,

        /// Directory receiving book.json
        #[arg(long)]
        out: PathBuf,
    },

    /// Illustrate every slot of a saved book that has no image yet
    Illustrate {
        /// Path to the book JSON file
        book: PathBuf,
    },

    /// Critique a saved book's marketability
    Analyze {
        /// Path to the book JSON file
        book: PathBuf,
    },

    /// Propose a new title, summary and captions for a saved book
    Refine {
        /// Path to the book JSON file
        book: PathBuf,

        /// Apply the proposal and save the book
        #[arg(long)]
        apply: bool,
    },

    /// Replace one panel caption
    Caption {
        /// Path to the book JSON file
        book: PathBuf,

        /// Panel index
        index: u32,

        /// New caption text
        text: String,
    },

    /// Edit the cover or a panel image following an instruction
    EditImage {
        /// Path to the book JSON file
        book: PathBuf,

        /// `cover` or a panel index
        slot: Slot,

        /// What to change
        instruction: String,
    },

    /// Write every illustration of a saved book to image files
    Export {
        /// Path to the book JSON file
        book: PathBuf,

        /// Output directory
        dir: PathBuf,
    },
}

/// Output format options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable format
    Human,
    /// JSON format
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_discover_parses_audience() {
        let cli = Cli::parse_from([
            "storyforge",
            "discover",
            "--query",
            "rescued owls",
            "--audience",
            "young adult",
        ]);

        match cli.command {
            Commands::Discover {
                query,
                audience,
                format,
            } => {
                assert_eq!(query, "rescued owls");
                assert_eq!(audience, TargetAudience::YoungAdult);
                assert_eq!(format, OutputFormat::Human);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_book_defaults() {
        let cli = Cli::parse_from([
            "storyforge",
            "book",
            "--title",
            "Owl Night",
            "--summary",
            "An owl learns to fly.",
            "--out",
            "out",
        ]);

        match cli.command {
            Commands::Book {
                panels,
                style,
                layout,
                audience,
                out,
                ..
            } => {
                assert_eq!(panels, DEFAULT_PANEL_COUNT);
                assert_eq!(style, VisualStyle::Cinematic);
                assert_eq!(layout, LayoutChoice::FullPage);
                assert_eq!(audience, TargetAudience::General);
                assert_eq!(out, PathBuf::from("out"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_edit_image_parses_slot() {
        let cli = Cli::parse_from([
            "storyforge",
            "--verbose",
            "edit-image",
            "book.json",
            "3",
            "add snow",
        ]);
        assert!(cli.verbose);

        match cli.command {
            Commands::EditImage { slot, instruction, .. } => {
                assert_eq!(slot, Slot::Panel(3));
                assert_eq!(instruction, "add snow");
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let cli = Cli::parse_from(["storyforge", "edit-image", "book.json", "cover", "brighter"]);
        assert!(matches!(
            cli.command,
            Commands::EditImage {
                slot: Slot::Cover,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_slot_is_rejected() {
        let result =
            Cli::try_parse_from(["storyforge", "edit-image", "book.json", "back", "brighter"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::parse_from([
            "storyforge",
            "refine",
            "book.json",
            "--apply",
            "--config",
            "custom.toml",
        ]);

        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        assert!(matches!(cli.command, Commands::Refine { apply: true, .. }));
    }
}
