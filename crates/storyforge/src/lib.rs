//! Storyforge - AI-assisted illustrated ebook creation
//!
//! Storyforge turns a trending news story or a free-form idea into a short
//! illustrated ebook using Google Gemini for text, structured output, search
//! grounding and image generation.
//!
//! # Features
//!
//! - **Discovery**: Grounded web search for heartwarming trending stories
//! - **Scripting**: Structured multi-panel scripts with a recurring character design
//! - **Illustration**: Paced, resumable batch generation of cover and panel images
//! - **Editing**: Caption edits and instruction-driven image edits
//! - **Analysis**: Marketability critique and one-shot content refinement
//! - **Rate Limiting**: Tier-aware limits and backoff on quota signals
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use storyforge::{GeminiClient, LoggingObserver, StoryStudio, StoryforgeConfig, TargetAudience};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StoryforgeConfig::load()?;
//!     let studio = StoryStudio::from_config(GeminiClient::from_config(&config, None)?, &config)?;
//!
//!     let stories = studio.find_trending_stories("rescued animals", TargetAudience::Children).await?;
//!     let mut book = studio.create_book(stories[0].clone()).await?;
//!     let report = studio.illustrate_book(&mut book, &mut LoggingObserver).await;
//!     println!("{} illustrations generated", report.generated.len());
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! Storyforge is organized as a workspace with focused crates:
//!
//! - `storyforge_error` - Error types
//! - `storyforge_core` - Core data types (stories, panels, requests, images)
//! - `storyforge_interface` - StoryforgeDriver trait definition
//! - `storyforge_rate_limit` - Configuration, rate limiting, retry and pacing
//! - `storyforge_models` - Gemini REST client
//! - `storyforge_ebook` - Prompting, structured decoding and batch illustration
//!
//! This crate (`storyforge`) re-exports everything for convenience.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod telemetry;

pub use storyforge_core::*;
pub use storyforge_ebook::*;
pub use storyforge_error::*;
pub use storyforge_interface::*;
pub use storyforge_models::*;
pub use storyforge_rate_limit::*;

pub use telemetry::{DEFAULT_LOG_FILTER, init_tracing, log_filter};
