//! Illustrated ebook orchestration for Storyforge.
//!
//! This crate sequences requests to a [`StoryforgeDriver`] to turn a story
//! idea into an illustrated book:
//! - [`StoryStudio`]: trend search, story and script drafting, analysis,
//!   refinement, and cover/panel/edit image generation
//! - [`decode_structured`]: tolerant JSON decoding of model replies
//! - [`Book`]: the book state and its edits
//! - [`StoryStudio::illustrate_book`]: paced, resumable batch illustration
//! - [`AppContext`]: session lifecycle
//!
//! [`StoryforgeDriver`]: storyforge_interface::StoryforgeDriver

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod book;
mod context;
mod extraction;
mod illustrate;
pub mod placeholder;
pub mod prompts;
pub mod schema;
mod studio;

pub use book::{Book, Cover, Slot};
pub use context::{AppContext, Stage};
pub use extraction::{
    BracketScan, ExtractionStrategy, FencedBlock, JsonShape, StrictJson, StructuredDecoder,
    decode_structured,
};
pub use illustrate::{
    CheckpointObserver, FailedSlot, IllustrationObserver, IllustrationReport, LoggingObserver,
};
pub use studio::StoryStudio;
