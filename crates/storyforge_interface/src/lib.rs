//! Trait definitions for Storyforge.
//!
//! This crate provides the seam between the ebook orchestration layer and
//! whichever generative service backs it.

mod traits;
mod types;

pub use traits::{Metadata, StoryforgeDriver};
pub use types::ModelMetadata;
