//! Test utilities for ebook tests.
//!
//! This module provides a scripted mock driver and book fixtures.

#![allow(dead_code)]

pub mod mock_driver;

#[allow(unused_imports)]
pub use mock_driver::{MockBehavior, MockDriver, MockResponse, RecordedCall, throttled};

use storyforge_core::{GeneratedImage, ScriptDraft, ScriptPanel, Story};
use storyforge_ebook::Book;

/// A book with `n` panels whose scenes read "scene 1" .. "scene n".
pub fn sample_book(n: usize) -> Book {
    let draft = ScriptDraft {
        visual_style: "soft ink".to_string(),
        character_design: "a red fox with a blue scarf".to_string(),
        panels: (1..=n)
            .map(|i| ScriptPanel {
                action_description: format!("scene {}", i),
                caption: format!("caption {}", i),
            })
            .collect(),
    };
    Book::from_script(Story::new("Fox Day", "A fox's day out.", "User Prompt"), draft)
        .expect("sample script has panels")
}

/// A tiny image distinguishable by `tag`.
pub fn image(tag: u8) -> GeneratedImage {
    GeneratedImage::new("image/png", vec![0x89, b'P', b'N', b'G', tag])
}
