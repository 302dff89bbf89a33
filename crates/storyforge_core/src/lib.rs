//! Core data types for Storyforge.
//!
//! This crate provides the records shared by every layer: the story and
//! panel model of an ebook, analysis and refinement snapshots, generated
//! images with their data-URI encoding, and the request/response types
//! exchanged with a generative model driver.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analysis;
mod input;
mod media;
mod message;
mod output;
mod panel;
mod request;
mod role;
mod story;

pub use analysis::{AnalysisResult, MAX_SCORE, RefinedContent, RefinedPanel, ViralPotential};
pub use input::Input;
pub use media::{DEFAULT_IMAGE_MIME, GeneratedImage, MediaSource};
pub use message::{Message, MessageBuilder};
pub use output::Output;
pub use panel::{Panel, ScriptDraft, ScriptPanel};
pub use request::{GenerateRequest, GenerateRequestBuilder, GenerateResponse, Modality};
pub use role::Role;
pub use story::{DEFAULT_PANEL_COUNT, LayoutChoice, Story, TargetAudience, VisualStyle};
