//! Application lifecycle state.
//!
//! Tracks whether the service is usable (an API key is present), which
//! story the user picked, and the book being edited. [`AppContext::reset`]
//! returns to the discovery stage.

use crate::Book;
use storyforge_core::Story;
use storyforge_error::{
    API_KEY_ENV, EbookError, EbookErrorKind, GeminiError, GeminiErrorKind, StoryforgeResult,
};
use tracing::{debug, info, instrument};

/// Where the user is in the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Stage {
    /// Searching for or authoring a story
    #[display("discover")]
    Discover,
    /// A story is selected but no script exists yet
    #[display("drafting")]
    Drafting,
    /// A book exists and is being illustrated or edited
    #[display("editing")]
    Editing,
}

/// Session state shared by the host and the studio.
#[derive(Debug, Clone, Default, derive_getters::Getters)]
pub struct AppContext {
    /// A non-empty API key was found at initialization
    api_key_present: bool,
    /// Story chosen in the discovery stage
    selected_story: Option<Story>,
    /// Book built from the selected story
    book: Option<Book>,
}

impl AppContext {
    /// Check that the service is configured.
    ///
    /// Reads `GEMINI_API_KEY` from the environment (load `.env` first).
    ///
    /// # Errors
    ///
    /// Returns `MissingApiKey` when the variable is unset or blank.
    #[instrument]
    pub fn initialize() -> StoryforgeResult<Self> {
        Self::initialize_with_key(std::env::var(API_KEY_ENV).ok().as_deref())
    }

    /// [`AppContext::initialize`] with an explicit key lookup result.
    #[track_caller]
    pub fn initialize_with_key(key: Option<&str>) -> StoryforgeResult<Self> {
        match key {
            Some(key) if !key.trim().is_empty() => {
                debug!("API key present");
                Ok(Self {
                    api_key_present: true,
                    ..Default::default()
                })
            }
            _ => Err(GeminiError::new(GeminiErrorKind::MissingApiKey).into()),
        }
    }

    /// Current workflow stage.
    pub fn stage(&self) -> Stage {
        match (&self.selected_story, &self.book) {
            (_, Some(_)) => Stage::Editing,
            (Some(_), None) => Stage::Drafting,
            (None, None) => Stage::Discover,
        }
    }

    /// Choose a story, discarding any book built from a previous one.
    pub fn select_story(&mut self, story: Story) {
        info!(title = %story.title, "Story selected");
        self.selected_story = Some(story);
        self.book = None;
    }

    /// The selected story.
    ///
    /// # Errors
    ///
    /// Returns `NoStorySelected` in the discovery stage.
    #[track_caller]
    pub fn require_story(&self) -> StoryforgeResult<&Story> {
        self.selected_story
            .as_ref()
            .ok_or_else(|| EbookError::new(EbookErrorKind::NoStorySelected).into())
    }

    /// Install the book being edited; its story becomes the selection.
    pub fn set_book(&mut self, book: Book) {
        self.selected_story = Some(book.story.clone());
        self.book = Some(book);
    }

    /// Mutable access to the book being edited.
    pub fn book_mut(&mut self) -> Option<&mut Book> {
        self.book.as_mut()
    }

    /// Drop the selection and book, returning to discovery.
    pub fn reset(&mut self) {
        debug!(stage = %self.stage(), "Resetting to discovery");
        self.selected_story = None;
        self.book = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_requires_non_blank_key() {
        assert!(AppContext::initialize_with_key(None).is_err());
        assert!(AppContext::initialize_with_key(Some("  ")).is_err());

        let context = AppContext::initialize_with_key(Some("key")).unwrap();
        assert!(*context.api_key_present());
        assert_eq!(context.stage(), Stage::Discover);
    }

    #[test]
    fn test_reset_returns_to_discover() {
        let mut context = AppContext::initialize_with_key(Some("key")).unwrap();
        context.select_story(Story::new("T", "S", "User Prompt"));
        assert_eq!(context.stage(), Stage::Drafting);
        assert!(context.require_story().is_ok());

        context.reset();
        assert_eq!(context.stage(), Stage::Discover);
        assert!(context.require_story().is_err());
    }
}
