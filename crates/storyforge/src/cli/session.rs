//! Shared setup for commands that talk to the AI service.

use std::path::Path;
use storyforge::{
    AppContext, Book, EbookError, EbookErrorKind, GeminiClient, Metadata, StoryStudio,
    StoryforgeConfig, StoryforgeResult,
};
use tracing::{debug, info, instrument};

/// A configured studio plus the session state it works on.
#[derive(Debug)]
pub struct Session {
    /// Orchestrator over the Gemini client
    pub studio: StoryStudio<GeminiClient>,
    /// Session lifecycle state
    pub context: AppContext,
}

impl Session {
    /// Check the API key, load configuration and build the studio.
    ///
    /// Uses `config_path` when given, otherwise the layered defaults.
    #[instrument(skip_all)]
    pub fn open(config_path: Option<&Path>) -> StoryforgeResult<Self> {
        let context = AppContext::initialize()?;
        let config = load_config(config_path)?;
        let client = GeminiClient::from_config(&config, None)?;
        let metadata = client.metadata();
        info!(
            provider = metadata.provider,
            model = %metadata.model,
            image_model = %metadata.image_model,
            grounding = metadata.supports_grounding,
            "Connected to generative backend"
        );
        let studio = StoryStudio::from_config(client, &config)?;
        debug!(?studio, "Session ready");
        Ok(Self { studio, context })
    }

    /// Open a session and install the book saved at `path`.
    ///
    /// Generation flags left behind by an interrupted run are cleared.
    pub async fn with_book(config_path: Option<&Path>, path: &Path) -> StoryforgeResult<Self> {
        let mut session = Self::open(config_path)?;
        session.context.set_book(load_book(path).await?);
        Ok(session)
    }

    /// The studio and the installed book, borrowed together.
    ///
    /// # Errors
    ///
    /// Returns `NoStorySelected` when no book was installed.
    pub fn studio_and_book(&mut self) -> StoryforgeResult<(&StoryStudio<GeminiClient>, &mut Book)> {
        let book = self
            .context
            .book_mut()
            .ok_or_else(|| EbookError::new(EbookErrorKind::NoStorySelected))?;
        Ok((&self.studio, book))
    }
}

/// Load the configuration named on the command line, or the layered defaults.
pub fn load_config(path: Option<&Path>) -> StoryforgeResult<StoryforgeConfig> {
    match path {
        Some(path) => StoryforgeConfig::from_file(path),
        None => StoryforgeConfig::load(),
    }
}

/// Read a saved book and reset stale in-flight flags.
pub async fn load_book(path: &Path) -> StoryforgeResult<Book> {
    let mut book = Book::load(path).await?;
    let cleared = book.clear_stale_generation();
    if cleared > 0 {
        info!(cleared, "Reset slots left mid-generation by an earlier run");
    }
    Ok(book)
}
