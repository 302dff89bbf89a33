//! The story studio: every AI-backed operation of the ebook workflow.
//!
//! Text operations build an instruction, send it to the text model and
//! decode the reply with [`StructuredDecoder`]. A reply that cannot be
//! decoded yields a labelled placeholder instead of an error, and so does
//! a reply the service sent that held nothing usable (blocked,
//! reasoning-only or unparsable). Transport, authentication and quota
//! failures are still surfaced.
//!
//! Image operations go to the image model through [`ThrottleRetry`], so a
//! quota signal is retried with backoff before it is surfaced.

use crate::extraction::{JsonShape, StructuredDecoder};
use crate::{Book, placeholder, prompts, schema};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use storyforge_core::{
    AnalysisResult, GenerateRequest, GeneratedImage, Input, Message, Modality, Panel,
    RefinedContent, Role, ScriptDraft, Story, TargetAudience,
};
use storyforge_error::{
    GeminiError, GeminiErrorKind, StoryforgeError, StoryforgeErrorKind, StoryforgeResult,
};
use storyforge_interface::StoryforgeDriver;
use storyforge_rate_limit::{
    DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL, PlaceholderConfig, RequestPacer, StoryforgeConfig,
    ThrottleRetry,
};
use tracing::{debug, error, info, instrument, warn};

/// Source label used when a search hit names no outlet.
const UNKNOWN_SOURCE: &str = "Web Search";

/// Search hit as the service describes it.
#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    source: String,
}

/// Raw search reply entries, checked one by one after decoding.
///
/// Rejects arrays without a single object so a citation such as `[1]`
/// ahead of the real list is not taken for it.
#[derive(Debug)]
struct SearchEntries(Vec<Value>);

impl<'de> Deserialize<'de> for SearchEntries {
    fn deserialize<De: Deserializer<'de>>(deserializer: De) -> Result<Self, De::Error> {
        let entries = Vec::<Value>::deserialize(deserializer)?;
        if !entries.is_empty() && !entries.iter().any(Value::is_object) {
            return Err(serde::de::Error::custom("array holds no search entries"));
        }
        Ok(Self(entries))
    }
}

/// Story idea as the service describes it.
#[derive(Debug, Deserialize)]
struct StoryIdea {
    title: String,
    #[serde(default)]
    summary: String,
}

fn is_unusable_reply(err: &StoryforgeError) -> bool {
    matches!(err.kind(), StoryforgeErrorKind::Gemini(e) if e.kind.is_unusable_reply())
}

/// Orchestrates requests to a generative driver for one user session.
///
/// # Example
///
/// ```rust,ignore
/// let studio = StoryStudio::from_config(GeminiClient::new()?, &config)?;
/// let stories = studio.find_trending_stories("lost pets", TargetAudience::Children).await?;
/// let mut book = studio.create_book(stories[0].clone()).await?;
/// let report = studio.illustrate_book(&mut book, &mut LoggingObserver).await;
/// ```
#[derive(derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct StoryStudio<D> {
    #[setters(skip)]
    driver: D,
    /// Model for text and structured requests
    text_model: String,
    /// Model for image generation and editing
    image_model: String,
    /// Backoff for throttled image requests
    retry: ThrottleRetry,
    /// Pause policy between batch requests
    pacer: RequestPacer,
    /// Fallback texts for undecodable replies
    placeholders: PlaceholderConfig,
    /// Extraction chain for structured replies
    decoder: StructuredDecoder,
}

impl<D> std::fmt::Debug for StoryStudio<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoryStudio")
            .field("text_model", &self.text_model)
            .field("image_model", &self.image_model)
            .field("retry", &self.retry)
            .field("pacer", &self.pacer)
            .finish_non_exhaustive()
    }
}

impl<D: StoryforgeDriver> StoryStudio<D> {
    /// A studio with built-in defaults.
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            retry: ThrottleRetry::default(),
            pacer: RequestPacer::default(),
            placeholders: PlaceholderConfig::default(),
            decoder: StructuredDecoder::default(),
        }
    }

    /// A studio configured from `config`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the pacing section is invalid.
    pub fn from_config(driver: D, config: &StoryforgeConfig) -> StoryforgeResult<Self> {
        Ok(Self {
            driver,
            text_model: config.models.text.clone(),
            image_model: config.models.image.clone(),
            retry: config.retry.throttle_retry(),
            pacer: config.pacing.pacer()?,
            placeholders: config.placeholders.clone(),
            decoder: StructuredDecoder::default(),
        })
    }

    /// The underlying driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// The pacer used by batch illustration.
    pub fn pacer(&self) -> &RequestPacer {
        &self.pacer
    }

    fn text_request(&self, prompt: String, schema: Option<Value>, grounding: bool) -> GenerateRequest {
        GenerateRequest {
            messages: vec![Message::user_text(prompt)],
            model: Some(self.text_model.clone()),
            response_schema: schema,
            grounding,
            ..Default::default()
        }
    }

    fn image_request(&self, content: Vec<Input>) -> GenerateRequest {
        GenerateRequest {
            messages: vec![Message::new(Role::User, content)],
            model: Some(self.image_model.clone()),
            response_modalities: vec![Modality::Text, Modality::Image],
            ..Default::default()
        }
    }

    /// Raw reply text for a text request.
    ///
    /// An unusable reply comes back as empty text so the caller's decoder
    /// falls through to its placeholder.
    async fn generate_text(&self, request: &GenerateRequest) -> StoryforgeResult<String> {
        match self.driver.generate(request).await {
            Ok(response) => Ok(response.text()),
            Err(e) if is_unusable_reply(&e) => {
                warn!(error = %e, "Text reply unusable; continuing with empty text");
                Ok(String::new())
            }
            Err(e) => {
                error!(error = %e, "Text request failed");
                Err(e)
            }
        }
    }

    async fn generate_image(&self, request: &GenerateRequest) -> StoryforgeResult<GeneratedImage> {
        let response = self
            .retry
            .run(|| self.driver.generate(request))
            .await
            .inspect_err(|e| error!(error = %e, "Image request failed"))?;

        response.first_image().cloned().ok_or_else(|| {
            error!("Image reply carried no inline image data");
            GeminiError::new(GeminiErrorKind::NoImageData).into()
        })
    }

    /// Search the web for trending stories matching `query`.
    ///
    /// Every result gets a fresh id and the requested audience. Entries
    /// that do not describe a story are skipped. An unreadable reply, or
    /// one where no entry is readable, yields exactly one placeholder entry.
    #[instrument(skip(self))]
    pub async fn find_trending_stories(
        &self,
        query: &str,
        audience: TargetAudience,
    ) -> StoryforgeResult<Vec<Story>> {
        let request = self.text_request(prompts::search_prompt(query, audience), None, true);
        let raw = self.generate_text(&request).await?;

        let entries = match self.decoder.decode::<SearchEntries>(&raw, JsonShape::Array) {
            Ok(SearchEntries(entries)) => entries,
            Err(e) => {
                warn!(error = %e, "Search reply unreadable; returning placeholder");
                return Ok(placeholder::search_results(&self.placeholders, audience));
            }
        };

        let total = entries.len();
        let hits: Vec<SearchHit> = entries
            .into_iter()
            .enumerate()
            .filter_map(|(position, entry)| {
                serde_json::from_value(entry)
                    .inspect_err(|e| warn!(position, error = %e, "Skipping malformed search hit"))
                    .ok()
            })
            .collect();

        if hits.is_empty() && total > 0 {
            warn!(total, "No search hit was readable; returning placeholder");
            return Ok(placeholder::search_results(&self.placeholders, audience));
        }

        info!(count = hits.len(), skipped = total - hits.len(), "Found trending stories");
        Ok(hits
            .into_iter()
            .map(|hit| {
                let source = if hit.source.trim().is_empty() {
                    UNKNOWN_SOURCE.to_string()
                } else {
                    hit.source
                };
                let mut story = Story::new(hit.title, hit.summary, source);
                story.audience = audience;
                story
            })
            .collect())
    }

    /// Develop a free-form idea into a story.
    #[instrument(skip(self, prompt))]
    pub async fn draft_story_from_prompt(
        &self,
        prompt: &str,
        audience: TargetAudience,
    ) -> StoryforgeResult<Story> {
        let request = self.text_request(
            prompts::story_prompt(prompt, audience),
            Some(schema::story_schema()),
            false,
        );
        let raw = self.generate_text(&request).await?;

        match self.decoder.decode::<StoryIdea>(&raw, JsonShape::Object) {
            Ok(idea) => {
                debug!(title = %idea.title, "Drafted story from prompt");
                let mut story = Story::new(idea.title, idea.summary, placeholder::USER_PROMPT_SOURCE);
                story.audience = audience;
                Ok(story)
            }
            Err(e) => {
                warn!(error = %e, "Story reply unreadable; returning placeholder");
                Ok(placeholder::story(&self.placeholders, audience))
            }
        }
    }

    /// Draft a script of [`Story::requested_panels`] panels.
    ///
    /// Extra panels in the reply are dropped.
    #[instrument(skip(self, story), fields(title = %story.title, panels = story.requested_panels()))]
    pub async fn draft_script(&self, story: &Story) -> StoryforgeResult<ScriptDraft> {
        let request = self.text_request(
            prompts::script_prompt(story),
            Some(schema::script_schema(story.requested_panels())),
            false,
        );
        let raw = self.generate_text(&request).await?;

        match self.decoder.decode::<ScriptDraft>(&raw, JsonShape::Object) {
            Ok(mut draft) if !draft.panels.is_empty() => {
                let requested = story.requested_panels() as usize;
                if draft.panels.len() > requested {
                    debug!(
                        returned = draft.panels.len(),
                        requested, "Truncating script to requested panel count"
                    );
                    draft.panels.truncate(requested);
                } else if draft.panels.len() < requested {
                    warn!(
                        returned = draft.panels.len(),
                        requested, "Script has fewer panels than requested"
                    );
                }
                Ok(draft)
            }
            Ok(_) => {
                warn!("Script reply had no panels; returning placeholder");
                Ok(placeholder::script(&self.placeholders, story))
            }
            Err(e) => {
                warn!(error = %e, "Script reply unreadable; returning placeholder");
                Ok(placeholder::script(&self.placeholders, story))
            }
        }
    }

    /// Draft a script and turn it into a book.
    pub async fn create_book(&self, story: Story) -> StoryforgeResult<Book> {
        let draft = self.draft_script(&story).await?;
        Book::from_script(story, draft)
    }

    /// Critique the book; the score is clamped to 0-10.
    #[instrument(skip(self, book), fields(title = %book.story.title))]
    pub async fn analyze_marketability(&self, book: &Book) -> StoryforgeResult<AnalysisResult> {
        let request = self.text_request(
            prompts::analysis_prompt(book),
            Some(schema::analysis_schema()),
            false,
        );
        let raw = self.generate_text(&request).await?;

        match self.decoder.decode::<AnalysisResult>(&raw, JsonShape::Object) {
            Ok(analysis) => {
                info!(score = analysis.score, potential = %analysis.viral_potential, "Analysis complete");
                Ok(analysis)
            }
            Err(e) => {
                warn!(error = %e, "Analysis reply unreadable; returning placeholder");
                Ok(placeholder::analysis(&self.placeholders))
            }
        }
    }

    /// Propose a new title, summary and captions following `analysis`.
    #[instrument(skip(self, book, analysis), fields(title = %book.story.title))]
    pub async fn refine_content(
        &self,
        book: &Book,
        analysis: &AnalysisResult,
    ) -> StoryforgeResult<RefinedContent> {
        let request = self.text_request(
            prompts::refine_prompt(book, analysis),
            Some(schema::refinement_schema()),
            false,
        );
        let raw = self.generate_text(&request).await?;

        match self.decoder.decode::<RefinedContent>(&raw, JsonShape::Object) {
            Ok(refinement) => {
                debug!(
                    captions = refinement.refined_panels.len(),
                    "Refinement proposed"
                );
                Ok(refinement)
            }
            Err(e) => {
                warn!(error = %e, "Refinement reply unreadable; returning placeholder");
                Ok(placeholder::refinement(book))
            }
        }
    }

    /// Generate the cover illustration.
    #[instrument(skip(self, book), fields(title = %book.story.title))]
    pub async fn generate_cover(&self, book: &Book) -> StoryforgeResult<GeneratedImage> {
        let request = self.image_request(vec![Input::Text(prompts::cover_prompt(book))]);
        self.generate_image(&request).await
    }

    /// Generate the illustration for `panel`.
    #[instrument(skip(self, book, panel), fields(panel = panel.index))]
    pub async fn generate_panel_image(
        &self,
        book: &Book,
        panel: &Panel,
    ) -> StoryforgeResult<GeneratedImage> {
        let request = self.image_request(vec![Input::Text(prompts::panel_prompt(book, panel))]);
        self.generate_image(&request).await
    }

    /// Edit an existing illustration following `instruction`.
    #[instrument(skip(self, image))]
    pub async fn edit_image(
        &self,
        image: &GeneratedImage,
        instruction: &str,
    ) -> StoryforgeResult<GeneratedImage> {
        let request = self.image_request(vec![
            image.to_input(),
            Input::Text(prompts::edit_prompt(instruction)),
        ]);
        self.generate_image(&request).await
    }
}
