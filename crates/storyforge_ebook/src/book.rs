//! Ebook state: the selected story, its script panels and illustrations.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use storyforge_core::{AnalysisResult, GeneratedImage, Panel, RefinedContent, ScriptDraft, Story};
use storyforge_error::{EbookError, EbookErrorKind, JsonError, StoryforgeResult};
use tracing::{debug, instrument, warn};

/// An illustration slot of a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum Slot {
    /// The cover image
    #[display("cover")]
    Cover,
    /// The panel with this index
    #[display("panel {}", _0)]
    Panel(u32),
}

impl FromStr for Slot {
    type Err = EbookError;

    /// Parses `"cover"` or a panel index.
    #[track_caller]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("cover") {
            return Ok(Slot::Cover);
        }
        trimmed
            .trim_start_matches("panel-")
            .parse()
            .map(Slot::Panel)
            .map_err(|_| {
                EbookError::new(EbookErrorKind::InvalidSlot(format!(
                    "'{}' is neither 'cover' nor a panel index",
                    s
                )))
            })
    }
}

/// The cover illustration and its generation state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cover {
    /// Generated cover image, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<GeneratedImage>,
    /// A cover request is in flight
    #[serde(default)]
    pub is_generating: bool,
    /// The last cover request failed
    #[serde(default)]
    pub failed: bool,
}

impl Cover {
    /// True when a batch pass should request a cover.
    pub fn needs_image(&self) -> bool {
        self.image.is_none() && !self.is_generating
    }
}

/// A book in progress.
///
/// Panels keep the indices assigned when the script was drafted; no
/// operation reorders, renumbers or removes them.
///
/// # Examples
///
/// ```
/// use storyforge_core::{ScriptDraft, ScriptPanel, Story};
/// use storyforge_ebook::Book;
///
/// let draft = ScriptDraft {
///     visual_style: "ink wash".to_string(),
///     character_design: "an old fox".to_string(),
///     panels: vec![
///         ScriptPanel { action_description: "The fox wakes".to_string(), caption: "Dawn.".to_string() },
///         ScriptPanel { action_description: "The fox hunts".to_string(), caption: "Noon.".to_string() },
///     ],
/// };
/// let book = Book::from_script(Story::new("Fox", "A day", "User Prompt"), draft).unwrap();
/// assert_eq!(book.pending_panels(), vec![1, 2]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// The story being illustrated
    pub story: Story,
    /// Free-text art direction from the script
    #[serde(default)]
    pub art_direction: String,
    /// Recurring character description reused in every image prompt
    #[serde(default)]
    pub character_design: String,
    /// Cover slot
    #[serde(default)]
    pub cover: Cover,
    /// Pages in index order
    #[serde(default)]
    pub panels: Vec<Panel>,
    /// Most recent marketability analysis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisResult>,
}

impl Book {
    /// Build a book from a drafted script, numbering panels from 1.
    ///
    /// # Errors
    ///
    /// Returns `EmptyScript` when the draft has no panels.
    #[track_caller]
    pub fn from_script(story: Story, draft: ScriptDraft) -> StoryforgeResult<Self> {
        if draft.panels.is_empty() {
            return Err(EbookError::new(EbookErrorKind::EmptyScript).into());
        }

        let panels = (1u32..)
            .zip(draft.panels)
            .map(|(index, panel)| Panel::new(index, panel.action_description, panel.caption))
            .collect();

        Ok(Self {
            story,
            art_direction: draft.visual_style,
            character_design: draft.character_design,
            cover: Cover::default(),
            panels,
            analysis: None,
        })
    }

    /// Panel with `index`.
    pub fn panel(&self, index: u32) -> Option<&Panel> {
        self.panels.iter().find(|p| p.index == index)
    }

    #[track_caller]
    fn panel_mut(&mut self, index: u32) -> StoryforgeResult<&mut Panel> {
        self.panels
            .iter_mut()
            .find(|p| p.index == index)
            .ok_or_else(|| EbookError::new(EbookErrorKind::UnknownPanel(index)).into())
    }

    /// Replace a panel caption.
    #[track_caller]
    pub fn set_caption(&mut self, index: u32, caption: impl Into<String>) -> StoryforgeResult<()> {
        self.panel_mut(index)?.caption = caption.into();
        Ok(())
    }

    /// Store a panel image, replacing any previous one.
    #[track_caller]
    pub fn set_panel_image(&mut self, index: u32, image: GeneratedImage) -> StoryforgeResult<()> {
        let panel = self.panel_mut(index)?;
        panel.image = Some(image);
        panel.is_generating = false;
        panel.failed = false;
        Ok(())
    }

    /// Store the cover image, replacing any previous one.
    pub fn set_cover(&mut self, image: GeneratedImage) {
        self.cover.image = Some(image);
        self.cover.is_generating = false;
        self.cover.failed = false;
    }

    /// Store an image in `slot`.
    #[track_caller]
    pub fn set_image(&mut self, slot: Slot, image: GeneratedImage) -> StoryforgeResult<()> {
        match slot {
            Slot::Cover => {
                self.set_cover(image);
                Ok(())
            }
            Slot::Panel(index) => self.set_panel_image(index, image),
        }
    }

    /// Flag `slot` as having a request in flight.
    #[track_caller]
    pub fn mark_generating(&mut self, slot: Slot) -> StoryforgeResult<()> {
        match slot {
            Slot::Cover => {
                self.cover.is_generating = true;
                self.cover.failed = false;
            }
            Slot::Panel(index) => {
                let panel = self.panel_mut(index)?;
                panel.is_generating = true;
                panel.failed = false;
            }
        }
        Ok(())
    }

    /// Flag `slot` as failed; any existing image is kept.
    #[track_caller]
    pub fn mark_failed(&mut self, slot: Slot) -> StoryforgeResult<()> {
        match slot {
            Slot::Cover => {
                self.cover.is_generating = false;
                self.cover.failed = true;
            }
            Slot::Panel(index) => {
                let panel = self.panel_mut(index)?;
                panel.is_generating = false;
                panel.failed = true;
            }
        }
        Ok(())
    }

    /// Clear in-flight flags left behind by an abandoned batch.
    ///
    /// Returns how many slots were reset.
    pub fn clear_stale_generation(&mut self) -> usize {
        let mut cleared = usize::from(std::mem::take(&mut self.cover.is_generating));
        for panel in &mut self.panels {
            cleared += usize::from(std::mem::take(&mut panel.is_generating));
        }
        if cleared > 0 {
            debug!(cleared, "Cleared stale generation flags");
        }
        cleared
    }

    /// Indices of panels without an image and not mid-generation, ascending.
    pub fn pending_panels(&self) -> Vec<u32> {
        let mut pending: Vec<u32> = self
            .panels
            .iter()
            .filter(|p| p.needs_image())
            .map(|p| p.index)
            .collect();
        pending.sort_unstable();
        pending
    }

    /// Apply an accepted refinement.
    ///
    /// Empty title or summary leave the current text in place. Only panels
    /// whose index appears in `refined_panels` get a new caption; unknown
    /// ids are ignored. Returns the number of captions changed.
    pub fn apply_refinement(&mut self, refinement: &RefinedContent) -> usize {
        if !refinement.new_title.trim().is_empty() {
            self.story.title = refinement.new_title.clone();
        }
        if !refinement.new_summary.trim().is_empty() {
            self.story.summary = refinement.new_summary.clone();
        }

        let mut changed = 0;
        for refined in &refinement.refined_panels {
            match self.panels.iter_mut().find(|p| p.index == refined.id) {
                Some(panel) => {
                    panel.caption = refined.caption.clone();
                    changed += 1;
                }
                None => warn!(id = refined.id, "Refinement names an unknown panel; ignoring"),
            }
        }
        changed
    }

    /// Write the book as pretty JSON.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub async fn save(&self, path: impl AsRef<Path>) -> StoryforgeResult<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| JsonError::new(format!("Failed to serialize book: {}", e)))?;
        tokio::fs::write(path.as_ref(), json)
            .await
            .map_err(|e| io_error(path.as_ref(), e))?;
        debug!("Saved book");
        Ok(())
    }

    /// Read a book saved by [`Book::save`].
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>) -> StoryforgeResult<Self> {
        let json = tokio::fs::read_to_string(path.as_ref())
            .await
            .map_err(|e| io_error(path.as_ref(), e))?;
        let book: Self = serde_json::from_str(&json)
            .map_err(|e| JsonError::new(format!("Failed to parse book: {}", e)))?;
        debug!(panels = book.panels.len(), "Loaded book");
        Ok(book)
    }

    /// Write every illustration to `dir` as `cover.<ext>` and `panel-NN.<ext>`.
    ///
    /// Returns the written paths in cover-then-panel order.
    #[instrument(skip(self, dir), fields(dir = %dir.as_ref().display()))]
    pub async fn export_images(&self, dir: impl AsRef<Path>) -> StoryforgeResult<Vec<PathBuf>> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| io_error(dir, e))?;

        let mut images: Vec<(String, &GeneratedImage)> = Vec::new();
        if let Some(cover) = &self.cover.image {
            images.push(("cover".to_string(), cover));
        }
        for panel in &self.panels {
            if let Some(image) = &panel.image {
                images.push((format!("panel-{:02}", panel.index), image));
            }
        }

        let mut written = Vec::with_capacity(images.len());
        for (stem, image) in images {
            let path = dir.join(format!("{}.{}", stem, image.extension()));
            tokio::fs::write(&path, image.data())
                .await
                .map_err(|e| io_error(&path, e))?;
            written.push(path);
        }

        debug!(count = written.len(), "Exported images");
        Ok(written)
    }
}

#[track_caller]
fn io_error(path: &Path, e: std::io::Error) -> EbookError {
    EbookError::new(EbookErrorKind::Io(format!("{}: {}", path.display(), e)))
}
