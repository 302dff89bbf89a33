//! Sequential batch illustration.
//!
//! The cover comes first, then panels in ascending index order. One
//! request is in flight at a time and the studio's [`RequestPacer`] spaces
//! them out. Slots that already hold an image, or are mid-generation, are
//! skipped, so re-running a batch resumes it. A failed slot is marked and
//! the batch moves on.
//!
//! After every attempted slot the observer gets a checkpoint of the whole
//! book; [`CheckpointObserver`] writes it to disk so an interrupted batch
//! loses at most the slot in flight.
//!
//! [`RequestPacer`]: storyforge_rate_limit::RequestPacer

use crate::{Book, Slot, StoryStudio};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use storyforge_core::{GeneratedImage, Panel};
use storyforge_error::{EbookError, EbookErrorKind, StoryforgeError, StoryforgeResult};
use storyforge_interface::StoryforgeDriver;
use tracing::{debug, info, instrument, warn};

/// Receives progress events from a batch so a host can re-render.
///
/// Every method has an empty default.
#[async_trait]
pub trait IllustrationObserver: Send {
    /// A request for `slot` is about to be sent.
    fn on_started(&mut self, _slot: Slot) {}

    /// `slot` received `image`.
    fn on_finished(&mut self, _slot: Slot, _image: &GeneratedImage) {}

    /// The request for `slot` failed.
    fn on_failed(&mut self, _slot: Slot, _error: &StoryforgeError) {}

    /// `slot` already had an image or a request in flight.
    fn on_skipped(&mut self, _slot: Slot) {}

    /// The book after a slot was generated or marked failed.
    ///
    /// An error is logged and the batch continues.
    async fn checkpoint(&mut self, _book: &Book) -> StoryforgeResult<()> {
        Ok(())
    }
}

impl IllustrationObserver for () {}

/// Observer that logs every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingObserver;

impl IllustrationObserver for LoggingObserver {
    fn on_started(&mut self, slot: Slot) {
        info!(%slot, "Generating illustration");
    }

    fn on_finished(&mut self, slot: Slot, image: &GeneratedImage) {
        info!(%slot, bytes = image.data().len(), mime = %image.mime(), "Illustration ready");
    }

    fn on_failed(&mut self, slot: Slot, error: &StoryforgeError) {
        warn!(%slot, advisory = error.advisory(), error = %error, "Illustration failed");
    }

    fn on_skipped(&mut self, slot: Slot) {
        debug!(%slot, "Illustration already present; skipping");
    }
}

/// Saves the book to `path` at every checkpoint and forwards events to an
/// inner observer.
#[derive(Debug, Clone)]
pub struct CheckpointObserver<O = LoggingObserver> {
    path: PathBuf,
    inner: O,
}

impl CheckpointObserver {
    /// Save to `path`, logging events with [`LoggingObserver`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_inner(path, LoggingObserver)
    }
}

impl<O> CheckpointObserver<O> {
    /// Save to `path`, forwarding events to `inner`.
    pub fn with_inner(path: impl Into<PathBuf>, inner: O) -> Self {
        Self {
            path: path.into(),
            inner,
        }
    }

    /// Where checkpoints are written.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The wrapped observer.
    pub fn into_inner(self) -> O {
        self.inner
    }
}

#[async_trait]
impl<O: IllustrationObserver> IllustrationObserver for CheckpointObserver<O> {
    fn on_started(&mut self, slot: Slot) {
        self.inner.on_started(slot);
    }

    fn on_finished(&mut self, slot: Slot, image: &GeneratedImage) {
        self.inner.on_finished(slot, image);
    }

    fn on_failed(&mut self, slot: Slot, error: &StoryforgeError) {
        self.inner.on_failed(slot, error);
    }

    fn on_skipped(&mut self, slot: Slot) {
        self.inner.on_skipped(slot);
    }

    async fn checkpoint(&mut self, book: &Book) -> StoryforgeResult<()> {
        self.inner.checkpoint(book).await?;
        book.save(&self.path).await
    }
}

/// A slot whose request failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedSlot {
    /// Which slot failed
    pub slot: Slot,
    /// Short message for the user
    pub advisory: String,
    /// Full error text for logs
    pub error: String,
}

/// Outcome of one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IllustrationReport {
    /// Slots that received a new image, in request order
    pub generated: Vec<Slot>,
    /// Slots left untouched
    pub skipped: Vec<Slot>,
    /// Slots whose request failed
    pub failed: Vec<FailedSlot>,
}

impl IllustrationReport {
    /// True when no slot failed.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Number of image requests sent.
    pub fn requests(&self) -> usize {
        self.generated.len() + self.failed.len()
    }
}

impl<D: StoryforgeDriver> StoryStudio<D> {
    /// Illustrate every slot of `book` that still needs an image.
    ///
    /// Dropping the returned future abandons the batch; slots already
    /// illustrated keep their images.
    #[instrument(skip(self, book, observer), fields(title = %book.story.title))]
    pub async fn illustrate_book<O>(&self, book: &mut Book, observer: &mut O) -> IllustrationReport
    where
        O: IllustrationObserver + ?Sized,
    {
        let mut indices: Vec<u32> = book.panels.iter().map(|p| p.index).collect();
        indices.sort_unstable();
        let slots: Vec<Slot> = std::iter::once(Slot::Cover)
            .chain(indices.into_iter().map(Slot::Panel))
            .collect();

        info!(
            slots = slots.len(),
            pending_panels = book.pending_panels().len(),
            cover_pending = book.cover.needs_image(),
            "Starting illustration batch"
        );

        let mut report = IllustrationReport::default();
        let mut session = self.pacer().session();

        for slot in slots {
            let needs_image = match slot {
                Slot::Cover => book.cover.needs_image(),
                Slot::Panel(index) => book.panel(index).is_some_and(Panel::needs_image),
            };
            if !needs_image {
                observer.on_skipped(slot);
                report.skipped.push(slot);
                continue;
            }

            session.ready().await;

            if let Err(e) = book.mark_generating(slot) {
                warn!(%slot, error = %e, "Slot vanished before generation");
                continue;
            }
            observer.on_started(slot);

            let result = self.illustrate_slot(book, slot).await;
            match result.and_then(|image| {
                book.set_image(slot, image.clone())?;
                Ok(image)
            }) {
                Ok(image) => {
                    observer.on_finished(slot, &image);
                    report.generated.push(slot);
                }
                Err(e) => {
                    if let Err(mark_err) = book.mark_failed(slot) {
                        warn!(%slot, error = %mark_err, "Could not mark slot as failed");
                    }
                    observer.on_failed(slot, &e);
                    report.failed.push(FailedSlot {
                        slot,
                        advisory: e.advisory().to_string(),
                        error: e.to_string(),
                    });
                }
            }

            if let Err(e) = observer.checkpoint(book).await {
                warn!(%slot, error = %e, "Checkpoint failed; continuing batch");
            }
        }

        info!(
            generated = report.generated.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "Illustration batch finished"
        );
        report
    }

    async fn illustrate_slot(&self, book: &Book, slot: Slot) -> StoryforgeResult<GeneratedImage> {
        match slot {
            Slot::Cover => self.generate_cover(book).await,
            Slot::Panel(index) => {
                let panel = book
                    .panel(index)
                    .ok_or_else(|| EbookError::new(EbookErrorKind::UnknownPanel(index)))?;
                self.generate_panel_image(book, panel).await
            }
        }
    }
}
