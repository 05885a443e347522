//! The annotation session: one project, one operator, one editing surface.
//!
//! `VideoSession` composes the edit state machine, the navigation cursor and
//! the persistence synchronizer, and owns the sequencing rules between them:
//! the outgoing frame's collection is saved (best effort) strictly before
//! the incoming frame's loads are issued, scrub previews never fetch, and a
//! fetch completion is applied only while its ticket is still current.
//!
//! The host drives the session from a single task: pointer and list events
//! call straight in, navigation operations are awaited, and sync completions
//! are pumped through `process_next_event`/`poll_events`.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::constants::HANDLE_HIT_RADIUS;
use crate::cursor::SampleCursor;
use crate::editor::{AnnotationEditor, PointerButton};
use crate::error::{PrelabelError, StoreError};
use crate::model::{BoxId, ProjectConfig};
use crate::remote::{ExportArtifact, StoredBox, VideoStore};
use crate::sync::{FrameImage, SyncEvent, Synchronizer};
use crate::viewport::{ContainFit, PixelPoint, PixelRect, ViewportSize};

/// Everything a session needs from the project setup flow: identifier,
/// annotation schema, and the operator's ordered video selection. Created on
/// entering a project, dropped on leaving it.
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Project identifier used in store routes.
    pub project: String,
    /// Class and attribute schema.
    pub config: ProjectConfig,
    /// Selected video names, in navigation order.
    pub videos: Vec<String>,
}

/// Outcome of a navigation operation.
///
/// A failed autosave is reported here rather than blocking the navigation;
/// the host decides how loudly to surface the data-loss risk.
#[derive(Debug, Default)]
pub struct NavigationReport {
    /// Whether the committed (video, sample) pair changed.
    pub moved: bool,
    /// Error from the best-effort save of the outgoing pair, if any.
    pub save_error: Option<StoreError>,
}

impl NavigationReport {
    fn unmoved() -> Self {
        Self::default()
    }
}

/// One box prepared for rendering at the current viewport size.
#[derive(Debug, Clone)]
pub struct RenderBox {
    pub id: BoxId,
    pub rect: PixelRect,
    pub class_name: String,
    pub selected: bool,
}

/// Interactive annotation session over one project.
pub struct VideoSession<S> {
    context: SessionContext,
    cursor: SampleCursor,
    editor: AnnotationEditor,
    sync: Synchronizer<S>,
    events: mpsc::UnboundedReceiver<SyncEvent>,
    frame: Option<FrameImage>,
}

impl<S: VideoStore> VideoSession<S> {
    /// Create a session. Nothing is fetched until [`start`](Self::start).
    pub fn new(context: SessionContext, store: Arc<S>) -> Self {
        let (sync, events) = Synchronizer::new(store, context.project.clone());
        let editor = AnnotationEditor::new(context.config.clone());
        Self {
            context,
            cursor: SampleCursor::new(),
            editor,
            sync,
            events,
            frame: None,
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn cursor(&self) -> &SampleCursor {
        &self.cursor
    }

    pub fn editor(&self) -> &AnnotationEditor {
        &self.editor
    }

    /// Mutable access for tagging, tool arming and list operations; the
    /// pointer entry points below are preferred for canvas input because
    /// they run the coordinate mapping.
    pub fn editor_mut(&mut self) -> &mut AnnotationEditor {
        &mut self.editor
    }

    /// The currently displayed frame, if one has loaded.
    pub fn frame(&self) -> Option<&FrameImage> {
        self.frame.as_ref()
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Enter the annotation surface: refresh the active video's metadata and
    /// load its first sample.
    pub async fn start(&mut self) -> NavigationReport {
        self.refresh_video_info().await;
        self.request_loads();
        NavigationReport {
            moved: true,
            save_error: None,
        }
    }

    /// Move to an explicit sample index (clamped). A no-op when the clamped
    /// target equals the current sample: no save, no fetch.
    pub async fn goto_sample(&mut self, index: u32) -> NavigationReport {
        let target = self.cursor.clamp_index(index);
        if target == self.cursor.sample() {
            return NavigationReport::unmoved();
        }

        let save_error = self.save_outgoing().await;
        self.cursor.goto(target);
        self.request_loads();
        NavigationReport {
            moved: true,
            save_error,
        }
    }

    /// Step forward by one sample.
    pub async fn step_forward(&mut self) -> NavigationReport {
        self.goto_sample(self.cursor.sample().saturating_add(1)).await
    }

    /// Step back by one sample.
    pub async fn step_back(&mut self) -> NavigationReport {
        self.goto_sample(self.cursor.sample().saturating_sub(1)).await
    }

    /// Enter scrub mode: the slider preview decouples from the committed
    /// position.
    pub fn begin_scrub(&mut self) {
        self.cursor.begin_scrub();
    }

    /// Update the scrub preview. Never fetches.
    pub fn scrub_preview(&mut self, index: u32) {
        self.cursor.scrub_preview(index);
    }

    /// Release the scrub gesture, committing the preview as a real
    /// navigation only when it differs from the current sample.
    pub async fn end_scrub(&mut self) -> NavigationReport {
        match self.cursor.end_scrub() {
            Some(target) => self.goto_sample(target).await,
            None => NavigationReport::unmoved(),
        }
    }

    /// Switch the active video: save the outgoing pair, reset the sample
    /// cursor to 0, refresh metadata, then load the first sample.
    pub async fn switch_video(&mut self, video: usize) -> NavigationReport {
        if video >= self.context.videos.len() {
            log::warn!("ignoring switch to unknown video {video}");
            return NavigationReport::unmoved();
        }
        if video == self.cursor.video() {
            return NavigationReport::unmoved();
        }

        let save_error = self.save_outgoing().await;
        self.cursor.set_video(video);
        self.refresh_video_info().await;
        self.request_loads();
        NavigationReport {
            moved: true,
            save_error,
        }
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Explicit manual save of the current collection.
    pub async fn save_now(&mut self) -> Result<(), StoreError> {
        let boxes = self.wire_boxes();
        self.sync
            .save(self.cursor.video(), self.cursor.sample(), boxes)
            .await
    }

    /// Copy the previous sample's collection onto the current frame and
    /// persist it immediately. Overwrites, never merges. Returns the number
    /// of copied boxes.
    pub async fn copy_previous(&mut self) -> Result<usize, PrelabelError> {
        let video = self.cursor.video();
        let sample = self.cursor.sample();

        let boxes = self.sync.fetch_previous(video, sample).await?;
        let count = boxes.len();
        log::info!("prelabel: copied {count} boxes from sample {}", sample - 1);

        self.editor
            .replace_all(boxes.into_iter().map(StoredBox::into_data).collect());

        let wire = self.wire_boxes();
        self.sync
            .save(video, sample, wire)
            .await
            .map_err(PrelabelError::Save)?;
        Ok(count)
    }

    /// Fetch the full-project export artifact for download.
    pub async fn export(&self) -> Result<ExportArtifact, StoreError> {
        self.sync.export().await
    }

    // ------------------------------------------------------------------
    // Sync event handling
    // ------------------------------------------------------------------

    /// Wait for the next fetch completion and apply it. Returns `false` when
    /// the channel has closed.
    pub async fn process_next_event(&mut self) -> bool {
        match self.events.recv().await {
            Some(event) => {
                self.handle_event(event);
                true
            }
            None => false,
        }
    }

    /// Apply every already-delivered fetch completion without waiting.
    /// Returns how many were applied.
    pub fn poll_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    fn handle_event(&mut self, event: SyncEvent) {
        match event {
            SyncEvent::FrameLoaded {
                ticket,
                video,
                sample,
                frame,
                info,
            } => {
                if !self.sync.frame_is_current(ticket) {
                    log::debug!("discarding superseded frame {video}/{sample}");
                    return;
                }
                if let Some(info) = info {
                    self.cursor.apply_info(info.sampled_count, info.step);
                }
                log::debug!(
                    "🖼️ frame {video}/{sample} loaded ({}x{})",
                    frame.width(),
                    frame.height()
                );
                self.frame = Some(frame);
            }
            SyncEvent::FrameFailed {
                ticket,
                video,
                sample,
                error,
            } => {
                // Keep whatever is currently displayed.
                if self.sync.frame_is_current(ticket) {
                    log::error!("frame {video}/{sample} failed to load: {error}");
                }
            }
            SyncEvent::AnnotationsLoaded {
                ticket,
                video,
                sample,
                boxes,
            } => {
                if !self.sync.annotations_are_current(ticket) {
                    log::debug!("discarding superseded annotations {video}/{sample}");
                    return;
                }
                log::debug!("loaded {} boxes for {video}/{sample}", boxes.len());
                self.editor
                    .replace_all(boxes.into_iter().map(StoredBox::into_data).collect());
            }
            SyncEvent::AnnotationsFailed {
                ticket,
                video,
                sample,
                error,
            } => {
                if self.sync.annotations_are_current(ticket) {
                    // An empty surface is safer than silently showing the
                    // previous frame's boxes over the new image.
                    log::error!("annotations {video}/{sample} failed to load: {error}");
                    self.editor.replace_all(Vec::new());
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Canvas input
    // ------------------------------------------------------------------

    /// The current letterbox fit. Recomputed from the live viewport and the
    /// displayed frame's intrinsic size on every call; never cached.
    pub fn contain_fit(&self, viewport: ViewportSize) -> ContainFit {
        let (w, h) = self
            .frame
            .as_ref()
            .map(|f| (f.width(), f.height()))
            .unwrap_or((0, 0));
        ContainFit::compute(w, h, viewport)
    }

    /// Pointer press on the canvas, in viewport pixels.
    pub fn pointer_down(&mut self, pos: PixelPoint, button: PointerButton, viewport: ViewportSize) {
        let fit = self.contain_fit(viewport);
        let tolerance = fit.pixel_tolerance(HANDLE_HIT_RADIUS);
        self.editor
            .pointer_down(fit.to_normalized(pos), button, tolerance);
    }

    /// Pointer movement over the canvas, in viewport pixels.
    pub fn pointer_move(&mut self, pos: PixelPoint, viewport: ViewportSize) {
        let fit = self.contain_fit(viewport);
        self.editor.pointer_move(fit.to_normalized(pos));
    }

    /// Pointer release.
    pub fn pointer_up(&mut self) {
        self.editor.pointer_up();
    }

    /// Pointer left the canvas.
    pub fn pointer_leave(&mut self) {
        self.editor.pointer_leave();
    }

    /// Boxes mapped to viewport pixels for the rendering collaborator.
    pub fn render_boxes(&self, viewport: ViewportSize) -> Vec<RenderBox> {
        let fit = self.contain_fit(viewport);
        self.editor
            .boxes()
            .iter()
            .map(|b| RenderBox {
                id: b.id,
                rect: fit.rect_to_pixel(b.rect),
                class_name: b.class_name.clone(),
                selected: self.editor.selected() == Some(b.id),
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn wire_boxes(&self) -> Vec<StoredBox> {
        self.editor
            .boxes()
            .iter()
            .map(StoredBox::from_annotation)
            .collect()
    }

    /// Best-effort autosave of the outgoing pair. A failure is logged and
    /// returned for the navigation report; it never blocks the navigation.
    async fn save_outgoing(&mut self) -> Option<StoreError> {
        let boxes = self.wire_boxes();
        match self
            .sync
            .save(self.cursor.video(), self.cursor.sample(), boxes)
            .await
        {
            Ok(()) => None,
            Err(error) => {
                log::error!(
                    "autosave of {}/{} failed: {error}",
                    self.cursor.video(),
                    self.cursor.sample()
                );
                Some(error)
            }
        }
    }

    async fn refresh_video_info(&mut self) {
        match self.sync.video_info(self.cursor.video()).await {
            Ok(info) => self.cursor.apply_info(info.sampled_count, info.step),
            Err(error) => {
                // Frame responses can still refresh the metadata later.
                log::error!(
                    "metadata refresh for video {} failed: {error}",
                    self.cursor.video()
                );
            }
        }
    }

    fn request_loads(&mut self) {
        let video = self.cursor.video();
        let sample = self.cursor.sample();
        self.sync.request_frame(video, sample);
        self.sync.request_annotations(video, sample);
    }
}
