//! Load/save synchronization between the editing session and the store.
//!
//! For each independently fetched resource kind (frame image, annotation
//! set) a [`RequestTracker`] hands out generation tickets. Issuing a new
//! request aborts the previous in-flight task for that kind, and every
//! completion re-enters through the event channel carrying its ticket; the
//! session discards any event whose ticket is no longer current. Between the
//! abort and the check, a rapid navigation sequence can never let a stale
//! response overwrite newer state.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;

use crate::error::{PrelabelError, StoreError};
use crate::remote::{StoredBox, VideoInfo, VideoStore};

/// A decoded frame ready for display and coordinate mapping.
pub struct FrameImage {
    image: image::DynamicImage,
}

impl FrameImage {
    /// Decode fetched frame bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, StoreError> {
        Ok(Self {
            image: image::load_from_memory(bytes)?,
        })
    }

    /// Intrinsic width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Intrinsic height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// The decoded pixels, for the rendering collaborator.
    pub fn image(&self) -> &image::DynamicImage {
        &self.image
    }
}

impl std::fmt::Debug for FrameImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameImage")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

/// Generation ticket for one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Generation counter plus abort handle for one resource kind.
#[derive(Debug, Default)]
pub struct RequestTracker {
    generation: u64,
    in_flight: Option<AbortHandle>,
}

impl RequestTracker {
    /// Start a new request: any previous in-flight task is aborted and its
    /// ticket invalidated.
    pub fn begin(&mut self) -> Ticket {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
        self.generation += 1;
        Ticket(self.generation)
    }

    /// Attach the spawned task for the most recent `begin`.
    pub fn attach(&mut self, handle: AbortHandle) {
        self.in_flight = Some(handle);
    }

    /// Whether a response with this ticket is still allowed to take effect.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.generation
    }
}

/// Completion of a tracked fetch, delivered through the event channel.
#[derive(Debug)]
pub enum SyncEvent {
    FrameLoaded {
        ticket: Ticket,
        video: usize,
        sample: u32,
        frame: FrameImage,
        /// Refreshed sampling metadata, when the response carried any.
        info: Option<VideoInfo>,
    },
    FrameFailed {
        ticket: Ticket,
        video: usize,
        sample: u32,
        error: StoreError,
    },
    AnnotationsLoaded {
        ticket: Ticket,
        video: usize,
        sample: u32,
        boxes: Vec<StoredBox>,
    },
    AnnotationsFailed {
        ticket: Ticket,
        video: usize,
        sample: u32,
        error: StoreError,
    },
}

/// Issues and tracks store operations for one project session.
pub struct Synchronizer<S> {
    store: Arc<S>,
    project: String,
    frame_requests: RequestTracker,
    annotation_requests: RequestTracker,
    events: mpsc::UnboundedSender<SyncEvent>,
}

impl<S: VideoStore> Synchronizer<S> {
    /// Create a synchronizer and the receiving end of its event channel.
    pub fn new(store: Arc<S>, project: String) -> (Self, mpsc::UnboundedReceiver<SyncEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        (
            Self {
                store,
                project,
                frame_requests: RequestTracker::default(),
                annotation_requests: RequestTracker::default(),
                events,
            },
            rx,
        )
    }

    /// Whether a frame response with this ticket may still be applied.
    pub fn frame_is_current(&self, ticket: Ticket) -> bool {
        self.frame_requests.is_current(ticket)
    }

    /// Whether an annotation response with this ticket may still be applied.
    pub fn annotations_are_current(&self, ticket: Ticket) -> bool {
        self.annotation_requests.is_current(ticket)
    }

    /// Fetch a frame in the background, superseding any in-flight frame
    /// fetch. Decoding happens on the fetch task.
    pub fn request_frame(&mut self, video: usize, sample: u32) -> Ticket {
        let ticket = self.frame_requests.begin();
        log::debug!("🖼️ fetching frame {video}/{sample}");

        let store = Arc::clone(&self.store);
        let project = self.project.clone();
        let events = self.events.clone();
        let handle = tokio::spawn(async move {
            let event = match store.fetch_frame(&project, video, sample).await {
                Ok(payload) => match FrameImage::decode(&payload.bytes) {
                    Ok(frame) => SyncEvent::FrameLoaded {
                        ticket,
                        video,
                        sample,
                        frame,
                        info: payload.info,
                    },
                    Err(error) => SyncEvent::FrameFailed {
                        ticket,
                        video,
                        sample,
                        error,
                    },
                },
                Err(error) => SyncEvent::FrameFailed {
                    ticket,
                    video,
                    sample,
                    error,
                },
            };
            let _ = events.send(event);
        });
        self.frame_requests.attach(handle.abort_handle());
        ticket
    }

    /// Fetch a frame's annotation set in the background, superseding any
    /// in-flight annotation fetch.
    pub fn request_annotations(&mut self, video: usize, sample: u32) -> Ticket {
        let ticket = self.annotation_requests.begin();
        log::debug!("fetching annotations {video}/{sample}");

        let store = Arc::clone(&self.store);
        let project = self.project.clone();
        let events = self.events.clone();
        let handle = tokio::spawn(async move {
            let event = match store.fetch_annotations(&project, video, sample).await {
                Ok(boxes) => SyncEvent::AnnotationsLoaded {
                    ticket,
                    video,
                    sample,
                    boxes,
                },
                Err(error) => SyncEvent::AnnotationsFailed {
                    ticket,
                    video,
                    sample,
                    error,
                },
            };
            let _ = events.send(event);
        });
        self.annotation_requests.attach(handle.abort_handle());
        ticket
    }

    /// Persist a frame's collection wholesale. Runs on the caller's task so
    /// navigation can sequence the save strictly before the next load.
    pub async fn save(
        &self,
        video: usize,
        sample: u32,
        boxes: Vec<StoredBox>,
    ) -> Result<(), StoreError> {
        log::debug!("💾 saving {} boxes for {video}/{sample}", boxes.len());
        self.store
            .save_annotations(&self.project, video, sample, boxes)
            .await
    }

    /// Sampling metadata for a video.
    pub async fn video_info(&self, video: usize) -> Result<VideoInfo, StoreError> {
        self.store.video_info(&self.project, video).await
    }

    /// Fetch the previous sample's collection for the prelabel shortcut.
    ///
    /// Validation no-ops: the first sample has no predecessor, and an empty
    /// predecessor is rejected before anything is copied.
    pub async fn fetch_previous(
        &self,
        video: usize,
        sample: u32,
    ) -> Result<Vec<StoredBox>, PrelabelError> {
        if sample == 0 {
            return Err(PrelabelError::FirstSample);
        }
        let previous = sample - 1;
        let boxes = self
            .store
            .fetch_annotations(&self.project, video, previous)
            .await
            .map_err(PrelabelError::Fetch)?;
        if boxes.is_empty() {
            return Err(PrelabelError::EmptyPrevious { sample: previous });
        }
        Ok(boxes)
    }

    /// Fetch the full-project export artifact.
    pub async fn export(&self) -> Result<crate::remote::ExportArtifact, StoreError> {
        self.store.fetch_export(&self.project).await
    }
}
