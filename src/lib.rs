//! LabelMV annotation engine.
//!
//! The interactive core of a multi-video bounding-box labeling tool: the
//! normalized box geometry, the pointer-driven editing state machine, the
//! letterbox coordinate mapper, the sample navigation cursor, and the
//! persistence synchronizer that loads, autosaves and prelabels annotation
//! collections against a remote store.
//!
//! Rendering, routing and credential handling are the host's job; the host
//! feeds pointer and navigation events into a [`VideoSession`] and draws
//! from the render model it exposes.

mod constants;
mod cursor;
mod editor;
mod error;
mod model;
mod remote;
mod session;
mod sync;
mod viewport;

pub use constants::{HANDLE_HIT_RADIUS, MIN_BOX_SIZE};
pub use cursor::SampleCursor;
pub use editor::{AnnotationEditor, PointerButton, PointerState};
pub use error::{PrelabelError, StoreError};
pub use model::{
    AnnotationSet, AttributeSpec, BoxAnnotation, BoxData, BoxId, Corner, NormPoint, NormRect,
    ProjectConfig,
};
pub use remote::{
    ExportArtifact, FRAME_STEP_HEADER, FramePayload, HttpVideoStore, SAMPLED_COUNT_HEADER,
    StoredBox, VideoInfo, VideoStore,
};
pub use session::{NavigationReport, RenderBox, SessionContext, VideoSession};
pub use sync::{FrameImage, RequestTracker, SyncEvent, Synchronizer, Ticket};
pub use viewport::{ContainFit, PixelPoint, PixelRect, ViewportSize};
