//! Logical request/response contract the engine depends on.
//!
//! Transport framing is an implementation detail; `HttpVideoStore` is the
//! production implementation and tests substitute an in-memory store.

use std::future::Future;

use crate::error::StoreError;
use crate::remote::types::{ExportArtifact, FramePayload, StoredBox, VideoInfo};

/// The remote annotation store, one per project session.
///
/// Implementations attach the session's bearer credential themselves; the
/// engine never inspects it. Futures are `Send` because fetches run as
/// spawned tasks.
pub trait VideoStore: Send + Sync + 'static {
    /// List the video files available in a backend directory (project setup
    /// flow).
    fn list_videos(
        &self,
        directory: &str,
    ) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send;

    /// Sampling metadata for one video.
    fn video_info(
        &self,
        project: &str,
        video: usize,
    ) -> impl Future<Output = Result<VideoInfo, StoreError>> + Send;

    /// Encoded image bytes for one sampled frame, with optional refreshed
    /// metadata.
    fn fetch_frame(
        &self,
        project: &str,
        video: usize,
        sample: u32,
    ) -> impl Future<Output = Result<FramePayload, StoreError>> + Send;

    /// The stored box collection for one sampled frame; empty when none.
    fn fetch_annotations(
        &self,
        project: &str,
        video: usize,
        sample: u32,
    ) -> impl Future<Output = Result<Vec<StoredBox>, StoreError>> + Send;

    /// Replace the stored collection for one sampled frame wholesale.
    fn save_annotations(
        &self,
        project: &str,
        video: usize,
        sample: u32,
        boxes: Vec<StoredBox>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// The full-project export artifact.
    fn fetch_export(
        &self,
        project: &str,
    ) -> impl Future<Output = Result<ExportArtifact, StoreError>> + Send;
}
