//! Remote annotation store: logical contract, wire types, HTTP client.

mod api;
mod http;
#[cfg(test)]
pub(crate) mod mock;
mod types;

pub use api::VideoStore;
pub use http::{FRAME_STEP_HEADER, HttpVideoStore, SAMPLED_COUNT_HEADER};
pub use types::{ExportArtifact, FramePayload, StoredBox, VideoInfo};
