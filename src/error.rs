//! Error types for store and synchronization operations.

use thiserror::Error;

/// Errors from the remote annotation store.
///
/// Load-side occurrences are transient: the engine logs them, keeps the
/// current display (or falls back to an empty collection for annotations)
/// and never tears down the editing surface. Save-side occurrences are
/// surfaced to the operator but never block navigation.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The store returned a non-success status code.
    #[error("store error ({status}): {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body, kept for the log.
        body: String,
    },

    /// A response body could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Fetched frame bytes could not be decoded as an image.
    #[error("frame decode error: {0}")]
    Image(#[from] image::ImageError),
}

impl StoreError {
    /// Create a non-success status error.
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }
}

/// Failures of the "copy previous sample" shortcut.
///
/// The first two variants are validation no-ops: nothing is fetched and the
/// current collection is left untouched.
#[derive(Error, Debug)]
pub enum PrelabelError {
    /// The first sample has no predecessor to copy from.
    #[error("no previous sample to copy from")]
    FirstSample,

    /// The previous sample exists but holds no boxes.
    #[error("previous sample {sample} has no annotations")]
    EmptyPrevious {
        /// Index of the empty predecessor.
        sample: u32,
    },

    /// Fetching the previous sample's collection failed.
    #[error("failed to fetch previous sample: {0}")]
    Fetch(#[source] StoreError),

    /// Persisting the copied collection failed. The copy is still applied
    /// in memory.
    #[error("failed to save copied annotations: {0}")]
    Save(#[source] StoreError),
}
