//! HTTP implementation of the store contract using [`reqwest`].

use crate::error::StoreError;
use crate::remote::api::VideoStore;
use crate::remote::types::{ExportArtifact, FramePayload, StoredBox, VideoInfo};

/// Response header carrying a refreshed sampled-frame count.
pub const SAMPLED_COUNT_HEADER: &str = "x-sampled-count";
/// Response header carrying a refreshed frame step.
pub const FRAME_STEP_HEADER: &str = "x-frame-step";

/// HTTP client for the annotation backend.
///
/// Holds the bearer credential for the session; it is attached to every
/// request and otherwise treated as opaque.
pub struct HttpVideoStore {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpVideoStore {
    /// Create a client for a backend instance.
    ///
    /// * `base_url` - Base HTTP URL, e.g. `http://localhost:56250`.
    /// * `token` - Bearer credential from the auth collaborator.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`] (connection
    /// pooling across stores).
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .get(format!("{}{path}", self.base_url))
            .bearer_auth(&self.token)
    }

    /// Map a non-success response to a status error, keeping the body.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::status(status.as_u16(), body))
    }

    /// Read an optional `u32` metadata header.
    fn header_u32(response: &reqwest::Response, name: &str) -> Option<u32> {
        response
            .headers()
            .get(name)?
            .to_str()
            .ok()?
            .parse()
            .ok()
    }
}

impl VideoStore for HttpVideoStore {
    async fn list_videos(&self, directory: &str) -> Result<Vec<String>, StoreError> {
        let response = self
            .get("/videos")
            .query(&[("directory", directory)])
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn video_info(&self, project: &str, video: usize) -> Result<VideoInfo, StoreError> {
        let response = self
            .get(&format!("/api/projects/{project}/videos/{video}/info"))
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn fetch_frame(
        &self,
        project: &str,
        video: usize,
        sample: u32,
    ) -> Result<FramePayload, StoreError> {
        let response = self
            .get(&format!(
                "/api/projects/{project}/videos/{video}/frames/{sample}"
            ))
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        // The body is reserved for image bytes; refreshed sampling metadata
        // rides along in headers when the backend has newer values.
        let sampled_count = Self::header_u32(&response, SAMPLED_COUNT_HEADER);
        let step = Self::header_u32(&response, FRAME_STEP_HEADER);
        let info = match (sampled_count, step) {
            (Some(sampled_count), Some(step)) => Some(VideoInfo { sampled_count, step }),
            _ => None,
        };

        Ok(FramePayload {
            bytes: response.bytes().await?.to_vec(),
            info,
        })
    }

    async fn fetch_annotations(
        &self,
        project: &str,
        video: usize,
        sample: u32,
    ) -> Result<Vec<StoredBox>, StoreError> {
        let response = self
            .get(&format!(
                "/api/projects/{project}/videos/{video}/annotations/{sample}"
            ))
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn save_annotations(
        &self,
        project: &str,
        video: usize,
        sample: u32,
        boxes: Vec<StoredBox>,
    ) -> Result<(), StoreError> {
        let response = self
            .client
            .post(format!(
                "{}/api/projects/{project}/videos/{video}/annotations/{sample}",
                self.base_url
            ))
            .bearer_auth(&self.token)
            .json(&boxes)
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn fetch_export(&self, project: &str) -> Result<ExportArtifact, StoreError> {
        let response = self
            .get(&format!("/api/projects/{project}/export"))
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        // Prefer the backend's suggested filename when it sends one.
        let filename = response
            .headers()
            .get(reqwest::header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split("filename=").nth(1))
            .map(|name| name.trim_matches('"').to_string())
            .unwrap_or_else(|| format!("{project}_export.json"));

        Ok(ExportArtifact {
            filename,
            bytes: response.bytes().await?.to_vec(),
        })
    }
}
