//! In-memory store used by synchronizer and session tests.
//!
//! Records every call and lets a test gate individual frame fetches so
//! response ordering can be controlled deterministically.

use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::sync::{Arc, Mutex};

use tokio::sync::Semaphore;

use crate::error::StoreError;
use crate::remote::api::VideoStore;
use crate::remote::types::{ExportArtifact, FramePayload, StoredBox, VideoInfo};

/// Encode a small solid PNG so frame fetches yield decodable bytes.
pub fn encode_test_png(width: u32, height: u32) -> Vec<u8> {
    let image = image::DynamicImage::new_rgba8(width, height);
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, image::ImageFormat::Png)
        .expect("png encode");
    bytes.into_inner()
}

#[derive(Default)]
struct Inner {
    info: HashMap<usize, VideoInfo>,
    frame_size: (u32, u32),
    frame_header_info: Option<VideoInfo>,
    annotations: HashMap<(usize, u32), Vec<StoredBox>>,
    failing_annotations: HashSet<(usize, u32)>,
    failing_saves: bool,
    // call records
    frame_fetches: Vec<(usize, u32)>,
    annotation_fetches: Vec<(usize, u32)>,
    saves: Vec<(usize, u32, Vec<StoredBox>)>,
    /// Every store call in arrival order, e.g. "save 0/5".
    ops: Vec<String>,
    // per-frame gates: a fetch consumes one permit before responding
    frame_gates: HashMap<(usize, u32), Arc<Semaphore>>,
}

/// Deterministic in-memory [`VideoStore`].
#[derive(Default)]
pub struct MockStore {
    inner: Mutex<Inner>,
}

impl MockStore {
    pub fn new() -> Self {
        let store = Self::default();
        {
            let mut inner = store.inner.lock().unwrap();
            inner.frame_size = (64, 48);
        }
        store
    }

    pub fn set_info(&self, video: usize, sampled_count: u32, step: u32) {
        self.inner
            .lock()
            .unwrap()
            .info
            .insert(video, VideoInfo { sampled_count, step });
    }

    pub fn set_frame_size(&self, width: u32, height: u32) {
        self.inner.lock().unwrap().frame_size = (width, height);
    }

    /// Metadata to attach to every frame response (the header refresh path).
    pub fn set_frame_header_info(&self, sampled_count: u32, step: u32) {
        self.inner.lock().unwrap().frame_header_info = Some(VideoInfo { sampled_count, step });
    }

    pub fn set_annotations(&self, video: usize, sample: u32, boxes: Vec<StoredBox>) {
        self.inner
            .lock()
            .unwrap()
            .annotations
            .insert((video, sample), boxes);
    }

    pub fn fail_annotations(&self, video: usize, sample: u32) {
        self.inner
            .lock()
            .unwrap()
            .failing_annotations
            .insert((video, sample));
    }

    pub fn fail_saves(&self, fail: bool) {
        self.inner.lock().unwrap().failing_saves = fail;
    }

    /// Hold responses for one frame until the returned gate gains permits.
    pub fn gate_frame(&self, video: usize, sample: u32) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.inner
            .lock()
            .unwrap()
            .frame_gates
            .insert((video, sample), Arc::clone(&gate));
        gate
    }

    pub fn frame_fetches(&self) -> Vec<(usize, u32)> {
        self.inner.lock().unwrap().frame_fetches.clone()
    }

    pub fn annotation_fetches(&self) -> Vec<(usize, u32)> {
        self.inner.lock().unwrap().annotation_fetches.clone()
    }

    pub fn saves(&self) -> Vec<(usize, u32, Vec<StoredBox>)> {
        self.inner.lock().unwrap().saves.clone()
    }

    /// Every store call in arrival order.
    pub fn ops(&self) -> Vec<String> {
        self.inner.lock().unwrap().ops.clone()
    }
}

impl VideoStore for MockStore {
    async fn list_videos(&self, _directory: &str) -> Result<Vec<String>, StoreError> {
        // Project setup runs against the real backend; sessions never list.
        Ok(Vec::new())
    }

    async fn video_info(&self, _project: &str, video: usize) -> Result<VideoInfo, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.ops.push(format!("info {video}"));
        inner
            .info
            .get(&video)
            .copied()
            .ok_or_else(|| StoreError::status(404, "unknown video"))
    }

    async fn fetch_frame(
        &self,
        _project: &str,
        video: usize,
        sample: u32,
    ) -> Result<FramePayload, StoreError> {
        let (gate, size, info) = {
            let mut inner = self.inner.lock().unwrap();
            inner.frame_fetches.push((video, sample));
            inner.ops.push(format!("frame {video}/{sample}"));
            (
                inner.frame_gates.get(&(video, sample)).cloned(),
                inner.frame_size,
                inner.frame_header_info,
            )
        };
        if let Some(gate) = gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        Ok(FramePayload {
            bytes: encode_test_png(size.0, size.1),
            info,
        })
    }

    async fn fetch_annotations(
        &self,
        _project: &str,
        video: usize,
        sample: u32,
    ) -> Result<Vec<StoredBox>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.annotation_fetches.push((video, sample));
        inner.ops.push(format!("annotations {video}/{sample}"));
        if inner.failing_annotations.contains(&(video, sample)) {
            return Err(StoreError::status(500, "annotation fetch failed"));
        }
        Ok(inner
            .annotations
            .get(&(video, sample))
            .cloned()
            .unwrap_or_default())
    }

    async fn save_annotations(
        &self,
        _project: &str,
        video: usize,
        sample: u32,
        boxes: Vec<StoredBox>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.ops.push(format!("save {video}/{sample}"));
        if inner.failing_saves {
            return Err(StoreError::status(500, "save failed"));
        }
        inner.saves.push((video, sample, boxes.clone()));
        inner.annotations.insert((video, sample), boxes);
        Ok(())
    }

    async fn fetch_export(&self, project: &str) -> Result<ExportArtifact, StoreError> {
        Ok(ExportArtifact {
            filename: format!("{project}_export.json"),
            bytes: b"{}".to_vec(),
        })
    }
}

/// Shorthand for a stored box with just geometry and a class.
pub fn stored_box(left: f32, top: f32, width: f32, height: f32, class: &str) -> StoredBox {
    StoredBox {
        rect: crate::model::NormRect::new(left, top, width, height),
        class_name: class.to_string(),
        object_id: Some(0),
        attributes: Default::default(),
    }
}
