//! Wire types for the annotation store.
//!
//! Field names match the JSON the backend speaks (`camelCase`). Conversions
//! to and from the editing model live here so the save-time `objectId`
//! normalization happens in exactly one place.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::model::{BoxAnnotation, BoxData, NormRect};

/// Per-video sampling metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInfo {
    /// Number of sampled frames available for navigation.
    pub sampled_count: u32,
    /// Raw-frame stride between two consecutive samples.
    pub step: u32,
}

/// One box as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredBox {
    #[serde(flatten)]
    pub rect: NormRect,
    #[serde(default)]
    pub class_name: String,
    /// Identity tag; old saves may carry null, a string, or nothing at all.
    #[serde(default, deserialize_with = "lenient_object_id")]
    pub object_id: Option<i64>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl StoredBox {
    /// Wire form of an editor box. A missing `objectId` normalizes to 0.
    pub fn from_annotation(b: &BoxAnnotation) -> Self {
        Self {
            rect: b.rect,
            class_name: b.class_name.clone(),
            object_id: Some(b.object_id.unwrap_or(0)),
            attributes: b.attributes.clone(),
        }
    }

    /// Editing-model form of a stored box. The rect is clamped through the
    /// geometry invariants when the collection adopts it.
    pub fn into_data(self) -> BoxData {
        BoxData {
            rect: self.rect,
            class_name: self.class_name,
            object_id: self.object_id,
            attributes: self.attributes,
        }
    }
}

/// Accept a number, a numeric string, null, or a missing field; anything
/// unparseable reads back as `None`.
fn lenient_object_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// A fetched frame: encoded image bytes plus any refreshed sampling
/// metadata the response carried out-of-band.
#[derive(Debug, Clone)]
pub struct FramePayload {
    pub bytes: Vec<u8>,
    pub info: Option<VideoInfo>,
}

/// A full-project export, opaque to the engine; the host hands it to the
/// platform's download mechanism.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub filename: String,
    pub bytes: Vec<u8>,
}
