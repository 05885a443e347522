//! Box annotations and the per-frame collection.

use std::collections::BTreeMap;

use crate::model::bbox::{Corner, NormPoint, NormRect};
use crate::model::project::ProjectConfig;

/// Unique identifier for a box within the active frame.
///
/// Assigned from a per-session monotonic counter; never reused while the
/// session lives, so ids stay stable across reloads of other frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoxId(pub u64);

impl std::fmt::Display for BoxId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One annotated region on one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxAnnotation {
    /// Identifier, stable for the lifetime of the box in the editor.
    pub id: BoxId,
    /// Geometry in normalized image coordinates.
    pub rect: NormRect,
    /// Class label; empty when the project has no classes configured.
    pub class_name: String,
    /// Identity tag for tracking an object across frames. `None` until the
    /// operator assigns one; normalized to `0` in the wire form at save time.
    pub object_id: Option<i64>,
    /// Attribute name -> selected option; unset attributes hold "".
    pub attributes: BTreeMap<String, String>,
}

/// Plain box data without an id, as ingested from the store (sample load or
/// prelabel copy). The collection assigns fresh ids on adoption.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoxData {
    pub rect: NormRect,
    pub class_name: String,
    pub object_id: Option<i64>,
    pub attributes: BTreeMap<String, String>,
}

impl From<&BoxAnnotation> for BoxData {
    fn from(b: &BoxAnnotation) -> Self {
        Self {
            rect: b.rect,
            class_name: b.class_name.clone(),
            object_id: b.object_id,
            attributes: b.attributes.clone(),
        }
    }
}

/// Creation-ordered box collection for the active frame.
///
/// Order matters twice: "remove last" pops the newest box, and the store
/// receives the collection in creation order.
#[derive(Debug, Default)]
pub struct AnnotationSet {
    boxes: Vec<BoxAnnotation>,
    next_id: u64,
}

impl AnnotationSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh_id(&mut self) -> BoxId {
        let id = BoxId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Create a zero-size box at a point, with project defaults, and return
    /// its id. This is the start of a draw gesture.
    pub fn create_at(&mut self, p: NormPoint, config: &ProjectConfig) -> BoxId {
        let id = self.fresh_id();
        self.boxes.push(BoxAnnotation {
            id,
            rect: NormRect::at_point(p),
            class_name: config.default_class(),
            object_id: None,
            attributes: config.empty_attributes(),
        });
        id
    }

    /// Add a fully specified box (loaded or prelabeled data), assigning a
    /// fresh id. The rect is clamped through the geometry invariants.
    pub fn adopt(
        &mut self,
        rect: NormRect,
        class_name: String,
        object_id: Option<i64>,
        attributes: BTreeMap<String, String>,
    ) -> BoxId {
        let id = self.fresh_id();
        self.boxes.push(BoxAnnotation {
            id,
            rect: rect.clamped(),
            class_name,
            object_id,
            attributes,
        });
        id
    }

    /// Drop every box, keeping the id counter running.
    pub fn clear(&mut self) {
        self.boxes.clear();
    }

    pub fn get(&self, id: BoxId) -> Option<&BoxAnnotation> {
        self.boxes.iter().find(|b| b.id == id)
    }

    pub fn get_mut(&mut self, id: BoxId) -> Option<&mut BoxAnnotation> {
        self.boxes.iter_mut().find(|b| b.id == id)
    }

    /// Remove a box by id.
    pub fn remove(&mut self, id: BoxId) -> Option<BoxAnnotation> {
        let pos = self.boxes.iter().position(|b| b.id == id)?;
        Some(self.boxes.remove(pos))
    }

    /// Remove the most recently created box. No-op on an empty collection.
    pub fn remove_last(&mut self) -> Option<BoxAnnotation> {
        self.boxes.pop()
    }

    /// Boxes in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &BoxAnnotation> {
        self.boxes.iter()
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Topmost box whose body contains the point. Boxes drawn later render
    /// on top, so the scan runs newest-first.
    pub fn hit_test(&self, p: NormPoint) -> Option<BoxId> {
        self.boxes
            .iter()
            .rev()
            .find(|b| b.rect.contains(p))
            .map(|b| b.id)
    }

    /// Topmost corner handle within the per-axis tolerance of the point.
    ///
    /// The tolerance arrives in normalized units, derived from a pixel
    /// radius through the current contain fit.
    pub fn hit_test_handle(
        &self,
        p: NormPoint,
        tol_x: f32,
        tol_y: f32,
    ) -> Option<(BoxId, Corner)> {
        for b in self.boxes.iter().rev() {
            for &corner in Corner::all() {
                let pos = b.rect.corner(corner);
                if (p.x - pos.x).abs() <= tol_x && (p.y - pos.y).abs() <= tol_y {
                    return Some((b.id, corner));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ProjectConfig {
        ProjectConfig {
            classes: vec!["car".into(), "person".into()],
            attributes: vec![crate::model::project::AttributeSpec {
                name: "occluded".into(),
                options: vec!["yes".into(), "no".into()],
            }],
        }
    }

    #[test]
    fn create_at_uses_project_defaults() {
        let mut set = AnnotationSet::new();
        let id = set.create_at(NormPoint::new(0.5, 0.5), &config());
        let b = set.get(id).unwrap();
        assert_eq!(b.class_name, "car");
        assert_eq!(b.object_id, None);
        assert_eq!(b.attributes["occluded"], "");
        assert_eq!(b.rect, NormRect::new(0.5, 0.5, 0.0, 0.0));
    }

    #[test]
    fn ids_are_unique_and_monotonic() {
        let mut set = AnnotationSet::new();
        let a = set.create_at(NormPoint::new(0.1, 0.1), &config());
        let b = set.create_at(NormPoint::new(0.2, 0.2), &config());
        set.remove(a);
        let c = set.create_at(NormPoint::new(0.3, 0.3), &config());
        assert!(a < b && b < c);
    }

    #[test]
    fn remove_last_pops_newest() {
        let mut set = AnnotationSet::new();
        let first = set.create_at(NormPoint::new(0.1, 0.1), &config());
        let second = set.create_at(NormPoint::new(0.2, 0.2), &config());
        assert_eq!(set.remove_last().map(|b| b.id), Some(second));
        assert_eq!(set.remove_last().map(|b| b.id), Some(first));
        assert!(set.remove_last().is_none());
    }

    #[test]
    fn adopt_clamps_corrupt_rects() {
        let mut set = AnnotationSet::new();
        let id = set.adopt(
            NormRect::new(0.9, 0.0, 0.5, 0.5),
            "car".into(),
            Some(3),
            BTreeMap::new(),
        );
        let rect = set.get(id).unwrap().rect;
        assert!(rect.right() <= 1.0);
    }

    #[test]
    fn hit_test_prefers_topmost() {
        let mut set = AnnotationSet::new();
        let below = set.adopt(
            NormRect::new(0.1, 0.1, 0.5, 0.5),
            String::new(),
            None,
            BTreeMap::new(),
        );
        let above = set.adopt(
            NormRect::new(0.2, 0.2, 0.5, 0.5),
            String::new(),
            None,
            BTreeMap::new(),
        );
        assert_eq!(set.hit_test(NormPoint::new(0.3, 0.3)), Some(above));
        assert_eq!(set.hit_test(NormPoint::new(0.15, 0.15)), Some(below));
        assert_eq!(set.hit_test(NormPoint::new(0.9, 0.9)), None);
    }

    #[test]
    fn handle_hit_respects_tolerance() {
        let mut set = AnnotationSet::new();
        let id = set.adopt(
            NormRect::new(0.2, 0.2, 0.4, 0.4),
            String::new(),
            None,
            BTreeMap::new(),
        );
        let hit = set.hit_test_handle(NormPoint::new(0.61, 0.59), 0.02, 0.02);
        assert_eq!(hit, Some((id, Corner::BottomRight)));
        assert!(
            set.hit_test_handle(NormPoint::new(0.4, 0.4), 0.02, 0.02)
                .is_none()
        );
    }
}
