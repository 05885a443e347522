//! Pointer-driven annotation editing state machine.
//!
//! All coordinates arriving here are already normalized by the viewport
//! mapper. The pointer lifecycle is one tagged union — a gesture is either
//! not happening, armed, or happening on exactly one box — while selection
//! is an orthogonal field used for highlight and list sync.

use crate::model::{
    AnnotationSet, BoxData, BoxId, Corner, NormPoint, NormRect, ProjectConfig,
};

/// Pointer buttons as reported by the host. Only `Primary` participates in
/// any transition; the rest are ignored wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// The pointer-gesture state. At most one gesture is active at a time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerState {
    /// No tool armed, no gesture in progress.
    Idle,
    /// Draw tool toggled on, waiting for the first press.
    DrawArmed,
    /// A new box is being drawn out from `anchor`.
    Drawing { id: BoxId, anchor: NormPoint },
    /// An existing box follows the pointer; `grab` is the offset from the
    /// box origin to the pointer captured at press time.
    Dragging { id: BoxId, grab: NormPoint },
    /// A corner of an existing box follows the pointer.
    Resizing { id: BoxId, corner: Corner },
}

impl PointerState {
    /// Box captured by the current gesture, if any.
    fn gesture_box(&self) -> Option<BoxId> {
        match *self {
            PointerState::Drawing { id, .. }
            | PointerState::Dragging { id, .. }
            | PointerState::Resizing { id, .. } => Some(id),
            PointerState::Idle | PointerState::DrawArmed => None,
        }
    }
}

/// The interactive editing surface for one frame's box collection.
pub struct AnnotationEditor {
    config: ProjectConfig,
    boxes: AnnotationSet,
    pointer: PointerState,
    selected: Option<BoxId>,
}

impl AnnotationEditor {
    pub fn new(config: ProjectConfig) -> Self {
        Self {
            config,
            boxes: AnnotationSet::new(),
            pointer: PointerState::Idle,
            selected: None,
        }
    }

    pub fn boxes(&self) -> &AnnotationSet {
        &self.boxes
    }

    pub fn pointer_state(&self) -> PointerState {
        self.pointer
    }

    pub fn selected(&self) -> Option<BoxId> {
        self.selected
    }

    pub fn is_draw_armed(&self) -> bool {
        matches!(self.pointer, PointerState::DrawArmed)
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Tool arming
    // ------------------------------------------------------------------

    /// Arm the draw tool. Ignored while a gesture is in progress.
    pub fn arm_draw(&mut self) {
        if matches!(self.pointer, PointerState::Idle) {
            self.pointer = PointerState::DrawArmed;
            log::debug!("draw tool armed");
        }
    }

    /// Disarm the draw tool without drawing.
    pub fn disarm_draw(&mut self) {
        if matches!(self.pointer, PointerState::DrawArmed) {
            self.pointer = PointerState::Idle;
            log::debug!("draw tool disarmed");
        }
    }

    /// Toggle the draw tool on or off.
    pub fn toggle_draw(&mut self) {
        match self.pointer {
            PointerState::Idle => self.arm_draw(),
            PointerState::DrawArmed => self.disarm_draw(),
            _ => {}
        }
    }

    // ------------------------------------------------------------------
    // Pointer lifecycle
    // ------------------------------------------------------------------

    /// Primary-button press on the canvas at a normalized position.
    ///
    /// `handle_tolerance` is the per-axis normalized radius for corner-handle
    /// hits, derived from a pixel radius through the current contain fit.
    /// Hit priority: corner handle, then box body, then empty canvas.
    pub fn pointer_down(
        &mut self,
        p: NormPoint,
        button: PointerButton,
        handle_tolerance: (f32, f32),
    ) {
        if button != PointerButton::Primary {
            return;
        }

        match self.pointer {
            PointerState::DrawArmed => {
                let id = self.boxes.create_at(p, &self.config);
                self.pointer = PointerState::Drawing { id, anchor: p };
                log::debug!("drawing box {id} from ({:.3}, {:.3})", p.x, p.y);
            }
            PointerState::Idle => {
                let (tol_x, tol_y) = handle_tolerance;
                if let Some((id, corner)) = self.boxes.hit_test_handle(p, tol_x, tol_y) {
                    self.selected = Some(id);
                    self.pointer = PointerState::Resizing { id, corner };
                    log::debug!("resizing box {id} by {corner:?}");
                } else if let Some(id) = self.boxes.hit_test(p) {
                    // Offset from the box origin, so the box does not jump
                    // under the pointer on the first move.
                    let rect = self.boxes.get(id).map(|b| b.rect).unwrap_or_default();
                    let grab = NormPoint::new(p.x - rect.left, p.y - rect.top);
                    self.selected = Some(id);
                    self.pointer = PointerState::Dragging { id, grab };
                    log::debug!("dragging box {id}");
                } else {
                    self.selected = None;
                }
            }
            // A press cannot arrive while a gesture holds the button.
            PointerState::Drawing { .. }
            | PointerState::Dragging { .. }
            | PointerState::Resizing { .. } => {}
        }
    }

    /// Pointer movement at a normalized position.
    pub fn pointer_move(&mut self, p: NormPoint) {
        match self.pointer {
            PointerState::Drawing { id, anchor } => {
                if let Some(b) = self.boxes.get_mut(id) {
                    b.rect = NormRect::from_corners(anchor, p);
                }
            }
            PointerState::Dragging { id, grab } => {
                if let Some(b) = self.boxes.get_mut(id) {
                    b.rect = b.rect.moved_to(p.x - grab.x, p.y - grab.y);
                }
            }
            PointerState::Resizing { id, corner } => {
                if let Some(b) = self.boxes.get_mut(id) {
                    b.rect = b.rect.resize_corner(corner, p);
                }
            }
            PointerState::Idle | PointerState::DrawArmed => {}
        }
    }

    /// Primary-button release; ends whatever gesture is in progress.
    ///
    /// Committing a drawn box auto-disarms the tool: one box per explicit
    /// re-arm. Ending a drag or resize clears the selection.
    pub fn pointer_up(&mut self) {
        match self.pointer {
            PointerState::Drawing { id, .. } => {
                self.pointer = PointerState::Idle;
                log::debug!("committed box {id}");
            }
            PointerState::Dragging { .. } | PointerState::Resizing { .. } => {
                self.selected = None;
                self.pointer = PointerState::Idle;
            }
            PointerState::Idle | PointerState::DrawArmed => {}
        }
    }

    /// Pointer left the interactive region; treated exactly like a release.
    pub fn pointer_leave(&mut self) {
        self.pointer_up();
    }

    // ------------------------------------------------------------------
    // Collection operations
    // ------------------------------------------------------------------

    /// Remove the most recently created box, regardless of pointer state.
    /// No-op on an empty collection.
    pub fn remove_last(&mut self) {
        if let Some(removed) = self.boxes.remove_last() {
            self.forget(removed.id);
            log::debug!("removed last box {}", removed.id);
        }
    }

    /// Remove a box by id (list-view delete). Clears the selection only if
    /// the removed box was selected.
    pub fn remove(&mut self, id: BoxId) {
        if self.boxes.remove(id).is_some() {
            self.forget(id);
            log::debug!("removed box {id}");
        }
    }

    /// Select a box for highlight and list sync. At most one is selected.
    pub fn select(&mut self, id: BoxId) {
        if self.boxes.get(id).is_some() {
            self.selected = Some(id);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Replace the whole collection (sample load or prelabel), resetting any
    /// gesture and selection.
    pub fn replace_all(&mut self, boxes: Vec<BoxData>) {
        self.boxes.clear();
        for data in boxes {
            self.boxes
                .adopt(data.rect, data.class_name, data.object_id, data.attributes);
        }
        self.selected = None;
        self.pointer = PointerState::Idle;
    }

    /// Drop references to a box that no longer exists.
    fn forget(&mut self, id: BoxId) {
        if self.selected == Some(id) {
            self.selected = None;
        }
        if self.pointer.gesture_box() == Some(id) {
            self.pointer = PointerState::Idle;
        }
    }

    // ------------------------------------------------------------------
    // Tagging
    // ------------------------------------------------------------------

    /// Assign a class label. Legal in any pointer state.
    pub fn set_class(&mut self, id: BoxId, class_name: impl Into<String>) {
        if let Some(b) = self.boxes.get_mut(id) {
            b.class_name = class_name.into();
        }
    }

    /// Assign or clear the object identity tag. Legal in any pointer state.
    pub fn set_object_id(&mut self, id: BoxId, object_id: Option<i64>) {
        if let Some(b) = self.boxes.get_mut(id) {
            b.object_id = object_id;
        }
    }

    /// Set a configured attribute. Unknown attribute names are ignored.
    pub fn set_attribute(&mut self, id: BoxId, name: &str, value: impl Into<String>) {
        if !self.config.attributes.iter().any(|spec| spec.name == name) {
            log::warn!("ignoring unknown attribute {name:?}");
            return;
        }
        if let Some(b) = self.boxes.get_mut(id) {
            b.attributes.insert(name.to_string(), value.into());
        }
    }
}
