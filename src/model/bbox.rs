//! Normalized box geometry.
//!
//! All coordinates are fractions of the image's intrinsic pixel size, so a
//! rect is independent of how the frame is currently displayed. The resize,
//! draw and drag algorithms here are the only code allowed to produce new
//! geometry; each one re-establishes the invariants
//! `0 <= left`, `0 <= top`, `left + width <= 1`, `top + height <= 1`.

use serde::{Deserialize, Serialize};

use crate::constants::MIN_BOX_SIZE;

/// A point in normalized image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormPoint {
    pub x: f32,
    pub y: f32,
}

impl NormPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One of the four corners of a box, used to tag a resize gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// The corner held fixed while this one is dragged.
    pub fn opposite(self) -> Corner {
        match self {
            Corner::TopLeft => Corner::BottomRight,
            Corner::TopRight => Corner::BottomLeft,
            Corner::BottomLeft => Corner::TopRight,
            Corner::BottomRight => Corner::TopLeft,
        }
    }

    /// All corners, in handle-rendering order.
    pub fn all() -> &'static [Corner] {
        &[
            Corner::TopLeft,
            Corner::TopRight,
            Corner::BottomLeft,
            Corner::BottomRight,
        ]
    }
}

/// An axis-aligned box in normalized image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NormRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl NormRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Zero-size rect anchored at a point (the start of a draw gesture).
    pub fn at_point(p: NormPoint) -> Self {
        Self::new(p.x, p.y, 0.0, 0.0)
    }

    /// Bounding rectangle of an anchor and a live pointer position.
    ///
    /// Supports drawing in any of the four directions from the anchor; both
    /// points are expected to already be clamped to `[0,1]` by the mapper.
    pub fn from_corners(anchor: NormPoint, p: NormPoint) -> Self {
        Self {
            left: anchor.x.min(p.x),
            top: anchor.y.min(p.y),
            width: (anchor.x - p.x).abs(),
            height: (anchor.y - p.y).abs(),
        }
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Position of a corner.
    pub fn corner(&self, corner: Corner) -> NormPoint {
        match corner {
            Corner::TopLeft => NormPoint::new(self.left, self.top),
            Corner::TopRight => NormPoint::new(self.right(), self.top),
            Corner::BottomLeft => NormPoint::new(self.left, self.bottom()),
            Corner::BottomRight => NormPoint::new(self.right(), self.bottom()),
        }
    }

    /// Check if a point is inside the rect (edges inclusive).
    pub fn contains(&self, p: NormPoint) -> bool {
        p.x >= self.left && p.x <= self.right() && p.y >= self.top && p.y <= self.bottom()
    }

    /// Resize by dragging `corner` to `p`, holding the opposite corner fixed.
    ///
    /// Width and height become the absolute distance from the fixed corner to
    /// `p`, so the gesture may cross over the fixed corner without ever
    /// producing a negative size. A minimum-size floor keeps the handles
    /// grabbable, and an overflowing edge slides inward rather than pushing
    /// the fixed corner out of the frame.
    pub fn resize_corner(&self, corner: Corner, p: NormPoint) -> Self {
        let fixed = self.corner(corner.opposite());

        let mut rect = Self::from_corners(fixed, p);
        rect.width = rect.width.max(MIN_BOX_SIZE);
        rect.height = rect.height.max(MIN_BOX_SIZE);
        rect.left = rect.left.max(0.0);
        rect.top = rect.top.max(0.0);
        if rect.right() > 1.0 {
            rect.left = 1.0 - rect.width;
        }
        if rect.bottom() > 1.0 {
            rect.top = 1.0 - rect.height;
        }
        rect
    }

    /// Place the rect at a new top-left position, keeping its size and
    /// clamping so no edge leaves the frame.
    pub fn moved_to(&self, left: f32, top: f32) -> Self {
        Self {
            left: left.clamp(0.0, (1.0 - self.width).max(0.0)),
            top: top.clamp(0.0, (1.0 - self.height).max(0.0)),
            ..*self
        }
    }

    /// Force the rect through the geometry invariants.
    ///
    /// Used on data loaded from the store, where a corrupt save could carry
    /// out-of-range or non-finite values.
    pub fn clamped(&self) -> Self {
        let finite = |v: f32| if v.is_finite() { v } else { 0.0 };
        let width = finite(self.width).clamp(0.0, 1.0);
        let height = finite(self.height).clamp(0.0, 1.0);
        Self {
            left: finite(self.left).clamp(0.0, 1.0 - width),
            top: finite(self.top).clamp(0.0, 1.0 - height),
            width,
            height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-6;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn assert_rect(rect: NormRect, left: f32, top: f32, width: f32, height: f32) {
        assert!(
            approx_eq(rect.left, left)
                && approx_eq(rect.top, top)
                && approx_eq(rect.width, width)
                && approx_eq(rect.height, height),
            "expected ({left}, {top}, {width}, {height}), got {rect:?}"
        );
    }

    fn assert_invariants(rect: NormRect) {
        assert!(rect.left >= 0.0, "left out of range: {rect:?}");
        assert!(rect.top >= 0.0, "top out of range: {rect:?}");
        assert!(rect.width >= 0.0 && rect.height >= 0.0, "negative size: {rect:?}");
        assert!(rect.right() <= 1.0 + EPSILON, "right overflow: {rect:?}");
        assert!(rect.bottom() <= 1.0 + EPSILON, "bottom overflow: {rect:?}");
    }

    #[test]
    fn from_corners_any_direction() {
        let anchor = NormPoint::new(0.3, 0.3);

        // Down-left from the anchor.
        let rect = NormRect::from_corners(anchor, NormPoint::new(0.1, 0.6));
        assert_rect(rect, 0.1, 0.3, 0.2, 0.3);

        // Down-right.
        let rect = NormRect::from_corners(anchor, NormPoint::new(0.5, 0.6));
        assert_rect(rect, 0.3, 0.3, 0.2, 0.3);

        // Up-left.
        let rect = NormRect::from_corners(anchor, NormPoint::new(0.1, 0.1));
        assert_rect(rect, 0.1, 0.1, 0.2, 0.2);

        // Up-right.
        let rect = NormRect::from_corners(anchor, NormPoint::new(0.4, 0.2));
        assert_rect(rect, 0.3, 0.2, 0.1, 0.1);
    }

    #[test]
    fn from_corners_same_point_is_zero_size() {
        let p = NormPoint::new(0.4, 0.4);
        assert_rect(NormRect::from_corners(p, p), 0.4, 0.4, 0.0, 0.0);
    }

    #[test]
    fn resize_holds_opposite_corner_fixed() {
        let rect = NormRect::new(0.2, 0.2, 0.4, 0.4);
        for &corner in Corner::all() {
            let fixed_before = rect.corner(corner.opposite());
            let resized = rect.resize_corner(corner, NormPoint::new(0.5, 0.45));
            let fixed_after = resized.corner(corner.opposite());
            assert!(
                approx_eq(fixed_before.x, fixed_after.x)
                    && approx_eq(fixed_before.y, fixed_after.y),
                "{corner:?}: fixed corner moved from {fixed_before:?} to {fixed_after:?}"
            );
            assert_invariants(resized);
        }
    }

    #[test]
    fn resize_bottom_right_extends() {
        let rect = NormRect::new(0.2, 0.2, 0.3, 0.3);
        let resized = rect.resize_corner(Corner::BottomRight, NormPoint::new(0.8, 0.7));
        assert_rect(resized, 0.2, 0.2, 0.6, 0.5);
    }

    #[test]
    fn resize_crossing_fixed_corner_flips_without_negative_size() {
        let rect = NormRect::new(0.4, 0.4, 0.2, 0.2);
        // Drag the bottom-right corner above and left of the fixed top-left.
        let resized = rect.resize_corner(Corner::BottomRight, NormPoint::new(0.3, 0.2));
        assert_rect(resized, 0.3, 0.2, 0.1, 0.2);
        assert_invariants(resized);
    }

    #[test]
    fn resize_applies_minimum_size_floor() {
        let rect = NormRect::new(0.4, 0.4, 0.2, 0.2);
        // Collapse onto the fixed corner.
        let resized = rect.resize_corner(Corner::BottomRight, NormPoint::new(0.4, 0.4));
        assert!(resized.width >= MIN_BOX_SIZE);
        assert!(resized.height >= MIN_BOX_SIZE);
        assert_invariants(resized);
    }

    #[test]
    fn resize_overflow_slides_edge_inward() {
        // Fixed corner sits on the right edge; the floor would push the rect
        // past 1.0, so left must slide inward instead.
        let rect = NormRect::new(0.8, 0.2, 0.2, 0.2);
        let resized = rect.resize_corner(Corner::TopLeft, NormPoint::new(1.0, 0.1));
        assert!(approx_eq(resized.right(), 1.0));
        assert_invariants(resized);
    }

    #[test]
    fn moved_to_clamps_to_frame() {
        let rect = NormRect::new(0.1, 0.1, 0.3, 0.2);

        let moved = rect.moved_to(0.9, 0.95);
        assert_rect(moved, 0.7, 0.8, 0.3, 0.2);

        let moved = rect.moved_to(-0.5, -0.1);
        assert_rect(moved, 0.0, 0.0, 0.3, 0.2);

        let moved = rect.moved_to(0.25, 0.5);
        assert_rect(moved, 0.25, 0.5, 0.3, 0.2);
    }

    #[test]
    fn contains_includes_edges() {
        let rect = NormRect::new(0.1, 0.1, 0.5, 0.5);
        assert!(rect.contains(NormPoint::new(0.3, 0.3)));
        assert!(rect.contains(NormPoint::new(0.1, 0.1)));
        assert!(rect.contains(NormPoint::new(0.6, 0.6)));
        assert!(!rect.contains(NormPoint::new(0.05, 0.3)));
        assert!(!rect.contains(NormPoint::new(0.3, 0.7)));
    }

    #[test]
    fn clamped_repairs_corrupt_geometry() {
        let rect = NormRect::new(0.9, -0.2, 0.5, 1.5).clamped();
        assert_invariants(rect);
        assert_rect(rect, 0.5, 0.0, 0.5, 1.0);

        let rect = NormRect::new(f32::NAN, 0.2, f32::INFINITY, 0.1).clamped();
        assert_invariants(rect);
        assert_rect(rect, 0.0, 0.2, 0.0, 0.1);
    }
}
