//! Viewport-to-image coordinate mapping under "contain" letterbox fit.
//!
//! Extracted as pure math for testability. The fit is cheap and must be
//! recomputed from the live viewport and intrinsic image size on every
//! interaction; nothing here is cached, so a viewport resize only requires
//! the caller to rerun the mapping over the stored normalized geometry.

use crate::constants::ZERO_AXIS_DIVISOR;
use crate::model::{NormPoint, NormRect};

/// A position in viewport pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPoint {
    pub x: f32,
    pub y: f32,
}

impl PixelPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in viewport pixel space, for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// Size of the interactive viewport, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSize {
    pub width: f32,
    pub height: f32,
}

impl ViewportSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Aspect-preserving placement of an image inside a viewport.
///
/// The image is scaled to fit, centered, with letterbox bars on the axis
/// that has room to spare.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainFit {
    /// Displayed image width in pixels.
    pub disp_w: f32,
    /// Displayed image height in pixels.
    pub disp_h: f32,
    /// Horizontal letterbox offset.
    pub off_x: f32,
    /// Vertical letterbox offset.
    pub off_y: f32,
}

impl ContainFit {
    /// Compute the fit of an image with intrinsic size `(image_w, image_h)`
    /// inside `viewport`.
    pub fn compute(image_w: u32, image_h: u32, viewport: ViewportSize) -> Self {
        if image_w == 0 || image_h == 0 {
            return Self {
                disp_w: 0.0,
                disp_h: 0.0,
                off_x: viewport.width / 2.0,
                off_y: viewport.height / 2.0,
            };
        }

        let aspect = image_w as f32 / image_h as f32;
        let mut disp_w = viewport.width;
        let mut disp_h = disp_w / aspect;
        if disp_h > viewport.height {
            disp_h = viewport.height;
            disp_w = disp_h * aspect;
        }

        Self {
            disp_w,
            disp_h,
            off_x: (viewport.width - disp_w) / 2.0,
            off_y: (viewport.height - disp_h) / 2.0,
        }
    }

    /// Map a viewport pixel position to normalized image coordinates,
    /// clamped to `[0,1]`.
    ///
    /// A zero-sized display axis uses a divisor of 1 so the result is 0
    /// rather than NaN.
    pub fn to_normalized(&self, p: PixelPoint) -> NormPoint {
        let div_w = if self.disp_w > 0.0 {
            self.disp_w
        } else {
            ZERO_AXIS_DIVISOR
        };
        let div_h = if self.disp_h > 0.0 {
            self.disp_h
        } else {
            ZERO_AXIS_DIVISOR
        };
        NormPoint::new(
            ((p.x - self.off_x) / div_w).clamp(0.0, 1.0),
            ((p.y - self.off_y) / div_h).clamp(0.0, 1.0),
        )
    }

    /// Map a normalized image position back to viewport pixels.
    pub fn to_pixel(&self, p: NormPoint) -> PixelPoint {
        PixelPoint::new(self.off_x + p.x * self.disp_w, self.off_y + p.y * self.disp_h)
    }

    /// Map a normalized rect to a viewport pixel rect for rendering.
    pub fn rect_to_pixel(&self, rect: NormRect) -> PixelRect {
        let origin = self.to_pixel(NormPoint::new(rect.left, rect.top));
        PixelRect {
            left: origin.x,
            top: origin.y,
            width: rect.width * self.disp_w,
            height: rect.height * self.disp_h,
        }
    }

    /// Convert a pixel radius into per-axis normalized tolerances, for
    /// handle hit-testing at the current scale.
    pub fn pixel_tolerance(&self, radius: f32) -> (f32, f32) {
        let div_w = if self.disp_w > 0.0 {
            self.disp_w
        } else {
            ZERO_AXIS_DIVISOR
        };
        let div_h = if self.disp_h > 0.0 {
            self.disp_h
        } else {
            ZERO_AXIS_DIVISOR
        };
        (radius / div_w, radius / div_h)
    }
}
