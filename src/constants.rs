//! Global constants for the annotation engine.

/// Minimum normalized width/height a box may reach during a corner resize.
/// Keeps the resize handles grabbable.
pub const MIN_BOX_SIZE: f32 = 0.001;

/// Hit radius around a corner handle, in viewport pixels.
pub const HANDLE_HIT_RADIUS: f32 = 8.0;

/// Divisor substituted for a zero-sized display axis so pointer mapping
/// yields coordinate 0 instead of NaN.
pub const ZERO_AXIS_DIVISOR: f32 = 1.0;
