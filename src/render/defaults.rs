//! Default point settings (all in user units / pixels)

/// Base point radius
pub const POINT_R: f64 = 2.5;
/// Focus expansion as a multiple of the point radius
pub const FOCUS_EXPAND_RATIO: f64 = 1.75;
/// Focus expansion in bubble charts, where points are already large
pub const BUBBLE_FOCUS_EXPAND_RATIO: f64 = 1.15;
/// Selected point radius as a multiple of the point radius
pub const SELECT_RATIO: f64 = 4.0;
/// Pointer distance that still counts as hovering a point
pub const SENSITIVITY: f64 = 10.0;
/// Largest bubble radius when none is configured
pub const BUBBLE_MAX_R: f64 = 35.0;
