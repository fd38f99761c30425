//! Shared numeric defaults for the engine.

// ── Viewport ────────────────────────────────────────────────────

/// Initial pixels per logical unit.
pub const LOGIC_WIDTH: f64 = 20.0;

/// Smallest allowed pixels per logical unit (fully zoomed out).
pub const LOGIC_WIDTH_MIN: f64 = 2.0;

/// Largest allowed pixels per logical unit (fully zoomed in).
pub const LOGIC_WIDTH_MAX: f64 = 200.0;

/// Grid magnification applied per zoom level.
pub const LEVEL_UP_FACTOR: f64 = 2.0;

/// Highest zoom level; levels run from 0 to this value.
pub const LEVEL_MAX: u32 = 8;

/// Grid spacing below which the zoom level steps up, in pixels.
pub const GRID_WIDTH_MIN: f64 = 8.0;

/// Grid spacing above which the zoom level steps down, in pixels.
pub const GRID_WIDTH_MAX: f64 = 32.0;

/// Exponential zoom rate per wheel pixel.
pub const ZOOM_SENSITIVITY: f64 = 0.0015;

// ── Gestures ────────────────────────────────────────────────────

/// Quiet time after the last wheel event before `zoom.end` fires.
pub const ZOOM_END_DELAY_MS: f64 = 250.0;

/// Pointer travel in pixels before a press becomes a drag.
pub const DRAG_THRESHOLD_PX: f64 = 3.0;

/// Width of the stage border band that triggers edge sliding, in pixels.
pub const EDGE_MARGIN_PX: f64 = 24.0;

/// Slide speed in pixels per frame for each pixel of margin depth.
pub const EDGE_SLIDE_SPEED: f64 = 0.5;

// ── Hit-testing ─────────────────────────────────────────────────

/// Point-arena match radius in logical units.
pub const POINT_TOLERANCE: f64 = 0.5;

// ── Stage ───────────────────────────────────────────────────────

/// Default stage width in CSS pixels.
pub const STAGE_WIDTH: f64 = 800.0;

/// Default stage height in CSS pixels.
pub const STAGE_HEIGHT: f64 = 600.0;
