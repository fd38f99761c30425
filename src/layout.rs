//! Viewport transform between logical units and stage pixels.
//!
//! `logic_width` is the number of pixels one logical unit spans and
//! `origin_bias` is the pan offset in logical units:
//!
//! ```text
//! crd2pos(p) = (p + origin_bias) * logic_width
//! pos2crd(p) = p / logic_width - origin_bias
//! ```
//!
//! Every scale change goes through one transaction: resolve the logical point
//! under the anchor, change `logic_width`, re-solve `origin_bias` so the anchor
//! maps to the same logical point, then re-level the grid. The zoom level
//! moves one step each time the grid spacing leaves
//! `[grid_width_min, grid_width_max]`; because that band spans at least one
//! `level_up_factor`, a single step always lands back inside it.

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{ConfigError, EngineConfig};
use crate::geom::{Bound, Point, Rect, Size, Vector};

/// Scale, pan and level: what a memory saves and restores on switch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub logic_width: f64,
    pub origin_bias: Vector,
    pub zoom_level: u32,
}

#[derive(Debug, Clone)]
pub struct Layout {
    logic_width: f64,
    width_bound: Bound,
    origin_bias: Vector,
    zoom_level: u32,
    level_max: u32,
    level_up_factor: f64,
    grid_bound: Bound,
    sensitivity: f64,
    stage: Size,
    /// Pixels per frame while edge sliding.
    slide: Option<Vector>,
}

impl Layout {
    /// # Errors
    ///
    /// Any [`ConfigError`] from [`EngineConfig::validate`], or
    /// [`ConfigError::Bound`] if a limit pair is inverted.
    pub fn new(config: &EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut layout = Self {
            logic_width: config.logic_width,
            width_bound: Bound::new(config.logic_width_min, config.logic_width_max)?,
            origin_bias: Vector::ZERO,
            zoom_level: 0,
            level_max: config.level_max,
            level_up_factor: config.level_up_factor,
            grid_bound: Bound::new(config.grid_width_min, config.grid_width_max)?,
            sensitivity: config.zoom_sensitivity,
            stage: Size::new(config.stage_width, config.stage_height),
            slide: None,
        };
        layout.relevel();
        Ok(layout)
    }

    // --- Coordinate conversion ---

    /// Logical point → stage pixels.
    #[must_use]
    pub fn crd2pos(&self, p: Point) -> Point {
        (p + self.origin_bias) * self.logic_width
    }

    /// Stage pixels → logical point.
    #[must_use]
    pub fn pos2crd(&self, p: Point) -> Point {
        p / self.logic_width - self.origin_bias
    }

    #[must_use]
    pub fn px_to_logic(&self, px: f64) -> f64 {
        px / self.logic_width
    }

    #[must_use]
    pub fn logic_to_px(&self, units: f64) -> f64 {
        units * self.logic_width
    }

    // --- State ---

    #[must_use]
    pub fn logic_width(&self) -> f64 {
        self.logic_width
    }

    #[must_use]
    pub fn origin_bias(&self) -> Vector {
        self.origin_bias
    }

    #[must_use]
    pub fn zoom_level(&self) -> u32 {
        self.zoom_level
    }

    /// Grid spacing in pixels: `logic_width * level_up_factor ^ zoom_level`.
    #[must_use]
    pub fn grid_width(&self) -> f64 {
        self.logic_width * self.level_scale()
    }

    /// Grid spacing in logical units.
    #[must_use]
    pub fn grid_step(&self) -> f64 {
        self.level_scale()
    }

    #[must_use]
    pub fn stage_size(&self) -> Size {
        self.stage
    }

    pub fn set_stage_size(&mut self, size: Size) {
        self.stage = size;
    }

    /// The logical region currently on the stage.
    #[must_use]
    pub fn visible_rect(&self) -> Rect {
        let far = Point::new(self.stage.width, self.stage.height);
        Rect::from_points(self.pos2crd(Point::ORIGIN), self.pos2crd(far))
    }

    // --- Pan / zoom ---

    /// Shift the view by `px` stage pixels.
    pub fn pan_by(&mut self, px: Vector) {
        self.origin_bias += px / self.logic_width;
    }

    /// Wheel zoom around `anchor` (stage pixels). Positive `delta` zooms out.
    ///
    /// Returns `false` and leaves the view untouched when the resulting scale
    /// would leave `[logic_width_min, logic_width_max]`.
    pub fn zoom(&mut self, delta: f64, anchor: Point) -> bool {
        let next = self.logic_width * (-delta * self.sensitivity).exp();
        if !next.is_finite() || !self.width_bound.contains(next) {
            debug!(
                logic_width = self.logic_width,
                next,
                min = self.width_bound.min(),
                max = self.width_bound.max(),
                "layout: zoom out of bounds, ignored"
            );
            return false;
        }
        self.apply_scale(next, anchor);
        true
    }

    /// Set the scale directly around `anchor`, clamped to the width bound.
    /// Returns whether the scale changed.
    pub fn zoom_to(&mut self, logic_width: f64, anchor: Point) -> bool {
        if !logic_width.is_finite() || logic_width <= 0.0 {
            warn!(logic_width, "layout: zoom_to rejected non-positive scale");
            return false;
        }
        let next = self.width_bound.clamp(logic_width);
        if (next - self.logic_width).abs() < f64::EPSILON {
            return false;
        }
        self.apply_scale(next, anchor);
        true
    }

    /// Scale and centre so `rect` (logical) fits the stage with `padding_px` on every side.
    pub fn fit(&mut self, rect: Rect, padding_px: f64) -> bool {
        let avail_w = self.stage.width - padding_px * 2.0;
        let avail_h = self.stage.height - padding_px * 2.0;
        if avail_w <= 0.0 || avail_h <= 0.0 {
            warn!(stage_w = self.stage.width, stage_h = self.stage.height, padding_px, "layout: no room to fit");
            return false;
        }
        if rect.width() <= 0.0 && rect.height() <= 0.0 {
            self.center_on(rect.center());
            return true;
        }
        let sx = avail_w / rect.width().max(f64::MIN_POSITIVE);
        let sy = avail_h / rect.height().max(f64::MIN_POSITIVE);
        self.logic_width = self.width_bound.clamp(sx.min(sy));
        self.center_on(rect.center());
        self.relevel();
        true
    }

    /// Pan so logical point `c` sits at the stage centre.
    pub fn center_on(&mut self, c: Point) {
        let mid = Point::new(self.stage.width / 2.0, self.stage.height / 2.0);
        self.origin_bias = mid.to_vector() / self.logic_width - c.to_vector();
    }

    /// Round a logical point to the nearest grid intersection.
    #[must_use]
    pub fn snap(&self, p: Point) -> Point {
        let step = self.grid_step();
        Point::new((p.x / step).round() * step, (p.y / step).round() * step)
    }

    // --- Memory support ---

    #[must_use]
    pub fn save_view(&self) -> ViewState {
        ViewState { logic_width: self.logic_width, origin_bias: self.origin_bias, zoom_level: self.zoom_level }
    }

    /// Restore a saved view. The scale is clamped into the current bound and
    /// the level is re-derived rather than trusted.
    pub fn restore_view(&mut self, view: ViewState) {
        self.logic_width = self.width_bound.clamp(view.logic_width);
        self.origin_bias = view.origin_bias;
        self.zoom_level = view.zoom_level.min(self.level_max);
        self.relevel();
    }

    // --- Sliding ---

    /// Begin a per-frame pan of `px_per_frame`. Replaces any running slide.
    pub fn start_slide(&mut self, px_per_frame: Vector) {
        if px_per_frame.is_zero() {
            self.slide = None;
            return;
        }
        self.slide = Some(px_per_frame);
    }

    pub fn stop_slide(&mut self) {
        self.slide = None;
    }

    #[must_use]
    pub fn is_sliding(&self) -> bool {
        self.slide.is_some()
    }

    /// Advance the slide by one frame. Returns the applied pixel delta.
    pub fn step_slide(&mut self) -> Option<Vector> {
        let v = self.slide?;
        self.pan_by(v);
        Some(v)
    }

    // --- Internals ---

    fn apply_scale(&mut self, next: f64, anchor: Point) {
        let focus = self.pos2crd(anchor);
        self.logic_width = next;
        self.origin_bias = anchor.to_vector() / next - focus.to_vector();
        self.relevel();
    }

    fn level_scale(&self) -> f64 {
        self.level_up_factor.powi(i32::try_from(self.zoom_level).unwrap_or(i32::MAX))
    }

    fn relevel(&mut self) {
        let before = self.zoom_level;
        loop {
            let grid = self.grid_width();
            if grid < self.grid_bound.min() && self.zoom_level < self.level_max {
                self.zoom_level += 1;
            } else if grid > self.grid_bound.max() && self.zoom_level > 0 {
                self.zoom_level -= 1;
            } else {
                break;
            }
        }
        if before != self.zoom_level {
            debug!(from = before, to = self.zoom_level, grid = self.grid_width(), "layout: zoom level changed");
        }
    }
}
