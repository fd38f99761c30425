//! Engine configuration.
//!
//! Defaults come from [`crate::consts`]. [`EngineConfig::from_env`] overlays
//! `STAGE_*` environment variables, [`EngineConfig::from_json`] reads a JSON
//! document where every key is optional. Neither validates; callers run
//! [`EngineConfig::validate`] (the engine does so on construction).

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::consts::{
    DRAG_THRESHOLD_PX, EDGE_MARGIN_PX, EDGE_SLIDE_SPEED, GRID_WIDTH_MAX, GRID_WIDTH_MIN, LEVEL_MAX, LEVEL_UP_FACTOR,
    LOGIC_WIDTH, LOGIC_WIDTH_MAX, LOGIC_WIDTH_MIN, POINT_TOLERANCE, STAGE_HEIGHT, STAGE_WIDTH, ZOOM_END_DELAY_MS,
    ZOOM_SENSITIVITY,
};
use crate::geom::GeomError;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error(transparent)]
    Bound(#[from] GeomError),
    #[error("config json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Tunables for the viewport, gesture recognition and hit-testing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Initial pixels per logical unit.
    pub logic_width: f64,
    pub logic_width_min: f64,
    pub logic_width_max: f64,
    /// Grid magnification per zoom level.
    pub level_up_factor: f64,
    pub level_max: u32,
    pub grid_width_min: f64,
    pub grid_width_max: f64,
    /// Exponential zoom rate per wheel pixel.
    pub zoom_sensitivity: f64,
    pub zoom_end_delay_ms: f64,
    /// Point-arena match radius in logical units.
    pub point_tolerance: f64,
    pub drag_threshold_px: f64,
    pub edge_margin_px: f64,
    pub edge_slide_speed: f64,
    pub stage_width: f64,
    pub stage_height: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            logic_width: LOGIC_WIDTH,
            logic_width_min: LOGIC_WIDTH_MIN,
            logic_width_max: LOGIC_WIDTH_MAX,
            level_up_factor: LEVEL_UP_FACTOR,
            level_max: LEVEL_MAX,
            grid_width_min: GRID_WIDTH_MIN,
            grid_width_max: GRID_WIDTH_MAX,
            zoom_sensitivity: ZOOM_SENSITIVITY,
            zoom_end_delay_ms: ZOOM_END_DELAY_MS,
            point_tolerance: POINT_TOLERANCE,
            drag_threshold_px: DRAG_THRESHOLD_PX,
            edge_margin_px: EDGE_MARGIN_PX,
            edge_slide_speed: EDGE_SLIDE_SPEED,
            stage_width: STAGE_WIDTH,
            stage_height: STAGE_HEIGHT,
        }
    }
}

impl EngineConfig {
    /// Defaults overlaid with `STAGE_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            logic_width: env_parse("STAGE_LOGIC_WIDTH", d.logic_width),
            logic_width_min: env_parse("STAGE_LOGIC_WIDTH_MIN", d.logic_width_min),
            logic_width_max: env_parse("STAGE_LOGIC_WIDTH_MAX", d.logic_width_max),
            level_up_factor: env_parse("STAGE_LEVEL_UP_FACTOR", d.level_up_factor),
            level_max: env_parse("STAGE_LEVEL_MAX", d.level_max),
            grid_width_min: env_parse("STAGE_GRID_WIDTH_MIN", d.grid_width_min),
            grid_width_max: env_parse("STAGE_GRID_WIDTH_MAX", d.grid_width_max),
            zoom_sensitivity: env_parse("STAGE_ZOOM_SENSITIVITY", d.zoom_sensitivity),
            zoom_end_delay_ms: env_parse("STAGE_ZOOM_END_DELAY_MS", d.zoom_end_delay_ms),
            point_tolerance: env_parse("STAGE_POINT_TOLERANCE", d.point_tolerance),
            drag_threshold_px: env_parse("STAGE_DRAG_THRESHOLD_PX", d.drag_threshold_px),
            edge_margin_px: env_parse("STAGE_EDGE_MARGIN_PX", d.edge_margin_px),
            edge_slide_speed: env_parse("STAGE_EDGE_SLIDE_SPEED", d.edge_slide_speed),
            stage_width: env_parse("STAGE_WIDTH", d.stage_width),
            stage_height: env_parse("STAGE_HEIGHT", d.stage_height),
        }
    }

    /// Parse a JSON object; absent keys keep their defaults.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Json`] when the document is malformed or a value has the wrong type.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check every bound the engine relies on.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            ("logic_width", self.logic_width),
            ("logic_width_min", self.logic_width_min),
            ("logic_width_max", self.logic_width_max),
            ("level_up_factor", self.level_up_factor),
            ("grid_width_min", self.grid_width_min),
            ("grid_width_max", self.grid_width_max),
            ("zoom_sensitivity", self.zoom_sensitivity),
            ("zoom_end_delay_ms", self.zoom_end_delay_ms),
            ("point_tolerance", self.point_tolerance),
            ("drag_threshold_px", self.drag_threshold_px),
            ("edge_margin_px", self.edge_margin_px),
            ("edge_slide_speed", self.edge_slide_speed),
            ("stage_width", self.stage_width),
            ("stage_height", self.stage_height),
        ];
        for (field, v) in finite {
            if !v.is_finite() || v < 0.0 {
                return Err(invalid(field, format!("{v} is not a finite non-negative number")));
            }
        }
        if self.logic_width_min <= 0.0 {
            return Err(invalid("logic_width_min", "must be positive".into()));
        }
        if self.logic_width_min > self.logic_width_max {
            return Err(invalid("logic_width_max", format!("below logic_width_min {}", self.logic_width_min)));
        }
        if !(self.logic_width_min..=self.logic_width_max).contains(&self.logic_width) {
            return Err(invalid(
                "logic_width",
                format!("outside [{}, {}]", self.logic_width_min, self.logic_width_max),
            ));
        }
        if self.level_up_factor <= 1.0 {
            return Err(invalid("level_up_factor", "must be greater than 1".into()));
        }
        if self.grid_width_min <= 0.0 {
            return Err(invalid("grid_width_min", "must be positive".into()));
        }
        if self.grid_width_max < self.grid_width_min * self.level_up_factor {
            return Err(invalid(
                "grid_width_max",
                format!("must be at least grid_width_min * level_up_factor ({})", self.grid_width_min * self.level_up_factor),
            ));
        }
        if self.zoom_sensitivity <= 0.0 {
            return Err(invalid("zoom_sensitivity", "must be positive".into()));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    error!(field, %reason, "config: invalid value");
    ConfigError::Invalid { field, reason }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key) {
        Ok(raw) => raw.parse::<T>().unwrap_or_else(|_| {
            warn!(key, %raw, "config: unparsable value, using default");
            default
        }),
        Err(_) => default,
    }
}
