//! Viewport settings.

use serde::{Deserialize, Serialize};

/// Default frame width in page pixels.
pub const DEFAULT_FRAME_WIDTH: u32 = 600;

/// Default frame height in page pixels.
pub const DEFAULT_FRAME_HEIGHT: u32 = 400;

/// Default lower zoom bound.
pub const DEFAULT_MIN_RATIO: f64 = 0.001;

/// Default upper zoom bound (100%).
pub const DEFAULT_MAX_RATIO: f64 = 1.0;

/// Zoom step of the coarse zoom controls.
pub const ZOOM_STEP: f64 = 0.10;

/// Zoom step of the fine zoom controls.
pub const FINE_ZOOM_STEP: f64 = 0.01;

/// Initial state of a [`ViewportController`](super::ViewportController).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewportConfig {
    /// Width of the fixed frame
    pub frame_width: u32,

    /// Height of the fixed frame
    pub frame_height: u32,

    /// Initial full-resolution content width; grows to fit attached layers
    pub content_width: u32,

    /// Initial full-resolution content height; grows to fit attached layers
    pub content_height: u32,

    /// Initial horizontal pan offset of the pane relative to the frame
    pub x: f64,

    /// Initial vertical pan offset of the pane relative to the frame
    pub y: f64,

    pub min_ratio: f64,
    pub max_ratio: f64,

    /// Initial zoom ratio
    pub ratio: f64,

    /// Whether the viewport starts out shown
    pub visible: bool,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            frame_width: DEFAULT_FRAME_WIDTH,
            frame_height: DEFAULT_FRAME_HEIGHT,
            content_width: DEFAULT_FRAME_WIDTH,
            content_height: DEFAULT_FRAME_HEIGHT,
            x: 0.0,
            y: 0.0,
            min_ratio: DEFAULT_MIN_RATIO,
            max_ratio: DEFAULT_MAX_RATIO,
            ratio: 1.0,
            visible: true,
        }
    }
}

impl ViewportConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.frame_width == 0 || self.frame_height == 0 {
            return Err("frame dimensions must be greater than 0".to_string());
        }
        if self.content_width == 0 || self.content_height == 0 {
            return Err("content dimensions must be greater than 0".to_string());
        }

        if !(self.min_ratio.is_finite() && self.min_ratio > 0.0) {
            return Err(format!(
                "min_ratio must be a positive number, got {}",
                self.min_ratio
            ));
        }
        if !self.max_ratio.is_finite() || self.max_ratio < self.min_ratio {
            return Err(format!(
                "max_ratio must be at least min_ratio ({}), got {}",
                self.min_ratio, self.max_ratio
            ));
        }
        if !(self.ratio >= self.min_ratio && self.ratio <= self.max_ratio) {
            return Err(format!(
                "ratio must be within [{}, {}], got {}",
                self.min_ratio, self.max_ratio, self.ratio
            ));
        }

        if !(self.x.is_finite() && self.y.is_finite()) {
            return Err("initial position must be finite".to_string());
        }

        Ok(())
    }

    /// Clamp `ratio` into `[min_ratio, max_ratio]`.
    pub fn clamp_ratio(&self, ratio: f64) -> f64 {
        ratio.clamp(self.min_ratio, self.max_ratio)
    }
}
