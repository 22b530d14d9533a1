//! Viewport: zoom and pan over a stack of render layers.
//!
//! - [`ViewportConfig`]: initial frame, content, zoom bounds
//! - [`PanBounds`]: legal pane positions for the current zoom
//! - [`ViewportController`]: owns the layers and drives their resets and paints

mod bounds;
mod config;
mod controller;

pub use bounds::PanBounds;
pub use config::{
    ViewportConfig, DEFAULT_FRAME_HEIGHT, DEFAULT_FRAME_WIDTH, DEFAULT_MAX_RATIO,
    DEFAULT_MIN_RATIO, FINE_ZOOM_STEP, ZOOM_STEP,
};
pub use controller::{AbsolutePoint, LayerId, ViewportController, ViewportEvent, ViewportState};
