//! Render layers.
//!
//! A [`RenderLayer`] binds one [`PyramidSource`](crate::source::PyramidSource)
//! to one [`RenderSurface`](crate::tile::RenderSurface) and keeps the
//! surface's tiles in step with what the viewport shows.

mod render_layer;

pub use render_layer::{LayerEvent, LayerState, RenderLayer};
