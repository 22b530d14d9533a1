//! Tile addressing, visibility and lifecycle.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          Viewport / RenderLayer         │
//! └────────────────────┬────────────────────┘
//!                      │ regions, force
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │   calc_visible  ──►  VisibleRange       │
//! │                        │ + 1 tile ring  │
//! │                        ▼                │
//! │   TileSet::reconcile(target ids)        │
//! │     remove stale ──► RenderSurface      │
//! │     place new    ──► RenderSurface      │
//! └────────────────────┬────────────────────┘
//!                      │ layout, URLs
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │              PyramidSource              │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`TileId`]: identity of one tile (source, level, row, col)
//! - [`TileLayout`]: rounded tile grid of the active level, with edge trimming
//! - [`calc_visible`]: rows and columns intersecting the viewport
//! - [`TileSet`]: live tiles and the add/remove reconciliation
//! - [`RenderSurface`]: where tiles are drawn; [`RecordingSurface`] records it

mod geometry;
mod id;
mod set;
mod surface;
mod visibility;

pub use geometry::{TileLayout, TilePlacement};
pub use id::TileId;
pub use set::{grid_ids, Reconciliation, TileSet};
pub use surface::{RecordingSurface, RenderSurface};
pub use visibility::{calc_visible, GridMetrics, Span, VisibleRange};
