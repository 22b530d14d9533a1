//! # zoompane
//!
//! Tile visibility and lifecycle engine for viewing very large images
//! (manuscript scans, maps, slides) that are stored as pre-rendered tile
//! pyramids.
//!
//! Only the tiles that intersect the viewport, plus a one-tile ring around
//! it, are materialized. As the user pans and zooms, the engine selects the
//! closest stored zoom level, scales it to the requested ratio, and adds or
//! removes tiles so that the live set always matches what is visible.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           ViewportController            │
//! │   zoom, pan bounds, content bounds      │
//! └────────────────────┬────────────────────┘
//!                      │ reset / paint
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │              RenderLayer                │
//! │  calc_visible ──► TileSet::reconcile    │──► RenderSurface
//! └────────────────────┬────────────────────┘
//!                      │ level, tile size, URLs
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │             PyramidSource               │
//! │   UrlScheme + DescriptorFetcher         │
//! └─────────────────────────────────────────┘
//! ```
//!
//! The library is organized into several modules:
//!
//! - [`io`] - Descriptor transport over HTTP or the local filesystem
//! - [`mod@format`] - Pyramid descriptor parsing and validation
//! - [`source`] - Pyramid sources, level selection and URL schemes
//! - [`tile`] - Tile ids, geometry, visibility and the live tile set
//! - [`layer`] - Render layers binding a source to a surface
//! - [`viewport`] - Zoom/pan controller over a stack of layers
//! - [`events`] - Typed observer registration
//! - [`config`] - CLI configuration for the `zoompane` binary
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use zoompane::{
//!     PathTemplateScheme, PyramidSource, RecordingSurface, RenderLayer, RoutingFetcher,
//!     ViewportConfig, ViewportController,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let scheme = PathTemplateScheme::new("https://tiles.example.com/folio-12r").unwrap();
//!     let source = PyramidSource::new("folio-12r", Box::new(scheme), Arc::new(RoutingFetcher::new()));
//!
//!     let surface = RecordingSurface::new();
//!     let layer = RenderLayer::new("scan", source, Box::new(surface.clone()));
//!
//!     let mut viewport = ViewportController::new(ViewportConfig::default()).unwrap();
//!     viewport.add_layer(layer).await;
//!     viewport.set_ratio(0.25);
//!     viewport.pan_by(-120.0, -80.0);
//!
//!     for tile in surface.tiles() {
//!         println!("{} {}", tile.id, tile.url);
//!     }
//! }
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod format;
pub mod io;
pub mod layer;
pub mod region;
pub mod source;
pub mod tile;
pub mod viewport;

// Re-export commonly used types
pub use config::{Cli, Command, InspectConfig, OutputFormat, PlanConfig, SourceArgs};
pub use error::{
    DescriptorError, ExtensionError, LayerError, SourceError, TransportError, ViewportError,
};
pub use events::{Event, EventBus, SubscriptionId};
pub use format::{validate_descriptor, Descriptor, LevelDescriptor, Thumbnail, ValidationResult};
pub use io::{DescriptorFetcher, FileFetcher, HttpFetcher, RoutingFetcher};
pub use layer::{LayerEvent, LayerState, RenderLayer};
pub use region::{Region, RegionProvider, RegionSnapshot};
pub use source::{
    find_closest_level, ActiveLevel, PathTemplateScheme, PyramidLevel, PyramidSource,
    QueryApiScheme, SourceEvent, UrlScheme,
};
pub use tile::{
    calc_visible, GridMetrics, Reconciliation, RecordingSurface, RenderSurface, Span, TileId,
    TileLayout, TilePlacement, TileSet, VisibleRange,
};
pub use viewport::{
    LayerId, PanBounds, ViewportConfig, ViewportController, ViewportEvent, ViewportState,
};
