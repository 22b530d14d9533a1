//! Render layer: one pyramid source painted onto one surface.
//!
//! ```text
//!   Unconfigured --configure()--> AwaitingSource --source ready--> Ready
//!                                       |
//!                                       +--source failed--> ConfigFailed
//! ```
//!
//! Painting is only possible in `Ready`. Each paint computes the visible
//! range, grows it by one tile in every direction and reconciles the live
//! tile set against it.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::error::LayerError;
use crate::events::{Event, EventBus, SubscriptionId};
use crate::region::RegionProvider;
use crate::source::PyramidSource;
use crate::tile::{
    calc_visible, grid_ids, GridMetrics, Reconciliation, RenderSurface, TileId, TilePlacement,
    TileSet, VisibleRange,
};

/// Lifecycle of a [`RenderLayer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerState {
    Unconfigured,
    AwaitingSource,
    Ready,
    ConfigFailed,
}

/// Notifications raised by a [`RenderLayer`].
#[derive(Debug, Clone, PartialEq)]
pub enum LayerEvent {
    /// The source finished loading. Fires once.
    Ready,

    /// The source could not be loaded.
    ConfigFailed { message: String },

    /// Full-resolution extent changed.
    SizeChanged { width: u32, height: u32 },

    /// Tiles were materialized or destroyed.
    TileSetChanged {
        added: Vec<TileId>,
        removed: Vec<TileId>,
    },

    Shown,
    Hidden,

    /// The layer was torn down. Fires once.
    Destroyed,
}

impl Event for LayerEvent {
    fn fires_once(&self) -> bool {
        matches!(self, LayerEvent::Ready | LayerEvent::Destroyed)
    }
}

/// A pyramid source bound to a render surface.
pub struct RenderLayer {
    name: String,
    source: PyramidSource,
    surface: Box<dyn RenderSurface>,
    tiles: TileSet,
    state: LayerState,
    visible_range: VisibleRange,

    /// Last reported full-resolution extent
    extent: Option<(u32, u32)>,

    /// Pane size at the current ratio
    pane_size: (u32, u32),

    visible: bool,
    events: EventBus<LayerEvent>,
}

impl RenderLayer {
    pub fn new(
        name: impl Into<String>,
        source: PyramidSource,
        surface: Box<dyn RenderSurface>,
    ) -> Self {
        Self {
            name: name.into(),
            source,
            surface,
            tiles: TileSet::new(),
            state: LayerState::Unconfigured,
            visible_range: VisibleRange::UNSET,
            extent: None,
            pane_size: (0, 0),
            visible: false,
            events: EventBus::new("layer"),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> LayerState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == LayerState::Ready
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn source(&self) -> &PyramidSource {
        &self.source
    }

    pub fn tiles(&self) -> &TileSet {
        &self.tiles
    }

    pub fn visible_range(&self) -> VisibleRange {
        self.visible_range
    }

    /// Full-resolution extent, once the source is ready.
    pub fn extent(&self) -> Option<(u32, u32)> {
        self.extent
    }

    pub fn pane_size(&self) -> (u32, u32) {
        self.pane_size
    }

    /// Register an observer for [`LayerEvent`]s.
    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&LayerEvent) + 'static,
    {
        self.events.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    fn not_ready(&self) -> LayerError {
        LayerError::NotReady {
            layer: self.name.clone(),
            state: self.state,
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Load the source and become ready.
    ///
    /// Returns the resulting state. Ready and failed layers return
    /// immediately.
    pub async fn configure(&mut self) -> LayerState {
        match self.state {
            LayerState::Ready | LayerState::ConfigFailed => return self.state,
            LayerState::Unconfigured | LayerState::AwaitingSource => {}
        }

        self.state = LayerState::AwaitingSource;
        debug!(layer = %self.name, source = %self.source.id(), "Awaiting source");

        match self.source.configure().await {
            Ok(()) => self.on_source_ready(),
            Err(err) => {
                warn!(layer = %self.name, "Layer configuration failed: {}", err);
                self.state = LayerState::ConfigFailed;
                self.events.emit(LayerEvent::ConfigFailed {
                    message: err.to_string(),
                });
            }
        }
        self.state
    }

    fn on_source_ready(&mut self) {
        self.state = LayerState::Ready;
        info!(layer = %self.name, source = %self.source, "Layer ready");
        self.events.emit(LayerEvent::Ready);
        self.check_extent();
    }

    /// Re-read the source's full-resolution extent.
    ///
    /// Emits [`LayerEvent::SizeChanged`] and returns the new extent if it
    /// differs from the last one reported.
    pub fn check_extent(&mut self) -> Option<(u32, u32)> {
        let width = self.source.abs_width().ok()?;
        let height = self.source.abs_height().ok()?;

        if self.extent == Some((width, height)) {
            return None;
        }
        self.extent = Some((width, height));
        self.events.emit(LayerEvent::SizeChanged { width, height });
        Some((width, height))
    }

    /// Ratio at which the whole image fits a `frame_width` x `frame_height`
    /// frame, or `None` before the source is ready.
    ///
    /// Landscape images are fitted to the frame width unless that would
    /// overflow the height; portrait images the other way around.
    pub fn fit_ratio(&self, frame_width: f64, frame_height: f64) -> Option<f64> {
        let (width, height) = self.extent?;
        let (width, height) = (width as f64, height as f64);

        let by_width = frame_width / width;
        let by_height = frame_height / height;

        let ratio = if width > height {
            if height * by_width > frame_height {
                by_height
            } else {
                by_width
            }
        } else if width * by_height > frame_width {
            by_width
        } else {
            by_height
        };
        Some(ratio)
    }

    // =========================================================================
    // Painting
    // =========================================================================

    /// Bring the live tile set in line with what `regions` makes visible.
    ///
    /// Returns `None` if nothing was done: the layer is not ready or hidden,
    /// the regions cannot be measured, or the visible range did not move and
    /// `force` is unset.
    pub fn paint(&mut self, regions: &dyn RegionProvider, force: bool) -> Option<Reconciliation> {
        if !self.is_ready() {
            warn!(layer = %self.name, state = ?self.state, "Cannot paint layer before it is ready");
            return None;
        }
        if !self.visible {
            debug!(layer = %self.name, "Skipping paint of hidden layer");
            return None;
        }

        let grid = self.grid_metrics().ok()?;
        let range = calc_visible(
            regions.viewport_region(),
            regions.pane_region(),
            &grid,
            &self.visible_range,
            force,
        );
        self.visible_range = range;

        if !range.changed {
            return None;
        }

        let level = self.source.level().ok()?;
        let (rows, cols) = range.buffered(grid.num_rows, grid.num_cols);
        let target: HashSet<TileId> = grid_ids(self.source.id(), level, rows, cols);

        let result = match self
            .tiles
            .reconcile(&target, &self.source, self.surface.as_mut())
        {
            Ok(result) => result,
            Err(err) => {
                warn!(layer = %self.name, "Paint failed: {}", err);
                return None;
            }
        };

        for (id, err) in &result.failed {
            warn!(layer = %self.name, tile = %id, "Skipping tile: {}", err);
        }

        debug!(
            layer = %self.name,
            rows = ?(rows.start, rows.end),
            cols = ?(cols.start, cols.end),
            added = result.added.len(),
            removed = result.removed.len(),
            "Painted"
        );

        if !result.is_unchanged() {
            self.events.emit(LayerEvent::TileSetChanged {
                added: result.added.clone(),
                removed: result.removed.clone(),
            });
        }

        Some(result)
    }

    fn grid_metrics(&self) -> Result<GridMetrics, LayerError> {
        Ok(GridMetrics {
            tile_width: self.source.tile_width()?,
            tile_height: self.source.tile_height()?,
            num_rows: self.source.num_rows()?,
            num_cols: self.source.num_cols()?,
        })
    }

    /// Switch the source to `ratio` and drop every tile.
    ///
    /// The pane is resized to the image size at the new ratio and the
    /// visible range is forgotten, so the next paint starts from scratch.
    pub fn reset(&mut self, ratio: f64) -> Result<(), LayerError> {
        if !self.is_ready() {
            return Err(self.not_ready());
        }

        self.source.set_ratio(ratio)?;
        self.pane_size = (self.source.width()?, self.source.height()?);
        self.surface.resize_pane(self.pane_size.0, self.pane_size.1);
        self.visible_range.invalidate();

        let removed = self.tiles.clear(self.surface.as_mut());
        if !removed.is_empty() {
            self.events.emit(LayerEvent::TileSetChanged {
                added: Vec::new(),
                removed,
            });
        }

        debug!(
            layer = %self.name,
            ratio,
            level = self.source.level()?,
            pane_width = self.pane_size.0,
            pane_height = self.pane_size.1,
            "Layer reset"
        );
        Ok(())
    }

    /// Reset to `ratio` and paint. No-op if already visible or not ready.
    pub fn show(&mut self, ratio: f64, regions: &dyn RegionProvider, silent: bool) {
        if self.visible {
            return;
        }
        if let Err(err) = self.reset(ratio) {
            debug!(layer = %self.name, "Not showing layer: {}", err);
            return;
        }

        self.visible = true;
        self.surface.set_visible(true);
        self.paint(regions, false);

        if !silent {
            self.events.emit(LayerEvent::Shown);
        }
    }

    /// Hide the pane and drop every tile. No-op if already hidden.
    pub fn hide(&mut self, ratio: f64, silent: bool) {
        if !self.visible {
            return;
        }

        self.visible = false;
        self.surface.set_visible(false);
        if let Err(err) = self.reset(ratio) {
            debug!(layer = %self.name, "Hiding layer without reset: {}", err);
        }

        if !silent {
            self.events.emit(LayerEvent::Hidden);
        }
    }

    /// Tear down: hide, drop every tile and notify observers one last time.
    pub fn destroy(mut self) {
        self.visible = false;
        self.surface.set_visible(false);
        let removed = self.tiles.clear(self.surface.as_mut());
        debug!(layer = %self.name, removed = removed.len(), "Layer destroyed");

        self.events.emit(LayerEvent::Destroyed);
        self.events.unsubscribe_all();
    }

    /// Live placements, ordered by id.
    pub fn placements(&self) -> Vec<&TilePlacement> {
        self.tiles.placements()
    }
}

impl std::fmt::Debug for RenderLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderLayer")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("source", &self.source)
            .field("tiles", &self.tiles.len())
            .field("visible", &self.visible)
            .finish()
    }
}
