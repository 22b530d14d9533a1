//! Render surface abstraction.
//!
//! The engine decides *which* tiles exist and *where* they go; a
//! [`RenderSurface`] is whatever actually draws them (a DOM pane, a GPU
//! texture atlas, a test recorder).

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use super::{TileId, TilePlacement};

/// Receiver of tile placement instructions.
pub trait RenderSurface {
    /// Draw a tile. Called once per tile materialization.
    fn place_tile(&mut self, tile: &TilePlacement);

    /// Remove a previously placed tile.
    fn remove_tile(&mut self, id: &TileId);

    /// The pane holding the tiles changed size.
    fn resize_pane(&mut self, _width: u32, _height: u32) {}

    /// The pane was shown or hidden.
    fn set_visible(&mut self, _visible: bool) {}
}

#[derive(Debug, Default)]
struct Recording {
    tiles: BTreeMap<TileId, TilePlacement>,
    placed: usize,
    removed: usize,
    pane_size: Option<(u32, u32)>,
    visible: bool,
}

/// Surface that records what it was asked to draw.
///
/// Clones share the same recording, so a handle kept outside a layer sees
/// everything the layer did.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    inner: Rc<RefCell<Recording>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tiles currently on the surface, ordered by id.
    pub fn tiles(&self) -> Vec<TilePlacement> {
        self.inner.borrow().tiles.values().cloned().collect()
    }

    pub fn tile_ids(&self) -> Vec<TileId> {
        self.inner.borrow().tiles.keys().cloned().collect()
    }

    pub fn tile(&self, id: &TileId) -> Option<TilePlacement> {
        self.inner.borrow().tiles.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total `place_tile` calls.
    pub fn placed_count(&self) -> usize {
        self.inner.borrow().placed
    }

    /// Total `remove_tile` calls.
    pub fn removed_count(&self) -> usize {
        self.inner.borrow().removed
    }

    pub fn pane_size(&self) -> Option<(u32, u32)> {
        self.inner.borrow().pane_size
    }

    pub fn is_visible(&self) -> bool {
        self.inner.borrow().visible
    }
}

impl RenderSurface for RecordingSurface {
    fn place_tile(&mut self, tile: &TilePlacement) {
        let mut rec = self.inner.borrow_mut();
        rec.placed += 1;
        rec.tiles.insert(tile.id.clone(), tile.clone());
    }

    fn remove_tile(&mut self, id: &TileId) {
        let mut rec = self.inner.borrow_mut();
        rec.removed += 1;
        rec.tiles.remove(id);
    }

    fn resize_pane(&mut self, width: u32, height: u32) {
        self.inner.borrow_mut().pane_size = Some((width, height));
    }

    fn set_visible(&mut self, visible: bool) {
        self.inner.borrow_mut().visible = visible;
    }
}
