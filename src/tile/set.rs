//! Live tile bookkeeping.
//!
//! A [`TileSet`] tracks which tiles are currently materialized on a surface.
//! Each paint hands it a target set of ids; [`TileSet::reconcile`] removes
//! every live tile not in the target and materializes every target tile not
//! yet live, so that afterwards `live == target` (minus tiles that could not
//! be placed).

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::SourceError;
use crate::source::PyramidSource;

use super::geometry::{TileLayout, TilePlacement};
use super::surface::RenderSurface;
use super::visibility::Span;
use super::TileId;

/// Outcome of one reconciliation.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    /// Tiles materialized, ordered by id
    pub added: Vec<TileId>,

    /// Tiles destroyed, ordered by id
    pub removed: Vec<TileId>,

    /// Target tiles that could not be materialized
    pub failed: Vec<(TileId, SourceError)>,
}

impl Reconciliation {
    /// Whether the live set did not change.
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Tiles currently materialized for one source.
#[derive(Debug, Default)]
pub struct TileSet {
    live: HashMap<TileId, TilePlacement>,
}

impl TileSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn contains(&self, id: &TileId) -> bool {
        self.live.contains_key(id)
    }

    pub fn get(&self, id: &TileId) -> Option<&TilePlacement> {
        self.live.get(id)
    }

    /// Live placements, ordered by id.
    pub fn placements(&self) -> Vec<&TilePlacement> {
        let mut tiles: Vec<&TilePlacement> = self.live.values().collect();
        tiles.sort_by(|a, b| a.id.cmp(&b.id));
        tiles
    }

    /// Make the live set equal to `target`.
    ///
    /// Fails as a whole only if `source` is not ready. A target tile outside
    /// the active level's grid, or belonging to another level, is reported in
    /// [`Reconciliation::failed`] and the rest of the set is still processed.
    pub fn reconcile(
        &mut self,
        target: &HashSet<TileId>,
        source: &PyramidSource,
        surface: &mut dyn RenderSurface,
    ) -> Result<Reconciliation, SourceError> {
        let layout = TileLayout::from_source(source)?;
        let mut result = Reconciliation::default();

        let mut stale: Vec<TileId> = self
            .live
            .keys()
            .filter(|id| !target.contains(*id))
            .cloned()
            .collect();
        stale.sort();
        for id in stale {
            self.live.remove(&id);
            surface.remove_tile(&id);
            result.removed.push(id);
        }

        let mut pending: Vec<&TileId> = target
            .iter()
            .filter(|id| !self.live.contains_key(*id))
            .collect();
        pending.sort();
        for id in pending {
            match materialize(id, &layout, source) {
                Ok(placement) => {
                    surface.place_tile(&placement);
                    self.live.insert(id.clone(), placement);
                    result.added.push(id.clone());
                }
                Err(err) => result.failed.push((id.clone(), err)),
            }
        }

        Ok(result)
    }

    /// Destroy every live tile. Returns the removed ids, ordered.
    pub fn clear(&mut self, surface: &mut dyn RenderSurface) -> Vec<TileId> {
        let mut removed: Vec<TileId> = self.live.drain().map(|(id, _)| id).collect();
        removed.sort();
        for id in &removed {
            surface.remove_tile(id);
        }
        removed
    }
}

fn materialize(
    id: &TileId,
    layout: &TileLayout,
    source: &PyramidSource,
) -> Result<TilePlacement, SourceError> {
    if id.level != layout.level {
        return Err(SourceError::StaleLevel {
            level: id.level,
            active: layout.level,
        });
    }

    let (x, y, width, height) = layout.tile_rect(id.row, id.col)?;
    let url = source.tile_url(id.row, id.col, Some(id.level))?;

    Ok(TilePlacement {
        id: id.clone(),
        url,
        x,
        y,
        width,
        height,
    })
}

/// Ids of every tile in the `rows` x `cols` rectangle.
pub fn grid_ids(source: &Arc<str>, level: usize, rows: Span, cols: Span) -> HashSet<TileId> {
    let mut ids = HashSet::new();
    for row in rows.indices() {
        for col in cols.indices() {
            ids.insert(TileId::new(Arc::clone(source), level, row, col));
        }
    }
    ids
}
