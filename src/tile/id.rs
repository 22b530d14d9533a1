//! Tile identity.

use std::fmt;
use std::sync::Arc;

/// Identifies one tile of one source at one level.
///
/// Formats as `{source}__{level}:{row}-{col}`, which is stable for the
/// lifetime of the tile and safe to use as a DOM-style element id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId {
    /// Id of the owning source
    pub source: Arc<str>,

    /// Pyramid level index
    pub level: usize,

    pub row: u32,
    pub col: u32,
}

impl TileId {
    pub fn new(source: impl Into<Arc<str>>, level: usize, row: u32, col: u32) -> Self {
        Self {
            source: source.into(),
            level,
            row,
            col,
        }
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}__{}:{}-{}", self.source, self.level, self.row, self.col)
    }
}
