//! Tile placement on the pane.
//!
//! All tiles of a level share one rounded tile size, except the last row and
//! column which are trimmed to whatever is left of the image:
//!
//! ```text
//!  1000 x 800 image, 256 px tiles
//!
//!    0      256     512     768   1000
//!  0 +-------+-------+-------+-----+
//!    |  256  |  256  |  256  | 232 |
//!256 +-------+-------+-------+-----+
//!    ...
//!768 +-------+-------+-------+-----+
//!    |  x32  |  x32  |  x32  |232x32
//!800 +-------+-------+-------+-----+
//! ```
//!
//! A grid with a single column (or row) spans the full image width (or
//! height), and an image that is an exact multiple of the tile size keeps
//! full-size edge tiles. At tiny scales, where rounding pushes the grid past
//! the image, tiles are trimmed to the image edge with a 1 px minimum.

use crate::error::SourceError;
use crate::source::PyramidSource;

use super::TileId;

/// Where and how large a tile is drawn, in pane pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct TilePlacement {
    pub id: TileId,

    /// Image URL
    pub url: String,

    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

/// Tile grid of the active level, as drawn at the current ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileLayout {
    pub level: usize,

    /// Rounded on-screen tile width
    pub tile_width: u32,

    /// Rounded on-screen tile height
    pub tile_height: u32,

    /// Image width at the current ratio
    pub width: u32,

    /// Image height at the current ratio
    pub height: u32,

    pub num_rows: u32,
    pub num_cols: u32,
}

impl TileLayout {
    /// Snapshot the layout of `source`'s active level.
    pub fn from_source(source: &PyramidSource) -> Result<Self, SourceError> {
        Ok(Self {
            level: source.level()?,
            tile_width: (source.tile_width()?.round() as u32).max(1),
            tile_height: (source.tile_height()?.round() as u32).max(1),
            width: source.width()?,
            height: source.height()?,
            num_rows: source.num_rows()?,
            num_cols: source.num_cols()?,
        })
    }

    /// Pane rectangle of tile `(row, col)` as `(x, y, width, height)`.
    pub fn tile_rect(&self, row: u32, col: u32) -> Result<(i64, i64, u32, u32), SourceError> {
        if row >= self.num_rows || col >= self.num_cols {
            return Err(SourceError::TileOutOfRange {
                level: self.level,
                row,
                col,
                rows: self.num_rows,
                cols: self.num_cols,
            });
        }

        let x = col as i64 * self.tile_width as i64;
        let y = row as i64 * self.tile_height as i64;
        let width = edge_size(col, self.num_cols, self.tile_width, self.width);
        let height = edge_size(row, self.num_rows, self.tile_height, self.height);

        Ok((x, y, width, height))
    }
}

/// Size of the tile at `index` along one axis, never reaching past `total`
/// (but at least one pixel).
fn edge_size(index: u32, count: u32, tile: u32, total: u32) -> u32 {
    if count == 1 {
        return total;
    }
    let nominal = if index + 1 < count {
        tile
    } else {
        match total % tile {
            0 => tile,
            rem => rem,
        }
    };
    let remaining = u64::from(total).saturating_sub(u64::from(index) * u64::from(tile));
    (nominal as u64).min(remaining).max(1) as u32
}
