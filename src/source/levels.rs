//! Zoom levels and level selection.
//!
//! A pyramid stores a handful of pre-rendered levels. Any requested display
//! ratio is served by the level whose native ratio is numerically closest,
//! scaled by an *adjust* factor so the level's pixels cover exactly the
//! requested size:
//!
//! ```text
//! requested ratio 0.05, levels [1.0, 0.5, 0.25]
//!
//!   |1.0  - 0.05| = 0.95
//!   |0.5  - 0.05| = 0.45
//!   |0.25 - 0.05| = 0.20   <- closest, adjust = 0.05 / 0.25 = 0.2
//! ```

use crate::format::Descriptor;

/// One zoom level of a pyramid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PyramidLevel {
    /// Native scale relative to full resolution
    pub ratio: f64,

    /// Level width in pixels
    pub width: u32,

    /// Level height in pixels
    pub height: u32,

    pub tile_width: u32,
    pub tile_height: u32,

    /// Rows in this level's tile grid
    pub num_rows: u32,

    /// Columns in this level's tile grid
    pub num_cols: u32,
}

impl PyramidLevel {
    /// Build the level table from a validated descriptor, in storage order.
    pub fn from_descriptor(descriptor: &Descriptor) -> Vec<PyramidLevel> {
        descriptor
            .levels
            .iter()
            .map(|level| {
                let (tile_width, tile_height) = descriptor.level_tile_size(level);
                PyramidLevel {
                    ratio: level.ratio,
                    width: level.width,
                    height: level.height,
                    tile_width,
                    tile_height,
                    num_rows: level.num_rows,
                    num_cols: level.num_cols,
                }
            })
            .collect()
    }

    /// Whether `(row, col)` lies inside this level's grid.
    pub fn contains(&self, row: u32, col: u32) -> bool {
        row < self.num_rows && col < self.num_cols
    }
}

/// The level currently used to serve tiles, and how it is scaled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveLevel {
    /// Index into the level table
    pub index: usize,

    /// Ratio the caller asked for
    pub requested_ratio: f64,

    /// `requested_ratio / level.ratio`
    pub adjust: f64,
}

impl ActiveLevel {
    /// Serve `level` at its native size.
    pub fn native(index: usize, level: &PyramidLevel) -> Self {
        Self {
            index,
            requested_ratio: level.ratio,
            adjust: 1.0,
        }
    }

    /// Serve `ratio` from `level`.
    pub fn scaled(index: usize, level: &PyramidLevel, ratio: f64) -> Self {
        Self {
            index,
            requested_ratio: ratio,
            adjust: ratio / level.ratio,
        }
    }
}

/// Index of the level whose ratio is closest to `ratio`.
///
/// Levels are scanned in storage order and only a strictly smaller distance
/// replaces the current best, so ties go to the lowest index. Returns `None`
/// for an empty table.
pub fn find_closest_level(levels: &[PyramidLevel], ratio: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, level) in levels.iter().enumerate() {
        let diff = (level.ratio - ratio).abs();
        match best {
            Some((_, best_diff)) if diff >= best_diff => {}
            _ => best = Some((index, diff)),
        }
    }
    best.map(|(index, _)| index)
}
