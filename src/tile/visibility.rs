//! Visible tile range computation.
//!
//! Given where the pane sits relative to the viewport, work out which rows
//! and columns of the tile grid intersect the viewport:
//!
//! ```text
//!   hOffset = viewport.left - pane.left
//!   startCol = max(0, floor(hOffset / tileWidth))
//!   endCol   = min(numCols - 1, startCol + ceil(viewport.width / tileWidth))
//! ```
//!
//! Rows follow the same rule with the vertical offset. The range is only
//! recomputed when its start moves, so a viewport that changes size without
//! moving must pass `force`.

use crate::region::Region;

/// Inclusive index range along one axis. `-1` marks "never computed".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: i64,
    pub end: i64,
}

impl Span {
    pub const UNSET: Span = Span { start: -1, end: -1 };

    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn is_set(&self) -> bool {
        self.start >= 0
    }

    /// Whether the span holds no index.
    pub fn is_empty(&self) -> bool {
        self.start < 0 || self.end < self.start
    }

    /// Grow by one index on both sides, clamped to `[0, count - 1]`.
    pub fn buffered(&self, count: u32) -> Span {
        if !self.is_set() {
            return *self;
        }
        Span {
            start: (self.start - 1).max(0),
            end: (self.end + 1).min(count as i64 - 1),
        }
    }

    /// Indices in the span.
    pub fn indices(&self) -> impl Iterator<Item = u32> {
        let (start, end) = if self.is_empty() {
            (1, 0)
        } else {
            (self.start as u32, self.end as u32)
        };
        start..=end
    }
}

/// Rows and columns intersecting the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRange {
    pub rows: Span,
    pub cols: Span,

    /// Whether the last computation moved the range
    pub changed: bool,
}

impl VisibleRange {
    pub const UNSET: VisibleRange = VisibleRange {
        rows: Span::UNSET,
        cols: Span::UNSET,
        changed: false,
    };

    /// Forget the last range so the next computation always reports a change.
    pub fn invalidate(&mut self) {
        *self = Self::UNSET;
    }

    /// The range grown by one tile in every direction.
    pub fn buffered(&self, num_rows: u32, num_cols: u32) -> (Span, Span) {
        (self.rows.buffered(num_rows), self.cols.buffered(num_cols))
    }

    fn unchanged(prior: &VisibleRange) -> Self {
        VisibleRange {
            changed: false,
            ..*prior
        }
    }
}

impl Default for VisibleRange {
    fn default() -> Self {
        Self::UNSET
    }
}

/// Grid dimensions and on-screen tile size used by [`calc_visible`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMetrics {
    pub tile_width: f64,
    pub tile_height: f64,
    pub num_rows: u32,
    pub num_cols: u32,
}

impl GridMetrics {
    fn is_measurable(&self) -> bool {
        self.tile_width.is_finite()
            && self.tile_height.is_finite()
            && self.tile_width > 0.0
            && self.tile_height > 0.0
    }
}

/// Compute the rows and columns intersecting `viewport`.
///
/// If either region is missing or the tile size is not positive, `prior` is
/// returned untouched with `changed = false`.
pub fn calc_visible(
    viewport: Option<Region>,
    pane: Option<Region>,
    grid: &GridMetrics,
    prior: &VisibleRange,
    force: bool,
) -> VisibleRange {
    let (viewport, pane) = match (viewport, pane) {
        (Some(viewport), Some(pane)) if grid.is_measurable() => (viewport, pane),
        _ => return VisibleRange::unchanged(prior),
    };

    let h_offset = viewport.left - pane.left;
    let v_offset = viewport.top - pane.top;

    let start_col = ((h_offset / grid.tile_width).floor() as i64).max(0);
    let start_row = ((v_offset / grid.tile_height).floor() as i64).max(0);

    if !force && start_col == prior.cols.start && start_row == prior.rows.start {
        return VisibleRange::unchanged(prior);
    }

    let end_col = (grid.num_cols as i64 - 1)
        .min(start_col + (viewport.width() / grid.tile_width).ceil() as i64);
    let end_row = (grid.num_rows as i64 - 1)
        .min(start_row + (viewport.height() / grid.tile_height).ceil() as i64);

    VisibleRange {
        rows: Span::new(start_row, end_row),
        cols: Span::new(start_col, end_col),
        changed: true,
    }
}
