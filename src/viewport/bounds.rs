//! Pan constraints.
//!
//! The pane may only move so that it never exposes empty space inside the
//! frame on a side where it has content to show:
//!
//! ```text
//!   pane wider than frame:    frame.right - paneWidth <= pane.left <= frame.left
//!   pane narrower than frame: pane.left == frame.left
//! ```
//!
//! The vertical axis follows the same rule.

use crate::region::Region;

/// Legal range of the pane's top-left corner, in page pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanBounds {
    pub min_left: f64,
    pub max_left: f64,
    pub min_top: f64,
    pub max_top: f64,
}

impl PanBounds {
    /// Bounds for a `pane_width` x `pane_height` pane inside `frame`.
    pub fn compute(frame: &Region, pane_width: f64, pane_height: f64) -> Self {
        Self {
            min_left: frame.left.min(frame.right - pane_width),
            max_left: frame.left,
            min_top: frame.top.min(frame.bottom - pane_height),
            max_top: frame.top,
        }
    }

    /// Pull `(left, top)` into the legal range.
    pub fn clamp(&self, left: f64, top: f64) -> (f64, f64) {
        (
            left.clamp(self.min_left, self.max_left),
            top.clamp(self.min_top, self.max_top),
        )
    }

    pub fn contains(&self, left: f64, top: f64) -> bool {
        (self.min_left..=self.max_left).contains(&left)
            && (self.min_top..=self.max_top).contains(&top)
    }
}
