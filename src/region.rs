//! On-page rectangles.
//!
//! Visibility is computed from two rectangles in page coordinates: the
//! *viewport* (the fixed window the user looks through) and the *pane* (the
//! movable surface holding the tiles). Both are supplied through
//! [`RegionProvider`] so that the visibility math never depends on how the
//! host measures its layout.

/// Axis-aligned rectangle in page pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl Region {
    pub fn new(top: f64, left: f64, bottom: f64, right: f64) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    /// Rectangle with its top-left corner at `(left, top)`.
    pub fn from_origin_size(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            bottom: top + height,
            right: left + width,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Center point, rounded to whole page pixels.
    pub fn center(&self) -> (f64, f64) {
        (
            ((self.left + self.right) / 2.0).round(),
            ((self.top + self.bottom) / 2.0).round(),
        )
    }

    /// Whether every edge is a finite number.
    pub fn is_measurable(&self) -> bool {
        self.top.is_finite()
            && self.left.is_finite()
            && self.bottom.is_finite()
            && self.right.is_finite()
    }
}

/// Source of the two rectangles visibility is computed from.
///
/// Either method may return `None` when the host cannot measure the element
/// (for example while it is detached or hidden).
pub trait RegionProvider {
    fn viewport_region(&self) -> Option<Region>;
    fn pane_region(&self) -> Option<Region>;
}

/// Fixed pair of regions captured at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RegionSnapshot {
    pub viewport: Option<Region>,
    pub pane: Option<Region>,
}

impl RegionSnapshot {
    pub fn new(viewport: Region, pane: Region) -> Self {
        Self {
            viewport: Some(viewport),
            pane: Some(pane),
        }
    }

    /// Snapshot where neither region can be measured.
    pub fn unmeasurable() -> Self {
        Self::default()
    }
}

impl RegionProvider for RegionSnapshot {
    fn viewport_region(&self) -> Option<Region> {
        self.viewport.filter(Region::is_measurable)
    }

    fn pane_region(&self) -> Option<Region> {
        self.pane.filter(Region::is_measurable)
    }
}
