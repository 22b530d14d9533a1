//! Pyramid descriptor document.
//!
//! A descriptor is a small JSON document, fetched once per image, that lists
//! every pre-rendered zoom level together with its tile grid:
//!
//! ```json
//! {
//!   "name": "folio-12r",
//!   "width": 1000, "height": 800,
//!   "tileWidth": 256, "tileHeight": 256,
//!   "levels": [
//!     { "ratio": 0.25, "width": 250, "height": 200, "numRows": 1, "numCols": 1 },
//!     { "ratio": 1.0, "width": 1000, "height": 800, "numRows": 4, "numCols": 4 }
//!   ],
//!   "thumbnail": { "url": "thumb.jpeg", "width": 120, "height": 96 },
//!   "extension": "jpeg"
//! }
//! ```
//!
//! Older tile servers emit the compact field names `tw`, `th`, `layers`,
//! `w`, `h`, `nRows`, `nCols`, `thumb` and `ext`. Both spellings are accepted.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::DescriptorError;

use super::validation::validate_descriptor;

/// Parsed pyramid descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Descriptor {
    /// Human-readable image name
    #[serde(default)]
    pub name: String,

    /// Full-resolution width in pixels
    pub width: u32,

    /// Full-resolution height in pixels
    pub height: u32,

    /// Default tile width for every level
    #[serde(alias = "tw")]
    pub tile_width: u32,

    /// Default tile height for every level
    #[serde(alias = "th")]
    pub tile_height: u32,

    /// Zoom levels in storage order
    #[serde(alias = "layers")]
    pub levels: Vec<LevelDescriptor>,

    /// Optional preview image
    #[serde(default, alias = "thumb", skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<Thumbnail>,

    /// Tile file extension for path-templated tile servers
    #[serde(default, alias = "ext", skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
}

/// One zoom level as described on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelDescriptor {
    /// Scale relative to full resolution (1.0 = 100%)
    pub ratio: f64,

    #[serde(alias = "w")]
    pub width: u32,

    #[serde(alias = "h")]
    pub height: u32,

    #[serde(alias = "nRows")]
    pub num_rows: u32,

    #[serde(alias = "nCols")]
    pub num_cols: u32,

    /// Per-level tile width; falls back to the descriptor-wide value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile_width: Option<u32>,

    /// Per-level tile height; falls back to the descriptor-wide value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile_height: Option<u32>,
}

/// Thumbnail metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,

    #[serde(alias = "w")]
    pub width: u32,

    #[serde(alias = "h")]
    pub height: u32,
}

impl Descriptor {
    /// Parse and validate a descriptor.
    ///
    /// Structural problems (no levels, zero sizes, non-positive ratios) are
    /// errors. Grid counts that disagree with `ceil(width / tile_width)` are
    /// logged as warnings and kept as published, since the tile server is
    /// authoritative about which tiles exist.
    pub fn parse(data: &[u8]) -> Result<Self, DescriptorError> {
        let descriptor: Descriptor = serde_json::from_slice(data)?;

        let result = validate_descriptor(&descriptor);
        for warning in &result.warnings {
            warn!(name = %descriptor.name, "Descriptor warning: {}", warning);
        }
        result.into_result()?;

        Ok(descriptor)
    }

    /// Tile size for a level, applying the descriptor-wide default.
    pub fn level_tile_size(&self, level: &LevelDescriptor) -> (u32, u32) {
        (
            level.tile_width.unwrap_or(self.tile_width),
            level.tile_height.unwrap_or(self.tile_height),
        )
    }
}
