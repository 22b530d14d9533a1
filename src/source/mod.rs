//! Pyramid sources.
//!
//! - [`levels`]: the level table and closest-level selection
//! - [`scheme`]: tile-server URL layouts
//! - [`pyramid_source`]: descriptor loading and the ready-gated accessors

mod levels;
mod pyramid_source;
mod scheme;

pub use levels::{find_closest_level, ActiveLevel, PyramidLevel};
pub use pyramid_source::{PyramidSource, SourceEvent};
pub use scheme::{PathTemplateScheme, QueryApiScheme, UrlScheme, DEFAULT_EXTENSION};
