use thiserror::Error;

use crate::layer::LayerState;
use crate::viewport::LayerId;

/// Errors that can occur while fetching a pyramid descriptor
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The server answered with a non-success status
    #[error("Request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    /// Descriptor does not exist at the requested location
    #[error("Descriptor not found: {0}")]
    NotFound(String),

    /// Network or connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Local filesystem error
    #[error("I/O error: {0}")]
    Io(String),
}

/// Errors related to loading and validating a pyramid descriptor
#[derive(Debug, Clone, Error)]
pub enum DescriptorError {
    /// The descriptor could not be fetched
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The descriptor is not valid JSON or does not match the expected shape
    #[error("Failed to parse descriptor: {0}")]
    Parse(String),

    /// The descriptor parsed but describes an unusable pyramid
    #[error("Invalid descriptor field {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

impl From<serde_json::Error> for DescriptorError {
    fn from(err: serde_json::Error) -> Self {
        DescriptorError::Parse(err.to_string())
    }
}

/// A URL scheme could not be constructed
#[derive(Debug, Clone, Error)]
pub enum ExtensionError {
    /// The scheme is missing something it needs to build URLs
    #[error("Invalid URL scheme: {reason}")]
    InvalidExtension { reason: String },
}

/// Errors raised by a pyramid source
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// The source has not finished loading its descriptor
    #[error("Source {source_id} is not ready")]
    NotReady { source_id: String },

    /// Requested level does not exist
    #[error("Level {level} out of range: source has {level_count} levels")]
    LevelOutOfRange { level: usize, level_count: usize },

    /// Requested tile is outside the level's grid
    #[error("Tile ({row}, {col}) out of range at level {level}: grid is {rows} rows x {cols} cols")]
    TileOutOfRange {
        level: usize,
        row: u32,
        col: u32,
        rows: u32,
        cols: u32,
    },

    /// Tile belongs to a level other than the active one
    #[error("Tile requested at level {level} but the active level is {active}")]
    StaleLevel { level: usize, active: usize },

    /// A previous configuration attempt failed; the source cannot be reused
    #[error("Source {source_id} failed to configure: {message}")]
    ConfigFailed { source_id: String, message: String },
}

impl SourceError {
    /// Whether this error is a grid/index error that only affects one request.
    pub fn is_out_of_range(&self) -> bool {
        matches!(
            self,
            SourceError::LevelOutOfRange { .. }
                | SourceError::TileOutOfRange { .. }
                | SourceError::StaleLevel { .. }
        )
    }
}

/// Errors raised by a render layer
#[derive(Debug, Clone, Error)]
pub enum LayerError {
    /// Operation requires a ready layer
    #[error("Layer {layer} is not ready (state: {state:?})")]
    NotReady { layer: String, state: LayerState },

    /// Error from the layer's pyramid source
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

/// Errors raised by the viewport controller
#[derive(Debug, Clone, Error)]
pub enum ViewportError {
    /// No layer with this id is attached
    #[error("Unknown layer: {0}")]
    UnknownLayer(LayerId),

    /// Viewport configuration is unusable
    #[error("Invalid viewport configuration: {0}")]
    InvalidConfig(String),
}
