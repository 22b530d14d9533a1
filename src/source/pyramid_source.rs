//! Pyramid source: descriptor loading, level selection and tile addressing.
//!
//! A [`PyramidSource`] starts out unconfigured. [`PyramidSource::configure`]
//! fetches the descriptor once through its [`DescriptorFetcher`], after which
//! the source serves any display ratio from its closest stored level:
//!
//! ```text
//!   Unconfigured --configure()--> Ready
//!        |                          |
//!        +--- fetch/parse error --> Failed (terminal)
//! ```
//!
//! Every geometry accessor returns [`SourceError::NotReady`] until the source
//! is ready.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{DescriptorError, SourceError};
use crate::events::{Event, EventBus, SubscriptionId};
use crate::format::{Descriptor, Thumbnail};
use crate::io::DescriptorFetcher;

use super::levels::{find_closest_level, ActiveLevel, PyramidLevel};
use super::scheme::UrlScheme;

/// Notifications raised by a [`PyramidSource`].
#[derive(Debug, Clone, PartialEq)]
pub enum SourceEvent {
    /// The descriptor was loaded. Fires once.
    Ready,

    /// The descriptor could not be loaded.
    ConfigFailed { message: String },
}

impl Event for SourceEvent {
    fn fires_once(&self) -> bool {
        matches!(self, SourceEvent::Ready)
    }
}

/// Everything known about a loaded pyramid.
#[derive(Debug, Clone)]
struct Pyramid {
    name: String,
    width: u32,
    height: u32,
    levels: Vec<PyramidLevel>,
    thumbnail: Option<Thumbnail>,
    active: ActiveLevel,
}

impl Pyramid {
    fn current(&self) -> &PyramidLevel {
        &self.levels[self.active.index]
    }
}

#[derive(Debug)]
enum SourceState {
    Unconfigured,
    Ready(Box<Pyramid>),
    Failed(String),
}

/// One pyramid-tiled image.
pub struct PyramidSource {
    id: Arc<str>,
    scheme: Box<dyn UrlScheme>,
    fetcher: Arc<dyn DescriptorFetcher>,
    state: SourceState,
    events: EventBus<SourceEvent>,
}

impl PyramidSource {
    /// Create an unconfigured source.
    ///
    /// `id` names the source in tile ids and log output; it does not have to
    /// be globally unique but tiles of two sources sharing an id collide.
    pub fn new(
        id: impl Into<Arc<str>>,
        scheme: Box<dyn UrlScheme>,
        fetcher: Arc<dyn DescriptorFetcher>,
    ) -> Self {
        Self {
            id: id.into(),
            scheme,
            fetcher,
            state: SourceState::Unconfigured,
            events: EventBus::new("source"),
        }
    }

    pub fn id(&self) -> &Arc<str> {
        &self.id
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, SourceState::Ready(_))
    }

    /// Error message of a failed configuration, if any.
    pub fn failure(&self) -> Option<&str> {
        match &self.state {
            SourceState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Register an observer for [`SourceEvent`]s.
    ///
    /// Subscribing after the source became ready replays [`SourceEvent::Ready`].
    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&SourceEvent) + 'static,
    {
        self.events.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Load the descriptor and become ready.
    ///
    /// Calling this on a ready source is a no-op. A failed source stays
    /// failed: the error is returned again without refetching.
    pub async fn configure(&mut self) -> Result<(), SourceError> {
        match &self.state {
            SourceState::Ready(_) => {
                debug!(source = %self.id, "Source already configured");
                return Ok(());
            }
            SourceState::Failed(message) => {
                return Err(SourceError::ConfigFailed {
                    source_id: self.id.to_string(),
                    message: message.clone(),
                });
            }
            SourceState::Unconfigured => {}
        }

        let url = self.scheme.config_url();
        debug!(source = %self.id, url = %url, "Fetching pyramid descriptor");

        match self.load_descriptor(&url).await {
            Ok(descriptor) => {
                self.apply_descriptor(descriptor);
                Ok(())
            }
            Err(err) => {
                let message = err.to_string();
                warn!(
                    source = %self.id,
                    url = %url,
                    error_type = descriptor_error_type(&err),
                    "Failed to configure source: {}",
                    message
                );
                self.state = SourceState::Failed(message.clone());
                self.events.emit(SourceEvent::ConfigFailed {
                    message: message.clone(),
                });
                Err(SourceError::ConfigFailed {
                    source_id: self.id.to_string(),
                    message,
                })
            }
        }
    }

    async fn load_descriptor(&self, url: &str) -> Result<Descriptor, DescriptorError> {
        let data = self.fetcher.fetch(url).await?;
        Descriptor::parse(&data)
    }

    fn apply_descriptor(&mut self, descriptor: Descriptor) {
        self.scheme.on_descriptor_parsed(&descriptor);

        let levels = PyramidLevel::from_descriptor(&descriptor);
        let last = levels.len() - 1;
        let active = ActiveLevel::native(last, &levels[last]);

        info!(
            source = %self.id,
            name = %descriptor.name,
            width = descriptor.width,
            height = descriptor.height,
            levels = levels.len(),
            "Source ready"
        );

        self.state = SourceState::Ready(Box::new(Pyramid {
            name: descriptor.name,
            width: descriptor.width,
            height: descriptor.height,
            levels,
            thumbnail: descriptor.thumbnail,
            active,
        }));
        self.events.emit(SourceEvent::Ready);
    }

    fn pyramid(&self) -> Result<&Pyramid, SourceError> {
        match &self.state {
            SourceState::Ready(pyramid) => Ok(pyramid),
            _ => Err(self.not_ready()),
        }
    }

    fn pyramid_mut(&mut self) -> Result<&mut Pyramid, SourceError> {
        let id = self.id.to_string();
        match &mut self.state {
            SourceState::Ready(pyramid) => Ok(pyramid),
            _ => Err(SourceError::NotReady { source_id: id }),
        }
    }

    fn not_ready(&self) -> SourceError {
        SourceError::NotReady {
            source_id: self.id.to_string(),
        }
    }

    // =========================================================================
    // Level selection
    // =========================================================================

    /// Serve `ratio` from the closest stored level. Returns `ratio`.
    ///
    /// Non-positive or non-finite ratios are ignored with a warning and the
    /// current ratio is returned.
    pub fn set_ratio(&mut self, ratio: f64) -> Result<f64, SourceError> {
        let id = Arc::clone(&self.id);
        let pyramid = self.pyramid_mut()?;

        if !(ratio.is_finite() && ratio > 0.0) {
            warn!(source = %id, ratio, "Ignoring invalid ratio");
            return Ok(pyramid.active.requested_ratio);
        }

        // Levels are non-empty once ready.
        let index = find_closest_level(&pyramid.levels, ratio).unwrap_or(0);
        pyramid.active = ActiveLevel::scaled(index, &pyramid.levels[index], ratio);

        debug!(
            source = %id,
            ratio,
            level = index,
            adjust = pyramid.active.adjust,
            "Ratio set"
        );
        Ok(ratio)
    }

    /// Serve level `level` at its native size. Returns the level actually set.
    ///
    /// Out-of-range levels are clamped to the last level with a warning.
    pub fn set_level(&mut self, level: usize) -> Result<usize, SourceError> {
        let id = Arc::clone(&self.id);
        let pyramid = self.pyramid_mut()?;

        let last = pyramid.levels.len() - 1;
        let index = if level > last {
            warn!(
                source = %id,
                level,
                level_count = pyramid.levels.len(),
                "Level out of range, clamping to {}",
                last
            );
            last
        } else {
            level
        };

        pyramid.active = ActiveLevel::native(index, &pyramid.levels[index]);
        Ok(index)
    }

    /// Reapply the current ratio.
    pub fn refresh_ratio(&mut self) -> Result<f64, SourceError> {
        let ratio = self.ratio()?;
        self.set_ratio(ratio)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn name(&self) -> Result<&str, SourceError> {
        Ok(&self.pyramid()?.name)
    }

    /// Full-resolution width.
    pub fn abs_width(&self) -> Result<u32, SourceError> {
        Ok(self.pyramid()?.width)
    }

    /// Full-resolution height.
    pub fn abs_height(&self) -> Result<u32, SourceError> {
        Ok(self.pyramid()?.height)
    }

    /// Width of the image at the current ratio.
    pub fn width(&self) -> Result<u32, SourceError> {
        let pyramid = self.pyramid()?;
        Ok(scale(pyramid.current().width, pyramid.active.adjust))
    }

    /// Height of the image at the current ratio.
    pub fn height(&self) -> Result<u32, SourceError> {
        let pyramid = self.pyramid()?;
        Ok(scale(pyramid.current().height, pyramid.active.adjust))
    }

    /// On-screen tile width at the current ratio (unrounded).
    pub fn tile_width(&self) -> Result<f64, SourceError> {
        let pyramid = self.pyramid()?;
        Ok(pyramid.current().tile_width as f64 * pyramid.active.adjust)
    }

    /// On-screen tile height at the current ratio (unrounded).
    pub fn tile_height(&self) -> Result<f64, SourceError> {
        let pyramid = self.pyramid()?;
        Ok(pyramid.current().tile_height as f64 * pyramid.active.adjust)
    }

    pub fn num_rows(&self) -> Result<u32, SourceError> {
        Ok(self.pyramid()?.current().num_rows)
    }

    pub fn num_cols(&self) -> Result<u32, SourceError> {
        Ok(self.pyramid()?.current().num_cols)
    }

    /// Ratio most recently requested.
    pub fn ratio(&self) -> Result<f64, SourceError> {
        Ok(self.pyramid()?.active.requested_ratio)
    }

    /// Index of the active level.
    pub fn level(&self) -> Result<usize, SourceError> {
        Ok(self.pyramid()?.active.index)
    }

    /// Index of the last stored level.
    pub fn max_level(&self) -> Result<usize, SourceError> {
        Ok(self.pyramid()?.levels.len() - 1)
    }

    pub fn adjust(&self) -> Result<f64, SourceError> {
        Ok(self.pyramid()?.active.adjust)
    }

    pub fn levels(&self) -> Result<&[PyramidLevel], SourceError> {
        Ok(&self.pyramid()?.levels)
    }

    pub fn thumbnail(&self) -> Result<Option<&Thumbnail>, SourceError> {
        Ok(self.pyramid()?.thumbnail.as_ref())
    }

    // =========================================================================
    // Addressing
    // =========================================================================

    /// URL of the descriptor this source loads.
    pub fn config_url(&self) -> String {
        self.scheme.config_url()
    }

    /// URL of tile `(row, col)` at `level`, or at the active level if `None`.
    pub fn tile_url(
        &self,
        row: u32,
        col: u32,
        level: Option<usize>,
    ) -> Result<String, SourceError> {
        let pyramid = self.pyramid()?;
        let index = level.unwrap_or(pyramid.active.index);

        let grid = pyramid
            .levels
            .get(index)
            .ok_or(SourceError::LevelOutOfRange {
                level: index,
                level_count: pyramid.levels.len(),
            })?;

        if !grid.contains(row, col) {
            return Err(SourceError::TileOutOfRange {
                level: index,
                row,
                col,
                rows: grid.num_rows,
                cols: grid.num_cols,
            });
        }

        Ok(self.scheme.tile_url(row, col, index))
    }

    /// Whether both sources load the same descriptor.
    pub fn same_image(&self, other: &PyramidSource) -> bool {
        self.config_url() == other.config_url()
    }

    /// Multi-line summary of the source and its levels.
    pub fn describe(&self) -> String {
        let mut out = format!("{}\n  descriptor: {}\n", self, self.config_url());
        match &self.state {
            SourceState::Ready(pyramid) => {
                out.push_str(&format!(
                    "  size: {}x{}, active level {} (ratio {}, adjust {:.4})\n",
                    pyramid.width,
                    pyramid.height,
                    pyramid.active.index,
                    pyramid.active.requested_ratio,
                    pyramid.active.adjust
                ));
                for (i, level) in pyramid.levels.iter().enumerate() {
                    out.push_str(&format!(
                        "  level {}: ratio {} {}x{} tiles {}x{} grid {}x{}\n",
                        i,
                        level.ratio,
                        level.width,
                        level.height,
                        level.tile_width,
                        level.tile_height,
                        level.num_rows,
                        level.num_cols
                    ));
                }
            }
            SourceState::Failed(message) => {
                out.push_str(&format!("  failed: {}\n", message));
            }
            SourceState::Unconfigured => {}
        }
        out
    }
}

fn scale(value: u32, adjust: f64) -> u32 {
    (value as f64 * adjust).round() as u32
}

fn descriptor_error_type(err: &DescriptorError) -> &'static str {
    match err {
        DescriptorError::Transport(_) => "transport",
        DescriptorError::Parse(_) => "parse",
        DescriptorError::Invalid { .. } => "invalid",
    }
}

impl fmt::Display for PyramidSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            SourceState::Ready(pyramid) if !pyramid.name.is_empty() => {
                write!(f, "PyramidSource {} ({})", self.id, pyramid.name)
            }
            SourceState::Ready(_) => write!(f, "PyramidSource {}", self.id),
            SourceState::Unconfigured => write!(f, "PyramidSource {} (not loaded)", self.id),
            SourceState::Failed(_) => write!(f, "PyramidSource {} (failed)", self.id),
        }
    }
}

impl fmt::Debug for PyramidSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PyramidSource")
            .field("id", &self.id)
            .field("scheme", &self.scheme)
            .field("fetcher", &self.fetcher.name())
            .field("state", &self.state)
            .finish()
    }
}
