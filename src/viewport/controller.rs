//! Viewport controller: zoom, pan and layer orchestration.
//!
//! The controller owns a fixed *frame* on the page and a movable *pane*
//! behind it. The pane is the content scaled by the current ratio; panning
//! moves the pane, zooming resizes it around the point at the frame center.
//!
//! ```text
//!             pane (content x ratio)
//!   +-----------------------------------+
//!   |        +-----------+              |
//!   |        |   frame   |              |
//!   |        +-----------+              |
//!   +-----------------------------------+
//!   pan_x = pane.left - frame.left  (<= 0 when the pane is larger)
//! ```
//!
//! Every attached [`RenderLayer`] is repainted whenever the pane moves and
//! reset whenever the ratio changes.

use std::fmt;

use tracing::{debug, info, warn};

use crate::error::ViewportError;
use crate::events::{Event, EventBus, SubscriptionId};
use crate::layer::{LayerState, RenderLayer};
use crate::region::{Region, RegionProvider, RegionSnapshot};

use super::bounds::PanBounds;
use super::config::{ViewportConfig, FINE_ZOOM_STEP, ZOOM_STEP};

/// Handle of a layer attached to a viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(u32);

impl LayerId {
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer-{}", self.0)
    }
}

/// Notifications raised by a [`ViewportController`].
#[derive(Debug, Clone, PartialEq)]
pub enum ViewportEvent {
    /// Content bounds grew to fit a layer.
    ContentResized { width: u32, height: u32 },

    RatioChanged { ratio: f64 },

    /// The pane moved; offsets relative to the frame.
    PanChanged { x: f64, y: f64 },

    FrameResized { width: u32, height: u32 },

    LayerAdded(LayerId),
    LayerRemoved(LayerId),

    Shown,
    Hidden,

    /// The viewport was torn down. Fires once.
    Destroyed,
}

impl Event for ViewportEvent {
    fn fires_once(&self) -> bool {
        matches!(self, ViewportEvent::Destroyed)
    }
}

/// Zoom and pan state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    pub ratio: f64,
    pub min_ratio: f64,
    pub max_ratio: f64,

    /// Pane offset relative to the frame
    pub pan_x: f64,
    pub pan_y: f64,

    /// Full-resolution content bounds
    pub content_width: u32,
    pub content_height: u32,
}

/// Page-pixel point mapped into content coordinates; `None` on an axis
/// where the point falls outside the content.
pub type AbsolutePoint = (Option<f64>, Option<f64>);

/// Zoom/pan controller for a stack of render layers.
pub struct ViewportController {
    config: ViewportConfig,
    frame: Region,
    pane_left: f64,
    pane_top: f64,
    pane_width: u32,
    pane_height: u32,
    bounds: PanBounds,
    visible: bool,
    layers: Vec<(LayerId, RenderLayer)>,
    next_layer_id: u32,
    events: EventBus<ViewportEvent>,
}

impl ViewportController {
    /// Create a viewport whose frame sits at the page origin.
    pub fn new(config: ViewportConfig) -> Result<Self, ViewportError> {
        config.validate().map_err(ViewportError::InvalidConfig)?;

        let frame = Region::from_origin_size(
            0.0,
            0.0,
            config.frame_width as f64,
            config.frame_height as f64,
        );
        let pane_width = scale(config.content_width, config.ratio);
        let pane_height = scale(config.content_height, config.ratio);
        let bounds = PanBounds::compute(&frame, pane_width as f64, pane_height as f64);
        let (pane_left, pane_top) = bounds.clamp(frame.left + config.x, frame.top + config.y);

        debug!(
            frame_width = config.frame_width,
            frame_height = config.frame_height,
            ratio = config.ratio,
            "Viewport created"
        );

        Ok(Self {
            visible: config.visible,
            config,
            frame,
            pane_left,
            pane_top,
            pane_width,
            pane_height,
            bounds,
            layers: Vec::new(),
            next_layer_id: 0,
            events: EventBus::new("viewport"),
        })
    }

    /// Register an observer for [`ViewportEvent`]s.
    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&ViewportEvent) + 'static,
    {
        self.events.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn state(&self) -> ViewportState {
        ViewportState {
            ratio: self.config.ratio,
            min_ratio: self.config.min_ratio,
            max_ratio: self.config.max_ratio,
            pan_x: self.pane_left - self.frame.left,
            pan_y: self.pane_top - self.frame.top,
            content_width: self.config.content_width,
            content_height: self.config.content_height,
        }
    }

    pub fn ratio(&self) -> f64 {
        self.config.ratio
    }

    pub fn frame(&self) -> Region {
        self.frame
    }

    pub fn pane(&self) -> Region {
        Region::from_origin_size(
            self.pane_left,
            self.pane_top,
            self.pane_width as f64,
            self.pane_height as f64,
        )
    }

    pub fn bounds(&self) -> PanBounds {
        self.bounds
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Regions as layers see them; unmeasurable while hidden.
    pub fn regions(&self) -> RegionSnapshot {
        if !self.visible {
            return RegionSnapshot::unmeasurable();
        }
        RegionSnapshot::new(self.frame, self.pane())
    }

    // =========================================================================
    // Coordinates
    // =========================================================================

    /// Map a page point into full-resolution content coordinates.
    pub fn to_absolute(&self, page_x: f64, page_y: f64) -> AbsolutePoint {
        let map = |page: f64, origin: f64, extent: u32| {
            let offset = page - origin;
            if offset < 0.0 || offset > extent as f64 {
                None
            } else {
                Some((offset / self.config.ratio).round())
            }
        };
        (
            map(page_x, self.pane_left, self.pane_width),
            map(page_y, self.pane_top, self.pane_height),
        )
    }

    /// Map a content point to page pixels.
    pub fn to_page(&self, abs_x: f64, abs_y: f64) -> (f64, f64) {
        (
            (abs_x * self.config.ratio).round() + self.pane_left,
            (abs_y * self.config.ratio).round() + self.pane_top,
        )
    }

    /// Content point under the frame center, or `None` while hidden.
    pub fn center(&self) -> Option<AbsolutePoint> {
        if !self.visible {
            return None;
        }
        let (x, y) = self.frame.center();
        Some(self.to_absolute(x, y))
    }

    /// Part of the content currently inside the frame, in content pixels.
    pub fn absolute_region(&self) -> Option<Region> {
        if !self.visible {
            return None;
        }
        let ratio = self.config.ratio;
        let content_w = self.config.content_width as f64;
        let content_h = self.config.content_height as f64;

        Some(Region {
            left: ((self.frame.left - self.pane_left) / ratio).clamp(0.0, content_w),
            top: ((self.frame.top - self.pane_top) / ratio).clamp(0.0, content_h),
            right: ((self.frame.right - self.pane_left) / ratio).clamp(0.0, content_w),
            bottom: ((self.frame.bottom - self.pane_top) / ratio).clamp(0.0, content_h),
        })
    }

    // =========================================================================
    // Pan
    // =========================================================================

    fn reset_constraints(&mut self) {
        self.bounds = PanBounds::compute(
            &self.frame,
            self.pane_width as f64,
            self.pane_height as f64,
        );
        let (left, top) = self.bounds.clamp(self.pane_left, self.pane_top);
        self.pane_left = left;
        self.pane_top = top;
    }

    fn move_pane(&mut self, left: f64, top: f64) {
        let (left, top) = self.bounds.clamp(left, top);
        self.pane_left = left;
        self.pane_top = top;

        let state = self.state();
        self.events.emit(ViewportEvent::PanChanged {
            x: state.pan_x,
            y: state.pan_y,
        });
    }

    /// Shift the pane so `target` sits under the frame center. Axes without
    /// a target or without a measurable center are left alone.
    fn recenter(&mut self, target: AbsolutePoint) {
        let (cx, cy) = self.center().unwrap_or((None, None));
        let ratio = self.config.ratio;

        let shift = |current: Option<f64>, wanted: Option<f64>| match (current, wanted) {
            (Some(current), Some(wanted)) => ((current - wanted) * ratio).round(),
            _ => 0.0,
        };
        let dx = shift(cx, target.0);
        let dy = shift(cy, target.1);

        self.move_pane(self.pane_left + dx, self.pane_top + dy);
    }

    /// Center the frame on content point `(abs_x, abs_y)`.
    ///
    /// Negative coordinates are rejected with a warning.
    pub fn set_center(&mut self, abs_x: f64, abs_y: f64) {
        if abs_x < 0.0 || abs_y < 0.0 || !abs_x.is_finite() || !abs_y.is_finite() {
            warn!(x = abs_x, y = abs_y, "Ignoring invalid center");
            return;
        }

        self.reset_constraints();
        self.recenter((Some(abs_x), Some(abs_y)));
        self.paint_layers(false);
    }

    /// Move the pane by `(dx, dy)` page pixels, within bounds.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.move_pane(self.pane_left + dx, self.pane_top + dy);
        self.paint_layers(false);
    }

    /// Move the pane to offset `(x, y)` relative to the frame, within bounds.
    pub fn pan_to(&mut self, x: f64, y: f64) {
        self.reset_constraints();
        self.move_pane(self.frame.left + x, self.frame.top + y);
        self.paint_layers(false);
    }

    // =========================================================================
    // Zoom
    // =========================================================================

    /// Zoom to `ratio`, clamped to `[min_ratio, max_ratio]`, keeping the
    /// content point under the frame center fixed. Returns the ratio set.
    pub fn set_ratio(&mut self, ratio: f64) -> f64 {
        if !ratio.is_finite() {
            warn!(ratio, "Ignoring non-finite ratio");
            return self.config.ratio;
        }

        let ratio = self.config.clamp_ratio(ratio);
        let center = self.center();

        self.config.ratio = ratio;
        self.pane_width = scale(self.config.content_width, ratio);
        self.pane_height = scale(self.config.content_height, ratio);

        self.hide_layers(true);
        self.reset_constraints();
        if let Some(center) = center {
            self.recenter(center);
        }
        if self.visible {
            self.show_layers(true);
        }

        debug!(
            ratio,
            pane_width = self.pane_width,
            pane_height = self.pane_height,
            "Ratio changed"
        );
        self.events.emit(ViewportEvent::RatioChanged { ratio });
        ratio
    }

    /// Reapply the current ratio.
    pub fn refresh_ratio(&mut self) -> f64 {
        self.set_ratio(self.config.ratio)
    }

    /// Step the ratio up by 0.10, or 0.01 when `fine`.
    pub fn zoom_in(&mut self, fine: bool) -> f64 {
        let step = if fine { FINE_ZOOM_STEP } else { ZOOM_STEP };
        self.set_ratio(self.config.ratio + step)
    }

    /// Step the ratio down by 0.10, or 0.01 when `fine`.
    pub fn zoom_out(&mut self, fine: bool) -> f64 {
        let step = if fine { FINE_ZOOM_STEP } else { ZOOM_STEP };
        self.set_ratio(self.config.ratio - step)
    }

    /// Zoom so that layer `id` fits the frame.
    ///
    /// Returns `Ok(None)` while the viewport is hidden or the layer is not
    /// ready.
    pub fn fit_layer(&mut self, id: LayerId) -> Result<Option<f64>, ViewportError> {
        let layer = self.layer(id).ok_or(ViewportError::UnknownLayer(id))?;
        if !self.visible {
            debug!(layer = %id, "Not fitting layer while hidden");
            return Ok(None);
        }

        match layer.fit_ratio(self.frame.width(), self.frame.height()) {
            Some(ratio) => Ok(Some(self.set_ratio(ratio))),
            None => Ok(None),
        }
    }

    // =========================================================================
    // Frame
    // =========================================================================

    /// Resize the frame and repaint every layer.
    pub fn set_frame_size(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            warn!(width, height, "Ignoring empty frame size");
            return;
        }

        self.frame = Region::from_origin_size(
            self.frame.left,
            self.frame.top,
            width as f64,
            height as f64,
        );
        self.config.frame_width = width;
        self.config.frame_height = height;

        self.reset_constraints();
        if self.visible {
            self.show_layers(true);
        }
        self.paint_layers(true);
        self.events.emit(ViewportEvent::FrameResized { width, height });
    }

    pub fn show(&mut self) {
        self.visible = true;
        self.reset_constraints();
        self.show_layers(false);
        self.paint_layers(false);
        self.events.emit(ViewportEvent::Shown);
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.hide_layers(false);
        self.events.emit(ViewportEvent::Hidden);
    }

    // =========================================================================
    // Layers
    // =========================================================================

    /// Attach `layer`, wait for its source and paint it.
    ///
    /// On a hidden viewport the layer is attached hidden and first painted by
    /// [`ViewportController::show`]. A layer whose source fails stays attached in the
    /// [`LayerState::ConfigFailed`] state and is never painted.
    pub async fn add_layer(&mut self, mut layer: RenderLayer) -> LayerId {
        let id = LayerId(self.next_layer_id);
        self.next_layer_id += 1;

        let state = layer.configure().await;
        info!(layer = %id, name = %layer.name(), state = ?state, "Layer attached");

        self.layers.push((id, layer));
        self.events.emit(ViewportEvent::LayerAdded(id));

        if state != LayerState::Ready {
            warn!(layer = %id, "Layer source failed, not painting");
            return id;
        }

        self.on_layer_resize(id);
        if !self.visible {
            debug!(layer = %id, "Viewport hidden, layer stays hidden until shown");
            return id;
        }

        let regions = self.regions();
        let ratio = self.config.ratio;
        if let Some(layer) = self.layer_mut(id) {
            layer.show(ratio, &regions, true);
            layer.paint(&regions, false);
        }
        id
    }

    /// Grow the content bounds to fit layer `id`.
    ///
    /// Content never shrinks. If it grew, emits
    /// [`ViewportEvent::ContentResized`] and then reapplies the ratio.
    pub fn on_layer_resize(&mut self, id: LayerId) {
        let Some((width, height)) = self.layer(id).and_then(RenderLayer::extent) else {
            return;
        };

        let mut grew = false;
        if width > self.config.content_width {
            self.config.content_width = width;
            grew = true;
        }
        if height > self.config.content_height {
            self.config.content_height = height;
            grew = true;
        }

        if grew {
            debug!(
                layer = %id,
                content_width = self.config.content_width,
                content_height = self.config.content_height,
                "Content grew"
            );
            self.events.emit(ViewportEvent::ContentResized {
                width: self.config.content_width,
                height: self.config.content_height,
            });
            self.refresh_ratio();
        }
    }

    /// Detach layer `id`.
    ///
    /// With `keep`, the layer is hidden and handed back; otherwise it is
    /// destroyed.
    pub fn remove_layer(
        &mut self,
        id: LayerId,
        keep: bool,
    ) -> Result<Option<RenderLayer>, ViewportError> {
        let pos = self
            .layers
            .iter()
            .position(|(lid, _)| *lid == id)
            .ok_or(ViewportError::UnknownLayer(id))?;
        let (_, mut layer) = self.layers.remove(pos);
        self.events.emit(ViewportEvent::LayerRemoved(id));

        if keep {
            layer.hide(self.config.ratio, true);
            Ok(Some(layer))
        } else {
            layer.destroy();
            Ok(None)
        }
    }

    /// Destroy every layer.
    pub fn clear(&mut self) {
        for (id, layer) in std::mem::take(&mut self.layers) {
            self.events.emit(ViewportEvent::LayerRemoved(id));
            layer.destroy();
        }
    }

    pub fn has_layer(&self, id: LayerId) -> bool {
        self.layers.iter().any(|(lid, _)| *lid == id)
    }

    pub fn layer(&self, id: LayerId) -> Option<&RenderLayer> {
        self.layers
            .iter()
            .find(|(lid, _)| *lid == id)
            .map(|(_, layer)| layer)
    }

    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut RenderLayer> {
        self.layers
            .iter_mut()
            .find(|(lid, _)| *lid == id)
            .map(|(_, layer)| layer)
    }

    /// Ids of attached layers in attach order.
    pub fn layer_ids(&self) -> Vec<LayerId> {
        self.layers.iter().map(|(id, _)| *id).collect()
    }

    fn show_layers(&mut self, silent: bool) {
        let regions = self.regions();
        let ratio = self.config.ratio;
        for (_, layer) in self.layers.iter_mut() {
            layer.show(ratio, &regions, silent);
        }
    }

    fn hide_layers(&mut self, silent: bool) {
        let ratio = self.config.ratio;
        for (_, layer) in self.layers.iter_mut() {
            layer.hide(ratio, silent);
        }
    }

    fn paint_layers(&mut self, force: bool) {
        let regions = self.regions();
        for (_, layer) in self.layers.iter_mut() {
            if layer.is_ready() {
                layer.paint(&regions, force);
            }
        }
    }

    /// Tear down the viewport and every attached layer.
    pub fn destroy(mut self) {
        self.clear();
        self.visible = false;
        info!("Viewport destroyed");
        self.events.emit(ViewportEvent::Destroyed);
        self.events.unsubscribe_all();
    }
}

impl RegionProvider for ViewportController {
    fn viewport_region(&self) -> Option<Region> {
        self.regions().viewport_region()
    }

    fn pane_region(&self) -> Option<Region> {
        self.regions().pane_region()
    }
}

impl fmt::Debug for ViewportController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewportController")
            .field("state", &self.state())
            .field("frame", &self.frame)
            .field("visible", &self.visible)
            .field("layers", &self.layer_ids())
            .finish()
    }
}

fn scale(value: u32, ratio: f64) -> u32 {
    (value as f64 * ratio).round() as u32
}
