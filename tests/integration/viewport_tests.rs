//! Viewport controller integration tests.
//!
//! Tests verify:
//! - Attaching a layer grows the content and paints the frame
//! - Zoom keeps the center fixed and swaps levels
//! - Panning respects the bounds and repaints
//! - Frame resizes force a repaint
//! - Layer removal, failed layers, hide/show and teardown

use std::sync::Arc;

use zoompane::{
    LayerEvent, LayerState, PathTemplateScheme, PyramidSource, RecordingSurface, RenderLayer,
    TileId, ViewportConfig, ViewportController, ViewportEvent,
};

use super::test_utils::{
    descriptor_json, folio_descriptor, folio_layer, recorder, viewport, MockFetcher,
};

fn big_descriptor() -> String {
    descriptor_json(4000, 4000, 256, &[1.0, 0.5, 0.25])
}

// =============================================================================
// Attaching Layers
// =============================================================================

#[tokio::test]
async fn test_add_layer_grows_content_then_paints() {
    let mut vp = viewport(500, 400);
    let (events, observer) = recorder::<ViewportEvent>();
    vp.subscribe(observer);

    let (layer, surface, _) = folio_layer(&folio_descriptor());
    let id = vp.add_layer(layer).await;

    assert!(vp.has_layer(id));
    assert_eq!(vp.layer(id).unwrap().state(), LayerState::Ready);

    let state = vp.state();
    assert_eq!((state.content_width, state.content_height), (1000, 800));
    assert_eq!(state.ratio, 1.0);

    let events = events.borrow();
    assert_eq!(events[0], ViewportEvent::LayerAdded(id));
    let resized = events
        .iter()
        .position(|e| matches!(e, ViewportEvent::ContentResized { .. }))
        .unwrap();
    let ratio = events
        .iter()
        .position(|e| matches!(e, ViewportEvent::RatioChanged { .. }))
        .unwrap();
    assert!(resized < ratio);
    assert_eq!(
        events[resized],
        ViewportEvent::ContentResized {
            width: 1000,
            height: 800
        }
    );

    // Visible rows/cols 0..2 plus the ring cover the whole 4x4 grid.
    assert_eq!(surface.len(), 16);
    assert!(surface.is_visible());
}

#[tokio::test]
async fn test_content_never_shrinks() {
    let mut vp = viewport(500, 400);
    let (big, _, _) = folio_layer(&big_descriptor());
    vp.add_layer(big).await;

    let (small, _, _) = folio_layer(&folio_descriptor());
    vp.add_layer(small).await;

    let state = vp.state();
    assert_eq!((state.content_width, state.content_height), (4000, 4000));
    assert_eq!(vp.layer_ids().len(), 2);
}

#[tokio::test]
async fn test_failed_layer_stays_attached_without_tiles() {
    let mut vp = viewport(500, 400);
    let surface = RecordingSurface::new();
    let scheme = PathTemplateScheme::new("http://tiles.test/missing").unwrap();
    let source = PyramidSource::new("missing", Box::new(scheme), Arc::new(MockFetcher::new()));
    let layer = RenderLayer::new("missing", source, Box::new(surface.clone()));

    let id = vp.add_layer(layer).await;

    assert_eq!(vp.layer(id).unwrap().state(), LayerState::ConfigFailed);
    assert!(surface.is_empty());
    assert_eq!(vp.state().content_width, 1);

    vp.pan_by(-10.0, -10.0);
    vp.set_ratio(0.5);
    assert!(surface.is_empty());
}

// =============================================================================
// Zoom
// =============================================================================

#[tokio::test]
async fn test_zoom_out_uses_scaled_smallest_level() {
    let mut vp = viewport(500, 400);
    let (layer, surface, _) = folio_layer(&folio_descriptor());
    let id = vp.add_layer(layer).await;

    assert_eq!(vp.set_ratio(0.05), 0.05);

    let source = vp.layer(id).unwrap().source();
    assert_eq!(source.level().unwrap(), 2);
    assert!((source.adjust().unwrap() - 0.2).abs() < 1e-12);

    let tiles = surface.tiles();
    assert_eq!(tiles.len(), 1);
    assert_eq!(tiles[0].id, TileId::new("folio", 2, 0, 0));
    assert_eq!((tiles[0].width, tiles[0].height), (50, 40));
}

#[tokio::test]
async fn test_zoom_keeps_center() {
    let mut vp = viewport(500, 400);
    let (layer, _, _) = folio_layer(&big_descriptor());
    vp.add_layer(layer).await;

    vp.set_center(2000.0, 2000.0);
    assert_eq!(vp.center(), Some((Some(2000.0), Some(2000.0))));

    vp.set_ratio(0.5);
    assert_eq!(vp.center(), Some((Some(2000.0), Some(2000.0))));
    let state = vp.state();
    assert_eq!((state.pan_x, state.pan_y), (-750.0, -800.0));
}

#[tokio::test]
async fn test_zoom_steps_switch_levels() {
    let mut vp = viewport(500, 400);
    let (layer, _, _) = folio_layer(&folio_descriptor());
    let id = vp.add_layer(layer).await;
    vp.set_ratio(0.5);

    let ratio = vp.zoom_in(false);
    assert!((ratio - 0.6).abs() < 1e-9);
    let source = vp.layer(id).unwrap().source();
    assert_eq!(source.level().unwrap(), 1);
    assert!((source.adjust().unwrap() - 1.2).abs() < 1e-9);

    let ratio = vp.zoom_out(true);
    assert!((ratio - 0.59).abs() < 1e-9);
}

#[tokio::test]
async fn test_fit_layer() {
    let mut vp = viewport(500, 400);
    let (layer, surface, _) = folio_layer(&folio_descriptor());
    let id = vp.add_layer(layer).await;

    assert_eq!(vp.fit_layer(id).unwrap(), Some(0.5));
    assert_eq!(vp.layer(id).unwrap().source().level().unwrap(), 1);
    assert_eq!(surface.len(), 4);

    vp.hide();
    assert_eq!(vp.fit_layer(id).unwrap(), None);
}

// =============================================================================
// Pan and Resize
// =============================================================================

#[tokio::test]
async fn test_pan_repaints_and_stays_in_bounds() {
    let mut vp = viewport(500, 400);
    let (events, observer) = recorder::<ViewportEvent>();
    let (layer, surface, _) = folio_layer(&big_descriptor());
    vp.add_layer(layer).await;
    vp.subscribe(observer);

    vp.pan_by(-1024.0, -1024.0);
    assert_eq!(surface.len(), 25);
    assert!(surface.tile(&TileId::new("folio", 0, 7, 7)).is_some());
    assert!(surface.tile(&TileId::new("folio", 0, 0, 0)).is_none());
    assert_eq!(
        events.borrow().last(),
        Some(&ViewportEvent::PanChanged {
            x: -1024.0,
            y: -1024.0
        })
    );

    vp.pan_to(-100_000.0, -100_000.0);
    let state = vp.state();
    assert_eq!((state.pan_x, state.pan_y), (-3500.0, -3600.0));
    assert!(surface.tile(&TileId::new("folio", 0, 15, 15)).is_some());
}

#[tokio::test]
async fn test_frame_resize_forces_repaint() {
    let mut vp = viewport(200, 200);
    let (layer, surface, _) = folio_layer(&folio_descriptor());
    vp.add_layer(layer).await;

    // Visible 0..1 plus ring.
    assert_eq!(surface.len(), 9);

    vp.set_frame_size(600, 600);
    assert_eq!(surface.len(), 16);
    assert_eq!(vp.bounds().min_left, -400.0);
}

// =============================================================================
// Layer Management
// =============================================================================

#[tokio::test]
async fn test_remove_layer_keep_returns_hidden_layer() {
    let mut vp = viewport(500, 400);
    let (layer, surface, _) = folio_layer(&folio_descriptor());
    let id = vp.add_layer(layer).await;
    let (events, observer) = recorder::<ViewportEvent>();
    vp.subscribe(observer);

    let kept = vp.remove_layer(id, true).unwrap().unwrap();
    assert!(!kept.is_visible());
    assert_eq!(kept.state(), LayerState::Ready);
    assert!(surface.is_empty());
    assert!(!vp.has_layer(id));
    assert_eq!(*events.borrow(), vec![ViewportEvent::LayerRemoved(id)]);

    // The kept layer can be attached again.
    let again = vp.add_layer(kept).await;
    assert_ne!(again, id);
    assert_eq!(surface.len(), 16);
}

#[tokio::test]
async fn test_remove_layer_destroys() {
    let mut vp = viewport(500, 400);
    let (mut layer, surface, _) = folio_layer(&folio_descriptor());
    let (layer_events, observer) = recorder::<LayerEvent>();
    layer.subscribe(observer);
    let id = vp.add_layer(layer).await;

    assert!(vp.remove_layer(id, false).unwrap().is_none());
    assert!(surface.is_empty());
    assert_eq!(layer_events.borrow().last(), Some(&LayerEvent::Destroyed));
    assert!(vp.remove_layer(id, false).is_err());
}

#[tokio::test]
async fn test_hide_and_show() {
    let mut vp = viewport(500, 400);
    let (layer, surface, _) = folio_layer(&folio_descriptor());
    vp.add_layer(layer).await;
    assert_eq!(surface.len(), 16);

    vp.hide();
    assert!(surface.is_empty());
    assert!(!surface.is_visible());
    assert!(vp.center().is_none());

    vp.show();
    assert_eq!(surface.len(), 16);
    assert!(surface.is_visible());
}

#[tokio::test]
async fn test_destroy_tears_down_layers() {
    let mut vp = viewport(500, 400);
    let (mut layer, surface, _) = folio_layer(&folio_descriptor());
    let (layer_events, observer) = recorder::<LayerEvent>();
    layer.subscribe(observer);
    vp.add_layer(layer).await;

    let (events, observer) = recorder::<ViewportEvent>();
    vp.subscribe(observer);
    vp.destroy();

    assert!(surface.is_empty());
    assert_eq!(layer_events.borrow().last(), Some(&LayerEvent::Destroyed));
    assert_eq!(events.borrow().last(), Some(&ViewportEvent::Destroyed));
}

#[tokio::test]
async fn test_hidden_viewport_keeps_layers_hidden() {
    let mut vp = ViewportController::new(ViewportConfig {
        frame_width: 500,
        frame_height: 400,
        content_width: 1,
        content_height: 1,
        visible: false,
        ..Default::default()
    })
    .unwrap();
    let (mut layer, surface, _) = folio_layer(&folio_descriptor());
    let (layer_events, observer) = recorder::<LayerEvent>();
    layer.subscribe(observer);

    let id = vp.add_layer(layer).await;
    assert_eq!(vp.state().content_width, 1000);
    assert!(!vp.layer(id).unwrap().is_visible());
    assert!(!surface.is_visible());
    assert!(surface.is_empty());

    vp.set_ratio(0.5);
    vp.set_frame_size(600, 400);
    assert!(!vp.layer(id).unwrap().is_visible());
    assert!(!surface.is_visible());
    assert!(surface.is_empty());

    vp.show();
    assert!(vp.layer(id).unwrap().is_visible());
    assert!(surface.is_visible());
    assert_eq!(vp.layer(id).unwrap().source().level().unwrap(), 1);
    assert_eq!(surface.len(), 4);
    assert_eq!(
        layer_events
            .borrow()
            .iter()
            .filter(|e| **e == LayerEvent::Shown)
            .count(),
        1
    );
}

#[tokio::test]
async fn test_zoom_while_hidden_does_not_show_layers() {
    let mut vp = viewport(500, 400);
    let (mut layer, surface, _) = folio_layer(&folio_descriptor());
    let (layer_events, observer) = recorder::<LayerEvent>();
    layer.subscribe(observer);
    let id = vp.add_layer(layer).await;

    vp.hide();
    vp.set_ratio(0.5);
    assert!(!vp.layer(id).unwrap().is_visible());
    assert!(!surface.is_visible());
    assert!(surface.is_empty());

    vp.show();
    assert_eq!(surface.len(), 4);
    assert_eq!(layer_events.borrow().last(), Some(&LayerEvent::Shown));
}
