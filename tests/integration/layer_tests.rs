//! Render layer integration tests.
//!
//! Tests verify:
//! - The buffered visible range materializes the right tiles
//! - Repainting without movement is a no-op
//! - Resets on ratio change replace the whole tile set
//! - Unmeasurable regions and unready sources never paint

use zoompane::{
    LayerEvent, LayerState, Region, RegionProvider, RegionSnapshot, Span, TileId,
};

use super::test_utils::{descriptor_json, folio_descriptor, folio_layer, recorder};

fn snapshot(frame: (f64, f64), pane_origin: (f64, f64), pane: (u32, u32)) -> RegionSnapshot {
    RegionSnapshot::new(
        Region::from_origin_size(0.0, 0.0, frame.0, frame.1),
        Region::from_origin_size(pane_origin.0, pane_origin.1, pane.0 as f64, pane.1 as f64),
    )
}

/// Host whose layout cannot be measured yet.
struct Detached;

impl RegionProvider for Detached {
    fn viewport_region(&self) -> Option<Region> {
        None
    }

    fn pane_region(&self) -> Option<Region> {
        Some(Region::from_origin_size(0.0, 0.0, 1000.0, 800.0))
    }
}

#[tokio::test]
async fn test_full_resolution_paint_covers_grid() {
    let (mut layer, surface, _) = folio_layer(&folio_descriptor());
    assert_eq!(layer.configure().await, LayerState::Ready);

    layer.show(1.0, &snapshot((500.0, 400.0), (0.0, 0.0), (1000, 800)), true);

    let range = layer.visible_range();
    assert_eq!(range.rows, Span::new(0, 2));
    assert_eq!(range.cols, Span::new(0, 2));
    assert_eq!(surface.len(), 16);
    assert_eq!(layer.tiles().len(), 16);

    let corner = surface.tile(&TileId::new("folio", 0, 3, 3)).unwrap();
    assert_eq!(
        (corner.x, corner.y, corner.width, corner.height),
        (768, 768, 232, 32)
    );
    assert_eq!(corner.url, "http://tiles.test/folio/0/3-3.jpeg");
}

#[tokio::test]
async fn test_panning_replaces_tiles_outside_ring() {
    let (mut layer, surface, _) = folio_layer(&descriptor_json(4000, 4000, 256, &[1.0]));
    layer.configure().await;
    layer.show(1.0, &snapshot((500.0, 400.0), (0.0, 0.0), (4000, 4000)), true);
    assert_eq!(surface.len(), 16);

    let (events, observer) = recorder::<LayerEvent>();
    layer.subscribe(observer);

    let result = layer
        .paint(
            &snapshot((500.0, 400.0), (-1024.0, -1024.0), (4000, 4000)),
            false,
        )
        .unwrap();

    assert_eq!(result.removed.len(), 15);
    assert_eq!(result.added.len(), 24);
    assert_eq!(surface.len(), 25);
    assert!(layer.tiles().contains(&TileId::new("folio", 0, 3, 3)));
    assert!(!layer.tiles().contains(&TileId::new("folio", 0, 0, 0)));
    // Ready fires once and is replayed to this late subscriber first.
    assert!(matches!(
        events.borrow().as_slice(),
        [
            LayerEvent::Ready,
            LayerEvent::TileSetChanged { added, removed },
        ] if added.len() == 24 && removed.len() == 15
    ));
}

#[tokio::test]
async fn test_repaint_without_movement_is_noop() {
    let (mut layer, surface, _) = folio_layer(&folio_descriptor());
    layer.configure().await;
    let regions = snapshot((500.0, 400.0), (0.0, 0.0), (1000, 800));
    layer.show(1.0, &regions, true);
    let placed = surface.placed_count();

    assert!(layer.paint(&regions, false).is_none());
    let forced = layer.paint(&regions, true).unwrap();
    assert!(forced.is_unchanged());
    assert_eq!(surface.placed_count(), placed);
    assert_eq!(surface.removed_count(), 0);
}

#[tokio::test]
async fn test_low_ratio_uses_scaled_smallest_level() {
    let (mut layer, surface, _) = folio_layer(&folio_descriptor());
    layer.configure().await;

    layer.show(0.05, &snapshot((500.0, 400.0), (0.0, 0.0), (50, 40)), true);

    assert_eq!(layer.pane_size(), (50, 40));
    let tiles = surface.tiles();
    assert_eq!(tiles.len(), 1);
    assert_eq!(tiles[0].id, TileId::new("folio", 2, 0, 0));
    assert_eq!((tiles[0].width, tiles[0].height), (50, 40));
}

#[tokio::test]
async fn test_reset_swaps_level() {
    let (mut layer, surface, _) = folio_layer(&folio_descriptor());
    layer.configure().await;
    layer.show(1.0, &snapshot((500.0, 400.0), (0.0, 0.0), (1000, 800)), true);

    layer.reset(0.5).unwrap();
    assert!(surface.is_empty());
    assert_eq!(surface.pane_size(), Some((500, 400)));

    layer.paint(&snapshot((500.0, 400.0), (0.0, 0.0), (500, 400)), false);
    assert_eq!(surface.len(), 4);
    assert!(surface.tile_ids().iter().all(|id| id.level == 1));
}

#[tokio::test]
async fn test_unmeasurable_host_does_not_paint() {
    let (mut layer, surface, _) = folio_layer(&folio_descriptor());
    layer.configure().await;

    layer.show(1.0, &Detached, true);
    assert!(layer.paint(&Detached, true).is_none());
    assert!(surface.is_empty());
    assert_eq!(layer.visible_range().rows, Span::UNSET);
}

#[tokio::test]
async fn test_unready_layer_does_not_paint() {
    let (mut layer, surface, fetcher) = folio_layer(&folio_descriptor());

    layer.show(1.0, &snapshot((500.0, 400.0), (0.0, 0.0), (1000, 800)), false);
    assert!(!layer.is_visible());
    assert!(layer.reset(1.0).is_err());
    assert!(surface.is_empty());
    assert_eq!(fetcher.request_count(), 0);
}
