//! Pyramid source integration tests.
//!
//! Tests verify:
//! - Descriptor loading through mock, file and routing fetchers
//! - Closest-level selection and the adjust factor
//! - Tile URLs for both URL schemes
//! - Failure handling and fire-once readiness

use std::sync::Arc;

use zoompane::{
    FileFetcher, PathTemplateScheme, PyramidSource, RoutingFetcher, SourceError, SourceEvent,
    TileId, TileLayout,
};

use super::test_utils::{
    api_source, descriptor_json, folio_descriptor, folio_source, recorder, MockFetcher,
    FOLIO_BASE,
};

// =============================================================================
// Configuration
// =============================================================================

#[tokio::test]
async fn test_configure_fetches_descriptor_once() {
    let (mut source, fetcher) = folio_source(&folio_descriptor());
    let (events, observer) = recorder::<SourceEvent>();
    source.subscribe(observer);

    source.configure().await.unwrap();
    source.configure().await.unwrap();

    assert_eq!(fetcher.request_count(), 1);
    assert_eq!(fetcher.requests(), vec![format!("{}/info.json", FOLIO_BASE)]);
    assert_eq!(*events.borrow(), vec![SourceEvent::Ready]);

    // Late observers still learn the source is ready.
    let (late, observer) = recorder::<SourceEvent>();
    source.subscribe(observer);
    assert_eq!(*late.borrow(), vec![SourceEvent::Ready]);
}

#[tokio::test]
async fn test_ready_source_starts_at_last_level() {
    let (mut source, _) = folio_source(&folio_descriptor());
    source.configure().await.unwrap();

    assert_eq!(source.level().unwrap(), 2);
    assert_eq!(source.max_level().unwrap(), 2);
    assert_eq!(source.ratio().unwrap(), 0.25);
    assert_eq!(source.adjust().unwrap(), 1.0);
    assert_eq!((source.width().unwrap(), source.height().unwrap()), (250, 200));
    assert_eq!(
        (source.abs_width().unwrap(), source.abs_height().unwrap()),
        (1000, 800)
    );
    assert_eq!(source.thumbnail().unwrap().unwrap().url, "thumb.jpeg");
}

#[tokio::test]
async fn test_accessors_before_ready() {
    let (source, fetcher) = folio_source(&folio_descriptor());

    assert!(matches!(source.level(), Err(SourceError::NotReady { .. })));
    assert!(matches!(
        source.tile_url(0, 0, None),
        Err(SourceError::NotReady { .. })
    ));
    assert_eq!(source.config_url(), format!("{}/info.json", FOLIO_BASE));
    assert_eq!(fetcher.request_count(), 0);
}

#[tokio::test]
async fn test_missing_descriptor_fails() {
    let scheme = PathTemplateScheme::new("http://tiles.test/missing").unwrap();
    let mut source = PyramidSource::new("missing", Box::new(scheme), Arc::new(MockFetcher::new()));

    let (events, observer) = recorder::<SourceEvent>();
    source.subscribe(observer);

    let err = source.configure().await.unwrap_err();
    assert!(matches!(err, SourceError::ConfigFailed { .. }));
    assert!(err.to_string().contains("missing"));
    assert!(!source.is_ready());
    assert!(matches!(
        events.borrow().as_slice(),
        [SourceEvent::ConfigFailed { .. }]
    ));
}

#[tokio::test]
async fn test_invalid_descriptor_fails() {
    let (mut source, _) = folio_source(
        r#"{"width": 100, "height": 100, "tileWidth": 256, "tileHeight": 256, "levels": []}"#,
    );
    assert!(source.configure().await.is_err());
    assert!(source.failure().unwrap().contains("levels"));
}

// =============================================================================
// Level Selection
// =============================================================================

#[tokio::test]
async fn test_set_ratio_picks_closest_level() {
    let (mut source, _) = folio_source(&folio_descriptor());
    source.configure().await.unwrap();

    source.set_ratio(0.05).unwrap();
    assert_eq!(source.level().unwrap(), 2);
    assert!((source.adjust().unwrap() - 0.2).abs() < 1e-12);

    source.set_ratio(0.4).unwrap();
    assert_eq!(source.level().unwrap(), 1);
    assert!((source.adjust().unwrap() - 0.8).abs() < 1e-12);
    assert_eq!(source.width().unwrap(), 400);

    source.set_ratio(1.0).unwrap();
    assert_eq!(source.level().unwrap(), 0);
    assert_eq!(source.adjust().unwrap(), 1.0);
}

#[tokio::test]
async fn test_equidistant_ratio_prefers_lower_index() {
    let (mut source, _) = folio_source(&descriptor_json(1000, 800, 256, &[1.0, 0.5]));
    source.configure().await.unwrap();

    source.set_ratio(0.75).unwrap();
    assert_eq!(source.level().unwrap(), 0);
}

#[tokio::test]
async fn test_set_level_out_of_range_clamps() {
    let (mut source, _) = folio_source(&folio_descriptor());
    source.configure().await.unwrap();

    assert_eq!(source.set_level(99).unwrap(), 2);
    assert_eq!(source.set_level(0).unwrap(), 0);
    assert_eq!(source.width().unwrap(), 1000);
}

// =============================================================================
// Tile Addressing
// =============================================================================

#[tokio::test]
async fn test_path_template_tile_urls() {
    let (mut source, _) = folio_source(&folio_descriptor());
    source.configure().await.unwrap();
    source.set_level(0).unwrap();

    assert_eq!(
        source.tile_url(3, 1, None).unwrap(),
        format!("{}/0/1-3.jpeg", FOLIO_BASE)
    );
    assert!(source.tile_url(4, 0, None).unwrap_err().is_out_of_range());
}

#[tokio::test]
async fn test_query_api_tile_urls() {
    let (mut source, fetcher) =
        api_source("http://api.test/tiles", "folio 12r", &folio_descriptor());
    source.configure().await.unwrap();

    assert_eq!(
        fetcher.requests(),
        vec!["http://api.test/tiles?id=folio%2012r&info".to_string()]
    );
    assert_eq!(
        source.tile_url(0, 1, Some(1)).unwrap(),
        "http://api.test/tiles?id=folio%2012r&l=1&r=0&c=1"
    );
}

#[tokio::test]
async fn test_layout_at_full_resolution() {
    let (mut source, _) = folio_source(&folio_descriptor());
    source.configure().await.unwrap();
    source.set_ratio(1.0).unwrap();

    let layout = TileLayout::from_source(&source).unwrap();
    assert_eq!(layout.tile_rect(3, 3).unwrap(), (768, 768, 232, 32));
    assert_eq!(layout.tile_rect(0, 0).unwrap(), (0, 0, 256, 256));
    assert_eq!(
        TileId::new(source.id().clone(), 0, 3, 3).to_string(),
        "folio__0:3-3"
    );
}

#[tokio::test]
async fn test_single_column_level_spans_width() {
    let (mut source, _) = folio_source(&descriptor_json(200, 1000, 256, &[1.0]));
    source.configure().await.unwrap();

    let layout = TileLayout::from_source(&source).unwrap();
    assert_eq!(layout.num_cols, 1);
    let (_, _, width, _) = layout.tile_rect(2, 0).unwrap();
    assert_eq!(width, 200);
}

// =============================================================================
// Transport
// =============================================================================

#[tokio::test]
async fn test_file_fetcher_loads_descriptor() {
    let dir = std::env::temp_dir().join(format!("zoompane-src-{}", std::process::id()));
    tokio::fs::create_dir_all(&dir).await.unwrap();
    tokio::fs::write(dir.join("info.json"), folio_descriptor())
        .await
        .unwrap();

    let base = dir.to_string_lossy().to_string();
    let scheme = PathTemplateScheme::new(base.as_str()).unwrap();

    let mut via_file = PyramidSource::new(
        "local",
        Box::new(scheme.clone()),
        Arc::new(FileFetcher::new()),
    );
    via_file.configure().await.unwrap();
    assert_eq!(via_file.abs_width().unwrap(), 1000);

    let mut via_router =
        PyramidSource::new("local", Box::new(scheme), Arc::new(RoutingFetcher::new()));
    via_router.configure().await.unwrap();
    assert!(via_router.same_image(&via_file));

    tokio::fs::remove_dir_all(&dir).await.unwrap();
}
