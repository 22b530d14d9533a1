//! Test utilities for integration tests.
//!
//! This module provides a mock descriptor fetcher with request tracking and
//! helpers for building descriptors, sources, layers and viewports.

use async_trait::async_trait;
use bytes::Bytes;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use zoompane::error::TransportError;
use zoompane::io::DescriptorFetcher;
use zoompane::{
    PathTemplateScheme, PyramidSource, QueryApiScheme, RecordingSurface, RenderLayer,
    ViewportConfig, ViewportController,
};

/// Base location used by [`folio_source`].
pub const FOLIO_BASE: &str = "http://tiles.test/folio";

// =============================================================================
// Mock Fetcher with Request Tracking
// =============================================================================

/// A mock fetcher serving descriptors from memory.
///
/// Clones share the same documents and request log.
#[derive(Clone, Default)]
pub struct MockFetcher {
    documents: Arc<Mutex<HashMap<String, Bytes>>>,
    request_count: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(self, location: impl Into<String>, body: impl Into<String>) -> Self {
        if let Ok(mut docs) = self.documents.lock() {
            docs.insert(location.into(), Bytes::from(body.into()));
        }
        self
    }

    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl DescriptorFetcher for MockFetcher {
    async fn fetch(&self, location: &str) -> Result<Bytes, TransportError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(location.to_string());
        }

        self.documents
            .lock()
            .ok()
            .and_then(|docs| docs.get(location).cloned())
            .ok_or_else(|| TransportError::NotFound(location.to_string()))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// =============================================================================
// Descriptor Builders
// =============================================================================

/// Descriptor for a `width` x `height` image with square `tile` tiles and
/// one level per entry of `ratios`.
pub fn descriptor_json(width: u32, height: u32, tile: u32, ratios: &[f64]) -> String {
    let levels: Vec<serde_json::Value> = ratios
        .iter()
        .map(|ratio| {
            let w = (width as f64 * ratio).round() as u32;
            let h = (height as f64 * ratio).round() as u32;
            serde_json::json!({
                "ratio": ratio,
                "width": w,
                "height": h,
                "numRows": h.div_ceil(tile),
                "numCols": w.div_ceil(tile),
            })
        })
        .collect();

    serde_json::json!({
        "name": "folio",
        "width": width,
        "height": height,
        "tileWidth": tile,
        "tileHeight": tile,
        "levels": levels,
        "thumbnail": { "url": "thumb.jpeg", "width": 100, "height": 80 },
    })
    .to_string()
}

/// The 1000 x 800 pyramid with 256 px tiles used throughout the tests.
pub fn folio_descriptor() -> String {
    descriptor_json(1000, 800, 256, &[1.0, 0.5, 0.25])
}

// =============================================================================
// Component Builders
// =============================================================================

/// Path-templated source for `body`, served at [`FOLIO_BASE`].
pub fn folio_source(body: &str) -> (PyramidSource, MockFetcher) {
    let fetcher = MockFetcher::new().with_document(format!("{}/info.json", FOLIO_BASE), body);
    let scheme = PathTemplateScheme::new(FOLIO_BASE).unwrap();
    let source = PyramidSource::new("folio", Box::new(scheme), Arc::new(fetcher.clone()));
    (source, fetcher)
}

/// Query-API source for `body`.
pub fn api_source(api: &str, id: &str, body: &str) -> (PyramidSource, MockFetcher) {
    let scheme = QueryApiScheme::new(api, id).unwrap();
    let fetcher = MockFetcher::new().with_document(
        zoompane::UrlScheme::config_url(&scheme),
        body,
    );
    let source = PyramidSource::new(id, Box::new(scheme), Arc::new(fetcher.clone()));
    (source, fetcher)
}

/// Layer over [`folio_source`] and a handle to its surface.
pub fn folio_layer(body: &str) -> (RenderLayer, RecordingSurface, MockFetcher) {
    let (source, fetcher) = folio_source(body);
    let surface = RecordingSurface::new();
    let layer = RenderLayer::new("folio", source, Box::new(surface.clone()));
    (layer, surface, fetcher)
}

/// Visible viewport with the given frame and 1 x 1 initial content.
pub fn viewport(frame_width: u32, frame_height: u32) -> ViewportController {
    ViewportController::new(ViewportConfig {
        frame_width,
        frame_height,
        content_width: 1,
        content_height: 1,
        ..Default::default()
    })
    .unwrap()
}

/// Collect every event an observer sees.
pub fn recorder<E: Clone + 'static>() -> (Rc<RefCell<Vec<E>>>, impl FnMut(&E) + 'static) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    (seen, move |event: &E| sink.borrow_mut().push(event.clone()))
}
