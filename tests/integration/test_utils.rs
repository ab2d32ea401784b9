//! Shared helpers for integration tests.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use page_tiler::{
    AtomicProgress, CountingRedraw, DecodeEvent, DecodeRequest, DecodeService, Page, RasterSurface,
    SharedBrightness, SharedZoom, SimplePage, SplitPolicy, SurfaceCache, TileId, TileNode,
    TileTree, ViewContext, FixedViewport,
};

/// Default viewport width used by the test views.
pub const VIEW_WIDTH: u32 = 800;

// =============================================================================
// Recording Decode Service
// =============================================================================

/// Decode service that records requests and cancellations instead of
/// decoding, so tests deliver completions by hand.
#[derive(Default)]
pub struct RecordingService {
    requests: Mutex<Vec<DecodeRequest>>,
    stops: Mutex<Vec<(TileId, String)>>,
}

impl RecordingService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn stop_count(&self) -> usize {
        self.stops.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<DecodeRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

impl DecodeService for RecordingService {
    fn decode_page(&self, request: DecodeRequest) {
        self.requests.lock().unwrap().push(request);
    }

    fn stop_decoding(&self, tile: &TileId, reason: &str) {
        self.stops
            .lock()
            .unwrap()
            .push((tile.clone(), reason.to_string()));
    }
}

// =============================================================================
// Test View
// =============================================================================

/// A tile tree wired to stub collaborators, with every handle exposed.
pub struct TestView {
    pub service: Arc<RecordingService>,
    pub zoom: Arc<SharedZoom>,
    pub brightness: Arc<SharedBrightness>,
    pub redraw: Arc<CountingRedraw>,
    pub progress: Arc<AtomicProgress>,
    pub surfaces: Arc<SurfaceCache>,
    pub page: Arc<SimplePage>,
    pub events: mpsc::UnboundedSender<DecodeEvent>,
    pub tree: TileTree,
}

/// Build a test view with the given zoom, root threshold and policy.
///
/// The page starts kept-in-memory with aspect ratio 1.0 and layout bounds
/// matching the viewport.
pub fn build_view(zoom: f32, threshold: f32, policy: SplitPolicy) -> TestView {
    build_view_with_cache(zoom, threshold, policy, Arc::new(SurfaceCache::new()))
}

/// Same as [`build_view`], with a caller-provided surface cache.
pub fn build_view_with_cache(
    zoom: f32,
    threshold: f32,
    policy: SplitPolicy,
    surfaces: Arc<SurfaceCache>,
) -> TestView {
    let service = Arc::new(RecordingService::new());
    let shared_zoom = Arc::new(SharedZoom::new(zoom));
    let brightness = Arc::new(SharedBrightness::full());
    let redraw = Arc::new(CountingRedraw::new());
    let progress = Arc::new(AtomicProgress::new());
    let (events_tx, events_rx) = mpsc::unbounded_channel();

    let ctx = Arc::new(
        ViewContext::new(
            Arc::clone(&service) as Arc<dyn DecodeService>,
            Arc::clone(&shared_zoom) as _,
            Arc::new(FixedViewport(VIEW_WIDTH)),
        )
        .with_surfaces(Arc::clone(&surfaces))
        .with_progress(Arc::clone(&progress) as _)
        .with_redraw(Arc::clone(&redraw) as _)
        .with_brightness(Arc::clone(&brightness) as _),
    );

    let page = Arc::new(SimplePage::new(0, 1.0));
    page.set_bounds(page_tiler::RectF::new(
        0.0,
        0.0,
        VIEW_WIDTH as f32,
        VIEW_WIDTH as f32,
    ));

    let tree = TileTree::new(
        ctx,
        Arc::clone(&page) as Arc<dyn Page>,
        threshold,
        policy,
        events_rx,
    );

    TestView {
        service,
        zoom: shared_zoom,
        brightness,
        redraw,
        progress,
        surfaces,
        page,
        events: events_tx,
        tree,
    }
}

impl TestView {
    /// Deliver a successful decode for a tile and apply it.
    pub fn complete(&mut self, tile: TileId, surface: RasterSurface) {
        self.events
            .send(DecodeEvent {
                tile,
                outcome: Ok(surface),
            })
            .expect("tree dropped its receiver");
        self.tree.pump_completions();
    }

    /// Identities of the root's direct children.
    pub fn child_ids(&self) -> Vec<TileId> {
        self.tree
            .root()
            .children()
            .expect("root has no children")
            .iter()
            .map(|child| child.id().clone())
            .collect()
    }
}

// =============================================================================
// Surfaces
// =============================================================================

/// A square surface of a single color.
pub fn solid_surface(side: u32, rgba: [u8; 4]) -> RasterSurface {
    let mut pixels = Vec::with_capacity((side * side * 4) as usize);
    for _ in 0..side * side {
        pixels.extend_from_slice(&rgba);
    }
    RasterSurface::new(side, side, pixels)
}

/// A square opaque grey surface.
pub fn grey_surface(side: u32) -> RasterSurface {
    solid_surface(side, [128, 128, 128, 255])
}

/// Count the tiles currently alive in a subtree.
pub fn count_tiles(node: &TileNode) -> usize {
    1 + node
        .children()
        .map(|children| children.iter().map(count_tiles).sum())
        .unwrap_or(0)
}
