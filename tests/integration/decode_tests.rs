//! End-to-end tests running the real worker decode service and codecs
//! underneath the tile tree.

use std::sync::Arc;

use tokio::sync::mpsc;

use page_tiler::{
    AtomicProgress, DecodeService, DecodingProgress, Page, RectF, SharedZoom, SimplePage,
    SplitPolicy, SurfaceCache, SyntheticCodec, TileTree, ViewContext, FixedViewport,
    WorkerDecodeService,
};

const VIEW_WIDTH: u32 = 200;

struct LiveView {
    zoom: Arc<SharedZoom>,
    progress: Arc<AtomicProgress>,
    surfaces: Arc<SurfaceCache>,
    page: Arc<SimplePage>,
    tree: TileTree,
}

fn live_view(zoom: f32, aspect: f32) -> LiveView {
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let decoder: Arc<dyn DecodeService> = Arc::new(WorkerDecodeService::new(
        SyntheticCodec::new(aspect),
        events_tx,
    ));
    let shared_zoom = Arc::new(SharedZoom::new(zoom));
    let progress = Arc::new(AtomicProgress::new());
    let surfaces = Arc::new(SurfaceCache::new());

    let ctx = Arc::new(
        ViewContext::new(
            decoder,
            Arc::clone(&shared_zoom) as _,
            Arc::new(FixedViewport(VIEW_WIDTH)),
        )
        .with_surfaces(Arc::clone(&surfaces))
        .with_progress(Arc::clone(&progress) as _),
    );

    let page = Arc::new(SimplePage::new(0, aspect));
    page.set_bounds(RectF::new(0.0, 0.0, VIEW_WIDTH as f32, VIEW_WIDTH as f32 / aspect));

    let tree = TileTree::new(
        ctx,
        Arc::clone(&page) as Arc<dyn Page>,
        1.0,
        SplitPolicy::Zoom,
        events_rx,
    );

    LiveView {
        zoom: shared_zoom,
        progress,
        surfaces,
        page,
        tree,
    }
}

impl LiveView {
    /// Apply completions and re-reconcile until no decode is outstanding.
    async fn settle(&mut self) {
        while self.progress.current() > 0 {
            assert!(
                self.tree.next_completion().await,
                "decode service shut down with work outstanding"
            );
            self.tree.pump_completions();
            self.tree.update_visibility();
        }
    }
}

#[tokio::test]
async fn test_root_decode_round_trip() {
    let mut view = live_view(1.0, 2.0);
    view.tree.update_visibility();
    assert_eq!(view.progress.current(), 1);

    view.settle().await;

    let root = view.tree.root();
    assert!(root.has_surface());
    assert!(!root.is_decoding());

    // The synthetic page is 200x100 at zoom 1.0; the measured aspect ratio
    // flows back to the page.
    let surface = view.surfaces.get(root.id()).expect("surface cached");
    assert_eq!(surface.width(), 200);
    assert_eq!(surface.height(), 100);
    assert_eq!(view.page.aspect_ratio(), 2.0);
}

#[tokio::test]
async fn test_zoom_in_settles_with_children_covering_root() {
    let mut view = live_view(1.0, 1.0);
    view.tree.update_visibility();
    view.settle().await;
    assert!(view.tree.root().has_surface());

    // Zoom past the threshold: children decode, and once all four cover
    // the root its coarse surface is reclaimed.
    view.zoom.set(1.5);
    view.tree.update_visibility();
    view.settle().await;

    let root = view.tree.root();
    let children = root.children().expect("root split at zoom 1.5");
    assert!(children.iter().all(|child| child.has_surface()));
    assert!(!root.has_surface());
    assert_eq!(view.surfaces.len(), 4);
}

#[tokio::test]
async fn test_invalidate_redecodes_through_worker() {
    let mut view = live_view(1.0, 1.0);
    view.tree.update_visibility();
    view.settle().await;

    view.tree.invalidate();
    assert!(view.tree.root().is_stale());
    assert_eq!(view.progress.current(), 1);

    view.settle().await;
    assert!(!view.tree.root().is_stale());
    assert!(view.tree.root().has_surface());
}

#[tokio::test]
async fn test_hidden_page_stays_idle() {
    let mut view = live_view(1.0, 1.0);
    view.page.set_kept_in_memory(false);
    view.tree.update_visibility();

    assert_eq!(view.progress.current(), 0);
    assert!(view.surfaces.is_empty());
    assert!(view.tree.root().children().is_none());
}
