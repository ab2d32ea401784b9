//! # page-tiler
//!
//! Level-of-detail tile rendering for large paginated raster content.
//!
//! This library manages the tiles of document pages that are too large to
//! decode at native resolution: each visible page is decomposed into a
//! recursively-refined quad-tree of rectangular tiles, and every tile is
//! independently decoded off-thread, cached, and evicted according to zoom
//! and visibility.
//!
//! ## Features
//!
//! - **Quad-tree refinement**: tiles split into four children when a zoom
//!   threshold (or per-tile area ceiling) is crossed, and are pruned when
//!   their subtree holds no pixels
//! - **Asynchronous decoding**: fire-and-forget decode requests on a tokio
//!   worker pool, with completions marshalled back to the tree's thread
//!   through a message queue
//! - **Coverage-driven eviction**: a tile's pixels are released the moment
//!   its four children fully cover it at higher resolution
//! - **Reclaimable caching**: decoded surfaces live in a size-bounded LRU
//!   cache that may drop any entry under pressure; a reclaimed surface is
//!   simply re-decoded when needed
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`tile`] - The quad-tree engine: nodes, split policies, surface cache
//! - [`decode`] - Decode service, worker pool, and page codecs
//! - [`page`] - The page collaborator boundary
//! - [`view`] - Driver-side collaborators: zoom, viewport, progress, redraw
//! - [`render`] - Canvas boundary and software rasterizer
//! - [`geom`] - Rectangles and the slice-bounds transform
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use page_tiler::{
//!     FixedViewport, SharedZoom, SimplePage, SplitPolicy, SyntheticCodec, TileTree,
//!     ViewContext, WorkerDecodeService,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let (events_tx, events_rx) = tokio::sync::mpsc::unbounded_channel();
//!     let decoder = Arc::new(WorkerDecodeService::new(SyntheticCodec::new(0.8), events_tx));
//!     let zoom = Arc::new(SharedZoom::new(1.0));
//!     let ctx = Arc::new(ViewContext::new(
//!         decoder,
//!         Arc::clone(&zoom) as _,
//!         Arc::new(FixedViewport(800)),
//!     ));
//!
//!     let page = Arc::new(SimplePage::new(0, 0.8));
//!     let mut tree = TileTree::new(ctx, page, 1.0, SplitPolicy::Zoom, events_rx);
//!
//!     // Zoom changed: reconcile the tree, then apply completions as the
//!     // decoders finish.
//!     zoom.set(2.5);
//!     tree.update_visibility();
//!     tree.next_completion().await;
//! }
//! ```

pub mod config;
pub mod decode;
pub mod error;
pub mod geom;
pub mod page;
pub mod render;
pub mod surface;
pub mod tile;
pub mod view;

// Re-export commonly used types
pub use config::{Config, PolicyArg, DEFAULT_VIEW_HEIGHT, DEFAULT_VIEW_WIDTH};
pub use decode::{
    DecodeEvent, DecodeRequest, DecodeService, JpegPageCodec, PageCodec, SyntheticCodec,
    WorkerDecodeService,
};
pub use error::DecodeError;
pub use geom::{Rect, RectF, Transform, QUADRANTS};
pub use page::{Page, SimplePage};
pub use render::{Canvas, PaintStyle, Rgba, SoftwareCanvas};
pub use surface::RasterSurface;
pub use tile::{
    SplitPolicy, SurfaceCache, TileId, TileNode, TileTree, DEFAULT_AREA_CEILING,
    DEFAULT_ROOT_THRESHOLD, DEFAULT_SURFACE_CACHE_CAPACITY,
};
pub use view::{
    AtomicProgress, BrightnessSource, CountingRedraw, DecodingProgress, FixedViewport,
    RedrawSink, SharedBrightness, SharedZoom, ViewContext, Viewport, ZoomSource,
};
