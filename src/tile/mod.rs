//! The tile engine: quad-tree nodes, split policies, and the surface cache.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          TileTree                            │
//! │   update_visibility()   pump_completions()      draw()       │
//! │          │                     │                  │          │
//! │          ▼                     ▼                  ▼          │
//! │   ┌────────────┐        ┌─────────────┐     ┌────────────┐   │
//! │   │  TileNode  │◄──────►│ SurfaceCache│     │   Canvas   │   │
//! │   │ (quad-tree)│        │ (LRU, bytes)│     │ (boundary) │   │
//! │   └─────┬──────┘        └─────────────┘     └────────────┘   │
//! │         │ DecodeRequest        ▲                             │
//! │         ▼                      │ DecodeEvent (mpsc)          │
//! │   ┌────────────────────────────┴───┐                         │
//! │   │         DecodeService          │                         │
//! │   └────────────────────────────────┘                         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The tree decides which tiles exist (split policy), which hold pixels
//! (visibility and hidden-by-children eviction), and which decode next; the
//! cache may reclaim any surface under pressure, and the tree treats that as
//! "never decoded".

mod cache;
mod node;
mod policy;
mod tree;

pub use cache::{SurfaceCache, TileId, DEFAULT_SURFACE_CACHE_CAPACITY};
pub use node::TileNode;
pub use policy::{SplitPolicy, DEFAULT_AREA_CEILING};
pub use tree::{TileTree, DEFAULT_ROOT_THRESHOLD};
