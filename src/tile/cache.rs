//! Reclaimable cache for decoded raster surfaces.
//!
//! Tiles never hold their pixels directly: a tile stores only its identity
//! and reads the shared [`SurfaceCache`] every time it needs its surface.
//! The cache may drop any entry under memory pressure (size-based LRU
//! eviction), and every read path treats an absent entry as "not yet
//! decoded", so a reclaimed surface simply triggers a re-decode on the next
//! visibility pass.
//!
//! # Size-Based Eviction
//!
//! The cache tracks the total byte size of cached surfaces and evicts
//! least-recently-used entries when the capacity is exceeded.

use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use lru::LruCache;

use crate::geom::RectF;
use crate::surface::RasterSurface;

/// Default cache capacity: 64MB of decoded pixels.
pub const DEFAULT_SURFACE_CACHE_CAPACITY: usize = 64 * 1024 * 1024;

/// Default maximum number of entries (to bound LRU overhead)
const DEFAULT_MAX_ENTRIES: usize = 4096;

// =============================================================================
// Tile Identity
// =============================================================================

/// Value identity of a tile: the owning page index plus the tile's absolute
/// slice bounds on that page.
///
/// Two tiles with the same page index and identical bounds are the same tile
/// no matter which tree instance they live in, so this key deduplicates
/// tiles in the surface cache and in any index keyed by tile identity.
/// Bounds are compared by exact bit pattern; all bounds for one page are
/// composed from the same quadrant constants, so equal slices are
/// bit-identical.
#[derive(Debug, Clone)]
pub struct TileId {
    pub page_index: usize,
    pub bounds: RectF,
}

impl TileId {
    pub fn new(page_index: usize, bounds: RectF) -> Self {
        Self { page_index, bounds }
    }

    fn bounds_bits(&self) -> [u32; 4] {
        [
            self.bounds.left.to_bits(),
            self.bounds.top.to_bits(),
            self.bounds.right.to_bits(),
            self.bounds.bottom.to_bits(),
        ]
    }
}

impl PartialEq for TileId {
    fn eq(&self, other: &Self) -> bool {
        self.page_index == other.page_index && self.bounds_bits() == other.bounds_bits()
    }
}

impl Eq for TileId {}

impl Hash for TileId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.page_index.hash(state);
        self.bounds_bits().hash(state);
    }
}

// =============================================================================
// Surface Cache
// =============================================================================

struct Inner {
    entries: LruCache<TileId, Arc<RasterSurface>>,
    size: usize,
}

/// LRU cache for decoded surfaces with byte-size capacity.
///
/// One cache is shared by every tile of a page view. Storing a surface for a
/// tile releases any surface previously held for the same tile, and pushes
/// least-recently-used entries out when the total pixel size exceeds
/// capacity; eviction under pressure is indistinguishable from "never
/// decoded" to the tiles.
///
/// All operations take a single internal lock, so the cache can be shared
/// freely behind `Arc`.
pub struct SurfaceCache {
    inner: Mutex<Inner>,
    max_size: usize,
}

impl SurfaceCache {
    /// Create a cache with the default capacity (64MB).
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_SURFACE_CACHE_CAPACITY)
    }

    /// Create a cache with the given capacity in bytes.
    pub fn with_capacity(max_size: usize) -> Self {
        Self::with_capacity_and_entries(max_size, DEFAULT_MAX_ENTRIES)
    }

    /// Create a cache with the given capacity in bytes and entry limit.
    pub fn with_capacity_and_entries(max_size: usize, max_entries: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: LruCache::new(
                    NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN),
                ),
                size: 0,
            }),
            max_size,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("surface cache lock poisoned")
    }

    /// Get the surface for a tile, refreshing its recency.
    ///
    /// Returns `None` when the tile has not been decoded or its surface was
    /// reclaimed under pressure; callers treat both the same way.
    pub fn get(&self, id: &TileId) -> Option<Arc<RasterSurface>> {
        self.lock().entries.get(id).cloned()
    }

    /// Check for a surface without updating LRU order.
    pub fn contains(&self, id: &TileId) -> bool {
        self.lock().entries.contains(id)
    }

    /// Store a surface for a tile, releasing any prior surface for the same
    /// tile first, then evicting least-recently-used entries until the cache
    /// is back within capacity.
    pub fn put(&self, id: TileId, surface: RasterSurface) {
        let mut inner = self.lock();
        let added = surface.byte_size();

        let released = inner.entries.peek(&id).map(|old| old.byte_size());
        if let Some(released) = released {
            inner.size = inner.size.saturating_sub(released);
        }

        inner.entries.put(id, Arc::new(surface));
        inner.size += added;

        while inner.size > self.max_size {
            match inner.entries.pop_lru() {
                Some((_, evicted)) => {
                    inner.size = inner.size.saturating_sub(evicted.byte_size());
                }
                None => break,
            }
        }
    }

    /// Release the surface for a tile.
    ///
    /// Returns the released surface if one was cached.
    pub fn remove(&self, id: &TileId) -> Option<Arc<RasterSurface>> {
        let mut inner = self.lock();
        let surface = inner.entries.pop(id)?;
        inner.size = inner.size.saturating_sub(surface.byte_size());
        Some(surface)
    }

    /// Release every cached surface.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.size = 0;
    }

    /// Number of cached surfaces.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Total byte size of cached surfaces.
    pub fn size(&self) -> usize {
        self.lock().size
    }

    /// Capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.max_size
    }
}

impl Default for SurfaceCache {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
