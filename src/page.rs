//! The page collaborator boundary.
//!
//! The tile engine does not own pages. It reads page-level metrics (layout
//! bounds, aspect ratio, render factors) and the kept-in-memory visibility
//! flag through the [`Page`] trait, and writes back exactly one thing: the
//! aspect ratio measured from a completed decode. [`SimplePage`] is a
//! self-contained implementation for drivers and tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::geom::RectF;

/// Page-level metrics and visibility, owned outside the tile engine.
pub trait Page: Send + Sync {
    /// Layout bounds of the page in view coordinates.
    fn bounds(&self) -> RectF;

    /// Rendered page height for a given viewport width and zoom.
    fn height_at_zoom(&self, view_width: u32, zoom: f32) -> f32;

    /// Whether the page is currently visible enough to keep tiles for.
    ///
    /// Tiles of a page that is no longer kept in memory stop decoding and
    /// release their surfaces on the next visibility pass.
    fn is_kept_in_memory(&self) -> bool;

    /// Horizontal scale factor applied when mapping slice bounds to the
    /// render target.
    fn target_rect_scale(&self) -> f32;

    /// Horizontal translate factor applied when mapping slice bounds to the
    /// render target.
    fn target_translate(&self) -> f32;

    /// Record the aspect ratio measured from a decoded surface.
    fn set_aspect_ratio(&self, width: u32, height: u32);

    /// Current width-over-height aspect ratio.
    fn aspect_ratio(&self) -> f32;

    /// Index of this page within the current view order.
    fn index(&self) -> usize;

    /// Index of this page within the source document.
    fn document_page_index(&self) -> usize;
}

// =============================================================================
// SimplePage
// =============================================================================

/// A plain [`Page`] implementation backed by its own fields.
pub struct SimplePage {
    index: usize,
    document_page_index: usize,
    bounds: Mutex<RectF>,
    aspect_ratio: Mutex<f32>,
    kept_in_memory: AtomicBool,
    target_rect_scale: f32,
    target_translate: f32,
}

impl SimplePage {
    /// Create a page with the given view index and initial aspect ratio.
    ///
    /// The document page index defaults to the view index; layout bounds
    /// default to empty and are set by the driver via [`set_bounds`].
    ///
    /// [`set_bounds`]: SimplePage::set_bounds
    pub fn new(index: usize, aspect_ratio: f32) -> Self {
        Self {
            index,
            document_page_index: index,
            bounds: Mutex::new(RectF::new(0.0, 0.0, 0.0, 0.0)),
            aspect_ratio: Mutex::new(aspect_ratio),
            kept_in_memory: AtomicBool::new(true),
            target_rect_scale: 1.0,
            target_translate: 0.0,
        }
    }

    /// Override the document page index (view order differs from document
    /// order in right-to-left or split layouts).
    pub fn with_document_page_index(mut self, document_page_index: usize) -> Self {
        self.document_page_index = document_page_index;
        self
    }

    /// Override the render target factors.
    pub fn with_target(mut self, scale: f32, translate: f32) -> Self {
        self.target_rect_scale = scale;
        self.target_translate = translate;
        self
    }

    /// Set the page's layout bounds in view coordinates.
    pub fn set_bounds(&self, bounds: RectF) {
        *self.bounds.lock().expect("page bounds lock poisoned") = bounds;
    }

    /// Flip the kept-in-memory flag.
    pub fn set_kept_in_memory(&self, kept: bool) {
        self.kept_in_memory.store(kept, Ordering::Release);
    }
}

impl Page for SimplePage {
    fn bounds(&self) -> RectF {
        *self.bounds.lock().expect("page bounds lock poisoned")
    }

    fn height_at_zoom(&self, view_width: u32, zoom: f32) -> f32 {
        let aspect = self.aspect_ratio();
        if aspect <= 0.0 {
            0.0
        } else {
            view_width as f32 * zoom / aspect
        }
    }

    fn is_kept_in_memory(&self) -> bool {
        self.kept_in_memory.load(Ordering::Acquire)
    }

    fn target_rect_scale(&self) -> f32 {
        self.target_rect_scale
    }

    fn target_translate(&self) -> f32 {
        self.target_translate
    }

    fn set_aspect_ratio(&self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        *self
            .aspect_ratio
            .lock()
            .expect("page aspect lock poisoned") = width as f32 / height as f32;
    }

    fn aspect_ratio(&self) -> f32 {
        *self
            .aspect_ratio
            .lock()
            .expect("page aspect lock poisoned")
    }

    fn index(&self) -> usize {
        self.index
    }

    fn document_page_index(&self) -> usize {
        self.document_page_index
    }
}

// =============================================================================
// Tests
// =============================================================================
