//! Driver-side collaborators of the tile engine.
//!
//! The tree reads zoom, viewport width and brightness from the driver,
//! reports decode activity through a progress tracker, and asks for redraws
//! when surfaces appear or disappear. Each collaborator is a small trait so
//! tests can substitute stubs; [`ViewContext`] bundles them with the decode
//! service and the surface cache into the one handle every tile shares.

use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::decode::DecodeService;
use crate::tile::SurfaceCache;

// =============================================================================
// Collaborator Traits
// =============================================================================

/// Source of the current zoom level.
pub trait ZoomSource: Send + Sync {
    fn zoom(&self) -> f32;
}

/// The on-screen viewport.
pub trait Viewport: Send + Sync {
    /// Viewport width in device pixels.
    fn width(&self) -> u32;
}

/// Receives redraw requests when tile content changes.
pub trait RedrawSink: Send + Sync {
    fn request_redraw(&self);
}

/// Source of the display brightness setting, 0..=100.
pub trait BrightnessSource: Send + Sync {
    fn brightness(&self) -> u8;
}

/// Tracker of outstanding decode jobs across the whole tree.
///
/// Increments and decrements always come in matched pairs, guarded by the
/// same compare-and-set that gates decode submission, so `current` is an
/// exact count of in-flight decodes and a usable backpressure signal.
pub trait DecodingProgress: Send + Sync {
    fn increase(&self);
    fn decrease(&self);
    fn current(&self) -> usize;
}

// =============================================================================
// Default Implementations
// =============================================================================

/// Atomic counter implementation of [`DecodingProgress`].
#[derive(Default)]
pub struct AtomicProgress(AtomicUsize);

impl AtomicProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DecodingProgress for AtomicProgress {
    fn increase(&self) {
        self.0.fetch_add(1, Ordering::AcqRel);
    }

    fn decrease(&self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }

    fn current(&self) -> usize {
        self.0.load(Ordering::Acquire)
    }
}

/// A zoom level the driver can set and the tree can read.
pub struct SharedZoom(Mutex<f32>);

impl SharedZoom {
    pub fn new(zoom: f32) -> Self {
        Self(Mutex::new(zoom))
    }

    pub fn set(&self, zoom: f32) {
        *self.0.lock().expect("zoom lock poisoned") = zoom;
    }
}

impl ZoomSource for SharedZoom {
    fn zoom(&self) -> f32 {
        *self.0.lock().expect("zoom lock poisoned")
    }
}

/// A viewport with a fixed pixel width.
pub struct FixedViewport(pub u32);

impl Viewport for FixedViewport {
    fn width(&self) -> u32 {
        self.0
    }
}

/// Redraw sink that counts requests, for drivers that poll and for tests.
#[derive(Default)]
pub struct CountingRedraw(AtomicUsize);

impl CountingRedraw {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::Acquire)
    }
}

impl RedrawSink for CountingRedraw {
    fn request_redraw(&self) {
        self.0.fetch_add(1, Ordering::AcqRel);
    }
}

/// Redraw sink that ignores requests.
struct NullRedraw;

impl RedrawSink for NullRedraw {
    fn request_redraw(&self) {}
}

/// A brightness setting the driver can adjust, clamped to 0..=100.
pub struct SharedBrightness(AtomicU8);

impl SharedBrightness {
    pub fn new(brightness: u8) -> Self {
        Self(AtomicU8::new(brightness.min(100)))
    }

    /// Full brightness; the draw pass adds no overlay.
    pub fn full() -> Self {
        Self::new(100)
    }

    pub fn set(&self, brightness: u8) {
        self.0.store(brightness.min(100), Ordering::Release);
    }
}

impl BrightnessSource for SharedBrightness {
    fn brightness(&self) -> u8 {
        self.0.load(Ordering::Acquire)
    }
}

// =============================================================================
// View Context
// =============================================================================

/// Everything a tile reaches outside itself, shared by the whole tree.
///
/// Construction takes the two collaborators with no sensible default (the
/// decode service and the zoom source); the rest start as defaults and are
/// replaced with `with_*` builders.
pub struct ViewContext {
    pub decoder: Arc<dyn DecodeService>,
    pub surfaces: Arc<SurfaceCache>,
    pub zoom: Arc<dyn ZoomSource>,
    pub viewport: Arc<dyn Viewport>,
    pub progress: Arc<dyn DecodingProgress>,
    pub redraw: Arc<dyn RedrawSink>,
    pub brightness: Arc<dyn BrightnessSource>,
}

impl ViewContext {
    pub fn new(
        decoder: Arc<dyn DecodeService>,
        zoom: Arc<dyn ZoomSource>,
        viewport: Arc<dyn Viewport>,
    ) -> Self {
        Self {
            decoder,
            surfaces: Arc::new(SurfaceCache::new()),
            zoom,
            viewport,
            progress: Arc::new(AtomicProgress::new()),
            redraw: Arc::new(NullRedraw),
            brightness: Arc::new(SharedBrightness::full()),
        }
    }

    pub fn with_surfaces(mut self, surfaces: Arc<SurfaceCache>) -> Self {
        self.surfaces = surfaces;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn DecodingProgress>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_redraw(mut self, redraw: Arc<dyn RedrawSink>) -> Self {
        self.redraw = redraw;
        self
    }

    pub fn with_brightness(mut self, brightness: Arc<dyn BrightnessSource>) -> Self {
        self.brightness = brightness;
        self
    }
}

// =============================================================================
// Tests
// =============================================================================
