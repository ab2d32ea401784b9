//! Quad-tree tile nodes.
//!
//! One node covers one rectangular slice of a page at one level of detail.
//! The root covers the whole page; when a node's split policy says its
//! threshold is hit it grows exactly four children, one per quadrant, each
//! with double its threshold. The visibility pass walks the tree top-down
//! deciding which nodes must exist and which must hold pixels; decode
//! completions are applied to nodes as they arrive, in any order.
//!
//! # Threading
//!
//! The tree is owned and mutated by a single thread. The only field touched
//! from anywhere else is the decode-in-flight gate, an atomic compare-and-set
//! that also keeps the shared progress counter in matched pairs. Everything a
//! decode worker produces reaches the tree as a message, never as a direct
//! write.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::decode::DecodeRequest;
use crate::error::DecodeError;
use crate::geom::{compose_slice_bounds, Rect, RectF, Transform, QUADRANTS};
use crate::page::Page;
use crate::render::{Canvas, PaintStyle, Rgba};
use crate::surface::RasterSurface;
use crate::view::ViewContext;

use super::cache::TileId;
use super::policy::SplitPolicy;

/// A node of the page's tile quad-tree.
///
/// Nodes own their children exclusively; the parent's absolute bounds are
/// folded into each child's bounds at construction, so no parent link is
/// kept and a node's bounds stay fixed for its lifetime. Pixels live in the
/// shared [`SurfaceCache`](super::SurfaceCache) under the node's [`TileId`],
/// never in the node itself.
pub struct TileNode {
    id: TileId,
    page: Arc<dyn Page>,
    ctx: Arc<ViewContext>,
    children: Option<Box<[TileNode; 4]>>,
    zoom_threshold: f32,
    policy: SplitPolicy,
    decoding: AtomicBool,
    stale: bool,
}

impl TileNode {
    /// Create the root node for a page, covering `[0,1]x[0,1]`.
    pub(crate) fn root(
        ctx: Arc<ViewContext>,
        page: Arc<dyn Page>,
        zoom_threshold: f32,
        policy: SplitPolicy,
    ) -> Self {
        Self::new(ctx, page, RectF::UNIT, None, zoom_threshold, policy)
    }

    fn new(
        ctx: Arc<ViewContext>,
        page: Arc<dyn Page>,
        local_bounds: RectF,
        parent_bounds: Option<RectF>,
        zoom_threshold: f32,
        policy: SplitPolicy,
    ) -> Self {
        let bounds = match parent_bounds {
            Some(parent) => compose_slice_bounds(local_bounds, parent),
            None => local_bounds,
        };
        Self {
            id: TileId::new(page.index(), bounds),
            page,
            ctx,
            children: None,
            zoom_threshold,
            policy,
            decoding: AtomicBool::new(false),
            stale: false,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> &TileId {
        &self.id
    }

    /// Absolute slice bounds in normalized page coordinates.
    pub fn bounds(&self) -> RectF {
        self.id.bounds
    }

    pub fn zoom_threshold(&self) -> f32 {
        self.zoom_threshold
    }

    pub fn children(&self) -> Option<&[TileNode; 4]> {
        self.children.as_deref()
    }

    /// Whether a surface for this node is currently cached.
    ///
    /// Does not refresh cache recency; the surface may be reclaimed at any
    /// point after this returns true.
    pub fn has_surface(&self) -> bool {
        self.ctx.surfaces.contains(&self.id)
    }

    pub fn is_decoding(&self) -> bool {
        self.decoding.load(Ordering::Acquire)
    }

    /// Whether this node's cached content is outdated and must not be
    /// displayed until re-decoded.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn page_index(&self) -> usize {
        self.page.index()
    }

    pub fn document_page_index(&self) -> usize {
        self.page.document_page_index()
    }

    // =========================================================================
    // Visibility Pass
    // =========================================================================

    /// Reconcile this subtree with the current zoom and page visibility.
    ///
    /// Children are created or recycled first and visited before this node
    /// decides its own decode need, so a node can see whether its children
    /// already hide it. Safe to re-run at any time; a pass with no external
    /// change is a no-op.
    pub(crate) fn update_visibility(&mut self) {
        self.invalidate_children();
        if let Some(children) = self.children.as_deref_mut() {
            for child in children.iter_mut() {
                child.update_visibility();
            }
        }
        if self.page.is_kept_in_memory() && !self.threshold_hit() {
            let valid_surface = !self.stale && self.ctx.surfaces.get(&self.id).is_some();
            if !valid_surface {
                self.request_decode();
            }
        }
        if !self.visible_and_not_hidden_by_children() {
            self.stop_decoding("tile hidden");
            self.release_surface();
        }
    }

    /// Mark this subtree's content outdated and reconcile.
    ///
    /// Stale tiles keep their structural place but paint nothing until a
    /// fresh decode replaces their content.
    pub(crate) fn invalidate(&mut self) {
        self.invalidate_children();
        self.mark_stale();
        self.update_visibility();
    }

    fn mark_stale(&mut self) {
        self.stale = true;
        if let Some(children) = self.children.as_deref_mut() {
            for child in children.iter_mut() {
                child.mark_stale();
            }
        }
    }

    /// Create or recycle children according to the split policy.
    fn invalidate_children(&mut self) {
        if self.threshold_hit() && self.children.is_none() && self.page.is_kept_in_memory() {
            let threshold = self.zoom_threshold * 2.0;
            let bounds = self.id.bounds;
            self.children = Some(Box::new(QUADRANTS.map(|quadrant| {
                TileNode::new(
                    Arc::clone(&self.ctx),
                    Arc::clone(&self.page),
                    quadrant,
                    Some(bounds),
                    threshold,
                    self.policy,
                )
            })));
        }
        if (!self.threshold_hit() && self.has_surface()) || !self.page.is_kept_in_memory() {
            self.recycle_children();
        }
    }

    fn threshold_hit(&self) -> bool {
        let zoom = self.ctx.zoom.zoom();
        let view_width = self.ctx.viewport.width();
        let page_height = self.page.height_at_zoom(view_width, zoom);
        self.policy
            .threshold_hit(zoom, view_width, page_height, self.zoom_threshold)
    }

    // =========================================================================
    // Decode Lifecycle
    // =========================================================================

    /// Submit a decode request unless one is already in flight.
    fn request_decode(&self) {
        if self.set_decoding(true) {
            let target_width = self.ctx.viewport.width();
            let zoom = self.ctx.zoom.zoom() * self.page.target_rect_scale();
            self.ctx.decoder.decode_page(DecodeRequest {
                tile: self.id.clone(),
                target_width,
                zoom,
            });
        }
    }

    /// Flip the in-flight gate, keeping the progress counter in step.
    ///
    /// Returns false when the gate was already in the requested state; the
    /// caller's transition loses and must not act.
    fn set_decoding(&self, decoding: bool) -> bool {
        if self
            .decoding
            .compare_exchange(!decoding, decoding, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            if decoding {
                self.ctx.progress.increase();
            } else {
                self.ctx.progress.decrease();
            }
            true
        } else {
            false
        }
    }

    /// Apply a decode completion delivered for this node.
    ///
    /// A completion for a request that was cancelled in the meantime loses
    /// the gate transition and is dropped whole. Degenerate surfaces are
    /// discarded without touching prior state; failures leave the node
    /// without pixels, to be retried by the next visibility pass.
    pub(crate) fn apply_decode(&mut self, outcome: Result<RasterSurface, DecodeError>) {
        if !self.set_decoding(false) {
            return;
        }
        match outcome {
            Ok(surface) if !surface.is_degenerate() => {
                self.page.set_aspect_ratio(surface.width(), surface.height());
                self.ctx.surfaces.put(self.id.clone(), surface);
                self.stale = false;
                self.ctx.redraw.request_redraw();
                self.invalidate_children();
            }
            Ok(surface) => {
                tracing::debug!(
                    page = self.id.page_index,
                    width = surface.width(),
                    height = surface.height(),
                    "degenerate decode result discarded"
                );
            }
            Err(err) => {
                tracing::debug!(page = self.id.page_index, error = %err, "decode failed");
            }
        }
    }

    /// Cancel any in-flight decode for this node.
    ///
    /// The gate is cleared before the service is asked to stop, so a result
    /// the cancelled job races in can never be applied.
    fn stop_decoding(&self, reason: &str) {
        if self.set_decoding(false) {
            self.ctx.decoder.stop_decoding(&self.id, reason);
        }
    }

    // =========================================================================
    // Eviction and Pruning
    // =========================================================================

    fn release_surface(&self) {
        if self.ctx.surfaces.remove(&self.id).is_some() {
            self.ctx.redraw.request_redraw();
        }
    }

    /// True when all four children hold surfaces, fully covering this node
    /// at higher resolution.
    fn hidden_by_children(&self) -> bool {
        match self.children.as_deref() {
            None => false,
            Some(children) => children.iter().all(|child| child.has_surface()),
        }
    }

    fn visible_and_not_hidden_by_children(&self) -> bool {
        self.page.is_kept_in_memory() && !self.hidden_by_children()
    }

    /// Recycle all children, then drop the child array if the subtree holds
    /// no pixels anywhere.
    fn recycle_children(&mut self) {
        let Some(children) = self.children.as_deref_mut() else {
            return;
        };
        for child in children.iter_mut() {
            child.recycle();
        }
        if !self.children_contain_surfaces() {
            self.children = None;
        }
    }

    fn recycle(&mut self) {
        self.stop_decoding("tile recycled");
        self.release_surface();
        if let Some(children) = self.children.as_deref_mut() {
            for child in children.iter_mut() {
                child.recycle();
            }
        }
    }

    fn contains_surfaces(&self) -> bool {
        self.has_surface() || self.children_contain_surfaces()
    }

    fn children_contain_surfaces(&self) -> bool {
        self.children
            .as_deref()
            .is_some_and(|children| children.iter().any(|child| child.contains_surfaces()))
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Find the node with the given identity in this subtree.
    pub(crate) fn find_mut(&mut self, id: &TileId) -> Option<&mut TileNode> {
        if self.id == *id {
            return Some(self);
        }
        self.children
            .as_deref_mut()?
            .iter_mut()
            .find_map(|child| child.find_mut(id))
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Paint this subtree into `canvas`.
    ///
    /// The node's own surface goes first and children after, so finer detail
    /// lands over the coarser placeholder. Stale content paints nothing. A
    /// brightness below 100 composites a translucent black overlay on top.
    pub(crate) fn draw(&self, canvas: &mut dyn Canvas, view_rect: RectF, paint: &PaintStyle) {
        let target = self.target_rect(view_rect);
        if !self.stale {
            if let Some(surface) = self.ctx.surfaces.get(&self.id) {
                canvas.fill_rect(target, paint.fill);
                canvas.draw_surface(&surface, target);
            }
        }
        let brightness = self.ctx.brightness.brightness();
        if brightness < 100 {
            let alpha = (255 - brightness as u32 * 255 / 100) as u8;
            canvas.fill_rect(target, Rgba::new(0, 0, 0, alpha));
        }
        if let Some(children) = self.children.as_deref() {
            for child in children.iter() {
                child.draw(canvas, view_rect, paint);
            }
        }
    }

    /// Device-pixel rectangle this node's slice maps to for the given view.
    pub(crate) fn target_rect(&self, view_rect: RectF) -> Rect {
        let bounds = self.page.bounds().offset(-view_rect.left, -view_rect.top);
        let scale = self.page.target_rect_scale();
        let translate = self.page.target_translate();
        Transform::identity()
            .post_scale(bounds.width() * scale, bounds.height())
            .post_translate(bounds.left - bounds.width() * translate, bounds.top)
            .map_rect(self.id.bounds)
            .to_rect()
    }
}

// =============================================================================
// Identity
// =============================================================================

impl PartialEq for TileNode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TileNode {}

impl Hash for TileNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Page index only; all tiles of one page land in one bucket, which
        // identity-keyed collections here are small enough to absorb.
        self.id.page_index.hash(state);
    }
}

impl fmt::Display for TileNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TileNode[page={}, rect={:?}, has_surface={}]",
            self.id.page_index,
            self.id.bounds,
            self.has_surface()
        )
    }
}

impl fmt::Debug for TileNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

// =============================================================================
// Tests
// =============================================================================
