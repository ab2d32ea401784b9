//! The per-page tile tree facade.
//!
//! A [`TileTree`] owns one root [`TileNode`](super::TileNode) and the
//! receiving end of the decode completion queue. Drivers call
//! [`pump_completions`](TileTree::pump_completions) from the thread that owns
//! the tree, then [`update_visibility`](TileTree::update_visibility) on zoom
//! or scroll changes and [`draw`](TileTree::draw) per frame.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::decode::DecodeEvent;
use crate::geom::RectF;
use crate::page::Page;
use crate::render::{Canvas, PaintStyle};
use crate::view::ViewContext;

use super::node::TileNode;
use super::policy::SplitPolicy;

/// Default zoom threshold for a page's root tile.
pub const DEFAULT_ROOT_THRESHOLD: f32 = 1.0;

/// The tile quad-tree of one page view.
pub struct TileTree {
    root: TileNode,
    completions: mpsc::UnboundedReceiver<DecodeEvent>,
}

impl TileTree {
    /// Create a tree for `page` with the given root threshold and split
    /// policy, applying decode completions from `completions`.
    pub fn new(
        ctx: Arc<ViewContext>,
        page: Arc<dyn Page>,
        root_threshold: f32,
        policy: SplitPolicy,
        completions: mpsc::UnboundedReceiver<DecodeEvent>,
    ) -> Self {
        Self {
            root: TileNode::root(ctx, page, root_threshold, policy),
            completions,
        }
    }

    /// The root tile, covering the whole page.
    pub fn root(&self) -> &TileNode {
        &self.root
    }

    pub fn page_index(&self) -> usize {
        self.root.page_index()
    }

    pub fn document_page_index(&self) -> usize {
        self.root.document_page_index()
    }

    /// Reconcile the tree with the current zoom and page visibility.
    pub fn update_visibility(&mut self) {
        self.root.update_visibility();
    }

    /// Mark all cached content outdated and reconcile, forcing re-decodes
    /// for every tile that remains visible.
    pub fn invalidate(&mut self) {
        self.root.invalidate();
    }

    /// Paint the tree into `canvas` for the given viewport rectangle.
    pub fn draw(&self, canvas: &mut dyn Canvas, view_rect: RectF, paint: &PaintStyle) {
        self.root.draw(canvas, view_rect, paint);
    }

    /// Drain pending decode completions and apply them to their tiles.
    ///
    /// Must be called from the thread that owns the tree; this is the
    /// single point where worker results reach tree state. Returns how many
    /// events were applied; events for tiles that no longer exist are
    /// dropped without effect.
    pub fn pump_completions(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.completions.try_recv() {
            if self.apply_completion(event) {
                applied += 1;
            }
        }
        applied
    }

    /// Wait for the next completion and apply it.
    ///
    /// Returns false when the decode service has shut down (all senders
    /// dropped). For async drivers that would rather park than poll.
    pub async fn next_completion(&mut self) -> bool {
        match self.completions.recv().await {
            Some(event) => {
                self.apply_completion(event);
                true
            }
            None => false,
        }
    }

    /// Apply one completion event to the tile it belongs to.
    ///
    /// Returns false when the target tile has been pruned from the tree or
    /// belongs to another page; such results are dropped.
    pub fn apply_completion(&mut self, event: DecodeEvent) -> bool {
        match self.root.find_mut(&event.tile) {
            Some(node) => {
                node.apply_decode(event.outcome);
                true
            }
            None => false,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
