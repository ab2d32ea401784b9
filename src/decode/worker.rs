//! Worker-pool decode service on the tokio runtime.
//!
//! Each accepted request runs as its own task; completions are delivered
//! through an unbounded mpsc channel whose receiver belongs to the
//! tree-owning thread. Cancellation aborts the task for a tile before it can
//! send, so a stopped request delivers no event.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::debug;

use crate::tile::TileId;

use super::{DecodeEvent, DecodeRequest, DecodeService, PageCodec};

/// Decode service that spawns one tokio task per request.
///
/// Jobs are keyed by tile identity: at most one job per tile is tracked, and
/// submitting a second request for the same tile replaces the tracked handle
/// (the engine's in-flight gate makes that case unreachable in practice).
pub struct WorkerDecodeService<C> {
    codec: Arc<C>,
    events: mpsc::UnboundedSender<DecodeEvent>,
    jobs: Arc<Mutex<HashMap<TileId, AbortHandle>>>,
}

impl<C: PageCodec + 'static> WorkerDecodeService<C> {
    /// Create a service decoding with `codec` and delivering completions
    /// into `events`.
    pub fn new(codec: C, events: mpsc::UnboundedSender<DecodeEvent>) -> Self {
        Self {
            codec: Arc::new(codec),
            events,
            jobs: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of jobs currently tracked.
    pub fn pending_jobs(&self) -> usize {
        self.jobs.lock().expect("decode job table poisoned").len()
    }
}

impl<C: PageCodec + 'static> DecodeService for WorkerDecodeService<C> {
    fn decode_page(&self, request: DecodeRequest) {
        let codec = Arc::clone(&self.codec);
        let events = self.events.clone();
        let jobs = Arc::clone(&self.jobs);
        let tile = request.tile.clone();

        debug!(
            page = tile.page_index,
            width = request.target_width,
            zoom = request.zoom,
            "decode submitted"
        );

        let handle = tokio::spawn(async move {
            // Not-yet-started jobs must be abortable before any work happens.
            tokio::task::yield_now().await;

            let outcome = codec
                .decode_region(
                    tile.page_index,
                    tile.bounds,
                    request.target_width,
                    request.zoom,
                )
                .await;

            jobs.lock().expect("decode job table poisoned").remove(&tile);
            let _ = events.send(DecodeEvent { tile, outcome });
        });

        if !handle.is_finished() {
            self.jobs
                .lock()
                .expect("decode job table poisoned")
                .insert(request.tile, handle.abort_handle());
        }
    }

    fn stop_decoding(&self, tile: &TileId, reason: &str) {
        let handle = self
            .jobs
            .lock()
            .expect("decode job table poisoned")
            .remove(tile);
        if let Some(handle) = handle {
            handle.abort();
            debug!(page = tile.page_index, reason, "decode cancelled");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
