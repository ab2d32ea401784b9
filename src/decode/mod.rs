//! Asynchronous decoding of page slices.
//!
//! The tile tree never blocks on pixels. It submits a [`DecodeRequest`] to a
//! [`DecodeService`] and carries on; the service decodes off the tree's
//! thread and delivers a [`DecodeEvent`] through an mpsc queue that the
//! tree-owning thread drains. Sending that message is the worker's only
//! cross-thread effect, so every mutation of tree state stays on one thread.
//!
//! The actual pixel decoder sits behind the [`PageCodec`] trait; the engine
//! is indifferent to the source format.

pub mod codec;
pub mod worker;

pub use codec::{JpegPageCodec, PageCodec, SyntheticCodec};
pub use worker::WorkerDecodeService;

use crate::error::DecodeError;
use crate::surface::RasterSurface;
use crate::tile::TileId;

// =============================================================================
// Requests and Completions
// =============================================================================

/// A decode request for one tile's slice of a page.
#[derive(Debug, Clone)]
pub struct DecodeRequest {
    /// Identity of the requesting tile; doubles as the cancellation handle.
    pub tile: TileId,

    /// Viewport width in device pixels at submit time.
    pub target_width: u32,

    /// Effective zoom at submit time (view zoom times the page's target
    /// rect scale).
    pub zoom: f32,
}

/// The completion message for one decode request.
///
/// Exactly one event is delivered per accepted request unless the request
/// was cancelled first. A failed decode carries its error; the receiving
/// tile treats it as "no surface produced".
#[derive(Debug)]
pub struct DecodeEvent {
    pub tile: TileId,
    pub outcome: Result<RasterSurface, DecodeError>,
}

// =============================================================================
// Decode Service
// =============================================================================

/// Fire-and-forget decode scheduling, keyed by tile identity.
///
/// Both methods are non-blocking; `decode_page` hands the request to a
/// worker and returns, `stop_decoding` cancels the job for a tile if one is
/// still pending or running. A cancelled job delivers no event.
pub trait DecodeService: Send + Sync {
    /// Submit a decode request.
    fn decode_page(&self, request: DecodeRequest);

    /// Cancel the in-flight decode for a tile, if any.
    fn stop_decoding(&self, tile: &TileId, reason: &str);
}
