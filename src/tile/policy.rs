//! Split threshold policies.
//!
//! A tile refines into four children when its policy says the threshold is
//! hit. The policy is chosen once at root construction and inherited by
//! every descendant; children double their parent's threshold, so each level
//! of the tree needs twice the zoom (or a quarter of the per-tile area) of
//! the level above it.

/// Default ceiling for the area-limited policy, in estimated raster pixels
/// per tile.
pub const DEFAULT_AREA_CEILING: f32 = 131_070.0;

/// Decides when a tile must refine into children.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SplitPolicy {
    /// Split when the current zoom exceeds the tile's threshold.
    Zoom,

    /// Split when the estimated raster area for decoding this tile at the
    /// current zoom exceeds `ceiling`.
    ///
    /// The estimate is `view_width * zoom * page_height / threshold^2`; the
    /// squared threshold shrinks the estimate by 4x per tree level, bounding
    /// per-tile allocation size regardless of zoom at the cost of more
    /// tiles. The formula is an approximation, not an exact pixel count.
    AreaLimit { ceiling: f32 },
}

impl SplitPolicy {
    /// The area-limited policy with the default ceiling.
    pub fn area_limit() -> Self {
        Self::AreaLimit {
            ceiling: DEFAULT_AREA_CEILING,
        }
    }

    /// Whether a tile with the given threshold must have children.
    ///
    /// `page_height` is the rendered page height at the current viewport
    /// width and zoom; the zoom policy ignores it.
    pub fn threshold_hit(
        &self,
        zoom: f32,
        view_width: u32,
        page_height: f32,
        threshold: f32,
    ) -> bool {
        match *self {
            SplitPolicy::Zoom => zoom > threshold,
            SplitPolicy::AreaLimit { ceiling } => {
                (view_width as f32 * zoom * page_height) / (threshold * threshold) > ceiling
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
