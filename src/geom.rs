//! Rectangle and transform primitives for tile geometry.
//!
//! Tiles describe their slice of a page in normalized `[0,1]x[0,1]`
//! page-local coordinates. This module provides the float rectangle used for
//! those bounds, the integer rectangle used for device-pixel targets, and the
//! scale/translate transform that composes child bounds from parent bounds
//! and maps slice bounds into view space.

// =============================================================================
// Float Rectangle
// =============================================================================

/// An axis-aligned rectangle with `f32` edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectF {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl RectF {
    /// The unit rectangle `[0,1]x[0,1]`, the slice bounds of a root tile.
    pub const UNIT: RectF = RectF {
        left: 0.0,
        top: 0.0,
        right: 1.0,
        bottom: 1.0,
    };

    /// Create a rectangle from its four edges.
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Return this rectangle shifted by `(dx, dy)`.
    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Self::new(
            self.left + dx,
            self.top + dy,
            self.right + dx,
            self.bottom + dy,
        )
    }

    /// Truncate to an integer device rectangle.
    pub fn to_rect(&self) -> Rect {
        Rect::new(
            self.left as i32,
            self.top as i32,
            self.right as i32,
            self.bottom as i32,
        )
    }
}

/// The four canonical child quadrants of a tile, in normalized parent-local
/// coordinates: top-left, top-right, bottom-left, bottom-right.
pub const QUADRANTS: [RectF; 4] = [
    RectF::new(0.0, 0.0, 0.5, 0.5),
    RectF::new(0.5, 0.0, 1.0, 0.5),
    RectF::new(0.0, 0.5, 0.5, 1.0),
    RectF::new(0.5, 0.5, 1.0, 1.0),
];

// =============================================================================
// Integer Rectangle
// =============================================================================

/// An axis-aligned rectangle with `i32` edges, used for device-pixel targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }
}

// =============================================================================
// Transform
// =============================================================================

/// A scale-then-translate 2D transform.
///
/// This is the subset of an affine matrix the tile engine needs: composing a
/// child's quadrant rectangle with its parent's absolute bounds, and mapping
/// slice bounds into view space. `post_*` methods apply the new operation
/// after the current transform, so
/// `identity().post_scale(s).post_translate(t)` maps `x` to `x * s + t`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    sx: f32,
    sy: f32,
    tx: f32,
    ty: f32,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            sx: 1.0,
            sy: 1.0,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// Apply a scale after the current transform.
    pub fn post_scale(mut self, sx: f32, sy: f32) -> Self {
        self.sx *= sx;
        self.sy *= sy;
        self.tx *= sx;
        self.ty *= sy;
        self
    }

    /// Apply a translation after the current transform.
    pub fn post_translate(mut self, dx: f32, dy: f32) -> Self {
        self.tx += dx;
        self.ty += dy;
        self
    }

    /// Map a rectangle through this transform.
    pub fn map_rect(&self, r: RectF) -> RectF {
        RectF::new(
            r.left * self.sx + self.tx,
            r.top * self.sy + self.ty,
            r.right * self.sx + self.tx,
            r.bottom * self.sy + self.ty,
        )
    }
}

/// Compose a tile's local quadrant rectangle with its parent's absolute
/// bounds, producing the tile's absolute page-relative bounds.
///
/// The result is scaled by the parent's size and translated to the parent's
/// origin, so child bounds are fractions of the whole page rather than of the
/// immediate parent alone.
pub fn compose_slice_bounds(local: RectF, parent: RectF) -> RectF {
    Transform::identity()
        .post_scale(parent.width(), parent.height())
        .post_translate(parent.left, parent.top)
        .map_rect(local)
}

// =============================================================================
// Tests
// =============================================================================
