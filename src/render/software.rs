//! In-memory RGBA canvas.

use image::RgbaImage;

use crate::geom::Rect;
use crate::surface::RasterSurface;

use super::{Canvas, Rgba};

/// A software render target backed by an RGBA image buffer.
///
/// Surfaces are scaled into their target rectangles with nearest-neighbour
/// sampling and clipped to the canvas. Fills blend with straight source-over
/// alpha.
pub struct SoftwareCanvas {
    image: RgbaImage,
}

impl SoftwareCanvas {
    /// Create a canvas of the given size, filled with `background`.
    pub fn new(width: u32, height: u32, background: Rgba) -> Self {
        let image = RgbaImage::from_pixel(
            width,
            height,
            image::Rgba([background.r, background.g, background.b, background.a]),
        );
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// The RGBA pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel(x, y).0
    }

    /// The finished frame.
    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Clip a target rectangle to the canvas, returning pixel ranges.
    fn clip(&self, rect: Rect) -> Option<(u32, u32, u32, u32)> {
        let x0 = rect.left.max(0) as u32;
        let y0 = rect.top.max(0) as u32;
        let x1 = (rect.right.max(0) as u32).min(self.image.width());
        let y1 = (rect.bottom.max(0) as u32).min(self.image.height());
        if x0 >= x1 || y0 >= y1 {
            None
        } else {
            Some((x0, y0, x1, y1))
        }
    }

    fn blend_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if color.a == 255 {
            self.image
                .put_pixel(x, y, image::Rgba([color.r, color.g, color.b, 255]));
            return;
        }
        let dst = self.image.get_pixel(x, y).0;
        let a = color.a as u32;
        let inv = 255 - a;
        let blend =
            |src: u8, dst: u8| -> u8 { ((src as u32 * a + dst as u32 * inv) / 255) as u8 };
        self.image.put_pixel(
            x,
            y,
            image::Rgba([
                blend(color.r, dst[0]),
                blend(color.g, dst[1]),
                blend(color.b, dst[2]),
                255,
            ]),
        );
    }
}

impl Canvas for SoftwareCanvas {
    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        if color.a == 0 {
            return;
        }
        let Some((x0, y0, x1, y1)) = self.clip(rect) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                self.blend_pixel(x, y, color);
            }
        }
    }

    fn draw_surface(&mut self, surface: &RasterSurface, target: Rect) {
        if surface.is_degenerate() || target.is_empty() {
            return;
        }
        let Some((x0, y0, x1, y1)) = self.clip(target) else {
            return;
        };
        let tw = target.width() as f32;
        let th = target.height() as f32;
        for y in y0..y1 {
            let v = (y as i32 - target.top) as f32 / th;
            let sy = ((v * surface.height() as f32) as u32).min(surface.height() - 1);
            for x in x0..x1 {
                let u = (x as i32 - target.left) as f32 / tw;
                let sx = ((u * surface.width() as f32) as u32).min(surface.width() - 1);
                let [r, g, b, a] = surface.pixel(sx, sy);
                self.blend_pixel(x, y, Rgba::new(r, g, b, a));
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
