//! Page codecs: the pixel-producing boundary of the engine.
//!
//! A codec turns (page, region, target width, zoom) into an RGBA surface.
//! Two implementations ship with the crate: [`JpegPageCodec`] decodes a JPEG
//! page source and serves cropped, rescaled regions of it, and
//! [`SyntheticCodec`] renders a procedural pattern for tests and demos with
//! no source file.

use async_trait::async_trait;
use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::error::DecodeError;
use crate::geom::RectF;
use crate::surface::RasterSurface;

/// Decodes rectangular slices of document pages.
///
/// `region` is in normalized `[0,1]x[0,1]` page coordinates. The surface for
/// a region is sized so that decoding the full page at the same width and
/// zoom would be `target_width * zoom` pixels wide: finer tiles get
/// proportionally fewer pixels each, at the same density.
#[async_trait]
pub trait PageCodec: Send + Sync {
    async fn decode_region(
        &self,
        page_index: usize,
        region: RectF,
        target_width: u32,
        zoom: f32,
    ) -> Result<RasterSurface, DecodeError>;
}

/// Pixel size of a region at a given page aspect ratio, viewport width and
/// zoom. Never returns a zero dimension for a non-empty region.
fn region_pixel_size(region: RectF, aspect: f32, target_width: u32, zoom: f32) -> (u32, u32) {
    let page_width = target_width as f32 * zoom;
    let page_height = if aspect > 0.0 { page_width / aspect } else { page_width };
    let w = (page_width * region.width()).round().max(1.0) as u32;
    let h = (page_height * region.height()).round().max(1.0) as u32;
    (w, h)
}

// =============================================================================
// JPEG Page Codec
// =============================================================================

/// Serves regions of a single JPEG image as page 0.
///
/// The source is decoded once at construction; `decode_region` crops the
/// requested slice and rescales it to the target density.
pub struct JpegPageCodec {
    image: RgbaImage,
}

impl JpegPageCodec {
    /// Decode a JPEG byte stream into a page source.
    pub fn from_jpeg_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| DecodeError::InvalidSource(e.to_string()))?
            .to_rgba8();
        if image.width() == 0 || image.height() == 0 {
            return Err(DecodeError::InvalidSource("empty image".to_string()));
        }
        Ok(Self { image })
    }

    /// Width-over-height ratio of the source page.
    pub fn aspect_ratio(&self) -> f32 {
        self.image.width() as f32 / self.image.height() as f32
    }
}

#[async_trait]
impl PageCodec for JpegPageCodec {
    async fn decode_region(
        &self,
        page_index: usize,
        region: RectF,
        target_width: u32,
        zoom: f32,
    ) -> Result<RasterSurface, DecodeError> {
        if page_index != 0 {
            return Err(DecodeError::PageNotFound { page: page_index });
        }

        let (src_w, src_h) = (self.image.width() as f32, self.image.height() as f32);
        let crop_x = (region.left * src_w).floor().clamp(0.0, src_w - 1.0) as u32;
        let crop_y = (region.top * src_h).floor().clamp(0.0, src_h - 1.0) as u32;
        let crop_w = ((region.width() * src_w).round() as u32)
            .clamp(1, self.image.width() - crop_x);
        let crop_h = ((region.height() * src_h).round() as u32)
            .clamp(1, self.image.height() - crop_y);

        let (out_w, out_h) = region_pixel_size(region, self.aspect_ratio(), target_width, zoom);

        let cropped = imageops::crop_imm(&self.image, crop_x, crop_y, crop_w, crop_h).to_image();
        let scaled = imageops::resize(&cropped, out_w, out_h, FilterType::Triangle);

        Ok(RasterSurface::new(out_w, out_h, scaled.into_raw()))
    }
}

// =============================================================================
// Synthetic Codec
// =============================================================================

/// Renders a procedural checker-and-gradient page, for demos and tests.
///
/// Pixels are sampled in absolute page coordinates, so adjacent tiles
/// compose seamlessly regardless of how the page is sliced.
pub struct SyntheticCodec {
    aspect_ratio: f32,
    checker_cells: u32,
}

impl SyntheticCodec {
    pub fn new(aspect_ratio: f32) -> Self {
        Self {
            aspect_ratio,
            checker_cells: 8,
        }
    }

    fn sample(&self, page_index: usize, u: f32, v: f32) -> [u8; 4] {
        let cu = (u * self.checker_cells as f32) as u32;
        let cv = (v * self.checker_cells as f32) as u32;
        let base: u8 = if (cu + cv) % 2 == 0 { 220 } else { 160 };
        [
            base.saturating_sub((u * 80.0) as u8),
            base.saturating_sub((v * 80.0) as u8),
            base.saturating_sub((page_index % 7) as u8 * 20),
            255,
        ]
    }
}

#[async_trait]
impl PageCodec for SyntheticCodec {
    async fn decode_region(
        &self,
        page_index: usize,
        region: RectF,
        target_width: u32,
        zoom: f32,
    ) -> Result<RasterSurface, DecodeError> {
        let (w, h) = region_pixel_size(region, self.aspect_ratio, target_width, zoom);

        let mut pixels = Vec::with_capacity((w * h * 4) as usize);
        for y in 0..h {
            let v = region.top + (y as f32 + 0.5) / h as f32 * region.height();
            for x in 0..w {
                let u = region.left + (x as f32 + 0.5) / w as f32 * region.width();
                pixels.extend_from_slice(&self.sample(page_index, u, v));
            }
        }

        Ok(RasterSurface::new(w, h, pixels))
    }
}

// =============================================================================
// Tests
// =============================================================================
