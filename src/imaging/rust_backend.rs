//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP, GIF, BMP) | `image::ImageReader` with format sniffing |
//! | Crop | `image::DynamicImage::crop_imm` on the [`crop_region`](super::calculations::crop_region) |
//! | Resample | `image::DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` at the params' quality |
//! | Safe-zone overlay | per-pixel wash + stroke on the `RgbImage` |
//!
//! Lanczos3 is deterministic, so the same bytes and params always encode to
//! the same output.

use super::backend::{BackendError, Dimensions, ImageBackend, ImageInfo};
use super::calculations::{PixelRect, crop_region};
use super::params::{CropParams, Overlay};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader, RgbImage};
use std::io::Cursor;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, BackendError> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(BackendError::Io)
}

/// Decode an in-memory image, sniffing the format from its magic bytes.
fn load_image(bytes: &[u8]) -> Result<DynamicImage, BackendError> {
    reader(bytes)?
        .decode()
        .map_err(|e| BackendError::Decode(e.to_string()))
}

/// Encode as baseline JPEG at the given quality.
fn encode_jpeg(img: RgbImage, quality: u8) -> Result<Vec<u8>, BackendError> {
    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, quality);
    DynamicImage::ImageRgb8(img)
        .write_with_encoder(encoder)
        .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {}", e)))?;
    Ok(out)
}

/// Wash the whole frame with translucent black and stroke the zone border red.
///
/// The stroke straddles the zone edge, half inside and half outside.
fn paint_overlay(img: &mut RgbImage, overlay: &Overlay) {
    let PixelRect {
        x,
        y,
        width,
        height,
    } = overlay.zone;
    let (left, top) = (x as i64, y as i64);
    let (right, bottom) = (left + width as i64, top + height as i64);
    let outer = (overlay.stroke / 2) as i64;
    let inner = overlay.stroke as i64 - outer;
    let keep = 255 - overlay.shade as u32;

    for (px, py, pixel) in img.enumerate_pixels_mut() {
        let (px, py) = (px as i64, py as i64);
        let in_outer = px >= left - outer
            && px < right + outer
            && py >= top - outer
            && py < bottom + outer;
        let in_inner = px >= left + inner
            && px < right - inner
            && py >= top + inner
            && py < bottom - inner;

        if in_outer && !in_inner {
            pixel.0 = [255, 0, 0];
        } else {
            for channel in pixel.0.iter_mut() {
                *channel = (*channel as u32 * keep / 255) as u8;
            }
        }
    }
}

impl ImageBackend for RustBackend {
    fn identify(&self, bytes: &[u8]) -> Result<ImageInfo, BackendError> {
        let reader = reader(bytes)?;
        let format = reader
            .format()
            .ok_or_else(|| BackendError::Decode("unrecognised image format".into()))?;
        // Full decode: a truncated file must fail here, not at export time.
        let img = reader
            .decode()
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok(ImageInfo {
            dimensions: Dimensions {
                width: img.width(),
                height: img.height(),
            },
            mime: format.to_mime_type().to_string(),
        })
    }

    fn crop(
        &self,
        bytes: &[u8],
        params: &CropParams,
        overlay: Option<&Overlay>,
    ) -> Result<Vec<u8>, BackendError> {
        if params.target_width == 0 || params.target_height == 0 {
            return Err(BackendError::ProcessingFailed(
                "crop target must be non-empty".into(),
            ));
        }
        let img = load_image(bytes)?;
        let source = (img.width(), img.height());
        let rect = crop_region(source, (params.target_width, params.target_height))
            .to_pixels(source);

        let mut framed = img
            .crop_imm(rect.x, rect.y, rect.width, rect.height)
            .resize_exact(params.target_width, params.target_height, FilterType::Lanczos3)
            .to_rgb8();

        if let Some(overlay) = overlay {
            paint_overlay(&mut framed, overlay);
        }

        encode_jpeg(framed, params.quality.value())
    }
}
