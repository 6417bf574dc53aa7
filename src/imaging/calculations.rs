//! Pure calculation functions for crop geometry.
//!
//! All functions here are pure and testable without any I/O or images.

/// Source region selected by a center crop, in (fractional) source pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Integer rectangle in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Calculate the center-crop region of `source` that matches the aspect of `target`.
///
/// A source relatively wider than the target keeps its full height and loses
/// equal strips left and right; otherwise it keeps its full width and loses
/// equal strips top and bottom.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `target` - Target frame dimensions (width, height)
///
/// # Examples
/// ```
/// # use carousel_board::imaging::crop_region;
/// // 2000x1000 landscape → 4:5 frame: keep 800px of width, centered
/// let region = crop_region((2000, 1000), (1080, 1350));
/// assert_eq!((region.x, region.width), (600.0, 800.0));
/// ```
pub fn crop_region(source: (u32, u32), target: (u32, u32)) -> CropRegion {
    let (src_w, src_h) = (source.0 as f64, source.1 as f64);
    let (tgt_w, tgt_h) = (target.0 as f64, target.1 as f64);
    let src_aspect = src_w / src_h;
    let tgt_aspect = tgt_w / tgt_h;

    // Multiply before dividing so equal aspects come out exact; the clamp
    // keeps float noise from producing a negative offset.
    if src_aspect > tgt_aspect {
        let sw = (src_h * tgt_w / tgt_h).min(src_w);
        CropRegion {
            x: (src_w - sw) / 2.0,
            y: 0.0,
            width: sw,
            height: src_h,
        }
    } else {
        let sh = (src_w * tgt_h / tgt_w).min(src_h);
        CropRegion {
            x: 0.0,
            y: (src_h - sh) / 2.0,
            width: src_w,
            height: sh,
        }
    }
}

impl CropRegion {
    /// Snap to whole pixels, staying inside a `bounds` sized source.
    ///
    /// Width and height never drop below one pixel.
    pub fn to_pixels(self, bounds: (u32, u32)) -> PixelRect {
        let (max_w, max_h) = bounds;
        let width = (self.width.round() as u32).clamp(1, max_w.max(1));
        let height = (self.height.round() as u32).clamp(1, max_h.max(1));
        let x = (self.x.max(0.0).round() as u32).min(max_w.saturating_sub(width));
        let y = (self.y.max(0.0).round() as u32).min(max_h.saturating_sub(height));
        PixelRect {
            x,
            y,
            width,
            height,
        }
    }
}

/// Calculate the safe zone of a target frame: its centered square.
///
/// For the 1080×1350 carousel frame this is the 1080×1080 square at y = 135,
/// the part of a portrait slide that survives a square grid preview.
pub fn safe_zone(target: (u32, u32)) -> PixelRect {
    let (w, h) = target;
    let side = w.min(h);
    PixelRect {
        x: (w - side) / 2,
        y: (h - side) / 2,
        width: side,
        height: side,
    }
}
