//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides which crop a slide needs) and the [`backend`](super::backend)
//! (which does the actual pixel work). This separation allows swapping backends
//! (e.g. for testing with a mock) without changing operation logic.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 85). Clamped on construction.
//! - [`CropParams`]: Target frame and quality for a center crop.
//! - [`Overlay`]: Optional safe-zone overlay painted onto a preview crop.

use super::calculations::PixelRect;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    /// JPEG quality 85, the `0.85` factor carousel crops are encoded with.
    fn default() -> Self {
        Self(85)
    }
}

/// Parameters for a center crop to a fixed frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropParams {
    /// Output width in pixels; also the width term of the target aspect.
    pub target_width: u32,
    /// Output height in pixels; also the height term of the target aspect.
    pub target_height: u32,
    pub quality: Quality,
}

impl CropParams {
    pub fn new(target_width: u32, target_height: u32, quality: Quality) -> Self {
        Self {
            target_width,
            target_height,
            quality,
        }
    }

    /// Target aspect ratio (width / height).
    pub fn aspect(&self) -> f64 {
        self.target_width as f64 / self.target_height as f64
    }
}

impl Default for CropParams {
    /// 1080×1350, the 4:5 portrait carousel frame.
    fn default() -> Self {
        Self::new(1080, 1350, Quality::default())
    }
}

/// Safe-zone overlay painted on top of a finished crop.
///
/// The whole frame is darkened and the zone border is stroked in red.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlay {
    pub zone: PixelRect,
    /// Border width in output pixels.
    pub stroke: u32,
    /// Alpha (0–255) of the black wash over the frame.
    pub shade: u8,
}

impl Overlay {
    pub fn safe_zone(zone: PixelRect) -> Self {
        Self {
            zone,
            stroke: 5,
            shade: 77,
        }
    }
}
