//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations every backend must
//! support: identify (decode enough of an image to know what it is) and crop
//! (center-crop, resample, encode).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Backends work on in-memory bytes: slides are owned by the
//! collection, never re-read from disk.

use super::params::{CropParams, Overlay};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Not a decodable image: {0}")]
    Decode(String),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Pixel dimensions of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Result of an identify operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub dimensions: Dimensions,
    /// MIME type of the encoded bytes, e.g. `image/jpeg`.
    pub mime: String,
}

/// Trait for image processing backends.
///
/// `Sync` so crops and decodes can fan out over rayon.
pub trait ImageBackend: Sync {
    /// Decode `bytes` far enough to learn format and dimensions.
    fn identify(&self, bytes: &[u8]) -> Result<ImageInfo, BackendError>;

    /// Center-crop `bytes` to the params' frame and encode as JPEG.
    ///
    /// The output is always exactly `target_width × target_height`.
    fn crop(
        &self,
        bytes: &[u8],
        params: &CropParams,
        overlay: Option<&Overlay>,
    ) -> Result<Vec<u8>, BackendError>;
}
