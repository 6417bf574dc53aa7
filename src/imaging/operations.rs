//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take configuration, compute parameters, and call the backend.

use super::backend::{BackendError, ImageBackend, ImageInfo};
use super::calculations::safe_zone;
use super::params::{CropParams, Overlay};
use rayon::prelude::*;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Decode a submitted file far enough to admit it as a slide.
pub fn decode(backend: &impl ImageBackend, bytes: &[u8]) -> Result<ImageInfo> {
    let info = backend.identify(bytes)?;
    if info.dimensions.width == 0 || info.dimensions.height == 0 {
        return Err(BackendError::Decode("image has no pixels".into()));
    }
    Ok(info)
}

/// Center-crop one source image to the params' frame.
pub fn crop_to_aspect(
    backend: &impl ImageBackend,
    bytes: &[u8],
    params: &CropParams,
) -> Result<Vec<u8>> {
    backend.crop(bytes, params, None)
}

/// Center-crop for on-screen review, optionally with the safe-zone overlay.
pub fn crop_preview(
    backend: &impl ImageBackend,
    bytes: &[u8],
    params: &CropParams,
    show_safe_zone: bool,
) -> Result<Vec<u8>> {
    let overlay = show_safe_zone
        .then(|| Overlay::safe_zone(safe_zone((params.target_width, params.target_height))));
    backend.crop(bytes, params, overlay.as_ref())
}

/// Crop many sources in parallel, one result per source, in input order.
pub fn crop_all<S>(
    backend: &impl ImageBackend,
    sources: &[S],
    params: &CropParams,
) -> Vec<Result<Vec<u8>>>
where
    S: AsRef<[u8]> + Sync,
{
    sources
        .par_iter()
        .map(|source| crop_to_aspect(backend, source.as_ref(), params))
        .collect()
}
