//! Image processing in pure Rust, statically linked.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::ImageReader` (format sniffing + decode) |
//! | **Center crop → JPEG** | `crop_imm` + Lanczos3 `resize_exact` + `JpegEncoder` |
//! | **Safe-zone preview** | crop + overlay wash/stroke |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for crop geometry (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend, ImageInfo};
pub use calculations::{CropRegion, PixelRect, crop_region, safe_zone};
pub use operations::{crop_all, crop_preview, crop_to_aspect, decode};
pub use params::{CropParams, Overlay, Quality};
pub use rust_backend::RustBackend;
