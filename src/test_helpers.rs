//! Shared test utilities for the carousel-board test suite.
//!
//! Provides in-memory image builders, slide/collection fixtures that pair
//! with the imaging `MockBackend`, and small lookup helpers.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let collection = collection_of(&["a.jpg", "b.jpg", "c.jpg"]);
//! assert_eq!(filenames(&collection), ["a.jpg", "b.jpg", "c.jpg"]);
//!
//! let real = RustBackend::new().identify(&png_bytes(64, 48)).unwrap();
//! ```

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, RgbImage};

use crate::collection::{ImageCollection, NewSlide};
use crate::imaging::backend::tests::mock_payload;

// =========================================================================
// Image builders
// =========================================================================

/// A `w × h` RGB gradient. Varied pixels keep encoders honest.
pub fn gradient(w: u32, h: u32) -> RgbImage {
    RgbImage::from_fn(w, h, |x, y| {
        image::Rgb([
            (x * 255 / w.max(1)) as u8,
            (y * 255 / h.max(1)) as u8,
            ((x + y) % 256) as u8,
        ])
    })
}

fn encode(img: RgbImage, format: ImageFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut out, format)
        .unwrap();
    out.into_inner()
}

/// PNG-encoded gradient.
pub fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    encode(gradient(w, h), ImageFormat::Png)
}

/// JPEG-encoded gradient.
pub fn jpeg_bytes(w: u32, h: u32) -> Vec<u8> {
    encode(gradient(w, h), ImageFormat::Jpeg)
}

/// Write PNG files named `names` into `dir` and return their paths in order.
pub fn write_png_files(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
    names
        .iter()
        .map(|name| {
            let path = dir.join(name);
            std::fs::write(&path, png_bytes(16, 20)).unwrap();
            path
        })
        .collect()
}

// =========================================================================
// Slide and collection fixtures (MockBackend payloads)
// =========================================================================

/// A slide whose bytes `MockBackend` identifies as `w × h`.
pub fn mock_slide(filename: &str, w: u32, h: u32) -> NewSlide {
    NewSlide::new(mock_payload(w, h), filename, w, h)
}

/// A default-capacity collection holding one mock slide per filename.
pub fn collection_of(names: &[&str]) -> ImageCollection {
    let mut collection = ImageCollection::new();
    for (i, name) in names.iter().enumerate() {
        let w = 100 + i as u32;
        collection.add(mock_slide(name, w, 125)).unwrap();
    }
    collection
}

// =========================================================================
// Lookups
// =========================================================================

/// Filenames in collection order.
pub fn filenames(collection: &ImageCollection) -> Vec<&str> {
    collection.filenames()
}

/// Labels in collection order.
pub fn labels(collection: &ImageCollection) -> Vec<usize> {
    collection.iter().map(|e| e.label()).collect()
}

/// Assert labels run `1..=len` with no gaps.
pub fn assert_labels_sequential(collection: &ImageCollection) {
    let expected: Vec<usize> = (1..=collection.len()).collect();
    assert_eq!(labels(collection), expected, "labels out of sequence");
}
