//! Document rendering.
//!
//! The exporters describe documents as a sequence of draw calls against the
//! [`RenderBackend`] trait: open a document, draw images, boxes and text,
//! break pages, save. [`PdfRenderer`] turns those calls into a PDF with
//! `lopdf`.
//!
//! All coordinates are in page units (PDF points) with the origin at the
//! top-left corner and y growing downwards. Text `y` is the baseline.

pub mod helvetica;
mod pdf;

pub use pdf::PdfRenderer;

use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("Unsupported image: {0}")]
    UnsupportedImage(String),
    #[error("No document is open")]
    NoDocument,
}

/// Page size in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

/// Axis-aligned rectangle, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// RGB color, components in 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub f32, pub f32, pub f32);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb(1.0, 1.0, 1.0);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    /// `x` is the left edge of the text.
    #[default]
    Left,
    /// `x` is the horizontal center of the text.
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub align: Align,
    pub color: Rgb,
}

impl TextStyle {
    pub fn new(size: f32) -> Self {
        Self {
            size,
            align: Align::Left,
            color: Rgb::BLACK,
        }
    }

    pub fn centered(self) -> Self {
        Self {
            align: Align::Center,
            ..self
        }
    }
}

/// A drawing surface for paginated documents.
///
/// One backend value is owned by one export for its whole run.
pub trait RenderBackend {
    /// Start a fresh document with one empty page.
    fn new_document(&mut self, page: PageSize) -> Result<(), RenderError>;

    /// Draw encoded JPEG `bytes` scaled into `rect`.
    fn draw_image(&mut self, bytes: &[u8], rect: Rect) -> Result<(), RenderError>;

    fn fill_rect(&mut self, rect: Rect, color: Rgb) -> Result<(), RenderError>;

    /// Draw a single line of text with its baseline at `y`.
    fn draw_text(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        style: &TextStyle,
    ) -> Result<(), RenderError>;

    /// Advance width of `text` at font `size`.
    fn measure_text_width(&self, text: &str, size: f32) -> f32;

    /// Break `text` into lines no wider than `max_width`.
    ///
    /// Greedy word wrap. Explicit newlines start a new line; a single word
    /// wider than `max_width` gets a line of its own rather than being split.
    fn wrap_text(&self, text: &str, max_width: f32, size: f32) -> Vec<String> {
        let mut lines = Vec::new();
        for paragraph in text.lines() {
            let mut line = String::new();
            for word in paragraph.split_whitespace() {
                if line.is_empty() {
                    line.push_str(word);
                    continue;
                }
                let candidate = format!("{line} {word}");
                if self.measure_text_width(&candidate, size) <= max_width {
                    line = candidate;
                } else {
                    lines.push(std::mem::take(&mut line));
                    line.push_str(word);
                }
            }
            lines.push(line);
        }
        lines
    }

    /// Finish the current page and start another of the same size.
    fn new_page(&mut self) -> Result<(), RenderError>;

    /// Write the document to `path`.
    fn save(&mut self, path: &Path) -> Result<(), RenderError>;
}
