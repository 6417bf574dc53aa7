//! PDF output via `lopdf`.
//!
//! Each page gets its own content stream and resource dictionary. Images are
//! embedded untouched as `DCTDecode` XObjects, so a cropped slide costs its
//! JPEG size and is never re-encoded. Text is set in base-14 Helvetica with
//! WinAnsi encoding, which needs no embedded font program.

use super::helvetica;
use super::{Align, PageSize, Rect, RenderBackend, RenderError, Rgb, TextStyle};
use image::codecs::jpeg::JpegDecoder;
use image::{ColorType, ImageDecoder};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};
use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;

const FONT_NAME: &str = "F1";

/// [`RenderBackend`] that writes PDF documents.
#[derive(Default)]
pub struct PdfRenderer {
    open: Option<OpenDocument>,
}

struct OpenDocument {
    doc: Document,
    pages_id: ObjectId,
    font_id: ObjectId,
    size: PageSize,
    page_ids: Vec<ObjectId>,
    ops: Vec<Operation>,
    xobjects: Dictionary,
    images: usize,
}

impl PdfRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn document(&mut self) -> Result<&mut OpenDocument, RenderError> {
        self.open.as_mut().ok_or(RenderError::NoDocument)
    }
}

impl OpenDocument {
    fn new(size: PageSize) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        Self {
            doc,
            pages_id,
            font_id,
            size,
            page_ids: Vec::new(),
            ops: Vec::new(),
            xobjects: Dictionary::new(),
            images: 0,
        }
    }

    /// Convert a top-left-origin y to PDF's bottom-left origin.
    fn flip(&self, y: f32) -> f32 {
        self.size.height - y
    }

    fn finish_page(&mut self) -> Result<(), RenderError> {
        let operations = std::mem::take(&mut self.ops);
        let content = Content { operations }.encode()?;
        let content_id = self.doc.add_object(Stream::new(dictionary! {}, content));
        let xobjects = std::mem::take(&mut self.xobjects);
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                self.size.width.into(),
                self.size.height.into(),
            ],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { FONT_NAME => self.font_id },
                "XObject" => xobjects,
            },
        });
        self.page_ids.push(page_id);
        Ok(())
    }

    fn write(mut self, target: &mut impl Write) -> Result<(), RenderError> {
        self.finish_page()?;
        let kids: Vec<Object> = self.page_ids.iter().map(|id| (*id).into()).collect();
        let count = kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc.save_to(target)?;
        Ok(())
    }
}

/// Read width, height and color space from a JPEG header.
fn jpeg_header(bytes: &[u8]) -> Result<(u32, u32, &'static str), RenderError> {
    let decoder = JpegDecoder::new(Cursor::new(bytes))
        .map_err(|e| RenderError::UnsupportedImage(format!("not a JPEG: {e}")))?;
    let (width, height) = decoder.dimensions();
    let color_space = match decoder.color_type() {
        ColorType::L8 | ColorType::L16 => "DeviceGray",
        _ => "DeviceRGB",
    };
    Ok((width, height, color_space))
}

fn color_operands(color: Rgb) -> Vec<Object> {
    vec![color.0.into(), color.1.into(), color.2.into()]
}

impl RenderBackend for PdfRenderer {
    fn new_document(&mut self, page: PageSize) -> Result<(), RenderError> {
        self.open = Some(OpenDocument::new(page));
        Ok(())
    }

    fn draw_image(&mut self, bytes: &[u8], rect: Rect) -> Result<(), RenderError> {
        let (width, height, color_space) = jpeg_header(bytes)?;
        let doc = self.document()?;
        let image_id = doc.doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width as i64,
                "Height" => height as i64,
                "ColorSpace" => color_space,
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            bytes.to_vec(),
        ));
        doc.images += 1;
        let name = format!("Im{}", doc.images);
        doc.xobjects.set(name.as_bytes(), image_id);

        let bottom = doc.flip(rect.y + rect.height);
        doc.ops.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    rect.width.into(),
                    0.into(),
                    0.into(),
                    rect.height.into(),
                    rect.x.into(),
                    bottom.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(name.into_bytes())]),
            Operation::new("Q", vec![]),
        ]);
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) -> Result<(), RenderError> {
        let doc = self.document()?;
        let bottom = doc.flip(rect.y + rect.height);
        doc.ops.extend([
            Operation::new("q", vec![]),
            Operation::new("rg", color_operands(color)),
            Operation::new(
                "re",
                vec![
                    rect.x.into(),
                    bottom.into(),
                    rect.width.into(),
                    rect.height.into(),
                ],
            ),
            Operation::new("f", vec![]),
            Operation::new("Q", vec![]),
        ]);
        Ok(())
    }

    fn draw_text(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        style: &TextStyle,
    ) -> Result<(), RenderError> {
        let left = match style.align {
            Align::Left => x,
            Align::Center => x - helvetica::text_width(text, style.size) / 2.0,
        };
        let doc = self.document()?;
        let baseline = doc.flip(y);
        doc.ops.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![Object::Name(FONT_NAME.into()), style.size.into()]),
            Operation::new("rg", color_operands(style.color)),
            Operation::new("Td", vec![left.into(), baseline.into()]),
            Operation::new(
                "Tj",
                vec![Object::String(helvetica::encode(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);
        Ok(())
    }

    fn measure_text_width(&self, text: &str, size: f32) -> f32 {
        helvetica::text_width(text, size)
    }

    fn new_page(&mut self) -> Result<(), RenderError> {
        self.document()?.finish_page()
    }

    fn save(&mut self, path: &Path) -> Result<(), RenderError> {
        let doc = self.open.take().ok_or(RenderError::NoDocument)?;
        let mut writer = BufWriter::new(File::create(path)?);
        doc.write(&mut writer)?;
        writer.flush()?;
        tracing::debug!(path = %path.display(), "wrote PDF");
        Ok(())
    }
}
