//! Moodboard, metadata and filename-list exports.
//!
//! One [`ExportService`] drives every export mode. It owns the board
//! configuration and an imaging backend; the rendering backend is borrowed
//! for the duration of one export call.
//!
//! ## Moodboard (`moodboard.pdf`)
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │ Golden hour                 ← caption       │
//! │ #sunset #travel             ← tags          │
//! │      ┌────┐ ┌────┐ ┌────┐ ┌────┐            │
//! │      │    │ │    │ │    │ │    │            │
//! │      │[1] │ │[2] │ │[3] │ │[4] │ ← badges   │
//! │      └────┘ └────┘ └────┘ └────┘            │
//! │      01.jpg 02.jpg 03.jpg 04.jpg ← labels   │
//! └────────────────────────────────────────────┘
//! ```
//!
//! Every slide is cropped to the carousel frame on the rayon pool, then
//! drawn at its [`Placement`](crate::layout::Placement). A slide whose crop
//! or draw fails is logged and left out; its grid cell stays empty so the
//! numbering of the others still matches their collection positions.
//!
//! ## Metadata (`carousel_metadata.pdf`)
//!
//! Title, optional caption and tags blocks (word-wrapped), then the numbered
//! filename list. No images.
//!
//! ## Filename list (`carousel_filenames.txt`)
//!
//! Filenames joined by newlines, in collection order.

use crate::collection::{CaptionMetadata, ImageCollection};
use crate::config::{BoardConfig, TextConfig};
use crate::imaging::{self, ImageBackend};
use crate::layout::{self, BADGE_HEIGHT, BADGE_PADDING, PageGeometry};
use crate::render::{PageSize, Rect, RenderBackend, RenderError, Rgb, TextStyle};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use thiserror::Error;

pub const MOODBOARD_FILENAME: &str = "moodboard.pdf";
pub const METADATA_FILENAME: &str = "carousel_metadata.pdf";
pub const FILENAMES_FILENAME: &str = "carousel_filenames.txt";

const METADATA_TITLE: &str = "Image Metadata";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Nothing to export: the carousel has no images")]
    NoContent,
    #[error("Another export is already running")]
    ExportInProgress,
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Moodboard,
    Metadata,
    Filenames,
}

impl ExportKind {
    pub fn filename(self) -> &'static str {
        match self {
            ExportKind::Moodboard => MOODBOARD_FILENAME,
            ExportKind::Metadata => METADATA_FILENAME,
            ExportKind::Filenames => FILENAMES_FILENAME,
        }
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportKind::Moodboard => "moodboard",
            ExportKind::Metadata => "metadata",
            ExportKind::Filenames => "filename list",
        };
        f.write_str(name)
    }
}

/// A slide left out of a moodboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedItem {
    /// 1-based collection position.
    pub position: usize,
    pub filename: String,
    pub reason: String,
}

/// Progress events emitted during an export.
#[derive(Debug, Clone)]
pub enum ExportEvent {
    Started { kind: ExportKind, items: usize },
    ItemSkipped { kind: ExportKind, item: SkippedItem },
    Finished { kind: ExportKind, report: ExportReport },
}

/// What an export produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub kind: ExportKind,
    pub path: PathBuf,
    /// Pages written (0 for the text export).
    pub pages: usize,
    /// Items that made it into the output.
    pub items: usize,
    pub skipped: Vec<SkippedItem>,
}

/// Busy flag for in-flight exports.
#[derive(Debug, Default)]
struct ExportTrigger {
    busy: AtomicBool,
}

impl ExportTrigger {
    fn begin(&self) -> Result<ExportGuard<'_>, ExportError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ExportError::ExportInProgress)?;
        Ok(ExportGuard { trigger: self })
    }

    fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Clears the busy flag on every exit path.
struct ExportGuard<'a> {
    trigger: &'a ExportTrigger,
}

impl Drop for ExportGuard<'_> {
    fn drop(&mut self) {
        self.trigger.busy.store(false, Ordering::Release);
    }
}

/// Running text position for flowing documents.
struct TextCursor {
    y: f32,
    top: f32,
    bottom: f32,
    left: f32,
    pages: usize,
}

impl TextCursor {
    /// Draw one line at the cursor, breaking the page first if it has run
    /// past the bottom margin.
    fn line(
        &mut self,
        renderer: &mut impl RenderBackend,
        text: &str,
        style: &TextStyle,
        advance: f32,
    ) -> Result<(), RenderError> {
        if self.y > self.bottom {
            renderer.new_page()?;
            self.pages += 1;
            self.y = self.top;
            tracing::debug!(page = self.pages, "metadata page break");
        }
        renderer.draw_text(text, self.left, self.y, style)?;
        self.y += advance;
        Ok(())
    }
}

/// Drives all export modes for one board configuration.
pub struct ExportService<B: ImageBackend> {
    config: BoardConfig,
    backend: B,
    events: Option<Sender<ExportEvent>>,
    trigger: ExportTrigger,
}

impl<B: ImageBackend> ExportService<B> {
    pub fn new(config: BoardConfig, backend: B) -> Self {
        Self {
            config,
            backend,
            events: None,
            trigger: ExportTrigger::default(),
        }
    }

    /// Report progress on `events`.
    pub fn with_events(mut self, events: Sender<ExportEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// True while an export is running on this service.
    pub fn is_busy(&self) -> bool {
        self.trigger.is_busy()
    }

    fn emit(&self, event: ExportEvent) {
        if let Some(tx) = &self.events {
            tx.send(event).ok();
        }
    }

    /// Announce the export and hand the thread back once before heavy work.
    fn announce(&self, kind: ExportKind, items: usize) {
        self.emit(ExportEvent::Started { kind, items });
        std::thread::yield_now();
    }

    fn finish(&self, report: ExportReport) -> ExportReport {
        self.emit(ExportEvent::Finished {
            kind: report.kind,
            report: report.clone(),
        });
        report
    }

    fn skip(&self, skipped: &mut Vec<SkippedItem>, item: SkippedItem) {
        tracing::warn!(
            position = item.position,
            filename = %item.filename,
            "leaving slide out of moodboard: {}",
            item.reason
        );
        self.emit(ExportEvent::ItemSkipped {
            kind: ExportKind::Moodboard,
            item: item.clone(),
        });
        skipped.push(item);
    }

    fn page_size(geometry: &PageGeometry) -> PageSize {
        PageSize {
            width: geometry.page_width,
            height: geometry.page_height,
        }
    }

    /// Render the thumbnail grid to `out_dir/moodboard.pdf`.
    pub fn export_moodboard(
        &self,
        collection: &ImageCollection,
        metadata: &CaptionMetadata,
        renderer: &mut impl RenderBackend,
        out_dir: &Path,
    ) -> Result<ExportReport, ExportError> {
        if collection.is_empty() {
            return Err(ExportError::NoContent);
        }
        let _guard = self.trigger.begin()?;
        self.announce(ExportKind::Moodboard, collection.len());

        let geometry = self.config.page_geometry();
        let text = &self.config.text;
        let sources: Vec<Arc<[u8]>> = collection.iter().map(|e| e.image_arc()).collect();
        let crops = imaging::crop_all(&self.backend, &sources, &self.config.crop_params());

        let caption = metadata.caption().map(single_line);
        let tags = metadata.tags().map(single_line);
        let header_height = text.header_height(caption.is_some(), tags.is_some());
        let placements = layout::paginate(&geometry, collection.len(), header_height);

        std::fs::create_dir_all(out_dir)?;
        renderer.new_document(Self::page_size(&geometry))?;

        let mut y = geometry.margin_y;
        if let Some(caption) = &caption {
            renderer.draw_text(caption, geometry.margin_x, y, &TextStyle::new(text.caption_size))?;
            y += text.caption_line;
        }
        if let Some(tags) = &tags {
            renderer.draw_text(tags, geometry.margin_x, y, &TextStyle::new(text.tags_size))?;
        }

        let mut page = 0;
        let mut drawn = 0;
        let mut skipped = Vec::new();
        for ((placement, entry), crop) in placements.iter().zip(collection.iter()).zip(crops) {
            while page < placement.page {
                renderer.new_page()?;
                page += 1;
            }
            let outcome = crop.map_err(|e| e.to_string()).and_then(|jpeg| {
                draw_slide(&mut *renderer, placement, entry.filename(), &jpeg, text)
                    .map_err(|e| e.to_string())
            });
            if let Err(reason) = outcome {
                self.skip(
                    &mut skipped,
                    SkippedItem {
                        position: placement.number(),
                        filename: entry.filename().to_string(),
                        reason,
                    },
                );
                continue;
            }
            drawn += 1;
        }

        let path = out_dir.join(MOODBOARD_FILENAME);
        renderer.save(&path)?;
        Ok(self.finish(ExportReport {
            kind: ExportKind::Moodboard,
            path,
            pages: layout::page_count(&placements),
            items: drawn,
            skipped,
        }))
    }

    /// Write the caption, tags and numbered filename list to
    /// `out_dir/carousel_metadata.pdf`.
    pub fn export_metadata(
        &self,
        collection: &ImageCollection,
        metadata: &CaptionMetadata,
        renderer: &mut impl RenderBackend,
        out_dir: &Path,
    ) -> Result<ExportReport, ExportError> {
        if collection.is_empty() {
            return Err(ExportError::NoContent);
        }
        let _guard = self.trigger.begin()?;
        self.announce(ExportKind::Metadata, collection.len());

        let geometry = self.config.page_geometry();
        let text = &self.config.text;
        let wrap_width = geometry.text_width();

        std::fs::create_dir_all(out_dir)?;
        renderer.new_document(Self::page_size(&geometry))?;

        let mut cursor = TextCursor {
            y: geometry.margin_y,
            top: geometry.margin_y,
            bottom: geometry.page_height - geometry.margin_y,
            left: geometry.margin_x,
            pages: 1,
        };
        let heading = TextStyle::new(text.heading_size);
        let body = TextStyle::new(text.body_size);

        cursor.line(
            renderer,
            METADATA_TITLE,
            &TextStyle::new(text.title_size),
            text.line_height + text.section_gap,
        )?;

        for (label, value) in [("Caption:", metadata.caption()), ("Tags:", metadata.tags())] {
            let Some(value) = value else { continue };
            cursor.line(renderer, label, &heading, text.line_height)?;
            for line in renderer.wrap_text(value, wrap_width, text.body_size) {
                cursor.line(renderer, &line, &body, text.line_height)?;
            }
            cursor.y += text.section_gap;
        }

        cursor.line(renderer, "Images:", &heading, text.line_height)?;
        for entry in collection.iter() {
            let line = format!("{}. {}", entry.label(), entry.filename());
            cursor.line(renderer, &line, &body, text.line_height)?;
        }

        let path = out_dir.join(METADATA_FILENAME);
        renderer.save(&path)?;
        Ok(self.finish(ExportReport {
            kind: ExportKind::Metadata,
            path,
            pages: cursor.pages,
            items: collection.len(),
            skipped: Vec::new(),
        }))
    }

    /// Write the newline-joined filename list to `out_dir/carousel_filenames.txt`.
    pub fn export_filename_list(
        &self,
        collection: &ImageCollection,
        out_dir: &Path,
    ) -> Result<ExportReport, ExportError> {
        let contents = filename_list(collection)?;
        self.announce(ExportKind::Filenames, collection.len());
        std::fs::create_dir_all(out_dir)?;
        let path = out_dir.join(FILENAMES_FILENAME);
        std::fs::write(&path, contents)?;
        Ok(self.finish(ExportReport {
            kind: ExportKind::Filenames,
            path,
            pages: 0,
            items: collection.len(),
            skipped: Vec::new(),
        }))
    }
}

/// Filenames in collection order, one per line.
pub fn filename_list(collection: &ImageCollection) -> Result<String, ExportError> {
    if collection.is_empty() {
        return Err(ExportError::NoContent);
    }
    Ok(collection.filenames().join("\n"))
}

/// Collapse runs of whitespace, newlines included, to single spaces.
fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Thumbnail, number badge and filename label of one slide.
fn draw_slide(
    renderer: &mut impl RenderBackend,
    placement: &layout::Placement,
    filename: &str,
    jpeg: &[u8],
    text: &TextConfig,
) -> Result<(), RenderError> {
    let rect = Rect::new(placement.x, placement.y, placement.width, placement.height);
    renderer.draw_image(jpeg, rect)?;
    draw_badge(renderer, placement, text)?;
    let (label_x, label_y) = placement.label_anchor();
    renderer.draw_text(
        filename,
        label_x,
        label_y,
        &TextStyle::new(text.label_size).centered(),
    )
}

/// White box with the 1-based sequence number near the bottom-left corner.
fn draw_badge(
    renderer: &mut impl RenderBackend,
    placement: &layout::Placement,
    text: &TextConfig,
) -> Result<(), RenderError> {
    let number = placement.number().to_string();
    let width = renderer.measure_text_width(&number, text.badge_size) + 2.0 * BADGE_PADDING;
    let (bx, by) = placement.badge_origin();
    renderer.fill_rect(Rect::new(bx, by, width, BADGE_HEIGHT), Rgb::WHITE)?;
    let (tx, ty) = placement.badge_text_origin();
    renderer.draw_text(&number, tx, ty, &TextStyle::new(text.badge_size))
}
