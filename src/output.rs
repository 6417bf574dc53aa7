//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every slide is shown by its 1-based position and filename, the same way
//! it appears in the exported documents. Secondary facts (dimensions, paths,
//! failure reasons) follow as detail or indented context lines.
//!
//! # Output Format
//!
//! ## List
//!
//! ```text
//! Slides (3 of 20)
//! 001 01-dawn.jpg (4032×3024)
//! 002 02-noon.jpg (3024×4032)
//! 003 02-noon.jpg (3024×4032)
//!
//! Caption: Golden hour
//! Tags: #sunset #travel
//! Dark mode: off
//! Safe zone: on
//! ```
//!
//! ## Add
//!
//! ```text
//! Adding 3 of 4 images
//! 004 05-dusk.jpg (4032×3024)
//! Rejected 06-night.jpg
//!     Carousel is full (20 images)
//! Failed notes.jpg
//!     Cannot decode notes.jpg: Not a decodable image: ...
//! ```
//!
//! ## Export
//!
//! ```text
//! Exporting moodboard (12 images)
//!     Skipped 003 broken.jpg: Not a decodable image: ...
//! moodboard → out/moodboard.pdf (2 pages, 11 images, 1 skipped)
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for
//! testability and, where the CLI prints it directly, a `print_*` wrapper
//! that writes to stdout. Format functions are pure: no I/O, no side effects.

use crate::collection::{CaptionMetadata, ImageCollection};
use crate::export::{ExportEvent, ExportKind, ExportReport};
use crate::intake::IntakeEvent;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format a slide line: position, filename and pixel size.
///
/// ```text
/// 001 01-dawn.jpg (4032×3024)
/// ```
fn slide_line(position: usize, filename: &str, width: u32, height: u32) -> String {
    format!(
        "{} {} ({}\u{00d7}{})",
        format_index(position),
        filename,
        width,
        height
    )
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

// ============================================================================
// List
// ============================================================================

/// Format the board listing.
pub fn format_listing(
    collection: &ImageCollection,
    metadata: &CaptionMetadata,
    dark_mode: bool,
    safe_zone: bool,
) -> Vec<String> {
    let mut lines = vec![format!(
        "Slides ({} of {})",
        collection.len(),
        collection.capacity()
    )];
    for entry in collection.iter() {
        let (w, h) = entry.dimensions();
        lines.push(slide_line(entry.label(), entry.filename(), w, h));
    }
    lines.push(String::new());
    if let Some(caption) = metadata.caption() {
        let mut caption_lines = caption.lines();
        if let Some(first) = caption_lines.next() {
            lines.push(format!("Caption: {first}"));
        }
        lines.extend(caption_lines.map(|l| format!("{}{l}", indent(1))));
    }
    if let Some(tags) = metadata.tags() {
        lines.push(format!("Tags: {tags}"));
    }
    lines.push(format!("Dark mode: {}", on_off(dark_mode)));
    lines.push(format!("Safe zone: {}", on_off(safe_zone)));
    lines
}

/// Print the board listing to stdout.
pub fn print_listing(
    collection: &ImageCollection,
    metadata: &CaptionMetadata,
    dark_mode: bool,
    safe_zone: bool,
) {
    for line in format_listing(collection, metadata, dark_mode, safe_zone) {
        println!("{}", line);
    }
}

// ============================================================================
// Intake events
// ============================================================================

/// Format a single intake progress event as display lines.
pub fn format_intake_event(event: &IntakeEvent) -> Vec<String> {
    match event {
        IntakeEvent::Started {
            submitted,
            admitted,
        } => {
            if submitted == admitted {
                vec![format!("Adding {}", plural(*admitted, "image", "images"))]
            } else {
                vec![format!("Adding {} of {} images", admitted, submitted)]
            }
        }
        IntakeEvent::Added {
            position,
            filename,
            width,
            height,
        } => vec![slide_line(*position, filename, *width, *height)],
        IntakeEvent::Rejected { filename, max } => vec![
            format!("Rejected {}", filename),
            format!("{}Carousel is full ({} images)", indent(1), max),
        ],
        IntakeEvent::Failed { filename, error } => vec![
            format!("Failed {}", filename),
            format!("{}{}", indent(1), error),
        ],
    }
}

// ============================================================================
// Export events
// ============================================================================

/// One-line summary of a finished export.
///
/// ```text
/// moodboard → out/moodboard.pdf (2 pages, 11 images, 1 skipped)
/// filename list → out/carousel_filenames.txt (3 names)
/// ```
pub fn format_export_report(report: &ExportReport) -> String {
    let detail = match report.kind {
        ExportKind::Filenames => plural(report.items, "name", "names"),
        ExportKind::Metadata => format!(
            "{}, {}",
            plural(report.pages, "page", "pages"),
            plural(report.items, "image", "images")
        ),
        ExportKind::Moodboard => {
            let mut detail = format!(
                "{}, {}",
                plural(report.pages, "page", "pages"),
                plural(report.items, "image", "images")
            );
            if !report.skipped.is_empty() {
                detail.push_str(&format!(", {} skipped", report.skipped.len()));
            }
            detail
        }
    };
    format!(
        "{} \u{2192} {} ({})",
        report.kind,
        report.path.display(),
        detail
    )
}

/// Format a single export progress event as display lines.
pub fn format_export_event(event: &ExportEvent) -> Vec<String> {
    match event {
        ExportEvent::Started { kind, items } => {
            vec![format!("Exporting {} ({})", kind, plural(*items, "image", "images"))]
        }
        ExportEvent::ItemSkipped { item, .. } => vec![format!(
            "{}Skipped {} {}: {}",
            indent(1),
            format_index(item.position),
            item.filename,
            item.reason
        )],
        ExportEvent::Finished { report, .. } => vec![format_export_report(report)],
    }
}

// ============================================================================
// Tests
// ============================================================================
