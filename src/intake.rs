//! Batch image intake.
//!
//! Adding files is a three-step affair:
//!
//! 1. **Reserve** one collection slot per source, in submission order.
//!    Sources past the capacity are rejected before anything is decoded.
//! 2. **Decode** every admitted source in parallel on the rayon pool.
//! 3. **Apply** results in submission order: successes are appended,
//!    failures give their slot back.
//!
//! Decodes finish in any order, but the collection only ever sees them in
//! the order they were submitted, so a batch of `01.jpg … 05.jpg` lands as
//! `01 … 05` no matter which decode wins.

use crate::collection::{ImageCollection, NewSlide};
use crate::imaging::{self, BackendError, ImageBackend};
use crate::naming::{display_filename, slide_order};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::WalkDir;

/// Extensions picked up when a directory is imported.
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "webp", "gif", "bmp", "tif", "tiff",
];

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Cannot decode {filename}: {source}")]
    Decode {
        filename: String,
        source: BackendError,
    },
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Something the user handed us to add.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// A file on disk, read during the decode step.
    Path(PathBuf),
    /// Bytes already in memory, e.g. pasted from a clipboard.
    Bytes { data: Vec<u8>, filename: String },
}

impl ImageSource {
    pub fn filename(&self) -> String {
        match self {
            ImageSource::Path(path) => display_filename(path),
            ImageSource::Bytes { filename, .. } => filename.clone(),
        }
    }

    fn read(&self) -> Result<Vec<u8>, IntakeError> {
        match self {
            ImageSource::Path(path) => std::fs::read(path).map_err(|source| IntakeError::Io {
                path: path.clone(),
                source,
            }),
            ImageSource::Bytes { data, .. } => Ok(data.clone()),
        }
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        ImageSource::Path(path)
    }
}

/// Progress events emitted during a batch.
#[derive(Debug, Clone)]
pub enum IntakeEvent {
    /// `admitted` of `submitted` sources got a slot and are decoding.
    Started { submitted: usize, admitted: usize },
    /// Appended at 1-based `position`.
    Added {
        position: usize,
        filename: String,
        width: u32,
        height: u32,
    },
    /// No slot left.
    Rejected { filename: String, max: usize },
    /// Read or decode failed; the slot was released.
    Failed { filename: String, error: String },
}

/// Outcome of one batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// `(1-based position, filename)` of each appended slide.
    pub added: Vec<(usize, String)>,
    /// Sources turned away for lack of capacity.
    pub rejected: Vec<String>,
    /// Sources that failed to read or decode.
    pub failed: Vec<(String, String)>,
}

fn emit(events: Option<&Sender<IntakeEvent>>, event: IntakeEvent) {
    if let Some(tx) = events {
        tx.send(event).ok();
    }
}

/// Read and decode one source into a slide ready to append.
pub fn load_slide(
    backend: &impl ImageBackend,
    source: &ImageSource,
) -> Result<NewSlide, IntakeError> {
    let filename = source.filename();
    let bytes = source.read()?;
    let info = imaging::decode(backend, &bytes).map_err(|source| IntakeError::Decode {
        filename: filename.clone(),
        source,
    })?;
    Ok(NewSlide::new(
        bytes,
        filename,
        info.dimensions.width,
        info.dimensions.height,
    ))
}

/// Add a batch of sources to `collection`. See the [module docs](self).
pub fn import_batch(
    collection: &mut ImageCollection,
    sources: Vec<ImageSource>,
    backend: &impl ImageBackend,
    events: Option<&Sender<IntakeEvent>>,
) -> BatchReport {
    let mut report = BatchReport::default();
    let submitted = sources.len();

    let mut admitted = Vec::new();
    let mut reservations = Vec::new();
    for source in sources {
        match collection.reserve() {
            Ok(reservation) => {
                admitted.push(source);
                reservations.push(reservation);
            }
            Err(e) => {
                let filename = source.filename();
                tracing::warn!(%filename, "{e}");
                emit(
                    events,
                    IntakeEvent::Rejected {
                        filename: filename.clone(),
                        max: collection.capacity(),
                    },
                );
                report.rejected.push(filename);
            }
        }
    }

    emit(
        events,
        IntakeEvent::Started {
            submitted,
            admitted: admitted.len(),
        },
    );

    let decoded: Vec<Result<NewSlide, IntakeError>> = admitted
        .par_iter()
        .map(|source| load_slide(backend, source))
        .collect();

    for ((source, reservation), result) in admitted.iter().zip(reservations).zip(decoded) {
        match result {
            Ok(slide) => {
                let (width, height) = (slide.width, slide.height);
                let filename = slide.filename.clone();
                let index = collection.fulfil(reservation, slide);
                emit(
                    events,
                    IntakeEvent::Added {
                        position: index + 1,
                        filename: filename.clone(),
                        width,
                        height,
                    },
                );
                report.added.push((index + 1, filename));
            }
            Err(e) => {
                collection.release(reservation);
                let filename = source.filename();
                tracing::warn!(%filename, "skipping image: {e}");
                emit(
                    events,
                    IntakeEvent::Failed {
                        filename: filename.clone(),
                        error: e.to_string(),
                    },
                );
                report.failed.push((filename, e.to_string()));
            }
        }
    }

    report
}

fn is_image(path: &Path) -> bool {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    IMAGE_EXTENSIONS.contains(&ext.as_str())
}

/// All image files under `dir`, in slide import order.
///
/// Hidden entries (dot-files, dot-directories) are skipped.
pub fn collect_image_files(dir: &Path) -> Result<Vec<PathBuf>, IntakeError> {
    let mut files = Vec::new();
    let walker = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));
    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_file() && is_image(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort_by(|a, b| slide_order(a, b));
    Ok(files)
}

/// Expand command-line paths: files pass through, directories are walked.
pub fn expand_paths(paths: &[PathBuf]) -> Result<Vec<ImageSource>, IntakeError> {
    let mut sources = Vec::new();
    for path in paths {
        if path.is_dir() {
            sources.extend(collect_image_files(path)?.into_iter().map(ImageSource::Path));
        } else {
            sources.push(ImageSource::Path(path.clone()));
        }
    }
    Ok(sources)
}
