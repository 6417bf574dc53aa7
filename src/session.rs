//! A board session: the collection plus everything persisted alongside it.
//!
//! [`Session`] is the single owner of mutable board state. Structural edits
//! (add, remove, duplicate, replace, reorder, clear, toggles) are written to
//! the store straight away. Caption and tag edits arrive keystroke by
//! keystroke, so they only arm a [`Debouncer`]; the write happens once the
//! edits go quiet ([`tick`](Session::tick)) or when the caller
//! [`flush`](Session::flush)es.
//!
//! Store failures never abort an edit. They are logged and the session
//! carries on in memory.

use crate::collection::{CaptionMetadata, CollectionError, ImageCollection, SlideEntry};
use crate::config::BoardConfig;
use crate::debounce::Debouncer;
use crate::imaging::{self, BackendError, CropParams, ImageBackend};
use crate::intake::{self, BatchReport, ImageSource, IntakeError, IntakeEvent};
use crate::state::{self, KeyValueStore, PersistedState};
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Collection(#[from] CollectionError),
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

pub struct Session<S: KeyValueStore> {
    collection: ImageCollection,
    metadata: CaptionMetadata,
    dark_mode: bool,
    safe_zone: bool,
    store: S,
    debouncer: Debouncer,
}

impl<S: KeyValueStore> Session<S> {
    /// An empty session writing to `store`.
    pub fn new(store: S, config: &BoardConfig) -> Self {
        Self {
            collection: ImageCollection::with_capacity(config.collection.max_images),
            metadata: CaptionMetadata::default(),
            dark_mode: false,
            safe_zone: false,
            store,
            debouncer: Debouncer::new(Duration::from_millis(config.persistence.debounce_ms)),
        }
    }

    /// Restore the session saved in `store`.
    ///
    /// A missing record gives an empty session. An unreadable record is
    /// logged and also gives an empty session. Saved images that no longer
    /// decode, or that exceed the configured capacity, are skipped.
    pub fn open(store: S, config: &BoardConfig, backend: &impl ImageBackend) -> Self {
        let saved = match state::restore_state(&store) {
            Ok(saved) => saved,
            Err(e) => {
                tracing::warn!("could not restore saved board, starting empty: {e}");
                None
            }
        };
        let mut session = Self::new(store, config);
        if let Some(saved) = saved {
            session.apply(saved, backend);
        }
        session
    }

    fn apply(&mut self, saved: PersistedState, backend: &impl ImageBackend) {
        self.metadata = saved.metadata();
        self.dark_mode = saved.dark_mode;
        self.safe_zone = saved.safe_zone;
        for image in saved.images {
            let slide = state::decode_data_url(&image.src)
                .map_err(|e| e.to_string())
                .and_then(|data| {
                    let source = ImageSource::Bytes {
                        data,
                        filename: image.filename.clone(),
                    };
                    intake::load_slide(backend, &source).map_err(|e| e.to_string())
                });
            let result = slide.and_then(|slide| {
                self.collection.add(slide).map(|_| ()).map_err(|e| e.to_string())
            });
            if let Err(reason) = result {
                tracing::warn!(filename = %image.filename, "dropping saved slide: {reason}");
            }
        }
    }

    pub fn collection(&self) -> &ImageCollection {
        &self.collection
    }

    pub fn metadata(&self) -> &CaptionMetadata {
        &self.metadata
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn safe_zone(&self) -> bool {
        self.safe_zone
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Snapshot of the current state, as it would be persisted.
    pub fn snapshot(&self) -> PersistedState {
        PersistedState::capture(
            &self.collection,
            &self.metadata,
            self.dark_mode,
            self.safe_zone,
        )
    }

    /// Write the full snapshot now. Any pending debounced write is covered.
    fn persist(&mut self) {
        self.debouncer.cancel();
        let snapshot = self.snapshot();
        if let Err(e) = state::save_state(&mut self.store, &snapshot) {
            tracing::warn!("could not save board, keeping changes in memory: {e}");
        }
    }

    // =========================================================================
    // Structural edits (persisted immediately)
    // =========================================================================

    /// Import a batch of sources. See [`intake::import_batch`].
    pub fn add_batch(
        &mut self,
        sources: Vec<ImageSource>,
        backend: &impl ImageBackend,
        events: Option<&Sender<IntakeEvent>>,
    ) -> BatchReport {
        let report = intake::import_batch(&mut self.collection, sources, backend, events);
        if !report.added.is_empty() {
            self.persist();
        }
        report
    }

    /// Remove the slide at `index`. Out of range is a no-op.
    pub fn remove(&mut self, index: usize) -> Option<SlideEntry> {
        let removed = self.collection.remove(index);
        if removed.is_some() {
            self.persist();
        }
        removed
    }

    pub fn duplicate(&mut self, index: usize) -> Result<usize, CollectionError> {
        let new_index = self.collection.duplicate(index)?;
        self.persist();
        Ok(new_index)
    }

    /// Swap the image at `index` for `source`, keeping its position.
    pub fn replace(
        &mut self,
        index: usize,
        source: &ImageSource,
        backend: &impl ImageBackend,
    ) -> Result<(), SessionError> {
        if index >= self.collection.len() {
            return Err(CollectionError::IndexOutOfRange {
                index,
                len: self.collection.len(),
            }
            .into());
        }
        let slide = intake::load_slide(backend, source)?;
        self.collection.replace_image(index, slide)?;
        self.persist();
        Ok(())
    }

    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), CollectionError> {
        self.collection.reorder(from, to)?;
        self.persist();
        Ok(())
    }

    pub fn clear(&mut self) {
        self.collection.clear();
        self.persist();
    }

    pub fn set_dark_mode(&mut self, on: bool) {
        self.dark_mode = on;
        self.persist();
    }

    pub fn set_safe_zone(&mut self, on: bool) {
        self.safe_zone = on;
        self.persist();
    }

    // =========================================================================
    // Text edits (debounced)
    // =========================================================================

    pub fn set_caption(&mut self, caption: impl Into<String>, now: Instant) {
        self.metadata.caption = caption.into();
        self.debouncer.trigger(now);
    }

    pub fn set_tags(&mut self, tags: impl Into<String>, now: Instant) {
        self.metadata.tags = tags.into();
        self.debouncer.trigger(now);
    }

    /// Write pending text edits if they have been quiet long enough.
    /// Returns true if a write happened.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.debouncer.poll(now) {
            self.persist();
            true
        } else {
            false
        }
    }

    /// Write pending text edits immediately.
    pub fn flush(&mut self) {
        if self.debouncer.take_pending() {
            self.persist();
        }
    }

    pub fn has_pending_write(&self) -> bool {
        self.debouncer.is_pending()
    }

    // =========================================================================
    // Previews
    // =========================================================================

    /// The normalized crop of one slide, with the safe-zone overlay painted
    /// on when the toggle is on.
    pub fn crop_slide(
        &self,
        index: usize,
        backend: &impl ImageBackend,
        params: &CropParams,
    ) -> Result<Vec<u8>, SessionError> {
        let entry = self
            .collection
            .get(index)
            .ok_or(CollectionError::IndexOutOfRange {
                index,
                len: self.collection.len(),
            })?;
        Ok(imaging::crop_preview(
            backend,
            entry.image(),
            params,
            self.safe_zone,
        )?)
    }
}
