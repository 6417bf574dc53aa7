//! The ordered slide collection.
//!
//! [`ImageCollection`] is the authoritative model of a carousel: insertion
//! order is display and export order, and every listing or document is a
//! projection of it. Two invariants hold after every operation:
//!
//! - `len() <= capacity()` (20 by default), counting slots that are reserved
//!   for decodes still in flight.
//! - The 1-based [`label`](SlideEntry::label) of the entry at index `i` is
//!   `i + 1`. Every structural mutation renumbers before returning.
//!
//! ## Slot reservation
//!
//! Decoding is the slow part of adding a slide, and a batch of files may be
//! decoding at once. Capacity is therefore checked when a decode is
//! *submitted*, not when it completes:
//!
//! ```text
//! reserve()  → Reservation     counts against capacity immediately
//! fulfil(r, slide)             decode succeeded: append, renumber
//! release(r)                   decode failed: give the slot back
//! ```
//!
//! [`add`](ImageCollection::add) is `reserve` + `fulfil` for a slide that is
//! already decoded.

use std::sync::Arc;
use thiserror::Error;

/// Default maximum number of slides in a carousel.
pub const MAX_IMAGES: usize = 20;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollectionError {
    #[error("Maximum of {max} images allowed")]
    CapacityExceeded { max: usize },
    #[error("No slide at index {index} (collection has {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Opaque, stable identity of one slide. Never reused within a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlideId(u64);

/// A decoded image that is ready to become (or replace) a slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSlide {
    /// Encoded source bytes, exactly as submitted.
    pub image: Arc<[u8]>,
    pub filename: String,
    pub width: u32,
    pub height: u32,
}

impl NewSlide {
    pub fn new(
        image: impl Into<Arc<[u8]>>,
        filename: impl Into<String>,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            image: image.into(),
            filename: filename.into(),
            width,
            height,
        }
    }
}

/// One slide in the collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideEntry {
    id: SlideId,
    image: Arc<[u8]>,
    filename: String,
    width: u32,
    height: u32,
    label: usize,
}

impl SlideEntry {
    pub fn id(&self) -> SlideId {
        self.id
    }

    /// Encoded source bytes.
    pub fn image(&self) -> &[u8] {
        &self.image
    }

    /// Shared handle to the source bytes (cheap to clone).
    pub fn image_arc(&self) -> Arc<[u8]> {
        Arc::clone(&self.image)
    }

    /// Display name used in exports. Not unique.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Natural (pre-crop) dimensions.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// 1-based position label.
    pub fn label(&self) -> usize {
        self.label
    }
}

/// A capacity slot held for a decode in flight.
///
/// Must be handed back through [`ImageCollection::fulfil`] or
/// [`ImageCollection::release`].
#[must_use = "a reservation holds a slot until fulfilled or released"]
#[derive(Debug, PartialEq, Eq)]
pub struct Reservation {
    _private: (),
}

/// Ordered, capacity-bounded list of slides.
#[derive(Debug, Clone)]
pub struct ImageCollection {
    entries: Vec<SlideEntry>,
    capacity: usize,
    pending: usize,
    next_id: u64,
}

impl Default for ImageCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageCollection {
    /// Empty collection capped at [`MAX_IMAGES`].
    pub fn new() -> Self {
        Self::with_capacity(MAX_IMAGES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
            pending: 0,
            next_id: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Reservations not yet fulfilled or released.
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Slots still free after counting outstanding reservations.
    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.entries.len() + self.pending)
    }

    pub fn get(&self, index: usize) -> Option<&SlideEntry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SlideEntry> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[SlideEntry] {
        &self.entries
    }

    /// Filenames in collection order.
    pub fn filenames(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.filename.as_str()).collect()
    }

    fn next_id(&mut self) -> SlideId {
        let id = SlideId(self.next_id);
        self.next_id += 1;
        id
    }

    fn check_index(&self, index: usize) -> Result<(), CollectionError> {
        if index < self.entries.len() {
            Ok(())
        } else {
            Err(CollectionError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            })
        }
    }

    fn check_capacity(&self) -> Result<(), CollectionError> {
        if self.remaining() == 0 {
            Err(CollectionError::CapacityExceeded { max: self.capacity })
        } else {
            Ok(())
        }
    }

    /// Set every entry's label to its index + 1.
    pub fn renumber(&mut self) {
        for (i, entry) in self.entries.iter_mut().enumerate() {
            entry.label = i + 1;
        }
    }

    /// Hold a slot for a decode that has been submitted but not completed.
    pub fn reserve(&mut self) -> Result<Reservation, CollectionError> {
        self.check_capacity()?;
        self.pending += 1;
        Ok(Reservation { _private: () })
    }

    /// Complete a reservation by appending its slide. Returns the new index.
    pub fn fulfil(&mut self, reservation: Reservation, slide: NewSlide) -> usize {
        let Reservation { _private: () } = reservation;
        self.pending = self.pending.saturating_sub(1);
        let id = self.next_id();
        self.entries.push(SlideEntry {
            id,
            image: slide.image,
            filename: slide.filename,
            width: slide.width,
            height: slide.height,
            label: 0,
        });
        self.renumber();
        self.entries.len() - 1
    }

    /// Give back a reservation whose decode failed.
    pub fn release(&mut self, reservation: Reservation) {
        let Reservation { _private: () } = reservation;
        self.pending = self.pending.saturating_sub(1);
    }

    /// Append an already-decoded slide. Returns its index.
    pub fn add(&mut self, slide: NewSlide) -> Result<usize, CollectionError> {
        let reservation = self.reserve()?;
        Ok(self.fulfil(reservation, slide))
    }

    /// Remove the slide at `index`. Out-of-range indices are a no-op.
    pub fn remove(&mut self, index: usize) -> Option<SlideEntry> {
        if index >= self.entries.len() {
            return None;
        }
        let removed = self.entries.remove(index);
        self.renumber();
        Some(removed)
    }

    /// Insert a copy of the slide at `index` directly after it.
    ///
    /// The copy gets a fresh id. Returns the copy's index.
    pub fn duplicate(&mut self, index: usize) -> Result<usize, CollectionError> {
        self.check_index(index)?;
        self.check_capacity()?;
        let mut copy = self.entries[index].clone();
        copy.id = self.next_id();
        self.entries.insert(index + 1, copy);
        self.renumber();
        Ok(index + 1)
    }

    /// Swap the image of the slide at `index`, keeping its id and position.
    pub fn replace_image(&mut self, index: usize, slide: NewSlide) -> Result<(), CollectionError> {
        self.check_index(index)?;
        let entry = &mut self.entries[index];
        entry.image = slide.image;
        entry.filename = slide.filename;
        entry.width = slide.width;
        entry.height = slide.height;
        self.renumber();
        Ok(())
    }

    /// Move the slide at `from` to `to`; slides in between shift by one.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), CollectionError> {
        self.check_index(from)?;
        self.check_index(to)?;
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        self.renumber();
        Ok(())
    }

    /// Remove every slide. Outstanding reservations stay held.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Free-text caption and tags for the whole carousel. Empty means absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptionMetadata {
    pub caption: String,
    pub tags: String,
}

impl CaptionMetadata {
    pub fn new(caption: impl Into<String>, tags: impl Into<String>) -> Self {
        Self {
            caption: caption.into(),
            tags: tags.into(),
        }
    }

    /// The caption, if it has any non-whitespace content.
    pub fn caption(&self) -> Option<&str> {
        Some(self.caption.trim()).filter(|s| !s.is_empty())
    }

    /// The tags, if they have any non-whitespace content.
    pub fn tags(&self) -> Option<&str> {
        Some(self.tags.trim()).filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slide(name: &str) -> NewSlide {
        NewSlide::new(name.as_bytes().to_vec(), name, 100, 125)
    }

    fn collection_of(names: &[&str]) -> ImageCollection {
        let mut c = ImageCollection::new();
        for name in names {
            c.add(slide(name)).unwrap();
        }
        c
    }

    fn names(c: &ImageCollection) -> Vec<&str> {
        c.filenames()
    }

    fn assert_labels(c: &ImageCollection) {
        for (i, entry) in c.iter().enumerate() {
            assert_eq!(entry.label(), i + 1, "label at index {i}");
        }
    }

    // =========================================================================
    // add / capacity
    // =========================================================================

    #[test]
    fn add_appends_in_order() {
        let c = collection_of(&["a.jpg", "b.jpg", "c.jpg"]);
        assert_eq!(names(&c), ["a.jpg", "b.jpg", "c.jpg"]);
        assert_labels(&c);
    }

    #[test]
    fn add_fails_at_capacity_and_leaves_collection_unchanged() {
        let mut c = ImageCollection::with_capacity(2);
        c.add(slide("a")).unwrap();
        c.add(slide("b")).unwrap();

        let err = c.add(slide("c")).unwrap_err();
        assert_eq!(err, CollectionError::CapacityExceeded { max: 2 });
        assert_eq!(names(&c), ["a", "b"]);
    }

    #[test]
    fn default_capacity_is_twenty() {
        let mut c = ImageCollection::new();
        for i in 0..MAX_IMAGES {
            c.add(slide(&format!("{i}"))).unwrap();
        }
        assert!(c.add(slide("overflow")).is_err());
        assert_eq!(c.len(), 20);
    }

    #[test]
    fn duplicate_filenames_are_allowed() {
        let c = collection_of(&["same.jpg", "same.jpg"]);
        assert_eq!(c.len(), 2);
        assert_ne!(c.get(0).unwrap().id(), c.get(1).unwrap().id());
    }

    // =========================================================================
    // reservations
    // =========================================================================

    #[test]
    fn reservations_count_against_capacity() {
        let mut c = ImageCollection::with_capacity(3);
        c.add(slide("a")).unwrap();
        let r1 = c.reserve().unwrap();
        let r2 = c.reserve().unwrap();
        assert_eq!(c.remaining(), 0);
        assert!(c.reserve().is_err());
        assert!(c.add(slide("x")).is_err());

        c.fulfil(r1, slide("b"));
        c.release(r2);
        assert_eq!(c.pending(), 0);
        assert_eq!(c.remaining(), 1);
        assert_eq!(names(&c), ["a", "b"]);
    }

    #[test]
    fn duplicate_respects_reservations() {
        let mut c = ImageCollection::with_capacity(2);
        c.add(slide("a")).unwrap();
        let r = c.reserve().unwrap();
        assert_eq!(
            c.duplicate(0),
            Err(CollectionError::CapacityExceeded { max: 2 })
        );
        c.release(r);
        assert_eq!(c.duplicate(0), Ok(1));
    }

    // =========================================================================
    // remove
    // =========================================================================

    #[test]
    fn remove_renumbers() {
        let mut c = collection_of(&["a", "b", "c"]);
        let removed = c.remove(1).unwrap();
        assert_eq!(removed.filename(), "b");
        assert_eq!(names(&c), ["a", "c"]);
        assert_labels(&c);
    }

    #[test]
    fn remove_out_of_range_is_noop() {
        let mut c = collection_of(&["a"]);
        assert!(c.remove(5).is_none());
        assert_eq!(names(&c), ["a"]);
    }

    // =========================================================================
    // duplicate
    // =========================================================================

    #[test]
    fn duplicate_inserts_after_source() {
        let mut c = collection_of(&["a", "b", "c"]);
        assert_eq!(c.duplicate(1), Ok(2));
        assert_eq!(names(&c), ["a", "b", "b", "c"]);
        assert_eq!(c.get(1).unwrap().image(), c.get(2).unwrap().image());
        assert_labels(&c);
    }

    #[test]
    fn duplicate_then_remove_copy_restores_collection() {
        let mut c = collection_of(&["a", "b", "c"]);
        let before: Vec<SlideEntry> = c.entries().to_vec();
        for k in 0..3 {
            c.duplicate(k).unwrap();
            c.remove(k + 1);
            assert_eq!(c.entries(), before.as_slice());
        }
    }

    #[test]
    fn duplicate_out_of_range_errors() {
        let mut c = collection_of(&["a"]);
        assert_eq!(
            c.duplicate(3),
            Err(CollectionError::IndexOutOfRange { index: 3, len: 1 })
        );
    }

    // =========================================================================
    // replace_image
    // =========================================================================

    #[test]
    fn replace_keeps_position_and_id() {
        let mut c = collection_of(&["a", "b", "c"]);
        let id = c.get(1).unwrap().id();
        c.replace_image(1, NewSlide::new(b"new".to_vec(), "new.png", 640, 480))
            .unwrap();

        let entry = c.get(1).unwrap();
        assert_eq!(entry.id(), id);
        assert_eq!(entry.filename(), "new.png");
        assert_eq!(entry.image(), b"new");
        assert_eq!(entry.dimensions(), (640, 480));
        assert_eq!(names(&c), ["a", "new.png", "c"]);
        assert_labels(&c);
    }

    // =========================================================================
    // reorder
    // =========================================================================

    #[test]
    fn reorder_forward_and_back() {
        let mut c = collection_of(&["A", "B", "C"]);
        c.reorder(0, 2).unwrap();
        assert_eq!(names(&c), ["B", "C", "A"]);
        assert_labels(&c);
        c.reorder(2, 0).unwrap();
        assert_eq!(names(&c), ["A", "B", "C"]);
        assert_labels(&c);
    }

    #[test]
    fn reorder_to_same_index_is_identity() {
        let mut c = collection_of(&["A", "B"]);
        c.reorder(1, 1).unwrap();
        assert_eq!(names(&c), ["A", "B"]);
    }

    #[test]
    fn reorder_out_of_range_leaves_collection_unchanged() {
        let mut c = collection_of(&["A", "B"]);
        assert!(c.reorder(0, 2).is_err());
        assert!(c.reorder(4, 0).is_err());
        assert_eq!(names(&c), ["A", "B"]);
    }

    // =========================================================================
    // invariants over mixed sequences
    // =========================================================================

    #[test]
    fn invariants_hold_across_mixed_mutations() {
        let mut c = ImageCollection::new();
        // Small deterministic LCG so the sequence is reproducible
        let mut state: u64 = 0x2545_F491_4F6C_DD1D;
        let mut next = |bound: usize| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((state >> 33) as usize) % bound.max(1)
        };

        for step in 0..500 {
            match next(5) {
                0 | 1 => {
                    let _ = c.add(slide(&format!("s{step}")));
                }
                2 => {
                    let len = c.len();
                    c.remove(next(len + 1));
                }
                3 => {
                    let len = c.len();
                    let _ = c.duplicate(next(len + 1));
                }
                _ => {
                    let len = c.len();
                    let _ = c.reorder(next(len + 1), next(len + 1));
                }
            }
            assert!(c.len() <= MAX_IMAGES, "step {step}");
            assert_labels(&c);
        }
    }

    #[test]
    fn clear_empties_but_keeps_reservations() {
        let mut c = collection_of(&["a", "b"]);
        let r = c.reserve().unwrap();
        c.clear();
        assert!(c.is_empty());
        assert_eq!(c.pending(), 1);
        c.release(r);
    }
}
