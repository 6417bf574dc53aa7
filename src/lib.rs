//! # Carousel Board
//!
//! Plan a social-media image carousel: collect up to twenty slides, put them
//! in order, crop every one to the 4:5 carousel frame, and export a printable
//! moodboard of numbered thumbnails plus the caption, tags and filename
//! list that go with the post.
//!
//! # Architecture
//!
//! ```text
//!  files / paste ──► intake ──► ImageCollection ◄──► session ◄──► state (store)
//!                    (decode)         │
//!                                     ▼
//!                                  export ──► imaging (crop) ──► render (PDF)
//!                                     │
//!                                  layout (placements)
//! ```
//!
//! The [`collection::ImageCollection`] is the single source of truth. Every
//! listing, document and saved record is a projection of it. Crop geometry
//! and page layout are pure functions of an explicit [`config::BoardConfig`];
//! nothing reads global settings.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`collection`] | Ordered slide list with capacity reservation and renumbering |
//! | [`imaging`] | Center-crop to the carousel frame, safe-zone overlay, decode |
//! | [`layout`] | Pure moodboard pagination: thumbnail placements, badges, labels |
//! | [`render`] | Drawing contract and its `lopdf` PDF implementation |
//! | [`export`] | Moodboard, metadata and filename-list exports |
//! | [`intake`] | Batch import: reserve in order, decode in parallel, apply in order |
//! | [`session`] | Board state owner with immediate and debounced persistence |
//! | [`state`] | Persisted JSON record, data URLs, key/value stores |
//! | [`debounce`] | Deterministic delay-coalescing scheduler |
//! | [`config`] | `carousel.toml` loading, validation and merging |
//! | [`naming`] | `NNN-name` filename ordering for directory imports |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Reserve Before Decode
//!
//! A slot is counted against the twenty-slide limit the moment a file is
//! submitted, not when its decode finishes. A batch that would overflow is
//! trimmed up front, so slow decodes can never push the collection past its
//! capacity, and results are applied in submission order regardless of which
//! decode finishes first.
//!
//! ## Empty Cells Over Shifted Numbers
//!
//! If one slide fails to crop or draw, the moodboard leaves its grid cell
//! empty. The remaining thumbnails keep the numbers that match their
//! positions in the carousel, which is what the moodboard is for.
//!
//! ## JPEG Passthrough Into PDF
//!
//! Cropped slides are JPEG already, and PDF can embed JPEG directly
//! (`DCTDecode`). The renderer stores the encoder's bytes untouched, so each
//! thumbnail is encoded exactly once.

pub mod collection;
pub mod config;
pub mod debounce;
pub mod export;
pub mod imaging;
pub mod intake;
pub mod layout;
pub mod naming;
pub mod output;
pub mod render;
pub mod session;
pub mod state;

#[cfg(test)]
pub(crate) mod test_helpers;
