//! Durable board state.
//!
//! The whole board is persisted as one JSON record under a single key of a
//! [`KeyValueStore`]:
//!
//! ```json
//! {
//!   "images": [{ "src": "data:image/jpeg;base64,...", "filename": "01.jpg" }],
//!   "caption": "Golden hour",
//!   "tags": "#sunset #travel",
//!   "darkMode": false,
//!   "safeZone": true
//! }
//! ```
//!
//! Image bytes travel inline as data URLs so a single record restores the
//! board without any other files.

use crate::collection::{CaptionMetadata, ImageCollection};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

/// Key the board record is stored under.
pub const STATE_KEY: &str = "carousel-state";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid data URL: {0}")]
    DataUrl(String),
    #[error("Invalid store key: {0:?}")]
    InvalidKey(String),
}

/// One persisted slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedImage {
    /// `data:<mime>;base64,<payload>`
    pub src: String,
    pub filename: String,
}

/// Snapshot of everything a session needs to come back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersistedState {
    pub images: Vec<PersistedImage>,
    pub caption: String,
    pub tags: String,
    pub dark_mode: bool,
    pub safe_zone: bool,
}

impl PersistedState {
    /// Snapshot the collection and board settings.
    pub fn capture(
        collection: &ImageCollection,
        metadata: &CaptionMetadata,
        dark_mode: bool,
        safe_zone: bool,
    ) -> Self {
        Self {
            images: collection
                .iter()
                .map(|entry| PersistedImage {
                    src: encode_data_url(entry.image()),
                    filename: entry.filename().to_string(),
                })
                .collect(),
            caption: metadata.caption.clone(),
            tags: metadata.tags.clone(),
            dark_mode,
            safe_zone,
        }
    }

    pub fn metadata(&self) -> CaptionMetadata {
        CaptionMetadata::new(self.caption.clone(), self.tags.clone())
    }
}

// =============================================================================
// Data URLs
// =============================================================================

/// Encode image bytes as a base64 data URL, sniffing the MIME type.
pub fn encode_data_url(bytes: &[u8]) -> String {
    let mime = image::guess_format(bytes)
        .map(|format| format.to_mime_type())
        .unwrap_or("application/octet-stream");
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Decode the payload of a base64 data URL.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>, StoreError> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| StoreError::DataUrl("missing data: scheme".into()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| StoreError::DataUrl("missing payload separator".into()))?;
    if !header.ends_with(";base64") {
        return Err(StoreError::DataUrl(format!(
            "unsupported encoding in {header:?}"
        )));
    }
    STANDARD
        .decode(payload.trim())
        .map_err(|e| StoreError::DataUrl(e.to_string()))
}

// =============================================================================
// Stores
// =============================================================================

/// Byte-string key/value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError>;
}

/// Store that keeps one file per key in a directory.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// crash mid-write leaves the previous value intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// In-memory store. Nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

/// Serialize `state` under [`STATE_KEY`].
pub fn save_state(
    store: &mut impl KeyValueStore,
    state: &PersistedState,
) -> Result<(), StoreError> {
    let json = serde_json::to_vec(state)?;
    store.set(STATE_KEY, &json)?;
    tracing::debug!(
        images = state.images.len(),
        bytes = json.len(),
        "saved board state"
    );
    Ok(())
}

/// Load the record under [`STATE_KEY`]. `Ok(None)` if nothing was saved.
pub fn restore_state(
    store: &impl KeyValueStore,
) -> Result<Option<PersistedState>, StoreError> {
    match store.get(STATE_KEY)? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::NewSlide;
    use crate::test_helpers::{jpeg_bytes, png_bytes};
    use tempfile::TempDir;

    fn sample_state() -> PersistedState {
        let mut collection = ImageCollection::new();
        collection
            .add(NewSlide::new(jpeg_bytes(8, 10), "01-dawn.jpg", 8, 10))
            .unwrap();
        collection
            .add(NewSlide::new(png_bytes(6, 6), "02-noon.png", 6, 6))
            .unwrap();
        collection
            .add(NewSlide::new(png_bytes(6, 6), "02-noon.png", 6, 6))
            .unwrap();
        PersistedState::capture(
            &collection,
            &CaptionMetadata::new("Golden hour", "#sunset #travel"),
            true,
            false,
        )
    }

    // =========================================================================
    // Data URLs
    // =========================================================================

    #[test]
    fn data_url_carries_sniffed_mime() {
        assert!(encode_data_url(&jpeg_bytes(4, 4)).starts_with("data:image/jpeg;base64,"));
        assert!(encode_data_url(&png_bytes(4, 4)).starts_with("data:image/png;base64,"));
        assert!(encode_data_url(b"plain").starts_with("data:application/octet-stream;base64,"));
    }

    #[test]
    fn data_url_roundtrip() {
        let bytes = png_bytes(5, 7);
        assert_eq!(decode_data_url(&encode_data_url(&bytes)).unwrap(), bytes);
    }

    #[test]
    fn data_url_rejects_malformed_input() {
        assert!(decode_data_url("http://example.com/a.png").is_err());
        assert!(decode_data_url("data:image/png;base64").is_err());
        assert!(decode_data_url("data:text/plain,hello").is_err());
        assert!(decode_data_url("data:image/png;base64,@@@").is_err());
    }

    // =========================================================================
    // Record format
    // =========================================================================

    #[test]
    fn record_uses_camel_case_keys() {
        let json = serde_json::to_value(sample_state()).unwrap();
        let obj = json.as_object().unwrap();
        for key in ["images", "caption", "tags", "darkMode", "safeZone"] {
            assert!(obj.contains_key(key), "missing {key}");
        }
        assert_eq!(json["images"][0]["filename"], "01-dawn.jpg");
        assert_eq!(json["darkMode"], true);
    }

    #[test]
    fn record_with_missing_fields_uses_defaults() {
        let state: PersistedState = serde_json::from_str(r#"{"images": []}"#).unwrap();
        assert_eq!(state, PersistedState::default());
    }

    // =========================================================================
    // save / restore
    // =========================================================================

    #[test]
    fn save_then_restore_reproduces_state() {
        let mut store = MemoryStore::new();
        let state = sample_state();
        save_state(&mut store, &state).unwrap();

        let restored = restore_state(&store).unwrap().unwrap();
        assert_eq!(restored, state);
        let names: Vec<&str> = restored.images.iter().map(|i| i.filename.as_str()).collect();
        assert_eq!(names, ["01-dawn.jpg", "02-noon.png", "02-noon.png"]);
        assert_eq!(restored.metadata().caption(), Some("Golden hour"));
    }

    #[test]
    fn restore_from_empty_store_is_none() {
        assert!(restore_state(&MemoryStore::new()).unwrap().is_none());
    }

    #[test]
    fn restore_reports_corrupt_record() {
        let mut store = MemoryStore::new();
        store.set(STATE_KEY, b"{not json").unwrap();
        assert!(matches!(restore_state(&store), Err(StoreError::Json(_))));
    }

    #[test]
    fn file_store_persists_across_instances() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("state");
        let state = sample_state();
        save_state(&mut FileStore::new(&dir), &state).unwrap();

        assert!(dir.join("carousel-state.json").exists());
        assert!(!dir.join("carousel-state.json.tmp").exists());
        let restored = restore_state(&FileStore::new(&dir)).unwrap().unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn file_store_missing_key_then_overwrite() {
        let tmp = TempDir::new().unwrap();
        let mut store = FileStore::new(tmp.path());
        assert!(store.get("absent").unwrap().is_none());
        store.set("k", b"v").unwrap();
        assert_eq!(store.get("k").unwrap().unwrap(), b"v");
        store.set("k", b"w").unwrap();
        assert_eq!(store.get("k").unwrap().unwrap(), b"w");
    }

    #[test]
    fn file_store_rejects_path_like_keys() {
        let tmp = TempDir::new().unwrap();
        let mut store = FileStore::new(tmp.path());
        assert!(matches!(
            store.set("../escape", b"x"),
            Err(StoreError::InvalidKey(_))
        ));
        assert!(store.get("").is_err());
    }
}
