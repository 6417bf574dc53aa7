//! Board configuration module.
//!
//! Handles loading, validating, and merging `carousel.toml`. Stock defaults
//! reproduce the classic carousel: 20 slides, 4:5 crops at 1080×1350, and a
//! 1920×1080 landscape moodboard with four 200×250 thumbnails per row.
//!
//! Configuration is an explicit, immutable value. The crop engine, layout
//! engine and exporters receive it (or a value derived from it) as an
//! argument and never read globals, so tests can run alternate geometries
//! side by side.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [collection]
//! max_images = 20           # Slides per carousel
//!
//! [crop]
//! width = 1080              # Output frame, also the target aspect
//! height = 1350
//! quality = 85              # JPEG quality (1-100)
//!
//! [page]
//! width = 1920              # PDF page size in points
//! height = 1080
//! orientation = "landscape" # Long edge horizontal ("portrait" flips it)
//! margin_x = 20
//! margin_y = 20
//!
//! [grid]
//! columns = 4
//! thumbnail = [200, 250]    # Thumbnail box on the page
//! col_spacing = 10
//! row_spacing = 10
//! text_gap = 14             # Room below each row for filename labels
//!
//! [text]
//! caption_size = 16         # Moodboard header caption
//! caption_line = 18
//! tags_size = 12            # Moodboard header tags
//! tags_line = 14
//! header_gap = 10
//! badge_size = 10           # Sequence number badge
//! label_size = 8            # Filename under each thumbnail
//! title_size = 16           # Metadata document
//! heading_size = 12
//! body_size = 10
//! line_height = 12
//! section_gap = 10
//!
//! [persistence]
//! debounce_ms = 500         # Quiet period before caption/tag edits are saved
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [grid]
//! columns = 5
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{CropParams, Quality};
use crate::layout::PageGeometry;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default config filename, looked up in the working directory.
pub const CONFIG_FILENAME: &str = "carousel.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Board configuration loaded from `carousel.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoardConfig {
    /// Collection limits.
    pub collection: CollectionConfig,
    /// Crop frame and encoding quality.
    pub crop: CropConfig,
    /// Moodboard / metadata page size and margins.
    pub page: PageConfig,
    /// Thumbnail grid on the moodboard.
    pub grid: GridConfig,
    /// Font sizes and line advances for both documents.
    pub text: TextConfig,
    /// Auto-save behaviour.
    pub persistence: PersistenceConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl BoardConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.collection.max_images == 0 {
            return Err(ConfigError::Validation(
                "collection.max_images must be at least 1".into(),
            ));
        }
        if self.crop.width == 0 || self.crop.height == 0 {
            return Err(ConfigError::Validation(
                "crop.width and crop.height must be non-zero".into(),
            ));
        }
        if !(1..=100).contains(&self.crop.quality) {
            return Err(ConfigError::Validation("crop.quality must be 1-100".into()));
        }
        if self.grid.columns == 0 {
            return Err(ConfigError::Validation(
                "grid.columns must be at least 1".into(),
            ));
        }
        if self.grid.thumbnail.iter().any(|v| *v <= 0.0) {
            return Err(ConfigError::Validation(
                "grid.thumbnail values must be positive".into(),
            ));
        }
        let geometry = self.page_geometry();
        if geometry.row_width() > geometry.page_width {
            return Err(ConfigError::Validation(format!(
                "grid of {} columns ({}pt) is wider than the page ({}pt)",
                geometry.columns,
                geometry.row_width(),
                geometry.page_width
            )));
        }
        if geometry.margin_y * 2.0 + geometry.thumbnail_height + geometry.row_text_gap
            > geometry.page_height
        {
            return Err(ConfigError::Validation(
                "page is too short for a single row of thumbnails".into(),
            ));
        }
        Ok(())
    }

    /// Crop parameters for the slide frame.
    pub fn crop_params(&self) -> CropParams {
        CropParams::new(
            self.crop.width,
            self.crop.height,
            Quality::new(self.crop.quality),
        )
    }

    /// Page geometry for the layout engine, with orientation applied.
    pub fn page_geometry(&self) -> PageGeometry {
        let (page_width, page_height) = self.page.oriented_size();
        PageGeometry {
            page_width,
            page_height,
            margin_x: self.page.margin_x,
            margin_y: self.page.margin_y,
            columns: self.grid.columns as usize,
            thumbnail_width: self.grid.thumbnail[0],
            thumbnail_height: self.grid.thumbnail[1],
            col_spacing: self.grid.col_spacing,
            row_spacing: self.grid.row_spacing,
            row_text_gap: self.grid.text_gap,
        }
    }
}

/// Collection limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollectionConfig {
    /// Maximum number of slides.
    pub max_images: usize,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            max_images: crate::collection::MAX_IMAGES,
        }
    }
}

/// Crop frame settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CropConfig {
    pub width: u32,
    pub height: u32,
    /// JPEG quality (1 = worst, 100 = best).
    pub quality: u32,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1350,
            quality: 85,
        }
    }
}

/// Page orientation of exported documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Landscape,
    Portrait,
}

/// Page size and margins, in PDF points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageConfig {
    pub width: f32,
    pub height: f32,
    pub orientation: Orientation,
    pub margin_x: f32,
    pub margin_y: f32,
}

impl PageConfig {
    /// `(width, height)` with the long edge placed according to `orientation`.
    pub fn oriented_size(&self) -> (f32, f32) {
        let (long, short) = if self.width >= self.height {
            (self.width, self.height)
        } else {
            (self.height, self.width)
        };
        match self.orientation {
            Orientation::Landscape => (long, short),
            Orientation::Portrait => (short, long),
        }
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
            orientation: Orientation::Landscape,
            margin_x: 20.0,
            margin_y: 20.0,
        }
    }
}

/// Thumbnail grid settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    pub columns: u32,
    /// Thumbnail box as `[width, height]`.
    pub thumbnail: [f32; 2],
    pub col_spacing: f32,
    pub row_spacing: f32,
    /// Extra space under each row for the filename label.
    pub text_gap: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: 4,
            thumbnail: [200.0, 250.0],
            col_spacing: 10.0,
            row_spacing: 10.0,
            text_gap: 14.0,
        }
    }
}

/// Font sizes and line advances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextConfig {
    pub caption_size: f32,
    pub caption_line: f32,
    pub tags_size: f32,
    pub tags_line: f32,
    pub header_gap: f32,
    pub badge_size: f32,
    pub label_size: f32,
    pub title_size: f32,
    pub heading_size: f32,
    pub body_size: f32,
    pub line_height: f32,
    pub section_gap: f32,
}

impl TextConfig {
    /// Vertical space the moodboard header takes on the first page.
    ///
    /// Zero when there is neither a caption nor tags.
    pub fn header_height(&self, has_caption: bool, has_tags: bool) -> f32 {
        let mut height = 0.0;
        if has_caption {
            height += self.caption_line;
        }
        if has_tags {
            height += self.tags_line;
        }
        if has_caption || has_tags {
            height += self.header_gap;
        }
        height
    }
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            caption_size: 16.0,
            caption_line: 18.0,
            tags_size: 12.0,
            tags_line: 14.0,
            header_gap: 10.0,
            badge_size: 10.0,
            label_size: 8.0,
            title_size: 16.0,
            heading_size: 12.0,
            body_size: 10.0,
            line_height: 12.0,
            section_gap: 10.0,
        }
    }
}

/// Auto-save settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PersistenceConfig {
    /// Quiet period after the last caption/tag edit before it is written.
    pub debounce_ms: u64,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self { debounce_ms: 500 }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel decode/crop workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(BoardConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<BoardConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: BoardConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the file at `path`.
///
/// A missing file yields the stock defaults. Present files are merged on top
/// of the defaults, unknown keys are rejected, and the result is validated.
pub fn load_config(path: &Path) -> Result<BoardConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `carousel.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Carousel Board Configuration
# ============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Collection
# ---------------------------------------------------------------------------
[collection]
# Maximum number of slides in one carousel.
max_images = 20

# ---------------------------------------------------------------------------
# Crop frame
# ---------------------------------------------------------------------------
[crop]
# Every slide is center-cropped to this aspect and resampled to exactly
# this size. 1080x1350 is the 4:5 portrait carousel frame.
width = 1080
height = 1350

# JPEG quality of cropped slides (1 = worst, 100 = best).
quality = 85

# ---------------------------------------------------------------------------
# Page (moodboard and metadata PDFs), in points
# ---------------------------------------------------------------------------
[page]
width = 1920.0
height = 1080.0

# "landscape" puts the long edge horizontal, "portrait" vertical.
orientation = "landscape"

margin_x = 20.0
margin_y = 20.0

# ---------------------------------------------------------------------------
# Moodboard grid
# ---------------------------------------------------------------------------
[grid]
columns = 4

# Thumbnail box as [width, height].
thumbnail = [200.0, 250.0]

col_spacing = 10.0
row_spacing = 10.0

# Room reserved under each row for the filename labels.
text_gap = 14.0

# ---------------------------------------------------------------------------
# Text
# ---------------------------------------------------------------------------
[text]
# Moodboard header (first page only).
caption_size = 16.0
caption_line = 18.0
tags_size = 12.0
tags_line = 14.0
header_gap = 10.0

# Sequence number badge and filename label on each thumbnail.
badge_size = 10.0
label_size = 8.0

# Metadata document.
title_size = 16.0
heading_size = 12.0
body_size = 10.0
line_height = 12.0
section_gap = 10.0

# ---------------------------------------------------------------------------
# Persistence
# ---------------------------------------------------------------------------
[persistence]
# Caption and tag edits are saved once they have been quiet this long.
debounce_ms = 500

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel decode/crop workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_matches_carousel_constants() {
        let config = BoardConfig::default();
        assert_eq!(config.collection.max_images, 20);
        assert_eq!((config.crop.width, config.crop.height), (1080, 1350));
        assert_eq!(config.crop.quality, 85);
        assert_eq!(config.grid.columns, 4);
        assert_eq!(config.grid.thumbnail, [200.0, 250.0]);
        assert_eq!(config.grid.text_gap, 14.0);
        assert_eq!(config.page.margin_x, 20.0);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[grid]
columns = 5
"#;
        let config: BoardConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.grid.columns, 5);
        // Defaults preserved
        assert_eq!(config.grid.thumbnail, [200.0, 250.0]);
        assert_eq!(config.crop.quality, 85);
    }

    #[test]
    fn integers_accepted_for_point_values() {
        let toml = r#"
[page]
margin_x = 40
"#;
        let config: BoardConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.page.margin_x, 40.0);
    }

    // =========================================================================
    // Derived values
    // =========================================================================

    #[test]
    fn page_geometry_from_defaults() {
        let g = BoardConfig::default().page_geometry();
        assert_eq!((g.page_width, g.page_height), (1920.0, 1080.0));
        assert_eq!(g.columns, 4);
        assert_eq!((g.thumbnail_width, g.thumbnail_height), (200.0, 250.0));
        assert_eq!((g.col_spacing, g.row_spacing, g.row_text_gap), (10.0, 10.0, 14.0));
    }

    #[test]
    fn portrait_orientation_flips_page() {
        let mut config = BoardConfig::default();
        config.page.orientation = Orientation::Portrait;
        let g = config.page_geometry();
        assert_eq!((g.page_width, g.page_height), (1080.0, 1920.0));
    }

    #[test]
    fn landscape_orientation_normalizes_tall_page() {
        let mut config = BoardConfig::default();
        config.page.width = 1080.0;
        config.page.height = 1920.0;
        let g = config.page_geometry();
        assert_eq!((g.page_width, g.page_height), (1920.0, 1080.0));
    }

    #[test]
    fn crop_params_from_defaults() {
        let p = BoardConfig::default().crop_params();
        assert_eq!((p.target_width, p.target_height), (1080, 1350));
        assert_eq!(p.quality.value(), 85);
    }

    #[test]
    fn header_height_depends_on_present_lines() {
        let text = TextConfig::default();
        assert_eq!(text.header_height(false, false), 0.0);
        assert_eq!(text.header_height(true, false), 28.0);
        assert_eq!(text.header_height(false, true), 24.0);
        assert_eq!(text.header_height(true, true), 42.0);
    }

    #[test]
    fn effective_threads_caps_at_cores() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let config = ProcessingConfig {
            max_processes: Some(10_000),
        };
        assert_eq!(effective_threads(&config), cores);
        assert_eq!(effective_threads(&ProcessingConfig::default()), cores);
        let one = ProcessingConfig {
            max_processes: Some(0),
        };
        assert_eq!(effective_threads(&one), 1);
    }

    // =========================================================================
    // Unknown key rejection tests
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let toml_str = r#"
[crop]
qualty = 90
"#;
        let result: Result<BoardConfig, _> = toml::from_str(toml_str);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let toml_str = r#"
[cropz]
quality = 90
"#;
        let result: Result<BoardConfig, _> = toml::from_str(toml_str);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_orientation_rejected() {
        let toml_str = r#"
[page]
orientation = "diagonal"
"#;
        let result: Result<BoardConfig, _> = toml::from_str(toml_str);
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(BoardConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_quality_bounds() {
        let mut config = BoardConfig::default();
        config.crop.quality = 0;
        assert!(config.validate().is_err());
        config.crop.quality = 101;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("quality"));
        config.crop.quality = 100;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_zero_columns() {
        let mut config = BoardConfig::default();
        config.grid.columns = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_grid_wider_than_page() {
        let mut config = BoardConfig::default();
        config.grid.columns = 10;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("wider than the page"));
    }

    #[test]
    fn validate_page_too_short() {
        let mut config = BoardConfig::default();
        config.page.height = 200.0;
        config.page.width = 1920.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_zero_crop_frame() {
        let mut config = BoardConfig::default();
        config.crop.height = 0;
        assert!(config.validate().is_err());
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join(CONFIG_FILENAME)).unwrap();
        assert_eq!(config, BoardConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        fs::write(
            &path,
            r#"
[crop]
quality = 70

[grid]
columns = 3
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.crop.quality, 70);
        assert_eq!(config.grid.columns, 3);
        // Unspecified values should be defaults
        assert_eq!(config.crop.width, 1080);
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        fs::write(&path, "[collection]\nmax_images = 0\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn load_config_rejects_unknown_key() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        fs::write(&path, "[grid]\ncolumnz = 3\n").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn load_config_rejects_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        fs::write(&path, "[grid\ncolumns = 3\n").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_overlay_replaces_leaf_and_keeps_siblings() {
        let stock = stock_defaults_value();
        let overlay: toml::Value = toml::from_str("[grid]\ncolumns = 6\n").unwrap();
        let merged = merge_toml(stock, overlay);
        let grid = merged.get("grid").unwrap();
        assert_eq!(grid.get("columns").unwrap().as_integer(), Some(6));
        assert!(grid.get("thumbnail").is_some());
    }

    // =========================================================================
    // Stock config tests
    // =========================================================================

    #[test]
    fn stock_config_toml_is_valid_toml() {
        let _: toml::Value = toml::from_str(stock_config_toml()).unwrap();
    }

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: BoardConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, BoardConfig::default());
    }

    #[test]
    fn stock_config_toml_contains_all_sections() {
        let content = stock_config_toml();
        for section in [
            "[collection]",
            "[crop]",
            "[page]",
            "[grid]",
            "[text]",
            "[persistence]",
            "[processing]",
        ] {
            assert!(content.contains(section), "missing {section}");
        }
    }
}
