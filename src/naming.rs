//! Filename parsing for the `NNN-name` slide convention.
//!
//! Slides are often exported from an editor as `01-cover.jpg`,
//! `02-detail.jpg`, … so a directory import orders files by their numeric
//! prefix first and by name second. Unnumbered files sort after numbered
//! ones.
//!
//! - `020-Golden-Hour.jpg` → number 20, name `Golden-Hour`
//! - `7.png` → number 7, name empty
//! - `cover.jpg` → no number, name `cover`

use std::cmp::Ordering;
use std::path::Path;

/// Result of parsing a file stem like `020-Golden-Hour`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedName {
    /// Number prefix if present (e.g., `20` from `020-Golden-Hour`)
    pub number: Option<u32>,
    /// Name part after `NNN-`, dashes preserved. Empty if number-only.
    /// For unnumbered entries, this is the full input.
    pub name: String,
}

/// Parse a stem following the `NNN-name` convention.
pub fn parse_entry_name(stem: &str) -> ParsedName {
    if let Some(dash_pos) = stem.find('-') {
        let prefix = &stem[..dash_pos];
        if let Ok(num) = prefix.parse::<u32>() {
            return ParsedName {
                number: Some(num),
                name: stem[dash_pos + 1..].to_string(),
            };
        }
    }
    if let Ok(num) = stem.parse::<u32>() {
        return ParsedName {
            number: Some(num),
            name: String::new(),
        };
    }
    ParsedName {
        number: None,
        name: stem.to_string(),
    }
}

/// Display filename of a path (`a/b/01-cover.jpg` → `01-cover.jpg`).
pub fn display_filename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

fn sort_key(path: &Path) -> (u32, String) {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let parsed = parse_entry_name(&stem);
    (
        parsed.number.unwrap_or(u32::MAX),
        display_filename(path).to_lowercase(),
    )
}

/// Slide import order: numeric prefix, then case-insensitive filename.
pub fn slide_order(a: &Path, b: &Path) -> Ordering {
    sort_key(a).cmp(&sort_key(b)).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn numbered_with_multi_word_name() {
        let p = parse_entry_name("020-Golden-Hour");
        assert_eq!(p.number, Some(20));
        assert_eq!(p.name, "Golden-Hour");
    }

    #[test]
    fn number_only_no_dash() {
        let p = parse_entry_name("001");
        assert_eq!(p.number, Some(1));
        assert_eq!(p.name, "");
    }

    #[test]
    fn number_with_trailing_dash() {
        let p = parse_entry_name("001-");
        assert_eq!(p.number, Some(1));
        assert_eq!(p.name, "");
    }

    #[test]
    fn unnumbered_with_dashes() {
        let p = parse_entry_name("behind-the-scenes");
        assert_eq!(p.number, None);
        assert_eq!(p.name, "behind-the-scenes");
    }

    #[test]
    fn zero_prefix() {
        let p = parse_entry_name("000-First");
        assert_eq!(p.number, Some(0));
        assert_eq!(p.name, "First");
    }

    #[test]
    fn display_filename_drops_directories() {
        assert_eq!(display_filename(Path::new("shoot/01-cover.jpg")), "01-cover.jpg");
    }

    #[test]
    fn numbers_sort_numerically_not_lexically() {
        let mut paths: Vec<PathBuf> = ["10-end.jpg", "2-middle.jpg", "01-start.jpg"]
            .iter()
            .map(PathBuf::from)
            .collect();
        paths.sort_by(|a, b| slide_order(a, b));
        assert_eq!(
            paths,
            ["01-start.jpg", "2-middle.jpg", "10-end.jpg"]
                .iter()
                .map(PathBuf::from)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn unnumbered_files_follow_numbered_by_name() {
        let mut paths: Vec<PathBuf> = ["zebra.png", "03-c.jpg", "Apple.png"]
            .iter()
            .map(PathBuf::from)
            .collect();
        paths.sort_by(|a, b| slide_order(a, b));
        let names: Vec<String> = paths.iter().map(|p| display_filename(p)).collect();
        assert_eq!(names, ["03-c.jpg", "Apple.png", "zebra.png"]);
    }
}
