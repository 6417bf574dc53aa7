//! Moodboard pagination.
//!
//! Pure geometry: given a [`PageGeometry`], an item count and the height of
//! the first-page header, compute where every thumbnail lands. No images,
//! no renderer. The exporter walks the returned placements and draws.
//!
//! Coordinates are in page units with the origin at the top-left corner and
//! y growing downwards. Rows are centered horizontally; pages only ever
//! break between completed rows.

/// Page and grid dimensions for one export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    pub margin_x: f32,
    pub margin_y: f32,
    pub columns: usize,
    pub thumbnail_width: f32,
    pub thumbnail_height: f32,
    pub col_spacing: f32,
    pub row_spacing: f32,
    /// Space under each row reserved for filename labels.
    pub row_text_gap: f32,
}

impl PageGeometry {
    /// Width of one full row of thumbnails including inner spacing.
    pub fn row_width(&self) -> f32 {
        let columns = self.columns as f32;
        columns * self.thumbnail_width + (columns - 1.0).max(0.0) * self.col_spacing
    }

    /// Left edge of the first column.
    pub fn start_x(&self) -> f32 {
        (self.page_width - self.row_width()) / 2.0
    }

    /// Vertical advance from one row's top to the next.
    pub fn row_advance(&self) -> f32 {
        self.thumbnail_height + self.row_spacing + self.row_text_gap
    }

    /// Usable text width between the horizontal margins.
    pub fn text_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin_x
    }

    /// Whether a row whose top sits at `y` still fits, label included.
    fn fits(&self, y: f32) -> bool {
        y + self.thumbnail_height + self.row_text_gap <= self.page_height - self.margin_y
    }
}

/// Offset of the number badge from the thumbnail's left edge.
pub const BADGE_INSET: f32 = 4.0;
/// Distance from the thumbnail's bottom edge up to the badge's top.
pub const BADGE_RISE: f32 = 14.0;
/// Height of the badge box.
pub const BADGE_HEIGHT: f32 = 10.0;
/// Horizontal padding around the badge number.
pub const BADGE_PADDING: f32 = 3.0;
/// Distance from the thumbnail's bottom edge down to the label baseline.
pub const LABEL_DROP: f32 = 10.0;

/// Where one thumbnail goes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Position in the collection (0-based).
    pub index: usize,
    /// Page the thumbnail is drawn on (0-based).
    pub page: usize,
    /// Top-left corner of the thumbnail.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Placement {
    /// 1-based sequence number printed in the badge.
    pub fn number(&self) -> usize {
        self.index + 1
    }

    /// Top-left corner of the number badge, near the thumbnail's bottom-left.
    pub fn badge_origin(&self) -> (f32, f32) {
        (self.x + BADGE_INSET, self.y + self.height - BADGE_RISE)
    }

    /// Baseline of the badge number.
    pub fn badge_text_origin(&self) -> (f32, f32) {
        (
            self.x + BADGE_INSET + BADGE_PADDING,
            self.y + self.height - BADGE_RISE + BADGE_HEIGHT - 2.0,
        )
    }

    /// Horizontally centered anchor below the thumbnail for the filename.
    pub fn label_anchor(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height + LABEL_DROP)
    }
}

/// Lay out `count` thumbnails.
///
/// `header_height` is reserved at the top of the first page only. Returns one
/// placement per item, in order; zero items yield an empty vector.
pub fn paginate(geometry: &PageGeometry, count: usize, header_height: f32) -> Vec<Placement> {
    let columns = geometry.columns.max(1);
    let start_x = geometry.start_x();
    let mut placements = Vec::with_capacity(count);
    let mut page = 0;
    let mut y = geometry.margin_y + header_height;

    for index in 0..count {
        let column = index % columns;
        placements.push(Placement {
            index,
            page,
            x: start_x + column as f32 * (geometry.thumbnail_width + geometry.col_spacing),
            y,
            width: geometry.thumbnail_width,
            height: geometry.thumbnail_height,
        });

        if (index + 1) % columns == 0 {
            y += geometry.row_advance();
            if !geometry.fits(y) && index + 1 < count {
                page += 1;
                y = geometry.margin_y;
                tracing::debug!(page, after = index + 1, "moodboard page break");
            }
        }
    }

    placements
}

/// Number of pages a pagination spans.
pub fn page_count(placements: &[Placement]) -> usize {
    placements.last().map_or(0, |p| p.page + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoardConfig;

    fn geometry() -> PageGeometry {
        BoardConfig::default().page_geometry()
    }

    #[test]
    fn row_is_centered() {
        let g = geometry();
        assert_eq!(g.row_width(), 830.0);
        assert_eq!(g.start_x(), 545.0);
    }

    #[test]
    fn zero_items_zero_placements() {
        let placements = paginate(&geometry(), 0, 0.0);
        assert!(placements.is_empty());
        assert_eq!(page_count(&placements), 0);
    }

    #[test]
    fn fourth_item_shares_first_row() {
        let g = geometry();
        let p = paginate(&g, 5, 0.0);
        assert_eq!(p[3].x, g.start_x() + 630.0);
        assert_eq!(p[3].y, p[0].y);
        assert_eq!(p[4].x, g.start_x());
        assert_eq!(p[4].y, p[0].y + 274.0);
    }

    #[test]
    fn nine_items_break_rows_after_four_and_eight() {
        let p = paginate(&geometry(), 9, 0.0);
        let rows: Vec<f32> = p.iter().map(|p| p.y).collect();
        assert_eq!(&rows[0..4], &[20.0; 4]);
        assert_eq!(&rows[4..8], &[294.0; 4]);
        assert_eq!(rows[8], 568.0);
        assert!(p.iter().all(|p| p.page == 0));
    }

    #[test]
    fn thirteenth_item_starts_second_page() {
        let p = paginate(&geometry(), 13, 0.0);
        assert!(p[..12].iter().all(|p| p.page == 0));
        assert_eq!(p[12].page, 1);
        assert_eq!(p[12].y, 20.0);
        assert_eq!(p[12].x, geometry().start_x());
        assert_eq!(page_count(&p), 2);
    }

    #[test]
    fn full_last_row_does_not_open_empty_page() {
        let p = paginate(&geometry(), 12, 0.0);
        assert_eq!(page_count(&p), 1);
    }

    #[test]
    fn header_offsets_first_page_only() {
        let p = paginate(&geometry(), 20, 42.0);
        assert_eq!(p[0].y, 62.0);
        let second_page: Vec<_> = p.iter().filter(|p| p.page == 1).collect();
        assert!(!second_page.is_empty());
        assert_eq!(second_page[0].y, 20.0);
    }

    #[test]
    fn every_placement_fits_its_page() {
        let g = geometry();
        for header in [0.0, 28.0, 42.0] {
            for p in paginate(&g, 20, header) {
                assert!(p.x >= 0.0 && p.x + p.width <= g.page_width);
                assert!(p.y + p.height + g.row_text_gap <= g.page_height - g.margin_y);
            }
        }
    }

    #[test]
    fn portrait_pages_hold_more_rows() {
        let mut config = BoardConfig::default();
        config.page.orientation = crate::config::Orientation::Portrait;
        let g = config.page_geometry();
        let p = paginate(&g, 20, 0.0);
        assert_eq!(page_count(&p), 1);
    }

    #[test]
    fn single_column_breaks_every_few_items() {
        let g = PageGeometry {
            columns: 1,
            ..geometry()
        };
        let p = paginate(&g, 5, 0.0);
        // 20, 294, 568, 842 would overflow -> three per page
        assert_eq!(p[3].page, 1);
        assert_eq!(p[3].y, 20.0);
    }

    #[test]
    fn badge_and_label_positions() {
        let p = paginate(&geometry(), 1, 0.0)[0];
        assert_eq!(p.number(), 1);
        assert_eq!(p.badge_origin(), (549.0, 256.0));
        assert_eq!(p.badge_text_origin(), (552.0, 264.0));
        assert_eq!(p.label_anchor(), (645.0, 280.0));
    }
}
