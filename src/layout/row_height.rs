//! # Row Height Estimation
//!
//! Decides how tall a data row must be before anything in it is drawn. The
//! estimate only has to avoid clipping: it counts characters against an
//! average glyph width rather than shaping text. Because the height is fixed
//! up front, later outcomes (a barcode that fails to rasterize, say) never
//! move anything else on the page.

use crate::layout::columns::{CellValue, ColumnKind, ColumnSpec, ColumnWidths};
use crate::model::RecordView;

/// Minimum height of any data row.
pub const BASE_ROW_HEIGHT: f64 = 20.0;
/// Minimum height of a row that shows a raster barcode plus its digits.
pub const BARCODE_ROW_HEIGHT: f64 = 45.0;
/// Line box height as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.2;
/// Vertical padding added once per cell.
pub const CELL_VERTICAL_PADDING: f64 = 4.0;
/// Horizontal padding subtracted from the column width (both sides).
pub const CELL_HORIZONTAL_PADDING: f64 = 10.0;
/// Average glyph advance as a fraction of the font size. Helvetica lowercase
/// averages about 0.5 em.
pub const DEFAULT_CHAR_WIDTH_FACTOR: f64 = 0.5;

/// Height of `lines` lines of text plus cell padding.
pub fn lines_height(lines: usize, font_size: f64) -> f64 {
    lines as f64 * font_size * LINE_HEIGHT_FACTOR + CELL_VERTICAL_PADDING
}

/// Character-count row height heuristic.
#[derive(Debug, Clone, Copy)]
pub struct RowHeightEstimator {
    /// Average glyph width relative to the font size.
    pub char_width_factor: f64,
}

impl Default for RowHeightEstimator {
    fn default() -> Self {
        Self {
            char_width_factor: DEFAULT_CHAR_WIDTH_FACTOR,
        }
    }
}

impl RowHeightEstimator {
    pub fn new(char_width_factor: f64) -> Self {
        Self { char_width_factor }
    }

    /// How many characters fit on one line of a column. At least one.
    pub fn chars_per_line(&self, column_width: f64, font_size: f64) -> usize {
        let per_char = font_size * self.char_width_factor;
        if per_char <= 0.0 {
            return usize::MAX;
        }
        let fit = ((column_width - CELL_HORIZONTAL_PADDING) / per_char).floor();
        if fit.is_finite() && fit >= 1.0 {
            fit as usize
        } else {
            1
        }
    }

    /// Wrapped line count for a single-paragraph value.
    pub fn line_count(&self, value: &str, column_width: f64, font_size: f64) -> usize {
        let len = value.chars().count();
        if len == 0 {
            return 1;
        }
        let per_line = self.chars_per_line(column_width, font_size);
        len.div_ceil(per_line).max(1)
    }

    /// Minimum height for `record` so no cell clips.
    pub fn estimate(
        &self,
        record: &RecordView,
        columns: &[ColumnSpec],
        widths: &ColumnWidths,
        font_size: f64,
        currency: &str,
    ) -> f64 {
        let mut height = BASE_ROW_HEIGHT;

        let has_barcode_column = columns.iter().any(ColumnSpec::is_barcode);
        if has_barcode_column && !record.barcode.is_empty() {
            height = height.max(BARCODE_ROW_HEIGHT);
        }

        for (index, column) in columns.iter().enumerate() {
            if column.is_synthetic() || column.is_barcode() {
                continue;
            }
            let width = widths.at(index);
            let needed = match column.format(record, currency) {
                CellValue::Lines(lines) if column.kind() == ColumnKind::Category => {
                    if lines.len() > 1 {
                        lines_height(lines.len(), font_size)
                    } else {
                        let first = lines.first().map(String::as_str).unwrap_or("");
                        lines_height(self.line_count(first, width, font_size), font_size)
                    }
                }
                other => {
                    let value = other.flatten(" ");
                    lines_height(self.line_count(&value, width, font_size), font_size)
                }
            };
            height = height.max(needed);
        }

        height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::columns::{allocate, resolve_columns};
    use crate::model::{CategoryRef, InventoryItem};

    fn record(name: &str, barcode: &str) -> RecordView {
        RecordView::from(&InventoryItem {
            id: "1".into(),
            sku: "A-1".into(),
            name: name.into(),
            barcode: Some(barcode.into()),
            ..Default::default()
        })
    }

    fn setup(keys: &[&str], width: f64) -> (Vec<ColumnSpec>, ColumnWidths) {
        let keys: Vec<String> = keys.iter().map(|s| s.to_string()).collect();
        let cols = resolve_columns(&keys, None).unwrap();
        let widths = allocate(&cols, width).unwrap();
        (cols, widths)
    }

    #[test]
    fn short_rows_get_base_height() {
        let (cols, widths) = setup(&["sku", "name", "stock"], 500.0);
        let h = RowHeightEstimator::default().estimate(&record("Picks", ""), &cols, &widths, 8.0, "$");
        assert_eq!(h, BASE_ROW_HEIGHT);
    }

    #[test]
    fn barcode_reserves_height_only_when_value_present() {
        let (cols, widths) = setup(&["sku", "barcode"], 500.0);
        let est = RowHeightEstimator::default();
        assert_eq!(est.estimate(&record("Picks", "4006381333931"), &cols, &widths, 8.0, "$"), BARCODE_ROW_HEIGHT);
        assert_eq!(est.estimate(&record("Picks", ""), &cols, &widths, 8.0, "$"), BASE_ROW_HEIGHT);
    }

    #[test]
    fn barcode_value_without_barcode_column_is_ignored() {
        let (cols, widths) = setup(&["sku", "name"], 500.0);
        let h = RowHeightEstimator::default().estimate(&record("Picks", "4006381333931"), &cols, &widths, 8.0, "$");
        assert_eq!(h, BASE_ROW_HEIGHT);
    }

    #[test]
    fn long_text_wraps_into_taller_rows() {
        // name column: 4/5 of 100 = 80pt; (80 - 10) / 4 = 17 chars per line
        let (cols, widths) = setup(&["name", "stock"], 100.0);
        let est = RowHeightEstimator::default();
        assert_eq!(est.chars_per_line(widths.at(0), 8.0), 17);
        let name = "a".repeat(60); // 4 lines
        let h = est.estimate(&record(&name, ""), &cols, &widths, 8.0, "$");
        assert!((h - (4.0 * 8.0 * 1.2 + 4.0)).abs() < 1e-9);
    }

    #[test]
    fn multi_line_categories_count_their_lines() {
        let (cols, widths) = setup(&["category"], 500.0);
        let item = InventoryItem {
            id: "1".into(),
            name: "Dreadnought".into(),
            category: Some(CategoryRef {
                name: Some("Acoustic".into()),
                path: Some("Guitars > Acoustic".into()),
                ..Default::default()
            }),
            additional_categories: vec![CategoryRef {
                name: Some("Sale".into()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let h = RowHeightEstimator::default().estimate(&RecordView::from(&item), &cols, &widths, 10.0, "$");
        assert!((h - (3.0 * 10.0 * 1.2 + 4.0)).abs() < 1e-9);
    }

    #[test]
    fn degenerate_widths_still_terminate() {
        let est = RowHeightEstimator::default();
        assert_eq!(est.chars_per_line(0.0, 8.0), 1);
        assert_eq!(est.line_count("abc", 0.0, 8.0), 3);
        assert_eq!(est.line_count("", 0.0, 8.0), 1);
    }
}
