//! # Table Rendering
//!
//! Draws one table row at a time into a [`PageFlow`]. Every row's height is
//! fixed before anything in it is drawn, so a page break can only ever
//! happen between rows, and the header band is repainted by the flow
//! whenever one does.
//!
//! Drawing order inside a row is fixed: background fill, cell borders, then
//! cell content.

use tracing::{debug, warn};

use crate::barcode::{BarcodeOptions, BarcodeRenderer};
use crate::error::Result;
use crate::font::{StandardFont, TextMeasure};
use crate::format::{capitalize_first, format_currency, format_integer, format_percentage};
use crate::grouping::Aggregate;
use crate::layout::columns::{allocate, Align, CellValue, ColumnKind, ColumnSpec, ColumnWidths};
use crate::layout::row_height::{
    RowHeightEstimator, BASE_ROW_HEIGHT, CELL_VERTICAL_PADDING, LINE_HEIGHT_FACTOR,
};
use crate::layout::{DrawCommand, LayoutElement, PageFlow, RowKind, Stroke, TextAnchor, UsableArea};
use crate::model::RecordView;
use crate::style::{Color, ReportTheme};
use crate::text::{split_at_balanced_space, truncate_to_width, wrap_text};

/// Height of a group heading row.
pub const GROUP_HEADING_HEIGHT: f64 = 18.0;

/// One column label, already fitted to its column.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderCell {
    pub x: f64,
    pub width: f64,
    pub lines: Vec<String>,
    pub font_size: f64,
    pub align: Align,
}

/// The shaded label band at the top of a table. Computed once per table and
/// repainted identically on every page the table spans.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderBand {
    pub x: f64,
    pub width: f64,
    pub height: f64,
    pub cells: Vec<HeaderCell>,
}

impl HeaderBand {
    pub fn fit(
        columns: &[ColumnSpec],
        widths: &ColumnWidths,
        x: f64,
        theme: &ReportTheme,
        measure: &dyn TextMeasure,
    ) -> Self {
        let offsets = widths.offsets();
        let cells = columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                let width = widths.at(i);
                let available = (width - 2.0 * theme.cell_padding).max(0.0);
                let (lines, font_size) =
                    fit_header_label(&col.display_label(), available, theme, measure);
                HeaderCell {
                    x: x + offsets[i],
                    width,
                    lines,
                    font_size,
                    align: col.align(),
                }
            })
            .collect();
        Self {
            x,
            width: widths.total(),
            height: theme.header_height,
            cells,
        }
    }
}

/// Large size, then small size, then a forced two-line split, then
/// truncation.
fn fit_header_label(
    label: &str,
    available: f64,
    theme: &ReportTheme,
    measure: &dyn TextMeasure,
) -> (Vec<String>, f64) {
    let font = StandardFont::HelveticaBold;
    let large = theme.header_font_size;
    let small = theme.header_small_font_size;

    if measure.measure(label, font, large) <= available {
        return (vec![label.to_string()], large);
    }
    if measure.measure(label, font, small) <= available {
        return (vec![label.to_string()], small);
    }
    let two_lines_fit = 2.0 * small * LINE_HEIGHT_FACTOR <= theme.header_height;
    if two_lines_fit {
        if let Some((first, second)) = split_at_balanced_space(label, measure, font, small) {
            return (
                vec![
                    truncate_to_width(&first, available, measure, font, small),
                    truncate_to_width(&second, available, measure, font, small),
                ],
                small,
            );
        }
    }
    (vec![truncate_to_width(label, available, measure, font, small)], small)
}

/// x of a text run of `text_width` aligned inside a cell.
fn aligned_x(align: Align, left: f64, width: f64, padding: f64, text_width: f64) -> f64 {
    match align {
        Align::Left => left + padding,
        Align::Right => left + width - padding - text_width,
        Align::Center => left + (width - text_width) / 2.0,
    }
}

/// Baseline of the first of `lines` lines centred vertically in a band.
fn first_baseline(top: f64, height: f64, lines: usize, font_size: f64) -> f64 {
    let block = lines as f64 * font_size * LINE_HEIGHT_FACTOR;
    let start = top + ((height - block) / 2.0).max(CELL_VERTICAL_PADDING / 2.0);
    start + font_size * 0.9
}

/// How many lines of text fit in a row.
fn max_lines(height: f64, font_size: f64) -> usize {
    let fit = ((height - CELL_VERTICAL_PADDING) / (font_size * LINE_HEIGHT_FACTOR)).floor();
    if fit.is_finite() && fit >= 1.0 {
        fit as usize
    } else {
        1
    }
}

/// Draw `band` at the cursor and record it as a header row.
pub fn draw_header_band(flow: &mut PageFlow<'_>, band: &HeaderBand) {
    let theme = flow.theme();
    let measure = flow.measure();
    let (top, height) = flow.place(band.height);

    flow.rect(band.x, top, band.width, height, Some(theme.header_fill), None);
    for cell in band.cells.iter().skip(1) {
        flow.line(
            cell.x,
            top,
            cell.x,
            top + height,
            Stroke {
                color: theme.border_color,
                width: theme.border_width,
            },
        );
    }

    let font = StandardFont::HelveticaBold;
    for cell in &band.cells {
        let mut baseline = first_baseline(top, height, cell.lines.len(), cell.font_size);
        for line in &cell.lines {
            let w = measure.measure(line, font, cell.font_size);
            let x = aligned_x(cell.align, cell.x, cell.width, theme.cell_padding, w);
            flow.text(x, baseline, line, font, cell.font_size, theme.header_text, TextAnchor::Start);
            baseline += cell.font_size * LINE_HEIGHT_FACTOR;
        }
    }
    flow.record_row(RowKind::Header, "header", top, height);
}

/// The value an aggregate row shows under a column, by column key. `None`
/// for columns that have no meaningful total (names, prices, codes).
pub fn aggregate_cell(key: &str, agg: &Aggregate, currency: &str) -> Option<String> {
    match key {
        "count" => Some(format_integer(agg.count as i64)),
        "stock" => Some(format_integer(agg.total_stock)),
        "inventoryValue" => Some(format_currency(agg.inventory_value, currency)),
        "retailValue" => Some(format_currency(agg.retail_value, currency)),
        "taxCollected" => Some(format_currency(agg.tax_collected, currency)),
        "marginAmount" => Some(format_currency(agg.margin_amount, currency)),
        "margin" => Some(format_percentage(agg.margin_rate, 1)),
        _ => None,
    }
}

/// Look of an aggregate row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryRowStyle {
    pub bold: bool,
    pub indent: f64,
    pub fill: Option<Color>,
}

/// Draws one table. Borrows the column set and the optional barcode
/// renderer for the table's lifetime.
pub struct TableRenderer<'t> {
    columns: &'t [ColumnSpec],
    widths: ColumnWidths,
    offsets: Vec<f64>,
    x: f64,
    band: HeaderBand,
    estimator: RowHeightEstimator,
    currency: &'t str,
    barcodes: Option<&'t dyn BarcodeRenderer>,
    row_index: usize,
}

impl<'t> TableRenderer<'t> {
    /// Allocate widths over the full usable width and fit the header band.
    /// Fails with `InvalidSpec` before anything is drawn.
    pub fn new(
        columns: &'t [ColumnSpec],
        area: &UsableArea,
        theme: &ReportTheme,
        measure: &dyn TextMeasure,
        currency: &'t str,
        barcodes: Option<&'t dyn BarcodeRenderer>,
    ) -> Result<Self> {
        let widths = allocate(columns, area.width)?;
        let band = HeaderBand::fit(columns, &widths, area.left, theme, measure);
        Ok(Self {
            columns,
            offsets: widths.offsets(),
            widths,
            x: area.left,
            band,
            estimator: RowHeightEstimator::default(),
            currency,
            barcodes,
            row_index: 0,
        })
    }

    pub fn with_estimator(mut self, estimator: RowHeightEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn widths(&self) -> &ColumnWidths {
        &self.widths
    }

    pub fn header(&self) -> &HeaderBand {
        &self.band
    }

    fn width(&self) -> f64 {
        self.widths.total()
    }

    /// Draw the header band and keep it repeating until [`end`](Self::end).
    /// The band is kept on the same page as the first row, whose height the
    /// caller passes in.
    pub fn begin(&mut self, flow: &mut PageFlow<'_>, first_row_height: f64) {
        flow.ensure_space_for(&[self.band.height, first_row_height], 2);
        let was_top = flow.at_page_top();
        draw_header_band(flow, &self.band);
        if was_top {
            flow.mark_page_start();
        }
        flow.repeat_header(Some(self.band.clone()));
        self.row_index = 0;
    }

    pub fn end(&self, flow: &mut PageFlow<'_>) {
        flow.repeat_header(None);
    }

    pub fn row_height(&self, record: &RecordView, theme: &ReportTheme) -> f64 {
        self.estimator
            .estimate(record, self.columns, &self.widths, theme.font_size, self.currency)
    }

    fn row_background(&mut self, flow: &mut PageFlow<'_>, top: f64, height: f64, fill: Option<Color>) {
        let theme = flow.theme();
        let stroke = Stroke {
            color: theme.border_color,
            width: theme.border_width,
        };
        flow.rect(self.x, top, self.width(), height, fill, None);
        for (i, left) in self.offsets.iter().enumerate() {
            flow.rect(self.x + left, top, self.widths.at(i), height, None, Some(stroke));
        }
    }

    /// Draw one record.
    pub fn data_row(&mut self, flow: &mut PageFlow<'_>, record: &RecordView) {
        let theme = flow.theme();
        let height = self.row_height(record, theme);
        flow.ensure_space(height);
        let (top, height) = flow.place(height);

        let fill = (self.row_index % 2 == 1).then_some(theme.alternate_fill);
        self.row_index += 1;
        self.row_background(flow, top, height, fill);

        for (i, column) in self.columns.iter().enumerate() {
            let left = self.x + self.offsets[i];
            let width = self.widths.at(i);
            let value = column.format(record, self.currency);
            self.draw_cell(flow, column, value, left, width, top, height);
        }

        let label = if record.sku.is_empty() { &record.name } else { &record.sku };
        flow.record_row(RowKind::Data, label, top, height);
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_cell(
        &self,
        flow: &mut PageFlow<'_>,
        column: &ColumnSpec,
        value: CellValue,
        left: f64,
        width: f64,
        top: f64,
        height: f64,
    ) {
        let theme = flow.theme();
        let measure = flow.measure();
        let font = StandardFont::Helvetica;
        let fs = theme.font_size;
        let inner = (width - 2.0 * theme.cell_padding).max(0.0);

        let lines: Vec<String> = match value {
            CellValue::Blank => return,
            CellValue::Barcode(code) => {
                if code.is_empty() {
                    vec!["-".to_string()]
                } else if self.draw_barcode(flow, &code, left, width, top, height) {
                    return;
                } else {
                    vec![truncate_to_width(&code, inner, measure, font, fs)]
                }
            }
            CellValue::Lines(lines) => {
                let cap = max_lines(height, fs);
                lines
                    .iter()
                    .take(cap)
                    .map(|l| truncate_to_width(&capitalize_first(l), inner, measure, font, fs))
                    .collect()
            }
            CellValue::Text(text) => match column.kind() {
                ColumnKind::Text | ColumnKind::Code => {
                    let cap = max_lines(height, fs);
                    let mut wrapped = wrap_text(&text, inner, measure, font, fs);
                    if wrapped.len() > cap {
                        let rest = wrapped[cap - 1..].join(" ");
                        wrapped.truncate(cap - 1);
                        wrapped.push(truncate_to_width(&rest, inner, measure, font, fs));
                    }
                    wrapped
                }
                _ => vec![truncate_to_width(&text, inner, measure, font, fs)],
            },
        };

        let align = match column.kind() {
            ColumnKind::Barcode => Align::Left,
            _ => column.align(),
        };
        let mut baseline = first_baseline(top, height, lines.len(), fs);
        for line in &lines {
            let w = measure.measure(line, font, fs);
            let x = aligned_x(align, left, width, theme.cell_padding, w);
            flow.text(x, baseline, line, font, fs, theme.text_color, TextAnchor::Start);
            baseline += fs * LINE_HEIGHT_FACTOR;
        }
    }

    /// Ask the renderer for a raster and place it. False means "fall back to
    /// text"; the row height was reserved beforehand either way.
    fn draw_barcode(
        &self,
        flow: &mut PageFlow<'_>,
        code: &str,
        left: f64,
        width: f64,
        top: f64,
        height: f64,
    ) -> bool {
        let Some(renderer) = self.barcodes else {
            debug!(code, "no barcode renderer configured, printing value");
            return false;
        };
        let theme = flow.theme();
        let options = BarcodeOptions {
            width: (width - 2.0 * theme.cell_padding).max(1.0),
            height: (height - CELL_VERTICAL_PADDING).max(1.0),
            font_size: theme.font_size * 0.8,
            margin: 2.0,
        };
        match renderer.render(code, &options) {
            Ok(raster) if raster.is_consistent() => {
                flow.push(LayoutElement {
                    x: left + theme.cell_padding,
                    y: top + CELL_VERTICAL_PADDING / 2.0,
                    width: options.width,
                    height: options.height,
                    draw: DrawCommand::Image { raster },
                });
                true
            }
            Ok(raster) => {
                warn!(
                    code,
                    width_px = raster.width_px,
                    height_px = raster.height_px,
                    pixels = raster.pixels.len(),
                    "barcode raster has inconsistent dimensions, printing value"
                );
                false
            }
            Err(e) => {
                warn!(code, error = %e, "barcode rendering failed, printing value");
                false
            }
        }
    }

    /// A full-width heading row for a category group, kept on the same page
    /// as the group's first record.
    pub fn group_heading(&mut self, flow: &mut PageFlow<'_>, label: &str, first_row_height: f64) {
        let theme = flow.theme();
        let measure = flow.measure();
        flow.ensure_space_for(&[GROUP_HEADING_HEIGHT, first_row_height], 2);
        let (top, height) = flow.place(GROUP_HEADING_HEIGHT);

        flow.rect(
            self.x,
            top,
            self.width(),
            height,
            Some(theme.group_fill),
            Some(Stroke {
                color: theme.border_color,
                width: theme.border_width,
            }),
        );
        let font = StandardFont::HelveticaBold;
        let fs = theme.font_size;
        let label = capitalize_first(label);
        let text = truncate_to_width(&label, self.width() - 2.0 * theme.cell_padding, measure, font, fs);
        let baseline = first_baseline(top, height, 1, fs);
        flow.text(self.x + theme.cell_padding, baseline, &text, font, fs, theme.text_color, TextAnchor::Start);
        flow.record_row(RowKind::GroupHeading, &label, top, height);
        self.row_index = 0;
    }

    /// A totals row: `label` in the first column that has no total of its
    /// own, aggregate values under the columns that do. Parent rows keep
    /// their label as given; every other label is sentence-cased.
    pub fn aggregate_row(
        &mut self,
        flow: &mut PageFlow<'_>,
        kind: RowKind,
        label: &str,
        agg: &Aggregate,
        style: SummaryRowStyle,
    ) {
        let theme = flow.theme();
        let measure = flow.measure();
        flow.ensure_space(BASE_ROW_HEIGHT);
        let (top, height) = flow.place(BASE_ROW_HEIGHT);

        let fill = style.fill.or_else(|| {
            let alternate = kind == RowKind::LeafRollup && self.row_index % 2 == 1;
            alternate.then_some(theme.alternate_fill)
        });
        self.row_index += 1;
        self.row_background(flow, top, height, fill);

        let font = StandardFont::regular_or_bold(style.bold);
        let fs = theme.font_size;
        let baseline = first_baseline(top, height, 1, fs);
        let label = match kind {
            RowKind::ParentTotal => label.to_string(),
            _ => capitalize_first(label),
        };
        let mut label_placed = false;

        for (i, column) in self.columns.iter().enumerate() {
            let left = self.x + self.offsets[i];
            let width = self.widths.at(i);
            let inner = (width - 2.0 * theme.cell_padding).max(0.0);
            match aggregate_cell(column.key(), agg, self.currency) {
                Some(value) => {
                    let text = truncate_to_width(&value, inner, measure, font, fs);
                    let w = measure.measure(&text, font, fs);
                    let x = aligned_x(column.align(), left, width, theme.cell_padding, w);
                    flow.text(x, baseline, &text, font, fs, theme.text_color, TextAnchor::Start);
                }
                None if !label_placed => {
                    label_placed = true;
                    let indent = style.indent.min(inner);
                    let text = truncate_to_width(&label, inner - indent, measure, font, fs);
                    let x = left + theme.cell_padding + indent;
                    flow.text(x, baseline, &text, font, fs, theme.text_color, TextAnchor::Start);
                }
                None => {}
            }
        }
        flow.record_row(kind, &label, top, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::barcode::{BarcodeError, RasterImage};
    use crate::font::FontContext;
    use crate::layout::row_height::BARCODE_ROW_HEIGHT;
    use crate::model::{InventoryItem, PageConfig};
    use crate::text::tests::Monospace;

    fn record(sku: &str, barcode: &str) -> RecordView {
        RecordView::from(&InventoryItem {
            id: sku.into(),
            sku: sku.into(),
            name: "Bronze strings".into(),
            barcode: Some(barcode.into()),
            stock: 4,
            ..Default::default()
        })
    }

    fn columns(keys: &[&str]) -> Vec<ColumnSpec> {
        keys.iter().map(|k| ColumnSpec::from_catalog(k).unwrap()).collect()
    }

    #[test]
    fn header_label_degrades_step_by_step() {
        let theme = ReportTheme::default();
        // Monospace: 0.5 em per char. "Inventory value" is 15 chars.
        let (lines, size) = fit_header_label("Inventory value", 100.0, &theme, &Monospace);
        assert_eq!((lines.len(), size), (1, 9.0));
        let (lines, size) = fit_header_label("Inventory value", 60.0, &theme, &Monospace);
        assert_eq!((lines.len(), size), (1, 7.0));
        let (lines, size) = fit_header_label("Inventory value", 40.0, &theme, &Monospace);
        assert_eq!(lines, vec!["Inventory", "value"]);
        assert_eq!(size, 7.0);
        let (lines, _) = fit_header_label("Barcode", 10.0, &theme, &Monospace);
        assert_eq!(lines.len(), 1);
        assert!(Monospace.measure(&lines[0], StandardFont::HelveticaBold, 7.0) <= 10.0);
    }

    #[test]
    fn aggregate_cells_by_key() {
        let agg = Aggregate {
            count: 3,
            total_stock: 1200,
            inventory_value: 10.0,
            retail_value: 25.0,
            tax_collected: 2.5,
            margin_amount: 15.0,
            margin_rate: 150.0,
        };
        assert_eq!(aggregate_cell("stock", &agg, "$").as_deref(), Some("1,200"));
        assert_eq!(aggregate_cell("retailValue", &agg, "$").as_deref(), Some("$25.00"));
        assert_eq!(aggregate_cell("margin", &agg, "$").as_deref(), Some("150.0%"));
        assert_eq!(aggregate_cell("name", &agg, "$"), None);
    }

    #[test]
    fn empty_barcode_prints_dash_and_keeps_base_height() {
        let theme = ReportTheme::default();
        let ctx = FontContext::new();
        let cols = columns(&["sku", "barcode"]);
        let mut flow = PageFlow::new(PageConfig::default(), &theme, &ctx, "T").unwrap();
        let mut table = TableRenderer::new(&cols, flow.area(), &theme, &ctx, "$", None).unwrap();
        table.begin(&mut flow, BASE_ROW_HEIGHT);
        table.data_row(&mut flow, &record("A-1", ""));
        table.data_row(&mut flow, &record("A-2", "4006381333931"));
        table.end(&mut flow);
        let pages = flow.finish();

        let data: Vec<_> = pages[0].rows_of(RowKind::Data).collect();
        assert_eq!(data[0].height, BASE_ROW_HEIGHT);
        assert_eq!(data[1].height, BARCODE_ROW_HEIGHT);
        assert!(pages[0].texts().any(|t| t == "-"));
        // no renderer: the value itself is printed
        assert!(pages[0].texts().any(|t| t == "4006381333931"));
    }

    #[test]
    fn failed_barcode_falls_back_to_text_without_changing_height() {
        let theme = ReportTheme::default();
        let ctx = FontContext::new();
        let cols = columns(&["sku", "barcode"]);
        let failing = |_: &str, _: &BarcodeOptions| -> std::result::Result<RasterImage, BarcodeError> {
            Err(BarcodeError::Failed("timeout".into()))
        };
        let mut flow = PageFlow::new(PageConfig::default(), &theme, &ctx, "T").unwrap();
        let mut table =
            TableRenderer::new(&cols, flow.area(), &theme, &ctx, "$", Some(&failing as &dyn BarcodeRenderer)).unwrap();
        table.begin(&mut flow, BASE_ROW_HEIGHT);
        table.data_row(&mut flow, &record("A-2", "4006381333931"));
        let pages = flow.finish();

        let row = pages[0].rows_of(RowKind::Data).next().unwrap();
        assert_eq!(row.height, BARCODE_ROW_HEIGHT);
        assert!(pages[0].texts().any(|t| t == "4006381333931"));
        assert!(!pages[0].elements.iter().any(|e| matches!(e.draw, DrawCommand::Image { .. })));
    }

    #[test]
    fn rendered_barcode_becomes_an_image() {
        let theme = ReportTheme::default();
        let ctx = FontContext::new();
        let cols = columns(&["barcode"]);
        let bars = |_: &str, _: &BarcodeOptions| -> std::result::Result<RasterImage, BarcodeError> {
            Ok(RasterImage {
                width_px: 4,
                height_px: 2,
                pixels: vec![0, 255, 0, 255, 0, 255, 0, 255],
            })
        };
        let mut flow = PageFlow::new(PageConfig::default(), &theme, &ctx, "T").unwrap();
        let mut table =
            TableRenderer::new(&cols, flow.area(), &theme, &ctx, "$", Some(&bars as &dyn BarcodeRenderer)).unwrap();
        table.begin(&mut flow, BASE_ROW_HEIGHT);
        table.data_row(&mut flow, &record("A-2", "4006381333931"));
        let pages = flow.finish();
        assert!(pages[0].elements.iter().any(|e| matches!(e.draw, DrawCommand::Image { .. })));
        assert!(!pages[0].texts().any(|t| t == "4006381333931"));
    }

    #[test]
    fn header_repeats_after_page_break() {
        let theme = ReportTheme::default();
        let ctx = FontContext::new();
        let cols = columns(&["sku", "name", "stock"]);
        let mut flow = PageFlow::new(PageConfig::default(), &theme, &ctx, "T").unwrap();
        let mut table = TableRenderer::new(&cols, flow.area(), &theme, &ctx, "$", None).unwrap();
        table.begin(&mut flow, BASE_ROW_HEIGHT);
        for i in 0..80 {
            table.data_row(&mut flow, &record(&format!("S-{i:03}"), ""));
        }
        table.end(&mut flow);
        let pages = flow.finish();

        assert!(pages.len() > 1);
        for page in &pages {
            let first = &page.rows[0];
            assert_eq!(first.kind, RowKind::Header, "page {}", page.number);
            assert_eq!(page.rows_of(RowKind::Header).count(), 1);
        }
        let total: usize = pages.iter().map(|p| p.rows_of(RowKind::Data).count()).sum();
        assert_eq!(total, 80);
    }

    #[test]
    fn header_band_moves_with_a_tall_first_row() {
        let theme = ReportTheme::default();
        let ctx = FontContext::new();
        let cols = columns(&["sku", "barcode"]);
        let mut flow = PageFlow::new(PageConfig::default(), &theme, &ctx, "T").unwrap();
        let mut table = TableRenderer::new(&cols, flow.area(), &theme, &ctx, "$", None).unwrap();
        let first = record("A-1", "4006381333931");
        let first_height = table.row_height(&first, &theme);
        assert_eq!(first_height, BARCODE_ROW_HEIGHT);

        // room for the band and a plain row, not for the band and a barcode row
        let gap = flow.remaining() - table.header().height - 30.0;
        flow.advance(gap);
        table.begin(&mut flow, first_height);
        table.data_row(&mut flow, &first);
        table.end(&mut flow);
        let pages = flow.finish();

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].rows_of(RowKind::Header).count(), 0);
        let kinds: Vec<RowKind> = pages[1].rows.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![RowKind::Header, RowKind::Data]);
    }

    #[test]
    fn category_labels_are_sentence_cased() {
        let theme = ReportTheme::default();
        let ctx = FontContext::new();
        let cols = columns(&["category", "stock"]);
        let item = RecordView::from(&InventoryItem {
            id: "1".into(),
            sku: "A-1".into(),
            name: "Capo".into(),
            stock: 2,
            category: Some(crate::model::CategoryRef {
                name: Some("acoustic GUITARS".into()),
                path: Some("guitars > acoustic GUITARS".into()),
                ..Default::default()
            }),
            ..Default::default()
        });
        let mut flow = PageFlow::new(PageConfig::default(), &theme, &ctx, "T").unwrap();
        let mut table = TableRenderer::new(&cols, flow.area(), &theme, &ctx, "$", None).unwrap();
        let row_height = table.row_height(&item, &theme);
        table.begin(&mut flow, BASE_ROW_HEIGHT);
        table.group_heading(&mut flow, "acoustic GUITARS (1 item)", row_height);
        table.data_row(&mut flow, &item);
        let agg = Aggregate {
            count: 1,
            total_stock: 2,
            ..Default::default()
        };
        let style = SummaryRowStyle {
            bold: false,
            indent: 0.0,
            fill: None,
        };
        table.aggregate_row(&mut flow, RowKind::GroupTotal, "Subtotal acoustic GUITARS", &agg, style);
        table.aggregate_row(&mut flow, RowKind::ParentTotal, "GUITARS", &agg, style);
        table.end(&mut flow);
        let pages = flow.finish();

        let texts: Vec<&str> = pages[0].texts().collect();
        assert!(texts.contains(&"Acoustic guitars (1 item)"), "{texts:?}");
        assert!(texts.contains(&"Acoustic guitars"), "{texts:?}");
        assert!(texts.contains(&"Guitars > acoustic guitars"), "{texts:?}");
        assert!(texts.contains(&"Subtotal acoustic guitars"), "{texts:?}");
        assert!(texts.contains(&"GUITARS"), "{texts:?}");
        let heading = pages[0].rows_of(RowKind::GroupHeading).next().unwrap();
        assert_eq!(heading.label, "Acoustic guitars (1 item)");
    }

    #[test]
    fn aggregate_label_skips_columns_with_totals() {
        let theme = ReportTheme::default();
        let ctx = FontContext::new();
        let cols = columns(&["stock", "name", "inventoryValue"]);
        let mut flow = PageFlow::new(PageConfig::default(), &theme, &ctx, "T").unwrap();
        let mut table = TableRenderer::new(&cols, flow.area(), &theme, &ctx, "$", None).unwrap();
        table.begin(&mut flow, BASE_ROW_HEIGHT);
        let agg = Aggregate {
            count: 2,
            total_stock: 7,
            ..Default::default()
        };
        let style = SummaryRowStyle {
            bold: true,
            indent: 0.0,
            fill: Some(theme.total_fill),
        };
        table.aggregate_row(&mut flow, RowKind::GrandTotal, "Total", &agg, style);
        let pages = flow.finish();
        let texts: Vec<&str> = pages[0].texts().collect();
        assert!(texts.contains(&"7"));
        assert!(texts.contains(&"Total"));
        assert!(texts.contains(&"$0.00"));
    }
}
