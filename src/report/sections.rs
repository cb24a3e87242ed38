//! The blocks a report is made of, each drawn at the flow's cursor.

use chrono::NaiveDateTime;

use crate::barcode::BarcodeRenderer;
use crate::error::Result;
use crate::font::StandardFont;
use crate::format::{
    format_currency, format_integer, format_percentage, format_rate, format_timestamp,
};
use crate::grouping::{
    grand_total, group_by_leaf, group_by_parent, tax_breakdown, Aggregate, CategoryGroup, InventoryMetrics,
};
use crate::layout::columns::{Align, ColumnKind, ColumnSpec};
use crate::layout::row_height::{RowHeightEstimator, BASE_ROW_HEIGHT, LINE_HEIGHT_FACTOR};
use crate::layout::table::{SummaryRowStyle, TableRenderer, GROUP_HEADING_HEIGHT};
use crate::layout::{PageFlow, RowKind, Stroke, TextAnchor};
use crate::model::RecordView;
use crate::options::{CompanyInfo, ReportOptions};
use crate::style::{Color, ReportTheme};
use crate::text::{truncate_to_width, wrap_text};

const METRIC_BOX_HEIGHT: f64 = 38.0;
const METRIC_BOX_GAP: f64 = 6.0;
const SECTION_GAP: f64 = 12.0;
const TOTALS_LABEL_WIDTH: f64 = 140.0;
const TOTALS_VALUE_WIDTH: f64 = 110.0;

/// What every section needs besides the flow.
pub(crate) struct SectionContext<'c> {
    pub options: &'c ReportOptions,
    pub currency: &'c str,
    pub barcodes: Option<&'c dyn BarcodeRenderer>,
    pub estimator: RowHeightEstimator,
}

fn plural(n: usize, one: &str, many: &str) -> String {
    format!("{} {}", format_integer(n as i64), if n == 1 { one } else { many })
}

fn grand_total_style(theme: &ReportTheme) -> SummaryRowStyle {
    SummaryRowStyle {
        bold: true,
        indent: 0.0,
        fill: Some(theme.total_fill),
    }
}

const PLAIN_ROW: SummaryRowStyle = SummaryRowStyle {
    bold: false,
    indent: 0.0,
    fill: None,
};

/// One line of free text at the left margin.
fn text_line(flow: &mut PageFlow<'_>, text: &str, font: StandardFont, size: f64, color: Color) {
    let height = size * LINE_HEIGHT_FACTOR;
    flow.ensure_space(height);
    let (top, _) = flow.place(height);
    let x = flow.area().left;
    let fitted = truncate_to_width(text, flow.area().width, flow.measure(), font, size);
    flow.text(x, top + size, &fitted, font, size, color, TextAnchor::Start);
}

/// A bold heading kept on the same page as the header band and first row of
/// the table that follows it.
fn section_heading(flow: &mut PageFlow<'_>, text: &str) {
    let theme = flow.theme();
    let size = theme.heading_font_size;
    let height = size * LINE_HEIGHT_FACTOR + 4.0;
    flow.ensure_space_for(&[height, theme.header_height, BASE_ROW_HEIGHT], 3);
    let (top, _) = flow.place(height);
    let x = flow.area().left;
    flow.text(x, top + size, text, StandardFont::HelveticaBold, size, theme.text_color, TextAnchor::Start);
}

/// Report title, generation time and record count.
pub(crate) fn title_block(flow: &mut PageFlow<'_>, title: &str, generated_at: &NaiveDateTime, records: usize) {
    let theme = flow.theme();
    text_line(flow, title, StandardFont::HelveticaBold, theme.title_font_size, theme.text_color);
    let subtitle = format!(
        "Generated {}  |  {}",
        format_timestamp(generated_at),
        plural(records, "item", "items")
    );
    text_line(flow, &subtitle, StandardFont::Helvetica, theme.font_size + 1.0, theme.muted_color);
    flow.advance(SECTION_GAP / 2.0);
}

pub(crate) fn company_block(flow: &mut PageFlow<'_>, company: &CompanyInfo) {
    let theme = flow.theme();
    text_line(flow, company.name.trim(), StandardFont::HelveticaBold, theme.font_size + 2.0, theme.text_color);
    for line in company.detail_lines() {
        text_line(flow, &line, StandardFont::Helvetica, theme.font_size, theme.muted_color);
    }
    let y = flow.cursor().y + 4.0;
    let (left, right) = (flow.area().left, flow.area().right);
    flow.line(
        left,
        y,
        right,
        y,
        Stroke {
            color: theme.border_color,
            width: theme.border_width,
        },
    );
    flow.advance(SECTION_GAP);
}

/// Rows of labelled value boxes, `per_row` to a row.
fn metric_boxes(flow: &mut PageFlow<'_>, metrics: &[(&str, String)], per_row: usize) {
    let theme = flow.theme();
    let measure = flow.measure();
    let per_row = per_row.max(1);
    let left = flow.area().left;
    let width = (flow.area().width - METRIC_BOX_GAP * (per_row - 1) as f64) / per_row as f64;
    let stroke = Stroke {
        color: theme.border_color,
        width: theme.border_width,
    };

    for chunk in metrics.chunks(per_row) {
        flow.ensure_space(METRIC_BOX_HEIGHT);
        let (top, height) = flow.place(METRIC_BOX_HEIGHT);
        for (i, (label, value)) in chunk.iter().enumerate() {
            let x = left + i as f64 * (width + METRIC_BOX_GAP);
            let inner = (width - 2.0 * theme.cell_padding).max(0.0);
            flow.rect(x, top, width, height, Some(theme.alternate_fill), Some(stroke));

            let small = theme.header_small_font_size;
            let label = truncate_to_width(label, inner, measure, StandardFont::Helvetica, small);
            flow.text(x + theme.cell_padding, top + 4.0 + small, &label, StandardFont::Helvetica, small, theme.muted_color, TextAnchor::Start);

            let size = theme.heading_font_size;
            let value = truncate_to_width(value, inner, measure, StandardFont::HelveticaBold, size);
            flow.text(x + theme.cell_padding, top + height - 8.0, &value, StandardFont::HelveticaBold, size, theme.text_color, TextAnchor::Start);
        }
        flow.advance(METRIC_BOX_GAP);
    }
    flow.advance(SECTION_GAP / 2.0);
}

fn margin_text(agg: &Aggregate, currency: &str) -> String {
    format!(
        "{} ({})",
        format_currency(agg.margin_amount, currency),
        format_percentage(agg.margin_rate, 1)
    )
}

// ─── Summary report ─────────────────────────────────────────────

pub(crate) fn summary(flow: &mut PageFlow<'_>, records: &[RecordView], ctx: &SectionContext<'_>) -> Result<()> {
    let metrics = InventoryMetrics::compute(records);
    let t = &metrics.totals;
    let currency = ctx.currency;

    metric_boxes(
        flow,
        &[
            ("Items", format_integer(t.count as i64)),
            ("Units in stock", format_integer(t.total_stock)),
            ("Inventory value", format_currency(t.inventory_value, currency)),
            ("Retail value", format_currency(t.retail_value, currency)),
            ("Potential margin", format_currency(t.margin_amount, currency)),
            ("Margin rate", format_percentage(t.margin_rate, 1)),
            ("Tax contained", format_currency(t.tax_collected, currency)),
            (
                "Out of stock / low stock",
                format!("{} / {}", metrics.out_of_stock, metrics.low_stock),
            ),
        ],
        4,
    );

    tax_table(flow, records, currency)?;
    flow.advance(SECTION_GAP);
    category_overview(flow, records, currency)?;
    flow.advance(SECTION_GAP);
    narrative(flow, &metrics, currency);
    Ok(())
}

fn tax_table(flow: &mut PageFlow<'_>, records: &[RecordView], currency: &str) -> Result<()> {
    let columns = vec![
        ColumnSpec::new("taxRate", "Tax rate", 2.0, Align::Left, ColumnKind::Percentage)?,
        ColumnSpec::new("count", "Items", 1.5, Align::Right, ColumnKind::Integer)?,
        ColumnSpec::new("stock", "Units", 1.5, Align::Right, ColumnKind::Integer)?,
        ColumnSpec::new("retailValue", "Retail value", 2.5, Align::Right, ColumnKind::Currency)?,
        ColumnSpec::new("taxCollected", "Tax contained", 2.5, Align::Right, ColumnKind::Currency)?,
    ];
    let area = *flow.area();
    let theme = flow.theme();
    let mut table = TableRenderer::new(&columns, &area, theme, flow.measure(), currency, None)?;

    section_heading(flow, "Tax rates");
    table.begin(flow, BASE_ROW_HEIGHT);
    for bucket in tax_breakdown(records) {
        let label = format_rate(bucket.rate);
        table.aggregate_row(flow, RowKind::LeafRollup, &label, &bucket.aggregate, PLAIN_ROW);
    }
    table.aggregate_row(flow, RowKind::GrandTotal, "Total", &grand_total(records), grand_total_style(theme));
    table.end(flow);
    Ok(())
}

fn category_overview(flow: &mut PageFlow<'_>, records: &[RecordView], currency: &str) -> Result<()> {
    let columns = rollup_columns()?;
    let area = *flow.area();
    let theme = flow.theme();
    let mut table = TableRenderer::new(&columns, &area, theme, flow.measure(), currency, None)?;

    section_heading(flow, "Categories");
    table.begin(flow, BASE_ROW_HEIGHT);
    for group in group_by_leaf(records) {
        table.aggregate_row(flow, RowKind::LeafRollup, &group.name, &group.aggregate, PLAIN_ROW);
    }
    table.aggregate_row(flow, RowKind::GrandTotal, "Total", &grand_total(records), grand_total_style(theme));
    table.end(flow);
    Ok(())
}

fn narrative(flow: &mut PageFlow<'_>, metrics: &InventoryMetrics, currency: &str) {
    let t = &metrics.totals;
    let mut text = format!(
        "The inventory holds {} in {} with {} in stock. At purchase prices the stock is worth {}; \
         at retail prices it is worth {}, which leaves a potential margin of {}. \
         Retail prices contain {} of tax.",
        plural(t.count, "item", "items"),
        plural(metrics.categories, "category", "categories"),
        plural(t.total_stock.max(0) as usize, "unit", "units"),
        format_currency(t.inventory_value, currency),
        format_currency(t.retail_value, currency),
        margin_text(t, currency),
        format_currency(t.tax_collected, currency),
    );
    if metrics.out_of_stock > 0 || metrics.low_stock > 0 {
        text.push_str(&format!(
            " {} out of stock and {} at or below the minimum stock level.",
            plural(metrics.out_of_stock, "item is", "items are"),
            plural(metrics.low_stock, "item is", "items are"),
        ));
    }

    let theme = flow.theme();
    section_heading(flow, "Summary");
    let size = theme.font_size + 1.0;
    let lines = wrap_text(&text, flow.area().width, flow.measure(), StandardFont::Helvetica, size);
    for line in lines {
        text_line(flow, &line, StandardFont::Helvetica, size, theme.text_color);
    }
}

// ─── Detailed report ────────────────────────────────────────────

pub(crate) fn detailed(
    flow: &mut PageFlow<'_>,
    records: &[RecordView],
    columns: &[ColumnSpec],
    ctx: &SectionContext<'_>,
) -> Result<()> {
    let totals = grand_total(records);
    let currency = ctx.currency;
    metric_boxes(
        flow,
        &[
            ("Items", format_integer(totals.count as i64)),
            ("Units in stock", format_integer(totals.total_stock)),
            ("Inventory value", format_currency(totals.inventory_value, currency)),
            ("Retail value", format_currency(totals.retail_value, currency)),
            ("Margin", margin_text(&totals, currency)),
        ],
        5,
    );

    if ctx.options.simplified {
        rollup_table(flow, records, ctx)?;
    } else if ctx.options.group_by_category {
        grouped_table(flow, records, columns, ctx)?;
    } else {
        flat_table(flow, records, columns, ctx)?;
    }

    flow.advance(SECTION_GAP);
    totals_block(flow, &totals, currency);
    Ok(())
}

fn record_table<'t>(
    flow: &PageFlow<'_>,
    columns: &'t [ColumnSpec],
    ctx: &SectionContext<'t>,
) -> Result<TableRenderer<'t>> {
    let area = *flow.area();
    Ok(TableRenderer::new(columns, &area, flow.theme(), flow.measure(), ctx.currency, ctx.barcodes)?
        .with_estimator(ctx.estimator))
}

fn flat_table(
    flow: &mut PageFlow<'_>,
    records: &[RecordView],
    columns: &[ColumnSpec],
    ctx: &SectionContext<'_>,
) -> Result<()> {
    let theme = flow.theme();
    let mut table = record_table(flow, columns, ctx)?;
    let first_height = records
        .first()
        .map(|r| table.row_height(r, theme))
        .unwrap_or(BASE_ROW_HEIGHT);
    table.begin(flow, first_height);
    for record in records {
        table.data_row(flow, record);
    }
    table.aggregate_row(flow, RowKind::GrandTotal, "Total", &grand_total(records), grand_total_style(theme));
    table.end(flow);
    Ok(())
}

/// One block per leaf category: heading, records, subtotal.
fn grouped_table(
    flow: &mut PageFlow<'_>,
    records: &[RecordView],
    columns: &[ColumnSpec],
    ctx: &SectionContext<'_>,
) -> Result<()> {
    let theme = flow.theme();
    let mut table = record_table(flow, columns, ctx)?;
    let groups = group_by_leaf(records);
    let opening = groups
        .first()
        .map(|g| first_row_height(&table, g, theme))
        .unwrap_or(BASE_ROW_HEIGHT);
    table.begin(flow, GROUP_HEADING_HEIGHT + opening);
    for group in &groups {
        let first_height = first_row_height(&table, group, theme);
        let heading = format!("{} ({})", group.name, plural(group.records.len(), "item", "items"));
        table.group_heading(flow, &heading, first_height);
        for record in &group.records {
            table.data_row(flow, record);
        }
        table.aggregate_row(
            flow,
            RowKind::GroupTotal,
            &format!("Subtotal {}", group.name),
            &group.aggregate,
            SummaryRowStyle {
                bold: true,
                indent: 0.0,
                fill: Some(theme.group_fill),
            },
        );
    }
    table.aggregate_row(flow, RowKind::GrandTotal, "Total", &grand_total(records), grand_total_style(theme));
    table.end(flow);
    Ok(())
}

fn first_row_height(table: &TableRenderer<'_>, group: &CategoryGroup<'_>, theme: &ReportTheme) -> f64 {
    group
        .records
        .first()
        .map(|r| table.row_height(r, theme))
        .unwrap_or(BASE_ROW_HEIGHT)
}

fn rollup_columns() -> Result<Vec<ColumnSpec>> {
    Ok(vec![
        ColumnSpec::new("category", "Category", 4.0, Align::Left, ColumnKind::Text)?,
        ColumnSpec::new("count", "Items", 1.2, Align::Right, ColumnKind::Integer)?,
        ColumnSpec::new("stock", "Units", 1.2, Align::Right, ColumnKind::Integer)?,
        ColumnSpec::new("inventoryValue", "Inventory value", 2.0, Align::Right, ColumnKind::Currency)?,
        ColumnSpec::new("retailValue", "Retail value", 2.0, Align::Right, ColumnKind::Currency)?,
        ColumnSpec::new("margin", "Margin", 1.4, Align::Right, ColumnKind::Percentage)?,
    ])
}

/// One row per leaf category. Parents with several children get a bold
/// uppercase rollup row above their indented children.
fn rollup_table(flow: &mut PageFlow<'_>, records: &[RecordView], ctx: &SectionContext<'_>) -> Result<()> {
    let columns = rollup_columns()?;
    let area = *flow.area();
    let theme = flow.theme();
    let mut table = TableRenderer::new(&columns, &area, theme, flow.measure(), ctx.currency, None)?;

    table.begin(flow, BASE_ROW_HEIGHT);
    for parent in group_by_parent(group_by_leaf(records)) {
        if parent.emits_parent_row() {
            flow.ensure_space_for(&[BASE_ROW_HEIGHT, BASE_ROW_HEIGHT], 2);
            table.aggregate_row(
                flow,
                RowKind::ParentTotal,
                &parent.name.to_uppercase(),
                &parent.aggregate,
                grand_total_style(theme),
            );
            for child in &parent.children {
                table.aggregate_row(
                    flow,
                    RowKind::LeafRollup,
                    &child.name,
                    &child.aggregate,
                    SummaryRowStyle {
                        bold: false,
                        indent: theme.group_indent,
                        fill: None,
                    },
                );
            }
        } else {
            for child in &parent.children {
                table.aggregate_row(flow, RowKind::LeafRollup, &child.name, &child.aggregate, PLAIN_ROW);
            }
        }
    }
    table.aggregate_row(flow, RowKind::GrandTotal, "Total", &grand_total(records), grand_total_style(theme));
    table.end(flow);
    Ok(())
}

/// Label/value pairs under the table, kept together on one page.
fn totals_block(flow: &mut PageFlow<'_>, totals: &Aggregate, currency: &str) {
    let theme = flow.theme();
    let size = theme.font_size + 1.0;
    let line_height = size * 1.5;
    let entries = [
        ("Items", format_integer(totals.count as i64)),
        ("Units in stock", format_integer(totals.total_stock)),
        ("Inventory value", format_currency(totals.inventory_value, currency)),
        ("Retail value", format_currency(totals.retail_value, currency)),
        ("Tax contained", format_currency(totals.tax_collected, currency)),
        ("Potential margin", margin_text(totals, currency)),
    ];
    let heading = theme.heading_font_size * LINE_HEIGHT_FACTOR + 4.0;
    flow.ensure_space(heading + line_height * entries.len() as f64);

    let (top, _) = flow.place(heading);
    let left = flow.area().left;
    flow.text(left, top + theme.heading_font_size, "Totals", StandardFont::HelveticaBold, theme.heading_font_size, theme.text_color, TextAnchor::Start);

    for (label, value) in entries {
        let (top, _) = flow.place(line_height);
        let baseline = top + size;
        flow.text(left, baseline, label, StandardFont::Helvetica, size, theme.muted_color, TextAnchor::Start);
        flow.text(
            left + TOTALS_LABEL_WIDTH + TOTALS_VALUE_WIDTH,
            baseline,
            &value,
            StandardFont::HelveticaBold,
            size,
            theme.text_color,
            TextAnchor::End,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontContext;
    use crate::model::{CategoryRef, InventoryItem, PageConfig};

    fn item(sku: &str, path: &str, stock: i64) -> RecordView {
        RecordView::from(&InventoryItem {
            id: sku.into(),
            sku: sku.into(),
            name: format!("Item {}", sku),
            price: 10.0,
            purchase_price: 5.0,
            stock,
            tax_rate: 19.0,
            category: Some(CategoryRef {
                path: Some(path.into()),
                path_segments: path.split('/').map(str::to_string).collect(),
                name: path.rsplit('/').next().map(str::to_string),
                ..Default::default()
            }),
            ..Default::default()
        })
    }

    fn ctx(options: &ReportOptions) -> SectionContext<'_> {
        SectionContext {
            options,
            currency: &options.currency_symbol,
            barcodes: None,
            estimator: RowHeightEstimator::default(),
        }
    }

    #[test]
    fn rollup_emits_parent_only_for_several_children() {
        let records = vec![
            item("A", "Guitars/Acoustic", 2),
            item("E", "Guitars/Electric", 1),
            item("S", "Strings", 10),
        ];
        let options = ReportOptions {
            simplified: true,
            ..Default::default()
        };
        let theme = ReportTheme::default();
        let fonts = FontContext::new();
        let mut flow = PageFlow::new(PageConfig::default(), &theme, &fonts, "t").unwrap();
        detailed(&mut flow, &records, &[], &ctx(&options)).unwrap();
        let pages = flow.finish();

        let parents: Vec<&str> = pages[0].rows_of(RowKind::ParentTotal).map(|r| r.label.as_str()).collect();
        assert_eq!(parents, vec!["GUITARS"]);
        let leaves: Vec<&str> = pages[0].rows_of(RowKind::LeafRollup).map(|r| r.label.as_str()).collect();
        assert_eq!(leaves, vec!["Acoustic", "Electric", "Strings"]);
    }

    #[test]
    fn totals_block_stays_on_one_page() {
        let theme = ReportTheme::default();
        let fonts = FontContext::new();
        let mut flow = PageFlow::new(PageConfig::default(), &theme, &fonts, "t").unwrap();
        let bottom = flow.content_bottom();
        flow.advance(bottom);
        totals_block(&mut flow, &Aggregate::default(), "$");
        let pages = flow.finish();
        assert_eq!(pages.len(), 2);
        assert!(pages[1].texts().any(|t| t == "Totals"));
        assert!(!pages[0].texts().any(|t| t == "Totals"));
    }

    #[test]
    fn summary_has_tax_rows_and_narrative() {
        let records = vec![item("A", "Strings", 2), item("B", "Strings", 3)];
        let options = ReportOptions::default();
        let theme = ReportTheme::default();
        let fonts = FontContext::new();
        let mut flow = PageFlow::new(PageConfig::default(), &theme, &fonts, "t").unwrap();
        summary(&mut flow, &records, &ctx(&options)).unwrap();
        let pages = flow.finish();
        let texts: Vec<&str> = pages.iter().flat_map(|p| p.texts()).collect();
        assert!(texts.contains(&"19%"));
        assert!(texts.iter().any(|t| t.starts_with("The inventory holds 2 items")));
        assert_eq!(pages[0].rows_of(RowKind::GrandTotal).count(), 2);
    }
}
