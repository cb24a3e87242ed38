//! # Columns
//!
//! The column catalog, the per-column formatters, and the weighted width
//! allocator. A column is chosen by key from a fixed catalog; how its cell
//! text is produced is decided by its [`ColumnKind`], never by matching on
//! the key again further down the pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};
use crate::format::{
    capitalize_first, format_currency, format_date, format_integer, format_percentage,
    format_rate,
};
use crate::model::RecordView;

/// Key of the caller-requested blank column.
pub const SYNTHETIC_KEY: &str = "custom";
/// Weight given to the blank column, comparable to the data columns so it
/// never collapses to a sliver.
pub const SYNTHETIC_WEIGHT: f64 = 2.0;

/// Columns used when the caller selects none.
pub const DEFAULT_COLUMNS: [&str; 6] = ["sku", "name", "category", "stock", "price", "inventoryValue"];

/// Horizontal alignment of a cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// What a column shows and how its values are formatted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Free text, case-normalized.
    Text,
    /// Identifiers, printed verbatim.
    Code,
    Integer,
    Currency,
    Percentage,
    Date,
    /// Multi-line category block.
    Category,
    /// Raster barcode with a text fallback.
    Barcode,
    /// Synthetic blank column for handwritten notes.
    Blank,
}

/// The record fields a catalog column can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Sku,
    Name,
    Description,
    Category,
    Price,
    PurchasePrice,
    Stock,
    MinStock,
    TaxRate,
    InventoryValue,
    RetailValue,
    Margin,
    Barcode,
    Location,
    Supplier,
    Notes,
    UpdatedAt,
    None,
}

/// Formatted content of one cell, before any width fitting.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    /// Pre-broken lines (category blocks).
    Lines(Vec<String>),
    /// A barcode value; empty means "no barcode".
    Barcode(String),
    Blank,
}

impl CellValue {
    /// Flat single-string form, lines joined with `separator`.
    pub fn flatten(&self, separator: &str) -> String {
        match self {
            CellValue::Text(s) | CellValue::Barcode(s) => s.clone(),
            CellValue::Lines(lines) => lines.join(separator),
            CellValue::Blank => String::new(),
        }
    }
}

/// One report column. Construct through [`ColumnSpec::new`] or the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    key: String,
    label: String,
    weight: f64,
    align: Align,
    kind: ColumnKind,
    field: Field,
    synthetic: bool,
}

impl ColumnSpec {
    /// A free-standing column (used for summary tables). Rejects weights
    /// that are not positive and finite.
    pub fn new(key: &str, label: &str, weight: f64, align: Align, kind: ColumnKind) -> Result<Self> {
        if !(weight.is_finite() && weight > 0.0) {
            return Err(ReportError::InvalidSpec(format!(
                "column '{}' has non-positive weight {}",
                key, weight
            )));
        }
        Ok(Self {
            key: key.to_string(),
            label: label.to_string(),
            weight,
            align,
            kind,
            field: Field::None,
            synthetic: kind == ColumnKind::Blank,
        })
    }

    /// Look a key up in the catalog.
    pub fn from_catalog(key: &str) -> Option<Self> {
        use Align::*;
        use ColumnKind as K;
        let (label, weight, align, kind, field) = match key {
            "sku" => ("SKU", 2.0, Left, K::Code, Field::Sku),
            "name" => ("Name", 4.0, Left, K::Text, Field::Name),
            "description" => ("Description", 4.0, Left, K::Text, Field::Description),
            "category" => ("Category", 3.0, Left, K::Category, Field::Category),
            "price" => ("Price", 2.0, Right, K::Currency, Field::Price),
            "purchasePrice" => ("Purchase price", 2.0, Right, K::Currency, Field::PurchasePrice),
            "stock" => ("Stock", 1.0, Right, K::Integer, Field::Stock),
            "minStock" => ("Min stock", 1.0, Right, K::Integer, Field::MinStock),
            "taxRate" => ("Tax rate", 1.0, Right, K::Percentage, Field::TaxRate),
            "inventoryValue" => ("Inventory value", 2.0, Right, K::Currency, Field::InventoryValue),
            "retailValue" => ("Retail value", 2.0, Right, K::Currency, Field::RetailValue),
            "margin" => ("Margin", 1.0, Right, K::Percentage, Field::Margin),
            "barcode" => ("Barcode", 3.0, Left, K::Barcode, Field::Barcode),
            "location" => ("Location", 2.0, Left, K::Text, Field::Location),
            "supplier" => ("Supplier", 2.0, Left, K::Text, Field::Supplier),
            "notes" => ("Notes", 4.0, Left, K::Text, Field::Notes),
            "updatedAt" => ("Updated", 2.0, Left, K::Date, Field::UpdatedAt),
            _ => return None,
        };
        Some(Self {
            key: key.to_string(),
            label: label.to_string(),
            weight,
            align,
            kind,
            field,
            synthetic: false,
        })
    }

    /// The blank, user-fillable column.
    pub fn synthetic(title: &str) -> Self {
        Self {
            key: SYNTHETIC_KEY.to_string(),
            label: title.trim().to_string(),
            weight: SYNTHETIC_WEIGHT,
            align: Align::Left,
            kind: ColumnKind::Blank,
            field: Field::None,
            synthetic: true,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// The label as printed: first letter uppercase, remainder lowercase.
    pub fn display_label(&self) -> String {
        capitalize_first(&self.label)
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn align(&self) -> Align {
        self.align
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }

    pub fn is_barcode(&self) -> bool {
        self.kind == ColumnKind::Barcode
    }

    /// Format this column's cell for `record`.
    pub fn format(&self, record: &RecordView, currency: &str) -> CellValue {
        let text = |s: &str| CellValue::Text(s.to_string());
        match self.kind {
            ColumnKind::Blank => CellValue::Blank,
            ColumnKind::Category => CellValue::Lines(record.category.display_lines()),
            ColumnKind::Barcode => CellValue::Barcode(record.barcode.clone()),
            _ => match self.field {
                Field::Sku => text(&record.sku),
                Field::Name => CellValue::Text(capitalize_first(&record.name)),
                Field::Description => CellValue::Text(capitalize_first(&record.description)),
                Field::Location => CellValue::Text(capitalize_first(&record.location)),
                Field::Supplier => CellValue::Text(capitalize_first(&record.supplier)),
                Field::Notes => CellValue::Text(capitalize_first(&record.notes)),
                Field::Price => CellValue::Text(format_currency(record.price, currency)),
                Field::PurchasePrice => {
                    CellValue::Text(format_currency(record.purchase_price, currency))
                }
                Field::InventoryValue => {
                    CellValue::Text(format_currency(record.inventory_value(), currency))
                }
                Field::RetailValue => {
                    CellValue::Text(format_currency(record.retail_value(), currency))
                }
                Field::Stock => CellValue::Text(format_integer(record.stock)),
                Field::MinStock => match record.min_stock {
                    Some(min) => CellValue::Text(format_integer(min)),
                    None => text("-"),
                },
                Field::TaxRate => CellValue::Text(format_rate(record.tax_rate)),
                Field::Margin => CellValue::Text(format_percentage(record.margin_rate(), 1)),
                Field::UpdatedAt => match &record.updated_at {
                    Some(at) => CellValue::Text(format_date(at)),
                    None => text("-"),
                },
                Field::Barcode => CellValue::Barcode(record.barcode.clone()),
                Field::Category => CellValue::Lines(record.category.display_lines()),
                Field::None => CellValue::Blank,
            },
        }
    }
}

/// Build the ordered column set for a report: catalog columns in the order
/// the caller selected them, then the synthetic column if a title was given.
pub fn resolve_columns(selected: &[String], custom_title: Option<&str>) -> Result<Vec<ColumnSpec>> {
    let mut columns: Vec<ColumnSpec> = Vec::new();
    let keys: Vec<&str> = if selected.is_empty() {
        DEFAULT_COLUMNS.to_vec()
    } else {
        selected.iter().map(|s| s.trim()).collect()
    };

    for key in keys {
        if key == SYNTHETIC_KEY {
            return Err(ReportError::InvalidSpec(format!(
                "'{}' is reserved for the custom column; set customColumnTitle instead",
                SYNTHETIC_KEY
            )));
        }
        let spec = ColumnSpec::from_catalog(key)
            .ok_or_else(|| ReportError::UnknownColumn(key.to_string()))?;
        if columns.iter().any(|c| c.key == spec.key) {
            return Err(ReportError::InvalidSpec(format!("column '{}' selected twice", key)));
        }
        columns.push(spec);
    }

    if let Some(title) = custom_title.map(str::trim).filter(|t| !t.is_empty()) {
        columns.push(ColumnSpec::synthetic(title));
    }

    Ok(columns)
}

/// Spread `remaining` over items in proportion to their grow factors.
/// items: [(current_width, grow)]
fn distribute_grow(items: &mut [(f64, f64)], remaining: f64) {
    let total_grow: f64 = items.iter().map(|(_, g)| g).sum();
    if total_grow <= 0.0 || remaining <= 0.0 {
        return;
    }
    for (width, grow) in items.iter_mut() {
        *width += remaining * (*grow / total_grow);
    }
}

/// Absolute column widths, in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnWidths {
    entries: Vec<(String, f64)>,
}

impl ColumnWidths {
    pub fn get(&self, key: &str) -> Option<f64> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, w)| *w)
    }

    /// Width of the column at `index`.
    pub fn at(&self, index: usize) -> f64 {
        self.entries.get(index).map(|(_, w)| *w).unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(k, w)| (k.as_str(), *w))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w).sum()
    }

    /// Left edge of every column relative to the table's left edge.
    pub fn offsets(&self) -> Vec<f64> {
        let mut x = 0.0;
        self.entries
            .iter()
            .map(|(_, w)| {
                let left = x;
                x += w;
                left
            })
            .collect()
    }
}

/// `width(c) = usable_width * weight(c) / Σweight`. No minimum-width clamp.
/// The last column takes whatever rounding leaves over, so the widths always
/// sum to `usable_width`.
pub fn allocate(columns: &[ColumnSpec], usable_width: f64) -> Result<ColumnWidths> {
    if columns.is_empty() {
        return Err(ReportError::InvalidSpec("no columns to lay out".to_string()));
    }
    if !(usable_width.is_finite() && usable_width >= 0.0) {
        return Err(ReportError::InvalidSpec(format!(
            "usable width {} is not a valid page width",
            usable_width
        )));
    }
    let total_weight: f64 = columns.iter().map(|c| c.weight).sum();
    if !(total_weight.is_finite() && total_weight > 0.0) {
        return Err(ReportError::InvalidSpec("column weights sum to zero".to_string()));
    }

    let mut items: Vec<(f64, f64)> = columns.iter().map(|c| (0.0, c.weight)).collect();
    distribute_grow(&mut items, usable_width);
    if let Some(((last, _), rest)) = items.split_last_mut() {
        let taken: f64 = rest.iter().map(|(w, _)| w).sum();
        *last = (usable_width - taken).max(0.0);
    }

    Ok(ColumnWidths {
        entries: columns
            .iter()
            .zip(items)
            .map(|(c, (w, _))| (c.key.clone(), w))
            .collect(),
    })
}
