//! # Report Model
//!
//! The input representation for the report engine. Inventory records arrive
//! as [`InventoryItem`]s (whatever the storage layer hands us) and are
//! projected once into read-only [`RecordView`]s. Every later stage (column
//! formatting, row-height estimation, grouping) reads only the view.
//!
//! Page geometry lives here too: a report is laid out INTO pages of a known
//! size, so [`PageConfig`] is part of the model, not a rendering detail.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Label used for records that carry no usable category at all.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Separators accepted inside a category path string ("Guitars > Acoustic",
/// "Guitars/Acoustic").
const PATH_SEPARATORS: [char; 2] = ['>', '/'];

/// A reference to a category as stored on an inventory record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Full path as a display string, e.g. `"Guitars > Acoustic"`.
    #[serde(default)]
    pub path: Option<String>,
    /// The same path as individual segments, root first.
    #[serde(default)]
    pub path_segments: Vec<String>,
}

impl CategoryRef {
    fn name(&self) -> Option<&str> {
        non_empty(self.name.as_deref())
    }

    fn path(&self) -> Option<&str> {
        non_empty(self.path.as_deref())
    }

    /// Name of the top-level ancestor, if the path says anything about one.
    fn root_name(&self) -> Option<String> {
        if let Some(first) = self.path_segments.iter().find(|s| !s.trim().is_empty()) {
            return Some(first.trim().to_string());
        }
        let path = self.path()?;
        path.split(&PATH_SEPARATORS[..])
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(str::to_string)
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// An inventory record as the storage layer provides it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: String,
    #[serde(default)]
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Retail price, tax included.
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub purchase_price: f64,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub min_stock: Option<i64>,
    /// Tax rate in percent (19.0 means 19 %).
    #[serde(default)]
    pub tax_rate: f64,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub category: Option<CategoryRef>,
    #[serde(default)]
    pub additional_categories: Vec<CategoryRef>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

/// Category facts resolved once per record.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryInfo {
    /// Leaf group name: primary name, primary path, first alternate
    /// name/path, then [`UNCATEGORIZED`].
    pub name: String,
    /// Full path string when one is known.
    pub path: Option<String>,
    /// Top-level ancestor name when the path reveals one.
    pub root: Option<String>,
    /// How many alternate categories the record belongs to.
    pub other_count: usize,
}

impl CategoryInfo {
    fn resolve(primary: Option<&CategoryRef>, alternates: &[CategoryRef]) -> Self {
        let other_count = alternates.len();

        if let Some(cat) = primary {
            if let Some(name) = cat.name().or_else(|| cat.path()) {
                return CategoryInfo {
                    name: name.to_string(),
                    path: cat.path().map(str::to_string),
                    root: cat.root_name(),
                    other_count,
                };
            }
        }

        if let Some(alt) = alternates.first() {
            if let Some(name) = alt.name().or_else(|| alt.path()) {
                return CategoryInfo {
                    name: name.to_string(),
                    path: alt.path().map(str::to_string),
                    root: alt.root_name(),
                    // the alternate is now shown as the primary
                    other_count: other_count - 1,
                };
            }
        }

        CategoryInfo {
            name: UNCATEGORIZED.to_string(),
            path: None,
            root: None,
            other_count,
        }
    }

    /// The root bucket this category rolls up into: its top-level ancestor,
    /// or itself when it has none.
    pub fn root_or_self(&self) -> &str {
        self.root.as_deref().unwrap_or(&self.name)
    }

    /// Multi-line display text: name, then path when it adds information,
    /// then "+N others".
    pub fn display_lines(&self) -> Vec<String> {
        let mut lines = vec![self.name.clone()];
        if let Some(path) = &self.path {
            if path != &self.name {
                lines.push(path.clone());
            }
        }
        if self.other_count > 0 {
            let noun = if self.other_count == 1 { "other" } else { "others" };
            lines.push(format!("+{} {}", self.other_count, noun));
        }
        lines
    }
}

/// Read-only projection of one inventory record, exposing only what a
/// column can reference. Built by `From<&InventoryItem>`; never mutated.
#[derive(Debug, Clone)]
pub struct RecordView {
    pub id: String,
    pub sku: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub purchase_price: f64,
    pub stock: i64,
    pub min_stock: Option<i64>,
    pub tax_rate: f64,
    pub barcode: String,
    pub location: String,
    pub supplier: String,
    pub notes: String,
    pub category: CategoryInfo,
    pub updated_at: Option<NaiveDateTime>,
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

impl From<&InventoryItem> for RecordView {
    fn from(item: &InventoryItem) -> Self {
        let text = |s: &Option<String>| s.as_deref().map(str::trim).unwrap_or("").to_string();
        RecordView {
            id: item.id.clone(),
            sku: item.sku.trim().to_string(),
            name: item.name.trim().to_string(),
            description: text(&item.description),
            price: finite_or_zero(item.price),
            purchase_price: finite_or_zero(item.purchase_price),
            stock: item.stock,
            min_stock: item.min_stock,
            tax_rate: finite_or_zero(item.tax_rate),
            barcode: text(&item.barcode),
            location: text(&item.location),
            supplier: text(&item.supplier),
            notes: text(&item.notes),
            category: CategoryInfo::resolve(item.category.as_ref(), &item.additional_categories),
            updated_at: item.updated_at,
        }
    }
}

impl RecordView {
    /// `stock * purchase price`
    pub fn inventory_value(&self) -> f64 {
        self.stock as f64 * self.purchase_price
    }

    /// `stock * price`
    pub fn retail_value(&self) -> f64 {
        self.stock as f64 * self.price
    }

    /// Tax contained in the retail value (prices are tax-inclusive).
    pub fn tax_collected(&self) -> f64 {
        if self.tax_rate > 0.0 {
            self.retail_value() * self.tax_rate / (100.0 + self.tax_rate)
        } else {
            0.0
        }
    }

    /// Margin on purchase price in percent; 0 when the purchase price is 0.
    pub fn margin_rate(&self) -> f64 {
        if self.purchase_price == 0.0 {
            0.0
        } else {
            (self.price - self.purchase_price) / self.purchase_price * 100.0
        }
    }

    pub fn is_low_stock(&self) -> bool {
        matches!(self.min_stock, Some(min) if self.stock > 0 && self.stock <= min)
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.stock <= 0
    }
}

/// Document metadata embedded in the PDF.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    /// Rendered as the PDF `/CreationDate`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
}

/// Page orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Tabloid,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in points, portrait.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::A3 => (841.89, 1190.55),
            PageSize::A5 => (419.53, 595.28),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Tabloid => (792.0, 1224.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// Edge values (top, right, bottom, left) used for margins and padding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// Configuration for a page: size, orientation, margins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    pub size: PageSize,
    pub orientation: Orientation,
    pub margin: Edges,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            size: PageSize::A4,
            orientation: Orientation::Portrait,
            margin: Edges::uniform(36.0), // half an inch
        }
    }
}

impl PageConfig {
    /// (width, height) in points after applying the orientation.
    pub fn dimensions(&self) -> (f64, f64) {
        let (w, h) = self.size.dimensions();
        match self.orientation {
            Orientation::Portrait => (w.min(h), w.max(h)),
            Orientation::Landscape => (w.max(h), w.min(h)),
        }
    }
}
