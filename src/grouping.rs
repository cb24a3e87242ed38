//! # Grouping & Aggregation
//!
//! Partitions records into category groups and computes their rollups.
//! Nothing here knows about pages or drawing.
//!
//! Two granularities:
//!
//! - **Leaf groups** bucket records by resolved category name within their
//!   root and are sorted alphabetically.
//! - **Parent groups** bucket leaf groups by their top-level ancestor. A
//!   parent only gets a rollup row of its own when it holds more than one
//!   leaf group; a lone leaf stands for itself.
//!
//! Margin rates are always recomputed from summed totals, never averaged.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::RecordView;

/// Totals over a set of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregate {
    pub count: usize,
    pub total_stock: i64,
    pub inventory_value: f64,
    pub retail_value: f64,
    pub tax_collected: f64,
    pub margin_amount: f64,
    /// Percent of inventory value; 0 when the inventory value is 0.
    pub margin_rate: f64,
}

impl Aggregate {
    pub fn from_records<'r, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'r RecordView>,
    {
        let mut agg = Aggregate::default();
        for r in records {
            agg.count += 1;
            agg.total_stock += r.stock;
            agg.inventory_value += r.inventory_value();
            agg.retail_value += r.retail_value();
            agg.tax_collected += r.tax_collected();
        }
        agg.with_margin()
    }

    /// Sum several aggregates (a parent over its children, say).
    pub fn combine<'g, I>(parts: I) -> Self
    where
        I: IntoIterator<Item = &'g Aggregate>,
    {
        let mut agg = Aggregate::default();
        for p in parts {
            agg.count += p.count;
            agg.total_stock += p.total_stock;
            agg.inventory_value += p.inventory_value;
            agg.retail_value += p.retail_value;
            agg.tax_collected += p.tax_collected;
        }
        agg.with_margin()
    }

    fn with_margin(mut self) -> Self {
        self.margin_amount = self.retail_value - self.inventory_value;
        self.margin_rate = if self.inventory_value == 0.0 {
            0.0
        } else {
            self.margin_amount / self.inventory_value * 100.0
        };
        if !self.margin_rate.is_finite() {
            self.margin_rate = 0.0;
        }
        self
    }
}

/// Records sharing one leaf category.
#[derive(Debug, Clone)]
pub struct CategoryGroup<'r> {
    pub name: String,
    /// Top-level ancestor, when the category path names one other than the
    /// group itself.
    pub parent_name: Option<String>,
    pub records: Vec<&'r RecordView>,
    pub aggregate: Aggregate,
}

impl CategoryGroup<'_> {
    /// The bucket this group rolls up into.
    pub fn root(&self) -> &str {
        self.parent_name.as_deref().unwrap_or(&self.name)
    }
}

fn alphabetical(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

/// Bucket records by leaf category. A leaf is identified by its name together
/// with its root, so "Guitars > Accessories" and "Drums > Accessories" stay
/// apart. Groups come back sorted by name, then root; records keep their input
/// order inside each group.
pub fn group_by_leaf(records: &[RecordView]) -> Vec<CategoryGroup<'_>> {
    let mut buckets: Vec<CategoryGroup<'_>> = Vec::new();
    for record in records {
        let name = &record.category.name;
        let root = record.category.root_or_self();
        match buckets
            .iter_mut()
            .find(|g| &g.name == name && g.root() == root)
        {
            Some(group) => group.records.push(record),
            None => {
                buckets.push(CategoryGroup {
                    name: name.clone(),
                    parent_name: (root != name.as_str()).then(|| root.to_string()),
                    records: vec![record],
                    aggregate: Aggregate::default(),
                });
            }
        }
    }
    for group in &mut buckets {
        group.aggregate = Aggregate::from_records(group.records.iter().copied());
    }
    buckets.sort_by(|a, b| {
        alphabetical(&a.name, &b.name).then_with(|| alphabetical(a.root(), b.root()))
    });
    buckets
}

/// Leaf groups sharing one top-level ancestor.
#[derive(Debug, Clone)]
pub struct ParentGroup<'r> {
    pub name: String,
    pub children: Vec<CategoryGroup<'r>>,
    pub aggregate: Aggregate,
}

impl ParentGroup<'_> {
    /// Only parents with more than one child get a rollup row; a single
    /// child is rendered as itself.
    pub fn emits_parent_row(&self) -> bool {
        self.children.len() > 1
    }
}

/// Bucket leaf groups by their root. Parents come back sorted by name,
/// children keep their (alphabetical) order.
pub fn group_by_parent(leaves: Vec<CategoryGroup<'_>>) -> Vec<ParentGroup<'_>> {
    let mut parents: Vec<ParentGroup<'_>> = Vec::new();
    for leaf in leaves {
        let root = leaf.root().to_string();
        match parents.iter_mut().find(|p| p.name == root) {
            Some(parent) => parent.children.push(leaf),
            None => parents.push(ParentGroup {
                name: root,
                children: vec![leaf],
                aggregate: Aggregate::default(),
            }),
        }
    }
    for parent in &mut parents {
        parent.aggregate = Aggregate::combine(parent.children.iter().map(|c| &c.aggregate));
    }
    parents.sort_by(|a, b| alphabetical(&a.name, &b.name));
    parents
}

/// Totals over every record.
pub fn grand_total(records: &[RecordView]) -> Aggregate {
    Aggregate::from_records(records)
}

/// Records sharing one tax rate.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxBucket {
    pub rate: f64,
    pub aggregate: Aggregate,
}

/// One bucket per distinct tax rate, ascending.
pub fn tax_breakdown(records: &[RecordView]) -> Vec<TaxBucket> {
    // rates compared at 1/10000 of a percent
    let mut buckets: BTreeMap<i64, Vec<&RecordView>> = BTreeMap::new();
    for r in records {
        let key = (r.tax_rate * 10_000.0).round() as i64;
        buckets.entry(key).or_default().push(r);
    }
    buckets
        .into_iter()
        .map(|(key, rs)| TaxBucket {
            rate: key as f64 / 10_000.0,
            aggregate: Aggregate::from_records(rs),
        })
        .collect()
}

/// Headline numbers for the summary report.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryMetrics {
    pub totals: Aggregate,
    pub out_of_stock: usize,
    pub low_stock: usize,
    pub categories: usize,
}

impl InventoryMetrics {
    pub fn compute(records: &[RecordView]) -> Self {
        let mut categories: Vec<(&str, &str)> = records
            .iter()
            .map(|r| (r.category.root_or_self(), r.category.name.as_str()))
            .collect();
        categories.sort_unstable();
        categories.dedup();
        Self {
            totals: grand_total(records),
            out_of_stock: records.iter().filter(|r| r.is_out_of_stock()).count(),
            low_stock: records.iter().filter(|r| r.is_low_stock()).count(),
            categories: categories.len(),
        }
    }
}

/// Record ordering for detailed reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    #[default]
    Name,
    Sku,
    Category,
    Price,
    PurchasePrice,
    Stock,
    InventoryValue,
    RetailValue,
    UpdatedAt,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Sort in place. Ties break on sku, then id, both ascending, so the order
/// is total and two runs always agree.
pub fn sort_records(records: &mut [RecordView], by: SortBy, order: SortOrder) {
    records.sort_by(|a, b| {
        let primary = match by {
            SortBy::Name => alphabetical(&a.name, &b.name),
            SortBy::Sku => a.sku.cmp(&b.sku),
            SortBy::Category => alphabetical(&a.category.name, &b.category.name),
            SortBy::Price => a.price.total_cmp(&b.price),
            SortBy::PurchasePrice => a.purchase_price.total_cmp(&b.purchase_price),
            SortBy::Stock => a.stock.cmp(&b.stock),
            SortBy::InventoryValue => a.inventory_value().total_cmp(&b.inventory_value()),
            SortBy::RetailValue => a.retail_value().total_cmp(&b.retail_value()),
            SortBy::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        };
        let primary = match order {
            SortOrder::Asc => primary,
            SortOrder::Desc => primary.reverse(),
        };
        primary.then_with(|| a.sku.cmp(&b.sku)).then_with(|| a.id.cmp(&b.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CategoryRef, InventoryItem};

    fn item(id: &str, path: &str, stock: i64, purchase: f64, price: f64, tax: f64) -> RecordView {
        RecordView::from(&InventoryItem {
            id: id.into(),
            sku: format!("SKU-{id}"),
            name: format!("Item {id}"),
            stock,
            purchase_price: purchase,
            price,
            tax_rate: tax,
            category: Some(CategoryRef {
                path: Some(path.into()),
                ..Default::default()
            }),
            ..Default::default()
        })
    }

    fn sample() -> Vec<RecordView> {
        vec![
            item("1", "Guitars/Electric", 2, 400.0, 699.0, 19.0),
            item("2", "Strings", 50, 3.0, 7.5, 7.0),
            item("3", "Guitars/Acoustic", 1, 250.0, 449.0, 19.0),
            item("4", "Guitars/Electric", 0, 800.0, 1299.0, 19.0),
            item("5", "Strings", 10, 0.0, 5.0, 0.0),
        ]
    }

    #[test]
    fn leaf_groups_are_alphabetical() {
        let records = sample();
        let groups = group_by_leaf(&records);
        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Guitars/Acoustic", "Guitars/Electric", "Strings"]);
        assert_eq!(groups[1].records.len(), 2);
        assert_eq!(groups[1].parent_name.as_deref(), Some("Guitars"));
        assert_eq!(groups[2].parent_name, None);
    }

    #[test]
    fn group_totals_add_up_to_grand_total() {
        let records = sample();
        let groups = group_by_leaf(&records);
        let total = grand_total(&records);
        let sum = |f: fn(&Aggregate) -> f64| groups.iter().map(|g| f(&g.aggregate)).sum::<f64>();
        assert!((sum(|a| a.inventory_value) - total.inventory_value).abs() < 1e-6);
        assert!((sum(|a| a.retail_value) - total.retail_value).abs() < 1e-6);
        assert!((sum(|a| a.tax_collected) - total.tax_collected).abs() < 1e-6);
        assert_eq!(groups.iter().map(|g| g.aggregate.total_stock).sum::<i64>(), total.total_stock);
        assert_eq!(total.count, 5);
    }

    #[test]
    fn margin_is_recomputed_from_totals() {
        let records = sample();
        let total = grand_total(&records);
        let expected = (total.retail_value - total.inventory_value) / total.inventory_value * 100.0;
        assert!((total.margin_rate - expected).abs() < 1e-9);
    }

    #[test]
    fn margin_rate_is_zero_without_inventory_value() {
        let records = vec![item("1", "Free", 3, 0.0, 10.0, 0.0)];
        let agg = grand_total(&records);
        assert_eq!(agg.margin_rate, 0.0);
        assert_eq!(agg.margin_amount, 30.0);
        assert_eq!(Aggregate::default().margin_rate, 0.0);
        assert_eq!(Aggregate::combine(&[] as &[Aggregate]).margin_rate, 0.0);
    }

    #[test]
    fn parents_with_several_children_emit_rows() {
        let records = sample();
        let parents = group_by_parent(group_by_leaf(&records));
        let names: Vec<&str> = parents.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Guitars", "Strings"]);
        assert!(parents[0].emits_parent_row());
        assert!(!parents[1].emits_parent_row());
        assert_eq!(parents[0].aggregate.count, 3);
        assert_eq!(parents[0].aggregate.total_stock, 3);
    }

    #[test]
    fn shared_leaf_names_stay_under_their_own_root() {
        let leaf = |id: &str, root: &str, name: &str, stock: i64| {
            RecordView::from(&InventoryItem {
                id: id.into(),
                sku: format!("SKU-{id}"),
                name: format!("Item {id}"),
                stock,
                purchase_price: 10.0,
                price: 20.0,
                category: Some(CategoryRef {
                    name: Some(name.into()),
                    path_segments: vec![root.into(), name.into()],
                    ..Default::default()
                }),
                ..Default::default()
            })
        };
        let records = vec![
            leaf("g1", "Guitars", "Accessories", 1),
            leaf("g2", "Guitars", "Acoustic", 1),
            leaf("d1", "Drums", "Accessories", 100),
            leaf("d2", "Drums", "Snares", 1),
        ];
        let mut reversed = records.clone();
        reversed.reverse();

        for input in [records, reversed] {
            let leaves = group_by_leaf(&input);
            let keys: Vec<(&str, &str)> =
                leaves.iter().map(|g| (g.name.as_str(), g.root())).collect();
            assert_eq!(
                keys,
                vec![
                    ("Accessories", "Drums"),
                    ("Accessories", "Guitars"),
                    ("Acoustic", "Guitars"),
                    ("Snares", "Drums"),
                ]
            );
            let parents = group_by_parent(leaves);
            let totals: Vec<(&str, i64, usize)> = parents
                .iter()
                .map(|p| (p.name.as_str(), p.aggregate.total_stock, p.children.len()))
                .collect();
            assert_eq!(totals, vec![("Drums", 101, 2), ("Guitars", 2, 2)]);
        }
    }

    #[test]
    fn tax_buckets_are_ascending() {
        let records = sample();
        let buckets = tax_breakdown(&records);
        let rates: Vec<f64> = buckets.iter().map(|b| b.rate).collect();
        assert_eq!(rates, vec![0.0, 7.0, 19.0]);
        assert_eq!(buckets[2].aggregate.count, 3);
        assert_eq!(buckets[0].aggregate.tax_collected, 0.0);
    }

    #[test]
    fn metrics_count_stock_states() {
        let mut records = sample();
        records[1].min_stock = Some(60);
        let m = InventoryMetrics::compute(&records);
        assert_eq!(m.out_of_stock, 1);
        assert_eq!(m.low_stock, 1);
        assert_eq!(m.categories, 3);
    }

    #[test]
    fn sorting_is_total() {
        let mut records = sample();
        sort_records(&mut records, SortBy::Category, SortOrder::Asc);
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "1", "4", "2", "5"]);

        sort_records(&mut records, SortBy::Stock, SortOrder::Desc);
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "5", "1", "3", "4"]);
    }
}
