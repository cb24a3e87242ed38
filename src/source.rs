//! Record lookup at the storage boundary.

use std::collections::HashMap;

use tracing::debug;

use crate::error::Result;
use crate::model::{InventoryItem, RecordView};

/// Anything that can look up inventory records by id.
pub trait RecordSource {
    /// Look up one record. `None` means "no such id".
    fn find(&self, id: &str) -> Option<InventoryItem>;
}

/// Fetch and project records in the order the ids were given. Ids that do
/// not resolve are skipped.
pub fn fetch_records_by_ids<S: RecordSource + ?Sized>(source: &S, ids: &[String]) -> Vec<RecordView> {
    let mut records = Vec::with_capacity(ids.len());
    for id in ids {
        match source.find(id) {
            Some(item) => records.push(RecordView::from(&item)),
            None => debug!(id = %id, "record not found, skipping"),
        }
    }
    records
}

/// An in-memory inventory, typically loaded from a JSON export.
#[derive(Debug, Default)]
pub struct InMemoryRecords {
    order: Vec<String>,
    items: HashMap<String, InventoryItem>,
}

impl InMemoryRecords {
    pub fn new(items: Vec<InventoryItem>) -> Self {
        let mut order = Vec::with_capacity(items.len());
        let mut map = HashMap::with_capacity(items.len());
        for item in items {
            if !map.contains_key(&item.id) {
                order.push(item.id.clone());
            }
            map.insert(item.id.clone(), item);
        }
        Self { order, items: map }
    }

    /// Parse a JSON array of inventory items.
    pub fn from_json(json: &str) -> Result<Self> {
        let items: Vec<InventoryItem> = serde_json::from_str(json)?;
        Ok(Self::new(items))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Every record, in load order.
    pub fn all(&self) -> Vec<RecordView> {
        fetch_records_by_ids(self, &self.order)
    }
}

impl RecordSource for InMemoryRecords {
    fn find(&self, id: &str) -> Option<InventoryItem> {
        self.items.get(id).cloned()
    }
}
