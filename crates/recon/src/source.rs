use std::collections::BTreeMap;

use crate::error::ReconError;
use crate::loader::load_inventory_csv;
use crate::model::InventoryRecord;

/// Where a reconciliation pass gets its inventory lines. One capability
/// contract with swappable implementations; none hold shared mutable state.
pub trait InventorySource {
    /// Unit names, sorted. Empty if the site has none.
    fn units(&self) -> Result<Vec<String>, ReconError>;

    /// All inventory lines for one unit. Empty for an unknown unit.
    fn inventory_for_unit(&self, unit: &str) -> Result<Vec<InventoryRecord>, ReconError>;
}

/// Pre-grouped records, for tests and embedding callers.
#[derive(Debug, Default)]
pub struct InMemorySource {
    by_unit: BTreeMap<String, Vec<InventoryRecord>>,
}

impl InMemorySource {
    pub fn new(records: Vec<InventoryRecord>) -> Self {
        let mut by_unit: BTreeMap<String, Vec<InventoryRecord>> = BTreeMap::new();
        for record in records {
            by_unit.entry(record.unit.clone()).or_default().push(record);
        }
        Self { by_unit }
    }
}

impl InventorySource for InMemorySource {
    fn units(&self) -> Result<Vec<String>, ReconError> {
        Ok(self.by_unit.keys().cloned().collect())
    }

    fn inventory_for_unit(&self, unit: &str) -> Result<Vec<InventoryRecord>, ReconError> {
        Ok(self.by_unit.get(unit).cloned().unwrap_or_default())
    }
}

/// Inventory lines decoded from one canonical CSV export.
#[derive(Debug)]
pub struct CsvSource {
    inner: InMemorySource,
}

impl CsvSource {
    pub fn from_csv(file: &str, csv_data: &str) -> Result<Self, ReconError> {
        Ok(Self {
            inner: InMemorySource::new(load_inventory_csv(file, csv_data)?),
        })
    }
}

impl InventorySource for CsvSource {
    fn units(&self) -> Result<Vec<String>, ReconError> {
        self.inner.units()
    }

    fn inventory_for_unit(&self, unit: &str) -> Result<Vec<InventoryRecord>, ReconError> {
        self.inner.inventory_for_unit(unit)
    }
}
