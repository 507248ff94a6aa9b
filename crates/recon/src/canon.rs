use std::collections::HashMap;

use crate::model::PurchaseRecord;

/// Purchase-history index: ground truth for "was this actually bought".
#[derive(Debug, Default)]
pub struct CanonIndex {
    by_sku: HashMap<String, PurchaseRecord>,
    by_vendor_price: HashMap<(String, i64), Vec<PurchaseRecord>>,
}

impl CanonIndex {
    /// Build in one pass. Duplicate skus resolve last-write-wins: the most
    /// recently loaded record survives, exactly, including across
    /// concatenated source batches.
    pub fn build(records: Vec<PurchaseRecord>) -> Self {
        let mut index = Self::default();
        for record in records {
            if let Some(vendor) = &record.vendor {
                index
                    .by_vendor_price
                    .entry((vendor.clone(), record.price_cents))
                    .or_default()
                    .push(record.clone());
            }
            index.by_sku.insert(record.sku.clone(), record);
        }
        index
    }

    pub fn lookup(&self, sku: &str) -> Option<&PurchaseRecord> {
        self.by_sku.get(sku)
    }

    /// Secondary lookup. The match cascade does not consult this; it backs a
    /// possible price-corroboration step that is still an open product
    /// decision (see DESIGN.md).
    pub fn find_by_vendor_price(&self, vendor: &str, price_cents: i64) -> &[PurchaseRecord] {
        self.by_vendor_price
            .get(&(vendor.to_string(), price_cents))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Distinct skus retained.
    pub fn len(&self) -> usize {
        self.by_sku.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_sku.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn purchase(sku: &str, vendor: Option<&str>, price_cents: i64, desc: &str) -> PurchaseRecord {
        PurchaseRecord {
            sku: sku.into(),
            vendor: vendor.map(Into::into),
            vendor_raw: vendor.unwrap_or("UNKNOWN CO").to_uppercase(),
            price_cents,
            description: desc.into(),
            brand: None,
            uom: None,
            pack: None,
        }
    }

    #[test]
    fn lookup_by_sku() {
        let index = CanonIndex::build(vec![
            purchase("12345", Some("sysco"), 4782, "TOMATO DICED #10"),
            purchase("22222", Some("usfoods"), 1250, "FLOUR AP 50LB"),
        ]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.lookup("12345").unwrap().price_cents, 4782);
        assert!(index.lookup("99999").is_none());
    }

    #[test]
    fn duplicate_sku_last_wins() {
        let index = CanonIndex::build(vec![
            purchase("12345", Some("sysco"), 100, "OLD PRICE"),
            purchase("12345", Some("sysco"), 200, "NEW PRICE"),
        ]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.lookup("12345").unwrap().description, "NEW PRICE");
    }

    #[test]
    fn last_wins_across_concatenated_batches() {
        let mut records = vec![purchase("12345", Some("sysco"), 100, "BATCH ONE")];
        records.extend(vec![purchase("12345", Some("sysco"), 200, "BATCH TWO")]);
        let index = CanonIndex::build(records);
        assert_eq!(index.lookup("12345").unwrap().description, "BATCH TWO");
    }

    #[test]
    fn vendor_price_keeps_every_record() {
        let index = CanonIndex::build(vec![
            purchase("11111", Some("sysco"), 4782, "TOMATO DICED #10"),
            purchase("22222", Some("sysco"), 4782, "TOMATO CRUSHED #10"),
            purchase("33333", None, 4782, "MYSTERY ITEM"),
        ]);
        let hits = index.find_by_vendor_price("sysco", 4782);
        assert_eq!(hits.len(), 2);
        // Records without a canonical vendor are not keyed.
        assert!(index.find_by_vendor_price("UNKNOWN CO", 4782).is_empty());
        assert!(index.find_by_vendor_price("sysco", 1).is_empty());
    }
}
