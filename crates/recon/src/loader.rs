//! Canonical-CSV decoding.
//!
//! These loaders cover the canonical record shape only. Vendor-specific
//! export formats (header auto-detection, currency column hunting, encoding
//! repair) are an upstream collaborator's job; by the time data reaches this
//! module it has the fixed headers below.

use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::fixed::parse_fixed2;
use crate::model::{CatalogItem, InventoryRecord, PurchaseRecord};

fn reader(data: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(data.as_bytes())
}

fn read_headers(file: &str, reader: &mut csv::Reader<&[u8]>) -> Result<Vec<String>, ReconError> {
    Ok(reader
        .headers()
        .map_err(|e| ReconError::Csv {
            file: file.into(),
            message: e.to_string(),
        })?
        .iter()
        .map(|h| h.trim().to_string())
        .collect())
}

/// Decode purchase-history rows. Headers: sku, vendor, price, description,
/// and optional brand/uom/pack. The raw vendor spelling is preserved; the
/// canonical key is resolved through the config alias table.
pub fn load_purchase_csv(
    file: &str,
    csv_data: &str,
    config: &ReconConfig,
) -> Result<Vec<PurchaseRecord>, ReconError> {
    let mut reader = reader(csv_data);
    let headers = read_headers(file, &mut reader)?;

    let idx = |name: &str| -> Result<usize, ReconError> {
        headers.iter().position(|h| h == name).ok_or_else(|| {
            ReconError::MissingColumn {
                file: file.into(),
                column: name.into(),
            }
        })
    };
    let opt = |name: &str| headers.iter().position(|h| h == name);

    let sku_idx = idx("sku")?;
    let vendor_idx = idx("vendor")?;
    let price_idx = idx("price")?;
    let desc_idx = idx("description")?;
    let brand_idx = opt("brand");
    let uom_idx = opt("uom");
    let pack_idx = opt("pack");

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ReconError::Csv {
            file: file.into(),
            message: e.to_string(),
        })?;

        let sku = record.get(sku_idx).unwrap_or("").trim().to_string();
        if sku.is_empty() {
            continue;
        }

        let vendor_raw = record.get(vendor_idx).unwrap_or("").trim().to_string();
        let vendor = config.normalize_vendor(&vendor_raw).map(str::to_string);

        let price_str = record.get(price_idx).unwrap_or("");
        let price_cents =
            parse_fixed2(price_str).ok_or_else(|| ReconError::FixedPointParse {
                file: file.into(),
                sku: sku.clone(),
                value: price_str.into(),
            })?;

        let optional = |i: Option<usize>| {
            i.and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        records.push(PurchaseRecord {
            sku,
            vendor,
            vendor_raw,
            price_cents,
            description: record.get(desc_idx).unwrap_or("").trim().to_string(),
            brand: optional(brand_idx),
            uom: optional(uom_idx),
            pack: optional(pack_idx),
        });
    }

    Ok(records)
}

/// Decode order-guide rows. Headers: sku, description, vendor, uom, price,
/// brand, category. The vendor column resolves through the alias table;
/// unknown vendors fall back to the lowercased raw spelling so per-vendor
/// keying stays deterministic.
pub fn load_catalog_csv(
    file: &str,
    csv_data: &str,
    config: &ReconConfig,
) -> Result<Vec<CatalogItem>, ReconError> {
    let mut reader = reader(csv_data);
    let headers = read_headers(file, &mut reader)?;

    let idx = |name: &str| -> Result<usize, ReconError> {
        headers.iter().position(|h| h == name).ok_or_else(|| {
            ReconError::MissingColumn {
                file: file.into(),
                column: name.into(),
            }
        })
    };

    let sku_idx = idx("sku")?;
    let desc_idx = idx("description")?;
    let vendor_idx = idx("vendor")?;
    let uom_idx = idx("uom")?;
    let price_idx = idx("price")?;
    let brand_idx = idx("brand")?;
    let category_idx = idx("category")?;

    let mut items = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ReconError::Csv {
            file: file.into(),
            message: e.to_string(),
        })?;

        let sku = record.get(sku_idx).unwrap_or("").trim().to_string();
        if sku.is_empty() {
            continue;
        }

        let vendor_raw = record.get(vendor_idx).unwrap_or("").trim();
        let vendor = config
            .normalize_vendor(vendor_raw)
            .map(str::to_string)
            .unwrap_or_else(|| vendor_raw.to_lowercase());

        let price_str = record.get(price_idx).unwrap_or("");
        let price_cents =
            parse_fixed2(price_str).ok_or_else(|| ReconError::FixedPointParse {
                file: file.into(),
                sku: sku.clone(),
                value: price_str.into(),
            })?;

        items.push(CatalogItem {
            sku,
            description: record.get(desc_idx).unwrap_or("").trim().to_string(),
            vendor,
            uom: record.get(uom_idx).unwrap_or("").trim().to_string(),
            price_cents,
            brand: record.get(brand_idx).unwrap_or("").trim().to_string(),
            category: record.get(category_idx).unwrap_or("").trim().to_string(),
        });
    }

    Ok(items)
}

/// Decode inventory rows. Headers: sku, unit, description, quantity, and
/// optional vendor/price (blank cells mean absent).
pub fn load_inventory_csv(file: &str, csv_data: &str) -> Result<Vec<InventoryRecord>, ReconError> {
    let mut reader = reader(csv_data);
    let headers = read_headers(file, &mut reader)?;

    let idx = |name: &str| -> Result<usize, ReconError> {
        headers.iter().position(|h| h == name).ok_or_else(|| {
            ReconError::MissingColumn {
                file: file.into(),
                column: name.into(),
            }
        })
    };
    let opt = |name: &str| headers.iter().position(|h| h == name);

    let sku_idx = idx("sku")?;
    let unit_idx = idx("unit")?;
    let desc_idx = idx("description")?;
    let qty_idx = idx("quantity")?;
    let vendor_idx = opt("vendor");
    let price_idx = opt("price");

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ReconError::Csv {
            file: file.into(),
            message: e.to_string(),
        })?;

        let sku = record.get(sku_idx).unwrap_or("").trim().to_string();
        if sku.is_empty() {
            continue;
        }

        let qty_str = record.get(qty_idx).unwrap_or("");
        let qty_hundredths =
            parse_fixed2(qty_str).ok_or_else(|| ReconError::FixedPointParse {
                file: file.into(),
                sku: sku.clone(),
                value: qty_str.into(),
            })?;

        let vendor = vendor_idx
            .and_then(|i| record.get(i))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        let price_cents = match price_idx.and_then(|i| record.get(i)).map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_fixed2(raw).ok_or_else(|| ReconError::FixedPointParse {
                file: file.into(),
                sku: sku.clone(),
                value: raw.into(),
            })?),
        };

        records.push(InventoryRecord {
            sku,
            unit: record.get(unit_idx).unwrap_or("").trim().to_string(),
            description: record.get(desc_idx).unwrap_or("").trim().to_string(),
            qty_hundredths,
            vendor,
            price_cents,
        });
    }

    Ok(records)
}
