use serde::Serialize;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One confirmed purchase from the canon (invoice history).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseRecord {
    pub sku: String,
    /// Canonical vendor key, if the raw spelling resolved through the alias table.
    pub vendor: Option<String>,
    /// Vendor name exactly as it appeared in the source export.
    pub vendor_raw: String,
    pub price_cents: i64,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pack: Option<String>,
}

/// One on-hand inventory line for a unit. Fresh per reconciliation pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryRecord {
    pub sku: String,
    pub unit: String,
    pub description: String,
    pub qty_hundredths: i64,
    /// What the count sheet says; may disagree with the canon.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_cents: Option<i64>,
}

/// One orderable item from a vendor's master order guide. Effectively unique
/// per (vendor, sku); the same sku under two vendors is two entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogItem {
    pub sku: String,
    pub description: String,
    pub vendor: String,
    pub uom: String,
    pub price_cents: i64,
    pub brand: String,
    pub category: String,
}

// ---------------------------------------------------------------------------
// Match verdicts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchFlag {
    Clean,
    Orderable,
    LikelyTypo,
    Unknown,
    Ignored,
}

impl std::fmt::Display for MatchFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Clean => write!(f, "clean"),
            Self::Orderable => write!(f, "orderable"),
            Self::LikelyTypo => write!(f, "likely_typo"),
            Self::Unknown => write!(f, "unknown"),
            Self::Ignored => write!(f, "ignored"),
        }
    }
}

/// Which similarity engine produced a typo suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionSource {
    Semantic,
    Lexical,
}

/// Outcome of matching one inventory line. Each variant carries only the
/// payload valid for its flag, so flag/payload consistency holds by type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "flag", rename_all = "snake_case")]
pub enum MatchOutcome {
    /// Sku has a confirmed purchase in the canon.
    Clean { canon: PurchaseRecord },
    /// Sku is orderable from a vendor catalog but was never purchased.
    Orderable { catalog: CatalogItem },
    /// Sku unknown, but the description closely matches a catalog item.
    /// `similarity` is in [0, 1] for both suggestion engines.
    LikelyTypo {
        suggestion: CatalogItem,
        similarity: f64,
        source: SuggestionSource,
    },
    /// No sku or description match anywhere. A valid outcome, not a failure.
    Unknown,
    /// Sku is on the site's ignore list.
    Ignored,
}

impl MatchOutcome {
    pub fn flag(&self) -> MatchFlag {
        match self {
            Self::Clean { .. } => MatchFlag::Clean,
            Self::Orderable { .. } => MatchFlag::Orderable,
            Self::LikelyTypo { .. } => MatchFlag::LikelyTypo,
            Self::Unknown => MatchFlag::Unknown,
            Self::Ignored => MatchFlag::Ignored,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub item: InventoryRecord,
    pub reason: String,
    pub outcome: MatchOutcome,
}

impl MatchResult {
    pub fn flag(&self) -> MatchFlag {
        self.outcome.flag()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inv(sku: &str) -> InventoryRecord {
        InventoryRecord {
            sku: sku.into(),
            unit: "main-kitchen".into(),
            description: "TOMATO DICED #10".into(),
            qty_hundredths: 250,
            vendor: None,
            price_cents: None,
        }
    }

    #[test]
    fn flag_follows_variant() {
        let result = MatchResult {
            item: inv("12345"),
            reason: "confirmed purchase".into(),
            outcome: MatchOutcome::Clean {
                canon: PurchaseRecord {
                    sku: "12345".into(),
                    vendor: Some("sysco".into()),
                    vendor_raw: "SYSCO FOODS".into(),
                    price_cents: 4782,
                    description: "TOMATO DICED #10".into(),
                    brand: None,
                    uom: None,
                    pack: None,
                },
            },
        };
        assert_eq!(result.flag(), MatchFlag::Clean);
        assert_eq!(MatchOutcome::Unknown.flag(), MatchFlag::Unknown);
        assert_eq!(MatchOutcome::Ignored.flag(), MatchFlag::Ignored);
    }

    #[test]
    fn flag_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&MatchFlag::LikelyTypo).unwrap(),
            "\"likely_typo\""
        );
        assert_eq!(MatchFlag::LikelyTypo.to_string(), "likely_typo");
    }

    #[test]
    fn outcome_tags_with_flag() {
        let json = serde_json::to_value(MatchOutcome::Unknown).unwrap();
        assert_eq!(json["flag"], "unknown");
    }
}
