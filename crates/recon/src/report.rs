//! Pure projection of match results into operator-facing shapes: grouped
//! console text, a flat CSV export, and a JSON-ready report envelope. No
//! matching logic lives here.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Serialize;

use crate::error::ReconError;
use crate::fixed::format_fixed2;
use crate::model::{MatchFlag, MatchOutcome, MatchResult};
use crate::summary::{compute_summary, MatchSummary};

#[derive(Debug, Clone, Serialize)]
pub struct ReportMeta {
    pub site: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub meta: ReportMeta,
    pub summary: MatchSummary,
    pub results: Vec<MatchResult>,
}

/// Wrap results with summary and run metadata.
pub fn build_report(site: &str, results: Vec<MatchResult>) -> AuditReport {
    AuditReport {
        meta: ReportMeta {
            site: site.to_string(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary: compute_summary(&results),
        results,
    }
}

/// Group results by unit, units in sorted order.
pub fn group_by_unit(results: &[MatchResult]) -> BTreeMap<String, Vec<MatchResult>> {
    let mut groups: BTreeMap<String, Vec<MatchResult>> = BTreeMap::new();
    for r in results {
        groups.entry(r.item.unit.clone()).or_default().push(r.clone());
    }
    groups
}

/// Most actionable first. Stable: within a flag, input order is preserved.
pub fn sort_for_report(results: &mut [MatchResult]) {
    results.sort_by_key(|r| report_rank(r.flag()));
}

fn report_rank(flag: MatchFlag) -> u8 {
    match flag {
        MatchFlag::LikelyTypo => 0,
        MatchFlag::Unknown => 1,
        MatchFlag::Orderable => 2,
        MatchFlag::Ignored => 3,
        MatchFlag::Clean => 4,
    }
}

/// Grouped, sorted console text with a trailing aggregate summary. Clean
/// rows are hidden unless `show_clean`; they still count in the summary.
pub fn format_console(results: &[MatchResult], show_clean: bool) -> String {
    let mut out = String::new();

    for (unit, mut group) in group_by_unit(results) {
        sort_for_report(&mut group);
        let visible: Vec<&MatchResult> = group
            .iter()
            .filter(|r| show_clean || r.flag() != MatchFlag::Clean)
            .collect();
        if visible.is_empty() {
            continue;
        }
        let _ = writeln!(out, "{unit}");
        for r in visible {
            let _ = writeln!(
                out,
                "  {:<11} {:<12} {}{}",
                r.flag().to_string(),
                r.item.sku,
                r.item.description,
                detail_suffix(r)
            );
        }
    }

    let s = compute_summary(results);
    let _ = writeln!(
        out,
        "{} items — {} clean, {} orderable, {} likely typos, {} unknown, {} ignored ({} actionable)",
        s.total, s.clean, s.orderable, s.likely_typo, s.unknown, s.ignored, s.actionable
    );
    out
}

fn detail_suffix(r: &MatchResult) -> String {
    match &r.outcome {
        MatchOutcome::Clean { canon } => {
            format!("  [{} @ {}]", canon.vendor_raw, format_fixed2(canon.price_cents))
        }
        MatchOutcome::Orderable { catalog } => {
            format!("  [{} @ {}]", catalog.vendor, format_fixed2(catalog.price_cents))
        }
        MatchOutcome::LikelyTypo {
            suggestion,
            similarity,
            ..
        } => format!(
            "  → {} {} ({}, {:.0}%)",
            suggestion.sku,
            suggestion.description,
            suggestion.vendor,
            similarity * 100.0
        ),
        MatchOutcome::Unknown | MatchOutcome::Ignored => String::new(),
    }
}

/// One row per result with both inventory-side and matched-side fields.
/// Clean rows are included unless `include_clean` is false.
pub fn export_flat(results: &[MatchResult], include_clean: bool) -> Result<String, ReconError> {
    let csv_err = |e: csv::Error| ReconError::Csv {
        file: "export".into(),
        message: e.to_string(),
    };

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record([
            "unit",
            "sku",
            "description",
            "quantity",
            "vendor",
            "price",
            "flag",
            "reason",
            "matched_sku",
            "matched_description",
            "matched_vendor",
            "matched_price",
            "similarity",
        ])
        .map_err(csv_err)?;

    for r in results {
        if !include_clean && r.flag() == MatchFlag::Clean {
            continue;
        }
        let item = &r.item;
        let (matched_sku, matched_desc, matched_vendor, matched_price, similarity) =
            match &r.outcome {
                MatchOutcome::Clean { canon } => (
                    canon.sku.clone(),
                    canon.description.clone(),
                    canon.vendor.clone().unwrap_or_else(|| canon.vendor_raw.clone()),
                    format_fixed2(canon.price_cents),
                    String::new(),
                ),
                MatchOutcome::Orderable { catalog } => (
                    catalog.sku.clone(),
                    catalog.description.clone(),
                    catalog.vendor.clone(),
                    format_fixed2(catalog.price_cents),
                    String::new(),
                ),
                MatchOutcome::LikelyTypo {
                    suggestion,
                    similarity,
                    ..
                } => (
                    suggestion.sku.clone(),
                    suggestion.description.clone(),
                    suggestion.vendor.clone(),
                    format_fixed2(suggestion.price_cents),
                    format!("{similarity:.4}"),
                ),
                MatchOutcome::Unknown | MatchOutcome::Ignored => (
                    String::new(),
                    String::new(),
                    String::new(),
                    String::new(),
                    String::new(),
                ),
            };

        let row: [String; 13] = [
            item.unit.clone(),
            item.sku.clone(),
            item.description.clone(),
            format_fixed2(item.qty_hundredths),
            item.vendor.clone().unwrap_or_default(),
            item.price_cents.map(format_fixed2).unwrap_or_default(),
            r.flag().to_string(),
            r.reason.clone(),
            matched_sku,
            matched_desc,
            matched_vendor,
            matched_price,
            similarity,
        ];
        writer.write_record(&row).map_err(csv_err)?;
    }

    let bytes = writer.into_inner().map_err(|e| ReconError::Csv {
        file: "export".into(),
        message: e.to_string(),
    })?;
    String::from_utf8(bytes).map_err(|e| ReconError::Csv {
        file: "export".into(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CatalogItem, InventoryRecord, PurchaseRecord};

    fn inv(sku: &str, unit: &str, desc: &str) -> InventoryRecord {
        InventoryRecord {
            sku: sku.into(),
            unit: unit.into(),
            description: desc.into(),
            qty_hundredths: 250,
            vendor: None,
            price_cents: None,
        }
    }

    fn clean(sku: &str, unit: &str) -> MatchResult {
        MatchResult {
            item: inv(sku, unit, "TOMATO DICED #10"),
            reason: "confirmed purchase".into(),
            outcome: MatchOutcome::Clean {
                canon: PurchaseRecord {
                    sku: sku.into(),
                    vendor: Some("sysco".into()),
                    vendor_raw: "SYSCO FOODS".into(),
                    price_cents: 4782,
                    description: "TOMATO DICED #10".into(),
                    brand: None,
                    uom: None,
                    pack: None,
                },
            },
        }
    }

    fn unknown(sku: &str, unit: &str) -> MatchResult {
        MatchResult {
            item: inv(sku, unit, "MYSTERY"),
            reason: "not found in purchases or catalogs".into(),
            outcome: MatchOutcome::Unknown,
        }
    }

    fn typo(sku: &str, unit: &str) -> MatchResult {
        MatchResult {
            item: inv(sku, unit, "TOMATOE DICED #10"),
            reason: "description matches sysco catalog item 999".into(),
            outcome: MatchOutcome::LikelyTypo {
                suggestion: CatalogItem {
                    sku: "999".into(),
                    description: "TOMATO DICED #10".into(),
                    vendor: "sysco".into(),
                    uom: "CS".into(),
                    price_cents: 4782,
                    brand: "PACKER".into(),
                    category: "CANNED".into(),
                },
                similarity: 0.5,
                source: crate::model::SuggestionSource::Lexical,
            },
        }
    }

    #[test]
    fn groups_by_unit_sorted() {
        let results = vec![unknown("1", "walk-in"), clean("2", "cafe"), unknown("3", "cafe")];
        let groups = group_by_unit(&results);
        let units: Vec<&String> = groups.keys().collect();
        assert_eq!(units, ["cafe", "walk-in"]);
        assert_eq!(groups["cafe"].len(), 2);
    }

    #[test]
    fn sorts_most_actionable_first() {
        let mut results = vec![clean("1", "cafe"), unknown("2", "cafe"), typo("3", "cafe")];
        sort_for_report(&mut results);
        assert_eq!(results[0].flag(), MatchFlag::LikelyTypo);
        assert_eq!(results[1].flag(), MatchFlag::Unknown);
        assert_eq!(results[2].flag(), MatchFlag::Clean);
    }

    #[test]
    fn console_hides_clean_but_counts_it() {
        let results = vec![clean("1", "cafe"), typo("3", "cafe")];
        let text = format_console(&results, false);
        assert!(!text.lines().any(|l| l.trim_start().starts_with("clean")));
        assert!(text.lines().any(|l| l.trim_start().starts_with("likely_typo")));
        assert!(text.contains("2 items — 1 clean"));
        assert!(text.contains("(1 actionable)"));

        let with_clean = format_console(&results, true);
        assert!(with_clean.lines().any(|l| l.trim_start().starts_with("clean")));
    }

    #[test]
    fn console_shows_suggestion_detail() {
        let text = format_console(&[typo("3", "cafe")], false);
        assert!(text.contains("→ 999"));
        assert!(text.contains("50%"));
    }

    #[test]
    fn export_has_one_row_per_result() {
        let results = vec![clean("1", "cafe"), typo("3", "cafe"), unknown("2", "cafe")];
        let csv_text = export_flat(&results, true).unwrap();
        let lines: Vec<&str> = csv_text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("unit,sku,description,quantity"));
        assert!(lines[1].contains("47.82"));
        assert!(lines[2].contains("0.5000"));

        let without_clean = export_flat(&results, false).unwrap();
        assert_eq!(without_clean.lines().count(), 3);
    }

    #[test]
    fn report_summary_matches_results() {
        let report = build_report("Harborview", vec![clean("1", "cafe"), unknown("2", "cafe")]);
        assert_eq!(report.meta.site, "Harborview");
        assert_eq!(report.summary.total, 2);
        assert_eq!(report.summary.actionable, 1);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["results"][1]["outcome"]["flag"], "unknown");
    }
}
