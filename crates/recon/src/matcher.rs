//! Per-item match decision cascade.
//!
//! First match wins; later steps are never re-evaluated. "No match found" is
//! a first-class outcome, not an error — a well-formed inventory line can
//! never make this module fail.

use std::collections::HashSet;

use crate::canon::CanonIndex;
use crate::catalog::CatalogIndex;
use crate::config::ReconConfig;
use crate::model::{InventoryRecord, MatchOutcome, MatchResult, SuggestionSource};
use crate::semantic::SemanticIndex;

/// Match every inventory line. Order-preserving and pure: inputs are never
/// mutated, and identical inputs produce identical results. The semantic
/// index is an explicit parameter, never ambient state.
pub fn match_inventory(
    items: &[InventoryRecord],
    canon: &CanonIndex,
    config: &ReconConfig,
    catalog: Option<&CatalogIndex>,
    semantic: Option<&SemanticIndex>,
    ignored: &HashSet<String>,
) -> Vec<MatchResult> {
    items
        .iter()
        .map(|item| match_one(item, canon, config, catalog, semantic, ignored))
        .collect()
}

fn match_one(
    item: &InventoryRecord,
    canon: &CanonIndex,
    config: &ReconConfig,
    catalog: Option<&CatalogIndex>,
    semantic: Option<&SemanticIndex>,
    ignored: &HashSet<String>,
) -> MatchResult {
    // 1. Ignore list, before anything else.
    if ignored.contains(&item.sku) {
        return result(item, "on ignore list", MatchOutcome::Ignored);
    }

    // 2. Confirmed purchase. No vendor cross-check here; the count sheet's
    //    vendor column is advisory.
    if let Some(record) = canon.lookup(&item.sku) {
        return result(
            item,
            "confirmed purchase",
            MatchOutcome::Clean {
                canon: record.clone(),
            },
        );
    }

    // 3. Orderable but never purchased.
    if let Some(catalog_index) = catalog {
        if let Some(entry) = catalog_index.lookup(&item.sku) {
            let reason = format!("in {} order guide, no purchase on record", entry.vendor);
            return result(
                item,
                &reason,
                MatchOutcome::Orderable {
                    catalog: entry.clone(),
                },
            );
        }
    }

    // 4/5. Sku unknown everywhere: fuzzy-search catalog descriptions.
    if !item.description.trim().is_empty() {
        if let Some(semantic_index) = semantic {
            if semantic_index.is_ready() {
                match semantic_index.find_similar(
                    &item.description,
                    1,
                    config.thresholds.semantic_min_pct,
                ) {
                    Ok(hits) => {
                        if let Some(best) = hits.into_iter().next() {
                            let reason = format!(
                                "description matches {} catalog item {}",
                                best.item.vendor, best.item.sku
                            );
                            return result(
                                item,
                                &reason,
                                MatchOutcome::LikelyTypo {
                                    suggestion: best.item,
                                    similarity: best.pct / 100.0,
                                    source: SuggestionSource::Semantic,
                                },
                            );
                        }
                    }
                    // Backend trouble mid-run degrades to lexical search.
                    Err(e) => log::warn!("semantic search unavailable for {}: {e}", item.sku),
                }
            }
        }

        if let Some(catalog_index) = catalog {
            if let Some(best) = catalog_index
                .find_by_description(&item.description, 1)
                .into_iter()
                .next()
            {
                if best.score >= config.thresholds.lexical_min_score {
                    let reason = format!(
                        "description matches {} catalog item {}",
                        best.item.vendor, best.item.sku
                    );
                    return result(
                        item,
                        &reason,
                        MatchOutcome::LikelyTypo {
                            suggestion: best.item,
                            similarity: best.score,
                            source: SuggestionSource::Lexical,
                        },
                    );
                }
            }
        }
    }

    // 6. A valid outcome: nothing anywhere explains this line.
    result(item, "not found in purchases or catalogs", MatchOutcome::Unknown)
}

fn result(item: &InventoryRecord, reason: &str, outcome: MatchOutcome) -> MatchResult {
    MatchResult {
        item: item.clone(),
        reason: reason.to_string(),
        outcome,
    }
}
