use serde::Serialize;

use crate::model::{MatchFlag, MatchResult};

/// Aggregate counts for one reconciliation pass. Always holds:
/// clean + orderable + likely_typo + unknown + ignored == total, and
/// actionable == likely_typo + unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchSummary {
    pub total: usize,
    pub clean: usize,
    pub orderable: usize,
    pub likely_typo: usize,
    pub unknown: usize,
    pub ignored: usize,
    /// The rows an auditor has to act on.
    pub actionable: usize,
}

pub fn compute_summary(results: &[MatchResult]) -> MatchSummary {
    let mut clean = 0;
    let mut orderable = 0;
    let mut likely_typo = 0;
    let mut unknown = 0;
    let mut ignored = 0;

    for r in results {
        match r.flag() {
            MatchFlag::Clean => clean += 1,
            MatchFlag::Orderable => orderable += 1,
            MatchFlag::LikelyTypo => likely_typo += 1,
            MatchFlag::Unknown => unknown += 1,
            MatchFlag::Ignored => ignored += 1,
        }
    }

    MatchSummary {
        total: results.len(),
        clean,
        orderable,
        likely_typo,
        unknown,
        ignored,
        actionable: likely_typo + unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InventoryRecord, MatchOutcome};

    fn result(sku: &str, outcome: MatchOutcome) -> MatchResult {
        MatchResult {
            item: InventoryRecord {
                sku: sku.into(),
                unit: "cafe".into(),
                description: String::new(),
                qty_hundredths: 100,
                vendor: None,
                price_cents: None,
            },
            reason: String::new(),
            outcome,
        }
    }

    #[test]
    fn counts_add_up() {
        let results = vec![
            result("1", MatchOutcome::Unknown),
            result("2", MatchOutcome::Unknown),
            result("3", MatchOutcome::Ignored),
        ];
        let summary = compute_summary(&results);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.unknown, 2);
        assert_eq!(summary.ignored, 1);
        assert_eq!(summary.actionable, 2);
        assert_eq!(
            summary.clean + summary.orderable + summary.likely_typo + summary.unknown + summary.ignored,
            summary.total
        );
    }

    #[test]
    fn empty_is_all_zero() {
        let summary = compute_summary(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.actionable, 0);
    }
}
