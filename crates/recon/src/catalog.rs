use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::model::CatalogItem;

/// A scored hit from [`CatalogIndex::find_by_description`]. `score` is
/// Jaccard word overlap in [0, 1].
#[derive(Debug, Clone)]
pub struct LexicalHit {
    pub score: f64,
    pub item: CatalogItem,
}

/// Master-order-guide index: sku lookup plus coarse lexical search over item
/// descriptions. Build once per run, then read-only.
#[derive(Debug, Default)]
pub struct CatalogIndex {
    /// Insertion order; ties in similarity keep this order.
    items: Vec<CatalogItem>,
    /// Normalized description word set, parallel to `items`.
    desc_words: Vec<Vec<String>>,
    by_sku: HashMap<String, usize>,
    by_vendor: BTreeMap<String, BTreeSet<String>>,
}

impl CatalogIndex {
    /// Build in one pass, O(n). Duplicate skus resolve last-write-wins for
    /// sku lookup; every entry still participates in lexical search.
    pub fn build(items: Vec<CatalogItem>) -> Self {
        let mut index = Self::default();
        for item in items {
            index
                .by_vendor
                .entry(item.vendor.clone())
                .or_default()
                .insert(item.sku.clone());
            index.by_sku.insert(item.sku.clone(), index.items.len());
            index.desc_words.push(normalize_words(&item.description));
            index.items.push(item);
        }
        index
    }

    pub fn lookup(&self, sku: &str) -> Option<&CatalogItem> {
        self.by_sku.get(sku).map(|&i| &self.items[i])
    }

    pub fn vendor_skus(&self, vendor: &str) -> Option<&BTreeSet<String>> {
        self.by_vendor.get(vendor)
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Word-overlap search over catalog descriptions. Runs inline with no
    /// network call — the mandatory fallback whenever no semantic index is
    /// ready. Zero-overlap items are excluded; results sort by descending
    /// score with ties broken by insertion order.
    pub fn find_by_description(&self, query: &str, limit: usize) -> Vec<LexicalHit> {
        let query_words = normalize_words(query);
        if query_words.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(f64, usize)> = Vec::new();
        for (i, words) in self.desc_words.iter().enumerate() {
            let score = jaccard(&query_words, words);
            if score > 0.0 {
                scored.push((score, i));
            }
        }
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);

        scored
            .into_iter()
            .map(|(score, i)| LexicalHit {
                score,
                item: self.items[i].clone(),
            })
            .collect()
    }
}

/// Lowercase, strip punctuation, collapse whitespace, split on whitespace.
/// Returns a sorted, deduplicated word set.
pub fn normalize_words(text: &str) -> Vec<String> {
    let folded: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    let mut words: Vec<String> = folded.split_whitespace().map(str::to_string).collect();
    words.sort();
    words.dedup();
    words
}

/// Jaccard similarity of two sorted, deduplicated word sets. Identical
/// non-empty sets score 1.0; disjoint sets score 0.0.
pub fn jaccard(a: &[String], b: &[String]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let mut intersection = 0usize;
    let (mut i, mut j) = (0usize, 0usize);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Equal => {
                intersection += 1;
                i += 1;
                j += 1;
            }
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
        }
    }
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}
