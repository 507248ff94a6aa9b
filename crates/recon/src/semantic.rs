//! Optional vector index over catalog descriptions.
//!
//! Built once by a setup step through an [`Embedder`], then read-only;
//! queries take `&self` and are safe to run concurrently. Every failure mode
//! here degrades to the lexical fallback in [`crate::catalog`] — nothing in
//! this module is ever fatal to a reconciliation pass.

use std::fmt;

use crate::catalog::CatalogIndex;
use crate::model::CatalogItem;

/// Items are embedded in fixed-size groups to bound memory during a build.
const BUILD_BATCH: usize = 32;

// ---------------------------------------------------------------------------
// Embedder boundary
// ---------------------------------------------------------------------------

/// Error from an embedding backend.
#[derive(Debug)]
pub enum EmbedError {
    /// Backend unreachable, timed out, or returned a failure.
    Backend(String),
    /// Backend returned a vector of unexpected length.
    Dimension { expected: usize, got: usize },
}

impl fmt::Display for EmbedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backend(msg) => write!(f, "embedding backend error: {msg}"),
            Self::Dimension { expected, got } => {
                write!(f, "embedding dimension mismatch: expected {expected}, got {got}")
            }
        }
    }
}

impl std::error::Error for EmbedError {}

/// The engine's one wire-level dependency: free text in, fixed-length vector
/// out. Any provider with this shape is substitutable.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;

    /// Batched variant. Implementations must return one vector per input.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

// ---------------------------------------------------------------------------
// Index
// ---------------------------------------------------------------------------

/// A ranked semantic hit. `pct` is a similarity percentage in [0, 100].
#[derive(Debug, Clone)]
pub struct SemanticHit {
    pub pct: f64,
    pub item: CatalogItem,
}

struct Entry {
    /// Unit-normalized.
    vector: Vec<f32>,
    item: CatalogItem,
}

pub struct SemanticIndex {
    embedder: Box<dyn Embedder>,
    entries: Vec<Entry>,
    dim: Option<usize>,
    built: bool,
}

impl SemanticIndex {
    pub fn new(embedder: Box<dyn Embedder>) -> Self {
        Self {
            embedder,
            entries: Vec::new(),
            dim: None,
            built: false,
        }
    }

    /// True only once built and the backend produced at least one vector.
    /// Callers must check this and fall back to lexical search when false.
    pub fn is_ready(&self) -> bool {
        self.built && !self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embed every catalog item as `"{description} {vendor}"` and store the
    /// vectors. A populated index is not rebuilt unless `force`. Embedding
    /// failures are logged and skipped item by item; the build itself never
    /// fails — a fully unreachable backend just leaves the index not ready.
    pub fn build(&mut self, catalog: &CatalogIndex, force: bool) {
        if self.built && !self.entries.is_empty() && !force {
            return;
        }
        self.entries.clear();
        self.dim = None;

        for chunk in catalog.items().chunks(BUILD_BATCH) {
            let texts: Vec<String> = chunk.iter().map(|item| embed_text(item)).collect();
            match self.embedder.embed_batch(&texts) {
                Ok(vectors) => {
                    if vectors.len() != chunk.len() {
                        log::warn!(
                            "embedding batch returned {} vectors for {} items; skipping extras",
                            vectors.len(),
                            chunk.len()
                        );
                    }
                    for (item, vector) in chunk.iter().zip(vectors) {
                        self.push_entry(item, vector);
                    }
                }
                Err(e) => {
                    log::warn!("embedding batch failed ({e}); retrying items individually");
                    for item in chunk {
                        match self.embedder.embed(&embed_text(item)) {
                            Ok(vector) => self.push_entry(item, vector),
                            Err(e) => log::warn!("skipping catalog item {}: {e}", item.sku),
                        }
                    }
                }
            }
        }
        self.built = true;
    }

    fn push_entry(&mut self, item: &CatalogItem, vector: Vec<f32>) {
        match self.dim {
            None => self.dim = Some(vector.len()),
            Some(dim) if dim != vector.len() => {
                log::warn!(
                    "skipping catalog item {}: dimension {} != {}",
                    item.sku,
                    vector.len(),
                    dim
                );
                return;
            }
            Some(_) => {}
        }
        let Some(vector) = normalize(vector) else {
            log::warn!("skipping catalog item {}: zero vector", item.sku);
            return;
        };
        self.entries.push(Entry {
            vector,
            item: item.clone(),
        });
    }

    /// One embedding call for the query plus one pass over the stored
    /// vectors. Results at or above `min_pct` are ranked by descending
    /// percentage, ties keeping build order. Errors here mean "backend
    /// unavailable"; callers degrade to lexical search.
    pub fn find_similar(
        &self,
        description: &str,
        limit: usize,
        min_pct: f64,
    ) -> Result<Vec<SemanticHit>, EmbedError> {
        if !self.is_ready() {
            return Ok(Vec::new());
        }
        let raw = self.embedder.embed(description)?;
        if let Some(dim) = self.dim {
            if raw.len() != dim {
                return Err(EmbedError::Dimension {
                    expected: dim,
                    got: raw.len(),
                });
            }
        }
        let Some(query) = normalize(raw) else {
            return Ok(Vec::new());
        };

        let mut scored: Vec<(f64, usize)> = Vec::new();
        for (i, entry) in self.entries.iter().enumerate() {
            // Cosine distance on unit vectors, bounded [0, 2], mapped to a
            // percentage: 0 distance → 100, orthogonal → 50, opposite → 0.
            // Clamped: f32 rounding can push a self-match a hair past 100.
            let distance = 1.0 - f64::from(dot(&query, &entry.vector));
            let pct = (1.0 - distance / 2.0).clamp(0.0, 1.0) * 100.0;
            if pct >= min_pct {
                scored.push((pct, i));
            }
        }
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);

        Ok(scored
            .into_iter()
            .map(|(pct, i)| SemanticHit {
                pct,
                item: self.entries[i].item.clone(),
            })
            .collect())
    }
}

fn embed_text(item: &CatalogItem) -> String {
    format!("{} {}", item.description, item.vendor)
}

/// Scale to unit length. None for the zero vector.
fn normalize(vector: Vec<f32>) -> Option<Vec<f32>> {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        Some(vector.iter().map(|x| x / norm).collect())
    } else {
        None
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
