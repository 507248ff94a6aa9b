//! `shelfline-recon` — inventory reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded records, returns per-item match
//! verdicts. The only network dependency is the embedding backend, reached
//! through the [`semantic::Embedder`] trait and always optional.

pub mod canon;
pub mod catalog;
pub mod config;
pub mod error;
pub mod fixed;
pub mod loader;
pub mod matcher;
pub mod model;
pub mod report;
pub mod semantic;
pub mod source;
pub mod summary;

pub use canon::CanonIndex;
pub use catalog::CatalogIndex;
pub use config::ReconConfig;
pub use error::ReconError;
pub use matcher::match_inventory;
pub use model::{
    CatalogItem, InventoryRecord, MatchFlag, MatchOutcome, MatchResult, PurchaseRecord,
    SuggestionSource,
};
pub use semantic::{EmbedError, Embedder, SemanticIndex};
pub use summary::MatchSummary;
