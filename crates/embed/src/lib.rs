//! `shelfline-embed` — embedding service client.
//!
//! Blocking HTTP client for any backend that speaks the engine's one wire
//! shape: free text in, fixed-length vector out.

mod client;

pub use client::{EmbedHttpError, HttpEmbedder};
