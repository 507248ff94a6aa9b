//! Embedding HTTP client.
//!
//! Blocking reqwest client (no Tokio runtime required). One request shape:
//! `{"model": …, "input": [texts…]}` → `{"embeddings": [[f32]]}`. Ollama's
//! `/api/embed` and compatible gateways all speak it.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use shelfline_recon::config::EmbeddingConfig;
use shelfline_recon::semantic::{EmbedError, Embedder};

/// Error type for embedding HTTP calls.
#[derive(Debug)]
pub enum EmbedHttpError {
    /// Network error (connect, timeout).
    Network(String),
    /// HTTP error with status code.
    Http(u16, String),
    /// JSON parsing error.
    Parse(String),
    /// Response shape mismatch (wrong vector count).
    Shape(String),
}

impl std::fmt::Display for EmbedHttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbedHttpError::Network(msg) => write!(f, "network error: {}", msg),
            EmbedHttpError::Http(code, msg) => write!(f, "HTTP {}: {}", code, msg),
            EmbedHttpError::Parse(msg) => write!(f, "parse error: {}", msg),
            EmbedHttpError::Shape(msg) => write!(f, "bad response shape: {}", msg),
        }
    }
}

impl std::error::Error for EmbedHttpError {}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Embedding API client (blocking).
#[derive(Clone)]
pub struct HttpEmbedder {
    http: reqwest::blocking::Client,
    endpoint: String,
    model: String,
}

impl HttpEmbedder {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("shelfline/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            endpoint: endpoint.into(),
            model: model.into(),
        }
    }

    pub fn from_config(config: &EmbeddingConfig) -> Self {
        Self::new(
            &config.endpoint,
            &config.model,
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn request(&self, input: &[String]) -> Result<Vec<Vec<f32>>, EmbedHttpError> {
        let resp = self
            .http
            .post(&self.endpoint)
            .json(&EmbedRequest {
                model: &self.model,
                input,
            })
            .send()
            .map_err(|e| EmbedHttpError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(EmbedHttpError::Http(status.as_u16(), truncate(&body)));
        }

        let parsed: EmbedResponse = resp
            .json()
            .map_err(|e| EmbedHttpError::Parse(e.to_string()))?;
        if parsed.embeddings.len() != input.len() {
            return Err(EmbedHttpError::Shape(format!(
                "{} inputs, {} vectors",
                input.len(),
                parsed.embeddings.len()
            )));
        }
        Ok(parsed.embeddings)
    }
}

/// Every HTTP failure folds into [`EmbedError::Backend`]: the engine treats
/// the backend as unavailable and degrades, it never distinguishes causes.
impl Embedder for HttpEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let mut vectors = self
            .request(&[text.to_string()])
            .map_err(|e| EmbedError::Backend(e.to_string()))?;
        vectors
            .pop()
            .ok_or_else(|| EmbedError::Backend("no vector returned".into()))
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request(texts)
            .map_err(|e| EmbedError::Backend(e.to_string()))
    }
}

fn truncate(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &body[..end])
    }
}
