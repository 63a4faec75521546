//! Embeddings generation module
//!
//! Converts text into fixed-dimension vectors through one of two providers:
//! - Gemini (`text-embedding-004`, the deployment default)
//! - Ollama (local models)
//!
//! The service layer owns the failure policy: transient provider errors are
//! retried with exponential backoff, and exhaustion degrades to an all-zero
//! vector that callers must treat as "no signal" (skip at ingestion, accept
//! degraded ranking at query time).

pub mod client;
pub mod generator;

pub use client::EmbeddingClient;
pub use client::EmbeddingProvider;
pub use generator::EmbeddingService;

use async_trait::async_trait;

use crate::errors::Result;

/// Default embedding dimension for Gemini text-embedding-004
pub const DEFAULT_EMBEDDING_DIM: usize = 768;

/// Embedding capability consumed by retrieval and ingestion
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Convert text to a fixed-length vector
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// The vector dimension this embedder produces
    fn dimension(&self) -> usize;
}

/// Configuration for embedding generation
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub model: String,
    pub dimension: usize,
    pub endpoint: String,
    pub api_key: Option<String>,
}

impl EmbeddingConfig {
    /// Build from the application configuration
    ///
    /// # Errors
    /// Unknown provider names are configuration errors (the config
    /// validator catches them earlier in normal startup).
    pub fn from_app_config(config: &crate::config::AppConfig) -> Result<Self> {
        let provider = match config.embedding_provider() {
            "gemini" => EmbeddingProvider::Gemini,
            "ollama" => EmbeddingProvider::Ollama,
            other => {
                return Err(crate::CounselRagError::Config(format!(
                    "unknown embedding provider: {other}"
                )))
            }
        };

        Ok(Self {
            provider,
            model: config.embedding_model().to_string(),
            dimension: config.embedding_dimension(),
            endpoint: config.embedding_endpoint().to_string(),
            api_key: config.embedding_api_key().map(ToString::to_string),
        })
    }
}

/// Whether a vector is the degenerate all-zero "no signal" vector
#[must_use]
pub fn is_zero_vector(embedding: &[f32]) -> bool {
    embedding.iter().all(|v| *v == 0.0)
}

/// Normalize text before sending it to an embedding provider
///
/// Collapses whitespace runs (newlines confuse some providers) and strips
/// control characters.
#[must_use]
pub fn preprocess_text_for_embedding(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .filter(|c| !c.is_control())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_zero_vector() {
        assert!(is_zero_vector(&[0.0, 0.0, 0.0]));
        assert!(is_zero_vector(&[]));
        assert!(!is_zero_vector(&[0.0, 0.001, 0.0]));
    }

    #[test]
    fn test_preprocess_collapses_whitespace() {
        assert_eq!(
            preprocess_text_for_embedding("I can't\nsleep   at\tnight"),
            "I can't sleep at night"
        );
    }
}
