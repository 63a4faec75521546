//! Embedding generation service with retry and zero-vector fallback

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use super::client::EmbeddingClient;
use super::Embedder;
use super::EmbeddingConfig;
use crate::errors::Result;
use crate::retry::RetryPolicy;

/// Service wrapping the provider client with the crate's failure policy
///
/// Transient provider errors are retried with exponential backoff; if all
/// attempts fail the service returns an all-zero vector instead of an
/// error. Callers treat that vector as "no signal": ingestion skips the
/// record, query-time retrieval proceeds with degraded ranking.
pub struct EmbeddingService {
    client: Arc<EmbeddingClient>,
    config: EmbeddingConfig,
    retry: RetryPolicy,
}

impl EmbeddingService {
    /// Create a new embedding service from the application config
    pub fn new(config: &crate::config::AppConfig) -> Result<Self> {
        Self::from_config(EmbeddingConfig::from_app_config(config)?)
    }

    /// Create from a custom embedding config
    pub fn from_config(config: EmbeddingConfig) -> Result<Self> {
        let client = EmbeddingClient::new(
            config.provider,
            config.model.clone(),
            config.endpoint.clone(),
            config.api_key.clone(),
        )?;

        Ok(Self {
            client: Arc::new(client),
            config,
            retry: RetryPolicy::embedding(),
        })
    }

    /// Generate an embedding, degrading to the zero vector on exhaustion
    ///
    /// Empty text short-circuits to the zero vector without a provider
    /// call.
    pub async fn generate(&self, text: &str) -> Vec<f32> {
        let processed = super::preprocess_text_for_embedding(text);
        if processed.is_empty() {
            return vec![0.0; self.config.dimension];
        }

        let client = Arc::clone(&self.client);
        let result = self
            .retry
            .run("embedding generation", || {
                let client = Arc::clone(&client);
                let text = processed.clone();
                async move { client.generate(&text).await }
            })
            .await;

        match result {
            Ok(embedding) => embedding,
            Err(e) => {
                warn!("Embedding generation degraded to zero vector: {e}");
                vec![0.0; self.config.dimension]
            }
        }
    }

    /// Get the embedding dimension
    #[must_use]
    pub const fn config_dimension(&self) -> usize {
        self.config.dimension
    }

    /// Get the model name
    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl Embedder for EmbeddingService {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.generate(text).await)
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::is_zero_vector;
    use crate::embeddings::EmbeddingProvider;

    fn unreachable_service() -> EmbeddingService {
        EmbeddingService::from_config(EmbeddingConfig {
            provider: EmbeddingProvider::Ollama,
            model: "nomic-embed-text".to_string(),
            dimension: 8,
            // Nothing listens here; every attempt fails fast
            endpoint: "http://127.0.0.1:1".to_string(),
            api_key: None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_empty_text_short_circuits_to_zero_vector() {
        let service = unreachable_service();
        let embedding = service.generate("   \n  ").await;
        assert_eq!(embedding.len(), 8);
        assert!(is_zero_vector(&embedding));
    }
}
