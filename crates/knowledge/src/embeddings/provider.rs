//! Embedder trait and factory.

use super::providers::{HashingEmbedder, OllamaEmbedder};
use ana_core::config::EmbeddingConfig;
use ana_core::{AppError, AppResult};
use std::sync::Arc;

/// Maps texts to fixed-length vectors.
#[async_trait::async_trait]
pub trait Embedder: Send + Sync + std::fmt::Debug {
    /// Provider name (e.g., "ollama", "hashing")
    fn provider_name(&self) -> &str;

    /// Model identifier
    fn model_name(&self) -> &str;

    /// Length of every produced vector
    fn dimensions(&self) -> usize;

    /// Encode a batch of texts, one vector per text, in order.
    async fn encode(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Encode a single text.
    async fn encode_one(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut vectors = self.encode(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| AppError::Knowledge("No embedding returned".to_string()))
    }
}

/// Create an embedder from configuration.
///
/// Remote providers are probed once; a failed probe is returned as an error
/// so the caller can mark the embedder unavailable.
pub async fn create_embedder(config: &EmbeddingConfig) -> AppResult<Arc<dyn Embedder>> {
    match config.provider.as_str() {
        "ollama" => {
            let embedder = OllamaEmbedder::connect(config).await?;
            Ok(Arc::new(embedder))
        }

        "hashing" => Ok(Arc::new(HashingEmbedder::new(config.dimensions))),

        _ => Err(AppError::Knowledge(format!(
            "Unknown embedding provider: '{}'. Supported providers: ollama, hashing",
            config.provider
        ))),
    }
}
