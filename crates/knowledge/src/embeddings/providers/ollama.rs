//! Ollama embedding provider.
//!
//! Produces embeddings through Ollama's local `/api/embeddings` endpoint.
//! The provider is probed once on connect; there are no retries.

use crate::embeddings::Embedder;
use ana_core::config::EmbeddingConfig;
use ana_core::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

const EMBEDDING_ENDPOINT: &str = "/api/embeddings";

/// Request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Ollama embedding provider using the local API.
#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    client: Client,
    base_url: String,
    model: String,
    dimensions: usize,
}

/// Request payload for the Ollama embeddings API
#[derive(Debug, Clone, Serialize)]
struct EmbeddingRequest {
    model: String,
    prompt: String,
}

/// Response from the Ollama embeddings API
#[derive(Debug, Clone, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

/// Error response from the Ollama API
#[derive(Debug, Clone, Deserialize)]
struct ErrorResponse {
    error: String,
}

impl OllamaEmbedder {
    /// Create an embedder without contacting the server.
    pub fn new(config: &EmbeddingConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                AppError::Knowledge(format!("Failed to create HTTP client for Ollama: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            dimensions: config.dimensions,
        })
    }

    /// Create an embedder and verify the model answers with the expected dimension.
    pub async fn connect(config: &EmbeddingConfig) -> Result<Self, AppError> {
        let embedder = Self::new(config)?;
        embedder.verify_connection().await?;
        Ok(embedder)
    }

    #[instrument(skip(self), fields(model = %self.model))]
    async fn verify_connection(&self) -> Result<(), AppError> {
        debug!("Verifying Ollama connection at {}", self.base_url);

        self.embed_single("test connection").await.map_err(|e| {
            warn!("Ollama embedder probe failed: {}", e);
            AppError::Knowledge(format!(
                "Ollama not available at {}. Ensure Ollama is running and model '{}' is installed. Run: ollama pull {}",
                self.base_url, self.model, self.model
            ))
        })?;

        debug!("Ollama connection verified, model '{}' ready", self.model);
        Ok(())
    }

    fn request_for(&self, text: &str) -> EmbeddingRequest {
        EmbeddingRequest {
            model: self.model.clone(),
            prompt: text.to_string(),
        }
    }

    #[instrument(skip(self, text), fields(text_len = text.len()))]
    async fn embed_single(&self, text: &str) -> Result<Vec<f32>, AppError> {
        let url = format!("{}{}", self.base_url, EMBEDDING_ENDPOINT);

        let response = self
            .client
            .post(&url)
            .json(&self.request_for(text))
            .send()
            .await
            .map_err(|e| AppError::Knowledge(format!("Failed to send request to Ollama: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            let detail = serde_json::from_str::<ErrorResponse>(&error_text)
                .map(|r| r.error)
                .unwrap_or(error_text);

            return Err(AppError::Knowledge(format!(
                "Ollama API error ({}): {}",
                status, detail
            )));
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| AppError::Knowledge(format!("Failed to parse Ollama response: {}", e)))?;

        if body.embedding.len() != self.dimensions {
            return Err(AppError::Knowledge(format!(
                "Unexpected embedding dimensions: got {}, expected {}",
                body.embedding.len(),
                self.dimensions
            )));
        }

        Ok(body.embedding)
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    #[instrument(skip(self, texts), fields(batch_size = texts.len(), model = %self.model))]
    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
        // The endpoint takes one prompt per request
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed_single(text).await?);
        }
        Ok(embeddings)
    }
}
