//! Command handlers for the ANA-RAG CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod ask;
pub mod health;
pub mod index;
pub mod serve;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use health::HealthCommand;
pub use index::IndexCommand;
pub use serve::ServeCommand;

use ana_core::{config::AppConfig, AppError, AppResult};
use ana_knowledge::{AnaRag, Generator, Resources};
use std::sync::Arc;

/// Load resources and wire the answer pipeline for the configured provider.
pub async fn build_pipeline(config: &AppConfig) -> AppResult<AnaRag> {
    config.validate()?;

    let resources = Arc::new(Resources::load(config).await?);

    let client = ana_llm::create_client(
        &config.provider,
        config.endpoint.as_deref(),
        config.api_key.as_deref(),
        config.inference_provider.as_deref(),
    )
    .map_err(|e| AppError::Config(format!("Failed to create LLM client: {}", e)))?;

    tracing::info!(
        provider = client.provider_name(),
        model = %config.model,
        "LLM client ready"
    );

    let generator = Generator::for_workspace(client, &config.model, &config.workspace)?;
    Ok(AnaRag::new(resources, generator))
}
