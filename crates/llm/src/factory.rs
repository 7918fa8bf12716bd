//! LLM provider factory.
//!
//! Creates LLM clients from the configured provider name, injecting the
//! endpoint and secrets each provider needs.

use crate::client::LlmClient;
use crate::providers::{HuggingFaceClient, OllamaClient};
use crate::types::ProviderType;
use std::sync::Arc;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("huggingface", "hf", "ollama")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key (required by Hugging Face)
/// * `inference_provider` - Hugging Face router sub-provider (e.g. "nebius")
///
/// # Errors
/// Returns an error message if the provider is unknown or a required
/// secret is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    inference_provider: Option<&str>,
) -> Result<Arc<dyn LlmClient>, String> {
    let provider_type =
        ProviderType::parse(provider).ok_or_else(|| format!("Unknown provider: {}", provider))?;

    match provider_type {
        ProviderType::HuggingFace => {
            let token = api_key
                .filter(|key| !key.trim().is_empty())
                .ok_or_else(|| "Hugging Face provider requires API key (HF_TOKEN)".to_string())?;
            let client = match endpoint {
                Some(base_url) => HuggingFaceClient::with_base_url(base_url, token),
                None => HuggingFaceClient::new(token),
            }
            .with_inference_provider(inference_provider.map(str::to_string));
            Ok(Arc::new(client))
        }
        ProviderType::Ollama => {
            let base_url = endpoint.unwrap_or("http://localhost:11434");
            Ok(Arc::new(OllamaClient::with_base_url(base_url)))
        }
    }
}
