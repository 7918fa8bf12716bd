//! Hugging Face inference provider.
//!
//! Chat completions go through the Hugging Face router's OpenAI-compatible
//! endpoint, which forwards to an inference sub-provider (e.g. Nebius) when the
//! model id carries a `:<provider>` suffix. Raw text generation uses the
//! `hf-inference` task endpoint.

use super::ensure_success;
use crate::client::{
    ChatRequest, ChatResponse, LlmClient, TextGenerationOutput, TextGenerationRequest,
};
use ana_core::{AppError, AppResult};

const DEFAULT_BASE_URL: &str = "https://router.huggingface.co";

/// Hugging Face router client.
pub struct HuggingFaceClient {
    /// Base URL of the router
    base_url: String,

    /// Bearer token
    token: String,

    /// Inference sub-provider appended to the model id for chat requests
    inference_provider: Option<String>,

    /// HTTP client
    client: reqwest::Client,
}

impl HuggingFaceClient {
    /// Create a client against the public router.
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, token)
    }

    /// Create a client with a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            inference_provider: None,
            client: reqwest::Client::new(),
        }
    }

    /// Route chat requests through a specific inference sub-provider.
    pub fn with_inference_provider(mut self, provider: Option<String>) -> Self {
        self.inference_provider = provider.filter(|p| !p.trim().is_empty());
        self
    }

    /// Model id as sent to the router's chat endpoint.
    fn routed_model(&self, model: &str) -> String {
        match &self.inference_provider {
            Some(provider) if !model.contains(':') => format!("{}:{}", model, provider),
            _ => model.to_string(),
        }
    }

    fn chat_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn text_generation_url(&self, model: &str) -> String {
        format!("{}/hf-inference/models/{}", self.base_url, model)
    }
}

#[async_trait::async_trait]
impl LlmClient for HuggingFaceClient {
    fn provider_name(&self) -> &str {
        "huggingface"
    }

    async fn chat(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
        tracing::info!("Sending chat completion request to Hugging Face");

        let mut body = request.clone();
        body.model = self.routed_model(&request.model);
        tracing::debug!("Routed model: {}", body.model);

        let response = self
            .client
            .post(self.chat_url())
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send request to Hugging Face: {}", e)))?;

        let response = ensure_success(response).await?;

        let chat: ChatResponse = response.json().await.map_err(|e| {
            AppError::Llm(format!("Failed to parse Hugging Face chat response: {}", e))
        })?;

        tracing::debug!("Received {} chat choices", chat.choices.len());
        Ok(chat)
    }

    async fn text_generation(
        &self,
        request: &TextGenerationRequest,
    ) -> AppResult<TextGenerationOutput> {
        tracing::info!("Sending text generation request to Hugging Face");

        let response = self
            .client
            .post(self.text_generation_url(&request.model))
            .bearer_auth(&self.token)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send request to Hugging Face: {}", e)))?;

        let response = ensure_success(response).await?;

        response.json().await.map_err(|e| {
            AppError::Llm(format!(
                "Failed to parse Hugging Face text generation response: {}",
                e
            ))
        })
    }
}
