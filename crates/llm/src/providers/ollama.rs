//! Ollama LLM provider implementation.
//!
//! This module provides integration with Ollama, a local LLM runtime.
//! Ollama API: https://github.com/ollama/ollama/blob/main/docs/api.md

use super::ensure_success;
use crate::client::{
    ChatChoice, ChatMessage, ChatRequest, ChatResponse, LlmClient, TextGenerationOutput,
    TextGenerationRequest,
};
use ana_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Sampling options accepted by Ollama.
#[derive(Debug, Default, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

/// Ollama `/api/chat` request format.
#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    options: OllamaOptions,
    stream: bool,
}

/// Ollama `/api/chat` response format.
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    model: String,
    #[serde(default)]
    message: Option<ChatMessage>,
    #[serde(default)]
    done_reason: Option<String>,
}

/// Ollama `/api/generate` request format.
#[derive(Debug, Serialize)]
struct OllamaGenerateRequest {
    model: String,
    prompt: String,
    options: OllamaOptions,
    stream: bool,
}

/// Ollama `/api/generate` response format.
#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

/// Ollama LLM client.
pub struct OllamaClient {
    /// Base URL for Ollama API
    base_url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl OllamaClient {
    /// Create a new Ollama client with default settings.
    ///
    /// Default URL: http://localhost:11434
    pub fn new() -> Self {
        Self::with_base_url("http://localhost:11434")
    }

    /// Create a new Ollama client with a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn to_chat_request(&self, request: &ChatRequest) -> OllamaChatRequest {
        OllamaChatRequest {
            model: request.model.clone(),
            messages: request.messages.clone(),
            options: OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
            stream: false,
        }
    }

    fn to_generate_request(&self, request: &TextGenerationRequest) -> OllamaGenerateRequest {
        let params = &request.parameters;
        OllamaGenerateRequest {
            model: request.model.clone(),
            prompt: request.inputs.clone(),
            options: OllamaOptions {
                // Greedy decoding when sampling is off
                temperature: Some(if params.do_sample {
                    params.temperature
                } else {
                    0.0
                }),
                num_predict: Some(params.max_new_tokens),
            },
            stream: false,
        }
    }

    fn convert_chat_response(&self, response: OllamaChatResponse) -> ChatResponse {
        ChatResponse {
            model: response.model,
            choices: vec![ChatChoice {
                index: 0,
                message: response.message,
                finish_reason: response.done_reason,
            }],
        }
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl LlmClient for OllamaClient {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    async fn chat(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
        tracing::info!("Sending chat request to Ollama");
        tracing::debug!("Request: {:?}", request);

        let url = format!("{}/api/chat", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&self.to_chat_request(request))
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send request to Ollama: {}", e)))?;

        let response = ensure_success(response).await?;

        let chat: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse Ollama response: {}", e)))?;

        tracing::info!("Received chat completion from Ollama");
        Ok(self.convert_chat_response(chat))
    }

    async fn text_generation(
        &self,
        request: &TextGenerationRequest,
    ) -> AppResult<TextGenerationOutput> {
        tracing::info!("Sending generate request to Ollama");

        let url = format!("{}/api/generate", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&self.to_generate_request(request))
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send request to Ollama: {}", e)))?;

        let response = ensure_success(response).await?;

        // For non-streaming, Ollama returns a single JSON object
        let generated: OllamaGenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse Ollama response: {}", e)))?;

        Ok(TextGenerationOutput::Plain(generated.response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::GenerationParameters;

    #[test]
    fn test_ollama_client_creation() {
        let client = OllamaClient::new();
        assert_eq!(client.provider_name(), "ollama");
        assert_eq!(client.base_url, "http://localhost:11434");
    }

    #[test]
    fn test_chat_request_conversion() {
        let client = OllamaClient::new();
        let request = ChatRequest {
            temperature: Some(0.7),
            max_tokens: Some(100),
            ..ChatRequest::new("llama3", vec![ChatMessage::user("Hola")])
        };

        let converted = client.to_chat_request(&request);
        assert_eq!(converted.model, "llama3");
        assert_eq!(converted.messages.len(), 1);
        assert_eq!(converted.options.temperature, Some(0.7));
        assert_eq!(converted.options.num_predict, Some(100));
        assert!(!converted.stream);
    }

    #[test]
    fn test_generate_request_disables_sampling() {
        let client = OllamaClient::new();
        let request = TextGenerationRequest::new(
            "llama3",
            "prompt",
            GenerationParameters {
                max_new_tokens: 300,
                temperature: 0.4,
                do_sample: false,
            },
        );

        let converted = client.to_generate_request(&request);
        assert_eq!(converted.prompt, "prompt");
        assert_eq!(converted.options.temperature, Some(0.0));
        assert_eq!(converted.options.num_predict, Some(300));
    }

    #[test]
    fn test_chat_response_conversion() {
        let client = OllamaClient::new();
        let raw: OllamaChatResponse = serde_json::from_str(
            r#"{"model":"llama3","message":{"role":"assistant","content":"Respuesta"},"done":true,"done_reason":"stop"}"#,
        )
        .unwrap();

        let converted = client.convert_chat_response(raw);
        assert_eq!(converted.first_content(), Some("Respuesta"));
        assert_eq!(converted.choices[0].finish_reason.as_deref(), Some("stop"));
    }
}
