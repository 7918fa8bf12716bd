//! LLM integration crate for ANA-RAG.
//!
//! This crate provides a provider-agnostic abstraction over the remote
//! language model used to synthesize answers. Every provider exposes a
//! structured chat completion and a raw text generation call.
//!
//! # Providers
//! - **Hugging Face**: router endpoint, optionally pinned to an inference sub-provider (default)
//! - **Ollama**: local LLM runtime
//!
//! # Example
//! ```no_run
//! use ana_llm::{ChatMessage, ChatRequest, LlmClient, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = ChatRequest::new("llama3.2", vec![ChatMessage::user("Hola")]);
//! let response = client.chat(&request).await?;
//! println!("{:?}", response.first_content());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{
    ChatChoice, ChatMessage, ChatRequest, ChatResponse, GeneratedText, GenerationParameters,
    LlmClient, TextGenerationOutput, TextGenerationRequest,
};
pub use factory::create_client;
pub use providers::{HuggingFaceClient, OllamaClient};
pub use types::ProviderType;
