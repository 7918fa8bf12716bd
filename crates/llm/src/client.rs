//! LLM client abstraction and request/response types.
//!
//! Two calls are exposed by every provider: a structured chat completion
//! (role-tagged messages in, a list of choices out) and a raw text
//! generation (prompt string plus sampling parameters in, generated text out).

use ana_core::AppResult;
use serde::{Deserialize, Serialize};

/// A role-tagged chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// "system", "user" or "assistant"
    pub role: String,

    /// Message text; providers may omit it
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: Some(content.into()),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: Some(content.into()),
        }
    }
}

/// Chat completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model identifier (e.g., "openai/gpt-oss-120b")
    pub model: String,

    /// Conversation messages, in order
    pub messages: Vec<ChatMessage>,

    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Temperature for sampling (0.0 - 2.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl ChatRequest {
    /// Create a new chat request with required fields.
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            max_tokens: None,
            temperature: None,
        }
    }
}

/// A single completion choice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub index: u32,

    #[serde(default)]
    pub message: Option<ChatMessage>,

    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Chat completion response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Model that generated the response
    #[serde(default)]
    pub model: String,

    /// Completion choices; may be empty
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

impl ChatResponse {
    /// Content of the first choice's message, if any.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.as_ref())
            .and_then(|message| message.content.as_deref())
    }
}

/// Sampling parameters for raw text generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParameters {
    /// Upper bound on generated tokens
    pub max_new_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Whether to sample at all; greedy decoding when false
    pub do_sample: bool,
}

/// Raw text generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextGenerationRequest {
    /// Model identifier
    #[serde(skip_serializing)]
    pub model: String,

    /// Prompt text
    pub inputs: String,

    /// Sampling parameters
    pub parameters: GenerationParameters,
}

impl TextGenerationRequest {
    pub fn new(
        model: impl Into<String>,
        inputs: impl Into<String>,
        parameters: GenerationParameters,
    ) -> Self {
        Self {
            model: model.into(),
            inputs: inputs.into(),
            parameters,
        }
    }
}

/// Object form of a text generation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedText {
    pub generated_text: String,
}

/// The shapes a text generation endpoint may answer with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextGenerationOutput {
    /// A bare string
    Plain(String),

    /// An object with a `generated_text` field
    Generated(GeneratedText),

    /// A list of `generated_text` objects (first one wins)
    Batch(Vec<GeneratedText>),

    /// Anything else
    Other(serde_json::Value),
}

impl TextGenerationOutput {
    /// Extract the generated text uniformly across response shapes.
    pub fn into_text(self) -> String {
        match self {
            Self::Plain(text) => text,
            Self::Generated(generated) => generated.generated_text,
            Self::Batch(batch) => batch
                .into_iter()
                .next()
                .map(|generated| generated.generated_text)
                .unwrap_or_default(),
            Self::Other(value) => value.to_string(),
        }
    }
}

/// Trait for LLM providers.
///
/// Abstracts the remote inference service (Hugging Face router, Ollama, ...)
/// behind the two calls the answer pipeline needs.
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Get the provider name (e.g., "huggingface", "ollama").
    fn provider_name(&self) -> &str;

    /// Perform a structured chat completion.
    async fn chat(&self, request: &ChatRequest) -> AppResult<ChatResponse>;

    /// Perform a raw text completion.
    async fn text_generation(
        &self,
        request: &TextGenerationRequest,
    ) -> AppResult<TextGenerationOutput>;
}
