//! LLM provider implementations.

pub mod huggingface;
pub mod ollama;

pub use huggingface::HuggingFaceClient;
pub use ollama::OllamaClient;

use ana_core::{AppError, AppResult};

/// Turn a non-success HTTP response into `AppError::LlmHttp`, keeping the body.
pub(crate) async fn ensure_success(response: reqwest::Response) -> AppResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    Err(AppError::LlmHttp {
        status: status.as_u16(),
        body,
    })
}
