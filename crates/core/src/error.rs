//! Error types for ANA-RAG.
//!
//! This module defines a unified error enum that covers all error categories
//! in the service: configuration, I/O, LLM providers, knowledge resources,
//! prompts and the answer pipeline itself.

use thiserror::Error;

/// Unified error type for ANA-RAG.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
/// Errors are represented and propagated, never panicked.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// LLM provider errors (transport, decoding, missing fields)
    #[error("LLM error: {0}")]
    Llm(String),

    /// The LLM provider answered with a non-success HTTP status.
    #[error("LLM HTTP error ({status}): {body}")]
    LlmHttp {
        /// HTTP status code returned by the provider
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Document store, vector index and embedder errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Unexpected failure inside the answer pipeline
    #[error("Error procesando la consulta: {0}")]
    Pipeline(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Short name of the error category, used in diagnostic logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
            AppError::Llm(_) => "llm",
            AppError::LlmHttp { .. } => "llm_http",
            AppError::Knowledge(_) => "knowledge",
            AppError::Prompt(_) => "prompt",
            AppError::Pipeline(_) => "pipeline",
            AppError::Serialization(_) => "serialization",
            AppError::Other(_) => "other",
        }
    }

    /// HTTP status and body, when the error carries a provider response.
    pub fn http_response(&self) -> Option<(u16, &str)> {
        match self {
            AppError::LlmHttp { status, body } => Some((*status, body.as_str())),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_exposes_response() {
        let err = AppError::LlmHttp {
            status: 401,
            body: "invalid token".to_string(),
        };
        assert_eq!(err.kind(), "llm_http");
        assert_eq!(err.http_response(), Some((401, "invalid token")));
        assert_eq!(err.to_string(), "LLM HTTP error (401): invalid token");
    }

    #[test]
    fn test_pipeline_error_message() {
        let err = AppError::Pipeline("boom".to_string());
        assert_eq!(err.to_string(), "Error procesando la consulta: boom");
        assert!(err.http_response().is_none());
    }

    #[test]
    fn test_json_error_conversion() {
        let err: AppError = serde_json::from_str::<Vec<String>>("{").unwrap_err().into();
        assert_eq!(err.kind(), "serialization");
    }
}
