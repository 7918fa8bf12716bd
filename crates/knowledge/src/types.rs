//! Knowledge system type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// An immutable analysis text at a fixed position in the document store.
///
/// Position `i` in the store corresponds to vector `i` in the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Position in the store (identity)
    pub position: usize,

    /// Text content
    pub text: String,
}

impl Document {
    pub fn new(position: usize, text: impl Into<String>) -> Self {
        Self {
            position,
            text: text.into(),
        }
    }
}

/// Incoming question from the request layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRequest {
    pub question: String,
}

impl AnswerRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
        }
    }
}

/// Terminal output of one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResponse {
    /// Answer text; empty when the request failed
    pub answer: String,

    /// Whether an answer was produced
    pub success: bool,

    /// Explanatory message
    pub message: Option<String>,
}

impl AnswerResponse {
    pub fn success(answer: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            success: true,
            message: Some(message.into()),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            answer: String::new(),
            success: false,
            message: Some(message.into()),
        }
    }
}

/// Which read-only resources loaded successfully at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceStatus {
    pub vector_index: bool,
    pub docs: bool,
    pub embedder: bool,
    pub data: bool,
}

/// Diagnostic view of the loaded resources.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceReport {
    pub status: ResourceStatus,
    pub documents: usize,
    pub index: IndexReport,
    pub data: Option<DataReport>,
}

/// Vector index file and, when it loaded, its shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexReport {
    pub path: PathBuf,
    pub exists: bool,
    pub size_bytes: Option<u64>,
    pub vectors: Option<usize>,
    pub dimension: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataReport {
    pub rows: usize,
    pub columns: Vec<String>,
}

/// Statistics from an offline index build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildStats {
    /// Number of documents indexed
    pub documents: usize,

    /// Embedding dimension
    pub dimension: usize,

    /// When the build finished
    pub built_at: DateTime<Utc>,

    /// Duration in seconds
    pub duration_secs: f64,
}
