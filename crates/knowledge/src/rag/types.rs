//! RAG pipeline result types.

use crate::types::Document;
use ana_core::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed text returned when no generation strategy produced an answer.
pub const APOLOGY: &str = "No pude generar una respuesta con el modelo remoto. Intenta nuevamente.";

/// Canonical refusal replacing answers that admit missing information.
pub const REFUSAL: &str = "No tengo información suficiente para responder con precisión.";

/// Marker a model may prefix to signal it has no information (upper-cased comparison).
pub const NO_INFO_MARKER: &str = "NO_INFO";

/// Phrase meaning "I don't have sufficient information" (lower-cased comparison).
pub const NO_INFO_PHRASE: &str = "no tengo información suficiente";

/// Why retrieval fell back to random sampling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum FallbackReason {
    /// No embedder was loaded.
    EmbedderUnavailable,

    /// No vector index was loaded.
    IndexUnavailable,

    /// Encoding or search failed.
    Failed(String),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmbedderUnavailable => write!(f, "embedder unavailable"),
            Self::IndexUnavailable => write!(f, "index unavailable"),
            Self::Failed(detail) => write!(f, "retrieval failed: {}", detail),
        }
    }
}

/// How a set of documents was retrieved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RetrievalMode {
    /// Ranked by ascending distance to the query vector.
    Ranked,

    /// Uniform random sample from the store.
    Sampled(FallbackReason),
}

impl RetrievalMode {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Sampled(_))
    }
}

/// Documents returned for one query, with how they were obtained.
#[derive(Debug, Clone)]
pub struct Retrieval {
    pub documents: Vec<Document>,
    pub mode: RetrievalMode,
}

/// One way of asking the remote model for an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStrategy {
    /// Structured chat completion.
    Chat,

    /// Raw text completion with fixed sampling parameters.
    TextGeneration,
}

impl GenerationStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::TextGeneration => "text_generation",
        }
    }
}

/// Result of a single strategy attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt {
    /// Usable, trimmed answer text.
    Answer(String),

    /// No usable content; try the next strategy.
    Next,
}

/// Result of running the strategy chain.
#[derive(Debug)]
pub enum GenerationOutcome {
    Answered {
        text: String,
        strategy: GenerationStrategy,
    },

    /// Every strategy returned no content.
    Exhausted,

    /// A strategy raised an error; the chain stopped there.
    Failed(AppError),
}

impl GenerationOutcome {
    /// User-displayable text for this outcome.
    pub fn into_text(self) -> String {
        match self {
            Self::Answered { text, .. } => text,
            Self::Exhausted | Self::Failed(_) => APOLOGY.to_string(),
        }
    }

    pub fn strategy(&self) -> Option<GenerationStrategy> {
        match self {
            Self::Answered { strategy, .. } => Some(*strategy),
            _ => None,
        }
    }
}

/// Everything the pipeline knows about one answered query.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutcome {
    /// Final, normalized answer
    pub answer: String,

    /// How the context documents were obtained
    pub retrieval_mode: RetrievalMode,

    /// Relevance gate verdict (informational)
    pub sufficient_context: bool,

    /// Strategy that produced the answer, if any
    pub strategy: Option<GenerationStrategy>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_text() {
        let answered = GenerationOutcome::Answered {
            text: "La producción aumentó.".to_string(),
            strategy: GenerationStrategy::Chat,
        };
        assert_eq!(answered.strategy(), Some(GenerationStrategy::Chat));
        assert_eq!(answered.into_text(), "La producción aumentó.");

        assert_eq!(GenerationOutcome::Exhausted.into_text(), APOLOGY);
        assert_eq!(
            GenerationOutcome::Failed(AppError::Llm("boom".to_string())).into_text(),
            APOLOGY
        );
    }

    #[test]
    fn test_retrieval_mode_serialization() {
        let mode = RetrievalMode::Sampled(FallbackReason::Failed("bad shape".to_string()));
        let json = serde_json::to_value(&mode).unwrap();
        assert_eq!(json["mode"], "sampled");
        assert_eq!(json["reason"], "failed");
        assert_eq!(json["detail"], "bad shape");

        assert_eq!(
            serde_json::to_value(RetrievalMode::Ranked).unwrap()["mode"],
            "ranked"
        );
        assert!(mode.is_degraded());
    }
}
