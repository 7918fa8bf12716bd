//! Retrieval-augmented answering over the agricultural analysis corpus.
//!
//! Retrieves candidate documents, checks them against the relevance gate,
//! and synthesizes an answer with the remote model.

pub mod gate;
pub mod generator;
pub mod pipeline;
pub mod retriever;
pub mod types;

pub use gate::{has_sufficient_context, DOMAIN_TERMS};
pub use generator::{Generator, TEXT_GENERATION_PARAMETERS};
pub use pipeline::{build_context, normalize_answer, AnaRag, PIPELINE_TOP_K};
pub use retriever::{Retriever, DEFAULT_TOP_K};
pub use types::{
    Attempt, FallbackReason, GenerationOutcome, GenerationStrategy, PipelineOutcome, Retrieval,
    RetrievalMode, APOLOGY, REFUSAL,
};
