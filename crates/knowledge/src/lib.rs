//! Knowledge layer for ANA-RAG.
//!
//! Holds the read-only resources (document store, vector index, embedder,
//! production data), the offline index builder, and the retrieval-augmented
//! answer pipeline built on top of them.

pub mod builder;
pub mod data;
pub mod embeddings;
pub mod index;
pub mod rag;
pub mod resources;
pub mod store;
pub mod types;
pub mod vector_index;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use builder::{build_index, load_documents};
pub use data::ProductionData;
pub use embeddings::{create_embedder, Embedder, HashingEmbedder, OllamaEmbedder};
pub use rag::{
    AnaRag, FallbackReason, Generator, PipelineOutcome, Retrieval, RetrievalMode, Retriever,
    DEFAULT_TOP_K,
};
pub use resources::Resources;
pub use store::DocumentStore;
pub use types::{
    AnswerRequest, AnswerResponse, BuildStats, DataReport, Document, IndexReport, ResourceReport,
    ResourceStatus,
};
pub use vector_index::{FlatL2Index, SearchHits, VectorIndex};
