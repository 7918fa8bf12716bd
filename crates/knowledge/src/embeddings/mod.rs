//! Query and document embedding.
//!
//! Provides the `Embedder` trait and the providers used at build time and
//! at query time. Both sides must use the same provider and model so the
//! stored vectors and query vectors live in the same space.

pub mod provider;
pub mod providers;

pub use provider::{create_embedder, Embedder};
pub use providers::{HashingEmbedder, OllamaEmbedder};
