//! Document retrieval with a random-sample fallback.

use crate::embeddings::Embedder;
use crate::rag::types::{FallbackReason, Retrieval, RetrievalMode};
use crate::resources::Resources;
use crate::types::Document;
use crate::vector_index::VectorIndex;
use ana_core::{AppError, AppResult};
use std::sync::Arc;

/// Default number of documents for direct retrieval.
pub const DEFAULT_TOP_K: usize = 3;

/// Retrieves candidate documents for a query.
///
/// Never fails: when the embedder or index is missing, or encoding or
/// search goes wrong, it returns a uniform random sample of the store.
#[derive(Clone)]
pub struct Retriever {
    resources: Arc<Resources>,
}

impl Retriever {
    pub fn new(resources: Arc<Resources>) -> Self {
        Self { resources }
    }

    /// Up to `k` documents, ranked when possible.
    pub async fn retrieve(&self, query: &str, k: usize) -> Vec<Document> {
        self.retrieve_detailed(query, k).await.documents
    }

    /// Up to `k` documents plus how they were obtained.
    pub async fn retrieve_detailed(&self, query: &str, k: usize) -> Retrieval {
        let reason = match (self.resources.embedder(), self.resources.index()) {
            (None, _) => FallbackReason::EmbedderUnavailable,
            (_, None) => FallbackReason::IndexUnavailable,
            (Some(embedder), Some(index)) => {
                match self.ranked(embedder.as_ref(), index.as_ref(), query, k).await {
                    Ok(documents) => {
                        tracing::debug!("Retrieved {} ranked documents", documents.len());
                        return Retrieval {
                            documents,
                            mode: RetrievalMode::Ranked,
                        };
                    }
                    Err(e) => FallbackReason::Failed(e.to_string()),
                }
            }
        };

        let documents = self.resources.store().sample(k);
        tracing::warn!(
            "Falling back to {} random documents: {}",
            documents.len(),
            reason
        );

        Retrieval {
            documents,
            mode: RetrievalMode::Sampled(reason),
        }
    }

    async fn ranked(
        &self,
        embedder: &dyn Embedder,
        index: &dyn VectorIndex,
        query: &str,
        k: usize,
    ) -> AppResult<Vec<Document>> {
        let query_vector = embedder.encode_one(query).await?;
        let hits = index.search(&[query_vector], k)?;

        let positions = hits
            .positions
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Knowledge("Index returned no result rows".to_string()))?;

        let store = self.resources.store();
        positions
            .into_iter()
            .map(|position| {
                store.get(position).cloned().ok_or_else(|| {
                    AppError::Knowledge(format!(
                        "Index position {} is outside the document store ({} documents)",
                        position,
                        store.len()
                    ))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::HashingEmbedder;
    use crate::store::DocumentStore;
    use crate::vector_index::{FlatL2Index, SearchHits};
    use std::collections::HashSet;

    const TEXTS: [&str; 4] = [
        "La sequía redujo la cosecha de café",
        "Bloqueos en el transporte de banano",
        "Exportación de flores aumentó",
        "Plaga afectó el cacao",
    ];

    async fn ranked_resources() -> Arc<Resources> {
        let embedder = HashingEmbedder::new(64);
        let texts: Vec<String> = TEXTS.iter().map(|t| t.to_string()).collect();
        let vectors = embedder.encode(&texts).await.unwrap();

        Arc::new(
            Resources::new(DocumentStore::from_texts(TEXTS))
                .with_index(Arc::new(FlatL2Index::from_vectors(64, vectors).unwrap()))
                .with_embedder(Arc::new(embedder)),
        )
    }

    /// Index that reports a position past the end of any store.
    struct OutOfRangeIndex;

    impl VectorIndex for OutOfRangeIndex {
        fn dimension(&self) -> usize {
            64
        }

        fn len(&self) -> usize {
            4
        }

        fn search(&self, queries: &[Vec<f32>], _k: usize) -> AppResult<SearchHits> {
            Ok(SearchHits {
                distances: vec![vec![0.0]; queries.len()],
                positions: vec![vec![99]; queries.len()],
            })
        }
    }

    #[tokio::test]
    async fn test_ranked_retrieval_returns_nearest_first() {
        let retriever = Retriever::new(ranked_resources().await);
        let retrieval = retriever
            .retrieve_detailed("Bloqueos en el transporte de banano", 2)
            .await;

        assert_eq!(retrieval.mode, RetrievalMode::Ranked);
        assert_eq!(retrieval.documents.len(), 2);
        assert_eq!(retrieval.documents[0].position, 1);
    }

    #[tokio::test]
    async fn test_length_is_min_of_k_and_store() {
        let retriever = Retriever::new(ranked_resources().await);
        for k in 0..7 {
            let docs = retriever.retrieve("café", k).await;
            assert_eq!(docs.len(), k.min(TEXTS.len()));
        }
    }

    #[tokio::test]
    async fn test_missing_embedder_samples_store() {
        let resources = Arc::new(Resources::new(DocumentStore::from_texts(TEXTS)));
        let retriever = Retriever::new(resources.clone());

        for k in 0..7 {
            let retrieval = retriever.retrieve_detailed("café", k).await;
            assert_eq!(
                retrieval.mode,
                RetrievalMode::Sampled(FallbackReason::EmbedderUnavailable)
            );
            assert_eq!(retrieval.documents.len(), k.min(TEXTS.len()));

            let positions: HashSet<usize> =
                retrieval.documents.iter().map(|d| d.position).collect();
            assert_eq!(positions.len(), retrieval.documents.len());
            for doc in &retrieval.documents {
                assert_eq!(resources.store().get(doc.position), Some(doc));
            }
        }
    }

    #[tokio::test]
    async fn test_missing_index_samples_store() {
        let resources = Arc::new(
            Resources::new(DocumentStore::from_texts(TEXTS))
                .with_embedder(Arc::new(HashingEmbedder::new(64))),
        );
        let retrieval = Retriever::new(resources).retrieve_detailed("café", 3).await;
        assert_eq!(
            retrieval.mode,
            RetrievalMode::Sampled(FallbackReason::IndexUnavailable)
        );
        assert_eq!(retrieval.documents.len(), 3);
    }

    #[tokio::test]
    async fn test_search_failure_falls_back() {
        // Embedder dimension differs from the index dimension
        let embedder = HashingEmbedder::new(64);
        let resources = Arc::new(
            Resources::new(DocumentStore::from_texts(TEXTS))
                .with_index(Arc::new(
                    FlatL2Index::from_vectors(2, vec![vec![0.0, 0.0]; 4]).unwrap(),
                ))
                .with_embedder(Arc::new(embedder)),
        );

        let retrieval = Retriever::new(resources).retrieve_detailed("café", 2).await;
        assert!(matches!(
            retrieval.mode,
            RetrievalMode::Sampled(FallbackReason::Failed(_))
        ));
        assert_eq!(retrieval.documents.len(), 2);
    }

    #[tokio::test]
    async fn test_out_of_range_position_falls_back() {
        let resources = Arc::new(
            Resources::new(DocumentStore::from_texts(TEXTS))
                .with_index(Arc::new(OutOfRangeIndex))
                .with_embedder(Arc::new(HashingEmbedder::new(64))),
        );

        let retrieval = Retriever::new(resources).retrieve_detailed("café", 1).await;
        assert!(retrieval.mode.is_degraded());
        assert!(retrieval.documents.iter().all(|d| d.position < TEXTS.len()));
    }

    #[tokio::test]
    async fn test_empty_store() {
        let resources = Arc::new(Resources::new(DocumentStore::default()));
        assert!(Retriever::new(resources).retrieve("café", 5).await.is_empty());
    }
}
