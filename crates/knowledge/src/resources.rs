//! Read-only resources shared by every request.
//!
//! Loaded once at startup and passed to the pipeline explicitly.

use crate::data::ProductionData;
use crate::embeddings::{create_embedder, Embedder};
use crate::index::read_index;
use crate::store::DocumentStore;
use crate::types::{DataReport, IndexReport, ResourceReport, ResourceStatus};
use crate::vector_index::VectorIndex;
use ana_core::{AppConfig, AppResult};
use std::path::Path;
use std::sync::Arc;

/// Document store plus the optional index, embedder and production data.
pub struct Resources {
    store: DocumentStore,
    index: Option<Arc<dyn VectorIndex>>,
    embedder: Option<Arc<dyn Embedder>>,
    data: Option<ProductionData>,
}

impl Resources {
    /// Resources holding only a document store.
    pub fn new(store: DocumentStore) -> Self {
        Self {
            store,
            index: None,
            embedder: None,
            data: None,
        }
    }

    pub fn with_index(mut self, index: Arc<dyn VectorIndex>) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Load every resource named in the configuration.
    ///
    /// The document store is required. The index, embedder and production
    /// data degrade to absent when they fail to load.
    pub async fn load(config: &AppConfig) -> AppResult<Self> {
        let docs_path = config.docs_path();
        let store = DocumentStore::load(&docs_path)?;
        tracing::info!("Loaded {} documents from {:?}", store.len(), docs_path);

        let index_path = config.index_path();
        let index: Option<Arc<dyn VectorIndex>> = match read_index(&index_path) {
            Ok(index) if index.len() != store.len() => {
                tracing::error!(
                    index_len = index.len(),
                    docs_len = store.len(),
                    "Vector index and document store are not aligned; ignoring index"
                );
                None
            }
            Ok(index) => {
                tracing::info!(
                    "Loaded vector index from {:?} ({} vectors, dimension {})",
                    index_path,
                    index.len(),
                    index.dimension()
                );
                Some(Arc::new(index))
            }
            Err(e) => {
                tracing::warn!("Vector index unavailable: {}", e);
                None
            }
        };

        let embedder = match create_embedder(&config.embedding).await {
            Ok(embedder) => {
                tracing::info!(
                    "Embedder ready: {} ({})",
                    embedder.provider_name(),
                    embedder.model_name()
                );
                Some(embedder)
            }
            Err(e) => {
                tracing::warn!("Embedder unavailable: {}", e);
                None
            }
        };

        let data_path = config.data_path();
        let data = match ProductionData::load(&data_path) {
            Ok(data) => {
                tracing::info!("Loaded production data: {} rows", data.len());
                Some(data)
            }
            Err(e) => {
                tracing::warn!("Production data unavailable: {}", e);
                None
            }
        };

        Ok(Self {
            store,
            index,
            embedder,
            data,
        })
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn index(&self) -> Option<&Arc<dyn VectorIndex>> {
        self.index.as_ref()
    }

    pub fn embedder(&self) -> Option<&Arc<dyn Embedder>> {
        self.embedder.as_ref()
    }

    /// Which resources are present.
    pub fn status(&self) -> ResourceStatus {
        ResourceStatus {
            vector_index: self.index.is_some(),
            docs: !self.store.is_empty(),
            embedder: self.embedder.is_some(),
            data: self.data.is_some(),
        }
    }

    /// Status plus the index file and data shape, for diagnostics.
    pub fn report(&self, index_path: &Path) -> ResourceReport {
        let size_bytes = std::fs::metadata(index_path).ok().map(|m| m.len());

        ResourceReport {
            status: self.status(),
            documents: self.store.len(),
            index: IndexReport {
                path: index_path.to_path_buf(),
                exists: size_bytes.is_some(),
                size_bytes,
                vectors: self.index.as_ref().map(|index| index.len()),
                dimension: self.index.as_ref().map(|index| index.dimension()),
            },
            data: self.data.as_ref().map(|data| DataReport {
                rows: data.len(),
                columns: data.headers().to_vec(),
            }),
        }
    }
}
