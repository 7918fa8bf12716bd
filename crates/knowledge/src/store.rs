//! Document store: the ordered, read-only sequence of analysis texts.

use crate::types::Document;
use ana_core::{AppError, AppResult};
use rand::seq::SliceRandom;
use std::fs;
use std::path::Path;

/// Ordered sequence of documents, positionally aligned with the vector index.
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    documents: Vec<Document>,
}

impl DocumentStore {
    /// Build a store from texts, assigning positions in order.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let documents = texts
            .into_iter()
            .enumerate()
            .map(|(position, text)| Document::new(position, text))
            .collect();
        Self { documents }
    }

    /// Load the store from a JSON array of strings.
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::Knowledge(format!("Failed to read documents at {:?}: {}", path, e))
        })?;

        let texts: Vec<String> = serde_json::from_str(&content).map_err(|e| {
            AppError::Knowledge(format!("Failed to parse documents at {:?}: {}", path, e))
        })?;

        tracing::debug!("Loaded {} documents from {:?}", texts.len(), path);
        Ok(Self::from_texts(texts))
    }

    /// Write the store as a JSON array of strings.
    pub fn save(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let texts: Vec<&str> = self.documents.iter().map(|d| d.text.as_str()).collect();
        let json = serde_json::to_string_pretty(&texts)?;
        fs::write(path, json).map_err(|e| {
            AppError::Knowledge(format!("Failed to write documents to {:?}: {}", path, e))
        })?;

        tracing::debug!("Saved {} documents to {:?}", self.documents.len(), path);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Document at `position`, if in range.
    pub fn get(&self, position: usize) -> Option<&Document> {
        self.documents.get(position)
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Uniform random sample without replacement of size `min(k, len)`.
    pub fn sample(&self, k: usize) -> Vec<Document> {
        let mut rng = rand::thread_rng();
        self.documents
            .choose_multiple(&mut rng, k.min(self.documents.len()))
            .cloned()
            .collect()
    }
}
