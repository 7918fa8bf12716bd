//! Offline builder for the vector index and document store.

use crate::embeddings::Embedder;
use crate::index::write_index;
use crate::store::DocumentStore;
use crate::types::BuildStats;
use crate::vector_index::FlatL2Index;
use ana_core::{AppConfig, AppError, AppResult};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// CSV column holding the analysis texts.
pub const ANALYSIS_COLUMN: &str = "analisis";

/// Read analysis texts from a `.csv` or `.txt` file.
///
/// CSV input must have an `analisis` column; empty cells are skipped.
/// Text input yields one document per non-blank line, trimmed.
pub fn load_documents(path: &Path) -> AppResult<Vec<String>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let docs = match ext.as_str() {
        "csv" => load_csv(path)?,
        "txt" => std::fs::read_to_string(path)
            .map_err(|e| AppError::Knowledge(format!("Failed to read {:?}: {}", path, e)))?
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
        _ => {
            return Err(AppError::Knowledge(
                "El archivo debe ser .csv o .txt".to_string(),
            ))
        }
    };

    if docs.is_empty() {
        return Err(AppError::Knowledge(
            "No se encontraron análisis en el archivo.".to_string(),
        ));
    }

    Ok(docs)
}

fn load_csv(path: &Path) -> AppResult<Vec<String>> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| AppError::Knowledge(format!("Failed to open {:?}: {}", path, e)))?;

    let column = reader
        .headers()
        .map_err(|e| AppError::Knowledge(format!("Failed to read CSV headers: {}", e)))?
        .iter()
        .position(|h| h.trim() == ANALYSIS_COLUMN)
        .ok_or_else(|| {
            AppError::Knowledge(format!(
                "El archivo CSV debe tener una columna llamada '{}'.",
                ANALYSIS_COLUMN
            ))
        })?;

    let mut docs = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| AppError::Knowledge(format!("Failed to read CSV row: {}", e)))?;
        if let Some(cell) = record.get(column) {
            if !cell.trim().is_empty() {
                docs.push(cell.to_string());
            }
        }
    }

    Ok(docs)
}

/// Encode every document in `input` and write the index and document store together.
///
/// An existing index is only replaced when `reset` is set.
pub async fn build_index(
    config: &AppConfig,
    input: &Path,
    embedder: &dyn Embedder,
    reset: bool,
) -> AppResult<BuildStats> {
    let start = Instant::now();
    let index_path = config.index_path();
    let docs_path = config.docs_path();

    if index_path.exists() && !reset {
        return Err(AppError::Knowledge(format!(
            "Index already exists at {:?}. Use --reset to rebuild it.",
            index_path
        )));
    }

    let docs = load_documents(input)?;
    tracing::info!("Loaded {} documents from {:?}", docs.len(), input);

    tracing::info!(
        "Encoding {} documents with {} ({})",
        docs.len(),
        embedder.provider_name(),
        embedder.model_name()
    );
    let vectors = embedder.encode(&docs).await?;
    if vectors.len() != docs.len() {
        return Err(AppError::Knowledge(format!(
            "Embedder returned {} vectors for {} documents",
            vectors.len(),
            docs.len()
        )));
    }

    let index = FlatL2Index::from_vectors(embedder.dimensions(), vectors)?;

    // The previous index and docs stay in place until both new files are written
    let staged_index = staging_path(&index_path);
    let staged_docs = staging_path(&docs_path);
    let staged = stage(&index, &docs, &staged_index, &staged_docs)
        .and_then(|()| commit(&staged_index, &index_path))
        .and_then(|()| commit(&staged_docs, &docs_path));
    if let Err(e) = staged {
        for path in [&staged_index, &staged_docs] {
            if path.is_file() {
                let _ = std::fs::remove_file(path);
            }
        }
        return Err(e);
    }

    let stats = BuildStats {
        documents: docs.len(),
        dimension: embedder.dimensions(),
        built_at: Utc::now(),
        duration_secs: start.elapsed().as_secs_f64(),
    };

    tracing::info!(
        documents = stats.documents,
        dimension = stats.dimension,
        duration_secs = stats.duration_secs,
        "Built vector index at {:?}",
        index_path
    );

    Ok(stats)
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn stage(
    index: &FlatL2Index,
    docs: &[String],
    index_path: &Path,
    docs_path: &Path,
) -> AppResult<()> {
    for path in [index_path, docs_path] {
        if path.is_file() {
            std::fs::remove_file(path)?;
        }
    }

    write_index(index_path, index)?;
    DocumentStore::from_texts(docs.iter().cloned()).save(docs_path)
}

fn commit(staged: &Path, target: &Path) -> AppResult<()> {
    std::fs::rename(staged, target).map_err(|e| {
        AppError::Knowledge(format!("Failed to move {:?} into place: {}", staged, e))
    })?;
    tracing::debug!("Wrote {:?}", target);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::HashingEmbedder;
    use crate::index::read_index;
    use crate::vector_index::VectorIndex;
    use std::fs;
    use tempfile::TempDir;

    fn config_for(dir: &Path) -> AppConfig {
        AppConfig {
            workspace: dir.to_path_buf(),
            ..Default::default()
        }
    }

    #[test]
    fn test_load_csv_drops_empty_cells() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("analisis.csv");
        fs::write(
            &path,
            "fecha,analisis\n2023-01,La sequía redujo el café\n2023-02,\n2023-03,\"Bloqueos, transporte\"\n",
        )
        .unwrap();

        let docs = load_documents(&path).unwrap();
        assert_eq!(
            docs,
            vec!["La sequía redujo el café", "Bloqueos, transporte"]
        );
    }

    #[test]
    fn test_load_csv_requires_column() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("datos.csv");
        fs::write(&path, "texto\nalgo\n").unwrap();

        let err = load_documents(&path).unwrap_err();
        assert!(err.to_string().contains("analisis"));
    }

    #[test]
    fn test_load_txt_trims_lines() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("analisis.txt");
        fs::write(&path, "  primera línea  \n\n   \nsegunda\n").unwrap();

        assert_eq!(
            load_documents(&path).unwrap(),
            vec!["primera línea", "segunda"]
        );
    }

    #[test]
    fn test_rejects_other_extensions_and_empty_input() {
        let temp = TempDir::new().unwrap();

        let json = temp.path().join("analisis.json");
        fs::write(&json, "[]").unwrap();
        assert!(load_documents(&json).is_err());

        let empty = temp.path().join("vacio.txt");
        fs::write(&empty, "\n\n").unwrap();
        let err = load_documents(&empty).unwrap_err();
        assert!(err.to_string().contains("No se encontraron"));
    }

    #[tokio::test]
    async fn test_build_writes_aligned_index_and_docs() {
        let temp = TempDir::new().unwrap();
        let config = config_for(temp.path());
        let input = temp.path().join("analisis.txt");
        fs::write(&input, "café\nbanano\ncacao\n").unwrap();

        let stats = build_index(&config, &input, &HashingEmbedder::new(16), false)
            .await
            .unwrap();
        assert_eq!(stats.documents, 3);
        assert_eq!(stats.dimension, 16);

        let index = read_index(&config.index_path()).unwrap();
        let store = DocumentStore::load(&config.docs_path()).unwrap();
        assert_eq!(index.len(), store.len());
        assert_eq!(store.get(1).unwrap().text, "banano");
    }

    #[tokio::test]
    async fn test_existing_index_requires_reset() {
        let temp = TempDir::new().unwrap();
        let config = config_for(temp.path());
        let input = temp.path().join("analisis.txt");
        let embedder = HashingEmbedder::new(8);

        fs::write(&input, "uno\ndos\n").unwrap();
        build_index(&config, &input, &embedder, false).await.unwrap();

        fs::write(&input, "tres\n").unwrap();
        assert!(build_index(&config, &input, &embedder, false).await.is_err());

        let stats = build_index(&config, &input, &embedder, true).await.unwrap();
        assert_eq!(stats.documents, 1);
        assert_eq!(read_index(&config.index_path()).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_rebuild_keeps_previous_files() {
        let temp = TempDir::new().unwrap();
        let config = config_for(temp.path());
        let input = temp.path().join("analisis.txt");
        let embedder = HashingEmbedder::new(8);

        fs::write(&input, "uno\ndos\n").unwrap();
        build_index(&config, &input, &embedder, false).await.unwrap();

        // A directory where the staged docs file would go makes the rebuild fail
        fs::create_dir(staging_path(&config.docs_path())).unwrap();
        fs::write(&input, "tres\n").unwrap();
        assert!(build_index(&config, &input, &embedder, true).await.is_err());

        assert_eq!(read_index(&config.index_path()).unwrap().len(), 2);
        let store = DocumentStore::load(&config.docs_path()).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(0).unwrap().text, "uno");
        assert!(!staging_path(&config.index_path()).exists());
    }

    #[test]
    fn test_staging_path_sits_next_to_target() {
        assert_eq!(
            staging_path(Path::new("/srv/ana/docs.json")),
            PathBuf::from("/srv/ana/docs.json.tmp")
        );
    }
}
