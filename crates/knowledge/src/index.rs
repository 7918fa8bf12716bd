//! SQLite persistence for the flat vector index.

use crate::vector_index::{FlatL2Index, VectorIndex};
use ana_core::{AppError, AppResult};
use rusqlite::{params, Connection, OpenFlags};
use std::path::Path;

/// Open (or create) the index database and its tables.
pub fn init_index(db_path: &Path) -> AppResult<Connection> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| AppError::Knowledge(format!("Failed to create index directory: {}", e)))?;
    }

    let conn = Connection::open(db_path)
        .map_err(|e| AppError::Knowledge(format!("Failed to open SQLite index: {}", e)))?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS meta (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS vectors (
            position INTEGER PRIMARY KEY,
            embedding BLOB NOT NULL
        );
        "#,
    )
    .map_err(|e| AppError::Knowledge(format!("Failed to create tables: {}", e)))?;

    tracing::debug!("Initialized SQLite index at {:?}", db_path);
    Ok(conn)
}

/// Replace the stored index with `index`.
pub fn write_index(db_path: &Path, index: &FlatL2Index) -> AppResult<()> {
    let mut conn = init_index(db_path)?;
    let tx = conn
        .transaction()
        .map_err(|e| AppError::Knowledge(format!("Failed to begin transaction: {}", e)))?;

    tx.execute("DELETE FROM vectors", [])
        .map_err(|e| AppError::Knowledge(format!("Failed to clear vectors: {}", e)))?;

    tx.execute(
        "INSERT OR REPLACE INTO meta (key, value) VALUES ('dimension', ?1)",
        params![index.dimension().to_string()],
    )
    .map_err(|e| AppError::Knowledge(format!("Failed to write index metadata: {}", e)))?;

    {
        let mut stmt = tx
            .prepare("INSERT INTO vectors (position, embedding) VALUES (?1, ?2)")
            .map_err(|e| AppError::Knowledge(format!("Failed to prepare insert: {}", e)))?;

        for (position, vector) in index.vectors().iter().enumerate() {
            stmt.execute(params![position as i64, embedding_to_bytes(vector)])
                .map_err(|e| AppError::Knowledge(format!("Failed to insert vector: {}", e)))?;
        }
    }

    tx.commit()
        .map_err(|e| AppError::Knowledge(format!("Failed to commit index: {}", e)))?;

    tracing::info!(
        "Wrote {} vectors to {:?}",
        index.vectors().len(),
        db_path
    );
    Ok(())
}

/// Load a stored index into memory.
pub fn read_index(db_path: &Path) -> AppResult<FlatL2Index> {
    if !db_path.exists() {
        return Err(AppError::Knowledge(format!(
            "Vector index not found at {:?}",
            db_path
        )));
    }

    let conn = Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| AppError::Knowledge(format!("Failed to open SQLite index: {}", e)))?;

    let dimension: usize = conn
        .query_row(
            "SELECT value FROM meta WHERE key = 'dimension'",
            [],
            |row| row.get::<_, String>(0),
        )
        .map_err(|e| AppError::Knowledge(format!("Failed to read index dimension: {}", e)))?
        .parse()
        .map_err(|e| AppError::Knowledge(format!("Invalid index dimension: {}", e)))?;

    let mut stmt = conn
        .prepare("SELECT position, embedding FROM vectors ORDER BY position")
        .map_err(|e| AppError::Knowledge(format!("Failed to prepare query: {}", e)))?;

    let rows = stmt
        .query_map([], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, Vec<u8>>(1)?))
        })
        .map_err(|e| AppError::Knowledge(format!("Failed to query vectors: {}", e)))?;

    let mut index = FlatL2Index::new(dimension);
    for (expected, row) in rows.enumerate() {
        let (position, bytes) =
            row.map_err(|e| AppError::Knowledge(format!("Failed to read vector: {}", e)))?;

        if position != expected as i64 {
            return Err(AppError::Knowledge(format!(
                "Vector positions are not contiguous: expected {}, found {}",
                expected, position
            )));
        }

        index.add(bytes_to_embedding(&bytes)?)?;
    }

    tracing::debug!("Loaded {} vectors from {:?}", index.vectors().len(), db_path);
    Ok(index)
}

/// Convert embedding vector to bytes for storage.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for &value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Convert bytes back to embedding vector.
fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Knowledge(
            "Invalid embedding bytes length".to_string(),
        ));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_index() {
        let temp = TempDir::new().unwrap();
        let conn = init_index(&temp.path().join("index.sqlite")).unwrap();

        let table_count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table'",
                [],
                |row| row.get(0),
            )
            .unwrap();

        assert_eq!(table_count, 2);
    }

    #[test]
    fn test_write_and_read() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("index.sqlite");

        let index =
            FlatL2Index::from_vectors(3, vec![vec![1.0, 0.0, -0.5], vec![0.25, 2.0, 3.0]])
                .unwrap();
        write_index(&path, &index).unwrap();

        let loaded = read_index(&path).unwrap();
        assert_eq!(loaded.dimension(), 3);
        assert_eq!(loaded.vectors(), index.vectors());
    }

    #[test]
    fn test_rewrite_replaces_vectors() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("index.sqlite");

        write_index(
            &path,
            &FlatL2Index::from_vectors(2, vec![vec![1.0, 1.0]; 5]).unwrap(),
        )
        .unwrap();
        write_index(
            &path,
            &FlatL2Index::from_vectors(2, vec![vec![0.0, 1.0]; 2]).unwrap(),
        )
        .unwrap();

        assert_eq!(read_index(&path).unwrap().len(), 2);
    }

    #[test]
    fn test_empty_index_keeps_dimension() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("index.sqlite");

        write_index(&path, &FlatL2Index::new(4)).unwrap();
        let loaded = read_index(&path).unwrap();
        assert_eq!(loaded.dimension(), 4);
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_missing_index() {
        let temp = TempDir::new().unwrap();
        assert!(read_index(&temp.path().join("missing.sqlite")).is_err());
    }

    #[test]
    fn test_foreign_database_is_left_untouched() {
        let temp = TempDir::new().unwrap();
        let db_path = temp.path().join("other.sqlite");
        {
            let conn = Connection::open(&db_path).unwrap();
            conn.execute_batch("CREATE TABLE cosechas (cultivo TEXT);").unwrap();
        }

        assert!(read_index(&db_path).is_err());

        let conn = Connection::open(&db_path).unwrap();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(tables, vec!["cosechas".to_string()]);
    }

    #[test]
    fn test_bytes_roundtrip_rejects_bad_length() {
        assert_eq!(
            bytes_to_embedding(&embedding_to_bytes(&[1.5, -2.0])).unwrap(),
            vec![1.5, -2.0]
        );
        assert!(bytes_to_embedding(&[0, 1, 2]).is_err());
    }
}
