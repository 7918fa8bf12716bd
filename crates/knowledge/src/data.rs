//! Auxiliary production dataset loaded at startup.
//!
//! The table is not consulted by the answer pipeline; its presence is
//! reported through the health signal.

use ana_core::{AppError, AppResult};
use std::path::Path;

/// Tabular production data (headers and rows as strings).
#[derive(Debug, Clone, Default)]
pub struct ProductionData {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ProductionData {
    pub fn load(path: &Path) -> AppResult<Self> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| {
            AppError::Knowledge(format!("Failed to open production data {:?}: {}", path, e))
        })?;

        let headers = reader
            .headers()
            .map_err(|e| AppError::Knowledge(format!("Failed to read CSV headers: {}", e)))?
            .iter()
            .map(str::to_string)
            .collect();

        let rows = reader
            .records()
            .map(|record| {
                record
                    .map(|r| r.iter().map(str::to_string).collect())
                    .map_err(|e| AppError::Knowledge(format!("Failed to read CSV row: {}", e)))
            })
            .collect::<AppResult<Vec<Vec<String>>>>()?;

        let data = Self { headers, rows };
        tracing::debug!(
            "Loaded production data from {:?}: {} rows, {} columns",
            path,
            data.len(),
            data.headers.len()
        );
        Ok(data)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
