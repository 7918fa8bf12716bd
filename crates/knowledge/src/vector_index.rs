//! Vector index abstraction for document embeddings.
//!
//! Defines a trait for nearest-neighbor search and an exhaustive
//! in-memory implementation using squared Euclidean distance.

use ana_core::{AppError, AppResult};

/// Nearest-neighbor results, one row per query vector.
///
/// `distances[q][j]` is the distance of the `j`-th hit for query `q`,
/// whose store position is `positions[q][j]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchHits {
    pub distances: Vec<Vec<f32>>,
    pub positions: Vec<Vec<usize>>,
}

/// Trait for vector index backends.
pub trait VectorIndex: Send + Sync {
    /// Dimension of every stored vector.
    fn dimension(&self) -> usize;

    /// Number of stored vectors.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Search for the `k` nearest vectors to each query.
    ///
    /// Hits are ordered by ascending distance.
    fn search(&self, queries: &[Vec<f32>], k: usize) -> AppResult<SearchHits>;
}

/// Exhaustive L2 index over vectors held in memory.
#[derive(Debug, Clone)]
pub struct FlatL2Index {
    dimension: usize,
    vectors: Vec<Vec<f32>>,
}

impl FlatL2Index {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: Vec::new(),
        }
    }

    /// Build an index from vectors, checking they all share `dimension`.
    pub fn from_vectors(dimension: usize, vectors: Vec<Vec<f32>>) -> AppResult<Self> {
        let mut index = Self::new(dimension);
        for vector in vectors {
            index.add(vector)?;
        }
        Ok(index)
    }

    /// Append a vector; its position is the current length.
    pub fn add(&mut self, vector: Vec<f32>) -> AppResult<()> {
        if vector.len() != self.dimension {
            return Err(AppError::Knowledge(format!(
                "Vector dimension mismatch: expected {}, got {}",
                self.dimension,
                vector.len()
            )));
        }
        self.vectors.push(vector);
        Ok(())
    }

    pub fn vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }

    fn search_one(&self, query: &[f32], k: usize) -> (Vec<f32>, Vec<usize>) {
        let mut scored: Vec<(f32, usize)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(position, vector)| (squared_l2(query, vector), position))
            .collect();

        scored.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        scored.truncate(k);

        scored.into_iter().unzip()
    }
}

impl VectorIndex for FlatL2Index {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        self.vectors.len()
    }

    fn search(&self, queries: &[Vec<f32>], k: usize) -> AppResult<SearchHits> {
        let mut hits = SearchHits::default();

        for query in queries {
            if query.len() != self.dimension {
                return Err(AppError::Knowledge(format!(
                    "Query dimension mismatch: index has {}, query has {}",
                    self.dimension,
                    query.len()
                )));
            }

            let (distances, positions) = self.search_one(query, k);
            hits.distances.push(distances);
            hits.positions.push(positions);
        }

        tracing::debug!(
            "Searched {} queries against {} vectors (top-{})",
            queries.len(),
            self.vectors.len(),
            k
        );

        Ok(hits)
    }
}

/// Squared Euclidean distance between two equal-length vectors.
fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> FlatL2Index {
        FlatL2Index::from_vectors(
            2,
            vec![
                vec![0.0, 0.0],
                vec![1.0, 0.0],
                vec![0.0, 2.0],
                vec![1.0, 0.0],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_search_orders_by_distance() {
        let hits = index().search(&[vec![0.9, 0.0]], 3).unwrap();

        assert_eq!(hits.positions, vec![vec![1, 3, 0]]);
        assert!((hits.distances[0][0] - 0.01).abs() < 1e-6);
        assert!(hits.distances[0][1] <= hits.distances[0][2]);
    }

    #[test]
    fn test_ties_prefer_lower_position() {
        let hits = index().search(&[vec![1.0, 0.0]], 2).unwrap();
        assert_eq!(hits.positions[0], vec![1, 3]);
        assert_eq!(hits.distances[0], vec![0.0, 0.0]);
    }

    #[test]
    fn test_k_larger_than_index() {
        let hits = index().search(&[vec![0.0, 0.0]], 10).unwrap();
        assert_eq!(hits.positions[0].len(), 4);
    }

    #[test]
    fn test_multiple_queries() {
        let hits = index()
            .search(&[vec![0.0, 0.0], vec![0.0, 2.0]], 1)
            .unwrap();
        assert_eq!(hits.positions, vec![vec![0], vec![2]]);
    }

    #[test]
    fn test_dimension_mismatch() {
        assert!(index().search(&[vec![1.0, 0.0, 0.0]], 1).is_err());
        assert!(FlatL2Index::new(3).add(vec![1.0]).is_err());
    }

    #[test]
    fn test_empty_index() {
        let index = FlatL2Index::new(2);
        assert!(index.is_empty());
        let hits = index.search(&[vec![0.0, 0.0]], 5).unwrap();
        assert!(hits.positions[0].is_empty());
    }
}
