//! Offline hashing embedder built from character trigrams and words.

use crate::embeddings::Embedder;
use ana_core::AppResult;
use std::collections::{HashMap, HashSet};

const STOP_WORDS: &[&str] = &[
    "de", "la", "el", "en", "y", "a", "los", "las", "del", "se", "por", "un", "una", "con",
    "para", "es", "al", "lo", "como", "su", "sus", "que", "o", "the", "of", "and", "to", "in",
];

/// Deterministic embedder for offline indexes and tests.
///
/// Vectors are content-dependent but not semantic. Each word longer than two
/// characters contributes its trigrams and its whole-word hash, and the
/// result is normalized to unit length.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0; self.dimensions];
        if self.dimensions == 0 {
            return embedding;
        }

        let lower = text.to_lowercase();
        let stop_words: HashSet<&str> = STOP_WORDS.iter().copied().collect();

        let mut word_freq: HashMap<&str, usize> = HashMap::new();
        for word in lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() > 2 && !stop_words.contains(w))
        {
            *word_freq.entry(word).or_insert(0) += 1;
        }

        for (word, freq) in &word_freq {
            let chars: Vec<char> = word.chars().collect();
            for window in chars.windows(3) {
                let trigram: String = window.iter().collect();
                let trigram_hash = trigram
                    .bytes()
                    .fold(0u64, |acc, b| acc.wrapping_mul(37).wrapping_add(b as u64));
                embedding[(trigram_hash as usize) % self.dimensions] += (*freq as f32).sqrt();
            }

            let word_hash = word
                .bytes()
                .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
            embedding[(word_hash as usize) % self.dimensions] += *freq as f32;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding
    }
}

#[async_trait::async_trait]
impl Embedder for HashingEmbedder {
    fn provider_name(&self) -> &str {
        "hashing"
    }

    fn model_name(&self) -> &str {
        "hashing-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn encode(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(v: &[f32]) -> f32 {
        v.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    #[tokio::test]
    async fn test_encode_batch_is_normalized() {
        let embedder = HashingEmbedder::new(128);
        let texts = vec![
            "La producción de café bajó por la sequía".to_string(),
            "Bloqueos en el transporte de banano".to_string(),
        ];

        let vectors = embedder.encode(&texts).await.unwrap();
        assert_eq!(vectors.len(), 2);
        for vector in &vectors {
            assert_eq!(vector.len(), 128);
            assert!((norm(vector) - 1.0).abs() < 1e-4);
        }
    }

    #[tokio::test]
    async fn test_deterministic() {
        let embedder = HashingEmbedder::new(64);
        let a = embedder.encode_one("rendimiento del maíz").await.unwrap();
        let b = embedder.encode_one("rendimiento del maíz").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_similar_texts_are_closer() {
        let embedder = HashingEmbedder::new(256);
        let query = embedder.encode_one("cosecha de cacao").await.unwrap();
        let near = embedder.encode_one("la cosecha de cacao aumentó").await.unwrap();
        let far = embedder.encode_one("exportación de flores").await.unwrap();

        let dist = |a: &[f32], b: &[f32]| -> f32 {
            a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
        };
        assert!(dist(&query, &near) < dist(&query, &far));
    }

    #[tokio::test]
    async fn test_empty_text_is_zero_vector() {
        let embedder = HashingEmbedder::new(32);
        let vector = embedder.encode_one("").await.unwrap();
        assert!(vector.iter().all(|&x| x == 0.0));
    }
}
