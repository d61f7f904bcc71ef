//! Deterministic offline embedder
//!
//! Feature hashing of words and character trigrams into a fixed number of
//! buckets. No semantics, but texts sharing vocabulary land close together,
//! which is enough for dry runs and tests without network access.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use coldreach_core::Vector;

use crate::{EmbeddingProvider, ProviderError, Result};

pub const DEFAULT_HASH_DIM: usize = 256;

/// Embeds text by hashing its tokens
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dim: usize,
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self {
            dim: DEFAULT_HASH_DIM,
        }
    }
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(ProviderError::InvalidConfig(
                "hash embedder dimension must be positive".to_string(),
            ));
        }
        Ok(Self { dim })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// L2-normalized bucket counts; blank text maps to the zero vector
    pub fn embed_text(&self, text: &str) -> Vector {
        let mut buckets = vec![0.0f32; self.dim];
        let lowered = text.to_lowercase();

        for word in lowered.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
            buckets[self.bucket(word)] += 2.0;

            let chars: Vec<char> = format!(" {word} ").chars().collect();
            for window in chars.windows(3) {
                let trigram: String = window.iter().collect();
                buckets[self.bucket(&trigram)] += 1.0;
            }
        }

        let mut vector = Vector::new(buckets);
        vector.normalize();
        vector
    }

    fn bucket(&self, token: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        (hasher.finish() % self.dim as u64) as usize
    }
}

impl EmbeddingProvider for HashEmbedder {
    fn embed_many(&self, texts: &[String]) -> Result<Vec<Vector>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }

    fn embed_one(&self, text: &str) -> Result<Vector> {
        Ok(self.embed_text(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_and_normalized() {
        let embedder = HashEmbedder::default();
        let a = embedder.embed_text("Python, Machine Learning");
        let b = embedder.embed_text("Python, Machine Learning");

        assert_eq!(a, b);
        assert_eq!(a.dim(), DEFAULT_HASH_DIM);
        assert!((a.norm() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_shared_vocabulary_is_closer() {
        let embedder = HashEmbedder::default();
        let query = embedder.embed_text("python machine learning");
        let near = embedder.embed_text("Python, ML, machine learning pipelines");
        let far = embedder.embed_text("React, TypeScript, CSS");

        assert!(query.squared_l2(&near) < query.squared_l2(&far));
    }

    #[test]
    fn test_blank_text_is_zero() {
        assert!(HashEmbedder::default().embed_text("  ,  ").is_zero());
    }

    #[test]
    fn test_batch_matches_single() {
        let embedder = HashEmbedder::new(32).unwrap();
        let batch = embedder
            .embed_many(&["Go".to_string(), "Rust".to_string()])
            .unwrap();
        assert_eq!(batch[1], embedder.embed_one("Rust").unwrap());
        assert!(HashEmbedder::new(0).is_err());
    }
}
