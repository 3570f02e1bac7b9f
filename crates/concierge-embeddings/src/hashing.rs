//! Deterministic offline embedder.
//!
//! Hashes word tokens into a fixed number of buckets and L2-normalizes the
//! resulting counts. Not a substitute for a real embedding model, but it is
//! deterministic, dependency-free, and gives related texts related vectors,
//! which is what the engine's tests and air-gapped deployments need.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;

use concierge_types::CollaboratorError;

use crate::embedder::Embedder;

/// Bag-of-words hashing embedder.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    /// Create an embedder producing vectors of `dimension` buckets.
    pub fn new(dimension: usize) -> Self {
        assert!(dimension > 0, "dimension must be positive");
        Self { dimension }
    }

    fn encode_sync(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];

        for token in tokenize(text) {
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            let bucket = (hasher.finish() as usize) % self.dimension;
            vector[bucket] += 1.0;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in vector.iter_mut() {
                *value /= norm;
            }
        }

        vector
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(256)
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(|token| token.to_lowercase())
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, CollaboratorError> {
        Ok(texts.iter().map(|text| self.encode_sync(text)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deterministic() {
        let embedder = HashingEmbedder::new(64);
        let a = embedder.encode("How do I request a refund?").await.unwrap();
        let b = embedder.encode("How do I request a refund?").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_normalized() {
        let embedder = HashingEmbedder::new(64);
        let v = embedder.encode("refund request form").await.unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_shared_words_raise_similarity() {
        let embedder = HashingEmbedder::new(256);
        let refund = embedder.encode("refund request deadline").await.unwrap();
        let related = embedder.encode("refund deadline for expenses").await.unwrap();
        let unrelated = embedder.encode("dental braces authorization").await.unwrap();

        let dot = |a: &[f32], b: &[f32]| -> f32 {
            a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
        };
        assert!(dot(&refund, &related) > dot(&refund, &unrelated));
    }

    #[tokio::test]
    async fn test_empty_text_is_zero_vector() {
        let embedder = HashingEmbedder::new(16);
        let v = embedder.encode("").await.unwrap();
        assert!(v.iter().all(|&x| x == 0.0));
    }

    #[tokio::test]
    async fn test_batch_preserves_order() {
        let embedder = HashingEmbedder::new(32);
        let texts = vec!["first".to_string(), "second".to_string()];
        let batch = embedder.encode_batch(&texts).await.unwrap();
        assert_eq!(batch[0], embedder.encode("first").await.unwrap());
        assert_eq!(batch[1], embedder.encode("second").await.unwrap());
    }
}
