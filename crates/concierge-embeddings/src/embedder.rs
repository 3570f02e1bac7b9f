//! The embedding collaborator contract.

use async_trait::async_trait;

use concierge_types::CollaboratorError;

/// Encodes text into fixed-length float vectors.
///
/// Implementations must be deterministic for a given model version: the same
/// text yields the same vector, so retrieval tiers and winners are
/// reproducible.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Encode a single text.
    async fn encode(&self, text: &str) -> Result<Vec<f32>, CollaboratorError> {
        let mut vectors = self.encode_batch(&[text.to_string()]).await?;
        vectors.pop().ok_or_else(|| {
            CollaboratorError::InvalidResponse("empty embedding batch".to_string())
        })
    }

    /// Encode a batch of texts, preserving order.
    async fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, CollaboratorError>;

    /// Vector dimension produced by this embedder.
    fn dimension(&self) -> usize;
}
