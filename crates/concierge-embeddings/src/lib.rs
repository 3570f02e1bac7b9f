//! # concierge-embeddings
//!
//! Embedding service collaborators for the Concierge engine.
//!
//! The engine treats the embedding model as an external collaborator behind
//! the [`Embedder`] trait: questions are encoded into fixed-length vectors,
//! knowledge entries are encoded in batches at load time. Two
//! implementations are provided:
//! - [`ApiEmbedder`]: OpenAI-compatible embeddings endpoint
//! - [`HashingEmbedder`]: deterministic offline encoder for tests and
//!   air-gapped deployments

pub mod api;
pub mod embedder;
pub mod hashing;

pub use api::{ApiEmbedder, ApiEmbedderConfig};
pub use embedder::Embedder;
pub use hashing::HashingEmbedder;
