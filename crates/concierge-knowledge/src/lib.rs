//! # concierge-knowledge
//!
//! Curated knowledge base loading for the Concierge engine.
//!
//! The knowledge base lives in a TOML file maintained by the support team:
//! topics, each holding question/answer entries. [`TomlKnowledgeStore`]
//! parses the file, composes an embedding document per entry (the question
//! weighted above the answer), batch-encodes the documents through an
//! [`Embedder`](concierge_embeddings::Embedder), and produces the immutable
//! [`KnowledgeBase`](concierge_types::KnowledgeBase) the retrieval engine
//! searches. Reloads swap the whole base atomically.

pub mod similarity;
pub mod store;

pub use similarity::cosine_similarity;
pub use store::{KnowledgeError, KnowledgeStore, TomlKnowledgeStore};
