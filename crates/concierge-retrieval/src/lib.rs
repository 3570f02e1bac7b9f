//! # concierge-retrieval
//!
//! Tiered similarity retrieval over the curated knowledge base.
//!
//! Retrieval is anchored to a topic: the [`TopicResolver`] decides which
//! topic a question belongs to (the user's menu choice duels the language
//! model's classification), then the [`RetrievalEngine`] scores the
//! question against that topic's entries and classifies the best match into
//! a confidence tier. Questions that miss their topic get one global pass
//! across the rest of the base before the engine reports no match.

pub mod engine;
pub mod resolver;

pub use engine::{MatchTier, RetrievalEngine, RetrievalOutcome};
pub use resolver::TopicResolver;
