//! # concierge-types
//!
//! Shared domain types for the Concierge dialogue engine.
//!
//! This crate defines the data structures every other crate operates on:
//! - Sessions: per-conversation mutable state with an enumerated turn mode
//! - Menu: the immutable navigation tree of submenus and free-form leaves
//! - Knowledge: topic-grouped entries with precomputed embedding vectors
//! - Turns: the input/output contract with the transport layer
//! - Config: layered engine configuration
//! - Errors: the collaborator failure taxonomy

pub mod config;
pub mod error;
pub mod knowledge;
pub mod menu;
pub mod session;
pub mod turn;

pub use config::{
    ConciergeConfig, ConfigError, DialogueSettings, EmbeddingSettings, KeywordBoost, LlmSettings,
    RetrievalSettings,
};
pub use error::CollaboratorError;
pub use knowledge::{CandidateAnswer, KnowledgeBase, KnowledgeEntry, SharedKnowledge, TopicEntries};
pub use menu::{MenuChoice, MenuEntry, MenuNode, MenuTarget, MenuTree, NodeRef};
pub use session::{MenuContext, Session, TurnMode};
pub use turn::{AudioRef, ReplyTag, TurnInput, TurnOutput};
