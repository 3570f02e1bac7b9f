//! # concierge-dialogue
//!
//! The dialogue orchestration core: the per-conversation turn state
//! machine and the flows built on top of retrieval.
//!
//! One inbound message is one turn. The [`DialogueEngine`] interprets the
//! message according to the session's current mode (menu navigation, free
//! question, feedback choice, NPS score), drives retrieval through the
//! topic duel, runs every candidate answer through the
//! [`ValidationGate`], and resolves every branch to a user-visible reply
//! and a well-defined next mode. [`ConciergeService`] wraps the engine
//! with the session store and the outbound sink, serializing turns per
//! conversation.

pub mod contracts;
pub mod engine;
pub mod error;
pub mod escalation;
pub mod feedback;
pub mod gate;
pub mod menu;
pub mod messages;
pub mod mock;
pub mod service;
pub mod sessions;

pub use contracts::{FeedbackSink, HumanHandoff, OutboundSink, Synthesizer};
pub use engine::DialogueEngine;
pub use error::DialogueError;
pub use escalation::EscalationManager;
pub use feedback::{FeedbackChoice, FeedbackCollector};
pub use gate::ValidationGate;
pub use menu::MenuNavigator;
pub use service::ConciergeService;
pub use sessions::SessionStore;
