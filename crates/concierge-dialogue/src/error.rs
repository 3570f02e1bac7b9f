//! Dialogue error taxonomy.
//!
//! None of these terminate a conversation: every variant maps to a
//! user-visible message and a defined next mode inside the engine.

use thiserror::Error;

use concierge_types::CollaboratorError;

/// Errors raised while processing a turn.
#[derive(Debug, Error)]
pub enum DialogueError {
    /// Unrecognized menu option token; state unchanged.
    #[error("invalid menu input: {0}")]
    InvalidMenuInput(String),

    /// Retrieval found nothing above threshold.
    #[error("no knowledge entry matched the question")]
    NoMatch,

    /// A collaborator call failed; the call site degrades per its rules.
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}
