//! Collaborator contracts for the dialogue flows.

use async_trait::async_trait;

use concierge_types::{AudioRef, CollaboratorError, TurnOutput};

/// Hands a conversation over to a human agent.
#[async_trait]
pub trait HumanHandoff: Send + Sync {
    /// Put the conversation into the sector's attendance queue.
    async fn enqueue(
        &self,
        conversation_id: &str,
        sector: &str,
    ) -> Result<(), CollaboratorError>;

    /// Number of conversations currently waiting for the sector.
    async fn queue_length(&self, sector: &str) -> Result<u32, CollaboratorError>;
}

/// Records user feedback and retrieval gaps.
#[async_trait]
pub trait FeedbackSink: Send + Sync {
    /// Record a 1-5 satisfaction score with the user's raw reply.
    async fn record_nps(
        &self,
        score: u8,
        comment: &str,
        conversation_id: &str,
    ) -> Result<(), CollaboratorError>;

    /// Record a question the knowledge base could not answer, so the
    /// support team can curate new entries.
    async fn record_unanswered(
        &self,
        question: &str,
        conversation_id: &str,
    ) -> Result<(), CollaboratorError>;
}

/// Delivers replies back through the transport layer.
#[async_trait]
pub trait OutboundSink: Send + Sync {
    async fn deliver(
        &self,
        conversation_id: &str,
        output: &TurnOutput,
    ) -> Result<(), CollaboratorError>;
}

/// Renders a reply as audio. Optional; failures are tolerated and the
/// reply goes out text-only.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<AudioRef, CollaboratorError>;
}
