//! Service layer tying sessions, the engine, and delivery together.

use std::sync::Arc;

use tracing::warn;

use concierge_types::{ReplyTag, TurnInput, TurnOutput};

use crate::contracts::{OutboundSink, Synthesizer};
use crate::engine::DialogueEngine;
use crate::sessions::SessionStore;

/// Entry point the transport layer calls with inbound messages.
///
/// Holds the per-conversation session lock across the whole turn, so turns
/// for one conversation are processed strictly in arrival order while
/// different conversations proceed concurrently.
pub struct ConciergeService {
    store: SessionStore,
    engine: DialogueEngine,
    outbound: Arc<dyn OutboundSink>,
    synthesizer: Option<Arc<dyn Synthesizer>>,
}

impl ConciergeService {
    pub fn new(store: SessionStore, engine: DialogueEngine, outbound: Arc<dyn OutboundSink>) -> Self {
        Self {
            store,
            engine,
            outbound,
            synthesizer: None,
        }
    }

    /// Attach an audio synthesizer; answers will carry an audio rendition
    /// when synthesis succeeds.
    pub fn with_synthesizer(mut self, synthesizer: Arc<dyn Synthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    /// The session store, for introspection.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Process one inbound message end to end and deliver the reply.
    ///
    /// Returns the reply that was (or would be) delivered; `None` for group
    /// messages. Delivery failures are logged, not propagated: the turn's
    /// state transition has already committed.
    pub async fn handle_message(&self, input: TurnInput) -> Option<TurnOutput> {
        let session = self.store.get_or_create(&input.conversation_id).await;
        let mut guard = session.lock().await;
        let output = self.engine.process_turn(&mut guard, &input).await;
        drop(guard);

        let mut output = output?;

        if output.tag == ReplyTag::Answer {
            if let Some(synthesizer) = &self.synthesizer {
                match synthesizer.synthesize(&output.text).await {
                    Ok(audio) => output.audio = Some(audio),
                    Err(e) => warn!(error = %e, "Audio synthesis failed, sending text only"),
                }
            }
        }

        if let Err(e) = self.outbound.deliver(&input.conversation_id, &output).await {
            warn!(
                error = %e,
                conversation_id = %input.conversation_id,
                "Outbound delivery failed"
            );
        }

        Some(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockFeedbackSink, MockHandoff, MockOutbound, MockSynthesizer};
    use concierge_embeddings::HashingEmbedder;
    use concierge_llm::MockModel;
    use concierge_types::{
        DialogueSettings, MenuEntry, MenuNode, MenuTree, RetrievalSettings, SharedKnowledge,
    };

    fn service(outbound: Arc<MockOutbound>) -> ConciergeService {
        let tree = Arc::new(MenuTree::new(vec![MenuEntry {
            name: "Anything".to_string(),
            top_level: true,
            node: MenuNode::FreeForm {
                prompt: "Ask away.".to_string(),
            },
        }]));
        let knowledge = SharedKnowledge::default();
        let engine = DialogueEngine::new(
            tree,
            Arc::new(HashingEmbedder::new(16)),
            Arc::new(MockModel::new()),
            Arc::new(MockHandoff::new()),
            Arc::new(MockFeedbackSink::new()),
            RetrievalSettings::default(),
            DialogueSettings::default(),
        );
        ConciergeService::new(SessionStore::new(knowledge), engine, outbound)
    }

    fn input(text: &str) -> TurnInput {
        TurnInput {
            conversation_id: "user-1".to_string(),
            display_name: String::new(),
            text: text.to_string(),
            is_group: false,
        }
    }

    #[tokio::test]
    async fn test_reply_is_delivered_through_the_sink() {
        let outbound = Arc::new(MockOutbound::new());
        let service = service(outbound.clone());

        let reply = service.handle_message(input("menu")).await.unwrap();
        assert_eq!(reply.tag, ReplyTag::Menu);

        let delivered = outbound.delivered();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].0, "user-1");
        assert_eq!(delivered[0].1.text, reply.text);
    }

    #[tokio::test]
    async fn test_group_messages_are_not_delivered() {
        let outbound = Arc::new(MockOutbound::new());
        let service = service(outbound.clone());

        let mut message = input("hello");
        message.is_group = true;
        assert!(service.handle_message(message).await.is_none());
        assert!(outbound.delivered().is_empty());
    }

    #[tokio::test]
    async fn test_synthesizer_failure_sends_text_only() {
        let outbound = Arc::new(MockOutbound::new());
        let service =
            service(outbound.clone()).with_synthesizer(Arc::new(MockSynthesizer::new().failing()));

        // Menu replies never get audio; this exercises the non-answer path
        // plus a failing synthesizer leaves answers intact.
        let reply = service.handle_message(input("menu")).await.unwrap();
        assert!(reply.audio.is_none());
    }

    #[tokio::test]
    async fn test_turns_for_one_user_share_one_session() {
        let outbound = Arc::new(MockOutbound::new());
        let service = service(outbound);

        service.handle_message(input("menu")).await;
        service.handle_message(input("1")).await;
        assert_eq!(service.store().len().await, 1);
    }
}
