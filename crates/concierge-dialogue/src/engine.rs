//! The turn state machine.

use std::sync::Arc;

use tracing::{info, warn};

use concierge_embeddings::Embedder;
use concierge_llm::{mask_sensitive, LanguageModel, Safety};
use concierge_retrieval::{RetrievalEngine, RetrievalOutcome, TopicResolver};
use concierge_types::{
    DialogueSettings, MenuTree, NodeRef, RetrievalSettings, Session, TurnInput, TurnMode,
    TurnOutput,
};

use crate::contracts::{FeedbackSink, HumanHandoff};
use crate::escalation::EscalationManager;
use crate::feedback::{parse_choice, parse_score, FeedbackChoice, FeedbackCollector};
use crate::gate::ValidationGate;
use crate::menu::MenuNavigator;
use crate::messages;

/// Drives one conversation turn from inbound text to reply and next mode.
///
/// Every branch resolves to a user-visible message and a well-defined next
/// mode; collaborator failures degrade per call site and never abort the
/// turn. The engine does not lock anything itself: the caller holds the
/// session's mutex for the whole turn (see
/// [`ConciergeService`](crate::service::ConciergeService)).
pub struct DialogueEngine {
    navigator: MenuNavigator,
    resolver: TopicResolver,
    retrieval: RetrievalEngine,
    gate: ValidationGate,
    escalation: EscalationManager,
    feedback: FeedbackCollector,
    embedder: Arc<dyn Embedder>,
    settings: DialogueSettings,
}

impl DialogueEngine {
    pub fn new(
        tree: Arc<MenuTree>,
        embedder: Arc<dyn Embedder>,
        model: Arc<dyn LanguageModel>,
        handoff: Arc<dyn HumanHandoff>,
        feedback_sink: Arc<dyn FeedbackSink>,
        retrieval: RetrievalSettings,
        dialogue: DialogueSettings,
    ) -> Self {
        let retrieval = RetrievalEngine::new(retrieval);
        Self {
            navigator: MenuNavigator::new(tree),
            resolver: TopicResolver::new(
                model.clone(),
                retrieval.clone(),
                dialogue.catch_all_topic.clone(),
            ),
            retrieval,
            gate: ValidationGate::new(model),
            escalation: EscalationManager::new(handoff, dialogue.default_sector.clone()),
            feedback: FeedbackCollector::new(feedback_sink),
            embedder,
            settings: dialogue,
        }
    }

    /// Process one turn. Returns `None` only for group messages, which are
    /// logged and kept silent.
    pub async fn process_turn(
        &self,
        session: &mut Session,
        input: &TurnInput,
    ) -> Option<TurnOutput> {
        let text = input.text.trim();
        let masked = mask_sensitive(text);

        if input.is_group {
            info!(
                conversation_id = %input.conversation_id,
                text = %masked,
                "Group message, staying silent"
            );
            return None;
        }

        info!(
            conversation_id = %input.conversation_id,
            mode = ?session.mode,
            text = %masked,
            "Turn received"
        );

        if self.is_reset_phrase(text) {
            session.reset();
            return Some(TurnOutput::menu(self.navigator.render(&NodeRef::Root)));
        }

        let output = match session.mode.clone() {
            TurnMode::Menu { .. } => match self.navigator.resolve(session, text) {
                Ok(reply) => TurnOutput::menu(reply),
                Err(_) => TurnOutput::error(messages::INVALID_OPTION),
            },
            TurnMode::AwaitingQuestion => self.handle_question(session, input, &masked).await,
            TurnMode::AwaitingFeedback { .. } => self.handle_feedback(session, input, text).await,
            TurnMode::AwaitingNps => self.handle_nps(session, input, text).await,
        };

        Some(output)
    }

    async fn handle_question(
        &self,
        session: &mut Session,
        input: &TurnInput,
        question: &str,
    ) -> TurnOutput {
        if self.is_transfer_phrase(question) {
            return self.escalate_and_reset(session, input).await;
        }

        if self.gate.screen_question(question).await == Safety::Unsafe {
            return TurnOutput::error(messages::PRIVACY_REFUSAL);
        }

        let base = session.knowledge.current();

        let question_vec = match self.embedder.encode(question).await {
            Ok(vector) => vector,
            Err(e) => {
                warn!(error = %e, "Embedding unavailable, treating turn as a miss");
                return self.miss(session, input, question).await;
            }
        };

        let topic = self
            .resolver
            .resolve(question, &question_vec, session.declared_topic(), &base)
            .await;

        let candidate = match self.retrieval.search(question, &question_vec, &topic, &base) {
            RetrievalOutcome::Match { candidate, .. } => candidate,
            RetrievalOutcome::Fallback { candidate } => candidate,
            RetrievalOutcome::NoMatch => return self.miss(session, input, question).await,
        };

        match self
            .gate
            .release(question, &candidate, Some(&input.display_name))
            .await
        {
            Some(reply) => self.deliver_answer(session, reply),
            None => self.miss(session, input, question).await,
        }
    }

    /// Commit a delivered answer: counters advance, and odd counts carry
    /// the feedback prompt (the first answer after a subtopic selection,
    /// then every other one).
    fn deliver_answer(&self, session: &mut Session, reply: String) -> TurnOutput {
        session.retry_count = 0;
        session.interaction_count += 1;

        if session.interaction_count % 2 != 0 {
            session.mode = TurnMode::AwaitingFeedback {
                escalation_offer: false,
            };
            TurnOutput::answer(format!("{reply}\n\n{}", messages::FEEDBACK_PROMPT))
        } else {
            session.mode = TurnMode::AwaitingQuestion;
            TurnOutput::answer(format!("{reply}\n\n{}", messages::ANOTHER_QUESTION_INVITE))
        }
    }

    /// A retrieval miss or a rejected answer: re-prompt once, then offer
    /// escalation.
    async fn miss(&self, session: &mut Session, input: &TurnInput, question: &str) -> TurnOutput {
        self.feedback
            .record_unanswered(question, &input.conversation_id)
            .await;

        if session.retry_count < self.settings.retry_cap {
            session.retry_count += 1;
            TurnOutput::menu(messages::REPHRASE_PROMPT)
        } else {
            session.retry_count = 0;
            session.mode = TurnMode::AwaitingFeedback {
                escalation_offer: true,
            };
            TurnOutput::menu(messages::ESCALATION_OFFER)
        }
    }

    async fn handle_feedback(
        &self,
        session: &mut Session,
        input: &TurnInput,
        text: &str,
    ) -> TurnOutput {
        match parse_choice(text) {
            Some(FeedbackChoice::Satisfied) => {
                session.mode = TurnMode::AwaitingNps;
                TurnOutput::menu(messages::NPS_PROMPT)
            }
            Some(FeedbackChoice::Dissatisfied) => self.escalate_and_reset(session, input).await,
            Some(FeedbackChoice::AnotherQuestion) => {
                session.reset();
                TurnOutput::menu(self.navigator.render(&NodeRef::Root))
            }
            None => TurnOutput::error(messages::INVALID_OPTION),
        }
    }

    async fn handle_nps(
        &self,
        session: &mut Session,
        input: &TurnInput,
        text: &str,
    ) -> TurnOutput {
        match parse_score(text) {
            Some(score) => {
                self.feedback
                    .record(score, text, &input.conversation_id)
                    .await;
                session.reset();
                TurnOutput::answer(messages::NPS_THANKS)
            }
            None => TurnOutput::error(messages::NPS_REPROMPT),
        }
    }

    async fn escalate_and_reset(&self, session: &mut Session, input: &TurnInput) -> TurnOutput {
        let sector = session.context.as_ref().map(|c| c.sector.clone());
        let message = self
            .escalation
            .escalate(&input.conversation_id, sector.as_deref())
            .await;
        session.reset();
        TurnOutput::answer(message)
    }

    fn is_reset_phrase(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.settings
            .reset_phrases
            .iter()
            .any(|phrase| lowered == *phrase)
    }

    fn is_transfer_phrase(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.settings
            .transfer_phrases
            .iter()
            .any(|phrase| lowered.contains(phrase.as_str()))
    }
}
