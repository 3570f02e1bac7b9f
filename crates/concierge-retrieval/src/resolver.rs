//! Topic resolution: the user's menu choice versus the model's read.
//!
//! Users routinely pick a menu sector and then ask about something else.
//! Before searching, the question is classified by the language model and
//! the two candidate topics duel: the model's suggestion displaces the
//! user's declared topic only when it scores strictly better for this
//! question. Classification is advisory, so any model failure falls back to
//! the user's choice.

use std::sync::Arc;

use tracing::{debug, warn};

use concierge_llm::LanguageModel;
use concierge_types::KnowledgeBase;

use crate::engine::RetrievalEngine;

/// Decides which topic anchors retrieval for a question.
pub struct TopicResolver {
    model: Arc<dyn LanguageModel>,
    engine: RetrievalEngine,
    catch_all_topic: String,
}

impl TopicResolver {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        engine: RetrievalEngine,
        catch_all_topic: impl Into<String>,
    ) -> Self {
        Self {
            model,
            engine,
            catch_all_topic: catch_all_topic.into(),
        }
    }

    /// Resolve the anchor topic for `question`.
    ///
    /// `declared_topic` is the user's current menu position, if any. The
    /// returned label always names an existing topic when the base has one
    /// to offer; the catch-all label is the last resort.
    pub async fn resolve(
        &self,
        question: &str,
        question_vec: &[f32],
        declared_topic: Option<&str>,
        base: &KnowledgeBase,
    ) -> String {
        let declared = declared_topic
            .map(str::trim)
            .filter(|topic| base.topic(topic).is_some());

        let suggested = self.classify(question, base).await;
        let suggested = suggested
            .as_deref()
            .map(str::trim)
            .filter(|topic| base.topic(topic).is_some());

        match (declared, suggested) {
            (None, None) => self.catch_all_topic.clone(),
            (Some(user), None) => user.to_string(),
            (None, Some(model)) => model.to_string(),
            (Some(user), Some(model)) => {
                if model == user || model == self.catch_all_topic {
                    return user.to_string();
                }
                self.duel(question, question_vec, user, model, base)
            }
        }
    }

    async fn classify(&self, question: &str, base: &KnowledgeBase) -> Option<String> {
        let labels: Vec<String> = base
            .topic_labels()
            .iter()
            .filter(|label| **label != self.catch_all_topic)
            .map(|label| label.to_string())
            .collect();
        if labels.is_empty() {
            return None;
        }

        match self.model.classify(question, &labels).await {
            Ok(label) => label,
            Err(e) => {
                warn!(error = %e, "Topic classification unavailable, keeping declared topic");
                None
            }
        }
    }

    /// The duel: the model's topic wins only on a strictly greater best
    /// score. Ties and misses go to the user.
    fn duel(
        &self,
        question: &str,
        question_vec: &[f32],
        user_topic: &str,
        model_topic: &str,
        base: &KnowledgeBase,
    ) -> String {
        let user_score = self
            .engine
            .topic_score(question, question_vec, base, user_topic)
            .unwrap_or(f32::MIN);
        let model_score = self
            .engine
            .topic_score(question, question_vec, base, model_topic)
            .unwrap_or(f32::MIN);

        let winner = if model_score > user_score {
            model_topic
        } else {
            user_topic
        };
        debug!(
            user_topic,
            model_topic, user_score, model_score, winner, "Topic duel resolved"
        );
        winner.to_string()
    }
}
