//! The answer validation gate.
//!
//! Every candidate answer passes three checks before release: the privacy
//! screen on the incoming question, humanization of the raw answer, and
//! pertinence verification of the humanized reply. Each check degrades
//! safely when the language model is unreachable: the privacy screen lets
//! the turn proceed (and logs the degradation), humanization falls back to
//! the raw text (which is still verified), verification fails closed.

use std::sync::Arc;

use tracing::{info, warn};

use concierge_llm::{LanguageModel, RewriteContext, Safety, Verdict};
use concierge_types::CandidateAnswer;

use crate::messages;

/// Gates candidate answers behind privacy, humanization, and verification.
pub struct ValidationGate {
    model: Arc<dyn LanguageModel>,
}

impl ValidationGate {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Screen the incoming question once per turn, before retrieval.
    ///
    /// An unreachable screen is logged and the turn proceeds as safe; only
    /// an explicit "unsafe" classification blocks the question.
    pub async fn screen_question(&self, question: &str) -> Safety {
        match self.model.check_privacy(question).await {
            Ok(safety) => safety,
            Err(e) => {
                warn!(error = %e, "Privacy screen unreachable, proceeding without it");
                Safety::Safe
            }
        }
    }

    /// Humanize and verify a candidate. Returns the releasable reply text,
    /// or `None` when verification rejects it.
    pub async fn release(
        &self,
        question: &str,
        candidate: &CandidateAnswer,
        display_name: Option<&str>,
    ) -> Option<String> {
        let note = sector_note(candidate);

        let context = RewriteContext {
            display_name: display_name
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(String::from),
            topic: Some(candidate.topic.clone()),
        };

        let humanized = match self
            .model
            .rewrite(&candidate.entry.answer, question, &context)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Humanization unavailable, falling back to raw answer");
                candidate.entry.answer.clone()
            }
        };

        // The raw fallback goes through verification like any other reply;
        // only an approved answer leaves the gate.
        let reply = with_note(&humanized, note.as_deref());

        match self.model.verify(question, &reply).await {
            Ok(Verdict::Approved) => Some(reply),
            Ok(verdict) => {
                info!(
                    verdict = verdict.as_str(),
                    topic = %candidate.topic,
                    "Answer rejected by verification"
                );
                None
            }
            Err(e) => {
                warn!(error = %e, "Verification unavailable, rejecting answer");
                None
            }
        }
    }
}

/// The responsible-sector note, when the entry names a real sector.
fn sector_note(candidate: &CandidateAnswer) -> Option<String> {
    let sector = candidate.entry.sector.as_deref()?.trim();
    if sector.is_empty() || sector == "-" || sector.eq_ignore_ascii_case("n/a") {
        return None;
    }
    Some(messages::sector_note(sector))
}

fn with_note(text: &str, note: Option<&str>) -> String {
    match note {
        Some(note) => format!("{text}\n\n{note}"),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concierge_llm::MockModel;
    use concierge_types::KnowledgeEntry;

    fn candidate(sector: Option<&str>) -> CandidateAnswer {
        CandidateAnswer {
            entry: KnowledgeEntry {
                question: "How do I request a reimbursement?".to_string(),
                answer: "Fill out form R-1 in the portal.".to_string(),
                reference: None,
                sector: sector.map(String::from),
                embedding: vec![],
            },
            topic: "Billing".to_string(),
            score: 0.8,
        }
    }

    #[tokio::test]
    async fn test_approved_answer_released_with_sector_note() {
        let gate = ValidationGate::new(Arc::new(
            MockModel::new().with_rewrite("Here's how: fill out form R-1."),
        ));

        let reply = gate
            .release("how do I get reimbursed?", &candidate(Some("Billing Desk")), None)
            .await
            .unwrap();
        assert!(reply.starts_with("Here's how"));
        assert!(reply.contains("Billing Desk"));
    }

    #[tokio::test]
    async fn test_rejected_answer_withheld() {
        let gate = ValidationGate::new(Arc::new(
            MockModel::new().with_verdict(Verdict::Rejected),
        ));
        assert!(gate
            .release("unrelated question", &candidate(None), None)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_undetermined_counts_as_rejected() {
        let gate = ValidationGate::new(Arc::new(
            MockModel::new().with_verdict(Verdict::Undetermined),
        ));
        assert!(gate.release("q", &candidate(None), None).await.is_none());
    }

    #[tokio::test]
    async fn test_verification_failure_fails_closed() {
        let gate = ValidationGate::new(Arc::new(MockModel::new().failing_verify()));
        assert!(gate.release("q", &candidate(None), None).await.is_none());
    }

    #[tokio::test]
    async fn test_rewrite_failure_falls_back_to_raw_text() {
        let model = Arc::new(MockModel::new().failing_rewrite());
        let gate = ValidationGate::new(model.clone());

        let reply = gate
            .release("q", &candidate(Some("Billing Desk")), None)
            .await
            .unwrap();
        assert!(reply.starts_with("Fill out form R-1"));
        assert!(reply.contains("Billing Desk"));
        // The raw fallback is verified like any other reply.
        assert_eq!(model.verify_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_raw_fallback_withheld() {
        let model = Arc::new(
            MockModel::new()
                .failing_rewrite()
                .with_verdict(Verdict::Rejected),
        );
        let gate = ValidationGate::new(model.clone());

        assert!(gate.release("q", &candidate(None), None).await.is_none());
        assert_eq!(model.verify_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_placeholder_sector_suppressed() {
        let gate = ValidationGate::new(Arc::new(MockModel::new()));
        for placeholder in [Some("-"), Some("  "), Some("N/A"), None] {
            let reply = gate
                .release("q", &candidate(placeholder), None)
                .await
                .unwrap();
            assert!(!reply.contains("team is the one to ask"));
        }
    }

    #[tokio::test]
    async fn test_privacy_screen_degrades_to_safe() {
        let gate = ValidationGate::new(Arc::new(MockModel::new().failing_privacy()));
        assert_eq!(gate.screen_question("q").await, Safety::Safe);
    }

    #[tokio::test]
    async fn test_privacy_screen_blocks_unsafe() {
        let gate = ValidationGate::new(Arc::new(
            MockModel::new().with_privacy(Safety::Unsafe),
        ));
        assert_eq!(gate.screen_question("q").await, Safety::Unsafe);
    }
}
