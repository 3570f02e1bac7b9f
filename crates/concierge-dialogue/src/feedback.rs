//! Post-answer feedback and NPS capture.

use std::sync::Arc;

use tracing::{info, warn};

use crate::contracts::FeedbackSink;

/// The three-way choice offered after a delivered answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackChoice {
    /// Satisfied; proceed to the NPS question.
    Satisfied,
    /// Dissatisfied; escalate to a human agent.
    Dissatisfied,
    /// The user has another question; back to the menu.
    AnotherQuestion,
}

/// Parses feedback turns and records scores.
pub struct FeedbackCollector {
    sink: Arc<dyn FeedbackSink>,
}

impl FeedbackCollector {
    pub fn new(sink: Arc<dyn FeedbackSink>) -> Self {
        Self { sink }
    }

    /// Record a validated 1-5 score. Sink failures are logged; the user
    /// still gets the closing message.
    pub async fn record(&self, score: u8, comment: &str, conversation_id: &str) {
        info!(conversation_id, score, "NPS recorded");
        if let Err(e) = self.sink.record_nps(score, comment, conversation_id).await {
            warn!(error = %e, "Failed to persist NPS score");
        }
    }

    /// Record a question retrieval could not answer.
    pub async fn record_unanswered(&self, question: &str, conversation_id: &str) {
        if let Err(e) = self.sink.record_unanswered(question, conversation_id).await {
            warn!(error = %e, "Failed to persist unanswered question");
        }
    }
}

/// Parse the three-way feedback choice from the reply's first token.
pub fn parse_choice(input: &str) -> Option<FeedbackChoice> {
    let token = input
        .split_whitespace()
        .next()
        .unwrap_or("")
        .trim_end_matches('.');
    match token {
        "1" => Some(FeedbackChoice::Satisfied),
        "2" => Some(FeedbackChoice::Dissatisfied),
        "3" => Some(FeedbackChoice::AnotherQuestion),
        _ => None,
    }
}

/// Extract a 1-5 score from the start of an NPS reply.
///
/// The digits found in the first few characters are read as one number and
/// range-checked whole, so "5, great service" parses while "12" is out of
/// range rather than a 1. A score buried in a long sentence does not count
/// as deliberate.
pub fn parse_score(input: &str) -> Option<u8> {
    let digits: String = input
        .trim()
        .chars()
        .take(5)
        .filter(|c| c.is_ascii_digit())
        .collect();
    let score = digits.parse::<u32>().ok()?;
    (1..=5).contains(&score).then_some(score as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockFeedbackSink;

    #[test]
    fn test_parse_choice() {
        assert_eq!(parse_choice("1"), Some(FeedbackChoice::Satisfied));
        assert_eq!(parse_choice("2."), Some(FeedbackChoice::Dissatisfied));
        assert_eq!(parse_choice(" 3 thanks"), Some(FeedbackChoice::AnotherQuestion));
        assert_eq!(parse_choice("4"), None);
        assert_eq!(parse_choice("yes"), None);
        assert_eq!(parse_choice(""), None);
    }

    #[test]
    fn test_parse_score_accepts_one_to_five() {
        for (input, expected) in [
            ("1", Some(1)),
            ("5", Some(5)),
            ("5, great service", Some(5)),
            ("  4  ", Some(4)),
            ("0", None),
            ("6", None),
            ("12", None),
            ("abc", None),
            ("I would say it deserves a 5", None),
        ] {
            assert_eq!(parse_score(input), expected, "input: {input:?}");
        }
    }

    #[tokio::test]
    async fn test_record_reaches_sink() {
        let sink = Arc::new(MockFeedbackSink::new());
        let collector = FeedbackCollector::new(sink.clone());

        collector.record(5, "5 all good", "user-1").await;

        assert_eq!(
            sink.scores(),
            vec![(5, "5 all good".to_string(), "user-1".to_string())]
        );
    }

    #[tokio::test]
    async fn test_sink_failure_tolerated() {
        let sink = Arc::new(MockFeedbackSink::new().failing());
        let collector = FeedbackCollector::new(sink);

        // Must not panic or propagate.
        collector.record(3, "3", "user-1").await;
        collector.record_unanswered("q", "user-1").await;
    }
}
