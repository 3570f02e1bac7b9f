//! The language model collaborator contract.

use async_trait::async_trait;

use concierge_types::CollaboratorError;

/// Outcome of auditing a candidate reply against the user's question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The reply actually addresses the question.
    Approved,
    /// The reply is on a different subject.
    Rejected,
    /// The model's output could not be parsed into a verdict.
    Undetermined,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Approved => "approved",
            Verdict::Rejected => "rejected",
            Verdict::Undetermined => "undetermined",
        }
    }
}

/// Outcome of the privacy screen on an inbound question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Safety {
    /// No personal data detected.
    Safe,
    /// The question carries personal data and must be refused.
    Unsafe,
}

/// Context handed to [`LanguageModel::rewrite`] so the rephrasing can
/// address the user and stay inside the declared topic.
#[derive(Debug, Clone, Default)]
pub struct RewriteContext {
    /// User's display name, when known.
    pub display_name: Option<String>,
    /// Topic the answer belongs to.
    pub topic: Option<String>,
}

/// Performs the judgment calls the engine cannot make deterministically.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Classify a question onto one of `labels`.
    ///
    /// Returns `Ok(Some(label))` with one of the provided labels,
    /// `Ok(None)` when the model declines to pick any of them.
    async fn classify(
        &self,
        question: &str,
        labels: &[String],
    ) -> Result<Option<String>, CollaboratorError>;

    /// Screen a question for personal data.
    async fn check_privacy(&self, question: &str) -> Result<Safety, CollaboratorError>;

    /// Rephrase a stored answer conversationally, constrained to the facts
    /// present in `raw_answer`.
    async fn rewrite(
        &self,
        raw_answer: &str,
        question: &str,
        context: &RewriteContext,
    ) -> Result<String, CollaboratorError>;

    /// Judge whether `answer` actually addresses `question`. Replies on a
    /// different subject are rejected even when they mention a redirect.
    async fn verify(
        &self,
        question: &str,
        answer: &str,
    ) -> Result<Verdict, CollaboratorError>;
}

/// Match a model-produced label against the curated label set.
///
/// Models paraphrase: "Travel & Expenses" may come back as "travel and
/// expenses" or wrapped in a sentence. Accept a case-insensitive exact match
/// first, then containment either way for labels long enough that
/// containment is not accidental.
pub fn match_topic_label(raw: &str, labels: &[String]) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let raw_lower = raw.to_lowercase();

    for label in labels {
        if label.trim().to_lowercase() == raw_lower {
            return Some(label.clone());
        }
    }

    for label in labels {
        let label_lower = label.trim().to_lowercase();
        if (label_lower.len() > 5 && raw_lower.contains(&label_lower))
            || (raw_lower.len() > 5 && label_lower.contains(&raw_lower))
        {
            return Some(label.clone());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> Vec<String> {
        vec![
            "Travel and Expenses".to_string(),
            "Benefits".to_string(),
            "Payroll".to_string(),
        ]
    }

    #[test]
    fn test_exact_match_case_insensitive() {
        assert_eq!(
            match_topic_label("payroll", &labels()),
            Some("Payroll".to_string())
        );
    }

    #[test]
    fn test_containment_for_long_labels() {
        assert_eq!(
            match_topic_label("The topic is travel and expenses.", &labels()),
            Some("Travel and Expenses".to_string())
        );
    }

    #[test]
    fn test_short_fragments_do_not_match_by_containment() {
        // "roll" is inside "Payroll" but too short to be meaningful.
        assert_eq!(match_topic_label("roll", &labels()), None);
    }

    #[test]
    fn test_no_match() {
        assert_eq!(match_topic_label("astrology", &labels()), None);
    }

    #[test]
    fn test_empty_is_none() {
        assert_eq!(match_topic_label("  ", &labels()), None);
    }

    #[test]
    fn test_verdict_as_str() {
        assert_eq!(Verdict::Approved.as_str(), "approved");
        assert_eq!(Verdict::Rejected.as_str(), "rejected");
        assert_eq!(Verdict::Undetermined.as_str(), "undetermined");
    }
}
