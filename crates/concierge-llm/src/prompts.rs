//! Prompt builders for the triage and rewrite models.
//!
//! Prompts are assembled here rather than inline in the API client so the
//! wording can be reviewed and tested without touching transport code.

use crate::model::RewriteContext;

/// Prompt the triage model to pick one of the curated topic labels.
pub fn classification_prompt(question: &str, labels: &[String]) -> String {
    let mut listed = String::new();
    for label in labels {
        listed.push_str("- ");
        listed.push_str(label);
        listed.push('\n');
    }
    format!(
        "You route employee questions to internal support topics.\n\
         Pick the single topic below that best covers the question.\n\
         Answer with the topic name exactly as written, nothing else.\n\
         If none of the topics covers the question, answer NONE.\n\n\
         Topics:\n{listed}\n\
         Question: {question}"
    )
}

/// Prompt the triage model to flag personal data in a question.
pub fn privacy_prompt(question: &str) -> String {
    format!(
        "Does the following message contain personal data such as a\n\
         taxpayer number, registration number, email address, phone number,\n\
         or health details about a named person?\n\
         Answer only YES or NO.\n\n\
         Message: {question}"
    )
}

/// Prompt the rewrite model to rephrase a stored answer conversationally.
pub fn rewrite_prompt(raw_answer: &str, question: &str, context: &RewriteContext) -> String {
    let addressee = match &context.display_name {
        Some(name) if !name.trim().is_empty() => format!("Address the user as {name}. "),
        _ => String::new(),
    };
    let topic = match &context.topic {
        Some(topic) if !topic.trim().is_empty() => format!("The topic is {topic}. "),
        _ => String::new(),
    };
    format!(
        "Rephrase the reference answer below as a short, warm reply to the\n\
         user's question. {addressee}{topic}Do not add facts, numbers, dates,\n\
         or steps that are not in the reference answer. Do not remove any\n\
         instruction the reference answer gives.\n\n\
         Question: {question}\n\n\
         Reference answer:\n{raw_answer}"
    )
}

/// Prompt the triage model to judge whether a reply addresses the question.
///
/// The model is asked for a short REASONING line followed by a VERDICT line
/// so the verdict can be parsed even when the model editorializes.
pub fn verification_prompt(question: &str, answer: &str) -> String {
    format!(
        "Judge whether the reply below actually answers the user's\n\
         question. Reject replies about a different subject, even when they\n\
         politely mention forwarding the user elsewhere.\n\
         Respond in exactly this format:\n\
         REASONING: <one sentence>\n\
         VERDICT: <APPROVED or REJECTED>\n\n\
         Question: {question}\n\n\
         Reply:\n{answer}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_prompt_lists_labels() {
        let labels = vec!["Payroll".to_string(), "Benefits".to_string()];
        let prompt = classification_prompt("when is payday?", &labels);
        assert!(prompt.contains("- Payroll"));
        assert!(prompt.contains("- Benefits"));
        assert!(prompt.contains("when is payday?"));
        assert!(prompt.contains("NONE"));
    }

    #[test]
    fn test_rewrite_prompt_includes_name_and_topic() {
        let context = RewriteContext {
            display_name: Some("Ana".to_string()),
            topic: Some("Payroll".to_string()),
        };
        let prompt = rewrite_prompt("Payday is the 5th.", "when is payday?", &context);
        assert!(prompt.contains("Address the user as Ana."));
        assert!(prompt.contains("The topic is Payroll."));
    }

    #[test]
    fn test_rewrite_prompt_omits_blank_name() {
        let context = RewriteContext {
            display_name: Some("  ".to_string()),
            topic: None,
        };
        let prompt = rewrite_prompt("a", "b", &context);
        assert!(!prompt.contains("Address the user"));
    }

    #[test]
    fn test_verification_prompt_requests_format() {
        let prompt = verification_prompt("src", "out");
        assert!(prompt.contains("REASONING:"));
        assert!(prompt.contains("VERDICT:"));
    }
}
