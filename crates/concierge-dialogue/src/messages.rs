//! User-facing copy.
//!
//! Every fixed phrase the engine sends lives here, so the wording can be
//! reviewed in one place and the flow code stays readable.

/// Header shown above the root menu.
pub const ROOT_HEADER: &str =
    "Hello! I can help with questions about our internal services. Pick a number:";

/// Footer reminding the user how to get back.
pub const MENU_FOOTER: &str = "Type \"menu\" at any time to start over.";

/// Reply to an unrecognized menu option.
pub const INVALID_OPTION: &str =
    "I didn't recognize that option. Please reply with one of the numbers shown.";

/// Fixed refusal when the privacy screen flags the question.
pub const PRIVACY_REFUSAL: &str =
    "I can't help with requests involving personal data about other people. \
     If you need something like that, please contact the responsible team directly.";

/// First-miss reprompt.
pub const REPHRASE_PROMPT: &str =
    "I couldn't find a good answer for that. Could you rephrase your question \
     with a few more details?";

/// Second-miss prompt, escalation-flavored. Same 1/2/3 mapping as the
/// regular feedback prompt.
pub const ESCALATION_OFFER: &str = "I still couldn't find an answer. What would you like to do?\n\
     1. It's fine, wrap up\n\
     2. Talk to a human agent\n\
     3. Back to the menu";

/// Three-way prompt appended after a delivered answer.
pub const FEEDBACK_PROMPT: &str = "Did that solve your question?\n\
     1. Yes, all good\n\
     2. No, I'd like to talk to an agent\n\
     3. I have another question";

/// Invitation appended after a delivered answer when no feedback is due.
pub const ANOTHER_QUESTION_INVITE: &str = "If you have another question, just type it.";

/// NPS request after a satisfied feedback choice.
pub const NPS_PROMPT: &str =
    "Great! Before you go, how would you rate this service from 1 to 5?";

/// Reprompt for an unparseable NPS reply.
pub const NPS_REPROMPT: &str = "Please reply with a single number from 1 to 5.";

/// Closing message after a recorded score.
pub const NPS_THANKS: &str =
    "Thank you! Whenever you need us again, just say hi.";

/// Prompt shown when the session enters free-text mode.
pub fn free_text_prompt(sector: &str, subtopic: Option<&str>) -> String {
    match subtopic {
        Some(subtopic) => format!(
            "You're in {sector}, about \"{subtopic}\". Go ahead and type your question."
        ),
        None => format!("You're in {sector}. Go ahead and type your question."),
    }
}

/// Escalation confirmation carrying the queue-time estimate.
pub fn escalation_message(estimate: &str) -> String {
    format!(
        "I'm transferring you to a human agent. Estimated wait: {estimate}. \
         They will continue from here."
    )
}

/// Map a queue length to the coarse textual estimate.
pub fn queue_estimate(length: u32) -> &'static str {
    match length {
        0..=2 => "under 10 minutes",
        3..=5 => "15 to 30 minutes",
        _ => "over 45 minutes",
    }
}

/// Estimate used when the queue length cannot be obtained.
pub const QUEUE_ESTIMATE_UNKNOWN: &str = "a few minutes";

/// Note naming the responsible sector, appended to answers that have one.
pub fn sector_note(sector: &str) -> String {
    format!("If you need more help with this, the {sector} team is the one to ask.")
}
