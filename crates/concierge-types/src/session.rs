//! Per-conversation session state.
//!
//! A session is keyed by conversation identifier and lives only in process
//! memory. Exactly one activity is in flight at a time, encoded as a single
//! `TurnMode` value rather than overlapping boolean flags, so impossible
//! combinations (awaiting feedback and awaiting a score at once) cannot be
//! represented.

use serde::{Deserialize, Serialize};

use crate::knowledge::SharedKnowledge;
use crate::menu::NodeRef;

/// What the next inbound message will be interpreted as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnMode {
    /// Navigating the menu; input is a numbered option for `node`.
    Menu {
        /// The node currently displayed.
        node: NodeRef,
    },

    /// Free-text answering mode; input is a question for retrieval.
    AwaitingQuestion,

    /// The three-way post-answer prompt is pending.
    AwaitingFeedback {
        /// Whether the prompt was the escalation-flavored variant shown
        /// after two consecutive retrieval misses.
        escalation_offer: bool,
    },

    /// A 1-5 satisfaction score is pending.
    AwaitingNps,
}

impl TurnMode {
    /// The initial mode: root menu.
    pub fn initial() -> Self {
        TurnMode::Menu {
            node: NodeRef::Root,
        }
    }
}

/// Sector/subtopic pair established when a specific menu leaf is entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuContext {
    /// The sector (top-level menu section) the user navigated into.
    pub sector: String,

    /// The terminal subtopic chosen, if any.
    #[serde(default)]
    pub subtopic: Option<String>,
}

/// Mutable state of one conversation.
#[derive(Debug, Clone)]
pub struct Session {
    /// Current turn mode; exactly one activity at a time.
    pub mode: TurnMode,

    /// Context set by menu navigation, cleared on reset.
    pub context: Option<MenuContext>,

    /// Bounded retry counter for retrieval misses (0 or 1).
    pub retry_count: u8,

    /// Parity counter controlling when the feedback prompt is appended.
    pub interaction_count: u32,

    /// Shared read-only knowledge handle, injected once and preserved across
    /// resets. Losing it would force a reload on the next turn.
    pub knowledge: SharedKnowledge,
}

impl Session {
    /// Create a fresh session at the root menu.
    pub fn new(knowledge: SharedKnowledge) -> Self {
        Self {
            mode: TurnMode::initial(),
            context: None,
            retry_count: 0,
            interaction_count: 0,
            knowledge,
        }
    }

    /// Clear all conversational state, preserving the knowledge handle.
    pub fn reset(&mut self) {
        self.mode = TurnMode::initial();
        self.context = None;
        self.retry_count = 0;
        self.interaction_count = 0;
    }

    /// The topic label the user has declared through navigation: the chosen
    /// subtopic if set, else the sector, else nothing.
    pub fn declared_topic(&self) -> Option<&str> {
        let context = self.context.as_ref()?;
        let topic = context
            .subtopic
            .as_deref()
            .unwrap_or(context.sector.as_str())
            .trim();
        if topic.is_empty() {
            None
        } else {
            Some(topic)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_clears_everything_but_knowledge() {
        let mut session = Session::new(SharedKnowledge::default());
        session.mode = TurnMode::AwaitingNps;
        session.context = Some(MenuContext {
            sector: "Billing".to_string(),
            subtopic: Some("Refunds".to_string()),
        });
        session.retry_count = 1;
        session.interaction_count = 7;

        session.reset();

        assert_eq!(session.mode, TurnMode::initial());
        assert!(session.context.is_none());
        assert_eq!(session.retry_count, 0);
        assert_eq!(session.interaction_count, 0);
    }

    #[test]
    fn test_declared_topic_prefers_subtopic() {
        let mut session = Session::new(SharedKnowledge::default());
        assert_eq!(session.declared_topic(), None);

        session.context = Some(MenuContext {
            sector: "Billing".to_string(),
            subtopic: None,
        });
        assert_eq!(session.declared_topic(), Some("Billing"));

        session.context = Some(MenuContext {
            sector: "Billing".to_string(),
            subtopic: Some("Refunds".to_string()),
        });
        assert_eq!(session.declared_topic(), Some("Refunds"));
    }

    #[test]
    fn test_declared_topic_ignores_blank_sector() {
        let mut session = Session::new(SharedKnowledge::default());
        session.context = Some(MenuContext {
            sector: "   ".to_string(),
            subtopic: None,
        });
        assert_eq!(session.declared_topic(), None);
    }
}
