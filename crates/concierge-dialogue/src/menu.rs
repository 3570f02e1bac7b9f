//! Menu tree navigation.

use std::sync::Arc;

use tracing::debug;

use concierge_types::{MenuContext, MenuNode, MenuTarget, MenuTree, NodeRef, Session, TurnMode};

use crate::error::DialogueError;
use crate::messages;

/// Renders menu nodes and resolves numbered option input against them.
///
/// The navigator mutates the session only on a recognized option; invalid
/// input leaves the session exactly as it was.
pub struct MenuNavigator {
    tree: Arc<MenuTree>,
}

impl MenuNavigator {
    pub fn new(tree: Arc<MenuTree>) -> Self {
        Self { tree }
    }

    /// Display text for a node: numbered options for the root and for
    /// submenus, the free-form prompt for leaves.
    pub fn render(&self, node: &NodeRef) -> String {
        match node {
            NodeRef::Root => {
                let mut text = String::from(messages::ROOT_HEADER);
                for (index, name) in self.tree.top_level_names().iter().enumerate() {
                    text.push_str(&format!("\n{}. {}", index + 1, name));
                }
                text.push_str("\n\n");
                text.push_str(messages::MENU_FOOTER);
                text
            }
            NodeRef::Named(name) => match self.tree.node(name) {
                Some(MenuNode::Submenu { choices }) => {
                    let mut text = format!("{name} — pick an option:");
                    for (index, choice) in choices.iter().enumerate() {
                        text.push_str(&format!("\n{}. {}", index + 1, choice.label));
                    }
                    text.push_str("\n\n");
                    text.push_str(messages::MENU_FOOTER);
                    text
                }
                Some(MenuNode::FreeForm { prompt }) => prompt.clone(),
                None => self.render(&NodeRef::Root),
            },
        }
    }

    /// Resolve one input token against the session's current menu node.
    ///
    /// The token is the first whitespace-delimited word with any trailing
    /// period stripped. On a miss the session is untouched and
    /// [`DialogueError::InvalidMenuInput`] is returned.
    pub fn resolve(&self, session: &mut Session, input: &str) -> Result<String, DialogueError> {
        let node = match &session.mode {
            TurnMode::Menu { node } => node.clone(),
            _ => return Err(DialogueError::InvalidMenuInput(input.to_string())),
        };

        let token = option_token(input);
        let Some(index) = token.parse::<usize>().ok().filter(|n| *n >= 1) else {
            return Err(DialogueError::InvalidMenuInput(token.to_string()));
        };

        match &node {
            NodeRef::Root => {
                let names = self.tree.top_level_names();
                let Some(name) = names.get(index - 1) else {
                    return Err(DialogueError::InvalidMenuInput(token.to_string()));
                };
                self.enter_named(session, name)
            }
            NodeRef::Named(name) => {
                let Some(MenuNode::Submenu { choices }) = self.tree.node(name) else {
                    return Err(DialogueError::InvalidMenuInput(token.to_string()));
                };
                let Some(choice) = choices.get(index - 1) else {
                    return Err(DialogueError::InvalidMenuInput(token.to_string()));
                };
                match choice.target.clone() {
                    MenuTarget::Root => {
                        session.mode = TurnMode::initial();
                        session.context = None;
                        Ok(self.render(&NodeRef::Root))
                    }
                    MenuTarget::Node(child) => self.enter_named(session, &child),
                    MenuTarget::Subtopic(label) => {
                        debug!(sector = %name, subtopic = %label, "Subtopic chosen");
                        let prompt = messages::free_text_prompt(name, Some(&label));
                        session.context = Some(MenuContext {
                            sector: name.clone(),
                            subtopic: Some(label),
                        });
                        session.mode = TurnMode::AwaitingQuestion;
                        session.retry_count = 0;
                        session.interaction_count = 0;
                        Ok(prompt)
                    }
                }
            }
        }
    }

    /// Enter a named node: submenus render, free-form leaves flip the
    /// session into question mode. Top-level nodes establish the sector.
    fn enter_named(&self, session: &mut Session, name: &str) -> Result<String, DialogueError> {
        let entry = self
            .tree
            .nodes
            .iter()
            .find(|entry| entry.name == name)
            .ok_or_else(|| DialogueError::InvalidMenuInput(name.to_string()))?;

        if entry.top_level {
            session.context = Some(MenuContext {
                sector: entry.name.clone(),
                subtopic: None,
            });
        }

        match &entry.node {
            MenuNode::Submenu { .. } => {
                session.mode = TurnMode::Menu {
                    node: NodeRef::Named(entry.name.clone()),
                };
                Ok(self.render(&NodeRef::Named(entry.name.clone())))
            }
            MenuNode::FreeForm { prompt } => {
                session.mode = TurnMode::AwaitingQuestion;
                session.retry_count = 0;
                session.interaction_count = 0;
                Ok(prompt.clone())
            }
        }
    }
}

/// First whitespace-delimited token with any trailing period stripped.
fn option_token(input: &str) -> &str {
    input
        .split_whitespace()
        .next()
        .unwrap_or("")
        .trim_end_matches('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use concierge_types::{MenuChoice, MenuEntry, SharedKnowledge};

    fn sample_tree() -> Arc<MenuTree> {
        Arc::new(MenuTree::new(vec![
            MenuEntry {
                name: "Billing (SEFAT)".to_string(),
                top_level: true,
                node: MenuNode::Submenu {
                    choices: vec![
                        MenuChoice {
                            label: "Reimbursements".to_string(),
                            target: MenuTarget::Subtopic("Reimbursements".to_string()),
                        },
                        MenuChoice {
                            label: "Invoices".to_string(),
                            target: MenuTarget::Node("Invoices".to_string()),
                        },
                        MenuChoice {
                            label: "Back to start".to_string(),
                            target: MenuTarget::Root,
                        },
                    ],
                },
            },
            MenuEntry {
                name: "Invoices".to_string(),
                top_level: false,
                node: MenuNode::Submenu {
                    choices: vec![MenuChoice {
                        label: "Issuing an invoice".to_string(),
                        target: MenuTarget::Subtopic("Issuing an invoice".to_string()),
                    }],
                },
            },
            MenuEntry {
                name: "Anything else".to_string(),
                top_level: true,
                node: MenuNode::FreeForm {
                    prompt: "Type your question freely.".to_string(),
                },
            },
        ]))
    }

    fn session() -> Session {
        Session::new(SharedKnowledge::default())
    }

    #[test]
    fn test_root_render_numbers_all_top_level_topics() {
        let navigator = MenuNavigator::new(sample_tree());
        let text = navigator.render(&NodeRef::Root);
        assert!(text.contains("1. Billing (SEFAT)"));
        assert!(text.contains("2. Anything else"));
        // Non-top-level nodes are not listed at the root.
        assert!(!text.contains("Invoices"));
    }

    #[test]
    fn test_option_enters_submenu_and_sets_sector() {
        let navigator = MenuNavigator::new(sample_tree());
        let mut session = session();

        let text = navigator.resolve(&mut session, "1").unwrap();
        assert!(text.contains("1. Reimbursements"));
        assert_eq!(
            session.mode,
            TurnMode::Menu {
                node: NodeRef::Named("Billing (SEFAT)".to_string())
            }
        );
        assert_eq!(
            session.context.as_ref().unwrap().sector,
            "Billing (SEFAT)"
        );
    }

    #[test]
    fn test_invalid_option_leaves_state_unchanged() {
        let navigator = MenuNavigator::new(sample_tree());
        let mut session = session();

        for bad in ["9", "abc", ""] {
            let err = navigator.resolve(&mut session, bad).unwrap_err();
            assert!(matches!(err, DialogueError::InvalidMenuInput(_)));
            assert_eq!(session.mode, TurnMode::initial());
            assert!(session.context.is_none());
        }
    }

    #[test]
    fn test_trailing_period_and_extra_words_tolerated() {
        let navigator = MenuNavigator::new(sample_tree());
        let mut session = session();

        navigator.resolve(&mut session, "1. please").unwrap();
        assert_eq!(
            session.mode,
            TurnMode::Menu {
                node: NodeRef::Named("Billing (SEFAT)".to_string())
            }
        );
    }

    #[test]
    fn test_subtopic_enters_question_mode_and_resets_counter() {
        let navigator = MenuNavigator::new(sample_tree());
        let mut session = session();
        session.interaction_count = 3;

        navigator.resolve(&mut session, "1").unwrap();
        let prompt = navigator.resolve(&mut session, "1").unwrap();

        assert!(prompt.contains("Reimbursements"));
        assert_eq!(session.mode, TurnMode::AwaitingQuestion);
        assert_eq!(session.interaction_count, 0);
        let context = session.context.unwrap();
        assert_eq!(context.sector, "Billing (SEFAT)");
        assert_eq!(context.subtopic.as_deref(), Some("Reimbursements"));
    }

    #[test]
    fn test_nested_submenu_keeps_sector() {
        let navigator = MenuNavigator::new(sample_tree());
        let mut session = session();

        navigator.resolve(&mut session, "1").unwrap();
        navigator.resolve(&mut session, "2").unwrap();

        assert_eq!(
            session.mode,
            TurnMode::Menu {
                node: NodeRef::Named("Invoices".to_string())
            }
        );
        // Entering a non-top-level node keeps the established sector.
        assert_eq!(
            session.context.as_ref().unwrap().sector,
            "Billing (SEFAT)"
        );
    }

    #[test]
    fn test_root_target_clears_context() {
        let navigator = MenuNavigator::new(sample_tree());
        let mut session = session();

        navigator.resolve(&mut session, "1").unwrap();
        let text = navigator.resolve(&mut session, "3").unwrap();

        assert!(text.contains(messages::ROOT_HEADER));
        assert_eq!(session.mode, TurnMode::initial());
        assert!(session.context.is_none());
    }

    #[test]
    fn test_free_form_leaf_enters_question_mode() {
        let navigator = MenuNavigator::new(sample_tree());
        let mut session = session();

        let prompt = navigator.resolve(&mut session, "2").unwrap();
        assert_eq!(prompt, "Type your question freely.");
        assert_eq!(session.mode, TurnMode::AwaitingQuestion);
        assert_eq!(
            session.context.as_ref().unwrap().sector,
            "Anything else"
        );
    }

    #[test]
    fn test_option_token_parsing() {
        assert_eq!(option_token("2."), "2");
        assert_eq!(option_token("  3 please"), "3");
        assert_eq!(option_token(""), "");
    }
}
