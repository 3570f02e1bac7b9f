//! The static navigation menu tree.
//!
//! The tree is configuration, not runtime state: it is loaded once and shared
//! read-only. Nodes are tagged variants rather than loosely-typed maps, and
//! "back to the start" is an explicit target variant instead of a magic
//! string.

use serde::{Deserialize, Serialize};

/// Reference to a position in the menu tree.
///
/// The root is not a named node; it is rendered by enumerating the tree's
/// top-level sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRef {
    /// The synthetic top-level menu listing every section.
    Root,
    /// A named node inside the tree.
    Named(String),
}

/// Where a menu choice leads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuTarget {
    /// Return to the root menu, discarding context.
    Root,
    /// Descend into another named node (submenu or free-form leaf).
    Node(String),
    /// Terminal subtopic: the session enters free-text answering mode with
    /// this label as the chosen subtopic.
    Subtopic(String),
}

/// One numbered choice inside a submenu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuChoice {
    /// Label shown to the user.
    pub label: String,

    /// Destination when the choice is picked.
    pub target: MenuTarget,
}

/// A single node of the menu tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MenuNode {
    /// Ordered list of labeled choices.
    Submenu {
        /// Choices in display order; rendered as numbered options 1..N.
        choices: Vec<MenuChoice>,
    },

    /// Accepts arbitrary text; the session enters free-text answering mode.
    FreeForm {
        /// Prompt inviting unrestricted input.
        prompt: String,
    },
}

/// The whole immutable menu tree.
///
/// Top-level node names double as sector labels: the root menu enumerates
/// them as numbered options, and entering one establishes the session's
/// sector context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MenuTree {
    /// Named nodes in display order. The first N appearing with
    /// `top_level = true` are listed on the root menu.
    pub nodes: Vec<MenuEntry>,
}

/// A named node plus its placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuEntry {
    /// Node name; for top-level entries this is also the sector label.
    pub name: String,

    /// Whether the node is listed on the root menu.
    #[serde(default = "default_top_level")]
    pub top_level: bool,

    /// The node itself.
    #[serde(flatten)]
    pub node: MenuNode,
}

fn default_top_level() -> bool {
    true
}

impl MenuTree {
    /// Create a tree from ordered entries.
    pub fn new(nodes: Vec<MenuEntry>) -> Self {
        Self { nodes }
    }

    /// Look up a node by name.
    pub fn node(&self, name: &str) -> Option<&MenuNode> {
        self.nodes
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| &entry.node)
    }

    /// Names of the nodes listed on the root menu, in display order.
    pub fn top_level_names(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|entry| entry.top_level)
            .map(|entry| entry.name.as_str())
            .collect()
    }

    /// Whether the tree has at least one top-level entry to render.
    pub fn is_empty(&self) -> bool {
        self.top_level_names().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> MenuTree {
        MenuTree::new(vec![
            MenuEntry {
                name: "Billing (SEFAT)".to_string(),
                top_level: true,
                node: MenuNode::Submenu {
                    choices: vec![
                        MenuChoice {
                            label: "Reimbursements".to_string(),
                            target: MenuTarget::Subtopic(
                                "How do I request a reimbursement?".to_string(),
                            ),
                        },
                        MenuChoice {
                            label: "Back to start".to_string(),
                            target: MenuTarget::Root,
                        },
                    ],
                },
            },
            MenuEntry {
                name: "Anything else".to_string(),
                top_level: true,
                node: MenuNode::FreeForm {
                    prompt: "Go ahead, type your question freely.".to_string(),
                },
            },
        ])
    }

    #[test]
    fn test_lookup_by_name() {
        let tree = sample_tree();
        assert!(matches!(
            tree.node("Billing (SEFAT)"),
            Some(MenuNode::Submenu { .. })
        ));
        assert!(matches!(
            tree.node("Anything else"),
            Some(MenuNode::FreeForm { .. })
        ));
        assert!(tree.node("Missing").is_none());
    }

    #[test]
    fn test_top_level_order_preserved() {
        let tree = sample_tree();
        assert_eq!(
            tree.top_level_names(),
            vec!["Billing (SEFAT)", "Anything else"]
        );
    }

    #[test]
    fn test_toml_round_trip() {
        let tree = sample_tree();
        let text = toml::to_string(&tree).unwrap();
        let back: MenuTree = toml::from_str(&text).unwrap();
        assert_eq!(tree, back);
    }
}
