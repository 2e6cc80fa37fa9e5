//! # Action Labels
//!
//! Every history entry is labelled by comparing it with the state before it.
//! The rules form an ordered table; the first rule whose predicate matches
//! names the change.
//!
//! | order | rule            | label                                  |
//! |-------|-----------------|----------------------------------------|
//! | 1     | added_child     | `Added child node`                     |
//! | 2     | added_sibling   | `Added sibling node`                   |
//! | 3     | added_nodes     | `Added N nodes`                        |
//! | 4     | deleted_nodes   | `Deleted node` / `Deleted N nodes`     |
//! | 5     | replaced_nodes  | `Replaced node` / `Replaced N nodes`   |
//! | 6     | added_links     | `Added cross-link` / `Added N links`   |
//! | 7     | removed_link    | `Removed link`                         |
//! | 8     | edited_text     | `Edited text: "..."`                   |
//! | 9     | metadata        | `Updated metadata`                     |
//! | 10    | icon            | `Changed icon`                         |
//! | 11    | cloud           | `Changed cloud`                        |
//!
//! Nothing matching falls back to [`FALLBACK_LABEL`].

use mindmap_model::{GraphEdge, GraphNode};
use std::collections::{HashMap, HashSet};

pub const FALLBACK_LABEL: &str = "Action";

/// Longest node text quoted in an edit label
const EDIT_PREVIEW_CHARS: usize = 20;

/// Two consecutive states of the graph
pub struct Change<'a> {
    pub before_nodes: &'a [GraphNode],
    pub before_edges: &'a [GraphEdge],
    pub after_nodes: &'a [GraphNode],
    pub after_edges: &'a [GraphEdge],
}

impl<'a> Change<'a> {
    fn node_delta(&self) -> isize {
        self.after_nodes.len() as isize - self.before_nodes.len() as isize
    }

    fn edge_delta(&self) -> isize {
        self.after_edges.len() as isize - self.before_edges.len() as isize
    }

    /// Nodes present after but not before, by id
    fn added_nodes(&self) -> Vec<&'a GraphNode> {
        let before: HashSet<&str> = self.before_nodes.iter().map(|n| n.id.as_str()).collect();
        self.after_nodes
            .iter()
            .filter(|n| !before.contains(n.id.as_str()))
            .collect()
    }

    fn removed_count(&self) -> usize {
        let after: HashSet<&str> = self.after_nodes.iter().map(|n| n.id.as_str()).collect();
        self.before_nodes
            .iter()
            .filter(|n| !after.contains(n.id.as_str()))
            .count()
    }

    fn is_new_edge(&self, edge: &GraphEdge) -> bool {
        !self.before_edges.iter().any(|e| e.id == edge.id)
    }

    /// Pairs of nodes present on both sides, in the order of the new state
    fn kept_pairs(&self) -> impl Iterator<Item = (&'a GraphNode, &'a GraphNode)> + '_ {
        let before: HashMap<&str, &'a GraphNode> =
            self.before_nodes.iter().map(|n| (n.id.as_str(), n)).collect();
        self.after_nodes
            .iter()
            .filter_map(move |after| before.get(after.id.as_str()).map(|b| (*b, after)))
    }
}

/// One row of the label table
#[derive(Debug)]
pub struct LabelRule {
    pub name: &'static str,
    pub applies: fn(&Change<'_>) -> bool,
    pub label: fn(&Change<'_>) -> String,
}

pub static LABEL_RULES: &[LabelRule] = &[
    LabelRule {
        name: "added_child",
        applies: |c| {
            c.node_delta() == 1
                && c.added_nodes().first().map_or(false, |node| {
                    c.after_edges
                        .iter()
                        .any(|e| e.is_hierarchical() && e.target == node.id && c.is_new_edge(e))
                })
        },
        label: |_| "Added child node".to_string(),
    },
    LabelRule {
        name: "added_sibling",
        applies: |c| c.node_delta() == 1,
        label: |_| "Added sibling node".to_string(),
    },
    LabelRule {
        name: "added_nodes",
        applies: |c| c.node_delta() > 1,
        label: |c| format!("Added {} nodes", c.node_delta()),
    },
    LabelRule {
        name: "deleted_nodes",
        applies: |c| c.node_delta() < 0,
        label: |c| match -c.node_delta() {
            1 => "Deleted node".to_string(),
            n => format!("Deleted {} nodes", n),
        },
    },
    LabelRule {
        name: "replaced_nodes",
        applies: |c| c.removed_count() > 0,
        label: |c| match c.removed_count() {
            1 => "Replaced node".to_string(),
            n => format!("Replaced {} nodes", n),
        },
    },
    LabelRule {
        name: "added_links",
        applies: |c| c.edge_delta() > 0,
        label: |c| match c.edge_delta() {
            1 => "Added cross-link".to_string(),
            n => format!("Added {} links", n),
        },
    },
    LabelRule {
        name: "removed_link",
        applies: |c| c.edge_delta() < 0,
        label: |_| "Removed link".to_string(),
    },
    LabelRule {
        name: "edited_text",
        applies: |c| c.kept_pairs().any(|(before, after)| before.label != after.label),
        label: |c| {
            let text = c
                .kept_pairs()
                .find(|(before, after)| before.label != after.label)
                .map(|(_, after)| after.label.as_str())
                .unwrap_or_default();
            format!("Edited text: \"{}\"", preview(text))
        },
    },
    LabelRule {
        name: "metadata",
        applies: |c| c.kept_pairs().any(|(before, after)| before.metadata != after.metadata),
        label: |_| "Updated metadata".to_string(),
    },
    LabelRule {
        name: "icon",
        applies: |c| c.kept_pairs().any(|(before, after)| before.style.icon != after.style.icon),
        label: |_| "Changed icon".to_string(),
    },
    LabelRule {
        name: "cloud",
        applies: |c| c.kept_pairs().any(|(before, after)| before.style.cloud != after.style.cloud),
        label: |_| "Changed cloud".to_string(),
    },
];

/// Label `change` with the first matching rule of `rules`
pub fn derive_label(rules: &[LabelRule], change: &Change<'_>) -> String {
    match rules.iter().find(|rule| (rule.applies)(change)) {
        Some(rule) => {
            let label = (rule.label)(change);
            tracing::debug!("History label rule {} matched: {}", rule.name, label);
            label
        }
        None => FALLBACK_LABEL.to_string(),
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() > EDIT_PREVIEW_CHARS {
        let head: String = text.chars().take(EDIT_PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}
