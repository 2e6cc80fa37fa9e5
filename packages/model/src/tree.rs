//! # Tree Model
//!
//! Canonical hierarchical representation of a mind map.
//!
//! Every other representation (graph projection, interchange formats,
//! history snapshots) is derived from or reduced to a [`TreeNode`].
//!
//! ## Invariants
//!
//! - Single root, acyclic (guaranteed by ownership: children are owned values)
//! - Ids are non-empty and unique across the whole tree
//! - Cross-link targets refer to ids that exist in the same tree

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// A single node of the mind map and its subtree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    /// Unique node id
    pub id: String,

    /// Text shown on the node
    pub content: String,

    /// Ordered children
    #[serde(default)]
    pub children: Vec<TreeNode>,

    /// Notes, tags, custom fields and cross-links
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<NodeMetadata>,

    /// Symbolic icon tag (e.g. "idea", "warning")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,

    /// Grouping annotation drawn around the subtree
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud: Option<Cloud>,

    /// Whether the subtree is folded in the visualization
    #[serde(default, skip_serializing_if = "is_false")]
    pub collapsed: bool,

    /// Background colour of the node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Structured metadata attached to a node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Free-form key/value fields, kept sorted for stable output
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom: BTreeMap<String, String>,

    /// Non-hierarchical links from this node to other nodes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cross_links: Vec<CrossLink>,
}

/// Stored form of a cross-link edge (the source is the owning node)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossLink {
    pub target: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Symbolic icon tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Icon(pub String);

/// Cloud annotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cloud {
    pub color: String,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    #[error("Node with empty id (content: {content:?})")]
    EmptyId { content: String },

    #[error("Duplicate node id: {0}")]
    DuplicateId(String),

    #[error("Cross-link from {source_id} points to unknown node {target}")]
    DanglingCrossLink { source_id: String, target: String },
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl NodeMetadata {
    pub fn is_empty(&self) -> bool {
        self.notes.is_none()
            && self.tags.is_empty()
            && self.custom.is_empty()
            && self.cross_links.is_empty()
    }
}

impl Icon {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TreeNode {
    /// Create a leaf node
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            children: Vec::new(),
            metadata: None,
            icon: None,
            cloud: None,
            collapsed: false,
            color: None,
        }
    }

    pub fn with_child(mut self, child: TreeNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = TreeNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.metadata_mut().notes = Some(notes.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.metadata_mut().tags.push(tag.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata_mut().custom.insert(key.into(), value.into());
        self
    }

    pub fn with_cross_link(mut self, target: impl Into<String>) -> Self {
        self.metadata_mut().cross_links.push(CrossLink {
            target: target.into(),
            label: None,
        });
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(Icon(icon.into()));
        self
    }

    pub fn with_cloud(mut self, color: impl Into<String>) -> Self {
        self.cloud = Some(Cloud {
            color: color.into(),
        });
        self
    }

    /// Metadata record, created on first access
    pub fn metadata_mut(&mut self) -> &mut NodeMetadata {
        self.metadata.get_or_insert_with(NodeMetadata::default)
    }

    /// Notes text, if any
    pub fn notes(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.notes.as_deref())
    }

    /// Cross-links stored on this node
    pub fn cross_links(&self) -> &[CrossLink] {
        self.metadata
            .as_ref()
            .map(|m| m.cross_links.as_slice())
            .unwrap_or(&[])
    }

    /// Pre-order traversal yielding `(depth, node)`; the root has depth 0
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: vec![(0, self)],
        }
    }

    pub fn find(&self, id: &str) -> Option<&TreeNode> {
        self.walk().map(|(_, node)| node).find(|node| node.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut TreeNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }

    /// Total number of nodes including this one
    pub fn node_count(&self) -> usize {
        self.walk().count()
    }

    /// Depth of the deepest node (a single node has depth 0)
    pub fn depth(&self) -> usize {
        self.walk().map(|(depth, _)| depth).max().unwrap_or(0)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Check id uniqueness and cross-link targets
    pub fn validate(&self) -> Result<(), TreeError> {
        let mut ids = HashSet::new();

        for (_, node) in self.walk() {
            if node.id.is_empty() {
                return Err(TreeError::EmptyId {
                    content: node.content.clone(),
                });
            }
            if !ids.insert(node.id.as_str()) {
                return Err(TreeError::DuplicateId(node.id.clone()));
            }
        }

        for (_, node) in self.walk() {
            for link in node.cross_links() {
                if !ids.contains(link.target.as_str()) {
                    return Err(TreeError::DanglingCrossLink {
                        source_id: node.id.clone(),
                        target: link.target.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Iterative pre-order walk over a tree
pub struct Walk<'a> {
    stack: Vec<(usize, &'a TreeNode)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        // Reverse so the first child is visited first
        for child in node.children.iter().rev() {
            self.stack.push((depth + 1, child));
        }
        Some((depth, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TreeNode {
        TreeNode::new("root", "Root")
            .with_child(
                TreeNode::new("a", "A")
                    .with_child(TreeNode::new("a1", "A1"))
                    .with_child(TreeNode::new("a2", "A2")),
            )
            .with_child(TreeNode::new("b", "B").with_cross_link("a1"))
    }

    #[test]
    fn test_walk_is_preorder() {
        let tree = sample();
        let ids: Vec<_> = tree.walk().map(|(_, n)| n.id.as_str()).collect();
        assert_eq!(ids, vec!["root", "a", "a1", "a2", "b"]);
    }

    #[test]
    fn test_counts_and_depth() {
        let tree = sample();
        assert_eq!(tree.node_count(), 5);
        assert_eq!(tree.depth(), 2);
        assert_eq!(TreeNode::new("x", "X").depth(), 0);
    }

    #[test]
    fn test_find_mut_updates_in_place() {
        let mut tree = sample();
        tree.find_mut("a2").unwrap().content = "Changed".to_string();
        assert_eq!(tree.find("a2").unwrap().content, "Changed");
        assert!(tree.find("missing").is_none());
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let tree = TreeNode::new("root", "Root")
            .with_child(TreeNode::new("a", "A"))
            .with_child(TreeNode::new("a", "Again"));
        assert_eq!(tree.validate(), Err(TreeError::DuplicateId("a".to_string())));
    }

    #[test]
    fn test_validate_rejects_dangling_cross_link() {
        let tree = TreeNode::new("root", "Root").with_cross_link("nowhere");
        assert!(matches!(
            tree.validate(),
            Err(TreeError::DanglingCrossLink { .. })
        ));
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_serde_skips_empty_optionals() {
        let json = serde_json::to_string(&TreeNode::new("n", "Node")).unwrap();
        assert_eq!(json, r#"{"id":"n","content":"Node","children":[]}"#);

        let tree: TreeNode =
            serde_json::from_str(r#"{"id":"n","content":"Node","icon":"idea"}"#).unwrap();
        assert_eq!(tree.icon, Some(Icon("idea".to_string())));
        assert!(tree.children.is_empty());
    }
}
