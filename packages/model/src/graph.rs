//! # Graph Projection
//!
//! Flattened node/edge representation consumed by the interactive canvas.
//!
//! The projection is always derived from a [`TreeNode`](crate::TreeNode)
//! and can be reduced back to one (see [`crate::convert`]). Hierarchical
//! edges carry the tree structure; cross-link edges are auxiliary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::tree::{Cloud, Icon, NodeMetadata};

/// 2D canvas coordinate
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Visual attributes of a node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud: Option<Cloud>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,

    #[serde(default)]
    pub collapsed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
}

/// Node as seen by the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    /// Matches the id of the tree node it was projected from
    pub id: String,

    pub label: String,

    pub position: Position,

    #[serde(default)]
    pub style: NodeStyle,

    /// Node metadata without cross-links (those live on edges)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<NodeMetadata>,
}

impl GraphNode {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            position: Position::default(),
            style: NodeStyle::default(),
            metadata: None,
        }
    }

    /// Stamp the node as modified at `at`
    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.style.last_modified = Some(at);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeKind {
    /// Parent → child
    Hierarchical,
    /// Auxiliary link, ignored when rebuilding the tree
    CrossLink,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default)]
    pub animated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    #[serde(default)]
    pub style: EdgeStyle,
}

impl GraphEdge {
    /// Parent → child edge with a deterministic id
    pub fn hierarchical(source: impl Into<String>, target: impl Into<String>) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: format!("e-{}-{}", source, target),
            source,
            target,
            kind: EdgeKind::Hierarchical,
            style: EdgeStyle::default(),
        }
    }

    /// Cross-link edge with a deterministic id
    pub fn cross_link(source: impl Into<String>, target: impl Into<String>) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: format!("x-{}-{}", source, target),
            source,
            target,
            kind: EdgeKind::CrossLink,
            style: EdgeStyle {
                label: None,
                animated: true,
            },
        }
    }

    pub fn is_hierarchical(&self) -> bool {
        self.kind == EdgeKind::Hierarchical
    }
}

/// Node and edge lists of one projection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl Graph {
    pub fn new(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> Self {
        Self { nodes, edges }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn hierarchical_edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(|e| e.is_hierarchical())
    }

    pub fn cross_link_edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(|e| !e.is_hierarchical())
    }

    /// First node id that appears more than once, if any
    pub fn duplicate_node_id(&self) -> Option<&str> {
        duplicate_id(&self.nodes)
    }
}

/// First id shared by two entries of `nodes`
pub fn duplicate_id(nodes: &[GraphNode]) -> Option<&str> {
    let mut seen = HashSet::new();
    nodes
        .iter()
        .map(|n| n.id.as_str())
        .find(|id| !seen.insert(*id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_ids_are_deterministic() {
        let edge = GraphEdge::hierarchical("root", "a");
        assert_eq!(edge.id, "e-root-a");
        assert!(edge.is_hierarchical());

        let link = GraphEdge::cross_link("a", "b");
        assert_eq!(link.id, "x-a-b");
        assert_eq!(link.kind, EdgeKind::CrossLink);
    }

    #[test]
    fn test_duplicate_node_id() {
        let graph = Graph::new(
            vec![
                GraphNode::new("a", "A"),
                GraphNode::new("b", "B"),
                GraphNode::new("a", "A again"),
            ],
            vec![],
        );
        assert_eq!(graph.duplicate_node_id(), Some("a"));
    }

    #[test]
    fn test_style_serializes_camel_case() {
        let mut node = GraphNode::new("n", "Node");
        node.style.background_color = Some("#fff".to_string());
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["style"]["backgroundColor"], "#fff");
        assert_eq!(json["style"]["collapsed"], false);
    }

    #[test]
    fn test_edge_kind_serialization() {
        let json = serde_json::to_string(&EdgeKind::CrossLink).unwrap();
        assert_eq!(json, "\"crossLink\"");
    }
}
