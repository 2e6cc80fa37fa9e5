//! # Tree ↔ Graph Converter
//!
//! ## Tree → Graph
//!
//! Depth-first, pre-order walk. Each node becomes one [`GraphNode`], each
//! parent/child relationship one hierarchical [`GraphEdge`], and each stored
//! [`CrossLink`] one cross-link edge. Positions come from
//! [`compute_layout`](crate::layout::compute_layout) unless a previous
//! projection already placed the node.
//!
//! ## Graph → Tree
//!
//! The root is the only node without an incoming hierarchical edge. Children
//! are rebuilt by following hierarchical edges in edge order. Cross-link
//! edges never affect structure; they are folded back into the source
//! node's `metadata.cross_links` so a round trip keeps them.
//!
//! ```text
//! TreeNode ──tree_to_flow──▶ Graph { nodes, edges }
//!    ▲                              │
//!    └──────────flow_to_tree────────┘   (positions are not part of the tree)
//! ```

use std::collections::{HashMap, HashSet};
use thiserror::Error;

use crate::graph::{Graph, GraphEdge, GraphNode, NodeStyle};
use crate::layout::compute_layout;
use crate::tree::{CrossLink, NodeMetadata, TreeNode};

/// Why a graph could not be reduced to a tree
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConvertError {
    #[error("Graph has no nodes")]
    Empty,

    #[error("No root: every node has an incoming hierarchical edge")]
    NoRoot,

    #[error("Multiple roots: {0:?}")]
    MultipleRoots(Vec<String>),

    #[error("Node {0} has more than one parent")]
    MultipleParents(String),

    #[error("Edge {0} references a node that does not exist")]
    DanglingEdge(String),

    #[error("Hierarchical cycle through node {0}")]
    Cycle(String),

    #[error("Duplicate node id: {0}")]
    DuplicateNodeId(String),
}

/// Project a tree into canvas nodes and edges
pub fn tree_to_flow(tree: &TreeNode) -> Graph {
    tree_to_flow_preserving(tree, &[])
}

/// Project a tree, reusing positions and timestamps from `previous` by id
pub fn tree_to_flow_preserving(tree: &TreeNode, previous: &[GraphNode]) -> Graph {
    let layout = compute_layout(tree);
    let previous: HashMap<&str, &GraphNode> =
        previous.iter().map(|n| (n.id.as_str(), n)).collect();
    let known: HashSet<&str> = tree.walk().map(|(_, n)| n.id.as_str()).collect();

    let mut nodes = Vec::with_capacity(known.len());
    let mut edges = Vec::with_capacity(known.len().saturating_sub(1));
    let mut links = Vec::new();

    // Explicit stack keeps the walk pre-order without recursion
    let mut stack: Vec<(Option<&str>, &TreeNode)> = vec![(None, tree)];
    while let Some((parent, node)) = stack.pop() {
        if let Some(parent) = parent {
            edges.push(GraphEdge::hierarchical(parent, node.id.as_str()));
        }

        for link in node.cross_links() {
            if known.contains(link.target.as_str()) {
                let mut edge = GraphEdge::cross_link(node.id.as_str(), link.target.as_str());
                edge.style.label = link.label.clone();
                links.push(edge);
            } else {
                tracing::warn!(
                    "Skipping cross-link {} -> {}: target does not exist",
                    node.id,
                    link.target
                );
            }
        }

        let prior = previous.get(node.id.as_str());
        let position = prior
            .map(|p| p.position)
            .or_else(|| layout.get(&node.id).copied())
            .unwrap_or_default();

        nodes.push(GraphNode {
            id: node.id.clone(),
            label: node.content.clone(),
            position,
            style: NodeStyle {
                icon: node.icon.clone(),
                cloud: node.cloud.clone(),
                background_color: node.color.clone(),
                collapsed: node.collapsed,
                last_modified: prior.and_then(|p| p.style.last_modified),
            },
            metadata: node.metadata.as_ref().map(|m| NodeMetadata {
                cross_links: Vec::new(),
                ..m.clone()
            }),
        });

        for child in node.children.iter().rev() {
            stack.push((Some(node.id.as_str()), child));
        }
    }

    edges.extend(links);

    tracing::debug!(
        "tree_to_flow: {} nodes, {} edges",
        nodes.len(),
        edges.len()
    );

    Graph { nodes, edges }
}

/// Rebuild the tree from canvas nodes and edges
pub fn flow_to_tree(nodes: &[GraphNode], edges: &[GraphEdge]) -> Result<TreeNode, ConvertError> {
    if nodes.is_empty() {
        return Err(ConvertError::Empty);
    }

    let mut by_id: HashMap<&str, &GraphNode> = HashMap::with_capacity(nodes.len());
    for node in nodes {
        if by_id.insert(node.id.as_str(), node).is_some() {
            return Err(ConvertError::DuplicateNodeId(node.id.clone()));
        }
    }

    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut parent_of: HashMap<&str, &str> = HashMap::new();
    let mut cross_links: HashMap<&str, Vec<CrossLink>> = HashMap::new();

    for edge in edges {
        let endpoints_exist =
            by_id.contains_key(edge.source.as_str()) && by_id.contains_key(edge.target.as_str());

        if !edge.is_hierarchical() {
            if !endpoints_exist {
                tracing::debug!("Ignoring dangling cross-link {}", edge.id);
                continue;
            }
            let links = cross_links.entry(edge.source.as_str()).or_default();
            if !links.iter().any(|l| l.target == edge.target) {
                links.push(CrossLink {
                    target: edge.target.clone(),
                    label: edge.style.label.clone(),
                });
            }
            continue;
        }

        if !endpoints_exist {
            return Err(ConvertError::DanglingEdge(edge.id.clone()));
        }
        if edge.source == edge.target {
            return Err(ConvertError::Cycle(edge.source.clone()));
        }
        if parent_of
            .insert(edge.target.as_str(), edge.source.as_str())
            .is_some()
        {
            return Err(ConvertError::MultipleParents(edge.target.clone()));
        }
        children
            .entry(edge.source.as_str())
            .or_default()
            .push(edge.target.as_str());
    }

    let roots: Vec<&str> = nodes
        .iter()
        .map(|n| n.id.as_str())
        .filter(|id| !parent_of.contains_key(id))
        .collect();

    let root = match roots.as_slice() {
        [] => return Err(ConvertError::NoRoot),
        [root] => *root,
        _ => {
            return Err(ConvertError::MultipleRoots(
                roots.iter().map(|r| r.to_string()).collect(),
            ))
        }
    };

    let mut builder = TreeBuilder {
        by_id: &by_id,
        children: &children,
        cross_links: &mut cross_links,
        visited: HashSet::with_capacity(nodes.len()),
    };
    let tree = builder.build(root)?;

    // Single parents plus a unique root leave only cycles unreachable
    if builder.visited.len() < nodes.len() {
        let stranded = nodes
            .iter()
            .find(|n| !builder.visited.contains(n.id.as_str()))
            .map(|n| n.id.clone())
            .unwrap_or_default();
        return Err(ConvertError::Cycle(stranded));
    }

    tracing::debug!("flow_to_tree: rebuilt {} nodes from root {}", nodes.len(), root);
    Ok(tree)
}

struct TreeBuilder<'a, 'g> {
    by_id: &'a HashMap<&'g str, &'g GraphNode>,
    children: &'a HashMap<&'g str, Vec<&'g str>>,
    cross_links: &'a mut HashMap<&'g str, Vec<CrossLink>>,
    visited: HashSet<&'g str>,
}

/// A node whose children are still being built
struct Pending<'a, 'g> {
    tree: TreeNode,
    child_ids: &'a [&'g str],
    next: usize,
}

impl<'a, 'g> TreeBuilder<'a, 'g> {
    /// Depth-first rebuild on an explicit stack, so depth is bounded by memory only
    fn build(&mut self, root: &'g str) -> Result<TreeNode, ConvertError> {
        let mut stack = vec![self.start(root)?];

        while let Some(top) = stack.last_mut() {
            if let Some(&child_id) = top.child_ids.get(top.next) {
                top.next += 1;
                let child = self.start(child_id)?;
                stack.push(child);
                continue;
            }

            let done = match stack.pop() {
                Some(pending) => pending.tree,
                None => break,
            };
            match stack.last_mut() {
                Some(parent) => parent.tree.children.push(done),
                None => return Ok(done),
            }
        }

        // The root frame always returns above
        Err(ConvertError::NoRoot)
    }

    fn start(&mut self, id: &'g str) -> Result<Pending<'a, 'g>, ConvertError> {
        if !self.visited.insert(id) {
            return Err(ConvertError::Cycle(id.to_string()));
        }

        let node = self.by_id[id];
        let mut tree = TreeNode {
            id: node.id.clone(),
            content: node.label.clone(),
            children: Vec::new(),
            metadata: node.metadata.clone(),
            icon: node.style.icon.clone(),
            cloud: node.style.cloud.clone(),
            collapsed: node.style.collapsed,
            color: node.style.background_color.clone(),
        };

        if let Some(metadata) = tree.metadata.as_mut() {
            metadata.cross_links.clear();
        }
        if let Some(links) = self.cross_links.remove(id) {
            tree.metadata_mut().cross_links = links;
        }

        let children = self.children;
        let child_ids = children.get(id).map(Vec::as_slice).unwrap_or(&[]);
        tree.children.reserve(child_ids.len());

        Ok(Pending {
            tree,
            child_ids,
            next: 0,
        })
    }
}
