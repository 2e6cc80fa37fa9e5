//! # Mindmap Model
//!
//! Canonical tree model of a mind map and its graph projection.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ tree: TreeNode (source of truth)            │
//! └─────────────────────────────────────────────┘
//!            ↓ tree_to_flow    ↑ flow_to_tree
//! ┌─────────────────────────────────────────────┐
//! │ graph: GraphNode / GraphEdge (canvas view)  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! The tree is the only structure codecs read and write. The graph is what
//! the canvas edits and what the history engine snapshots.

pub mod convert;
pub mod graph;
pub mod id_generator;
pub mod layout;
pub mod tree;

pub use convert::{flow_to_tree, tree_to_flow, tree_to_flow_preserving, ConvertError};
pub use graph::{EdgeKind, EdgeStyle, Graph, GraphEdge, GraphNode, NodeStyle, Position};
pub use id_generator::IdGenerator;
pub use layout::compute_layout;
pub use tree::{Cloud, CrossLink, Icon, NodeMetadata, TreeError, TreeNode};
