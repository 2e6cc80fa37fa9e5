//! Deterministic left-to-right tree layout.
//!
//! Leaves are stacked top to bottom in pre-order; every parent is centred
//! vertically between its first and last child. Columns are one per depth.

use std::collections::HashMap;

use crate::graph::Position;
use crate::tree::TreeNode;

/// Horizontal distance between depth columns
pub const HORIZONTAL_SPACING: f64 = 250.0;

/// Vertical distance between consecutive leaves
pub const VERTICAL_SPACING: f64 = 80.0;

/// Compute a position for every node of `tree`, keyed by node id
pub fn compute_layout(tree: &TreeNode) -> HashMap<String, Position> {
    let mut positions = HashMap::with_capacity(tree.node_count());
    let mut next_leaf = 0usize;

    // Post-order on an explicit stack: a node is placed once all its children are
    let mut stack = vec![Frame::new(tree, 0)];
    while let Some(frame) = stack.last_mut() {
        let node = frame.node;
        if let Some(child) = node.children.get(frame.next_child) {
            frame.next_child += 1;
            let depth = frame.depth + 1;
            stack.push(Frame::new(child, depth));
            continue;
        }

        let y = match frame.first_child_y {
            Some(first) => (first + frame.last_child_y) / 2.0,
            None => {
                let y = next_leaf as f64 * VERTICAL_SPACING;
                next_leaf += 1;
                y
            }
        };
        positions.insert(
            node.id.clone(),
            Position::new(frame.depth as f64 * HORIZONTAL_SPACING, y),
        );
        stack.pop();

        if let Some(parent) = stack.last_mut() {
            parent.first_child_y.get_or_insert(y);
            parent.last_child_y = y;
        }
    }

    positions
}

struct Frame<'a> {
    node: &'a TreeNode,
    depth: usize,
    next_child: usize,
    first_child_y: Option<f64>,
    last_child_y: f64,
}

impl<'a> Frame<'a> {
    fn new(node: &'a TreeNode, depth: usize) -> Self {
        Self {
            node,
            depth,
            next_child: 0,
            first_child_y: None,
            last_child_y: 0.0,
        }
    }
}
