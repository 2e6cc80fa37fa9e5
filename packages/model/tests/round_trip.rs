//! Tree → graph → tree round trips over generated trees
//!
//! Covers:
//! - Wide and deep trees
//! - Metadata, icons, clouds, colours and collapsed flags
//! - Cross-links in both directions

use mindmap_model::{flow_to_tree, tree_to_flow, EdgeKind, TreeNode};

/// Build a tree with `breadth` children per node down to `depth`
fn generate(prefix: &str, depth: usize, breadth: usize) -> TreeNode {
    let mut node = TreeNode::new(prefix, format!("Node {}", prefix));
    if depth == 0 {
        return node;
    }
    for i in 0..breadth {
        let child_id = format!("{}.{}", prefix, i);
        let mut child = generate(&child_id, depth - 1, breadth);
        match i % 4 {
            0 => child = child.with_notes(format!("notes for {}", child_id)),
            1 => child = child.with_icon("star").with_tag("t1").with_tag("t2"),
            2 => {
                child = child.with_cloud("#ccddee").with_field("owner", "sam");
                child.collapsed = true;
            }
            _ => child.color = Some("#112233".to_string()),
        }
        node.children.push(child);
    }
    node
}

#[test]
fn test_generated_trees_round_trip() {
    for (depth, breadth) in [(0, 0), (1, 1), (1, 5), (3, 2), (2, 4), (6, 1)] {
        let tree = generate("n", depth, breadth);
        let graph = tree_to_flow(&tree);

        assert_eq!(graph.nodes.len(), tree.node_count());
        assert_eq!(
            graph.hierarchical_edges().count(),
            tree.node_count() - 1,
            "one edge per parent/child pair"
        );

        let rebuilt = flow_to_tree(&graph.nodes, &graph.edges).unwrap();
        assert_eq!(rebuilt, tree, "depth={} breadth={}", depth, breadth);
    }
}

#[test]
fn test_cross_links_survive_round_trip() {
    let mut tree = generate("n", 2, 3);
    tree.find_mut("n.0.1")
        .unwrap()
        .metadata_mut()
        .cross_links
        .push(mindmap_model::CrossLink {
            target: "n.2".to_string(),
            label: Some("depends on".to_string()),
        });
    tree.find_mut("n.2")
        .unwrap()
        .metadata_mut()
        .cross_links
        .push(mindmap_model::CrossLink {
            target: "n.0.1".to_string(),
            label: None,
        });
    assert!(tree.validate().is_ok());

    let graph = tree_to_flow(&tree);
    let links: Vec<_> = graph
        .edges
        .iter()
        .filter(|e| e.kind == EdgeKind::CrossLink)
        .collect();
    assert_eq!(links.len(), 2);
    assert_eq!(links[0].style.label.as_deref(), Some("depends on"));

    let rebuilt = flow_to_tree(&graph.nodes, &graph.edges).unwrap();
    assert_eq!(rebuilt, tree);
}

#[test]
fn test_reordered_node_list_keeps_child_order() {
    let tree = generate("n", 2, 3);
    let mut graph = tree_to_flow(&tree);
    graph.nodes.reverse();

    let rebuilt = flow_to_tree(&graph.nodes, &graph.edges).unwrap();
    assert_eq!(rebuilt, tree);
}

#[test]
fn test_removing_cross_link_edge_drops_it() {
    let tree = TreeNode::new("root", "Root")
        .with_child(TreeNode::new("a", "A").with_cross_link("b"))
        .with_child(TreeNode::new("b", "B"));
    let mut graph = tree_to_flow(&tree);
    graph.edges.retain(|e| e.kind == EdgeKind::Hierarchical);

    let rebuilt = flow_to_tree(&graph.nodes, &graph.edges).unwrap();
    assert!(rebuilt.children[0].cross_links().is_empty());
}
