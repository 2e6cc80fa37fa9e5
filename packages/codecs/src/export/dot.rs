//! Graphviz DOT.
//!
//! ```text
//! digraph mindmap {
//!   rankdir=LR;
//!   node [shape=box, style="rounded,filled", fillcolor="#ffffff"];
//!
//!   "root" [label="Root"];
//!   "a" [label="A", fillcolor="#ffeeaa"];
//!
//!   "root" -> "a";
//!   "a" -> "root" [style=dashed, constraint=false, label="see also"];
//! }
//! ```
//!
//! Cross-links are dashed and do not take part in ranking, so the hierarchy
//! alone drives the layout.

use mindmap_model::TreeNode;

use super::one_line;
use crate::format::Format;
use crate::Exporter;

const DEFAULT_FILL: &str = "#ffffff";

pub struct DotExporter;

impl Exporter for DotExporter {
    fn format(&self) -> Format {
        Format::Dot
    }

    fn export(&self, tree: &TreeNode) -> String {
        let mut output = String::new();
        output.push_str("digraph mindmap {\n");
        output.push_str("  rankdir=LR;\n");
        output.push_str(&format!(
            "  node [shape=box, style=\"rounded,filled\", fillcolor=\"{}\"];\n\n",
            DEFAULT_FILL
        ));

        for (_, node) in tree.walk() {
            output.push_str(&format!("  {} [label={}", quote(&node.id), quote(&node_label(node))));
            if let Some(color) = &node.color {
                output.push_str(&format!(", fillcolor={}", quote(color)));
            }
            if node.collapsed {
                output.push_str(", peripheries=2");
            }
            output.push_str("];\n");
        }

        output.push('\n');
        for (_, node) in tree.walk() {
            for child in &node.children {
                output.push_str(&format!("  {} -> {};\n", quote(&node.id), quote(&child.id)));
            }
        }

        for (_, node) in tree.walk() {
            for link in node.cross_links() {
                output.push_str(&format!(
                    "  {} -> {} [style=dashed, constraint=false",
                    quote(&node.id),
                    quote(&link.target)
                ));
                if let Some(label) = &link.label {
                    output.push_str(&format!(", label={}", quote(label)));
                }
                output.push_str("];\n");
            }
        }

        output.push_str("}\n");
        output
    }
}

fn node_label(node: &TreeNode) -> String {
    match &node.icon {
        Some(icon) => format!("[{}] {}", icon.as_str(), one_line(&node.content)),
        None => one_line(&node.content),
    }
}

/// Quote a DOT identifier or string
fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => {}
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hierarchy_and_cross_links() {
        let tree = TreeNode::new("root", "Root")
            .with_child(TreeNode::new("a", "A").with_cross_link("b"))
            .with_child(TreeNode::new("b", "B"));

        let dot = DotExporter.export(&tree);

        assert!(dot.starts_with("digraph mindmap {\n  rankdir=LR;\n"));
        assert!(dot.contains("  \"root\" -> \"a\";\n"));
        assert!(dot.contains("  \"root\" -> \"b\";\n"));
        assert!(dot.contains("  \"a\" -> \"b\" [style=dashed, constraint=false];\n"));
        assert!(dot.ends_with("}\n"));
    }

    #[test]
    fn test_labels_are_escaped() {
        let tree = TreeNode::new("root", "Say \"hi\"\nthen C:\\go").with_icon("idea");
        let dot = DotExporter.export(&tree);
        assert!(dot.contains(r#""root" [label="[idea] Say \"hi\" then C:\\go"];"#));
    }

    #[test]
    fn test_style_attributes() {
        let mut tree = TreeNode::new("root", "Root");
        tree.color = Some("#ffeeaa".to_string());
        tree.collapsed = true;

        let dot = DotExporter.export(&tree);
        assert!(dot.contains(r##""root" [label="Root", fillcolor="#ffeeaa", peripheries=2];"##));
    }
}
