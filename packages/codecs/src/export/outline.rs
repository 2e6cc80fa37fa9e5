//! Numbered presentation outline.
//!
//! The root is the title; every other node is numbered by its path, with
//! notes indented under it:
//!
//! ```text
//! Launch plan
//!
//! 1. Marketing
//!    1.1. Blog post
//!         draft by friday
//! 2. Engineering
//! ```

use mindmap_model::TreeNode;

use super::one_line;
use crate::format::Format;
use crate::Exporter;

pub struct OutlineExporter;

impl Exporter for OutlineExporter {
    fn format(&self) -> Format {
        Format::Outline
    }

    fn export(&self, tree: &TreeNode) -> String {
        let mut output = String::new();
        output.push_str(&one_line(&tree.content));
        output.push('\n');
        write_notes(tree, "", &mut output);

        if !tree.children.is_empty() {
            output.push('\n');
        }
        let mut path = Vec::new();
        for (index, child) in tree.children.iter().enumerate() {
            path.push(index + 1);
            write_item(child, &mut path, &mut output);
            path.pop();
        }
        output
    }
}

fn write_item(node: &TreeNode, path: &mut Vec<usize>, output: &mut String) {
    let indent = "   ".repeat(path.len() - 1);
    let number: String = path.iter().map(|n| format!("{}.", n)).collect();
    output.push_str(&format!("{}{} {}\n", indent, number, one_line(&node.content)));

    let note_indent = format!("{}{}", indent, " ".repeat(number.len() + 1));
    write_notes(node, &note_indent, output);

    for (index, child) in node.children.iter().enumerate() {
        path.push(index + 1);
        write_item(child, path, output);
        path.pop();
    }
}

fn write_notes(node: &TreeNode, indent: &str, output: &mut String) {
    if let Some(notes) = node.notes() {
        for line in notes.lines().filter(|l| !l.trim().is_empty()) {
            output.push_str(&format!("{}{}\n", indent, line.trim()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_outline() {
        let tree = TreeNode::new("r", "Launch plan")
            .with_child(
                TreeNode::new("m", "Marketing")
                    .with_child(TreeNode::new("b", "Blog post").with_notes("draft by friday")),
            )
            .with_child(TreeNode::new("e", "Engineering"));

        assert_eq!(
            OutlineExporter.export(&tree),
            "Launch plan\n\n1. Marketing\n   1.1. Blog post\n        draft by friday\n2. Engineering\n"
        );
    }

    #[test]
    fn test_single_node() {
        let tree = TreeNode::new("r", "Alone").with_notes("just me\n\n");
        assert_eq!(OutlineExporter.export(&tree), "Alone\njust me\n");
    }
}
