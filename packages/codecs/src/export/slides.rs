//! Markdown slide deck.
//!
//! Marp-compatible: a front matter block, a title slide for the root, then
//! one slide per first-level branch with its subtree as nested bullets.
//! Notes become speaker notes (HTML comments), which the deck tools hide.

use mindmap_model::TreeNode;

use super::one_line;
use crate::format::Format;
use crate::Exporter;

const FRONT_MATTER: &str = "---\nmarp: true\npaginate: true\n---\n";
const SEPARATOR: &str = "\n---\n\n";

pub struct SlidesExporter;

impl Exporter for SlidesExporter {
    fn format(&self) -> Format {
        Format::Slides
    }

    fn export(&self, tree: &TreeNode) -> String {
        let mut output = String::from(FRONT_MATTER);

        output.push_str(&format!("\n# {}\n", one_line(&tree.content)));
        if !tree.children.is_empty() {
            output.push('\n');
            for child in &tree.children {
                output.push_str(&format!("- {}\n", one_line(&child.content)));
            }
        }
        write_speaker_notes(tree, &mut output);

        for branch in &tree.children {
            output.push_str(SEPARATOR);
            output.push_str(&format!("## {}\n", one_line(&branch.content)));
            if !branch.children.is_empty() {
                output.push('\n');
                for child in &branch.children {
                    write_bullet(child, 0, &mut output);
                }
            }
            write_speaker_notes(branch, &mut output);
        }

        output
    }
}

fn write_bullet(node: &TreeNode, level: usize, output: &mut String) {
    output.push_str(&format!("{}- {}\n", "  ".repeat(level), one_line(&node.content)));
    for child in &node.children {
        write_bullet(child, level + 1, output);
    }
}

fn write_speaker_notes(node: &TreeNode, output: &mut String) {
    if let Some(notes) = node.notes().filter(|n| !n.trim().is_empty()) {
        output.push_str(&format!("\n<!--\n{}\n-->\n", split_dashes(notes.trim())));
    }
}

/// Break every run of dashes so no `--` reaches the comment
fn split_dashes(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut previous = None;
    for c in text.chars() {
        if c == '-' && previous == Some('-') {
            output.push(' ');
        }
        output.push(c);
        previous = Some(c);
    }
    output
}
