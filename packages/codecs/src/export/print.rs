//! Print-optimised HTML.
//!
//! A standalone page with the root as the title and the rest of the map as
//! nested lists. Notes, tags and custom fields are printed under each item;
//! the stylesheet keeps branches from splitting across pages.

use mindmap_model::TreeNode;

use crate::format::Format;
use crate::markup::{escape_text, indent};
use crate::Exporter;

const STYLESHEET: &str = "\
    body { font-family: Georgia, serif; margin: 2cm; color: #222; }
    h1 { border-bottom: 2px solid #444; padding-bottom: 0.2em; }
    ul { list-style: disc; margin: 0.2em 0 0.2em 1.4em; padding: 0; }
    li { margin: 0.25em 0; }
    .icon { font-size: 0.8em; color: #666; }
    .notes { margin: 0.2em 0 0.4em; font-style: italic; white-space: pre-wrap; }
    .tags { font-size: 0.8em; color: #555; }
    .fields { font-size: 0.8em; margin: 0.2em 0; }
    @media print {
      body { margin: 0; }
      li { page-break-inside: avoid; }
    }
";

pub struct PrintExporter;

impl Exporter for PrintExporter {
    fn format(&self) -> Format {
        Format::PrintHtml
    }

    fn export(&self, tree: &TreeNode) -> String {
        let title = escape_text(&tree.content);
        let mut output = String::new();
        output.push_str("<!DOCTYPE html>\n");
        output.push_str("<html lang=\"en\">\n");
        output.push_str("<head>\n");
        output.push_str("  <meta charset=\"utf-8\">\n");
        output.push_str(&format!("  <title>{}</title>\n", title));
        output.push_str("  <style>\n");
        output.push_str(STYLESHEET);
        output.push_str("  </style>\n");
        output.push_str("</head>\n");
        output.push_str("<body>\n");
        output.push_str(&format!("  <h1>{}</h1>\n", title));
        write_details(tree, 1, &mut output);
        write_list(&tree.children, 1, &mut output);
        output.push_str("</body>\n");
        output.push_str("</html>\n");
        output
    }
}

fn write_list(children: &[TreeNode], depth: usize, output: &mut String) {
    if children.is_empty() {
        return;
    }
    output.push_str(&format!("{}<ul>\n", indent(depth)));
    for child in children {
        let pad = indent(depth + 1);
        output.push_str(&format!("{}<li>", pad));
        if let Some(icon) = &child.icon {
            output.push_str(&format!("<span class=\"icon\">[{}]</span> ", escape_text(icon.as_str())));
        }
        output.push_str(&escape_text(&child.content));
        output.push('\n');
        write_details(child, depth + 2, output);
        write_list(&child.children, depth + 2, output);
        output.push_str(&format!("{}</li>\n", pad));
    }
    output.push_str(&format!("{}</ul>\n", indent(depth)));
}

fn write_details(node: &TreeNode, depth: usize, output: &mut String) {
    let Some(metadata) = &node.metadata else {
        return;
    };
    let pad = indent(depth);

    if let Some(notes) = metadata.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        output.push_str(&format!("{}<p class=\"notes\">{}</p>\n", pad, escape_text(notes)));
    }
    if !metadata.tags.is_empty() {
        let tags: Vec<String> = metadata.tags.iter().map(|t| format!("#{}", escape_text(t))).collect();
        output.push_str(&format!("{}<p class=\"tags\">{}</p>\n", pad, tags.join(" ")));
    }
    if !metadata.custom.is_empty() {
        output.push_str(&format!("{}<dl class=\"fields\">\n", pad));
        for (key, value) in &metadata.custom {
            output.push_str(&format!(
                "{}  <dt>{}</dt><dd>{}</dd>\n",
                pad,
                escape_text(key),
                escape_text(value)
            ));
        }
        output.push_str(&format!("{}</dl>\n", pad));
    }
}
