//! # Markdown Outlines
//!
//! ## Writing
//!
//! ```text
//! # Root                 depth 0
//! > root notes
//!
//! ## Branch              depth 1
//! - Leaf                 depth 2
//!   - Deeper leaf        depth 3
//!     > leaf notes
//! ```
//!
//! ## Reading
//!
//! Headings of any level and `-`, `*`, `+` or `1.` bullets are accepted.
//! Nesting is resolved with a stack of open items: a line becomes the child
//! of the nearest open item that ranks strictly above it. Headings rank by
//! level, bullets by indentation (tabs count as four columns), and every
//! bullet ranks below every heading. Mixed two- and four-space indentation
//! therefore nests by relative position instead of by a fixed unit.
//!
//! Quote and plain text lines become notes of the item above them. Several
//! top-level items are wrapped in a synthesized root.

use mindmap_model::{IdGenerator, TreeNode};

use crate::error::{CodecError, ParseError, ParseResult};
use crate::export::one_line;
use crate::format::Format;
use crate::{finish, Codec};

const TAB_WIDTH: usize = 4;
const DEFAULT_ROOT_TITLE: &str = "Mind Map";

pub struct MarkdownCodec;

impl Codec for MarkdownCodec {
    fn format(&self) -> Format {
        Format::Markdown
    }

    fn parse(&self, text: &str) -> ParseResult<TreeNode> {
        let mut ids = IdGenerator::for_source(text);
        let mut stack: Vec<OpenItem> = Vec::new();
        let mut top_level: Vec<TreeNode> = Vec::new();

        for (index, raw) in text.lines().enumerate() {
            let line_no = index + 1;
            let line = match classify(raw) {
                Some(line) => line,
                None => continue,
            };

            match line {
                Line::Item { rank, content } => {
                    // Close everything ranked at or below the new item
                    while stack.last().map_or(false, |open| open.rank >= rank) {
                        close_top(&mut stack, &mut top_level);
                    }
                    stack.push(OpenItem {
                        rank,
                        node: TreeNode::new(ids.new_id(), content),
                    });
                }
                Line::Note(note) => {
                    let open = stack.last_mut().ok_or_else(|| {
                        ParseError::invalid_syntax(
                            Format::Markdown,
                            line_no,
                            "text before the first heading or bullet",
                        )
                    })?;
                    let metadata = open.node.metadata_mut();
                    match metadata.notes.as_mut() {
                        Some(notes) => {
                            notes.push('\n');
                            notes.push_str(note);
                        }
                        None => metadata.notes = Some(note.to_string()),
                    }
                }
            }
        }

        while !stack.is_empty() {
            close_top(&mut stack, &mut top_level);
        }

        let tree = match top_level.len() {
            0 => {
                return Err(ParseError::Empty {
                    format: Format::Markdown,
                })
            }
            1 => top_level.remove(0),
            _ => TreeNode::new(ids.new_id(), DEFAULT_ROOT_TITLE).with_children(top_level),
        };

        finish(Format::Markdown, tree)
    }

    fn serialize(&self, tree: &TreeNode) -> Result<String, CodecError> {
        let mut output = String::new();
        write_node(tree, 0, &mut output);
        Ok(output)
    }
}

/// Ordering key of an item: headings by level, then bullets by indentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Rank {
    Heading(usize),
    Bullet(usize),
}

struct OpenItem {
    rank: Rank,
    node: TreeNode,
}

enum Line<'a> {
    Item { rank: Rank, content: &'a str },
    Note(&'a str),
}

fn close_top(stack: &mut Vec<OpenItem>, top_level: &mut Vec<TreeNode>) {
    if let Some(done) = stack.pop() {
        match stack.last_mut() {
            Some(parent) => parent.node.children.push(done.node),
            None => top_level.push(done.node),
        }
    }
}

/// Classify one line; blank lines and thematic breaks yield `None`
fn classify(raw: &str) -> Option<Line<'_>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "---" || trimmed == "***" {
        return None;
    }

    if let Some(level) = heading_level(trimmed) {
        return Some(Line::Item {
            rank: Rank::Heading(level),
            content: heading_text(&trimmed[level..]),
        });
    }

    if let Some(content) = bullet_content(trimmed) {
        return Some(Line::Item {
            rank: Rank::Bullet(indent_width(raw)),
            content,
        });
    }

    // Quoted notes keep their own spacing, trailing spaces included
    if let Some(quote) = raw.trim_start().strip_prefix('>') {
        return Some(Line::Note(quote.strip_prefix(' ').unwrap_or(quote)));
    }

    Some(Line::Note(trimmed))
}

fn heading_level(line: &str) -> Option<usize> {
    let level = line.chars().take_while(|c| *c == '#').count();
    let rest = &line[level..];
    if (1..=6).contains(&level) && (rest.is_empty() || rest.starts_with(' ')) {
        Some(level)
    } else {
        None
    }
}

/// Heading text without its optional closing `#` run
///
/// The run only closes the heading when whitespace precedes it or it is all
/// there is, so `## C#` keeps its text.
fn heading_text(rest: &str) -> &str {
    let text = rest.trim();
    let open = text.trim_end_matches('#');
    if open.is_empty() {
        ""
    } else if open.ends_with(|c: char| c == ' ' || c == '\t') {
        open.trim_end()
    } else {
        text
    }
}

fn bullet_content(line: &str) -> Option<&str> {
    for marker in ["- ", "* ", "+ "] {
        if let Some(rest) = line.strip_prefix(marker) {
            return Some(rest.trim());
        }
    }
    if line == "-" || line == "*" || line == "+" {
        return Some("");
    }

    // Ordered list: digits followed by `.` or `)` and a space
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &line[digits..];
        for marker in [". ", ") "] {
            if let Some(content) = rest.strip_prefix(marker) {
                return Some(content.trim());
            }
        }
    }
    None
}

fn indent_width(line: &str) -> usize {
    let mut width = 0;
    for c in line.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width += TAB_WIDTH - width % TAB_WIDTH,
            _ => break,
        }
    }
    width
}

/// Heading line text, closed with ` #` when its own trailing `#`s would be read as a closing run
fn heading_line(content: &str) -> String {
    if heading_text(content) == content {
        content.to_string()
    } else {
        format!("{} #", content)
    }
}

fn write_node(node: &TreeNode, depth: usize, output: &mut String) {
    let content = one_line(&node.content);
    let note_prefix = match depth {
        0 => {
            output.push_str(&format!("# {}\n", heading_line(&content)));
            String::new()
        }
        1 => {
            output.push_str(&format!("\n## {}\n", heading_line(&content)));
            String::new()
        }
        _ => {
            let pad = "  ".repeat(depth - 2);
            output.push_str(&format!("{}- {}\n", pad, content));
            format!("{}  ", pad)
        }
    };

    if let Some(notes) = node.notes() {
        for line in notes.split('\n') {
            if line.is_empty() {
                output.push_str(&format!("{}>\n", note_prefix));
            } else {
                output.push_str(&format!("{}> {}\n", note_prefix, line));
            }
        }
    }

    for child in &node.children {
        write_node(child, depth + 1, output);
    }
}
