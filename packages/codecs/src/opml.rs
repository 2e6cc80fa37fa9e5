//! OPML outlines.
//!
//! Each node is an `<outline text="...">` element inside `<body>`. Notes
//! travel in the widely supported `_note` attribute. OPML has no ids, so
//! imported nodes get generated ids; icons, clouds, tags, custom fields and
//! cross-links are not representable and are dropped on export.

use mindmap_model::{IdGenerator, TreeNode};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{CodecError, ParseError, ParseResult};
use crate::format::Format;
use crate::markup::{attributes, escape_attr, escape_text, indent};
use crate::{finish, Codec};

/// Title of the synthesized root when the body has several top-level outlines
const DEFAULT_ROOT_TITLE: &str = "Mind Map";

pub struct OpmlCodec;

impl Codec for OpmlCodec {
    fn format(&self) -> Format {
        Format::Opml
    }

    fn parse(&self, text: &str) -> ParseResult<TreeNode> {
        if text.trim().is_empty() {
            return Err(ParseError::Empty {
                format: Format::Opml,
            });
        }
        let tree = OutlineReader::new(text).read()?;
        finish(Format::Opml, tree)
    }

    fn serialize(&self, tree: &TreeNode) -> Result<String, CodecError> {
        let mut output = String::new();
        output.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        output.push_str("<opml version=\"2.0\">\n");
        output.push_str("  <head>\n");
        output.push_str(&format!("    <title>{}</title>\n", escape_text(&tree.content)));
        output.push_str("  </head>\n");
        output.push_str("  <body>\n");
        write_outline(tree, 2, &mut output);
        output.push_str("  </body>\n");
        output.push_str("</opml>\n");
        Ok(output)
    }
}

fn write_outline(node: &TreeNode, depth: usize, output: &mut String) {
    output.push_str(&indent(depth));
    output.push_str(&format!("<outline text=\"{}\"", escape_attr(&node.content)));
    if let Some(notes) = node.notes() {
        output.push_str(&format!(" _note=\"{}\"", escape_attr(notes)));
    }

    if node.children.is_empty() {
        output.push_str("/>\n");
        return;
    }

    output.push_str(">\n");
    for child in &node.children {
        write_outline(child, depth + 1, output);
    }
    output.push_str(&indent(depth));
    output.push_str("</outline>\n");
}

struct OutlineReader<'a> {
    reader: Reader<&'a [u8]>,
    ids: IdGenerator,
    stack: Vec<TreeNode>,
    top_level: Vec<TreeNode>,
    title: Option<String>,
    in_title: bool,
    saw_opml: bool,
    saw_body: bool,
    in_body: bool,
}

impl<'a> OutlineReader<'a> {
    fn new(text: &'a str) -> Self {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(true);
        Self {
            reader,
            ids: IdGenerator::for_source(text),
            stack: Vec::new(),
            top_level: Vec::new(),
            title: None,
            in_title: false,
            saw_opml: false,
            saw_body: false,
            in_body: false,
        }
    }

    fn pos(&self) -> usize {
        self.reader.buffer_position() as usize
    }

    fn read(mut self) -> ParseResult<TreeNode> {
        loop {
            let pos = self.pos();
            let event = self
                .reader
                .read_event()
                .map_err(|e| ParseError::malformed(Format::Opml, pos, e))?;

            match event {
                Event::Start(e) => self.open(&e, false, pos)?,
                Event::Empty(e) => self.open(&e, true, pos)?,
                Event::End(e) => match e.name().as_ref() {
                    b"outline" => self.close_outline(),
                    b"body" => self.in_body = false,
                    b"title" => self.in_title = false,
                    _ => {}
                },
                Event::Text(t) if self.in_title => {
                    let text = t
                        .unescape()
                        .map_err(|e| ParseError::malformed(Format::Opml, pos, e))?;
                    self.title = Some(text.into_owned());
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !self.saw_opml {
            return Err(ParseError::MissingElement {
                format: Format::Opml,
                element: "opml",
            });
        }
        if !self.saw_body {
            return Err(ParseError::MissingElement {
                format: Format::Opml,
                element: "body",
            });
        }
        if !self.stack.is_empty() {
            return Err(ParseError::malformed(
                Format::Opml,
                self.pos(),
                "unclosed <outline> element",
            ));
        }

        let mut top_level = self.top_level;
        match top_level.len() {
            0 => Err(ParseError::MissingElement {
                format: Format::Opml,
                element: "outline",
            }),
            1 => Ok(top_level.remove(0)),
            _ => {
                let title = self
                    .title
                    .filter(|t| !t.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_ROOT_TITLE.to_string());
                Ok(TreeNode::new(self.ids.new_id(), title).with_children(top_level))
            }
        }
    }

    fn open(&mut self, element: &BytesStart<'_>, empty: bool, pos: usize) -> ParseResult<()> {
        match element.name().as_ref() {
            b"opml" => self.saw_opml = true,
            b"title" if !empty => self.in_title = true,
            b"body" => {
                self.saw_body = true;
                self.in_body = !empty;
            }
            b"outline" => {
                if !self.in_body {
                    return Err(ParseError::malformed(
                        Format::Opml,
                        pos,
                        "<outline> outside of <body>",
                    ));
                }
                let mut attrs = attributes(element, Format::Opml, pos)?;
                let text = attrs
                    .remove("text")
                    .or_else(|| attrs.remove("title"))
                    .unwrap_or_default();

                let mut node = TreeNode::new(self.ids.new_id(), text);
                if let Some(note) = attrs.remove("_note").filter(|n| !n.is_empty()) {
                    node.metadata_mut().notes = Some(note);
                }
                self.stack.push(node);

                if empty {
                    self.close_outline();
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn close_outline(&mut self) {
        if let Some(node) = self.stack.pop() {
            match self.stack.last_mut() {
                Some(parent) => parent.children.push(node),
                None => self.top_level.push(node),
            }
        }
    }
}
