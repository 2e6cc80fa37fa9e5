//! # FreeMind Maps
//!
//! Outline-tree XML where every node is a `<node TEXT="...">` element.
//!
//! ## Mapping
//!
//! | tree field         | FreeMind                                      |
//! |--------------------|-----------------------------------------------|
//! | `id`               | `ID` attribute (generated when absent)        |
//! | `content`          | `TEXT` attribute, or `<richcontent TYPE="NODE">` |
//! | `collapsed`        | `FOLDED="true"`                               |
//! | `color`            | `BACKGROUND_COLOR`                            |
//! | `icon`             | first `<icon BUILTIN>`                        |
//! | `cloud`            | `<cloud COLOR>`                               |
//! | `metadata.custom`  | `<attribute NAME VALUE>`                      |
//! | `metadata.notes`   | `<richcontent TYPE="NOTE">`, one `<p>` per line |
//! | cross-links        | `<arrowlink DESTINATION MIDDLE_LABEL>`        |
//!
//! Tags have no FreeMind equivalent and are dropped on export. Notes are
//! HTML paragraphs, so whitespace around each paragraph is not kept.

use mindmap_model::{Cloud, CrossLink, Icon, IdGenerator, TreeNode};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{CodecError, ParseError, ParseResult};
use crate::format::Format;
use crate::markup::{attributes, escape_attr, escape_text, indent};
use crate::{finish, Codec};

const FREEMIND_VERSION: &str = "1.0.1";

/// FreeMind's own default cloud colour
const DEFAULT_CLOUD_COLOR: &str = "#f0f0f0";

pub struct FreeMindCodec;

impl Codec for FreeMindCodec {
    fn format(&self) -> Format {
        Format::FreeMind
    }

    fn parse(&self, text: &str) -> ParseResult<TreeNode> {
        if text.trim().is_empty() {
            return Err(ParseError::Empty {
                format: Format::FreeMind,
            });
        }
        let tree = MapReader::new(text).read()?;
        finish(Format::FreeMind, tree)
    }

    fn serialize(&self, tree: &TreeNode) -> Result<String, CodecError> {
        let mut output = format!("<map version=\"{}\">\n", FREEMIND_VERSION);
        write_node(tree, 1, &mut output);
        output.push_str("</map>\n");
        Ok(output)
    }
}

fn write_node(node: &TreeNode, depth: usize, output: &mut String) {
    output.push_str(&indent(depth));
    output.push_str(&format!(
        "<node ID=\"{}\" TEXT=\"{}\"",
        escape_attr(&node.id),
        escape_attr(&node.content)
    ));
    if node.collapsed {
        output.push_str(" FOLDED=\"true\"");
    }
    if let Some(color) = &node.color {
        output.push_str(&format!(" BACKGROUND_COLOR=\"{}\"", escape_attr(color)));
    }

    let metadata = node.metadata.as_ref();
    let has_body = node.icon.is_some()
        || node.cloud.is_some()
        || !node.children.is_empty()
        || metadata.map_or(false, |m| {
            m.notes.is_some() || !m.custom.is_empty() || !m.cross_links.is_empty()
        });

    if !has_body {
        output.push_str("/>\n");
        return;
    }
    output.push_str(">\n");

    let pad = indent(depth + 1);
    if let Some(icon) = &node.icon {
        output.push_str(&format!("{}<icon BUILTIN=\"{}\"/>\n", pad, escape_attr(icon.as_str())));
    }
    if let Some(cloud) = &node.cloud {
        output.push_str(&format!("{}<cloud COLOR=\"{}\"/>\n", pad, escape_attr(&cloud.color)));
    }
    if let Some(metadata) = metadata {
        for (name, value) in &metadata.custom {
            output.push_str(&format!(
                "{}<attribute NAME=\"{}\" VALUE=\"{}\"/>\n",
                pad,
                escape_attr(name),
                escape_attr(value)
            ));
        }
        for link in &metadata.cross_links {
            output.push_str(&format!("{}<arrowlink DESTINATION=\"{}\"", pad, escape_attr(&link.target)));
            if let Some(label) = &link.label {
                output.push_str(&format!(" MIDDLE_LABEL=\"{}\"", escape_attr(label)));
            }
            output.push_str("/>\n");
        }
        if let Some(notes) = &metadata.notes {
            output.push_str(&pad);
            output.push_str("<richcontent TYPE=\"NOTE\"><html><head/><body>");
            for line in notes.split('\n') {
                output.push_str("<p>");
                output.push_str(&escape_text(line));
                output.push_str("</p>");
            }
            output.push_str("</body></html></richcontent>\n");
        }
    }

    for child in &node.children {
        write_node(child, depth + 1, output);
    }

    output.push_str(&indent(depth));
    output.push_str("</node>\n");
}

#[derive(Clone, Copy, PartialEq)]
enum RichKind {
    Note,
    NodeText,
}

/// Text collected from a `<richcontent>` HTML fragment
struct RichBuffer {
    kind: RichKind,
    paragraphs: Vec<String>,
    current: String,
}

impl RichBuffer {
    fn new(kind: RichKind) -> Self {
        Self {
            kind,
            paragraphs: Vec::new(),
            current: String::new(),
        }
    }

    fn push_text(&mut self, text: &str) {
        if !self.current.is_empty() {
            self.current.push(' ');
        }
        self.current.push_str(text);
    }

    fn end_block(&mut self, keep_empty: bool) {
        if keep_empty || !self.current.is_empty() {
            self.paragraphs.push(std::mem::take(&mut self.current));
        }
    }

    fn finish(mut self) -> String {
        self.end_block(false);
        self.paragraphs.join("\n")
    }
}

struct MapReader<'a> {
    reader: Reader<&'a [u8]>,
    ids: IdGenerator,
    stack: Vec<TreeNode>,
    root: Option<TreeNode>,
    rich: Option<RichBuffer>,
    saw_map: bool,
}

impl<'a> MapReader<'a> {
    fn new(text: &'a str) -> Self {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(true);
        Self {
            reader,
            ids: IdGenerator::for_source(text),
            stack: Vec::new(),
            root: None,
            rich: None,
            saw_map: false,
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
                .map_err(|e| ParseError::malformed(Format::FreeMind, pos, e))?;

            match event {
                Event::Start(e) => self.open(&e, false)?,
                Event::Empty(e) => self.open(&e, true)?,
                Event::End(e) => self.close(e.name().as_ref())?,
                Event::Text(t) => {
                    if self.rich.is_some() {
                        let text = t
                            .unescape()
                            .map_err(|e| ParseError::malformed(Format::FreeMind, pos, e))?;
                        if let Some(rich) = self.rich.as_mut() {
                            rich.push_text(&text);
                        }
                    }
                }
                Event::CData(t) => {
                    if let Some(rich) = self.rich.as_mut() {
                        rich.push_text(&String::from_utf8_lossy(&t));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !self.stack.is_empty() {
            return Err(ParseError::malformed(
                Format::FreeMind,
                self.pos(),
                "unclosed <node> element",
            ));
        }
        if !self.saw_map {
            return Err(ParseError::MissingElement {
                format: Format::FreeMind,
                element: "map",
            });
        }
        self.root.ok_or(ParseError::MissingElement {
            format: Format::FreeMind,
            element: "node",
        })
    }

    fn open(&mut self, element: &BytesStart<'_>, empty: bool) -> ParseResult<()> {
        let pos = self.pos();
        let name = element.name();

        match name.as_ref() {
            b"map" => self.saw_map = true,
            b"node" => {
                if !self.saw_map {
                    return Err(ParseError::MissingElement {
                        format: Format::FreeMind,
                        element: "map",
                    });
                }
                let attrs = attributes(element, Format::FreeMind, pos)?;
                let id = match attrs.get("ID") {
                    Some(id) if !id.is_empty() => id.clone(),
                    _ => self.ids.new_id(),
                };
                let mut node = TreeNode::new(id, attrs.get("TEXT").cloned().unwrap_or_default());
                node.collapsed = attrs.get("FOLDED").map(String::as_str) == Some("true");
                node.color = attrs.get("BACKGROUND_COLOR").cloned();
                self.stack.push(node);

                if empty {
                    self.close_node(pos)?;
                }
            }
            b"icon" => {
                let attrs = attributes(element, Format::FreeMind, pos)?;
                if let (Some(node), Some(builtin)) = (self.stack.last_mut(), attrs.get("BUILTIN")) {
                    if node.icon.is_none() {
                        node.icon = Some(Icon(builtin.clone()));
                    }
                }
            }
            b"cloud" => {
                let attrs = attributes(element, Format::FreeMind, pos)?;
                if let Some(node) = self.stack.last_mut() {
                    node.cloud = Some(Cloud {
                        color: attrs
                            .get("COLOR")
                            .cloned()
                            .unwrap_or_else(|| DEFAULT_CLOUD_COLOR.to_string()),
                    });
                }
            }
            b"attribute" => {
                let mut attrs = attributes(element, Format::FreeMind, pos)?;
                if let (Some(node), Some(key)) = (self.stack.last_mut(), attrs.remove("NAME")) {
                    let value = attrs.remove("VALUE").unwrap_or_default();
                    node.metadata_mut().custom.insert(key, value);
                }
            }
            b"arrowlink" => {
                let mut attrs = attributes(element, Format::FreeMind, pos)?;
                if let (Some(node), Some(target)) =
                    (self.stack.last_mut(), attrs.remove("DESTINATION"))
                {
                    node.metadata_mut().cross_links.push(CrossLink {
                        target,
                        label: attrs.remove("MIDDLE_LABEL").filter(|l| !l.is_empty()),
                    });
                }
            }
            b"richcontent" if !empty => {
                let attrs = attributes(element, Format::FreeMind, pos)?;
                self.rich = match attrs.get("TYPE").map(String::as_str) {
                    Some("NOTE") => Some(RichBuffer::new(RichKind::Note)),
                    Some("NODE") => Some(RichBuffer::new(RichKind::NodeText)),
                    _ => None,
                };
            }
            b"br" => {
                if let Some(rich) = self.rich.as_mut() {
                    rich.end_block(true);
                }
            }
            _ => {}
        }

        Ok(())
    }

    fn close(&mut self, name: &[u8]) -> ParseResult<()> {
        match name {
            b"node" => self.close_node(self.pos())?,
            b"richcontent" => {
                if let Some(rich) = self.rich.take() {
                    let kind = rich.kind;
                    let text = rich.finish();
                    if let Some(node) = self.stack.last_mut() {
                        match kind {
                            RichKind::Note if !text.is_empty() => {
                                node.metadata_mut().notes = Some(text);
                            }
                            RichKind::NodeText if node.content.is_empty() => node.content = text,
                            _ => {}
                        }
                    }
                }
            }
            b"p" => {
                if let Some(rich) = self.rich.as_mut() {
                    rich.end_block(true);
                }
            }
            b"div" | b"li" | b"h1" | b"h2" | b"h3" | b"h4" | b"h5" | b"h6" => {
                if let Some(rich) = self.rich.as_mut() {
                    rich.end_block(false);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn close_node(&mut self, pos: usize) -> ParseResult<()> {
        let Some(node) = self.stack.pop() else {
            return Ok(());
        };

        if let Some(parent) = self.stack.last_mut() {
            parent.children.push(node);
        } else if self.root.is_some() {
            return Err(ParseError::malformed(
                Format::FreeMind,
                pos,
                "map contains more than one root node",
            ));
        } else {
            self.root = Some(node);
        }
        Ok(())
    }
}
