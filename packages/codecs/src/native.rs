//! Native JSON format.
//!
//! The only full-fidelity format: content, hierarchy, notes, tags, custom
//! fields, cross-links, icons, clouds, colours and fold state all survive.
//! Output is pretty-printed with a trailing newline and is stable, so
//! `serialize(parse(serialize(t))) == serialize(t)`.
//!
//! Nesting depth is unbounded: the reader grows its stack on demand instead
//! of stopping at serde_json's default recursion limit.

use mindmap_model::TreeNode;
use serde::Deserialize;

use crate::error::{CodecError, ParseError, ParseResult};
use crate::format::Format;
use crate::{finish, Codec};

pub struct NativeCodec;

impl Codec for NativeCodec {
    fn format(&self) -> Format {
        Format::Native
    }

    fn parse(&self, text: &str) -> ParseResult<TreeNode> {
        if text.trim().is_empty() {
            return Err(ParseError::Empty {
                format: Format::Native,
            });
        }

        let tree = read_unbounded(text).map_err(|e| {
            ParseError::invalid_syntax(Format::Native, e.line(), e.to_string())
        })?;

        finish(Format::Native, tree)
    }

    fn serialize(&self, tree: &TreeNode) -> Result<String, CodecError> {
        let mut output = serde_json::to_string_pretty(tree).map_err(|e| CodecError::Serialize {
            format: Format::Native,
            message: e.to_string(),
        })?;
        output.push('\n');
        Ok(output)
    }
}

fn read_unbounded(text: &str) -> Result<TreeNode, serde_json::Error> {
    let mut json = serde_json::Deserializer::from_str(text);
    json.disable_recursion_limit();
    let tree = TreeNode::deserialize(serde_stacker::Deserializer::new(&mut json))?;
    json.end()?;
    Ok(tree)
}
