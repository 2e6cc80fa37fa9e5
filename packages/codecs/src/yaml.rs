//! YAML mirror of the native record.
//!
//! Same schema and field names as [`crate::native`], so it is lossless up to
//! [`MAX_YAML_DEPTH`] levels. The YAML reader stops at 128 nested
//! collections and every tree level costs two of them, so deeper trees are
//! refused when writing rather than producing a file that cannot be read.

use mindmap_model::TreeNode;

use crate::error::{CodecError, ParseError, ParseResult};
use crate::format::Format;
use crate::{finish, Codec};

/// Deepest tree level the YAML mirror can hold
pub const MAX_YAML_DEPTH: usize = 60;

pub struct YamlCodec;

impl Codec for YamlCodec {
    fn format(&self) -> Format {
        Format::Yaml
    }

    fn parse(&self, text: &str) -> ParseResult<TreeNode> {
        if text.trim().is_empty() {
            return Err(ParseError::Empty {
                format: Format::Yaml,
            });
        }

        let tree: TreeNode = serde_yaml::from_str(text).map_err(|e| {
            let line = e.location().map(|l| l.line()).unwrap_or(0);
            ParseError::invalid_syntax(Format::Yaml, line, e.to_string())
        })?;

        finish(Format::Yaml, tree)
    }

    fn serialize(&self, tree: &TreeNode) -> Result<String, CodecError> {
        let depth = tree.depth();
        if depth > MAX_YAML_DEPTH {
            return Err(CodecError::Serialize {
                format: Format::Yaml,
                message: format!("tree is {} levels deep, YAML holds at most {}", depth, MAX_YAML_DEPTH),
            });
        }
        serde_yaml::to_string(tree).map_err(|e| CodecError::Serialize {
            format: Format::Yaml,
            message: e.to_string(),
        })
    }
}
