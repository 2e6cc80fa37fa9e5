//! Escaping and attribute helpers shared by the XML and HTML codecs.

use quick_xml::escape::escape;
use quick_xml::events::BytesStart;
use std::collections::HashMap;

use crate::error::{ParseError, ParseResult};
use crate::format::Format;

/// Escape text for element content
pub fn escape_text(text: &str) -> String {
    escape(text).into_owned()
}

/// Escape text for a double-quoted attribute, keeping line breaks intact
pub fn escape_attr(text: &str) -> String {
    escape(text)
        .replace('\n', "&#10;")
        .replace('\r', "&#13;")
        .replace('\t', "&#9;")
}

/// Collect the unescaped attributes of an element by name
pub fn attributes(
    element: &BytesStart<'_>,
    format: Format,
    pos: usize,
) -> ParseResult<HashMap<String, String>> {
    let mut attrs = HashMap::new();
    for attr in element.attributes() {
        let attr = attr.map_err(|e| ParseError::malformed(format, pos, e))?;
        let value = attr
            .unescape_value()
            .map_err(|e| ParseError::malformed(format, pos, e))?;
        attrs.insert(
            String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            value.into_owned(),
        );
    }
    Ok(attrs)
}

/// Two spaces per level
pub fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_attr_keeps_newlines() {
        assert_eq!(escape_attr("a\"b\nc"), "a&quot;b&#10;c");
        assert_eq!(escape_text("<a & b>"), "&lt;a &amp; b&gt;");
    }
}
