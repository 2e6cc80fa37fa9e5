//! # Mindmap Codecs
//!
//! Text-level boundary of the mind map: every import and export goes
//! through this crate.
//!
//! ## Formats
//!
//! | format     | parse | serialize | fidelity                         |
//! |------------|-------|-----------|----------------------------------|
//! | native     | yes   | yes       | lossless, idempotent             |
//! | yaml       | yes   | yes       | lossless mirror of native        |
//! | freemind   | yes   | yes       | drops tags                       |
//! | opml       | yes   | yes       | keeps text and notes only        |
//! | markdown   | yes   | yes       | keeps text and notes only        |
//! | dot        | no    | export    | hierarchy plus cross-links       |
//! | html       | no    | export    | print-optimised document         |
//! | slides     | no    | export    | one slide per main branch        |
//! | outline    | no    | export    | numbered text outline            |
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mindmap_codecs::{parse, serialize, Format};
//!
//! let tree = parse(Format::Markdown, "# Plan\n## Design\n## Build\n")?;
//! let opml = serialize(Format::Opml, &tree)?;
//! ```

pub mod error;
pub mod export;
pub mod format;
pub mod freemind;
mod markup;
pub mod markdown;
pub mod native;
pub mod opml;
pub mod yaml;

pub use error::{CodecError, ParseError, ParseResult};
pub use export::{DotExporter, OutlineExporter, PrintExporter, SlidesExporter};
pub use format::Format;
pub use freemind::FreeMindCodec;
pub use markdown::MarkdownCodec;
pub use native::NativeCodec;
pub use opml::OpmlCodec;
pub use yaml::YamlCodec;

use mindmap_model::TreeNode;

/// A parse/serialize pair for one round-trippable format
pub trait Codec {
    fn format(&self) -> Format;

    /// Parse text into a validated tree
    fn parse(&self, text: &str) -> ParseResult<TreeNode>;

    /// Render a tree as text
    fn serialize(&self, tree: &TreeNode) -> Result<String, CodecError>;
}

/// A one-way renderer for export-only formats
pub trait Exporter {
    fn format(&self) -> Format;

    fn export(&self, tree: &TreeNode) -> String;
}

/// Codec for `format`, if the format can be parsed
pub fn codec_for(format: Format) -> Option<&'static dyn Codec> {
    match format {
        Format::Native => Some(&NativeCodec),
        Format::Yaml => Some(&YamlCodec),
        Format::FreeMind => Some(&FreeMindCodec),
        Format::Opml => Some(&OpmlCodec),
        Format::Markdown => Some(&MarkdownCodec),
        _ => None,
    }
}

/// Exporter for `format`, if the format is export-only
pub fn exporter_for(format: Format) -> Option<&'static dyn Exporter> {
    match format {
        Format::Dot => Some(&DotExporter),
        Format::PrintHtml => Some(&PrintExporter),
        Format::Slides => Some(&SlidesExporter),
        Format::Outline => Some(&OutlineExporter),
        _ => None,
    }
}

/// Parse `text` as `format`
pub fn parse(format: Format, text: &str) -> ParseResult<TreeNode> {
    let codec = codec_for(format).ok_or(ParseError::ExportOnly { format })?;
    let tree = codec.parse(text)?;
    tracing::debug!("Parsed {} document with {} nodes", format, tree.node_count());
    Ok(tree)
}

/// Render `tree` as `format`, dispatching to the exporter for export-only formats
pub fn serialize(format: Format, tree: &TreeNode) -> Result<String, CodecError> {
    if let Some(codec) = codec_for(format) {
        return codec.serialize(tree);
    }
    match exporter_for(format) {
        Some(exporter) => Ok(exporter.export(tree)),
        None => Err(CodecError::UnknownFormat(format.to_string())),
    }
}

/// Render `tree` with the export-only renderer for `format`
pub fn export(format: Format, tree: &TreeNode) -> Result<String, CodecError> {
    let exporter = exporter_for(format).ok_or_else(|| CodecError::UnknownFormat(format.to_string()))?;
    tracing::debug!("Exporting {} nodes as {}", tree.node_count(), format);
    Ok(exporter.export(tree))
}

/// Validate a freshly parsed tree so no codec hands out an inconsistent one
pub(crate) fn finish(format: Format, tree: TreeNode) -> ParseResult<TreeNode> {
    tree.validate()
        .map_err(|error| ParseError::InvalidTree { format, error })?;
    Ok(tree)
}
