use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::CodecError;

/// Every text format the codec layer knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Native JSON record, full fidelity
    Native,
    /// FreeMind `.mm` map (`<node TEXT>` elements)
    FreeMind,
    /// OPML outline (`<outline text>` elements)
    Opml,
    /// Headings and bullets
    Markdown,
    /// YAML mirror of the native record
    Yaml,
    /// Graphviz DOT (export-only)
    Dot,
    /// Print-optimised HTML document (export-only)
    PrintHtml,
    /// Markdown slide deck (export-only)
    Slides,
    /// Numbered presentation outline (export-only)
    Outline,
}

impl Format {
    pub const ALL: [Format; 9] = [
        Format::Native,
        Format::FreeMind,
        Format::Opml,
        Format::Markdown,
        Format::Yaml,
        Format::Dot,
        Format::PrintHtml,
        Format::Slides,
        Format::Outline,
    ];

    /// Short name accepted by `FromStr`
    pub fn name(self) -> &'static str {
        match self {
            Format::Native => "json",
            Format::FreeMind => "freemind",
            Format::Opml => "opml",
            Format::Markdown => "markdown",
            Format::Yaml => "yaml",
            Format::Dot => "dot",
            Format::PrintHtml => "html",
            Format::Slides => "slides",
            Format::Outline => "outline",
        }
    }

    /// Preferred file extension (without the dot)
    pub fn extension(self) -> &'static str {
        match self {
            Format::Native => "json",
            Format::FreeMind => "mm",
            Format::Opml => "opml",
            Format::Markdown => "md",
            Format::Yaml => "yaml",
            Format::Dot => "dot",
            Format::PrintHtml => "html",
            Format::Slides => "slides.md",
            Format::Outline => "txt",
        }
    }

    /// Whether text in this format can be parsed back into a tree
    pub fn is_parseable(self) -> bool {
        matches!(
            self,
            Format::Native | Format::FreeMind | Format::Opml | Format::Markdown | Format::Yaml
        )
    }

    /// Infer the format from a file name
    pub fn from_path(path: &Path) -> Option<Format> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        if name.ends_with(".slides.md") {
            return Some(Format::Slides);
        }
        let ext = name.rsplit_once('.')?.1;
        match ext {
            "json" => Some(Format::Native),
            "mm" => Some(Format::FreeMind),
            "opml" => Some(Format::Opml),
            "md" | "markdown" => Some(Format::Markdown),
            "yaml" | "yml" => Some(Format::Yaml),
            "dot" | "gv" => Some(Format::Dot),
            "html" | "htm" => Some(Format::PrintHtml),
            "txt" => Some(Format::Outline),
            _ => None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Format {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" | "native" => Ok(Format::Native),
            "freemind" | "mm" => Ok(Format::FreeMind),
            "opml" => Ok(Format::Opml),
            "markdown" | "md" => Ok(Format::Markdown),
            "yaml" | "yml" => Ok(Format::Yaml),
            "dot" | "graphviz" | "gv" => Ok(Format::Dot),
            "html" | "print" => Ok(Format::PrintHtml),
            "slides" => Ok(Format::Slides),
            "outline" | "txt" => Ok(Format::Outline),
            _ => Err(CodecError::UnknownFormat(s.to_string())),
        }
    }
}
