use mindmap_model::TreeError;
use thiserror::Error;

use crate::format::Format;

pub type ParseResult<T> = Result<T, ParseError>;

/// Why a text could not be imported
///
/// A parse error always means nothing was imported: codecs never return a
/// partially built tree.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("{format}: document is empty")]
    Empty { format: Format },

    #[error("{format}: invalid syntax at line {line}: {message}")]
    InvalidSyntax {
        format: Format,
        line: usize,
        message: String,
    },

    #[error("{format}: malformed markup at byte {pos}: {message}")]
    Malformed {
        format: Format,
        pos: usize,
        message: String,
    },

    #[error("{format}: missing <{element}> element")]
    MissingElement {
        format: Format,
        element: &'static str,
    },

    #[error("{format}: {error}")]
    InvalidTree { format: Format, error: TreeError },

    #[error("{format} is export-only and cannot be imported")]
    ExportOnly { format: Format },
}

impl ParseError {
    pub fn invalid_syntax(format: Format, line: usize, message: impl Into<String>) -> Self {
        Self::InvalidSyntax {
            format,
            line,
            message: message.into(),
        }
    }

    pub fn malformed(format: Format, pos: usize, message: impl ToString) -> Self {
        Self::Malformed {
            format,
            pos,
            message: message.to_string(),
        }
    }

    pub fn format(&self) -> Format {
        match self {
            ParseError::Empty { format }
            | ParseError::InvalidSyntax { format, .. }
            | ParseError::Malformed { format, .. }
            | ParseError::MissingElement { format, .. }
            | ParseError::InvalidTree { format, .. }
            | ParseError::ExportOnly { format } => *format,
        }
    }
}

#[derive(Error, Debug)]
pub enum CodecError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Failed to serialize {format}: {message}")]
    Serialize { format: Format, message: String },

    #[error("Unknown format: {0}")]
    UnknownFormat(String),
}
