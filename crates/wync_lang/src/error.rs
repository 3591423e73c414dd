//! Parser diagnostics (spec.md §4.2 "Failure policy", §7 "Parsing").

use std::fmt;

use wync_base::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    UnexpectedToken { expected: String, found: String },
    UnexpectedEof { expected: String },
    InvalidPattern(String),
    Custom(String),
}

#[derive(Debug, Clone)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
    pub line: u32,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ParseErrorKind::UnexpectedToken { expected, found } => {
                write!(
                    f,
                    "line {}: expected {}, found {}",
                    self.line, expected, found
                )
            }
            ParseErrorKind::UnexpectedEof { expected } => {
                write!(f, "line {}: expected {}, found end of input", self.line, expected)
            }
            ParseErrorKind::InvalidPattern(msg) => {
                write!(f, "line {}: invalid pattern: {}", self.line, msg)
            }
            ParseErrorKind::Custom(msg) => write!(f, "line {}: {}", self.line, msg),
        }
    }
}

impl std::error::Error for ParseError {}
