//! Machine-readable diagnostics (SPEC_FULL §F, "Diagnostics-as-JSON").
//!
//! `original_source/src/main.c` supports a machine-readable error path for
//! editor integration; we add a `serde`-serializable [`Diagnostic`] and let
//! the driver's `--json-errors` flag dump accumulated parse/check
//! diagnostics as a JSON array instead of human-readable text.

use serde::Serialize;

use wync_base::Span;
use wync_lang::error::ParseError;

use crate::error::CheckError;

/// Source stage that produced a diagnostic (spec.md §7, "Error kinds").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Parse,
    Check,
}

#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub stage: Stage,
    pub message: String,
    pub line: u32,
    pub span_start: usize,
    pub span_end: usize,
}

impl Diagnostic {
    pub fn from_parse_error(err: &ParseError) -> Self {
        Diagnostic {
            stage: Stage::Parse,
            message: err.to_string(),
            line: err.line,
            span_start: err.span.start,
            span_end: err.span.end,
        }
    }

    pub fn from_check_error(err: &CheckError, source: &str) -> Self {
        Diagnostic {
            stage: Stage::Check,
            message: err.to_string(),
            line: line_of(source, err.span),
            span_start: err.span.start,
            span_end: err.span.end,
        }
    }
}

/// 1-based line number containing `span.start`, counted the same way the
/// lexer counts lines (spec.md §4.1, "Line numbers count `\n`s seen so
/// far"). `CheckError` doesn't carry a line directly since it's produced
/// well after the lexer's token stream is gone.
fn line_of(source: &str, span: Span) -> u32 {
    1 + source
        .as_bytes()
        .iter()
        .take(span.start.min(source.len()))
        .filter(|&&b| b == b'\n')
        .count() as u32
}

/// Serializes a batch of diagnostics to a pretty-printed JSON array.
pub fn to_json(diagnostics: &[Diagnostic]) -> String {
    serde_json::to_string_pretty(diagnostics).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wync_base::Span;

    #[test]
    fn line_of_counts_newlines_before_span() {
        let src = "a\nb\nc";
        assert_eq!(line_of(src, Span::new(0, 1)), 1);
        assert_eq!(line_of(src, Span::new(2, 3)), 2);
        assert_eq!(line_of(src, Span::new(4, 5)), 3);
    }

    #[test]
    fn to_json_serializes_empty_list() {
        assert_eq!(to_json(&[]), "[]");
    }
}
