#![cfg_attr(docsrs, feature(doc_cfg))]

//! # wync-lang
//!
//! Front end for the Wyn compiler: the lexer, the abstract syntax tree, and
//! the recursive-descent/Pratt parser (spec.md §4.1–§4.2).
//!
//! This crate has no knowledge of semantic checking, C, or LLVM — it only
//! turns source text into an unannotated [`ast::Program`]. `wync_compile`
//! builds on top of it.

pub mod ast;
pub mod error;
pub mod keywords;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::Program;
pub use error::{ParseError, ParseErrorKind};
pub use lexer::Lexer;
pub use parser::Parser;
pub use token::{Token, TokenKind};

/// Lexes and parses `source` in one call. Returns the program together with
/// the interner that now owns every identifier/string symbol it contains,
/// and the accumulated parse diagnostics (empty when `had_error` is false).
pub fn parse(source: &str) -> (Program, wync_base::Interner, Vec<ParseError>, bool) {
    let mut interner = wync_base::Interner::new();
    let mut parser = Parser::new(source, &mut interner);
    let program = parser.parse_program();
    let errors = parser.errors.clone();
    let had_error = parser.had_error;
    (program, interner, errors, had_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_returns_program_and_interner() {
        let (program, _interner, errors, had_error) =
            parse(r#"fn main() -> int { print("hi"); return 0 }"#);
        assert!(!had_error);
        assert!(errors.is_empty());
        assert_eq!(program.len(), 1);
    }
}
