//! Recursive-descent parser with Pratt-style expression precedence
//! (spec.md §4.2).
//!
//! The parser holds a single current-token cursor and peeks one token
//! ahead; `advance`/`check`/`expect` below are the primitives every other
//! parsing method in this module (and its siblings `expr`, `stmt`,
//! `pattern`) is built from.

mod expr;
mod pattern;
mod stmt;
mod types;

use wync_base::{Interner, Span};

use crate::ast::Program;
use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

pub struct Parser<'s> {
    pub(crate) source: &'s str,
    pub(crate) interner: &'s mut Interner,
    tokens: Vec<Token>,
    pos: usize,
    pub errors: Vec<ParseError>,
    pub had_error: bool,
    /// Suppressed while parsing an `if`/`while`/`for`/`match` head, so a
    /// bare identifier immediately followed by `{` is read as the start of
    /// the body block rather than a struct initializer.
    pub(crate) no_struct_literal: bool,
}

impl<'s> Parser<'s> {
    pub fn new(source: &'s str, interner: &'s mut Interner) -> Self {
        let tokens = Lexer::new(source).tokenize();
        Parser {
            source,
            interner,
            tokens,
            pos: 0,
            errors: Vec::new(),
            had_error: false,
            no_struct_literal: false,
        }
    }

    /// Parses a sub-expression with struct-literal parsing suppressed, for
    /// use in `if`/`while`/`for`/`match` heads (spec.md §4.2).
    pub(crate) fn parse_head_expr(&mut self) -> Result<crate::ast::Expr, ParseError> {
        let prev = self.no_struct_literal;
        self.no_struct_literal = true;
        let result = self.parse_expr();
        self.no_struct_literal = prev;
        result
    }

    /// Parses the whole token stream into a [`Program`]. Check `had_error`
    /// (or `errors`) afterward; the driver must not proceed to the checker
    /// when it is set (spec.md §4.2, "Failure policy").
    pub fn parse_program(&mut self) -> Program {
        let mut stmts = Vec::new();
        while !self.check(TokenKind::Eof) {
            match self.parse_top_level_stmt() {
                Ok(stmt) => stmts.push(stmt),
                Err(e) => {
                    self.had_error = true;
                    self.errors.push(e);
                    break;
                }
            }
        }
        stmts
    }

    // ---- token navigation -------------------------------------------------

    pub(crate) fn peek(&self) -> Token {
        self.tokens[self.pos]
    }

    pub(crate) fn peek_next(&self) -> Token {
        self.tokens
            .get(self.pos + 1)
            .copied()
            .unwrap_or_else(|| self.tokens[self.tokens.len() - 1])
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    pub(crate) fn advance(&mut self) -> Token {
        let t = self.tokens[self.pos];
        if !self.check(TokenKind::Eof) {
            self.pos += 1;
        }
        t
    }

    pub(crate) fn bump_if(&mut self, kind: TokenKind) -> Option<Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    pub(crate) fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(what))
        }
    }

    pub(crate) fn unexpected(&self, expected: &str) -> ParseError {
        let t = self.peek();
        if t.kind == TokenKind::Eof {
            ParseError {
                kind: ParseErrorKind::UnexpectedEof {
                    expected: expected.to_string(),
                },
                span: t.span,
                line: t.line,
            }
        } else {
            ParseError {
                kind: ParseErrorKind::UnexpectedToken {
                    expected: expected.to_string(),
                    found: format!("{:?} {:?}", t.kind, t.lexeme(self.source)),
                },
                span: t.span,
                line: t.line,
            }
        }
    }

    pub(crate) fn lexeme(&self, t: Token) -> &'s str {
        t.lexeme(self.source)
    }

    pub(crate) fn intern(&mut self, t: Token) -> wync_base::Symbol {
        let s = self.lexeme(t).to_string();
        self.interner.intern(&s)
    }

    /// Statement terminators are optional: a `;` is consumed if present,
    /// but its absence is never an error (spec.md §4.2).
    pub(crate) fn skip_optional_semi(&mut self) {
        self.bump_if(TokenKind::Semi);
    }

    pub(crate) fn span_from(&self, start: Token) -> Span {
        let end = self.tokens[self.pos.saturating_sub(1).max(0)];
        start.span.merge(end.span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::StmtKind;

    fn parse(src: &str) -> (Program, bool) {
        let mut interner = Interner::new();
        let mut p = Parser::new(src, &mut interner);
        let prog = p.parse_program();
        (prog, p.had_error)
    }

    #[test]
    fn parses_hello_world() {
        let (prog, had_error) = parse(r#"fn main() -> int { print("hello"); return 0 }"#);
        assert!(!had_error);
        assert_eq!(prog.len(), 1);
        assert!(matches!(prog[0].kind, StmtKind::FunctionDef { .. }));
    }

    #[test]
    fn parses_let_with_destructuring() {
        let (prog, had_error) = parse("let (a, b) = (1, 2)");
        assert!(!had_error);
        assert_eq!(prog.len(), 1);
    }

    #[test]
    fn reports_error_on_mismatch() {
        let (_prog, had_error) = parse("fn main( {");
        assert!(had_error);
    }
}
