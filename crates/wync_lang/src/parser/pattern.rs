//! Pattern grammar: shared by `let`-bindings, function parameters, and
//! `match` expressions/statements (spec.md §3 "Pattern", §4.2).

use super::Parser;
use crate::ast::{Expr, ExprKind, Pattern};
use crate::error::{ParseError, ParseErrorKind};
use crate::token::TokenKind;

impl<'s> Parser<'s> {
    /// Parses one pattern, including a trailing `if <guard>` clause.
    pub(crate) fn parse_pattern(&mut self) -> Result<Pattern, ParseError> {
        let base = self.parse_pattern_base()?;
        if self.bump_if(TokenKind::If).is_some() {
            let guard = self.parse_expr()?;
            let span = base.span().merge(guard.span);
            return Ok(Pattern::Guarded {
                inner: Box::new(base),
                guard: Box::new(guard),
                span,
            });
        }
        Ok(base)
    }

    /// The pattern grammar without its trailing `if` guard — used by the
    /// `match` *statement*, which carries its guard as a separate
    /// `MatchCase::guard` field instead of wrapping the pattern in
    /// `Pattern::Guarded` (spec.md §3, `MatchCase`).
    pub(crate) fn parse_pattern_base(&mut self) -> Result<Pattern, ParseError> {
        let tok = self.peek();
        match tok.kind {
            TokenKind::Ident => {
                let name = self.lexeme(tok);
                match name {
                    "_" => {
                        self.advance();
                        Ok(Pattern::Wildcard { span: tok.span })
                    }
                    "Some" => {
                        self.advance();
                        self.expect(TokenKind::LParen, "'('")?;
                        let inner = self.parse_pattern()?;
                        let close = self.expect(TokenKind::RParen, "')'")?;
                        Ok(Pattern::OptionSome {
                            inner: Box::new(inner),
                            span: tok.span.merge(close.span),
                        })
                    }
                    "None" => {
                        self.advance();
                        Ok(Pattern::OptionNone { span: tok.span })
                    }
                    _ => {
                        self.advance();
                        let sym = self.interner.intern(name);
                        if self.check(TokenKind::LBrace) {
                            self.parse_struct_pattern(tok, sym)
                        } else {
                            self.maybe_range_pattern_from_ident(tok, sym)
                        }
                    }
                }
            }
            TokenKind::Int | TokenKind::Float | TokenKind::Str | TokenKind::Char
            | TokenKind::True | TokenKind::False | TokenKind::Minus => {
                self.parse_literal_or_range_pattern()
            }
            TokenKind::LParen => self.parse_tuple_pattern(),
            TokenKind::LBracket => self.parse_array_pattern(),
            _ => Err(self.unexpected("a pattern")),
        }
    }

    /// A plain `Ident` pattern is always a binding; `name..other` / `name..=other`
    /// is only reachable for range-like identifiers bound to char/int constants,
    /// which the checker rejects if the endpoints are not literals — the
    /// grammar itself just treats a bare identifier as irrefutable unless
    /// followed by a range operator applied to a leading literal (see
    /// `parse_literal_or_range_pattern`). A standalone identifier is always a
    /// binding pattern.
    fn maybe_range_pattern_from_ident(
        &mut self,
        tok: crate::token::Token,
        sym: wync_base::Symbol,
    ) -> Result<Pattern, ParseError> {
        Ok(Pattern::Ident {
            name: sym,
            span: tok.span,
        })
    }

    fn parse_struct_pattern(
        &mut self,
        tok: crate::token::Token,
        type_name: wync_base::Symbol,
    ) -> Result<Pattern, ParseError> {
        self.advance(); // '{'
        let mut fields = Vec::new();
        while !self.check(TokenKind::RBrace) {
            let field_tok = self.expect(TokenKind::Ident, "a field name")?;
            let field_name = self.intern(field_tok);
            let pat = if self.bump_if(TokenKind::Colon).is_some() {
                self.parse_pattern()?
            } else {
                Pattern::Ident {
                    name: field_name,
                    span: field_tok.span,
                }
            };
            fields.push((field_name, pat));
            if self.bump_if(TokenKind::Comma).is_none() {
                break;
            }
        }
        let close = self.expect(TokenKind::RBrace, "'}'")?;
        Ok(Pattern::Struct {
            type_name,
            fields,
            span: tok.span.merge(close.span),
        })
    }

    fn parse_tuple_pattern(&mut self) -> Result<Pattern, ParseError> {
        let open = self.advance();
        let mut elements = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                elements.push(self.parse_pattern()?);
                if self.bump_if(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        let close = self.expect(TokenKind::RParen, "')'")?;
        Ok(Pattern::Tuple {
            elements,
            span: open.span.merge(close.span),
        })
    }

    /// `[a, b, ..rest]` — a trailing `..name` binds every remaining element
    /// (spec.md §3, "Array with optional rest binding").
    fn parse_array_pattern(&mut self) -> Result<Pattern, ParseError> {
        let open = self.advance();
        let mut elements = Vec::new();
        let mut rest = None;
        if !self.check(TokenKind::RBracket) {
            loop {
                if self.bump_if(TokenKind::DotDot).is_some() {
                    let name_tok = self.expect(TokenKind::Ident, "a rest-binding name")?;
                    rest = Some(self.intern(name_tok));
                    break;
                }
                elements.push(self.parse_pattern()?);
                if self.bump_if(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        let close = self.expect(TokenKind::RBracket, "']'")?;
        Ok(Pattern::Array {
            elements,
            rest,
            span: open.span.merge(close.span),
        })
    }

    /// Integer/float/string/char/bool literal pattern, or `lit..lit` /
    /// `lit..=lit` range pattern.
    fn parse_literal_or_range_pattern(&mut self) -> Result<Pattern, ParseError> {
        let start_expr = self.parse_pattern_literal_expr()?;
        if self.check(TokenKind::DotDot) || self.check(TokenKind::DotDotEq) {
            let op = self.advance();
            let inclusive = op.kind == TokenKind::DotDotEq;
            let end_expr = self.parse_pattern_literal_expr()?;
            let span = start_expr.span.merge(end_expr.span);
            return Ok(Pattern::Range {
                start: Box::new(start_expr),
                end: Box::new(end_expr),
                inclusive,
                span,
            });
        }
        Ok(Pattern::Literal(Box::new(start_expr)))
    }

    /// Parses exactly one literal (optionally unary-minus-prefixed) as an
    /// `Expr`, for use as a pattern or range endpoint.
    fn parse_pattern_literal_expr(&mut self) -> Result<Expr, ParseError> {
        if let Some(minus) = self.bump_if(TokenKind::Minus) {
            let inner = self.parse_pattern_literal_expr()?;
            let span = minus.span.merge(inner.span);
            return Ok(Expr::new(
                ExprKind::Unary {
                    op: minus,
                    operand: Box::new(inner),
                },
                minus,
                span,
            ));
        }
        let tok = self.peek();
        match tok.kind {
            TokenKind::Int => {
                self.advance();
                let v: i64 = self.lexeme(tok).parse().unwrap_or(0);
                Ok(Expr::new(ExprKind::IntLit(v), tok, tok.span))
            }
            TokenKind::Float => {
                self.advance();
                let v: f64 = self.lexeme(tok).parse().unwrap_or(0.0);
                Ok(Expr::new(ExprKind::FloatLit(v), tok, tok.span))
            }
            TokenKind::Str => {
                self.advance();
                let raw = self.lexeme(tok);
                let inner = &raw[1..raw.len().saturating_sub(1)];
                let sym = self.interner.intern(inner);
                Ok(Expr::new(ExprKind::StrLit(sym), tok, tok.span))
            }
            TokenKind::Char => {
                self.advance();
                let raw = self.lexeme(tok);
                let inner = &raw[1..raw.len().saturating_sub(1)];
                let c = inner.strip_prefix('\\').map_or_else(
                    || inner.chars().next().unwrap_or('\0'),
                    |rest| match rest.chars().next() {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some(c) => c,
                        None => '\0',
                    },
                );
                Ok(Expr::new(ExprKind::CharLit(c), tok, tok.span))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::new(ExprKind::BoolLit(true), tok, tok.span))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::new(ExprKind::BoolLit(false), tok, tok.span))
            }
            _ => Err(ParseError {
                kind: ParseErrorKind::InvalidPattern("expected a literal".to_string()),
                span: tok.span,
                line: tok.line,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wync_base::Interner;

    fn parse_pat(src: &str) -> Pattern {
        let mut interner = Interner::new();
        let mut p = Parser::new(src, &mut interner);
        p.parse_pattern().expect("pattern should parse")
    }

    #[test]
    fn ident_pattern_is_irrefutable() {
        let p = parse_pat("x");
        assert!(p.is_irrefutable());
    }

    #[test]
    fn wildcard_is_irrefutable() {
        let p = parse_pat("_");
        assert!(matches!(p, Pattern::Wildcard { .. }));
        assert!(p.is_irrefutable());
    }

    #[test]
    fn literal_pattern_is_refutable() {
        let p = parse_pat("42");
        assert!(!p.is_irrefutable());
    }

    #[test]
    fn tuple_of_idents_is_irrefutable() {
        let p = parse_pat("(a, b)");
        assert!(p.is_irrefutable());
        assert_eq!(p.bound_names().len(), 2);
    }

    #[test]
    fn array_pattern_with_rest_is_irrefutable() {
        let p = parse_pat("[a, b, ..rest]");
        assert!(p.is_irrefutable());
        assert_eq!(p.bound_names().len(), 3);
    }

    #[test]
    fn array_pattern_without_rest_is_refutable() {
        let p = parse_pat("[a, b]");
        assert!(!p.is_irrefutable());
    }

    #[test]
    fn option_some_pattern_is_refutable() {
        let p = parse_pat("Some(x)");
        assert!(matches!(p, Pattern::OptionSome { .. }));
        assert!(!p.is_irrefutable());
    }

    #[test]
    fn guarded_pattern_parses_guard_expression() {
        let p = parse_pat("x if x > 0");
        assert!(matches!(p, Pattern::Guarded { .. }));
    }

    #[test]
    fn range_pattern_parses() {
        let p = parse_pat("1..10");
        assert!(matches!(p, Pattern::Range { inclusive: false, .. }));
        let p2 = parse_pat("1..=10");
        assert!(matches!(p2, Pattern::Range { inclusive: true, .. }));
    }
}
