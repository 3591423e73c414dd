//! Expression grammar: precedence climbing from assignment down to
//! postfix (spec.md §4.2, "Precedence (lowest to highest)").

use wync_base::Interner;

use super::Parser;
use crate::ast::{Expr, ExprKind, InterpSegment, MatchArm, Pattern};
use crate::error::ParseError;
use crate::token::{Token, TokenKind};

impl<'s> Parser<'s> {
    pub(crate) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<Expr, ParseError> {
        let lhs = self.parse_range()?;
        if self.check(TokenKind::Eq) {
            self.advance();
            let value = self.parse_assignment()?;
            let span = lhs.span.merge(value.span);
            let token = lhs.token;
            return Ok(match lhs.kind {
                ExprKind::Field { object, name } => Expr::new(
                    ExprKind::FieldAssign {
                        object,
                        name,
                        value: Box::new(value),
                    },
                    token,
                    span,
                ),
                ExprKind::Index { container, index } => Expr::new(
                    ExprKind::IndexAssign {
                        container,
                        index,
                        value: Box::new(value),
                    },
                    token,
                    span,
                ),
                ExprKind::Ident(name) => Expr::new(
                    ExprKind::Assign {
                        name,
                        value: Box::new(value),
                    },
                    token,
                    span,
                ),
                // Any other target shape is invalid; the parser still
                // produces a node (the checker rejects it) rather than
                // panicking on malformed input.
                other => Expr::new(other, token, span),
            });
        }
        Ok(lhs)
    }

    /// `a..b`, `a..=b` (spec.md §3, `Range`). Binds looser than `or` so
    /// `a < b..c < d`-style chaining isn't needed; ranges sit directly
    /// under assignment.
    fn parse_range(&mut self) -> Result<Expr, ParseError> {
        let start = self.parse_or()?;
        if self.check(TokenKind::DotDot) || self.check(TokenKind::DotDotEq) {
            let op = self.advance();
            let inclusive = op.kind == TokenKind::DotDotEq;
            let end = self.parse_or()?;
            let span = start.span.merge(end.span);
            let token = start.token;
            return Ok(Expr::new(
                ExprKind::Range {
                    start: Box::new(start),
                    end: Box::new(end),
                    inclusive,
                },
                token,
                span,
            ));
        }
        Ok(start)
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;
        while self.check(TokenKind::Or) || self.check(TokenKind::PipePipe) {
            let op = self.advance();
            let right = self.parse_and()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_equality()?;
        while self.check(TokenKind::And) || self.check(TokenKind::AmpAmp) {
            let op = self.advance();
            let right = self.parse_equality()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_comparison()?;
        while self.check(TokenKind::EqEq) || self.check(TokenKind::NotEq) {
            let op = self.advance();
            let right = self.parse_comparison()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_bitor()?;
        while matches!(
            self.peek().kind,
            TokenKind::Lt | TokenKind::Gt | TokenKind::LtEq | TokenKind::GtEq
        ) {
            let op = self.advance();
            let right = self.parse_bitor()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_bitor(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_bitxor()?;
        while self.check(TokenKind::Pipe) {
            let op = self.advance();
            let right = self.parse_bitxor()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_bitxor(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_bitand()?;
        while self.check(TokenKind::Caret) {
            let op = self.advance();
            let right = self.parse_bitand()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_bitand(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_shift()?;
        while self.check(TokenKind::Amp) {
            let op = self.advance();
            let right = self.parse_shift()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_shift(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_additive()?;
        while self.check(TokenKind::Shl) || self.check(TokenKind::Shr) {
            let op = self.advance();
            let right = self.parse_additive()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;
        while self.check(TokenKind::Plus) || self.check(TokenKind::Minus) {
            let op = self.advance();
            let right = self.parse_multiplicative()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;
        while matches!(
            self.peek().kind,
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent
        ) {
            let op = self.advance();
            let right = self.parse_unary()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if matches!(
            self.peek().kind,
            TokenKind::Minus | TokenKind::Not | TokenKind::Amp
        ) {
            let op = self.advance();
            let operand = self.parse_unary()?;
            let span = op.span.merge(operand.span);
            return Ok(Expr::new(
                ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                },
                op,
                span,
            ));
        }
        self.parse_pipeline()
    }

    /// `a |> f |> g` parses left-associatively into a flat stage list
    /// (spec.md §4.2); lowering applies each stage to the accumulated
    /// value.
    fn parse_pipeline(&mut self) -> Result<Expr, ParseError> {
        let first = self.parse_postfix()?;
        if !self.check(TokenKind::PipeGt) {
            return Ok(first);
        }
        let start_tok = first.token;
        let mut stages = vec![first];
        while self.bump_if(TokenKind::PipeGt).is_some() {
            stages.push(self.parse_postfix()?);
        }
        let span = stages[0].span.merge(stages[stages.len() - 1].span);
        Ok(Expr::new(ExprKind::Pipeline(stages), start_tok, span))
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_try_await()?;
        loop {
            expr = match self.peek().kind {
                TokenKind::LParen => self.finish_call(expr)?,
                TokenKind::LBracket => self.finish_index(expr)?,
                TokenKind::Dot => self.finish_dot(expr)?,
                TokenKind::Question => {
                    let q = self.advance();
                    let span = expr.span.merge(q.span);
                    Expr::new(ExprKind::Try(Box::new(expr)), q, span)
                }
                _ => break,
            };
        }
        Ok(expr)
    }

    fn parse_try_await(&mut self) -> Result<Expr, ParseError> {
        if self.check(TokenKind::Await) {
            let tok = self.advance();
            let operand = self.parse_postfix()?;
            let span = tok.span.merge(operand.span);
            return Ok(Expr::new(ExprKind::Await(Box::new(operand)), tok, span));
        }
        self.parse_primary()
    }

    fn finish_call(&mut self, callee: Expr) -> Result<Expr, ParseError> {
        let open = self.advance(); // '('
        let mut args = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                args.push(self.parse_expr()?);
                if self.bump_if(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        let close = self.expect(TokenKind::RParen, "')'")?;
        let _ = open;
        let span = callee.span.merge(close.span);
        let token = callee.token;
        Ok(Expr::new(
            ExprKind::Call {
                callee: Box::new(callee),
                args,
                resolved: None,
            },
            token,
            span,
        ))
    }

    fn finish_index(&mut self, container: Expr) -> Result<Expr, ParseError> {
        self.advance(); // '['
        let index = self.parse_expr()?;
        let close = self.expect(TokenKind::RBracket, "']'")?;
        let span = container.span.merge(close.span);
        let token = container.token;
        Ok(Expr::new(
            ExprKind::Index {
                container: Box::new(container),
                index: Box::new(index),
            },
            token,
            span,
        ))
    }

    fn finish_dot(&mut self, object: Expr) -> Result<Expr, ParseError> {
        self.advance(); // '.'
        if let Some(int_tok) = self.bump_if(TokenKind::Int) {
            // tuple.0
            let index: u32 = self
                .lexeme(int_tok)
                .parse()
                .map_err(|_| self.unexpected("tuple index"))?;
            let span = object.span.merge(int_tok.span);
            let token = object.token;
            return Ok(Expr::new(
                ExprKind::TupleIndex {
                    tuple: Box::new(object),
                    index,
                },
                token,
                span,
            ));
        }
        let name_tok = self.expect(TokenKind::Ident, "a field or method name")?;
        let name = self.intern(name_tok);
        if self.check(TokenKind::LParen) {
            self.advance();
            let mut args = Vec::new();
            if !self.check(TokenKind::RParen) {
                loop {
                    args.push(self.parse_expr()?);
                    if self.bump_if(TokenKind::Comma).is_none() {
                        break;
                    }
                }
            }
            let close = self.expect(TokenKind::RParen, "')'")?;
            let span = object.span.merge(close.span);
            let token = object.token;
            return Ok(Expr::new(
                ExprKind::MethodCall {
                    receiver: Box::new(object),
                    method: name,
                    args,
                },
                token,
                span,
            ));
        }
        let span = object.span.merge(name_tok.span);
        let token = object.token;
        Ok(Expr::new(
            ExprKind::Field {
                object: Box::new(object),
                name,
            },
            token,
            span,
        ))
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
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
                self.parse_string_literal(tok)
            }
            TokenKind::Char => {
                self.advance();
                let raw = self.lexeme(tok);
                let inner = &raw[1..raw.len().saturating_sub(1)];
                let c = unescape_char(inner);
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
            TokenKind::Ident => {
                self.advance();
                let sym = self.intern(tok);
                self.parse_ident_led(tok, sym)
            }
            TokenKind::LParen => self.parse_paren_or_tuple(),
            TokenKind::LBracket => self.parse_array_or_range_literal(),
            TokenKind::LBrace => self.parse_map_literal(),
            TokenKind::If => self.parse_if_expr(),
            TokenKind::Match => self.parse_match_expr(),
            TokenKind::Pipe | TokenKind::PipePipe => self.parse_lambda(),
            _ => Err(self.unexpected("an expression")),
        }
    }

    fn parse_ident_led(&mut self, tok: Token, sym: wync_base::Symbol) -> Result<Expr, ParseError> {
        let name = self.interner.resolve(sym);
        match name {
            "Some" if self.check(TokenKind::LParen) => {
                self.advance();
                let inner = self.parse_expr()?;
                let close = self.expect(TokenKind::RParen, "')'")?;
                let span = tok.span.merge(close.span);
                Ok(Expr::new(ExprKind::Some(Box::new(inner)), tok, span))
            }
            "None" => Ok(Expr::new(ExprKind::None, tok, tok.span)),
            "Ok" if self.check(TokenKind::LParen) => {
                self.advance();
                let inner = self.parse_expr()?;
                let close = self.expect(TokenKind::RParen, "')'")?;
                let span = tok.span.merge(close.span);
                Ok(Expr::new(ExprKind::Ok(Box::new(inner)), tok, span))
            }
            "Err" if self.check(TokenKind::LParen) => {
                self.advance();
                let inner = self.parse_expr()?;
                let close = self.expect(TokenKind::RParen, "')'")?;
                let span = tok.span.merge(close.span);
                Ok(Expr::new(ExprKind::Err(Box::new(inner)), tok, span))
            }
            _ => {
                if self.check(TokenKind::LBrace) && self.struct_init_follows() {
                    self.parse_struct_init(tok, sym)
                } else {
                    Ok(Expr::new(ExprKind::Ident(sym), tok, tok.span))
                }
            }
        }
    }

    /// `Type { field: value, ... }` vs. a bare identifier immediately
    /// followed by a body block (`if cond { ... }`, `while cond { ... }`,
    /// `match x { ... }`) is disambiguated by suppressing struct-literal
    /// parsing while those heads are parsed (see `no_struct_literal`).
    fn struct_init_follows(&self) -> bool {
        !self.no_struct_literal
    }

    fn parse_struct_init(&mut self, tok: Token, type_name: wync_base::Symbol) -> Result<Expr, ParseError> {
        self.advance(); // '{'
        let mut fields = Vec::new();
        while !self.check(TokenKind::RBrace) {
            let field_tok = self.expect(TokenKind::Ident, "a field name")?;
            let field_name = self.intern(field_tok);
            self.expect(TokenKind::Colon, "':'")?;
            let value = self.parse_expr()?;
            fields.push((field_name, value));
            if self.bump_if(TokenKind::Comma).is_none() {
                break;
            }
        }
        let close = self.expect(TokenKind::RBrace, "'}'")?;
        let span = tok.span.merge(close.span);
        Ok(Expr::new(
            ExprKind::StructInit { type_name, fields },
            tok,
            span,
        ))
    }

    fn parse_paren_or_tuple(&mut self) -> Result<Expr, ParseError> {
        let open = self.advance();
        if self.bump_if(TokenKind::RParen).is_some() {
            return Ok(Expr::new(ExprKind::Tuple(Vec::new()), open, open.span));
        }
        let first = self.parse_expr()?;
        if self.check(TokenKind::Comma) {
            let mut elements = vec![first];
            while self.bump_if(TokenKind::Comma).is_some() {
                if self.check(TokenKind::RParen) {
                    break;
                }
                elements.push(self.parse_expr()?);
            }
            let close = self.expect(TokenKind::RParen, "')'")?;
            let span = open.span.merge(close.span);
            return Ok(Expr::new(ExprKind::Tuple(elements), open, span));
        }
        let close = self.expect(TokenKind::RParen, "')'")?;
        let mut e = first;
        e.span = open.span.merge(close.span);
        Ok(e)
    }

    fn parse_array_or_range_literal(&mut self) -> Result<Expr, ParseError> {
        let open = self.advance();
        let mut elements = Vec::new();
        if !self.check(TokenKind::RBracket) {
            loop {
                elements.push(self.parse_expr()?);
                if self.bump_if(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        let close = self.expect(TokenKind::RBracket, "']'")?;
        let span = open.span.merge(close.span);
        Ok(Expr::new(ExprKind::ArrayLit(elements), open, span))
    }

    fn parse_map_literal(&mut self) -> Result<Expr, ParseError> {
        let open = self.advance();
        let mut keys = Vec::new();
        let mut values = Vec::new();
        if !self.check(TokenKind::RBrace) {
            loop {
                let key = self.parse_expr()?;
                self.expect(TokenKind::Colon, "':'")?;
                let value = self.parse_expr()?;
                keys.push(key);
                values.push(value);
                if self.bump_if(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        let close = self.expect(TokenKind::RBrace, "'}'")?;
        let span = open.span.merge(close.span);
        Ok(Expr::new(ExprKind::MapLit { keys, values }, open, span))
    }

    fn parse_if_expr(&mut self) -> Result<Expr, ParseError> {
        let tok = self.advance();
        let cond = self.parse_head_expr()?;
        self.expect(TokenKind::LBrace, "'{'")?;
        let then_branch = self.parse_expr()?;
        self.expect(TokenKind::RBrace, "'}'")?;
        let else_branch = if self.bump_if(TokenKind::Else).is_some() {
            self.expect(TokenKind::LBrace, "'{'")?;
            let e = self.parse_expr()?;
            self.expect(TokenKind::RBrace, "'}'")?;
            Some(Box::new(e))
        } else {
            None
        };
        let span = tok.span.merge(
            else_branch
                .as_ref()
                .map(|e| e.span)
                .unwrap_or(then_branch.span),
        );
        Ok(Expr::new(
            ExprKind::If {
                cond: Box::new(cond),
                then_branch: Box::new(then_branch),
                else_branch,
            },
            tok,
            span,
        ))
    }

    fn parse_match_expr(&mut self) -> Result<Expr, ParseError> {
        let tok = self.advance();
        let scrutinee = self.parse_expr()?;
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut arms = Vec::new();
        while !self.check(TokenKind::RBrace) {
            let pattern = self.parse_pattern()?;
            self.expect(TokenKind::FatArrow, "'=>'")?;
            let body = self.parse_expr()?;
            arms.push(MatchArm {
                pattern,
                body: Box::new(body),
            });
            if self.bump_if(TokenKind::Comma).is_none() {
                break;
            }
        }
        let close = self.expect(TokenKind::RBrace, "'}'")?;
        let span = tok.span.merge(close.span);
        Ok(Expr::new(
            ExprKind::Match {
                scrutinee: Box::new(scrutinee),
                arms,
            },
            tok,
            span,
        ))
    }

    fn parse_lambda(&mut self) -> Result<Expr, ParseError> {
        let tok = self.advance();
        let mut params = Vec::new();
        // `||` lexes as one token for a zero-parameter lambda.
        if tok.kind == TokenKind::Pipe {
            if !self.check(TokenKind::Pipe) {
                loop {
                    let p = self.expect(TokenKind::Ident, "a parameter name")?;
                    params.push(self.intern(p));
                    if self.bump_if(TokenKind::Comma).is_none() {
                        break;
                    }
                }
            }
            self.expect(TokenKind::Pipe, "'|'")?;
        }
        let body = self.parse_expr()?;
        let span = tok.span.merge(body.span);
        Ok(Expr::new(
            ExprKind::Lambda {
                params,
                body: Box::new(body),
                captures: Vec::new(),
            },
            tok,
            span,
        ))
    }

    /// Splits a raw `"..."` token into alternating literal and `${expr}`
    /// segments (spec.md §4.2, "String interpolation").
    fn parse_string_literal(&mut self, tok: Token) -> Result<Expr, ParseError> {
        let raw = self.lexeme(tok);
        let inner = &raw[1..raw.len().saturating_sub(1)];
        if !inner.contains("${") {
            let sym = self.interner.intern(inner);
            return Ok(Expr::new(ExprKind::StrLit(sym), tok, tok.span));
        }

        let mut segments = Vec::new();
        let bytes = inner.as_bytes();
        let mut i = 0;
        let mut lit_start = 0;
        while i < bytes.len() {
            if bytes[i] == b'$' && bytes.get(i + 1) == Some(&b'{') {
                if i > lit_start {
                    let sym = self.interner.intern(&inner[lit_start..i]);
                    segments.push(InterpSegment::Literal(sym));
                }
                let expr_start = i + 2;
                let mut depth = 1usize;
                let mut j = expr_start;
                while j < bytes.len() && depth > 0 {
                    match bytes[j] {
                        b'{' => depth += 1,
                        b'}' => depth -= 1,
                        _ => {}
                    }
                    if depth == 0 {
                        break;
                    }
                    j += 1;
                }
                let sub_src = &inner[expr_start..j];
                let sub_expr = parse_sub_expr(sub_src, self.interner)?;
                segments.push(InterpSegment::Expr(Box::new(sub_expr)));
                i = j + 1;
                lit_start = i;
            } else {
                i += 1;
            }
        }
        if lit_start < inner.len() {
            let sym = self.interner.intern(&inner[lit_start..]);
            segments.push(InterpSegment::Literal(sym));
        }
        Ok(Expr::new(ExprKind::Interpolation(segments), tok, tok.span))
    }
}

fn parse_sub_expr(src: &str, interner: &mut Interner) -> Result<Expr, ParseError> {
    let mut sub = Parser::new(src, interner);
    let e = sub.parse_expr()?;
    if sub.had_error {
        return Err(sub.errors.into_iter().next().unwrap());
    }
    Ok(e)
}

fn binary(op: Token, left: Expr, right: Expr) -> Expr {
    let span = left.span.merge(right.span);
    let token = left.token;
    Expr::new(
        ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        token,
        span,
    )
}

fn unescape_char(s: &str) -> char {
    if let Some(stripped) = s.strip_prefix('\\') {
        match stripped.chars().next() {
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            Some(c) => c,
            None => '\0',
        }
    } else {
        s.chars().next().unwrap_or('\0')
    }
}
