//! Statement grammar (spec.md §3 "Statement variants", §4.2).

use wync_base::Symbol;

use super::Parser;
use crate::ast::{
    Block, CatchClause, ForHead, MatchCase, Param, Stmt, StmtKind, StructField, TraitMethodSig,
    TypeExpr, TypeParam,
};
use crate::error::ParseError;
use crate::token::{Token, TokenKind};

impl<'s> Parser<'s> {
    /// Entry point used at both file scope and inside `{ ... }` blocks —
    /// every statement kind in spec.md §3 can appear at top level (function
    /// definitions are pre-scanned there by the checker so forward
    /// references resolve; the parser itself imposes no such restriction).
    pub(crate) fn parse_top_level_stmt(&mut self) -> Result<Stmt, ParseError> {
        self.parse_stmt()
    }

    pub(crate) fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        let tok = self.peek();
        let stmt = match tok.kind {
            TokenKind::Let => self.parse_let_stmt(),
            TokenKind::Return => self.parse_return_stmt(),
            TokenKind::LBrace => self.parse_block_stmt(),
            TokenKind::Fn => self.parse_fn_stmt(false),
            TokenKind::Struct => self.parse_struct_stmt(),
            TokenKind::Enum => self.parse_enum_stmt(),
            TokenKind::Impl => self.parse_impl_stmt(),
            TokenKind::Trait => self.parse_trait_stmt(),
            TokenKind::If => self.parse_if_stmt(),
            TokenKind::While => self.parse_while_stmt(),
            TokenKind::For => self.parse_for_stmt(),
            TokenKind::Break => {
                self.advance();
                self.skip_optional_semi();
                Ok(Stmt::new(StmtKind::Break, tok.span))
            }
            TokenKind::Continue => {
                self.advance();
                self.skip_optional_semi();
                Ok(Stmt::new(StmtKind::Continue, tok.span))
            }
            TokenKind::Import => self.parse_import_stmt(),
            TokenKind::Export => self.parse_export_stmt(),
            TokenKind::Module => self.parse_module_stmt(),
            TokenKind::Type => self.parse_type_alias_stmt(),
            TokenKind::Try => self.parse_try_stmt(),
            TokenKind::Throw => self.parse_throw_stmt(),
            TokenKind::Match => self.parse_match_stmt(),
            TokenKind::Test => self.parse_test_stmt(),
            TokenKind::Spawn => self.parse_spawn_stmt(),
            TokenKind::Extern => self.parse_extern_stmt(),
            TokenKind::Macro => self.parse_macro_stmt(),
            TokenKind::Async if self.peek_next().kind == TokenKind::Fn => {
                self.advance();
                self.parse_fn_stmt(true)
            }
            TokenKind::Unsafe => self.parse_unsafe_stmt(),
            _ => self.parse_expr_stmt(),
        }?;
        Ok(stmt)
    }

    fn parse_block(&mut self) -> Result<Block, ParseError> {
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut stmts = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.check(TokenKind::Eof) {
            stmts.push(self.parse_stmt()?);
        }
        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(stmts)
    }

    fn parse_block_stmt(&mut self) -> Result<Stmt, ParseError> {
        let open = self.peek();
        let block = self.parse_block()?;
        let span = self.span_from(open);
        Ok(Stmt::new(StmtKind::Block(block), span))
    }

    /// `unsafe { ... }` is passed through as a plain block (spec.md §9,
    /// "Open question — unsafe block semantics").
    fn parse_unsafe_stmt(&mut self) -> Result<Stmt, ParseError> {
        self.advance();
        self.parse_block_stmt()
    }

    fn parse_expr_stmt(&mut self) -> Result<Stmt, ParseError> {
        let expr = self.parse_expr()?;
        let span = expr.span;
        self.skip_optional_semi();
        Ok(Stmt::new(StmtKind::Expr(expr), span))
    }

    fn parse_let_stmt(&mut self) -> Result<Stmt, ParseError> {
        let tok = self.advance();
        let is_const = false;
        let is_mut = self.bump_if(TokenKind::Mut).is_some();
        let pattern = self.parse_pattern()?;
        let ty = if self.bump_if(TokenKind::Colon).is_some() {
            Some(self.parse_type_expr()?)
        } else {
            None
        };
        let init = if self.bump_if(TokenKind::Eq).is_some() {
            Some(self.parse_expr()?)
        } else {
            None
        };
        let span = self.span_from(tok);
        self.skip_optional_semi();
        Ok(Stmt::new(
            StmtKind::Let {
                pattern,
                is_mut,
                is_const,
                ty,
                init,
            },
            span,
        ))
    }

    fn parse_return_stmt(&mut self) -> Result<Stmt, ParseError> {
        let tok = self.advance();
        let value = if self.check(TokenKind::RBrace)
            || self.check(TokenKind::Semi)
            || self.check(TokenKind::Eof)
        {
            None
        } else {
            Some(self.parse_expr()?)
        };
        let span = self.span_from(tok);
        self.skip_optional_semi();
        Ok(Stmt::new(StmtKind::Return(value), span))
    }

    /// `fn name(params) -> ret { body }`, `fn Type.method(self, ...) { }`,
    /// `pub fn ...`. `is_async` is pre-decided by the caller (`async fn`).
    fn parse_fn_stmt(&mut self, is_async: bool) -> Result<Stmt, ParseError> {
        let tok = self.advance(); // 'fn'
        let name_tok = self.expect(TokenKind::Ident, "a function name")?;

        // `fn Type.method(...)` extension form.
        let (name_sym, extension_receiver) = if self.bump_if(TokenKind::Dot).is_some() {
            let method_tok = self.expect(TokenKind::Ident, "a method name")?;
            (self.intern(method_tok), Some(name_tok))
        } else {
            (self.intern(name_tok), None)
        };

        let type_params = self.parse_optional_type_params()?;

        self.expect(TokenKind::LParen, "'('")?;
        let mut params = Vec::new();
        let mut seen_default = false;
        while !self.check(TokenKind::RParen) {
            let p_mut = self.bump_if(TokenKind::Mut).is_some();
            let p_tok = self.expect(TokenKind::Ident, "a parameter name")?;
            let p_ty = if self.bump_if(TokenKind::Colon).is_some() {
                self.parse_type_expr()?
            } else {
                TypeExpr::Named {
                    name: Symbol::EMPTY,
                    args: Vec::new(),
                }
            };
            let default = if self.bump_if(TokenKind::Eq).is_some() {
                seen_default = true;
                Some(self.parse_expr()?)
            } else {
                if seen_default {
                    return Err(self.unexpected(
                        "a default value (parameters with defaults must come last)",
                    ));
                }
                None
            };
            params.push(Param {
                name: p_tok,
                ty: p_ty,
                is_mut: p_mut,
                default,
            });
            if self.bump_if(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect(TokenKind::RParen, "')'")?;

        let return_type = if self.bump_if(TokenKind::Arrow).is_some() {
            Some(self.parse_type_expr()?)
        } else {
            None
        };

        let body = self.parse_block()?;
        let span = self.span_from(tok);
        Ok(Stmt::new(
            StmtKind::FunctionDef {
                name: name_sym,
                params,
                type_params,
                return_type,
                body,
                is_public: false,
                is_async,
                extension_receiver,
            },
            span,
        ))
    }

    /// `<T, U: Trait + Trait>` after a function/struct/trait name. Bounds
    /// are kept on the `TypeParam` so the checker can enforce them at call
    /// sites (spec.md §4.3, "Generic instantiation").
    fn parse_optional_type_params(&mut self) -> Result<Vec<TypeParam>, ParseError> {
        if !self.check(TokenKind::Lt) {
            return Ok(Vec::new());
        }
        self.advance();
        let mut params = Vec::new();
        while !self.check(TokenKind::Gt) {
            let p = self.expect(TokenKind::Ident, "a type parameter")?;
            let name = self.intern(p);
            let mut bounds = Vec::new();
            if self.bump_if(TokenKind::Colon).is_some() {
                let b = self.expect(TokenKind::Ident, "a trait bound")?;
                bounds.push(self.intern(b));
                while self.bump_if(TokenKind::Plus).is_some() {
                    let b = self.expect(TokenKind::Ident, "a trait bound")?;
                    bounds.push(self.intern(b));
                }
            }
            params.push(TypeParam { name, bounds });
            if self.bump_if(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect(TokenKind::Gt, "'>'")?;
        Ok(params)
    }

    fn parse_struct_stmt(&mut self) -> Result<Stmt, ParseError> {
        let tok = self.advance();
        let name_tok = self.expect(TokenKind::Ident, "a struct name")?;
        let name = self.intern(name_tok);
        let type_params = self.parse_optional_type_params()?;
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut fields = Vec::new();
        while !self.check(TokenKind::RBrace) {
            let arc_managed = self.bump_if(TokenKind::Amp).is_some();
            let f_tok = self.expect(TokenKind::Ident, "a field name")?;
            self.expect(TokenKind::Colon, "':'")?;
            let f_ty = self.parse_type_expr()?;
            fields.push(StructField {
                name: f_tok,
                ty: f_ty,
                arc_managed,
            });
            if self.bump_if(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect(TokenKind::RBrace, "'}'")?;
        let span = self.span_from(tok);
        Ok(Stmt::new(
            StmtKind::StructDef {
                name,
                type_params,
                fields,
            },
            span,
        ))
    }

    fn parse_enum_stmt(&mut self) -> Result<Stmt, ParseError> {
        let tok = self.advance();
        let name_tok = self.expect(TokenKind::Ident, "an enum name")?;
        let name = self.intern(name_tok);
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut variants = Vec::new();
        while !self.check(TokenKind::RBrace) {
            variants.push(self.expect(TokenKind::Ident, "a variant name")?);
            if self.bump_if(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect(TokenKind::RBrace, "'}'")?;
        let span = self.span_from(tok);
        Ok(Stmt::new(StmtKind::EnumDef { name, variants }, span))
    }

    fn parse_impl_stmt(&mut self) -> Result<Stmt, ParseError> {
        let tok = self.advance();
        let type_name = self.expect(TokenKind::Ident, "a type name")?;
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut methods = Vec::new();
        while !self.check(TokenKind::RBrace) {
            methods.push(self.parse_fn_stmt(false)?);
        }
        self.expect(TokenKind::RBrace, "'}'")?;
        let span = self.span_from(tok);
        Ok(Stmt::new(StmtKind::ImplBlock { type_name, methods }, span))
    }

    fn parse_trait_stmt(&mut self) -> Result<Stmt, ParseError> {
        let tok = self.advance();
        let name_tok = self.expect(TokenKind::Ident, "a trait name")?;
        let name = self.intern(name_tok);
        let type_params = self.parse_optional_type_params()?;
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut methods = Vec::new();
        while !self.check(TokenKind::RBrace) {
            self.expect(TokenKind::Fn, "'fn'")?;
            let m_name_tok = self.expect(TokenKind::Ident, "a method name")?;
            let m_name = self.intern(m_name_tok);
            self.expect(TokenKind::LParen, "'('")?;
            let mut params = Vec::new();
            while !self.check(TokenKind::RParen) {
                let p_mut = self.bump_if(TokenKind::Mut).is_some();
                let p_tok = self.expect(TokenKind::Ident, "a parameter name")?;
                let p_ty = if self.bump_if(TokenKind::Colon).is_some() {
                    self.parse_type_expr()?
                } else {
                    TypeExpr::Named {
                        name: Symbol::EMPTY,
                        args: Vec::new(),
                    }
                };
                params.push(Param {
                    name: p_tok,
                    ty: p_ty,
                    is_mut: p_mut,
                    default: None,
                });
                if self.bump_if(TokenKind::Comma).is_none() {
                    break;
                }
            }
            self.expect(TokenKind::RParen, "')'")?;
            let return_type = if self.bump_if(TokenKind::Arrow).is_some() {
                Some(self.parse_type_expr()?)
            } else {
                None
            };
            let default_body = if self.check(TokenKind::LBrace) {
                Some(self.parse_block()?)
            } else {
                self.skip_optional_semi();
                None
            };
            methods.push(TraitMethodSig {
                name: m_name,
                params,
                return_type,
                default_body,
            });
        }
        self.expect(TokenKind::RBrace, "'}'")?;
        let span = self.span_from(tok);
        Ok(Stmt::new(
            StmtKind::TraitDef {
                name,
                type_params,
                methods,
            },
            span,
        ))
    }

    fn parse_if_stmt(&mut self) -> Result<Stmt, ParseError> {
        let tok = self.advance();
        let cond = self.parse_head_expr()?;
        let then_branch = Box::new(self.parse_block_stmt()?);
        let else_branch = if self.bump_if(TokenKind::Else).is_some() {
            if self.check(TokenKind::If) {
                Some(Box::new(self.parse_if_stmt()?))
            } else {
                Some(Box::new(self.parse_block_stmt()?))
            }
        } else {
            None
        };
        let span = self.span_from(tok);
        Ok(Stmt::new(
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            },
            span,
        ))
    }

    fn parse_while_stmt(&mut self) -> Result<Stmt, ParseError> {
        let tok = self.advance();
        let cond = self.parse_head_expr()?;
        let body = Box::new(self.parse_block_stmt()?);
        let span = self.span_from(tok);
        Ok(Stmt::new(StmtKind::While { cond, body }, span))
    }

    /// Either `for (init; cond; inc) { }` or `for x in iter { }` (spec.md
    /// §3, `ForHead`).
    fn parse_for_stmt(&mut self) -> Result<Stmt, ParseError> {
        let tok = self.advance();
        let prev = self.no_struct_literal;
        self.no_struct_literal = true;

        let head = if self.check(TokenKind::LParen) {
            self.advance();
            let init = if self.check(TokenKind::Semi) {
                None
            } else {
                Some(Box::new(self.parse_stmt_no_semi_consume()?))
            };
            self.expect(TokenKind::Semi, "';'")?;
            let cond = if self.check(TokenKind::Semi) {
                None
            } else {
                Some(self.parse_expr()?)
            };
            self.expect(TokenKind::Semi, "';'")?;
            let inc = if self.check(TokenKind::RParen) {
                None
            } else {
                Some(self.parse_expr()?)
            };
            self.expect(TokenKind::RParen, "')'")?;
            ForHead::CStyle { init, cond, inc }
        } else {
            let binding = self.expect(TokenKind::Ident, "a loop variable")?;
            self.expect(TokenKind::In, "'in'")?;
            let iterable = self.parse_expr()?;
            ForHead::ForEach { binding, iterable }
        };

        self.no_struct_literal = prev;
        let body = Box::new(self.parse_block_stmt()?);
        let span = self.span_from(tok);
        Ok(Stmt::new(StmtKind::For { head, body }, span))
    }

    /// Parses a `let`/expression statement for a C-style `for` init clause
    /// without consuming the separating `;` (the caller does).
    fn parse_stmt_no_semi_consume(&mut self) -> Result<Stmt, ParseError> {
        if self.check(TokenKind::Let) {
            let tok = self.advance();
            let is_mut = self.bump_if(TokenKind::Mut).is_some();
            let pattern = self.parse_pattern()?;
            let ty = if self.bump_if(TokenKind::Colon).is_some() {
                Some(self.parse_type_expr()?)
            } else {
                None
            };
            let init = if self.bump_if(TokenKind::Eq).is_some() {
                Some(self.parse_expr()?)
            } else {
                None
            };
            let span = self.span_from(tok);
            Ok(Stmt::new(
                StmtKind::Let {
                    pattern,
                    is_mut,
                    is_const: false,
                    ty,
                    init,
                },
                span,
            ))
        } else {
            let expr = self.parse_expr()?;
            let span = expr.span;
            Ok(Stmt::new(StmtKind::Expr(expr), span))
        }
    }

    fn parse_import_stmt(&mut self) -> Result<Stmt, ParseError> {
        let tok = self.advance();
        let mut items = None;
        if self.bump_if(TokenKind::LBrace).is_some() {
            let mut names = Vec::new();
            while !self.check(TokenKind::RBrace) {
                let i_tok = self.expect(TokenKind::Ident, "an imported item")?;
                names.push(self.intern(i_tok));
                if self.bump_if(TokenKind::Comma).is_none() {
                    break;
                }
            }
            self.expect(TokenKind::RBrace, "'}'")?;
            self.ok_if_ident_is("from")?;
            items = Some(names);
        }
        let module_tok = self.expect(TokenKind::Ident, "a module name")?;
        let module = self.intern(module_tok);
        let span = self.span_from(tok);
        self.skip_optional_semi();
        Ok(Stmt::new(StmtKind::Import { module, items }, span))
    }

    /// `from` is contextual (not reserved), so it's looked up as a plain
    /// identifier rather than a dedicated token kind.
    fn ok_if_ident_is(&mut self, word: &str) -> Result<Token, ParseError> {
        if self.check(TokenKind::Ident) && self.lexeme(self.peek()) == word {
            Ok(self.advance())
        } else {
            Err(self.unexpected(word))
        }
    }

    fn parse_export_stmt(&mut self) -> Result<Stmt, ParseError> {
        let tok = self.advance();
        let inner = self.parse_stmt()?;
        let span = tok.span.merge(inner.span);
        Ok(Stmt::new(StmtKind::Export(Box::new(inner)), span))
    }

    fn parse_module_stmt(&mut self) -> Result<Stmt, ParseError> {
        let tok = self.advance();
        let name_tok = self.expect(TokenKind::Ident, "a module name")?;
        let name = self.intern(name_tok);
        let body = self.parse_block()?;
        let span = self.span_from(tok);
        Ok(Stmt::new(StmtKind::Module { name, body }, span))
    }

    fn parse_type_alias_stmt(&mut self) -> Result<Stmt, ParseError> {
        let tok = self.advance();
        let name_tok = self.expect(TokenKind::Ident, "a type name")?;
        let name = self.intern(name_tok);
        self.expect(TokenKind::Eq, "'='")?;
        let target = self.parse_type_expr()?;
        let span = self.span_from(tok);
        self.skip_optional_semi();
        Ok(Stmt::new(StmtKind::TypeAlias { name, target }, span))
    }

    fn parse_try_stmt(&mut self) -> Result<Stmt, ParseError> {
        let tok = self.advance();
        let body = self.parse_block()?;
        let mut catches = Vec::new();
        while self.check(TokenKind::Catch) {
            self.advance();
            self.expect(TokenKind::LParen, "'('")?;
            let exception_type = self.expect(TokenKind::Ident, "an exception type")?;
            let binding = self.expect(TokenKind::Ident, "a binding name")?;
            self.expect(TokenKind::RParen, "')'")?;
            let catch_body = self.parse_block()?;
            catches.push(CatchClause {
                exception_type,
                binding,
                body: catch_body,
            });
        }
        let finally = if self.bump_if(TokenKind::Finally).is_some() {
            Some(self.parse_block()?)
        } else {
            None
        };
        let span = self.span_from(tok);
        Ok(Stmt::new(
            StmtKind::Try {
                body,
                catches,
                finally,
            },
            span,
        ))
    }

    fn parse_throw_stmt(&mut self) -> Result<Stmt, ParseError> {
        let tok = self.advance();
        let value = self.parse_expr()?;
        let span = tok.span.merge(value.span);
        self.skip_optional_semi();
        Ok(Stmt::new(StmtKind::Throw(value), span))
    }

    fn parse_match_stmt(&mut self) -> Result<Stmt, ParseError> {
        let tok = self.advance();
        let scrutinee = self.parse_head_expr()?;
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut cases = Vec::new();
        while !self.check(TokenKind::RBrace) {
            let pattern = self.parse_pattern_base()?;
            let guard = if self.bump_if(TokenKind::If).is_some() {
                Some(self.parse_expr()?)
            } else {
                None
            };
            self.expect(TokenKind::FatArrow, "'=>'")?;
            let body = if self.check(TokenKind::LBrace) {
                Box::new(self.parse_block_stmt()?)
            } else {
                Box::new(self.parse_expr_stmt()?)
            };
            cases.push(MatchCase {
                pattern,
                guard,
                body,
            });
            self.bump_if(TokenKind::Comma);
        }
        self.expect(TokenKind::RBrace, "'}'")?;
        let span = self.span_from(tok);
        Ok(Stmt::new(StmtKind::Match { scrutinee, cases }, span))
    }

    fn parse_test_stmt(&mut self) -> Result<Stmt, ParseError> {
        let tok = self.advance();
        let is_async = self.bump_if(TokenKind::Async).is_some();
        let name_tok = self.expect(TokenKind::Str, "a test name")?;
        let raw = self.lexeme(name_tok);
        let inner = &raw[1..raw.len().saturating_sub(1)];
        let name = self.interner.intern(inner);
        let body = self.parse_block()?;
        let span = self.span_from(tok);
        Ok(Stmt::new(
            StmtKind::Test {
                name,
                is_async,
                body,
            },
            span,
        ))
    }

    fn parse_spawn_stmt(&mut self) -> Result<Stmt, ParseError> {
        let tok = self.advance();
        let call = self.parse_expr()?;
        let span = tok.span.merge(call.span);
        self.skip_optional_semi();
        Ok(Stmt::new(StmtKind::Spawn(call), span))
    }

    fn parse_extern_stmt(&mut self) -> Result<Stmt, ParseError> {
        let tok = self.advance();
        self.expect(TokenKind::Fn, "'fn'")?;
        let name_tok = self.expect(TokenKind::Ident, "a function name")?;
        let name = self.intern(name_tok);
        self.expect(TokenKind::LParen, "'('")?;
        let mut params = Vec::new();
        let mut is_variadic = false;
        while !self.check(TokenKind::RParen) {
            if self.check(TokenKind::DotDot) || self.check(TokenKind::DotDotEq) {
                self.advance();
                is_variadic = true;
                break;
            }
            let p_tok = self.expect(TokenKind::Ident, "a parameter name")?;
            let p_ty = if self.bump_if(TokenKind::Colon).is_some() {
                self.parse_type_expr()?
            } else {
                TypeExpr::Named {
                    name: Symbol::EMPTY,
                    args: Vec::new(),
                }
            };
            params.push(Param {
                name: p_tok,
                ty: p_ty,
                is_mut: false,
                default: None,
            });
            if self.bump_if(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        let return_type = if self.bump_if(TokenKind::Arrow).is_some() {
            Some(self.parse_type_expr()?)
        } else {
            None
        };
        let span = self.span_from(tok);
        self.skip_optional_semi();
        Ok(Stmt::new(
            StmtKind::Extern {
                name,
                params,
                return_type,
                is_variadic,
            },
            span,
        ))
    }

    fn parse_macro_stmt(&mut self) -> Result<Stmt, ParseError> {
        let tok = self.advance();
        let name_tok = self.expect(TokenKind::Ident, "a macro name")?;
        let name = self.intern(name_tok);
        self.expect(TokenKind::LParen, "'('")?;
        let mut params = Vec::new();
        while !self.check(TokenKind::RParen) {
            let p = self.expect(TokenKind::Ident, "a parameter name")?;
            params.push(self.intern(p));
            if self.bump_if(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        let body = self.parse_block()?;
        let span = self.span_from(tok);
        Ok(Stmt::new(StmtKind::MacroDef { name, params, body }, span))
    }
}
