//! Type-expression grammar: what the parser produces from a type
//! annotation's token stream (spec.md §3 "Types (semantic)" describes the
//! checker's resolved `Type`; this is its syntactic precursor, `TypeExpr`).

use super::Parser;
use crate::ast::TypeExpr;
use crate::error::ParseError;
use crate::token::TokenKind;

impl<'s> Parser<'s> {
    pub(crate) fn parse_type_expr(&mut self) -> Result<TypeExpr, ParseError> {
        self.parse_type_union()
    }

    /// `A | B | C` (spec.md §3, `UnionTypeMarker`); used only in type
    /// position.
    fn parse_type_union(&mut self) -> Result<TypeExpr, ParseError> {
        let first = self.parse_type_postfix()?;
        if !self.check(TokenKind::Pipe) {
            return Ok(first);
        }
        let mut members = vec![first];
        while self.bump_if(TokenKind::Pipe).is_some() {
            members.push(self.parse_type_postfix()?);
        }
        Ok(TypeExpr::Union(members))
    }

    /// Trailing `?` marks an optional type (spec.md §3, `OptionalTypeMarker`).
    fn parse_type_postfix(&mut self) -> Result<TypeExpr, ParseError> {
        let mut ty = self.parse_type_primary()?;
        while self.bump_if(TokenKind::Question).is_some() {
            ty = TypeExpr::Optional(Box::new(ty));
        }
        Ok(ty)
    }

    fn parse_type_primary(&mut self) -> Result<TypeExpr, ParseError> {
        match self.peek().kind {
            TokenKind::LBracket => {
                self.advance();
                let elem = self.parse_type_expr()?;
                self.expect(TokenKind::RBracket, "']'")?;
                Ok(TypeExpr::Array(Box::new(elem)))
            }
            TokenKind::LBrace => {
                self.advance();
                let key = self.parse_type_expr()?;
                self.expect(TokenKind::Colon, "':'")?;
                let val = self.parse_type_expr()?;
                self.expect(TokenKind::RBrace, "'}'")?;
                Ok(TypeExpr::Map(Box::new(key), Box::new(val)))
            }
            TokenKind::Async => {
                self.advance();
                self.parse_function_type(true)
            }
            TokenKind::LParen => self.parse_paren_type(),
            TokenKind::Ident => {
                let tok = self.advance();
                let name = self.intern(tok);
                let args = if self.bump_if(TokenKind::Lt).is_some() {
                    let mut args = Vec::new();
                    while !self.check(TokenKind::Gt) {
                        args.push(self.parse_type_expr()?);
                        if self.bump_if(TokenKind::Comma).is_none() {
                            break;
                        }
                    }
                    self.expect(TokenKind::Gt, "'>'")?;
                    args
                } else {
                    Vec::new()
                };
                Ok(TypeExpr::Named { name, args })
            }
            _ => Err(self.unexpected("a type")),
        }
    }

    /// `(T1, T2)` tuple type, or `(T1, T2) -> T3` function type.
    fn parse_paren_type(&mut self) -> Result<TypeExpr, ParseError> {
        self.advance(); // '('
        let mut elements = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                elements.push(self.parse_type_expr()?);
                if self.bump_if(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        if self.check(TokenKind::Arrow) {
            self.advance();
            let ret = self.parse_type_expr()?;
            Ok(TypeExpr::Function {
                params: elements,
                ret: Box::new(ret),
                is_async: false,
            })
        } else {
            Ok(TypeExpr::Tuple(elements))
        }
    }

    fn parse_function_type(&mut self, is_async: bool) -> Result<TypeExpr, ParseError> {
        self.expect(TokenKind::LParen, "'('")?;
        let mut params = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                params.push(self.parse_type_expr()?);
                if self.bump_if(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        self.expect(TokenKind::Arrow, "'->'")?;
        let ret = self.parse_type_expr()?;
        Ok(TypeExpr::Function {
            params,
            ret: Box::new(ret),
            is_async,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wync_base::Interner;

    fn parse_ty(src: &str) -> TypeExpr {
        let mut interner = Interner::new();
        let mut p = Parser::new(src, &mut interner);
        p.parse_type_expr().expect("type should parse")
    }

    #[test]
    fn parses_named_type() {
        assert!(matches!(parse_ty("int"), TypeExpr::Named { .. }));
    }

    #[test]
    fn parses_array_type() {
        assert!(matches!(parse_ty("[int]"), TypeExpr::Array(_)));
    }

    #[test]
    fn parses_optional_type() {
        assert!(matches!(parse_ty("int?"), TypeExpr::Optional(_)));
    }

    #[test]
    fn parses_generic_named_type() {
        match parse_ty("Result<int, string>") {
            TypeExpr::Named { args, .. } => assert_eq!(args.len(), 2),
            other => panic!("expected Named, got {:?}", other),
        }
    }

    #[test]
    fn parses_function_type() {
        assert!(matches!(
            parse_ty("(int, int) -> int"),
            TypeExpr::Function { .. }
        ));
    }

    #[test]
    fn parses_union_type() {
        assert!(matches!(parse_ty("int | string"), TypeExpr::Union(_)));
    }
}
