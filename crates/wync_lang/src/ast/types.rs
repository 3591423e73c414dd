//! Syntactic type expressions as written by the programmer.
//!
//! This is distinct from `wync_compile::analysis::types::Type`, the
//! *semantic* type the checker computes. `TypeExpr` is what the parser
//! produces from a type annotation's token stream; the checker resolves it
//! to a semantic `Type` once symbols and generics are in scope.

use wync_base::Symbol;

#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    Named {
        name: Symbol,
        args: Vec<TypeExpr>,
    },
    Array(Box<TypeExpr>),
    Map(Box<TypeExpr>, Box<TypeExpr>),
    Tuple(Vec<TypeExpr>),
    Function {
        params: Vec<TypeExpr>,
        ret: Box<TypeExpr>,
        is_async: bool,
    },
    /// `T?` postfix optional marker.
    Optional(Box<TypeExpr>),
    /// `A | B | C` union marker, parsed only in type position.
    Union(Vec<TypeExpr>),
}
