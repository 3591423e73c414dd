//! Expression nodes (spec.md §3, "AST / Expression variants").

use wync_base::{Span, Symbol};

use super::pattern::Pattern;
use super::resolved::{ResolvedCall, TypeId};
use super::types::TypeExpr;
use crate::token::Token;

#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    /// The token the parser was looking at when it started this node.
    pub token: Token,
    pub span: Span,
    /// Filled in by the checker; `None` until then (spec.md invariant:
    /// every value-producing expression has a non-null resolved type after
    /// checking succeeds).
    pub resolved_type: Option<TypeId>,
}

impl Expr {
    pub fn new(kind: ExprKind, token: Token, span: Span) -> Self {
        Expr {
            kind,
            token,
            span,
            resolved_type: None,
        }
    }

    pub fn span(&self) -> Span {
        self.span
    }
}

#[derive(Debug, Clone)]
pub struct MatchArm {
    pub pattern: Pattern,
    pub body: Box<Expr>,
}

#[derive(Debug, Clone)]
pub enum InterpSegment {
    Literal(Symbol),
    Expr(Box<Expr>),
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    IntLit(i64),
    FloatLit(f64),
    /// Raw quoted lexeme (escapes unprocessed; spec.md §4.1/§4.4).
    StrLit(Symbol),
    CharLit(char),
    BoolLit(bool),
    Ident(Symbol),
    /// `name = value`, reassigning an existing binding (spec.md §4.2,
    /// "Assignment"). Distinct from `Let`, which introduces a new one.
    Assign {
        name: Symbol,
        value: Box<Expr>,
    },

    Unary {
        op: Token,
        operand: Box<Expr>,
    },
    Binary {
        op: Token,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        resolved: Option<ResolvedCall>,
    },
    MethodCall {
        receiver: Box<Expr>,
        method: Symbol,
        args: Vec<Expr>,
    },
    ArrayLit(Vec<Expr>),
    Index {
        container: Box<Expr>,
        index: Box<Expr>,
    },
    IndexAssign {
        container: Box<Expr>,
        index: Box<Expr>,
        value: Box<Expr>,
    },
    Field {
        object: Box<Expr>,
        name: Symbol,
    },
    FieldAssign {
        object: Box<Expr>,
        name: Symbol,
        value: Box<Expr>,
    },
    StructInit {
        type_name: Symbol,
        fields: Vec<(Symbol, Expr)>,
    },
    Range {
        start: Box<Expr>,
        end: Box<Expr>,
        inclusive: bool,
    },
    Tuple(Vec<Expr>),
    TupleIndex {
        tuple: Box<Expr>,
        index: u32,
    },
    MapLit {
        keys: Vec<Expr>,
        values: Vec<Expr>,
    },
    If {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Option<Box<Expr>>,
    },
    Ternary {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    Match {
        scrutinee: Box<Expr>,
        arms: Vec<MatchArm>,
    },
    Interpolation(Vec<InterpSegment>),
    Lambda {
        params: Vec<Symbol>,
        body: Box<Expr>,
        /// Populated by the closure-lifting pass (spec.md §4.4, "Closure
        /// lifting pass"); empty until then.
        captures: Vec<Symbol>,
    },
    Try(Box<Expr>),
    Some(Box<Expr>),
    None,
    Ok(Box<Expr>),
    Err(Box<Expr>),
    Pipeline(Vec<Expr>),
    Await(Box<Expr>),
    /// `T?` used in type position.
    OptionalTypeMarker(Box<TypeExpr>),
    /// `A | B` used in type position.
    UnionTypeMarker(Vec<TypeExpr>),
    /// A pattern reified as a value (rare; only reachable in destructuring
    /// contexts that parse through the expression grammar).
    PatternExpr(Box<Pattern>),
}
