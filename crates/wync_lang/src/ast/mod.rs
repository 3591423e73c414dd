//! The Wyn abstract syntax tree: two mutually recursive sums, `Expr` and
//! `Stmt` (spec.md §3). A `Program` is an ordered sequence of top-level
//! statements (spec.md §4.2).

pub mod expr;
pub mod pattern;
pub mod resolved;
pub mod stmt;
pub mod types;

pub use expr::{Expr, ExprKind, InterpSegment, MatchArm};
pub use pattern::Pattern;
pub use resolved::{GenericInstantiation, ResolvedCall, TypeId};
pub use stmt::{
    Block, CatchClause, ForHead, MatchCase, Param, Stmt, StmtKind, StructField, TraitMethodSig,
    TypeParam,
};
pub use types::TypeExpr;

/// The parser's top-level output: an ordered sequence of statements.
pub type Program = Vec<Stmt>;
