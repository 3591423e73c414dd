//! Compile-time analysis: the semantic type system, the symbol table, and
//! the checker that walks the parsed program and attaches a `TypeId` to
//! every value-producing expression (spec.md §4.3).

pub mod check;
pub mod scope;
pub mod types;

pub use check::{check_program, CheckOutput, Checker};
pub use scope::{FunctionSig, OverloadSet, ScopeStack, VarBinding};
pub use types::{Effect, Type, TypeTable};
