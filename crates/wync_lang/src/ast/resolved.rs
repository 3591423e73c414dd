//! Checker-attached annotations threaded through the AST.
//!
//! These live in `wync_lang` (not `wync_compile`) so the AST can carry them
//! without a reverse dependency from the parser crate onto the checker
//! crate. `wync_compile::analysis::types::TypeTable` is the table `TypeId`
//! indexes into; `wync_lang` only needs the opaque handle (spec.md §9,
//! "Cyclic and back-pointer-heavy AST": an index into an owning table
//! instead of a raw pointer or linked list).

use wync_base::Symbol;

/// An opaque handle into the checker's type table. `None` until the checker
/// visits the expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(pub u32);

/// What a `Call` resolved to: a plain function, a selected member of an
/// overload set, or a monomorphized generic instantiation.
#[derive(Debug, Clone)]
pub struct ResolvedCall {
    /// The (possibly mangled) C-level name the emitter should call.
    pub target: Symbol,
    pub generic_instantiation: Option<GenericInstantiation>,
}

#[derive(Debug, Clone)]
pub struct GenericInstantiation {
    pub mangled_name: Symbol,
    pub type_args: Vec<TypeId>,
}
