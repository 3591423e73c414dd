//! Symbol table: a stack of scopes, plus the function/struct/enum/trait
//! tables that live at the top level (spec.md §3 "Symbol table", §9
//! "Cyclic and back-pointer-heavy AST").
//!
//! The source material chains overloads with a raw `next_overload` pointer
//! and represents a selected overload as a raw pointer into that chain.
//! Here an [`OverloadSet`] is an owned `Vec<FunctionSig>` keyed by name in
//! [`Checker::functions`](super::check::Checker); a `Call` node carries an
//! index into that set (via `ResolvedCall::target`, already mangled) rather
//! than a pointer, so there are no cycles to reason about.

use std::collections::HashMap;

use wync_base::Symbol;
use wync_lang::ast::{Expr, TypeId};

/// A single function declaration; several of these with the same name form
/// an [`OverloadSet`].
#[derive(Debug, Clone)]
pub struct FunctionSig {
    pub name: Symbol,
    /// The C-level name to call. Equal to `name`'s text when there is only
    /// one overload; mangled (`__ovl_<name>_<index>`) otherwise (spec.md
    /// §4.3, "If exactly one overload exists for a name, do not mangle").
    pub mangled_name: Symbol,
    pub params: Vec<TypeId>,
    pub return_type: TypeId,
    pub type_params: Vec<Symbol>,
    /// Trait bounds per type parameter, by index into `type_params`.
    pub bounds: Vec<Vec<Symbol>>,
    pub is_async: bool,
    /// Per-parameter default value expression, positional with `params`.
    /// Defaulted parameters are always a suffix (spec.md §4.2, "parameters
    /// with defaults must come after all non-default parameters"), so the
    /// first `Some` marks where optional arguments begin.
    pub defaults: Vec<Option<Expr>>,
}

impl FunctionSig {
    /// The smallest argument count a call site may supply: every parameter
    /// up to (not including) the first one with a default.
    pub fn min_arity(&self) -> usize {
        self.defaults.iter().take_while(|d| d.is_none()).count()
    }
}

#[derive(Debug, Clone, Default)]
pub struct OverloadSet {
    pub overloads: Vec<FunctionSig>,
}

impl OverloadSet {
    /// A name is only ever mangled once more than one overload is present;
    /// callers ask for the current scheme after every push (spec.md §9,
    /// "Open question — overload mangling visibility").
    pub fn needs_mangling(&self) -> bool {
        self.overloads.len() > 1
    }
}

#[derive(Debug, Clone)]
pub struct VarBinding {
    pub ty: TypeId,
    pub is_mut: bool,
}

/// One lexical scope: block, function body, match arm, or for-body (spec.md
/// §4.3, "Scope management").
#[derive(Debug, Default)]
pub struct Scope {
    vars: HashMap<Symbol, VarBinding>,
}

#[derive(Debug, Default)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    pub fn new() -> Self {
        ScopeStack {
            scopes: vec![Scope::default()],
        }
    }

    pub fn push(&mut self) {
        self.scopes.push(Scope::default());
    }

    pub fn pop(&mut self) {
        self.scopes.pop();
    }

    /// Inserts into the innermost scope (spec.md §3, "insertion is into the
    /// innermost").
    pub fn declare(&mut self, name: Symbol, binding: VarBinding) {
        self.scopes
            .last_mut()
            .expect("scope stack is never empty")
            .vars
            .insert(name, binding);
    }

    /// Walks from innermost to outermost (spec.md §3, "Lookup walks from
    /// innermost to outermost").
    pub fn lookup(&self, name: Symbol) -> Option<&VarBinding> {
        self.scopes.iter().rev().find_map(|s| s.vars.get(&name))
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_finds_innermost_shadowing_binding() {
        let mut stack = ScopeStack::new();
        let name = Symbol::default();
        stack.declare(name, VarBinding { ty: TypeId(0), is_mut: false });
        stack.push();
        stack.declare(name, VarBinding { ty: TypeId(1), is_mut: true });
        assert_eq!(stack.lookup(name).unwrap().ty, TypeId(1));
        stack.pop();
        assert_eq!(stack.lookup(name).unwrap().ty, TypeId(0));
    }

    #[test]
    fn overload_set_needs_mangling_only_when_multiple() {
        let mut set = OverloadSet::default();
        set.overloads.push(FunctionSig {
            name: Symbol::default(),
            mangled_name: Symbol::default(),
            params: vec![],
            return_type: TypeId(0),
            type_params: vec![],
            bounds: vec![],
            is_async: false,
            defaults: vec![],
        });
        assert!(!set.needs_mangling());
        set.overloads.push(set.overloads[0].clone());
        assert!(set.needs_mangling());
    }
}
