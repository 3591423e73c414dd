//! The generic-instantiation registry (spec.md §5, "process-scoped,
//! monotone"): records which concrete argument types a generic function or
//! struct was instantiated with, and hands back a deterministic mangled
//! name the emitter can define a monomorphized copy under.
//!
//! Never shrinks during a single compilation — once a `(name, type_args)`
//! pair is seen it keeps the same mangled name for the rest of the run, so
//! two call sites with the same concrete arguments share one emitted copy.

use std::collections::HashMap;

use wync_base::{Interner, Symbol};

use crate::analysis::types::Type;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct InstantiationKey {
    generic_name: Symbol,
    type_args: Vec<TypeKey>,
}

/// A hashable/orderable stand-in for `Type`, since `Type` itself hashes only
/// on name + instantiation for named types (not useful here, where we need
/// full structural identity of the *argument* types).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum TypeKey {
    Int,
    Float,
    Bool,
    String,
    Unit,
    Named(Symbol, Vec<TypeKey>),
    Array(Box<TypeKey>),
    Map(Box<TypeKey>, Box<TypeKey>),
    Tuple(Vec<TypeKey>),
    Option(Box<TypeKey>),
    Other(String),
}

fn type_key(ty: &Type, names: &dyn Fn(Symbol) -> String) -> TypeKey {
    match ty {
        Type::Int => TypeKey::Int,
        Type::Float => TypeKey::Float,
        Type::Bool => TypeKey::Bool,
        Type::String => TypeKey::String,
        Type::Unit => TypeKey::Unit,
        Type::Array(e) => TypeKey::Array(Box::new(type_key(e, names))),
        Type::Map(k, v) => TypeKey::Map(Box::new(type_key(k, names)), Box::new(type_key(v, names))),
        Type::Tuple(elems) => TypeKey::Tuple(elems.iter().map(|t| type_key(t, names)).collect()),
        Type::Option(e) => TypeKey::Option(Box::new(type_key(e, names))),
        Type::Struct { name, type_args, .. } => {
            TypeKey::Named(*name, type_args.iter().map(|t| type_key(t, names)).collect())
        }
        Type::Enum { name, .. } => TypeKey::Named(*name, vec![]),
        other => TypeKey::Other(other.display_name(names)),
    }
}

/// Registered once the checker decides a generic call site needs its own
/// monomorphized copy (spec.md §4.3, "Generic instantiation").
#[derive(Debug, Clone)]
pub struct Instantiation {
    pub generic_name: Symbol,
    pub type_args: Vec<Type>,
    pub mangled_name: Symbol,
}

#[derive(Debug, Default)]
pub struct GenericsRegistry {
    keys: HashMap<InstantiationKey, usize>,
    entries: Vec<Instantiation>,
}

impl GenericsRegistry {
    pub fn new() -> Self {
        GenericsRegistry::default()
    }

    /// Looks up or creates the mangled name for instantiating `generic_name`
    /// at `type_args`. Returns the same name on every subsequent call with
    /// the same arguments.
    pub fn instantiate(
        &mut self,
        interner: &mut Interner,
        generic_name: Symbol,
        type_args: Vec<Type>,
    ) -> Symbol {
        let names = |s: Symbol| interner.resolve(s).to_string();
        let key = InstantiationKey {
            generic_name,
            type_args: type_args.iter().map(|t| type_key(t, &names)).collect(),
        };
        if let Some(&idx) = self.keys.get(&key) {
            return self.entries[idx].mangled_name;
        }

        let base = interner.resolve(generic_name).to_string();
        let suffix: String = type_args
            .iter()
            .map(|t| t.display_name(&names).replace(['<', '>', ',', ' ', '?'], "_"))
            .collect::<Vec<_>>()
            .join("_");
        let mangled_text = if suffix.is_empty() {
            format!("__gen_{}", base)
        } else {
            format!("__gen_{}__{}", base, suffix)
        };
        let mangled_name = interner.intern(&mangled_text);

        let idx = self.entries.len();
        self.entries.push(Instantiation {
            generic_name,
            type_args,
            mangled_name,
        });
        self.keys.insert(key, idx);
        mangled_name
    }

    pub fn entries(&self) -> &[Instantiation] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_arguments_reuse_the_same_mangled_name() {
        let mut interner = Interner::new();
        let mut registry = GenericsRegistry::new();
        let name = interner.intern("id");
        let a = registry.instantiate(&mut interner, name, vec![Type::Int]);
        let b = registry.instantiate(&mut interner, name, vec![Type::Int]);
        assert_eq!(a, b);
        assert_eq!(registry.entries().len(), 1);
    }

    #[test]
    fn different_arguments_get_different_mangled_names() {
        let mut interner = Interner::new();
        let mut registry = GenericsRegistry::new();
        let name = interner.intern("id");
        let a = registry.instantiate(&mut interner, name, vec![Type::Int]);
        let b = registry.instantiate(&mut interner, name, vec![Type::String]);
        assert_ne!(a, b);
        assert_eq!(registry.entries().len(), 2);
    }
}
