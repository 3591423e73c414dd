//! Semantic type representation and the table `wync_lang::ast::TypeId`
//! indexes into (spec.md §3, "Types (semantic)").
//!
//! `Type` is structurally compared except for `Struct`/`Enum`/`Trait`,
//! which compare by name plus instantiation — two `Struct("Point", [])`
//! values are the same type, but `Struct("Box", [Int])` and
//! `Struct("Box", [String])` are not.

use std::collections::HashMap;

use wync_base::Symbol;
use wync_lang::ast::TypeId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Pure,
    Async,
}

#[derive(Debug, Clone)]
pub enum Type {
    Int,
    Float,
    Bool,
    String,
    Unit,
    Array(Box<Type>),
    Map(Box<Type>, Box<Type>),
    Tuple(Vec<Type>),
    Option(Box<Type>),
    Result(Box<Type>, Box<Type>),
    Function {
        params: Vec<Type>,
        ret: Box<Type>,
        effect: Effect,
    },
    Struct {
        name: Symbol,
        fields: Vec<(Symbol, Type)>,
        type_args: Vec<Type>,
    },
    Enum {
        name: Symbol,
        variants: Vec<Symbol>,
    },
    Trait(Symbol),
    /// An unbound generic type parameter, e.g. `T` in `fn id<T>(x: T) -> T`.
    GenericParam(Symbol),
    /// A future produced by an `async fn`; `await` unwraps it to its payload.
    Future(Box<Type>),
    /// Placeholder attached after an error so later uses of the same value
    /// don't cascade into secondary diagnostics (spec.md §7, "Propagation").
    Error,
}

impl Type {
    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Float)
    }

    pub fn is_string_like(&self) -> bool {
        matches!(self, Type::String)
    }

    /// Whether `self` may be used where `expected` is required. Structural
    /// for everything but named types, which additionally require the same
    /// name and type arguments.
    pub fn assignable_to(&self, expected: &Type) -> bool {
        if self == expected {
            return true;
        }
        matches!((self, expected), (Type::Error, _) | (_, Type::Error))
    }

    pub fn display_name(&self, names: &dyn Fn(Symbol) -> String) -> String {
        match self {
            Type::Int => "int".to_string(),
            Type::Float => "float".to_string(),
            Type::Bool => "bool".to_string(),
            Type::String => "string".to_string(),
            Type::Unit => "()".to_string(),
            Type::Array(elem) => format!("[{}]", elem.display_name(names)),
            Type::Map(k, v) => format!("{{{}: {}}}", k.display_name(names), v.display_name(names)),
            Type::Tuple(elems) => {
                let parts: Vec<String> = elems.iter().map(|e| e.display_name(names)).collect();
                format!("({})", parts.join(", "))
            }
            Type::Option(inner) => format!("{}?", inner.display_name(names)),
            Type::Result(ok, err) => {
                format!("Result<{}, {}>", ok.display_name(names), err.display_name(names))
            }
            Type::Function { params, ret, effect } => {
                let parts: Vec<String> = params.iter().map(|p| p.display_name(names)).collect();
                let prefix = if *effect == Effect::Async { "async " } else { "" };
                format!("{}({}) -> {}", prefix, parts.join(", "), ret.display_name(names))
            }
            Type::Struct { name, type_args, .. } => {
                if type_args.is_empty() {
                    names(*name)
                } else {
                    let parts: Vec<String> =
                        type_args.iter().map(|t| t.display_name(names)).collect();
                    format!("{}<{}>", names(*name), parts.join(", "))
                }
            }
            Type::Enum { name, .. } => names(*name),
            Type::Trait(name) => names(*name),
            Type::GenericParam(name) => names(*name),
            Type::Future(inner) => format!("Future<{}>", inner.display_name(names)),
            Type::Error => "<error>".to_string(),
        }
    }

    pub fn contains_generic_param(&self) -> bool {
        match self {
            Type::GenericParam(_) => true,
            Type::Array(e) | Type::Option(e) | Type::Future(e) => e.contains_generic_param(),
            Type::Map(k, v) => k.contains_generic_param() || v.contains_generic_param(),
            Type::Tuple(elems) => elems.iter().any(Type::contains_generic_param),
            Type::Result(ok, err) => ok.contains_generic_param() || err.contains_generic_param(),
            Type::Function { params, ret, .. } => {
                params.iter().any(Type::contains_generic_param) || ret.contains_generic_param()
            }
            Type::Struct { type_args, .. } => type_args.iter().any(Type::contains_generic_param),
            _ => false,
        }
    }
}

/// The table every `TypeId` in the checked AST indexes into. Append-only
/// during a single compilation (spec.md §5, "monotone").
#[derive(Debug, Default)]
pub struct TypeTable {
    types: Vec<Type>,
    dedup: HashMap<Type, TypeId>,
}

impl TypeTable {
    pub fn new() -> Self {
        TypeTable {
            types: Vec::new(),
            dedup: HashMap::new(),
        }
    }

    /// Interns a `Type`, returning a stable `TypeId`. Structurally equal
    /// types (including equal `Struct`/`Enum` name+args) reuse the same id.
    pub fn intern(&mut self, ty: Type) -> TypeId {
        if let Some(id) = self.dedup.get(&ty) {
            return *id;
        }
        let id = TypeId(self.types.len() as u32);
        self.dedup.insert(ty.clone(), id);
        self.types.push(ty);
        id
    }

    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.0 as usize]
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        use Type::*;
        match (self, other) {
            (Int, Int) | (Float, Float) | (Bool, Bool) | (String, String) | (Unit, Unit) => true,
            (Array(a), Array(b)) => a == b,
            (Map(ak, av), Map(bk, bv)) => ak == bk && av == bv,
            (Tuple(a), Tuple(b)) => a == b,
            (Option(a), Option(b)) => a == b,
            (Result(ao, ae), Result(bo, be)) => ao == bo && ae == be,
            (
                Function { params: ap, ret: ar, effect: ae },
                Function { params: bp, ret: br, effect: be },
            ) => ap == bp && ar == br && ae == be,
            // Structs/enums/traits compare by name + instantiation, not by
            // structural field contents (spec.md §3, "Types (semantic)").
            (Struct { name: an, type_args: aa, .. }, Struct { name: bn, type_args: ba, .. }) => {
                an == bn && aa == ba
            }
            (Enum { name: an, .. }, Enum { name: bn, .. }) => an == bn,
            (Trait(a), Trait(b)) => a == b,
            (GenericParam(a), GenericParam(b)) => a == b,
            (Future(a), Future(b)) => a == b,
            (Error, Error) => true,
            _ => false,
        }
    }
}

impl std::hash::Hash for Type {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Type::Array(e) | Type::Option(e) | Type::Future(e) => e.hash(state),
            Type::Map(k, v) => {
                k.hash(state);
                v.hash(state);
            }
            Type::Tuple(elems) => elems.hash(state),
            Type::Result(ok, err) => {
                ok.hash(state);
                err.hash(state);
            }
            Type::Function { params, ret, effect } => {
                params.hash(state);
                ret.hash(state);
                effect.hash(state);
            }
            Type::Struct { name, type_args, .. } => {
                name.index().hash(state);
                type_args.hash(state);
            }
            Type::Enum { name, .. } => name.index().hash(state),
            Type::Trait(name) | Type::GenericParam(name) => name.index().hash(state),
            _ => {}
        }
    }
}

impl Eq for Type {}
impl std::hash::Hash for Effect {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_same_type_returns_same_id() {
        let mut table = TypeTable::new();
        let a = table.intern(Type::Int);
        let b = table.intern(Type::Int);
        assert_eq!(a, b);
    }

    #[test]
    fn interning_different_types_returns_different_ids() {
        let mut table = TypeTable::new();
        let a = table.intern(Type::Int);
        let b = table.intern(Type::Float);
        assert_ne!(a, b);
    }

    #[test]
    fn struct_types_compare_by_name_and_args() {
        let mut table = TypeTable::new();
        let sym = Symbol::default();
        let a = table.intern(Type::Struct {
            name: sym,
            fields: vec![],
            type_args: vec![Type::Int],
        });
        let b = table.intern(Type::Struct {
            name: sym,
            fields: vec![],
            type_args: vec![Type::String],
        });
        assert_ne!(a, b);
    }

    #[test]
    fn generic_param_detection() {
        let t = Type::Array(Box::new(Type::GenericParam(Symbol::default())));
        assert!(t.contains_generic_param());
        assert!(!Type::Int.contains_generic_param());
    }
}
