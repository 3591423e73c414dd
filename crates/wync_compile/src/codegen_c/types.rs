//! C type selection (spec.md §4.4, "let-binding type selection" and the
//! heterogeneous runtime containers in `runtime.rs`).
//!
//! Every checked `Expr` already carries a `resolved_type: Option<TypeId>`
//! (spec.md §9, "Design Notes"), so picking a `CType` for most expressions
//! is just a lookup into the `TypeTable` the checker produced. Declared
//! type annotations that have no backing `Expr` (function parameters,
//! struct fields, a `let` with no initializer) go through
//! [`resolve_type_expr`] instead, which resolves a syntactic `TypeExpr`
//! using only the struct/enum name sets collected from the raw program.

use std::collections::{HashMap, HashSet};

use wync_base::{Interner, Symbol};
use wync_lang::ast::TypeExpr;

use crate::analysis::{Type, TypeTable};
use crate::spawn::SpawnRegistry;

/// Names that must not collide with an emitted C identifier.
const C_RESERVED: &[&str] = &[
    "auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else",
    "enum", "extern", "float", "for", "goto", "if", "int", "long", "register", "return", "short",
    "signed", "sizeof", "static", "struct", "switch", "typedef", "union", "unsigned", "void",
    "volatile", "while", "inline", "restrict", "_Bool", "_Complex", "_Imaginary", "bool", "true",
    "false", "main", "argc", "argv",
];

pub(super) fn is_c_reserved(name: &str) -> bool {
    C_RESERVED.contains(&name) || name.starts_with("wyn_") || name.starts_with("Wyn")
}

pub(super) fn escape_c_ident(name: &str) -> String {
    if is_c_reserved(name) {
        format!("wynu_{}", name)
    } else {
        name.replace(['<', '>', ',', ' ', '?', ':'], "_")
    }
}

/// Struct/enum names collected once from the raw program, so type
/// resolution never needs to re-walk the AST.
#[derive(Debug, Default)]
pub(super) struct TypeEnv {
    pub(super) structs: HashSet<Symbol>,
    pub(super) enums: HashSet<Symbol>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum CType {
    Int,
    Float,
    Bool,
    Str,
    Unit,
    Array,
    Map,
    Tuple,
    Option,
    Result,
    Future,
    Closure,
    Struct(Symbol),
    Enum(Symbol),
    /// Anything whose concrete shape isn't known statically: generic
    /// parameters, trait objects, and lambda captures/parameters (the
    /// checker types lambda parameters as `GenericParam`, spec.md §4.3
    /// "Lambda").
    Value,
}

pub(super) fn c_type_str(ty: CType, interner: &Interner) -> String {
    match ty {
        CType::Int => "int64_t".to_string(),
        CType::Float => "double".to_string(),
        CType::Bool => "bool".to_string(),
        CType::Str => "char *".to_string(),
        CType::Unit => "void".to_string(),
        CType::Array => "WynArray *".to_string(),
        CType::Map => "WynMap *".to_string(),
        CType::Tuple => "WynValue *".to_string(),
        CType::Option => "WynOption".to_string(),
        CType::Result => "WynResult".to_string(),
        CType::Future => "WynFuture *".to_string(),
        CType::Closure => "WynClosure *".to_string(),
        CType::Struct(sym) | CType::Enum(sym) => escape_c_ident(interner.resolve(sym)),
        CType::Value => "WynValue".to_string(),
    }
}

pub(super) fn ctype_of(ty: &Type) -> CType {
    match ty {
        Type::Int => CType::Int,
        Type::Float => CType::Float,
        Type::Bool => CType::Bool,
        Type::String => CType::Str,
        Type::Unit => CType::Unit,
        Type::Array(_) => CType::Array,
        Type::Map(_, _) => CType::Map,
        Type::Tuple(_) => CType::Tuple,
        Type::Option(_) => CType::Option,
        Type::Result(_, _) => CType::Result,
        Type::Function { .. } => CType::Closure,
        Type::Struct { name, .. } => CType::Struct(*name),
        Type::Enum { name, .. } => CType::Enum(*name),
        Type::Future(_) => CType::Future,
        Type::Trait(_) | Type::GenericParam(_) | Type::Error => CType::Value,
    }
}

/// The C type of `expr`'s resolved type, falling back to `Value` if the
/// checker never attached one (e.g. dead code, or an error placeholder).
pub(super) fn ctype_of_typeid(
    id: Option<wync_lang::ast::TypeId>,
    types: &TypeTable,
) -> CType {
    match id {
        Some(id) => ctype_of(types.get(id)),
        None => CType::Value,
    }
}

/// Resolves a syntactic type annotation without a checker in hand. Used for
/// function parameter/return declarations and struct fields, which carry a
/// `TypeExpr` but no checked `Expr`.
pub(super) fn resolve_type_expr(te: &TypeExpr, env: &TypeEnv, interner: &Interner) -> CType {
    match te {
        TypeExpr::Named { name, .. } => {
            let text = interner.resolve(*name);
            match text {
                "int" | "i32" | "i64" => CType::Int,
                "float" | "f32" | "f64" => CType::Float,
                "bool" => CType::Bool,
                "string" | "str" => CType::Str,
                "unit" | "void" => CType::Unit,
                _ => {
                    if env.structs.contains(name) {
                        CType::Struct(*name)
                    } else if env.enums.contains(name) {
                        CType::Enum(*name)
                    } else {
                        CType::Value
                    }
                }
            }
        }
        TypeExpr::Array(_) => CType::Array,
        TypeExpr::Map(_, _) => CType::Map,
        TypeExpr::Tuple(_) => CType::Tuple,
        TypeExpr::Function { .. } => CType::Closure,
        TypeExpr::Optional(_) => CType::Option,
        TypeExpr::Union(_) => CType::Value,
    }
}

/// Per-function codegen state: the C types currently bound in scope, and
/// the return type of every top-level function (for call-expression typing
/// before the whole program has been walked).
pub(super) struct CContext<'a> {
    pub(super) vars: HashMap<Symbol, CType>,
    pub(super) funcs: HashMap<Symbol, CType>,
    pub(super) interner: &'a Interner,
    pub(super) env: &'a TypeEnv,
    pub(super) inline_hints: &'a HashSet<Symbol>,
    /// The original source buffer, needed to read the text behind bare
    /// `Token`s (parameter names, struct fields, enum variants, catch and
    /// for-each bindings) that were never interned into a `Symbol`.
    pub(super) source: &'a str,
    /// `spawn` call sites with a statically-known callee (spec.md §5).
    pub(super) spawns: &'a SpawnRegistry,
}

impl<'a> CContext<'a> {
    pub(super) fn new(
        interner: &'a Interner,
        env: &'a TypeEnv,
        inline_hints: &'a HashSet<Symbol>,
        source: &'a str,
        spawns: &'a SpawnRegistry,
    ) -> Self {
        CContext {
            vars: HashMap::new(),
            funcs: HashMap::new(),
            interner,
            env,
            inline_hints,
            source,
            spawns,
        }
    }

    pub(super) fn resolve(&self, sym: Symbol) -> String {
        escape_c_ident(self.interner.resolve(sym))
    }

    /// The escaped C identifier text behind a raw token.
    pub(super) fn token_ident(&self, token: wync_lang::Token) -> String {
        escape_c_ident(token.lexeme(self.source))
    }
}
