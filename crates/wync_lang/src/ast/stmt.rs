//! Statement nodes (spec.md §3, "AST / Statement variants").

use wync_base::{Span, Symbol};

use super::expr::Expr;
use super::pattern::Pattern;
use super::types::TypeExpr;
use crate::token::Token;

#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }
}

/// One function parameter: its name token, declared type, `mut` flag, and
/// optional default value. Parameters with defaults must come after every
/// non-default parameter (spec.md §4.2).
#[derive(Debug, Clone)]
pub struct Param {
    pub name: Token,
    pub ty: TypeExpr,
    pub is_mut: bool,
    pub default: Option<Expr>,
}

/// One entry in a `<T, U: Show>` list: the parameter name plus whatever
/// trait bounds follow its `:` (spec.md §4.3, "Generic instantiation").
#[derive(Debug, Clone)]
pub struct TypeParam {
    pub name: Symbol,
    pub bounds: Vec<Symbol>,
}

#[derive(Debug, Clone)]
pub struct StructField {
    pub name: Token,
    pub ty: TypeExpr,
    /// ARC-managed field (spec.md §3, Struct definition).
    pub arc_managed: bool,
}

#[derive(Debug, Clone)]
pub struct TraitMethodSig {
    pub name: Symbol,
    pub params: Vec<Param>,
    pub return_type: Option<TypeExpr>,
    pub default_body: Option<Block>,
}

#[derive(Debug, Clone)]
pub struct CatchClause {
    pub exception_type: Token,
    pub binding: Token,
    pub body: Block,
}

#[derive(Debug, Clone)]
pub struct MatchCase {
    pub pattern: Pattern,
    pub guard: Option<Expr>,
    pub body: Box<Stmt>,
}

pub type Block = Vec<Stmt>;

/// Either a C-style `for (init; cond; inc)` loop or a `for x in iter`
/// for-each loop (spec.md §3, "For carries either...").
#[derive(Debug, Clone)]
pub enum ForHead {
    CStyle {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        inc: Option<Expr>,
    },
    ForEach {
        binding: Token,
        iterable: Expr,
    },
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    Expr(Expr),

    Let {
        /// A plain name binding, or an arbitrary (irrefutable) pattern.
        pattern: Pattern,
        is_mut: bool,
        is_const: bool,
        ty: Option<TypeExpr>,
        init: Option<Expr>,
    },

    Return(Option<Expr>),

    Block(Block),

    FunctionDef {
        name: Symbol,
        params: Vec<Param>,
        type_params: Vec<TypeParam>,
        return_type: Option<TypeExpr>,
        body: Block,
        is_public: bool,
        is_async: bool,
        /// `fn Type.method(self, ...)` extension-method form.
        extension_receiver: Option<Token>,
    },

    StructDef {
        name: Symbol,
        type_params: Vec<TypeParam>,
        fields: Vec<StructField>,
    },

    EnumDef {
        name: Symbol,
        variants: Vec<Token>,
    },

    ImplBlock {
        type_name: Token,
        methods: Vec<Stmt>,
    },

    TraitDef {
        name: Symbol,
        type_params: Vec<TypeParam>,
        methods: Vec<TraitMethodSig>,
    },

    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    While {
        cond: Expr,
        body: Box<Stmt>,
    },

    For {
        head: ForHead,
        body: Box<Stmt>,
    },

    Break,
    Continue,

    Import {
        module: Symbol,
        items: Option<Vec<Symbol>>,
    },

    Export(Box<Stmt>),

    Module {
        name: Symbol,
        body: Block,
    },

    TypeAlias {
        name: Symbol,
        target: TypeExpr,
    },

    Try {
        body: Block,
        catches: Vec<CatchClause>,
        finally: Option<Block>,
    },

    Throw(Expr),

    Match {
        scrutinee: Expr,
        cases: Vec<MatchCase>,
    },

    Test {
        name: Symbol,
        is_async: bool,
        body: Block,
    },

    Spawn(Expr),

    Extern {
        name: Symbol,
        params: Vec<Param>,
        return_type: Option<TypeExpr>,
        is_variadic: bool,
    },

    MacroDef {
        name: Symbol,
        params: Vec<Symbol>,
        body: Block,
    },
}
