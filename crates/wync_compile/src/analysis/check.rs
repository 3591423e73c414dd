//! The semantic checker (spec.md §4.3).
//!
//! Two passes over the program:
//!
//! 1. [`preregister`](Checker::preregister) walks every top-level item once,
//!    recording struct/enum/trait/function signatures so that forward
//!    references (a function calling one declared later in the file) work
//!    without a second parse.
//! 2. [`check_stmt`](Checker::check_stmt) / [`check_expr`](Checker::check_expr)
//!    walk the program in order, attaching a `TypeId` to every
//!    value-producing expression and accumulating [`CheckError`]s rather
//!    than stopping at the first one (spec.md §7, "Checking does not abort
//!    on the first error; it keeps going with a placeholder type").

use std::collections::HashMap;

use wync_base::{Interner, Span, Symbol};
use wync_lang::ast::{
    Block, Expr, ExprKind, ForHead, MatchArm, Param, Pattern, Program, Stmt, StmtKind, StructField,
    TraitMethodSig, TypeExpr, TypeId, TypeParam,
};

use crate::error::{CheckError, CheckErrorKind};
use crate::generics::GenericsRegistry;

use super::scope::{FunctionSig, OverloadSet, ScopeStack, VarBinding};
use super::types::{Effect, Type, TypeTable};

#[derive(Debug, Clone)]
struct StructInfo {
    type_params: Vec<Symbol>,
    fields: Vec<StructField>,
}

#[derive(Debug, Clone)]
struct EnumInfo {
    variants: Vec<Symbol>,
}

#[derive(Debug, Clone)]
struct TraitInfo {
    methods: Vec<TraitMethodSig>,
}

/// Everything the downstream passes (closure lifting, optimizer, emitters)
/// need out of checking.
pub struct CheckOutput {
    pub types: TypeTable,
    pub errors: Vec<CheckError>,
    pub generics: GenericsRegistry,
}

pub struct Checker<'i, 's> {
    interner: &'i mut Interner,
    source: &'s str,
    types: TypeTable,
    scopes: ScopeStack,
    functions: HashMap<Symbol, OverloadSet>,
    structs: HashMap<Symbol, StructInfo>,
    enums: HashMap<Symbol, EnumInfo>,
    traits: HashMap<Symbol, TraitInfo>,
    /// Methods registered per receiver type name via `impl` blocks. Trait
    /// conformance is checked structurally against this table, since the
    /// grammar has no `impl Trait for Type` form (spec.md §3, `ImplBlock`
    /// only names the type).
    methods: HashMap<Symbol, HashMap<Symbol, FunctionSig>>,
    generics: GenericsRegistry,
    errors: Vec<CheckError>,
    current_return_type: Option<Type>,
    loop_depth: u32,
}

pub fn check_program(program: &mut Program, interner: &mut Interner, source: &str) -> CheckOutput {
    let mut checker = Checker::new(interner, source);
    checker.preregister(program);
    for stmt in program.iter_mut() {
        checker.check_stmt(stmt);
    }
    checker.finish()
}

impl<'i, 's> Checker<'i, 's> {
    fn new(interner: &'i mut Interner, source: &'s str) -> Self {
        Checker {
            interner,
            source,
            types: TypeTable::new(),
            scopes: ScopeStack::new(),
            functions: HashMap::new(),
            structs: HashMap::new(),
            enums: HashMap::new(),
            traits: HashMap::new(),
            methods: HashMap::new(),
            generics: GenericsRegistry::new(),
            errors: Vec::new(),
            current_return_type: None,
            loop_depth: 0,
        }
    }

    fn finish(self) -> CheckOutput {
        CheckOutput {
            types: self.types,
            errors: self.errors,
            generics: self.generics,
        }
    }

    fn error(&mut self, kind: CheckErrorKind, span: Span) -> Type {
        self.errors.push(CheckError::new(kind, span));
        Type::Error
    }

    fn intern_type(&mut self, ty: Type) -> TypeId {
        self.types.intern(ty)
    }

    fn name_of(&self, sym: Symbol) -> String {
        self.interner.resolve(sym).to_string()
    }

    fn display(&self, ty: &Type) -> String {
        let interner = &self.interner;
        ty.display_name(&|s| interner.resolve(s).to_string())
    }

    // ------------------------------------------------------------------
    // Pre-registration
    // ------------------------------------------------------------------

    fn preregister(&mut self, program: &Program) {
        for stmt in program {
            self.preregister_stmt(stmt);
        }
    }

    fn preregister_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::FunctionDef { .. } => self.register_function(stmt),
            StmtKind::Extern { name, params, return_type, .. } => {
                self.register_signature(*name, params, return_type, &[], false);
            }
            StmtKind::StructDef { name, type_params, fields } => {
                self.structs.insert(
                    *name,
                    StructInfo {
                        type_params: type_params.iter().map(|p| p.name).collect(),
                        fields: fields.clone(),
                    },
                );
            }
            StmtKind::EnumDef { name, variants } => {
                self.enums.insert(
                    *name,
                    EnumInfo {
                        variants: variants.iter().map(|t| self.lexeme_symbol(*t)).collect(),
                    },
                );
            }
            StmtKind::TraitDef { name, methods, .. } => {
                self.traits.insert(*name, TraitInfo { methods: methods.clone() });
            }
            StmtKind::ImplBlock { type_name, methods } => {
                let type_sym = self.lexeme_symbol(*type_name);
                for method in methods {
                    if let StmtKind::FunctionDef { name, params, return_type, type_params, .. } =
                        &method.kind
                    {
                        let sig = self.build_sig(*name, params, return_type, type_params, false);
                        self.methods.entry(type_sym).or_default().insert(*name, sig);
                    }
                }
            }
            StmtKind::Module { body, .. } => {
                for inner in body {
                    self.preregister_stmt(inner);
                }
            }
            StmtKind::Export(inner) => self.preregister_stmt(inner),
            _ => {}
        }
    }

    /// Tokens carry only a span; the symbol behind a declaration name is
    /// whatever text that span covers, interned once here against the
    /// original source buffer.
    fn lexeme_symbol(&mut self, token: wync_lang::Token) -> Symbol {
        self.interner.intern(token.lexeme(self.source))
    }

    fn register_function(&mut self, stmt: &Stmt) {
        if let StmtKind::FunctionDef {
            name,
            params,
            return_type,
            type_params,
            is_async,
            ..
        } = &stmt.kind
        {
            self.register_signature(*name, params, return_type, type_params, *is_async);
        }
    }

    fn register_signature(
        &mut self,
        name: Symbol,
        params: &[Param],
        return_type: &Option<TypeExpr>,
        type_params: &[TypeParam],
        is_async: bool,
    ) {
        let sig = self.build_sig_from_parts(name, params, return_type, type_params, is_async);
        let set = self.functions.entry(name).or_default();
        set.overloads.push(sig);
        // Re-derive mangled names for the whole set now that membership
        // changed (spec.md §4.3, "overload mangling").
        let needs_mangling = set.overloads.len() > 1;
        if needs_mangling {
            let base = self.name_of(name);
            let count = self.functions[&name].overloads.len();
            let set = self.functions.get_mut(&name).unwrap();
            for (i, ov) in set.overloads.iter_mut().enumerate().take(count) {
                let mangled = format!("__ovl_{}_{}", base, i);
                ov.mangled_name = self.interner.intern(&mangled);
            }
        }
    }

    fn build_sig(
        &mut self,
        name: Symbol,
        params: &[Param],
        return_type: &Option<TypeExpr>,
        type_params: &[TypeParam],
        is_async: bool,
    ) -> FunctionSig {
        self.build_sig_from_parts(name, params, return_type, type_params, is_async)
    }

    fn build_sig_from_parts(
        &mut self,
        name: Symbol,
        params: &[Param],
        return_type: &Option<TypeExpr>,
        type_params: &[TypeParam],
        is_async: bool,
    ) -> FunctionSig {
        let names: Vec<Symbol> = type_params.iter().map(|p| p.name).collect();
        let param_types: Vec<TypeId> = params
            .iter()
            .map(|p| {
                let ty = self.resolve_type_expr(&p.ty, &names);
                self.intern_type(ty)
            })
            .collect();
        let ret_ty = match return_type {
            Some(t) => self.resolve_type_expr(t, &names),
            None => Type::Unit,
        };
        let return_type_id = self.intern_type(ret_ty);
        FunctionSig {
            name,
            mangled_name: name,
            params: param_types,
            return_type: return_type_id,
            type_params: names,
            bounds: type_params.iter().map(|p| p.bounds.clone()).collect(),
            is_async,
            defaults: params.iter().map(|p| p.default.clone()).collect(),
        }
    }

    // ------------------------------------------------------------------
    // Type-expression resolution
    // ------------------------------------------------------------------

    fn resolve_type_expr(&mut self, expr: &TypeExpr, type_params: &[Symbol]) -> Type {
        match expr {
            TypeExpr::Named { name, args } => self.resolve_named_type(*name, args, type_params),
            TypeExpr::Array(inner) => {
                Type::Array(Box::new(self.resolve_type_expr(inner, type_params)))
            }
            TypeExpr::Map(k, v) => Type::Map(
                Box::new(self.resolve_type_expr(k, type_params)),
                Box::new(self.resolve_type_expr(v, type_params)),
            ),
            TypeExpr::Tuple(elems) => Type::Tuple(
                elems.iter().map(|e| self.resolve_type_expr(e, type_params)).collect(),
            ),
            TypeExpr::Function { params, ret, is_async } => Type::Function {
                params: params.iter().map(|p| self.resolve_type_expr(p, type_params)).collect(),
                ret: Box::new(self.resolve_type_expr(ret, type_params)),
                effect: if *is_async { Effect::Async } else { Effect::Pure },
            },
            TypeExpr::Optional(inner) => {
                Type::Option(Box::new(self.resolve_type_expr(inner, type_params)))
            }
            // A bare union in type position degrades to its first arm; full
            // union-typed values are out of scope for the checker (the
            // lexer/parser still accept the syntax so extern declarations
            // using it parse, per spec.md non-goals on string-typing).
            TypeExpr::Union(arms) => arms
                .first()
                .map(|a| self.resolve_type_expr(a, type_params))
                .unwrap_or(Type::Error),
        }
    }

    fn resolve_named_type(
        &mut self,
        name: Symbol,
        args: &[TypeExpr],
        type_params: &[Symbol],
    ) -> Type {
        if type_params.contains(&name) {
            return Type::GenericParam(name);
        }
        let text = self.name_of(name);
        match text.as_str() {
            "int" | "i32" | "i64" => return Type::Int,
            "float" | "f32" | "f64" => return Type::Float,
            "bool" => return Type::Bool,
            "string" | "str" => return Type::String,
            "unit" | "void" => return Type::Unit,
            "Result" if args.len() == 2 => {
                return Type::Result(
                    Box::new(self.resolve_type_expr(&args[0], type_params)),
                    Box::new(self.resolve_type_expr(&args[1], type_params)),
                );
            }
            "Option" if args.len() == 1 => {
                return Type::Option(Box::new(self.resolve_type_expr(&args[0], type_params)));
            }
            "Future" if args.len() == 1 => {
                return Type::Future(Box::new(self.resolve_type_expr(&args[0], type_params)));
            }
            _ => {}
        }
        let type_args: Vec<Type> =
            args.iter().map(|a| self.resolve_type_expr(a, type_params)).collect();
        if self.enums.contains_key(&name) {
            let variants = self.enums[&name].variants.clone();
            return Type::Enum { name, variants };
        }
        if self.traits.contains_key(&name) {
            return Type::Trait(name);
        }
        // Struct (known or forward-referenced); fields filled lazily.
        let fields = match self.structs.get(&name).cloned() {
            Some(info) => info
                .fields
                .into_iter()
                .map(|f| (self.lexeme_symbol(f.name), Type::Error))
                .collect(),
            None => Vec::new(),
        };
        Type::Struct { name, fields, type_args }
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn check_stmt(&mut self, stmt: &mut Stmt) {
        match &mut stmt.kind {
            StmtKind::Expr(expr) => {
                self.check_expr(expr);
            }
            StmtKind::Let { pattern, is_mut, ty, init, .. } => {
                self.check_let(pattern, *is_mut, ty, init, stmt.span);
            }
            StmtKind::Return(value) => {
                let ty = match value {
                    Some(e) => self.check_expr(e),
                    None => Type::Unit,
                };
                if let Some(expected) = self.current_return_type.clone() {
                    if !ty.assignable_to(&expected) {
                        self.error(
                            CheckErrorKind::TypeMismatch {
                                expected: self.display(&expected),
                                found: self.display(&ty),
                            },
                            stmt.span,
                        );
                    }
                }
            }
            StmtKind::Block(body) => self.check_block(body),
            StmtKind::FunctionDef {
                name,
                params,
                return_type,
                type_params,
                body,
                is_async,
                extension_receiver,
                ..
            } => {
                let names: Vec<Symbol> = type_params.iter().map(|p| p.name).collect();
                self.check_function_body(
                    *name,
                    params,
                    return_type,
                    &names,
                    body,
                    *is_async,
                    extension_receiver.as_ref(),
                );
            }
            StmtKind::StructDef { .. } | StmtKind::EnumDef { .. } | StmtKind::TraitDef { .. } => {}
            StmtKind::ImplBlock { methods, .. } => {
                for m in methods {
                    self.check_stmt(m);
                }
            }
            StmtKind::If { cond, then_branch, else_branch } => {
                let cond_ty = self.check_expr(cond);
                if !matches!(cond_ty, Type::Bool | Type::Error) {
                    self.error(
                        CheckErrorKind::TypeMismatch {
                            expected: "bool".into(),
                            found: self.display(&cond_ty),
                        },
                        cond.span(),
                    );
                }
                self.scopes.push();
                self.check_stmt(then_branch);
                self.scopes.pop();
                if let Some(e) = else_branch {
                    self.scopes.push();
                    self.check_stmt(e);
                    self.scopes.pop();
                }
            }
            StmtKind::While { cond, body } => {
                self.check_expr(cond);
                self.loop_depth += 1;
                self.scopes.push();
                self.check_stmt(body);
                self.scopes.pop();
                self.loop_depth -= 1;
            }
            StmtKind::For { head, body } => {
                self.scopes.push();
                match head {
                    ForHead::CStyle { init, cond, inc } => {
                        if let Some(init) = init {
                            self.check_stmt(init);
                        }
                        if let Some(cond) = cond {
                            self.check_expr(cond);
                        }
                        if let Some(inc) = inc {
                            self.check_expr(inc);
                        }
                    }
                    ForHead::ForEach { binding, iterable } => {
                        let iter_ty = self.check_expr(iterable);
                        let elem_ty = match iter_ty {
                            Type::Array(e) => *e,
                            Type::Map(k, _) => *k,
                            Type::Error => Type::Error,
                            other => {
                                self.error(
                                    CheckErrorKind::TypeMismatch {
                                        expected: "an iterable (array or map)".into(),
                                        found: self.display(&other),
                                    },
                                    iterable.span(),
                                )
                            }
                        };
                        let name = self.lexeme_symbol(*binding);
                        let tid = self.intern_type(elem_ty);
                        self.scopes.declare(name, VarBinding { ty: tid, is_mut: false });
                    }
                }
                self.loop_depth += 1;
                self.check_stmt(body);
                self.loop_depth -= 1;
                self.scopes.pop();
            }
            StmtKind::Break | StmtKind::Continue => {
                if self.loop_depth == 0 {
                    self.error(
                        CheckErrorKind::Custom("break/continue outside of a loop".into()),
                        stmt.span,
                    );
                }
            }
            StmtKind::Import { .. } | StmtKind::Extern { .. } | StmtKind::MacroDef { .. } => {}
            StmtKind::Export(inner) => self.check_stmt(inner),
            StmtKind::Module { body, .. } => self.check_block(body),
            StmtKind::TypeAlias { .. } => {}
            StmtKind::Try { body, catches, finally } => {
                self.scopes.push();
                self.check_block(body);
                self.scopes.pop();
                for clause in catches {
                    self.scopes.push();
                    let name = self.lexeme_symbol(clause.binding);
                    let tid = self.intern_type(Type::String);
                    self.scopes.declare(name, VarBinding { ty: tid, is_mut: false });
                    self.check_block(&mut clause.body);
                    self.scopes.pop();
                }
                if let Some(f) = finally {
                    self.scopes.push();
                    self.check_block(f);
                    self.scopes.pop();
                }
            }
            StmtKind::Throw(value) => {
                self.check_expr(value);
            }
            StmtKind::Match { scrutinee, cases } => {
                let scrutinee_ty = self.check_expr(scrutinee);
                let mut has_wildcard = false;
                for case in cases {
                    self.scopes.push();
                    self.bind_pattern(&case.pattern, &scrutinee_ty);
                    if matches!(case.pattern, Pattern::Wildcard { .. } | Pattern::Ident { .. }) {
                        has_wildcard = true;
                    }
                    if let Some(guard) = &mut case.guard {
                        self.check_expr(guard);
                    }
                    self.check_stmt(&mut case.body);
                    self.scopes.pop();
                }
                if !has_wildcard {
                    log::debug!(
                        "match on {} has no wildcard/binding arm; exhaustiveness not verified",
                        self.display(&scrutinee_ty)
                    );
                }
            }
            StmtKind::Test { body, .. } => {
                self.scopes.push();
                self.check_block(body);
                self.scopes.pop();
            }
            StmtKind::Spawn(expr) => {
                self.check_expr(expr);
            }
        }
    }

    fn check_block(&mut self, block: &mut Block) {
        self.scopes.push();
        for stmt in block.iter_mut() {
            self.check_stmt(stmt);
        }
        self.scopes.pop();
    }

    fn check_let(
        &mut self,
        pattern: &Pattern,
        is_mut: bool,
        ty: &Option<TypeExpr>,
        init: &mut Option<Expr>,
        span: Span,
    ) {
        if !pattern.is_irrefutable() {
            self.error(
                CheckErrorKind::RefutablePatternInIrrefutablePosition("a let-binding".into()),
                pattern.span(),
            );
        }
        let declared = ty.as_ref().map(|t| self.resolve_type_expr(t, &[]));
        let init_ty = init.as_mut().map(|e| self.check_expr(e));
        let final_ty = match (&declared, &init_ty) {
            (Some(d), Some(i)) => {
                if !i.assignable_to(d) {
                    self.error(
                        CheckErrorKind::TypeMismatch {
                            expected: self.display(d),
                            found: self.display(i),
                        },
                        span,
                    );
                }
                d.clone()
            }
            (Some(d), None) => d.clone(),
            (None, Some(i)) => i.clone(),
            (None, None) => Type::Error,
        };
        self.bind_pattern(pattern, &final_ty);
        let _ = is_mut;
    }

    /// Binds every name a pattern introduces. Struct/tuple/array patterns
    /// recurse structurally; literal/range patterns introduce nothing.
    fn bind_pattern(&mut self, pattern: &Pattern, ty: &Type) {
        match pattern {
            Pattern::Ident { name, .. } => {
                let tid = self.intern_type(ty.clone());
                self.scopes.declare(*name, VarBinding { ty: tid, is_mut: true });
            }
            Pattern::Wildcard { .. } => {}
            Pattern::Struct { fields, .. } => {
                let field_types: HashMap<Symbol, Type> = match ty {
                    Type::Struct { name, .. } => match self.structs.get(name).cloned() {
                        Some(info) => info
                            .fields
                            .iter()
                            .map(|f| {
                                let fname = self.lexeme_symbol(f.name);
                                let fty = self.resolve_type_expr(&f.ty.clone(), &[]);
                                (fname, fty)
                            })
                            .collect(),
                        None => HashMap::new(),
                    },
                    _ => HashMap::new(),
                };
                for (name, sub) in fields {
                    let field_ty = field_types.get(name).cloned().unwrap_or(Type::Error);
                    self.bind_pattern(sub, &field_ty);
                }
            }
            Pattern::Array { elements, rest, .. } => {
                let elem_ty = match ty {
                    Type::Array(e) => (**e).clone(),
                    _ => Type::Error,
                };
                for el in elements {
                    self.bind_pattern(el, &elem_ty);
                }
                if let Some(r) = rest {
                    let tid = self.intern_type(Type::Array(Box::new(elem_ty)));
                    self.scopes.declare(*r, VarBinding { ty: tid, is_mut: true });
                }
            }
            Pattern::Tuple { elements, .. } => {
                let elem_types: Vec<Type> = match ty {
                    Type::Tuple(ts) => ts.clone(),
                    _ => vec![Type::Error; elements.len()],
                };
                for (el, el_ty) in elements.iter().zip(elem_types.into_iter()) {
                    self.bind_pattern(el, &el_ty);
                }
            }
            Pattern::OptionSome { inner, .. } => {
                let inner_ty = match ty {
                    Type::Option(t) => (**t).clone(),
                    _ => Type::Error,
                };
                self.bind_pattern(inner, &inner_ty);
            }
            Pattern::Guarded { inner, .. } => self.bind_pattern(inner, ty),
            Pattern::Literal(_) | Pattern::Range { .. } | Pattern::OptionNone { .. } => {}
        }
    }

    fn check_function_body(
        &mut self,
        name: Symbol,
        params: &mut [Param],
        return_type: &Option<TypeExpr>,
        type_params: &[Symbol],
        body: &mut Block,
        is_async: bool,
        extension_receiver: Option<&wync_lang::Token>,
    ) {
        let ret_ty = match return_type {
            Some(t) => self.resolve_type_expr(t, type_params),
            None => Type::Unit,
        };
        let prev_return = self.current_return_type.replace(ret_ty);
        self.scopes.push();
        if let Some(recv) = extension_receiver {
            let recv_sym = self.lexeme_symbol(*recv);
            let recv_ty = self.resolve_named_type(recv_sym, &[], &[]);
            let tid = self.intern_type(recv_ty);
            self.scopes.declare(recv_sym, VarBinding { ty: tid, is_mut: false });
        }
        for param in params.iter() {
            let pty = self.resolve_type_expr(&param.ty, type_params);
            let tid = self.intern_type(pty);
            let pname = self.lexeme_symbol(param.name);
            self.scopes.declare(pname, VarBinding { ty: tid, is_mut: param.is_mut });
        }
        self.check_block(body);
        self.scopes.pop();
        self.current_return_type = prev_return;
        let _ = (name, is_async);
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn check_expr(&mut self, expr: &mut Expr) -> Type {
        let ty = self.infer_expr(expr);
        let tid = self.intern_type(ty.clone());
        expr.resolved_type = Some(tid);
        ty
    }

    fn infer_expr(&mut self, expr: &mut Expr) -> Type {
        let span = expr.span;
        match &mut expr.kind {
            ExprKind::IntLit(_) => Type::Int,
            ExprKind::FloatLit(_) => Type::Float,
            ExprKind::StrLit(_) => Type::String,
            ExprKind::CharLit(_) => Type::Int,
            ExprKind::BoolLit(_) => Type::Bool,
            ExprKind::Ident(name) => self.lookup_ident(*name, span),
            ExprKind::Assign { name, value } => {
                let target_ty = self.lookup_ident(*name, span);
                let value_ty = self.check_expr(value);
                if !value_ty.assignable_to(&target_ty) {
                    self.error(
                        CheckErrorKind::TypeMismatch {
                            expected: self.display(&target_ty),
                            found: self.display(&value_ty),
                        },
                        span,
                    );
                }
                target_ty
            }
            ExprKind::Unary { op, operand } => self.infer_unary(*op, operand, span),
            ExprKind::Binary { op, left, right } => self.infer_binary(*op, left, right, span),
            ExprKind::Call { callee, args, resolved } => {
                self.infer_call(callee, args, resolved, span)
            }
            ExprKind::MethodCall { receiver, method, args } => {
                self.infer_method_call(receiver, *method, args, span)
            }
            ExprKind::ArrayLit(elems) => self.infer_array_lit(elems),
            ExprKind::Index { container, index } => self.infer_index(container, index, span),
            ExprKind::IndexAssign { container, index, value } => {
                self.infer_index(container, index, span);
                self.check_expr(value)
            }
            ExprKind::Field { object, name } => self.infer_field(object, *name, span),
            ExprKind::FieldAssign { object, name, value } => {
                let field_ty = self.infer_field(object, *name, span);
                let value_ty = self.check_expr(value);
                if !value_ty.assignable_to(&field_ty) {
                    self.error(
                        CheckErrorKind::TypeMismatch {
                            expected: self.display(&field_ty),
                            found: self.display(&value_ty),
                        },
                        span,
                    );
                }
                field_ty
            }
            ExprKind::StructInit { type_name, fields } => {
                self.infer_struct_init(*type_name, fields, span)
            }
            ExprKind::Range { start, end, .. } => {
                self.check_expr(start);
                self.check_expr(end);
                Type::Array(Box::new(Type::Int))
            }
            ExprKind::Tuple(elems) => {
                Type::Tuple(elems.iter_mut().map(|e| self.check_expr(e)).collect())
            }
            ExprKind::TupleIndex { tuple, index } => {
                let tuple_ty = self.check_expr(tuple);
                match tuple_ty {
                    Type::Tuple(elems) => elems.get(*index as usize).cloned().unwrap_or_else(|| {
                        self.error(
                            CheckErrorKind::Custom(format!("tuple has no element {}", index)),
                            span,
                        )
                    }),
                    Type::Error => Type::Error,
                    other => self.error(
                        CheckErrorKind::TypeMismatch {
                            expected: "a tuple".into(),
                            found: self.display(&other),
                        },
                        span,
                    ),
                }
            }
            ExprKind::MapLit { keys, values } => {
                let key_ty = keys.first_mut().map(|k| self.check_expr(k)).unwrap_or(Type::String);
                for k in keys.iter_mut().skip(1) {
                    self.check_expr(k);
                }
                let val_ty =
                    values.first_mut().map(|v| self.check_expr(v)).unwrap_or(Type::Error);
                for v in values.iter_mut().skip(1) {
                    self.check_expr(v);
                }
                Type::Map(Box::new(key_ty), Box::new(val_ty))
            }
            ExprKind::If { cond, then_branch, else_branch } => {
                let cond_ty = self.check_expr(cond);
                if !matches!(cond_ty, Type::Bool | Type::Error) {
                    self.error(
                        CheckErrorKind::TypeMismatch {
                            expected: "bool".into(),
                            found: self.display(&cond_ty),
                        },
                        cond.span(),
                    );
                }
                let then_ty = self.check_expr(then_branch);
                match else_branch {
                    Some(e) => {
                        let else_ty = self.check_expr(e);
                        self.unify_branches(then_ty, else_ty, span)
                    }
                    None => Type::Unit,
                }
            }
            ExprKind::Ternary { cond, then_branch, else_branch } => {
                self.check_expr(cond);
                let then_ty = self.check_expr(then_branch);
                let else_ty = self.check_expr(else_branch);
                self.unify_branches(then_ty, else_ty, span)
            }
            ExprKind::Match { scrutinee, arms } => self.infer_match_expr(scrutinee, arms, span),
            ExprKind::Interpolation(segments) => {
                for seg in segments {
                    if let wync_lang::ast::expr::InterpSegment::Expr(e) = seg {
                        self.check_expr(e);
                    }
                }
                Type::String
            }
            ExprKind::Lambda { params, body, .. } => {
                self.scopes.push();
                let param_types: Vec<Type> = params
                    .iter()
                    .map(|p| {
                        let tid = self.intern_type(Type::GenericParam(*p));
                        self.scopes.declare(*p, VarBinding { ty: tid, is_mut: false });
                        Type::GenericParam(*p)
                    })
                    .collect();
                let ret = self.check_expr(body);
                self.scopes.pop();
                Type::Function { params: param_types, ret: Box::new(ret), effect: Effect::Pure }
            }
            ExprKind::Try(inner) => {
                let inner_ty = self.check_expr(inner);
                match inner_ty {
                    Type::Result(ok, _) => *ok,
                    Type::Option(inner) => *inner,
                    Type::Error => Type::Error,
                    _ => self.error(CheckErrorKind::InvalidTryTarget, span),
                }
            }
            ExprKind::Some(inner) => Type::Option(Box::new(self.check_expr(inner))),
            ExprKind::None => Type::Option(Box::new(Type::GenericParam(Symbol::default()))),
            ExprKind::Ok(inner) => {
                Type::Result(Box::new(self.check_expr(inner)), Box::new(Type::Error))
            }
            ExprKind::Err(inner) => {
                Type::Result(Box::new(Type::Error), Box::new(self.check_expr(inner)))
            }
            ExprKind::Pipeline(stages) => {
                let mut last = Type::Error;
                for stage in stages {
                    last = self.check_expr(stage);
                }
                last
            }
            ExprKind::Await(inner) => {
                let inner_ty = self.check_expr(inner);
                match inner_ty {
                    Type::Future(payload) => *payload,
                    Type::Error => Type::Error,
                    other => self.error(
                        CheckErrorKind::TypeMismatch {
                            expected: "a Future".into(),
                            found: self.display(&other),
                        },
                        span,
                    ),
                }
            }
            ExprKind::OptionalTypeMarker(_) | ExprKind::UnionTypeMarker(_) => Type::Error,
            ExprKind::PatternExpr(_) => Type::Error,
        }
    }

    fn unify_branches(&mut self, a: Type, b: Type, span: Span) -> Type {
        if a == b {
            return a;
        }
        if matches!(a, Type::Error) {
            return b;
        }
        if matches!(b, Type::Error) {
            return a;
        }
        self.error(
            CheckErrorKind::TypeMismatch { expected: self.display(&a), found: self.display(&b) },
            span,
        )
    }

    fn lookup_ident(&mut self, name: Symbol, span: Span) -> Type {
        if let Some(binding) = self.scopes.lookup(name) {
            return self.types.get(binding.ty).clone();
        }
        if let Some(set) = self.functions.get(&name) {
            if let Some(sig) = set.overloads.first() {
                let params = sig.params.iter().map(|t| self.types.get(*t).clone()).collect();
                let ret = self.types.get(sig.return_type).clone();
                let effect = if sig.is_async { Effect::Async } else { Effect::Pure };
                return Type::Function { params, ret: Box::new(ret), effect };
            }
        }
        self.error(CheckErrorKind::UndefinedIdentifier(self.name_of(name)), span)
    }

    fn infer_unary(&mut self, op: wync_lang::Token, operand: &mut Expr, span: Span) -> Type {
        let ty = self.check_expr(operand);
        use wync_lang::TokenKind::*;
        match op.kind {
            Minus => {
                if ty.is_numeric() || matches!(ty, Type::Error) {
                    ty
                } else {
                    self.error(
                        CheckErrorKind::TypeMismatch {
                            expected: "a numeric type".into(),
                            found: self.display(&ty),
                        },
                        span,
                    )
                }
            }
            Not => {
                if matches!(ty, Type::Bool | Type::Error) {
                    Type::Bool
                } else {
                    self.error(
                        CheckErrorKind::TypeMismatch { expected: "bool".into(), found: self.display(&ty) },
                        span,
                    )
                }
            }
            _ => ty,
        }
    }

    fn infer_binary(
        &mut self,
        op: wync_lang::Token,
        left: &mut Expr,
        right: &mut Expr,
        span: Span,
    ) -> Type {
        let left_ty = self.check_expr(left);
        let right_ty = self.check_expr(right);
        use wync_lang::TokenKind::*;
        match op.kind {
            Plus => {
                if left_ty.is_string_like() || right_ty.is_string_like() {
                    return Type::String;
                }
                self.arith_result(left_ty, right_ty, span)
            }
            Minus | Star | Slash | Percent => self.arith_result(left_ty, right_ty, span),
            EqEq | NotEq => Type::Bool,
            Lt | Gt | LtEq | GtEq => {
                if !(left_ty.is_numeric() || left_ty.is_string_like() || matches!(left_ty, Type::Error))
                {
                    self.error(
                        CheckErrorKind::TypeMismatch {
                            expected: "a comparable type".into(),
                            found: self.display(&left_ty),
                        },
                        span,
                    );
                }
                Type::Bool
            }
            And | AmpAmp | Or | PipePipe => {
                if !matches!(left_ty, Type::Bool | Type::Error)
                    || !matches!(right_ty, Type::Bool | Type::Error)
                {
                    self.error(
                        CheckErrorKind::TypeMismatch { expected: "bool".into(), found: self.display(&left_ty) },
                        span,
                    );
                }
                Type::Bool
            }
            Amp | Pipe | Caret | Shl | Shr => self.arith_result(left_ty, right_ty, span),
            Eq | PlusEq | MinusEq | StarEq | SlashEq | PercentEq => {
                if !right_ty.assignable_to(&left_ty) {
                    self.error(
                        CheckErrorKind::TypeMismatch {
                            expected: self.display(&left_ty),
                            found: self.display(&right_ty),
                        },
                        span,
                    );
                }
                left_ty
            }
            _ => Type::Error,
        }
    }

    fn arith_result(&mut self, left: Type, right: Type, span: Span) -> Type {
        match (&left, &right) {
            (Type::Error, other) | (other, Type::Error) => other.clone(),
            (Type::Float, t) | (t, Type::Float) if t.is_numeric() => Type::Float,
            (Type::Int, Type::Int) => Type::Int,
            _ => self.error(
                CheckErrorKind::TypeMismatch {
                    expected: "matching numeric operands".into(),
                    found: format!("{} and {}", self.display(&left), self.display(&right)),
                },
                span,
            ),
        }
    }

    fn infer_array_lit(&mut self, elems: &mut [Expr]) -> Type {
        if elems.is_empty() {
            return Type::Array(Box::new(Type::Error));
        }
        let first = self.check_expr(&mut elems[0]);
        let mut uniform = true;
        for e in elems.iter_mut().skip(1) {
            let ty = self.check_expr(e);
            if ty != first && !matches!(ty, Type::Error) {
                uniform = false;
            }
        }
        // Mixed-type array literals degrade to an erased element type
        // rather than a hard error (spec.md design notes, heterogeneous
        // arrays).
        if uniform {
            Type::Array(Box::new(first))
        } else {
            Type::Array(Box::new(Type::Error))
        }
    }

    fn infer_index(&mut self, container: &mut Expr, index: &mut Expr, span: Span) -> Type {
        let container_ty = self.check_expr(container);
        let index_ty = self.check_expr(index);
        match container_ty {
            Type::Array(elem) => {
                if !index_ty.is_numeric() && !matches!(index_ty, Type::Error) {
                    self.error(
                        CheckErrorKind::TypeMismatch {
                            expected: "int".into(),
                            found: self.display(&index_ty),
                        },
                        span,
                    );
                }
                *elem
            }
            Type::Map(_, val) => *val,
            Type::Error => Type::Error,
            other => self.error(
                CheckErrorKind::TypeMismatch {
                    expected: "an array or map".into(),
                    found: self.display(&other),
                },
                span,
            ),
        }
    }

    fn infer_field(&mut self, object: &mut Expr, name: Symbol, span: Span) -> Type {
        // `EnumName.Variant`: the object names a type, not a variable, so it
        // never goes through ordinary identifier lookup (spec.md §4.2, Enum
        // definition / variant access).
        if let ExprKind::Ident(type_name) = &object.kind {
            if let Some(info) = self.enums.get(type_name).cloned() {
                let type_name = *type_name;
                if info.variants.contains(&name) {
                    let ty = Type::Enum { name: type_name, variants: info.variants };
                    let tid = self.intern_type(ty.clone());
                    object.resolved_type = Some(tid);
                    return ty;
                }
                return self.error(
                    CheckErrorKind::UnknownField {
                        type_name: self.name_of(type_name),
                        field: self.name_of(name),
                    },
                    span,
                );
            }
        }
        let object_ty = self.check_expr(object);
        match object_ty {
            Type::Struct { name: type_name, .. } => {
                if let Some(info) = self.structs.get(&type_name).cloned() {
                    for f in &info.fields {
                        let fname = self.lexeme_symbol(f.name);
                        if fname == name {
                            return self.resolve_type_expr(&f.ty.clone(), &info.type_params);
                        }
                    }
                }
                self.error(
                    CheckErrorKind::UnknownField {
                        type_name: self.name_of(type_name),
                        field: self.name_of(name),
                    },
                    span,
                )
            }
            Type::Error => Type::Error,
            other => self.error(
                CheckErrorKind::TypeMismatch { expected: "a struct".into(), found: self.display(&other) },
                span,
            ),
        }
    }

    fn infer_struct_init(
        &mut self,
        type_name: Symbol,
        fields: &mut [(Symbol, Expr)],
        span: Span,
    ) -> Type {
        let Some(info) = self.structs.get(&type_name).cloned() else {
            return self.error(CheckErrorKind::UndefinedIdentifier(self.name_of(type_name)), span);
        };
        let declared_names: Vec<Symbol> = info
            .fields
            .iter()
            .map(|f| self.lexeme_symbol(f.name))
            .collect();
        let mut seen = Vec::new();
        for (fname, fexpr) in fields.iter_mut() {
            let fty = self.check_expr(fexpr);
            seen.push(*fname);
            if let Some(idx) = declared_names.iter().position(|d| d == fname) {
                let expected = self.resolve_type_expr(&info.fields[idx].ty.clone(), &info.type_params);
                if !fty.assignable_to(&expected) {
                    self.error(
                        CheckErrorKind::TypeMismatch {
                            expected: self.display(&expected),
                            found: self.display(&fty),
                        },
                        span,
                    );
                }
            } else {
                self.error(
                    CheckErrorKind::UnknownField {
                        type_name: self.name_of(type_name),
                        field: self.name_of(*fname),
                    },
                    span,
                );
            }
        }
        for declared in &declared_names {
            if !seen.contains(declared) {
                self.error(
                    CheckErrorKind::MissingField {
                        type_name: self.name_of(type_name),
                        field: self.name_of(*declared),
                    },
                    span,
                );
            }
        }
        let type_args = info.type_params.iter().map(|p| Type::GenericParam(*p)).collect();
        Type::Struct { name: type_name, fields: vec![], type_args }
    }

    fn infer_match_expr(&mut self, scrutinee: &mut Expr, arms: &mut [MatchArm], span: Span) -> Type {
        let scrutinee_ty = self.check_expr(scrutinee);
        let mut result: Option<Type> = None;
        for arm in arms {
            self.scopes.push();
            self.bind_pattern(&arm.pattern, &scrutinee_ty);
            let body_ty = self.check_expr(&mut arm.body);
            self.scopes.pop();
            result = Some(match result {
                Some(prev) => self.unify_branches(prev, body_ty, span),
                None => body_ty,
            });
        }
        result.unwrap_or(Type::Unit)
    }

    fn infer_call(
        &mut self,
        callee: &mut Expr,
        args: &mut Vec<Expr>,
        resolved: &mut Option<wync_lang::ast::ResolvedCall>,
        span: Span,
    ) -> Type {
        let mut arg_types: Vec<Type> = args.iter_mut().map(|a| self.check_expr(a)).collect();

        let ExprKind::Ident(name) = &callee.kind else {
            // A computed callee (e.g. a lambda stored in a variable) — just
            // check it and return its function return type if known.
            let callee_ty = self.check_expr(callee);
            return match callee_ty {
                Type::Function { ret, .. } => *ret,
                Type::Error => Type::Error,
                other => self.error(
                    CheckErrorKind::NotCallable(self.display(&other)),
                    span,
                ),
            };
        };
        let name = *name;

        let Some(set) = self.functions.get(&name).cloned() else {
            return self.error(CheckErrorKind::UndefinedIdentifier(self.name_of(name)), span);
        };

        // A call may omit any suffix of parameters that declare a default
        // (spec.md §4.2, "Function parameters permit a default expression
        // after `=`"), so arity matches any count between the signature's
        // minimum and its full parameter list.
        let candidates: Vec<usize> = set
            .overloads
            .iter()
            .enumerate()
            .filter(|(_, sig)| {
                arg_types.len() <= sig.params.len() && arg_types.len() >= sig.min_arity()
            })
            .map(|(i, _)| i)
            .collect();

        if candidates.is_empty() {
            return self.error(CheckErrorKind::NoMatchingOverload(self.name_of(name)), span);
        }

        let mut matches: Vec<usize> = Vec::new();
        for &idx in &candidates {
            let sig = &set.overloads[idx];
            let params: Vec<Type> = sig.params.iter().map(|t| self.types.get(*t).clone()).collect();
            let all_ok = params
                .iter()
                .zip(arg_types.iter())
                .all(|(p, a)| a.assignable_to(p) || p.contains_generic_param());
            if all_ok {
                matches.push(idx);
            }
        }

        let chosen = if matches.len() == 1 {
            matches[0]
        } else if matches.is_empty() && candidates.len() == 1 {
            candidates[0]
        } else if matches.len() > 1 {
            return self.error(CheckErrorKind::AmbiguousOverload(self.name_of(name)), span);
        } else {
            return self.error(CheckErrorKind::NoMatchingOverload(self.name_of(name)), span);
        };

        let sig = set.overloads[chosen].clone();

        // Splice in default-value expressions for every parameter the call
        // site left unsupplied, so lowering always sees a fully-populated
        // argument list.
        for i in args.len()..sig.params.len() {
            let mut default_expr = sig.defaults[i]
                .clone()
                .expect("candidate filtering guarantees a default for every omitted parameter");
            let default_ty = self.check_expr(&mut default_expr);
            arg_types.push(default_ty);
            args.push(default_expr);
        }

        let ret_ty = self.types.get(sig.return_type).clone();

        if sig.type_params.is_empty() {
            *resolved = Some(wync_lang::ast::ResolvedCall {
                target: sig.mangled_name,
                generic_instantiation: None,
            });
            return ret_ty;
        }

        // Generic call: infer each type parameter positionally from the
        // concrete argument types, then check trait bounds before
        // registering a monomorphized instantiation (spec.md §4.3,
        // "Generic instantiation").
        let mut bindings: HashMap<Symbol, Type> = HashMap::new();
        for (param_tid, arg_ty) in sig.params.iter().zip(arg_types.iter()) {
            let param_ty = self.types.get(*param_tid).clone();
            self.unify_generic(&param_ty, arg_ty, &mut bindings);
        }
        let type_args: Vec<Type> = sig
            .type_params
            .iter()
            .map(|p| bindings.get(p).cloned().unwrap_or(Type::Error))
            .collect();

        for (idx, param) in sig.type_params.iter().enumerate() {
            for bound in &sig.bounds[idx] {
                if let Some(concrete) = bindings.get(param) {
                    if !self.satisfies_bound(concrete, *bound) {
                        self.error(
                            CheckErrorKind::UnsatisfiedTraitBound {
                                type_name: self.display(concrete),
                                trait_name: self.name_of(*bound),
                            },
                            span,
                        );
                    }
                }
            }
        }

        let mangled = self.generics.instantiate(self.interner, name, type_args.clone());
        *resolved = Some(wync_lang::ast::ResolvedCall {
            target: mangled,
            generic_instantiation: Some(wync_lang::ast::GenericInstantiation {
                mangled_name: mangled,
                type_args: type_args.into_iter().map(|t| self.intern_type(t)).collect(),
            }),
        });
        self.substitute_generic(&ret_ty, &bindings)
    }

    fn unify_generic(&self, param: &Type, arg: &Type, bindings: &mut HashMap<Symbol, Type>) {
        match (param, arg) {
            (Type::GenericParam(p), _) => {
                bindings.entry(*p).or_insert_with(|| arg.clone());
            }
            (Type::Array(p), Type::Array(a)) => self.unify_generic(p, a, bindings),
            (Type::Option(p), Type::Option(a)) => self.unify_generic(p, a, bindings),
            (Type::Map(pk, pv), Type::Map(ak, av)) => {
                self.unify_generic(pk, ak, bindings);
                self.unify_generic(pv, av, bindings);
            }
            (Type::Tuple(ps), Type::Tuple(as_)) => {
                for (p, a) in ps.iter().zip(as_.iter()) {
                    self.unify_generic(p, a, bindings);
                }
            }
            _ => {}
        }
    }

    fn substitute_generic(&self, ty: &Type, bindings: &HashMap<Symbol, Type>) -> Type {
        match ty {
            Type::GenericParam(p) => bindings.get(p).cloned().unwrap_or_else(|| ty.clone()),
            Type::Array(e) => Type::Array(Box::new(self.substitute_generic(e, bindings))),
            Type::Option(e) => Type::Option(Box::new(self.substitute_generic(e, bindings))),
            Type::Future(e) => Type::Future(Box::new(self.substitute_generic(e, bindings))),
            Type::Map(k, v) => Type::Map(
                Box::new(self.substitute_generic(k, bindings)),
                Box::new(self.substitute_generic(v, bindings)),
            ),
            Type::Result(o, e) => Type::Result(
                Box::new(self.substitute_generic(o, bindings)),
                Box::new(self.substitute_generic(e, bindings)),
            ),
            Type::Tuple(elems) => {
                Type::Tuple(elems.iter().map(|e| self.substitute_generic(e, bindings)).collect())
            }
            other => other.clone(),
        }
    }

    /// Structural bound satisfaction: `concrete` satisfies `trait_name` if
    /// every method the trait requires has a same-named method registered
    /// for `concrete` via an `impl` block.
    fn satisfies_bound(&self, concrete: &Type, trait_name: Symbol) -> bool {
        let Type::Struct { name, .. } = concrete else {
            return false;
        };
        let Some(trait_info) = self.traits.get(&trait_name) else {
            return true;
        };
        let Some(impls) = self.methods.get(name) else {
            return trait_info.methods.is_empty();
        };
        trait_info.methods.iter().all(|m| impls.contains_key(&m.name))
    }

    fn infer_method_call(
        &mut self,
        receiver: &mut Expr,
        method: Symbol,
        args: &mut [Expr],
        span: Span,
    ) -> Type {
        let receiver_ty = self.check_expr(receiver);
        let arg_types: Vec<Type> = args.iter_mut().map(|a| self.check_expr(a)).collect();

        if let Type::Struct { name, .. } = &receiver_ty {
            if let Some(sig) = self.methods.get(name).and_then(|m| m.get(&method)).cloned() {
                return self.types.get(sig.return_type).clone();
            }
        }

        builtin_method_return_type(&receiver_ty, &self.name_of(method), &arg_types)
            .unwrap_or(Type::Error)
    }
}

/// Return types for the small set of runtime-ABI methods the checker needs
/// to know about to keep inferring downstream (spec.md §6, runtime ABI
/// table). Anything not covered here degrades to `Type::Error`, which is
/// permissive rather than a hard failure — the emitter owns the full
/// built-in dispatch table.
fn builtin_method_return_type(receiver: &Type, method: &str, args: &[Type]) -> Option<Type> {
    match (receiver, method) {
        (Type::Array(elem), "push") => {
            let _ = elem;
            Some(Type::Unit)
        }
        (Type::Array(elem), "pop") => Some(Type::Option(elem.clone())),
        (Type::Array(elem), "get") => Some(Type::Option(elem.clone())),
        (Type::Array(_), "len") => Some(Type::Int),
        (Type::Array(elem), "map") => {
            if let Some(Type::Function { ret, .. }) = args.first() {
                Some(Type::Array(ret.clone()))
            } else {
                Some(Type::Array(elem.clone()))
            }
        }
        (Type::Array(elem), "filter") => Some(Type::Array(elem.clone())),
        (Type::String, "len") => Some(Type::Int),
        (Type::String, "to_upper" | "to_lower" | "trim") => Some(Type::String),
        (Type::String, "split") => Some(Type::Array(Box::new(Type::String))),
        (Type::String, "contains" | "starts_with" | "ends_with") => Some(Type::Bool),
        (Type::Map(_, v), "get") => Some(Type::Option(v.clone())),
        (Type::Map(_, _), "len") => Some(Type::Int),
        (Type::Map(k, v), "set") => {
            let _ = (k, v);
            Some(Type::Unit)
        }
        (Type::Option(inner), "unwrap" | "unwrap_or") => Some((**inner).clone()),
        (Type::Option(_), "is_some" | "is_none") => Some(Type::Bool),
        (Type::Result(ok, _), "unwrap" | "unwrap_or") => Some((**ok).clone()),
        (Type::Result(_, _), "is_ok" | "is_err") => Some(Type::Bool),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wync_lang::parse;

    fn check(src: &str) -> Vec<CheckError> {
        let (mut program, mut interner, parse_errors, had_error) = parse(src);
        assert!(!had_error, "parse errors: {:?}", parse_errors);
        check_program(&mut program, &mut interner, src).errors
    }

    #[test]
    fn undefined_identifier_is_reported() {
        let errors = check("let x = y;");
        assert!(!errors.is_empty());
    }

    #[test]
    fn simple_let_binding_type_checks() {
        let errors = check("let x: int = 5;");
        assert!(errors.is_empty(), "{:?}", errors);
    }

    #[test]
    fn mismatched_let_binding_is_reported() {
        let errors = check("let x: int = \"hi\";");
        assert!(!errors.is_empty());
    }

    #[test]
    fn unsatisfied_trait_bound_is_reported() {
        let errors = check(
            r#"
            trait Show {
                fn show(self) -> string;
            }
            struct Foo { x: int }
            fn show_it<T: Show>(x: T) -> unit { }
            fn main() -> int {
                let f = Foo { x: 1 };
                show_it(f);
                return 0
            }
            "#,
        );
        assert!(
            errors.iter().any(|e| matches!(e.kind, CheckErrorKind::UnsatisfiedTraitBound { .. })),
            "{:?}",
            errors
        );
    }

    #[test]
    fn satisfied_trait_bound_is_not_reported() {
        let errors = check(
            r#"
            trait Show {
                fn show(self) -> string;
            }
            struct Foo { x: int }
            impl Foo {
                fn show(self) -> string { return "foo" }
            }
            fn show_it<T: Show>(x: T) -> unit { }
            fn main() -> int {
                let f = Foo { x: 1 };
                show_it(f);
                return 0
            }
            "#,
        );
        assert!(
            !errors.iter().any(|e| matches!(e.kind, CheckErrorKind::UnsatisfiedTraitBound { .. })),
            "{:?}",
            errors
        );
    }
}
