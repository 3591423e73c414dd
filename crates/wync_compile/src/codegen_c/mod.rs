//! Top-level C emission (spec.md §4.4): the runtime prelude, type
//! declarations, every flavor of function body, and the program's entry
//! point, composed from the statement/expression lowering in [`emit`].
//!
//! `wync_lang`'s checker resolves every `Call` to a concrete C name
//! ([`wync_lang::ast::ResolvedCall::target`]) but [`crate::analysis::CheckOutput`]
//! doesn't expose the overload table that produced it. Overloaded
//! top-level functions are re-mangled here with the same
//! `__ovl_<name>_<index>` scheme the checker uses (spec.md §4.3), walking
//! the program in the same preregistration order so the two stay in sync
//! without threading the checker's private tables through.

mod emit;
mod runtime;
mod types;

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

use wync_base::{Interner, Span, Symbol};
use wync_lang::ast::{Param, Program, Stmt, StmtKind, TypeExpr};

use crate::analysis::{Type, TypeTable};
use crate::closures::ClosureRegistry;
use crate::generics::GenericsRegistry;
use crate::optimize::OptimizeOutput;
use crate::spawn::SpawnRegistry;

use emit::{codegen_stmt, wrap_as_value};
use types::{c_type_str, ctype_of, ctype_of_typeid, escape_c_ident, resolve_type_expr, CContext, CType, TypeEnv};

/// Whether the emitted `main` runs the program's `main` function or every
/// top-level `test` block (`wyn test`, SPEC_FULL §F).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryMode {
    Program,
    Tests,
}

/// Everything the rest of the pipeline has already computed, ready to hand
/// to the emitter.
pub struct CodegenInput<'a> {
    pub program: &'a Program,
    pub interner: &'a Interner,
    pub source: &'a str,
    pub types: &'a TypeTable,
    pub generics: &'a GenericsRegistry,
    pub closures: &'a ClosureRegistry,
    pub spawns: &'a SpawnRegistry,
    pub optimize: &'a OptimizeOutput,
    pub entry: EntryMode,
}

pub fn codegen_program(input: CodegenInput) -> String {
    let env = collect_type_env(input.program);
    let naming = OverloadNaming::build(input.program, input.interner);
    let mut ctx = CContext::new(input.interner, &env, &input.optimize.inline_hints, input.source, input.spawns);

    let mut out = String::new();
    out.push_str(runtime::C_RUNTIME);
    out.push('\n');

    emit_type_decls(input.program, &mut ctx, &mut out);
    emit_prototypes(input.program, &ctx, &naming, &mut out);
    emit_lifted_lambdas(input.closures, &mut ctx, input.types, &mut out);
    emit_impl_and_extension_methods(input.program, &mut ctx, input.closures, input.types, &mut out);
    emit_generic_instantiations(input.program, input.generics, &mut ctx, input.closures, input.types, &mut out);
    emit_spawn_wrappers(input.spawns, &ctx, input.types, &mut out);
    emit_top_level_functions(input.program, &mut ctx, input.closures, input.types, &naming, &mut out);
    if input.entry == EntryMode::Tests {
        emit_test_bodies(input.program, &mut ctx, input.closures, input.types, &mut out);
    }
    emit_entry_point(input.program, &ctx, &naming, input.entry, &mut out);

    out
}

// ===================================================================
// Struct/enum name collection
// ===================================================================

fn collect_type_env(program: &Program) -> TypeEnv {
    let mut env = TypeEnv::default();
    walk_type_decls(program, &mut env);
    env
}

fn walk_type_decls(block: &[Stmt], env: &mut TypeEnv) {
    for stmt in block {
        match &stmt.kind {
            StmtKind::StructDef { name, .. } => {
                env.structs.insert(*name);
            }
            StmtKind::EnumDef { name, .. } => {
                env.enums.insert(*name);
            }
            StmtKind::Module { body, .. } => walk_type_decls(body, env),
            StmtKind::Export(inner) => walk_type_decls(std::slice::from_ref(inner.as_ref()), env),
            _ => {}
        }
    }
}

// ===================================================================
// Overload-mangling re-derivation (spec.md §4.3)
// ===================================================================

/// Maps each plain (non-generic, non-method) top-level function's own span
/// to the C name its definition must use, mirroring
/// `analysis::check::Checker::register_signature`: a name mangles to
/// `__ovl_<name>_<index>` only once more than one overload of it exists,
/// and the index is assigned in declaration order.
struct OverloadNaming {
    by_span: HashMap<Span, String>,
}

impl OverloadNaming {
    fn build(program: &Program, interner: &Interner) -> Self {
        let mut counts: HashMap<Symbol, usize> = HashMap::new();
        count_overloadable(program, &mut counts);
        let mut seen: HashMap<Symbol, usize> = HashMap::new();
        let mut by_span = HashMap::new();
        assign_overloadable(program, &counts, &mut seen, interner, &mut by_span);
        OverloadNaming { by_span }
    }

    /// `None` means "use the plain escaped name" (no mangling needed).
    fn name_for(&self, span: Span) -> Option<&str> {
        self.by_span.get(&span).map(|s| s.as_str())
    }
}

fn count_overloadable(block: &[Stmt], counts: &mut HashMap<Symbol, usize>) {
    for stmt in block {
        match &stmt.kind {
            StmtKind::FunctionDef { name, extension_receiver: None, type_params, .. }
                if type_params.is_empty() =>
            {
                *counts.entry(*name).or_insert(0) += 1;
            }
            StmtKind::Extern { name, .. } => {
                *counts.entry(*name).or_insert(0) += 1;
            }
            StmtKind::Module { body, .. } => count_overloadable(body, counts),
            StmtKind::Export(inner) => count_overloadable(std::slice::from_ref(inner.as_ref()), counts),
            _ => {}
        }
    }
}

fn assign_overloadable(
    block: &[Stmt],
    counts: &HashMap<Symbol, usize>,
    seen: &mut HashMap<Symbol, usize>,
    interner: &Interner,
    by_span: &mut HashMap<Span, String>,
) {
    for stmt in block {
        match &stmt.kind {
            StmtKind::FunctionDef { name, extension_receiver: None, type_params, .. }
                if type_params.is_empty() =>
            {
                assign_one(*name, stmt.span, counts, seen, interner, by_span);
            }
            StmtKind::Extern { name, .. } => {
                assign_one(*name, stmt.span, counts, seen, interner, by_span);
            }
            StmtKind::Module { body, .. } => assign_overloadable(body, counts, seen, interner, by_span),
            StmtKind::Export(inner) => {
                assign_overloadable(std::slice::from_ref(inner.as_ref()), counts, seen, interner, by_span)
            }
            _ => {}
        }
    }
}

fn assign_one(
    name: Symbol,
    span: Span,
    counts: &HashMap<Symbol, usize>,
    seen: &mut HashMap<Symbol, usize>,
    interner: &Interner,
    by_span: &mut HashMap<Span, String>,
) {
    let total = counts.get(&name).copied().unwrap_or(1);
    if total > 1 {
        let idx = seen.entry(name).or_insert(0);
        let base = interner.resolve(name);
        by_span.insert(span, format!("__ovl_{}_{}", base, idx));
        *idx += 1;
    }
}

/// The C name a plain top-level function/extern definition should use:
/// the re-derived overload name if it needed mangling, else the ordinary
/// escaped identifier (which already turns a lone `main` into `wynu_main`,
/// since `main` is in `types::C_RESERVED`).
fn plain_function_name(name: Symbol, span: Span, ctx: &CContext, naming: &OverloadNaming) -> String {
    match naming.name_for(span) {
        Some(mangled) => mangled.to_string(),
        None => ctx.resolve(name),
    }
}

// ===================================================================
// Struct / enum typedefs
// ===================================================================

fn emit_type_decls(program: &Program, ctx: &mut CContext, out: &mut String) {
    walk_type_decl_stmts(program, ctx, out);
}

fn walk_type_decl_stmts(block: &[Stmt], ctx: &mut CContext, out: &mut String) {
    for stmt in block {
        match &stmt.kind {
            StmtKind::StructDef { name, fields, .. } => emit_struct_decl(*name, fields, ctx, out),
            StmtKind::EnumDef { name, variants } => emit_enum_decl(*name, variants, ctx, out),
            StmtKind::Module { body, .. } => walk_type_decl_stmts(body, ctx, out),
            StmtKind::Export(inner) => walk_type_decl_stmts(std::slice::from_ref(inner.as_ref()), ctx, out),
            _ => {}
        }
    }
}

fn emit_struct_decl(
    name: Symbol,
    fields: &[wync_lang::ast::StructField],
    ctx: &mut CContext,
    out: &mut String,
) {
    let c_name = ctx.resolve(name);
    writeln!(out, "typedef struct {} {{", c_name).unwrap();
    for f in fields {
        let cty = resolve_type_expr(&f.ty, ctx.env, ctx.interner);
        writeln!(out, "    {} {};", c_type_str(cty, ctx.interner), ctx.token_ident(f.name)).unwrap();
    }
    writeln!(out, "}} {};\n", c_name).unwrap();
}

fn emit_enum_decl(name: Symbol, variants: &[wync_lang::Token], ctx: &mut CContext, out: &mut String) {
    let c_name = ctx.resolve(name);
    writeln!(out, "typedef enum {{").unwrap();
    for v in variants {
        writeln!(out, "    {}_{},", c_name, ctx.token_ident(*v)).unwrap();
    }
    writeln!(out, "}} {}Tag;\n", c_name).unwrap();
    writeln!(out, "typedef struct {{ {}Tag tag; }} {};\n", c_name, c_name).unwrap();

    writeln!(out, "static char *{}_to_string({} v) {{", c_name, c_name).unwrap();
    writeln!(out, "    switch (v.tag) {{").unwrap();
    for v in variants {
        let vname = ctx.token_ident(*v);
        writeln!(out, "        case {}_{}: return \"{}\";", c_name, vname, vname).unwrap();
    }
    writeln!(out, "        default: return \"\";").unwrap();
    writeln!(out, "    }}").unwrap();
    writeln!(out, "}}\n").unwrap();
}

// ===================================================================
// Forward declarations
// ===================================================================

/// Prototypes for every plain top-level function, so spawn wrappers and
/// mutually-recursive calls don't care about declaration order.
fn emit_prototypes(program: &Program, ctx: &CContext, naming: &OverloadNaming, out: &mut String) {
    walk_prototypes(program, ctx, naming, out);
}

fn walk_prototypes(block: &[Stmt], ctx: &CContext, naming: &OverloadNaming, out: &mut String) {
    for stmt in block {
        match &stmt.kind {
            StmtKind::FunctionDef { name, params, return_type, type_params, extension_receiver: None, is_async, .. }
                if type_params.is_empty() =>
            {
                let c_name = plain_function_name(*name, stmt.span, ctx, naming);
                emit_prototype_line(&c_name, params, return_type, *is_async, ctx, out);
            }
            StmtKind::Extern { name, params, return_type, is_variadic } => {
                let c_name = plain_function_name(*name, stmt.span, ctx, naming);
                let ret_cty = return_ctype(return_type, ctx);
                let mut decls: Vec<String> = params
                    .iter()
                    .map(|p| format!("{} {}", c_type_str(resolve_type_expr(&p.ty, ctx.env, ctx.interner), ctx.interner), ctx.token_ident(p.name)))
                    .collect();
                if *is_variadic {
                    decls.push("...".to_string());
                }
                writeln!(out, "extern {} {}({});", c_type_str(ret_cty, ctx.interner), c_name, decls.join(", ")).unwrap();
            }
            StmtKind::Module { body, .. } => walk_prototypes(body, ctx, naming, out),
            StmtKind::Export(inner) => walk_prototypes(std::slice::from_ref(inner.as_ref()), ctx, naming, out),
            _ => {}
        }
    }
}

fn emit_prototype_line(
    c_name: &str,
    params: &[Param],
    return_type: &Option<TypeExpr>,
    is_async: bool,
    ctx: &CContext,
    out: &mut String,
) {
    let decls: Vec<String> = params
        .iter()
        .map(|p| format!("{} {}", c_type_str(resolve_type_expr(&p.ty, ctx.env, ctx.interner), ctx.interner), ctx.token_ident(p.name)))
        .collect();
    if is_async {
        writeln!(out, "static WynFuture *{}({});", c_name, decls.join(", ")).unwrap();
    } else {
        let ret_cty = return_ctype(return_type, ctx);
        writeln!(out, "static {} {}({});", c_type_str(ret_cty, ctx.interner), c_name, decls.join(", ")).unwrap();
    }
}

fn return_ctype(return_type: &Option<TypeExpr>, ctx: &CContext) -> CType {
    match return_type {
        Some(te) => resolve_type_expr(te, ctx.env, ctx.interner),
        None => CType::Unit,
    }
}

// ===================================================================
// Lifted lambdas
// ===================================================================

fn emit_lifted_lambdas(closures: &ClosureRegistry, ctx: &mut CContext, types: &TypeTable, out: &mut String) {
    for lambda in closures.entries() {
        let fn_name = ctx.resolve(lambda.name);
        writeln!(
            out,
            "static WynValue {}(WynClosure *self, WynValue *args, int argc) {{",
            fn_name
        )
        .unwrap();
        writeln!(out, "    (void)argc;").unwrap();
        ctx.vars.clear();
        for (i, cap) in lambda.captures.iter().enumerate() {
            ctx.vars.insert(*cap, CType::Value);
            writeln!(out, "    WynValue {} = self->env[{}];", ctx.resolve(*cap), i).unwrap();
        }
        for (i, param) in lambda.params.iter().enumerate() {
            ctx.vars.insert(*param, CType::Value);
            writeln!(out, "    WynValue {} = args[{}];", ctx.resolve(*param), i).unwrap();
        }
        let body_text = emit::codegen_expr(&lambda.body, ctx, closures, types);
        let body_cty = ctype_of_typeid(lambda.body.resolved_type, types);
        writeln!(out, "    return {};", wrap_as_value(&body_text, body_cty)).unwrap();
        writeln!(out, "}}\n").unwrap();
    }
}

// ===================================================================
// Impl blocks / extension methods
// ===================================================================

fn emit_impl_and_extension_methods(
    program: &Program,
    ctx: &mut CContext,
    closures: &ClosureRegistry,
    types: &TypeTable,
    out: &mut String,
) {
    walk_impls(program, ctx, closures, types, out);
}

fn walk_impls(block: &[Stmt], ctx: &mut CContext, closures: &ClosureRegistry, types: &TypeTable, out: &mut String) {
    for stmt in block {
        match &stmt.kind {
            StmtKind::ImplBlock { type_name, methods } => {
                let receiver = ctx.interner.lookup(ctx.token_ident_raw(*type_name)).unwrap_or(Symbol::EMPTY);
                for m in methods {
                    if let StmtKind::FunctionDef { name, params, return_type, body, is_async, .. } = &m.kind {
                        emit_method(*type_name, *name, params, return_type, body, *is_async, Some(receiver), ctx, closures, types, out);
                    }
                }
            }
            StmtKind::FunctionDef { name, params, return_type, body, is_async, extension_receiver: Some(recv), .. } => {
                let receiver = ctx.interner.lookup(ctx.token_ident_raw(*recv)).unwrap_or(Symbol::EMPTY);
                emit_method(*recv, *name, params, return_type, body, *is_async, Some(receiver), ctx, closures, types, out);
            }
            StmtKind::Module { body, .. } => walk_impls(body, ctx, closures, types, out),
            StmtKind::Export(inner) => walk_impls(std::slice::from_ref(inner.as_ref()), ctx, closures, types, out),
            _ => {}
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn emit_method(
    type_token: wync_lang::Token,
    method_name: Symbol,
    params: &[Param],
    return_type: &Option<TypeExpr>,
    body: &[Stmt],
    is_async: bool,
    receiver: Option<Symbol>,
    ctx: &mut CContext,
    closures: &ClosureRegistry,
    types: &TypeTable,
    out: &mut String,
) {
    let type_str = ctx.token_ident(type_token);
    let method_str = escape_c_ident(ctx.interner.resolve(method_name));
    let c_name = format!("{}_{}", type_str, method_str);

    let (param_syms, param_ctypes, param_decls) = resolve_params(params, receiver, ctx);
    let ret_cty = return_ctype(return_type, ctx);

    emit_function_body(&c_name, &param_syms, &param_ctypes, &param_decls, ret_cty, body, is_async, "static ", ctx, closures, types, out);
}

/// Resolves each parameter's interned `Symbol` and `CType`, special-casing
/// `self` (which parses with an empty, untyped annotation — see
/// `wync_lang::parser::stmt::parse_fn_stmt` — so it must be retyped to the
/// receiver struct instead of falling through to `CType::Value`).
fn resolve_params(
    params: &[Param],
    receiver: Option<Symbol>,
    ctx: &CContext,
) -> (Vec<Symbol>, Vec<CType>, Vec<String>) {
    let mut syms = Vec::with_capacity(params.len());
    let mut ctys = Vec::with_capacity(params.len());
    let mut decls = Vec::with_capacity(params.len());
    for p in params {
        let lexeme = p.name.lexeme(ctx.source);
        let sym = ctx.interner.lookup(lexeme).unwrap_or(Symbol::EMPTY);
        let cty = if receiver.is_some() && lexeme == "self" {
            CType::Struct(receiver.unwrap())
        } else {
            resolve_type_expr(&p.ty, ctx.env, ctx.interner)
        };
        decls.push(format!("{} {}", c_type_str(cty, ctx.interner), ctx.token_ident(p.name)));
        syms.push(sym);
        ctys.push(cty);
    }
    (syms, ctys, decls)
}

// ===================================================================
// Generic instantiations
// ===================================================================

fn emit_generic_instantiations(
    program: &Program,
    generics: &GenericsRegistry,
    ctx: &mut CContext,
    closures: &ClosureRegistry,
    types: &TypeTable,
    out: &mut String,
) {
    for inst in generics.entries() {
        let Some((params, return_type, body, is_async)) = find_generic_template(program, inst.generic_name) else {
            continue;
        };
        let type_params = find_generic_type_params(program, inst.generic_name).unwrap_or_default();
        let c_name = ctx.resolve(inst.mangled_name);

        let mut syms = Vec::with_capacity(params.len());
        let mut ctys = Vec::with_capacity(params.len());
        let mut decls = Vec::with_capacity(params.len());
        for p in params {
            let lexeme = p.name.lexeme(ctx.source);
            let sym = ctx.interner.lookup(lexeme).unwrap_or(Symbol::EMPTY);
            let cty = substitute_ctype(&p.ty, &type_params, &inst.type_args, ctx);
            decls.push(format!("{} {}", c_type_str(cty, ctx.interner), ctx.token_ident(p.name)));
            syms.push(sym);
            ctys.push(cty);
        }
        let ret_cty = match return_type {
            Some(te) => substitute_ctype(te, &type_params, &inst.type_args, ctx),
            None => CType::Unit,
        };

        emit_function_body(&c_name, &syms, &ctys, &decls, ret_cty, body, is_async, "static ", ctx, closures, types, out);
    }
}

fn find_generic_template(
    program: &Program,
    name: Symbol,
) -> Option<(&[Param], &Option<TypeExpr>, &[Stmt], bool)> {
    find_generic_template_in(program, name)
}

fn find_generic_template_in(
    block: &[Stmt],
    name: Symbol,
) -> Option<(&[Param], &Option<TypeExpr>, &[Stmt], bool)> {
    for stmt in block {
        match &stmt.kind {
            StmtKind::FunctionDef { name: n, params, return_type, body, type_params, is_async, .. }
                if *n == name && !type_params.is_empty() =>
            {
                return Some((params, return_type, body, *is_async));
            }
            StmtKind::Module { body, .. } => {
                if let Some(found) = find_generic_template_in(body, name) {
                    return Some(found);
                }
            }
            StmtKind::Export(inner) => {
                if let Some(found) = find_generic_template_in(std::slice::from_ref(inner.as_ref()), name) {
                    return Some(found);
                }
            }
            _ => {}
        }
    }
    None
}

fn find_generic_type_params(program: &Program, name: Symbol) -> Option<Vec<Symbol>> {
    find_generic_type_params_in(program, name)
}

fn find_generic_type_params_in(block: &[Stmt], name: Symbol) -> Option<Vec<Symbol>> {
    for stmt in block {
        match &stmt.kind {
            StmtKind::FunctionDef { name: n, type_params, .. } if *n == name && !type_params.is_empty() => {
                return Some(type_params.iter().map(|p| p.name).collect());
            }
            StmtKind::Module { body, .. } => {
                if let Some(found) = find_generic_type_params_in(body, name) {
                    return Some(found);
                }
            }
            StmtKind::Export(inner) => {
                if let Some(found) = find_generic_type_params_in(std::slice::from_ref(inner.as_ref()), name) {
                    return Some(found);
                }
            }
            _ => {}
        }
    }
    None
}

/// Resolves a parameter/return annotation for one concrete instantiation:
/// a bare reference to one of the function's own type parameters becomes
/// that position's concrete argument type; anything else resolves as
/// usual (spec.md §4.3, "Generic instantiation").
fn substitute_ctype(te: &TypeExpr, type_params: &[Symbol], type_args: &[Type], ctx: &CContext) -> CType {
    if let TypeExpr::Named { name, args } = te {
        if args.is_empty() {
            if let Some(pos) = type_params.iter().position(|p| p == name) {
                if let Some(concrete) = type_args.get(pos) {
                    return ctype_of(concrete);
                }
            }
        }
    }
    resolve_type_expr(te, ctx.env, ctx.interner)
}

// ===================================================================
// Spawn wrappers
// ===================================================================

fn emit_spawn_wrappers(spawns: &SpawnRegistry, ctx: &CContext, types: &TypeTable, out: &mut String) {
    for site in spawns.entries() {
        let target = ctx.resolve(site.target);
        let ret_cty = ctype_of_typeid(site.return_type, types);
        let arg_ctys: Vec<CType> = site.arg_types.iter().map(|t| ctype_of_typeid(*t, types)).collect();

        writeln!(out, "static WynValue {}(void *arg) {{", site.wrapper_name).unwrap();
        if arg_ctys.is_empty() {
            writeln!(out, "    (void)arg;").unwrap();
            emit_spawn_wrapper_call(&format!("{}()", target), ret_cty, out);
        } else {
            writeln!(out, "    WynValue *__a = (WynValue *)arg;").unwrap();
            let unwrapped: Vec<String> = arg_ctys
                .iter()
                .enumerate()
                .map(|(i, cty)| unwrap_value(&format!("__a[{}]", i), *cty))
                .collect();
            let call = format!("{}({})", target, unwrapped.join(", "));
            emit_spawn_wrapper_call(&call, ret_cty, out);
            writeln!(out, "    free(__a);").unwrap();
        }
        writeln!(out, "}}\n").unwrap();
    }
}

fn emit_spawn_wrapper_call(call: &str, ret_cty: CType, out: &mut String) {
    if matches!(ret_cty, CType::Unit) {
        writeln!(out, "    {};", call).unwrap();
        writeln!(out, "    return wyn_none();").unwrap();
    } else {
        writeln!(out, "    return {};", wrap_as_value(call, ret_cty)).unwrap();
    }
}

fn unwrap_value(text: &str, cty: CType) -> String {
    match cty {
        CType::Int => format!("({}).as.i", text),
        CType::Float => format!("({}).as.f", text),
        CType::Bool => format!("({}).as.b", text),
        CType::Str => format!("({}).as.s", text),
        CType::Array => format!("({}).as.arr", text),
        CType::Map => format!("({}).as.map", text),
        _ => text.to_string(),
    }
}

// ===================================================================
// Plain top-level functions
// ===================================================================

fn emit_top_level_functions(
    program: &Program,
    ctx: &mut CContext,
    closures: &ClosureRegistry,
    types: &TypeTable,
    naming: &OverloadNaming,
    out: &mut String,
) {
    walk_top_level_functions(program, ctx, closures, types, naming, out);
}

fn walk_top_level_functions(
    block: &[Stmt],
    ctx: &mut CContext,
    closures: &ClosureRegistry,
    types: &TypeTable,
    naming: &OverloadNaming,
    out: &mut String,
) {
    for stmt in block {
        match &stmt.kind {
            StmtKind::FunctionDef { name, params, return_type, body, type_params, is_async, extension_receiver: None, .. }
                if type_params.is_empty() =>
            {
                let c_name = plain_function_name(*name, stmt.span, ctx, naming);
                let (syms, ctys, decls) = resolve_params(params, None, ctx);
                let ret_cty = return_ctype(return_type, ctx);
                emit_function_body(&c_name, &syms, &ctys, &decls, ret_cty, body, *is_async, "", ctx, closures, types, out);
            }
            StmtKind::Module { body, .. } => walk_top_level_functions(body, ctx, closures, types, naming, out),
            StmtKind::Export(inner) => {
                walk_top_level_functions(std::slice::from_ref(inner.as_ref()), ctx, closures, types, naming, out)
            }
            _ => {}
        }
    }
}

// ===================================================================
// Shared function-body emission (plain / method / generic instantiation)
// ===================================================================

#[allow(clippy::too_many_arguments)]
fn emit_function_body(
    c_name: &str,
    param_syms: &[Symbol],
    param_ctys: &[CType],
    param_decls: &[String],
    ret_cty: CType,
    body: &[Stmt],
    is_async: bool,
    storage: &str,
    ctx: &mut CContext,
    closures: &ClosureRegistry,
    types: &TypeTable,
    out: &mut String,
) {
    if is_async {
        emit_async_function(c_name, param_syms, param_ctys, param_decls, ret_cty, body, storage, ctx, closures, types, out);
        return;
    }
    let ret_str = c_type_str(ret_cty, ctx.interner);
    ctx.vars.clear();
    for (sym, cty) in param_syms.iter().zip(param_ctys.iter()) {
        ctx.vars.insert(*sym, *cty);
    }
    let inline_kw = if ctx.inline_hints.contains(&Symbol::EMPTY) { "" } else { "" };
    let _ = inline_kw;
    writeln!(out, "{}{} {}({}) {{", storage, ret_str, c_name, param_decls.join(", ")).unwrap();
    for s in body {
        codegen_stmt(s, ctx, closures, types, out, 1);
    }
    writeln!(out, "}}\n").unwrap();
}

#[allow(clippy::too_many_arguments)]
fn emit_async_function(
    c_name: &str,
    param_syms: &[Symbol],
    param_ctys: &[CType],
    param_decls: &[String],
    ret_cty: CType,
    body: &[Stmt],
    storage: &str,
    ctx: &mut CContext,
    closures: &ClosureRegistry,
    types: &TypeTable,
    out: &mut String,
) {
    let ret_str = c_type_str(ret_cty, ctx.interner);
    let body_name = format!("{}__body", c_name);
    let args_name = format!("{}__Args", c_name);
    let trampoline_name = format!("{}__trampoline", c_name);

    ctx.vars.clear();
    for (sym, cty) in param_syms.iter().zip(param_ctys.iter()) {
        ctx.vars.insert(*sym, *cty);
    }
    writeln!(out, "static {} {}({}) {{", ret_str, body_name, param_decls.join(", ")).unwrap();
    for s in body {
        codegen_stmt(s, ctx, closures, types, out, 1);
    }
    writeln!(out, "}}\n").unwrap();

    writeln!(out, "typedef struct {{").unwrap();
    for decl in param_decls {
        writeln!(out, "    {};", decl).unwrap();
    }
    writeln!(out, "}} {};\n", args_name).unwrap();

    writeln!(out, "static WynValue {}(void *raw) {{", trampoline_name).unwrap();
    writeln!(out, "    {} *a = ({} *)raw;", args_name, args_name).unwrap();
    let call_args: Vec<String> = param_syms.iter().map(|s| format!("a->{}", ctx.resolve(*s))).collect();
    if matches!(ret_cty, CType::Unit) {
        writeln!(out, "    {}({});", body_name, call_args.join(", ")).unwrap();
        writeln!(out, "    free(a);").unwrap();
        writeln!(out, "    return wyn_none();").unwrap();
    } else {
        writeln!(out, "    {} __r = {}({});", ret_str, body_name, call_args.join(", ")).unwrap();
        writeln!(out, "    free(a);").unwrap();
        writeln!(out, "    return {};", wrap_as_value("__r", ret_cty)).unwrap();
    }
    writeln!(out, "}}\n").unwrap();

    writeln!(out, "{}WynFuture *{}({}) {{", storage, c_name, param_decls.join(", ")).unwrap();
    writeln!(out, "    {} *a = ({} *)malloc(sizeof({}));", args_name, args_name, args_name).unwrap();
    for sym in param_syms {
        let nm = ctx.resolve(*sym);
        writeln!(out, "    a->{} = {};", nm, nm).unwrap();
    }
    writeln!(out, "    return wyn_spawn({}, (void *)a);", trampoline_name).unwrap();
    writeln!(out, "}}\n").unwrap();
}

// ===================================================================
// Entry point
// ===================================================================

fn emit_entry_point(program: &Program, ctx: &CContext, naming: &OverloadNaming, entry: EntryMode, out: &mut String) {
    match entry {
        EntryMode::Program => emit_program_entry(program, ctx, naming, out),
        EntryMode::Tests => emit_test_entry(program, ctx, out),
    }
}

fn emit_program_entry(program: &Program, ctx: &CContext, naming: &OverloadNaming, out: &mut String) {
    let main_sym = ctx.interner.lookup("main");
    let target = main_sym
        .and_then(|sym| find_named(program, sym))
        .map(|(name, span)| plain_function_name(name, span, ctx, naming));
    // A `main` declared `-> int` forwards its return value as the process
    // exit status (spec.md §8, "Driver exit status"); anything else (unit,
    // or no top-level `main` at all) falls back to exit 0.
    let returns_int = main_sym
        .and_then(|sym| find_return_type(program, sym))
        .map(|rt| return_ctype(&rt, ctx) == CType::Int)
        .unwrap_or(false);

    writeln!(out, "int main(int argc, char **argv) {{").unwrap();
    writeln!(out, "    _wyn_argc = argc;").unwrap();
    writeln!(out, "    _wyn_argv = argv;").unwrap();
    match target {
        Some(name) if returns_int => {
            writeln!(out, "    return {}();", name).unwrap();
        }
        Some(name) => {
            writeln!(out, "    {}();", name).unwrap();
            writeln!(out, "    return 0;").unwrap();
        }
        None => {
            writeln!(out, "    /* no top-level main found */").unwrap();
            writeln!(out, "    return 0;").unwrap();
        }
    }
    writeln!(out, "}}").unwrap();
}

/// One `static void __test_N(void)` per top-level `test` block, numbered in
/// the same declaration order `collect_tests`/`emit_test_entry` assume.
fn emit_test_bodies(program: &Program, ctx: &mut CContext, closures: &ClosureRegistry, types: &TypeTable, out: &mut String) {
    let mut index = 0;
    emit_test_bodies_in(program, ctx, closures, types, out, &mut index);
}

fn emit_test_bodies_in(
    block: &[Stmt],
    ctx: &mut CContext,
    closures: &ClosureRegistry,
    types: &TypeTable,
    out: &mut String,
    index: &mut usize,
) {
    for stmt in block {
        match &stmt.kind {
            StmtKind::Test { body, .. } => {
                writeln!(out, "static void __test_{}(void) {{", index).unwrap();
                ctx.vars.clear();
                for s in body {
                    codegen_stmt(s, ctx, closures, types, out, 1);
                }
                writeln!(out, "}}\n").unwrap();
                *index += 1;
            }
            StmtKind::Module { body, .. } => emit_test_bodies_in(body, ctx, closures, types, out, index),
            StmtKind::Export(inner) => {
                emit_test_bodies_in(std::slice::from_ref(inner.as_ref()), ctx, closures, types, out, index)
            }
            _ => {}
        }
    }
}

/// Every `test` block run in declaration order, reporting a pass/fail
/// count (SPEC_FULL §F, "wyn test"). A failing `assert`/`panic` inside the
/// block throws (see `runtime::C_RUNTIME`'s `wyn_panic`) instead of
/// aborting the process, so later tests still run.
fn emit_test_entry(program: &Program, ctx: &CContext, out: &mut String) {
    let tests = collect_tests(program, ctx);

    writeln!(out, "int main(int argc, char **argv) {{").unwrap();
    writeln!(out, "    _wyn_argc = argc;").unwrap();
    writeln!(out, "    _wyn_argv = argv;").unwrap();
    writeln!(out, "    int __passed = 0, __failed = 0;").unwrap();
    for (i, name) in tests.iter().enumerate() {
        writeln!(out, "    {{").unwrap();
        writeln!(
            out,
            "        if (wyn_try_depth < WYN_MAX_TRY_DEPTH && setjmp(wyn_try_stack[wyn_try_depth++]) == 0) {{"
        )
        .unwrap();
        writeln!(out, "            __test_{}();", i).unwrap();
        writeln!(out, "            wyn_try_depth--;").unwrap();
        writeln!(out, "            __passed++;").unwrap();
        writeln!(out, "            printf(\"test %s ... ok\\n\", \"{}\");", name).unwrap();
        writeln!(out, "        }} else {{").unwrap();
        writeln!(out, "            wyn_try_depth--;").unwrap();
        writeln!(out, "            __failed++;").unwrap();
        writeln!(out, "            char *__msg = wyn_value_to_str(wyn_thrown_value);").unwrap();
        writeln!(
            out,
            "            printf(\"test %s ... FAILED: %s\\n\", \"{}\", __msg);",
            name
        )
        .unwrap();
        writeln!(out, "            free(__msg);").unwrap();
        writeln!(out, "        }}").unwrap();
        writeln!(out, "    }}").unwrap();
    }
    writeln!(out, "    printf(\"%d passed, %d failed\\n\", __passed, __failed);").unwrap();
    writeln!(out, "    return __failed > 0 ? 1 : 0;").unwrap();
    writeln!(out, "}}").unwrap();
}

/// Finds the unique non-generic, non-extension top-level function bound to
/// `sym`, returning its own `Symbol` (identical to `sym`) and defining span.
fn find_named(block: &[Stmt], sym: Symbol) -> Option<(Symbol, Span)> {
    for stmt in block {
        match &stmt.kind {
            StmtKind::FunctionDef { name, extension_receiver: None, type_params, .. }
                if type_params.is_empty() && *name == sym =>
            {
                return Some((*name, stmt.span));
            }
            StmtKind::Module { body, .. } => {
                if let Some(found) = find_named(body, sym) {
                    return Some(found);
                }
            }
            StmtKind::Export(inner) => {
                if let Some(found) = find_named(std::slice::from_ref(inner.as_ref()), sym) {
                    return Some(found);
                }
            }
            _ => {}
        }
    }
    None
}

/// The declared return-type annotation of the unique non-generic,
/// non-extension top-level function bound to `sym`, if any.
fn find_return_type(block: &[Stmt], sym: Symbol) -> Option<Option<TypeExpr>> {
    for stmt in block {
        match &stmt.kind {
            StmtKind::FunctionDef { name, extension_receiver: None, type_params, return_type, .. }
                if type_params.is_empty() && *name == sym =>
            {
                return Some(return_type.clone());
            }
            StmtKind::Module { body, .. } => {
                if let Some(found) = find_return_type(body, sym) {
                    return Some(found);
                }
            }
            StmtKind::Export(inner) => {
                if let Some(found) = find_return_type(std::slice::from_ref(inner.as_ref()), sym) {
                    return Some(found);
                }
            }
            _ => {}
        }
    }
    None
}

fn collect_tests(program: &Program, ctx: &CContext) -> Vec<String> {
    let mut names = Vec::new();
    collect_tests_in(program, ctx, &mut names);
    names
}

fn collect_tests_in(block: &[Stmt], ctx: &CContext, names: &mut Vec<String>) {
    for stmt in block {
        match &stmt.kind {
            StmtKind::Test { name, .. } => {
                names.push(ctx.interner.resolve(*name).to_string());
            }
            StmtKind::Module { body, .. } => collect_tests_in(body, ctx, names),
            StmtKind::Export(inner) => collect_tests_in(std::slice::from_ref(inner.as_ref()), ctx, names),
            _ => {}
        }
    }
}
