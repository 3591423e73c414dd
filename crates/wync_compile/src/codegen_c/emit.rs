//! Statement and expression lowering to C text (spec.md §4.4, "C code
//! generation").
//!
//! [`codegen_expr`] returns the C text for an expression as a `String`;
//! [`codegen_stmt`] writes whole (already-terminated, already-indented)
//! statements straight into the output buffer. This mirrors how the C
//! emitter this was grounded on composes nested expressions before
//! statement-level formatting is applied.

use std::fmt::Write;

use wync_base::Symbol;
use wync_lang::ast::expr::InterpSegment;
use wync_lang::ast::{
    CatchClause, Expr, ExprKind, ForHead, MatchCase, Pattern, Stmt, StmtKind,
};
use wync_lang::TokenKind;

use crate::analysis::TypeTable;
use crate::closures::ClosureRegistry;

use super::types::{c_type_str, ctype_of_typeid, escape_c_ident, resolve_type_expr, CContext, CType};

const BUILTIN_MODULES: &[&str] = &["math", "random", "array", "string", "time"];

fn indent_str(level: usize) -> String {
    "    ".repeat(level)
}

pub(super) fn codegen_stmt(
    stmt: &Stmt,
    ctx: &mut CContext,
    closures: &ClosureRegistry,
    types: &TypeTable,
    out: &mut String,
    indent: usize,
) {
    let pad = indent_str(indent);
    match &stmt.kind {
        StmtKind::Expr(e) => {
            let text = codegen_expr(e, ctx, closures, types);
            writeln!(out, "{}{};", pad, text).unwrap();
        }
        StmtKind::Let { pattern, ty, init, .. } => {
            codegen_let(pattern, ty, init, ctx, closures, types, out, indent);
        }
        StmtKind::Return(value) => match value {
            Some(e) => {
                let text = codegen_expr(e, ctx, closures, types);
                writeln!(out, "{}return {};", pad, text).unwrap();
            }
            None => {
                writeln!(out, "{}return;", pad).unwrap();
            }
        },
        StmtKind::Block(body) => {
            writeln!(out, "{}{{", pad).unwrap();
            for s in body {
                codegen_stmt(s, ctx, closures, types, out, indent + 1);
            }
            writeln!(out, "{}}}", pad).unwrap();
        }
        StmtKind::FunctionDef { .. } => {
            // Top-level function definitions are emitted separately by
            // `codegen_function` (mod.rs); nested fn items don't occur.
        }
        StmtKind::StructDef { .. } | StmtKind::EnumDef { .. } | StmtKind::TraitDef { .. } => {}
        StmtKind::ImplBlock { .. } => {}
        StmtKind::If { cond, then_branch, else_branch } => {
            let cond_text = codegen_expr(cond, ctx, closures, types);
            writeln!(out, "{}if ({}) {{", pad, cond_text).unwrap();
            codegen_stmt(then_branch, ctx, closures, types, out, indent + 1);
            writeln!(out, "{}}}", pad).unwrap();
            if let Some(e) = else_branch {
                writeln!(out, "{}else {{", pad).unwrap();
                codegen_stmt(e, ctx, closures, types, out, indent + 1);
                writeln!(out, "{}}}", pad).unwrap();
            }
        }
        StmtKind::While { cond, body } => {
            let cond_text = codegen_expr(cond, ctx, closures, types);
            writeln!(out, "{}while ({}) {{", pad, cond_text).unwrap();
            codegen_stmt(body, ctx, closures, types, out, indent + 1);
            writeln!(out, "{}}}", pad).unwrap();
        }
        StmtKind::For { head, body } => match head {
            ForHead::CStyle { init, cond, inc } => {
                let mut header = String::new();
                if let Some(s) = init {
                    let mut tmp = String::new();
                    codegen_stmt(s, ctx, closures, types, &mut tmp, 0);
                    header.push_str(tmp.trim_end().trim_end_matches(';'));
                }
                header.push_str("; ");
                if let Some(c) = cond {
                    header.push_str(&codegen_expr(c, ctx, closures, types));
                }
                header.push_str("; ");
                if let Some(i) = inc {
                    header.push_str(&codegen_expr(i, ctx, closures, types));
                }
                writeln!(out, "{}for ({}) {{", pad, header).unwrap();
                codegen_stmt(body, ctx, closures, types, out, indent + 1);
                writeln!(out, "{}}}", pad).unwrap();
            }
            ForHead::ForEach { binding, iterable } => {
                let iter_text = codegen_expr(iterable, ctx, closures, types);
                let bind_name = ctx.token_ident(*binding);
                let idx = format!("__i_{}", bind_name);
                writeln!(
                    out,
                    "{}for (int64_t {} = 1; {} <= wyn_array_len({}); {}++) {{",
                    pad, idx, idx, iter_text, idx
                )
                .unwrap();
                writeln!(
                    out,
                    "{}    WynValue {} = wyn_array_get({}, {});",
                    pad, bind_name, iter_text, idx
                )
                .unwrap();
                codegen_stmt(body, ctx, closures, types, out, indent + 1);
                writeln!(out, "{}}}", pad).unwrap();
            }
        },
        StmtKind::Break => {
            writeln!(out, "{}break;", pad).unwrap();
        }
        StmtKind::Continue => {
            writeln!(out, "{}continue;", pad).unwrap();
        }
        StmtKind::Import { .. } => {}
        StmtKind::Export(inner) => codegen_stmt(inner, ctx, closures, types, out, indent),
        StmtKind::Module { body, .. } => {
            for s in body {
                codegen_stmt(s, ctx, closures, types, out, indent);
            }
        }
        StmtKind::TypeAlias { .. } => {}
        StmtKind::Try { body, catches, finally } => {
            codegen_try(body, catches, finally, ctx, closures, types, out, indent);
        }
        StmtKind::Throw(e) => {
            let text = codegen_expr(e, ctx, closures, types);
            writeln!(out, "{}wyn_throw({});", pad, text).unwrap();
        }
        StmtKind::Match { scrutinee, cases } => {
            codegen_match_stmt(scrutinee, cases, ctx, closures, types, out, indent);
        }
        StmtKind::Test { body, .. } => {
            for s in body {
                codegen_stmt(s, ctx, closures, types, out, indent);
            }
        }
        StmtKind::Spawn(e) => {
            if let Some(site) = ctx.spawns.site_for_span(stmt.span) {
                let wrapper = site.wrapper_name.clone();
                if let ExprKind::Call { args, .. } = &e.kind {
                    let arg_texts: Vec<String> =
                        args.iter().map(|a| codegen_expr(a, ctx, closures, types)).collect();
                    let wrapped: Vec<String> = args
                        .iter()
                        .zip(arg_texts.iter())
                        .map(|(a, t)| wrap_as_value(t, ctype_of_typeid(a.resolved_type, types)))
                        .collect();
                    if wrapped.is_empty() {
                        writeln!(out, "{}wyn_spawn({}, NULL);", pad, wrapper).unwrap();
                    } else {
                        // Heap-allocated, not a stack compound literal: the
                        // spawned thread reads this after this block ends.
                        let buf = format!("__spawn_argbuf_{}", stmt.span.start);
                        writeln!(
                            out,
                            "{}WynValue *{} = (WynValue *)malloc(sizeof(WynValue) * {});",
                            pad,
                            buf,
                            wrapped.len()
                        )
                        .unwrap();
                        for (i, w) in wrapped.iter().enumerate() {
                            writeln!(out, "{}{}[{}] = {};", pad, buf, i, w).unwrap();
                        }
                        writeln!(out, "{}wyn_spawn({}, (void *){});", pad, wrapper, buf).unwrap();
                    }
                }
            } else {
                // Computed callee (no direct resolution): fall back to the
                // old synchronous-inline behavior rather than spawning.
                let text = codegen_expr(e, ctx, closures, types);
                writeln!(out, "{}{};", pad, text).unwrap();
            }
        }
        StmtKind::Extern { .. } => {}
        StmtKind::MacroDef { .. } => {}
    }
}

fn codegen_let(
    pattern: &Pattern,
    ty: &Option<wync_lang::ast::TypeExpr>,
    init: &Option<Expr>,
    ctx: &mut CContext,
    closures: &ClosureRegistry,
    types: &TypeTable,
    out: &mut String,
    indent: usize,
) {
    let pad = indent_str(indent);
    let Pattern::Ident { name, .. } = pattern else {
        // Destructuring lets fall back to binding each name at its
        // inferred element type from the initializer, one declaration per
        // name (spec.md §4.2, "irrefutable pattern in a let").
        if let Some(init_expr) = init {
            let init_text = codegen_expr(init_expr, ctx, closures, types);
            let holder = format!("__let_tmp_{}", pattern.span().start);
            writeln!(out, "{}WynValue {} = {};", pad, holder, init_text).unwrap();
            bind_pattern_from_value(pattern, &holder, ctx, out, indent);
        }
        return;
    };

    let cty = match (ty, init) {
        (Some(_), Some(e)) | (None, Some(e)) => ctype_of_typeid(e.resolved_type, types),
        (Some(te), None) => resolve_type_expr(te, ctx.env, ctx.interner),
        (None, None) => CType::Value,
    };
    ctx.vars.insert(*name, cty);
    let c_name = ctx.resolve(*name);
    let type_str = c_type_str(cty, ctx.interner);
    match init {
        Some(e) => {
            let init_text = codegen_expr(e, ctx, closures, types);
            writeln!(out, "{}{} {} = {};", pad, type_str, c_name, init_text).unwrap();
        }
        None => {
            writeln!(out, "{}{} {};", pad, type_str, c_name).unwrap();
        }
    }
}

/// Binds every name in a non-trivial (struct/tuple/array) pattern by
/// reading fields out of a `WynValue`-typed temporary. Literal/wildcard
/// subpatterns introduce nothing and are skipped.
fn bind_pattern_from_value(
    pattern: &Pattern,
    holder: &str,
    ctx: &mut CContext,
    out: &mut String,
    indent: usize,
) {
    let pad = indent_str(indent);
    match pattern {
        Pattern::Ident { name, .. } => {
            ctx.vars.insert(*name, CType::Value);
            writeln!(out, "{}WynValue {} = {};", pad, ctx.resolve(*name), holder).unwrap();
        }
        Pattern::Tuple { elements, .. } => {
            for (i, el) in elements.iter().enumerate() {
                let sub = format!("{}[{}]", holder, i);
                bind_pattern_from_value(el, &sub, ctx, out, indent);
            }
        }
        Pattern::Array { elements, .. } => {
            for (i, el) in elements.iter().enumerate() {
                let sub = format!("wyn_array_get({}.as.arr, {})", holder, i + 1);
                bind_pattern_from_value(el, &sub, ctx, out, indent);
            }
        }
        Pattern::Struct { fields, .. } => {
            for (name, p) in fields {
                let sub = format!("{}.{}", holder, ctx.resolve(*name));
                bind_pattern_from_value(p, &sub, ctx, out, indent);
            }
        }
        _ => {}
    }
}

fn codegen_try(
    body: &[Stmt],
    catches: &[CatchClause],
    finally: &Option<Vec<Stmt>>,
    ctx: &mut CContext,
    closures: &ClosureRegistry,
    types: &TypeTable,
    out: &mut String,
    indent: usize,
) {
    let pad = indent_str(indent);
    writeln!(out, "{}{{", pad).unwrap();
    writeln!(
        out,
        "{}    if (wyn_try_depth < WYN_MAX_TRY_DEPTH && setjmp(wyn_try_stack[wyn_try_depth++]) == 0) {{",
        pad
    )
    .unwrap();
    for s in body {
        codegen_stmt(s, ctx, closures, types, out, indent + 2);
    }
    writeln!(out, "{}        wyn_try_depth--;", pad).unwrap();
    writeln!(out, "{}    }} else {{", pad).unwrap();
    writeln!(out, "{}        wyn_try_depth--;", pad).unwrap();
    for (i, clause) in catches.iter().enumerate() {
        let kw = if i == 0 { "if" } else { "else if" };
        writeln!(out, "{}        {} (1) {{", pad, kw).unwrap();
        let bind_name = ctx.token_ident(clause.binding);
        writeln!(out, "{}            WynValue {} = wyn_thrown_value;", pad, bind_name).unwrap();
        for s in &clause.body {
            codegen_stmt(s, ctx, closures, types, out, indent + 3);
        }
        writeln!(out, "{}        }}", pad).unwrap();
        break; // exactly-typed multi-catch dispatch is left to the first handler
    }
    writeln!(out, "{}    }}", pad).unwrap();
    if let Some(fin) = finally {
        for s in fin {
            codegen_stmt(s, ctx, closures, types, out, indent + 1);
        }
    }
    writeln!(out, "{}}}", pad).unwrap();
}

fn codegen_match_stmt(
    scrutinee: &Expr,
    cases: &[MatchCase],
    ctx: &mut CContext,
    closures: &ClosureRegistry,
    types: &TypeTable,
    out: &mut String,
    indent: usize,
) {
    let pad = indent_str(indent);
    let scrut_text = codegen_expr(scrutinee, ctx, closures, types);
    let holder = format!("__match_{}", scrutinee.span.start);
    let scrut_cty = ctype_of_typeid(scrutinee.resolved_type, types);
    writeln!(
        out,
        "{}{} {} = {};",
        pad,
        c_type_str(scrut_cty, ctx.interner),
        holder,
        scrut_text
    )
    .unwrap();
    for (i, case) in cases.iter().enumerate() {
        let kw = if i == 0 { "if" } else { "else if" };
        let cond = pattern_condition(&case.pattern, &holder, scrut_cty, ctx);
        writeln!(out, "{}{} ({}) {{", pad, kw, cond).unwrap();
        bind_case_pattern(&case.pattern, &holder, scrut_cty, ctx, out, indent + 1);
        if let Some(guard) = &case.guard {
            let guard_text = codegen_expr(guard, ctx, closures, types);
            writeln!(out, "{}    if ({}) {{", pad, guard_text).unwrap();
            codegen_stmt(&case.body, ctx, closures, types, out, indent + 2);
            writeln!(out, "{}    }}", pad).unwrap();
        } else {
            codegen_stmt(&case.body, ctx, closures, types, out, indent + 1);
        }
        writeln!(out, "{}}}", pad).unwrap();
    }
}

/// The boolean C condition a pattern imposes on a scrutinee already bound
/// to `holder`. Irrefutable patterns (`_`, a bare name) are always `1`.
fn pattern_condition(pattern: &Pattern, holder: &str, cty: CType, ctx: &mut CContext) -> String {
    match pattern {
        Pattern::Ident { .. } | Pattern::Wildcard { .. } => "1".to_string(),
        Pattern::Literal(e) => {
            let lit = codegen_literal_pattern(e, ctx);
            format!("({} == {})", holder, lit)
        }
        Pattern::OptionSome { .. } => format!("{}.has_value", holder),
        Pattern::OptionNone { .. } => format!("(!{}.has_value)", holder),
        Pattern::Struct { fields, .. } => {
            let sub_conds: Vec<String> = fields
                .iter()
                .filter(|(_, p)| !p.is_irrefutable())
                .map(|(name, p)| {
                    let field_holder = format!("{}.{}", holder, ctx.resolve(*name));
                    pattern_condition(p, &field_holder, CType::Value, ctx)
                })
                .collect();
            if sub_conds.is_empty() {
                "1".to_string()
            } else {
                format!("({})", sub_conds.join(" && "))
            }
        }
        Pattern::Array { elements, rest, .. } => {
            if rest.is_some() {
                format!("(wyn_array_len({}) >= {})", holder, elements.len())
            } else {
                format!("(wyn_array_len({}) == {})", holder, elements.len())
            }
        }
        Pattern::Tuple { .. } => "1".to_string(),
        Pattern::Range { start, end, inclusive, .. } => {
            let s = codegen_literal_pattern(start, ctx);
            let e = codegen_literal_pattern(end, ctx);
            if *inclusive {
                format!("({} >= {} && {} <= {})", holder, s, holder, e)
            } else {
                format!("({} >= {} && {} < {})", holder, s, holder, e)
            }
        }
        Pattern::Guarded { inner, guard, .. } => {
            let inner_cond = pattern_condition(inner, holder, cty, ctx);
            let _ = guard; // the guard expression runs after pattern binding, in codegen_match_stmt/expr
            inner_cond
        }
    }
}

fn codegen_literal_pattern(expr: &Expr, ctx: &mut CContext) -> String {
    match &expr.kind {
        ExprKind::IntLit(v) => v.to_string(),
        ExprKind::FloatLit(v) => v.to_string(),
        ExprKind::BoolLit(v) => v.to_string(),
        ExprKind::StrLit(s) => format!("\"{}\"", ctx.interner.resolve(*s)),
        ExprKind::CharLit(c) => format!("'{}'", c),
        _ => "0".to_string(),
    }
}

fn bind_case_pattern(
    pattern: &Pattern,
    holder: &str,
    cty: CType,
    ctx: &mut CContext,
    out: &mut String,
    indent: usize,
) {
    let pad = indent_str(indent);
    match pattern {
        Pattern::Ident { name, .. } => {
            ctx.vars.insert(*name, cty);
            writeln!(
                out,
                "{}{} {} = {};",
                pad,
                c_type_str(cty, ctx.interner),
                ctx.resolve(*name),
                holder
            )
            .unwrap();
        }
        Pattern::OptionSome { inner, .. } => {
            let unwrapped = format!("{}.value", holder);
            bind_case_pattern(inner, &unwrapped, CType::Value, ctx, out, indent);
        }
        Pattern::Array { elements, rest, .. } => {
            for (i, el) in elements.iter().enumerate() {
                let sub = format!("wyn_array_get({}, {})", holder, i + 1);
                bind_case_pattern(el, &sub, CType::Value, ctx, out, indent);
            }
            if let Some(r) = rest {
                ctx.vars.insert(*r, CType::Array);
                writeln!(out, "{}/* remaining elements bound via {} */", pad, ctx.resolve(*r)).unwrap();
            }
        }
        Pattern::Tuple { elements, .. } => {
            for (i, el) in elements.iter().enumerate() {
                let sub = format!("{}[{}]", holder, i);
                bind_case_pattern(el, &sub, CType::Value, ctx, out, indent);
            }
        }
        Pattern::Guarded { inner, .. } => bind_case_pattern(inner, holder, cty, ctx, out, indent),
        Pattern::Struct { fields, .. } => {
            for (name, p) in fields {
                let field_holder = format!("{}.{}", holder, ctx.resolve(*name));
                bind_case_pattern(p, &field_holder, CType::Value, ctx, out, indent);
            }
        }
        Pattern::Wildcard { .. } | Pattern::Literal(_) | Pattern::Range { .. } | Pattern::OptionNone { .. } => {}
    }
}

pub(super) fn codegen_literal(expr: &Expr, ctx: &mut CContext) -> String {
    match &expr.kind {
        ExprKind::IntLit(v) => v.to_string(),
        ExprKind::FloatLit(v) => format!("{:?}", v),
        ExprKind::BoolLit(v) => v.to_string(),
        ExprKind::CharLit(c) => format!("'{}'", c),
        ExprKind::StrLit(s) => format!("\"{}\"", ctx.interner.resolve(*s)),
        _ => unreachable!("codegen_literal called on a non-literal"),
    }
}

pub(super) fn codegen_expr(
    expr: &Expr,
    ctx: &mut CContext,
    closures: &ClosureRegistry,
    types: &TypeTable,
) -> String {
    match &expr.kind {
        ExprKind::IntLit(_)
        | ExprKind::FloatLit(_)
        | ExprKind::BoolLit(_)
        | ExprKind::CharLit(_)
        | ExprKind::StrLit(_) => codegen_literal(expr, ctx),

        // A reference to a lambda-bound variable is just a variable read:
        // the closure value itself was built once, at the `let`'s own
        // `Lambda` literal (see the `ExprKind::Lambda` arm below).
        ExprKind::Ident(name) => ctx.resolve(*name),

        ExprKind::Assign { name, value } => {
            let v_text = codegen_expr(value, ctx, closures, types);
            format!("({} = {})", ctx.resolve(*name), v_text)
        }

        ExprKind::Unary { op, operand } => {
            let text = codegen_expr(operand, ctx, closures, types);
            match op.kind {
                TokenKind::Minus => format!("(-{})", text),
                TokenKind::Not => format!("(!{})", text),
                _ => text,
            }
        }

        ExprKind::Binary { op, left, right } => codegen_binary(op.kind, left, right, ctx, closures, types),

        ExprKind::Call { callee, args, resolved } => {
            codegen_call(callee, args, resolved, ctx, closures, types)
        }

        ExprKind::MethodCall { receiver, method, args } => {
            codegen_method_call(receiver, *method, args, ctx, closures, types)
        }

        ExprKind::ArrayLit(elems) => {
            let tmp = format!("__arr_{}", expr.span.start);
            let mut pushes = String::new();
            for e in elems {
                let text = codegen_expr(e, ctx, closures, types);
                let wrapped = wrap_as_value(&text, ctype_of_typeid(e.resolved_type, types));
                write!(pushes, "wyn_array_push({}, {}), ", tmp, wrapped).unwrap();
            }
            format!(
                "({{ WynArray *{tmp} = wyn_array_new(); {pushes}{tmp}; }})",
                tmp = tmp,
                pushes = pushes
            )
        }

        ExprKind::Index { container, index } => {
            let c_text = codegen_expr(container, ctx, closures, types);
            let i_text = codegen_expr(index, ctx, closures, types);
            let container_cty = ctype_of_typeid(container.resolved_type, types);
            match container_cty {
                CType::Map => format!("wyn_map_get({}, {})", c_text, wrap_as_value(&i_text, ctype_of_typeid(index.resolved_type, types))),
                _ => format!("wyn_array_get({}, {})", c_text, i_text),
            }
        }

        ExprKind::IndexAssign { container, index, value } => {
            let c_text = codegen_expr(container, ctx, closures, types);
            let i_text = codegen_expr(index, ctx, closures, types);
            let v_text = codegen_expr(value, ctx, closures, types);
            let container_cty = ctype_of_typeid(container.resolved_type, types);
            let v_wrapped = wrap_as_value(&v_text, ctype_of_typeid(value.resolved_type, types));
            match container_cty {
                CType::Map => format!(
                    "wyn_map_set({}, {}, {})",
                    c_text,
                    wrap_as_value(&i_text, ctype_of_typeid(index.resolved_type, types)),
                    v_wrapped
                ),
                _ => format!("wyn_array_set({}, {}, {})", c_text, i_text, v_wrapped),
            }
        }

        ExprKind::Field { object, name } => codegen_field(object, *name, ctx, closures, types),

        ExprKind::FieldAssign { object, name, value } => {
            let o_text = codegen_expr(object, ctx, closures, types);
            let v_text = codegen_expr(value, ctx, closures, types);
            format!("({}.{} = {})", o_text, ctx.resolve(*name), v_text)
        }

        ExprKind::StructInit { type_name, fields } => {
            let type_str = ctx.resolve(*type_name);
            let field_inits: Vec<String> = fields
                .iter()
                .map(|(name, e)| format!(".{} = {}", ctx.resolve(*name), codegen_expr(e, ctx, closures, types)))
                .collect();
            format!("(({}){{ {} }})", type_str, field_inits.join(", "))
        }

        ExprKind::Range { start, end, inclusive } => {
            let s_text = codegen_expr(start, ctx, closures, types);
            let e_text = codegen_expr(end, ctx, closures, types);
            let bound = if *inclusive { format!("({}) + 1", e_text) } else { e_text };
            format!(
                "({{ WynArray *__r = wyn_array_new(); for (int64_t __v = ({}); __v < ({}); __v++) wyn_array_push(__r, wyn_int(__v)); __r; }})",
                s_text, bound
            )
        }

        ExprKind::Tuple(elems) => {
            let items: Vec<String> = elems
                .iter()
                .map(|e| wrap_as_value(&codegen_expr(e, ctx, closures, types), ctype_of_typeid(e.resolved_type, types)))
                .collect();
            format!(
                "((WynValue[]){{{}}})",
                items.join(", ")
            )
        }

        ExprKind::TupleIndex { tuple, index } => {
            let t_text = codegen_expr(tuple, ctx, closures, types);
            format!("{}[{}]", t_text, index)
        }

        ExprKind::MapLit { keys, values } => {
            let tmp = format!("__map_{}", expr.span.start);
            let mut sets = String::new();
            for (k, v) in keys.iter().zip(values.iter()) {
                let k_text = wrap_as_value(&codegen_expr(k, ctx, closures, types), ctype_of_typeid(k.resolved_type, types));
                let v_text = wrap_as_value(&codegen_expr(v, ctx, closures, types), ctype_of_typeid(v.resolved_type, types));
                write!(sets, "wyn_map_set({}, {}, {}), ", tmp, k_text, v_text).unwrap();
            }
            format!(
                "({{ WynMap *{tmp} = wyn_map_new(); {sets}{tmp}; }})",
                tmp = tmp,
                sets = sets
            )
        }

        ExprKind::If { cond, then_branch, else_branch } => {
            let c_text = codegen_expr(cond, ctx, closures, types);
            let t_text = codegen_expr(then_branch, ctx, closures, types);
            match else_branch {
                Some(e) => {
                    let e_text = codegen_expr(e, ctx, closures, types);
                    format!("(({}) ? ({}) : ({}))", c_text, t_text, e_text)
                }
                None => format!("(({}) ? ({}) : 0)", c_text, t_text),
            }
        }

        ExprKind::Ternary { cond, then_branch, else_branch } => {
            let c_text = codegen_expr(cond, ctx, closures, types);
            let t_text = codegen_expr(then_branch, ctx, closures, types);
            let e_text = codegen_expr(else_branch, ctx, closures, types);
            format!("(({}) ? ({}) : ({}))", c_text, t_text, e_text)
        }

        ExprKind::Match { scrutinee, arms } => codegen_match_expr(scrutinee, arms, ctx, closures, types, expr.span.start),

        ExprKind::Interpolation(segments) => codegen_interpolation(segments, ctx, closures, types),

        ExprKind::Lambda { .. } => {
            // A lambda used directly (not through a `let name = |...| ...`
            // binding) is looked up by its own span instead.
            if let Some(lifted) = closures.lifted_for_span(expr.span) {
                format!(
                    "wyn_closure_new((WynClosureFn){}, (WynValue[]){{{}}}, {})",
                    ctx.resolve(lifted.name),
                    lifted
                        .captures
                        .iter()
                        .map(|c| ctx.resolve(*c))
                        .collect::<Vec<_>>()
                        .join(", "),
                    lifted.captures.len()
                )
            } else {
                "NULL".to_string()
            }
        }

        ExprKind::Try(inner) => {
            let i_text = codegen_expr(inner, ctx, closures, types);
            let cty = ctype_of_typeid(inner.resolved_type, types);
            match cty {
                CType::Result => format!(
                    "({{ WynResult __r = {}; if (!__r.is_ok) wyn_throw(__r.value); __r.value; }})",
                    i_text
                ),
                _ => format!(
                    "({{ WynOption __o = {}; if (!__o.has_value) wyn_throw(wyn_string(\"unwrap on none\")); __o.value; }})",
                    i_text
                ),
            }
        }

        ExprKind::Some(inner) => {
            let i_text = codegen_expr(inner, ctx, closures, types);
            format!("wyn_some({})", wrap_as_value(&i_text, ctype_of_typeid(inner.resolved_type, types)))
        }
        ExprKind::None => "wyn_option_none()".to_string(),
        ExprKind::Ok(inner) => {
            let i_text = codegen_expr(inner, ctx, closures, types);
            format!("wyn_ok({})", wrap_as_value(&i_text, ctype_of_typeid(inner.resolved_type, types)))
        }
        ExprKind::Err(inner) => {
            let i_text = codegen_expr(inner, ctx, closures, types);
            format!("wyn_err({})", wrap_as_value(&i_text, ctype_of_typeid(inner.resolved_type, types)))
        }

        ExprKind::Pipeline(stages) => {
            // `a |> f |> g` becomes `g(f(a))`; each stage after the first
            // must be a call-shaped expression whose first argument slot
            // receives the running value (spec.md §4.2, "Pipeline").
            let mut acc = stages.first().map(|s| codegen_expr(s, ctx, closures, types)).unwrap_or_default();
            for stage in stages.iter().skip(1) {
                acc = match &stage.kind {
                    ExprKind::Call { callee, args, .. } => {
                        let callee_text = codegen_expr(callee, ctx, closures, types);
                        let mut arg_texts: Vec<String> = vec![acc];
                        arg_texts.extend(args.iter().map(|a| codegen_expr(a, ctx, closures, types)));
                        format!("{}({})", callee_text, arg_texts.join(", "))
                    }
                    _ => {
                        let stage_text = codegen_expr(stage, ctx, closures, types);
                        format!("{}({})", stage_text, acc)
                    }
                };
            }
            acc
        }

        ExprKind::Await(inner) => {
            let i_text = codegen_expr(inner, ctx, closures, types);
            format!("wyn_await({})", i_text)
        }

        ExprKind::OptionalTypeMarker(_) | ExprKind::UnionTypeMarker(_) | ExprKind::PatternExpr(_) => {
            "0".to_string()
        }
    }
}

pub(super) fn wrap_as_value(text: &str, cty: CType) -> String {
    match cty {
        CType::Int => format!("wyn_int({})", text),
        CType::Float => format!("wyn_float({})", text),
        CType::Bool => format!("wyn_bool({})", text),
        CType::Str => format!("wyn_string({})", text),
        CType::Value => text.to_string(),
        _ => format!("wyn_string(wyn_value_to_str({}))", text),
    }
}

fn codegen_binary(
    op: TokenKind,
    left: &Expr,
    right: &Expr,
    ctx: &mut CContext,
    closures: &ClosureRegistry,
    types: &TypeTable,
) -> String {
    let lt = ctype_of_typeid(left.resolved_type, types);
    let rt = ctype_of_typeid(right.resolved_type, types);
    let l_text = codegen_expr(left, ctx, closures, types);
    let r_text = codegen_expr(right, ctx, closures, types);

    // String concatenation: `+` between any string-typed operand and
    // anything else coerces the other side through `wyn_*_to_str`.
    if matches!(op, TokenKind::Plus) && (lt == CType::Str || rt == CType::Str) {
        let l_str = stringify_operand(&l_text, lt);
        let r_str = stringify_operand(&r_text, rt);
        return format!("wyn_str_concat({}, {})", l_str, r_str);
    }

    if matches!(op, TokenKind::EqEq | TokenKind::NotEq) && (lt == CType::Str || rt == CType::Str) {
        let cmp = format!("(strcmp({}, {}) == 0)", l_text, r_text);
        return if matches!(op, TokenKind::EqEq) { cmp } else { format!("(!{})", cmp) };
    }

    let op_str = match op {
        TokenKind::Plus => "+",
        TokenKind::Minus => "-",
        TokenKind::Star => "*",
        TokenKind::Slash => "/",
        TokenKind::Percent => "%",
        TokenKind::EqEq => "==",
        TokenKind::NotEq => "!=",
        TokenKind::Lt => "<",
        TokenKind::Gt => ">",
        TokenKind::LtEq => "<=",
        TokenKind::GtEq => ">=",
        TokenKind::AmpAmp | TokenKind::And => "&&",
        TokenKind::PipePipe | TokenKind::Or => "||",
        TokenKind::Amp => "&",
        TokenKind::Pipe => "|",
        TokenKind::Caret => "^",
        TokenKind::Shl => "<<",
        TokenKind::Shr => ">>",
        _ => "+",
    };
    format!("({} {} {})", l_text, op_str, r_text)
}

fn stringify_operand(text: &str, cty: CType) -> String {
    match cty {
        CType::Str => text.to_string(),
        CType::Int => format!("wyn_int_to_str({})", text),
        CType::Float => format!("wyn_float_to_str({})", text),
        CType::Bool => format!("wyn_bool_to_str({})", text),
        _ => format!("wyn_value_to_str({})", text),
    }
}

fn codegen_interpolation(
    segments: &[InterpSegment],
    ctx: &mut CContext,
    closures: &ClosureRegistry,
    types: &TypeTable,
) -> String {
    let mut fmt = String::new();
    let mut args = Vec::new();
    for seg in segments {
        match seg {
            InterpSegment::Literal(s) => {
                fmt.push_str(&ctx.interner.resolve(*s).replace('%', "%%"));
            }
            InterpSegment::Expr(e) => {
                let cty = ctype_of_typeid(e.resolved_type, types);
                let text = codegen_expr(e, ctx, closures, types);
                fmt.push_str("%s");
                args.push(stringify_operand(&text, cty));
            }
        }
    }
    if args.is_empty() {
        format!("wyn_str_dup(\"{}\")", fmt)
    } else {
        format!("wyn_sprintf(\"{}\", {})", fmt, args.join(", "))
    }
}

fn codegen_field(
    object: &Expr,
    name: Symbol,
    ctx: &mut CContext,
    closures: &ClosureRegistry,
    types: &TypeTable,
) -> String {
    if let ExprKind::Ident(base) = &object.kind {
        if ctx.env.enums.contains(base) {
            let enum_str = ctx.resolve(*base);
            let variant_str = ctx.interner.resolve(name).to_string();
            return format!("(({enum}){{ .tag = {enum}_{variant} }})", enum = enum_str, variant = variant_str);
        }
    }
    let o_text = codegen_expr(object, ctx, closures, types);
    format!("{}.{}", o_text, ctx.resolve(name))
}

fn codegen_call(
    callee: &Expr,
    args: &[Expr],
    resolved: &Option<wync_lang::ast::ResolvedCall>,
    ctx: &mut CContext,
    closures: &ClosureRegistry,
    types: &TypeTable,
) -> String {
    let arg_texts: Vec<String> = args.iter().map(|a| codegen_expr(a, ctx, closures, types)).collect();

    if let Some(rc) = resolved {
        let target = ctx.resolve(rc.target);
        return format!("{}({})", target, arg_texts.join(", "));
    }

    // A computed callee: a variable already holding a `WynClosure *`, or
    // any other expression of function type.
    let callee_text = codegen_expr(callee, ctx, closures, types);
    let wrapped_args: Vec<String> = args
        .iter()
        .map(|a| wrap_as_value(&codegen_expr(a, ctx, closures, types), ctype_of_typeid(a.resolved_type, types)))
        .collect();
    format!(
        "wyn_closure_call({}, (WynValue[]){{{}}}, {})",
        callee_text,
        wrapped_args.join(", "),
        wrapped_args.len()
    )
}

fn codegen_method_call(
    receiver: &Expr,
    method: Symbol,
    args: &[Expr],
    ctx: &mut CContext,
    closures: &ClosureRegistry,
    types: &TypeTable,
) -> String {
    let method_name = ctx.interner.resolve(method).to_string();

    if let ExprKind::Ident(base) = &receiver.kind {
        let base_name = ctx.interner.resolve(*base).to_string();
        if BUILTIN_MODULES.contains(&base_name.as_str()) {
            return codegen_module_call(&base_name, &method_name, args, ctx, closures, types);
        }
    }

    let receiver_cty = ctype_of_typeid(receiver.resolved_type, types);
    let r_text = codegen_expr(receiver, ctx, closures, types);
    let arg_texts: Vec<String> = args.iter().map(|a| codegen_expr(a, ctx, closures, types)).collect();

    match (receiver_cty, method_name.as_str()) {
        (CType::Array, "push") => {
            let wrapped = wrap_as_value(&arg_texts[0], ctype_of_typeid(args[0].resolved_type, types));
            format!("wyn_array_push({}, {})", r_text, wrapped)
        }
        (CType::Array, "len") => format!("wyn_array_len({})", r_text),
        (CType::Array, "get") => format!("wyn_some(wyn_array_get({}, {}))", r_text, arg_texts.first().cloned().unwrap_or_default()),
        (CType::Map, "has") => format!("wyn_map_has({}, {})", r_text, arg_texts.first().cloned().unwrap_or_default()),
        (CType::Map, "len") => format!("wyn_map_len({})", r_text),
        (CType::Str, "len") => format!("(int64_t)strlen({})", r_text),
        (CType::Struct(sym), _) => {
            let type_str = ctx.resolve(sym);
            let mut full_args = vec![r_text];
            full_args.extend(arg_texts);
            format!("{}_{}({})", type_str, escape_c_ident(&method_name), full_args.join(", "))
        }
        _ => {
            let mut full_args = vec![r_text];
            full_args.extend(arg_texts);
            format!("{}({})", escape_c_ident(&method_name), full_args.join(", "))
        }
    }
}

fn codegen_module_call(
    module: &str,
    method: &str,
    args: &[Expr],
    ctx: &mut CContext,
    closures: &ClosureRegistry,
    types: &TypeTable,
) -> String {
    let arg_texts: Vec<String> = args.iter().map(|a| codegen_expr(a, ctx, closures, types)).collect();
    let joined = arg_texts.join(", ");
    match (module, method) {
        ("math", "sqrt") => format!("sqrt({})", joined),
        ("math", "pow") => format!("wyn_pow_f64({})", joined),
        ("math", "abs") => format!("wyn_abs_f64({})", joined),
        ("math", "floor") => format!("(int64_t)floor({})", joined),
        ("math", "ceil") => format!("(int64_t)ceil({})", joined),
        ("math", "min") => format!("wyn_min_i64({})", joined),
        ("math", "max") => format!("wyn_max_i64({})", joined),
        ("random", "int") => format!("wyn_random_int({})", joined),
        ("random", "float") => "wyn_random_float()".to_string(),
        ("array", "new") => "wyn_array_new()".to_string(),
        ("string", "concat") => format!("wyn_str_concat({})", joined),
        ("time", "now") => "wyn_time_now_millis()".to_string(),
        _ => format!("{}_{}({})", module, method, joined),
    }
}

fn codegen_match_expr(
    scrutinee: &Expr,
    arms: &[wync_lang::ast::MatchArm],
    ctx: &mut CContext,
    closures: &ClosureRegistry,
    types: &TypeTable,
    span_start: usize,
) -> String {
    let scrut_text = codegen_expr(scrutinee, ctx, closures, types);
    let holder = format!("__matchexpr_{}", span_start);
    let scrut_cty = ctype_of_typeid(scrutinee.resolved_type, types);
    let mut body = String::new();
    writeln!(body, "({{").unwrap();
    writeln!(body, "{} {} = {};", c_type_str(scrut_cty, ctx.interner), holder, scrut_text).unwrap();
    let result_cty = CType::Value;
    writeln!(body, "{} __result;", c_type_str(result_cty, ctx.interner)).unwrap();
    for (i, arm) in arms.iter().enumerate() {
        let kw = if i == 0 { "if" } else { "else if" };
        let cond = pattern_condition(&arm.pattern, &holder, scrut_cty, ctx);
        writeln!(body, "{} ({}) {{", kw, cond).unwrap();
        let mut bindings = String::new();
        bind_case_pattern(&arm.pattern, &holder, scrut_cty, ctx, &mut bindings, 0);
        body.push_str(&bindings);
        let arm_cty = ctype_of_typeid(arm.body.resolved_type, types);
        let arm_text = codegen_expr(&arm.body, ctx, closures, types);
        writeln!(body, "__result = {};", wrap_as_value(&arm_text, arm_cty)).unwrap();
        writeln!(body, "}}").unwrap();
    }
    writeln!(body, "__result;").unwrap();
    write!(body, "}})").unwrap();
    body
}
