//! Closure lifting (spec.md §4.4 "Closure lifting pass", §9 "Cyclic and
//! back-pointer-heavy AST").
//!
//! Every `Lambda` expression anywhere in the program is lifted to a
//! top-level function `__lambda_N` whose parameter list is its captured
//! free identifiers followed by its declared parameters. The lambda node
//! itself keeps its `captures` field populated (spec.md §3, AST) so the
//! emitter can find the matching [`LiftedLambda`] by source span; call
//! sites that call a variable bound directly to a lambda literal
//! (`let f = |x| ...; f(5)`) get the captures prepended automatically via
//! [`ClosureRegistry::lambda_for_var`].
//!
//! Two independent recursive walks do the work: [`lift_lambdas`] finds
//! every `Lambda` node (and every direct `let name = <lambda>` binding)
//! across the whole program; [`collect_free_vars`] computes one lambda's
//! own free-variable set by walking just its body, extending the bound set
//! whenever it descends into a construct that introduces new bindings
//! (a nested lambda's parameters, or a `match` arm's pattern).

use std::collections::HashSet;

use wync_base::{Interner, Span, Symbol};
use wync_lang::ast::expr::InterpSegment;
use wync_lang::ast::{Block, Expr, ExprKind, ForHead, Pattern, Program, Stmt, StmtKind};

/// Identifiers that are never captures: built-in functions and the fixed
/// module names the emitter recognizes (spec.md §4.4 "Module / Import",
/// "A fixed list of built-in function names").
const BUILTIN_GLOBALS: &[&str] = &[
    "print",
    "len",
    "get_argc",
    "get_argv",
    "check_file_exists",
    "read_file_content",
    "is_content_valid",
    "store_argv",
    "store_file_content",
    "math",
    "random",
    "array",
    "string",
    "time",
];

#[derive(Debug, Clone)]
pub struct LiftedLambda {
    pub name: Symbol,
    pub params: Vec<Symbol>,
    pub captures: Vec<Symbol>,
    pub body: Expr,
}

#[derive(Debug, Default)]
pub struct ClosureRegistry {
    lifted: Vec<LiftedLambda>,
    by_span: std::collections::HashMap<Span, usize>,
    /// Variables whose single textual binding is a bare lambda literal
    /// (spec.md §4.4, "At every call site where a variable's binding is a
    /// lambda, prepend the recorded captures").
    var_bindings: std::collections::HashMap<Symbol, usize>,
}

impl ClosureRegistry {
    pub fn entries(&self) -> &[LiftedLambda] {
        &self.lifted
    }

    pub fn lifted_for_span(&self, span: Span) -> Option<&LiftedLambda> {
        self.by_span.get(&span).map(|&i| &self.lifted[i])
    }

    pub fn lambda_for_var(&self, name: Symbol) -> Option<&LiftedLambda> {
        self.var_bindings.get(&name).map(|&i| &self.lifted[i])
    }

    fn register(&mut self, lifted: LiftedLambda, span: Span) -> usize {
        let idx = self.lifted.len();
        self.lifted.push(lifted);
        self.by_span.insert(span, idx);
        idx
    }
}

pub fn lift_closures(program: &mut Program, interner: &mut Interner) -> ClosureRegistry {
    let globals = collect_globals(program, interner);
    let mut reg = ClosureRegistry::default();
    let mut counter = 0u32;
    lift_block(program, &globals, &mut reg, interner, &mut counter);
    reg
}

fn collect_globals(program: &Program, interner: &mut Interner) -> HashSet<Symbol> {
    let mut globals: HashSet<Symbol> = BUILTIN_GLOBALS.iter().map(|s| interner.intern(s)).collect();
    collect_globals_block(program, &mut globals);
    globals
}

fn collect_globals_block(block: &Block, out: &mut HashSet<Symbol>) {
    for stmt in block {
        match &stmt.kind {
            StmtKind::FunctionDef { name, .. } => {
                out.insert(*name);
            }
            StmtKind::StructDef { name, .. }
            | StmtKind::EnumDef { name, .. }
            | StmtKind::TraitDef { name, .. } => {
                out.insert(*name);
            }
            StmtKind::Let { pattern, .. } => {
                out.extend(pattern.bound_names());
            }
            StmtKind::Import { module, items } => {
                out.insert(*module);
                if let Some(items) = items {
                    out.extend(items.iter().copied());
                }
            }
            StmtKind::Export(inner) => collect_globals_block(std::slice::from_ref(inner), out),
            StmtKind::Module { body, .. } => collect_globals_block(body, out),
            _ => {}
        }
    }
}

fn lift_block(
    block: &mut Block,
    globals: &HashSet<Symbol>,
    reg: &mut ClosureRegistry,
    interner: &mut Interner,
    counter: &mut u32,
) {
    for stmt in block.iter_mut() {
        lift_stmt(stmt, globals, reg, interner, counter);
    }
}

fn lift_stmt(
    stmt: &mut Stmt,
    globals: &HashSet<Symbol>,
    reg: &mut ClosureRegistry,
    interner: &mut Interner,
    counter: &mut u32,
) {
    match &mut stmt.kind {
        StmtKind::Expr(e) => lift_expr(e, globals, reg, interner, counter),
        StmtKind::Let { pattern, init, .. } => {
            if let Some(e) = init {
                lift_expr(e, globals, reg, interner, counter);
                if let Pattern::Ident { name, .. } = pattern {
                    if let ExprKind::Lambda { .. } = &e.kind {
                        if let Some(idx) = reg.by_span.get(&e.span).copied() {
                            reg.var_bindings.insert(*name, idx);
                        }
                    }
                }
            }
        }
        StmtKind::Return(value) => {
            if let Some(e) = value {
                lift_expr(e, globals, reg, interner, counter);
            }
        }
        StmtKind::Block(body) => lift_block(body, globals, reg, interner, counter),
        StmtKind::FunctionDef { params, body, .. } => {
            for p in params.iter_mut() {
                if let Some(d) = &mut p.default {
                    lift_expr(d, globals, reg, interner, counter);
                }
            }
            lift_block(body, globals, reg, interner, counter);
        }
        StmtKind::ImplBlock { methods, .. } => lift_block(methods, globals, reg, interner, counter),
        StmtKind::If { cond, then_branch, else_branch } => {
            lift_expr(cond, globals, reg, interner, counter);
            lift_stmt(then_branch, globals, reg, interner, counter);
            if let Some(e) = else_branch {
                lift_stmt(e, globals, reg, interner, counter);
            }
        }
        StmtKind::While { cond, body } => {
            lift_expr(cond, globals, reg, interner, counter);
            lift_stmt(body, globals, reg, interner, counter);
        }
        StmtKind::For { head, body } => {
            match head {
                ForHead::CStyle { init, cond, inc } => {
                    if let Some(s) = init {
                        lift_stmt(s, globals, reg, interner, counter);
                    }
                    if let Some(e) = cond {
                        lift_expr(e, globals, reg, interner, counter);
                    }
                    if let Some(e) = inc {
                        lift_expr(e, globals, reg, interner, counter);
                    }
                }
                ForHead::ForEach { iterable, .. } => {
                    lift_expr(iterable, globals, reg, interner, counter)
                }
            }
            lift_stmt(body, globals, reg, interner, counter);
        }
        StmtKind::Export(inner) => lift_stmt(inner, globals, reg, interner, counter),
        StmtKind::Module { body, .. } => lift_block(body, globals, reg, interner, counter),
        StmtKind::Try { body, catches, finally } => {
            lift_block(body, globals, reg, interner, counter);
            for c in catches.iter_mut() {
                lift_block(&mut c.body, globals, reg, interner, counter);
            }
            if let Some(f) = finally {
                lift_block(f, globals, reg, interner, counter);
            }
        }
        StmtKind::Throw(e) => lift_expr(e, globals, reg, interner, counter),
        StmtKind::Match { scrutinee, cases } => {
            lift_expr(scrutinee, globals, reg, interner, counter);
            for case in cases.iter_mut() {
                if let Some(g) = &mut case.guard {
                    lift_expr(g, globals, reg, interner, counter);
                }
                lift_stmt(&mut case.body, globals, reg, interner, counter);
            }
        }
        StmtKind::Test { body, .. } => lift_block(body, globals, reg, interner, counter),
        StmtKind::Spawn(e) => lift_expr(e, globals, reg, interner, counter),
        _ => {}
    }
}

fn lift_expr(
    expr: &mut Expr,
    globals: &HashSet<Symbol>,
    reg: &mut ClosureRegistry,
    interner: &mut Interner,
    counter: &mut u32,
) {
    if let ExprKind::Lambda { params, body, captures } = &mut expr.kind {
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        let mut bound: HashSet<Symbol> = params.iter().copied().collect();
        collect_free_vars(body, &mut bound, globals, &mut seen, &mut order);
        *captures = order.clone();

        let name = interner.intern(&format!("__lambda_{}", *counter));
        *counter += 1;
        reg.register(
            LiftedLambda {
                name,
                params: params.clone(),
                captures: order,
                body: (**body).clone(),
            },
            expr.span,
        );
    }

    // Recurse to find lambdas (and let-to-lambda bindings, though those
    // only occur at statement level) anywhere else in the tree.
    match &mut expr.kind {
        ExprKind::Assign { value, .. } => lift_expr(value, globals, reg, interner, counter),
        ExprKind::Unary { operand, .. } => lift_expr(operand, globals, reg, interner, counter),
        ExprKind::Binary { left, right, .. } => {
            lift_expr(left, globals, reg, interner, counter);
            lift_expr(right, globals, reg, interner, counter);
        }
        ExprKind::Call { callee, args, .. } => {
            lift_expr(callee, globals, reg, interner, counter);
            for a in args.iter_mut() {
                lift_expr(a, globals, reg, interner, counter);
            }
        }
        ExprKind::MethodCall { receiver, args, .. } => {
            lift_expr(receiver, globals, reg, interner, counter);
            for a in args.iter_mut() {
                lift_expr(a, globals, reg, interner, counter);
            }
        }
        ExprKind::ArrayLit(elems) | ExprKind::Tuple(elems) => {
            for e in elems.iter_mut() {
                lift_expr(e, globals, reg, interner, counter);
            }
        }
        ExprKind::Index { container, index } => {
            lift_expr(container, globals, reg, interner, counter);
            lift_expr(index, globals, reg, interner, counter);
        }
        ExprKind::IndexAssign { container, index, value } => {
            lift_expr(container, globals, reg, interner, counter);
            lift_expr(index, globals, reg, interner, counter);
            lift_expr(value, globals, reg, interner, counter);
        }
        ExprKind::Field { object, .. } => lift_expr(object, globals, reg, interner, counter),
        ExprKind::FieldAssign { object, value, .. } => {
            lift_expr(object, globals, reg, interner, counter);
            lift_expr(value, globals, reg, interner, counter);
        }
        ExprKind::StructInit { fields, .. } => {
            for (_, v) in fields.iter_mut() {
                lift_expr(v, globals, reg, interner, counter);
            }
        }
        ExprKind::Range { start, end, .. } => {
            lift_expr(start, globals, reg, interner, counter);
            lift_expr(end, globals, reg, interner, counter);
        }
        ExprKind::TupleIndex { tuple, .. } => lift_expr(tuple, globals, reg, interner, counter),
        ExprKind::MapLit { keys, values } => {
            for k in keys.iter_mut() {
                lift_expr(k, globals, reg, interner, counter);
            }
            for v in values.iter_mut() {
                lift_expr(v, globals, reg, interner, counter);
            }
        }
        ExprKind::If { cond, then_branch, else_branch } => {
            lift_expr(cond, globals, reg, interner, counter);
            lift_expr(then_branch, globals, reg, interner, counter);
            if let Some(e) = else_branch {
                lift_expr(e, globals, reg, interner, counter);
            }
        }
        ExprKind::Ternary { cond, then_branch, else_branch } => {
            lift_expr(cond, globals, reg, interner, counter);
            lift_expr(then_branch, globals, reg, interner, counter);
            lift_expr(else_branch, globals, reg, interner, counter);
        }
        ExprKind::Match { scrutinee, arms } => {
            lift_expr(scrutinee, globals, reg, interner, counter);
            for arm in arms.iter_mut() {
                lift_expr(&mut arm.body, globals, reg, interner, counter);
            }
        }
        ExprKind::Interpolation(segments) => {
            for seg in segments.iter_mut() {
                if let InterpSegment::Expr(e) = seg {
                    lift_expr(e, globals, reg, interner, counter);
                }
            }
        }
        ExprKind::Lambda { body, .. } => lift_expr(body, globals, reg, interner, counter),
        ExprKind::Try(inner)
        | ExprKind::Some(inner)
        | ExprKind::Ok(inner)
        | ExprKind::Err(inner)
        | ExprKind::Await(inner) => lift_expr(inner, globals, reg, interner, counter),
        ExprKind::Pipeline(stages) => {
            for s in stages.iter_mut() {
                lift_expr(s, globals, reg, interner, counter);
            }
        }
        _ => {}
    }
}

/// Collects the free identifiers of `expr` into `order` (first-appearance
/// order, deduplicated via `seen`), given the set of names already bound
/// in the current lambda (starts as its own parameters) and the global
/// names that never count as captures.
fn collect_free_vars(
    expr: &Expr,
    bound: &mut HashSet<Symbol>,
    globals: &HashSet<Symbol>,
    seen: &mut HashSet<Symbol>,
    order: &mut Vec<Symbol>,
) {
    match &expr.kind {
        ExprKind::Ident(name) => {
            if !bound.contains(name) && !globals.contains(name) && seen.insert(*name) {
                order.push(*name);
            }
        }
        ExprKind::Assign { name, value } => {
            if !bound.contains(name) && !globals.contains(name) && seen.insert(*name) {
                order.push(*name);
            }
            collect_free_vars(value, bound, globals, seen, order);
        }
        ExprKind::Unary { operand, .. } => collect_free_vars(operand, bound, globals, seen, order),
        ExprKind::Binary { left, right, .. } => {
            collect_free_vars(left, bound, globals, seen, order);
            collect_free_vars(right, bound, globals, seen, order);
        }
        ExprKind::Call { callee, args, .. } => {
            collect_free_vars(callee, bound, globals, seen, order);
            for a in args {
                collect_free_vars(a, bound, globals, seen, order);
            }
        }
        ExprKind::MethodCall { receiver, args, .. } => {
            collect_free_vars(receiver, bound, globals, seen, order);
            for a in args {
                collect_free_vars(a, bound, globals, seen, order);
            }
        }
        ExprKind::ArrayLit(elems) | ExprKind::Tuple(elems) => {
            for e in elems {
                collect_free_vars(e, bound, globals, seen, order);
            }
        }
        ExprKind::Index { container, index } => {
            collect_free_vars(container, bound, globals, seen, order);
            collect_free_vars(index, bound, globals, seen, order);
        }
        ExprKind::IndexAssign { container, index, value } => {
            collect_free_vars(container, bound, globals, seen, order);
            collect_free_vars(index, bound, globals, seen, order);
            collect_free_vars(value, bound, globals, seen, order);
        }
        ExprKind::Field { object, .. } => collect_free_vars(object, bound, globals, seen, order),
        ExprKind::FieldAssign { object, value, .. } => {
            collect_free_vars(object, bound, globals, seen, order);
            collect_free_vars(value, bound, globals, seen, order);
        }
        ExprKind::StructInit { fields, .. } => {
            for (_, v) in fields {
                collect_free_vars(v, bound, globals, seen, order);
            }
        }
        ExprKind::Range { start, end, .. } => {
            collect_free_vars(start, bound, globals, seen, order);
            collect_free_vars(end, bound, globals, seen, order);
        }
        ExprKind::TupleIndex { tuple, .. } => collect_free_vars(tuple, bound, globals, seen, order),
        ExprKind::MapLit { keys, values } => {
            for k in keys {
                collect_free_vars(k, bound, globals, seen, order);
            }
            for v in values {
                collect_free_vars(v, bound, globals, seen, order);
            }
        }
        ExprKind::If { cond, then_branch, else_branch } => {
            collect_free_vars(cond, bound, globals, seen, order);
            collect_free_vars(then_branch, bound, globals, seen, order);
            if let Some(e) = else_branch {
                collect_free_vars(e, bound, globals, seen, order);
            }
        }
        ExprKind::Ternary { cond, then_branch, else_branch } => {
            collect_free_vars(cond, bound, globals, seen, order);
            collect_free_vars(then_branch, bound, globals, seen, order);
            collect_free_vars(else_branch, bound, globals, seen, order);
        }
        ExprKind::Match { scrutinee, arms } => {
            collect_free_vars(scrutinee, bound, globals, seen, order);
            for arm in arms {
                let mut arm_bound = bound.clone();
                arm_bound.extend(arm.pattern.bound_names());
                collect_free_vars(&arm.body, &mut arm_bound, globals, seen, order);
            }
        }
        ExprKind::Interpolation(segments) => {
            for seg in segments {
                if let InterpSegment::Expr(e) = seg {
                    collect_free_vars(e, bound, globals, seen, order);
                }
            }
        }
        ExprKind::Lambda { params, body, .. } => {
            let mut inner_bound = bound.clone();
            inner_bound.extend(params.iter().copied());
            collect_free_vars(body, &mut inner_bound, globals, seen, order);
        }
        ExprKind::Try(inner)
        | ExprKind::Some(inner)
        | ExprKind::Ok(inner)
        | ExprKind::Err(inner)
        | ExprKind::Await(inner) => collect_free_vars(inner, bound, globals, seen, order),
        ExprKind::Pipeline(stages) => {
            for s in stages {
                collect_free_vars(s, bound, globals, seen, order);
            }
        }
        ExprKind::IntLit(_)
        | ExprKind::FloatLit(_)
        | ExprKind::StrLit(_)
        | ExprKind::CharLit(_)
        | ExprKind::BoolLit(_)
        | ExprKind::None
        | ExprKind::OptionalTypeMarker(_)
        | ExprKind::UnionTypeMarker(_)
        | ExprKind::PatternExpr(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wync_lang::parse;

    #[test]
    fn lambda_captures_enclosing_variable() {
        let (mut prog, mut interner, _errs, had_error) =
            parse("fn main() -> int { let k = 10; let add = |x| x + k; return add(5) }");
        assert!(!had_error);
        let reg = lift_closures(&mut prog, &mut interner);
        assert_eq!(reg.entries().len(), 1);
        let lifted = &reg.entries()[0];
        assert_eq!(lifted.captures.len(), 1);
        assert_eq!(interner.resolve(lifted.captures[0]), "k");
        assert_eq!(interner.resolve(lifted.params[0]), "x");
    }

    #[test]
    fn call_through_bound_variable_resolves_to_lifted_lambda() {
        let (mut prog, mut interner, _errs, had_error) =
            parse("fn main() -> int { let k = 10; let add = |x| x + k; return add(5) }");
        assert!(!had_error);
        let reg = lift_closures(&mut prog, &mut interner);
        let add_sym = interner.lookup("add").unwrap();
        let lifted = reg.lambda_for_var(add_sym).expect("add should resolve to a lifted lambda");
        assert_eq!(lifted.captures.len(), 1);
    }

    #[test]
    fn non_capturing_lambda_has_no_captures() {
        let (mut prog, mut interner, _errs, had_error) =
            parse("fn main() -> int { let sq = |x| x * x; return sq(3) }");
        assert!(!had_error);
        let reg = lift_closures(&mut prog, &mut interner);
        assert!(reg.entries()[0].captures.is_empty());
    }
}
