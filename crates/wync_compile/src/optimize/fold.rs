//! Constant folding (spec.md §4.6 driver step 6, "fold binary expressions
//! over two integer literals into a single literal").
//!
//! Operates on the already-checked AST in place. Only integer-literal
//! arithmetic is folded; anything involving a variable, a float, or a
//! non-arithmetic operator is left untouched for the emitter to lower
//! normally.

use wync_lang::ast::{Block, Expr, ExprKind, ForHead, MatchArm, Stmt, StmtKind};
use wync_lang::TokenKind;

pub fn fold_program(program: &mut Block) {
    fold_block(program);
}

fn fold_block(block: &mut Block) {
    for stmt in block.iter_mut() {
        fold_stmt(stmt);
    }
}

fn fold_stmt(stmt: &mut Stmt) {
    match &mut stmt.kind {
        StmtKind::Expr(e) => fold_expr(e),
        StmtKind::Let { init, .. } => {
            if let Some(e) = init {
                fold_expr(e);
            }
        }
        StmtKind::Return(value) => {
            if let Some(e) = value {
                fold_expr(e);
            }
        }
        StmtKind::Block(body) => fold_block(body),
        StmtKind::FunctionDef { params, body, .. } => {
            for p in params.iter_mut() {
                if let Some(d) = &mut p.default {
                    fold_expr(d);
                }
            }
            fold_block(body);
        }
        StmtKind::ImplBlock { methods, .. } => fold_block(methods),
        StmtKind::If { cond, then_branch, else_branch } => {
            fold_expr(cond);
            fold_stmt(then_branch);
            if let Some(e) = else_branch {
                fold_stmt(e);
            }
        }
        StmtKind::While { cond, body } => {
            fold_expr(cond);
            fold_stmt(body);
        }
        StmtKind::For { head, body } => {
            match head {
                ForHead::CStyle { init, cond, inc } => {
                    if let Some(s) = init {
                        fold_stmt(s);
                    }
                    if let Some(e) = cond {
                        fold_expr(e);
                    }
                    if let Some(e) = inc {
                        fold_expr(e);
                    }
                }
                ForHead::ForEach { iterable, .. } => fold_expr(iterable),
            }
            fold_stmt(body);
        }
        StmtKind::Export(inner) => fold_stmt(inner),
        StmtKind::Module { body, .. } => fold_block(body),
        StmtKind::Try { body, catches, finally } => {
            fold_block(body);
            for c in catches.iter_mut() {
                fold_block(&mut c.body);
            }
            if let Some(f) = finally {
                fold_block(f);
            }
        }
        StmtKind::Throw(e) => fold_expr(e),
        StmtKind::Match { scrutinee, cases } => {
            fold_expr(scrutinee);
            for case in cases.iter_mut() {
                if let Some(g) = &mut case.guard {
                    fold_expr(g);
                }
                fold_stmt(&mut case.body);
            }
        }
        StmtKind::Test { body, .. } => fold_block(body),
        StmtKind::Spawn(e) => fold_expr(e),
        StmtKind::StructDef { .. }
        | StmtKind::EnumDef { .. }
        | StmtKind::TraitDef { .. }
        | StmtKind::Break
        | StmtKind::Continue
        | StmtKind::Import { .. }
        | StmtKind::TypeAlias { .. }
        | StmtKind::Extern { .. }
        | StmtKind::MacroDef { .. } => {}
    }
}

fn fold_expr(expr: &mut Expr) {
    match &mut expr.kind {
        ExprKind::Binary { op, left, right } => {
            fold_expr(left);
            fold_expr(right);
            if let (ExprKind::IntLit(a), ExprKind::IntLit(b)) = (&left.kind, &right.kind) {
                if let Some(folded) = fold_int_binary(op.kind, *a, *b) {
                    expr.kind = ExprKind::IntLit(folded);
                }
            }
        }
        ExprKind::Assign { value, .. } => fold_expr(value),
        ExprKind::Unary { operand, .. } => fold_expr(operand),
        ExprKind::Call { callee, args, .. } => {
            fold_expr(callee);
            for a in args.iter_mut() {
                fold_expr(a);
            }
        }
        ExprKind::MethodCall { receiver, args, .. } => {
            fold_expr(receiver);
            for a in args.iter_mut() {
                fold_expr(a);
            }
        }
        ExprKind::ArrayLit(elems) | ExprKind::Tuple(elems) => {
            for e in elems.iter_mut() {
                fold_expr(e);
            }
        }
        ExprKind::Index { container, index } => {
            fold_expr(container);
            fold_expr(index);
        }
        ExprKind::IndexAssign { container, index, value } => {
            fold_expr(container);
            fold_expr(index);
            fold_expr(value);
        }
        ExprKind::Field { object, .. } => fold_expr(object),
        ExprKind::FieldAssign { object, value, .. } => {
            fold_expr(object);
            fold_expr(value);
        }
        ExprKind::StructInit { fields, .. } => {
            for (_, v) in fields.iter_mut() {
                fold_expr(v);
            }
        }
        ExprKind::Range { start, end, .. } => {
            fold_expr(start);
            fold_expr(end);
        }
        ExprKind::TupleIndex { tuple, .. } => fold_expr(tuple),
        ExprKind::MapLit { keys, values } => {
            for k in keys.iter_mut() {
                fold_expr(k);
            }
            for v in values.iter_mut() {
                fold_expr(v);
            }
        }
        ExprKind::If { cond, then_branch, else_branch } => {
            fold_expr(cond);
            fold_expr(then_branch);
            if let Some(e) = else_branch {
                fold_expr(e);
            }
        }
        ExprKind::Ternary { cond, then_branch, else_branch } => {
            fold_expr(cond);
            fold_expr(then_branch);
            fold_expr(else_branch);
        }
        ExprKind::Match { scrutinee, arms } => {
            fold_expr(scrutinee);
            for arm in arms.iter_mut() as std::slice::IterMut<'_, MatchArm> {
                fold_expr(&mut arm.body);
            }
        }
        ExprKind::Interpolation(segments) => {
            for seg in segments.iter_mut() {
                if let wync_lang::ast::expr::InterpSegment::Expr(e) = seg {
                    fold_expr(e);
                }
            }
        }
        ExprKind::Lambda { body, .. } => fold_expr(body),
        ExprKind::Try(inner)
        | ExprKind::Some(inner)
        | ExprKind::Ok(inner)
        | ExprKind::Err(inner)
        | ExprKind::Await(inner) => fold_expr(inner),
        ExprKind::Pipeline(stages) => {
            for s in stages.iter_mut() {
                fold_expr(s);
            }
        }
        ExprKind::IntLit(_)
        | ExprKind::FloatLit(_)
        | ExprKind::StrLit(_)
        | ExprKind::CharLit(_)
        | ExprKind::BoolLit(_)
        | ExprKind::Ident(_)
        | ExprKind::None
        | ExprKind::OptionalTypeMarker(_)
        | ExprKind::UnionTypeMarker(_)
        | ExprKind::PatternExpr(_) => {}
    }
}

fn fold_int_binary(op: TokenKind, a: i64, b: i64) -> Option<i64> {
    use TokenKind::*;
    match op {
        Plus => a.checked_add(b),
        Minus => a.checked_sub(b),
        Star => a.checked_mul(b),
        Slash if b != 0 => a.checked_div(b),
        Percent if b != 0 => a.checked_rem(b),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wync_lang::parse;

    #[test]
    fn folds_integer_addition() {
        let (mut prog, _interner, _errs, had_error) = parse("let x = 1 + 2;");
        assert!(!had_error);
        fold_program(&mut prog);
        let StmtKind::Let { init: Some(e), .. } = &prog[0].kind else { panic!() };
        assert!(matches!(e.kind, ExprKind::IntLit(3)));
    }

    #[test]
    fn does_not_fold_division_by_zero() {
        let (mut prog, _interner, _errs, had_error) = parse("let x = 1 / 0;");
        assert!(!had_error);
        fold_program(&mut prog);
        let StmtKind::Let { init: Some(e), .. } = &prog[0].kind else { panic!() };
        assert!(matches!(e.kind, ExprKind::Binary { .. }));
    }
}
