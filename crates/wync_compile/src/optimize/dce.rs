//! Dead-code elimination (spec.md §4.6 driver step 6, "remove statements
//! whose only effect is a standalone literal").
//!
//! A narrow pass: it only drops expression-statements whose expression is a
//! bare literal (the literal is computed and discarded, so it has no
//! observable effect). It recurses into every nested block so a dead
//! literal statement buried in an `if` arm or loop body is also removed.

use wync_lang::ast::{Block, ExprKind, ForHead, Stmt, StmtKind};

pub fn eliminate_dead_code(program: &mut Block) {
    dce_block(program);
}

fn is_standalone_literal(stmt: &Stmt) -> bool {
    matches!(
        &stmt.kind,
        StmtKind::Expr(e) if matches!(
            e.kind,
            ExprKind::IntLit(_)
                | ExprKind::FloatLit(_)
                | ExprKind::StrLit(_)
                | ExprKind::CharLit(_)
                | ExprKind::BoolLit(_)
        )
    )
}

fn dce_block(block: &mut Block) {
    block.retain(|s| !is_standalone_literal(s));
    for stmt in block.iter_mut() {
        dce_stmt(stmt);
    }
}

fn dce_stmt(stmt: &mut Stmt) {
    match &mut stmt.kind {
        StmtKind::Block(body) => dce_block(body),
        StmtKind::FunctionDef { body, .. } => dce_block(body),
        StmtKind::ImplBlock { methods, .. } => dce_block(methods),
        StmtKind::If { then_branch, else_branch, .. } => {
            dce_stmt(then_branch);
            if let Some(e) = else_branch {
                dce_stmt(e);
            }
        }
        StmtKind::While { body, .. } => dce_stmt(body),
        StmtKind::For { head, body } => {
            if let ForHead::CStyle { init: Some(s), .. } = head {
                dce_stmt(s);
            }
            dce_stmt(body);
        }
        StmtKind::Export(inner) => dce_stmt(inner),
        StmtKind::Module { body, .. } => dce_block(body),
        StmtKind::Try { body, catches, finally } => {
            dce_block(body);
            for c in catches.iter_mut() {
                dce_block(&mut c.body);
            }
            if let Some(f) = finally {
                dce_block(f);
            }
        }
        StmtKind::Match { cases, .. } => {
            for case in cases.iter_mut() {
                dce_stmt(&mut case.body);
            }
        }
        StmtKind::Test { body, .. } => dce_block(body),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wync_lang::parse;

    #[test]
    fn removes_standalone_literal_statements() {
        let (mut prog, _interner, _errs, had_error) =
            parse("fn main() -> int { 5; print(\"hi\"); return 0 }");
        assert!(!had_error);
        eliminate_dead_code(&mut prog);
        let StmtKind::FunctionDef { body, .. } = &prog[0].kind else { panic!() };
        assert_eq!(body.len(), 2);
    }
}
