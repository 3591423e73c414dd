//! `spawn` statement analysis (spec.md §5 "Concurrency & resource model").
//!
//! The runtime's `wyn_spawn` takes a single `WynValue (*)(void *)` trampoline
//! and an opaque `void *` argument (`codegen_c::runtime::C_RUNTIME`). A
//! `spawn callee(a, b)` statement has neither shape: its callee returns
//! whatever the checker inferred, and its arguments are ordinary typed
//! expressions. This pass assigns each `spawn` site a synthetic wrapper
//! function name; `codegen_c` emits the wrapper (packing `a, b` into a
//! heap-allocated `WynValue[]` and unpacking them on the other side) and
//! rewrites the statement to call `wyn_spawn` with it.
//!
//! Only spawns of a directly-resolved call (`spawn foo(...)`, not
//! `spawn some_closure_var(...)`) get a wrapper; the latter is rare enough
//! in practice that it keeps running the old synchronous-inline fallback.

use std::collections::HashMap;

use wync_base::{Span, Symbol};
use wync_lang::ast::{ExprKind, Program, Stmt, StmtKind, TypeId};

/// One `spawn` call site with a statically-known callee.
#[derive(Debug, Clone)]
pub struct SpawnSite {
    /// Name of the generated `WynValue(*)(void*)` wrapper, e.g. `__spawn_3`.
    pub wrapper_name: String,
    /// The resolved (possibly mangled) C name of the spawned function.
    pub target: Symbol,
    pub arg_types: Vec<Option<TypeId>>,
    pub return_type: Option<TypeId>,
}

#[derive(Debug, Default)]
pub struct SpawnRegistry {
    sites: Vec<SpawnSite>,
    by_span: HashMap<Span, usize>,
}

impl SpawnRegistry {
    pub fn entries(&self) -> &[SpawnSite] {
        &self.sites
    }

    pub fn site_for_span(&self, span: Span) -> Option<&SpawnSite> {
        self.by_span.get(&span).map(|&i| &self.sites[i])
    }
}

/// Walks the whole program once, recording a [`SpawnSite`] for every
/// `spawn` statement whose callee the checker resolved directly.
pub fn find_spawns(program: &Program) -> SpawnRegistry {
    let mut reg = SpawnRegistry::default();
    walk_block(program, &mut reg);
    reg
}

fn walk_block(block: &[Stmt], reg: &mut SpawnRegistry) {
    for stmt in block {
        walk_stmt(stmt, reg);
    }
}

fn walk_stmt(stmt: &Stmt, reg: &mut SpawnRegistry) {
    match &stmt.kind {
        StmtKind::Spawn(e) => {
            if let ExprKind::Call { args, resolved: Some(rc), .. } = &e.kind {
                let idx = reg.sites.len();
                reg.sites.push(SpawnSite {
                    wrapper_name: format!("__spawn_{}", idx),
                    target: rc.target,
                    arg_types: args.iter().map(|a| a.resolved_type).collect(),
                    return_type: e.resolved_type,
                });
                reg.by_span.insert(stmt.span, idx);
            }
        }
        StmtKind::Block(body) => walk_block(body, reg),
        StmtKind::If { then_branch, else_branch, .. } => {
            walk_stmt(then_branch, reg);
            if let Some(e) = else_branch {
                walk_stmt(e, reg);
            }
        }
        StmtKind::While { body, .. } => walk_stmt(body, reg),
        StmtKind::For { head, body, .. } => {
            if let wync_lang::ast::ForHead::CStyle { init, .. } = head {
                if let Some(s) = init {
                    walk_stmt(s, reg);
                }
            }
            walk_stmt(body, reg);
        }
        StmtKind::Try { body, catches, finally } => {
            walk_block(body, reg);
            for c in catches {
                walk_block(&c.body, reg);
            }
            if let Some(f) = finally {
                walk_block(f, reg);
            }
        }
        StmtKind::Match { cases, .. } => {
            for case in cases {
                walk_stmt(&case.body, reg);
            }
        }
        StmtKind::FunctionDef { body, .. } => walk_block(body, reg),
        StmtKind::ImplBlock { methods, .. } => walk_block(methods, reg),
        StmtKind::Module { body, .. } => walk_block(body, reg),
        StmtKind::Export(inner) => walk_stmt(inner, reg),
        StmtKind::Test { body, .. } => walk_block(body, reg),
        _ => {}
    }
}
