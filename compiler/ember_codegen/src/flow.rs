//! Definite-return analysis.

use ember_ir::{AstArena, StmtId, StmtKind};
use ember_stack::ensure_sufficient_stack;

/// Whether executing `id` always ends in a `return`.
///
/// A block returns if any of its statements does; an `if` only when both
/// branches do; a loop or function when its body does.
pub fn returns(id: StmtId, arena: &AstArena) -> bool {
    ensure_sufficient_stack(|| match arena.stmt(id) {
        StmtKind::Return(_) => true,
        StmtKind::Block(stmts) => stmts.iter().any(|&stmt| returns(stmt, arena)),
        StmtKind::If {
            then_branch,
            else_branch,
            ..
        } => else_branch.is_some_and(|else_branch| {
            returns(*then_branch, arena) && returns(else_branch, arena)
        }),
        StmtKind::While { body, .. } | StmtKind::For { body, .. } => returns(*body, arena),
        StmtKind::Function(function) => returns(function.body, arena),
        StmtKind::Struct(_)
        | StmtKind::Import(_)
        | StmtKind::Let(_)
        | StmtKind::Break
        | StmtKind::Continue
        | StmtKind::Expr(_) => false,
    })
}

/// Whether control can never reach the end of `id`.
///
/// Like [`returns`], except that a loop never counts: its condition may
/// fail before the body's `return` runs.
pub fn never_falls_through(id: StmtId, arena: &AstArena) -> bool {
    ensure_sufficient_stack(|| match arena.stmt(id) {
        StmtKind::Return(_) => true,
        StmtKind::Block(stmts) => stmts.iter().any(|&stmt| never_falls_through(stmt, arena)),
        StmtKind::If {
            then_branch,
            else_branch,
            ..
        } => else_branch.is_some_and(|else_branch| {
            never_falls_through(*then_branch, arena) && never_falls_through(else_branch, arena)
        }),
        StmtKind::While { .. }
        | StmtKind::For { .. }
        | StmtKind::Function(_)
        | StmtKind::Struct(_)
        | StmtKind::Import(_)
        | StmtKind::Let(_)
        | StmtKind::Break
        | StmtKind::Continue
        | StmtKind::Expr(_) => false,
    })
}
