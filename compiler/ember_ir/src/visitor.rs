//! AST Visitor Pattern
//!
//! Generic traversal over the arena-allocated AST. The visitor may mutate
//! its own state; the AST stays immutable. Visiting can fail, and the first
//! error stops the walk.
//!
//! Default implementations call the `walk_*` functions, which visit children
//! in source order. Override `visit_*` to act on specific nodes and call the
//! matching `walk_*` to keep descending.

use ember_stack::ensure_sufficient_stack;

use crate::ast::{AstArena, ExprKind, Module, StmtKind};
use crate::{ExprId, StmtId};

/// AST Visitor trait.
pub trait Visitor<'ast> {
    type Error;

    /// Visit a whole module.
    fn visit_module(&mut self, module: &'ast Module) -> Result<(), Self::Error> {
        walk_module(self, module)
    }

    /// Visit a statement by ID.
    fn visit_stmt(&mut self, id: StmtId, arena: &'ast AstArena) -> Result<(), Self::Error> {
        walk_stmt(self, id, arena)
    }

    /// Visit an expression by ID.
    fn visit_expr(&mut self, id: ExprId, arena: &'ast AstArena) -> Result<(), Self::Error> {
        walk_expr(self, id, arena)
    }
}

/// Visit every top-level statement of a module.
pub fn walk_module<'ast, V: Visitor<'ast> + ?Sized>(
    visitor: &mut V,
    module: &'ast Module,
) -> Result<(), V::Error> {
    for &item in &module.items {
        visitor.visit_stmt(item, &module.arena)?;
    }
    Ok(())
}

/// Visit the children of a statement.
pub fn walk_stmt<'ast, V: Visitor<'ast> + ?Sized>(
    visitor: &mut V,
    id: StmtId,
    arena: &'ast AstArena,
) -> Result<(), V::Error> {
    ensure_sufficient_stack(|| match arena.stmt(id) {
        StmtKind::Block(stmts) => {
            for &stmt in stmts {
                visitor.visit_stmt(stmt, arena)?;
            }
            Ok(())
        }
        StmtKind::Function(function) => visitor.visit_stmt(function.body, arena),
        StmtKind::Struct(_) | StmtKind::Import(_) | StmtKind::Break | StmtKind::Continue => Ok(()),
        StmtKind::Let(decl) => visitor.visit_expr(decl.init, arena),
        StmtKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            visitor.visit_expr(*condition, arena)?;
            visitor.visit_stmt(*then_branch, arena)?;
            if let Some(else_branch) = else_branch {
                visitor.visit_stmt(*else_branch, arena)?;
            }
            Ok(())
        }
        StmtKind::While { condition, body } => {
            visitor.visit_expr(*condition, arena)?;
            visitor.visit_stmt(*body, arena)
        }
        StmtKind::For {
            init,
            condition,
            update,
            body,
        } => {
            if let Some(init) = init {
                visitor.visit_stmt(*init, arena)?;
            }
            visitor.visit_expr(*condition, arena)?;
            if let Some(update) = update {
                visitor.visit_expr(*update, arena)?;
            }
            visitor.visit_stmt(*body, arena)
        }
        StmtKind::Return(value) => match value {
            Some(value) => visitor.visit_expr(*value, arena),
            None => Ok(()),
        },
        StmtKind::Expr(expr) => visitor.visit_expr(*expr, arena),
    })
}

/// Visit the children of an expression.
pub fn walk_expr<'ast, V: Visitor<'ast> + ?Sized>(
    visitor: &mut V,
    id: ExprId,
    arena: &'ast AstArena,
) -> Result<(), V::Error> {
    ensure_sufficient_stack(|| match arena.expr(id) {
        ExprKind::Ident(_)
        | ExprKind::Int(_)
        | ExprKind::Float(_)
        | ExprKind::Bool(_)
        | ExprKind::Char(_)
        | ExprKind::Str(_) => Ok(()),
        ExprKind::Array { elements, .. } => {
            for &element in elements {
                visitor.visit_expr(element, arena)?;
            }
            Ok(())
        }
        ExprKind::Struct { fields, .. } => {
            for field in fields {
                visitor.visit_expr(field.value, arena)?;
            }
            Ok(())
        }
        ExprKind::Infix { left, right, .. } => {
            visitor.visit_expr(*left, arena)?;
            visitor.visit_expr(*right, arena)
        }
        ExprKind::Prefix { operand, .. } | ExprKind::Postfix { operand, .. } => {
            visitor.visit_expr(*operand, arena)
        }
        ExprKind::Call { args, .. } => {
            for &arg in args {
                visitor.visit_expr(arg, arena)?;
            }
            Ok(())
        }
        ExprKind::Index { base, index } => {
            visitor.visit_expr(*base, arena)?;
            visitor.visit_expr(*index, arena)
        }
        ExprKind::Member { base, .. } | ExprKind::PointerMember { base, .. } => {
            visitor.visit_expr(*base, arena)
        }
        ExprKind::Assign { target, value } => {
            visitor.visit_expr(*target, arena)?;
            visitor.visit_expr(*value, arena)
        }
    })
}
