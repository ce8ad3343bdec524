//! Programmatic AST construction.
//!
//! `AstBuilder` is the construction API the parser drives; tests and
//! embedders use it to build modules without source text.

use crate::ast::{
    AstArena, BinaryOp, ExprKind, FieldDecl, FieldInit, FunctionDecl, ImportDecl, LetDecl, Module,
    Param, PostfixOp, PrefixOp, StmtKind, StructDecl,
};
use crate::{ExprId, StmtId, TypeRef};

/// Builds one [`Module`].
pub struct AstBuilder {
    module: Module,
}

impl AstBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        AstBuilder {
            module: Module::new(name),
        }
    }

    pub fn arena(&self) -> &AstArena {
        &self.module.arena
    }

    /// Append a statement to the module's top level.
    pub fn item(&mut self, stmt: StmtId) -> StmtId {
        self.module.items.push(stmt);
        stmt
    }

    pub fn finish(self) -> Module {
        self.module
    }

    // Expressions

    pub fn expr(&mut self, kind: ExprKind) -> ExprId {
        self.module.arena.alloc_expr(kind)
    }

    pub fn ident(&mut self, name: &str) -> ExprId {
        self.expr(ExprKind::Ident(name.to_string()))
    }

    pub fn int(&mut self, value: i64) -> ExprId {
        self.expr(ExprKind::Int(value))
    }

    pub fn float(&mut self, value: f64) -> ExprId {
        self.expr(ExprKind::Float(value))
    }

    pub fn bool(&mut self, value: bool) -> ExprId {
        self.expr(ExprKind::Bool(value))
    }

    pub fn char(&mut self, value: char) -> ExprId {
        self.expr(ExprKind::Char(value))
    }

    pub fn string(&mut self, value: &str) -> ExprId {
        self.expr(ExprKind::Str(value.to_string()))
    }

    pub fn array(&mut self, elements: Vec<ExprId>, element_type: Option<TypeRef>) -> ExprId {
        self.expr(ExprKind::Array {
            elements,
            element_type,
        })
    }

    pub fn struct_lit(&mut self, name: &str, fields: Vec<(&str, ExprId)>) -> ExprId {
        let fields = fields
            .into_iter()
            .map(|(field, value)| FieldInit {
                name: field.to_string(),
                value,
            })
            .collect();
        self.expr(ExprKind::Struct {
            name: name.to_string(),
            fields,
        })
    }

    pub fn infix(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> ExprId {
        self.expr(ExprKind::Infix { op, left, right })
    }

    pub fn prefix(&mut self, op: PrefixOp, operand: ExprId) -> ExprId {
        self.expr(ExprKind::Prefix { op, operand })
    }

    pub fn postfix(&mut self, op: PostfixOp, operand: ExprId) -> ExprId {
        self.expr(ExprKind::Postfix { op, operand })
    }

    pub fn call(&mut self, callee: &str, args: Vec<ExprId>) -> ExprId {
        self.expr(ExprKind::Call {
            callee: callee.to_string(),
            args,
        })
    }

    pub fn index(&mut self, base: ExprId, index: ExprId) -> ExprId {
        self.expr(ExprKind::Index { base, index })
    }

    pub fn member(&mut self, base: ExprId, member: &str) -> ExprId {
        self.expr(ExprKind::Member {
            base,
            member: member.to_string(),
        })
    }

    pub fn pointer_member(&mut self, base: ExprId, member: &str) -> ExprId {
        self.expr(ExprKind::PointerMember {
            base,
            member: member.to_string(),
        })
    }

    pub fn assign(&mut self, target: ExprId, value: ExprId) -> ExprId {
        self.expr(ExprKind::Assign { target, value })
    }

    // Statements

    pub fn stmt(&mut self, kind: StmtKind) -> StmtId {
        self.module.arena.alloc_stmt(kind)
    }

    pub fn block(&mut self, stmts: Vec<StmtId>) -> StmtId {
        self.stmt(StmtKind::Block(stmts))
    }

    pub fn expr_stmt(&mut self, expr: ExprId) -> StmtId {
        self.stmt(StmtKind::Expr(expr))
    }

    pub fn ret(&mut self, value: Option<ExprId>) -> StmtId {
        self.stmt(StmtKind::Return(value))
    }

    pub fn brk(&mut self) -> StmtId {
        self.stmt(StmtKind::Break)
    }

    pub fn cont(&mut self) -> StmtId {
        self.stmt(StmtKind::Continue)
    }

    pub fn let_stmt(&mut self, name: &str, ty: Option<TypeRef>, init: ExprId) -> StmtId {
        self.stmt(StmtKind::Let(LetDecl {
            name: name.to_string(),
            ty,
            init,
            exported: false,
        }))
    }

    pub fn export_let(&mut self, name: &str, ty: Option<TypeRef>, init: ExprId) -> StmtId {
        self.stmt(StmtKind::Let(LetDecl {
            name: name.to_string(),
            ty,
            init,
            exported: true,
        }))
    }

    pub fn if_stmt(
        &mut self,
        condition: ExprId,
        then_branch: StmtId,
        else_branch: Option<StmtId>,
    ) -> StmtId {
        self.stmt(StmtKind::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    pub fn while_stmt(&mut self, condition: ExprId, body: StmtId) -> StmtId {
        self.stmt(StmtKind::While { condition, body })
    }

    pub fn for_stmt(
        &mut self,
        init: Option<StmtId>,
        condition: ExprId,
        update: Option<ExprId>,
        body: StmtId,
    ) -> StmtId {
        self.stmt(StmtKind::For {
            init,
            condition,
            update,
            body,
        })
    }

    /// Declare a function; `params` are `(name, type)` pairs.
    pub fn function(
        &mut self,
        name: &str,
        params: &[(&str, TypeRef)],
        result: TypeRef,
        body: StmtId,
        exported: bool,
    ) -> StmtId {
        let params = params
            .iter()
            .map(|(param, ty)| Param {
                name: (*param).to_string(),
                ty: ty.clone(),
            })
            .collect();
        self.stmt(StmtKind::Function(FunctionDecl {
            name: name.to_string(),
            params,
            result,
            body,
            exported,
        }))
    }

    pub fn struct_decl(&mut self, name: &str, fields: &[(&str, TypeRef)], exported: bool) -> StmtId {
        let fields = fields
            .iter()
            .map(|(field, ty)| FieldDecl {
                name: (*field).to_string(),
                ty: ty.clone(),
            })
            .collect();
        self.stmt(StmtKind::Struct(StructDecl {
            name: name.to_string(),
            fields,
            exported,
        }))
    }

    pub fn import(&mut self, module: &str, names: &[&str]) -> StmtId {
        self.stmt(StmtKind::Import(ImportDecl {
            module: module.to_string(),
            names: names.iter().map(|name| (*name).to_string()).collect(),
        }))
    }
}

#[cfg(test)]
mod tests;
