//! AST node types.
//!
//! The tree is flat: a [`Module`] owns an [`AstArena`] holding every
//! statement and expression, and nodes refer to children by ID. Both kind
//! enums are closed so every traversal site matches exhaustively.

use crate::{ExprId, StmtId, TypeRef};

/// Infix operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl BinaryOp {
    /// Comparison operators produce a boolean regardless of operand lanes.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq
                | BinaryOp::NotEq
                | BinaryOp::Lt
                | BinaryOp::LtEq
                | BinaryOp::Gt
                | BinaryOp::GtEq
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    /// Operators defined only on the integer lane.
    pub fn is_integer_only(self) -> bool {
        matches!(
            self,
            BinaryOp::Rem
                | BinaryOp::BitAnd
                | BinaryOp::BitOr
                | BinaryOp::BitXor
                | BinaryOp::Shl
                | BinaryOp::Shr
        )
    }

    pub fn as_symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
        }
    }
}

/// Prefix operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PrefixOp {
    /// `-x`
    Neg,
    /// `!x`
    Not,
    /// `~x`
    BitNot,
    /// `*p`
    Deref,
}

/// Postfix operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PostfixOp {
    /// `x++`
    Increment,
    /// `x--`
    Decrement,
}

/// One `name: value` pair of a struct literal.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldInit {
    pub name: String,
    pub value: ExprId,
}

/// Expression kinds.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExprKind {
    Ident(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Char(char),
    Str(String),
    Array {
        elements: Vec<ExprId>,
        /// Element type when the parser saw an explicit annotation.
        element_type: Option<TypeRef>,
    },
    Struct {
        name: String,
        fields: Vec<FieldInit>,
    },
    Infix {
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    },
    Prefix {
        op: PrefixOp,
        operand: ExprId,
    },
    Postfix {
        op: PostfixOp,
        operand: ExprId,
    },
    Call {
        callee: String,
        args: Vec<ExprId>,
    },
    Index {
        base: ExprId,
        index: ExprId,
    },
    /// `base.member`
    Member {
        base: ExprId,
        member: String,
    },
    /// `base->member`
    PointerMember {
        base: ExprId,
        member: String,
    },
    Assign {
        target: ExprId,
        value: ExprId,
    },
}

impl ExprKind {
    /// Variant name used in diagnostics.
    pub fn variant_name(&self) -> &'static str {
        match self {
            ExprKind::Ident(_) => "identifier",
            ExprKind::Int(_) => "integer literal",
            ExprKind::Float(_) => "float literal",
            ExprKind::Bool(_) => "boolean literal",
            ExprKind::Char(_) => "char literal",
            ExprKind::Str(_) => "string literal",
            ExprKind::Array { .. } => "array literal",
            ExprKind::Struct { .. } => "struct literal",
            ExprKind::Infix { .. } => "infix expression",
            ExprKind::Prefix { .. } => "prefix expression",
            ExprKind::Postfix { .. } => "postfix expression",
            ExprKind::Call { .. } => "call expression",
            ExprKind::Index { .. } => "index expression",
            ExprKind::Member { .. } => "member expression",
            ExprKind::PointerMember { .. } => "pointer-member expression",
            ExprKind::Assign { .. } => "assignment",
        }
    }

    /// Expressions this one refers to.
    fn children(&self) -> Vec<ExprId> {
        match self {
            ExprKind::Ident(_)
            | ExprKind::Int(_)
            | ExprKind::Float(_)
            | ExprKind::Bool(_)
            | ExprKind::Char(_)
            | ExprKind::Str(_) => Vec::new(),
            ExprKind::Array { elements, .. } => elements.clone(),
            ExprKind::Struct { fields, .. } => fields.iter().map(|field| field.value).collect(),
            ExprKind::Infix { left, right, .. } => vec![*left, *right],
            ExprKind::Prefix { operand, .. } | ExprKind::Postfix { operand, .. } => vec![*operand],
            ExprKind::Call { args, .. } => args.clone(),
            ExprKind::Index { base, index } => vec![*base, *index],
            ExprKind::Member { base, .. } | ExprKind::PointerMember { base, .. } => vec![*base],
            ExprKind::Assign { target, value } => vec![*target, *value],
        }
    }

    /// Whether this is a literal that lives in constant data.
    pub fn is_data_literal(&self) -> bool {
        matches!(
            self,
            ExprKind::Str(_) | ExprKind::Array { .. } | ExprKind::Struct { .. }
        )
    }
}

/// A function parameter.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Param {
    pub name: String,
    pub ty: TypeRef,
}

/// `fn name(params): result { body }`
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<Param>,
    /// `TypeRef::Void` when no result is declared.
    pub result: TypeRef,
    pub body: StmtId,
    pub exported: bool,
}

/// One declared struct member.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeRef,
}

/// `struct Name { fields }`
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StructDecl {
    pub name: String,
    pub fields: Vec<FieldDecl>,
    pub exported: bool,
}

/// `import { names } from "module"`
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImportDecl {
    pub module: String,
    pub names: Vec<String>,
}

/// `let name: ty = init`
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LetDecl {
    pub name: String,
    pub ty: Option<TypeRef>,
    pub init: ExprId,
    pub exported: bool,
}

/// Statement kinds.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StmtKind {
    Block(Vec<StmtId>),
    Function(FunctionDecl),
    Struct(StructDecl),
    Import(ImportDecl),
    Let(LetDecl),
    If {
        condition: ExprId,
        then_branch: StmtId,
        else_branch: Option<StmtId>,
    },
    While {
        condition: ExprId,
        body: StmtId,
    },
    For {
        init: Option<StmtId>,
        condition: ExprId,
        update: Option<ExprId>,
        body: StmtId,
    },
    Return(Option<ExprId>),
    Break,
    Continue,
    Expr(ExprId),
}

impl StmtKind {
    /// Variant name used in diagnostics.
    pub fn variant_name(&self) -> &'static str {
        match self {
            StmtKind::Block(_) => "block",
            StmtKind::Function(_) => "function",
            StmtKind::Struct(_) => "struct",
            StmtKind::Import(_) => "import",
            StmtKind::Let(_) => "let",
            StmtKind::If { .. } => "if",
            StmtKind::While { .. } => "while",
            StmtKind::For { .. } => "for",
            StmtKind::Return(_) => "return",
            StmtKind::Break => "break",
            StmtKind::Continue => "continue",
            StmtKind::Expr(_) => "expression statement",
        }
    }
}

impl StmtKind {
    /// Statements and expressions this one refers to.
    fn children(&self) -> (Vec<StmtId>, Vec<ExprId>) {
        match self {
            StmtKind::Block(stmts) => (stmts.clone(), Vec::new()),
            StmtKind::Function(function) => (vec![function.body], Vec::new()),
            StmtKind::Struct(_) | StmtKind::Import(_) | StmtKind::Break | StmtKind::Continue => {
                (Vec::new(), Vec::new())
            }
            StmtKind::Let(decl) => (Vec::new(), vec![decl.init]),
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let mut stmts = vec![*then_branch];
                stmts.extend(*else_branch);
                (stmts, vec![*condition])
            }
            StmtKind::While { condition, body } => (vec![*body], vec![*condition]),
            StmtKind::For {
                init,
                condition,
                update,
                body,
            } => {
                let mut stmts: Vec<StmtId> = init.iter().copied().collect();
                stmts.push(*body);
                let mut exprs = vec![*condition];
                exprs.extend(*update);
                (stmts, exprs)
            }
            StmtKind::Return(value) => (Vec::new(), value.iter().copied().collect()),
            StmtKind::Expr(expr) => (Vec::new(), vec![*expr]),
        }
    }
}

/// A node reference that does not name an earlier node of the arena.
#[derive(Clone, Eq, PartialEq, Debug, thiserror::Error)]
#[error("{parent} refers to {child:?}, which is not an earlier node of the arena")]
pub struct DanglingNode {
    pub parent: String,
    pub child: NodeRef,
}

/// Either kind of node ID.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum NodeRef {
    Stmt(StmtId),
    Expr(ExprId),
}

/// Storage for every node of one translation unit.
#[derive(Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AstArena {
    exprs: Vec<ExprKind>,
    stmts: Vec<StmtKind>,
}

impl AstArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an expression and return its ID.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "arena indices never exceed u32"
    )]
    pub fn alloc_expr(&mut self, kind: ExprKind) -> ExprId {
        let id = ExprId::new(self.exprs.len() as u32);
        self.exprs.push(kind);
        id
    }

    /// Allocate a statement and return its ID.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "arena indices never exceed u32"
    )]
    pub fn alloc_stmt(&mut self, kind: StmtKind) -> StmtId {
        let id = StmtId::new(self.stmts.len() as u32);
        self.stmts.push(kind);
        id
    }

    #[inline]
    pub fn expr(&self, id: ExprId) -> &ExprKind {
        &self.exprs[id.index()]
    }

    #[inline]
    pub fn stmt(&self, id: StmtId) -> &StmtKind {
        &self.stmts[id.index()]
    }

    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    pub fn stmt_count(&self) -> usize {
        self.stmts.len()
    }
}

/// A parsed translation unit.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Module {
    pub name: String,
    /// Top-level statements in source order.
    pub items: Vec<StmtId>,
    pub arena: AstArena,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Module {
            name: name.into(),
            items: Vec::new(),
            arena: AstArena::new(),
        }
    }

    /// Top-level statements with their IDs.
    pub fn item_stmts(&self) -> impl Iterator<Item = (StmtId, &StmtKind)> + '_ {
        self.items.iter().map(|&id| (id, self.arena.stmt(id)))
    }

    /// Check every node reference before the arena is traversed.
    ///
    /// Items must name statements of the arena, and children must precede
    /// their parents, as [`AstBuilder`](crate::AstBuilder) allocates them.
    /// The ordering rules out cycles. Modules that come from outside the
    /// process must pass this check; the arena accessors index directly.
    pub fn validate(&self) -> Result<(), DanglingNode> {
        let stmt_count = self.arena.stmt_count();
        let expr_count = self.arena.expr_count();
        if let Some(&item) = self.items.iter().find(|item| item.index() >= stmt_count) {
            return Err(DanglingNode {
                parent: "module item".to_string(),
                child: NodeRef::Stmt(item),
            });
        }
        for (index, stmt) in self.arena.stmts.iter().enumerate() {
            let (stmts, exprs) = stmt.children();
            let child = stmts
                .into_iter()
                .find(|child| child.index() >= index)
                .map(NodeRef::Stmt)
                .or_else(|| {
                    exprs
                        .into_iter()
                        .find(|child| child.index() >= expr_count)
                        .map(NodeRef::Expr)
                });
            if let Some(child) = child {
                return Err(DanglingNode {
                    parent: format!("statement {index}"),
                    child,
                });
            }
        }
        for (index, expr) in self.arena.exprs.iter().enumerate() {
            if let Some(child) = expr.children().into_iter().find(|child| child.index() >= index) {
                return Err(DanglingNode {
                    parent: format!("expression {index}"),
                    child: NodeRef::Expr(child),
                });
            }
        }
        Ok(())
    }

    /// Source module names of every import statement, in order, deduplicated.
    pub fn import_sources(&self) -> Vec<&str> {
        let mut sources: Vec<&str> = Vec::new();
        for (_, stmt) in self.item_stmts() {
            if let StmtKind::Import(import) = stmt {
                if !sources.contains(&import.module.as_str()) {
                    sources.push(&import.module);
                }
            }
        }
        sources
    }
}

#[cfg(test)]
mod tests;
