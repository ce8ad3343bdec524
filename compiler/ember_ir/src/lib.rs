//! Ember IR - AST input boundary
//!
//! This crate holds the data structures the back end consumes:
//! - Node IDs (`ExprId`, `StmtId`) for the flat, arena-allocated AST
//! - Closed statement/expression kinds (`StmtKind`, `ExprKind`)
//! - Declared types parsed from source spellings (`TypeRef`, `ScalarType`)
//! - Value lanes every type reduces to (`ValueLane`)
//! - A builder for programmatic construction and a visitor for traversal
//!
//! # Design Philosophy
//!
//! - **Flatten Everything**: no `Box<Expr>`, children are `ExprId`/`StmtId`
//! - **Closed Variants**: every traversal site matches exhaustively
//! - **Parse Types Once**: declared type strings become `TypeRef` at the boundary
//!
//! With the `serde` feature the whole [`Module`] can be exchanged as JSON;
//! declared types serialize as their source spelling.

pub mod ast;
pub mod builder;
mod ids;
mod types;
pub mod visitor;

pub use ast::{
    AstArena, BinaryOp, DanglingNode, ExprKind, FieldDecl, FieldInit, FunctionDecl, ImportDecl,
    LetDecl, Module, NodeRef, Param, PostfixOp, PrefixOp, StmtKind, StructDecl,
};
pub use builder::AstBuilder;
pub use ids::{ExprId, StmtId};
pub use types::{ScalarType, TypeParseError, TypeRef, ValueLane};
