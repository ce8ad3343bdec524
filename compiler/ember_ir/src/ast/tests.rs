use super::*;
use crate::AstBuilder;

#[test]
fn comparison_operators_are_classified() {
    for op in [
        BinaryOp::Eq,
        BinaryOp::NotEq,
        BinaryOp::Lt,
        BinaryOp::LtEq,
        BinaryOp::Gt,
        BinaryOp::GtEq,
    ] {
        assert!(op.is_comparison(), "{} should compare", op.as_symbol());
    }
    assert!(!BinaryOp::Add.is_comparison());
    assert!(!BinaryOp::And.is_comparison());
    assert!(BinaryOp::And.is_logical());
    assert!(BinaryOp::Shl.is_integer_only());
    assert!(!BinaryOp::Div.is_integer_only());
}

#[test]
fn arena_ids_are_sequential() {
    let mut arena = AstArena::new();
    let a = arena.alloc_expr(ExprKind::Int(1));
    let b = arena.alloc_expr(ExprKind::Int(2));
    assert_eq!(a.raw(), 0);
    assert_eq!(b.raw(), 1);
    assert_eq!(arena.expr(b), &ExprKind::Int(2));
    assert_eq!(arena.expr_count(), 2);

    let s = arena.alloc_stmt(StmtKind::Break);
    assert_eq!(arena.stmt(s), &StmtKind::Break);
    assert_eq!(arena.stmt_count(), 1);
}

#[test]
fn import_sources_are_deduplicated_in_order() {
    let mut b = AstBuilder::new("main");
    let i1 = b.import("memory", &["malloc"]);
    b.item(i1);
    let i2 = b.import("util", &["helper"]);
    b.item(i2);
    let i3 = b.import("memory", &["free"]);
    b.item(i3);
    let module = b.finish();
    assert_eq!(module.import_sources(), vec!["memory", "util"]);
}

#[test]
fn variant_names() {
    assert_eq!(ExprKind::Int(0).variant_name(), "integer literal");
    assert_eq!(StmtKind::Continue.variant_name(), "continue");
    assert!(ExprKind::Str(String::new()).is_data_literal());
    assert!(!ExprKind::Int(3).is_data_literal());
}

#[cfg(feature = "serde")]
#[test]
fn module_round_trips_through_json() {
    let mut b = AstBuilder::new("main");
    let five = b.int(5);
    let x = b.let_stmt("x", Some(crate::TypeRef::parse("*u8[]").unwrap()), five);
    b.item(x);
    let module = b.finish();

    let json = serde_json::to_string(&module).unwrap();
    assert!(json.contains("\"*u8[]\""));
    let back: Module = serde_json::from_str(&json).unwrap();
    assert_eq!(back, module);
}

#[test]
fn validate_accepts_built_modules() {
    let mut b = AstBuilder::new("main");
    let one = b.int(1);
    let ret = b.ret(Some(one));
    let body = b.block(vec![ret]);
    let f = b.function("f", &[], crate::TypeRef::I32, body, false);
    b.item(f);
    assert_eq!(b.finish().validate(), Ok(()));
}

#[test]
fn validate_rejects_dangling_and_cyclic_references() {
    let mut module = Module::new("bad");
    module.items.push(StmtId::new(3));
    let err = module.validate().unwrap_err();
    assert_eq!(err.parent, "module item");
    assert_eq!(err.child, NodeRef::Stmt(StmtId::new(3)));

    let mut module = Module::new("bad");
    let stmt = module.arena.alloc_stmt(StmtKind::Expr(ExprId::new(7)));
    module.items.push(stmt);
    let err = module.validate().unwrap_err();
    assert_eq!(err.child, NodeRef::Expr(ExprId::new(7)));

    // A block that contains itself.
    let mut module = Module::new("bad");
    let block = module.arena.alloc_stmt(StmtKind::Block(vec![StmtId::new(0)]));
    module.items.push(block);
    let err = module.validate().unwrap_err();
    assert_eq!(err.parent, "statement 0");

    let mut module = Module::new("bad");
    module.arena.alloc_expr(ExprKind::Prefix {
        op: PrefixOp::Neg,
        operand: ExprId::new(1),
    });
    module.arena.alloc_expr(ExprKind::Int(1));
    let err = module.validate().unwrap_err();
    assert_eq!(err.parent, "expression 0");
    assert_eq!(err.child, NodeRef::Expr(ExprId::new(1)));
}
