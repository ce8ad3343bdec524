use super::*;
use crate::ast::StmtKind;

#[test]
fn builds_function_with_body() {
    let mut b = AstBuilder::new("math_utils");
    let n = b.ident("n");
    let one = b.int(1);
    let sum = b.infix(BinaryOp::Add, n, one);
    let ret = b.ret(Some(sum));
    let body = b.block(vec![ret]);
    let func = b.function("inc", &[("n", TypeRef::I32)], TypeRef::I32, body, true);
    b.item(func);
    let module = b.finish();

    assert_eq!(module.name, "math_utils");
    assert_eq!(module.items, vec![func]);
    let StmtKind::Function(decl) = module.arena.stmt(func) else {
        panic!("expected function");
    };
    assert_eq!(decl.name, "inc");
    assert_eq!(decl.params.len(), 1);
    assert_eq!(decl.params[0].ty, TypeRef::I32);
    assert!(decl.exported);
    assert_eq!(module.arena.stmt(decl.body), &StmtKind::Block(vec![ret]));
}

#[test]
fn struct_literal_keeps_field_order() {
    let mut b = AstBuilder::new("m");
    let one = b.int(1);
    let two = b.float(2.5);
    let lit = b.struct_lit("Point", vec![("y", two), ("x", one)]);
    let module = b.finish();
    let ExprKind::Struct { name, fields } = module.arena.expr(lit) else {
        panic!("expected struct literal");
    };
    assert_eq!(name, "Point");
    let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["y", "x"]);
}
