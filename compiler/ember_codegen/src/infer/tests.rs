use super::*;
use crate::context::{FunctionContext, VarDescriptor, VarScope};
use ember_diagnostic::ErrorCode;
use ember_ir::{AstBuilder, BinaryOp, PostfixOp, PrefixOp, TypeRef};
use ember_symbols::{FunctionSignature, ImportEntry, ModuleMetadata};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn frame() -> FunctionContext {
    let mut frame = FunctionContext::new("f", TypeRef::Void);
    frame
        .params
        .insert("i", VarDescriptor::new("i", VarScope::Param, TypeRef::I32))
        .unwrap();
    frame
        .params
        .insert("x", VarDescriptor::new("x", VarScope::Param, TypeRef::F32))
        .unwrap();
    frame
        .locals
        .insert(
            "xs",
            VarDescriptor::new("xs", VarScope::Local, TypeRef::parse("f32[]").unwrap()),
        )
        .unwrap();
    frame
}

#[test]
fn literals() {
    let mut b = AstBuilder::new("m");
    let int = b.int(1);
    let float = b.float(1.0);
    let boolean = b.bool(false);
    let string = b.string("s");
    let meta = ModuleMetadata::new("m", 16);
    let scope = Scope::new(&meta, b.arena(), None);
    assert_eq!(infer(int, &scope).unwrap(), ValueLane::Int);
    assert_eq!(infer(float, &scope).unwrap(), ValueLane::Float);
    assert_eq!(infer(boolean, &scope).unwrap(), ValueLane::Bool);
    assert_eq!(infer(string, &scope).unwrap(), ValueLane::Int);
}

#[test]
fn mixed_arithmetic_promotes_and_comparisons_are_bool() {
    let mut b = AstBuilder::new("m");
    let i = b.ident("i");
    let x = b.ident("x");
    let sum = b.infix(BinaryOp::Add, i, x);
    let ints = b.infix(BinaryOp::Mul, i, i);
    let cmp = b.infix(BinaryOp::Lt, x, i);
    let meta = ModuleMetadata::new("m", 16);
    let frame = frame();
    let scope = Scope::new(&meta, b.arena(), Some(&frame));
    assert_eq!(infer(sum, &scope).unwrap(), ValueLane::Float);
    assert_eq!(infer(ints, &scope).unwrap(), ValueLane::Int);
    assert_eq!(infer(cmp, &scope).unwrap(), ValueLane::Bool);
}

#[test]
fn index_uses_element_type() {
    let mut b = AstBuilder::new("m");
    let xs = b.ident("xs");
    let zero = b.int(0);
    let at = b.index(xs, zero);
    let meta = ModuleMetadata::new("m", 16);
    let frame = frame();
    let scope = Scope::new(&meta, b.arena(), Some(&frame));
    assert_eq!(infer(at, &scope).unwrap(), ValueLane::Float);
}

#[test]
fn calls_use_own_and_imported_signatures() {
    let mut b = AstBuilder::new("m");
    let own = b.call("own", vec![]);
    let sqrt = b.call("sqrt", vec![]);
    let missing = b.call("missing", vec![]);
    let mut meta = ModuleMetadata::new("m", 16);
    let body = b.block(vec![]);
    meta.functions
        .insert(
            "own",
            ember_symbols::FunctionEntry {
                signature: FunctionSignature::new(vec![], TypeRef::BOOL),
                exported: false,
                decl: body,
            },
        )
        .unwrap();
    let mut import = ImportEntry::new("math", "sqrt");
    import.resolve(ExportDescriptor::Function(
        FunctionSignature::from_encoded("f_f").unwrap(),
    ));
    meta.imports.insert("sqrt", import).unwrap();
    let scope = Scope::new(&meta, b.arena(), None);
    assert_eq!(infer(own, &scope).unwrap(), ValueLane::Bool);
    assert_eq!(infer(sqrt, &scope).unwrap(), ValueLane::Float);
    assert_eq!(infer(missing, &scope).unwrap_err().code(), ErrorCode::E2004);
}

#[test]
fn unknown_variable_and_unimplemented_forms() {
    let mut b = AstBuilder::new("m");
    let ghost = b.ident("ghost");
    let i = b.ident("i");
    let neg = b.prefix(PrefixOp::Neg, i);
    let member = b.member(i, "field");
    let meta = ModuleMetadata::new("m", 16);
    let frame = frame();
    let scope = Scope::new(&meta, b.arena(), Some(&frame));
    assert_eq!(infer(ghost, &scope).unwrap_err().code(), ErrorCode::E2001);
    assert_eq!(infer(neg, &scope).unwrap_err().code(), ErrorCode::E3001);
    assert_eq!(infer(member, &scope).unwrap_err().code(), ErrorCode::E3001);
    assert_eq!(try_infer(neg, &scope).unwrap(), None);
    assert!(try_infer(ghost, &scope).is_err());
}

fn arithmetic() -> impl Strategy<Value = BinaryOp> {
    prop_oneof![
        Just(BinaryOp::Add),
        Just(BinaryOp::Sub),
        Just(BinaryOp::Mul),
        Just(BinaryOp::Div),
    ]
}

fn comparison() -> impl Strategy<Value = BinaryOp> {
    prop_oneof![
        Just(BinaryOp::Eq),
        Just(BinaryOp::NotEq),
        Just(BinaryOp::Lt),
        Just(BinaryOp::LtEq),
        Just(BinaryOp::Gt),
        Just(BinaryOp::GtEq),
    ]
}

proptest! {
    #[test]
    fn float_contaminates(op in arithmetic(), left_float: bool, right_float: bool) {
        let mut b = AstBuilder::new("m");
        let left = if left_float { b.float(1.5) } else { b.int(1) };
        let right = if right_float { b.ident("x") } else { b.ident("i") };
        let expr = b.infix(op, left, right);
        let meta = ModuleMetadata::new("m", 16);
        let frame = frame();
        let scope = Scope::new(&meta, b.arena(), Some(&frame));
        let expected = if left_float || right_float { ValueLane::Float } else { ValueLane::Int };
        prop_assert_eq!(infer(expr, &scope).unwrap(), expected);
    }

    #[test]
    fn comparisons_are_always_bool(op in comparison(), left_float: bool, right_float: bool) {
        let mut b = AstBuilder::new("m");
        let left = if left_float { b.float(1.5) } else { b.int(1) };
        let right = if right_float { b.ident("x") } else { b.ident("i") };
        let expr = b.infix(op, left, right);
        let meta = ModuleMetadata::new("m", 16);
        let frame = frame();
        let scope = Scope::new(&meta, b.arena(), Some(&frame));
        prop_assert_eq!(infer(expr, &scope).unwrap(), ValueLane::Bool);
    }
}

#[test]
fn lowering_lanes_cover_prefix_postfix_and_members() {
    let mut b = AstBuilder::new("m");
    let i = b.ident("i");
    let x = b.ident("x");
    let neg = b.prefix(PrefixOp::Neg, x);
    let not = b.prefix(PrefixOp::Not, x);
    let bumped = b.postfix(PostfixOp::Increment, x);
    let scaled = b.infix(BinaryOp::Mul, neg, i);
    let not_a_struct = b.member(i, "y");
    let meta = ModuleMetadata::new("m", 16);
    let frame = frame();
    let scope = Scope::new(&meta, b.arena(), Some(&frame));
    assert_eq!(lane_of(neg, &scope).unwrap(), ValueLane::Float);
    assert_eq!(lane_of(not, &scope).unwrap(), ValueLane::Bool);
    assert_eq!(lane_of(bumped, &scope).unwrap(), ValueLane::Float);
    assert_eq!(lane_of(scaled, &scope).unwrap(), ValueLane::Float);
    assert_eq!(infer(scaled, &scope).unwrap_err().code(), ErrorCode::E3001);
    assert_eq!(
        lane_of(not_a_struct, &scope).unwrap_err().code(),
        ErrorCode::E3001
    );
}
