use super::*;
use ember_ir::AstBuilder;
use pretty_assertions::assert_eq;

#[test]
fn constants_fold_negation() {
    let mut b = AstBuilder::new("m");
    let five = b.int(5);
    let neg = b.prefix(PrefixOp::Neg, five);
    let half = b.float(0.5);
    let neg_half = b.prefix(PrefixOp::Neg, half);
    let yes = b.bool(true);
    let letter = b.char('A');
    let name = b.ident("x");
    let arena = b.arena();
    assert_eq!(Constant::of(neg, arena), Some(Constant::Int(-5)));
    assert_eq!(Constant::of(neg_half, arena), Some(Constant::Float(-0.5)));
    assert_eq!(Constant::of(yes, arena), Some(Constant::Int(1)));
    assert_eq!(Constant::of(letter, arena), Some(Constant::Int(65)));
    assert_eq!(Constant::of(name, arena), None);
}

#[test]
fn scalars_encode_little_endian_at_width() {
    let mut out = Vec::new();
    push_scalar(&mut out, ScalarType::I32, Constant::Int(-1));
    push_scalar(&mut out, ScalarType::U16, Constant::Int(0x0102));
    push_scalar(&mut out, ScalarType::U8, Constant::Int(7));
    push_scalar(&mut out, ScalarType::F32, Constant::Int(1));
    assert_eq!(
        out,
        vec![0xff, 0xff, 0xff, 0xff, 0x02, 0x01, 7, 0x00, 0x00, 0x80, 0x3f]
    );
}

#[test]
fn element_type_precedence() {
    let mut b = AstBuilder::new("m");
    let one = b.int(1);
    let half = b.float(0.5);
    let arena = b.arena();
    let u8_ty = TypeRef::Scalar(ScalarType::U8);
    assert_eq!(
        array_element_type(Some(&u8_ty), Some(&TypeRef::F32), &[one], arena),
        u8_ty
    );
    assert_eq!(
        array_element_type(None, Some(&TypeRef::F32), &[one], arena),
        TypeRef::F32
    );
    assert_eq!(array_element_type(None, None, &[one, half], arena), TypeRef::F32);
    assert_eq!(array_element_type(None, None, &[one], arena), TypeRef::I32);
}
