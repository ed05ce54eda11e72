use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;

fn int(v: i64) -> Constant {
    Constant::from_i64(v)
}

#[test]
fn test_int_literals() {
    assert_eq!(Constant::from_literal(LitKind::Int, "42"), Some(int(42)));
    assert_eq!(Constant::from_literal(LitKind::Int, "0x_FF"), Some(int(255)));
    assert_eq!(Constant::from_literal(LitKind::Int, "0b101"), Some(int(5)));
    assert_eq!(Constant::from_literal(LitKind::Int, "0o17"), Some(int(15)));
    assert_eq!(Constant::from_literal(LitKind::Int, "017"), Some(int(15)));
    assert_eq!(Constant::from_literal(LitKind::Int, "1_000_000"), Some(int(1_000_000)));
    assert_eq!(Constant::from_literal(LitKind::Int, "0"), Some(int(0)));
    assert_eq!(Constant::from_literal(LitKind::Int, "0x"), None);
}

#[test]
fn test_big_int_literal_is_exact() {
    let big = Constant::from_literal(LitKind::Int, "1000000000000000000000").unwrap();
    let scaled = big.binary_op(BinaryOp::Quo, &int(1_000_000_000_000)).unwrap();
    assert_eq!(scaled, int(1_000_000_000));
}

#[test]
fn test_float_and_imag_literals() {
    assert_eq!(Constant::from_literal(LitKind::Float, "1.5"), Some(Constant::Float(1.5)));
    assert_eq!(Constant::from_literal(LitKind::Float, ".25"), Some(Constant::Float(0.25)));
    assert_eq!(Constant::from_literal(LitKind::Float, "1e3"), Some(Constant::Float(1000.0)));
    assert_eq!(Constant::from_literal(LitKind::Float, "0x1p-2"), Some(Constant::Float(0.25)));
    assert_eq!(
        Constant::from_literal(LitKind::Imag, "2i"),
        Some(Constant::Complex(0.0, 2.0))
    );
    assert_eq!(
        Constant::from_literal(LitKind::Imag, "0123i"),
        Some(Constant::Complex(0.0, 123.0))
    );
}

#[test]
fn test_char_literals() {
    let rune = |text: &str| Constant::from_literal(LitKind::Char, text);
    assert_eq!(rune("'a'"), Some(Constant::Rune(BigInt::from(97))));
    assert_eq!(rune("'\\n'"), Some(Constant::Rune(BigInt::from(10))));
    assert_eq!(rune("'\\x41'"), Some(Constant::Rune(BigInt::from(65))));
    assert_eq!(rune("'\\377'"), Some(Constant::Rune(BigInt::from(255))));
    assert_eq!(rune("'\\u4e16'"), Some(Constant::Rune(BigInt::from(0x4e16))));
    assert_eq!(rune("'世'"), Some(Constant::Rune(BigInt::from(0x4e16))));
    assert_eq!(rune("'ab'"), None);
}

#[test]
fn test_string_literals() {
    let string = |text: &str| Constant::from_literal(LitKind::String, text);
    assert_eq!(string(r#""a\tb""#), Some(Constant::from("a\tb")));
    assert_eq!(string(r#""\"q\"""#), Some(Constant::from("\"q\"")));
    assert_eq!(string(r#""é""#), Some(Constant::from("é")));
    assert_eq!(string("`raw\\n`"), Some(Constant::from("raw\\n")));
    assert_eq!(string(r#""\q""#), None);
}

#[test]
fn test_integer_division_truncates() {
    assert_eq!(int(7).binary_op(BinaryOp::Quo, &int(2)).unwrap(), int(3));
    assert_eq!(int(-7).binary_op(BinaryOp::Quo, &int(2)).unwrap(), int(-3));
    assert_eq!(int(-7).binary_op(BinaryOp::Rem, &int(2)).unwrap(), int(-1));
}

#[test]
fn test_division_by_zero() {
    assert_eq!(
        int(1).binary_op(BinaryOp::Quo, &int(0)).unwrap_err(),
        ReflectError::DivisionByZero
    );
    assert_eq!(
        Constant::Float(1.0)
            .binary_op(BinaryOp::Quo, &Constant::Float(0.0))
            .unwrap_err(),
        ReflectError::DivisionByZero
    );
}

#[test]
fn test_promotion() {
    assert_eq!(
        int(3).binary_op(BinaryOp::Quo, &Constant::Float(2.0)).unwrap(),
        Constant::Float(1.5)
    );
    let rune = Constant::Rune(BigInt::from(97));
    assert_eq!(
        rune.binary_op(BinaryOp::Add, &int(1)).unwrap(),
        Constant::Rune(BigInt::from(98))
    );
    assert_eq!(
        int(1).binary_op(BinaryOp::Add, &Constant::Complex(0.0, 1.0)).unwrap(),
        Constant::Complex(1.0, 1.0)
    );
}

#[test]
fn test_bitwise() {
    assert_eq!(int(0b1100).binary_op(BinaryOp::AndNot, &int(0b1010)).unwrap(), int(0b0100));
    assert_eq!(int(6).binary_op(BinaryOp::Xor, &int(3)).unwrap(), int(5));
    assert!(Constant::Float(1.0).binary_op(BinaryOp::And, &int(1)).is_err());
}

#[test]
fn test_mixed_kinds_are_rejected() {
    let err = Constant::from("a").binary_op(BinaryOp::Add, &int(1)).unwrap_err();
    assert!(matches!(err, ReflectError::UndefinedOperator { .. }));
    assert!(Constant::Bool(true).compare(BinaryOp::Lss, &Constant::Bool(false)).is_err());
}

#[test]
fn test_compare() {
    assert!(int(1).compare(BinaryOp::Lss, &Constant::Float(1.5)).unwrap());
    assert!(Constant::from("abc").compare(BinaryOp::Lss, &Constant::from("abd")).unwrap());
    assert!(Constant::Complex(1.0, 0.0).compare(BinaryOp::Eql, &int(1)).unwrap());
    assert!(Constant::Complex(1.0, 0.0).compare(BinaryOp::Lss, &int(1)).is_err());
}

#[test]
fn test_shift() {
    assert_eq!(int(1).shift(BinaryOp::Shl, 70).unwrap().to_string(), "1180591620717411303424");
    assert_eq!(int(-8).shift(BinaryOp::Shr, 1).unwrap(), int(-4));
    assert_eq!(Constant::Float(2.0).shift(BinaryOp::Shl, 2).unwrap(), int(8));
    assert!(Constant::Float(2.5).shift(BinaryOp::Shl, 2).is_err());
    assert!(matches!(
        int(1).shift(BinaryOp::Shl, 1_000_000),
        Err(ReflectError::ShiftCountTooLarge(_))
    ));
}

#[test]
fn test_unary() {
    assert_eq!(int(5).unary_op(UnaryOp::Neg, None).unwrap(), int(-5));
    assert_eq!(int(5).unary_op(UnaryOp::Xor, None).unwrap(), int(-6));
    assert_eq!(int(1).unary_op(UnaryOp::Xor, Some(&Type::uint8())).unwrap(), int(254));
    assert_eq!(
        Constant::Bool(true).unary_op(UnaryOp::Not, None).unwrap(),
        Constant::Bool(false)
    );
    assert!(Constant::from("x").unary_op(UnaryOp::Neg, None).is_err());
}

#[test]
fn test_representable() {
    assert_eq!(int(255).representable(&Type::uint8()).unwrap(), int(255));
    assert!(matches!(
        int(256).representable(&Type::uint8()),
        Err(ReflectError::ConstantOverflow { .. })
    ));
    assert!(matches!(
        int(-1).representable(&Type::uint8()),
        Err(ReflectError::ConstantOverflow { .. })
    ));
    assert!(matches!(
        Constant::Float(1.5).representable(&Type::int()),
        Err(ReflectError::NotRepresentable { .. })
    ));
    assert_eq!(Constant::Float(2.0).representable(&Type::int()).unwrap(), int(2));
    assert_eq!(int(3).representable(&Type::float64()).unwrap(), Constant::Float(3.0));
    assert!(Constant::from("s").representable(&Type::int()).is_err());
}

#[test]
fn test_to_val() {
    assert_eq!(int(7).to_val(&Type::uint8()).unwrap().as_uint(), Some(7));
    let any = Type::empty_interface();
    let boxed = Constant::Float(1.5).to_val(&any).unwrap();
    assert_eq!(boxed.interface_elem().unwrap().ty(), &Type::float64());
    assert_eq!(
        Constant::Rune(BigInt::from(97)).default_type(),
        Type::int32()
    );
}

#[test]
fn test_display() {
    assert_eq!(Constant::Float(1.5).to_string(), "1.5");
    assert_eq!(Constant::Float(1e30).to_string(), "1e30");
    assert_eq!(Constant::from("a\"b").to_string(), "\"a\\\"b\"");
    assert_eq!(Constant::Complex(1.0, 2.0).to_string(), "(1 + 2i)");
}

proptest! {
    #[test]
    fn arithmetic_matches_i64(a in -1_000_000i64..1_000_000, b in -1_000_000i64..1_000_000) {
        prop_assert_eq!(int(a).binary_op(BinaryOp::Add, &int(b)).unwrap(), int(a + b));
        prop_assert_eq!(int(a).binary_op(BinaryOp::Sub, &int(b)).unwrap(), int(a - b));
        prop_assert_eq!(int(a).binary_op(BinaryOp::Mul, &int(b)).unwrap(), int(a * b));
        if b != 0 {
            prop_assert_eq!(int(a).binary_op(BinaryOp::Quo, &int(b)).unwrap(), int(a / b));
            prop_assert_eq!(int(a).binary_op(BinaryOp::Rem, &int(b)).unwrap(), int(a % b));
        }
        prop_assert_eq!(int(a).binary_op(BinaryOp::And, &int(b)).unwrap(), int(a & b));
        prop_assert_eq!(int(a).binary_op(BinaryOp::AndNot, &int(b)).unwrap(), int(a & !b));
        prop_assert_eq!(int(a).compare(BinaryOp::Lss, &int(b)).unwrap(), a < b);
    }

    #[test]
    fn int32_range_is_exact(v in any::<i64>()) {
        let fits = i32::try_from(v).is_ok();
        prop_assert_eq!(int(v).representable(&Type::int32()).is_ok(), fits);
    }
}
