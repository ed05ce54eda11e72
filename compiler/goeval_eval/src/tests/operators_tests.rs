//! Operator engine: `binary_op`, `compare_op`, `shift_op` and `unary_op`
//! on hand-built operands.

use goeval_ir::{BinaryOp, UnaryOp};
use goeval_reflect::{ChanDir, Constant, Kind, ReflectError, Type, Val};
use num_bigint::BigInt;
use num_traits::One;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::int_slice;
use crate::{binary_op, compare_op, shift_op, unary_op, Data, EvalErrorKind, TypedConst};

fn basic(kind: Kind) -> Type {
    Type::basic(kind).unwrap()
}

fn reg(v: Val) -> Data {
    Data::Regular(v)
}

fn untyped(i: i64) -> Data {
    Data::UntypedConst(Constant::from_i64(i))
}

fn typed(i: i64, ty: &Type) -> Data {
    Data::TypedConst(TypedConst::new(&Constant::from_i64(i), ty).unwrap())
}

fn regular_of(d: Data) -> Val {
    match d {
        Data::Regular(v) => v,
        other => panic!("expected a regular value, got {other:?}"),
    }
}

// =============================================================================
// Arithmetic
// =============================================================================

#[test]
fn test_untyped_constants_fold() {
    let sum = binary_op(&untyped(2), BinaryOp::Mul, &untyped(21)).unwrap();
    assert_eq!(sum, untyped(42));

    let quo = binary_op(
        &Data::UntypedConst(Constant::Float(1.0)),
        BinaryOp::Quo,
        &untyped(4),
    )
    .unwrap();
    assert_eq!(quo, Data::UntypedConst(Constant::Float(0.25)));
}

#[test]
fn test_untyped_operand_adopts_regular_type() {
    let result = regular_of(binary_op(&untyped(2), BinaryOp::Add, &reg(Val::int(3))).unwrap());
    assert_eq!(result, Val::int(5));

    let float = regular_of(
        binary_op(&reg(Val::float64(1.5)), BinaryOp::Mul, &untyped(2)).unwrap(),
    );
    assert_eq!(float, Val::float64(3.0));
}

#[test]
fn test_typed_constants_stay_constant() {
    let int8 = basic(Kind::Int8);
    let result = binary_op(&typed(100, &int8), BinaryOp::Add, &untyped(20)).unwrap();
    assert_eq!(result, typed(120, &int8));

    // Constant arithmetic is exact, so leaving the type's range is an error.
    let err = binary_op(&typed(100, &int8), BinaryOp::Add, &untyped(28)).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::Reflect(_)));
}

#[test]
fn test_regular_integers_wrap() {
    let int8 = basic(Kind::Int8);
    let max = reg(Val::make_int(&int8, 127).unwrap());
    let one = reg(Val::make_int(&int8, 1).unwrap());
    let wrapped = regular_of(binary_op(&max, BinaryOp::Add, &one).unwrap());
    assert_eq!(wrapped.as_int(), Some(-128));

    let uint8 = basic(Kind::Uint8);
    let zero = reg(Val::make_uint(&uint8, 0).unwrap());
    let one = reg(Val::make_uint(&uint8, 1).unwrap());
    let under = regular_of(binary_op(&zero, BinaryOp::Sub, &one).unwrap());
    assert_eq!(under.as_uint(), Some(255));
}

#[test]
fn test_bitwise_operators() {
    let x = reg(Val::int(0b1100));
    let y = reg(Val::int(0b1010));
    let cases = [
        (BinaryOp::And, 0b1000),
        (BinaryOp::Or, 0b1110),
        (BinaryOp::Xor, 0b0110),
        (BinaryOp::AndNot, 0b0100),
    ];
    for (op, want) in cases {
        assert_eq!(regular_of(binary_op(&x, op, &y).unwrap()), Val::int(want), "{op}");
    }
}

#[test]
fn test_division_by_zero() {
    let err = binary_op(&reg(Val::int(1)), BinaryOp::Quo, &reg(Val::int(0))).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::Reflect(ReflectError::DivisionByZero));

    let err = binary_op(&untyped(1), BinaryOp::Rem, &untyped(0)).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::Reflect(ReflectError::DivisionByZero));

    // Floating point division at run time follows IEEE.
    let inf = regular_of(
        binary_op(&reg(Val::float64(1.0)), BinaryOp::Quo, &reg(Val::float64(0.0))).unwrap(),
    );
    assert_eq!(inf.as_float(), Some(f64::INFINITY));

    let complex = Type::complex128();
    let num = reg(Val::make_complex(&complex, 1.0, 0.0).unwrap());
    let zero = reg(Val::make_complex(&complex, 0.0, 0.0).unwrap());
    let nan = regular_of(binary_op(&num, BinaryOp::Quo, &zero).unwrap());
    assert!(nan.as_complex().is_some_and(|(re, _)| re.is_nan()));
}

#[test]
fn test_string_concatenation() {
    let joined = regular_of(
        binary_op(
            &reg(Val::string("go")),
            BinaryOp::Add,
            &Data::UntypedConst(Constant::String("pher".to_string())),
        )
        .unwrap(),
    );
    assert_eq!(joined, Val::string("gopher"));

    let err = binary_op(&reg(Val::string("a")), BinaryOp::Sub, &reg(Val::string("b"))).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::UndefinedOperator { .. }));
}

#[test]
fn test_mismatched_types() {
    let err = binary_op(&reg(Val::int(1)), BinaryOp::Add, &reg(Val::float64(1.0))).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::MismatchedTypes {
            x: "int".to_string(),
            y: "float64".to_string(),
        }
    );
}

#[test]
fn test_nil_in_arithmetic() {
    let err = binary_op(&Data::Nil, BinaryOp::Add, &untyped(1)).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::UndefinedOperator { .. }));
}

#[test]
fn test_untyped_bool_logic() {
    let result = binary_op(
        &Data::UntypedBool(true),
        BinaryOp::LAnd,
        &Data::UntypedConst(Constant::Bool(false)),
    )
    .unwrap();
    assert_eq!(result, Data::UntypedBool(false));

    let result = binary_op(&Data::UntypedBool(false), BinaryOp::LOr, &Data::UntypedBool(true)).unwrap();
    assert_eq!(result, Data::UntypedBool(true));

    let err = binary_op(&Data::UntypedBool(true), BinaryOp::Add, &Data::UntypedBool(true)).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::UndefinedOperator { .. }));

    let typed = regular_of(
        binary_op(&Data::UntypedBool(true), BinaryOp::LAnd, &reg(Val::bool(true))).unwrap(),
    );
    assert_eq!(typed, Val::bool(true));
}

// =============================================================================
// Comparison
// =============================================================================

#[test]
fn test_compare_constants() {
    let lt = compare_op(&untyped(1), BinaryOp::Lss, &untyped(2)).unwrap();
    assert_eq!(lt, Data::UntypedConst(Constant::Bool(true)));

    let int = Type::int();
    let eq = compare_op(&typed(3, &int), BinaryOp::Eql, &untyped(3)).unwrap();
    assert_eq!(eq, Data::UntypedConst(Constant::Bool(true)));
}

#[test]
fn test_compare_regular_gives_untyped_bool() {
    let ge = compare_op(&reg(Val::int(2)), BinaryOp::Geq, &untyped(2)).unwrap();
    assert_eq!(ge, Data::UntypedBool(true));

    let lt = compare_op(&reg(Val::string("abc")), BinaryOp::Lss, &reg(Val::string("abd"))).unwrap();
    assert_eq!(lt, Data::UntypedBool(true));
}

#[test]
fn test_nan_compares_false() {
    let nan = reg(Val::float64(f64::NAN));
    for op in [BinaryOp::Eql, BinaryOp::Lss, BinaryOp::Leq, BinaryOp::Gtr, BinaryOp::Geq] {
        assert_eq!(compare_op(&nan, op, &nan).unwrap(), Data::UntypedBool(false), "{op}");
    }
    assert_eq!(compare_op(&nan, BinaryOp::Neq, &nan).unwrap(), Data::UntypedBool(true));
}

#[test]
fn test_compare_with_nil() {
    let nil_slice = reg(Val::zero(&Type::slice_of(&Type::int())));
    assert_eq!(
        compare_op(&nil_slice, BinaryOp::Eql, &Data::Nil).unwrap(),
        Data::UntypedBool(true)
    );
    assert_eq!(
        compare_op(&Data::Nil, BinaryOp::Neq, &nil_slice).unwrap(),
        Data::UntypedBool(false)
    );

    let err = compare_op(&reg(Val::int(0)), BinaryOp::Eql, &Data::Nil).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::MismatchedTypes { .. }));

    let err = compare_op(&Data::Nil, BinaryOp::Eql, &Data::Nil).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::UndefinedOperator { .. }));

    let err = compare_op(&nil_slice, BinaryOp::Lss, &Data::Nil).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::UndefinedOperator { .. }));
}

#[test]
fn test_compare_interface_with_concrete() {
    let any = Type::empty_interface();
    let boxed = reg(Val::int(1).assign_to(&any).unwrap());
    assert_eq!(
        compare_op(&boxed, BinaryOp::Eql, &reg(Val::int(1))).unwrap(),
        Data::UntypedBool(true)
    );
    assert_eq!(
        compare_op(&reg(Val::string("1")), BinaryOp::Eql, &boxed).unwrap(),
        Data::UntypedBool(false)
    );
}

#[test]
fn test_uncomparable_values() {
    let slice = reg(int_slice(&[1]));
    let err = compare_op(&slice, BinaryOp::Eql, &slice).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::Reflect(ReflectError::Uncomparable("[]int".to_string()))
    );

    let err = compare_op(&reg(Val::bool(true)), BinaryOp::Lss, &reg(Val::bool(false))).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::UndefinedOperator { .. }));
}

#[test]
fn test_entry_points_forward() {
    assert_eq!(compare_op(&untyped(1), BinaryOp::Add, &untyped(1)).unwrap(), untyped(2));
    assert_eq!(binary_op(&untyped(1), BinaryOp::Shl, &untyped(4)).unwrap(), untyped(16));
    assert_eq!(
        shift_op(&untyped(2), BinaryOp::Gtr, &untyped(1)).unwrap(),
        Data::UntypedConst(Constant::Bool(true))
    );
}

// =============================================================================
// Shifts
// =============================================================================

#[test]
fn test_constant_shifts() {
    let big = shift_op(&untyped(1), BinaryOp::Shl, &untyped(70)).unwrap();
    assert_eq!(big, Data::UntypedConst(Constant::Int(BigInt::one() << 70)));
    assert_eq!(shift_op(&untyped(-8), BinaryOp::Shr, &untyped(1)).unwrap(), untyped(-4));

    let uint8 = basic(Kind::Uint8);
    let err = shift_op(&typed(1, &uint8), BinaryOp::Shl, &untyped(8)).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::Reflect(_)));
}

#[test]
fn test_untyped_constant_with_variable_count_becomes_int() {
    let count = reg(Val::make_uint(&basic(Kind::Uint), 3).unwrap());
    let shifted = regular_of(shift_op(&untyped(1), BinaryOp::Shl, &count).unwrap());
    assert_eq!(shifted, Val::int(8));
}

#[test]
fn test_regular_shifts() {
    let int8 = basic(Kind::Int8);
    let one = reg(Val::make_int(&int8, 1).unwrap());
    let high = regular_of(shift_op(&one, BinaryOp::Shl, &untyped(7)).unwrap());
    assert_eq!(high.as_int(), Some(-128));

    let neg = reg(Val::int(-8));
    let all_out = regular_of(shift_op(&neg, BinaryOp::Shr, &untyped(100)).unwrap());
    assert_eq!(all_out, Val::int(-1));
    let gone = regular_of(shift_op(&reg(Val::int(5)), BinaryOp::Shl, &untyped(64)).unwrap());
    assert_eq!(gone, Val::int(0));
}

#[test]
fn test_invalid_shift_count() {
    let err = shift_op(&reg(Val::int(1)), BinaryOp::Shl, &reg(Val::int(-1))).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::InvalidShiftCount(_)));

    let err = shift_op(&reg(Val::int(1)), BinaryOp::Shl, &reg(Val::float64(1.0))).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::InvalidShiftCount(_)));

    let float = Data::TypedConst(TypedConst::new(&Constant::Float(1.0), &Type::float64()).unwrap());
    let err = shift_op(&float, BinaryOp::Shl, &untyped(1)).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::UndefinedOperator { .. }));
}

// =============================================================================
// Unary operators
// =============================================================================

#[test]
fn test_unary_constants() {
    assert_eq!(unary_op(UnaryOp::Neg, &untyped(5)).unwrap(), untyped(-5));
    assert_eq!(unary_op(UnaryOp::Xor, &untyped(0)).unwrap(), untyped(-1));
    assert_eq!(
        unary_op(UnaryOp::Not, &Data::UntypedConst(Constant::Bool(true))).unwrap(),
        Data::UntypedConst(Constant::Bool(false))
    );

    let uint8 = basic(Kind::Uint8);
    assert_eq!(unary_op(UnaryOp::Xor, &typed(0, &uint8)).unwrap(), typed(255, &uint8));
}

#[test]
fn test_unary_regular() {
    let uint8 = basic(Kind::Uint8);
    let zero = reg(Val::make_uint(&uint8, 0).unwrap());
    assert_eq!(regular_of(unary_op(UnaryOp::Xor, &zero).unwrap()).as_uint(), Some(255));
    assert_eq!(regular_of(unary_op(UnaryOp::Neg, &zero).unwrap()).as_uint(), Some(0));

    assert_eq!(
        regular_of(unary_op(UnaryOp::Neg, &reg(Val::float64(2.5))).unwrap()),
        Val::float64(-2.5)
    );
    assert_eq!(
        regular_of(unary_op(UnaryOp::Not, &reg(Val::bool(false))).unwrap()),
        Val::bool(true)
    );
    assert_eq!(unary_op(UnaryOp::Not, &Data::UntypedBool(true)).unwrap(), Data::UntypedBool(false));

    let err = unary_op(UnaryOp::Neg, &reg(Val::string("x"))).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::UndefinedOperator { .. }));
    let err = unary_op(UnaryOp::Not, &Data::Nil).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::UndefinedOperator { .. }));
}

#[test]
fn test_address_and_receive() {
    let err = unary_op(UnaryOp::Addr, &untyped(1)).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::Unaddressable(_)));
    let err = unary_op(UnaryOp::Addr, &reg(Val::int(1))).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::Unaddressable(_)));

    let target = Val::new_pointer(Val::int(4)).deref().unwrap();
    let ptr = regular_of(unary_op(UnaryOp::Addr, &reg(target)).unwrap());
    assert_eq!(ptr.ty(), &Type::pointer_to(&Type::int()));
    assert_eq!(ptr.deref().unwrap(), Val::int(4));

    let chan = reg(Val::make_chan(&Type::chan_of(ChanDir::Both, &Type::int()), 1).unwrap());
    let err = unary_op(UnaryOp::Recv, &chan).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::UnsupportedSyntax("receive operator"));
}

proptest! {
    #[test]
    fn regular_comparison_matches_i64(a in any::<i64>(), b in any::<i64>()) {
        let (x, y) = (reg(Val::int(a)), reg(Val::int(b)));
        let cases = [
            (BinaryOp::Eql, a == b),
            (BinaryOp::Neq, a != b),
            (BinaryOp::Lss, a < b),
            (BinaryOp::Leq, a <= b),
            (BinaryOp::Gtr, a > b),
            (BinaryOp::Geq, a >= b),
        ];
        for (op, want) in cases {
            prop_assert_eq!(compare_op(&x, op, &y).unwrap(), Data::UntypedBool(want));
        }
    }

    #[test]
    fn uint8_arithmetic_wraps(a in any::<u8>(), b in any::<u8>()) {
        let uint8 = Type::uint8();
        let x = reg(Val::make_uint(&uint8, u64::from(a)).unwrap());
        let y = reg(Val::make_uint(&uint8, u64::from(b)).unwrap());
        let sum = regular_of(binary_op(&x, BinaryOp::Add, &y).unwrap());
        prop_assert_eq!(sum.as_uint(), Some(u64::from(a.wrapping_add(b))));
        let product = regular_of(binary_op(&x, BinaryOp::Mul, &y).unwrap());
        prop_assert_eq!(product.as_uint(), Some(u64::from(a.wrapping_mul(b))));
    }
}
