//! Operator semantics over [`Data`].
//!
//! Operands combine by constant status. Two untyped constants fold exactly
//! and the result stays untyped. An untyped operand takes the type of the
//! other side before the operation. Typed operands must have identical
//! types. Regular integer arithmetic wraps at the type's width.

use std::cmp::Ordering;

use goeval_ir::{BinaryOp, UnaryOp};
use goeval_reflect::{apply_ordering, complex_op, Constant, Kind, ReflectError, Type, Val};

use crate::errors::{
    invalid_shift_count, mismatched_types, unaddressable, undefined_operator, unsupported_syntax,
    EvalResult,
};
use crate::{Data, TypedConst};

/// `x op y` for any binary operator.
///
/// Comparison and shift operators are forwarded to [`compare_op`] and
/// [`shift_op`].
pub fn binary_op(x: &Data, op: BinaryOp, y: &Data) -> EvalResult<Data> {
    if op.is_comparison() {
        return compare_op(x, op, y);
    }
    if op.is_shift() {
        return shift_op(x, op, y);
    }
    match (x, y) {
        (Data::Nil, _) | (_, Data::Nil) => Err(undefined_operator(&op, &"nil")),
        (Data::UntypedConst(a), Data::UntypedConst(b)) => {
            Ok(Data::UntypedConst(a.binary_op(op, b)?))
        }
        _ if x.ty().is_none() && y.ty().is_none() => {
            let (Some(a), Some(b)) = (untyped_bool(x), untyped_bool(y)) else {
                return Err(mismatched_types(&x.describe(), &y.describe()));
            };
            logical(op, a, b)
                .map(Data::UntypedBool)
                .ok_or_else(|| undefined_operator(&op, &"untyped bool"))
        }
        _ => {
            let (x, y) = unify(x, y)?;
            if let (Data::TypedConst(a), Data::TypedConst(b)) = (&x, &y) {
                let folded = a.value().binary_op(op, b.value())?;
                return Ok(Data::TypedConst(TypedConst::new(&folded, a.ty())?));
            }
            let (a, b) = (x.to_regular()?, y.to_regular()?);
            Ok(Data::Regular(arith(op, &a, &b)?))
        }
    }
}

/// `x op y` for `== != < <= > >=`.
///
/// Constant operands give an untyped boolean constant; anything else gives
/// [`Data::UntypedBool`].
pub fn compare_op(x: &Data, op: BinaryOp, y: &Data) -> EvalResult<Data> {
    if !op.is_comparison() {
        return binary_op(x, op, y);
    }
    match (x, y) {
        (Data::Nil, Data::Nil) => Err(undefined_operator(&op, &"nil")),
        (Data::Nil, other) | (other, Data::Nil) => compare_nil(op, other),
        (Data::UntypedConst(a), Data::UntypedConst(b)) => {
            Ok(Data::UntypedConst(Constant::Bool(a.compare(op, b)?)))
        }
        _ if x.ty().is_none() && y.ty().is_none() => {
            let (Some(a), Some(b)) = (untyped_bool(x), untyped_bool(y)) else {
                return Err(mismatched_types(&x.describe(), &y.describe()));
            };
            match op {
                BinaryOp::Eql => Ok(Data::UntypedBool(a == b)),
                BinaryOp::Neq => Ok(Data::UntypedBool(a != b)),
                _ => Err(undefined_operator(&op, &"untyped bool")),
            }
        }
        _ => {
            if let (Some(tx), Some(ty)) = (x.ty(), y.ty()) {
                if tx != ty {
                    return compare_mixed(x, op, y);
                }
            }
            let (x, y) = unify(x, y)?;
            if let (Data::TypedConst(a), Data::TypedConst(b)) = (&x, &y) {
                let result = a.value().compare(op, b.value())?;
                return Ok(Data::UntypedConst(Constant::Bool(result)));
            }
            let (a, b) = (x.to_regular()?, y.to_regular()?);
            Ok(Data::UntypedBool(compare_vals(op, &a, &b)?))
        }
    }
}

/// `x << y` or `x >> y`.
///
/// The count must be a non-negative integer. A constant shifted by a
/// constant stays constant; an untyped constant shifted by a non-constant
/// count becomes an `int`.
pub fn shift_op(x: &Data, op: BinaryOp, y: &Data) -> EvalResult<Data> {
    if !op.is_shift() {
        return binary_op(x, op, y);
    }
    let count = shift_count(y)?;
    let count_is_const = y.is_constant();
    match x {
        Data::UntypedConst(c) if count_is_const => Ok(Data::UntypedConst(c.shift(op, count)?)),
        Data::UntypedConst(c) => {
            let v = c.to_val(&Type::int())?;
            Ok(Data::Regular(shift_val(op, &v, count)?))
        }
        Data::TypedConst(c) if !c.ty().kind().is_integer() => {
            Err(undefined_operator(&op, c.ty()))
        }
        Data::TypedConst(c) if count_is_const => {
            let shifted = c.value().shift(op, count)?;
            Ok(Data::TypedConst(TypedConst::new(&shifted, c.ty())?))
        }
        Data::TypedConst(c) => Ok(Data::Regular(shift_val(op, &c.to_val()?, count)?)),
        Data::Regular(v) => Ok(Data::Regular(shift_val(op, v, count)?)),
        Data::Nil | Data::UntypedBool(_) => Err(undefined_operator(&op, &x.describe())),
    }
}

/// `op x` for `+ - ! ^ & <-`.
pub fn unary_op(op: UnaryOp, x: &Data) -> EvalResult<Data> {
    match op {
        UnaryOp::Recv => return Err(unsupported_syntax("receive operator")),
        UnaryOp::Addr => {
            return match x {
                Data::Regular(v) => v.addr().map(Data::Regular).ok_or_else(|| unaddressable(x)),
                _ => Err(unaddressable(x)),
            }
        }
        _ => {}
    }
    match x {
        Data::UntypedConst(c) => Ok(Data::UntypedConst(c.unary_op(op, None)?)),
        Data::TypedConst(c) => {
            let result = c.value().unary_op(op, Some(c.ty()))?;
            Ok(Data::TypedConst(TypedConst::new(&result, c.ty())?))
        }
        Data::UntypedBool(b) if op == UnaryOp::Not => Ok(Data::UntypedBool(!b)),
        Data::Regular(v) => Ok(Data::Regular(unary_val(op, v)?)),
        Data::Nil | Data::UntypedBool(_) => Err(undefined_operator(&op, &x.describe())),
    }
}

// =============================================================================
// Operand unification
// =============================================================================

/// Give an untyped operand the type of the typed one.
fn unify(x: &Data, y: &Data) -> EvalResult<(Data, Data)> {
    match (x.ty(), y.ty()) {
        (Some(tx), Some(ty)) if tx != ty => Err(mismatched_types(tx, ty)),
        (Some(t), None) => Ok((x.clone(), convert_untyped(y, t, x.is_constant())?)),
        (None, Some(t)) => Ok((convert_untyped(x, t, y.is_constant())?, y.clone())),
        _ => Ok((x.clone(), y.clone())),
    }
}

/// Untyped `d` as an operand of type `ty`. Constants stay constant when
/// the other operand is a constant too.
fn convert_untyped(d: &Data, ty: &Type, to_const: bool) -> EvalResult<Data> {
    match d {
        Data::UntypedConst(c) if to_const => Ok(Data::TypedConst(TypedConst::new(c, ty)?)),
        Data::UntypedConst(c) => Ok(Data::Regular(c.to_val(ty)?)),
        Data::Nil | Data::UntypedBool(_) => Ok(Data::Regular(d.assign_to(ty)?)),
        Data::Regular(_) | Data::TypedConst(_) => Ok(d.clone()),
    }
}

fn untyped_bool(d: &Data) -> Option<bool> {
    match d {
        Data::UntypedBool(b) | Data::UntypedConst(Constant::Bool(b)) => Some(*b),
        _ => None,
    }
}

fn logical(op: BinaryOp, a: bool, b: bool) -> Option<bool> {
    match op {
        BinaryOp::LAnd => Some(a && b),
        BinaryOp::LOr => Some(a || b),
        _ => None,
    }
}

// =============================================================================
// Runtime arithmetic
// =============================================================================

/// `a op b` on runtime values of identical type.
fn arith(op: BinaryOp, a: &Val, b: &Val) -> EvalResult<Val> {
    let ty = a.ty();
    let kind = a.kind();
    let undefined = || undefined_operator(&op, ty);

    if kind == Kind::Bool {
        let (Some(x), Some(y)) = (a.as_bool(), b.as_bool()) else {
            return Err(undefined());
        };
        let result = logical(op, x, y).ok_or_else(undefined)?;
        return Ok(Val::make_bool(ty, result)?);
    }
    if kind == Kind::String {
        let (Some(x), Some(y)) = (a.as_str(), b.as_str()) else {
            return Err(undefined());
        };
        if op != BinaryOp::Add {
            return Err(undefined());
        }
        return Ok(Val::make_string(ty, &format!("{x}{y}"))?);
    }
    if let (Some(x), Some(y)) = (a.as_int(), b.as_int()) {
        let result = int_arith(op, x, y).ok_or_else(undefined)??;
        return Ok(Val::make_int(ty, result)?);
    }
    if let (Some(x), Some(y)) = (a.as_uint(), b.as_uint()) {
        let result = uint_arith(op, x, y).ok_or_else(undefined)??;
        return Ok(Val::make_uint(ty, result)?);
    }
    if let (Some(x), Some(y)) = (a.as_float(), b.as_float()) {
        let result = float_arith(op, x, y).ok_or_else(undefined)?;
        return Ok(Val::make_float(ty, result)?);
    }
    if let (Some(x), Some(y)) = (a.as_complex(), b.as_complex()) {
        let (re, im) = complex_arith(op, x, y).ok_or_else(undefined)?;
        return Ok(Val::make_complex(ty, re, im)?);
    }
    Err(undefined())
}

fn int_arith(op: BinaryOp, x: i64, y: i64) -> Option<Result<i64, ReflectError>> {
    Some(Ok(match op {
        BinaryOp::Add => x.wrapping_add(y),
        BinaryOp::Sub => x.wrapping_sub(y),
        BinaryOp::Mul => x.wrapping_mul(y),
        BinaryOp::Quo | BinaryOp::Rem if y == 0 => return Some(Err(ReflectError::DivisionByZero)),
        BinaryOp::Quo => x.wrapping_div(y),
        BinaryOp::Rem => x.wrapping_rem(y),
        BinaryOp::And => x & y,
        BinaryOp::Or => x | y,
        BinaryOp::Xor => x ^ y,
        BinaryOp::AndNot => x & !y,
        _ => return None,
    }))
}

fn uint_arith(op: BinaryOp, x: u64, y: u64) -> Option<Result<u64, ReflectError>> {
    Some(Ok(match op {
        BinaryOp::Add => x.wrapping_add(y),
        BinaryOp::Sub => x.wrapping_sub(y),
        BinaryOp::Mul => x.wrapping_mul(y),
        BinaryOp::Quo | BinaryOp::Rem if y == 0 => return Some(Err(ReflectError::DivisionByZero)),
        BinaryOp::Quo => x / y,
        BinaryOp::Rem => x % y,
        BinaryOp::And => x & y,
        BinaryOp::Or => x | y,
        BinaryOp::Xor => x ^ y,
        BinaryOp::AndNot => x & !y,
        _ => return None,
    }))
}

fn float_arith(op: BinaryOp, x: f64, y: f64) -> Option<f64> {
    match op {
        BinaryOp::Add => Some(x + y),
        BinaryOp::Sub => Some(x - y),
        BinaryOp::Mul => Some(x * y),
        BinaryOp::Quo => Some(x / y),
        _ => None,
    }
}

/// Runtime complex arithmetic; division by zero yields infinities or NaN.
fn complex_arith(op: BinaryOp, a: (f64, f64), b: (f64, f64)) -> Option<(f64, f64)> {
    if op == BinaryOp::Quo {
        let ((ar, ai), (br, bi)) = (a, b);
        let denom = br * br + bi * bi;
        return Some(((ar * br + ai * bi) / denom, (ai * br - ar * bi) / denom));
    }
    complex_op(op, a, b)?.ok()
}

// =============================================================================
// Comparison
// =============================================================================

fn compare_nil(op: BinaryOp, other: &Data) -> EvalResult<Data> {
    let Data::Regular(v) = other else {
        return Err(mismatched_types(&"nil", &other.describe()));
    };
    if !v.kind().is_nillable() {
        return Err(mismatched_types(&"nil", v.ty()));
    }
    match op {
        BinaryOp::Eql => Ok(Data::UntypedBool(v.is_nil())),
        BinaryOp::Neq => Ok(Data::UntypedBool(!v.is_nil())),
        _ => Err(undefined_operator(&op, v.ty())),
    }
}

/// Operands of different types: legal when one is an interface the other
/// is assignable to.
fn compare_mixed(x: &Data, op: BinaryOp, y: &Data) -> EvalResult<Data> {
    let (a, b) = (x.to_regular()?, y.to_regular()?);
    let (a, b) = if a.kind() == Kind::Interface && b.ty().assignable_to(a.ty()) {
        let b = b.assign_to(a.ty())?;
        (a, b)
    } else if b.kind() == Kind::Interface && a.ty().assignable_to(b.ty()) {
        let a = a.assign_to(b.ty())?;
        (a, b)
    } else {
        return Err(mismatched_types(a.ty(), b.ty()));
    };
    Ok(Data::UntypedBool(compare_vals(op, &a, &b)?))
}

fn compare_vals(op: BinaryOp, a: &Val, b: &Val) -> EvalResult<bool> {
    match op {
        BinaryOp::Eql => Ok(a.equal(b)?),
        BinaryOp::Neq => Ok(!a.equal(b)?),
        _ if !a.kind().is_ordered() => Err(undefined_operator(&op, a.ty())),
        // Unordered floats (NaN) make every ordering comparison false.
        _ => Ok(ordering(a, b).and_then(|o| apply_ordering(op, o)).unwrap_or(false)),
    }
}

fn ordering(a: &Val, b: &Val) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (a.as_int(), b.as_int()) {
        return Some(x.cmp(&y));
    }
    if let (Some(x), Some(y)) = (a.as_uint(), b.as_uint()) {
        return Some(x.cmp(&y));
    }
    if let (Some(x), Some(y)) = (a.as_float(), b.as_float()) {
        return x.partial_cmp(&y);
    }
    match (a.as_str(), b.as_str()) {
        (Some(x), Some(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

// =============================================================================
// Shifts and unary operators
// =============================================================================

fn shift_count(y: &Data) -> EvalResult<u64> {
    let count = match y {
        Data::UntypedConst(c) => c.to_i64().and_then(|i| u64::try_from(i).ok()),
        Data::TypedConst(c) if c.ty().kind().is_integer() => {
            c.value().to_i64().and_then(|i| u64::try_from(i).ok())
        }
        Data::Regular(v) if v.kind().is_integer() => v
            .as_uint()
            .or_else(|| v.as_int().and_then(|i| u64::try_from(i).ok())),
        _ => None,
    };
    count.ok_or_else(|| invalid_shift_count(y))
}

/// Runtime shift; counts of 64 or more shift every bit out.
fn shift_val(op: BinaryOp, v: &Val, count: u64) -> EvalResult<Val> {
    let ty = v.ty();
    if let Some(a) = v.as_int() {
        let result = match op {
            BinaryOp::Shl if count >= 64 => 0,
            BinaryOp::Shl => a << count,
            BinaryOp::Shr if count >= 64 => {
                if a < 0 {
                    -1
                } else {
                    0
                }
            }
            BinaryOp::Shr => a >> count,
            _ => return Err(undefined_operator(&op, ty)),
        };
        return Ok(Val::make_int(ty, result)?);
    }
    if let Some(a) = v.as_uint() {
        let result = match op {
            BinaryOp::Shl | BinaryOp::Shr if count >= 64 => 0,
            BinaryOp::Shl => a << count,
            BinaryOp::Shr => a >> count,
            _ => return Err(undefined_operator(&op, ty)),
        };
        return Ok(Val::make_uint(ty, result)?);
    }
    Err(undefined_operator(&op, ty))
}

fn unary_val(op: UnaryOp, v: &Val) -> EvalResult<Val> {
    let ty = v.ty();
    let undefined = || undefined_operator(&op, ty);
    let result = match op {
        UnaryOp::Pos if v.kind().is_numeric() => return Ok(v.clone().without_place()),
        UnaryOp::Neg => {
            if let Some(i) = v.as_int() {
                Val::make_int(ty, i.wrapping_neg())
            } else if let Some(u) = v.as_uint() {
                Val::make_uint(ty, u.wrapping_neg())
            } else if let Some(f) = v.as_float() {
                Val::make_float(ty, -f)
            } else if let Some((re, im)) = v.as_complex() {
                Val::make_complex(ty, -re, -im)
            } else {
                return Err(undefined());
            }
        }
        UnaryOp::Not => match v.as_bool() {
            Some(b) => Val::make_bool(ty, !b),
            None => return Err(undefined()),
        },
        UnaryOp::Xor => {
            if let Some(i) = v.as_int() {
                Val::make_int(ty, !i)
            } else if let Some(u) = v.as_uint() {
                Val::make_uint(ty, !u)
            } else {
                return Err(undefined());
            }
        }
        _ => return Err(undefined()),
    };
    Ok(result?)
}
