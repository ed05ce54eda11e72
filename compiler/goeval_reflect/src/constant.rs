//! Untyped and typed constant values.
//!
//! Integer constants are exact (`BigInt`); floating-point and complex
//! constants use `f64` precision. Arithmetic follows constant-expression
//! rules: integer division truncates, division by zero is an error, and
//! mixed operands promote to the higher of int < rune < float < complex.

use std::cmp::Ordering;
use std::fmt;

use goeval_ir::{BinaryOp, LitKind, UnaryOp};
use num_bigint::BigInt;
use num_traits::{FromPrimitive, One, Signed, ToPrimitive, Zero};

use crate::{Kind, ReflectError, Type, Val};

/// Shifts beyond this many bits are rejected rather than materialized.
const MAX_SHIFT: u64 = 10_000;

/// A compile-time constant value.
#[derive(Clone, Debug, PartialEq)]
pub enum Constant {
    Bool(bool),
    String(String),
    Int(BigInt),
    /// Integer constant written as a character literal.
    Rune(BigInt),
    Float(f64),
    Complex(f64, f64),
}

impl Constant {
    /// Value of a basic literal token; `None` if the text is malformed.
    pub fn from_literal(kind: LitKind, text: &str) -> Option<Constant> {
        match kind {
            LitKind::Int => parse_int(text).map(Constant::Int),
            LitKind::Float => parse_float(text).map(Constant::Float),
            LitKind::Imag => {
                let body = text.strip_suffix('i')?;
                let im = parse_imag_body(body)?;
                Some(Constant::Complex(0.0, im))
            }
            LitKind::Char => {
                let body = text.strip_prefix('\'')?.strip_suffix('\'')?;
                let code = unquote_char(body)?;
                Some(Constant::Rune(BigInt::from(code)))
            }
            LitKind::String => unquote_string(text).map(Constant::String),
        }
    }

    pub fn from_i64(v: i64) -> Constant {
        Constant::Int(BigInt::from(v))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Constant::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Constant::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_negative(&self) -> bool {
        match self {
            Constant::Int(i) | Constant::Rune(i) => i.is_negative(),
            Constant::Float(f) => *f < 0.0,
            Constant::Complex(re, _) => *re < 0.0,
            _ => false,
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, Constant::Bool(_) | Constant::String(_))
    }

    /// Promotion rank of a numeric constant.
    fn rank(&self) -> u8 {
        match self {
            Constant::Int(_) => 0,
            Constant::Rune(_) => 1,
            Constant::Float(_) => 2,
            Constant::Complex(..) => 3,
            Constant::Bool(_) | Constant::String(_) => u8::MAX,
        }
    }

    /// Exact integer value, if the constant has one.
    pub fn to_integer(&self) -> Option<BigInt> {
        match self {
            Constant::Int(i) | Constant::Rune(i) => Some(i.clone()),
            Constant::Float(f) => float_to_integer(*f),
            Constant::Complex(re, im) if *im == 0.0 => float_to_integer(*re),
            _ => None,
        }
    }

    pub fn to_i64(&self) -> Option<i64> {
        self.to_integer()?.to_i64()
    }

    /// Real value as `f64`; complex constants need a zero imaginary part.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Constant::Int(i) | Constant::Rune(i) => i.to_f64(),
            Constant::Float(f) => Some(*f),
            Constant::Complex(re, im) if *im == 0.0 => Some(*re),
            _ => None,
        }
    }

    fn to_complex(&self) -> Option<(f64, f64)> {
        match self {
            Constant::Complex(re, im) => Some((*re, *im)),
            other => other.to_f64().map(|re| (re, 0.0)),
        }
    }

    /// Convert a numeric constant to the given rank.
    fn promote(&self, rank: u8) -> Constant {
        match (rank, self) {
            (0 | 1, _) => self.clone(),
            (2, c) => Constant::Float(c.to_f64().unwrap_or(f64::NAN)),
            (_, c) => {
                let (re, im) = c.to_complex().unwrap_or((f64::NAN, 0.0));
                Constant::Complex(re, im)
            }
        }
    }

    /// Name of the untyped kind, as used in messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Constant::Bool(_) => "untyped bool",
            Constant::String(_) => "untyped string",
            Constant::Int(_) => "untyped int",
            Constant::Rune(_) => "untyped rune",
            Constant::Float(_) => "untyped float",
            Constant::Complex(..) => "untyped complex",
        }
    }

    /// Type an untyped constant takes when no other type is implied.
    pub fn default_type(&self) -> Type {
        match self {
            Constant::Bool(_) => Type::bool(),
            Constant::String(_) => Type::string(),
            Constant::Int(_) => Type::int(),
            Constant::Rune(_) => Type::int32(),
            Constant::Float(_) => Type::float64(),
            Constant::Complex(..) => Type::complex128(),
        }
    }

    fn undefined(&self, op: impl fmt::Display) -> ReflectError {
        ReflectError::UndefinedOperator {
            op: op.to_string(),
            operand: self.kind_name().to_string(),
        }
    }

    // =========================================================================
    // Arithmetic
    // =========================================================================

    /// `self op other` for a non-comparison, non-shift operator.
    pub fn binary_op(&self, op: BinaryOp, other: &Constant) -> Result<Constant, ReflectError> {
        match (self, other) {
            (Constant::Bool(a), Constant::Bool(b)) => match op {
                BinaryOp::LAnd => Ok(Constant::Bool(*a && *b)),
                BinaryOp::LOr => Ok(Constant::Bool(*a || *b)),
                _ => Err(self.undefined(op)),
            },
            (Constant::String(a), Constant::String(b)) => match op {
                BinaryOp::Add => Ok(Constant::String(format!("{a}{b}"))),
                _ => Err(self.undefined(op)),
            },
            (a, b) if a.is_numeric() && b.is_numeric() => {
                let rank = a.rank().max(b.rank());
                numeric_op(op, &a.promote(rank), &b.promote(rank))
            }
            _ => Err(ReflectError::UndefinedOperator {
                op: op.to_string(),
                operand: format!("{} and {}", self.kind_name(), other.kind_name()),
            }),
        }
    }

    /// `self op other` for a comparison operator.
    pub fn compare(&self, op: BinaryOp, other: &Constant) -> Result<bool, ReflectError> {
        let ordering = match (self, other) {
            (Constant::Bool(a), Constant::Bool(b)) => {
                return match op {
                    BinaryOp::Eql => Ok(a == b),
                    BinaryOp::Neq => Ok(a != b),
                    _ => Err(self.undefined(op)),
                }
            }
            (Constant::String(a), Constant::String(b)) => a.cmp(b),
            (a, b) if a.is_numeric() && b.is_numeric() => {
                let rank = a.rank().max(b.rank());
                match (a.promote(rank), b.promote(rank)) {
                    (Constant::Int(x) | Constant::Rune(x), Constant::Int(y) | Constant::Rune(y)) => {
                        x.cmp(&y)
                    }
                    (Constant::Float(x), Constant::Float(y)) => match x.partial_cmp(&y) {
                        Some(ord) => ord,
                        None => return Ok(op == BinaryOp::Neq),
                    },
                    (Constant::Complex(xr, xi), Constant::Complex(yr, yi)) => {
                        #[allow(clippy::float_cmp)]
                        let eq = xr == yr && xi == yi;
                        return match op {
                            BinaryOp::Eql => Ok(eq),
                            BinaryOp::Neq => Ok(!eq),
                            _ => Err(self.undefined(op)),
                        };
                    }
                    _ => return Err(self.undefined(op)),
                }
            }
            _ => {
                return Err(ReflectError::UndefinedOperator {
                    op: op.to_string(),
                    operand: format!("{} and {}", self.kind_name(), other.kind_name()),
                })
            }
        };
        apply_ordering(op, ordering).ok_or_else(|| self.undefined(op))
    }

    /// `self << count` or `self >> count`; the result is an integer constant.
    pub fn shift(&self, op: BinaryOp, count: u64) -> Result<Constant, ReflectError> {
        let value = self.to_integer().ok_or_else(|| self.undefined(op))?;
        if count > MAX_SHIFT {
            return Err(ReflectError::ShiftCountTooLarge(count.to_string()));
        }
        let shifted = match op {
            BinaryOp::Shl => value << count,
            BinaryOp::Shr => value >> count,
            _ => return Err(self.undefined(op)),
        };
        Ok(match self {
            Constant::Rune(_) => Constant::Rune(shifted),
            _ => Constant::Int(shifted),
        })
    }

    /// Unary `op self`. For `^` on a constant of unsigned type `ty`, the
    /// complement is taken within the type's width.
    pub fn unary_op(&self, op: UnaryOp, ty: Option<&Type>) -> Result<Constant, ReflectError> {
        match (op, self) {
            (UnaryOp::Pos, c) if c.is_numeric() => Ok(c.clone()),
            (UnaryOp::Neg, Constant::Int(i)) => Ok(Constant::Int(-i)),
            (UnaryOp::Neg, Constant::Rune(i)) => Ok(Constant::Rune(-i)),
            (UnaryOp::Neg, Constant::Float(f)) => Ok(Constant::Float(-f)),
            (UnaryOp::Neg, Constant::Complex(re, im)) => Ok(Constant::Complex(-re, -im)),
            (UnaryOp::Not, Constant::Bool(b)) => Ok(Constant::Bool(!b)),
            (UnaryOp::Xor, Constant::Int(i) | Constant::Rune(i)) => {
                let complemented = match ty.map(Type::kind) {
                    Some(kind) if kind.is_unsigned() => {
                        let mask = (BigInt::one() << kind.bits()) - BigInt::one();
                        i ^ mask
                    }
                    _ => -i - BigInt::one(),
                };
                Ok(match self {
                    Constant::Rune(_) => Constant::Rune(complemented),
                    _ => Constant::Int(complemented),
                })
            }
            _ => Err(self.undefined(op)),
        }
    }

    // =========================================================================
    // Typing
    // =========================================================================

    /// This constant as a value of basic type `ty`, normalized to the
    /// representation of the type's kind. Integer kinds reject fractional
    /// and out-of-range values.
    pub fn representable(&self, ty: &Type) -> Result<Constant, ReflectError> {
        let kind = ty.kind();
        let not_representable = || ReflectError::NotRepresentable {
            value: self.to_string(),
            ty: ty.to_string(),
        };
        let overflow = || ReflectError::ConstantOverflow {
            value: self.to_string(),
            ty: ty.to_string(),
        };
        match self {
            Constant::Bool(_) if kind == Kind::Bool => return Ok(self.clone()),
            Constant::String(_) if kind == Kind::String => return Ok(self.clone()),
            Constant::Bool(_) | Constant::String(_) => return Err(not_representable()),
            _ => {}
        }
        if kind.is_integer() {
            let value = self.to_integer().ok_or_else(not_representable)?;
            let (min, max) = integer_range(kind);
            if value < min || value > max {
                return Err(overflow());
            }
            return Ok(Constant::Int(value));
        }
        if kind.is_float() {
            let value = self.to_f64().ok_or_else(not_representable)?;
            return round_float(kind, value).map(Constant::Float).ok_or_else(overflow);
        }
        if kind.is_complex() {
            let (re, im) = self.to_complex().ok_or_else(not_representable)?;
            let part = if kind == Kind::Complex64 {
                Kind::Float32
            } else {
                Kind::Float64
            };
            let re = round_float(part, re).ok_or_else(overflow)?;
            let im = round_float(part, im).ok_or_else(overflow)?;
            return Ok(Constant::Complex(re, im));
        }
        Err(not_representable())
    }

    /// Materialize as a runtime value of `ty`. Interface targets receive the
    /// constant at its default type.
    pub fn to_val(&self, ty: &Type) -> Result<Val, ReflectError> {
        if ty.kind() == Kind::Interface {
            let concrete = self.to_val(&self.default_type())?;
            return concrete.assign_to(ty);
        }
        let kind = ty.kind();
        match self.representable(ty)? {
            Constant::Bool(b) => Val::make_bool(ty, b),
            Constant::String(s) => Val::make_string(ty, &s),
            Constant::Int(i) | Constant::Rune(i) if kind.is_signed() => {
                Val::make_int(ty, i.to_i64().unwrap_or_default())
            }
            Constant::Int(i) | Constant::Rune(i) => Val::make_uint(ty, i.to_u64().unwrap_or_default()),
            Constant::Float(f) => Val::make_float(ty, f),
            Constant::Complex(re, im) => Val::make_complex(ty, re, im),
        }
    }

    /// The constant held by a value of basic kind.
    pub fn from_val(val: &Val) -> Option<Constant> {
        let kind = val.kind();
        if kind == Kind::Bool {
            return val.as_bool().map(Constant::Bool);
        }
        if kind == Kind::String {
            return val.as_str().map(|s| Constant::String(s.to_string()));
        }
        if kind.is_signed() {
            return val.as_int().map(Constant::from_i64);
        }
        if kind.is_unsigned() {
            return val.as_uint().map(|u| Constant::Int(BigInt::from(u)));
        }
        if kind.is_float() {
            return val.as_float().map(Constant::Float);
        }
        val.as_complex().map(|(re, im)| Constant::Complex(re, im))
    }
}

fn numeric_op(op: BinaryOp, a: &Constant, b: &Constant) -> Result<Constant, ReflectError> {
    match (a, b) {
        (Constant::Int(x) | Constant::Rune(x), Constant::Int(y) | Constant::Rune(y)) => {
            let result = match op {
                BinaryOp::Add => x + y,
                BinaryOp::Sub => x - y,
                BinaryOp::Mul => x * y,
                BinaryOp::Quo | BinaryOp::Rem if y.is_zero() => {
                    return Err(ReflectError::DivisionByZero)
                }
                BinaryOp::Quo => x / y,
                BinaryOp::Rem => x % y,
                BinaryOp::And => x & y,
                BinaryOp::Or => x | y,
                BinaryOp::Xor => x ^ y,
                BinaryOp::AndNot => x & !y,
                _ => return Err(a.undefined(op)),
            };
            let is_rune = matches!(a, Constant::Rune(_)) || matches!(b, Constant::Rune(_));
            Ok(if is_rune {
                Constant::Rune(result)
            } else {
                Constant::Int(result)
            })
        }
        (Constant::Float(x), Constant::Float(y)) => match op {
            BinaryOp::Add => Ok(Constant::Float(x + y)),
            BinaryOp::Sub => Ok(Constant::Float(x - y)),
            BinaryOp::Mul => Ok(Constant::Float(x * y)),
            BinaryOp::Quo if *y == 0.0 => Err(ReflectError::DivisionByZero),
            BinaryOp::Quo => Ok(Constant::Float(x / y)),
            _ => Err(a.undefined(op)),
        },
        (Constant::Complex(ar, ai), Constant::Complex(br, bi)) => {
            let (re, im) = complex_op(op, (*ar, *ai), (*br, *bi)).ok_or_else(|| a.undefined(op))??;
            Ok(Constant::Complex(re, im))
        }
        _ => Err(a.undefined(op)),
    }
}

/// Complex arithmetic; `None` for operators complex numbers lack.
pub fn complex_op(
    op: BinaryOp,
    (ar, ai): (f64, f64),
    (br, bi): (f64, f64),
) -> Option<Result<(f64, f64), ReflectError>> {
    Some(match op {
        BinaryOp::Add => Ok((ar + br, ai + bi)),
        BinaryOp::Sub => Ok((ar - br, ai - bi)),
        BinaryOp::Mul => Ok((ar * br - ai * bi, ar * bi + ai * br)),
        BinaryOp::Quo => {
            let denom = br * br + bi * bi;
            if denom == 0.0 {
                Err(ReflectError::DivisionByZero)
            } else {
                Ok(((ar * br + ai * bi) / denom, (ai * br - ar * bi) / denom))
            }
        }
        _ => return None,
    })
}

/// Map an ordering to the result of comparison operator `op`.
pub fn apply_ordering(op: BinaryOp, ordering: Ordering) -> Option<bool> {
    Some(match op {
        BinaryOp::Eql => ordering == Ordering::Equal,
        BinaryOp::Neq => ordering != Ordering::Equal,
        BinaryOp::Lss => ordering == Ordering::Less,
        BinaryOp::Leq => ordering != Ordering::Greater,
        BinaryOp::Gtr => ordering == Ordering::Greater,
        BinaryOp::Geq => ordering != Ordering::Less,
        _ => return None,
    })
}

fn float_to_integer(f: f64) -> Option<BigInt> {
    if !f.is_finite() || f.fract() != 0.0 {
        return None;
    }
    BigInt::from_f64(f)
}

fn integer_range(kind: Kind) -> (BigInt, BigInt) {
    let bits = kind.bits();
    if kind.is_signed() {
        let half = BigInt::one() << (bits - 1);
        (-half.clone(), half - BigInt::one())
    } else {
        (BigInt::zero(), (BigInt::one() << bits) - BigInt::one())
    }
}

/// Round to the float kind's precision; `None` on overflow.
fn round_float(kind: Kind, v: f64) -> Option<f64> {
    if !v.is_finite() {
        return None;
    }
    if kind == Kind::Float32 {
        if v.abs() > f64::from(f32::MAX) {
            return None;
        }
        return Some(f64::from(v as f32));
    }
    Some(v)
}

// =============================================================================
// Literal parsing
// =============================================================================

fn parse_int(text: &str) -> Option<BigInt> {
    let digits: String = text.chars().filter(|&c| c != '_').collect();
    let lower = digits.to_ascii_lowercase();
    let (radix, body) = if let Some(rest) = lower.strip_prefix("0x") {
        (16, rest)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (2, rest)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (8, rest)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (8, &lower[1..])
    } else {
        (10, lower.as_str())
    };
    if body.is_empty() {
        return None;
    }
    BigInt::parse_bytes(body.as_bytes(), radix)
}

fn parse_float(text: &str) -> Option<f64> {
    let digits: String = text.chars().filter(|&c| c != '_').collect();
    let lower = digits.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        return parse_hex_float(hex);
    }
    lower.parse::<f64>().ok()
}

/// Hexadecimal mantissa with a mandatory binary exponent: `1.8p3`.
fn parse_hex_float(text: &str) -> Option<f64> {
    let (mantissa, exp) = text.split_once('p')?;
    let exp: i32 = exp.parse().ok()?;
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    let mut value = 0.0_f64;
    for c in int_part.chars() {
        value = value * 16.0 + f64::from(c.to_digit(16)?);
    }
    let mut scale = 1.0 / 16.0;
    for c in frac_part.chars() {
        value += f64::from(c.to_digit(16)?) * scale;
        scale /= 16.0;
    }
    Some(value * 2f64.powi(exp))
}

/// Imaginary literal body. Legacy decimal forms with a leading zero
/// (`0123i`) are decimal, not octal.
fn parse_imag_body(body: &str) -> Option<f64> {
    let digits: String = body.chars().filter(|&c| c != '_').collect();
    let lower = digits.to_ascii_lowercase();
    let is_prefixed = ["0x", "0b", "0o"].iter().any(|p| lower.starts_with(p));
    if is_prefixed && !lower.contains('p') {
        return parse_int(&lower)?.to_f64();
    }
    if lower.starts_with("0x") {
        return parse_float(&lower);
    }
    lower.parse::<f64>().ok()
}

/// Decode one escape sequence starting after the backslash. Returns the
/// code point or byte value and whether it is a raw byte.
fn unescape(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, quote: char) -> Option<(u32, bool)> {
    let c = chars.next()?;
    let simple = match c {
        'a' => Some(0x07),
        'b' => Some(0x08),
        'f' => Some(0x0C),
        'n' => Some(0x0A),
        'r' => Some(0x0D),
        't' => Some(0x09),
        'v' => Some(0x0B),
        '\\' => Some(0x5C),
        c if c == quote => Some(u32::from(c)),
        _ => None,
    };
    if let Some(code) = simple {
        return Some((code, false));
    }
    let (count, radix, raw_byte) = match c {
        '0'..='7' => (2, 8, true),
        'x' => (2, 16, true),
        'u' => (4, 16, false),
        'U' => (8, 16, false),
        _ => return None,
    };
    let mut code = if radix == 8 { c.to_digit(8)? } else { 0 };
    for _ in 0..count {
        code = code.checked_mul(radix)?.checked_add(chars.next()?.to_digit(radix)?)?;
    }
    if raw_byte && code > 0xFF {
        return None;
    }
    if !raw_byte && char::from_u32(code).is_none() {
        return None;
    }
    Some((code, raw_byte))
}

fn unquote_char(body: &str) -> Option<u32> {
    let mut chars = body.chars().peekable();
    let code = match chars.next()? {
        '\\' => unescape(&mut chars, '\'')?.0,
        c => u32::from(c),
    };
    chars.next().is_none().then_some(code)
}

fn unquote_string(text: &str) -> Option<String> {
    if let Some(raw) = text.strip_prefix('`') {
        let raw = raw.strip_suffix('`')?;
        return Some(raw.chars().filter(|&c| c != '\r').collect());
    }
    let body = text.strip_prefix('"')?.strip_suffix('"')?;
    let mut bytes = Vec::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0u8; 4];
            bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        let (code, raw_byte) = unescape(&mut chars, '"')?;
        if raw_byte {
            bytes.push(code as u8);
        } else {
            let c = char::from_u32(code)?;
            let mut buf = [0u8; 4];
            bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
        }
    }
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

fn write_float(f: &mut fmt::Formatter<'_>, v: f64) -> fmt::Result {
    let magnitude = v.abs();
    if !v.is_finite() || v == 0.0 || (1e-4..1e21).contains(&magnitude) {
        write!(f, "{v}")
    } else {
        write!(f, "{v:e}")
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Bool(b) => write!(f, "{b}"),
            Constant::String(s) => write!(f, "{s:?}"),
            Constant::Int(i) | Constant::Rune(i) => write!(f, "{i}"),
            Constant::Float(v) => write_float(f, *v),
            Constant::Complex(re, im) => {
                f.write_str("(")?;
                write_float(f, *re)?;
                f.write_str(" + ")?;
                write_float(f, *im)?;
                f.write_str("i)")
            }
        }
    }
}

impl From<bool> for Constant {
    fn from(b: bool) -> Self {
        Constant::Bool(b)
    }
}

impl From<&str> for Constant {
    fn from(s: &str) -> Self {
        Constant::String(s.to_string())
    }
}

impl From<i64> for Constant {
    fn from(v: i64) -> Self {
        Constant::from_i64(v)
    }
}

impl From<f64> for Constant {
    fn from(v: f64) -> Self {
        Constant::Float(v)
    }
}

#[cfg(test)]
mod tests;
