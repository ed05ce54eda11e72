//! Evaluation results.
//!
//! An expression evaluates to one of four things: data, a type, a package
//! or a built-in function. Data further splits by constant status, which
//! decides how operands combine:
//!
//! - [`Data::UntypedConst`]: a bare constant such as `3` or `"s"`
//! - [`Data::TypedConst`]: a constant bound to a type, such as `int8(3)`
//! - [`Data::Regular`]: a runtime value with its type
//!
//! `nil` and the result of comparing non-constant operands are untyped too
//! and get variants of their own.

use std::fmt;

use goeval_reflect::{Constant, Kind, ReflectError, Type, Val};
use rustc_hash::FxHashMap;

use crate::errors::{not_assignable, untyped_nil, EvalResult};

/// Names visible to an expression.
pub type Args = FxHashMap<String, Value>;

/// Build an argument map from name/value pairs.
pub fn args_from<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Args
where
    K: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Result of evaluating an expression.
#[derive(Clone, Debug)]
pub enum Value {
    Data(Data),
    Type(Type),
    Package(Package),
    BuiltInFunc(BuiltInFunc),
}

impl Value {
    #[inline]
    pub fn regular(val: Val) -> Value {
        Value::Data(Data::Regular(val))
    }

    #[inline]
    pub fn untyped(constant: Constant) -> Value {
        Value::Data(Data::UntypedConst(constant))
    }

    #[inline]
    pub fn nil() -> Value {
        Value::Data(Data::Nil)
    }

    pub fn as_data(&self) -> Option<&Data> {
        match self {
            Value::Data(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<&Type> {
        match self {
            Value::Type(t) => Some(t),
            _ => None,
        }
    }

    /// Short description for diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Value::Data(d) => d.describe(),
            Value::Type(t) => format!("type {t}"),
            Value::Package(_) => "package".to_string(),
            Value::BuiltInFunc(f) => format!("built-in {f}"),
        }
    }
}

impl From<Data> for Value {
    fn from(d: Data) -> Self {
        Value::Data(d)
    }
}

impl From<Val> for Value {
    fn from(v: Val) -> Self {
        Value::regular(v)
    }
}

impl From<Type> for Value {
    fn from(t: Type) -> Self {
        Value::Type(t)
    }
}

impl From<Package> for Value {
    fn from(p: Package) -> Self {
        Value::Package(p)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Data(d) => write!(f, "{d}"),
            Value::Type(t) => write!(f, "{t}"),
            Value::Package(p) => write!(f, "package({} members)", p.len()),
            Value::BuiltInFunc(b) => write!(f, "{b}"),
        }
    }
}

// =============================================================================
// Data
// =============================================================================

/// A value-producing result.
#[derive(Clone, Debug, PartialEq)]
pub enum Data {
    /// The untyped `nil`.
    Nil,
    Regular(Val),
    TypedConst(TypedConst),
    UntypedConst(Constant),
    /// Untyped boolean that is not a constant, e.g. `x == y` on variables.
    UntypedBool(bool),
}

impl Data {
    pub fn is_constant(&self) -> bool {
        matches!(self, Data::TypedConst(_) | Data::UntypedConst(_))
    }

    pub fn is_untyped(&self) -> bool {
        matches!(
            self,
            Data::Nil | Data::UntypedConst(_) | Data::UntypedBool(_)
        )
    }

    /// Static type, if the data has one.
    pub fn ty(&self) -> Option<&Type> {
        match self {
            Data::Regular(v) => Some(v.ty()),
            Data::TypedConst(c) => Some(c.ty()),
            _ => None,
        }
    }

    pub fn as_regular(&self) -> Option<&Val> {
        match self {
            Data::Regular(v) => Some(v),
            _ => None,
        }
    }

    /// The constant behind a typed or untyped constant.
    pub fn constant(&self) -> Option<&Constant> {
        match self {
            Data::TypedConst(c) => Some(c.value()),
            Data::UntypedConst(c) => Some(c),
            _ => None,
        }
    }

    /// Runtime value; untyped constants take their default type.
    pub fn to_regular(&self) -> EvalResult<Val> {
        match self {
            Data::Nil => Err(untyped_nil()),
            Data::Regular(v) => Ok(v.clone()),
            Data::TypedConst(c) => Ok(c.to_val()?),
            Data::UntypedConst(c) => Ok(c.to_val(&c.default_type())?),
            Data::UntypedBool(b) => Ok(Val::bool(*b)),
        }
    }

    /// Runtime value stored in a variable of type `ty`, following the
    /// assignability rules: constants must be representable, `nil` needs a
    /// nil-able type, and concrete values are boxed into interfaces.
    pub fn assign_to(&self, ty: &Type) -> EvalResult<Val> {
        match self {
            Data::Nil if ty.kind().is_nillable() => Ok(Val::zero(ty)),
            Data::Nil => Err(not_assignable(self, ty)),
            Data::Regular(v) => v.assign_to(ty).map_err(|_| not_assignable(self, ty)),
            Data::TypedConst(c) => c
                .to_val()?
                .assign_to(ty)
                .map_err(|_| not_assignable(self, ty)),
            Data::UntypedConst(c) => Ok(c.to_val(ty)?),
            Data::UntypedBool(b) => match ty.kind() {
                Kind::Bool => Ok(Val::make_bool(ty, *b)?),
                Kind::Interface => Val::bool(*b)
                    .assign_to(ty)
                    .map_err(|_| not_assignable(self, ty)),
                _ => Err(not_assignable(self, ty)),
            },
        }
    }

    /// Short description for diagnostics: value and type or constant kind.
    pub fn describe(&self) -> String {
        match self {
            Data::Nil => "nil".to_string(),
            Data::Regular(v) => format!("{v} (value of type {})", v.ty()),
            Data::TypedConst(c) => format!("{} (constant of type {})", c.value(), c.ty()),
            Data::UntypedConst(c) => format!("{c} ({} constant)", c.kind_name()),
            Data::UntypedBool(b) => format!("{b} (untyped bool value)"),
        }
    }
}

impl From<Val> for Data {
    fn from(v: Val) -> Self {
        Data::Regular(v)
    }
}

impl From<Constant> for Data {
    fn from(c: Constant) -> Self {
        Data::UntypedConst(c)
    }
}

impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Data::Nil => f.write_str("nil"),
            Data::Regular(v) => write!(f, "{v}"),
            Data::TypedConst(c) => write!(f, "{}", c.value()),
            Data::UntypedConst(c) => write!(f, "{c}"),
            Data::UntypedBool(b) => write!(f, "{b}"),
        }
    }
}

/// A constant bound to a basic type.
///
/// The value is always representable in the type; [`TypedConst::new`] is
/// the only constructor and normalizes the value to the type's kind.
#[derive(Clone, Debug, PartialEq)]
pub struct TypedConst {
    value: Constant,
    ty: Type,
}

impl TypedConst {
    pub fn new(value: &Constant, ty: &Type) -> Result<TypedConst, ReflectError> {
        let value = value.representable(ty)?;
        Ok(TypedConst {
            value,
            ty: ty.clone(),
        })
    }

    #[inline]
    pub fn value(&self) -> &Constant {
        &self.value
    }

    #[inline]
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn to_val(&self) -> Result<Val, ReflectError> {
        self.value.to_val(&self.ty)
    }
}

// =============================================================================
// Packages and built-ins
// =============================================================================

/// Exported members of a host package, reachable as `pkg.Name`.
#[derive(Clone, Debug, Default)]
pub struct Package {
    members: FxHashMap<String, Value>,
}

impl Package {
    pub fn new() -> Self {
        Package::default()
    }

    /// Add a member.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.members.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.members.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.members.get(name)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Package {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Package {
            members: args_from(iter),
        }
    }
}

/// Predeclared functions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BuiltInFunc {
    Append,
    Cap,
    Complex,
    Copy,
    Delete,
    Imag,
    Len,
    Make,
    New,
    Real,
}

impl BuiltInFunc {
    pub fn from_name(name: &str) -> Option<BuiltInFunc> {
        Some(match name {
            "append" => BuiltInFunc::Append,
            "cap" => BuiltInFunc::Cap,
            "complex" => BuiltInFunc::Complex,
            "copy" => BuiltInFunc::Copy,
            "delete" => BuiltInFunc::Delete,
            "imag" => BuiltInFunc::Imag,
            "len" => BuiltInFunc::Len,
            "make" => BuiltInFunc::Make,
            "new" => BuiltInFunc::New,
            "real" => BuiltInFunc::Real,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            BuiltInFunc::Append => "append",
            BuiltInFunc::Cap => "cap",
            BuiltInFunc::Complex => "complex",
            BuiltInFunc::Copy => "copy",
            BuiltInFunc::Delete => "delete",
            BuiltInFunc::Imag => "imag",
            BuiltInFunc::Len => "len",
            BuiltInFunc::Make => "make",
            BuiltInFunc::New => "new",
            BuiltInFunc::Real => "real",
        }
    }
}

impl fmt::Display for BuiltInFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests;
