//! Errors raised by type construction and value operations.

/// Failure inside the reflection model.
///
/// Every operation that the host runtime would abort on reports one of
/// these instead.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ReflectError {
    #[error("invalid map key type {0}")]
    InvalidMapKey(String),

    #[error("duplicate field {0}")]
    DuplicateField(String),

    #[error("invalid field name {0:?}")]
    InvalidFieldName(String),

    #[error("embedded field type {0} must be a type name or pointer to a type name")]
    InvalidEmbeddedField(String),

    #[error("cannot convert {from} to type {to}")]
    NotConvertible { from: String, to: String },

    #[error("cannot use {from} as type {to}")]
    NotAssignable { from: String, to: String },

    #[error("constant {value} overflows {ty}")]
    ConstantOverflow { value: String, ty: String },

    #[error("cannot represent {value} as {ty}")]
    NotRepresentable { value: String, ty: String },

    #[error("division by zero")]
    DivisionByZero,

    #[error("shift count {0} too large")]
    ShiftCountTooLarge(String),

    #[error("operator {op} not defined on {operand}")]
    UndefinedOperator { op: String, operand: String },

    #[error("index out of range [{index}] with length {len}")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("slice bounds out of range [{bounds}] with capacity {cap}")]
    SliceBounds { bounds: String, cap: usize },

    #[error("cannot slice string at non-character boundary [{low}:{high}]")]
    StringBoundary { low: usize, high: usize },

    #[error("slice of unaddressable array")]
    UnaddressableArray,

    #[error("invalid memory address or nil pointer dereference")]
    NilDereference,

    #[error("assignment to entry in nil map")]
    NilMapWrite,

    #[error("call of nil function")]
    NilFunc,

    #[error("wrong argument count: want {want}, got {got}")]
    ArgCount { want: usize, got: usize },

    #[error("function returned {got} results, its type declares {want}")]
    ResultCount { want: usize, got: usize },

    #[error("{0}")]
    CallFailed(String),

    #[error("comparing uncomparable type {0}")]
    Uncomparable(String),

    #[error("call of {method} on {kind} value")]
    KindMismatch { method: &'static str, kind: String },

    #[error("negative {what} argument")]
    NegativeSize { what: &'static str },

    #[error("{what} out of range")]
    SizeOutOfRange { what: &'static str },

    #[error("{what} of {len} elements exceeds the limit of {max}")]
    TooLarge {
        what: &'static str,
        len: usize,
        max: usize,
    },
}
