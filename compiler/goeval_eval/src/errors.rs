//! Evaluation errors.
//!
//! Every condition the evaluator reports has an [`EvalErrorKind`] variant
//! and a `#[cold]` factory function. Errors pick up a source position as
//! they unwind: the innermost handler that fails attaches its node's span,
//! and enclosing handlers never replace it.

use std::fmt;

use goeval_ir::Span;
use goeval_reflect::ReflectError;

use crate::{Data, Value};

/// Result of evaluation.
pub type EvalResult<T = Value> = Result<T, EvalError>;

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EvalErrorKind {
    // Names and selectors
    #[error("undefined: {0}")]
    UndefinedIdent(String),
    #[error("invalid selector base {0}")]
    InvalidSelectorBase(String),
    #[error("method expressions on interface types are not supported")]
    InterfaceMethodExpr,

    // Dispatcher
    #[error("internal error: expression node missing from arena")]
    MissingNode,
    #[error("unsupported syntax: {0}")]
    UnsupportedSyntax(&'static str),
    #[error("{0} is not an expression")]
    NotExpression(String),
    #[error("{0} is not a type")]
    NotType(String),
    #[error("invalid literal {0}")]
    InvalidLiteral(String),

    // Calls and conversions
    #[error("cannot call non-function {0}")]
    NotCallable(String),
    #[error("invalid use of ... in conversion to {0}")]
    ConversionWithEllipsis(String),
    #[error("conversion to {ty} needs exactly one argument, got {got}")]
    ConversionArgCount { ty: String, got: usize },
    #[error("cannot convert {value} to type {ty}")]
    InvalidConversion { value: String, ty: String },
    #[error("cannot use {value} as {ty} value")]
    NotAssignable { value: String, ty: String },
    #[error("wrong number of arguments in call to {func}: want {want}, got {got}")]
    ArgCount {
        func: String,
        want: usize,
        got: usize,
    },
    #[error("function {func} returns {got} values, expected exactly one")]
    ResultCount { func: String, got: usize },
    #[error("cannot use ... in call to non-variadic {0}")]
    NonVariadicEllipsis(String),
    #[error("invalid use of ... with built-in {0}")]
    BuiltinEllipsis(&'static str),
    #[error("wrong number of arguments to built-in {func}: got {got}")]
    BuiltinArgCount { func: &'static str, got: usize },
    #[error("invalid argument {arg} for built-in {func}")]
    InvalidBuiltinArg { func: &'static str, arg: String },
    #[error("use of untyped nil")]
    UntypedNil,

    // Operators
    #[error("invalid operation: operator {op} not defined on {operand}")]
    UndefinedOperator { op: String, operand: String },
    #[error("invalid operation: mismatched types {x} and {y}")]
    MismatchedTypes { x: String, y: String },
    #[error("invalid shift count {0}")]
    InvalidShiftCount(String),
    #[error("cannot take address of {0}")]
    Unaddressable(String),
    #[error("invalid indirect of {0}")]
    InvalidIndirect(String),

    // Index and slice
    #[error("invalid operation: cannot index {x} with {index}")]
    InvalidIndex { x: String, index: String },
    #[error("cannot slice {0}")]
    InvalidSliceType(String),
    #[error("invalid slice index {0}")]
    InvalidSliceIndex(String),

    // Type literals
    #[error("invalid array bound {0}")]
    InvalidArrayBound(String),
    #[error("array bound must be non-negative")]
    NegativeArrayBound,
    #[error("struct tag must be a string literal")]
    NonStringTag,
    #[error("interface types with methods are not supported")]
    UnsupportedInterface,
    #[error("can only use ... with final parameter in list")]
    InvalidVariadic,

    // Composite literals
    #[error("invalid composite literal type {0}")]
    InvalidCompositeType(String),
    #[error("missing type in composite literal")]
    MissingCompositeType,
    #[error("mixture of field:value and value initializers")]
    MixedInit,
    #[error("invalid field name in struct initializer")]
    InvalidFieldName,
    #[error("unknown field {field} in struct literal of type {ty}")]
    UnknownField { field: String, ty: String },
    #[error("duplicate field name {0} in struct literal")]
    DuplicateField(String),
    #[error("implicit assignment of unexported field {field} in {ty} literal")]
    UnexportedField { field: String, ty: String },
    #[error("wrong number of values in struct literal of type {ty}: want {want}, got {got}")]
    StructValueCount {
        ty: String,
        want: usize,
        got: usize,
    },
    #[error("index must be non-negative integer constant")]
    InvalidArrayIndex,
    #[error("duplicate index {0} in array or slice literal")]
    DuplicateIndex(usize),
    #[error("array index {index} out of bounds [0:{len}]")]
    ArrayIndexOutOfBounds { index: usize, len: usize },
    #[error("missing key in map literal")]
    MissingMapKey,

    // Type assertions
    #[error("invalid type assertion: {0} is not an interface value")]
    InvalidAssertOperand(String),
    #[error("impossible type assertion: {ty} does not implement {iface}")]
    ImpossibleAssertion { iface: String, ty: String },
    #[error("interface conversion: {iface} is {dynamic}, not {ty}")]
    AssertionFailed {
        iface: String,
        dynamic: String,
        ty: String,
    },

    #[error(transparent)]
    Reflect(#[from] ReflectError),
}

/// An evaluation failure and where it happened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    /// `None` only for failures that have no node to point at.
    pub span: Option<Span>,
}

impl EvalError {
    pub fn from_kind(kind: EvalErrorKind) -> Self {
        EvalError { kind, span: None }
    }

    /// Attach a source span, replacing any existing one.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Attach a source span unless an inner handler already did.
    #[must_use]
    pub fn with_span_if_missing(mut self, span: Span) -> Self {
        if self.span.is_none() {
            self.span = Some(span);
        }
        self
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.span {
            Some(span) => write!(f, "{} at {span}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for EvalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            EvalErrorKind::Reflect(inner) => Some(inner),
            _ => None,
        }
    }
}

impl From<EvalErrorKind> for EvalError {
    fn from(kind: EvalErrorKind) -> Self {
        EvalError::from_kind(kind)
    }
}

impl From<ReflectError> for EvalError {
    fn from(err: ReflectError) -> Self {
        EvalError::from_kind(EvalErrorKind::Reflect(err))
    }
}

/// Position attachment for results flowing out of a handler.
pub(crate) trait ResultExt<T> {
    /// Tag the error with `span` unless it already carries one.
    fn at(self, span: Span) -> EvalResult<T>;
}

impl<T, E: Into<EvalError>> ResultExt<T> for Result<T, E> {
    #[inline]
    fn at(self, span: Span) -> EvalResult<T> {
        self.map_err(|e| e.into().with_span_if_missing(span))
    }
}

// Names and selectors

#[cold]
pub fn undefined_ident(name: &str) -> EvalError {
    EvalErrorKind::UndefinedIdent(name.to_string()).into()
}

#[cold]
pub fn invalid_selector_base(x: &Value) -> EvalError {
    EvalErrorKind::InvalidSelectorBase(x.describe()).into()
}

#[cold]
pub fn interface_method_expr() -> EvalError {
    EvalErrorKind::InterfaceMethodExpr.into()
}

// Dispatcher

#[cold]
pub fn missing_node() -> EvalError {
    EvalErrorKind::MissingNode.into()
}

#[cold]
pub fn unsupported_syntax(what: &'static str) -> EvalError {
    EvalErrorKind::UnsupportedSyntax(what).into()
}

#[cold]
pub fn not_expression(value: &Value) -> EvalError {
    EvalErrorKind::NotExpression(value.describe()).into()
}

#[cold]
pub fn not_type(value: &Value) -> EvalError {
    EvalErrorKind::NotType(value.describe()).into()
}

#[cold]
pub fn invalid_literal(text: &str) -> EvalError {
    EvalErrorKind::InvalidLiteral(text.to_string()).into()
}

// Calls and conversions

#[cold]
pub fn not_callable(value: &Value) -> EvalError {
    EvalErrorKind::NotCallable(value.describe()).into()
}

#[cold]
pub fn conversion_with_ellipsis(ty: &goeval_reflect::Type) -> EvalError {
    EvalErrorKind::ConversionWithEllipsis(ty.to_string()).into()
}

#[cold]
pub fn conversion_arg_count(ty: &goeval_reflect::Type, got: usize) -> EvalError {
    EvalErrorKind::ConversionArgCount {
        ty: ty.to_string(),
        got,
    }
    .into()
}

#[cold]
pub fn invalid_conversion(value: &Data, ty: &goeval_reflect::Type) -> EvalError {
    EvalErrorKind::InvalidConversion {
        value: value.describe(),
        ty: ty.to_string(),
    }
    .into()
}

#[cold]
pub fn not_assignable(value: &Data, ty: &goeval_reflect::Type) -> EvalError {
    EvalErrorKind::NotAssignable {
        value: value.describe(),
        ty: ty.to_string(),
    }
    .into()
}

#[cold]
pub fn arg_count(func: &goeval_reflect::Type, want: usize, got: usize) -> EvalError {
    EvalErrorKind::ArgCount {
        func: func.to_string(),
        want,
        got,
    }
    .into()
}

#[cold]
pub fn result_count(func: &goeval_reflect::Type, got: usize) -> EvalError {
    EvalErrorKind::ResultCount {
        func: func.to_string(),
        got,
    }
    .into()
}

#[cold]
pub fn non_variadic_ellipsis(func: &goeval_reflect::Type) -> EvalError {
    EvalErrorKind::NonVariadicEllipsis(func.to_string()).into()
}

#[cold]
pub fn builtin_ellipsis(func: &'static str) -> EvalError {
    EvalErrorKind::BuiltinEllipsis(func).into()
}

#[cold]
pub fn builtin_arg_count(func: &'static str, got: usize) -> EvalError {
    EvalErrorKind::BuiltinArgCount { func, got }.into()
}

#[cold]
pub fn invalid_builtin_arg(func: &'static str, arg: &dyn fmt::Display) -> EvalError {
    EvalErrorKind::InvalidBuiltinArg {
        func,
        arg: arg.to_string(),
    }
    .into()
}

#[cold]
pub fn untyped_nil() -> EvalError {
    EvalErrorKind::UntypedNil.into()
}

// Operators

#[cold]
pub fn undefined_operator(op: &dyn fmt::Display, operand: &dyn fmt::Display) -> EvalError {
    EvalErrorKind::UndefinedOperator {
        op: op.to_string(),
        operand: operand.to_string(),
    }
    .into()
}

#[cold]
pub fn mismatched_types(x: &dyn fmt::Display, y: &dyn fmt::Display) -> EvalError {
    EvalErrorKind::MismatchedTypes {
        x: x.to_string(),
        y: y.to_string(),
    }
    .into()
}

#[cold]
pub fn invalid_shift_count(count: &Data) -> EvalError {
    EvalErrorKind::InvalidShiftCount(count.describe()).into()
}

#[cold]
pub fn unaddressable(x: &Data) -> EvalError {
    EvalErrorKind::Unaddressable(x.describe()).into()
}

#[cold]
pub fn invalid_indirect(x: &Value) -> EvalError {
    EvalErrorKind::InvalidIndirect(x.describe()).into()
}

// Index and slice

#[cold]
pub fn invalid_index(x: &Data, index: &Data) -> EvalError {
    EvalErrorKind::InvalidIndex {
        x: x.describe(),
        index: index.describe(),
    }
    .into()
}

#[cold]
pub fn invalid_slice_type(x: &Data) -> EvalError {
    EvalErrorKind::InvalidSliceType(x.describe()).into()
}

#[cold]
pub fn invalid_slice_index(index: &Data) -> EvalError {
    EvalErrorKind::InvalidSliceIndex(index.describe()).into()
}

// Type literals

#[cold]
pub fn invalid_array_bound(len: &Data) -> EvalError {
    EvalErrorKind::InvalidArrayBound(len.describe()).into()
}

#[cold]
pub fn negative_array_bound() -> EvalError {
    EvalErrorKind::NegativeArrayBound.into()
}

#[cold]
pub fn non_string_tag() -> EvalError {
    EvalErrorKind::NonStringTag.into()
}

#[cold]
pub fn unsupported_interface() -> EvalError {
    EvalErrorKind::UnsupportedInterface.into()
}

#[cold]
pub fn invalid_variadic() -> EvalError {
    EvalErrorKind::InvalidVariadic.into()
}

// Composite literals

#[cold]
pub fn invalid_composite_type(ty: &goeval_reflect::Type) -> EvalError {
    EvalErrorKind::InvalidCompositeType(ty.to_string()).into()
}

#[cold]
pub fn missing_composite_type() -> EvalError {
    EvalErrorKind::MissingCompositeType.into()
}

#[cold]
pub fn mixed_init() -> EvalError {
    EvalErrorKind::MixedInit.into()
}

#[cold]
pub fn invalid_field_name() -> EvalError {
    EvalErrorKind::InvalidFieldName.into()
}

#[cold]
pub fn unknown_field(field: &str, ty: &goeval_reflect::Type) -> EvalError {
    EvalErrorKind::UnknownField {
        field: field.to_string(),
        ty: ty.to_string(),
    }
    .into()
}

#[cold]
pub fn duplicate_field(field: &str) -> EvalError {
    EvalErrorKind::DuplicateField(field.to_string()).into()
}

#[cold]
pub fn unexported_field(field: &str, ty: &goeval_reflect::Type) -> EvalError {
    EvalErrorKind::UnexportedField {
        field: field.to_string(),
        ty: ty.to_string(),
    }
    .into()
}

#[cold]
pub fn struct_value_count(ty: &goeval_reflect::Type, want: usize, got: usize) -> EvalError {
    EvalErrorKind::StructValueCount {
        ty: ty.to_string(),
        want,
        got,
    }
    .into()
}

#[cold]
pub fn invalid_array_index() -> EvalError {
    EvalErrorKind::InvalidArrayIndex.into()
}

#[cold]
pub fn duplicate_index(index: usize) -> EvalError {
    EvalErrorKind::DuplicateIndex(index).into()
}

#[cold]
pub fn array_index_out_of_bounds(index: usize, len: usize) -> EvalError {
    EvalErrorKind::ArrayIndexOutOfBounds { index, len }.into()
}

#[cold]
pub fn missing_map_key() -> EvalError {
    EvalErrorKind::MissingMapKey.into()
}

// Type assertions

#[cold]
pub fn invalid_assert_operand(x: &Data) -> EvalError {
    EvalErrorKind::InvalidAssertOperand(x.describe()).into()
}

#[cold]
pub fn impossible_assertion(iface: &goeval_reflect::Type, ty: &goeval_reflect::Type) -> EvalError {
    EvalErrorKind::ImpossibleAssertion {
        iface: iface.to_string(),
        ty: ty.to_string(),
    }
    .into()
}

#[cold]
pub fn assertion_failed(
    iface: &goeval_reflect::Type,
    dynamic: &dyn fmt::Display,
    ty: &goeval_reflect::Type,
) -> EvalError {
    EvalErrorKind::AssertionFailed {
        iface: iface.to_string(),
        dynamic: dynamic.to_string(),
        ty: ty.to_string(),
    }
    .into()
}
