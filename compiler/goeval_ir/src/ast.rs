//! Expression and type-literal nodes.
//!
//! The node set mirrors the host grammar's expression productions. Type
//! literals (`[]T`, `map[K]V`, `struct{...}`, ...) are expressions too: in
//! the host language a type can appear wherever an operand can.

use crate::{ExprId, ExprRange, FieldRange, Name, NameRange, Span};

/// Expression node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    #[inline]
    pub const fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

/// Kind of basic literal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LitKind {
    Int,
    Float,
    Imag,
    Char,
    String,
}

/// Channel direction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ChanDir {
    /// `chan T`
    Both,
    /// `chan<- T`
    Send,
    /// `<-chan T`
    Recv,
}

/// A group of fields or parameters sharing one type: `a, b int "tag"`.
///
/// `names` is empty for an embedded struct field or an unnamed parameter.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FieldGroup {
    pub names: NameRange,
    pub ty: ExprId,
    /// Tag literal node; only string literals are accepted at evaluation time.
    pub tag: Option<ExprId>,
    pub span: Span,
}

/// Expression kinds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExprKind {
    /// Identifier: `x`, `int`, `len`.
    Ident(Name),

    /// Literal with its raw source text: `42`, `0x1p-2`, `'a'`, `"s"`.
    BasicLit { kind: LitKind, text: Name },

    /// `(x)`
    Paren(ExprId),

    /// `x.Sel`
    Selector { x: ExprId, sel: Name },

    /// `x[index]`
    Index { x: ExprId, index: ExprId },

    /// `x[low:high]` or `x[low:high:max]`.
    Slice {
        x: ExprId,
        low: Option<ExprId>,
        high: Option<ExprId>,
        max: Option<ExprId>,
        slice3: bool,
    },

    /// `x.(T)`
    TypeAssert { x: ExprId, ty: ExprId },

    /// `f(args)` / `f(args...)`
    Call {
        func: ExprId,
        args: ExprRange,
        ellipsis: bool,
    },

    /// `*x`: dereference or pointer type.
    Star(ExprId),

    Unary { op: crate::UnaryOp, x: ExprId },

    Binary {
        op: crate::BinaryOp,
        x: ExprId,
        y: ExprId,
    },

    /// `key: value` inside a composite literal.
    KeyValue { key: ExprId, value: ExprId },

    /// `T{elts}`; `ty` is `None` for an elided element type.
    CompositeLit { ty: Option<ExprId>, elts: ExprRange },

    /// `func(...) ... { ... }`; the body is skipped by the parser.
    FuncLit { ty: ExprId },

    /// `...T` in a parameter list or `...` as an array length.
    Ellipsis(Option<ExprId>),

    /// `[len]T`, `[...]T`, or `[]T` when `len` is `None`.
    ArrayType { len: Option<ExprId>, elt: ExprId },

    StructType(FieldRange),

    FuncType {
        params: FieldRange,
        results: FieldRange,
    },

    InterfaceType(FieldRange),

    MapType { key: ExprId, value: ExprId },

    ChanType { dir: ChanDir, value: ExprId },

    /// Placeholder for syntax the parser could not make sense of.
    Bad,
}

impl ExprKind {
    /// Short node name for diagnostics.
    pub fn description(&self) -> &'static str {
        match self {
            ExprKind::Ident(_) => "identifier",
            ExprKind::BasicLit { .. } => "literal",
            ExprKind::Paren(_) => "parenthesized expression",
            ExprKind::Selector { .. } => "selector",
            ExprKind::Index { .. } => "index expression",
            ExprKind::Slice { .. } => "slice expression",
            ExprKind::TypeAssert { .. } => "type assertion",
            ExprKind::Call { .. } => "call",
            ExprKind::Star(_) => "star expression",
            ExprKind::Unary { .. } => "unary expression",
            ExprKind::Binary { .. } => "binary expression",
            ExprKind::KeyValue { .. } => "key-value pair",
            ExprKind::CompositeLit { .. } => "composite literal",
            ExprKind::FuncLit { .. } => "function literal",
            ExprKind::Ellipsis(_) => "ellipsis",
            ExprKind::ArrayType { .. } => "array type",
            ExprKind::StructType(_) => "struct type",
            ExprKind::FuncType { .. } => "function type",
            ExprKind::InterfaceType(_) => "interface type",
            ExprKind::MapType { .. } => "map type",
            ExprKind::ChanType { .. } => "channel type",
            ExprKind::Bad => "bad expression",
        }
    }
}
