//! Goeval IR - syntax tree types shared by the parser and the evaluator.
//!
//! The tree is flat: every node lives in an [`ExprArena`] and refers to its
//! children through [`ExprId`] indices. Child lists (call arguments,
//! composite-literal elements, field lists) are stored as contiguous ranges
//! inside the arena so nodes stay `Copy`.

mod arena;
mod ast;
mod expr_id;
mod operators;
mod span;

pub use arena::ExprArena;
pub use ast::{ChanDir, Expr, ExprKind, FieldGroup, LitKind};
pub use expr_id::{ExprId, ExprRange, FieldRange, Name, NameRange};
pub use operators::{BinaryOp, UnaryOp};
pub use span::Span;
