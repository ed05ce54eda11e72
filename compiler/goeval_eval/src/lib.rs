//! Goeval Eval - evaluator for single Go expressions.
//!
//! Interprets one parsed expression against a flat map of caller-supplied
//! bindings and produces data, a type, a package or a built-in function.
//!
//! # Architecture
//!
//! - `evaluator`: dispatcher with one handler per syntax node kind
//! - `operators`: binary, comparison, shift and unary semantics over [`Data`]
//! - `call`: regular calls, built-in functions and conversions
//! - `composite`: struct, array, slice and map literal builders
//! - [`Expression`]: parse-once, evaluate-many entry point
//!
//! Runtime types and values come from `goeval_reflect`; the syntax tree
//! comes from `goeval_ir` via `goeval_parse`.

mod call;
mod composite;
mod context;
pub mod errors;
mod evaluator;
mod expression;
mod operators;
mod value;

pub use context::{EvalContext, EvalContextBuilder};
pub use errors::{EvalError, EvalErrorKind, EvalResult};
pub use evaluator::Evaluator;
pub use expression::Expression;
pub use operators::{binary_op, compare_op, shift_op, unary_op};
pub use value::{args_from, Args, BuiltInFunc, Data, Package, TypedConst, Value};

pub use call::{call_builtin, call_regular, convert_call};
pub use composite::{array_like, map_from_pairs, struct_by_keys, struct_by_position};

#[cfg(test)]
mod tests;
