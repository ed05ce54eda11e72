//! Goeval Reflect - a small runtime reflection model.
//!
//! The evaluator builds and inspects types at run time (`[]T`, `map[K]V`,
//! `struct{...}`) and operates on values whose type is only known then.
//! This crate supplies that model:
//!
//! - [`Type`]: shared, immutable type descriptors with nominal identity for
//!   named types and structural identity otherwise
//! - [`Val`]: a runtime value paired with its type, optionally addressable
//! - [`Constant`]: arbitrary-precision untyped constants and their arithmetic
//! - [`builtin_type`]: the predeclared type table (`int`, `string`, `error`, ...)
//!
//! Builders that the host language would abort on (duplicate struct fields,
//! map keys without equality) return [`ReflectError`] instead.

mod builtin;
mod constant;
mod error;
mod kind;
mod types;
mod value;

pub use builtin::{builtin_type, builtin_type_names};
pub use constant::{apply_ordering, complex_op, Constant};
pub use error::ReflectError;
pub use goeval_ir::ChanDir;
pub use kind::Kind;
pub use types::{IfaceMethod, Method, StructField, Type, MAX_ELEMS};
pub use value::{NativeFunc, Place, Val};

#[cfg(test)]
mod tests;
