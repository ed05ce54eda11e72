//! Expression evaluator.
//!
//! One dispatcher, [`Evaluator::eval`], matches on the node kind and hands
//! the node to its handler. Handlers re-enter the dispatcher for child
//! nodes and combine the results with the operator engine, the call
//! dispatcher and the composite builders.
//!
//! # Error positions
//!
//! The dispatcher tags every error leaving a node with that node's span
//! unless the error already carries one. Since children are evaluated
//! through the dispatcher too, the innermost failing node wins.
//!
//! # Handlers
//!
//! - `names`: identifiers and selectors
//! - `ops`: operators, indexing, slicing, indirection, type assertions
//! - `calls`: calls and conversions
//! - `literals`: basic and composite literals
//! - `types`: type literals

mod calls;
mod literals;
mod names;
mod ops;
mod types;

use goeval_ir::{Expr, ExprArena, ExprId, ExprKind, Span};
use goeval_reflect::Type;
use goeval_stack::ensure_sufficient_stack;

use crate::errors::{missing_node, not_expression, not_type, unsupported_syntax, ResultExt};
use crate::{Args, Data, EvalContext, EvalResult, Value};

/// Evaluates nodes of one arena against one set of bindings.
///
/// Holds only shared borrows: evaluation never mutates the tree, the
/// context or the bindings.
pub struct Evaluator<'a> {
    arena: &'a ExprArena,
    ctx: &'a EvalContext,
    args: &'a Args,
}

impl<'a> Evaluator<'a> {
    pub fn new(arena: &'a ExprArena, ctx: &'a EvalContext, args: &'a Args) -> Self {
        Evaluator { arena, ctx, args }
    }

    /// Evaluate node `id`.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn eval(&self, id: ExprId) -> EvalResult {
        ensure_sufficient_stack(|| self.eval_inner(id))
    }

    fn eval_inner(&self, id: ExprId) -> EvalResult {
        let Some(&Expr { kind, span }) = self.arena.get(id) else {
            return Err(missing_node());
        };
        let result = match kind {
            ExprKind::Ident(name) => self.eval_ident(self.arena.lookup(name)),
            ExprKind::BasicLit { kind, text } => self.eval_basic_lit(kind, text),
            ExprKind::Paren(inner) => self.eval(inner),
            ExprKind::Selector { x, sel } => self.eval_selector(x, sel),
            ExprKind::Index { x, index } => self.eval_index(x, index),
            ExprKind::Slice {
                x,
                low,
                high,
                max,
                slice3,
            } => self.eval_slice(x, [low, high, max], slice3),
            ExprKind::TypeAssert { x, ty } => self.eval_type_assert(x, ty),
            ExprKind::Call {
                func,
                args,
                ellipsis,
            } => self.eval_call(func, args, ellipsis),
            ExprKind::Star(x) => self.eval_star(x),
            ExprKind::Unary { op, x } => self.eval_unary(op, x),
            ExprKind::Binary { op, x, y } => self.eval_binary(op, x, y),
            ExprKind::CompositeLit { ty, elts } => self.eval_composite_lit(ty, elts),
            ExprKind::Ellipsis(elt) => self.eval_ellipsis_type(elt),
            ExprKind::ArrayType { len, elt } => self.eval_array_type(len, elt),
            ExprKind::StructType(fields) => self.eval_struct_type(fields),
            ExprKind::FuncType { params, results } => self.eval_func_type(params, results),
            ExprKind::InterfaceType(methods) => self.eval_interface_type(methods),
            ExprKind::MapType { key, value } => self.eval_map_type(key, value),
            ExprKind::ChanType { dir, value } => self.eval_chan_type(dir, value),
            ExprKind::FuncLit { .. } => Err(unsupported_syntax("function literal")),
            ExprKind::KeyValue { .. } => {
                Err(unsupported_syntax("key-value pair outside a composite literal"))
            }
            ExprKind::Bad => Err(unsupported_syntax("malformed expression")),
        };
        result.at(span)
    }

    /// Evaluate a node that must produce data.
    pub fn eval_data(&self, id: ExprId) -> EvalResult<Data> {
        match self.eval(id)? {
            Value::Data(data) => Ok(data),
            other => Err(not_expression(&other).with_span(self.span_of(id))),
        }
    }

    /// Evaluate a node that must produce a type.
    pub fn eval_type(&self, id: ExprId) -> EvalResult<Type> {
        match self.eval(id)? {
            Value::Type(ty) => Ok(ty),
            other => Err(not_type(&other).with_span(self.span_of(id))),
        }
    }

    #[inline]
    fn node(&self, id: ExprId) -> Option<&ExprKind> {
        self.arena.get(id).map(|e| &e.kind)
    }

    #[inline]
    fn span_of(&self, id: ExprId) -> Span {
        self.arena.get(id).map_or(Span::DUMMY, |e| e.span)
    }
}
