//! Parse-once, evaluate-many entry point.

use goeval_parse::{parse_expr, ParseError, ParsedExpr};
use goeval_reflect::{Type, Val};

use crate::{Args, Data, EvalContext, EvalResult, Evaluator, Value};

/// A parsed expression bound to the package it is written in.
///
/// The tree is immutable once parsed, so one `Expression` can be evaluated
/// any number of times against different bindings.
#[derive(Clone, Debug)]
pub struct Expression {
    parsed: ParsedExpr,
    ctx: EvalContext,
}

impl Expression {
    /// Parse `src` as an expression written inside package `pkg_path`.
    pub fn parse(src: &str, pkg_path: &str) -> Result<Expression, ParseError> {
        let parsed = parse_expr(src)?;
        Ok(Expression::from_parsed(parsed, EvalContext::new(pkg_path)))
    }

    pub fn from_parsed(parsed: ParsedExpr, ctx: EvalContext) -> Expression {
        Expression { parsed, ctx }
    }

    pub fn context(&self) -> &EvalContext {
        &self.ctx
    }

    /// Evaluate against `args`.
    pub fn eval(&self, args: &Args) -> EvalResult<Value> {
        Evaluator::new(&self.parsed.arena, &self.ctx, args).eval(self.parsed.root)
    }

    /// Evaluate to data, keeping constants as constants.
    pub fn eval_to_data(&self, args: &Args) -> EvalResult<Data> {
        Evaluator::new(&self.parsed.arena, &self.ctx, args).eval_data(self.parsed.root)
    }

    /// Evaluate to a runtime value; untyped constants take their default type.
    pub fn eval_to_regular(&self, args: &Args) -> EvalResult<Val> {
        self.eval_to_data(args)?.to_regular()
    }

    pub fn eval_to_type(&self, args: &Args) -> EvalResult<Type> {
        Evaluator::new(&self.parsed.arena, &self.ctx, args).eval_type(self.parsed.root)
    }
}
