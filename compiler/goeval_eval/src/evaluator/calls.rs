//! Calls and conversions.

use goeval_ir::{ExprId, ExprRange};
use smallvec::SmallVec;

use super::Evaluator;
use crate::call::{call_builtin, call_regular, convert_call};
use crate::errors::{conversion_with_ellipsis, not_callable, EvalResult};
use crate::{Data, Value};

/// Most calls pass only a few arguments.
type ArgList<T> = SmallVec<[T; 4]>;

impl Evaluator<'_> {
    /// `f(args)`, `f(args...)` or the conversion `T(x)`.
    ///
    /// Built-in functions receive raw values since some of them take a type
    /// argument; everything else receives data.
    pub(super) fn eval_call(&self, func: ExprId, args: ExprRange, ellipsis: bool) -> EvalResult {
        let callee = self.eval(func)?;
        let arg_ids = self.arena.expr_list(args);
        let result = match callee {
            Value::BuiltInFunc(builtin) => {
                let values = arg_ids
                    .iter()
                    .map(|&id| self.eval(id))
                    .collect::<EvalResult<ArgList<Value>>>()?;
                call_builtin(builtin, &values, ellipsis)?
            }
            Value::Data(Data::Regular(f)) => {
                let data = self.eval_args(arg_ids)?;
                call_regular(&f, &data, ellipsis)?
            }
            Value::Type(ty) => {
                if ellipsis {
                    return Err(conversion_with_ellipsis(&ty));
                }
                let data = self.eval_args(arg_ids)?;
                convert_call(&ty, &data)?
            }
            other => return Err(not_callable(&other)),
        };
        Ok(Value::Data(result))
    }

    fn eval_args(&self, ids: &[ExprId]) -> EvalResult<ArgList<Data>> {
        ids.iter().map(|&id| self.eval_data(id)).collect()
    }
}
