//! Operators, indexing, slicing, indirection and type assertions.

use goeval_ir::{BinaryOp, ExprId, ExprKind, UnaryOp};
use goeval_reflect::{Kind, ReflectError, Type, Val};

use super::Evaluator;
use crate::errors::{
    assertion_failed, impossible_assertion, invalid_assert_operand, invalid_index,
    invalid_indirect, invalid_slice_index, invalid_slice_type, EvalResult, ResultExt,
};
use crate::operators::{binary_op, compare_op, shift_op, unary_op};
use crate::{Data, Value};

/// Integer value of an index or slice bound.
fn index_value(d: &Data) -> Option<i64> {
    match d {
        Data::UntypedConst(c) => c.to_i64(),
        Data::TypedConst(c) if c.ty().kind().is_integer() => c.value().to_i64(),
        Data::Regular(v) if v.kind().is_integer() => v.to_i64(),
        _ => None,
    }
}

impl Evaluator<'_> {
    pub(super) fn eval_binary(&self, op: BinaryOp, x: ExprId, y: ExprId) -> EvalResult {
        let x = self.eval_data(x)?;
        let y = self.eval_data(y)?;
        let result = if op.is_comparison() {
            compare_op(&x, op, &y)
        } else if op.is_shift() {
            shift_op(&x, op, &y)
        } else {
            binary_op(&x, op, &y)
        };
        Ok(Value::Data(result?))
    }

    pub(super) fn eval_unary(&self, op: UnaryOp, x: ExprId) -> EvalResult {
        // `&T{...}` allocates; other operands must already be addressable.
        if op == UnaryOp::Addr && self.is_composite_lit(x) {
            let v = self.eval_data(x)?.to_regular()?;
            return Ok(Value::regular(Val::new_pointer(v)));
        }
        let x = self.eval_data(x)?;
        Ok(Value::Data(unary_op(op, &x)?))
    }

    /// Whether `id` is a composite literal, looking through parentheses.
    fn is_composite_lit(&self, id: ExprId) -> bool {
        match self.node(id) {
            Some(ExprKind::CompositeLit { .. }) => true,
            Some(&ExprKind::Paren(inner)) => self.is_composite_lit(inner),
            _ => false,
        }
    }

    /// `*x`: pointer type or dereference.
    pub(super) fn eval_star(&self, x: ExprId) -> EvalResult {
        match self.eval(x)? {
            Value::Type(ty) => Ok(Value::Type(Type::pointer_to(&ty))),
            Value::Data(Data::Regular(v)) if v.kind() == Kind::Pointer => {
                Ok(Value::regular(v.deref()?))
            }
            other => Err(invalid_indirect(&other)),
        }
    }

    pub(super) fn eval_index(&self, x: ExprId, index: ExprId) -> EvalResult {
        let xd = self.eval_data(x)?;
        let id = self.eval_data(index)?;
        let result = match &xd {
            Data::Regular(v) if v.kind() == Kind::Map => {
                let (Some(key_ty), Some(elem_ty)) = (v.ty().key(), v.ty().elem()) else {
                    return Err(invalid_index(&xd, &id));
                };
                let key = id.assign_to(key_ty).at(self.span_of(index))?;
                v.map_index(&key)?.unwrap_or_else(|| Val::zero(elem_ty))
            }
            Data::Regular(v) => {
                let indexable = match v.kind() {
                    Kind::Array | Kind::Slice | Kind::String => true,
                    Kind::Pointer => v.ty().elem().is_some_and(|e| e.kind() == Kind::Array),
                    _ => false,
                };
                let Some(i) = index_value(&id).filter(|_| indexable) else {
                    return Err(invalid_index(&xd, &id));
                };
                v.index(i)?
            }
            Data::TypedConst(_) | Data::UntypedConst(_) => {
                let s = xd.constant().and_then(|c| c.as_str());
                let (Some(s), Some(i)) = (s, index_value(&id)) else {
                    return Err(invalid_index(&xd, &id));
                };
                let byte = usize::try_from(i)
                    .ok()
                    .and_then(|i| s.as_bytes().get(i))
                    .ok_or(ReflectError::IndexOutOfRange {
                        index: i,
                        len: s.len(),
                    })?;
                Val::make_uint(&Type::uint8(), u64::from(*byte))?
            }
            Data::Nil | Data::UntypedBool(_) => return Err(invalid_index(&xd, &id)),
        };
        Ok(Value::regular(result))
    }

    pub(super) fn eval_slice(
        &self,
        x: ExprId,
        bounds: [Option<ExprId>; 3],
        slice3: bool,
    ) -> EvalResult {
        let xd = self.eval_data(x)?;
        let [low, high, max] = bounds.map(|b| self.slice_bound(b));
        let (low, high, max) = (low?, high?, max?);

        let v = match &xd {
            Data::Regular(v) => v.clone(),
            Data::TypedConst(c) if c.ty().kind() == Kind::String => c.to_val()?,
            Data::UntypedConst(c) if c.as_str().is_some() => xd.to_regular()?,
            _ => return Err(invalid_slice_type(&xd)),
        };
        if !matches!(v.kind(), Kind::String | Kind::Slice | Kind::Array | Kind::Pointer) {
            return Err(invalid_slice_type(&xd));
        }
        let sliced = if slice3 {
            let (Some(high), Some(max)) = (high, max) else {
                return Err(invalid_slice_type(&xd));
            };
            v.slice3(low, high, max)?
        } else {
            v.slice2(low, high)?
        };
        Ok(Value::regular(sliced))
    }

    fn slice_bound(&self, bound: Option<ExprId>) -> EvalResult<Option<i64>> {
        let Some(id) = bound else {
            return Ok(None);
        };
        let d = self.eval_data(id)?;
        match index_value(&d) {
            Some(i) => Ok(Some(i)),
            None => Err(invalid_slice_index(&d).with_span(self.span_of(id))),
        }
    }

    /// `x.(T)`.
    ///
    /// For a concrete `T` that does not implement the interface of `x`, the
    /// assertion can never hold and fails without looking at the value.
    pub(super) fn eval_type_assert(&self, x: ExprId, ty: ExprId) -> EvalResult {
        let xd = self.eval_data(x)?;
        let Some(v) = xd.as_regular().filter(|v| v.kind() == Kind::Interface) else {
            return Err(invalid_assert_operand(&xd));
        };
        let target = self.eval_type(ty)?;
        let iface = v.ty();
        let dynamic = v.interface_elem();

        if target.kind() == Kind::Interface {
            return match dynamic {
                Some(d) if d.ty().implements(&target) => Ok(Value::regular(d.assign_to(&target)?)),
                Some(d) => Err(assertion_failed(iface, d.ty(), &target)),
                None => Err(assertion_failed(iface, &"nil", &target)),
            };
        }
        if !target.implements(iface) {
            return Err(impossible_assertion(iface, &target));
        }
        match dynamic {
            Some(d) if d.ty() == &target => Ok(Value::regular(d.clone())),
            Some(d) => Err(assertion_failed(iface, d.ty(), &target)),
            None => Err(assertion_failed(iface, &"nil", &target)),
        }
    }
}
