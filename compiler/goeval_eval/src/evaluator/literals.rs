//! Basic and composite literals.

use goeval_ir::{ExprId, ExprKind, ExprRange, LitKind, Name};
use goeval_reflect::{Constant, Kind, Type, Val};

use super::Evaluator;
use crate::composite::{array_like, map_from_pairs, struct_by_keys, struct_by_position};
use crate::errors::{
    invalid_array_index, invalid_composite_type, invalid_field_name, invalid_literal,
    missing_composite_type, missing_map_key, mixed_init, unknown_field, EvalResult, ResultExt,
};
use crate::{Data, Value};

impl Evaluator<'_> {
    pub(super) fn eval_basic_lit(&self, kind: LitKind, text: Name) -> EvalResult {
        let text = self.arena.lookup(text);
        Constant::from_literal(kind, text)
            .map(Value::untyped)
            .ok_or_else(|| invalid_literal(text))
    }

    pub(super) fn eval_composite_lit(&self, ty: Option<ExprId>, elts: ExprRange) -> EvalResult {
        let Some(ty) = ty else {
            return Err(missing_composite_type());
        };
        let elts = self.arena.expr_list(elts);

        // `[...]T{...}` is as long as its element list.
        if let Some(&ExprKind::ArrayType { len: Some(len), elt }) = self.node(ty) {
            if matches!(self.node(len), Some(ExprKind::Ellipsis(None))) {
                let elem = self.eval_type(elt)?;
                let array_ty = Type::checked_array_of(elts.len(), &elem).at(self.span_of(len))?;
                return Ok(Value::regular(self.array_literal(&array_ty, elts)?));
            }
        }

        let ty = self.eval_type(ty)?;
        Ok(Value::regular(self.build_composite(&ty, elts)?))
    }

    fn build_composite(&self, ty: &Type, elts: &[ExprId]) -> EvalResult<Val> {
        match ty.kind() {
            Kind::Struct => self.struct_literal(ty, elts),
            Kind::Array | Kind::Slice => self.array_literal(ty, elts),
            Kind::Map => self.map_literal(ty, elts),
            _ => Err(invalid_composite_type(ty)),
        }
    }

    /// One element of a composite literal whose element type is `elem_ty`.
    ///
    /// An element written as a bare `{...}` takes `elem_ty` as its type; for
    /// a pointer element type it becomes `&T{...}`.
    fn eval_element(&self, id: ExprId, elem_ty: &Type) -> EvalResult<Data> {
        let Some(&ExprKind::CompositeLit { ty: None, elts }) = self.node(id) else {
            return self.eval_data(id);
        };
        let elts = self.arena.expr_list(elts);
        let span = self.span_of(id);
        let value = match elem_ty.elem().filter(|_| elem_ty.kind() == Kind::Pointer) {
            Some(pointee) => Val::new_pointer(self.build_composite(pointee, elts).at(span)?),
            None => self.build_composite(elem_ty, elts).at(span)?,
        };
        Ok(Data::Regular(value))
    }

    fn key_value(&self, id: ExprId) -> Option<(ExprId, ExprId)> {
        match self.node(id) {
            Some(&ExprKind::KeyValue { key, value }) => Some((key, value)),
            _ => None,
        }
    }

    fn struct_literal(&self, ty: &Type, elts: &[ExprId]) -> EvalResult<Val> {
        let pkg_path = self.ctx.pkg_path();
        let keyed = elts.iter().filter(|&&id| self.key_value(id).is_some()).count();

        if elts.is_empty() || keyed == elts.len() {
            let mut pairs = Vec::with_capacity(elts.len());
            for &id in elts {
                let Some((key, value)) = self.key_value(id) else {
                    continue;
                };
                let Some(&ExprKind::Ident(name)) = self.node(key) else {
                    return Err(invalid_field_name().with_span(self.span_of(key)));
                };
                let name = self.arena.lookup(name);
                let Some(field) = ty.field_index(name).and_then(|i| ty.fields().get(i)) else {
                    return Err(unknown_field(name, ty).with_span(self.span_of(key)));
                };
                pairs.push((name.to_string(), self.eval_element(value, &field.ty)?));
            }
            return struct_by_keys(ty, pairs, pkg_path);
        }
        if keyed > 0 {
            return Err(mixed_init());
        }

        let fields = ty.fields();
        let values = elts
            .iter()
            .enumerate()
            .map(|(i, &id)| match fields.get(i) {
                Some(field) => self.eval_element(id, &field.ty),
                None => self.eval_data(id),
            })
            .collect::<EvalResult<Vec<_>>>()?;
        struct_by_position(ty, values, pkg_path)
    }

    fn array_literal(&self, ty: &Type, elts: &[ExprId]) -> EvalResult<Val> {
        let Some(elem) = ty.elem() else {
            return Err(invalid_composite_type(ty));
        };
        let mut entries = Vec::with_capacity(elts.len());
        let mut next = 0usize;
        for &id in elts {
            let (index, value) = match self.key_value(id) {
                Some((key, value)) => (self.array_index(key)?, value),
                None => (next, id),
            };
            entries.push((index, self.eval_element(value, elem)?));
            next = index.saturating_add(1);
        }
        array_like(ty, entries)
    }

    /// Explicit index of an array or slice element: a non-negative integer
    /// constant.
    fn array_index(&self, key: ExprId) -> EvalResult<usize> {
        let index = match self.eval_data(key)? {
            Data::UntypedConst(c) => c.to_i64(),
            Data::TypedConst(c) if c.ty().kind().is_integer() => c.value().to_i64(),
            _ => None,
        };
        index
            .and_then(|i| usize::try_from(i).ok())
            .ok_or_else(|| invalid_array_index().with_span(self.span_of(key)))
    }

    fn map_literal(&self, ty: &Type, elts: &[ExprId]) -> EvalResult<Val> {
        let (Some(key_ty), Some(elem_ty)) = (ty.key(), ty.elem()) else {
            return Err(invalid_composite_type(ty));
        };
        let pairs = elts
            .iter()
            .map(|&id| -> EvalResult<(Data, Data)> {
                let Some((key, value)) = self.key_value(id) else {
                    return Err(missing_map_key().with_span(self.span_of(id)));
                };
                Ok((self.eval_element(key, key_ty)?, self.eval_element(value, elem_ty)?))
            })
            .collect::<EvalResult<Vec<_>>>()?;
        map_from_pairs(ty, pairs)
    }
}
