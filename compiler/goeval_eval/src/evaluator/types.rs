//! Type literals.

use goeval_ir::{ChanDir, ExprId, ExprKind, FieldRange, LitKind};
use goeval_reflect::{Constant, Kind, StructField, Type};

use super::Evaluator;
use crate::errors::{
    invalid_array_bound, invalid_variadic, negative_array_bound, non_string_tag,
    unsupported_interface, unsupported_syntax, EvalResult, ResultExt,
};
use crate::{Data, Value};

impl Evaluator<'_> {
    /// `[]T` or `[N]T`.
    pub(super) fn eval_array_type(&self, len: Option<ExprId>, elt: ExprId) -> EvalResult {
        let elem = self.eval_type(elt)?;
        let Some(len) = len else {
            return Ok(Value::Type(Type::slice_of(&elem)));
        };
        if matches!(self.node(len), Some(ExprKind::Ellipsis(None))) {
            return Err(unsupported_syntax("[...] array outside a composite literal"));
        }

        let bound = self.eval_data(len)?;
        let n = match &bound {
            Data::UntypedConst(c) => c.to_i64(),
            Data::TypedConst(c) if c.ty().kind().is_integer() => c.value().to_i64(),
            _ => None,
        };
        let Some(n) = n else {
            return Err(invalid_array_bound(&bound).with_span(self.span_of(len)));
        };
        let n = usize::try_from(n).map_err(|_| negative_array_bound().with_span(self.span_of(len)))?;
        Ok(Value::Type(Type::checked_array_of(n, &elem).at(self.span_of(len))?))
    }

    /// `...T` outside a parameter list only makes sense as a slice type.
    pub(super) fn eval_ellipsis_type(&self, elt: Option<ExprId>) -> EvalResult {
        match elt {
            Some(elt) => Ok(Value::Type(Type::slice_of(&self.eval_type(elt)?))),
            None => Err(unsupported_syntax("ellipsis without element type")),
        }
    }

    pub(super) fn eval_chan_type(&self, dir: ChanDir, value: ExprId) -> EvalResult {
        let elem = self.eval_type(value)?;
        Ok(Value::Type(Type::chan_of(dir, &elem)))
    }

    pub(super) fn eval_map_type(&self, key: ExprId, value: ExprId) -> EvalResult {
        let key_ty = self.eval_type(key)?;
        let elem = self.eval_type(value)?;
        let ty = Type::map_of(&key_ty, &elem).map_err(|err| {
            tracing::debug!(key = %key_ty, %err, "rejected map type");
            err
        });
        Ok(Value::Type(ty.at(self.span_of(key))?))
    }

    pub(super) fn eval_func_type(&self, params: FieldRange, results: FieldRange) -> EvalResult {
        let (params, variadic) = self.param_list(params, true)?;
        let (results, _) = self.param_list(results, false)?;
        Ok(Value::Type(Type::func_of(params, results, variadic)?))
    }

    /// Parameter or result types of a signature, one per declared name.
    ///
    /// A `...T` type is accepted only as the sole name of the final group of
    /// a parameter list and turns into `[]T`.
    fn param_list(&self, range: FieldRange, allow_variadic: bool) -> EvalResult<(Vec<Type>, bool)> {
        let groups = self.arena.fields(range);
        let mut types = Vec::with_capacity(groups.len());
        let mut variadic = false;

        for (i, group) in groups.iter().enumerate() {
            let names = group.names.len();
            let ty = match self.node(group.ty) {
                Some(&ExprKind::Ellipsis(elt)) => {
                    let last = i + 1 == groups.len();
                    let Some(elt) = elt.filter(|_| allow_variadic && last && names <= 1) else {
                        return Err(invalid_variadic().with_span(self.span_of(group.ty)));
                    };
                    variadic = true;
                    Type::slice_of(&self.eval_type(elt)?)
                }
                _ => self.eval_type(group.ty)?,
            };
            types.extend(std::iter::repeat(ty).take(names.max(1)));
        }
        Ok((types, variadic))
    }

    pub(super) fn eval_struct_type(&self, range: FieldRange) -> EvalResult {
        let groups = self.arena.fields(range);
        let mut fields = Vec::with_capacity(groups.len());

        for group in groups {
            let ty = self.eval_type(group.ty)?;
            let tag = match group.tag {
                Some(tag) => self.struct_tag(tag)?,
                None => String::new(),
            };
            let names = self.arena.names(group.names);
            if names.is_empty() {
                // Embedded field: named after its (pointed-to) type.
                let base = match ty.kind() {
                    Kind::Pointer => ty.elem().and_then(Type::name),
                    _ => ty.name(),
                };
                let name = base.unwrap_or_default().to_string();
                fields.push(StructField {
                    name,
                    pkg_path: self.ctx.pkg_path().to_string(),
                    ty,
                    tag,
                    embedded: true,
                });
                continue;
            }
            for &name in names {
                fields.push(StructField {
                    name: self.arena.lookup(name).to_string(),
                    pkg_path: self.ctx.pkg_path().to_string(),
                    ty: ty.clone(),
                    tag: tag.clone(),
                    embedded: false,
                });
            }
        }

        let ty = Type::struct_of(fields).map_err(|err| {
            tracing::debug!(%err, "rejected struct type");
            err
        })?;
        Ok(Value::Type(ty))
    }

    fn struct_tag(&self, id: ExprId) -> EvalResult<String> {
        let Some(&ExprKind::BasicLit {
            kind: LitKind::String,
            text,
        }) = self.node(id)
        else {
            return Err(non_string_tag().with_span(self.span_of(id)));
        };
        Constant::from_literal(LitKind::String, self.arena.lookup(text))
            .as_ref()
            .and_then(Constant::as_str)
            .map(str::to_string)
            .ok_or_else(|| non_string_tag().with_span(self.span_of(id)))
    }

    pub(super) fn eval_interface_type(&self, methods: FieldRange) -> EvalResult {
        if !methods.is_empty() {
            return Err(unsupported_interface());
        }
        Ok(Value::Type(Type::empty_interface()))
    }
}
