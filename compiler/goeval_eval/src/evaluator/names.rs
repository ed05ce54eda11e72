//! Identifiers and selectors.

use goeval_ir::{ExprId, Name};
use goeval_reflect::{builtin_type, Constant, Kind, Val};

use super::Evaluator;
use crate::errors::{interface_method_expr, invalid_selector_base, undefined_ident, EvalResult};
use crate::{BuiltInFunc, Data, Value};

impl Evaluator<'_> {
    /// Reserved words first, then built-in functions, built-in types and
    /// finally the caller's bindings.
    pub(super) fn eval_ident(&self, name: &str) -> EvalResult {
        match name {
            "true" => return Ok(Value::untyped(Constant::Bool(true))),
            "false" => return Ok(Value::untyped(Constant::Bool(false))),
            "nil" => return Ok(Value::nil()),
            _ => {}
        }
        if let Some(func) = BuiltInFunc::from_name(name) {
            return Ok(Value::BuiltInFunc(func));
        }
        if let Some(ty) = builtin_type(name) {
            return Ok(Value::Type(ty));
        }
        self.args
            .get(name)
            .cloned()
            .ok_or_else(|| undefined_ident(name))
    }

    pub(super) fn eval_selector(&self, x: ExprId, sel: Name) -> EvalResult {
        let name = self.arena.lookup(sel);
        match self.eval(x)? {
            Value::Package(pkg) => pkg
                .get(name)
                .cloned()
                .ok_or_else(|| undefined_ident(&format!(".{name}"))),
            Value::Data(Data::Regular(v)) => self.select_member(&v, name).map(Value::regular),
            // Methods of a named basic type apply to its constants too.
            Value::Data(d @ Data::TypedConst(_)) => {
                self.select_member(&d.to_regular()?, name).map(Value::regular)
            }
            Value::Type(ty) => {
                if ty.kind() == Kind::Interface {
                    return Err(interface_method_expr());
                }
                Val::method_expression(&ty, name)
                    .map(Value::regular)
                    .ok_or_else(|| undefined_ident(name))
            }
            other => Err(invalid_selector_base(&other)),
        }
    }

    /// `v.name` on a runtime value.
    ///
    /// Resolution order: a method of the pointer type, then (after
    /// dereferencing) a visible struct field, then a method of the value.
    /// An addressable value also reaches pointer-receiver methods.
    fn select_member(&self, v: &Val, name: &str) -> EvalResult<Val> {
        if v.kind() == Kind::Interface {
            return self.select_interface_method(v, name);
        }
        let mut target = v.clone();
        if target.kind() == Kind::Pointer {
            if let Some(method) = target.method_by_name(name) {
                return Ok(method);
            }
            target = target.deref()?;
        }
        if let Some(index) = target.ty().field_index(name) {
            let visible = target
                .ty()
                .fields()
                .get(index)
                .is_some_and(|f| f.is_exported() || f.pkg_path == self.ctx.pkg_path());
            if visible {
                return Ok(target.field(index)?);
            }
        }
        if let Some(method) = target.method_by_name(name) {
            return Ok(method);
        }
        if let Some(method) = target.addr().and_then(|p| p.method_by_name(name)) {
            return Ok(method);
        }
        Err(undefined_ident(name))
    }

    /// Method of an interface value, bound to its dynamic value.
    fn select_interface_method(&self, v: &Val, name: &str) -> EvalResult<Val> {
        let declared = v.ty().iface_methods().iter().any(|m| m.name == name);
        if !declared {
            return Err(undefined_ident(name));
        }
        let Some(dynamic) = v.interface_elem() else {
            return Err(goeval_reflect::ReflectError::NilDereference.into());
        };
        self.select_member(dynamic, name)
    }
}
