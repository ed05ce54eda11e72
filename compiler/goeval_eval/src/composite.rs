//! Composite literal builders.
//!
//! Each builder takes already-evaluated elements and the resolved literal
//! type, assigns every element to its target type and assembles the value.

use goeval_reflect::{Kind, Type, Val};

use crate::errors::{
    array_index_out_of_bounds, duplicate_field, duplicate_index, invalid_composite_type,
    struct_value_count, unexported_field, unknown_field, EvalResult,
};
use crate::Data;

fn visible(field: &goeval_reflect::StructField, pkg_path: &str) -> bool {
    field.is_exported() || field.pkg_path == pkg_path
}

/// `T{Name: value, ...}`; fields not named stay zero.
pub fn struct_by_keys(ty: &Type, elems: Vec<(String, Data)>, pkg_path: &str) -> EvalResult<Val> {
    if ty.kind() != Kind::Struct {
        return Err(invalid_composite_type(ty));
    }
    let fields = ty.fields();
    let mut values: Vec<Option<Val>> = vec![None; fields.len()];
    for (name, data) in elems {
        let (index, field) = ty
            .field_index(&name)
            .and_then(|i| fields.get(i).map(|f| (i, f)))
            .ok_or_else(|| unknown_field(&name, ty))?;
        if !visible(field, pkg_path) {
            return Err(unexported_field(&name, ty));
        }
        let slot = &mut values[index];
        if slot.is_some() {
            return Err(duplicate_field(&name));
        }
        *slot = Some(data.assign_to(&field.ty)?);
    }
    let values = values
        .into_iter()
        .zip(fields)
        .map(|(value, field)| value.unwrap_or_else(|| Val::zero(&field.ty)))
        .collect();
    Ok(Val::struct_from(ty, values)?)
}

/// `T{v0, v1, ...}` with one value per field in declaration order.
pub fn struct_by_position(ty: &Type, elems: Vec<Data>, pkg_path: &str) -> EvalResult<Val> {
    if ty.kind() != Kind::Struct {
        return Err(invalid_composite_type(ty));
    }
    let fields = ty.fields();
    if elems.len() != fields.len() {
        return Err(struct_value_count(ty, fields.len(), elems.len()));
    }
    let values = elems
        .into_iter()
        .zip(fields)
        .map(|(data, field)| {
            if !visible(field, pkg_path) {
                return Err(unexported_field(&field.name, ty));
            }
            data.assign_to(&field.ty)
        })
        .collect::<EvalResult<Vec<_>>>()?;
    Ok(Val::struct_from(ty, values)?)
}

/// Array or slice literal from `(index, value)` pairs. Arrays keep their
/// declared length; a slice is as long as its highest index plus one, up to
/// [`goeval_reflect::MAX_ELEMS`] values.
pub fn array_like(ty: &Type, elems: Vec<(usize, Data)>) -> EvalResult<Val> {
    let (Some(elem), true) = (ty.elem(), matches!(ty.kind(), Kind::Array | Kind::Slice)) else {
        return Err(invalid_composite_type(ty));
    };
    let len = match ty.array_len() {
        Some(len) => len,
        None => {
            let len = elems.iter().map(|(i, _)| i.saturating_add(1)).max().unwrap_or(0);
            Type::ensure_fits("slice", len, elem)?;
            len
        }
    };
    let mut values: Vec<Option<Val>> = vec![None; len];
    for (index, data) in elems {
        let slot = values
            .get_mut(index)
            .ok_or_else(|| array_index_out_of_bounds(index, len))?;
        if slot.is_some() {
            return Err(duplicate_index(index));
        }
        *slot = Some(data.assign_to(elem)?);
    }
    let values = values
        .into_iter()
        .map(|value| value.unwrap_or_else(|| Val::zero(elem)))
        .collect();
    if ty.kind() == Kind::Array {
        Ok(Val::array_from(ty, values)?)
    } else {
        Ok(Val::slice_from(ty, values)?)
    }
}

/// `map[K]V{k: v, ...}`; a later duplicate key overwrites the earlier one.
pub fn map_from_pairs(ty: &Type, pairs: Vec<(Data, Data)>) -> EvalResult<Val> {
    let (Some(key_ty), Some(elem_ty)) = (ty.key(), ty.elem()) else {
        return Err(invalid_composite_type(ty));
    };
    let pairs = pairs
        .into_iter()
        .map(|(k, v)| -> EvalResult<(Val, Val)> {
            Ok((k.assign_to(key_ty)?, v.assign_to(elem_ty)?))
        })
        .collect::<EvalResult<Vec<_>>>()?;
    Ok(Val::map_from(ty, pairs)?)
}
