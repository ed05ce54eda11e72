//! Calls: function values, built-in functions and conversions.

use goeval_reflect::{Constant, Kind, ReflectError, Type, Val};

use crate::errors::{
    arg_count, builtin_arg_count, builtin_ellipsis, conversion_arg_count, invalid_builtin_arg,
    invalid_conversion, non_variadic_ellipsis, not_callable, result_count, EvalResult,
};
use crate::{BuiltInFunc, Data, TypedConst, Value};

/// Call function value `f`.
///
/// Arguments are assigned to the parameter types. For a variadic function
/// the trailing arguments are packed into a slice, unless `ellipsis` marks
/// the final argument as the slice itself. Only single-result functions can
/// appear in an expression.
pub fn call_regular(f: &Val, args: &[Data], ellipsis: bool) -> EvalResult<Data> {
    let sig = f.ty();
    if sig.kind() != Kind::Func {
        return Err(not_callable(&Value::regular(f.clone())));
    }
    if sig.results().len() != 1 {
        return Err(result_count(sig, sig.results().len()));
    }
    let params = sig.params();
    let mut vals = Vec::with_capacity(params.len());

    if ellipsis && !sig.is_variadic() {
        return Err(non_variadic_ellipsis(sig));
    }
    if sig.is_variadic() && !ellipsis {
        let fixed = params.len().saturating_sub(1);
        if args.len() < fixed {
            return Err(arg_count(sig, fixed, args.len()));
        }
        for (arg, param) in args.iter().zip(params) {
            vals.push(arg.assign_to(param)?);
        }
        let Some(slice_ty) = params.last() else {
            return Err(arg_count(sig, 0, args.len()));
        };
        let Some(elem) = slice_ty.elem() else {
            return Err(non_variadic_ellipsis(sig));
        };
        let rest = args
            .get(fixed..)
            .unwrap_or_default()
            .iter()
            .map(|arg| arg.assign_to(elem))
            .collect::<EvalResult<Vec<_>>>()?;
        vals.push(if rest.is_empty() {
            Val::zero(slice_ty)
        } else {
            Val::slice_from(slice_ty, rest)?
        });
    } else {
        if args.len() != params.len() {
            return Err(arg_count(sig, params.len(), args.len()));
        }
        for (arg, param) in args.iter().zip(params) {
            vals.push(arg.assign_to(param)?);
        }
    }

    let results = f.call(&vals)?;
    results
        .into_iter()
        .next()
        .map(Data::Regular)
        .ok_or_else(|| result_count(sig, 0))
}

/// Call a built-in function. Arguments are raw values because `new` and
/// `make` take a type.
///
/// `delete` produces no value; it evaluates to `nil`.
pub fn call_builtin(func: BuiltInFunc, args: &[Value], ellipsis: bool) -> EvalResult<Data> {
    let name = func.name();
    if ellipsis && func != BuiltInFunc::Append {
        return Err(builtin_ellipsis(name));
    }
    match func {
        BuiltInFunc::Len | BuiltInFunc::Cap => {
            let [arg] = args else {
                return Err(builtin_arg_count(name, args.len()));
            };
            len_or_cap(func, data_arg(name, arg)?)
        }
        BuiltInFunc::New => {
            let [arg] = args else {
                return Err(builtin_arg_count(name, args.len()));
            };
            let ty = type_arg(name, arg)?;
            Ok(Data::Regular(Val::new_pointer(Val::zero(ty))))
        }
        BuiltInFunc::Make => make(args),
        BuiltInFunc::Append => append(args, ellipsis),
        BuiltInFunc::Copy => {
            let [dst, src] = args else {
                return Err(builtin_arg_count(name, args.len()));
            };
            let dst = data_arg(name, dst)?;
            let Data::Regular(dst) = dst else {
                return Err(invalid_builtin_arg(name, dst));
            };
            let src = data_arg(name, src)?.to_regular()?;
            let n = dst.copy_from(&src)?;
            Ok(Data::Regular(Val::int(n as i64)))
        }
        BuiltInFunc::Delete => {
            let [map, key] = args else {
                return Err(builtin_arg_count(name, args.len()));
            };
            let map = data_arg(name, map)?;
            let Some((m, key_ty)) = map
                .as_regular()
                .and_then(|m| m.ty().key().map(|k| (m, k)))
            else {
                return Err(invalid_builtin_arg(name, map));
            };
            let key = data_arg(name, key)?.assign_to(key_ty)?;
            m.map_delete(&key)?;
            Ok(Data::Nil)
        }
        BuiltInFunc::Complex => {
            let [re, im] = args else {
                return Err(builtin_arg_count(name, args.len()));
            };
            complex(data_arg(name, re)?, data_arg(name, im)?)
        }
        BuiltInFunc::Real | BuiltInFunc::Imag => {
            let [arg] = args else {
                return Err(builtin_arg_count(name, args.len()));
            };
            real_or_imag(func, data_arg(name, arg)?)
        }
    }
}

/// Conversion `ty(x)`.
///
/// A constant converted to a basic type stays constant; an integer
/// constant converted to a string type yields the UTF-8 encoding of that
/// code point. Everything else converts at run time.
pub fn convert_call(ty: &Type, args: &[Data]) -> EvalResult<Data> {
    let [arg] = args else {
        return Err(conversion_arg_count(ty, args.len()));
    };
    match arg {
        Data::Nil if ty.kind().is_nillable() => Ok(Data::Regular(Val::zero(ty))),
        Data::Nil => Err(invalid_conversion(arg, ty)),
        Data::TypedConst(_) | Data::UntypedConst(_) if ty.kind().is_basic() => {
            let Some(c) = arg.constant() else {
                return Err(invalid_conversion(arg, ty));
            };
            if let Some(s) = string_of_code_point(c, ty) {
                return Ok(Data::TypedConst(TypedConst::new(&Constant::String(s), ty)?));
            }
            let compatible = match c {
                Constant::Bool(_) => ty.kind() == Kind::Bool,
                Constant::String(_) => ty.kind() == Kind::String,
                _ => ty.kind().is_numeric(),
            };
            if !compatible {
                return Err(invalid_conversion(arg, ty));
            }
            Ok(Data::TypedConst(TypedConst::new(c, ty)?))
        }
        Data::Regular(v) => Ok(Data::Regular(
            v.convert(ty).map_err(|_| invalid_conversion(arg, ty))?,
        )),
        _ => {
            let v = arg.to_regular()?;
            Ok(Data::Regular(
                v.convert(ty).map_err(|_| invalid_conversion(arg, ty))?,
            ))
        }
    }
}

/// `string(c)` for an integer constant `c`; invalid code points give U+FFFD.
fn string_of_code_point(c: &Constant, ty: &Type) -> Option<String> {
    if ty.kind() != Kind::String {
        return None;
    }
    let code = match c {
        Constant::Int(_) | Constant::Rune(_) => c.to_i64(),
        _ => return None,
    };
    let ch = code
        .and_then(|i| u32::try_from(i).ok())
        .and_then(char::from_u32)
        .unwrap_or(char::REPLACEMENT_CHARACTER);
    Some(ch.to_string())
}

// =============================================================================
// Built-in helpers
// =============================================================================

fn data_arg<'v>(func: &'static str, arg: &'v Value) -> EvalResult<&'v Data> {
    arg.as_data().ok_or_else(|| invalid_builtin_arg(func, &arg.describe()))
}

fn type_arg<'v>(func: &'static str, arg: &'v Value) -> EvalResult<&'v Type> {
    arg.as_type().ok_or_else(|| invalid_builtin_arg(func, &arg.describe()))
}

/// Non-negative integer size argument of `make`.
fn size_arg(what: &'static str, arg: &Value) -> EvalResult<usize> {
    let data = data_arg("make", arg)?;
    let n = match data {
        Data::UntypedConst(c) => c.to_i64(),
        Data::TypedConst(c) if c.ty().kind().is_integer() => c.value().to_i64(),
        Data::Regular(v) if v.kind().is_integer() => v.to_i64(),
        _ => None,
    };
    let n = n.ok_or_else(|| invalid_builtin_arg("make", data))?;
    usize::try_from(n).map_err(|_| ReflectError::NegativeSize { what }.into())
}

fn len_or_cap(func: BuiltInFunc, arg: &Data) -> EvalResult<Data> {
    let name = func.name();
    match arg {
        Data::UntypedConst(Constant::String(s)) if func == BuiltInFunc::Len => {
            let len = Constant::from_i64(s.len() as i64);
            Ok(Data::TypedConst(TypedConst::new(&len, &Type::int())?))
        }
        Data::TypedConst(c) if func == BuiltInFunc::Len && c.ty().kind() == Kind::String => {
            let len = c.value().as_str().map_or(0, str::len);
            let len = Constant::from_i64(len as i64);
            Ok(Data::TypedConst(TypedConst::new(&len, &Type::int())?))
        }
        Data::Regular(v) => {
            let n = if func == BuiltInFunc::Len {
                v.len()
            } else {
                v.cap()
            };
            let n = n.map_err(|_| invalid_builtin_arg(name, arg))?;
            Ok(Data::Regular(Val::int(n as i64)))
        }
        _ => Err(invalid_builtin_arg(name, arg)),
    }
}

fn make(args: &[Value]) -> EvalResult<Data> {
    let Some((ty_arg, sizes)) = args.split_first() else {
        return Err(builtin_arg_count("make", 0));
    };
    let ty = type_arg("make", ty_arg)?;
    if sizes.len() > 2 {
        return Err(builtin_arg_count("make", args.len()));
    }
    let val = match ty.kind() {
        Kind::Slice => {
            let Some(len) = sizes.first() else {
                return Err(builtin_arg_count("make", args.len()));
            };
            let len = size_arg("len", len)?;
            let cap = match sizes.get(1) {
                Some(cap) => size_arg("cap", cap)?,
                None => len,
            };
            Val::make_slice(ty, len, cap)?
        }
        Kind::Map => {
            if let Some(hint) = sizes.first() {
                size_arg("size", hint)?;
            }
            if sizes.len() > 1 {
                return Err(builtin_arg_count("make", args.len()));
            }
            Val::make_map(ty)?
        }
        Kind::Chan => {
            if sizes.len() > 1 {
                return Err(builtin_arg_count("make", args.len()));
            }
            let cap = match sizes.first() {
                Some(cap) => size_arg("buffer", cap)?,
                None => 0,
            };
            Val::make_chan(ty, cap)?
        }
        _ => return Err(invalid_builtin_arg("make", ty)),
    };
    Ok(Data::Regular(val))
}

fn append(args: &[Value], ellipsis: bool) -> EvalResult<Data> {
    let Some((first, rest)) = args.split_first() else {
        return Err(builtin_arg_count("append", 0));
    };
    let first = data_arg("append", first)?;
    let Some(slice) = first.as_regular().filter(|s| s.kind() == Kind::Slice) else {
        return Err(invalid_builtin_arg("append", first));
    };
    let Some(elem) = slice.ty().elem() else {
        return Err(invalid_builtin_arg("append", first));
    };

    let items = if ellipsis {
        let [tail] = rest else {
            return Err(builtin_arg_count("append", args.len()));
        };
        let tail = data_arg("append", tail)?;
        spread(slice.ty(), elem, tail)?
    } else {
        rest.iter()
            .map(|arg| data_arg("append", arg)?.assign_to(elem))
            .collect::<EvalResult<Vec<_>>>()?
    };
    Ok(Data::Regular(slice.append(&items)?))
}

/// Elements of the `tail...` argument of `append`. A string spreads into
/// a byte slice.
fn spread(slice_ty: &Type, elem: &Type, tail: &Data) -> EvalResult<Vec<Val>> {
    if matches!(tail, Data::Nil) {
        return Ok(Vec::new());
    }
    let is_string = tail.ty().map_or_else(
        || matches!(tail, Data::UntypedConst(Constant::String(_))),
        |t| t.kind() == Kind::String,
    );
    if is_string && elem.kind() == Kind::Uint8 {
        let s = tail.to_regular()?;
        return Ok(s.elements()?);
    }
    let tail = tail.assign_to(slice_ty)?;
    Ok(tail.elements()?)
}

/// Float type matching a complex type's parts.
fn part_type(complex: &Type) -> Option<Type> {
    match complex.kind() {
        Kind::Complex64 => Type::basic(Kind::Float32),
        Kind::Complex128 => Some(Type::float64()),
        _ => None,
    }
}

fn complex_type(float: &Type) -> Option<Type> {
    match float.kind() {
        Kind::Float32 => Type::basic(Kind::Complex64),
        Kind::Float64 => Some(Type::complex128()),
        _ => None,
    }
}

fn complex(re: &Data, im: &Data) -> EvalResult<Data> {
    if let (Data::UntypedConst(a), Data::UntypedConst(b)) = (re, im) {
        let (Some(a), Some(b)) = (a.to_f64(), b.to_f64()) else {
            return Err(invalid_builtin_arg("complex", re));
        };
        return Ok(Data::UntypedConst(Constant::Complex(a, b)));
    }
    let Some(float) = re.ty().or_else(|| im.ty()).cloned() else {
        return Err(invalid_builtin_arg("complex", re));
    };
    let Some(complex) = complex_type(&float) else {
        return Err(invalid_builtin_arg("complex", &float));
    };
    if re.is_constant() && im.is_constant() {
        let parts = (
            re.constant().and_then(Constant::to_f64),
            im.constant().and_then(Constant::to_f64),
        );
        let (Some(a), Some(b)) = parts else {
            return Err(invalid_builtin_arg("complex", re));
        };
        if re.ty().is_some_and(|t| t != &float) || im.ty().is_some_and(|t| t != &float) {
            return Err(invalid_builtin_arg("complex", im));
        }
        return Ok(Data::TypedConst(TypedConst::new(
            &Constant::Complex(a, b),
            &complex,
        )?));
    }
    let (a, b) = (re.assign_to(&float)?, im.assign_to(&float)?);
    if a.ty() != b.ty() {
        return Err(invalid_builtin_arg("complex", im));
    }
    let (Some(a), Some(b)) = (a.as_float(), b.as_float()) else {
        return Err(invalid_builtin_arg("complex", re));
    };
    Ok(Data::Regular(Val::make_complex(&complex, a, b)?))
}

fn real_or_imag(func: BuiltInFunc, arg: &Data) -> EvalResult<Data> {
    let pick = |(re, im): (f64, f64)| if func == BuiltInFunc::Real { re } else { im };
    match arg {
        Data::UntypedConst(c) if c.is_numeric() => {
            let parts = match c {
                Constant::Complex(re, im) => (*re, *im),
                other => (other.to_f64().unwrap_or_default(), 0.0),
            };
            Ok(Data::UntypedConst(Constant::Float(pick(parts))))
        }
        Data::TypedConst(c) => {
            let (Constant::Complex(re, im), Some(part)) = (c.value(), part_type(c.ty())) else {
                return Err(invalid_builtin_arg(func.name(), arg));
            };
            Ok(Data::TypedConst(TypedConst::new(
                &Constant::Float(pick((*re, *im))),
                &part,
            )?))
        }
        Data::Regular(v) => {
            let (Some(parts), Some(part)) = (v.as_complex(), part_type(v.ty())) else {
                return Err(invalid_builtin_arg(func.name(), arg));
            };
            Ok(Data::Regular(Val::make_float(&part, pick(parts))?))
        }
        _ => Err(invalid_builtin_arg(func.name(), arg)),
    }
}
