use pretty_assertions::assert_eq;

use super::*;
use crate::{Method, StructField};

fn ints(values: &[i64]) -> Val {
    let elems = values.iter().map(|&v| Val::int(v)).collect();
    Val::slice_from(&Type::slice_of(&Type::int()), elems).unwrap()
}

fn point_type() -> Type {
    Type::struct_of(vec![
        StructField::new("X", Type::int()),
        StructField::new("Y", Type::int()),
    ])
    .unwrap()
}

#[test]
fn test_zero_values() {
    assert_eq!(Val::zero(&Type::int()).as_int(), Some(0));
    assert_eq!(Val::zero(&Type::string()).as_str(), Some(""));
    assert!(Val::zero(&Type::slice_of(&Type::int())).is_nil());
    assert!(Val::zero(&Type::empty_interface()).is_nil());
    assert_eq!(Val::zero(&Type::array_of(3, &Type::int())).to_string(), "[0 0 0]");
    assert_eq!(Val::zero(&point_type()).to_string(), "{0 0}");
}

#[test]
fn test_make_int_wraps() {
    let int8 = Type::basic(Kind::Int8).unwrap();
    assert_eq!(Val::make_int(&int8, 200).unwrap().as_int(), Some(-56));
    let uint8 = Type::uint8();
    assert_eq!(Val::make_int(&uint8, -1).unwrap().as_uint(), Some(255));
    assert!(Val::make_int(&Type::string(), 1).is_err());
}

#[test]
fn test_index_bounds() {
    let s = ints(&[1, 2, 3]);
    assert_eq!(s.index(1).unwrap().as_int(), Some(2));
    assert_eq!(
        s.index(3).unwrap_err(),
        ReflectError::IndexOutOfRange { index: 3, len: 3 }
    );
    assert!(s.index(-1).is_err());
    assert_eq!(Val::string("hi").index(1).unwrap().as_uint(), Some(u64::from(b'i')));
}

#[test]
fn test_slice_elements_are_addressable() {
    let s = ints(&[1, 2, 3]);
    let elem = s.index(0).unwrap();
    assert!(elem.can_addr());
    let ptr = elem.addr().unwrap();
    let Repr::Pointer(Some(place)) = &ptr.repr else {
        unreachable!()
    };
    place.store(Val::int(10)).unwrap();
    assert_eq!(s.to_string(), "[10 2 3]");
}

#[test]
fn test_pointer_field_write_through() {
    let p = Val::new_pointer(Val::zero(&point_type()));
    let target = p.deref().unwrap();
    let y = target.field(1).unwrap();
    let y_ptr = y.addr().unwrap();
    let Repr::Pointer(Some(place)) = &y_ptr.repr else {
        unreachable!()
    };
    place.store(Val::int(7)).unwrap();
    assert_eq!(p.to_string(), "&{0 7}");
}

#[test]
fn test_slicing() {
    let s = ints(&[0, 1, 2, 3, 4]);
    let sub = s.slice2(Some(1), Some(3)).unwrap();
    assert_eq!(sub.to_string(), "[1 2]");
    assert_eq!(sub.len().unwrap(), 2);
    assert_eq!(sub.cap().unwrap(), 4);

    let full = s.slice3(Some(1), 2, 3).unwrap();
    assert_eq!(full.len().unwrap(), 1);
    assert_eq!(full.cap().unwrap(), 2);

    assert_eq!(s.slice2(None, None).unwrap().to_string(), "[0 1 2 3 4]");
    assert!(matches!(
        s.slice2(Some(3), Some(2)),
        Err(ReflectError::SliceBounds { .. })
    ));
    assert!(s.slice3(None, 2, 6).is_err());
}

#[test]
fn test_string_slicing() {
    let s = Val::string("héllo");
    assert_eq!(s.slice2(Some(3), None).unwrap().as_str(), Some("llo"));
    assert_eq!(
        s.slice2(Some(2), None).unwrap_err(),
        ReflectError::StringBoundary { low: 2, high: 6 }
    );
    assert!(s.slice3(None, 1, 2).is_err());
}

#[test]
fn test_unaddressable_array_slice() {
    let arr = Val::zero(&Type::array_of(3, &Type::int()));
    assert_eq!(arr.slice2(None, None).unwrap_err(), ReflectError::UnaddressableArray);
    let p = Val::new_pointer(arr);
    let s = p.slice2(Some(1), None).unwrap();
    assert_eq!(s.ty(), &Type::slice_of(&Type::int()));
    assert_eq!(s.len().unwrap(), 2);
}

#[test]
fn test_append_shares_when_capacity_allows() {
    let base = Val::make_slice(&Type::slice_of(&Type::int()), 1, 4).unwrap();
    let grown = base.append(&[Val::int(5)]).unwrap();
    assert_eq!(grown.to_string(), "[0 5]");
    assert_eq!(grown.cap().unwrap(), 4);
    // Extending `base` again overwrites the shared slot.
    let other = base.append(&[Val::int(9)]).unwrap();
    assert_eq!(other.to_string(), "[0 9]");
    assert_eq!(grown.to_string(), "[0 9]");
}

#[test]
fn test_append_grows() {
    let s = ints(&[1, 2]);
    let grown = s.append(&[Val::int(3)]).unwrap();
    assert_eq!(grown.to_string(), "[1 2 3]");
    assert_eq!(grown.cap().unwrap(), 4);
    assert_eq!(s.to_string(), "[1 2]");
    let from_nil = Val::zero(&Type::slice_of(&Type::int()))
        .append(&[Val::int(1)])
        .unwrap();
    assert_eq!(from_nil.to_string(), "[1]");
}

#[test]
fn test_copy() {
    let dst = ints(&[0, 0]);
    assert_eq!(dst.copy_from(&ints(&[7, 8, 9])).unwrap(), 2);
    assert_eq!(dst.to_string(), "[7 8]");

    let bytes = Val::make_slice(&Type::slice_of(&Type::uint8()), 3, 3).unwrap();
    assert_eq!(bytes.copy_from(&Val::string("ab")).unwrap(), 2);
    assert_eq!(bytes.to_string(), "[97 98 0]");
}

#[test]
fn test_maps() {
    let ty = Type::map_of(&Type::string(), &Type::int()).unwrap();
    let m = Val::map_from(
        &ty,
        vec![
            (Val::string("a"), Val::int(1)),
            (Val::string("a"), Val::int(2)),
        ],
    )
    .unwrap();
    assert_eq!(m.len().unwrap(), 1);
    assert_eq!(m.map_index(&Val::string("a")).unwrap(), Some(Val::int(2)));
    assert_eq!(m.map_index(&Val::string("b")).unwrap(), None);
    m.map_delete(&Val::string("a")).unwrap();
    assert_eq!(m.len().unwrap(), 0);

    let nil = Val::zero(&ty);
    assert_eq!(nil.map_index(&Val::string("a")).unwrap(), None);
    assert_eq!(
        nil.map_insert(Val::string("a"), Val::int(1)).unwrap_err(),
        ReflectError::NilMapWrite
    );
    nil.map_delete(&Val::string("a")).unwrap();
}

#[test]
fn test_equality() {
    assert!(Val::int(1).equal(&Val::int(1)).unwrap());
    let p = point_type();
    let a = Val::struct_from(&p, vec![Val::int(1), Val::int(2)]).unwrap();
    let b = Val::struct_from(&p, vec![Val::int(1), Val::int(2)]).unwrap();
    assert!(a.equal(&b).unwrap());

    let s = ints(&[1]);
    assert!(matches!(s.equal(&ints(&[1])), Err(ReflectError::Uncomparable(_))));
    assert!(!s.equal(&Val::zero(s.ty())).unwrap());

    let x = Val::new_pointer(Val::int(1));
    let y = Val::new_pointer(Val::int(1));
    assert!(x.equal(&x.clone()).unwrap());
    assert!(!x.equal(&y).unwrap());
}

#[test]
fn test_interface_boxing() {
    let any = Type::empty_interface();
    let boxed = Val::int(3).assign_to(&any).unwrap();
    assert_eq!(boxed.interface_elem().unwrap().as_int(), Some(3));
    assert!(boxed.equal(&Val::int(3).assign_to(&any).unwrap()).unwrap());
    assert!(!boxed
        .equal(&Val::string("3").assign_to(&any).unwrap())
        .unwrap());
    assert!(Val::int(1).assign_to(&Type::string()).is_err());
}

#[test]
fn test_conversions() {
    let f = Val::float64(3.9);
    assert_eq!(f.convert(&Type::int()).unwrap().as_int(), Some(3));
    assert_eq!(
        Val::int(300).convert(&Type::uint8()).unwrap().as_uint(),
        Some(44)
    );
    assert_eq!(
        Val::int(0x4e16).convert(&Type::string()).unwrap().as_str(),
        Some("世")
    );
    let bytes = Val::string("hi")
        .convert(&Type::slice_of(&Type::uint8()))
        .unwrap();
    assert_eq!(bytes.to_string(), "[104 105]");
    assert_eq!(bytes.convert(&Type::string()).unwrap().as_str(), Some("hi"));
    let runes = Val::string("hé")
        .convert(&Type::slice_of(&Type::int32()))
        .unwrap();
    assert_eq!(runes.to_string(), "[104 233]");
    assert!(Val::string("1").convert(&Type::int()).is_err());
}

#[test]
fn test_bound_methods() {
    let counter = Type::named(
        "p",
        "Counter",
        &Type::int(),
        vec![
            Method {
                name: "Get".to_string(),
                ty: Type::func_type(Vec::new(), vec![Type::int()]),
                pointer_receiver: false,
                func: NativeFunc::new(|args| Ok(vec![Val::int(args[0].as_int().unwrap_or(0))])),
            },
            Method {
                name: "Inc".to_string(),
                ty: Type::func_type(Vec::new(), Vec::new()),
                pointer_receiver: true,
                func: NativeFunc::new(|args| {
                    let target = args[0].deref().map_err(|e| e.to_string())?;
                    let next = Val::make_int(target.ty(), target.as_int().unwrap_or(0) + 1)
                        .map_err(|e| e.to_string())?;
                    let Repr::Pointer(Some(place)) = &args[0].repr else {
                        return Err("not a pointer".to_string());
                    };
                    place.store(next).map_err(|e| e.to_string())?;
                    Ok(Vec::new())
                }),
            },
        ],
    )
    .unwrap();
    let ptr = Val::new_pointer(Val::make_int(&counter, 41).unwrap());
    ptr.method_by_name("Inc").unwrap().call(&[]).unwrap();
    let got = ptr.method_by_name("Get").unwrap().call(&[]).unwrap();
    assert_eq!(got, vec![Val::int(42)]);

    let value = ptr.deref().unwrap();
    assert!(value.method_by_name("Inc").is_none());

    let expr = Val::method_expression(&counter, "Get").unwrap();
    assert_eq!(expr.ty().to_string(), "func(p.Counter) int");
    let got = expr.call(&[Val::make_int(&counter, 5).unwrap()]).unwrap();
    assert_eq!(got, vec![Val::int(5)]);
}

#[test]
fn test_call_checks_counts() {
    let ty = Type::func_type(vec![Type::int()], vec![Type::int()]);
    let bad = Val::func(&ty, NativeFunc::new(|_| Ok(Vec::new()))).unwrap();
    assert_eq!(
        bad.call(&[]).unwrap_err(),
        ReflectError::ArgCount { want: 1, got: 0 }
    );
    assert_eq!(
        bad.call(&[Val::int(1)]).unwrap_err(),
        ReflectError::ResultCount { want: 1, got: 0 }
    );
    assert_eq!(Val::zero(&ty).call(&[Val::int(1)]).unwrap_err(), ReflectError::NilFunc);
}

#[test]
fn test_display() {
    assert_eq!(Val::float64(2.0).to_string(), "2");
    assert_eq!(Val::float64(f64::INFINITY).to_string(), "+Inf");
    let c = Val::make_complex(&Type::complex128(), 1.0, -2.0).unwrap();
    assert_eq!(c.to_string(), "(1-2i)");
    assert_eq!(Val::zero(&Type::pointer_to(&Type::int())).to_string(), "<nil>");
    assert_eq!(format!("{:?}", Val::int(4)), "int(4)");
}
