//! Cross-module tests: types, values and constants together.

use pretty_assertions::assert_eq;

use crate::{builtin_type, builtin_type_names, Constant, Kind, StructField, Type, Val};

#[test]
fn test_builtin_table() {
    let mut names: Vec<_> = builtin_type_names().collect();
    names.sort_unstable();
    assert!(names.contains(&"error"));
    assert!(names.contains(&"uintptr"));
    assert_eq!(names.len(), 20);
    assert_eq!(builtin_type("float32").map(|t| t.kind()), Some(Kind::Float32));
    assert_eq!(builtin_type("nil"), None);
}

#[test]
fn test_constant_into_named_type() {
    let celsius = Type::named("weather", "Celsius", &Type::float64(), Vec::new()).unwrap();
    let v = Constant::from_i64(20).to_val(&celsius).unwrap();
    assert_eq!(v.ty(), &celsius);
    assert_eq!(v.as_float(), Some(20.0));
    assert_eq!(Constant::from_val(&v), Some(Constant::Float(20.0)));
}

#[test]
fn test_struct_of_named_fields_round_trips_through_values() {
    let point = Type::named(
        "geo",
        "Point",
        &Type::struct_of(vec![
            StructField::new("X", Type::int()),
            StructField::new("Y", Type::int()),
        ])
        .unwrap(),
        Vec::new(),
    )
    .unwrap();
    let list = Type::slice_of(&point);
    let a = Val::struct_from(&point, vec![Val::int(1), Val::int(2)]).unwrap();
    let s = Val::slice_from(&list, vec![a.clone(), Val::zero(&point)]).unwrap();
    assert_eq!(s.to_string(), "[{1 2} {0 0}]");
    assert_eq!(s.index(0).unwrap(), a);
    assert_eq!(list.to_string(), "[]geo.Point");
}
