use pretty_assertions::assert_eq;

use super::*;
use crate::EvalErrorKind;

#[test]
fn test_untyped_constant_takes_default_type() {
    let d = Data::UntypedConst(Constant::from_i64(7));
    let v = d.to_regular().unwrap();
    assert_eq!(v.ty(), &Type::int());
    assert_eq!(v.as_int(), Some(7));

    let f = Data::UntypedConst(Constant::Float(1.5)).to_regular().unwrap();
    assert_eq!(f.ty(), &Type::float64());
}

#[test]
fn test_nil_has_no_default_type() {
    let err = Data::Nil.to_regular().unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::UntypedNil);
}

#[test]
fn test_assign_nil() {
    let slice = Type::slice_of(&Type::int());
    assert!(Data::Nil.assign_to(&slice).unwrap().is_nil());
    let err = Data::Nil.assign_to(&Type::int()).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::NotAssignable { .. }));
}

#[test]
fn test_assign_untyped_constant_checks_range() {
    let uint8 = Type::uint8();
    let v = Data::UntypedConst(Constant::from_i64(255)).assign_to(&uint8).unwrap();
    assert_eq!(v.as_uint(), Some(255));
    assert!(Data::UntypedConst(Constant::from_i64(256))
        .assign_to(&uint8)
        .is_err());
}

#[test]
fn test_assign_untyped_bool_to_interface() {
    let any = Type::empty_interface();
    let v = Data::UntypedBool(true).assign_to(&any).unwrap();
    assert_eq!(v.ty(), &any);
    assert_eq!(v.interface_elem().and_then(Val::as_bool), Some(true));
}

#[test]
fn test_assign_regular_requires_identical_named_types() {
    let celsius = Type::named("weather", "Celsius", &Type::float64(), Vec::new()).unwrap();
    let v = Data::Regular(Val::float64(1.0));
    let err = v.assign_to(&celsius).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::NotAssignable { .. }));
}

#[test]
fn test_typed_const_normalizes_value() {
    let c = TypedConst::new(&Constant::Float(3.0), &Type::int()).unwrap();
    assert_eq!(c.value(), &Constant::from_i64(3));
    assert!(TypedConst::new(&Constant::Float(3.5), &Type::int()).is_err());
    assert_eq!(c.to_val().unwrap().as_int(), Some(3));
}

#[test]
fn test_describe() {
    assert_eq!(
        Data::UntypedConst(Constant::from_i64(5)).describe(),
        "5 (untyped int constant)"
    );
    assert_eq!(Data::Regular(Val::int(2)).describe(), "2 (value of type int)");
    let c = TypedConst::new(&Constant::from_i64(2), &Type::int()).unwrap();
    assert_eq!(Data::TypedConst(c).describe(), "2 (constant of type int)");
    assert_eq!(Value::Type(Type::int()).describe(), "type int");
    assert_eq!(Value::BuiltInFunc(BuiltInFunc::Len).describe(), "built-in len");
}

#[test]
fn test_package_members() {
    let pkg = Package::new()
        .with("Pi", Data::UntypedConst(Constant::Float(3.25)))
        .with("Zero", Val::int(0));
    assert_eq!(pkg.len(), 2);
    assert!(matches!(
        pkg.get("Pi"),
        Some(Value::Data(Data::UntypedConst(Constant::Float(_))))
    ));
    assert!(pkg.get("missing").is_none());

    let collected: Package = [("A", Val::int(1))].into_iter().collect();
    assert!(!collected.is_empty());
}

#[test]
fn test_builtin_names() {
    for name in [
        "append", "cap", "complex", "copy", "delete", "imag", "len", "make", "new", "real",
    ] {
        let func = BuiltInFunc::from_name(name).unwrap();
        assert_eq!(func.name(), name);
        assert_eq!(func.to_string(), name);
    }
    assert_eq!(BuiltInFunc::from_name("panic"), None);
}

#[test]
fn test_args_from() {
    let args = args_from([("x", Val::int(1)), ("y", Val::int(2))]);
    assert_eq!(args.len(), 2);
    assert!(matches!(args.get("x"), Some(Value::Data(Data::Regular(_)))));
}
