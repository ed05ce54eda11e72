//! Composite literal builders called directly.

use goeval_reflect::{Constant, ReflectError, Type, Val, MAX_ELEMS};
use pretty_assertions::assert_eq;

use super::{foreign_struct, point_type};
use crate::{array_like, map_from_pairs, struct_by_keys, struct_by_position, Data, EvalErrorKind};

fn untyped(i: i64) -> Data {
    Data::UntypedConst(Constant::from_i64(i))
}

fn text(s: &str) -> Data {
    Data::UntypedConst(Constant::String(s.to_string()))
}

#[test]
fn test_struct_by_keys_zero_fills() {
    let ty = point_type();
    let p = struct_by_keys(&ty, vec![("Y".to_string(), untyped(5))], "main").unwrap();
    assert_eq!(p.ty(), &ty);
    assert_eq!(p.to_string(), "{0 5}");

    let empty = struct_by_keys(&ty, Vec::new(), "main").unwrap();
    assert_eq!(empty.to_string(), "{0 0}");
}

#[test]
fn test_struct_by_keys_errors() {
    let ty = point_type();
    let err = struct_by_keys(&ty, vec![("Z".to_string(), untyped(1))], "main").unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::UnknownField {
            field: "Z".to_string(),
            ty: "main.Point".to_string(),
        }
    );

    let twice = vec![("X".to_string(), untyped(1)), ("X".to_string(), untyped(2))];
    let err = struct_by_keys(&ty, twice, "main").unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::DuplicateField("X".to_string()));

    let err = struct_by_keys(&ty, vec![("X".to_string(), text("one"))], "main").unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::Reflect(_)));

    let err = struct_by_keys(&Type::int(), Vec::new(), "main").unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::InvalidCompositeType("int".to_string()));
}

#[test]
fn test_struct_field_visibility() {
    let ty = foreign_struct();
    let err = struct_by_keys(&ty, vec![("hidden".to_string(), untyped(1))], "main").unwrap_err();
    assert!(matches!(
        err.kind,
        EvalErrorKind::UnexportedField { ref field, .. } if field == "hidden"
    ));
    let ok = struct_by_keys(&ty, vec![("Public".to_string(), untyped(1))], "main").unwrap();
    assert_eq!(ok.to_string(), "{1 0}");

    // The declaring package sees every field.
    let inside = struct_by_keys(&ty, vec![("hidden".to_string(), untyped(2))], "other").unwrap();
    assert_eq!(inside.to_string(), "{0 2}");

    let err = struct_by_position(&ty, vec![untyped(1), untyped(2)], "main").unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::UnexportedField { .. }));
    let inside = struct_by_position(&ty, vec![untyped(1), untyped(2)], "other").unwrap();
    assert_eq!(inside.to_string(), "{1 2}");
}

#[test]
fn test_struct_by_position() {
    let ty = point_type();
    let p = struct_by_position(&ty, vec![untyped(3), Data::Regular(Val::int(4))], "main").unwrap();
    assert_eq!(p.to_string(), "{3 4}");

    let err = struct_by_position(&ty, vec![untyped(3)], "main").unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::StructValueCount {
            ty: "main.Point".to_string(),
            want: 2,
            got: 1,
        }
    );
}

#[test]
fn test_array_like() {
    let array_ty = Type::array_of(3, &Type::int());
    let array = array_like(&array_ty, vec![(2, untyped(7))]).unwrap();
    assert_eq!(array.to_string(), "[0 0 7]");
    assert_eq!(array.ty(), &array_ty);

    let slice_ty = Type::slice_of(&Type::int());
    let slice = array_like(&slice_ty, vec![(0, untyped(1)), (4, untyped(2))]).unwrap();
    assert_eq!(slice.len().unwrap(), 5);
    assert_eq!(slice.to_string(), "[1 0 0 0 2]");

    let empty = array_like(&slice_ty, Vec::new()).unwrap();
    assert_eq!(empty.len().unwrap(), 0);
    assert!(!empty.is_nil());
}

#[test]
fn test_array_like_errors() {
    let array_ty = Type::array_of(3, &Type::int());
    let err = array_like(&array_ty, vec![(3, untyped(1))]).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::ArrayIndexOutOfBounds { index: 3, len: 3 }
    );

    let err = array_like(&array_ty, vec![(1, untyped(1)), (1, untyped(2))]).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::DuplicateIndex(1));

    let err = array_like(&array_ty, vec![(0, text("x"))]).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::Reflect(_)));

    let err = array_like(&point_type(), Vec::new()).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::InvalidCompositeType(_)));
}

#[test]
fn test_slice_index_past_element_limit() {
    let slice_ty = Type::slice_of(&Type::int());
    let err = array_like(&slice_ty, vec![(1 << 62, untyped(1))]).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::Reflect(ReflectError::TooLarge {
            what: "slice",
            len: (1 << 62) + 1,
            max: MAX_ELEMS,
        })
    );

    let last = array_like(&slice_ty, vec![(MAX_ELEMS, untyped(1))]).unwrap_err();
    assert!(matches!(last.kind, EvalErrorKind::Reflect(ReflectError::TooLarge { .. })));
}

#[test]
fn test_map_from_pairs() {
    let ty = Type::map_of(&Type::string(), &Type::int()).unwrap();
    let map = map_from_pairs(&ty, vec![(text("a"), untyped(1)), (text("b"), untyped(2))]).unwrap();
    assert_eq!(map.len().unwrap(), 2);
    assert_eq!(map.map_index(&Val::string("b")).unwrap(), Some(Val::int(2)));

    // A repeated key keeps the last value.
    let map = map_from_pairs(&ty, vec![(text("a"), untyped(1)), (text("a"), untyped(2))]).unwrap();
    assert_eq!(map.len().unwrap(), 1);
    assert_eq!(map.map_index(&Val::string("a")).unwrap(), Some(Val::int(2)));
}

#[test]
fn test_map_from_pairs_errors() {
    let ty = Type::map_of(&Type::string(), &Type::int()).unwrap();
    let err = map_from_pairs(&ty, vec![(untyped(1), untyped(1))]).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::Reflect(_)));

    let err = map_from_pairs(&ty, vec![(text("a"), Data::Nil)]).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::NotAssignable { .. }));

    let err = map_from_pairs(&Type::slice_of(&Type::int()), Vec::new()).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::InvalidCompositeType("[]int".to_string()));
}
