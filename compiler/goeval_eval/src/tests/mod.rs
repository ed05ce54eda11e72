//! Evaluator tests.
//!
//! Scenario tests drive [`Expression`] from source text; the engine tests
//! call the operator, call and composite entry points directly.

mod composite_tests;
mod operators_tests;

use goeval_reflect::{IfaceMethod, Method, NativeFunc, StructField, Type, Val};

use crate::{Args, EvalErrorKind, EvalResult, Expression, Value};

/// Install a subscriber once so `RUST_LOG=goeval_eval=trace` shows the
/// dispatcher's spans while debugging a test.
pub(crate) fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    if std::env::var("RUST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
}

pub(crate) fn eval(src: &str, args: &Args) -> EvalResult<Value> {
    init_tracing();
    Expression::parse(src, "main").unwrap().eval(args)
}

/// Evaluate `src` to a runtime value.
pub(crate) fn regular(src: &str, args: &Args) -> Val {
    init_tracing();
    Expression::parse(src, "main")
        .unwrap()
        .eval_to_regular(args)
        .unwrap()
}

pub(crate) fn eval_err(src: &str, args: &Args) -> EvalErrorKind {
    eval(src, args).unwrap_err().kind
}

// =============================================================================
// Host fixtures
// =============================================================================

fn int_field(v: &Val, index: usize) -> Result<i64, String> {
    let field = v.field(index).map_err(|e| e.to_string())?;
    field.as_int().ok_or_else(|| "not an int".to_string())
}

/// `main.Point struct { X, Y int }` with `Sum() int` on the value and
/// `Scale(k int) int` on the pointer.
pub(crate) fn point_type() -> Type {
    let underlying = Type::struct_of(vec![
        StructField::new("X", Type::int()),
        StructField::new("Y", Type::int()),
    ])
    .unwrap();
    let sum = Method {
        name: "Sum".to_string(),
        ty: Type::func_type(Vec::new(), vec![Type::int()]),
        pointer_receiver: false,
        func: NativeFunc::new(|args| {
            let recv = &args[0];
            Ok(vec![Val::int(int_field(recv, 0)? + int_field(recv, 1)?)])
        }),
    };
    let scale = Method {
        name: "Scale".to_string(),
        ty: Type::func_type(vec![Type::int()], vec![Type::int()]),
        pointer_receiver: true,
        func: NativeFunc::new(|args| {
            let recv = args[0].deref().map_err(|e| e.to_string())?;
            let k = args[1].as_int().unwrap_or_default();
            Ok(vec![Val::int((int_field(&recv, 0)? + int_field(&recv, 1)?) * k)])
        }),
    };
    Type::named("main", "Point", &underlying, vec![sum, scale]).unwrap()
}

pub(crate) fn point(ty: &Type, x: i64, y: i64) -> Val {
    Val::struct_from(ty, vec![Val::int(x), Val::int(y)]).unwrap()
}

/// `main.Labeled struct { Label string }` whose pointer type also has a
/// `Label() string` method.
pub(crate) fn labeled_type() -> Type {
    let underlying = Type::struct_of(vec![StructField::new("Label", Type::string())]).unwrap();
    let label = Method {
        name: "Label".to_string(),
        ty: Type::func_type(Vec::new(), vec![Type::string()]),
        pointer_receiver: true,
        func: NativeFunc::new(|_| Ok(vec![Val::string("method")])),
    };
    Type::named("main", "Labeled", &underlying, vec![label]).unwrap()
}

/// `fmt.Stringer interface { String() string }`.
pub(crate) fn stringer_type() -> Type {
    let iface = Type::interface_of(vec![IfaceMethod {
        name: "String".to_string(),
        ty: Type::func_type(Vec::new(), vec![Type::string()]),
    }])
    .unwrap();
    Type::named("fmt", "Stringer", &iface, Vec::new()).unwrap()
}

/// `main.Name string` implementing `fmt.Stringer`.
pub(crate) fn name_type() -> Type {
    let string = Method {
        name: "String".to_string(),
        ty: Type::func_type(Vec::new(), vec![Type::string()]),
        pointer_receiver: false,
        func: NativeFunc::new(|args| {
            let s = args[0].as_str().unwrap_or_default();
            Ok(vec![Val::string(&format!("<{s}>"))])
        }),
    };
    Type::named("main", "Name", &Type::string(), vec![string]).unwrap()
}

/// `struct { Public int; hidden int }` declared in package `other`.
pub(crate) fn foreign_struct() -> Type {
    Type::struct_of(vec![
        StructField::new("Public", Type::int()),
        StructField {
            pkg_path: "other".to_string(),
            ..StructField::new("hidden", Type::int())
        },
    ])
    .unwrap()
}

/// `func(a, b int) int` returning `a + b`.
pub(crate) fn add_func() -> Val {
    let ty = Type::func_type(vec![Type::int(), Type::int()], vec![Type::int()]);
    Val::func(
        &ty,
        NativeFunc::new(|args| {
            let a = args[0].as_int().unwrap_or_default();
            let b = args[1].as_int().unwrap_or_default();
            Ok(vec![Val::int(a + b)])
        }),
    )
    .unwrap()
}

/// `func(xs ...int) int` returning the sum of `xs`.
pub(crate) fn sum_func() -> Val {
    let ty = Type::func_of(
        vec![Type::slice_of(&Type::int())],
        vec![Type::int()],
        true,
    )
    .unwrap();
    Val::func(
        &ty,
        NativeFunc::new(|args| {
            let xs = args[0].elements().map_err(|e| e.to_string())?;
            Ok(vec![Val::int(xs.iter().filter_map(Val::as_int).sum())])
        }),
    )
    .unwrap()
}

pub(crate) fn int_slice(values: &[i64]) -> Val {
    let elems = values.iter().map(|&v| Val::int(v)).collect();
    Val::slice_from(&Type::slice_of(&Type::int()), elems).unwrap()
}
