//! Type descriptors.
//!
//! A [`Type`] is a cheap handle to an immutable descriptor. Named types
//! (including the predeclared basic types) compare by identity; unnamed
//! composite types compare structurally, so `[]int` built twice is the same
//! type.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::{ChanDir, Kind, NativeFunc, ReflectError};

static NEXT_TYPE_ID: AtomicU64 = AtomicU64::new(1);

/// Upper bound on the number of element values one array, slice store or
/// channel buffer may hold, counting the elements of nested arrays and
/// struct fields.
pub const MAX_ELEMS: usize = 1 << 24;

/// Runtime type descriptor.
#[derive(Clone)]
pub struct Type(Arc<TypeData>);

struct TypeData {
    kind: Kind,
    shape: Shape,
    name: Option<TypeName>,
    /// Declared methods of a named type, sorted by name.
    methods: Vec<Method>,
}

#[derive(Clone)]
struct TypeName {
    id: u64,
    pkg_path: String,
    name: String,
    /// `None` for predeclared types, which are their own underlying type.
    underlying: Option<Type>,
}

#[derive(Clone, Debug, PartialEq)]
enum Shape {
    Basic,
    Array {
        len: usize,
        elem: Type,
    },
    Slice {
        elem: Type,
    },
    Pointer {
        elem: Type,
    },
    Map {
        key: Type,
        elem: Type,
    },
    Chan {
        dir: ChanDir,
        elem: Type,
    },
    Func {
        params: Vec<Type>,
        results: Vec<Type>,
        variadic: bool,
    },
    Struct {
        fields: Vec<StructField>,
    },
    Interface {
        methods: Vec<IfaceMethod>,
    },
}

/// One field of a struct type.
#[derive(Clone, Debug, PartialEq)]
pub struct StructField {
    pub name: String,
    /// Declaring package of an unexported field; empty for exported names.
    pub pkg_path: String,
    pub ty: Type,
    pub tag: String,
    pub embedded: bool,
}

impl StructField {
    /// An exported, untagged, non-embedded field.
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        StructField {
            name: name.into(),
            pkg_path: String::new(),
            ty,
            tag: String::new(),
            embedded: false,
        }
    }

    pub fn is_exported(&self) -> bool {
        is_exported(&self.name)
    }
}

/// One method of an interface type.
#[derive(Clone, Debug, PartialEq)]
pub struct IfaceMethod {
    pub name: String,
    /// Signature, a func type.
    pub ty: Type,
}

/// A method declared on a named type.
#[derive(Clone)]
pub struct Method {
    pub name: String,
    /// Signature without the receiver.
    pub ty: Type,
    /// Declared on `*T` rather than `T`.
    pub pointer_receiver: bool,
    /// Implementation; receives the receiver as its first argument
    /// (a pointer for pointer-receiver methods, the value otherwise).
    pub func: NativeFunc,
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("pointer_receiver", &self.pointer_receiver)
            .finish_non_exhaustive()
    }
}

/// Exported names start with an upper-case letter.
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c == '_' || c.is_alphabetic())
        && chars.all(|c| c == '_' || c.is_alphanumeric())
}

impl Type {
    fn from_parts(kind: Kind, shape: Shape, name: Option<TypeName>, methods: Vec<Method>) -> Type {
        Type(Arc::new(TypeData {
            kind,
            shape,
            name,
            methods,
        }))
    }

    fn next_name(pkg_path: &str, name: &str, underlying: Option<Type>) -> TypeName {
        TypeName {
            id: NEXT_TYPE_ID.fetch_add(1, Ordering::Relaxed),
            pkg_path: pkg_path.to_string(),
            name: name.to_string(),
            underlying,
        }
    }

    /// A predeclared basic type. Only the builtin table calls this.
    pub(crate) fn predeclared(kind: Kind, name: &str) -> Type {
        Type::from_parts(kind, Shape::Basic, Some(Type::next_name("", name, None)), Vec::new())
    }

    /// A predeclared named interface (`error`).
    pub(crate) fn predeclared_interface(name: &str, methods: Vec<IfaceMethod>) -> Type {
        let underlying = Type::from_parts(Kind::Interface, Shape::Interface { methods }, None, Vec::new());
        let shape = underlying.0.shape.clone();
        Type::from_parts(
            Kind::Interface,
            shape,
            Some(Type::next_name("", name, Some(underlying))),
            Vec::new(),
        )
    }

    /// Declare a new named type `pkg_path.name` over `underlying`.
    ///
    /// Each call yields a distinct type, even for identical arguments.
    pub fn named(
        pkg_path: &str,
        name: &str,
        underlying: &Type,
        mut methods: Vec<Method>,
    ) -> Result<Type, ReflectError> {
        if !is_identifier(name) {
            return Err(ReflectError::InvalidFieldName(name.to_string()));
        }
        if underlying.kind() == Kind::Interface && !methods.is_empty() {
            return Err(ReflectError::KindMismatch {
                method: "Named with methods",
                kind: underlying.to_string(),
            });
        }
        methods.sort_by(|a, b| a.name.cmp(&b.name));
        for pair in methods.windows(2) {
            if pair[0].name == pair[1].name {
                return Err(ReflectError::DuplicateField(pair[0].name.clone()));
            }
        }
        if let Some(m) = methods.iter().find(|m| m.ty.kind() != Kind::Func) {
            return Err(ReflectError::KindMismatch {
                method: "Named with non-func method",
                kind: m.ty.to_string(),
            });
        }
        let underlying = underlying.underlying();
        let shape = underlying.0.shape.clone();
        Ok(Type::from_parts(
            underlying.kind(),
            shape,
            Some(Type::next_name(pkg_path, name, Some(underlying))),
            methods,
        ))
    }

    pub fn slice_of(elem: &Type) -> Type {
        Type::from_parts(Kind::Slice, Shape::Slice { elem: elem.clone() }, None, Vec::new())
    }

    pub fn array_of(len: usize, elem: &Type) -> Type {
        Type::from_parts(
            Kind::Array,
            Shape::Array {
                len,
                elem: elem.clone(),
            },
            None,
            Vec::new(),
        )
    }

    /// [`Type::array_of`] with the length checked against [`MAX_ELEMS`].
    pub fn checked_array_of(len: usize, elem: &Type) -> Result<Type, ReflectError> {
        Type::ensure_fits("array", len, elem)?;
        Ok(Type::array_of(len, elem))
    }

    /// Fail unless `len` values of `elem` stay within [`MAX_ELEMS`].
    pub fn ensure_fits(what: &'static str, len: usize, elem: &Type) -> Result<(), ReflectError> {
        if len.saturating_mul(elem.value_count()) > MAX_ELEMS {
            return Err(ReflectError::TooLarge {
                what,
                len,
                max: MAX_ELEMS,
            });
        }
        Ok(())
    }

    /// Number of values a zero value of this type materializes.
    fn value_count(&self) -> usize {
        match &self.0.shape {
            Shape::Array { len, elem } => len.saturating_mul(elem.value_count()),
            Shape::Struct { fields } => fields
                .iter()
                .fold(1usize, |n, f| n.saturating_add(f.ty.value_count())),
            _ => 1,
        }
    }

    pub fn pointer_to(elem: &Type) -> Type {
        Type::from_parts(Kind::Pointer, Shape::Pointer { elem: elem.clone() }, None, Vec::new())
    }

    pub fn chan_of(dir: ChanDir, elem: &Type) -> Type {
        Type::from_parts(
            Kind::Chan,
            Shape::Chan {
                dir,
                elem: elem.clone(),
            },
            None,
            Vec::new(),
        )
    }

    /// Map type; the key type must support `==`.
    pub fn map_of(key: &Type, elem: &Type) -> Result<Type, ReflectError> {
        if !key.comparable() {
            return Err(ReflectError::InvalidMapKey(key.to_string()));
        }
        Ok(Type::from_parts(
            Kind::Map,
            Shape::Map {
                key: key.clone(),
                elem: elem.clone(),
            },
            None,
            Vec::new(),
        ))
    }

    /// Function type; a variadic function's last parameter must be a slice.
    pub fn func_of(
        params: Vec<Type>,
        results: Vec<Type>,
        variadic: bool,
    ) -> Result<Type, ReflectError> {
        if variadic && params.last().map(Type::kind) != Some(Kind::Slice) {
            return Err(ReflectError::KindMismatch {
                method: "FuncOf with variadic",
                kind: params
                    .last()
                    .map_or_else(|| "no parameter".to_string(), ToString::to_string),
            });
        }
        Ok(Type::from_parts(
            Kind::Func,
            Shape::Func {
                params,
                results,
                variadic,
            },
            None,
            Vec::new(),
        ))
    }

    /// Non-variadic function type; cannot fail.
    pub fn func_type(params: Vec<Type>, results: Vec<Type>) -> Type {
        Type::from_parts(
            Kind::Func,
            Shape::Func {
                params,
                results,
                variadic: false,
            },
            None,
            Vec::new(),
        )
    }

    /// Struct type. Field names must be unique identifiers (blank `_` may
    /// repeat); embedded fields must name a type or a pointer to one.
    pub fn struct_of(mut fields: Vec<StructField>) -> Result<Type, ReflectError> {
        let mut seen = rustc_hash::FxHashSet::default();
        for field in &mut fields {
            if !is_identifier(&field.name) {
                return Err(ReflectError::InvalidFieldName(field.name.clone()));
            }
            if field.name != "_" && !seen.insert(field.name.clone()) {
                return Err(ReflectError::DuplicateField(field.name.clone()));
            }
            if field.embedded {
                let base = match field.ty.kind() {
                    Kind::Pointer => field.ty.elem().cloned(),
                    _ => Some(field.ty.clone()),
                };
                if !base.is_some_and(|t| t.is_named()) {
                    return Err(ReflectError::InvalidEmbeddedField(field.ty.to_string()));
                }
            }
            if field.is_exported() {
                field.pkg_path.clear();
            }
        }
        Ok(Type::from_parts(Kind::Struct, Shape::Struct { fields }, None, Vec::new()))
    }

    /// Interface type with the given method set.
    pub fn interface_of(mut methods: Vec<IfaceMethod>) -> Result<Type, ReflectError> {
        methods.sort_by(|a, b| a.name.cmp(&b.name));
        for pair in methods.windows(2) {
            if pair[0].name == pair[1].name {
                return Err(ReflectError::DuplicateField(pair[0].name.clone()));
            }
        }
        if let Some(m) = methods.iter().find(|m| m.ty.kind() != Kind::Func) {
            return Err(ReflectError::KindMismatch {
                method: "InterfaceOf with non-func method",
                kind: m.ty.to_string(),
            });
        }
        Ok(Type::from_parts(Kind::Interface, Shape::Interface { methods }, None, Vec::new()))
    }

    /// The empty interface `interface{}`.
    pub fn empty_interface() -> Type {
        Type::from_parts(
            Kind::Interface,
            Shape::Interface {
                methods: Vec::new(),
            },
            None,
            Vec::new(),
        )
    }

    // =========================================================================
    // Queries
    // =========================================================================

    #[inline]
    pub fn kind(&self) -> Kind {
        self.0.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.0.name.as_ref().map(|n| n.name.as_str())
    }

    /// Declaring package of a named type; empty for predeclared and unnamed types.
    pub fn pkg_path(&self) -> &str {
        self.0.name.as_ref().map_or("", |n| n.pkg_path.as_str())
    }

    pub fn is_named(&self) -> bool {
        self.0.name.is_some()
    }

    /// The type with names stripped from the top level.
    pub fn underlying(&self) -> Type {
        match &self.0.name {
            Some(TypeName {
                underlying: Some(u),
                ..
            }) => u.clone(),
            _ => self.clone(),
        }
    }

    /// Element type of arrays, slices, pointers, maps and channels.
    pub fn elem(&self) -> Option<&Type> {
        match &self.0.shape {
            Shape::Array { elem, .. }
            | Shape::Slice { elem }
            | Shape::Pointer { elem }
            | Shape::Map { elem, .. }
            | Shape::Chan { elem, .. } => Some(elem),
            _ => None,
        }
    }

    pub fn key(&self) -> Option<&Type> {
        match &self.0.shape {
            Shape::Map { key, .. } => Some(key),
            _ => None,
        }
    }

    pub fn array_len(&self) -> Option<usize> {
        match &self.0.shape {
            Shape::Array { len, .. } => Some(*len),
            _ => None,
        }
    }

    pub fn chan_dir(&self) -> Option<ChanDir> {
        match &self.0.shape {
            Shape::Chan { dir, .. } => Some(*dir),
            _ => None,
        }
    }

    pub fn fields(&self) -> &[StructField] {
        match &self.0.shape {
            Shape::Struct { fields } => fields,
            _ => &[],
        }
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields().iter().position(|f| f.name == name)
    }

    pub fn params(&self) -> &[Type] {
        match &self.0.shape {
            Shape::Func { params, .. } => params,
            _ => &[],
        }
    }

    pub fn results(&self) -> &[Type] {
        match &self.0.shape {
            Shape::Func { results, .. } => results,
            _ => &[],
        }
    }

    pub fn is_variadic(&self) -> bool {
        matches!(&self.0.shape, Shape::Func { variadic: true, .. })
    }

    pub fn iface_methods(&self) -> &[IfaceMethod] {
        match &self.0.shape {
            Shape::Interface { methods } => methods,
            _ => &[],
        }
    }

    /// Methods declared on this named type (both receiver forms).
    pub fn declared_methods(&self) -> &[Method] {
        &self.0.methods
    }

    /// Look up `name` in the method set.
    ///
    /// The method set of a named type `T` holds its value-receiver methods;
    /// the set of `*T` holds all of `T`'s methods. Interfaces have no
    /// concrete methods here.
    pub fn method_by_name(&self, name: &str) -> Option<&Method> {
        match self.kind() {
            Kind::Interface => None,
            Kind::Pointer if !self.is_named() => {
                let elem = self.elem()?;
                if elem.kind() == Kind::Interface || elem.kind() == Kind::Pointer {
                    return None;
                }
                elem.0.methods.iter().find(|m| m.name == name)
            }
            _ => self
                .0
                .methods
                .iter()
                .find(|m| m.name == name && !m.pointer_receiver),
        }
    }

    /// Whether values of this type support `==`.
    pub fn comparable(&self) -> bool {
        match self.kind() {
            Kind::Slice | Kind::Map | Kind::Func => false,
            Kind::Array => self.elem().is_some_and(Type::comparable),
            Kind::Struct => self.fields().iter().all(|f| f.ty.comparable()),
            _ => true,
        }
    }

    /// Whether this type's method set satisfies the interface `iface`.
    pub fn implements(&self, iface: &Type) -> bool {
        if iface.kind() != Kind::Interface {
            return false;
        }
        iface.iface_methods().iter().all(|want| {
            if self.kind() == Kind::Interface {
                self.iface_methods()
                    .iter()
                    .any(|have| have.name == want.name && have.ty == want.ty)
            } else {
                self.method_by_name(&want.name)
                    .is_some_and(|have| have.ty == want.ty)
            }
        })
    }

    /// Assignability of a value of this type to a variable of type `to`.
    pub fn assignable_to(&self, to: &Type) -> bool {
        if self == to {
            return true;
        }
        let one_unnamed = !self.is_named() || !to.is_named();
        if one_unnamed && self.underlying() == to.underlying() {
            return true;
        }
        if to.kind() == Kind::Interface && self.implements(to) {
            return true;
        }
        self.kind() == Kind::Chan
            && to.kind() == Kind::Chan
            && self.chan_dir() == Some(ChanDir::Both)
            && self.elem() == to.elem()
            && one_unnamed
    }

    /// Explicit conversion `to(x)` for a value `x` of this type.
    pub fn convertible_to(&self, to: &Type) -> bool {
        if self.assignable_to(to) || self.underlying() == to.underlying() {
            return true;
        }
        let (from_kind, to_kind) = (self.kind(), to.kind());
        if from_kind == Kind::Pointer
            && to_kind == Kind::Pointer
            && !self.is_named()
            && !to.is_named()
        {
            return match (self.elem(), to.elem()) {
                (Some(a), Some(b)) => a.underlying() == b.underlying(),
                _ => false,
            };
        }
        let real = |k: Kind| k.is_integer() || k.is_float();
        if real(from_kind) && real(to_kind) {
            return true;
        }
        if from_kind.is_complex() && to_kind.is_complex() {
            return true;
        }
        if to_kind == Kind::String && (from_kind.is_integer() || self.is_bytes_or_runes()) {
            return true;
        }
        from_kind == Kind::String && to.is_bytes_or_runes()
    }

    /// `[]byte` or `[]rune` (by element kind).
    pub fn is_bytes_or_runes(&self) -> bool {
        self.kind() == Kind::Slice
            && self
                .elem()
                .is_some_and(|e| matches!(e.kind(), Kind::Uint8 | Kind::Int32))
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.0, &other.0) {
            return true;
        }
        match (&self.0.name, &other.0.name) {
            (Some(a), Some(b)) => a.id == b.id,
            (None, None) => self.0.kind == other.0.kind && self.0.shape == other.0.shape,
            _ => false,
        }
    }
}

impl Eq for Type {}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.0.name {
            if name.pkg_path.is_empty() {
                return f.write_str(&name.name);
            }
            let pkg = name.pkg_path.rsplit('/').next().unwrap_or(&name.pkg_path);
            return write!(f, "{pkg}.{}", name.name);
        }
        match &self.0.shape {
            Shape::Basic => f.write_str(self.kind().name()),
            Shape::Array { len, elem } => write!(f, "[{len}]{elem}"),
            Shape::Slice { elem } => write!(f, "[]{elem}"),
            Shape::Pointer { elem } => write!(f, "*{elem}"),
            Shape::Map { key, elem } => write!(f, "map[{key}]{elem}"),
            Shape::Chan { dir, elem } => match dir {
                ChanDir::Both => write!(f, "chan {elem}"),
                ChanDir::Send => write!(f, "chan<- {elem}"),
                ChanDir::Recv => write!(f, "<-chan {elem}"),
            },
            Shape::Func {
                params,
                results,
                variadic,
            } => {
                f.write_str("func")?;
                write_signature(f, params, results, *variadic)
            }
            Shape::Struct { fields } => {
                if fields.is_empty() {
                    return f.write_str("struct {}");
                }
                f.write_str("struct {")?;
                for (i, field) in fields.iter().enumerate() {
                    f.write_str(if i == 0 { " " } else { "; " })?;
                    if field.embedded {
                        write!(f, "{}", field.ty)?;
                    } else {
                        write!(f, "{} {}", field.name, field.ty)?;
                    }
                    if !field.tag.is_empty() {
                        write!(f, " {:?}", field.tag)?;
                    }
                }
                f.write_str(" }")
            }
            Shape::Interface { methods } => {
                if methods.is_empty() {
                    return f.write_str("interface {}");
                }
                f.write_str("interface {")?;
                for (i, m) in methods.iter().enumerate() {
                    f.write_str(if i == 0 { " " } else { "; " })?;
                    f.write_str(&m.name)?;
                    write_signature(f, m.ty.params(), m.ty.results(), m.ty.is_variadic())?;
                }
                f.write_str(" }")
            }
        }
    }
}

fn write_signature(
    f: &mut fmt::Formatter<'_>,
    params: &[Type],
    results: &[Type],
    variadic: bool,
) -> fmt::Result {
    f.write_str("(")?;
    for (i, p) in params.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        match p.elem() {
            Some(elem) if variadic && i + 1 == params.len() => write!(f, "...{elem}")?,
            _ => write!(f, "{p}")?,
        }
    }
    f.write_str(")")?;
    match results {
        [] => Ok(()),
        [single] => write!(f, " {single}"),
        many => {
            f.write_str(" (")?;
            for (i, r) in many.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{r}")?;
            }
            f.write_str(")")
        }
    }
}
