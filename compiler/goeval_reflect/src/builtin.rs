//! Predeclared types.
//!
//! Built once on first use and never mutated, so lookups need no locking.

use std::sync::OnceLock;

use rustc_hash::FxHashMap;

use crate::{IfaceMethod, Kind, Type};

const BASIC_TYPES: &[(&str, Kind)] = &[
    ("bool", Kind::Bool),
    ("int", Kind::Int),
    ("int8", Kind::Int8),
    ("int16", Kind::Int16),
    ("int32", Kind::Int32),
    ("int64", Kind::Int64),
    ("uint", Kind::Uint),
    ("uint8", Kind::Uint8),
    ("uint16", Kind::Uint16),
    ("uint32", Kind::Uint32),
    ("uint64", Kind::Uint64),
    ("uintptr", Kind::Uintptr),
    ("float32", Kind::Float32),
    ("float64", Kind::Float64),
    ("complex64", Kind::Complex64),
    ("complex128", Kind::Complex128),
    ("string", Kind::String),
];

static BUILTIN_TYPES: OnceLock<FxHashMap<&'static str, Type>> = OnceLock::new();

fn builtin_types() -> &'static FxHashMap<&'static str, Type> {
    BUILTIN_TYPES.get_or_init(|| {
        let mut table = FxHashMap::default();
        for &(name, kind) in BASIC_TYPES {
            table.insert(name, Type::predeclared(kind, name));
        }
        // Aliases share identity with their targets.
        if let Some(uint8) = table.get("uint8").cloned() {
            table.insert("byte", uint8);
        }
        if let Some(int32) = table.get("int32").cloned() {
            table.insert("rune", int32);
        }
        if let Some(string) = table.get("string").cloned() {
            let error_sig = Type::func_type(Vec::new(), vec![string]);
            let error = Type::predeclared_interface(
                "error",
                vec![IfaceMethod {
                    name: "Error".to_string(),
                    ty: error_sig,
                }],
            );
            table.insert("error", error);
        }
        table
    })
}

/// Look up a predeclared type by name (`int`, `byte`, `error`, ...).
pub fn builtin_type(name: &str) -> Option<Type> {
    builtin_types().get(name).cloned()
}

/// Names of all predeclared types, in no particular order.
pub fn builtin_type_names() -> impl Iterator<Item = &'static str> {
    builtin_types().keys().copied()
}

impl Type {
    /// The predeclared type for a basic kind.
    pub fn basic(kind: Kind) -> Option<Type> {
        if kind.is_basic() {
            builtin_type(kind.name())
        } else {
            None
        }
    }

    pub fn bool() -> Type {
        Type::predeclared_basic(Kind::Bool)
    }

    pub fn int() -> Type {
        Type::predeclared_basic(Kind::Int)
    }

    pub fn int32() -> Type {
        Type::predeclared_basic(Kind::Int32)
    }

    pub fn uint8() -> Type {
        Type::predeclared_basic(Kind::Uint8)
    }

    pub fn float64() -> Type {
        Type::predeclared_basic(Kind::Float64)
    }

    pub fn complex128() -> Type {
        Type::predeclared_basic(Kind::Complex128)
    }

    pub fn string() -> Type {
        Type::predeclared_basic(Kind::String)
    }

    /// The basic kinds are all present in the table; fall back to a fresh
    /// predeclared type so no lookup can fail.
    fn predeclared_basic(kind: Kind) -> Type {
        Type::basic(kind).unwrap_or_else(|| Type::predeclared(kind, kind.name()))
    }
}
