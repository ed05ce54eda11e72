//! Kinds of runtime types.

use std::fmt;

/// The structural category of a type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    Complex64,
    Complex128,
    String,
    Array,
    Chan,
    Func,
    Interface,
    Map,
    Pointer,
    Slice,
    Struct,
}

impl Kind {
    pub fn is_signed(self) -> bool {
        matches!(
            self,
            Kind::Int | Kind::Int8 | Kind::Int16 | Kind::Int32 | Kind::Int64
        )
    }

    pub fn is_unsigned(self) -> bool {
        matches!(
            self,
            Kind::Uint | Kind::Uint8 | Kind::Uint16 | Kind::Uint32 | Kind::Uint64 | Kind::Uintptr
        )
    }

    pub fn is_integer(self) -> bool {
        self.is_signed() || self.is_unsigned()
    }

    pub fn is_float(self) -> bool {
        matches!(self, Kind::Float32 | Kind::Float64)
    }

    pub fn is_complex(self) -> bool {
        matches!(self, Kind::Complex64 | Kind::Complex128)
    }

    pub fn is_numeric(self) -> bool {
        self.is_integer() || self.is_float() || self.is_complex()
    }

    /// Kinds with `<`, `<=`, `>`, `>=`.
    pub fn is_ordered(self) -> bool {
        self.is_integer() || self.is_float() || self == Kind::String
    }

    /// Kinds whose values may be `nil`.
    pub fn is_nillable(self) -> bool {
        matches!(
            self,
            Kind::Chan | Kind::Func | Kind::Interface | Kind::Map | Kind::Pointer | Kind::Slice
        )
    }

    /// Kinds backed by a predeclared type.
    pub fn is_basic(self) -> bool {
        self.is_numeric() || matches!(self, Kind::Bool | Kind::String)
    }

    /// Width in bits of sized numeric kinds; `int`, `uint` and `uintptr` are 64.
    pub fn bits(self) -> u32 {
        match self {
            Kind::Int8 | Kind::Uint8 => 8,
            Kind::Int16 | Kind::Uint16 => 16,
            Kind::Int32 | Kind::Uint32 | Kind::Float32 => 32,
            Kind::Complex64 => 64,
            Kind::Complex128 => 128,
            _ => 64,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Int8 => "int8",
            Kind::Int16 => "int16",
            Kind::Int32 => "int32",
            Kind::Int64 => "int64",
            Kind::Uint => "uint",
            Kind::Uint8 => "uint8",
            Kind::Uint16 => "uint16",
            Kind::Uint32 => "uint32",
            Kind::Uint64 => "uint64",
            Kind::Uintptr => "uintptr",
            Kind::Float32 => "float32",
            Kind::Float64 => "float64",
            Kind::Complex64 => "complex64",
            Kind::Complex128 => "complex128",
            Kind::String => "string",
            Kind::Array => "array",
            Kind::Chan => "chan",
            Kind::Func => "func",
            Kind::Interface => "interface",
            Kind::Map => "map",
            Kind::Pointer => "ptr",
            Kind::Slice => "slice",
            Kind::Struct => "struct",
        }
    }

    /// Truncate `v` to this signed kind's width, sign-extending the result.
    pub fn wrap_signed(self, v: i64) -> i64 {
        match self.bits() {
            8 => i64::from(v as i8),
            16 => i64::from(v as i16),
            32 => i64::from(v as i32),
            _ => v,
        }
    }

    /// Truncate `v` to this unsigned kind's width.
    pub fn wrap_unsigned(self, v: u64) -> u64 {
        match self.bits() {
            8 => u64::from(v as u8),
            16 => u64::from(v as u16),
            32 => u64::from(v as u32),
            _ => v,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
