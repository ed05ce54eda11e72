//! Runtime values.
//!
//! A [`Val`] pairs a [`Type`] with its representation. Arrays and structs
//! have value semantics (cloning copies them); slices, maps, channels and
//! pointers share their storage. A value read through a pointer, a slice
//! element, or a field of such a value remembers its [`Place`] and is
//! therefore addressable.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::{Kind, ReflectError, Type};

type Store = Arc<RwLock<Vec<Val>>>;
type MapStore = Arc<RwLock<Vec<(Val, Val)>>>;

/// Host-supplied function body.
pub type NativeFn = dyn Fn(&[Val]) -> Result<Vec<Val>, String> + Send + Sync;

/// A callable implemented by the embedding program.
#[derive(Clone)]
pub struct NativeFunc(Arc<NativeFn>);

impl NativeFunc {
    pub fn new(f: impl Fn(&[Val]) -> Result<Vec<Val>, String> + Send + Sync + 'static) -> Self {
        NativeFunc(Arc::new(f))
    }

    pub fn call(&self, args: &[Val]) -> Result<Vec<Val>, String> {
        (self.0)(args)
    }
}

impl fmt::Debug for NativeFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NativeFunc")
    }
}

/// Location of an addressable value.
#[derive(Clone)]
pub enum Place {
    /// Heap cell created by `new(T)` or `&T{...}`.
    Cell(Arc<RwLock<Val>>),
    /// Element of a slice's backing store.
    Elem { store: Store, index: usize },
    /// Field or element of the aggregate stored at `base`.
    Component { base: Arc<Place>, index: usize },
}

impl Place {
    /// Read the current value (without a place of its own).
    pub fn load(&self) -> Result<Val, ReflectError> {
        match self {
            Place::Cell(cell) => Ok(cell.read().clone()),
            Place::Elem { store, index } => {
                let data = store.read();
                data.get(*index)
                    .cloned()
                    .ok_or(ReflectError::IndexOutOfRange {
                        index: *index as i64,
                        len: data.len(),
                    })
            }
            Place::Component { base, index } => {
                let aggregate = base.load()?;
                aggregate.component(*index)
            }
        }
    }

    /// Overwrite the stored value.
    pub fn store(&self, value: Val) -> Result<(), ReflectError> {
        let value = value.without_place();
        match self {
            Place::Cell(cell) => {
                *cell.write() = value;
                Ok(())
            }
            Place::Elem { store, index } => {
                let mut data = store.write();
                let len = data.len();
                let slot = data.get_mut(*index).ok_or(ReflectError::IndexOutOfRange {
                    index: *index as i64,
                    len,
                })?;
                *slot = value;
                Ok(())
            }
            Place::Component { base, index } => {
                let mut aggregate = base.load()?;
                aggregate.set_component(*index, value)?;
                base.store(aggregate)
            }
        }
    }

    /// Pointer identity.
    fn same(&self, other: &Place) -> bool {
        match (self, other) {
            (Place::Cell(a), Place::Cell(b)) => Arc::ptr_eq(a, b),
            (Place::Elem { store: a, index: i }, Place::Elem { store: b, index: j }) => {
                Arc::ptr_eq(a, b) && i == j
            }
            (
                Place::Component { base: a, index: i },
                Place::Component { base: b, index: j },
            ) => i == j && a.same(b),
            _ => false,
        }
    }
}

#[derive(Clone)]
struct SliceRef {
    store: Store,
    offset: usize,
    len: usize,
    cap: usize,
}

#[derive(Clone)]
struct ChanRef {
    buffer: Arc<Mutex<VecDeque<Val>>>,
    cap: usize,
}

#[derive(Clone)]
enum Repr {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Complex(f64, f64),
    String(Arc<str>),
    Array(Vec<Val>),
    Struct(Vec<Val>),
    Slice(Option<SliceRef>),
    Map(Option<MapStore>),
    Chan(Option<ChanRef>),
    Func(Option<NativeFunc>),
    Pointer(Option<Place>),
    /// Dynamic value of an interface; `None` is a nil interface.
    Interface(Option<Box<Val>>),
}

/// A runtime value and its type.
#[derive(Clone)]
pub struct Val {
    ty: Type,
    repr: Repr,
    place: Option<Place>,
}

fn kind_mismatch(method: &'static str, ty: &Type) -> ReflectError {
    ReflectError::KindMismatch {
        method,
        kind: ty.kind().to_string(),
    }
}

fn out_of_range(index: i64, len: usize) -> ReflectError {
    ReflectError::IndexOutOfRange { index, len }
}

fn to_index(index: i64, len: usize) -> Result<usize, ReflectError> {
    usize::try_from(index)
        .ok()
        .filter(|&i| i < len)
        .ok_or(out_of_range(index, len))
}

impl Val {
    fn new(ty: &Type, repr: Repr) -> Val {
        Val {
            ty: ty.clone(),
            repr,
            place: None,
        }
    }

    // =========================================================================
    // Construction
    // =========================================================================

    /// Zero value of `ty`.
    pub fn zero(ty: &Type) -> Val {
        let kind = ty.kind();
        let repr = match kind {
            Kind::Bool => Repr::Bool(false),
            k if k.is_signed() => Repr::Int(0),
            k if k.is_unsigned() => Repr::Uint(0),
            k if k.is_float() => Repr::Float(0.0),
            k if k.is_complex() => Repr::Complex(0.0, 0.0),
            Kind::String => Repr::String(Arc::from("")),
            Kind::Array => {
                let len = ty.array_len().unwrap_or(0);
                let elems = match ty.elem() {
                    Some(elem) => (0..len).map(|_| Val::zero(elem)).collect(),
                    None => Vec::new(),
                };
                Repr::Array(elems)
            }
            Kind::Struct => Repr::Struct(ty.fields().iter().map(|f| Val::zero(&f.ty)).collect()),
            Kind::Slice => Repr::Slice(None),
            Kind::Map => Repr::Map(None),
            Kind::Chan => Repr::Chan(None),
            Kind::Func => Repr::Func(None),
            Kind::Pointer => Repr::Pointer(None),
            _ => Repr::Interface(None),
        };
        Val::new(ty, repr)
    }

    pub fn make_bool(ty: &Type, v: bool) -> Result<Val, ReflectError> {
        if ty.kind() != Kind::Bool {
            return Err(kind_mismatch("MakeBool", ty));
        }
        Ok(Val::new(ty, Repr::Bool(v)))
    }

    /// Integer value of any integer kind, wrapped to the kind's width.
    pub fn make_int(ty: &Type, v: i64) -> Result<Val, ReflectError> {
        let kind = ty.kind();
        let repr = if kind.is_signed() {
            Repr::Int(kind.wrap_signed(v))
        } else if kind.is_unsigned() {
            Repr::Uint(kind.wrap_unsigned(v as u64))
        } else {
            return Err(kind_mismatch("MakeInt", ty));
        };
        Ok(Val::new(ty, repr))
    }

    /// Integer value from an unsigned source, wrapped to the kind's width.
    pub fn make_uint(ty: &Type, v: u64) -> Result<Val, ReflectError> {
        let kind = ty.kind();
        let repr = if kind.is_unsigned() {
            Repr::Uint(kind.wrap_unsigned(v))
        } else if kind.is_signed() {
            Repr::Int(kind.wrap_signed(v as i64))
        } else {
            return Err(kind_mismatch("MakeUint", ty));
        };
        Ok(Val::new(ty, repr))
    }

    /// Float value, rounded to single precision for `float32` kinds.
    pub fn make_float(ty: &Type, v: f64) -> Result<Val, ReflectError> {
        match ty.kind() {
            Kind::Float32 => Ok(Val::new(ty, Repr::Float(f64::from(v as f32)))),
            Kind::Float64 => Ok(Val::new(ty, Repr::Float(v))),
            _ => Err(kind_mismatch("MakeFloat", ty)),
        }
    }

    pub fn make_complex(ty: &Type, re: f64, im: f64) -> Result<Val, ReflectError> {
        match ty.kind() {
            Kind::Complex64 => Ok(Val::new(
                ty,
                Repr::Complex(f64::from(re as f32), f64::from(im as f32)),
            )),
            Kind::Complex128 => Ok(Val::new(ty, Repr::Complex(re, im))),
            _ => Err(kind_mismatch("MakeComplex", ty)),
        }
    }

    pub fn make_string(ty: &Type, s: &str) -> Result<Val, ReflectError> {
        if ty.kind() != Kind::String {
            return Err(kind_mismatch("MakeString", ty));
        }
        Ok(Val::new(ty, Repr::String(Arc::from(s))))
    }

    pub fn bool(v: bool) -> Val {
        Val::new(&Type::bool(), Repr::Bool(v))
    }

    pub fn int(v: i64) -> Val {
        Val::new(&Type::int(), Repr::Int(v))
    }

    pub fn float64(v: f64) -> Val {
        Val::new(&Type::float64(), Repr::Float(v))
    }

    pub fn string(s: &str) -> Val {
        Val::new(&Type::string(), Repr::String(Arc::from(s)))
    }

    /// Function value of func type `ty`.
    pub fn func(ty: &Type, f: NativeFunc) -> Result<Val, ReflectError> {
        if ty.kind() != Kind::Func {
            return Err(kind_mismatch("MakeFunc", ty));
        }
        Ok(Val::new(ty, Repr::Func(Some(f))))
    }

    /// Allocate a cell holding `v` and return a pointer to it.
    pub fn new_pointer(v: Val) -> Val {
        let ty = Type::pointer_to(&v.ty);
        let cell = Arc::new(RwLock::new(v.without_place()));
        Val::new(&ty, Repr::Pointer(Some(Place::Cell(cell))))
    }

    /// Slice of type `ty` holding `elems`, with `len == cap`.
    pub fn slice_from(ty: &Type, elems: Vec<Val>) -> Result<Val, ReflectError> {
        if ty.kind() != Kind::Slice {
            return Err(kind_mismatch("SliceFrom", ty));
        }
        let len = elems.len();
        let elems = elems.into_iter().map(Val::without_place).collect();
        Ok(Val::new(
            ty,
            Repr::Slice(Some(SliceRef {
                store: Arc::new(RwLock::new(elems)),
                offset: 0,
                len,
                cap: len,
            })),
        ))
    }

    /// Array of type `ty`; `elems` must match the array length.
    pub fn array_from(ty: &Type, elems: Vec<Val>) -> Result<Val, ReflectError> {
        let Some(len) = ty.array_len() else {
            return Err(kind_mismatch("ArrayFrom", ty));
        };
        if elems.len() != len {
            return Err(out_of_range(elems.len() as i64, len));
        }
        let elems = elems.into_iter().map(Val::without_place).collect();
        Ok(Val::new(ty, Repr::Array(elems)))
    }

    /// Struct of type `ty` with one value per field, in declaration order.
    pub fn struct_from(ty: &Type, fields: Vec<Val>) -> Result<Val, ReflectError> {
        if ty.kind() != Kind::Struct {
            return Err(kind_mismatch("StructFrom", ty));
        }
        if fields.len() != ty.fields().len() {
            return Err(ReflectError::ArgCount {
                want: ty.fields().len(),
                got: fields.len(),
            });
        }
        let fields = fields.into_iter().map(Val::without_place).collect();
        Ok(Val::new(ty, Repr::Struct(fields)))
    }

    /// Map of type `ty`; later duplicate keys overwrite earlier ones.
    pub fn map_from(ty: &Type, pairs: Vec<(Val, Val)>) -> Result<Val, ReflectError> {
        let map = Val::make_map(ty)?;
        for (key, value) in pairs {
            map.map_insert(key, value)?;
        }
        Ok(map)
    }

    pub fn make_map(ty: &Type) -> Result<Val, ReflectError> {
        if ty.kind() != Kind::Map {
            return Err(kind_mismatch("MakeMap", ty));
        }
        Ok(Val::new(ty, Repr::Map(Some(Arc::new(RwLock::new(Vec::new()))))))
    }

    pub fn make_slice(ty: &Type, len: usize, cap: usize) -> Result<Val, ReflectError> {
        let Some(elem) = ty.elem().filter(|_| ty.kind() == Kind::Slice) else {
            return Err(kind_mismatch("MakeSlice", ty));
        };
        if len > cap {
            return Err(ReflectError::SizeOutOfRange { what: "len" });
        }
        Type::ensure_fits("slice", cap, elem)?;
        let store = (0..cap).map(|_| Val::zero(elem)).collect();
        Ok(Val::new(
            ty,
            Repr::Slice(Some(SliceRef {
                store: Arc::new(RwLock::new(store)),
                offset: 0,
                len,
                cap,
            })),
        ))
    }

    pub fn make_chan(ty: &Type, cap: usize) -> Result<Val, ReflectError> {
        if ty.kind() != Kind::Chan {
            return Err(kind_mismatch("MakeChan", ty));
        }
        if let Some(elem) = ty.elem() {
            Type::ensure_fits("channel buffer", cap, elem)?;
        }
        Ok(Val::new(
            ty,
            Repr::Chan(Some(ChanRef {
                buffer: Arc::new(Mutex::new(VecDeque::with_capacity(cap))),
                cap,
            })),
        ))
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    #[inline]
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    #[inline]
    pub fn kind(&self) -> Kind {
        self.ty.kind()
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.repr {
            Repr::Bool(b) => Some(b),
            _ => None,
        }
    }

    /// Value of a signed integer kind.
    pub fn as_int(&self) -> Option<i64> {
        match self.repr {
            Repr::Int(i) => Some(i),
            _ => None,
        }
    }

    /// Value of an unsigned integer kind.
    pub fn as_uint(&self) -> Option<u64> {
        match self.repr {
            Repr::Uint(u) => Some(u),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self.repr {
            Repr::Float(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_complex(&self) -> Option<(f64, f64)> {
        match self.repr {
            Repr::Complex(re, im) => Some((re, im)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.repr {
            Repr::String(s) => Some(s),
            _ => None,
        }
    }

    /// Any integer kind as `i64`, if it fits.
    pub fn to_i64(&self) -> Option<i64> {
        match self.repr {
            Repr::Int(i) => Some(i),
            Repr::Uint(u) => i64::try_from(u).ok(),
            _ => None,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(
            self.repr,
            Repr::Slice(None)
                | Repr::Map(None)
                | Repr::Chan(None)
                | Repr::Func(None)
                | Repr::Pointer(None)
                | Repr::Interface(None)
        )
    }

    pub fn can_addr(&self) -> bool {
        self.place.is_some()
    }

    /// Pointer to this value, if addressable.
    pub fn addr(&self) -> Option<Val> {
        let place = self.place.clone()?;
        Some(Val::new(
            &Type::pointer_to(&self.ty),
            Repr::Pointer(Some(place)),
        ))
    }

    /// Dynamic value held by an interface.
    pub fn interface_elem(&self) -> Option<&Val> {
        match &self.repr {
            Repr::Interface(Some(v)) => Some(v),
            _ => None,
        }
    }

    /// Copy of this value that is not addressable.
    #[must_use]
    pub fn without_place(self) -> Val {
        Val { place: None, ..self }
    }

    /// Same representation under another type.
    fn retype(&self, ty: &Type) -> Val {
        Val::new(ty, self.repr.clone())
    }

    pub fn len(&self) -> Result<usize, ReflectError> {
        match &self.repr {
            Repr::String(s) => Ok(s.len()),
            Repr::Array(elems) => Ok(elems.len()),
            Repr::Slice(s) => Ok(s.as_ref().map_or(0, |s| s.len)),
            Repr::Map(m) => Ok(m.as_ref().map_or(0, |m| m.read().len())),
            Repr::Chan(c) => Ok(c.as_ref().map_or(0, |c| c.buffer.lock().len())),
            Repr::Pointer(_) if self.ty.elem().is_some_and(|e| e.kind() == Kind::Array) => {
                Ok(self.ty.elem().and_then(Type::array_len).unwrap_or(0))
            }
            _ => Err(kind_mismatch("Len", &self.ty)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len().is_ok_and(|n| n == 0)
    }

    pub fn cap(&self) -> Result<usize, ReflectError> {
        match &self.repr {
            Repr::Array(elems) => Ok(elems.len()),
            Repr::Slice(s) => Ok(s.as_ref().map_or(0, |s| s.cap)),
            Repr::Chan(c) => Ok(c.as_ref().map_or(0, |c| c.cap)),
            Repr::Pointer(_) if self.ty.elem().is_some_and(|e| e.kind() == Kind::Array) => {
                Ok(self.ty.elem().and_then(Type::array_len).unwrap_or(0))
            }
            _ => Err(kind_mismatch("Cap", &self.ty)),
        }
    }

    // =========================================================================
    // Access
    // =========================================================================

    fn component(&self, index: usize) -> Result<Val, ReflectError> {
        match &self.repr {
            Repr::Array(elems) | Repr::Struct(elems) => elems
                .get(index)
                .cloned()
                .ok_or(out_of_range(index as i64, elems.len())),
            _ => Err(kind_mismatch("Field", &self.ty)),
        }
    }

    fn set_component(&mut self, index: usize, value: Val) -> Result<(), ReflectError> {
        match &mut self.repr {
            Repr::Array(elems) | Repr::Struct(elems) => {
                let len = elems.len();
                let slot = elems
                    .get_mut(index)
                    .ok_or(out_of_range(index as i64, len))?;
                *slot = value;
                Ok(())
            }
            _ => Err(kind_mismatch("SetField", &self.ty)),
        }
    }

    /// Component `index` of an array or struct, addressable if `self` is.
    fn sub_value(&self, index: usize) -> Result<Val, ReflectError> {
        let mut value = self.component(index)?;
        value.place = self.place.clone().map(|base| Place::Component {
            base: Arc::new(base),
            index,
        });
        Ok(value)
    }

    /// The value a pointer points to; the result is addressable.
    pub fn deref(&self) -> Result<Val, ReflectError> {
        match &self.repr {
            Repr::Pointer(Some(place)) => {
                let mut value = place.load()?;
                if let Some(elem) = self.ty.elem() {
                    value.ty = elem.clone();
                }
                value.place = Some(place.clone());
                Ok(value)
            }
            Repr::Pointer(None) => Err(ReflectError::NilDereference),
            _ => Err(kind_mismatch("Elem", &self.ty)),
        }
    }

    /// Struct field `index`.
    pub fn field(&self, index: usize) -> Result<Val, ReflectError> {
        if self.kind() != Kind::Struct {
            return Err(kind_mismatch("Field", &self.ty));
        }
        self.sub_value(index)
    }

    /// Bounds-checked `x[index]` for arrays, slices, strings and pointers to arrays.
    pub fn index(&self, index: i64) -> Result<Val, ReflectError> {
        match &self.repr {
            Repr::Array(elems) => {
                let i = to_index(index, elems.len())?;
                self.sub_value(i)
            }
            Repr::Slice(slice) => {
                let Some(slice) = slice else {
                    return Err(out_of_range(index, 0));
                };
                let i = to_index(index, slice.len)?;
                let at = slice.offset + i;
                let mut value = slice
                    .store
                    .read()
                    .get(at)
                    .cloned()
                    .ok_or(out_of_range(index, slice.len))?;
                value.place = Some(Place::Elem {
                    store: Arc::clone(&slice.store),
                    index: at,
                });
                Ok(value)
            }
            Repr::String(s) => {
                let i = to_index(index, s.len())?;
                let byte = s.as_bytes().get(i).copied().unwrap_or(0);
                Val::make_uint(&Type::uint8(), u64::from(byte))
            }
            Repr::Pointer(_) if self.ty.elem().is_some_and(|e| e.kind() == Kind::Array) => {
                self.deref()?.index(index)
            }
            _ => Err(kind_mismatch("Index", &self.ty)),
        }
    }

    /// Map lookup; `None` when the key is absent or the map is nil.
    pub fn map_index(&self, key: &Val) -> Result<Option<Val>, ReflectError> {
        let Repr::Map(map) = &self.repr else {
            return Err(kind_mismatch("MapIndex", &self.ty));
        };
        let Some(map) = map else {
            return Ok(None);
        };
        for (k, v) in map.read().iter() {
            if k.equal(key)? {
                return Ok(Some(v.clone()));
            }
        }
        Ok(None)
    }

    /// Insert or overwrite an entry.
    pub fn map_insert(&self, key: Val, value: Val) -> Result<(), ReflectError> {
        let Repr::Map(map) = &self.repr else {
            return Err(kind_mismatch("SetMapIndex", &self.ty));
        };
        let Some(map) = map else {
            return Err(ReflectError::NilMapWrite);
        };
        let mut entries = map.write();
        for (k, v) in entries.iter_mut() {
            if k.equal(&key)? {
                *v = value.without_place();
                return Ok(());
            }
        }
        entries.push((key.without_place(), value.without_place()));
        Ok(())
    }

    /// Remove an entry; deleting from a nil map or a missing key is a no-op.
    pub fn map_delete(&self, key: &Val) -> Result<(), ReflectError> {
        let Repr::Map(map) = &self.repr else {
            return Err(kind_mismatch("MapDelete", &self.ty));
        };
        if let Some(map) = map {
            let mut entries = map.write();
            let mut found = None;
            for (i, (k, _)) in entries.iter().enumerate() {
                if k.equal(key)? {
                    found = Some(i);
                    break;
                }
            }
            if let Some(i) = found {
                entries.remove(i);
            }
        }
        Ok(())
    }

    /// Entries in insertion order.
    pub fn map_entries(&self) -> Vec<(Val, Val)> {
        match &self.repr {
            Repr::Map(Some(map)) => map.read().clone(),
            _ => Vec::new(),
        }
    }

    /// Elements of an array or slice (or bytes of a string) as values.
    pub fn elements(&self) -> Result<Vec<Val>, ReflectError> {
        match &self.repr {
            Repr::Array(elems) => Ok(elems.clone()),
            Repr::Slice(None) => Ok(Vec::new()),
            Repr::Slice(Some(s)) => Ok(s
                .store
                .read()
                .iter()
                .skip(s.offset)
                .take(s.len)
                .cloned()
                .collect()),
            Repr::String(s) => s
                .bytes()
                .map(|b| Val::make_uint(&Type::uint8(), u64::from(b)))
                .collect(),
            _ => Err(kind_mismatch("Elements", &self.ty)),
        }
    }

    // =========================================================================
    // Slicing
    // =========================================================================

    /// `x[low:high]` with omitted bounds defaulting to `0` and `len(x)`.
    pub fn slice2(&self, low: Option<i64>, high: Option<i64>) -> Result<Val, ReflectError> {
        match &self.repr {
            Repr::String(s) => {
                let (l, h) = check_bounds2(low, high, s.len(), s.len())?;
                let sub = s
                    .get(l..h)
                    .ok_or(ReflectError::StringBoundary { low: l, high: h })?;
                Val::make_string(&self.ty, sub)
            }
            Repr::Slice(slice) => {
                let (len, cap) = slice.as_ref().map_or((0, 0), |s| (s.len, s.cap));
                let (l, h) = check_bounds2(low, high, len, cap)?;
                Ok(self.reslice(l, h, cap))
            }
            Repr::Array(elems) => {
                if !self.can_addr() {
                    return Err(ReflectError::UnaddressableArray);
                }
                let len = elems.len();
                let (l, h) = check_bounds2(low, high, len, len)?;
                self.array_slice(l, h, len)
            }
            Repr::Pointer(_) if self.ty.elem().is_some_and(|e| e.kind() == Kind::Array) => {
                self.deref()?.slice2(low, high)
            }
            _ => Err(kind_mismatch("Slice", &self.ty)),
        }
    }

    /// `x[low:high:max]`; strings cannot be 3-index sliced.
    pub fn slice3(&self, low: Option<i64>, high: i64, max: i64) -> Result<Val, ReflectError> {
        match &self.repr {
            Repr::Slice(slice) => {
                let cap = slice.as_ref().map_or(0, |s| s.cap);
                let (l, h, m) = check_bounds3(low, high, max, cap)?;
                Ok(self.reslice(l, h, m))
            }
            Repr::Array(elems) => {
                if !self.can_addr() {
                    return Err(ReflectError::UnaddressableArray);
                }
                let (l, h, m) = check_bounds3(low, high, max, elems.len())?;
                self.array_slice(l, h, m)
            }
            Repr::Pointer(_) if self.ty.elem().is_some_and(|e| e.kind() == Kind::Array) => {
                self.deref()?.slice3(low, high, max)
            }
            _ => Err(kind_mismatch("Slice3", &self.ty)),
        }
    }

    /// New view `[l:h]` with capacity ending at `max` (all relative to `self`).
    fn reslice(&self, l: usize, h: usize, max: usize) -> Val {
        let repr = match &self.repr {
            Repr::Slice(Some(s)) => Repr::Slice(Some(SliceRef {
                store: Arc::clone(&s.store),
                offset: s.offset + l,
                len: h - l,
                cap: max - l,
            })),
            _ => Repr::Slice(None),
        };
        Val::new(&self.ty, repr)
    }

    /// Slice of an addressable array. The result copies the elements in
    /// `[l:max]`; writes through it do not reach the array.
    fn array_slice(&self, l: usize, h: usize, max: usize) -> Result<Val, ReflectError> {
        let Some(elem) = self.ty.elem() else {
            return Err(kind_mismatch("Slice", &self.ty));
        };
        let Repr::Array(elems) = &self.repr else {
            return Err(kind_mismatch("Slice", &self.ty));
        };
        let store: Vec<Val> = elems.get(l..max).map(<[Val]>::to_vec).unwrap_or_default();
        Ok(Val::new(
            &Type::slice_of(elem),
            Repr::Slice(Some(SliceRef {
                store: Arc::new(RwLock::new(store)),
                offset: 0,
                len: h - l,
                cap: max - l,
            })),
        ))
    }

    /// `append(s, items...)`; items must already have the element type.
    pub fn append(&self, items: &[Val]) -> Result<Val, ReflectError> {
        let Repr::Slice(slice) = &self.repr else {
            return Err(kind_mismatch("Append", &self.ty));
        };
        let Some(elem) = self.ty.elem() else {
            return Err(kind_mismatch("Append", &self.ty));
        };
        if items.is_empty() {
            return Ok(self.clone().without_place());
        }
        let (len, cap) = slice.as_ref().map_or((0, 0), |s| (s.len, s.cap));
        let new_len = len + items.len();

        if let Some(s) = slice.as_ref().filter(|_| new_len <= cap) {
            let mut data = s.store.write();
            for (i, item) in items.iter().enumerate() {
                if let Some(slot) = data.get_mut(s.offset + len + i) {
                    *slot = item.clone().without_place();
                }
            }
            return Ok(Val::new(
                &self.ty,
                Repr::Slice(Some(SliceRef {
                    store: Arc::clone(&s.store),
                    offset: s.offset,
                    len: new_len,
                    cap,
                })),
            ));
        }

        let new_cap = new_len.max(cap * 2);
        let mut data = self.elements()?;
        data.extend(items.iter().cloned().map(Val::without_place));
        data.resize_with(new_cap, || Val::zero(elem));
        Ok(Val::new(
            &self.ty,
            Repr::Slice(Some(SliceRef {
                store: Arc::new(RwLock::new(data)),
                offset: 0,
                len: new_len,
                cap: new_cap,
            })),
        ))
    }

    /// `copy(dst, src)`; returns the number of elements copied.
    pub fn copy_from(&self, src: &Val) -> Result<usize, ReflectError> {
        let Repr::Slice(dst) = &self.repr else {
            return Err(kind_mismatch("Copy", &self.ty));
        };
        let items = src.elements()?;
        let Some(dst) = dst else {
            return Ok(0);
        };
        let n = dst.len.min(items.len());
        let mut data = dst.store.write();
        for (i, item) in items.into_iter().take(n).enumerate() {
            if let Some(slot) = data.get_mut(dst.offset + i) {
                *slot = item.without_place();
            }
        }
        Ok(n)
    }

    // =========================================================================
    // Methods and calls
    // =========================================================================

    /// Method `name` bound to this value as receiver.
    pub fn method_by_name(&self, name: &str) -> Option<Val> {
        let method = self.ty.method_by_name(name)?;
        let via_pointer = self.kind() == Kind::Pointer && !self.ty.is_named();
        let needs_deref = via_pointer && !method.pointer_receiver;
        let receiver = self.clone().without_place();
        let func = method.func.clone();
        let bound = NativeFunc::new(move |args| {
            let recv = if needs_deref {
                receiver.deref().map_err(|e| e.to_string())?.without_place()
            } else {
                receiver.clone()
            };
            let mut full = Vec::with_capacity(args.len() + 1);
            full.push(recv);
            full.extend_from_slice(args);
            func.call(&full)
        });
        Some(Val::new(&method.ty, Repr::Func(Some(bound))))
    }

    /// Method expression `T.name`: a function taking the receiver first.
    pub fn method_expression(ty: &Type, name: &str) -> Option<Val> {
        let method = ty.method_by_name(name)?;
        let mut params = Vec::with_capacity(method.ty.params().len() + 1);
        params.push(ty.clone());
        params.extend_from_slice(method.ty.params());
        let sig = Type::func_of(params, method.ty.results().to_vec(), method.ty.is_variadic()).ok()?;
        let needs_deref = ty.kind() == Kind::Pointer && !ty.is_named() && !method.pointer_receiver;
        let func = method.func.clone();
        let expr = NativeFunc::new(move |args| {
            if !needs_deref {
                return func.call(args);
            }
            let mut args = args.to_vec();
            if let Some(recv) = args.first_mut() {
                *recv = recv.deref().map_err(|e| e.to_string())?.without_place();
            }
            func.call(&args)
        });
        Some(Val::new(&sig, Repr::Func(Some(expr))))
    }

    /// Invoke a function value. Arguments must already match the parameter
    /// types, with variadic arguments packed into the final slice.
    pub fn call(&self, args: &[Val]) -> Result<Vec<Val>, ReflectError> {
        let Repr::Func(func) = &self.repr else {
            return Err(kind_mismatch("Call", &self.ty));
        };
        let func = func.as_ref().ok_or(ReflectError::NilFunc)?;
        let want = self.ty.params().len();
        if args.len() != want {
            return Err(ReflectError::ArgCount {
                want,
                got: args.len(),
            });
        }
        let results = func.call(args).map_err(ReflectError::CallFailed)?;
        let want = self.ty.results().len();
        if results.len() != want {
            return Err(ReflectError::ResultCount {
                want,
                got: results.len(),
            });
        }
        Ok(results)
    }

    // =========================================================================
    // Assignment, conversion, equality
    // =========================================================================

    /// This value as stored in a variable of type `to`. Concrete values
    /// assigned to an interface are boxed as its dynamic value.
    pub fn assign_to(&self, to: &Type) -> Result<Val, ReflectError> {
        if !self.ty.assignable_to(to) {
            return Err(ReflectError::NotAssignable {
                from: self.ty.to_string(),
                to: to.to_string(),
            });
        }
        Ok(self.retype_for(to))
    }

    fn retype_for(&self, to: &Type) -> Val {
        if to.kind() == Kind::Interface && self.kind() != Kind::Interface {
            let boxed = Box::new(self.clone().without_place());
            return Val::new(to, Repr::Interface(Some(boxed)));
        }
        self.retype(to)
    }

    /// Explicit conversion `to(x)`.
    pub fn convert(&self, to: &Type) -> Result<Val, ReflectError> {
        let not_convertible = || ReflectError::NotConvertible {
            from: self.ty.to_string(),
            to: to.to_string(),
        };
        if !self.ty.convertible_to(to) {
            return Err(not_convertible());
        }
        let (from_kind, to_kind) = (self.kind(), to.kind());

        if to_kind == Kind::Interface {
            return Ok(self.retype_for(to));
        }
        if to_kind.is_integer() || to_kind.is_float() {
            return match self.repr {
                Repr::Int(i) if to_kind.is_float() => Val::make_float(to, i as f64),
                Repr::Int(i) => Val::make_int(to, i),
                Repr::Uint(u) if to_kind.is_float() => Val::make_float(to, u as f64),
                Repr::Uint(u) => Val::make_uint(to, u),
                Repr::Float(f) if to_kind.is_float() => Val::make_float(to, f),
                Repr::Float(f) if to_kind.is_signed() => Val::make_int(to, f.trunc() as i64),
                Repr::Float(f) => Val::make_uint(to, f.trunc() as u64),
                _ => Err(not_convertible()),
            };
        }
        if to_kind.is_complex() {
            let (re, im) = self.as_complex().ok_or_else(not_convertible)?;
            return Val::make_complex(to, re, im);
        }
        if to_kind == Kind::String {
            let s = match &self.repr {
                Repr::String(s) => s.to_string(),
                Repr::Int(i) => rune_to_string(*i),
                Repr::Uint(u) => rune_to_string(i64::try_from(*u).unwrap_or(-1)),
                Repr::Slice(_) if from_kind == Kind::Slice => self.bytes_or_runes_to_string()?,
                _ => return Err(not_convertible()),
            };
            return Val::make_string(to, &s);
        }
        if from_kind == Kind::String && to.is_bytes_or_runes() {
            let s = self.as_str().unwrap_or_default();
            let Some(elem) = to.elem() else {
                return Err(not_convertible());
            };
            let elems = if elem.kind() == Kind::Uint8 {
                s.bytes()
                    .map(|b| Val::make_uint(elem, u64::from(b)))
                    .collect::<Result<Vec<_>, _>>()?
            } else {
                s.chars()
                    .map(|c| Val::make_int(elem, i64::from(u32::from(c))))
                    .collect::<Result<Vec<_>, _>>()?
            };
            return Val::slice_from(to, elems);
        }
        Ok(self.retype(to))
    }

    fn bytes_or_runes_to_string(&self) -> Result<String, ReflectError> {
        let elems = self.elements()?;
        let is_bytes = self.ty.elem().is_some_and(|e| e.kind() == Kind::Uint8);
        if is_bytes {
            let bytes: Vec<u8> = elems
                .iter()
                .filter_map(Val::as_uint)
                .map(|b| b as u8)
                .collect();
            return Ok(String::from_utf8_lossy(&bytes).into_owned());
        }
        Ok(elems
            .iter()
            .filter_map(Val::as_int)
            .map(|r| {
                u32::try_from(r)
                    .ok()
                    .and_then(char::from_u32)
                    .unwrap_or(char::REPLACEMENT_CHARACTER)
            })
            .collect())
    }

    /// `==` on two values of identical type. Slices, maps and functions
    /// are only comparable when one side is nil.
    pub fn equal(&self, other: &Val) -> Result<bool, ReflectError> {
        match (&self.repr, &other.repr) {
            (Repr::Bool(a), Repr::Bool(b)) => Ok(a == b),
            (Repr::Int(a), Repr::Int(b)) => Ok(a == b),
            (Repr::Uint(a), Repr::Uint(b)) => Ok(a == b),
            #[allow(clippy::float_cmp)]
            (Repr::Float(a), Repr::Float(b)) => Ok(a == b),
            #[allow(clippy::float_cmp)]
            (Repr::Complex(ar, ai), Repr::Complex(br, bi)) => Ok(ar == br && ai == bi),
            (Repr::String(a), Repr::String(b)) => Ok(a == b),
            (Repr::Pointer(a), Repr::Pointer(b)) => Ok(match (a, b) {
                (None, None) => true,
                (Some(a), Some(b)) => a.same(b),
                _ => false,
            }),
            (Repr::Chan(a), Repr::Chan(b)) => Ok(match (a, b) {
                (None, None) => true,
                (Some(a), Some(b)) => Arc::ptr_eq(&a.buffer, &b.buffer),
                _ => false,
            }),
            (Repr::Interface(a), Repr::Interface(b)) => match (a, b) {
                (None, None) => Ok(true),
                (Some(a), Some(b)) => {
                    if a.ty != b.ty {
                        return Ok(false);
                    }
                    if !a.ty.comparable() {
                        return Err(ReflectError::Uncomparable(a.ty.to_string()));
                    }
                    a.equal(b)
                }
                _ => Ok(false),
            },
            (Repr::Array(a), Repr::Array(b)) | (Repr::Struct(a), Repr::Struct(b)) => {
                if a.len() != b.len() {
                    return Ok(false);
                }
                for (x, y) in a.iter().zip(b) {
                    if !x.equal(y)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            (Repr::Slice(_) | Repr::Map(_) | Repr::Func(_), _)
            | (_, Repr::Slice(_) | Repr::Map(_) | Repr::Func(_)) => {
                if self.is_nil() || other.is_nil() {
                    Ok(self.is_nil() && other.is_nil())
                } else {
                    Err(ReflectError::Uncomparable(self.ty.to_string()))
                }
            }
            _ => Ok(false),
        }
    }
}

fn rune_to_string(code: i64) -> String {
    u32::try_from(code)
        .ok()
        .and_then(char::from_u32)
        .unwrap_or(char::REPLACEMENT_CHARACTER)
        .to_string()
}

fn slice_bounds_error(bounds: String, cap: usize) -> ReflectError {
    ReflectError::SliceBounds { bounds, cap }
}

/// Validate `0 <= low <= high <= cap`, defaulting `low` to 0 and `high` to `len`.
fn check_bounds2(
    low: Option<i64>,
    high: Option<i64>,
    len: usize,
    cap: usize,
) -> Result<(usize, usize), ReflectError> {
    let l = low.unwrap_or(0);
    let h = high.unwrap_or(len as i64);
    let err = || slice_bounds_error(format!("{l}:{h}"), cap);
    let lu = usize::try_from(l).map_err(|_| err())?;
    let hu = usize::try_from(h).map_err(|_| err())?;
    if lu > hu || hu > cap {
        return Err(err());
    }
    Ok((lu, hu))
}

/// Validate `0 <= low <= high <= max <= cap`, defaulting `low` to 0.
fn check_bounds3(
    low: Option<i64>,
    high: i64,
    max: i64,
    cap: usize,
) -> Result<(usize, usize, usize), ReflectError> {
    let l = low.unwrap_or(0);
    let err = || slice_bounds_error(format!("{l}:{high}:{max}"), cap);
    let lu = usize::try_from(l).map_err(|_| err())?;
    let hu = usize::try_from(high).map_err(|_| err())?;
    let mu = usize::try_from(max).map_err(|_| err())?;
    if lu > hu || hu > mu || mu > cap {
        return Err(err());
    }
    Ok((lu, hu, mu))
}

fn write_float(f: &mut fmt::Formatter<'_>, v: f64) -> fmt::Result {
    if v.is_nan() {
        f.write_str("NaN")
    } else if v.is_infinite() {
        f.write_str(if v > 0.0 { "+Inf" } else { "-Inf" })
    } else {
        write!(f, "{v}")
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Val]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Val {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            Repr::Bool(b) => write!(f, "{b}"),
            Repr::Int(i) => write!(f, "{i}"),
            Repr::Uint(u) => write!(f, "{u}"),
            Repr::Float(v) => write_float(f, *v),
            Repr::Complex(re, im) => {
                f.write_str("(")?;
                write_float(f, *re)?;
                if *im >= 0.0 || im.is_nan() {
                    f.write_str("+")?;
                }
                write_float(f, *im)?;
                f.write_str("i)")
            }
            Repr::String(s) => f.write_str(s),
            Repr::Array(elems) => {
                f.write_str("[")?;
                write_list(f, elems)?;
                f.write_str("]")
            }
            Repr::Struct(fields) => {
                f.write_str("{")?;
                write_list(f, fields)?;
                f.write_str("}")
            }
            Repr::Slice(_) => {
                f.write_str("[")?;
                write_list(f, &self.elements().unwrap_or_default())?;
                f.write_str("]")
            }
            Repr::Map(_) => {
                f.write_str("map[")?;
                for (i, (k, v)) in self.map_entries().iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{k}:{v}")?;
                }
                f.write_str("]")
            }
            Repr::Pointer(Some(_)) => match self.deref() {
                Ok(target) => write!(f, "&{target}"),
                Err(_) => f.write_str("<invalid>"),
            },
            Repr::Chan(Some(_)) => write!(f, "({})", self.ty),
            Repr::Func(Some(_)) => write!(f, "({})", self.ty),
            Repr::Interface(Some(v)) => write!(f, "{v}"),
            Repr::Pointer(None) | Repr::Chan(None) | Repr::Func(None) | Repr::Interface(None) => {
                f.write_str("<nil>")
            }
        }
    }
}

impl fmt::Debug for Val {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({self})", self.ty)
    }
}

/// Same type and `==`; uncomparable values are never equal.
impl PartialEq for Val {
    fn eq(&self, other: &Self) -> bool {
        self.ty == other.ty && self.equal(other).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests;
