//! Wire values and the per-type conversion rules.
//!
//! A [`WireValue`] is the only shape a value may take while crossing the
//! boundary: at most one machine word of payload, a cheap string token, or
//! an opaque handle. The [`ToWire`]/[`FromWire`] traits define the two
//! conversion directions per native type. Round-tripping preserves value
//! equality for primitives, identity for policy-admitted raw pointers, and
//! token identity for arena-backed objects.

use std::sync::Arc;

use crate::arena::{InstanceArena, ObjectToken};
use crate::error::WireError;
use crate::host_value::HostValue;

/// A value in boundary representation.
///
/// Integer widths all travel as `Int` (u64 bit-reinterpreted, the
/// registered width/signedness tells the host how to decode). Floats travel
/// as `Float`. `Null` is the defined "no value" sentinel used by container
/// lookups and optional returns.
#[derive(Clone)]
pub enum WireValue {
    /// No value; the return shape of void callables.
    Void,
    /// The defined "no value" sentinel.
    Null,
    /// Boolean slot; host-side decoding uses the registered sentinels.
    Bool(bool),
    /// All integer widths. u64 is bit-reinterpreted.
    Int(i64),
    /// All float widths, widened to f64.
    Float(f64),
    /// String token; ownership stays with the holder.
    Str(Arc<str>),
    /// Opaque reference-counted host value.
    Handle(HostValue),
    /// Arena-backed class or aggregate instance.
    Object(ObjectToken),
    /// Policy-admitted raw pointer, identity preserved.
    Ptr(usize),
}

impl WireValue {
    /// Human-readable name of the carried representation, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            WireValue::Void => "void",
            WireValue::Null => "null",
            WireValue::Bool(_) => "bool",
            WireValue::Int(_) => "int",
            WireValue::Float(_) => "float",
            WireValue::Str(_) => "string",
            WireValue::Handle(_) => "handle",
            WireValue::Object(_) => "object",
            WireValue::Ptr(_) => "pointer",
        }
    }

    /// Whether this is the void shape.
    pub fn is_void(&self) -> bool {
        matches!(self, WireValue::Void)
    }

    /// Whether this is the "no value" sentinel.
    pub fn is_null(&self) -> bool {
        matches!(self, WireValue::Null)
    }
}

impl std::fmt::Debug for WireValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WireValue::Void => write!(f, "Void"),
            WireValue::Null => write!(f, "Null"),
            WireValue::Bool(v) => write!(f, "Bool({v})"),
            WireValue::Int(v) => write!(f, "Int({v})"),
            WireValue::Float(v) => write!(f, "Float({v})"),
            WireValue::Str(s) => write!(f, "Str({s:?})"),
            WireValue::Handle(h) => write!(f, "Handle(refs={})", h.ref_count()),
            WireValue::Object(t) => write!(f, "{t:?}"),
            WireValue::Ptr(p) => write!(f, "Ptr({p:#x})"),
        }
    }
}

/// Convert a native value into its wire representation.
///
/// Object-backed types allocate into the arena, which is why the conversion
/// takes it mutably; primitives ignore it.
pub trait ToWire {
    fn to_wire(self, arena: &mut InstanceArena) -> Result<WireValue, WireError>;
}

/// Recover a native value from its wire representation.
pub trait FromWire: Sized {
    fn from_wire(value: &WireValue, arena: &InstanceArena) -> Result<Self, WireError>;
}

fn mismatch(expected: &'static str, actual: &WireValue) -> WireError {
    WireError::TypeMismatch {
        expected,
        actual: actual.kind_name(),
    }
}

// ============================================================================
// void
// ============================================================================

impl ToWire for () {
    fn to_wire(self, _arena: &mut InstanceArena) -> Result<WireValue, WireError> {
        Ok(WireValue::Void)
    }
}

impl FromWire for () {
    fn from_wire(value: &WireValue, _arena: &InstanceArena) -> Result<Self, WireError> {
        match value {
            WireValue::Void => Ok(()),
            other => Err(mismatch("void", other)),
        }
    }
}

// ============================================================================
// bool
// ============================================================================

impl ToWire for bool {
    fn to_wire(self, _arena: &mut InstanceArena) -> Result<WireValue, WireError> {
        Ok(WireValue::Bool(self))
    }
}

impl FromWire for bool {
    fn from_wire(value: &WireValue, _arena: &InstanceArena) -> Result<Self, WireError> {
        match value {
            WireValue::Bool(v) => Ok(*v),
            other => Err(mismatch("bool", other)),
        }
    }
}

// ============================================================================
// integers
// ============================================================================

macro_rules! impl_wire_int {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl ToWire for $ty {
                fn to_wire(self, _arena: &mut InstanceArena) -> Result<WireValue, WireError> {
                    Ok(WireValue::Int(self as i64))
                }
            }

            impl FromWire for $ty {
                fn from_wire(value: &WireValue, _arena: &InstanceArena) -> Result<Self, WireError> {
                    match value {
                        WireValue::Int(v) => <$ty>::try_from(*v).map_err(|_| {
                            WireError::IntegerOverflow {
                                value: *v,
                                target: $name,
                            }
                        }),
                        other => Err(mismatch($name, other)),
                    }
                }
            }
        )*
    };
}

impl_wire_int! {
    i8 => "int8",
    i16 => "int16",
    i32 => "int32",
    u8 => "uint8",
    u16 => "uint16",
    u32 => "uint32",
}

impl ToWire for i64 {
    fn to_wire(self, _arena: &mut InstanceArena) -> Result<WireValue, WireError> {
        Ok(WireValue::Int(self))
    }
}

impl FromWire for i64 {
    fn from_wire(value: &WireValue, _arena: &InstanceArena) -> Result<Self, WireError> {
        match value {
            WireValue::Int(v) => Ok(*v),
            other => Err(mismatch("int64", other)),
        }
    }
}

// u64 travels bit-reinterpreted so the full range survives the i64 slot.
impl ToWire for u64 {
    fn to_wire(self, _arena: &mut InstanceArena) -> Result<WireValue, WireError> {
        Ok(WireValue::Int(self as i64))
    }
}

impl FromWire for u64 {
    fn from_wire(value: &WireValue, _arena: &InstanceArena) -> Result<Self, WireError> {
        match value {
            WireValue::Int(v) => Ok(*v as u64),
            other => Err(mismatch("uint64", other)),
        }
    }
}

// ============================================================================
// floats
// ============================================================================

impl ToWire for f32 {
    fn to_wire(self, _arena: &mut InstanceArena) -> Result<WireValue, WireError> {
        Ok(WireValue::Float(self as f64))
    }
}

impl FromWire for f32 {
    fn from_wire(value: &WireValue, _arena: &InstanceArena) -> Result<Self, WireError> {
        match value {
            WireValue::Float(v) => Ok(*v as f32),
            other => Err(mismatch("float32", other)),
        }
    }
}

impl ToWire for f64 {
    fn to_wire(self, _arena: &mut InstanceArena) -> Result<WireValue, WireError> {
        Ok(WireValue::Float(self))
    }
}

impl FromWire for f64 {
    fn from_wire(value: &WireValue, _arena: &InstanceArena) -> Result<Self, WireError> {
        match value {
            WireValue::Float(v) => Ok(*v),
            other => Err(mismatch("float64", other)),
        }
    }
}

// ============================================================================
// strings
// ============================================================================

impl ToWire for String {
    fn to_wire(self, _arena: &mut InstanceArena) -> Result<WireValue, WireError> {
        Ok(WireValue::Str(Arc::from(self)))
    }
}

impl ToWire for &str {
    fn to_wire(self, _arena: &mut InstanceArena) -> Result<WireValue, WireError> {
        Ok(WireValue::Str(Arc::from(self)))
    }
}

impl FromWire for String {
    fn from_wire(value: &WireValue, _arena: &InstanceArena) -> Result<Self, WireError> {
        match value {
            WireValue::Str(s) => Ok(s.as_ref().to_owned()),
            other => Err(mismatch("string", other)),
        }
    }
}

// ============================================================================
// opaque host values
// ============================================================================

impl ToWire for HostValue {
    fn to_wire(self, _arena: &mut InstanceArena) -> Result<WireValue, WireError> {
        // the wire value takes over this handle's reference
        Ok(WireValue::Handle(self))
    }
}

impl FromWire for HostValue {
    fn from_wire(value: &WireValue, _arena: &InstanceArena) -> Result<Self, WireError> {
        match value {
            // retaining the handle acquires one more reference
            WireValue::Handle(h) => Ok(h.clone()),
            other => Err(mismatch("handle", other)),
        }
    }
}

// ============================================================================
// object tokens and optionals
// ============================================================================

impl ToWire for ObjectToken {
    fn to_wire(self, _arena: &mut InstanceArena) -> Result<WireValue, WireError> {
        Ok(WireValue::Object(self))
    }
}

impl FromWire for ObjectToken {
    fn from_wire(value: &WireValue, _arena: &InstanceArena) -> Result<Self, WireError> {
        match value {
            WireValue::Object(t) => Ok(*t),
            other => Err(mismatch("object", other)),
        }
    }
}

// Shared pointers: the wire form is a token to an arena slot holding the
// Arc, so the host-tracked slot reference count layers over the native
// shared count. Recovering the value clones the Arc (one more native
// share), never the pointee.
impl<T: crate::type_key::Bindable + Send + Sync> ToWire for Arc<T> {
    fn to_wire(self, arena: &mut InstanceArena) -> Result<WireValue, WireError> {
        Ok(WireValue::Object(arena.alloc(self)))
    }
}

impl<T: crate::type_key::Bindable + Send + Sync> FromWire for Arc<T> {
    fn from_wire(value: &WireValue, arena: &InstanceArena) -> Result<Self, WireError> {
        match value {
            WireValue::Object(token) => arena.get::<Arc<T>>(*token).cloned(),
            other => Err(mismatch("object", other)),
        }
    }
}

impl<T: ToWire> ToWire for Option<T> {
    fn to_wire(self, arena: &mut InstanceArena) -> Result<WireValue, WireError> {
        match self {
            Some(value) => value.to_wire(arena),
            None => Ok(WireValue::Null),
        }
    }
}

impl<T: FromWire> FromWire for Option<T> {
    fn from_wire(value: &WireValue, arena: &InstanceArena) -> Result<Self, WireError> {
        match value {
            WireValue::Null => Ok(None),
            other => T::from_wire(other, arena).map(Some),
        }
    }
}

/// Implement object-backed wire conversions for a class type.
///
/// `to_wire` allocates the value into the arena and hands out the token;
/// `from_wire` clones the instance back out, so the type must be `Clone`.
/// Types registered through the class or aggregate builders only need this
/// when they also appear by value in another bound signature.
#[macro_export]
macro_rules! impl_wire_object {
    ($ty:ty) => {
        impl $crate::ToWire for $ty {
            fn to_wire(
                self,
                arena: &mut $crate::InstanceArena,
            ) -> Result<$crate::WireValue, $crate::WireError> {
                Ok($crate::WireValue::Object(arena.alloc(self)))
            }
        }

        impl $crate::FromWire for $ty {
            fn from_wire(
                value: &$crate::WireValue,
                arena: &$crate::InstanceArena,
            ) -> Result<Self, $crate::WireError> {
                match value {
                    $crate::WireValue::Object(token) => arena.get::<$ty>(*token).cloned(),
                    other => Err($crate::WireError::TypeMismatch {
                        expected: "object",
                        actual: other.kind_name(),
                    }),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_key::Bindable;

    fn roundtrip<T>(value: T) -> T
    where
        T: ToWire + FromWire + Clone,
    {
        let mut arena = InstanceArena::new();
        let wire = value.to_wire(&mut arena).unwrap();
        T::from_wire(&wire, &arena).unwrap()
    }

    #[test]
    fn primitive_roundtrips() {
        assert_eq!(roundtrip(true), true);
        assert_eq!(roundtrip(false), false);
        assert_eq!(roundtrip(-5i8), -5);
        assert_eq!(roundtrip(-300i16), -300);
        assert_eq!(roundtrip(70_000i32), 70_000);
        assert_eq!(roundtrip(i64::MIN), i64::MIN);
        assert_eq!(roundtrip(200u8), 200);
        assert_eq!(roundtrip(60_000u16), 60_000);
        assert_eq!(roundtrip(u32::MAX), u32::MAX);
        assert_eq!(roundtrip(3.5f32), 3.5);
        assert_eq!(roundtrip(std::f64::consts::PI), std::f64::consts::PI);
        assert_eq!(roundtrip("hello".to_string()), "hello");
    }

    #[test]
    fn u64_full_range_survives_reinterpretation() {
        assert_eq!(roundtrip(u64::MAX), u64::MAX);
        assert_eq!(roundtrip(0u64), 0);
    }

    #[test]
    fn void_roundtrip() {
        let mut arena = InstanceArena::new();
        let wire = ().to_wire(&mut arena).unwrap();
        assert!(wire.is_void());
        <()>::from_wire(&wire, &arena).unwrap();
    }

    #[test]
    fn narrowing_is_checked() {
        let arena = InstanceArena::new();
        assert!(matches!(
            i8::from_wire(&WireValue::Int(300), &arena),
            Err(WireError::IntegerOverflow { .. })
        ));
        assert!(matches!(
            u32::from_wire(&WireValue::Int(-1), &arena),
            Err(WireError::IntegerOverflow { .. })
        ));
    }

    #[test]
    fn representation_mismatch_is_reported() {
        let arena = InstanceArena::new();
        let err = i32::from_wire(&WireValue::Bool(true), &arena).unwrap_err();
        assert!(matches!(
            err,
            WireError::TypeMismatch {
                expected: "int32",
                actual: "bool"
            }
        ));
    }

    #[test]
    fn option_maps_to_null() {
        let mut arena = InstanceArena::new();
        let wire = Option::<i32>::None.to_wire(&mut arena).unwrap();
        assert!(wire.is_null());
        assert_eq!(Option::<i32>::from_wire(&wire, &arena).unwrap(), None);

        let wire = Some(9i32).to_wire(&mut arena).unwrap();
        assert_eq!(Option::<i32>::from_wire(&wire, &arena).unwrap(), Some(9));
    }

    #[test]
    fn handle_conversion_balances_references() {
        let mut arena = InstanceArena::new();
        let value = HostValue::new(1i32);
        assert_eq!(value.ref_count(), 1);

        let wire = value.clone().to_wire(&mut arena).unwrap();
        assert_eq!(value.ref_count(), 2);

        let recovered = HostValue::from_wire(&wire, &arena).unwrap();
        assert_eq!(value.ref_count(), 3);

        drop(recovered);
        drop(wire);
        assert_eq!(value.ref_count(), 1);
    }

    #[test]
    fn object_token_passes_through() {
        #[derive(Clone, PartialEq, Debug)]
        struct Blob(u8);
        impl Bindable for Blob {}

        let mut arena = InstanceArena::new();
        let token = arena.alloc(Blob(9));
        let wire = token.to_wire(&mut arena).unwrap();
        assert_eq!(ObjectToken::from_wire(&wire, &arena).unwrap(), token);
    }

    #[test]
    fn wire_object_macro_clones_out() {
        #[derive(Clone, PartialEq, Debug)]
        struct Payload {
            n: i32,
        }
        impl Bindable for Payload {}
        impl_wire_object!(Payload);

        let mut arena = InstanceArena::new();
        let wire = Payload { n: 11 }.to_wire(&mut arena).unwrap();
        assert_eq!(arena.live_count(), 1);
        let back = Payload::from_wire(&wire, &arena).unwrap();
        assert_eq!(back, Payload { n: 11 });
    }

    #[test]
    fn kind_names() {
        assert_eq!(WireValue::Void.kind_name(), "void");
        assert_eq!(WireValue::Null.kind_name(), "null");
        assert_eq!(WireValue::Int(1).kind_name(), "int");
        assert_eq!(WireValue::Ptr(0).kind_name(), "pointer");
    }

    #[test]
    fn debug_output() {
        assert_eq!(format!("{:?}", WireValue::Int(5)), "Int(5)");
        assert!(format!("{:?}", WireValue::Ptr(0x10)).contains("0x10"));
    }
}
