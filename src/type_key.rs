//! Deterministic hash-based type identity.
//!
//! Every type that crosses the boundary is identified by a [`TypeKey`], a
//! 64-bit token that is stable for the lifetime of the process. Keys are
//! either well-known constants (primitives), hashes of a registered name,
//! or hashes of the Rust `TypeId` for types that never picked a boundary
//! name. Qualified identities (pointer-to, const-pointer-to, reference-to,
//! shared-pointer-to, container instances) are derived from the base key
//! with domain mixing constants so that related types stay related but
//! distinct.
//!
//! # Examples
//!
//! ```
//! use wirebind::TypeKey;
//!
//! let point = TypeKey::from_name("Point");
//! assert_eq!(point, TypeKey::from_name("Point"));
//! assert_ne!(point, point.pointer_to());
//! assert_ne!(point.pointer_to(), point.const_pointer_to());
//! ```

use std::fmt;

use xxhash_rust::xxh64::xxh64;

/// Domain mixing constants for key derivation.
///
/// Each qualifier gets its own constant so a derived key can never collide
/// with the base key or with a differently-qualified sibling.
mod mix {
    /// Separator used when folding instance arguments.
    pub const SEP: u64 = 0x51ab_36c8_9d04_e2f7;

    /// Domain marker for name-derived type keys.
    pub const NAMED: u64 = 0x8c2e_571f_a6d9_043b;

    /// Qualifier for mutable pointer identities.
    pub const POINTER: u64 = 0x34f0_9b7d_c185_6ae2;

    /// Qualifier for const pointer identities.
    pub const CONST_POINTER: u64 = 0xd71c_48e6_20fb_953a;

    /// Qualifier for reference identities.
    pub const REFERENCE: u64 = 0x6a85_f329_7e40_d1bc;

    /// Qualifier for shared-pointer identities.
    pub const SHARED: u64 = 0xb94d_07a1_53ce_68f0;

    /// Positional mixing constants for instance arguments. Positions past
    /// the table fall back to an offset of the first entry.
    pub const ARG_MARKERS: [u64; 8] = [
        0x9e37_79b9_7f4a_7c15,
        0xbf58_476d_1ce4_e5b9,
        0x94d0_49bb_1331_11eb,
        0xd6e8_feb8_6659_fd93,
        0xe703_7ed1_a0b4_28db,
        0xc6a4_a793_5bd1_e995,
        0x8648_dbbc_94d4_9b8d,
        0xa2b4_8b2c_69e0_d657,
    ];
}

/// A stable 64-bit identity token for a boundary type.
///
/// Two resolutions of the same type always return equal keys, and a key
/// stays valid for the whole process run. Pointer, reference, and shared
/// qualifiers produce related but distinct identities, since the wire layer
/// treats each qualification as its own wire representation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeKey(pub u64);

impl TypeKey {
    /// Derive a key from a boundary type name.
    #[inline]
    pub fn from_name(name: &str) -> Self {
        TypeKey(mix::NAMED ^ xxh64(name.as_bytes(), 0))
    }

    /// Derive a key from the Rust type itself.
    ///
    /// Used for types that are bound without an explicit boundary name.
    /// Resolution always succeeds for any `'static` type.
    #[inline]
    pub fn of<T: 'static>() -> Self {
        use std::hash::{Hash, Hasher};

        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        std::any::TypeId::of::<T>().hash(&mut hasher);
        TypeKey(hasher.finish())
    }

    /// Identity of a mutable pointer to this type.
    #[inline]
    pub const fn pointer_to(self) -> Self {
        TypeKey(self.0.wrapping_mul(mix::SEP) ^ mix::POINTER)
    }

    /// Identity of a const pointer to this type.
    #[inline]
    pub const fn const_pointer_to(self) -> Self {
        TypeKey(self.0.wrapping_mul(mix::SEP) ^ mix::CONST_POINTER)
    }

    /// Identity of a reference to this type.
    #[inline]
    pub const fn reference_to(self) -> Self {
        TypeKey(self.0.wrapping_mul(mix::SEP) ^ mix::REFERENCE)
    }

    /// Identity of a shared pointer owning this type.
    #[inline]
    pub const fn shared(self) -> Self {
        TypeKey(self.0.wrapping_mul(mix::SEP) ^ mix::SHARED)
    }

    /// Identity of a container/template instance. Argument order matters:
    /// `map<string, int>` and `map<int, string>` get different keys.
    #[inline]
    pub fn instance(base: TypeKey, args: &[TypeKey]) -> Self {
        let mut hash = base.0;
        for (i, arg) in args.iter().enumerate() {
            let marker = mix::ARG_MARKERS
                .get(i)
                .copied()
                .unwrap_or_else(|| mix::ARG_MARKERS[0].wrapping_add(i as u64));
            hash = hash.wrapping_mul(mix::SEP).wrapping_add(marker ^ arg.0);
        }
        TypeKey(hash)
    }

    /// Get the underlying u64 value.
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({:#018x})", self.0)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Well-known keys for the standard primitive set.
///
/// These are fixed constants rather than name hashes so the primitive
/// identities never depend on the hashing backend.
pub mod well_known {
    use super::TypeKey;

    /// Key for the void/unit type.
    pub const VOID: TypeKey = TypeKey(0x01d3_5c7a_9e84_f602);
    /// Key for `bool`.
    pub const BOOL: TypeKey = TypeKey(0x12e4_6d8b_af95_0713);
    /// Key for `i8`.
    pub const INT8: TypeKey = TypeKey(0x23f5_7e9c_b0a6_1824);
    /// Key for `i16`.
    pub const INT16: TypeKey = TypeKey(0x3406_8fad_c1b7_2935);
    /// Key for `i32`.
    pub const INT32: TypeKey = TypeKey(0x4517_90be_d2c8_3a46);
    /// Key for `i64`.
    pub const INT64: TypeKey = TypeKey(0x5628_a1cf_e3d9_4b57);
    /// Key for `u8`.
    pub const UINT8: TypeKey = TypeKey(0x6739_b2d0_f4ea_5c68);
    /// Key for `u16`.
    pub const UINT16: TypeKey = TypeKey(0x784a_c3e1_05fb_6d79);
    /// Key for `u32`.
    pub const UINT32: TypeKey = TypeKey(0x895b_d4f2_160c_7e8a);
    /// Key for `u64`.
    pub const UINT64: TypeKey = TypeKey(0x9a6c_e503_271d_8f9b);
    /// Key for `f32`.
    pub const FLOAT32: TypeKey = TypeKey(0xab7d_f614_382e_90ac);
    /// Key for `f64`.
    pub const FLOAT64: TypeKey = TypeKey(0xbc8e_0725_493f_a1bd);
    /// Key for boundary strings.
    pub const STRING: TypeKey = TypeKey(0xcd9f_1836_5a40_b2ce);
    /// Key for opaque host values.
    pub const OPAQUE: TypeKey = TypeKey(0xdea0_2947_6b51_c3df);
}

/// Trait giving a type its boundary identity.
///
/// Every type that appears in a bound signature implements this. The
/// defaults derive the key from the Rust `TypeId` and the name from
/// `std::any::type_name`, so a plain `impl Bindable for MyType {}` is
/// enough for class types; primitives override both with well-known
/// constants and boundary names.
pub trait Bindable: 'static {
    /// Whether this type is a raw pointer that needs a policy admission.
    const RAW_POINTER: bool = false;

    /// The stable identity key for this type.
    fn type_key() -> TypeKey
    where
        Self: Sized,
    {
        TypeKey::of::<Self>()
    }

    /// The boundary-facing name for this type.
    fn type_name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

macro_rules! impl_bindable_primitive {
    ($($ty:ty => $key:ident, $name:literal;)*) => {
        $(
            impl Bindable for $ty {
                fn type_key() -> TypeKey {
                    well_known::$key
                }

                fn type_name() -> &'static str {
                    $name
                }
            }
        )*
    };
}

impl_bindable_primitive! {
    () => VOID, "void";
    bool => BOOL, "bool";
    i8 => INT8, "int8";
    i16 => INT16, "int16";
    i32 => INT32, "int32";
    i64 => INT64, "int64";
    u8 => UINT8, "uint8";
    u16 => UINT16, "uint16";
    u32 => UINT32, "uint32";
    u64 => UINT64, "uint64";
    f32 => FLOAT32, "float32";
    f64 => FLOAT64, "float64";
    String => STRING, "string";
}

impl Bindable for &'static str {
    fn type_key() -> TypeKey {
        well_known::STRING
    }

    fn type_name() -> &'static str {
        "string"
    }
}

impl<T: Bindable> Bindable for Option<T> {
    fn type_key() -> TypeKey {
        TypeKey::instance(TypeKey::from_name("optional"), &[T::type_key()])
    }
}

impl<T: Bindable> Bindable for std::sync::Arc<T> {
    fn type_key() -> TypeKey {
        T::type_key().shared()
    }
}
