//! Raw-pointer admission policies.
//!
//! Raw pointers carry no lifetime guarantee the host could rely on, so a
//! bare `*mut T` or `*const T` in a bound signature does not implement the
//! wire traits at all — it fails to compile. Exposure has to be spelled
//! twice: wrap the pointer in [`RawPtr`]/[`ConstRawPtr`] in the signature,
//! and admit the slot with a [`Policy`] when the binding is declared. A
//! wrapped pointer at a slot no policy covers is rejected with
//! [`BindError::RawPointerNotPermitted`].
//!
//! Slot numbering follows the signature layout: the return type is slot 0,
//! the first argument slot 1. Policies apply independently, left to right;
//! none may depend on another's output.

use crate::error::BindError;
use crate::invoke::Signature;
use crate::type_key::{Bindable, TypeKey};
use crate::wire::{FromWire, ToWire, WireValue};

/// A non-owning mutable pointer admitted across the boundary.
///
/// The pointee is never dereferenced by the marshalling layer; the pointer
/// travels as an opaque word and comes back bit-identical.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RawPtr<T>(pub *mut T);

/// A non-owning const pointer admitted across the boundary.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ConstRawPtr<T>(pub *const T);

impl<T: Bindable> Bindable for RawPtr<T> {
    const RAW_POINTER: bool = true;

    fn type_key() -> TypeKey {
        T::type_key().pointer_to()
    }
}

impl<T: Bindable> Bindable for ConstRawPtr<T> {
    const RAW_POINTER: bool = true;

    fn type_key() -> TypeKey {
        T::type_key().const_pointer_to()
    }
}

impl<T: 'static> ToWire for RawPtr<T> {
    fn to_wire(
        self,
        _arena: &mut crate::arena::InstanceArena,
    ) -> Result<WireValue, crate::error::WireError> {
        Ok(WireValue::Ptr(self.0 as usize))
    }
}

impl<T: 'static> FromWire for RawPtr<T> {
    fn from_wire(
        value: &WireValue,
        _arena: &crate::arena::InstanceArena,
    ) -> Result<Self, crate::error::WireError> {
        match value {
            WireValue::Ptr(p) => Ok(RawPtr(*p as *mut T)),
            other => Err(crate::error::WireError::TypeMismatch {
                expected: "pointer",
                actual: other.kind_name(),
            }),
        }
    }
}

impl<T: 'static> ToWire for ConstRawPtr<T> {
    fn to_wire(
        self,
        _arena: &mut crate::arena::InstanceArena,
    ) -> Result<WireValue, crate::error::WireError> {
        Ok(WireValue::Ptr(self.0 as usize))
    }
}

impl<T: 'static> FromWire for ConstRawPtr<T> {
    fn from_wire(
        value: &WireValue,
        _arena: &crate::arena::InstanceArena,
    ) -> Result<Self, crate::error::WireError> {
        match value {
            WireValue::Ptr(p) => Ok(ConstRawPtr(*p as *const T)),
            other => Err(crate::error::WireError::TypeMismatch {
                expected: "pointer",
                actual: other.kind_name(),
            }),
        }
    }
}

/// A per-slot relaxation of the raw-pointer safety rule.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Policy {
    /// Admit a raw pointer at one slot (0 = return, 1 = first argument).
    AllowRawPointer(usize),
    /// Admit raw pointers at every slot.
    AllowRawPointers,
}

impl Policy {
    fn covers(&self, slot: usize) -> bool {
        match self {
            Policy::AllowRawPointer(index) => *index == slot,
            Policy::AllowRawPointers => true,
        }
    }
}

/// Check every raw-pointer slot of a signature against the policy list.
///
/// Policies apply independently; the first uncovered raw slot aborts the
/// declaration.
pub(crate) fn admit(signature: &Signature, policies: &[Policy]) -> Result<(), BindError> {
    for &slot in signature.raw_slots() {
        if !policies.iter().any(|p| p.covers(slot)) {
            return Err(BindError::RawPointerNotPermitted { position: slot });
        }
    }
    Ok(())
}
