//! Opaque host values — the "any value" escape hatch.
//!
//! A [`HostValue`] wraps a reference-counted payload owned by the host
//! runtime. The native side never inspects it beyond an optional downcast;
//! it only moves the handle across the boundary. Every conversion that
//! retains a handle clones the count and every drop releases it, so an
//! acquire is always paired with a release across a single call boundary.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::type_key::{Bindable, TypeKey, well_known};

/// A reference-counted handle to an opaque host value.
///
/// Cloning acquires a reference, dropping releases it. The payload is only
/// reachable through [`HostValue::downcast_ref`], which is how host wrapper
/// types recover a typed view when the host calls back into native code.
#[derive(Clone)]
pub struct HostValue {
    cell: Arc<dyn Any + Send + Sync>,
}

impl HostValue {
    /// Wrap a payload in a fresh handle with an initial reference.
    pub fn new<V: Any + Send + Sync>(value: V) -> Self {
        Self {
            cell: Arc::new(value),
        }
    }

    /// Borrow the payload if it has the expected type.
    pub fn downcast_ref<V: Any>(&self) -> Option<&V> {
        self.cell.downcast_ref::<V>()
    }

    /// Current reference count, counting every live handle.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.cell)
    }

    /// Whether two handles refer to the same host value.
    pub fn same_value(&self, other: &HostValue) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }
}

impl fmt::Debug for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostValue")
            .field("ref_count", &self.ref_count())
            .finish_non_exhaustive()
    }
}

impl Bindable for HostValue {
    fn type_key() -> TypeKey {
        well_known::OPAQUE
    }

    fn type_name() -> &'static str {
        "hostvalue"
    }
}
