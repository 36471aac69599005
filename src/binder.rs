//! The registration entry point and free-function bindings.
//!
//! A [`Binder`] wraps the host protocol for the duration of a registration
//! run. Constructing one declares the standard primitive set; the builder
//! methods then declare user entities, each call emitting its descriptors
//! immediately in declaration order.
//!
//! Process-level installation goes through [`install`], which runs a
//! binding closure exactly once: registration order is explicit and
//! caller-controlled, and a second call is a concrete error instead of a
//! silent re-registration.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::class_builder::ClassBuilder;
use crate::descriptor::{ClassTraits, FunctionBinding};
use crate::enum_builder::EnumBuilder;
use crate::error::BindError;
use crate::invoke::{FreeFn, InvokerKind};
use crate::policy::{self, Policy};
use crate::protocol::HostProtocol;
use crate::type_key::{Bindable, well_known};
use crate::value_builder::{ValueStructBuilder, ValueTupleBuilder};

/// Host-decoding sentinels for the boolean type.
///
/// The host's truthy/falsy encoding may differ from the native one, so the
/// two integer values it should decode as true and false are part of the
/// boundary registration rather than hardcoded.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BoolSentinels {
    pub true_value: i64,
    pub false_value: i64,
}

impl Default for BoolSentinels {
    fn default() -> Self {
        Self {
            true_value: 1,
            false_value: 0,
        }
    }
}

/// Declarative registration front end over a host protocol.
pub struct Binder<'h> {
    host: &'h mut dyn HostProtocol,
}

impl<'h> std::fmt::Debug for Binder<'h> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binder").finish_non_exhaustive()
    }
}

impl<'h> Binder<'h> {
    /// Open a binder and declare the standard primitive set with default
    /// bool sentinels.
    pub fn new(host: &'h mut dyn HostProtocol) -> Self {
        Self::with_bool_sentinels(host, BoolSentinels::default())
    }

    /// Open a binder with explicit bool sentinels.
    pub fn with_bool_sentinels(host: &'h mut dyn HostProtocol, sentinels: BoolSentinels) -> Self {
        let mut binder = Self { host };
        binder.register_standard(sentinels);
        binder
    }

    fn register_standard(&mut self, sentinels: BoolSentinels) {
        self.host.register_void(well_known::VOID, "void");
        self.host.register_bool(
            well_known::BOOL,
            "bool",
            sentinels.true_value,
            sentinels.false_value,
        );
        self.host.register_integer(well_known::INT8, "int8", 1, true);
        self.host
            .register_integer(well_known::INT16, "int16", 2, true);
        self.host
            .register_integer(well_known::INT32, "int32", 4, true);
        self.host
            .register_integer(well_known::INT64, "int64", 8, true);
        self.host
            .register_integer(well_known::UINT8, "uint8", 1, false);
        self.host
            .register_integer(well_known::UINT16, "uint16", 2, false);
        self.host
            .register_integer(well_known::UINT32, "uint32", 4, false);
        self.host
            .register_integer(well_known::UINT64, "uint64", 8, false);
        self.host.register_float(well_known::FLOAT32, "float32", 4);
        self.host.register_float(well_known::FLOAT64, "float64", 8);
        self.host.register_string(well_known::STRING, "string");
        self.host.register_opaque(well_known::OPAQUE, "hostvalue");
    }

    pub(crate) fn host(&mut self) -> &mut dyn HostProtocol {
        self.host
    }

    /// Declare a free function.
    pub fn function<F, A, R>(&mut self, name: &str, f: F) -> Result<&mut Self, BindError>
    where
        F: FreeFn<A, R>,
    {
        self.function_with(name, f, &[])
    }

    /// Declare a free function with raw-pointer admissions.
    pub fn function_with<F, A, R>(
        &mut self,
        name: &str,
        f: F,
        policies: &[Policy],
    ) -> Result<&mut Self, BindError>
    where
        F: FreeFn<A, R>,
    {
        let signature = f.signature();
        policy::admit(&signature, policies)?;
        self.host.register_function(FunctionBinding {
            name: name.to_owned(),
            args: signature.args().to_vec(),
            ret: signature.ret(),
            invoker: f.into_invoker(InvokerKind::Function),
        });
        Ok(self)
    }

    /// Declare a class and continue with its members.
    pub fn class<T>(&mut self, name: &str) -> ClassBuilder<'_, 'h, T>
    where
        T: Bindable + Send + Sync,
    {
        self.class_with(name, ClassTraits::default())
    }

    /// Declare a class with explicit traits.
    pub fn class_with<T>(&mut self, name: &str, traits: ClassTraits) -> ClassBuilder<'_, 'h, T>
    where
        T: Bindable + Send + Sync,
    {
        ClassBuilder::declare(self, name, traits)
    }

    /// Declare an enum and continue with its values.
    pub fn enumeration<E>(&mut self, name: &str) -> EnumBuilder<'_, 'h, E>
    where
        E: Bindable,
    {
        EnumBuilder::declare(self, name)
    }

    /// Declare a value struct and continue with its fields.
    pub fn value_struct<T>(&mut self, name: &str) -> ValueStructBuilder<'_, 'h, T>
    where
        T: Bindable + Default + Send + Sync,
    {
        ValueStructBuilder::declare(self, name)
    }

    /// Declare a value tuple and continue with its elements.
    pub fn value_tuple<T>(&mut self, name: &str) -> ValueTupleBuilder<'_, 'h, T>
    where
        T: Bindable + Default + Send + Sync,
    {
        ValueTupleBuilder::declare(self, name)
    }

    /// Declare a shared-pointer type over a bound class.
    pub fn smart_pointer<T>(&mut self, name: &str) -> &mut Self
    where
        T: Bindable + Send + Sync,
    {
        use crate::descriptor::SmartPtrBinding;
        use crate::invoke;

        self.host.register_smart_pointer(SmartPtrBinding {
            key: T::type_key().shared(),
            pointee: T::type_key(),
            name: name.to_owned(),
            destroy: invoke::release_invoker(),
            deref: invoke::shared_deref_invoker::<T>(),
        });
        self
    }
}

static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Run the process-wide binding declarations exactly once.
///
/// Registration order is the statement order inside `bindings`. A second
/// call returns [`BindError::AlreadyInstalled`] without touching the host.
pub fn install<F>(host: &mut dyn HostProtocol, bindings: F) -> Result<(), BindError>
where
    F: FnOnce(&mut Binder<'_>) -> Result<(), BindError>,
{
    if INSTALLED.swap(true, Ordering::SeqCst) {
        return Err(BindError::AlreadyInstalled);
    }
    let mut binder = Binder::new(host);
    bindings(&mut binder)
}
