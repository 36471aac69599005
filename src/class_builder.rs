//! Class bindings.
//!
//! `ClassBuilder` is the `class_`-style front end: declaring it emits the
//! class descriptor (key, pointer identities, traits, destructor), and
//! every chained call synthesizes an invoker and emits its descriptor on
//! the spot. The builder carries no cumulative registration state; it ends
//! when it goes out of scope.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::binder::Binder;
use crate::descriptor::{
    ClassBinding, ClassTraits, ConstructorBinding, FieldBinding, MethodBinding, SmartPtrBinding,
};
use crate::error::BindError;
use crate::host_value::HostValue;
use crate::invoke::{
    self, ConstMethodFn, FactoryFn, FreeFn, InvokerKind, MethodFn,
};
use crate::policy::{self, Policy};
use crate::type_key::Bindable;
use crate::wire::{FromWire, ToWire};

/// A native type a host-defined subclass is built from.
///
/// The wrapper owns a handle to the host object implementing the class and
/// forwards behavior to it; how the forwarding happens is the wrapper's
/// business (typically through [`crate::interface::HostProxy`]).
pub trait HostWrapper: Bindable + Send + Sync + Sized {
    /// Construct the wrapper around the host-side implementation.
    fn from_host(value: HostValue) -> Self;
}

/// Builder for one class registration.
pub struct ClassBuilder<'b, 'h, T> {
    binder: &'b mut Binder<'h>,
    name: String,
    _marker: PhantomData<fn() -> T>,
}

impl<'b, 'h, T> ClassBuilder<'b, 'h, T>
where
    T: Bindable + Send + Sync,
{
    pub(crate) fn declare(binder: &'b mut Binder<'h>, name: &str, traits: ClassTraits) -> Self {
        let key = T::type_key();
        binder.host().register_class(ClassBinding {
            key,
            pointer_key: key.pointer_to(),
            const_pointer_key: key.const_pointer_to(),
            name: name.to_owned(),
            traits,
            destructor: invoke::destructor_invoker(),
        });
        Self {
            binder,
            name: name.to_owned(),
            _marker: PhantomData,
        }
    }

    /// Declare a constructor. The factory's return value becomes an
    /// arena-owned instance; the host receives its owning token.
    pub fn constructor<F, A>(self, f: F) -> Result<Self, BindError>
    where
        F: FactoryFn<T, A>,
    {
        self.constructor_with(f, &[])
    }

    /// Declare a constructor with raw-pointer admissions.
    pub fn constructor_with<F, A>(mut self, f: F, policies: &[Policy]) -> Result<Self, BindError>
    where
        F: FactoryFn<T, A>,
    {
        let signature = f.signature();
        policy::admit(&signature, policies)?;
        self.binder
            .host()
            .register_class_constructor(ConstructorBinding {
                class: T::type_key(),
                args: signature.args().to_vec(),
                ret: signature.ret(),
                invoker: f.into_invoker(),
            });
        Ok(self)
    }

    /// Declare a constructor producing shared instances.
    ///
    /// Registers the shared-pointer companion type first, then the
    /// constructor itself; the host releases its reference through the
    /// companion's destructor, and the native value drops with the last
    /// shared owner.
    pub fn shared_constructor<F, A>(mut self, f: F) -> Result<Self, BindError>
    where
        F: FactoryFn<Arc<T>, A>,
    {
        self.binder.host().register_smart_pointer(SmartPtrBinding {
            key: T::type_key().shared(),
            pointee: T::type_key(),
            name: std::any::type_name::<Arc<T>>().to_owned(),
            destroy: invoke::release_invoker(),
            deref: invoke::shared_deref_invoker::<T>(),
        });

        let signature = f.signature();
        self.binder
            .host()
            .register_class_constructor(ConstructorBinding {
                class: T::type_key(),
                args: signature.args().to_vec(),
                ret: signature.ret(),
                invoker: f.into_invoker(),
            });
        Ok(self)
    }

    /// Declare a method taking the owner shared.
    pub fn method<F, A, R>(self, name: &str, f: F) -> Result<Self, BindError>
    where
        F: ConstMethodFn<T, A, R>,
    {
        self.member_const(name, f, InvokerKind::ConstMethod, &[])
    }

    /// Declare a method taking the owner shared, with admissions.
    pub fn method_with<F, A, R>(
        self,
        name: &str,
        f: F,
        policies: &[Policy],
    ) -> Result<Self, BindError>
    where
        F: ConstMethodFn<T, A, R>,
    {
        self.member_const(name, f, InvokerKind::ConstMethod, policies)
    }

    /// Declare a method taking the owner exclusively.
    pub fn method_mut<F, A, R>(self, name: &str, f: F) -> Result<Self, BindError>
    where
        F: MethodFn<T, A, R>,
    {
        self.method_mut_with(name, f, &[])
    }

    /// Declare an exclusive method with admissions.
    pub fn method_mut_with<F, A, R>(
        mut self,
        name: &str,
        f: F,
        policies: &[Policy],
    ) -> Result<Self, BindError>
    where
        F: MethodFn<T, A, R>,
    {
        let signature = f.signature();
        policy::admit(&signature, policies)?;
        self.binder.host().register_class_method(MethodBinding {
            class: T::type_key(),
            name: name.to_owned(),
            args: signature.args().to_vec(),
            ret: signature.ret(),
            kind: InvokerKind::Method,
            invoker: f.into_invoker(),
        });
        Ok(self)
    }

    /// Declare a method dispatched through a free function that receives
    /// the owner explicitly.
    pub fn method_free<F, A, R>(self, name: &str, f: F) -> Result<Self, BindError>
    where
        F: ConstMethodFn<T, A, R>,
    {
        self.member_const(name, f, InvokerKind::FreeMethod, &[])
    }

    fn member_const<F, A, R>(
        mut self,
        name: &str,
        f: F,
        kind: InvokerKind,
        policies: &[Policy],
    ) -> Result<Self, BindError>
    where
        F: ConstMethodFn<T, A, R>,
    {
        let signature = f.signature();
        policy::admit(&signature, policies)?;
        self.binder.host().register_class_method(MethodBinding {
            class: T::type_key(),
            name: name.to_owned(),
            args: signature.args().to_vec(),
            ret: signature.ret(),
            kind,
            invoker: f.into_invoker(kind),
        });
        Ok(self)
    }

    /// Declare a field through a getter/setter pair sharing one wire type.
    pub fn field<V, G, S>(mut self, name: &str, get: G, set: S) -> Result<Self, BindError>
    where
        V: ToWire + FromWire + Bindable,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        self.binder.host().register_class_field(FieldBinding {
            class: T::type_key(),
            name: name.to_owned(),
            field: V::type_key(),
            getter: invoke::getter_invoker(get),
            setter: invoke::setter_invoker(set),
        });
        Ok(self)
    }

    /// Declare a static/class method.
    pub fn class_method<F, A, R>(mut self, name: &str, f: F) -> Result<Self, BindError>
    where
        F: FreeFn<A, R>,
    {
        let signature = f.signature();
        self.binder
            .host()
            .register_class_classmethod(MethodBinding {
                class: T::type_key(),
                name: name.to_owned(),
                args: signature.args().to_vec(),
                ret: signature.ret(),
                kind: InvokerKind::ClassMethod,
                invoker: f.into_invoker(InvokerKind::ClassMethod),
            });
        Ok(self)
    }

    /// Permit host-defined subclasses of this class.
    ///
    /// Registers the companion wrapper class (constructible from a host
    /// value) and an `implement` class method that builds a wrapper around
    /// a host-side implementation and hands back its owning token.
    pub fn allow_subclass<W>(mut self, wrapper_name: &str) -> Result<Self, BindError>
    where
        W: HostWrapper,
    {
        self.binder
            .class::<W>(wrapper_name)
            .constructor(|value: HostValue| W::from_host(value))?;

        let factory = |value: HostValue| W::from_host(value);
        let signature = FactoryFn::<W, _>::signature(&factory);
        self.binder
            .host()
            .register_class_classmethod(MethodBinding {
                class: T::type_key(),
                name: "implement".to_owned(),
                args: signature.args().to_vec(),
                ret: signature.ret(),
                kind: InvokerKind::ClassMethod,
                invoker: FactoryFn::<W, _>::into_invoker(factory),
            });
        Ok(self)
    }

    /// Boundary name this class was declared under.
    pub fn name(&self) -> &str {
        &self.name
    }
}
