//! Value aggregate bindings: tuples and structs.
//!
//! An aggregate's wire form is an opaque arena token; the host constructs
//! and destroys instances only through the registered invoker pair and
//! reads or writes members through per-element accessor trampolines. Tuple
//! elements are positional, struct fields named; both directions of an
//! accessor pair share the element's wire type.

use std::marker::PhantomData;

use crate::binder::Binder;
use crate::descriptor::{AggregateBinding, ElementBinding};
use crate::error::BindError;
use crate::invoke::{self, InvokerKind, Invoker};
use crate::type_key::Bindable;
use crate::wire::{FromWire, ToWire, WireValue};

fn construct_invoker<T>() -> Invoker
where
    T: Bindable + Default + Send + Sync,
{
    Invoker::new(InvokerKind::Constructor, move |arena, _owner, args| {
        if !args.is_empty() {
            return Err(crate::error::WireError::ArityMismatch {
                expected: 0,
                actual: args.len(),
            });
        }
        Ok(WireValue::Object(arena.alloc(T::default())))
    })
}

/// Builder for one value-tuple registration.
pub struct ValueTupleBuilder<'b, 'h, T> {
    binder: &'b mut Binder<'h>,
    _marker: PhantomData<fn() -> T>,
}

impl<'b, 'h, T> ValueTupleBuilder<'b, 'h, T>
where
    T: Bindable + Default + Send + Sync,
{
    pub(crate) fn declare(binder: &'b mut Binder<'h>, name: &str) -> Self {
        binder.host().register_tuple(AggregateBinding {
            key: T::type_key(),
            name: name.to_owned(),
            construct: construct_invoker::<T>(),
            destroy: invoke::destructor_invoker(),
        });
        Self {
            binder,
            _marker: PhantomData,
        }
    }

    /// Declare the next positional element.
    pub fn element<V, G, S>(mut self, get: G, set: S) -> Result<Self, BindError>
    where
        V: ToWire + FromWire + Bindable,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        self.binder.host().register_tuple_element(ElementBinding {
            aggregate: T::type_key(),
            name: None,
            element: V::type_key(),
            getter: invoke::getter_invoker(get),
            setter: invoke::setter_invoker(set),
        });
        Ok(self)
    }
}

/// Builder for one value-struct registration.
pub struct ValueStructBuilder<'b, 'h, T> {
    binder: &'b mut Binder<'h>,
    name: String,
    seen: Vec<String>,
    _marker: PhantomData<fn() -> T>,
}

impl<'b, 'h, T> std::fmt::Debug for ValueStructBuilder<'b, 'h, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueStructBuilder")
            .field("name", &self.name)
            .field("seen", &self.seen)
            .finish_non_exhaustive()
    }
}

impl<'b, 'h, T> ValueStructBuilder<'b, 'h, T>
where
    T: Bindable + Default + Send + Sync,
{
    pub(crate) fn declare(binder: &'b mut Binder<'h>, name: &str) -> Self {
        binder.host().register_struct(AggregateBinding {
            key: T::type_key(),
            name: name.to_owned(),
            construct: construct_invoker::<T>(),
            destroy: invoke::destructor_invoker(),
        });
        Self {
            binder,
            name: name.to_owned(),
            seen: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Declare a named field.
    pub fn field<V, G, S>(mut self, name: &str, get: G, set: S) -> Result<Self, BindError>
    where
        V: ToWire + FromWire + Bindable,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        if self.seen.iter().any(|n| n == name) {
            return Err(BindError::DuplicateMember {
                owner: self.name.clone(),
                name: name.to_owned(),
            });
        }
        self.seen.push(name.to_owned());
        self.binder.host().register_struct_field(ElementBinding {
            aggregate: T::type_key(),
            name: Some(name.to_owned()),
            element: V::type_key(),
            getter: invoke::getter_invoker(get),
            setter: invoke::setter_invoker(set),
        });
        Ok(self)
    }
}
