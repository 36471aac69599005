//! Host-implemented interfaces.
//!
//! A [`HostProxy`] is the native anchor for an object the host implements:
//! it owns the handle to the host-side implementation and hands it to
//! wrapper types that forward behavior across the boundary. Misusing the
//! proxy — initializing it twice, or reading a target that was never set —
//! is a boundary corruption, reported through the fatal channel rather
//! than a recoverable error.

use crate::binder::Binder;
use crate::descriptor::InterfaceBinding;
use crate::host_value::HostValue;
use crate::invoke::{self, Invoker, InvokerKind};
use crate::protocol::fatal_error;
use crate::type_key::{Bindable, TypeKey};
use crate::wire::WireValue;

/// Native anchor for a host-side implementation object.
#[derive(Clone, Debug)]
pub struct HostProxy {
    target: Option<HostValue>,
}

impl HostProxy {
    /// Create a proxy bound to a host implementation.
    pub fn new(target: HostValue) -> Self {
        Self {
            target: Some(target),
        }
    }

    /// Create a proxy that will be bound later.
    pub fn unbound() -> Self {
        Self { target: None }
    }

    /// Bind the proxy to its host implementation.
    ///
    /// Binding twice is unrecoverable: the first target may already have
    /// been handed out.
    pub fn initialize(&mut self, target: HostValue) {
        if self.target.is_some() {
            fatal_error("HostProxy", "cannot initialize an interface proxy twice");
        }
        self.target = Some(target);
    }

    /// Whether the proxy has a target.
    pub fn is_initialized(&self) -> bool {
        self.target.is_some()
    }

    /// The host implementation behind this proxy.
    ///
    /// Reading an unbound proxy is unrecoverable.
    pub fn target(&self) -> &HostValue {
        match &self.target {
            Some(target) => target,
            None => fatal_error(
                "HostProxy",
                "cannot dispatch through an uninitialized interface proxy",
            ),
        }
    }
}

impl Bindable for HostProxy {
    fn type_key() -> TypeKey {
        TypeKey::from_name("hostproxy")
    }

    fn type_name() -> &'static str {
        "hostproxy"
    }
}

fn proxy_construct_invoker() -> Invoker {
    Invoker::new(InvokerKind::Constructor, move |arena, _owner, args| {
        if args.len() != 1 {
            return Err(crate::error::WireError::ArityMismatch {
                expected: 1,
                actual: args.len(),
            });
        }
        match &args[0] {
            WireValue::Handle(handle) => Ok(WireValue::Object(
                arena.alloc(HostProxy::new(handle.clone())),
            )),
            other => Err(crate::error::WireError::TypeMismatch {
                expected: "handle",
                actual: other.kind_name(),
            }),
        }
    })
}

impl<'h> Binder<'h> {
    /// Declare the host-implementable interface type.
    pub fn interface(&mut self, name: &str) -> &mut Self {
        self.host().register_interface(InterfaceBinding {
            key: HostProxy::type_key(),
            name: name.to_owned(),
            construct: proxy_construct_invoker(),
            destroy: invoke::destructor_invoker(),
        });
        self
    }
}
