//! wirebind — expose native Rust types to a managed host runtime.
//!
//! The crate derives wire-format marshalling for arbitrary function
//! signatures, class types, shared pointers, enums, and value aggregates,
//! then hands each derived binding to an external host through a narrow
//! registration protocol. The host side — the runtime that receives the
//! descriptors and later routes calls through the generated trampolines —
//! is an external collaborator; this crate only speaks the protocol.
//!
//! # Registering bindings
//!
//! ```
//! use wirebind::{Bindable, Registrations, install};
//!
//! #[derive(Clone)]
//! struct Counter {
//!     value: i32,
//! }
//! impl Bindable for Counter {}
//!
//! impl Counter {
//!     fn new(value: i32) -> Self {
//!         Self { value }
//!     }
//!
//!     fn get(&self) -> i32 {
//!         self.value
//!     }
//! }
//!
//! let mut host = Registrations::new();
//! install(&mut host, |binder| {
//!     binder.function("square", |x: i32| x * x)?;
//!     binder
//!         .class::<Counter>("Counter")
//!         .constructor(Counter::new)?
//!         .method("get", Counter::get)?
//!         .field("value", |c: &Counter| c.value, |c: &mut Counter, v| {
//!             c.value = v
//!         })?;
//!     Ok(())
//! })
//! .unwrap();
//!
//! assert!(host.function("square").is_some());
//! ```
//!
//! Registration happens once, single-threaded, before any host traffic;
//! every generated trampoline is afterwards a pure synchronous function
//! from wire arguments to a wire return.

pub mod arena;
pub mod binder;
pub mod class_builder;
pub mod containers;
pub mod descriptor;
pub mod enum_builder;
pub mod error;
pub mod host_value;
pub mod interface;
pub mod invoke;
pub mod policy;
pub mod protocol;
pub mod type_key;
pub mod value_builder;
pub mod wire;

pub use arena::{InstanceArena, ObjectToken};
pub use binder::{Binder, BoolSentinels, install};
pub use class_builder::{ClassBuilder, HostWrapper};
pub use descriptor::ClassTraits;
pub use enum_builder::EnumBuilder;
pub use error::{BindError, WireError};
pub use host_value::HostValue;
pub use interface::HostProxy;
pub use invoke::{Invoker, InvokerKind, Signature};
pub use policy::{ConstRawPtr, Policy, RawPtr};
pub use protocol::{HostProtocol, PrimitiveBinding, Registrations, fatal_error};
pub use type_key::{Bindable, TypeKey, well_known};
pub use value_builder::{ValueStructBuilder, ValueTupleBuilder};
pub use wire::{FromWire, ToWire, WireValue};
