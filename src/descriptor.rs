//! Binding descriptors — the registration payloads.
//!
//! One descriptor is created per declared entity, at registration time, and
//! moved into the host through the [`crate::protocol::HostProtocol`] calls.
//! Descriptors are immutable after construction; the native side keeps no
//! copy.

use bitflags::bitflags;

use crate::invoke::{Invoker, InvokerKind};
use crate::type_key::TypeKey;

bitflags! {
    /// Traits of a registered class the host needs for dispatch decisions.
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
    pub struct ClassTraits: u8 {
        /// Instances may be downcast; the host should use dynamic dispatch.
        const POLYMORPHIC = 1 << 0;
        /// No direct constructor; instances only come from host subclasses.
        const ABSTRACT = 1 << 1;
    }
}

/// Registration record for one free function.
#[derive(Debug)]
pub struct FunctionBinding {
    pub name: String,
    pub args: Vec<TypeKey>,
    pub ret: TypeKey,
    pub invoker: Invoker,
}

/// Registration record for one class.
#[derive(Debug)]
pub struct ClassBinding {
    pub key: TypeKey,
    pub pointer_key: TypeKey,
    pub const_pointer_key: TypeKey,
    pub name: String,
    pub traits: ClassTraits,
    pub destructor: Invoker,
}

/// Registration record for one class constructor.
#[derive(Debug)]
pub struct ConstructorBinding {
    pub class: TypeKey,
    pub args: Vec<TypeKey>,
    pub ret: TypeKey,
    pub invoker: Invoker,
}

/// Registration record for one instance or class method.
#[derive(Debug)]
pub struct MethodBinding {
    pub class: TypeKey,
    pub name: String,
    pub args: Vec<TypeKey>,
    pub ret: TypeKey,
    pub kind: InvokerKind,
    pub invoker: Invoker,
}

/// Registration record for one class field.
#[derive(Debug)]
pub struct FieldBinding {
    pub class: TypeKey,
    pub name: String,
    pub field: TypeKey,
    pub getter: Invoker,
    pub setter: Invoker,
}

/// Registration record for one aggregate (value tuple or value struct).
#[derive(Debug)]
pub struct AggregateBinding {
    pub key: TypeKey,
    pub name: String,
    pub construct: Invoker,
    pub destroy: Invoker,
}

/// Registration record for one aggregate element or named field.
///
/// Tuple elements are positional (`name` is `None`); struct fields carry
/// their name.
#[derive(Debug)]
pub struct ElementBinding {
    pub aggregate: TypeKey,
    pub name: Option<String>,
    pub element: TypeKey,
    pub getter: Invoker,
    pub setter: Invoker,
}

/// Registration record for one shared-pointer type.
#[derive(Debug)]
pub struct SmartPtrBinding {
    pub key: TypeKey,
    pub pointee: TypeKey,
    pub name: String,
    pub destroy: Invoker,
    pub deref: Invoker,
}

/// Registration record for one enum type.
#[derive(Debug)]
pub struct EnumBinding {
    pub key: TypeKey,
    pub name: String,
}

/// Registration record for one enum value. Values travel as i64; wider
/// underlying types need an explicit caller-side cast.
#[derive(Debug)]
pub struct EnumValueBinding {
    pub enum_key: TypeKey,
    pub name: String,
    pub value: i64,
}

/// Registration record for the host-implementable interface type.
#[derive(Debug)]
pub struct InterfaceBinding {
    pub key: TypeKey,
    pub name: String,
    pub construct: Invoker,
    pub destroy: Invoker,
}
