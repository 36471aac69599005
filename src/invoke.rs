//! Invoker synthesis.
//!
//! For every bound callable the crate produces an [`Invoker`]: a trampoline
//! with the uniform wire-level shape
//! `(arena, owner?, wire args...) -> wire return`. The trampoline converts
//! each wire argument to its native form, invokes the captured callable,
//! and converts the result back out. Dispatch over callable shapes is a
//! closed tagged set ([`InvokerKind`]); the callable itself is stored as a
//! typed closure, never as an opaque byte blob.
//!
//! The synthesis traits ([`FreeFn`], [`FactoryFn`], [`MethodFn`],
//! [`ConstMethodFn`]) are implemented by macro for arities 0 through 8 and
//! derive the boundary [`Signature`] from the same generic parameters that
//! shape the trampoline, so a descriptor and its invoker cannot disagree.

use std::sync::Arc;

use crate::arena::{InstanceArena, ObjectToken};
use crate::error::WireError;
use crate::type_key::{Bindable, TypeKey};
use crate::wire::{FromWire, ToWire, WireValue};

/// The closed set of trampoline shapes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InvokerKind {
    /// Free function.
    Function,
    /// Constructor factory returning an owning token.
    Constructor,
    /// Instance method taking the owner exclusively.
    Method,
    /// Instance method taking the owner shared.
    ConstMethod,
    /// Free function dispatched with an explicit owner argument.
    FreeMethod,
    /// Static/class method, no owner.
    ClassMethod,
    /// Field or element read accessor.
    Getter,
    /// Field or element write accessor.
    Setter,
    /// Instance teardown.
    Destructor,
}

type InvokeFn =
    dyn Fn(&mut InstanceArena, Option<ObjectToken>, &[WireValue]) -> Result<WireValue, WireError>
        + Send
        + Sync;

/// A synthesized trampoline paired with its dispatch shape.
#[derive(Clone)]
pub struct Invoker {
    kind: InvokerKind,
    f: Arc<InvokeFn>,
}

impl Invoker {
    pub(crate) fn new<F>(kind: InvokerKind, f: F) -> Self
    where
        F: Fn(&mut InstanceArena, Option<ObjectToken>, &[WireValue]) -> Result<WireValue, WireError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            kind,
            f: Arc::new(f),
        }
    }

    /// The dispatch shape this trampoline was synthesized for.
    pub fn kind(&self) -> InvokerKind {
        self.kind
    }

    /// Run the trampoline: wire arguments in, wire return out.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn call(
        &self,
        arena: &mut InstanceArena,
        owner: Option<ObjectToken>,
        args: &[WireValue],
    ) -> Result<WireValue, WireError> {
        (self.f)(arena, owner, args)
    }
}

impl std::fmt::Debug for Invoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invoker")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// The wire-level signature derived for a bound callable.
///
/// The return type occupies logical slot 0, the first argument slot 1 —
/// the numbering the policy pipeline uses.
#[derive(Clone, Debug)]
pub struct Signature {
    ret: TypeKey,
    args: Vec<TypeKey>,
    raw_slots: Vec<usize>,
}

impl Signature {
    pub(crate) fn build(ret: SlotInfo, arg_slots: Vec<SlotInfo>) -> Self {
        let mut raw_slots = Vec::new();
        if ret.raw {
            raw_slots.push(0);
        }
        let args = arg_slots
            .iter()
            .enumerate()
            .map(|(i, slot)| {
                if slot.raw {
                    raw_slots.push(i + 1);
                }
                slot.key
            })
            .collect();
        Self {
            ret: ret.key,
            args,
            raw_slots,
        }
    }

    /// Key of the return type.
    pub fn ret(&self) -> TypeKey {
        self.ret
    }

    /// Keys of the argument types, in call order.
    pub fn args(&self) -> &[TypeKey] {
        &self.args
    }

    /// Slots holding raw pointers, in signature numbering.
    pub(crate) fn raw_slots(&self) -> &[usize] {
        &self.raw_slots
    }
}

pub(crate) struct SlotInfo {
    key: TypeKey,
    raw: bool,
}

pub(crate) fn slot<T: Bindable>() -> SlotInfo {
    SlotInfo {
        key: T::type_key(),
        raw: T::RAW_POINTER,
    }
}

fn expect_arity(args: &[WireValue], expected: usize) -> Result<(), WireError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(WireError::ArityMismatch {
            expected,
            actual: args.len(),
        })
    }
}

fn owner_token(owner: Option<ObjectToken>) -> Result<ObjectToken, WireError> {
    owner.ok_or(WireError::MissingOwner)
}

// ============================================================================
// Synthesis traits
// ============================================================================

/// Callables with no owner slot: free functions and class methods.
pub trait FreeFn<Args, Ret>: Send + Sync + 'static {
    /// Derive the boundary signature.
    fn signature(&self) -> Signature;
    /// Synthesize the trampoline under the given dispatch shape.
    fn into_invoker(self, kind: InvokerKind) -> Invoker;
}

/// Constructor factories: produce a fresh instance, returned as an owning
/// token whose identity is the class pointer key.
pub trait FactoryFn<Obj, Args>: Send + Sync + 'static {
    fn signature(&self) -> Signature;
    fn into_invoker(self) -> Invoker;
}

/// Instance methods taking the owner exclusively.
pub trait MethodFn<Obj, Args, Ret>: Send + Sync + 'static {
    fn signature(&self) -> Signature;
    fn into_invoker(self) -> Invoker;
}

/// Instance methods taking the owner shared. Also covers free functions
/// dispatched with an explicit owner argument (the `FreeMethod` shape).
pub trait ConstMethodFn<Obj, Args, Ret>: Send + Sync + 'static {
    fn signature(&self) -> Signature;
    fn into_invoker(self, kind: InvokerKind) -> Invoker;
}

macro_rules! impl_invoker_fns {
    ($count:literal $(, $arg:ident => $idx:tt)*) => {
        impl<Fun, Ret $(, $arg)*> FreeFn<($($arg,)*), Ret> for Fun
        where
            Fun: Fn($($arg),*) -> Ret + Send + Sync + 'static,
            Ret: ToWire + Bindable,
            $($arg: FromWire + Bindable,)*
        {
            fn signature(&self) -> Signature {
                Signature::build(slot::<Ret>(), vec![$(slot::<$arg>()),*])
            }

            #[allow(non_snake_case)]
            fn into_invoker(self, kind: InvokerKind) -> Invoker {
                Invoker::new(kind, move |arena, _owner, args| {
                    expect_arity(args, $count)?;
                    $(let $arg = <$arg>::from_wire(&args[$idx], arena)?;)*
                    (self)($($arg),*).to_wire(arena)
                })
            }
        }

        impl<Fun, Obj $(, $arg)*> FactoryFn<Obj, ($($arg,)*)> for Fun
        where
            Fun: Fn($($arg),*) -> Obj + Send + Sync + 'static,
            Obj: Bindable + Send + Sync,
            $($arg: FromWire + Bindable,)*
        {
            fn signature(&self) -> Signature {
                let ret = SlotInfo {
                    key: Obj::type_key().pointer_to(),
                    raw: false,
                };
                Signature::build(ret, vec![$(slot::<$arg>()),*])
            }

            #[allow(non_snake_case)]
            fn into_invoker(self) -> Invoker {
                Invoker::new(InvokerKind::Constructor, move |arena, _owner, args| {
                    expect_arity(args, $count)?;
                    $(let $arg = <$arg>::from_wire(&args[$idx], arena)?;)*
                    let token = arena.alloc((self)($($arg),*));
                    Ok(WireValue::Object(token))
                })
            }
        }

        impl<Fun, Obj, Ret $(, $arg)*> MethodFn<Obj, ($($arg,)*), Ret> for Fun
        where
            Fun: Fn(&mut Obj $(, $arg)*) -> Ret + Send + Sync + 'static,
            Obj: Bindable,
            Ret: ToWire + Bindable,
            $($arg: FromWire + Bindable,)*
        {
            fn signature(&self) -> Signature {
                Signature::build(slot::<Ret>(), vec![$(slot::<$arg>()),*])
            }

            #[allow(non_snake_case)]
            fn into_invoker(self) -> Invoker {
                Invoker::new(InvokerKind::Method, move |arena, owner, args| {
                    let token = owner_token(owner)?;
                    expect_arity(args, $count)?;
                    $(let $arg = <$arg>::from_wire(&args[$idx], arena)?;)*
                    let ret = {
                        let this = arena.get_mut::<Obj>(token)?;
                        (self)(this $(, $arg)*)
                    };
                    ret.to_wire(arena)
                })
            }
        }

        impl<Fun, Obj, Ret $(, $arg)*> ConstMethodFn<Obj, ($($arg,)*), Ret> for Fun
        where
            Fun: Fn(&Obj $(, $arg)*) -> Ret + Send + Sync + 'static,
            Obj: Bindable,
            Ret: ToWire + Bindable,
            $($arg: FromWire + Bindable,)*
        {
            fn signature(&self) -> Signature {
                Signature::build(slot::<Ret>(), vec![$(slot::<$arg>()),*])
            }

            #[allow(non_snake_case)]
            fn into_invoker(self, kind: InvokerKind) -> Invoker {
                Invoker::new(kind, move |arena, owner, args| {
                    let token = owner_token(owner)?;
                    expect_arity(args, $count)?;
                    $(let $arg = <$arg>::from_wire(&args[$idx], arena)?;)*
                    let ret = {
                        let this = arena.get::<Obj>(token)?;
                        (self)(this $(, $arg)*)
                    };
                    ret.to_wire(arena)
                })
            }
        }
    };
}

impl_invoker_fns!(0);
impl_invoker_fns!(1, A0 => 0);
impl_invoker_fns!(2, A0 => 0, A1 => 1);
impl_invoker_fns!(3, A0 => 0, A1 => 1, A2 => 2);
impl_invoker_fns!(4, A0 => 0, A1 => 1, A2 => 2, A3 => 3);
impl_invoker_fns!(5, A0 => 0, A1 => 1, A2 => 2, A3 => 3, A4 => 4);
impl_invoker_fns!(6, A0 => 0, A1 => 1, A2 => 2, A3 => 3, A4 => 4, A5 => 5);
impl_invoker_fns!(7, A0 => 0, A1 => 1, A2 => 2, A3 => 3, A4 => 4, A5 => 5, A6 => 6);
impl_invoker_fns!(8, A0 => 0, A1 => 1, A2 => 2, A3 => 3, A4 => 4, A5 => 5, A6 => 6, A7 => 7);

// ============================================================================
// Accessor and lifecycle trampolines
// ============================================================================

pub(crate) fn getter_invoker<Obj, Value, G>(get: G) -> Invoker
where
    Obj: 'static,
    Value: ToWire + 'static,
    G: Fn(&Obj) -> Value + Send + Sync + 'static,
{
    Invoker::new(InvokerKind::Getter, move |arena, owner, args| {
        let token = owner_token(owner)?;
        expect_arity(args, 0)?;
        let value = {
            let this = arena.get::<Obj>(token)?;
            get(this)
        };
        value.to_wire(arena)
    })
}

pub(crate) fn setter_invoker<Obj, Value, S>(set: S) -> Invoker
where
    Obj: 'static,
    Value: FromWire + 'static,
    S: Fn(&mut Obj, Value) + Send + Sync + 'static,
{
    Invoker::new(InvokerKind::Setter, move |arena, owner, args| {
        let token = owner_token(owner)?;
        expect_arity(args, 1)?;
        let value = Value::from_wire(&args[0], arena)?;
        let this = arena.get_mut::<Obj>(token)?;
        set(this, value);
        Ok(WireValue::Void)
    })
}

/// Teardown for raw class instances: destroys the slot outright.
pub(crate) fn destructor_invoker() -> Invoker {
    Invoker::new(InvokerKind::Destructor, move |arena, owner, args| {
        let token = owner_token(owner)?;
        expect_arity(args, 0)?;
        arena.destroy(token);
        Ok(WireValue::Void)
    })
}

/// Teardown for shared instances: drops one host reference, destroying the
/// slot (and the native value) when the last reference goes.
pub(crate) fn release_invoker() -> Invoker {
    Invoker::new(InvokerKind::Destructor, move |arena, owner, args| {
        let token = owner_token(owner)?;
        expect_arity(args, 0)?;
        arena.release(token);
        Ok(WireValue::Void)
    })
}

/// Pointee access for shared-pointer bindings: the raw pointee pointer as
/// an opaque word, identity preserved.
pub(crate) fn shared_deref_invoker<T: Send + Sync + 'static>() -> Invoker {
    Invoker::new(InvokerKind::Getter, move |arena, owner, args| {
        let token = owner_token(owner)?;
        expect_arity(args, 0)?;
        let shared = arena.get::<Arc<T>>(token)?;
        Ok(WireValue::Ptr(Arc::as_ptr(shared) as usize))
    })
}
