//! The registration protocol — the narrow call surface into the host.
//!
//! A fixed set of one-way calls, one family per entity kind. Each call is
//! made exactly once per declared binding, at installation time, in
//! declaration order; the host must treat the stream as an
//! order-independent set of declarations. The only traffic in the other
//! direction is the fatal channel, which never returns.
//!
//! [`Registrations`] is a passive descriptor table implementing the
//! protocol. It performs no dispatch — it exists so embedders and tests can
//! observe the registration stream and drive the generated trampolines.

use rustc_hash::FxHashMap;

use crate::descriptor::{
    AggregateBinding, ClassBinding, ConstructorBinding, ElementBinding, EnumBinding,
    EnumValueBinding, FieldBinding, FunctionBinding, InterfaceBinding, MethodBinding,
    SmartPtrBinding,
};
use crate::type_key::TypeKey;

/// Abort the process over an unrecoverable boundary violation.
///
/// There is deliberately no recovery path: once a boundary invariant is
/// broken the host may be in an inconsistent state, so the error is never
/// surfaced as a native result.
pub fn fatal_error(name: &str, payload: &str) -> ! {
    eprintln!("wirebind: fatal boundary error in {name}: {payload}");
    std::process::abort();
}

/// The host side of the registration protocol.
///
/// Implemented by the external runtime. Every method is a one-way
/// declaration; no call may depend on another having been processed first,
/// except that a type referenced by key should itself be registered before
/// the host first routes a call through it.
pub trait HostProtocol {
    /// Declare the void type.
    fn register_void(&mut self, key: TypeKey, name: &str);
    /// Declare the boolean type with its host-decoding sentinels.
    fn register_bool(&mut self, key: TypeKey, name: &str, true_value: i64, false_value: i64);
    /// Declare an integer type with its in-memory width and signedness.
    fn register_integer(&mut self, key: TypeKey, name: &str, width: u8, signed: bool);
    /// Declare a float type with its in-memory width.
    fn register_float(&mut self, key: TypeKey, name: &str, width: u8);
    /// Declare the boundary string type.
    fn register_string(&mut self, key: TypeKey, name: &str);
    /// Declare the opaque host-value type.
    fn register_opaque(&mut self, key: TypeKey, name: &str);

    /// Declare a free function.
    fn register_function(&mut self, binding: FunctionBinding);

    /// Declare a value tuple.
    fn register_tuple(&mut self, binding: AggregateBinding);
    /// Declare one positional element of a value tuple.
    fn register_tuple_element(&mut self, binding: ElementBinding);
    /// Declare a value struct.
    fn register_struct(&mut self, binding: AggregateBinding);
    /// Declare one named field of a value struct.
    fn register_struct_field(&mut self, binding: ElementBinding);

    /// Declare a shared-pointer type.
    fn register_smart_pointer(&mut self, binding: SmartPtrBinding);

    /// Declare a class.
    fn register_class(&mut self, binding: ClassBinding);
    /// Declare a class constructor.
    fn register_class_constructor(&mut self, binding: ConstructorBinding);
    /// Declare an instance method.
    fn register_class_method(&mut self, binding: MethodBinding);
    /// Declare a class field.
    fn register_class_field(&mut self, binding: FieldBinding);
    /// Declare a static/class method.
    fn register_class_classmethod(&mut self, binding: MethodBinding);

    /// Declare an enum type.
    fn register_enum(&mut self, binding: EnumBinding);
    /// Declare one enum value.
    fn register_enum_value(&mut self, binding: EnumValueBinding);

    /// Declare the host-implementable interface type.
    fn register_interface(&mut self, binding: InterfaceBinding);
}

/// A recorded primitive declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveBinding {
    Void {
        key: TypeKey,
        name: String,
    },
    Bool {
        key: TypeKey,
        name: String,
        true_value: i64,
        false_value: i64,
    },
    Integer {
        key: TypeKey,
        name: String,
        width: u8,
        signed: bool,
    },
    Float {
        key: TypeKey,
        name: String,
        width: u8,
    },
    Str {
        key: TypeKey,
        name: String,
    },
    Opaque {
        key: TypeKey,
        name: String,
    },
}

impl PrimitiveBinding {
    /// The key this declaration registered.
    pub fn key(&self) -> TypeKey {
        match self {
            PrimitiveBinding::Void { key, .. }
            | PrimitiveBinding::Bool { key, .. }
            | PrimitiveBinding::Integer { key, .. }
            | PrimitiveBinding::Float { key, .. }
            | PrimitiveBinding::Str { key, .. }
            | PrimitiveBinding::Opaque { key, .. } => *key,
        }
    }
}

/// Passive descriptor table implementing [`HostProtocol`].
#[derive(Default, Debug)]
pub struct Registrations {
    pub primitives: Vec<PrimitiveBinding>,
    pub functions: Vec<FunctionBinding>,
    pub tuples: Vec<AggregateBinding>,
    pub tuple_elements: Vec<ElementBinding>,
    pub structs: Vec<AggregateBinding>,
    pub struct_fields: Vec<ElementBinding>,
    pub smart_pointers: Vec<SmartPtrBinding>,
    pub classes: Vec<ClassBinding>,
    pub constructors: Vec<ConstructorBinding>,
    pub methods: Vec<MethodBinding>,
    pub fields: Vec<FieldBinding>,
    pub class_methods: Vec<MethodBinding>,
    pub enums: Vec<EnumBinding>,
    pub enum_values: Vec<EnumValueBinding>,
    pub interfaces: Vec<InterfaceBinding>,
    class_index: FxHashMap<TypeKey, usize>,
}

impl Registrations {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a registered class by key.
    pub fn class(&self, key: TypeKey) -> Option<&ClassBinding> {
        self.class_index.get(&key).map(|&i| &self.classes[i])
    }

    /// Look up a registered class by boundary name.
    pub fn class_by_name(&self, name: &str) -> Option<&ClassBinding> {
        self.classes.iter().find(|c| c.name == name)
    }

    /// Look up a free function by name.
    pub fn function(&self, name: &str) -> Option<&FunctionBinding> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Look up an instance method by class key and name.
    pub fn method(&self, class: TypeKey, name: &str) -> Option<&MethodBinding> {
        self.methods
            .iter()
            .find(|m| m.class == class && m.name == name)
    }

    /// Look up a class method by class key and name.
    pub fn class_method(&self, class: TypeKey, name: &str) -> Option<&MethodBinding> {
        self.class_methods
            .iter()
            .find(|m| m.class == class && m.name == name)
    }

    /// Look up a class field by class key and name.
    pub fn field(&self, class: TypeKey, name: &str) -> Option<&FieldBinding> {
        self.fields
            .iter()
            .find(|f| f.class == class && f.name == name)
    }

    /// All constructors registered for a class, in declaration order.
    pub fn constructors_of(&self, class: TypeKey) -> impl Iterator<Item = &ConstructorBinding> {
        self.constructors.iter().filter(move |c| c.class == class)
    }

    /// All values registered for an enum, in declaration order.
    pub fn enum_values_of(&self, enum_key: TypeKey) -> impl Iterator<Item = &EnumValueBinding> {
        self.enum_values
            .iter()
            .filter(move |v| v.enum_key == enum_key)
    }

    /// All elements registered for an aggregate, in declaration order.
    pub fn elements_of(&self, aggregate: TypeKey) -> impl Iterator<Item = &ElementBinding> {
        self.tuple_elements
            .iter()
            .chain(self.struct_fields.iter())
            .filter(move |e| e.aggregate == aggregate)
    }

    /// A registered primitive declaration by key.
    pub fn primitive(&self, key: TypeKey) -> Option<&PrimitiveBinding> {
        self.primitives.iter().find(|p| p.key() == key)
    }
}

impl HostProtocol for Registrations {
    fn register_void(&mut self, key: TypeKey, name: &str) {
        self.primitives.push(PrimitiveBinding::Void {
            key,
            name: name.to_owned(),
        });
    }

    fn register_bool(&mut self, key: TypeKey, name: &str, true_value: i64, false_value: i64) {
        self.primitives.push(PrimitiveBinding::Bool {
            key,
            name: name.to_owned(),
            true_value,
            false_value,
        });
    }

    fn register_integer(&mut self, key: TypeKey, name: &str, width: u8, signed: bool) {
        self.primitives.push(PrimitiveBinding::Integer {
            key,
            name: name.to_owned(),
            width,
            signed,
        });
    }

    fn register_float(&mut self, key: TypeKey, name: &str, width: u8) {
        self.primitives.push(PrimitiveBinding::Float {
            key,
            name: name.to_owned(),
            width,
        });
    }

    fn register_string(&mut self, key: TypeKey, name: &str) {
        self.primitives.push(PrimitiveBinding::Str {
            key,
            name: name.to_owned(),
        });
    }

    fn register_opaque(&mut self, key: TypeKey, name: &str) {
        self.primitives.push(PrimitiveBinding::Opaque {
            key,
            name: name.to_owned(),
        });
    }

    fn register_function(&mut self, binding: FunctionBinding) {
        self.functions.push(binding);
    }

    fn register_tuple(&mut self, binding: AggregateBinding) {
        self.tuples.push(binding);
    }

    fn register_tuple_element(&mut self, binding: ElementBinding) {
        self.tuple_elements.push(binding);
    }

    fn register_struct(&mut self, binding: AggregateBinding) {
        self.structs.push(binding);
    }

    fn register_struct_field(&mut self, binding: ElementBinding) {
        self.struct_fields.push(binding);
    }

    fn register_smart_pointer(&mut self, binding: SmartPtrBinding) {
        self.smart_pointers.push(binding);
    }

    fn register_class(&mut self, binding: ClassBinding) {
        self.class_index.insert(binding.key, self.classes.len());
        self.classes.push(binding);
    }

    fn register_class_constructor(&mut self, binding: ConstructorBinding) {
        self.constructors.push(binding);
    }

    fn register_class_method(&mut self, binding: MethodBinding) {
        self.methods.push(binding);
    }

    fn register_class_field(&mut self, binding: FieldBinding) {
        self.fields.push(binding);
    }

    fn register_class_classmethod(&mut self, binding: MethodBinding) {
        self.class_methods.push(binding);
    }

    fn register_enum(&mut self, binding: EnumBinding) {
        self.enums.push(binding);
    }

    fn register_enum_value(&mut self, binding: EnumValueBinding) {
        self.enum_values.push(binding);
    }

    fn register_interface(&mut self, binding: InterfaceBinding) {
        self.interfaces.push(binding);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_key::well_known;

    #[test]
    fn records_primitive_declarations() {
        let mut host = Registrations::new();
        host.register_integer(well_known::INT32, "int32", 4, true);
        host.register_bool(well_known::BOOL, "bool", 1, 0);

        match host.primitive(well_known::INT32) {
            Some(PrimitiveBinding::Integer { width, signed, .. }) => {
                assert_eq!(*width, 4);
                assert!(signed);
            }
            other => panic!("unexpected {other:?}"),
        }
        match host.primitive(well_known::BOOL) {
            Some(PrimitiveBinding::Bool {
                true_value,
                false_value,
                ..
            }) => {
                assert_eq!(*true_value, 1);
                assert_eq!(*false_value, 0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn class_lookup_by_key_and_name() {
        use crate::descriptor::ClassTraits;
        use crate::invoke;

        let key = TypeKey::from_name("Point");
        let mut host = Registrations::new();
        host.register_class(ClassBinding {
            key,
            pointer_key: key.pointer_to(),
            const_pointer_key: key.const_pointer_to(),
            name: "Point".to_owned(),
            traits: ClassTraits::default(),
            destructor: invoke::destructor_invoker(),
        });

        assert!(host.class(key).is_some());
        assert!(host.class_by_name("Point").is_some());
        assert!(host.class(TypeKey::from_name("Other")).is_none());
    }
}
