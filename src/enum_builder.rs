//! Enum bindings.
//!
//! Declaring the builder emits the enum descriptor; each `value` call emits
//! one value descriptor. Values travel in a fixed i64 slot, so an enum with
//! a wider underlying representation cannot be registered without an
//! explicit caller-side cast.

use std::marker::PhantomData;

use crate::binder::Binder;
use crate::descriptor::{EnumBinding, EnumValueBinding};
use crate::error::BindError;
use crate::type_key::Bindable;

/// Builder for one enum registration.
pub struct EnumBuilder<'b, 'h, E> {
    binder: &'b mut Binder<'h>,
    name: String,
    seen: Vec<String>,
    next_value: i64,
    _marker: PhantomData<fn() -> E>,
}

impl<'b, 'h, E> std::fmt::Debug for EnumBuilder<'b, 'h, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnumBuilder")
            .field("name", &self.name)
            .field("seen", &self.seen)
            .field("next_value", &self.next_value)
            .finish_non_exhaustive()
    }
}

impl<'b, 'h, E> EnumBuilder<'b, 'h, E>
where
    E: Bindable,
{
    pub(crate) fn declare(binder: &'b mut Binder<'h>, name: &str) -> Self {
        binder.host().register_enum(EnumBinding {
            key: E::type_key(),
            name: name.to_owned(),
        });
        Self {
            binder,
            name: name.to_owned(),
            seen: Vec::new(),
            next_value: 0,
            _marker: PhantomData,
        }
    }

    /// Declare a value with an explicit discriminant.
    pub fn value(mut self, name: &str, value: i64) -> Result<Self, BindError> {
        if self.seen.iter().any(|n| n == name) {
            return Err(BindError::DuplicateEnumValue {
                enum_name: self.name.clone(),
                name: name.to_owned(),
            });
        }
        self.seen.push(name.to_owned());
        self.next_value = value + 1;
        self.binder.host().register_enum_value(EnumValueBinding {
            enum_key: E::type_key(),
            name: name.to_owned(),
            value,
        });
        Ok(self)
    }

    /// Declare a value continuing the auto-increment sequence.
    pub fn auto_value(self, name: &str) -> Result<Self, BindError> {
        let value = self.next_value;
        self.value(name, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Registrations;

    #[derive(Clone, Copy)]
    #[repr(i32)]
    enum Color {
        Red = 0,
        Green = 1,
        Blue = 4,
    }
    impl Bindable for Color {}

    #[test]
    fn registered_values_match_native_discriminants() {
        let mut host = Registrations::new();
        {
            let mut binder = Binder::new(&mut host);
            binder
                .enumeration::<Color>("Color")
                .value("Red", Color::Red as i64)
                .unwrap()
                .value("Green", Color::Green as i64)
                .unwrap()
                .value("Blue", Color::Blue as i64)
                .unwrap();
        }

        assert_eq!(host.enums[0].name, "Color");
        assert_eq!(host.enums[0].key, Color::type_key());

        let values: Vec<_> = host.enum_values_of(Color::type_key()).collect();
        assert_eq!(values.len(), 3);
        assert_eq!(values[0].value, Color::Red as i64);
        assert_eq!(values[1].value, Color::Green as i64);
        assert_eq!(values[2].value, Color::Blue as i64);
    }

    #[test]
    fn auto_values_continue_the_sequence() {
        enum Direction {}
        impl Bindable for Direction {}

        let mut host = Registrations::new();
        {
            let mut binder = Binder::new(&mut host);
            binder
                .enumeration::<Direction>("Direction")
                .auto_value("North")
                .unwrap()
                .auto_value("East")
                .unwrap()
                .value("South", 10)
                .unwrap()
                .auto_value("West")
                .unwrap();
        }

        let values: Vec<_> = host.enum_values_of(Direction::type_key()).collect();
        assert_eq!(values[0].value, 0);
        assert_eq!(values[1].value, 1);
        assert_eq!(values[2].value, 10);
        assert_eq!(values[3].value, 11);
    }

    #[test]
    fn duplicate_value_names_are_rejected() {
        let mut host = Registrations::new();
        let mut binder = Binder::new(&mut host);
        let err = binder
            .enumeration::<Color>("Color")
            .value("Red", 0)
            .unwrap()
            .value("Red", 1)
            .unwrap_err();

        assert!(matches!(err, BindError::DuplicateEnumValue { .. }));
    }
}
