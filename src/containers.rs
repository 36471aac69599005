//! Container bindings.
//!
//! `register_vector` and `register_map` produce ordinary class bindings
//! over `Vec<T>` and `HashMap<K, V>` so the host sees native sequential and
//! associative containers as indexable objects. Lookups return the defined
//! "no value" sentinel instead of faulting on a missing key or index, and
//! assignment is bounds-checked.

use std::collections::HashMap;
use std::hash::Hash;

use crate::binder::Binder;
use crate::error::BindError;
use crate::type_key::{Bindable, TypeKey};
use crate::wire::{FromWire, ToWire};

impl<T: Bindable> Bindable for Vec<T> {
    fn type_key() -> TypeKey {
        TypeKey::instance(TypeKey::from_name("vector"), &[T::type_key()])
    }
}

impl<K: Bindable, V: Bindable> Bindable for HashMap<K, V> {
    fn type_key() -> TypeKey {
        TypeKey::instance(TypeKey::from_name("map"), &[K::type_key(), V::type_key()])
    }
}

impl<'h> Binder<'h> {
    /// Expose `Vec<T>` as a class with append/length/checked-index/assign
    /// operations.
    pub fn register_vector<T>(&mut self, name: &str) -> Result<&mut Self, BindError>
    where
        T: FromWire + ToWire + Bindable + Clone + Send + Sync,
    {
        self.class::<Vec<T>>(name)
            .constructor(Vec::<T>::new)?
            .method_mut("push_back", |v: &mut Vec<T>, value: T| v.push(value))?
            .method("size", |v: &Vec<T>| v.len() as u32)?
            .method_free("get", |v: &Vec<T>, index: u32| {
                v.get(index as usize).cloned()
            })?
            .method_mut("set", |v: &mut Vec<T>, index: u32, value: T| {
                if let Some(slot) = v.get_mut(index as usize) {
                    *slot = value;
                    true
                } else {
                    false
                }
            })?;
        Ok(self)
    }

    /// Expose `HashMap<K, V>` as a class with length/lookup/assign
    /// operations.
    pub fn register_map<K, V>(&mut self, name: &str) -> Result<&mut Self, BindError>
    where
        K: FromWire + ToWire + Bindable + Eq + Hash + Clone + Send + Sync,
        V: FromWire + ToWire + Bindable + Clone + Send + Sync,
    {
        self.class::<HashMap<K, V>>(name)
            .constructor(HashMap::<K, V>::new)?
            .method("size", |m: &HashMap<K, V>| m.len() as u32)?
            .method_free("get", |m: &HashMap<K, V>, key: K| m.get(&key).cloned())?
            .method_mut("set", |m: &mut HashMap<K, V>, key: K, value: V| {
                m.insert(key, value);
            })?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::InstanceArena;
    use crate::invoke::InvokerKind;
    use crate::protocol::Registrations;
    use crate::wire::WireValue;

    fn bind_int_vector(host: &mut Registrations) {
        let mut binder = Binder::new(host);
        binder.register_vector::<i32>("IntVector").unwrap();
    }

    #[test]
    fn vector_key_depends_on_element() {
        assert_ne!(<Vec<i32>>::type_key(), <Vec<i64>>::type_key());
        assert_ne!(<Vec<i32>>::type_key(), i32::type_key());
    }

    #[test]
    fn map_key_depends_on_both_parameters() {
        assert_ne!(
            <HashMap<String, i32>>::type_key(),
            <HashMap<i32, String>>::type_key()
        );
    }

    #[test]
    fn vector_operations_behave_as_sequence() {
        let mut host = Registrations::new();
        bind_int_vector(&mut host);

        let key = <Vec<i32>>::type_key();
        assert!(host.class_by_name("IntVector").is_some());

        let mut arena = InstanceArena::new();
        let ret = host
            .constructors_of(key)
            .next()
            .unwrap()
            .invoker
            .call(&mut arena, None, &[])
            .unwrap();
        let WireValue::Object(token) = ret else {
            panic!("expected token");
        };

        let push = host.method(key, "push_back").unwrap();
        push.invoker
            .call(&mut arena, Some(token), &[WireValue::Int(5)])
            .unwrap();
        push.invoker
            .call(&mut arena, Some(token), &[WireValue::Int(6)])
            .unwrap();

        let size = host.method(key, "size").unwrap();
        let ret = size.invoker.call(&mut arena, Some(token), &[]).unwrap();
        assert!(matches!(ret, WireValue::Int(2)));

        let get = host.method(key, "get").unwrap();
        assert_eq!(get.kind, InvokerKind::FreeMethod);
        let ret = get
            .invoker
            .call(&mut arena, Some(token), &[WireValue::Int(1)])
            .unwrap();
        assert!(matches!(ret, WireValue::Int(6)));

        let set = host.method(key, "set").unwrap();
        let ret = set
            .invoker
            .call(
                &mut arena,
                Some(token),
                &[WireValue::Int(0), WireValue::Int(50)],
            )
            .unwrap();
        assert!(matches!(ret, WireValue::Bool(true)));
        assert_eq!(arena.get::<Vec<i32>>(token).unwrap()[0], 50);
    }

    #[test]
    fn vector_out_of_bounds_get_returns_null() {
        let mut host = Registrations::new();
        bind_int_vector(&mut host);

        let key = <Vec<i32>>::type_key();
        let mut arena = InstanceArena::new();
        let token = arena.alloc(vec![1i32]);

        let ret = host
            .method(key, "get")
            .unwrap()
            .invoker
            .call(&mut arena, Some(token), &[WireValue::Int(9)])
            .unwrap();
        assert!(ret.is_null());
    }

    #[test]
    fn vector_out_of_bounds_set_reports_failure() {
        let mut host = Registrations::new();
        bind_int_vector(&mut host);

        let key = <Vec<i32>>::type_key();
        let mut arena = InstanceArena::new();
        let token = arena.alloc(vec![1i32]);

        let ret = host
            .method(key, "set")
            .unwrap()
            .invoker
            .call(
                &mut arena,
                Some(token),
                &[WireValue::Int(9), WireValue::Int(0)],
            )
            .unwrap();
        assert!(matches!(ret, WireValue::Bool(false)));
        assert_eq!(*arena.get::<Vec<i32>>(token).unwrap(), vec![1]);
    }

    #[test]
    fn map_operations_behave_as_association() {
        let mut host = Registrations::new();
        {
            let mut binder = Binder::new(&mut host);
            binder.register_map::<String, i32>("ScoreMap").unwrap();
        }

        let key = <HashMap<String, i32>>::type_key();
        let mut arena = InstanceArena::new();
        let ret = host
            .constructors_of(key)
            .next()
            .unwrap()
            .invoker
            .call(&mut arena, None, &[])
            .unwrap();
        let WireValue::Object(token) = ret else {
            panic!("expected token");
        };

        let set = host.method(key, "set").unwrap();
        set.invoker
            .call(
                &mut arena,
                Some(token),
                &[WireValue::Str("a".into()), WireValue::Int(1)],
            )
            .unwrap();

        let get = host.method(key, "get").unwrap();
        let ret = get
            .invoker
            .call(&mut arena, Some(token), &[WireValue::Str("a".into())])
            .unwrap();
        assert!(matches!(ret, WireValue::Int(1)));

        let ret = get
            .invoker
            .call(&mut arena, Some(token), &[WireValue::Str("missing".into())])
            .unwrap();
        assert!(ret.is_null());

        let size = host.method(key, "size").unwrap();
        let ret = size.invoker.call(&mut arena, Some(token), &[]).unwrap();
        assert!(matches!(ret, WireValue::Int(1)));
    }
}
