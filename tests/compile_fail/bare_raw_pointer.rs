//! A bare raw pointer argument must not satisfy the binding traits;
//! exposure requires the RawPtr wrapper plus a policy.

use wirebind::{Binder, Registrations};

fn main() {
    let mut host = Registrations::new();
    let mut binder = Binder::new(&mut host);
    binder
        .function("leak", |p: *mut i32| p as usize as i64)
        .unwrap();
}
