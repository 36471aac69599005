//! Performance benchmarks for binding registration and trampoline dispatch.
//!
//! This benchmark suite measures the two phases of the crate's life:
//! - Registration: declaring bindings against a recording host
//! - Dispatch: driving the synthesized trampolines with wire arguments
//!
//! Run with the `profiling` feature to annotate the invoker call path:
//!
//! ```bash
//! cargo bench --features profiling
//! ```

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use wirebind::{Bindable, Binder, InstanceArena, Registrations, WireValue};

#[derive(Clone, Debug, PartialEq)]
struct Particle {
    x: f64,
    y: f64,
    charge: i32,
}
impl Bindable for Particle {}

impl Particle {
    fn new(x: f64, y: f64, charge: i32) -> Self {
        Self { x, y, charge }
    }

    fn distance_sq(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    fn scale(&mut self, by: f64) {
        self.x *= by;
        self.y *= by;
    }
}

fn bind_particle(host: &mut Registrations) {
    let mut binder = Binder::new(host);
    binder
        .function("lerp", |a: f64, b: f64, t: f64| a + (b - a) * t)
        .unwrap();
    binder
        .class::<Particle>("Particle")
        .constructor(Particle::new)
        .unwrap()
        .method("distance_sq", Particle::distance_sq)
        .unwrap()
        .method_mut("scale", |p: &mut Particle, by: f64| p.scale(by))
        .unwrap()
        .field(
            "charge",
            |p: &Particle| p.charge,
            |p: &mut Particle, v| p.charge = v,
        )
        .unwrap();
}

/// Benchmark the registration phase: primitives plus user declarations.
fn registration_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("bindings/registration");

    // Baseline: the standard primitive set alone
    group.bench_function("standard_primitives", |b| {
        b.iter(|| {
            let mut host = Registrations::new();
            let _ = Binder::new(&mut host);
            black_box(host.primitives.len())
        });
    });

    // Typical: one function, one class with members
    group.bench_function("class_with_members", |b| {
        b.iter(|| {
            let mut host = Registrations::new();
            bind_particle(&mut host);
            black_box(host.methods.len())
        });
    });

    // Wide: container and enum declarations on top
    group.bench_function("full_surface", |b| {
        b.iter(|| {
            let mut host = Registrations::new();
            let mut binder = Binder::new(&mut host);
            binder.register_vector::<i32>("IntVector").unwrap();
            binder.register_map::<String, i32>("ScoreMap").unwrap();
            struct Flag;
            impl Bindable for Flag {}
            binder
                .enumeration::<Flag>("Flag")
                .auto_value("Off")
                .unwrap()
                .auto_value("On")
                .unwrap();
            black_box(host.classes.len())
        });
    });

    group.finish();
}

/// Benchmark trampoline dispatch against the direct native call.
fn dispatch_benchmarks(c: &mut Criterion) {
    let mut host = Registrations::new();
    bind_particle(&mut host);

    let mut group = c.benchmark_group("bindings/dispatch");

    // Free function: three float conversions in, one out
    let lerp = host.function("lerp").unwrap();
    group.bench_function("free_function", |b| {
        let mut arena = InstanceArena::new();
        let args = [
            WireValue::Float(0.0),
            WireValue::Float(10.0),
            WireValue::Float(0.25),
        ];
        b.iter(|| {
            let ret = lerp.invoker.call(&mut arena, None, black_box(&args)).unwrap();
            black_box(ret)
        });
    });

    // Const method: owner lookup plus one conversion out
    group.bench_function("const_method", |b| {
        let mut arena = InstanceArena::new();
        let token = arena.alloc(Particle::new(3.0, 4.0, 1));
        let method = host.method(Particle::type_key(), "distance_sq").unwrap();
        b.iter(|| {
            let ret = method
                .invoker
                .call(&mut arena, Some(black_box(token)), &[])
                .unwrap();
            black_box(ret)
        });
    });

    // Mutable method: exclusive owner access
    group.bench_function("mut_method", |b| {
        let mut arena = InstanceArena::new();
        let token = arena.alloc(Particle::new(1.0, 1.0, 0));
        let method = host.method(Particle::type_key(), "scale").unwrap();
        let args = [WireValue::Float(1.0)];
        b.iter(|| {
            let ret = method
                .invoker
                .call(&mut arena, Some(token), black_box(&args))
                .unwrap();
            black_box(ret)
        });
    });

    // Field accessors: get then set through the registered pair
    group.bench_function("field_roundtrip", |b| {
        let mut arena = InstanceArena::new();
        let token = arena.alloc(Particle::new(0.0, 0.0, 5));
        let field = host.field(Particle::type_key(), "charge").unwrap();
        b.iter(|| {
            let read = field.getter.call(&mut arena, Some(token), &[]).unwrap();
            field
                .setter
                .call(&mut arena, Some(token), &[black_box(read)])
                .unwrap();
        });
    });

    // Lifecycle: construct then destruct one instance per iteration
    group.bench_function("construct_destruct", |b| {
        let mut arena = InstanceArena::new();
        let ctor = host.constructors_of(Particle::type_key()).next().unwrap();
        let class = host.class(Particle::type_key()).unwrap();
        let args = [
            WireValue::Float(1.0),
            WireValue::Float(2.0),
            WireValue::Int(3),
        ];
        b.iter(|| {
            let ret = ctor.invoker.call(&mut arena, None, black_box(&args)).unwrap();
            let WireValue::Object(token) = ret else {
                unreachable!()
            };
            class.destructor.call(&mut arena, Some(token), &[]).unwrap();
        });
    });

    group.finish();
}

/// Benchmark the container bindings under sequential load.
fn container_benchmarks(c: &mut Criterion) {
    let mut host = Registrations::new();
    {
        let mut binder = Binder::new(&mut host);
        binder.register_vector::<i32>("IntVector").unwrap();
    }
    let key = <Vec<i32>>::type_key();

    let mut group = c.benchmark_group("bindings/containers");

    // Append 100 elements through the push_back trampoline
    group.bench_function("vector_push_100", |b| {
        let push = host.method(key, "push_back").unwrap();
        b.iter(|| {
            let mut arena = InstanceArena::new();
            let token = arena.alloc(Vec::<i32>::new());
            for i in 0..100 {
                push.invoker
                    .call(&mut arena, Some(token), &[WireValue::Int(i)])
                    .unwrap();
            }
            black_box(arena.get::<Vec<i32>>(token).unwrap().len())
        });
    });

    // Checked index reads, in and out of bounds
    group.bench_function("vector_get", |b| {
        let mut arena = InstanceArena::new();
        let token = arena.alloc((0..100).collect::<Vec<i32>>());
        let get = host.method(key, "get").unwrap();
        b.iter(|| {
            let hit = get
                .invoker
                .call(&mut arena, Some(token), &[WireValue::Int(50)])
                .unwrap();
            let miss = get
                .invoker
                .call(&mut arena, Some(token), &[WireValue::Int(500)])
                .unwrap();
            black_box((hit, miss))
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    registration_benchmarks,
    dispatch_benchmarks,
    container_benchmarks
);

criterion_main!(benches);
