//! Resolution benchmarks
//!
//! Measures factory, singleton and autowired resolution, including deep
//! constructor chains built from runtime descriptors.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use elif_container::container::ConstructorParam;
use elif_container::{Concrete, Container, Instance, TypeDescriptor};

fn chain_container(depth: usize) -> Container {
    let container = Container::new();
    for i in 0..depth {
        let params = if i + 1 < depth {
            vec![ConstructorParam::service_id("next", format!("bench::Node{}", i + 1))]
        } else {
            Vec::new()
        };
        container
            .register_descriptor(TypeDescriptor::concrete(
                format!("bench::Node{}", i),
                params,
                move |_| Ok(Instance::new(i)),
            ))
            .expect("register node");
    }
    container
}

fn benchmark_bindings(c: &mut Criterion) {
    let mut group = c.benchmark_group("bindings");

    let container = Container::new();
    container
        .bind_factory("transient", |_, _| Ok(Instance::new(42u64)))
        .expect("bind transient");
    container
        .singleton("shared", Some(Concrete::instance(42u64)))
        .expect("bind singleton");
    container.alias("shared", "alias").expect("alias");

    group.bench_function("transient_factory", |b| {
        b.iter(|| black_box(container.make("transient").expect("make")))
    });
    group.bench_function("cached_singleton", |b| {
        b.iter(|| black_box(container.make("shared").expect("make")))
    });
    group.bench_function("aliased_singleton", |b| {
        b.iter(|| black_box(container.make("alias").expect("make")))
    });
    group.bench_function("reserved_config", |b| {
        b.iter(|| black_box(container.make("config").expect("make")))
    });

    group.finish();
}

fn benchmark_autowiring(c: &mut Criterion) {
    let mut group = c.benchmark_group("autowiring");

    for depth in [1usize, 4, 16, 64].iter() {
        let container = chain_container(*depth);
        group.bench_with_input(BenchmarkId::new("linear_chain", depth), depth, |b, _| {
            b.iter(|| black_box(container.make("bench::Node0").expect("make")))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_bindings, benchmark_autowiring);
criterion_main!(benches);
