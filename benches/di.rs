use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ferrous_support::{Resolver, Semaphore, ServiceCollection};
use std::sync::Arc;

// ===== Resolution Benchmarks =====

fn bench_singleton_hit(c: &mut Criterion) {
    let mut sc = ServiceCollection::new();
    sc.add_singleton(42u64);
    let sp = sc.build();

    // Prime the singleton
    let _ = sp.get::<u64>().unwrap();

    c.bench_function("singleton_hit_u64", |b| {
        b.iter(|| {
            let v = sp.get::<u64>().unwrap();
            black_box(v);
        })
    });
}

fn bench_singleton_cold(c: &mut Criterion) {
    struct ExpensiveToCreate {
        data: Vec<u64>,
    }

    c.bench_function("singleton_cold_expensive", |b| {
        b.iter_batched(
            || {
                let mut sc = ServiceCollection::new();
                sc.add_singleton_factory::<ExpensiveToCreate, _>(|_| ExpensiveToCreate {
                    data: (0..1000).collect(),
                });
                sc.build()
            },
            |sp| {
                let v = sp.get::<ExpensiveToCreate>().unwrap();
                black_box(v.data.len());
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn bench_scoped_vs_transient(c: &mut Criterion) {
    #[derive(Clone)]
    struct Service {
        data: [u8; 64],
    }

    let mut group = c.benchmark_group("scoped_vs_transient");

    // Scoped service
    let mut sc_scoped = ServiceCollection::new();
    sc_scoped.add_scoped_factory::<Service, _>(|_| Service { data: [0; 64] });
    let sp_scoped = sc_scoped.build();
    let scope = sp_scoped.create_scope();

    group.bench_function("scoped_hit", |b| {
        b.iter(|| {
            let v = scope.get::<Service>().unwrap();
            black_box(&v.data);
        })
    });

    // Transient service
    let mut sc_transient = ServiceCollection::new();
    sc_transient.add_transient_factory::<Service, _>(|_| Service { data: [0; 64] });
    let sp_transient = sc_transient.build();

    group.bench_function("transient", |b| {
        b.iter(|| {
            let v = sp_transient.get::<Service>().unwrap();
            black_box(&v.data);
        })
    });

    group.finish();
}

fn bench_dependency_chain(c: &mut Criterion) {
    struct Level0;
    struct Level1 {
        _dep: Arc<Level0>,
    }
    struct Level2 {
        _dep: Arc<Level1>,
    }
    struct Level3 {
        _dep: Arc<Level2>,
    }

    let mut sc = ServiceCollection::new();
    sc.add_singleton(Level0);
    sc.add_singleton_factory::<Level1, _>(|r| Level1 {
        _dep: r.get_required::<Level0>(),
    });
    sc.add_singleton_factory::<Level2, _>(|r| Level2 {
        _dep: r.get_required::<Level1>(),
    });
    sc.add_transient_factory::<Level3, _>(|r| Level3 {
        _dep: r.get_required::<Level2>(),
    });
    let sp = sc.build();

    c.bench_function("transient_over_singleton_chain", |b| {
        b.iter(|| {
            let v = sp.get::<Level3>().unwrap();
            black_box(v);
        })
    });
}

// ===== Synchronization Benchmarks =====

fn bench_semaphore_uncontended(c: &mut Criterion) {
    let semaphore = Semaphore::new(1);

    c.bench_function("semaphore_post_wait_uncontended", |b| {
        b.iter(|| {
            semaphore.wait_then_decrement();
            semaphore.post(1);
        })
    });
}

criterion_group!(
    benches,
    bench_singleton_hit,
    bench_singleton_cold,
    bench_scoped_vs_transient,
    bench_dependency_chain,
    bench_semaphore_uncontended,
);
criterion_main!(benches);
