use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use revocation_filters::cuckoo::{VacuumFilter, VacuumPair};

fn bench_insert(c: &mut Criterion) {
    let mut initial_items = 0u64;
    while initial_items < 4096 - 128 {
        c.bench_function(&format!("bench insert {}", initial_items), |b| {
            b.iter_batched_ref(
                || {
                    let mut filter = VacuumFilter::<u64>::new(4096);
                    for key in 0..initial_items {
                        let _ = filter.insert(&key);
                    }
                    filter
                },
                |filter| filter.insert(&0xDEAD_BEEF),
                BatchSize::PerIteration,
            )
        });
        initial_items += 512;
    }
}

fn bench_contains(c: &mut Criterion) {
    let mut filter = VacuumFilter::<u64>::new(4096);
    for key in 0u64..3800 {
        let _ = filter.insert(&key);
    }
    c.bench_function("bench contains", |b| b.iter(|| filter.contains(&1900u64)));
}

fn bench_pair_build(c: &mut Criterion) {
    let revoked = (0u64..1000).map(|key| key * 2).collect::<Vec<_>>();
    let unrevoked = (0u64..4000).map(|key| key * 2 + 1).collect::<Vec<_>>();
    c.bench_function("bench pair build", |b| {
        b.iter_batched_ref(
            || (revoked.clone(), unrevoked.clone()),
            |(revoked, unrevoked)| VacuumPair::new(revoked.clone(), unrevoked),
            BatchSize::PerIteration,
        )
    });
}

criterion_group!(benches, bench_insert, bench_contains, bench_pair_build);
criterion_main!(benches);
