use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use revocation_filters::bloom::BloomCascade;

fn bench_build(c: &mut Criterion) {
    let revoked = (0u64..1000).map(|key| key * 2).collect::<Vec<_>>();
    let unrevoked = (0u64..10_000).map(|key| key * 2 + 1).collect::<Vec<_>>();
    c.bench_function("bench cascade build", |b| {
        b.iter_batched_ref(
            || (),
            |_| BloomCascade::from_sets(&revoked, &unrevoked),
            BatchSize::PerIteration,
        )
    });
}

fn bench_contains(c: &mut Criterion) {
    let revoked = (0u64..1000).map(|key| key * 2).collect::<Vec<_>>();
    let unrevoked = (0u64..10_000).map(|key| key * 2 + 1).collect::<Vec<_>>();
    let cascade = BloomCascade::from_sets(&revoked, &unrevoked).unwrap();
    c.bench_function("bench cascade contains revoked", |b| {
        b.iter(|| cascade.contains(&500u64))
    });
    c.bench_function("bench cascade contains unrevoked", |b| {
        b.iter(|| cascade.contains(&501u64))
    });
}

criterion_group!(benches, bench_build, bench_contains);
criterion_main!(benches);
