use ballot::{BallotRegistry, Identity, NotificationLog, SharedRegistry, TracingSink};
use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;
use std::thread;

/// Registry operation benchmarks against both shipped sinks
fn bench_registry_operations(c: &mut Criterion) {
    let owner = Identity::from_label("bench-owner");
    let voter = Identity::from_label("bench-voter");

    let mut group = c.benchmark_group("registry_operations");

    group.bench_function("vote_tracing_sink", |b| {
        let mut registry = BallotRegistry::new(owner, Arc::new(TracingSink));
        b.iter(|| registry.vote(black_box(&voter), black_box(1)).unwrap())
    });

    group.bench_function("vote_notification_log", |b| {
        let mut registry = BallotRegistry::new(owner, Arc::new(NotificationLog::new("bench")));
        b.iter(|| registry.vote(black_box(&voter), black_box(2)).unwrap())
    });

    group.bench_function("vote_rejected", |b| {
        let mut registry = BallotRegistry::new(owner, Arc::new(TracingSink));
        b.iter(|| registry.vote(black_box(&voter), black_box(99)).is_err())
    });

    group.bench_function("add_candidate", |b| {
        let mut registry = BallotRegistry::new(owner, Arc::new(TracingSink));
        b.iter(|| registry.add_candidate(black_box(&owner), black_box("Carol")).unwrap())
    });

    for candidates in [10u64, 100, 1000] {
        group.bench_with_input(
            BenchmarkId::new("reset_votes", candidates),
            &candidates,
            |b, &candidates| {
                b.iter_batched(
                    || {
                        let mut registry = BallotRegistry::new(owner, Arc::new(TracingSink));
                        for i in 0..candidates {
                            registry.add_candidate(&owner, format!("c{i}")).unwrap();
                            registry.vote(&voter, i + 1).unwrap();
                        }
                        registry
                    },
                    |mut registry| registry.reset_votes(black_box(&owner)).unwrap(),
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

/// Contended voting through the shared handle
fn bench_shared_voting(c: &mut Criterion) {
    let owner = Identity::from_label("bench-owner");

    let mut group = c.benchmark_group("shared_voting");

    for threads in [1usize, 4, 8] {
        group.bench_with_input(BenchmarkId::new("threads", threads), &threads, |b, &threads| {
            let shared = SharedRegistry::new(BallotRegistry::new(owner, Arc::new(TracingSink)));
            b.iter(|| {
                let handles: Vec<_> = (0..threads)
                    .map(|i| {
                        let shared = shared.clone();
                        thread::spawn(move || {
                            let voter = Identity::from_label(&format!("voter-{i}"));
                            for _ in 0..100 {
                                shared.vote(&voter, 1 + (i as u64 % 2)).unwrap();
                            }
                        })
                    })
                    .collect();

                for handle in handles {
                    handle.join().unwrap();
                }
            })
        });
    }

    group.finish();
}

/// Hash chain verification cost as the log grows
fn bench_log_integrity(c: &mut Criterion) {
    let owner = Identity::from_label("bench-owner");

    let mut group = c.benchmark_group("notification_log");

    for records in [100u64, 1000] {
        let log = Arc::new(NotificationLog::new("bench"));
        let mut registry = BallotRegistry::new(owner, log.clone());
        for i in 0..records {
            registry.vote(&owner, i % 2 + 1).unwrap();
        }

        group.bench_with_input(BenchmarkId::new("verify_integrity", records), &log, |b, log| {
            b.iter(|| black_box(log.verify_integrity().unwrap()))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_registry_operations,
    bench_shared_voting,
    bench_log_integrity
);

criterion_main!(benches);
