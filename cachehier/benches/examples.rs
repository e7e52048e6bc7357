use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use cachehier::config::{HierarchyConfig, InclusionPolicy, LevelConfig, ReplacementPolicyConfig};
use cachehier::simulator::Simulator;
use cachehier::util::synthetic_trace;

/// Every replacement policy under every inclusion policy, on the same trace
pub fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Hierarchies");
    // Working set well above L1 and around the size of L2
    let trace = synthetic_trace(50_000, 4096, 64, 42);

    for policy in [
        ReplacementPolicyConfig::LeastRecentlyUsed,
        ReplacementPolicyConfig::FirstInFirstOut,
        ReplacementPolicyConfig::Optimal,
    ] {
        for inclusion in [InclusionPolicy::NonInclusive, InclusionPolicy::Inclusive, InclusionPolicy::Exclusive] {
            let config = HierarchyConfig::new(
                64,
                LevelConfig::new(32 * 1024, 8),
                Some(LevelConfig::new(256 * 1024, 16)),
                policy,
                inclusion,
            );
            group.bench_with_input(
                BenchmarkId::new(policy.to_string(), inclusion.to_string()),
                &config,
                |bench, conf| {
                    bench.iter(|| {
                        Simulator::new(conf, trace.clone()).unwrap().simulate();
                    });
                },
            );
        }
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default().significance_level(0.1).sample_size(10);
    targets = criterion_benchmark
);
criterion_main!(benches);
