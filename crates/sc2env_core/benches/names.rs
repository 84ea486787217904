//! Name normalization benchmarks for sc2env_core.
//!
//! Run with: `cargo bench -p sc2env_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sc2env_core::names::crop_and_deduplicate_names;

/// Benchmarks cropping and de-duplicating a batch of agent names.
pub fn names_benchmark(c: &mut Criterion) {
    let unique: Vec<String> = (0..64).map(|i| format!("agent_{i}")).collect();
    let repeated: Vec<String> = (0..64)
        .map(|i| format!("very_long_agent_name_experimental_{}", i % 4))
        .collect();

    c.bench_function("names_unique_64", |b| {
        b.iter(|| crop_and_deduplicate_names(black_box(&unique)))
    });
    c.bench_function("names_repeated_64", |b| {
        b.iter(|| crop_and_deduplicate_names(black_box(&repeated)))
    });
}

criterion_group!(benches, names_benchmark);
criterion_main!(benches);
