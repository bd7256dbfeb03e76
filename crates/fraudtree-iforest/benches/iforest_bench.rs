//! Criterion benchmarks for fraudtree-iforest: training and batch scoring.

use criterion::{Criterion, criterion_group, criterion_main};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use fraudtree_iforest::IsolationForestConfig;

fn make_transactions(n_samples: usize, seed: u64) -> Vec<Vec<f64>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n_samples)
        .map(|_| {
            vec![
                rng.r#gen::<f64>() * 150.0,
                rng.r#gen::<f64>() * 120.0,
                18.0 + rng.r#gen::<f64>() * 70.0,
                f64::from(rng.gen_range(0u32..24)),
            ]
        })
        .collect()
}

fn bench_train(c: &mut Criterion) {
    let features = make_transactions(10_000, 42);
    let config = IsolationForestConfig::new(120).unwrap();

    c.bench_function("iforest_train_10000x4_120trees", |b| {
        b.iter(|| config.fit(&features).unwrap());
    });
}

fn bench_score(c: &mut Criterion) {
    let features = make_transactions(10_000, 42);
    let forest = IsolationForestConfig::new(120).unwrap().fit(&features).unwrap();

    c.bench_function("iforest_score_batch_10000", |b| {
        b.iter(|| forest.score_batch(&features).unwrap());
    });
}

criterion_group!(benches, bench_train, bench_score);
criterion_main!(benches);
