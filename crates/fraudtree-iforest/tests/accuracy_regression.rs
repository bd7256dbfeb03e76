//! Accuracy regression tests for fraudtree-iforest.
//!
//! These tests verify that algorithmic changes do not degrade outlier
//! separation on deterministic synthetic datasets.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use fraudtree_iforest::{AnomalyThreshold, IsolationForestConfig};

// ---------------------------------------------------------------------------
// Helper: deterministic clustered dataset with far outliers
// ---------------------------------------------------------------------------

/// 1000 points uniform in `[0, 1]^4` followed by 10 outliers far outside the
/// cluster, each at a distinct location.
fn make_clustered_with_outliers() -> (Vec<Vec<f64>>, usize) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut features: Vec<Vec<f64>> = (0..1000)
        .map(|_| (0..4).map(|_| rng.r#gen::<f64>()).collect())
        .collect();
    let n_normal = features.len();
    for k in 0..10 {
        features.push(
            (0..4)
                .map(|j| 50.0 + 7.0 * k as f64 + 3.0 * j as f64)
                .collect(),
        );
    }
    (features, n_normal)
}

// ---------------------------------------------------------------------------
// a) outlier_separation
// ---------------------------------------------------------------------------

/// At least 8 of 10 outliers score above 0.6 and at least 95% of the cluster
/// scores below 0.6.
#[test]
fn outlier_separation() {
    let (features, n_normal) = make_clustered_with_outliers();
    let forest = IsolationForestConfig::new(50)
        .unwrap()
        .with_sample_size(256)
        .fit(&features)
        .unwrap();
    let scores = forest.score_batch(&features).unwrap();

    let (normal, outliers) = scores.split_at(n_normal);
    let outliers_high = outliers.iter().filter(|&&s| s > 0.6).count();
    let normal_low = normal.iter().filter(|&&s| s < 0.6).count();

    assert!(outliers_high >= 8, "only {outliers_high}/10 outliers above 0.6");
    assert!(
        normal_low as f64 >= 0.95 * n_normal as f64,
        "only {normal_low}/{n_normal} normal points below 0.6"
    );
}

// ---------------------------------------------------------------------------
// b) score_range
// ---------------------------------------------------------------------------

#[test]
fn scores_in_unit_interval() {
    let (features, _) = make_clustered_with_outliers();
    let forest = IsolationForestConfig::new(20).unwrap().fit(&features).unwrap();
    for s in forest.score_batch(&features).unwrap() {
        assert!(s > 0.0 && s <= 1.0, "score {s} outside (0, 1]");
    }
}

// ---------------------------------------------------------------------------
// c) determinism
// ---------------------------------------------------------------------------

#[test]
fn same_seed_same_forest() {
    let (features, _) = make_clustered_with_outliers();
    let config = IsolationForestConfig::new(30).unwrap().with_seed(7);
    let a = config.fit(&features).unwrap();
    let b = config.fit(&features).unwrap();
    assert_eq!(a, b);
    assert_eq!(
        a.score_batch(&features).unwrap(),
        b.score_batch(&features).unwrap()
    );
}

#[test]
fn deterministic_across_thread_counts() {
    let (features, _) = make_clustered_with_outliers();
    let config = IsolationForestConfig::new(16).unwrap().with_seed(3);
    let single = rayon::ThreadPoolBuilder::new()
        .num_threads(1)
        .build()
        .unwrap()
        .install(|| config.fit(&features).unwrap());
    let many = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .unwrap()
        .install(|| config.fit(&features).unwrap());
    assert_eq!(single, many);
}

// ---------------------------------------------------------------------------
// d) boundaries
// ---------------------------------------------------------------------------

/// A single record yields single-leaf trees, depth 0, and score 1.
#[test]
fn single_record_dataset() {
    let features = vec![vec![12.5, 3.0, 40.0, 23.0]];
    let forest = IsolationForestConfig::new(5).unwrap().fit(&features).unwrap();
    assert!(forest.trees().iter().all(|t| t.root().is_leaf()));
    let score = forest.score(&features[0]).unwrap();
    assert_eq!(score, 1.0);
    assert!(forest.detect(&features[0], AnomalyThreshold::DEFAULT).unwrap());
}

/// Detection at the threshold boundary is inclusive.
#[test]
fn detect_batch_matches_scores() {
    let (features, _) = make_clustered_with_outliers();
    let forest = IsolationForestConfig::new(20).unwrap().fit(&features).unwrap();
    let threshold = AnomalyThreshold::new(0.6).unwrap();
    let scores = forest.score_batch(&features).unwrap();
    let flags = forest.detect_batch(&features, threshold).unwrap();
    for (s, f) in scores.iter().zip(&flags) {
        assert_eq!(*f, *s >= 0.6);
    }
}
