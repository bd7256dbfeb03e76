use rand::Rng;
use rand::seq::index;

use crate::node::{FeatureIndex, Impurity};

/// Number of uniformly drawn thresholds tried per candidate feature.
pub(crate) const THRESHOLD_DRAWS: usize = 10;

/// Gini impurity `1 - Σ(p_i²)` of a node from its class counts.
///
/// Returns [`Impurity::new(0.0)`] when `n_samples` is zero.
#[must_use]
pub fn gini(class_counts: &[usize], n_samples: usize) -> Impurity {
    if n_samples == 0 {
        return Impurity::new(0.0);
    }
    let n = n_samples as f64;
    let sum_sq: f64 = class_counts
        .iter()
        .map(|&c| {
            let p = c as f64 / n;
            p * p
        })
        .sum();
    Impurity::new(1.0 - sum_sq)
}

/// Size-weighted Gini of a two-way partition: `(|L|/n)·gini(L) + (|R|/n)·gini(R)`.
///
/// Total over its inputs: returns `0.0` when both sides are empty, matching
/// [`gini`] on an empty node.
#[must_use]
pub fn weighted_gini(low_counts: &[usize], n_low: usize, high_counts: &[usize], n_high: usize) -> f64 {
    let n = (n_low + n_high) as f64;
    if n == 0.0 {
        return 0.0;
    }
    (n_low as f64 / n) * gini(low_counts, n_low).value()
        + (n_high as f64 / n) * gini(high_counts, n_high).value()
}

/// The committed split for a node.
#[derive(Debug, Clone)]
pub(crate) struct SplitResult {
    /// Feature used for the split.
    pub(crate) feature: FeatureIndex,
    /// Threshold value; `value < threshold` goes low.
    pub(crate) threshold: f64,
    /// Weighted Gini of the resulting partition.
    pub(crate) weighted_impurity: f64,
    /// Sample indices routed low.
    pub(crate) low_indices: Vec<usize>,
    /// Sample indices routed high.
    pub(crate) high_indices: Vec<usize>,
}

/// Search a random feature subset for the lowest weighted-Gini split.
///
/// Picks `feature_subset_size` features without replacement. Each feature
/// that is constant over the node is skipped; otherwise
/// [`THRESHOLD_DRAWS`] thresholds are drawn uniformly from its observed
/// range and scored. Thresholds that leave a side empty are skipped.
///
/// Returns `None` when no candidate produced a two-sided partition.
///
/// # Column-major layout
///
/// `columns[feature_idx][sample_idx]`; `sample_indices` index into the
/// inner vectors.
pub(crate) fn find_random_split(
    columns: &[Vec<f64>],
    labels: &[usize],
    sample_indices: &[usize],
    n_classes: usize,
    feature_subset_size: usize,
    rng: &mut impl Rng,
) -> Option<SplitResult> {
    let n_features = columns.len();
    if sample_indices.is_empty() || n_features == 0 {
        return None;
    }

    let take = feature_subset_size.min(n_features);
    let selected = index::sample(rng, n_features, take).into_vec();

    let mut best_impurity = f64::INFINITY;
    let mut best: Option<(FeatureIndex, f64)> = None;
    let mut low_counts = vec![0usize; n_classes];
    let mut high_counts = vec![0usize; n_classes];

    for feat_idx in selected {
        let column = &columns[feat_idx];
        let (min, max) = sample_indices
            .iter()
            .map(|&si| column[si])
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        if min == max {
            continue;
        }

        for _ in 0..THRESHOLD_DRAWS {
            let threshold = min + rng.r#gen::<f64>() * (max - min);
            if !(threshold.is_finite() && min < threshold && threshold < max) {
                continue;
            }

            low_counts.iter_mut().for_each(|c| *c = 0);
            high_counts.iter_mut().for_each(|c| *c = 0);
            let mut n_low = 0usize;
            for &si in sample_indices {
                if column[si] < threshold {
                    low_counts[labels[si]] += 1;
                    n_low += 1;
                } else {
                    high_counts[labels[si]] += 1;
                }
            }
            let n_high = sample_indices.len() - n_low;
            if n_low == 0 || n_high == 0 {
                continue;
            }

            let impurity = weighted_gini(&low_counts, n_low, &high_counts, n_high);
            if impurity < best_impurity {
                best_impurity = impurity;
                best = Some((FeatureIndex::new(feat_idx), threshold));
            }
        }
    }

    let (feature, threshold) = best?;

    let column = &columns[feature.index()];
    let (low_indices, high_indices): (Vec<usize>, Vec<usize>) = sample_indices
        .iter()
        .partition(|&&si| column[si] < threshold);

    Some(SplitResult {
        feature,
        threshold,
        weighted_impurity: best_impurity,
        low_indices,
        high_indices,
    })
}
