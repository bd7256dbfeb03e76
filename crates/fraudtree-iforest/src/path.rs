//! Analytic path-length normalization.

/// Euler–Mascheroni constant.
pub const EULER_GAMMA: f64 = 0.577_215_664_9;

/// Expected path length of an unsuccessful search in a binary search tree
/// built from `n` items:
///
/// `c(n) = 2·(ln(n−1) + γ) − 2·(n−1)/n` for `n > 1`, else `0`.
///
/// Added at a leaf to account for the samples that were never isolated.
#[must_use]
pub fn average_path_length(n: usize) -> f64 {
    if n <= 1 {
        return 0.0;
    }
    let n_f = n as f64;
    2.0 * ((n_f - 1.0).ln() + EULER_GAMMA) - 2.0 * (n_f - 1.0) / n_f
}

/// Global score normalizer for a configured sub-sample size.
///
/// `c(sample_size)`, or `1.0` when `sample_size <= 1` (where `c` is zero).
#[must_use]
pub fn normalization_factor(sample_size: usize) -> f64 {
    if sample_size <= 1 {
        1.0
    } else {
        average_path_length(sample_size)
    }
}

/// Default depth limit: `ceil(log2(sample_size))`.
#[must_use]
pub fn default_max_depth(sample_size: usize) -> usize {
    (sample_size.max(1) as f64).log2().ceil() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_for_one_or_fewer() {
        assert_eq!(average_path_length(0), 0.0);
        assert_eq!(average_path_length(1), 0.0);
    }

    #[test]
    fn two_items() {
        // 2·(ln 1 + γ) − 2·1/2 = 2γ − 1
        let expected = 2.0 * EULER_GAMMA - 1.0;
        assert!((average_path_length(2) - expected).abs() < 1e-12);
    }

    #[test]
    fn standard_sample_size() {
        let expected = 2.0 * (255.0_f64.ln() + EULER_GAMMA) - 2.0 * 255.0 / 256.0;
        assert!((average_path_length(256) - expected).abs() < 1e-12);
        assert!(average_path_length(256) > 10.0 && average_path_length(256) < 10.5);
    }

    #[test]
    fn grows_with_n() {
        assert!(average_path_length(10) < average_path_length(100));
    }

    #[test]
    fn normalization_falls_back_to_one() {
        assert_eq!(normalization_factor(1), 1.0);
        assert_eq!(normalization_factor(256), average_path_length(256));
    }

    #[test]
    fn default_depth_is_ceil_log2() {
        assert_eq!(default_max_depth(256), 8);
        assert_eq!(default_max_depth(255), 8);
        assert_eq!(default_max_depth(257), 9);
        assert_eq!(default_max_depth(1), 0);
        assert_eq!(default_max_depth(2), 1);
    }
}
