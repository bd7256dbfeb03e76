//! Majority voting with a stable tie-break.

/// Return the label with the highest count.
///
/// Ties go to the lowest label value. An all-zero (or empty) count vector
/// yields label 0.
#[must_use]
pub fn majority_label(counts: &[usize]) -> usize {
    let mut best = 0usize;
    let mut best_count = 0usize;
    for (label, &count) in counts.iter().enumerate() {
        if count > best_count {
            best = label;
            best_count = count;
        }
    }
    best
}

/// Tally labels into a count vector of length `n_classes`.
pub(crate) fn tally(labels: impl IntoIterator<Item = usize>, n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0usize; n_classes];
    for label in labels {
        counts[label] += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_majority() {
        assert_eq!(majority_label(&[1, 5, 2]), 1);
    }

    #[test]
    fn tie_goes_to_lowest_label() {
        assert_eq!(majority_label(&[3, 3]), 0);
        assert_eq!(majority_label(&[0, 4, 4]), 1);
    }

    #[test]
    fn empty_counts_yield_zero() {
        assert_eq!(majority_label(&[]), 0);
        assert_eq!(majority_label(&[0, 0]), 0);
    }

    #[test]
    fn tally_counts_each_label() {
        assert_eq!(tally([1, 0, 1, 1], 2), vec![1, 3]);
    }
}
