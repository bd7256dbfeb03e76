//! Binary confusion matrix and the metrics derived from it.

use std::fmt;

/// Counts of a binary flagging decision against ground truth.
///
/// "Positive" means fraud: label `1` in the ground truth, and a flagged
/// record (or predicted label `1`) on the model side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ConfusionMatrix {
    /// Flagged and actually fraud.
    pub tp: usize,
    /// Flagged but legitimate.
    pub fp: usize,
    /// Missed fraud.
    #[serde(rename = "fn")]
    pub fn_: usize,
    /// Correctly left unflagged.
    pub tn: usize,
}

/// `num / den`, or 0.0 when the denominator is zero.
fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

impl ConfusionMatrix {
    /// Tally parallel slices of actual and predicted positives.
    ///
    /// Extra elements in the longer slice are ignored.
    #[must_use]
    pub fn from_flags(actual: &[bool], predicted: &[bool]) -> Self {
        let mut cm = Self::default();
        for (&a, &p) in actual.iter().zip(predicted) {
            match (a, p) {
                (true, true) => cm.tp += 1,
                (false, true) => cm.fp += 1,
                (true, false) => cm.fn_ += 1,
                (false, false) => cm.tn += 1,
            }
        }
        cm
    }

    /// Total number of records tallied.
    #[must_use]
    pub fn total(&self) -> usize {
        self.tp + self.fp + self.fn_ + self.tn
    }

    /// (TP + TN) / total.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        ratio(self.tp + self.tn, self.total())
    }

    /// TP / (TP + FP).
    #[must_use]
    pub fn precision(&self) -> f64 {
        ratio(self.tp, self.tp + self.fp)
    }

    /// TP / (TP + FN).
    #[must_use]
    pub fn recall(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    /// Harmonic mean of precision and recall; 0.0 if both are zero.
    #[must_use]
    pub fn f1(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>10} {:>9} {:>9}", "", "flagged", "unflagged")?;
        writeln!(f, "{:>10} {:>9} {:>9}", "fraud", self.tp, self.fn_)?;
        writeln!(f, "{:>10} {:>9} {:>9}", "legit", self.fp, self.tn)
    }
}
