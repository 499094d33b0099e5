//! Binary classification metrics.

use serde::Serialize;

/// Confusion matrix for the fraud (positive = 1) class.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct BinaryConfusion {
    pub true_positive: usize,
    pub false_positive: usize,
    pub true_negative: usize,
    pub false_negative: usize,
}

impl BinaryConfusion {
    /// Tally predictions against ground truth, pairwise in row order.
    pub fn from_labels(actual: &[usize], predicted: &[usize]) -> Self {
        let mut confusion = Self::default();
        for (&truth, &guess) in actual.iter().zip(predicted.iter()) {
            match (truth, guess) {
                (1, 1) => confusion.true_positive += 1,
                (0, 1) => confusion.false_positive += 1,
                (0, 0) => confusion.true_negative += 1,
                _ => confusion.false_negative += 1,
            }
        }
        confusion
    }

    pub fn total(&self) -> usize {
        self.true_positive + self.false_positive + self.true_negative + self.false_negative
    }

    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.true_positive + self.true_negative) as f64 / total as f64
    }

    pub fn precision(&self) -> f64 {
        let flagged = self.true_positive + self.false_positive;
        if flagged == 0 {
            return 0.0;
        }
        self.true_positive as f64 / flagged as f64
    }

    pub fn recall(&self) -> f64 {
        let positives = self.true_positive + self.false_negative;
        if positives == 0 {
            return 0.0;
        }
        self.true_positive as f64 / positives as f64
    }

    pub fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            return 0.0;
        }
        2.0 * p * r / (p + r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn tallies_all_four_cells() {
        let actual = [1, 1, 0, 0, 1, 0];
        let predicted = [1, 0, 0, 1, 1, 0];
        let confusion = BinaryConfusion::from_labels(&actual, &predicted);

        assert_eq!(confusion.true_positive, 2);
        assert_eq!(confusion.false_negative, 1);
        assert_eq!(confusion.false_positive, 1);
        assert_eq!(confusion.true_negative, 2);
        assert_eq!(confusion.total(), 6);
    }

    #[test]
    fn derived_rates_match_hand_computation() {
        let confusion = BinaryConfusion {
            true_positive: 8,
            false_positive: 2,
            true_negative: 85,
            false_negative: 5,
        };

        assert_abs_diff_eq!(confusion.accuracy(), 0.93, epsilon = 1e-12);
        assert_abs_diff_eq!(confusion.precision(), 0.8, epsilon = 1e-12);
        assert_abs_diff_eq!(confusion.recall(), 8.0 / 13.0, epsilon = 1e-12);
        let p = 0.8;
        let r = 8.0 / 13.0;
        assert_abs_diff_eq!(confusion.f1(), 2.0 * p * r / (p + r), epsilon = 1e-12);
    }

    #[test]
    fn empty_inputs_do_not_divide_by_zero() {
        let confusion = BinaryConfusion::from_labels(&[], &[]);
        assert_eq!(confusion.accuracy(), 0.0);
        assert_eq!(confusion.precision(), 0.0);
        assert_eq!(confusion.recall(), 0.0);
        assert_eq!(confusion.f1(), 0.0);
    }
}
