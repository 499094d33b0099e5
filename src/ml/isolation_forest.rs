//! Isolation Forest outlier detection.
//!
//! Rows that isolate in few random splits receive short average path
//! lengths and therefore high anomaly scores. The decision threshold is
//! chosen so that roughly `contamination * rows` are tagged as outliers.

use crate::ml::{AnomalyDetector, MlError, INLIER, OUTLIER};
use ndarray::{Array1, Array2};
use rand::prelude::*;

const EULER_MASCHERONI: f64 = 0.577_215_664_9;

/// One randomized isolation tree.
#[derive(Debug, Clone)]
enum Tree {
    Split {
        feature: usize,
        threshold: f64,
        below: Box<Tree>,
        above: Box<Tree>,
    },
    Leaf {
        size: usize,
    },
}

impl Tree {
    fn grow(x: &Array2<f64>, rows: &[usize], depth: usize, depth_limit: usize, rng: &mut StdRng) -> Self {
        if depth >= depth_limit || rows.len() <= 1 {
            return Tree::Leaf { size: rows.len() };
        }

        let feature = rng.gen_range(0..x.ncols());
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for &row in rows {
            let v = x[[row, feature]];
            lo = lo.min(v);
            hi = hi.max(v);
        }

        // Constant feature in this subset: nothing left to split on.
        if (hi - lo).abs() < 1e-12 {
            return Tree::Leaf { size: rows.len() };
        }

        let threshold = rng.gen_range(lo..hi);
        let (left, right): (Vec<usize>, Vec<usize>) =
            rows.iter().partition(|&&row| x[[row, feature]] < threshold);

        if left.is_empty() || right.is_empty() {
            return Tree::Leaf { size: rows.len() };
        }

        Tree::Split {
            feature,
            threshold,
            below: Box::new(Self::grow(x, &left, depth + 1, depth_limit, rng)),
            above: Box::new(Self::grow(x, &right, depth + 1, depth_limit, rng)),
        }
    }

    fn path_length(&self, sample: ndarray::ArrayView1<f64>, depth: usize) -> f64 {
        match self {
            Tree::Leaf { size } => depth as f64 + average_path_length(*size),
            Tree::Split {
                feature,
                threshold,
                below,
                above,
            } => {
                if sample[*feature] < *threshold {
                    below.path_length(sample, depth + 1)
                } else {
                    above.path_length(sample, depth + 1)
                }
            }
        }
    }
}

/// Expected path length of an unsuccessful BST search over `n` samples.
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_MASCHERONI) - 2.0 * (n - 1.0) / n
        }
    }
}

/// Isolation Forest detector with scikit-learn-like defaults.
#[derive(Debug, Clone)]
pub struct IsolationForest {
    n_trees: usize,
    max_samples: usize,
    contamination: f64,
    seed: u64,
    trees: Option<Vec<Tree>>,
    subsample_size: usize,
    threshold: Option<f64>,
}

impl Default for IsolationForest {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_samples: 256,
            contamination: 0.01,
            seed: 42,
            trees: None,
            subsample_size: 0,
            threshold: None,
        }
    }
}

impl IsolationForest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_n_trees(mut self, n: usize) -> Self {
        self.n_trees = n.max(1);
        self
    }

    pub fn with_contamination(mut self, contamination: f64) -> Self {
        self.contamination = contamination.clamp(0.0, 0.5);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn scores(&self, x: &Array2<f64>) -> Result<Array1<f64>, MlError> {
        let trees = self.trees.as_ref().ok_or(MlError::NotFitted)?;
        let normalizer = average_path_length(self.subsample_size);

        let scores: Vec<f64> = x
            .rows()
            .into_iter()
            .map(|row| {
                let mean_path: f64 = trees
                    .iter()
                    .map(|tree| tree.path_length(row, 0))
                    .sum::<f64>()
                    / trees.len() as f64;
                // s(x, n) = 2^(-E[h(x)] / c(n))
                2.0_f64.powf(-mean_path / normalizer)
            })
            .collect();

        Ok(Array1::from_vec(scores))
    }
}

impl AnomalyDetector for IsolationForest {
    fn fit(&mut self, x: &Array2<f64>) -> Result<(), MlError> {
        let n_rows = x.nrows();
        if n_rows == 0 {
            return Err(MlError::EmptyInput);
        }

        let subsample = self.max_samples.min(n_rows);
        let depth_limit = (subsample as f64).log2().ceil().max(1.0) as usize;
        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut trees = Vec::with_capacity(self.n_trees);
        for _ in 0..self.n_trees {
            let rows: Vec<usize> = (0..subsample).map(|_| rng.gen_range(0..n_rows)).collect();
            trees.push(Tree::grow(x, &rows, 0, depth_limit, &mut rng));
        }

        self.trees = Some(trees);
        self.subsample_size = subsample;

        // Threshold at the contamination quantile of the training scores.
        let scores = self.scores(x)?;
        let mut ranked: Vec<f64> = scores.to_vec();
        ranked.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
        let cut = ((self.contamination * n_rows as f64) as usize).min(n_rows - 1);
        self.threshold = Some(ranked[cut]);

        Ok(())
    }

    fn score_samples(&self, x: &Array2<f64>) -> Result<Array1<f64>, MlError> {
        self.scores(x)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<i32>, MlError> {
        let threshold = self.threshold.ok_or(MlError::NotFitted)?;
        let scores = self.scores(x)?;
        Ok(scores.mapv(|s| if s >= threshold { OUTLIER } else { INLIER }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::outlier_count;

    fn clustered_with_outliers() -> Array2<f64> {
        let mut data = Vec::new();
        for i in 0..60 {
            data.push((i % 8) as f64);
            data.push(((i % 8) as f64) * 0.5 + 1.0);
        }
        data.extend_from_slice(&[120.0, 120.0]);
        data.extend_from_slice(&[-80.0, -80.0]);
        Array2::from_shape_vec((62, 2), data).unwrap()
    }

    #[test]
    fn outliers_score_higher_than_cluster_points() {
        let x = clustered_with_outliers();
        let mut forest = IsolationForest::new()
            .with_n_trees(50)
            .with_contamination(0.05)
            .with_seed(42);

        forest.fit(&x).unwrap();
        let scores = forest.score_samples(&x).unwrap();

        assert!(scores[60] > scores[0]);
        assert!(scores[61] > scores[0]);
    }

    #[test]
    fn predictions_cover_every_row_in_order() {
        let x = clustered_with_outliers();
        let mut forest = IsolationForest::new().with_n_trees(25).with_seed(7);

        let tags = forest.fit_predict(&x).unwrap();
        assert_eq!(tags.len(), x.nrows());
        assert!(tags.iter().all(|&t| t == OUTLIER || t == INLIER));
        assert!(outlier_count(&tags) > 0);
    }

    #[test]
    fn same_seed_is_reproducible() {
        let x = clustered_with_outliers();

        let mut a = IsolationForest::new().with_n_trees(20).with_seed(9);
        let mut b = IsolationForest::new().with_n_trees(20).with_seed(9);

        assert_eq!(a.fit_predict(&x).unwrap(), b.fit_predict(&x).unwrap());
    }

    #[test]
    fn predict_before_fit_is_an_error() {
        let x = clustered_with_outliers();
        let forest = IsolationForest::new();
        assert!(matches!(forest.predict(&x), Err(MlError::NotFitted)));
    }
}
