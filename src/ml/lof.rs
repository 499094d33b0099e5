//! Local Outlier Factor anomaly detection.
//!
//! Compares each row's local density against the density of its k nearest
//! neighbors; ratios well above 1 mark isolated rows. The decision
//! threshold follows the configured contamination share of training rows.

use crate::ml::{AnomalyDetector, MlError, INLIER, OUTLIER};
use ndarray::{Array1, Array2};
use std::cmp::Ordering;

/// Local Outlier Factor detector.
#[derive(Debug, Clone)]
pub struct LocalOutlierFactor {
    n_neighbors: usize,
    contamination: f64,
    train: Option<Array2<f64>>,
    train_k_distances: Option<Array1<f64>>,
    train_density: Option<Array1<f64>>,
    threshold: Option<f64>,
}

impl Default for LocalOutlierFactor {
    fn default() -> Self {
        Self::new(20)
    }
}

fn euclidean(a: ndarray::ArrayView1<f64>, b: ndarray::ArrayView1<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

impl LocalOutlierFactor {
    pub fn new(n_neighbors: usize) -> Self {
        Self {
            n_neighbors: n_neighbors.max(1),
            contamination: 0.01,
            train: None,
            train_k_distances: None,
            train_density: None,
            threshold: None,
        }
    }

    pub fn with_contamination(mut self, contamination: f64) -> Self {
        self.contamination = contamination.clamp(0.0, 0.5);
        self
    }

    /// Indices and distances of the k nearest training rows to `sample`.
    fn nearest(
        &self,
        sample: ndarray::ArrayView1<f64>,
        data: &Array2<f64>,
        k: usize,
        skip: Option<usize>,
    ) -> Vec<(usize, f64)> {
        let mut distances: Vec<(usize, f64)> = data
            .rows()
            .into_iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != skip)
            .map(|(i, row)| (i, euclidean(sample, row)))
            .collect();

        distances.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
        distances.truncate(k);
        distances
    }

    /// Local reachability density from a neighbor list.
    fn reachability_density(neighbors: &[(usize, f64)], k_distances: &Array1<f64>) -> f64 {
        if neighbors.is_empty() {
            return 0.0;
        }

        let total: f64 = neighbors
            .iter()
            .map(|&(idx, dist)| k_distances[idx].max(dist))
            .sum();

        if total == 0.0 {
            f64::INFINITY
        } else {
            neighbors.len() as f64 / total
        }
    }

    fn factor(density: f64, neighbors: &[(usize, f64)], densities: &Array1<f64>) -> f64 {
        if neighbors.is_empty() || density == 0.0 {
            return 1.0;
        }

        neighbors
            .iter()
            .map(|&(idx, _)| densities[idx] / density)
            .sum::<f64>()
            / neighbors.len() as f64
    }
}

impl AnomalyDetector for LocalOutlierFactor {
    fn fit(&mut self, x: &Array2<f64>) -> Result<(), MlError> {
        let n = x.nrows();
        if n < 2 {
            return Err(MlError::EmptyInput);
        }

        let k = self.n_neighbors.min(n - 1);

        let mut neighborhoods = Vec::with_capacity(n);
        let mut k_distances = Vec::with_capacity(n);
        for (i, row) in x.rows().into_iter().enumerate() {
            let neighbors = self.nearest(row, x, k, Some(i));
            k_distances.push(neighbors.iter().map(|&(_, d)| d).fold(0.0, f64::max));
            neighborhoods.push(neighbors);
        }
        let k_distances = Array1::from_vec(k_distances);

        let densities = Array1::from_vec(
            neighborhoods
                .iter()
                .map(|neighbors| Self::reachability_density(neighbors, &k_distances))
                .collect(),
        );

        let scores: Vec<f64> = (0..n)
            .map(|i| Self::factor(densities[i], &neighborhoods[i], &densities))
            .collect();

        let mut ranked = scores.clone();
        ranked.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));
        let cut = ((self.contamination * n as f64) as usize).min(n - 1);
        self.threshold = Some(ranked[cut]);

        self.train = Some(x.clone());
        self.train_k_distances = Some(k_distances);
        self.train_density = Some(densities);

        Ok(())
    }

    fn score_samples(&self, x: &Array2<f64>) -> Result<Array1<f64>, MlError> {
        let train = self.train.as_ref().ok_or(MlError::NotFitted)?;
        let k_distances = self.train_k_distances.as_ref().ok_or(MlError::NotFitted)?;
        let densities = self.train_density.as_ref().ok_or(MlError::NotFitted)?;

        let k = self.n_neighbors.min(train.nrows() - 1);

        let scores: Vec<f64> = x
            .rows()
            .into_iter()
            .map(|row| {
                let neighbors = self.nearest(row, train, k, None);
                let density = Self::reachability_density(&neighbors, k_distances);
                Self::factor(density, &neighbors, densities)
            })
            .collect();

        Ok(Array1::from_vec(scores))
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<i32>, MlError> {
        let threshold = self.threshold.ok_or(MlError::NotFitted)?;
        let scores = self.score_samples(x)?;
        Ok(scores.mapv(|s| if s > threshold { OUTLIER } else { INLIER }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::outlier_count;

    fn cluster_plus_outlier() -> Array2<f64> {
        let mut data = Vec::new();
        for i in 0..12 {
            data.push((i % 4) as f64);
            data.push(((i % 4) + 1) as f64);
        }
        data.extend_from_slice(&[60.0, 60.0]);
        Array2::from_shape_vec((13, 2), data).unwrap()
    }

    #[test]
    fn isolated_point_gets_highest_factor() {
        let x = cluster_plus_outlier();
        let mut lof = LocalOutlierFactor::new(3).with_contamination(0.1);

        lof.fit(&x).unwrap();
        let scores = lof.score_samples(&x).unwrap();

        let cluster_mean: f64 = scores.iter().take(12).sum::<f64>() / 12.0;
        assert!(scores[12] > cluster_mean);
    }

    #[test]
    fn fit_predict_tags_every_row() {
        let x = cluster_plus_outlier();
        let mut lof = LocalOutlierFactor::new(4).with_contamination(0.15);

        let tags = lof.fit_predict(&x).unwrap();
        assert_eq!(tags.len(), x.nrows());
        assert!(outlier_count(&tags) >= 1);
    }

    #[test]
    fn too_few_rows_is_an_error() {
        let x = Array2::from_shape_vec((1, 2), vec![0.0, 0.0]).unwrap();
        let mut lof = LocalOutlierFactor::new(3);
        assert!(lof.fit(&x).is_err());
    }
}
