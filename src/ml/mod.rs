//! Machine learning module - anomaly detection, dimensionality reduction,
//! and classification over the model-ready feature table.

pub mod classifier;
pub mod isolation_forest;
pub mod lof;
pub mod metrics;
pub mod reduction;

pub use classifier::{train_and_evaluate, ClassifierKind, EvaluationReport, TrainConfig};
pub use isolation_forest::IsolationForest;
pub use lof::LocalOutlierFactor;
pub use metrics::BinaryConfusion;
pub use reduction::project;

use ndarray::{Array1, Array2};
use thiserror::Error;

/// Prediction tag for an inlying row.
pub const INLIER: i32 = 1;
/// Prediction tag for an outlying row.
pub const OUTLIER: i32 = -1;

#[derive(Error, Debug)]
pub enum MlError {
    #[error("Model has not been fitted")]
    NotFitted,
    #[error("Input has no rows")]
    EmptyInput,
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Training failed: {0}")]
    Training(String),
}

/// Common surface of the anomaly detectors.
///
/// Predictions are row-ordered and one per input row: [`OUTLIER`] (-1) for
/// rows flagged as anomalous, [`INLIER`] (1) otherwise.
pub trait AnomalyDetector {
    fn fit(&mut self, x: &Array2<f64>) -> Result<(), MlError>;

    /// Anomaly score per row; higher means more anomalous.
    fn score_samples(&self, x: &Array2<f64>) -> Result<Array1<f64>, MlError>;

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<i32>, MlError>;

    fn fit_predict(&mut self, x: &Array2<f64>) -> Result<Array1<i32>, MlError> {
        self.fit(x)?;
        self.predict(x)
    }
}

/// Count the rows a detector tagged as outliers.
pub fn outlier_count(tags: &Array1<i32>) -> usize {
    tags.iter().filter(|&&t| t == OUTLIER).count()
}
