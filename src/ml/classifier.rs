//! Classifier training and evaluation.
//!
//! Each run shuffles the labeled feature table with a seeded RNG, splits it
//! into train/test subsets, fits the requested model, and reports accuracy,
//! precision, recall, F1 and the confusion matrix on the held-out rows.

use crate::ml::metrics::BinaryConfusion;
use crate::ml::MlError;
use linfa::prelude::*;
use linfa::Dataset;
use linfa_bayes::GaussianNb;
use linfa_logistic::LogisticRegression;
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use smartcore::ensemble::random_forest_classifier::{
    RandomForestClassifier, RandomForestClassifierParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;

/// Which classification model to train.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierKind {
    Logistic,
    NaiveBayes,
    RandomForest,
}

impl ClassifierKind {
    pub fn name(&self) -> &'static str {
        match self {
            ClassifierKind::Logistic => "Logistic Regression",
            ClassifierKind::NaiveBayes => "Gaussian Naive Bayes",
            ClassifierKind::RandomForest => "Random Forest",
        }
    }

    pub fn all() -> [ClassifierKind; 3] {
        [
            ClassifierKind::Logistic,
            ClassifierKind::NaiveBayes,
            ClassifierKind::RandomForest,
        ]
    }
}

/// Tunables for a training run, with the defaults stated in the UI.
#[derive(Debug, Clone, Copy)]
pub struct TrainConfig {
    pub test_ratio: f64,
    pub seed: u64,
    pub max_iterations: u64,
    pub n_trees: u16,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            test_ratio: 0.2,
            seed: 42,
            max_iterations: 1000,
            n_trees: 10,
        }
    }
}

/// Held-out evaluation of one trained model.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub model: String,
    pub train_rows: usize,
    pub test_rows: usize,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub confusion: BinaryConfusion,
}

impl EvaluationReport {
    fn from_predictions(
        model: &str,
        train_rows: usize,
        actual: &[usize],
        predicted: &[usize],
    ) -> Self {
        let confusion = BinaryConfusion::from_labels(actual, predicted);
        Self {
            model: model.to_string(),
            train_rows,
            test_rows: actual.len(),
            accuracy: confusion.accuracy(),
            precision: confusion.precision(),
            recall: confusion.recall(),
            f1: confusion.f1(),
            confusion,
        }
    }
}

/// Train one model on a seeded split and evaluate it on the held-out rows.
pub fn train_and_evaluate(
    features: &Array2<f64>,
    labels: &Array1<usize>,
    kind: ClassifierKind,
    config: TrainConfig,
) -> Result<EvaluationReport, MlError> {
    if features.nrows() == 0 {
        return Err(MlError::EmptyInput);
    }
    if features.nrows() != labels.len() {
        return Err(MlError::InvalidParameter(format!(
            "feature rows ({}) and labels ({}) disagree",
            features.nrows(),
            labels.len()
        )));
    }
    if !(0.0..1.0).contains(&config.test_ratio) || config.test_ratio == 0.0 {
        return Err(MlError::InvalidParameter(
            "test_ratio must be in (0, 1)".to_string(),
        ));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let (train, valid) = Dataset::new(features.to_owned(), labels.to_owned())
        .shuffle(&mut rng)
        .split_with_ratio(1.0 - config.test_ratio as f32);

    if train.nsamples() == 0 || valid.nsamples() == 0 {
        return Err(MlError::InvalidParameter(
            "split leaves an empty train or test subset".to_string(),
        ));
    }

    let actual = valid.targets().to_vec();

    let predicted: Vec<usize> = match kind {
        ClassifierKind::Logistic => {
            let model = LogisticRegression::default()
                .max_iterations(config.max_iterations)
                .fit(&train)
                .map_err(|e| MlError::Training(e.to_string()))?;
            model.predict(valid.records()).to_vec()
        }
        ClassifierKind::NaiveBayes => {
            let model = GaussianNb::params()
                .fit(&train)
                .map_err(|e| MlError::Training(e.to_string()))?;
            model.predict(valid.records()).to_vec()
        }
        ClassifierKind::RandomForest => {
            let to_rows = |x: &Array2<f64>| -> Vec<Vec<f64>> {
                x.rows().into_iter().map(|row| row.to_vec()).collect()
            };
            let x_train = DenseMatrix::from_2d_vec(&to_rows(train.records()))
                .map_err(|e| MlError::Training(e.to_string()))?;
            let y_train: Vec<u32> = train.targets().iter().map(|&t| t as u32).collect();

            let params = RandomForestClassifierParameters::default()
                .with_n_trees(config.n_trees)
                .with_seed(config.seed);
            let model = RandomForestClassifier::fit(&x_train, &y_train, params)
                .map_err(|e| MlError::Training(e.to_string()))?;

            let x_valid = DenseMatrix::from_2d_vec(&to_rows(valid.records()))
                .map_err(|e| MlError::Training(e.to_string()))?;
            model
                .predict(&x_valid)
                .map_err(|e| MlError::Training(e.to_string()))?
                .into_iter()
                .map(|t| t as usize)
                .collect()
        }
    };

    Ok(EvaluationReport::from_predictions(
        kind.name(),
        train.nsamples(),
        &actual,
        &predicted,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two well-separated clusters with deterministic jitter.
    fn separable_dataset() -> (Array2<f64>, Array1<usize>) {
        let mut data = Vec::new();
        let mut labels = Vec::new();
        for i in 0..30 {
            let jitter = ((i * 37) % 11) as f64 * 0.05;
            data.push(i as f64 * 0.1 + jitter);
            data.push(0.5 + jitter * 0.5);
            labels.push(0);
        }
        for i in 0..30 {
            let jitter = ((i * 53) % 13) as f64 * 0.05;
            data.push(8.0 + i as f64 * 0.1 + jitter);
            data.push(9.0 + jitter * 0.5);
            labels.push(1);
        }
        (
            Array2::from_shape_vec((60, 2), data).unwrap(),
            Array1::from_vec(labels),
        )
    }

    #[test]
    fn logistic_regression_separates_clusters() {
        let (x, y) = separable_dataset();
        let report =
            train_and_evaluate(&x, &y, ClassifierKind::Logistic, TrainConfig::default()).unwrap();

        assert_eq!(report.model, "Logistic Regression");
        assert!(report.accuracy >= 0.9, "accuracy was {}", report.accuracy);
        assert_eq!(report.confusion.total(), report.test_rows);
    }

    #[test]
    fn naive_bayes_separates_clusters() {
        let (x, y) = separable_dataset();
        let report =
            train_and_evaluate(&x, &y, ClassifierKind::NaiveBayes, TrainConfig::default()).unwrap();

        assert!(report.accuracy >= 0.9, "accuracy was {}", report.accuracy);
        assert_eq!(report.train_rows + report.test_rows, 60);
    }

    #[test]
    fn random_forest_separates_clusters() {
        let (x, y) = separable_dataset();
        let report = train_and_evaluate(
            &x,
            &y,
            ClassifierKind::RandomForest,
            TrainConfig::default(),
        )
        .unwrap();

        assert!(report.accuracy >= 0.9, "accuracy was {}", report.accuracy);
        assert!(report.f1 > 0.0);
    }

    #[test]
    fn out_of_range_test_ratio_is_rejected() {
        let (x, y) = separable_dataset();
        let config = TrainConfig {
            test_ratio: 0.0,
            ..TrainConfig::default()
        };
        assert!(matches!(
            train_and_evaluate(&x, &y, ClassifierKind::Logistic, config),
            Err(MlError::InvalidParameter(_))
        ));
    }

    #[test]
    fn mismatched_labels_are_rejected() {
        let (x, _) = separable_dataset();
        let y = Array1::from_vec(vec![0usize; 10]);
        assert!(matches!(
            train_and_evaluate(&x, &y, ClassifierKind::Logistic, TrainConfig::default()),
            Err(MlError::InvalidParameter(_))
        ));
    }
}
