//! Dimensionality reduction via principal component analysis.

use crate::ml::MlError;
use linfa::traits::{Fit, Predict};
use linfa::DatasetBase;
use linfa_reduction::Pca;
use ndarray::Array2;

/// Project the feature table onto its leading principal components.
///
/// Returns one coordinate tuple per input row, in row order. The
/// projection is fit on the given batch and not persisted.
pub fn project(features: &Array2<f64>, n_components: usize) -> Result<Array2<f64>, MlError> {
    if features.nrows() == 0 {
        return Err(MlError::EmptyInput);
    }
    if n_components == 0 || n_components > features.ncols() {
        return Err(MlError::InvalidParameter(format!(
            "n_components must be between 1 and {}",
            features.ncols()
        )));
    }

    let dataset = DatasetBase::from(features.to_owned());
    let pca = Pca::params(n_components)
        .fit(&dataset)
        .map_err(|e| MlError::Training(e.to_string()))?;

    Ok(pca.predict(features))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_with_noise() -> Array2<f64> {
        // Points stretched along one direction; the first component should
        // carry almost all of the variance.
        let mut data = Vec::new();
        for i in 0..30 {
            let t = i as f64;
            data.push(t);
            data.push(2.0 * t + if i % 2 == 0 { 0.1 } else { -0.1 });
            data.push(0.5 * t);
        }
        Array2::from_shape_vec((30, 3), data).unwrap()
    }

    #[test]
    fn projection_has_requested_shape_and_order() {
        let x = line_with_noise();
        let projected = project(&x, 2).unwrap();

        assert_eq!(projected.nrows(), 30);
        assert_eq!(projected.ncols(), 2);
        assert!(projected.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn first_component_dominates_for_collinear_data() {
        let x = line_with_noise();
        let projected = project(&x, 2).unwrap();

        let spread = |col: usize| {
            let values: Vec<f64> = projected.column(col).to_vec();
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
        };

        assert!(spread(0) > spread(1) * 10.0);
    }

    #[test]
    fn zero_components_is_rejected() {
        let x = line_with_noise();
        assert!(matches!(
            project(&x, 0),
            Err(MlError::InvalidParameter(_))
        ));
    }
}
