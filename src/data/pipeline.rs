//! Preprocessing Pipeline Module
//! Turns the raw transaction table into a model-ready feature table.
//!
//! The transform standardizes the monetary column against its own sample
//! statistics, fit and applied in one pass. Nothing is persisted between
//! calls: repeated runs over the same rows produce identical output.

use ndarray::{Array1, Array2};
use polars::prelude::*;
use thiserror::Error;

/// Raw monetary column, replaced by [`NORMALIZED_AMOUNT_COL`] during preprocessing.
pub const AMOUNT_COL: &str = "Amount";
/// Label column: 0 = legitimate, 1 = fraudulent.
pub const CLASS_COL: &str = "Class";
/// Standardized monetary column appended by [`preprocess`].
pub const NORMALIZED_AMOUNT_COL: &str = "normalizedAmount";

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Required column '{0}' is missing from the dataset")]
    MissingColumn(String),
    #[error("Column '{0}' has zero variance; a constant column cannot be standardized")]
    DegenerateScale(String),
    #[error("Column '{col}' has {count} null or non-numeric entries")]
    InvalidValues { col: String, count: usize },
    #[error("Label column '{0}' must contain only 0 or 1")]
    InvalidLabel(String),
    #[error("Dataset has no rows")]
    EmptyDataset,
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

/// Extract a column as a dense f64 vector, rejecting nulls.
fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<f64>, PipelineError> {
    let column = df
        .column(name)
        .map_err(|_| PipelineError::MissingColumn(name.to_string()))?;
    let series = column.as_materialized_series().cast(&DataType::Float64)?;
    let ca = series.f64()?;

    let nulls = ca.null_count();
    if nulls > 0 {
        return Err(PipelineError::InvalidValues {
            col: name.to_string(),
            count: nulls,
        });
    }

    Ok(ca.into_no_null_iter().collect())
}

/// Sample mean and standard deviation (ddof = 1) of a column.
fn sample_stats(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, variance.sqrt())
}

/// Standardize the monetary column and drop the raw one.
///
/// The output DataFrame has the same rows as the input, with `Amount`
/// removed and `normalizedAmount` = (v - mean) / std appended; every other
/// column passes through unchanged and in order. The input is not mutated.
///
/// A single-row or constant `Amount` column fails with
/// [`PipelineError::DegenerateScale`] rather than producing NaN.
pub fn preprocess(df: &DataFrame) -> Result<DataFrame, PipelineError> {
    if df.height() == 0 {
        return Err(PipelineError::EmptyDataset);
    }

    let values = numeric_values(df, AMOUNT_COL)?;
    if values.len() < 2 {
        return Err(PipelineError::DegenerateScale(AMOUNT_COL.to_string()));
    }

    let (mean, std) = sample_stats(&values);
    if std == 0.0 || !std.is_finite() {
        return Err(PipelineError::DegenerateScale(AMOUNT_COL.to_string()));
    }

    let normalized: Vec<f64> = values.iter().map(|v| (v - mean) / std).collect();

    let mut out = df.drop(AMOUNT_COL)?;
    out.with_column(Column::new(NORMALIZED_AMOUNT_COL.into(), normalized))?;
    Ok(out)
}

/// Check that the raw dataset carries the columns the pipeline needs.
pub fn validate_schema(df: &DataFrame) -> Result<(), PipelineError> {
    for required in [AMOUNT_COL, CLASS_COL] {
        if df.column(required).is_err() {
            return Err(PipelineError::MissingColumn(required.to_string()));
        }
    }
    Ok(())
}

/// Build the model-ready feature matrix, excluding the named columns.
///
/// Returns the kept column names alongside a row-major `(rows, features)`
/// matrix. Row order matches the input; null entries are a reported failure.
pub fn feature_matrix(
    df: &DataFrame,
    exclude: &[&str],
) -> Result<(Vec<String>, Array2<f64>), PipelineError> {
    let kept: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .filter(|name| !exclude.contains(&name.as_str()))
        .collect();

    if kept.is_empty() || df.height() == 0 {
        return Err(PipelineError::EmptyDataset);
    }

    let mut data = Array2::zeros((df.height(), kept.len()));
    for (j, name) in kept.iter().enumerate() {
        let values = numeric_values(df, name)?;
        for (i, v) in values.into_iter().enumerate() {
            data[[i, j]] = v;
        }
    }

    Ok((kept, data))
}

/// Extract the label column as 0/1 targets, in row order.
pub fn class_labels(df: &DataFrame) -> Result<Array1<usize>, PipelineError> {
    let column = df
        .column(CLASS_COL)
        .map_err(|_| PipelineError::MissingColumn(CLASS_COL.to_string()))?;
    let series = column.as_materialized_series().cast(&DataType::Int64)?;
    let ca = series.i64()?;

    let mut labels = Vec::with_capacity(df.height());
    for value in ca.into_iter() {
        match value {
            Some(0) => labels.push(0),
            Some(1) => labels.push(1),
            _ => return Err(PipelineError::InvalidLabel(CLASS_COL.to_string())),
        }
    }

    Ok(Array1::from_vec(labels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn five_row_dataset() -> DataFrame {
        DataFrame::new(vec![
            Column::new("V1".into(), vec![0.5, -1.2, 3.4, 0.0, 2.2]),
            Column::new("Time".into(), vec![1.0, 2.0, 3.0, 4.0, 5.0]),
            Column::new(AMOUNT_COL.into(), vec![0.0, 100.0, 100.0, 100.0, 200.0]),
            Column::new(CLASS_COL.into(), vec![0i64, 0, 1, 0, 0]),
        ])
        .unwrap()
    }

    fn column_values(df: &DataFrame, name: &str) -> Vec<f64> {
        numeric_values(df, name).unwrap()
    }

    #[test]
    fn preprocess_standardizes_to_zero_mean_unit_std() {
        let out = preprocess(&five_row_dataset()).unwrap();
        let normalized = column_values(&out, NORMALIZED_AMOUNT_COL);

        let (mean, std) = sample_stats(&normalized);
        assert_abs_diff_eq!(mean, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(std, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn preprocess_keeps_row_count_and_swaps_exactly_one_column() {
        let input = five_row_dataset();
        let out = preprocess(&input).unwrap();

        assert_eq!(out.height(), input.height());
        assert!(out.column(AMOUNT_COL).is_err());
        assert!(out.column(NORMALIZED_AMOUNT_COL).is_ok());
        assert_eq!(out.width(), input.width());

        // Pass-through columns keep values and row order.
        assert_eq!(column_values(&out, "V1"), column_values(&input, "V1"));
        assert_eq!(column_values(&out, "Time"), column_values(&input, "Time"));
        assert_eq!(
            column_values(&out, CLASS_COL),
            column_values(&input, CLASS_COL)
        );
    }

    #[test]
    fn preprocess_does_not_mutate_input() {
        let input = five_row_dataset();
        let _ = preprocess(&input).unwrap();
        assert!(input.column(AMOUNT_COL).is_ok());
        assert!(input.column(NORMALIZED_AMOUNT_COL).is_err());
    }

    #[test]
    fn fraud_row_retains_its_feature_values() {
        let input = five_row_dataset();
        let out = preprocess(&input).unwrap();

        let classes = column_values(&out, CLASS_COL);
        let fraud_row = classes.iter().position(|&c| c == 1.0).unwrap();
        assert_eq!(fraud_row, 2);
        assert_abs_diff_eq!(column_values(&out, "V1")[fraud_row], 3.4);
    }

    #[test]
    fn missing_amount_column_is_a_schema_failure() {
        let df = DataFrame::new(vec![
            Column::new("V1".into(), vec![1.0, 2.0]),
            Column::new(CLASS_COL.into(), vec![0i64, 1]),
        ])
        .unwrap();

        match preprocess(&df) {
            Err(PipelineError::MissingColumn(name)) => assert_eq!(name, AMOUNT_COL),
            other => panic!("expected MissingColumn, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn constant_amount_column_is_degenerate_not_nan() {
        let df = DataFrame::new(vec![
            Column::new(AMOUNT_COL.into(), vec![50.0, 50.0, 50.0, 50.0]),
            Column::new(CLASS_COL.into(), vec![0i64, 0, 1, 0]),
        ])
        .unwrap();

        assert!(matches!(
            preprocess(&df),
            Err(PipelineError::DegenerateScale(_))
        ));
    }

    #[test]
    fn single_row_is_degenerate() {
        let df = DataFrame::new(vec![
            Column::new(AMOUNT_COL.into(), vec![10.0]),
            Column::new(CLASS_COL.into(), vec![0i64]),
        ])
        .unwrap();

        assert!(matches!(
            preprocess(&df),
            Err(PipelineError::DegenerateScale(_))
        ));
    }

    #[test]
    fn null_amount_entries_are_reported() {
        let df = DataFrame::new(vec![
            Column::new(AMOUNT_COL.into(), vec![Some(1.0), None, Some(3.0)]),
            Column::new(CLASS_COL.into(), vec![0i64, 0, 1]),
        ])
        .unwrap();

        assert!(matches!(
            preprocess(&df),
            Err(PipelineError::InvalidValues { count: 1, .. })
        ));
    }

    #[test]
    fn feature_matrix_excludes_label_and_preserves_order() {
        let out = preprocess(&five_row_dataset()).unwrap();
        let (names, matrix) = feature_matrix(&out, &[CLASS_COL]).unwrap();

        assert_eq!(names, vec!["V1", "Time", NORMALIZED_AMOUNT_COL]);
        assert_eq!(matrix.nrows(), 5);
        assert_eq!(matrix.ncols(), 3);
        assert_abs_diff_eq!(matrix[[2, 0]], 3.4);
    }

    #[test]
    fn class_labels_reject_out_of_domain_values() {
        let df = DataFrame::new(vec![
            Column::new(AMOUNT_COL.into(), vec![1.0, 2.0]),
            Column::new(CLASS_COL.into(), vec![0i64, 2]),
        ])
        .unwrap();

        assert!(matches!(
            class_labels(&df),
            Err(PipelineError::InvalidLabel(_))
        ));
    }

    #[test]
    fn class_labels_follow_row_order() {
        let labels = class_labels(&five_row_dataset()).unwrap();
        assert_eq!(labels.to_vec(), vec![0, 0, 1, 0, 0]);
    }
}
