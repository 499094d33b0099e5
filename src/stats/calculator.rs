//! Statistics Calculator Module
//! Descriptive analytics over the normalized dataset: class balance,
//! per-class amount statistics, Welch's t-test, and the feature
//! correlation matrix.

use crate::data::pipeline::{CLASS_COL, NORMALIZED_AMOUNT_COL};
use polars::prelude::*;
use rayon::prelude::*;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};
use thiserror::Error;

/// Significance threshold for the fraud vs legitimate t-test.
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.05;

const HISTOGRAM_BINS: usize = 50;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Required column '{0}' is missing from the dataset")]
    MissingColumn(String),
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

/// Transaction counts per label.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ClassCounts {
    pub legitimate: usize,
    pub fraudulent: usize,
}

impl ClassCounts {
    pub fn total(&self) -> usize {
        self.legitimate + self.fraudulent
    }

    /// Share of fraudulent transactions, in [0, 1].
    pub fn fraud_ratio(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.fraudulent as f64 / self.total() as f64
        }
    }
}

/// Descriptive statistics for one class's normalized amounts.
#[derive(Debug, Clone, Serialize)]
pub struct AmountStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub p95: f64,
    pub p05: f64,
}

impl Default for AmountStats {
    fn default() -> Self {
        Self {
            count: 0,
            mean: f64::NAN,
            median: f64::NAN,
            std: f64::NAN,
            p95: f64::NAN,
            p05: f64::NAN,
        }
    }
}

/// One histogram bucket.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Pearson correlations between all numeric columns, in column order.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationMatrix {
    pub names: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

/// Everything the Data Analytics action produces.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSummary {
    pub rows: usize,
    pub class_counts: ClassCounts,
    pub legitimate_amount: AmountStats,
    pub fraud_amount: AmountStats,
    /// Welch's t-test p-value for fraud vs legitimate normalized amounts.
    pub p_value: Option<f64>,
    pub is_significant: bool,
    pub amount_histogram: Vec<HistogramBin>,
    /// Present only when the dataset carries a `Time` column.
    pub time_histogram: Option<Vec<HistogramBin>>,
    pub correlation: CorrelationMatrix,
}

/// Compute descriptive statistics for a set of values.
pub fn descriptive_stats(values: &[f64]) -> AmountStats {
    let n = values.len();
    if n == 0 {
        return AmountStats::default();
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mean = values.iter().sum::<f64>() / n as f64;
    let median = if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    };

    let variance = if n > 1 {
        values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
    } else {
        0.0
    };

    AmountStats {
        count: n,
        mean,
        median,
        std: variance.sqrt(),
        p95: percentile(&sorted, 95.0),
        p05: percentile(&sorted, 5.0),
    }
}

/// Percentile with linear interpolation (NumPy compatible).
fn percentile(sorted_values: &[f64], p: f64) -> f64 {
    let n = sorted_values.len();
    if n == 0 {
        return f64::NAN;
    }
    if n == 1 {
        return sorted_values[0];
    }

    let rank = (p / 100.0) * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (rank.ceil() as usize).min(n - 1);
    let frac = rank - lower as f64;

    if lower == upper {
        sorted_values[lower]
    } else {
        sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
    }
}

/// Welch's t-test (independent samples, unequal variance).
///
/// Returns the two-tailed p-value and whether it clears
/// [`SIGNIFICANCE_THRESHOLD`].
pub fn welch_ttest(sample: &[f64], reference: &[f64]) -> (f64, bool) {
    let n1 = sample.len() as f64;
    let n2 = reference.len() as f64;

    if n1 < 2.0 || n2 < 2.0 {
        return (f64::NAN, false);
    }

    let mean1 = sample.iter().sum::<f64>() / n1;
    let mean2 = reference.iter().sum::<f64>() / n2;

    let var1 = sample.iter().map(|x| (x - mean1).powi(2)).sum::<f64>() / (n1 - 1.0);
    let var2 = reference.iter().map(|x| (x - mean2).powi(2)).sum::<f64>() / (n2 - 1.0);

    let se = (var1 / n1 + var2 / n2).sqrt();
    if se == 0.0 {
        return (1.0, false);
    }

    let t = (mean1 - mean2) / se;

    // Welch-Satterthwaite degrees of freedom
    let df_num = (var1 / n1 + var2 / n2).powi(2);
    let df_denom = (var1 / n1).powi(2) / (n1 - 1.0) + (var2 / n2).powi(2) / (n2 - 1.0);
    let df = df_num / df_denom;

    if let Ok(dist) = StudentsT::new(0.0, 1.0, df) {
        let p_value = 2.0 * (1.0 - dist.cdf(t.abs()));
        (p_value, p_value <= SIGNIFICANCE_THRESHOLD)
    } else {
        (f64::NAN, false)
    }
}

/// Count legitimate and fraudulent rows.
pub fn class_counts(df: &DataFrame) -> Result<ClassCounts, StatsError> {
    let column = df
        .column(CLASS_COL)
        .map_err(|_| StatsError::MissingColumn(CLASS_COL.to_string()))?;
    let series = column.as_materialized_series().cast(&DataType::Int64)?;
    let ca = series.i64()?;

    let fraudulent = ca.into_iter().flatten().filter(|&v| v == 1).count();
    Ok(ClassCounts {
        legitimate: df.height() - fraudulent,
        fraudulent,
    })
}

/// Get normalized amounts for a single class.
fn amounts_for_class(df: &DataFrame, class: i64) -> Result<Vec<f64>, StatsError> {
    let filtered = df
        .clone()
        .lazy()
        .filter(col(CLASS_COL).eq(lit(class)))
        .select([col(NORMALIZED_AMOUNT_COL)])
        .collect()?;

    let column = filtered
        .column(NORMALIZED_AMOUNT_COL)
        .map_err(|_| StatsError::MissingColumn(NORMALIZED_AMOUNT_COL.to_string()))?;
    let series = column.as_materialized_series().cast(&DataType::Float64)?;
    Ok(series.f64()?.into_iter().flatten().collect())
}

/// Dense f64 values of a column, with nulls mapped to NaN.
fn column_values(df: &DataFrame, name: &str) -> Result<Vec<f64>, StatsError> {
    let column = df
        .column(name)
        .map_err(|_| StatsError::MissingColumn(name.to_string()))?;
    let series = column.as_materialized_series().cast(&DataType::Float64)?;
    Ok(series
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect())
}

/// Pearson correlation over pairwise-finite entries.
fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b.iter())
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(&x, &y)| (x, y))
        .collect();

    let n = pairs.len() as f64;
    if n < 2.0 {
        return 0.0;
    }

    let mean_a = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_b = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    let denom = (var_a * var_b).sqrt();
    if denom == 0.0 {
        0.0
    } else {
        cov / denom
    }
}

/// Correlation matrix over all numeric columns, rows computed in parallel.
pub fn correlation_matrix(df: &DataFrame) -> Result<CorrelationMatrix, StatsError> {
    let names = crate::data::loader::numeric_columns(df);
    let columns: Vec<Vec<f64>> = names
        .iter()
        .map(|name| column_values(df, name))
        .collect::<Result<_, _>>()?;

    let values: Vec<Vec<f64>> = (0..columns.len())
        .into_par_iter()
        .map(|i| {
            (0..columns.len())
                .map(|j| {
                    if i == j {
                        1.0
                    } else {
                        pearson(&columns[i], &columns[j])
                    }
                })
                .collect()
        })
        .collect();

    Ok(CorrelationMatrix { names, values })
}

/// Bucket values into a fixed-width histogram.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = finite.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = finite.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    if min == max {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: finite.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in &finite {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: min + i as f64 * width,
            upper: min + (i + 1) as f64 * width,
            count,
        })
        .collect()
}

/// Run the full analytics pass over a normalized dataset.
pub fn summarize(df: &DataFrame) -> Result<AnalyticsSummary, StatsError> {
    let counts = class_counts(df)?;

    let legitimate = amounts_for_class(df, 0)?;
    let fraudulent = amounts_for_class(df, 1)?;

    let (p_value, is_significant) = if legitimate.len() >= 2 && fraudulent.len() >= 2 {
        let (p, sig) = welch_ttest(&fraudulent, &legitimate);
        (Some(p), sig)
    } else {
        (None, false)
    };

    let amounts = column_values(df, NORMALIZED_AMOUNT_COL)?;
    let time_histogram = if df.column("Time").is_ok() {
        Some(histogram(&column_values(df, "Time")?, HISTOGRAM_BINS))
    } else {
        None
    };

    Ok(AnalyticsSummary {
        rows: df.height(),
        class_counts: counts,
        legitimate_amount: descriptive_stats(&legitimate),
        fraud_amount: descriptive_stats(&fraudulent),
        p_value,
        is_significant,
        amount_histogram: histogram(&amounts, HISTOGRAM_BINS),
        time_histogram,
        correlation: correlation_matrix(df)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::pipeline::preprocess;
    use crate::data::pipeline::AMOUNT_COL;
    use approx::assert_abs_diff_eq;

    fn sample_frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new("Time".into(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
            Column::new("V1".into(), vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6]),
            Column::new(
                AMOUNT_COL.into(),
                vec![10.0, 20.0, 500.0, 15.0, 25.0, 480.0],
            ),
            Column::new(CLASS_COL.into(), vec![0i64, 0, 1, 0, 0, 1]),
        ])
        .unwrap()
    }

    #[test]
    fn counts_split_by_label() {
        let counts = class_counts(&sample_frame()).unwrap();
        assert_eq!(counts.legitimate, 4);
        assert_eq!(counts.fraudulent, 2);
        assert_abs_diff_eq!(counts.fraud_ratio(), 2.0 / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn summary_separates_class_means() {
        let normalized = preprocess(&sample_frame()).unwrap();
        let summary = summarize(&normalized).unwrap();

        assert_eq!(summary.rows, 6);
        // Fraud rows carry the two large amounts, so their normalized mean
        // sits well above the legitimate mean.
        assert!(summary.fraud_amount.mean > summary.legitimate_amount.mean);
        assert_eq!(summary.fraud_amount.count, 2);
        assert_eq!(summary.legitimate_amount.count, 4);
    }

    #[test]
    fn welch_ttest_flags_separated_samples() {
        let a: Vec<f64> = (0..20).map(|i| 100.0 + i as f64 * 0.1).collect();
        let b: Vec<f64> = (0..20).map(|i| i as f64 * 0.1).collect();
        let (p, significant) = welch_ttest(&a, &b);
        assert!(p < 1e-6);
        assert!(significant);
    }

    #[test]
    fn welch_ttest_accepts_identical_samples() {
        let a = vec![1.0, 2.0, 3.0, 4.0];
        let (p, significant) = welch_ttest(&a, &a);
        assert_abs_diff_eq!(p, 1.0, epsilon = 1e-9);
        assert!(!significant);
    }

    #[test]
    fn correlation_matrix_has_unit_diagonal() {
        let matrix = correlation_matrix(&sample_frame()).unwrap();
        assert_eq!(matrix.names.len(), matrix.values.len());
        for (i, row) in matrix.values.iter().enumerate() {
            assert_abs_diff_eq!(row[i], 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn correlated_columns_score_near_one() {
        let df = DataFrame::new(vec![
            Column::new("a".into(), vec![1.0, 2.0, 3.0, 4.0]),
            Column::new("b".into(), vec![2.0, 4.0, 6.0, 8.0]),
        ])
        .unwrap();

        let matrix = correlation_matrix(&df).unwrap();
        assert_abs_diff_eq!(matrix.values[0][1], 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(matrix.values[1][0], 1.0, epsilon = 1e-9);
    }

    #[test]
    fn histogram_preserves_total_count() {
        let values: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let bins = histogram(&values, 10);
        assert_eq!(bins.len(), 10);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 100);
    }

    #[test]
    fn histogram_of_constant_values_is_a_single_bin() {
        let bins = histogram(&[5.0; 8], 10);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 8);
    }
}
