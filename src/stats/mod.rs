//! Statistics module - descriptive analytics and hypothesis testing

pub mod calculator;

pub use calculator::{
    class_counts, correlation_matrix, descriptive_stats, histogram, summarize, welch_ttest,
    AmountStats, AnalyticsSummary, ClassCounts, CorrelationMatrix, HistogramBin, StatsError,
    SIGNIFICANCE_THRESHOLD,
};
