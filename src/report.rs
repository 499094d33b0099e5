//! Analysis report assembly.
//!
//! Collects the outputs of the analytics and detection actions into one
//! serializable report: plain-text rendering for the viewer panel and
//! pretty JSON for export.

use crate::ml::EvaluationReport;
use crate::stats::{AnalyticsSummary, ClassCounts};
use serde::Serialize;
use std::fmt::Write as _;

/// Aggregate outcome of one anomaly-detection run.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionSummary {
    pub method: String,
    pub contamination: f64,
    pub flagged: usize,
    pub rows: usize,
}

/// Everything the Detection & Classification action produces.
///
/// Per-row tags and coordinates feed the charts; only aggregate numbers
/// go into the serialized report.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionOutcome {
    pub rows: usize,
    pub class_counts: ClassCounts,
    pub isolation: DetectionSummary,
    pub lof: DetectionSummary,
    pub evaluations: Vec<EvaluationReport>,
    #[serde(skip)]
    pub pca_points: Vec<[f64; 2]>,
    #[serde(skip)]
    pub isolation_tags: Vec<i32>,
    #[serde(skip)]
    pub lof_tags: Vec<i32>,
}

/// Top-level report over whatever actions have run so far.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisReport {
    pub source: Option<String>,
    pub analytics: Option<AnalyticsSummary>,
    pub detection: Option<DetectionOutcome>,
}

impl AnalysisReport {
    pub fn is_empty(&self) -> bool {
        self.analytics.is_none() && self.detection.is_none()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Plain-text rendering for the report panel.
    pub fn render_text(&self) -> String {
        let mut out = String::new();

        if let Some(source) = &self.source {
            let _ = writeln!(out, "Dataset: {}", source);
        }

        if let Some(analytics) = &self.analytics {
            let counts = &analytics.class_counts;
            let _ = writeln!(out, "\n== Data Analytics ==");
            let _ = writeln!(
                out,
                "Rows: {} ({} legitimate, {} fraudulent, {:.3}% fraud)",
                analytics.rows,
                counts.legitimate,
                counts.fraudulent,
                counts.fraud_ratio() * 100.0
            );
            let _ = writeln!(
                out,
                "Mean normalized amount - fraud: {:.4}, legitimate: {:.4}",
                analytics.fraud_amount.mean, analytics.legitimate_amount.mean
            );
            if let Some(p) = analytics.p_value {
                let _ = writeln!(
                    out,
                    "Welch t-test (fraud vs legitimate): p = {:.4}{}",
                    p,
                    if analytics.is_significant {
                        " (significant)"
                    } else {
                        ""
                    }
                );
            }
        }

        if let Some(detection) = &self.detection {
            let _ = writeln!(out, "\n== Detection & Classification ==");
            for summary in [&detection.isolation, &detection.lof] {
                let _ = writeln!(
                    out,
                    "{}: {} of {} rows flagged (contamination {:.3})",
                    summary.method, summary.flagged, summary.rows, summary.contamination
                );
            }
            for eval in &detection.evaluations {
                let _ = writeln!(
                    out,
                    "{}: accuracy {:.4}, precision {:.4}, recall {:.4}, F1 {:.4}",
                    eval.model, eval.accuracy, eval.precision, eval.recall, eval.f1
                );
                let c = &eval.confusion;
                let _ = writeln!(
                    out,
                    "  confusion [tn {} fp {} / fn {} tp {}]",
                    c.true_negative, c.false_positive, c.false_negative, c.true_positive
                );
            }
        }

        if self.is_empty() {
            out.push_str("No analysis has been run yet.");
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::BinaryConfusion;

    fn sample_detection() -> DetectionOutcome {
        let confusion = BinaryConfusion {
            true_positive: 3,
            false_positive: 1,
            true_negative: 90,
            false_negative: 2,
        };
        DetectionOutcome {
            rows: 96,
            class_counts: ClassCounts {
                legitimate: 91,
                fraudulent: 5,
            },
            isolation: DetectionSummary {
                method: "Isolation Forest".to_string(),
                contamination: 0.01,
                flagged: 2,
                rows: 96,
            },
            lof: DetectionSummary {
                method: "Local Outlier Factor".to_string(),
                contamination: 0.01,
                flagged: 3,
                rows: 96,
            },
            evaluations: vec![EvaluationReport {
                model: "Logistic Regression".to_string(),
                train_rows: 76,
                test_rows: 96 - 76,
                accuracy: confusion.accuracy(),
                precision: confusion.precision(),
                recall: confusion.recall(),
                f1: confusion.f1(),
                confusion,
            }],
            pca_points: vec![[0.0, 1.0]; 96],
            isolation_tags: vec![1; 96],
            lof_tags: vec![1; 96],
        }
    }

    #[test]
    fn json_export_carries_aggregates_not_row_tags() {
        let report = AnalysisReport {
            source: Some("creditcard.csv".to_string()),
            analytics: None,
            detection: Some(sample_detection()),
        };

        let json = report.to_json().unwrap();
        assert!(json.contains("Isolation Forest"));
        assert!(json.contains("accuracy"));
        assert!(!json.contains("pca_points"));
        assert!(!json.contains("isolation_tags"));
    }

    #[test]
    fn text_rendering_names_every_stage() {
        let report = AnalysisReport {
            source: Some("creditcard.csv".to_string()),
            analytics: None,
            detection: Some(sample_detection()),
        };

        let text = report.render_text();
        assert!(text.contains("Isolation Forest: 2 of 96 rows flagged"));
        assert!(text.contains("Local Outlier Factor"));
        assert!(text.contains("Logistic Regression"));
        assert!(text.contains("confusion"));
    }

    #[test]
    fn empty_report_says_so() {
        let report = AnalysisReport::default();
        assert!(report.is_empty());
        assert!(report.render_text().contains("No analysis"));
    }
}
