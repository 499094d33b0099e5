//! Chart Viewer Widget
//! Central panel: analytics and detection chart cards plus the text report.

use crate::charts::ChartPlotter;
use crate::charts::plotter::{FLAGGED_COLOR, NORMAL_COLOR};
use crate::report::AnalysisReport;
use egui::{Color32, RichText, ScrollArea};

const CARD_SPACING: f32 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerTab {
    Analytics,
    Detection,
    Report,
}

/// Scrollable result display with one card per chart.
pub struct ChartViewer {
    pub tab: ViewerTab,
    pub report: AnalysisReport,
}

impl Default for ChartViewer {
    fn default() -> Self {
        Self {
            tab: ViewerTab::Analytics,
            report: AnalysisReport::default(),
        }
    }
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.report = AnalysisReport::default();
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        if self.report.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        }

        ui.horizontal(|ui| {
            for (tab, label) in [
                (ViewerTab::Analytics, "Analytics"),
                (ViewerTab::Detection, "Detection"),
                (ViewerTab::Report, "Report"),
            ] {
                if ui.selectable_label(self.tab == tab, label).clicked() {
                    self.tab = tab;
                }
            }
        });
        ui.separator();

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| match self.tab {
                ViewerTab::Analytics => self.show_analytics(ui),
                ViewerTab::Detection => self.show_detection(ui),
                ViewerTab::Report => self.show_report(ui),
            });
    }

    fn show_analytics(&self, ui: &mut egui::Ui) {
        let Some(analytics) = &self.report.analytics else {
            ui.label("Run Data Analytics to populate this view.");
            return;
        };

        Self::card(ui, "Class Distribution", |ui| {
            ChartPlotter::draw_class_bar_chart(ui, &analytics.class_counts);
        });

        Self::card(ui, "Transaction Amount Distribution", |ui| {
            ChartPlotter::draw_histogram(
                ui,
                "amount_hist",
                &analytics.amount_histogram,
                "Normalized Transaction Amount",
            );
        });

        if let Some(time_bins) = &analytics.time_histogram {
            Self::card(ui, "Transactions over Time", |ui| {
                ChartPlotter::draw_histogram(ui, "time_hist", time_bins, "Time");
            });
        }

        Self::card(ui, "Feature Correlation Matrix", |ui| {
            ChartPlotter::draw_correlation_heatmap(ui, &analytics.correlation);
        });

        Self::card(ui, "Amount Statistics by Class", |ui| {
            ChartPlotter::draw_stats_table(ui, analytics);
        });
    }

    fn show_detection(&self, ui: &mut egui::Ui) {
        let Some(detection) = &self.report.detection else {
            ui.label("Run Detection & Models to populate this view.");
            return;
        };

        Self::card(ui, "PCA Outlier Detection (Isolation Forest)", |ui| {
            ChartPlotter::draw_tagged_scatter(
                ui,
                "pca_outliers",
                &detection.pca_points,
                &detection.isolation_tags,
                "Outlier",
            );
            ui.label(
                RichText::new(format!(
                    "{} of {} rows flagged",
                    detection.isolation.flagged, detection.isolation.rows
                ))
                .size(12.0),
            );
        });

        Self::card(ui, "Anomaly Detection (Local Outlier Factor)", |ui| {
            ChartPlotter::draw_tagged_scatter(
                ui,
                "lof_anomalies",
                &detection.pca_points,
                &detection.lof_tags,
                "Anomaly",
            );
            ui.label(
                RichText::new(format!(
                    "{} of {} rows flagged",
                    detection.lof.flagged, detection.lof.rows
                ))
                .size(12.0),
            );
        });

        Self::card(ui, "Fraud vs Non-Fraud Ratio", |ui| {
            ChartPlotter::draw_class_pie(ui, &detection.class_counts);
        });

        Self::card(ui, "Classifier Evaluation", |ui| {
            Self::draw_evaluation_table(ui, detection);
        });
    }

    fn draw_evaluation_table(ui: &mut egui::Ui, detection: &crate::report::DetectionOutcome) {
        egui::Grid::new("evaluation_table")
            .striped(true)
            .min_col_width(60.0)
            .spacing([10.0, 4.0])
            .show(ui, |ui| {
                for header in [
                    "Model", "Accuracy", "Precision", "Recall", "F1", "TP", "FP", "TN", "FN",
                ] {
                    ui.label(RichText::new(header).strong().size(11.0));
                }
                ui.end_row();

                for eval in &detection.evaluations {
                    ui.label(RichText::new(&eval.model).size(11.0));
                    for value in [eval.accuracy, eval.precision, eval.recall, eval.f1] {
                        ui.label(RichText::new(format!("{:.4}", value)).size(11.0));
                    }
                    let c = &eval.confusion;
                    ui.label(
                        RichText::new(c.true_positive.to_string())
                            .size(11.0)
                            .color(NORMAL_COLOR),
                    );
                    ui.label(
                        RichText::new(c.false_positive.to_string())
                            .size(11.0)
                            .color(FLAGGED_COLOR),
                    );
                    ui.label(RichText::new(c.true_negative.to_string()).size(11.0));
                    ui.label(
                        RichText::new(c.false_negative.to_string())
                            .size(11.0)
                            .color(FLAGGED_COLOR),
                    );
                    ui.end_row();
                }
            });
    }

    fn show_report(&self, ui: &mut egui::Ui) {
        Self::card(ui, "Analysis Report", |ui| {
            ui.label(RichText::new(self.report.render_text()).monospace().size(12.0));
        });
    }

    /// One framed chart card.
    fn card(ui: &mut egui::Ui, title: &str, add_contents: impl FnOnce(&mut egui::Ui)) {
        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(1.0, Color32::from_gray(90)))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.label(RichText::new(title).size(16.0).strong());
                ui.add_space(6.0);
                add_contents(ui);
            });
        ui.add_space(CARD_SPACING);
    }
}
