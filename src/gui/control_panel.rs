//! Control Panel Widget
//! Left side panel: data source, analysis parameters, actions, progress.

use egui::{Color32, RichText};
use std::path::PathBuf;

/// Analysis tunables with their stated defaults.
#[derive(Clone)]
pub struct UserSettings {
    pub csv_path: Option<PathBuf>,
    /// Expected share of outliers for both detectors.
    pub contamination: f64,
    pub lof_neighbors: usize,
    pub pca_components: usize,
    pub test_ratio: f64,
    pub seed: u64,
    pub rf_trees: u16,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            csv_path: None,
            contamination: 0.01,
            lof_neighbors: 20,
            pca_components: 2,
            test_ratio: 0.2,
            seed: 42,
            rf_trees: 10,
        }
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlPanelAction {
    None,
    BrowseCsv,
    RunAnalytics,
    RunDetection,
    ExportCharts,
    ExportReport,
}

/// Left side control panel with file selection and run controls.
pub struct ControlPanel {
    pub settings: UserSettings,
    pub dataset_loaded: bool,
    pub row_count: usize,
    pub column_count: usize,
    pub has_results: bool,
    pub busy: bool,
    pub progress: f32,
    pub status: String,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            settings: UserSettings::default(),
            dataset_loaded: false,
            row_count: 0,
            column_count: 0,
            has_results: false,
            busy: false,
            progress: 0.0,
            status: "Ready".to_string(),
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a freshly loaded dataset.
    pub fn set_dataset_info(&mut self, rows: usize, columns: usize) {
        self.dataset_loaded = true;
        self.row_count = rows;
        self.column_count = columns;
    }

    /// Set progress and status
    pub fn set_progress(&mut self, progress: f32, status: &str) {
        self.progress = progress;
        self.status = status.to_string();
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("FraudLens")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Fraud Detection Workbench")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = self
                        .settings
                        .csv_path
                        .as_ref()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file selected".to_string());

                    ui.label(RichText::new(&path_text).size(12.0).color(
                        if self.settings.csv_path.is_some() {
                            ui.visuals().text_color()
                        } else {
                            Color32::GRAY
                        },
                    ));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("Browse").clicked() {
                            action = ControlPanelAction::BrowseCsv;
                        }
                    });
                });

                if self.dataset_loaded {
                    ui.label(
                        RichText::new(format!(
                            "{} rows, {} columns",
                            self.row_count, self.column_count
                        ))
                        .size(11.0)
                        .color(Color32::GRAY),
                    );
                }
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Parameters Section =====
        ui.label(RichText::new("Parameters").size(14.0).strong());
        ui.add_space(8.0);

        let label_width = 130.0;

        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Contamination:"));
            ui.add(
                egui::DragValue::new(&mut self.settings.contamination)
                    .range(0.001..=0.5)
                    .speed(0.001),
            );
        });
        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("LOF Neighbors:"));
            ui.add(egui::DragValue::new(&mut self.settings.lof_neighbors).range(1..=100));
        });
        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("PCA Components:"));
            ui.add(egui::DragValue::new(&mut self.settings.pca_components).range(2..=10));
        });
        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Test Ratio:"));
            ui.add(
                egui::DragValue::new(&mut self.settings.test_ratio)
                    .range(0.05..=0.5)
                    .speed(0.01),
            );
        });
        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Random Seed:"));
            ui.add(egui::DragValue::new(&mut self.settings.seed));
        });
        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Forest Trees:"));
            ui.add(egui::DragValue::new(&mut self.settings.rf_trees).range(1..=200));
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Action Buttons =====
        let can_run = self.dataset_loaded && !self.busy;
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(can_run, |ui| {
                let analytics =
                    egui::Button::new(RichText::new("Run Data Analytics").size(15.0))
                        .min_size(egui::vec2(220.0, 32.0));
                if ui.add(analytics).clicked() {
                    action = ControlPanelAction::RunAnalytics;
                }

                ui.add_space(6.0);

                let detection =
                    egui::Button::new(RichText::new("Run Detection & Models").size(15.0))
                        .min_size(egui::vec2(220.0, 32.0));
                if ui.add(detection).clicked() {
                    action = ControlPanelAction::RunDetection;
                }
            });

            ui.add_space(8.0);

            ui.add_enabled_ui(self.has_results && !self.busy, |ui| {
                let charts = egui::Button::new(RichText::new("Export Charts (PNG)").size(13.0))
                    .min_size(egui::vec2(180.0, 28.0));
                if ui.add(charts).clicked() {
                    action = ControlPanelAction::ExportCharts;
                }

                ui.add_space(4.0);

                let report = egui::Button::new(RichText::new("Export Report (JSON)").size(13.0))
                    .min_size(egui::vec2(180.0, 28.0));
                if ui.add(report).clicked() {
                    action = ControlPanelAction::ExportReport;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Progress Section =====
        ui.label(RichText::new("Progress").size(14.0).strong());
        ui.add_space(5.0);

        ui.add(
            egui::ProgressBar::new(self.progress / 100.0)
                .show_percentage()
                .animate(self.busy),
        );

        ui.add_space(5.0);

        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.contains("complete") || self.status.contains("Loaded") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }
}
