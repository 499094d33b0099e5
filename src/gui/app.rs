//! FraudLens Main Application
//! Main window: control panel on the left, result viewer in the center.
//! Long-running work happens on background threads that stream progress
//! and results back over an mpsc channel.

use crate::charts::StaticChartRenderer;
use crate::data::loader;
use crate::data::pipeline::{self, CLASS_COL};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction, UserSettings};
use crate::ml::{
    self, train_and_evaluate, AnomalyDetector, ClassifierKind, IsolationForest,
    LocalOutlierFactor, TrainConfig,
};
use crate::report::{DetectionOutcome, DetectionSummary};
use crate::stats;
use egui::SidePanel;
use polars::prelude::DataFrame;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;

/// Result streamed from a background task.
enum TaskResult {
    Progress(f32, String),
    Loaded {
        df: DataFrame,
        source: String,
        rows: usize,
        columns: usize,
    },
    Analytics(Box<stats::AnalyticsSummary>),
    Detection(Box<DetectionOutcome>),
    Failed(String),
}

/// Main application window.
pub struct FraudLensApp {
    raw: Option<DataFrame>,
    control_panel: ControlPanel,
    viewer: ChartViewer,
    task_rx: Option<Receiver<TaskResult>>,
    busy: bool,
}

impl FraudLensApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self {
            raw: None,
            control_panel: ControlPanel::new(),
            viewer: ChartViewer::new(),
            task_rx: None,
            busy: false,
        }
    }

    fn start_task(&mut self, task: impl FnOnce(Sender<TaskResult>) + Send + 'static) {
        let (tx, rx) = channel();
        self.task_rx = Some(rx);
        self.busy = true;
        self.control_panel.busy = true;
        thread::spawn(move || task(tx));
    }

    /// Handle CSV file selection; the load runs on a background thread.
    fn handle_browse_csv(&mut self) {
        if self.busy {
            return;
        }

        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        else {
            return;
        };

        self.viewer.clear();
        self.control_panel.has_results = false;
        self.control_panel.dataset_loaded = false;
        self.control_panel.settings.csv_path = Some(path.clone());
        self.control_panel.set_progress(0.0, "Loading CSV file...");

        let path_str = path.to_string_lossy().to_string();
        self.start_task(move |tx| {
            let _ = tx.send(TaskResult::Progress(10.0, "Reading CSV file...".to_string()));

            let df = match loader::load_csv(&path_str) {
                Ok(df) => df,
                Err(e) => {
                    let _ = tx.send(TaskResult::Failed(e.to_string()));
                    return;
                }
            };

            if let Err(e) = pipeline::validate_schema(&df) {
                let _ = tx.send(TaskResult::Failed(e.to_string()));
                return;
            }

            let rows = df.height();
            let columns = loader::column_names(&df).len();
            log::info!("loaded {} rows from {}", rows, path_str);
            let _ = tx.send(TaskResult::Loaded {
                df,
                source: path_str,
                rows,
                columns,
            });
        });
    }

    /// Run the exploratory analytics pass in the background.
    fn start_analytics(&mut self) {
        let Some(df) = self.raw.clone() else {
            self.control_panel.set_progress(0.0, "No data loaded");
            return;
        };

        self.control_panel.set_progress(5.0, "Preprocessing...");
        self.start_task(move |tx| {
            let normalized = match pipeline::preprocess(&df) {
                Ok(out) => out,
                Err(e) => {
                    let _ = tx.send(TaskResult::Failed(e.to_string()));
                    return;
                }
            };

            let _ = tx.send(TaskResult::Progress(
                40.0,
                "Computing statistics...".to_string(),
            ));

            match stats::summarize(&normalized) {
                Ok(summary) => {
                    let _ = tx.send(TaskResult::Analytics(Box::new(summary)));
                }
                Err(e) => {
                    let _ = tx.send(TaskResult::Failed(e.to_string()));
                }
            }
        });
    }

    /// Run detectors, PCA, and the classifiers in the background.
    fn start_detection(&mut self) {
        let Some(df) = self.raw.clone() else {
            self.control_panel.set_progress(0.0, "No data loaded");
            return;
        };
        let settings = self.control_panel.settings.clone();

        self.control_panel.set_progress(5.0, "Preprocessing...");
        self.start_task(move |tx| Self::run_detection(tx, df, settings));
    }

    /// Detection worker (called from a background thread).
    fn run_detection(tx: Sender<TaskResult>, df: DataFrame, settings: UserSettings) {
        macro_rules! step {
            ($expr:expr) => {
                match $expr {
                    Ok(value) => value,
                    Err(e) => {
                        let _ = tx.send(TaskResult::Failed(e.to_string()));
                        return;
                    }
                }
            };
        }

        let normalized = step!(pipeline::preprocess(&df));
        let (_names, features) = step!(pipeline::feature_matrix(&normalized, &[CLASS_COL]));
        let labels = step!(pipeline::class_labels(&normalized));
        let class_counts = step!(stats::class_counts(&normalized));
        let rows = features.nrows();

        let _ = tx.send(TaskResult::Progress(
            20.0,
            "Fitting Isolation Forest...".to_string(),
        ));
        let mut forest = IsolationForest::new()
            .with_contamination(settings.contamination)
            .with_seed(settings.seed);
        let isolation_tags = step!(forest.fit_predict(&features));

        let _ = tx.send(TaskResult::Progress(
            40.0,
            "Projecting with PCA...".to_string(),
        ));
        let embedded = step!(ml::project(&features, settings.pca_components));
        let pca_points: Vec<[f64; 2]> = embedded
            .rows()
            .into_iter()
            .map(|row| [row[0], row[1]])
            .collect();

        let _ = tx.send(TaskResult::Progress(
            55.0,
            "Scoring Local Outlier Factor...".to_string(),
        ));
        let mut lof = LocalOutlierFactor::new(settings.lof_neighbors)
            .with_contamination(settings.contamination);
        let lof_tags = step!(lof.fit_predict(&features));

        let config = TrainConfig {
            test_ratio: settings.test_ratio,
            seed: settings.seed,
            n_trees: settings.rf_trees,
            ..TrainConfig::default()
        };

        let mut evaluations = Vec::new();
        for (i, kind) in ClassifierKind::all().into_iter().enumerate() {
            let _ = tx.send(TaskResult::Progress(
                65.0 + i as f32 * 10.0,
                format!("Training {}...", kind.name()),
            ));
            match train_and_evaluate(&features, &labels, kind, config) {
                Ok(report) => evaluations.push(report),
                Err(e) => {
                    // One failed model does not abort the rest of the run.
                    log::error!("{} failed: {}", kind.name(), e);
                    let _ = tx.send(TaskResult::Progress(
                        65.0 + i as f32 * 10.0,
                        format!("{} failed: {}", kind.name(), e),
                    ));
                }
            }
        }

        let outcome = DetectionOutcome {
            rows,
            class_counts,
            isolation: DetectionSummary {
                method: "Isolation Forest".to_string(),
                contamination: settings.contamination,
                flagged: ml::outlier_count(&isolation_tags),
                rows,
            },
            lof: DetectionSummary {
                method: "Local Outlier Factor".to_string(),
                contamination: settings.contamination,
                flagged: ml::outlier_count(&lof_tags),
                rows,
            },
            evaluations,
            pca_points,
            isolation_tags: isolation_tags.to_vec(),
            lof_tags: lof_tags.to_vec(),
        };

        let _ = tx.send(TaskResult::Detection(Box::new(outcome)));
    }

    /// Poll the background channel for progress and results.
    fn check_task_results(&mut self) {
        let rx = self.task_rx.take();
        if let Some(rx) = rx {
            let mut keep_receiver = true;

            while let Ok(result) = rx.try_recv() {
                match result {
                    TaskResult::Progress(progress, status) => {
                        self.control_panel.set_progress(progress, &status);
                    }
                    TaskResult::Loaded {
                        df,
                        source,
                        rows,
                        columns,
                    } => {
                        self.raw = Some(df);
                        self.viewer.report.source = Some(source);
                        self.control_panel.set_dataset_info(rows, columns);
                        self.control_panel.set_progress(
                            100.0,
                            &format!("Loaded {} rows, {} columns", rows, columns),
                        );
                        self.finish_task();
                        keep_receiver = false;
                    }
                    TaskResult::Analytics(summary) => {
                        self.viewer.report.analytics = Some(*summary);
                        self.viewer.tab = crate::gui::chart_viewer::ViewerTab::Analytics;
                        self.control_panel.has_results = true;
                        self.control_panel
                            .set_progress(100.0, "Data analytics complete");
                        self.finish_task();
                        keep_receiver = false;
                    }
                    TaskResult::Detection(outcome) => {
                        self.viewer.report.detection = Some(*outcome);
                        self.viewer.tab = crate::gui::chart_viewer::ViewerTab::Detection;
                        self.control_panel.has_results = true;
                        self.control_panel
                            .set_progress(100.0, "Detection & models complete");
                        self.finish_task();
                        keep_receiver = false;
                    }
                    TaskResult::Failed(error) => {
                        log::error!("background task failed: {}", error);
                        self.control_panel
                            .set_progress(0.0, &format!("Error: {}", error));
                        self.finish_task();
                        keep_receiver = false;
                    }
                }
            }

            if keep_receiver {
                self.task_rx = Some(rx);
            }
        }
    }

    fn finish_task(&mut self) {
        self.busy = false;
        self.control_panel.busy = false;
    }

    /// Render every available chart as PNG files in a chosen directory.
    fn handle_export_charts(&mut self) {
        if self.viewer.report.is_empty() {
            self.control_panel.set_progress(0.0, "No results to export");
            return;
        }

        let Some(dir) = rfd::FileDialog::new().pick_folder() else {
            return;
        };

        match StaticChartRenderer::export_report(&dir, &self.viewer.report) {
            Ok(files) => {
                log::info!("exported {} charts to {}", files.len(), dir.display());
                self.control_panel.set_progress(
                    100.0,
                    &format!("Exported {} charts to {}", files.len(), dir.display()),
                );
            }
            Err(e) => {
                self.control_panel
                    .set_progress(0.0, &format!("Error: {}", e));
            }
        }
    }

    /// Write the analysis report as pretty JSON.
    fn handle_export_report(&mut self) {
        if self.viewer.report.is_empty() {
            self.control_panel.set_progress(0.0, "No results to export");
            return;
        }

        let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .set_file_name("fraudlens_report.json")
            .save_file()
        else {
            return;
        };

        let result = self
            .viewer
            .report
            .to_json()
            .map_err(anyhow::Error::from)
            .and_then(|json| std::fs::write(&path, json).map_err(anyhow::Error::from));

        match result {
            Ok(()) => {
                self.control_panel
                    .set_progress(100.0, &format!("Report saved to {}", path.display()));
            }
            Err(e) => {
                self.control_panel
                    .set_progress(0.0, &format!("Error: {}", e));
            }
        }
    }
}

impl eframe::App for FraudLensApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_task_results();

        if self.busy {
            ctx.request_repaint();
        }

        SidePanel::left("control_panel")
            .min_width(290.0)
            .max_width(340.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::BrowseCsv => self.handle_browse_csv(),
                        ControlPanelAction::RunAnalytics => {
                            if !self.busy {
                                self.start_analytics();
                            }
                        }
                        ControlPanelAction::RunDetection => {
                            if !self.busy {
                                self.start_detection();
                            }
                        }
                        ControlPanelAction::ExportCharts => self.handle_export_charts(),
                        ControlPanelAction::ExportReport => self.handle_export_report(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.viewer.show(ui);
        });
    }
}
