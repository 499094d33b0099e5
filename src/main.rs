//! FraudLens - Credit Card Fraud Analysis & Detection Workbench
//!
//! A Rust application for exploring a credit-card-fraud CSV: canned
//! analytics charts plus anomaly-detection and classification runs.

mod charts;
mod data;
mod gui;
mod ml;
mod report;
mod stats;

use eframe::egui;
use gui::FraudLensApp;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([1100.0, 650.0])
            .with_title("FraudLens"),
        ..Default::default()
    };

    eframe::run_native(
        "FraudLens",
        options,
        Box::new(|cc| Ok(Box::new(FraudLensApp::new(cc)))),
    )
}
