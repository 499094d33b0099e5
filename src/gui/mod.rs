//! GUI module - User interface components

mod app;
pub mod chart_viewer;
mod control_panel;

pub use app::FraudLensApp;
pub use chart_viewer::ChartViewer;
pub use control_panel::{ControlPanel, ControlPanelAction, UserSettings};
