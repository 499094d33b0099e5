//! Charts module - interactive and exported chart rendering

pub mod plotter;
pub mod renderer;

pub use plotter::ChartPlotter;
pub use renderer::StaticChartRenderer;
