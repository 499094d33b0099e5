//! Chart Plotter Module
//! Interactive visualizations using egui_plot and the egui painter.

use crate::ml::OUTLIER;
use crate::stats::{AnalyticsSummary, ClassCounts, CorrelationMatrix, HistogramBin};
use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, Legend, Plot, PlotPoints, Points};

/// Color for legitimate / inlying rows.
pub const NORMAL_COLOR: Color32 = Color32::from_rgb(46, 204, 113);
/// Color for fraudulent / flagged rows.
pub const FLAGGED_COLOR: Color32 = Color32::from_rgb(231, 76, 60);
/// Neutral accent for single-series charts.
pub const ACCENT_COLOR: Color32 = Color32::from_rgb(52, 152, 219);

const CHART_HEIGHT: f32 = 240.0;

/// Creates the workbench charts.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Bar chart of legitimate vs fraudulent transaction counts.
    pub fn draw_class_bar_chart(ui: &mut egui::Ui, counts: &ClassCounts) {
        let bars = vec![
            Bar::new(0.0, counts.legitimate as f64)
                .width(0.6)
                .fill(NORMAL_COLOR)
                .name("Legitimate"),
            Bar::new(1.0, counts.fraudulent as f64)
                .width(0.6)
                .fill(FLAGGED_COLOR)
                .name("Fraud"),
        ];

        Plot::new("class_counts")
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .x_axis_label("Class")
            .y_axis_label("Count")
            .x_axis_formatter(|mark, _range| match mark.value.round() as i64 {
                0 => "Legitimate".to_string(),
                1 => "Fraud".to_string(),
                _ => String::new(),
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars));
            });
    }

    /// Fixed-width histogram of a numeric column.
    pub fn draw_histogram(ui: &mut egui::Ui, id: &str, bins: &[HistogramBin], x_label: &str) {
        let bars: Vec<Bar> = bins
            .iter()
            .map(|bin| {
                Bar::new((bin.lower + bin.upper) / 2.0, bin.count as f64)
                    .width((bin.upper - bin.lower).max(f64::EPSILON))
                    .fill(ACCENT_COLOR)
            })
            .collect();

        Plot::new(id.to_string())
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .x_axis_label(x_label.to_string())
            .y_axis_label("Count")
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars));
            });
    }

    /// 2-D scatter of projected rows, colored by detector tag.
    pub fn draw_tagged_scatter(
        ui: &mut egui::Ui,
        id: &str,
        points: &[[f64; 2]],
        tags: &[i32],
        flagged_label: &str,
    ) {
        let normal: PlotPoints = points
            .iter()
            .zip(tags.iter())
            .filter(|(_, &tag)| tag != OUTLIER)
            .map(|(p, _)| *p)
            .collect();
        let flagged: PlotPoints = points
            .iter()
            .zip(tags.iter())
            .filter(|(_, &tag)| tag == OUTLIER)
            .map(|(p, _)| *p)
            .collect();

        Plot::new(id.to_string())
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .legend(Legend::default())
            .x_axis_label("Principal Component 1")
            .y_axis_label("Principal Component 2")
            .show(ui, |plot_ui| {
                plot_ui.points(
                    Points::new(normal)
                        .radius(2.0)
                        .color(NORMAL_COLOR)
                        .name("Normal"),
                );
                plot_ui.points(
                    Points::new(flagged)
                        .radius(3.0)
                        .color(FLAGGED_COLOR)
                        .name(flagged_label),
                );
            });
    }

    /// Pie chart of the fraud vs legitimate ratio, painter-drawn.
    pub fn draw_class_pie(ui: &mut egui::Ui, counts: &ClassCounts) {
        let total = counts.total();
        if total == 0 {
            ui.label("No rows");
            return;
        }

        let side = ui.available_width().clamp(160.0, 240.0);
        let (rect, _response) = ui.allocate_exact_size(egui::vec2(side, side), egui::Sense::hover());
        let painter = ui.painter_at(rect);
        let center = rect.center();
        let radius = side * 0.45;

        let slices = [
            (counts.legitimate as f64 / total as f64, NORMAL_COLOR),
            (counts.fraudulent as f64 / total as f64, FLAGGED_COLOR),
        ];

        let mut start = -std::f64::consts::FRAC_PI_2;
        for (fraction, color) in slices {
            let sweep = fraction * std::f64::consts::TAU;
            // Sectors wider than a quarter turn are split so every painted
            // polygon stays convex.
            let parts = (sweep / std::f64::consts::FRAC_PI_2).ceil().max(1.0) as usize;
            for part in 0..parts {
                let a0 = start + sweep * part as f64 / parts as f64;
                let a1 = start + sweep * (part + 1) as f64 / parts as f64;
                let mut polygon = vec![center];
                let steps = 16;
                for s in 0..=steps {
                    let angle = a0 + (a1 - a0) * s as f64 / steps as f64;
                    polygon.push(
                        center
                            + egui::vec2(angle.cos() as f32, angle.sin() as f32) * radius,
                    );
                }
                painter.add(egui::Shape::convex_polygon(
                    polygon,
                    color,
                    egui::Stroke::NONE,
                ));
            }
            start += sweep;
        }

        let legitimate_label = format!("Legitimate {:.1}%", slices[0].0 * 100.0);
        let fraud_label = format!("Fraud {:.1}%", slices[1].0 * 100.0);
        Self::legend_row(
            ui,
            &[
                (legitimate_label.as_str(), NORMAL_COLOR),
                (fraud_label.as_str(), FLAGGED_COLOR),
            ],
        );
    }

    /// Correlation heatmap with a hover readout per cell.
    pub fn draw_correlation_heatmap(ui: &mut egui::Ui, matrix: &CorrelationMatrix) {
        let n = matrix.names.len();
        if n == 0 {
            ui.label("No numeric columns");
            return;
        }

        let side = ui.available_width().clamp(240.0, 420.0);
        let (rect, response) = ui.allocate_exact_size(egui::vec2(side, side), egui::Sense::hover());
        let painter = ui.painter_at(rect);
        let cell = side / n as f32;

        for (i, row) in matrix.values.iter().enumerate() {
            for (j, &r) in row.iter().enumerate() {
                let min = rect.min + egui::vec2(j as f32 * cell, i as f32 * cell);
                painter.rect_filled(
                    egui::Rect::from_min_size(min, egui::vec2(cell, cell)),
                    0.0,
                    Self::diverging_color(r),
                );
            }
        }

        if let Some(pos) = response.hover_pos() {
            let j = (((pos.x - rect.min.x) / cell) as usize).min(n - 1);
            let i = (((pos.y - rect.min.y) / cell) as usize).min(n - 1);
            response.on_hover_text(format!(
                "{} × {}: {:+.2}",
                matrix.names[i], matrix.names[j], matrix.values[i][j]
            ));
        }
    }

    /// Blue-white-red map for correlations in [-1, 1].
    fn diverging_color(r: f64) -> Color32 {
        let r = r.clamp(-1.0, 1.0);
        let lerp = |a: u8, b: u8, t: f64| (a as f64 + (b as f64 - a as f64) * t) as u8;
        if r < 0.0 {
            let t = -r;
            Color32::from_rgb(
                lerp(245, 59, t),
                lerp(245, 76, t),
                lerp(245, 192, t),
            )
        } else {
            Color32::from_rgb(
                lerp(245, 180, r),
                lerp(245, 4, r),
                lerp(245, 38, r),
            )
        }
    }

    /// Horizontal legend of colored squares with labels.
    pub fn legend_row(ui: &mut egui::Ui, entries: &[(&str, Color32)]) {
        ui.horizontal(|ui| {
            for (label, color) in entries {
                let (rect, _) =
                    ui.allocate_exact_size(egui::vec2(14.0, 14.0), egui::Sense::hover());
                ui.painter().rect_filled(rect, 3.0, *color);
                ui.label(RichText::new(*label).size(12.0));
                ui.add_space(10.0);
            }
        });
    }

    /// Per-class descriptive statistics table.
    pub fn draw_stats_table(ui: &mut egui::Ui, summary: &AnalyticsSummary) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new("amount_stats_table")
                    .striped(true)
                    .min_col_width(60.0)
                    .spacing([8.0, 4.0])
                    .show(ui, |ui| {
                        for header in ["Class", "N", "Mean", "Median", "Std", "P95", "P05"] {
                            ui.label(RichText::new(header).strong().size(11.0));
                        }
                        ui.end_row();

                        let rows = [
                            ("Legitimate", &summary.legitimate_amount, NORMAL_COLOR),
                            ("Fraud", &summary.fraud_amount, FLAGGED_COLOR),
                        ];
                        for (label, stats, color) in rows {
                            ui.label(RichText::new(label).size(11.0).color(color));
                            ui.label(RichText::new(stats.count.to_string()).size(11.0));
                            for value in [
                                stats.mean,
                                stats.median,
                                stats.std,
                                stats.p95,
                                stats.p05,
                            ] {
                                ui.label(RichText::new(format!("{:.3}", value)).size(11.0));
                            }
                            ui.end_row();
                        }
                    });

                if let Some(p) = summary.p_value {
                    let color = if summary.is_significant {
                        FLAGGED_COLOR
                    } else {
                        ui.visuals().text_color()
                    };
                    ui.label(
                        RichText::new(format!("Welch t-test p-value: {:.4}", p))
                            .size(11.0)
                            .color(color),
                    );
                }
            });
    }
}
