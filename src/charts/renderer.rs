//! Static Chart Renderer
//! Writes the workbench charts as PNG files for use outside the app.

use crate::report::AnalysisReport;
use crate::stats::{ClassCounts, CorrelationMatrix, HistogramBin};
use anyhow::{anyhow, Result};
use plotters::prelude::*;
use std::path::{Path, PathBuf};

const CHART_SIZE: (u32, u32) = (900, 600);

const NORMAL: RGBColor = RGBColor(46, 204, 113);
const FLAGGED: RGBColor = RGBColor(231, 76, 60);
const ACCENT: RGBColor = RGBColor(52, 152, 219);

fn draw_err<E: std::fmt::Display>(e: E) -> anyhow::Error {
    anyhow!("chart rendering failed: {e}")
}

/// Renders chart PNGs for everything present in a report.
pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Write one PNG per available chart into `dir`; returns the paths.
    pub fn export_report(dir: &Path, report: &AnalysisReport) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();

        if let Some(analytics) = &report.analytics {
            written.push(Self::class_bar(
                &dir.join("class_distribution.png"),
                &analytics.class_counts,
            )?);
            written.push(Self::histogram(
                &dir.join("amount_distribution.png"),
                &analytics.amount_histogram,
                "Transaction Amount Distribution",
                "Normalized Transaction Amount",
            )?);
            if let Some(time_bins) = &analytics.time_histogram {
                written.push(Self::histogram(
                    &dir.join("time_distribution.png"),
                    time_bins,
                    "Distribution of Transactions over Time",
                    "Time",
                )?);
            }
            written.push(Self::heatmap(
                &dir.join("correlation_matrix.png"),
                &analytics.correlation,
            )?);
        }

        if let Some(detection) = &report.detection {
            written.push(Self::scatter(
                &dir.join("pca_outliers.png"),
                &detection.pca_points,
                &detection.isolation_tags,
                "PCA Outlier Detection",
                "Outlier",
            )?);
            written.push(Self::scatter(
                &dir.join("lof_anomalies.png"),
                &detection.pca_points,
                &detection.lof_tags,
                "Anomaly Detection using LOF",
                "Anomaly",
            )?);
            written.push(Self::pie(
                &dir.join("fraud_ratio.png"),
                &detection.class_counts,
            )?);
        }

        if written.is_empty() {
            return Err(anyhow!("nothing to export; run an analysis first"));
        }

        Ok(written)
    }

    fn class_bar(path: &Path, counts: &ClassCounts) -> Result<PathBuf> {
        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let top = counts.legitimate.max(counts.fraudulent).max(1) as f64 * 1.1;
        let mut chart = ChartBuilder::on(&root)
            .caption(
                "Distribution of Fraud vs Non-Fraud Transactions",
                ("sans-serif", 24),
            )
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(-0.5f64..1.5f64, 0f64..top)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .x_labels(2)
            .x_label_formatter(&|x| {
                if *x < 0.5 {
                    "Legitimate".to_string()
                } else {
                    "Fraud".to_string()
                }
            })
            .y_desc("Count")
            .draw()
            .map_err(draw_err)?;

        chart
            .draw_series([
                Rectangle::new([(-0.3, 0.0), (0.3, counts.legitimate as f64)], NORMAL.filled()),
                Rectangle::new([(0.7, 0.0), (1.3, counts.fraudulent as f64)], FLAGGED.filled()),
            ])
            .map_err(draw_err)?;

        root.present().map_err(draw_err)?;
        Ok(path.to_path_buf())
    }

    fn histogram(
        path: &Path,
        bins: &[HistogramBin],
        caption: &str,
        x_label: &str,
    ) -> Result<PathBuf> {
        if bins.is_empty() {
            return Err(anyhow!("no data to draw for '{caption}'"));
        }

        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let x_min = bins.first().map(|b| b.lower).unwrap_or(0.0);
        // Constant columns collapse to a single zero-width bin.
        let x_max = bins
            .last()
            .map(|b| b.upper)
            .unwrap_or(1.0)
            .max(x_min + 1e-9);
        let top = bins.iter().map(|b| b.count).max().unwrap_or(1) as f64 * 1.1;

        let mut chart = ChartBuilder::on(&root)
            .caption(caption, ("sans-serif", 24))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(x_min..x_max, 0f64..top)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .x_desc(x_label)
            .y_desc("Count")
            .draw()
            .map_err(draw_err)?;

        chart
            .draw_series(bins.iter().map(|bin| {
                Rectangle::new([(bin.lower, 0.0), (bin.upper, bin.count as f64)], ACCENT.filled())
            }))
            .map_err(draw_err)?;

        root.present().map_err(draw_err)?;
        Ok(path.to_path_buf())
    }

    fn heatmap(path: &Path, matrix: &CorrelationMatrix) -> Result<PathBuf> {
        let n = matrix.names.len();
        if n == 0 {
            return Err(anyhow!("no numeric columns to correlate"));
        }

        let root = BitMapBackend::new(path, (800, 800)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Feature Correlation Matrix", ("sans-serif", 24))
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(30)
            .build_cartesian_2d(0f64..n as f64, 0f64..n as f64)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .disable_y_mesh()
            .draw()
            .map_err(draw_err)?;

        chart
            .draw_series(matrix.values.iter().enumerate().flat_map(|(i, row)| {
                row.iter().enumerate().map(move |(j, &r)| {
                    let y = (n - 1 - i) as f64;
                    Rectangle::new(
                        [(j as f64, y), (j as f64 + 1.0, y + 1.0)],
                        Self::diverging(r).filled(),
                    )
                })
            }))
            .map_err(draw_err)?;

        root.present().map_err(draw_err)?;
        Ok(path.to_path_buf())
    }

    /// Blue-white-red map for correlations in [-1, 1].
    fn diverging(r: f64) -> RGBColor {
        let r = r.clamp(-1.0, 1.0);
        let lerp = |a: u8, b: u8, t: f64| (a as f64 + (b as f64 - a as f64) * t) as u8;
        if r < 0.0 {
            let t = -r;
            RGBColor(lerp(245, 59, t), lerp(245, 76, t), lerp(245, 192, t))
        } else {
            RGBColor(lerp(245, 180, r), lerp(245, 4, r), lerp(245, 38, r))
        }
    }

    fn scatter(
        path: &Path,
        points: &[[f64; 2]],
        tags: &[i32],
        caption: &str,
        flagged_label: &str,
    ) -> Result<PathBuf> {
        if points.is_empty() {
            return Err(anyhow!("no projected points to draw"));
        }

        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
        for p in points {
            x_min = x_min.min(p[0]);
            x_max = x_max.max(p[0]);
            y_min = y_min.min(p[1]);
            y_max = y_max.max(p[1]);
        }
        let x_pad = ((x_max - x_min) * 0.05).max(1e-6);
        let y_pad = ((y_max - y_min) * 0.05).max(1e-6);

        let mut chart = ChartBuilder::on(&root)
            .caption(caption, ("sans-serif", 24))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_min - x_pad..x_max + x_pad, y_min - y_pad..y_max + y_pad)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .x_desc("Principal Component 1")
            .y_desc("Principal Component 2")
            .draw()
            .map_err(draw_err)?;

        chart
            .draw_series(
                points
                    .iter()
                    .zip(tags.iter())
                    .filter(|(_, &t)| t != crate::ml::OUTLIER)
                    .map(|(p, _)| Circle::new((p[0], p[1]), 2, NORMAL.filled())),
            )
            .map_err(draw_err)?
            .label("Normal")
            .legend(|(x, y)| Circle::new((x, y), 3, NORMAL.filled()));

        chart
            .draw_series(
                points
                    .iter()
                    .zip(tags.iter())
                    .filter(|(_, &t)| t == crate::ml::OUTLIER)
                    .map(|(p, _)| Circle::new((p[0], p[1]), 3, FLAGGED.filled())),
            )
            .map_err(draw_err)?
            .label(flagged_label)
            .legend(|(x, y)| Circle::new((x, y), 3, FLAGGED.filled()));

        chart
            .configure_series_labels()
            .border_style(BLACK)
            .background_style(WHITE.mix(0.8))
            .draw()
            .map_err(draw_err)?;

        root.present().map_err(draw_err)?;
        Ok(path.to_path_buf())
    }

    fn pie(path: &Path, counts: &ClassCounts) -> Result<PathBuf> {
        if counts.total() == 0 {
            return Err(anyhow!("no rows for the class ratio chart"));
        }

        let root = BitMapBackend::new(path, (700, 700)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        root.titled("Ratio of Fraud vs Non-Fraud", ("sans-serif", 26))
            .map_err(draw_err)?;

        let center = (350, 360);
        let radius = 240.0;
        let sizes = vec![counts.fraudulent as f64, counts.legitimate as f64];
        let colors = vec![FLAGGED, NORMAL];
        let labels = vec!["Fraud".to_string(), "Legitimate".to_string()];

        let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
        pie.percentages(("sans-serif", 18).into_font());
        pie.label_style(("sans-serif", 20).into_font());
        root.draw(&pie).map_err(draw_err)?;

        root.present().map_err(draw_err)?;
        Ok(path.to_path_buf())
    }
}
