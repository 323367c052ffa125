use super::{ChartRenderer, CountChart, HistogramChart};
use anyhow::Context;
use plotters::prelude::*;
use std::path::PathBuf;
use tracing::info;

const SIZE: (u32, u32) = (1024, 640);

/// Writes every chart as an SVG file into a directory.
#[derive(Debug, Clone)]
pub struct SvgRenderer {
    dir: PathBuf,
}

impl SvgRenderer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Output path of the chart for `column`.
    pub fn chart_path(&self, column: &str, kind: &str) -> PathBuf {
        let slug: String = column
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}_{}.svg", slug, kind))
    }

    fn prepare(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating chart directory {}", self.dir.display()))
    }
}

impl ChartRenderer for SvgRenderer {
    fn render_counts(&self, chart: &CountChart) -> anyhow::Result<()> {
        self.prepare()?;
        let path = self.chart_path(&chart.column, "counts");

        let labels: Vec<String> = chart.counts.iter().map(|c| c.label.clone()).collect();
        let max = chart.counts.iter().map(|c| c.count).max().unwrap_or(0);
        let y_max = (max as f64 * 1.1).max(1.0);

        let root = SVGBackend::new(&path, SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, ("sans-serif", 28))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(0i32..labels.len().max(1) as i32, 0f64..y_max)?;

        let label_of = |idx: &i32| labels.get(*idx as usize).cloned().unwrap_or_default();
        ctx.configure_mesh()
            .disable_x_mesh()
            .x_labels(labels.len().max(1))
            .x_label_formatter(&label_of)
            .x_desc(chart.column.as_str())
            .y_desc("Count")
            .draw()?;

        ctx.draw_series(chart.counts.iter().enumerate().map(|(idx, c)| {
            let idx = idx as i32;
            Rectangle::new([(idx, 0.0), (idx + 1, c.count as f64)], BLUE.mix(0.6).filled())
        }))?;

        root.present()?;
        info!("Chart saved to {}", path.display());
        Ok(())
    }

    fn render_histogram(&self, chart: &HistogramChart) -> anyhow::Result<()> {
        self.prepare()?;
        let path = self.chart_path(&chart.column, "histogram");

        let (lo, hi) = match (chart.bins.first(), chart.bins.last()) {
            (Some(first), Some(last)) => (first.start, last.end),
            _ => (0.0, 1.0),
        };
        let max = chart.bins.iter().map(|b| b.count).max().unwrap_or(0);
        let y_max = (max as f64 * 1.1).max(1.0);

        let root = SVGBackend::new(&path, SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, ("sans-serif", 28))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(lo..hi, 0f64..y_max)?;

        ctx.configure_mesh()
            .x_desc(chart.column.as_str())
            .y_desc("Frequency")
            .draw()?;

        ctx.draw_series(chart.bins.iter().map(|b| {
            Rectangle::new([(b.start, 0.0), (b.end, b.count as f64)], BLUE.mix(0.6).filled())
        }))?;

        root.present()?;
        info!("Chart saved to {}", path.display());
        Ok(())
    }
}
