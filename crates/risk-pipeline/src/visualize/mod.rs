//! Distribution charts of the cleaned borrower table.
//!
//! Chart data is computed here and handed to a [`ChartRenderer`], which owns
//! the actual drawing surface. The visualizer only borrows the table.

mod renderer;
mod svg;

pub use renderer::{ChartRenderer, TerminalRenderer};
pub use svg::SvgRenderer;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::types::columns;
use crate::utils::{column_f64, column_strings, has_column, is_numeric_dtype, parse_numeric};
use polars::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Number of rows carrying one category value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
}

/// Counts of a categorical column, in order of first appearance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountChart {
    pub title: String,
    pub column: String,
    pub counts: Vec<CategoryCount>,
    /// Null cells, counted but not drawn.
    pub missing: usize,
}

/// One half-open bin `[start, end)`; the last bin of a histogram is closed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Equal-width histogram of a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramChart {
    pub title: String,
    pub column: String,
    pub bins: Vec<HistogramBin>,
    pub missing: usize,
}

/// A chart ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Chart {
    Counts(CountChart),
    Histogram(HistogramChart),
}

impl Chart {
    pub fn column(&self) -> &str {
        match self {
            Self::Counts(chart) => &chart.column,
            Self::Histogram(chart) => &chart.column,
        }
    }
}

/// Builds the demographic count charts and the credit score histogram.
pub struct Visualizer {
    bins: usize,
}

impl Visualizer {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            bins: config.histogram_bins,
        }
    }

    /// Compute every chart whose column exists.
    ///
    /// Absent columns are skipped with a warning rather than failing the run.
    pub fn charts(&self, df: &DataFrame) -> Result<Vec<Chart>> {
        let mut charts = Vec::new();

        for name in columns::CHARTED_CATEGORIES {
            if !has_column(df, name) {
                warn!("Column '{}' not found, skipping its chart", name);
                continue;
            }
            let values = column_strings(df, name)?;
            let (counts, missing) = category_counts(&values);
            charts.push(Chart::Counts(CountChart {
                title: format!("Borrowers by {}", name),
                column: name.to_string(),
                counts,
                missing,
            }));
        }

        if has_column(df, columns::CREDIT_SCORE) {
            let values = numeric_values(df, columns::CREDIT_SCORE)?;
            let present: Vec<f64> = values.iter().flatten().copied().collect();
            charts.push(Chart::Histogram(HistogramChart {
                title: "Distribution of Credit Scores".to_string(),
                column: columns::CREDIT_SCORE.to_string(),
                bins: histogram(&present, self.bins),
                missing: values.len() - present.len(),
            }));
        } else {
            warn!(
                "Column '{}' not found, skipping its histogram",
                columns::CREDIT_SCORE
            );
        }

        Ok(charts)
    }

    /// Compute and render all charts. Returns the number rendered.
    pub fn render(&self, df: &DataFrame, renderer: &dyn ChartRenderer) -> Result<usize> {
        let charts = self.charts(df)?;
        info!("Rendering {} charts...", charts.len());

        for chart in &charts {
            let rendered = match chart {
                Chart::Counts(counts) => renderer.render_counts(counts),
                Chart::Histogram(hist) => renderer.render_histogram(hist),
            };
            rendered.map_err(|e| {
                PipelineError::RenderFailed(format!("{}: {:#}", chart.column(), e))
            })?;
            debug!("Rendered chart for '{}'", chart.column());
        }

        Ok(charts.len())
    }
}

fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let dtype = df.column(name)?.dtype().clone();
    if is_numeric_dtype(&dtype) {
        column_f64(df, name)
    } else {
        Ok(column_strings(df, name)?
            .into_iter()
            .map(|v| v.as_deref().and_then(parse_numeric))
            .collect())
    }
}

/// Count category values in order of first appearance.
///
/// Returns the counts and the number of null cells.
pub fn category_counts(values: &[Option<String>]) -> (Vec<CategoryCount>, usize) {
    let mut counts: Vec<CategoryCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut missing = 0;

    for value in values {
        let Some(label) = value.as_deref() else {
            missing += 1;
            continue;
        };
        match index.get(label) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(label, counts.len());
                counts.push(CategoryCount {
                    label: label.to_string(),
                    count: 1,
                });
            }
        }
    }

    (counts, missing)
}

/// Equal-width histogram over `[min, max]` of `values`.
///
/// When every value is equal the range is widened to `[v - 0.5, v + 0.5]`.
/// No values (or zero bins) produce no bins.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (lo, hi) = if min == max {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    };
    let width = (hi - lo) / bins as f64;

    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            start: lo + width * i as f64,
            end: if i + 1 == bins {
                hi
            } else {
                lo + width * (i + 1) as f64
            },
            count: 0,
        })
        .collect();

    for &v in values {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingRenderer {
        seen: Mutex<Vec<String>>,
    }

    impl ChartRenderer for RecordingRenderer {
        fn render_counts(&self, chart: &CountChart) -> anyhow::Result<()> {
            self.seen.lock().unwrap().push(chart.title.clone());
            Ok(())
        }

        fn render_histogram(&self, chart: &HistogramChart) -> anyhow::Result<()> {
            self.seen.lock().unwrap().push(chart.title.clone());
            Ok(())
        }
    }

    struct FailingRenderer;

    impl ChartRenderer for FailingRenderer {
        fn render_counts(&self, _chart: &CountChart) -> anyhow::Result<()> {
            anyhow::bail!("surface unavailable")
        }

        fn render_histogram(&self, _chart: &HistogramChart) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn owned(values: &[Option<&str>]) -> Vec<Option<String>> {
        values.iter().map(|v| v.map(str::to_string)).collect()
    }

    #[test]
    fn test_category_counts_first_appearance_order() {
        let values = owned(&[Some("Male"), Some("Female"), None, Some("Male"), Some("Other")]);
        let (counts, missing) = category_counts(&values);
        assert_eq!(
            counts,
            vec![
                CategoryCount { label: "Male".into(), count: 2 },
                CategoryCount { label: "Female".into(), count: 1 },
                CategoryCount { label: "Other".into(), count: 1 },
            ]
        );
        assert_eq!(missing, 1);
    }

    #[test]
    fn test_histogram_equal_width_last_bin_closed() {
        let values = [300.0, 400.0, 500.0, 600.0, 700.0, 850.0];
        let bins = histogram(&values, 5);
        assert_eq!(bins.len(), 5);
        assert_eq!(bins[0].start, 300.0);
        assert_eq!(bins[4].end, 850.0);
        assert!((bins[1].start - 410.0).abs() < 1e-9);
        assert_eq!(bins[0].count, 2);
        // 850 lands in the closed last bin
        assert_eq!(bins[4].count, 1);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), values.len());
    }

    #[test]
    fn test_histogram_single_value_widens_range() {
        let bins = histogram(&[700.0, 700.0], 20);
        assert_eq!(bins.len(), 20);
        assert_eq!(bins[0].start, 699.5);
        assert_eq!(bins[19].end, 700.5);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2);
    }

    #[test]
    fn test_histogram_empty() {
        assert!(histogram(&[], 20).is_empty());
        assert!(histogram(&[1.0], 0).is_empty());
    }

    #[test]
    fn test_charts_skip_absent_columns() {
        let df = df! {
            columns::GENDER => ["Male", "Female", "Male"],
            columns::LOAN_TYPE => ["Home", "Car", "Home"],
            columns::CREDIT_SCORE => [Some(700.0), None, Some(650.0)],
        }
        .unwrap();

        let charts = Visualizer::new(&PipelineConfig::default()).charts(&df).unwrap();
        let names: Vec<&str> = charts.iter().map(|c| c.column()).collect();
        assert_eq!(names, vec!["Gender", "Loan Type", "Credit Score"]);

        match &charts[2] {
            Chart::Histogram(hist) => {
                assert_eq!(hist.bins.len(), 20);
                assert_eq!(hist.missing, 1);
            }
            other => panic!("expected histogram, got {:?}", other),
        }
    }

    #[test]
    fn test_histogram_from_text_column() {
        let df = df! { columns::CREDIT_SCORE => ["700", "x", "650"] }.unwrap();
        let charts = Visualizer::new(&PipelineConfig::default()).charts(&df).unwrap();
        match &charts[0] {
            Chart::Histogram(hist) => {
                assert_eq!(hist.missing, 1);
                assert_eq!(hist.bins.iter().map(|b| b.count).sum::<usize>(), 2);
            }
            other => panic!("expected histogram, got {:?}", other),
        }
    }

    #[test]
    fn test_render_visits_every_chart_and_leaves_table() {
        let df = df! {
            columns::GENDER => ["Male"],
            columns::MARITAL_STATUS => ["Single"],
            columns::LANGUAGE_PREFERENCE => ["Hindi"],
            columns::LOAN_TYPE => ["Home"],
            columns::CREDIT_SCORE => [720.0],
        }
        .unwrap();
        let before = df.clone();

        let renderer = RecordingRenderer::default();
        let rendered = Visualizer::new(&PipelineConfig::default())
            .render(&df, &renderer)
            .unwrap();

        assert_eq!(rendered, 5);
        assert_eq!(
            *renderer.seen.lock().unwrap(),
            vec![
                "Borrowers by Gender",
                "Borrowers by Marital Status",
                "Borrowers by Language Preference",
                "Borrowers by Loan Type",
                "Distribution of Credit Scores",
            ]
        );
        assert!(df.equals_missing(&before));
    }

    #[test]
    fn test_render_failure_is_render_error() {
        let df = df! { columns::GENDER => ["Male"] }.unwrap();
        let err = Visualizer::new(&PipelineConfig::default())
            .render(&df, &FailingRenderer)
            .unwrap_err();
        assert_eq!(err.error_code(), "RENDER_FAILED");
        assert!(err.to_string().contains("surface unavailable"));
    }
}
