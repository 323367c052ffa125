use super::{CountChart, HistogramChart};
use std::io::Write;

/// A surface charts can be drawn on.
///
/// Implementations must be `Send + Sync` so a pipeline holding one can be
/// moved to a worker thread.
pub trait ChartRenderer: Send + Sync {
    fn render_counts(&self, chart: &CountChart) -> anyhow::Result<()>;

    fn render_histogram(&self, chart: &HistogramChart) -> anyhow::Result<()>;
}

const BAR_WIDTH: usize = 40;
const BAR: char = '█';

/// Draws charts as horizontal text bars on stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalRenderer;

impl TerminalRenderer {
    pub fn format_counts(&self, chart: &CountChart) -> String {
        let rows: Vec<(String, usize)> = chart
            .counts
            .iter()
            .map(|c| (c.label.clone(), c.count))
            .collect();
        let mut out = draw(&chart.title, &rows);
        if chart.missing > 0 {
            out.push_str(&format!("  (missing: {})\n", chart.missing));
        }
        out
    }

    pub fn format_histogram(&self, chart: &HistogramChart) -> String {
        let rows: Vec<(String, usize)> = chart
            .bins
            .iter()
            .map(|b| (format!("{:.1} - {:.1}", b.start, b.end), b.count))
            .collect();
        let mut out = draw(&chart.title, &rows);
        if chart.missing > 0 {
            out.push_str(&format!("  (missing: {})\n", chart.missing));
        }
        out
    }
}

impl ChartRenderer for TerminalRenderer {
    fn render_counts(&self, chart: &CountChart) -> anyhow::Result<()> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", self.format_counts(chart))?;
        Ok(())
    }

    fn render_histogram(&self, chart: &HistogramChart) -> anyhow::Result<()> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", self.format_histogram(chart))?;
        Ok(())
    }
}

fn draw(title: &str, rows: &[(String, usize)]) -> String {
    let mut out = format!("{}\n{}\n", title, "=".repeat(title.chars().count()));
    if rows.is_empty() {
        out.push_str("  (no data)\n");
        return out;
    }

    let label_width = rows.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    let max = rows.iter().map(|(_, c)| *c).max().unwrap_or(0);

    for (label, count) in rows {
        let len = if max == 0 { 0 } else { count * BAR_WIDTH / max };
        out.push_str(&format!(
            "  {:<width$} | {} {}\n",
            label,
            BAR.to_string().repeat(len),
            count,
            width = label_width
        ));
    }
    out
}
