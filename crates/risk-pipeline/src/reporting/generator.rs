use crate::error::{PipelineError, Result};
use crate::scoring::ScoringSummary;
use crate::types::columns;
use crate::utils::{column_f64, column_strings};
use chrono::Local;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::path::Path;
use tracing::info;

// ============================================================================
// Report Types
// ============================================================================

/// Result of a full pipeline run.
#[derive(Debug, Clone)]
pub struct RiskReport {
    /// Every borrower with derived columns and rank.
    pub scored: DataFrame,
    /// The highest-scoring borrowers, best first.
    pub top: DataFrame,
    pub summary: ReportSummary,
}

/// Serializable overview of a run, printed by `--json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Timestamp when the report was generated
    pub generated_at: String,
    /// Path to the input file, when the table came from one
    pub input_file: Option<String>,
    /// Shape of the scored table (rows, columns)
    pub shape: (usize, usize),
    /// Transformation steps in the order they ran
    pub processing_steps: Vec<String>,
    /// Number of charts rendered
    pub charts_rendered: usize,
    pub scoring: ScoringSummary,
    pub top_borrowers: Vec<RankedBorrower>,
}

/// One row of the top-N list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedBorrower {
    /// Zero-based row index in the input table
    pub row: usize,
    pub rank: u32,
    pub score: f64,
    pub income_level: Option<String>,
    pub financial_status: Option<String>,
    pub total_amount_to_be_paid: Option<f64>,
    pub ph_score: Option<f64>,
    pub oda_score: Option<f64>,
    pub il_score: Option<f64>,
    pub es_score: Option<f64>,
    pub cs_score: Option<f64>,
    /// Every cell of the row, in column order
    pub record: Vec<CellValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellValue {
    pub column: String,
    pub value: Option<String>,
}

/// Inputs for [`ReportGenerator::build`].
pub struct ReportParams<'a> {
    pub input_file: Option<&'a Path>,
    pub scored: DataFrame,
    pub top: DataFrame,
    /// Row indices of `top` within `scored`
    pub top_rows: &'a [usize],
    pub scoring: ScoringSummary,
    pub processing_steps: Vec<String>,
    pub charts_rendered: usize,
}

pub struct ReportGenerator;

impl ReportGenerator {
    /// Assemble the report from the scored and top-N tables.
    pub fn build(params: ReportParams<'_>) -> Result<RiskReport> {
        let ReportParams {
            input_file,
            scored,
            top,
            top_rows,
            scoring,
            processing_steps,
            charts_rendered,
        } = params;

        let top_borrowers = Self::ranked_borrowers(&top, top_rows)?;

        let summary = ReportSummary {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_file: input_file.map(|p| p.display().to_string()),
            shape: scored.shape(),
            processing_steps,
            charts_rendered,
            scoring,
            top_borrowers,
        };

        info!(
            "Report generated: top {} of {} borrowers",
            summary.top_borrowers.len(),
            summary.shape.0
        );

        Ok(RiskReport {
            scored,
            top,
            summary,
        })
    }

    fn ranked_borrowers(top: &DataFrame, rows: &[usize]) -> Result<Vec<RankedBorrower>> {
        if rows.len() != top.height() {
            return Err(PipelineError::Internal(format!(
                "{} row indices for a top table of {} rows",
                rows.len(),
                top.height()
            )));
        }

        let scores = column_f64(top, columns::RISK_SCORE)?;
        let ranks = column_f64(top, columns::RANK)?;
        let totals = column_f64(top, columns::TOTAL_AMOUNT_TO_BE_PAID)?;
        let income = column_strings(top, columns::INCOME_LEVEL)?;
        let status = column_strings(top, columns::FINANCIAL_STATUS)?;
        let sub_scores = columns::SUB_SCORES
            .iter()
            .map(|name| column_f64(top, name))
            .collect::<Result<Vec<_>>>()?;

        let names: Vec<String> = top
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        let cells = names
            .iter()
            .map(|name| column_strings(top, name))
            .collect::<Result<Vec<_>>>()?;

        let mut out = Vec::with_capacity(rows.len());
        for (i, &row) in rows.iter().enumerate() {
            let score = scores[i].ok_or_else(|| {
                PipelineError::Internal(format!("top row {} has no score", row))
            })?;
            let rank = ranks[i].map(|r| r as u32).unwrap_or_default();
            let record = names
                .iter()
                .zip(&cells)
                .map(|(column, values)| CellValue {
                    column: column.clone(),
                    value: values[i].clone(),
                })
                .collect();

            out.push(RankedBorrower {
                row,
                rank,
                score,
                income_level: income[i].clone(),
                financial_status: status[i].clone(),
                total_amount_to_be_paid: totals[i],
                ph_score: sub_scores[0][i],
                oda_score: sub_scores[1][i],
                il_score: sub_scores[2][i],
                es_score: sub_scores[3][i],
                cs_score: sub_scores[4][i],
                record,
            });
        }
        Ok(out)
    }

    /// Fixed-width table of the top borrowers' scores.
    pub fn score_table(summary: &ReportSummary) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:>6} {:>5} {:>7} {:>12} {:>20} {:>9} {:>10} {:>9} {:>9} {:>9} {:>20}",
            "Row",
            "Rank",
            "Income",
            "Status",
            columns::TOTAL_AMOUNT_TO_BE_PAID,
            "PH_Score", "ODA_Score", "IL_Score", "ES_Score", "CS_Score",
            columns::RISK_SCORE
        );
        for b in &summary.top_borrowers {
            let _ = writeln!(
                out,
                "{:>6} {:>5} {:>7} {:>12} {:>20} {:>9} {:>10} {:>9} {:>9} {:>9} {:>20.4}",
                b.row,
                b.rank,
                b.income_level.as_deref().unwrap_or("null"),
                b.financial_status.as_deref().unwrap_or("null"),
                fmt_score(b.total_amount_to_be_paid),
                fmt_score(b.ph_score),
                fmt_score(b.oda_score),
                fmt_score(b.il_score),
                fmt_score(b.es_score),
                fmt_score(b.cs_score),
                b.score
            );
        }
        out
    }
}

fn fmt_score(value: Option<f64>) -> String {
    value.map_or_else(|| "null".to_string(), |v| format!("{:.4}", v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::RiskScorer;
    use pretty_assertions::assert_eq;

    fn scored() -> (DataFrame, ScoringSummary) {
        let df = df! {
            "Customer" => ["A", "B", "C"],
            columns::DELAYED_PAYMENT => ["No", "Yes", "No"],
            columns::LOAN_AMOUNT => [Some(1000.0), Some(2000.0), None],
            columns::LOAN_TERM => [1.0, 1.0, 1.0],
            columns::INCOME_LEVEL => ["high", "low", "medium"],
            columns::FINANCIAL_STATUS => ["stable", "unstable", "stable"],
            columns::CREDIT_SCORE => [850.0, 425.0, 700.0],
        }
        .unwrap();
        RiskScorer.score(df).unwrap()
    }

    fn report() -> RiskReport {
        let (scored, scoring) = scored();
        let (top, rows) = RiskScorer.top_borrowers(&scored, 5).unwrap();
        ReportGenerator::build(ReportParams {
            input_file: Some(Path::new("data/borrowers.csv")),
            scored,
            top,
            top_rows: &rows,
            scoring,
            processing_steps: vec!["step".into()],
            charts_rendered: 0,
        })
        .unwrap()
    }

    #[test]
    fn test_ranked_borrowers_carry_scores_and_cells() {
        let report = report();
        let top = &report.summary.top_borrowers;

        assert_eq!(top.len(), 2);
        assert_eq!(top[0].row, 0);
        assert_eq!(top[0].rank, 1);
        assert_eq!(top[0].score, 17.5);
        assert_eq!(top[0].ph_score, Some(9.0));
        assert_eq!(top[0].total_amount_to_be_paid, Some(1000.0));
        assert_eq!(top[0].income_level.as_deref(), Some("high"));
        assert_eq!(top[1].financial_status.as_deref(), Some("unstable"));
        assert_eq!(top[1].row, 1);
        assert_eq!(top[1].rank, 2);
        assert_eq!(
            top[0].record[0],
            CellValue {
                column: "Customer".into(),
                value: Some("A".into())
            }
        );
    }

    #[test]
    fn test_summary_shape_and_input() {
        let report = report();
        assert_eq!(report.summary.shape, (3, 15));
        assert_eq!(report.summary.input_file.as_deref(), Some("data/borrowers.csv"));
        assert_eq!(report.top.height(), 2);
    }

    #[test]
    fn test_summary_serializes() {
        let json = serde_json::to_string(&report().summary).unwrap();
        assert!(json.contains("\"top_borrowers\""));
        assert!(json.contains("\"generated_at\""));
        assert!(json.contains("\"column\":\"Customer\""));
    }

    #[test]
    fn test_score_table_lists_rows() {
        let table = ReportGenerator::score_table(&report().summary);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("CollectionRiskScore"));
        assert!(lines[0].contains("TotalAmountToBePaid"));
        assert!(lines[1].contains("1000.0000"));
        assert!(lines[1].contains("high"));
        assert!(lines[1].trim_start().starts_with("0     1"));
        assert!(lines[1].ends_with("17.5000"));
    }

    #[test]
    fn test_mismatched_rows_is_internal_error() {
        let (scored, scoring) = scored();
        let (top, _) = RiskScorer.top_borrowers(&scored, 5).unwrap();
        let err = ReportGenerator::build(ReportParams {
            input_file: None,
            scored,
            top,
            top_rows: &[0],
            scoring,
            processing_steps: vec![],
            charts_rendered: 0,
        })
        .unwrap_err();
        assert_eq!(err.error_code(), "INTERNAL_ERROR");
    }
}
