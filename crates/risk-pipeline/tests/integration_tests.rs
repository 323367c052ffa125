//! Integration tests for the risk scoring pipeline.
//!
//! These tests run the whole pipeline over the CSV fixtures and check the
//! documented behaviour end to end.

use once_cell::sync::Lazy;
use polars::prelude::*;
use pretty_assertions::assert_eq;
use regex::Regex;
use risk_pipeline::visualize::{CountChart, HistogramChart};
use risk_pipeline::{
    ChartRenderer, DataLoader, Pipeline, PipelineConfig, PipelineError, PipelineStage,
    RiskReport, columns,
};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

// ============================================================================
// Helper Functions
// ============================================================================

static EMAIL_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^@]*@gmail\.com$").unwrap());
static PHONE_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+91\d{10}$").unwrap());

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn quiet_config() -> PipelineConfig {
    PipelineConfig::builder()
        .render_charts(false)
        .build()
        .unwrap()
}

fn run_small() -> RiskReport {
    Pipeline::builder()
        .config(quiet_config())
        .build()
        .unwrap()
        .run(fixtures_path().join("borrowers_small.csv"))
        .unwrap()
        .expect("fixture exists")
}

fn strings(df: &DataFrame, name: &str) -> Vec<Option<String>> {
    df.column(name)
        .unwrap()
        .cast(&DataType::String)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect()
}

fn floats(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    df.column(name)
        .unwrap()
        .cast(&DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect()
}

#[derive(Default)]
struct RecordingRenderer {
    charts: Mutex<Vec<String>>,
}

impl ChartRenderer for RecordingRenderer {
    fn render_counts(&self, chart: &CountChart) -> anyhow::Result<()> {
        self.charts.lock().unwrap().push(chart.column.clone());
        Ok(())
    }

    fn render_histogram(&self, chart: &HistogramChart) -> anyhow::Result<()> {
        self.charts.lock().unwrap().push(chart.column.clone());
        Ok(())
    }
}

// ============================================================================
// Loader
// ============================================================================

#[test]
fn test_loader_reads_fixture_as_text() {
    let df = DataLoader::load(fixtures_path().join("borrowers_small.csv"))
        .unwrap()
        .unwrap();

    assert_eq!(df.shape(), (10, 15));
    for col in df.get_columns() {
        assert_eq!(col.dtype(), &DataType::String, "column {}", col.name());
    }
}

#[test]
fn test_missing_file_runs_no_further_stage() {
    let stages = Arc::new(Mutex::new(Vec::new()));
    let stages_clone = stages.clone();
    let renderer = Arc::new(RecordingRenderer::default());

    let report = Pipeline::builder()
        .renderer(renderer.clone())
        .on_progress(move |update| stages_clone.lock().unwrap().push(update.stage))
        .build()
        .unwrap()
        .run(fixtures_path().join("does_not_exist.csv"))
        .unwrap();

    assert!(report.is_none());
    assert_eq!(*stages.lock().unwrap(), vec![PipelineStage::Loading]);
    assert!(renderer.charts.lock().unwrap().is_empty());
}

// ============================================================================
// Transformation Properties
// ============================================================================

#[test]
fn test_contact_fields_normalized() {
    let report = run_small();

    for email in strings(&report.scored, columns::EMAIL).iter().flatten() {
        assert!(EMAIL_SHAPE.is_match(email), "bad email: {}", email);
    }
    let phones = strings(&report.scored, columns::PHONE);
    for phone in &phones {
        let phone = phone.as_deref().expect("phone is never missing");
        assert!(PHONE_SHAPE.is_match(phone), "bad phone: {}", phone);
    }

    assert_eq!(phones[1].as_deref(), Some("+919123456789"));
    assert_eq!(phones[2].as_deref(), Some("+918023456789"));
    assert_eq!(phones[5].as_deref(), Some("+910000000123"));
    assert_eq!(phones[6].as_deref(), Some("+910000000000"));
}

#[test]
fn test_synthetic_categories_reproducible() {
    let first = run_small();
    let second = run_small();

    let income = strings(&first.scored, columns::INCOME_LEVEL);
    let status = strings(&first.scored, columns::FINANCIAL_STATUS);

    let income: Vec<&str> = income.iter().map(|v| v.as_deref().unwrap()).collect();
    let status: Vec<&str> = status.iter().map(|v| v.as_deref().unwrap()).collect();

    assert_eq!(
        income,
        vec!["medium", "high", "high", "medium", "low", "low", "low", "high", "medium", "high"]
    );
    assert_eq!(
        status,
        vec![
            "stable",
            "unstable",
            "unstable",
            "stable",
            "stable",
            "stable",
            "stable",
            "semi-stable",
            "semi-stable",
            "stable",
        ]
    );

    assert!(first.scored.equals_missing(&second.scored));
}

#[test]
fn test_different_seed_changes_assignments() {
    let config = PipelineConfig::builder()
        .render_charts(false)
        .seed(7)
        .build()
        .unwrap();
    let other = Pipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .run(fixtures_path().join("borrowers_small.csv"))
        .unwrap()
        .unwrap();

    let base = run_small();
    assert_ne!(
        strings(&base.scored, columns::INCOME_LEVEL),
        strings(&other.scored, columns::INCOME_LEVEL)
    );
}

#[test]
fn test_coercion_failures_become_missing() {
    let report = run_small();

    assert_eq!(floats(&report.scored, columns::LOAN_AMOUNT)[3], None);
    assert_eq!(floats(&report.scored, columns::CREDIT_SCORE)[5], None);
    assert_eq!(floats(&report.scored, columns::DAYS_LEFT)[3], None);

    let dob = report.scored.column(columns::DATE_OF_BIRTH).unwrap();
    assert_eq!(dob.dtype(), &DataType::Date);
    // 31-02-1992 and 1988-07-04 do not parse
    assert_eq!(dob.null_count(), 2);
}

// ============================================================================
// Scoring Properties
// ============================================================================

#[test]
fn test_sub_scores_take_documented_values() {
    let report = run_small();
    let df = &report.scored;

    for v in floats(df, columns::PH_SCORE).into_iter().flatten() {
        assert!([0.0, 4.5, 9.0].contains(&v), "PH_Score {}", v);
    }
    for v in floats(df, columns::IL_SCORE).into_iter().flatten() {
        assert!([0.0, 2.0, 4.0].contains(&v), "IL_Score {}", v);
    }
    for v in floats(df, columns::ES_SCORE).into_iter().flatten() {
        assert!([0.0, 1.125, 2.25].contains(&v), "ES_Score {}", v);
    }

    let credit = floats(df, columns::CREDIT_SCORE);
    let cs = floats(df, columns::CS_SCORE);
    for (c, s) in credit.iter().zip(&cs) {
        match (c, s) {
            (Some(c), Some(s)) => assert!((c * 15.0 * 0.15 / 850.0 - s).abs() < 1e-9),
            (None, None) => {}
            other => panic!("credit score and CS_Score disagree: {:?}", other),
        }
    }
}

#[test]
fn test_zero_loan_term_gives_missing_oda() {
    let report = run_small();
    assert_eq!(floats(&report.scored, columns::LOAN_TERM)[2], Some(0.0));
    assert_eq!(floats(&report.scored, columns::TOTAL_AMOUNT_TO_BE_PAID)[2], None);
    assert_eq!(floats(&report.scored, columns::ODA_SCORE)[2], None);
    assert_eq!(floats(&report.scored, columns::RISK_SCORE)[2], None);
}

#[test]
fn test_composite_scores_and_dense_rank() {
    let report = run_small();
    let scores = floats(&report.scored, columns::RISK_SCORE);
    let expected = [
        Some(-28.5),
        Some(-9.647058823529413),
        None,
        None,
        Some(-11.132352941176471),
        None,
        Some(-30.5),
        Some(-27.625),
        Some(-29.625),
        Some(-26.5),
    ];
    for (i, (got, want)) in scores.iter().zip(expected).enumerate() {
        match (got, want) {
            (Some(g), Some(w)) => assert!((g - w).abs() < 1e-9, "row {}: {} vs {}", i, g, w),
            (None, None) => {}
            other => panic!("row {}: {:?}", i, other),
        }
    }

    let ranks: Vec<u32> = report
        .scored
        .column(columns::RANK)
        .unwrap()
        .u32()
        .unwrap()
        .into_iter()
        .map(|r| r.unwrap())
        .collect();
    assert_eq!(ranks, vec![5, 1, 8, 8, 2, 8, 7, 4, 6, 3]);
}

#[test]
fn test_derived_columns_appended_in_order() {
    let report = run_small();
    let names: Vec<String> = report
        .scored
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    let tail = names[names.len() - 8..].to_vec();
    assert_eq!(
        tail,
        vec![
            "TotalAmountToBePaid",
            "PH_Score",
            "ODA_Score",
            "IL_Score",
            "ES_Score",
            "CS_Score",
            "CollectionRiskScore",
            "Rank",
        ]
    );
}

// ============================================================================
// Report
// ============================================================================

#[test]
fn test_top_five_report() {
    let report = run_small();
    let rows: Vec<usize> = report.summary.top_borrowers.iter().map(|b| b.row).collect();
    let ranks: Vec<u32> = report.summary.top_borrowers.iter().map(|b| b.rank).collect();

    assert_eq!(rows, vec![1, 4, 9, 7, 0]);
    assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
    assert_eq!(report.top.height(), 5);
    assert_eq!(
        strings(&report.top, "Customer ID"),
        vec![
            Some("C002".to_string()),
            Some("C005".to_string()),
            Some("C010".to_string()),
            Some("C008".to_string()),
            Some("C001".to_string()),
        ]
    );
    assert_eq!(report.summary.scoring.missing[columns::RISK_SCORE], 3);
    assert_eq!(report.summary.shape, (10, 25));
}

#[test]
fn test_report_summary_json() {
    let report = run_small();
    let json: serde_json::Value = serde_json::to_value(&report.summary).unwrap();

    assert_eq!(json["top_borrowers"].as_array().unwrap().len(), 5);
    assert_eq!(json["top_borrowers"][0]["row"], 1);
    assert!(json["input_file"].as_str().unwrap().ends_with("borrowers_small.csv"));
}

// ============================================================================
// Charts and Progress
// ============================================================================

#[test]
fn test_charts_rendered_for_every_distribution() {
    let renderer = Arc::new(RecordingRenderer::default());
    let report = Pipeline::builder()
        .renderer(renderer.clone())
        .build()
        .unwrap()
        .run(fixtures_path().join("borrowers_small.csv"))
        .unwrap()
        .unwrap();

    assert_eq!(report.summary.charts_rendered, 5);
    assert_eq!(
        *renderer.charts.lock().unwrap(),
        vec![
            "Gender",
            "Marital Status",
            "Language Preference",
            "Loan Type",
            "Credit Score",
        ]
    );
}

#[test]
fn test_progress_follows_stage_order() {
    let stages = Arc::new(Mutex::new(Vec::new()));
    let stages_clone = stages.clone();

    Pipeline::builder()
        .renderer(Arc::new(RecordingRenderer::default()))
        .on_progress(move |update| stages_clone.lock().unwrap().push(update.stage))
        .build()
        .unwrap()
        .run(fixtures_path().join("borrowers_small.csv"))
        .unwrap()
        .unwrap();

    let mut seen = stages.lock().unwrap().clone();
    seen.dedup();
    assert_eq!(
        seen,
        vec![
            PipelineStage::Loading,
            PipelineStage::Transforming,
            PipelineStage::Visualizing,
            PipelineStage::Scoring,
            PipelineStage::Reporting,
            PipelineStage::Complete,
        ]
    );
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_missing_scoring_columns_fail_the_run() {
    let renderer = Arc::new(RecordingRenderer::default());
    let err = Pipeline::builder()
        .renderer(renderer.clone())
        .build()
        .unwrap()
        .run(fixtures_path().join("missing_columns.csv"))
        .unwrap_err();

    match err {
        PipelineError::MissingColumns { stage, columns } => {
            assert_eq!(stage, "Scorer");
            assert_eq!(columns, vec!["Loan Term".to_string()]);
        }
        other => panic!("expected MissingColumns, got {:?}", other),
    }
    // absent demographic columns are skipped; the histogram still renders
    assert_eq!(*renderer.charts.lock().unwrap(), vec!["Credit Score"]);
}

#[test]
fn test_process_in_memory_table() {
    let df = DataLoader::from_csv_str(
        "Email Address,Phone Number,Loan Amount,Interest Rate,Days Left to Pay Current EMI,Date of Birth,Credit Score,Loan Term,Delayed Payment\n\
         a@x.com,9876543210,1000,7,3,01-01-1990,850,1,No\n",
    )
    .unwrap();

    let report = Pipeline::builder()
        .config(quiet_config())
        .build()
        .unwrap()
        .process(df)
        .unwrap();

    assert_eq!(report.summary.input_file, None);
    assert_eq!(report.summary.top_borrowers.len(), 1);
    // seed 42 with one row: medium income, unstable status
    assert!((report.summary.top_borrowers[0].score - 13.25).abs() < 1e-9);
}
