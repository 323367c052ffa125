//! The ranked borrower report.
//!
//! A [`RiskReport`] carries the fully scored table, the top-N table and a
//! serializable [`ReportSummary`]. The summary is what `--json` prints; the
//! tables back the human-readable output.
//!
//! # Example
//!
//! ```rust,ignore
//! use risk_pipeline::Pipeline;
//!
//! let report = Pipeline::builder().build()?.run("data/borrowers.csv")?;
//! if let Some(report) = report {
//!     println!("{}", report.top);
//!     println!("{}", serde_json::to_string_pretty(&report.summary)?);
//! }
//! ```

mod generator;

pub use generator::{
    CellValue, RankedBorrower, ReportGenerator, ReportParams, ReportSummary, RiskReport,
};
