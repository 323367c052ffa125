//! Borrower Risk Scoring Pipeline Library
//!
//! Cleans a table of borrower records, renders its demographic distributions
//! and ranks every borrower by a weighted Collection Risk Score, built with
//! Rust and Polars.
//!
//! # Overview
//!
//! The pipeline is a fixed, deterministic sequence of stages over one
//! in-memory table:
//!
//! - **Loading**: CSV to `DataFrame`; a missing file is "no data", not an error
//! - **Transforming**: email and phone normalization, seeded synthesis of
//!   Income Level and Financial Status, numeric and date coercion
//! - **Visualizing**: category counts and a credit score histogram, drawn by a
//!   pluggable [`ChartRenderer`]
//! - **Scoring**: five weighted sub-scores, their sum and a dense rank
//! - **Reporting**: the top-N borrowers with a serializable summary
//!
//! Values that cannot be parsed become nulls and propagate through the score
//! arithmetic instead of aborting the run.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use risk_pipeline::{Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::builder()
//!     .top_n(5)
//!     .render_charts(false)
//!     .build()?;
//!
//! let report = Pipeline::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run("data/10k_borrowers_data.csv")?;
//!
//! if let Some(report) = report {
//!     println!("{}", report.top);
//! }
//! ```
//!
//! # Reproducibility
//!
//! Income Level and Financial Status are drawn from an MT19937 stream seeded
//! with [`PipelineConfig::seed`]. The same seed and row count always give the
//! same assignments; see [`transform`] for the exact draw procedure.

pub mod config;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod reporting;
pub mod scoring;
pub mod transform;
pub mod types;
pub mod utils;
pub mod visualize;

// Re-exports for convenient access
pub use config::{ConfigValidationError, PipelineConfig, PipelineConfigBuilder};
pub use error::{PipelineError, Result as PipelineResult, ResultExt};
pub use loader::DataLoader;
pub use pipeline::{
    ClosureProgressReporter, Pipeline, PipelineBuilder, PipelineStage, ProgressReporter,
    ProgressUpdate,
};
pub use reporting::{RankedBorrower, ReportGenerator, ReportSummary, RiskReport};
pub use scoring::{RiskScorer, ScoringSummary};
pub use transform::Transformer;
pub use types::{FinancialStatus, IncomeLevel, columns};
pub use visualize::{ChartRenderer, SvgRenderer, TerminalRenderer, Visualizer};
