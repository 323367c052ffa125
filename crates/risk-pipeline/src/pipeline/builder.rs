//! Main risk scoring pipeline module.
//!
//! This module provides the core `Pipeline` struct and builder for
//! orchestrating Loader → Transformer → Visualizer → Scorer → report.

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::loader::DataLoader;
use crate::pipeline::progress::{
    ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate,
};
use crate::reporting::{ReportGenerator, ReportParams, RiskReport};
use crate::scoring::RiskScorer;
use crate::transform::Transformer;
use crate::visualize::{ChartRenderer, SvgRenderer, TerminalRenderer, Visualizer};
use polars::prelude::*;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// The risk scoring pipeline.
///
/// Use [`Pipeline::builder()`] to create a new pipeline with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use risk_pipeline::{Pipeline, PipelineConfig};
///
/// let report = Pipeline::builder()
///     .config(PipelineConfig::builder().top_n(10).build()?)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .run("data/10k_borrowers_data.csv")?;
///
/// match report {
///     Some(report) => println!("{}", report.top),
///     None => println!("nothing to score"),
/// }
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    renderer: Arc<dyn ChartRenderer>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    transformer: Transformer,
    visualizer: Visualizer,
    scorer: RiskScorer,
}

// Pipeline can be moved to a worker thread
static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load a borrower file and run every stage over it.
    ///
    /// Returns `Ok(None)` when the file does not exist; in that case no stage
    /// after Loading runs and no further progress is reported.
    pub fn run(&self, path: impl AsRef<Path>) -> Result<Option<RiskReport>> {
        let path = path.as_ref();

        self.report_progress(ProgressUpdate::new(
            PipelineStage::Loading,
            0.0,
            format!("Loading {}...", path.display()),
        ));

        let df = match DataLoader::load(path) {
            Ok(Some(df)) => df,
            Ok(None) => return Ok(None),
            Err(e) => return Err(self.fail(e)),
        };

        self.report_progress(ProgressUpdate::new(
            PipelineStage::Loading,
            1.0,
            format!("Loaded {} rows", df.height()),
        ));

        self.finish(self.process_internal(df, Some(path)))
            .map(Some)
    }

    /// Run every stage after Loading over an in-memory table.
    pub fn process(&self, df: DataFrame) -> Result<RiskReport> {
        self.finish(self.process_internal(df, None))
    }

    fn finish(&self, result: Result<RiskReport>) -> Result<RiskReport> {
        match result {
            Ok(report) => {
                self.report_progress(ProgressUpdate::complete("Pipeline completed successfully"));
                Ok(report)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    fn fail(&self, e: PipelineError) -> PipelineError {
        self.report_progress(ProgressUpdate::failed(e.to_string()));
        error!("Pipeline error: {}", e);
        e
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn process_internal(&self, df: DataFrame, input: Option<&Path>) -> Result<RiskReport> {
        let start_time = Instant::now();
        info!("Starting risk scoring pipeline...");

        // Step 1: Transform
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Transforming,
            0.0,
            "Cleaning and enriching borrower records...",
        ));
        let (df, processing_steps) = self.transformer.transform(df)?;
        for step in &processing_steps {
            debug!("  {}", step);
        }
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Transforming,
            1.0,
            format!("Applied {} transformations", processing_steps.len()),
        ));

        // Step 2: Visualize
        let charts_rendered = if self.config.render_charts {
            self.report_progress(ProgressUpdate::new(
                PipelineStage::Visualizing,
                0.0,
                "Rendering distribution charts...",
            ));
            let rendered = self.visualizer.render(&df, self.renderer.as_ref())?;
            self.report_progress(ProgressUpdate::new(
                PipelineStage::Visualizing,
                1.0,
                format!("Rendered {} charts", rendered),
            ));
            rendered
        } else {
            info!("Skipping charts (disabled)");
            0
        };

        // Step 3: Score
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Scoring,
            0.0,
            "Computing collection risk scores...",
        ));
        let (scored, scoring) = self.scorer.score(df)?;
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Scoring,
            1.0,
            format!("Scored {} borrowers", scoring.rows),
        ));

        // Step 4: Report
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Reporting,
            0.0,
            format!("Selecting top {} borrowers...", self.config.top_n),
        ));
        let (top, top_rows) = self.scorer.top_borrowers(&scored, self.config.top_n)?;
        let report = ReportGenerator::build(ReportParams {
            input_file: input,
            scored,
            top,
            top_rows: &top_rows,
            scoring,
            processing_steps,
            charts_rendered,
        })?;
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Reporting,
            1.0,
            "Report ready",
        ));

        info!(
            "Pipeline finished in {} ms",
            start_time.elapsed().as_millis()
        );
        Ok(report)
    }
}

/// Builder for creating a [`Pipeline`] instance.
///
/// Without an explicit renderer, charts go to an [`SvgRenderer`] when the
/// configuration names a chart directory and to a [`TerminalRenderer`]
/// otherwise.
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
    renderer: Option<Arc<dyn ChartRenderer>>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the surface charts are drawn on.
    pub fn renderer(mut self, renderer: Arc<dyn ChartRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Set a progress reporter for receiving updates during processing.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// For more complex scenarios, use [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns [`PipelineError::InvalidConfig`] if the configuration is invalid.
    pub fn build(self) -> Result<Pipeline> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let renderer: Arc<dyn ChartRenderer> = match (self.renderer, &config.chart_dir) {
            (Some(renderer), _) => renderer,
            (None, Some(dir)) => Arc::new(SvgRenderer::new(dir.clone())),
            (None, None) => Arc::new(TerminalRenderer),
        };

        Ok(Pipeline {
            transformer: Transformer::new(config.clone()),
            visualizer: Visualizer::new(&config),
            scorer: RiskScorer,
            config,
            renderer,
            progress_reporter: self.progress_reporter,
        })
    }
}
