//! CLI entry point for the borrower risk scoring pipeline.

use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;
use risk_pipeline::{Pipeline, PipelineConfig, ReportGenerator, RiskReport};
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Borrower cleaning and Collection Risk Score ranking",
    long_about = "Cleans a borrower CSV, renders its distributions, scores every borrower \
                  and prints the highest-risk collection candidates.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  RUST_LOG    Log filter, overrides --log-level (may be set in .env)\n\n\
                  EXAMPLES:\n  \
                  # Score the default file\n  \
                  risk-pipeline\n\n  \
                  # Top 10, charts written as SVG\n  \
                  risk-pipeline -i borrowers.csv -n 10 --chart-dir charts/\n\n  \
                  # Machine-readable output\n  \
                  risk-pipeline -i borrowers.csv --json"
)]
struct Args {
    /// Path to the borrower CSV file
    #[arg(short, long, default_value = "data/10k_borrowers_data.csv")]
    input: PathBuf,

    /// Number of top-ranked borrowers to report
    #[arg(short = 'n', long, default_value_t = risk_pipeline::config::DEFAULT_TOP_N)]
    top: usize,

    /// Seed of the Income Level / Financial Status stream
    #[arg(long, default_value_t = risk_pipeline::config::DEFAULT_SEED)]
    seed: u32,

    /// Number of bins in the credit score histogram
    #[arg(long, default_value_t = risk_pipeline::config::DEFAULT_HISTOGRAM_BINS)]
    bins: usize,

    /// Skip chart rendering
    #[arg(long)]
    no_charts: bool,

    /// Write charts as SVG files into this directory instead of the terminal
    #[arg(long)]
    chart_dir: Option<PathBuf>,

    /// Output the report summary as JSON on stdout
    ///
    /// Disables all logs and terminal charts; only the JSON is printed.
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings, errors and the result)
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true no subscriber is installed, so stdout carries
/// only the JSON report.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn build_config(args: &Args) -> Result<PipelineConfig> {
    // terminal charts would interleave with the JSON document
    let terminal_charts = args.chart_dir.is_none();
    let render_charts = !args.no_charts && !(args.json && terminal_charts);

    let mut builder = PipelineConfig::builder()
        .top_n(args.top)
        .seed(args.seed)
        .histogram_bins(args.bins)
        .render_charts(render_charts);

    if let Some(ref dir) = args.chart_dir {
        builder = builder.chart_dir(dir);
    }

    Ok(builder.build()?)
}

fn main() -> Result<()> {
    let args = Args::parse();

    // .env may carry RUST_LOG, so load it before logging starts
    dotenv().ok();
    init_logging(&args.log_level, args.quiet, args.json);

    let config = build_config(&args)?;
    debug!("Configuration: {:?}", config);

    let pipeline = Pipeline::builder()
        .config(config)
        .on_progress(|update| {
            debug!(
                "[{:>3.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        })
        .build()?;

    info!("Input file: {}", args.input.display());
    let Some(report) = pipeline.run(&args.input)? else {
        eprintln!(
            "Input file not found: {}. Nothing to score.",
            args.input.display()
        );
        return Ok(());
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report.summary)?);
    } else {
        print_human_readable_report(&report);
    }

    Ok(())
}

/// Print the top borrowers table and their score breakdown.
fn print_human_readable_report(report: &RiskReport) {
    let summary = &report.summary;

    println!();
    println!("{}", "=".repeat(80));
    println!("TOP {} BORROWERS BY COLLECTION RISK SCORE", summary.top_borrowers.len());
    println!("{}", "=".repeat(80));
    println!();
    println!("{}", report.top);
    println!();
    print!("{}", ReportGenerator::score_table(summary));
    println!();

    let scoring = &summary.scoring;
    println!(
        "Scored {} borrowers into {} distinct ranks",
        scoring.rows, scoring.distinct_ranks
    );
    if let (Some(min), Some(mean), Some(max)) =
        (scoring.min_score, scoring.mean_score, scoring.max_score)
    {
        println!(
            "Score range: {:.4} .. {:.4} (mean {:.4})",
            min, max, mean
        );
    }
    for (column, missing) in &scoring.missing {
        if *missing > 0 {
            println!("  {} missing: {}", column, missing);
        }
    }
    println!();
    println!("Use --json for machine-readable output");
    println!("{}", "=".repeat(80));
}
