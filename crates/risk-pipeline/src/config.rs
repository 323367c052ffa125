//! Configuration types for the risk scoring pipeline.
//!
//! The pipeline runs a fixed set of transformations. The configuration only
//! carries the constants those transformations are parameterised by, and the
//! defaults reproduce the fixed behaviour exactly.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Seed of the synthetic category stream.
pub const DEFAULT_SEED: u32 = 42;

/// Domain every email address is rewritten to.
pub const DEFAULT_EMAIL_DOMAIN: &str = "gmail.com";

/// Prefix prepended to every normalized phone number.
pub const DEFAULT_PHONE_COUNTRY_CODE: &str = "+91";

/// Number of national digits kept in a phone number.
pub const DEFAULT_PHONE_DIGITS: usize = 10;

/// `chrono` format of the Date of Birth column (day-month-year).
pub const DEFAULT_DATE_FORMAT: &str = "%d-%m-%Y";

/// Number of bins in the credit score histogram.
pub const DEFAULT_HISTOGRAM_BINS: usize = 20;

/// Number of borrowers in the final report.
pub const DEFAULT_TOP_N: usize = 5;

/// Configuration for the risk scoring pipeline.
///
/// Use [`PipelineConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use risk_pipeline::config::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .top_n(10)
///     .render_charts(false)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Seed of the Mersenne Twister stream used for Income Level and
    /// Financial Status assignment.
    /// Default: 42
    pub seed: u32,

    /// Domain written after the `@` of every email address.
    /// Default: "gmail.com"
    pub email_domain: String,

    /// Country code prepended to every phone number.
    /// Default: "+91"
    pub phone_country_code: String,

    /// Number of trailing digits kept from every phone number.
    /// Default: 10
    pub phone_digits: usize,

    /// Format used to parse Date of Birth.
    /// Default: "%d-%m-%Y"
    pub date_format: String,

    /// Number of equal-width bins in the credit score histogram.
    /// Default: 20
    pub histogram_bins: usize,

    /// Number of highest-scoring borrowers to report.
    /// Default: 5
    pub top_n: usize,

    /// Whether the visualization stage runs at all.
    /// Default: true
    pub render_charts: bool,

    /// Directory for SVG charts. When None, charts go to the terminal.
    /// Default: None
    pub chart_dir: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            email_domain: DEFAULT_EMAIL_DOMAIN.to_string(),
            phone_country_code: DEFAULT_PHONE_COUNTRY_CODE.to_string(),
            phone_digits: DEFAULT_PHONE_DIGITS,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            top_n: DEFAULT_TOP_N,
            render_charts: true,
            chart_dir: None,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.email_domain.trim().is_empty() || self.email_domain.contains('@') {
            return Err(ConfigValidationError::InvalidEmailDomain(
                self.email_domain.clone(),
            ));
        }

        if self.phone_country_code.trim().is_empty() {
            return Err(ConfigValidationError::EmptyField("phone_country_code"));
        }

        if self.date_format.trim().is_empty() {
            return Err(ConfigValidationError::EmptyField("date_format"));
        }

        for (field, value) in [
            ("phone_digits", self.phone_digits),
            ("histogram_bins", self.histogram_bins),
            ("top_n", self.top_n),
        ] {
            if value == 0 {
                return Err(ConfigValidationError::ZeroCount { field });
            }
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid email domain '{0}' (must be non-empty and must not contain '@')")]
    InvalidEmailDomain(String),

    #[error("'{0}' must not be empty")]
    EmptyField(&'static str),

    #[error("'{field}' must be at least 1")]
    ZeroCount { field: &'static str },
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    seed: Option<u32>,
    email_domain: Option<String>,
    phone_country_code: Option<String>,
    phone_digits: Option<usize>,
    date_format: Option<String>,
    histogram_bins: Option<usize>,
    top_n: Option<usize>,
    render_charts: Option<bool>,
    chart_dir: Option<PathBuf>,
}

impl PipelineConfigBuilder {
    /// Set the seed of the synthetic category stream.
    pub fn seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the domain email addresses are rewritten to.
    pub fn email_domain(mut self, domain: impl Into<String>) -> Self {
        self.email_domain = Some(domain.into());
        self
    }

    /// Set the phone number country code prefix.
    pub fn phone_country_code(mut self, code: impl Into<String>) -> Self {
        self.phone_country_code = Some(code.into());
        self
    }

    /// Set how many trailing phone digits are kept.
    pub fn phone_digits(mut self, digits: usize) -> Self {
        self.phone_digits = Some(digits);
        self
    }

    /// Set the Date of Birth parse format.
    pub fn date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = Some(format.into());
        self
    }

    /// Set the number of credit score histogram bins.
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = Some(bins);
        self
    }

    /// Set how many borrowers the report lists.
    pub fn top_n(mut self, n: usize) -> Self {
        self.top_n = Some(n);
        self
    }

    /// Enable or disable the visualization stage.
    pub fn render_charts(mut self, render: bool) -> Self {
        self.render_charts = Some(render);
        self
    }

    /// Write charts as SVG files into this directory instead of the terminal.
    pub fn chart_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.chart_dir = Some(dir.into());
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let config = PipelineConfig {
            seed: self.seed.unwrap_or(DEFAULT_SEED),
            email_domain: self
                .email_domain
                .unwrap_or_else(|| DEFAULT_EMAIL_DOMAIN.to_string()),
            phone_country_code: self
                .phone_country_code
                .unwrap_or_else(|| DEFAULT_PHONE_COUNTRY_CODE.to_string()),
            phone_digits: self.phone_digits.unwrap_or(DEFAULT_PHONE_DIGITS),
            date_format: self
                .date_format
                .unwrap_or_else(|| DEFAULT_DATE_FORMAT.to_string()),
            histogram_bins: self.histogram_bins.unwrap_or(DEFAULT_HISTOGRAM_BINS),
            top_n: self.top_n.unwrap_or(DEFAULT_TOP_N),
            render_charts: self.render_charts.unwrap_or(true),
            chart_dir: self.chart_dir,
        };

        config.validate()?;
        Ok(config)
    }
}
