//! Cleaning and enrichment of the raw borrower table.
//!
//! The transformer runs a fixed sequence of column rewrites:
//!
//! 1. Email addresses are forced onto a single domain
//! 2. Phone numbers are reduced to digits and given a country code
//! 3. Income Level and Financial Status are synthesized from a seeded stream
//! 4. Numeric fields are coerced to `Float64`
//! 5. Date of Birth is parsed to a `Date`
//!
//! Row order and row count never change.

mod contacts;
mod converters;
mod synthesis;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result, ResultExt};
use crate::types::{FinancialStatus, IncomeLevel, SampledCategory, columns};
use crate::utils::{column_strings, has_column, null_count, put_column, require_columns};
use contacts::{normalize_email, normalize_phone};
use converters::{to_date, to_float};
use polars::prelude::*;
use synthesis::{WeightedChoice, seeded_stream};
use tracing::{debug, info};

/// Columns the transformer reads.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    columns::EMAIL,
    columns::PHONE,
    columns::LOAN_AMOUNT,
    columns::INTEREST_RATE,
    columns::DAYS_LEFT,
    columns::DATE_OF_BIRTH,
    columns::CREDIT_SCORE,
];

/// Row-wise normalization and record synthesis.
pub struct Transformer {
    config: PipelineConfig,
}

impl Transformer {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Clean and enrich the table.
    ///
    /// Returns the transformed table together with a human-readable list of
    /// the steps taken. `Loan Term` is coerced when present; its absence is
    /// left for the scorer to report.
    pub fn transform(&self, df: DataFrame) -> Result<(DataFrame, Vec<String>)> {
        require_columns(&df, "Transformer", &REQUIRED_COLUMNS)?;

        let mut df = df;
        let mut steps = Vec::new();

        info!("Transforming {} borrower records...", df.height());

        self.normalize_emails(&mut df, &mut steps)?;
        self.normalize_phones(&mut df, &mut steps)?;
        self.assign_synthetic_categories(&mut df, &mut steps)?;
        self.coerce_numeric(&mut df, &mut steps)?;
        self.parse_birth_dates(&mut df, &mut steps)?;

        info!("Data transformed successfully");
        Ok((df, steps))
    }

    fn normalize_emails(&self, df: &mut DataFrame, steps: &mut Vec<String>) -> Result<()> {
        let domain = &self.config.email_domain;
        let values: Vec<Option<String>> = column_strings(df, columns::EMAIL)?
            .into_iter()
            .map(|v| v.map(|email| normalize_email(&email, domain)))
            .collect();

        let nulls = values.iter().filter(|v| v.is_none()).count();
        put_column(df, Series::new(columns::EMAIL.into(), values))?;

        debug!("Normalized email domains ({} missing)", nulls);
        steps.push(format!("Rewrote email domains to @{}", domain));
        Ok(())
    }

    fn normalize_phones(&self, df: &mut DataFrame, steps: &mut Vec<String>) -> Result<()> {
        let code = &self.config.phone_country_code;
        let digits = self.config.phone_digits;
        let values: Vec<String> = column_strings(df, columns::PHONE)?
            .into_iter()
            .map(|v| normalize_phone(v.as_deref().unwrap_or(""), code, digits))
            .collect();

        put_column(df, Series::new(columns::PHONE.into(), values))?;

        steps.push(format!(
            "Normalized phone numbers to {} followed by {} digits",
            code, digits
        ));
        Ok(())
    }

    fn assign_synthetic_categories(
        &self,
        df: &mut DataFrame,
        steps: &mut Vec<String>,
    ) -> Result<()> {
        let n = df.height();
        let mut rng = seeded_stream(self.config.seed);

        // Income Level for every row first, then Financial Status
        let income = WeightedChoice::<IncomeLevel>::new().sample(&mut rng, n);
        let status = WeightedChoice::<FinancialStatus>::new().sample(&mut rng, n);

        put_column(df, category_series(columns::INCOME_LEVEL, &income))?;
        put_column(df, category_series(columns::FINANCIAL_STATUS, &status))?;

        debug!(
            "Synthesized {} income levels and {} financial statuses (seed {})",
            income.len(),
            status.len(),
            self.config.seed
        );
        steps.push(format!(
            "Assigned Income Level and Financial Status with seed {}",
            self.config.seed
        ));
        Ok(())
    }

    fn coerce_numeric(&self, df: &mut DataFrame, steps: &mut Vec<String>) -> Result<()> {
        let present: Vec<&str> = columns::NUMERIC
            .into_iter()
            .filter(|name| has_column(df, name))
            .collect();

        for name in present {
            let coerced = {
                let series = df.column(name)?.as_materialized_series();
                to_float(series).map_err(|e| {
                    PipelineError::TransformFailed(format!("{}: {}", name, e))
                })?
            };
            put_column(df, coerced.series).context(format!("Coercing '{}'", name))?;

            debug!(
                "'{}': {} unparsable, {} missing after coercion",
                name,
                coerced.failed,
                null_count(df, name).unwrap_or(0)
            );
            steps.push(format!(
                "Converted {} to numeric ({} unparsable values set to missing)",
                name, coerced.failed
            ));
        }
        Ok(())
    }

    fn parse_birth_dates(&self, df: &mut DataFrame, steps: &mut Vec<String>) -> Result<()> {
        let coerced = {
            let series = df.column(columns::DATE_OF_BIRTH)?.as_materialized_series();
            to_date(series, &self.config.date_format)
                .map_err(|e| PipelineError::TransformFailed(e.to_string()))?
        };
        put_column(df, coerced.series)?;

        debug!("Parsed Date of Birth ({} unparsable)", coerced.failed);
        steps.push(format!(
            "Parsed {} with format {} ({} unparsable values set to missing)",
            columns::DATE_OF_BIRTH,
            self.config.date_format,
            coerced.failed
        ));
        Ok(())
    }
}

fn category_series<T: SampledCategory>(name: &str, values: &[T]) -> Series {
    let labels: Vec<&str> = values.iter().map(|v| v.as_str()).collect();
    Series::new(name.into(), labels)
}
