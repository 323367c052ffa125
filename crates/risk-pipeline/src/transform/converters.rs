//! Type coercion for raw borrower columns.
//!
//! Coercion never fails on a cell. Anything that does not parse becomes a
//! null, and the caller is told how many cells went that way.

use crate::utils::{is_numeric_dtype, parse_numeric};
use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;

/// Outcome of coercing one column.
pub(crate) struct Coerced {
    pub series: Series,
    /// Cells that held a value but could not be parsed.
    pub failed: usize,
}

/// Convert a column to nullable `Float64`.
///
/// Numeric columns are cast directly (NaN becomes null). String columns are
/// parsed cell by cell with [`parse_numeric`].
pub(crate) fn to_float(series: &Series) -> Result<Coerced> {
    if is_numeric_dtype(series.dtype()) {
        let floats = series.cast(&DataType::Float64)?;
        let values: Vec<Option<f64>> = floats
            .f64()?
            .into_iter()
            .map(|v| v.filter(|x| x.is_finite()))
            .collect();
        let failed = values.iter().filter(|v| v.is_none()).count() - series.null_count();
        return Ok(Coerced {
            series: Series::new(series.name().clone(), values),
            failed,
        });
    }

    let text = series.cast(&DataType::String)?;
    let mut failed = 0;
    let mut values: Vec<Option<f64>> = Vec::with_capacity(text.len());

    for opt_val in text.str()?.into_iter() {
        match opt_val {
            Some(val) => {
                let parsed = parse_numeric(val);
                if parsed.is_none() {
                    failed += 1;
                }
                values.push(parsed);
            }
            None => values.push(None),
        }
    }

    Ok(Coerced {
        series: Series::new(series.name().clone(), values),
        failed,
    })
}

/// Days from 0001-01-01 (CE day 1) to 1970-01-01, the polars `Date` origin.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Parse a string column into a polars `Date` column using a `chrono` format.
pub(crate) fn to_date(series: &Series, format: &str) -> Result<Coerced> {
    let text = series.cast(&DataType::String)?;
    let mut failed = 0;
    let mut days: Vec<Option<i32>> = Vec::with_capacity(text.len());

    for opt_val in text.str()?.into_iter() {
        match opt_val {
            Some(val) => match NaiveDate::parse_from_str(val.trim(), format) {
                Ok(date) => days.push(Some(date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)),
                Err(_) => {
                    failed += 1;
                    days.push(None);
                }
            },
            None => days.push(None),
        }
    }

    let series = Series::new(series.name().clone(), days).cast(&DataType::Date)?;
    Ok(Coerced { series, failed })
}
