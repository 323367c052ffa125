//! Shared utilities for reading and writing borrower table columns.
//!
//! Every stage works column-at-a-time: pull a column out as plain Rust
//! values, compute, and put a new `Series` back. These helpers keep the
//! polars plumbing in one place.

use crate::error::{PipelineError, Result};
use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

// =============================================================================
// Column Presence
// =============================================================================

/// Names from `required` that are not columns of `df`, in the given order.
pub fn missing_columns(df: &DataFrame, required: &[&str]) -> Vec<String> {
    let present: Vec<&str> = df.get_column_names().iter().map(|s| s.as_str()).collect();
    required
        .iter()
        .filter(|name| !present.contains(name))
        .map(|name| name.to_string())
        .collect()
}

/// Fail with [`PipelineError::MissingColumns`] unless every column exists.
pub fn require_columns(df: &DataFrame, stage: &'static str, required: &[&str]) -> Result<()> {
    let missing = missing_columns(df, required);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(PipelineError::MissingColumns {
            stage,
            columns: missing,
        })
    }
}

/// Whether `df` has a column named `name`.
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}

// =============================================================================
// Column Extraction
// =============================================================================

fn series<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|col| col.as_materialized_series())
        .map_err(|_| PipelineError::ColumnNotFound(name.to_string()))
}

/// Read a column as optional strings, casting non-string columns first.
pub fn column_strings(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = series(df, name)?;
    let as_str = series.cast(&DataType::String)?;
    Ok(as_str
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// Read a numeric column as optional `f64`s.
///
/// NaN cells are reported as `None`, so callers only ever see one kind of
/// missing value.
pub fn column_f64(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = series(df, name)?;
    if !is_numeric_dtype(series.dtype()) {
        return Err(PipelineError::TransformFailed(format!(
            "column '{}' has type {} but a numeric column was expected",
            name,
            series.dtype()
        )));
    }
    let floats = series.cast(&DataType::Float64)?;
    Ok(floats
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect())
}

/// Replace or append a column.
pub fn put_column(df: &mut DataFrame, series: Series) -> Result<()> {
    df.with_column(series)?;
    Ok(())
}

/// Number of nulls in a column, or `None` if the column does not exist.
pub fn null_count(df: &DataFrame, name: &str) -> Option<usize> {
    df.column(name).ok().map(|col| col.null_count())
}

// =============================================================================
// Value Parsing
// =============================================================================

/// Parse a cell as a finite `f64`.
///
/// Surrounding whitespace is ignored. Empty text, non-numeric text and the
/// literals `inf`/`nan` all yield `None`.
pub fn parse_numeric(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Sum of optional values; missing if any addend is missing.
pub fn sum_present(values: &[Option<f64>]) -> Option<f64> {
    values.iter().try_fold(0.0, |acc, v| v.map(|x| acc + x))
}

// =============================================================================
// Tests
// =============================================================================
