//! CSV loading for the borrower table.
//!
//! Every column is read as text. Typing is the transformer's job, so a stray
//! `"N/A"` in a numeric column becomes a null there instead of failing the
//! whole read here.

use crate::error::Result;
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use tracing::{info, warn};

/// Reads borrower CSV files into a `DataFrame`.
pub struct DataLoader;

impl DataLoader {
    /// Load the borrower table from `path`.
    ///
    /// Returns `Ok(None)` when `path` is not a readable file: the caller has
    /// nothing to process and should skip every later stage. A file that
    /// exists but cannot be parsed is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Option<DataFrame>> {
        let path = path.as_ref();

        if !path.is_file() {
            warn!("Input file not found: {}", path.display());
            return Ok(None);
        }

        info!("Loading borrower data from: {}", path.display());
        let df = Self::text_options()
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?;
        info!("Data loaded successfully. Shape: {:?}", df.shape());

        Ok(Some(df))
    }

    /// Parse CSV text that is already in memory.
    pub fn from_csv_str(content: &str) -> Result<DataFrame> {
        let df = Self::text_options()
            .into_reader_with_file_handle(Cursor::new(content.as_bytes().to_vec()))
            .finish()?;
        Ok(df)
    }

    fn text_options() -> CsvReadOptions {
        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
    }
}
