//! Error types for the risk scoring pipeline.
//!
//! Row-level problems (unparsable numbers, bad dates, zero loan terms) never
//! reach this type: they are absorbed into null cells. What is left are the
//! failures that stop a run, such as a malformed file or a table that lacks a
//! column a stage needs.
//!
//! Errors serialize as `{code, message}` so the CLI can emit them as JSON.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the risk scoring pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A single column was not found in the table.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// A stage needs columns the table does not have.
    #[error("{stage} requires missing columns: {}", .columns.join(", "))]
    MissingColumns {
        stage: &'static str,
        columns: Vec<String>,
    },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The transformation stage failed.
    #[error("Failed to transform data: {0}")]
    TransformFailed(String),

    /// The scoring stage failed.
    #[error("Failed to score borrowers: {0}")]
    ScoringFailed(String),

    /// A chart could not be rendered.
    #[error("Failed to render chart: {0}")]
    RenderFailed(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PipelineError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code for machine-readable output.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::MissingColumns { .. } => "MISSING_COLUMNS",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::TransformFailed(_) => "TRANSFORM_FAILED",
            Self::ScoringFailed(_) => "SCORING_FAILED",
            Self::RenderFailed(_) => "RENDER_FAILED",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether the error came from the input table's shape rather than from
    /// the pipeline itself.
    pub fn is_schema_error(&self) -> bool {
        match self {
            Self::ColumnNotFound(_) | Self::MissingColumns { .. } => true,
            Self::WithContext { source, .. } => source.is_schema_error(),
            _ => false,
        }
    }
}

impl From<crate::config::ConfigValidationError> for PipelineError {
    fn from(err: crate::config::ConfigValidationError) -> Self {
        PipelineError::InvalidConfig(err.to_string())
    }
}

impl Serialize for PipelineError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("PipelineError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PipelineError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            PipelineError::ColumnNotFound("Loan Term".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
        assert_eq!(
            PipelineError::RenderFailed("boom".to_string()).error_code(),
            "RENDER_FAILED"
        );
    }

    #[test]
    fn test_missing_columns_message_lists_all() {
        let error = PipelineError::MissingColumns {
            stage: "Scorer",
            columns: vec!["Loan Term".to_string(), "Credit Score".to_string()],
        };
        assert_eq!(
            error.to_string(),
            "Scorer requires missing columns: Loan Term, Credit Score"
        );
        assert!(error.is_schema_error());
    }

    #[test]
    fn test_error_serialization() {
        let error = PipelineError::ColumnNotFound("Email Address".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("COLUMN_NOT_FOUND"));
        assert!(json.contains("Email Address"));
    }

    #[test]
    fn test_with_context() {
        let error = PipelineError::ColumnNotFound("Gender".to_string())
            .with_context("While transforming");
        assert!(error.to_string().contains("While transforming"));
        assert_eq!(error.error_code(), "COLUMN_NOT_FOUND");
        assert!(error.is_schema_error());
    }
}
