//! Error types for the license query service.
//!
//! Errors are layered the same way requests flow through the service:
//!
//! - [`FilterError`] - predicate construction errors (field outside the allow-list)
//! - [`DatasetError`] - opening or querying a Parquet dataset
//! - [`PipelineError`] - fetch + reshape + response validation
//! - [`ServerError`] - top-level HTTP errors, converted into responses by the API layer
//!
//! Per-row date parsing failures are not errors: they surface as a null
//! `daysRemaining` on the affected row.
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;

use datafusion::error::DataFusionError;
use thiserror::Error;

// =============================================================================
// Filter Errors
// =============================================================================

/// Errors while building a filter predicate.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    /// The field is not a column of the dataset.
    #[error("Field '{field}' is not a column of dataset '{dataset}'")]
    UnknownField {
        dataset: &'static str,
        field: String,
    },
}

// =============================================================================
// Dataset Errors
// =============================================================================

/// Errors while reading a dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The configured path cannot be handed to the query engine.
    #[error("Dataset path is not valid UTF-8: {0}")]
    InvalidPath(PathBuf),

    /// The query engine failed (missing file, bad column, unreadable data).
    #[error("Query on dataset '{dataset}' failed: {source}")]
    Query {
        dataset: &'static str,
        #[source]
        source: DataFusionError,
    },

    /// A distinct-value listing named a column outside the allow-list.
    #[error("Column '{column}' is not a column of dataset '{dataset}'")]
    UnknownColumn {
        dataset: &'static str,
        column: String,
    },
}

impl DatasetError {
    pub(crate) fn query(dataset: &'static str) -> impl FnOnce(DataFusionError) -> Self {
        move |source| DatasetError::Query { dataset, source }
    }
}

// =============================================================================
// Pipeline Errors
// =============================================================================

/// Errors of a complete query pipeline (filter, fetch, reshape, validate).
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Filter construction error.
    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),

    /// Dataset error.
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    /// Outgoing record does not match the response schema.
    #[error("Response validation failed: {errors:?}")]
    ResponseValidation { errors: Vec<String> },
}

// =============================================================================
// Server Errors (top-level)
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Malformed query parameter.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for filter construction.
pub type FilterResult<T> = Result<T, FilterError>;

/// Result type for dataset operations.
pub type DatasetResult<T> = Result<T, DatasetError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // FilterError -> PipelineError -> ServerError
        let filter_err = FilterError::UnknownField {
            dataset: "shiplist",
            field: "password".into(),
        };
        let pipeline_err: PipelineError = filter_err.into();
        let server_err: ServerError = pipeline_err.into();
        assert!(matches!(server_err, ServerError::Pipeline(PipelineError::Filter(_))));
        assert!(server_err.to_string().contains("password"));

        // DatasetError -> PipelineError
        let dataset_err = DatasetError::Query {
            dataset: "licenselist",
            source: DataFusionError::Plan("No field named missing".into()),
        };
        let pipeline_err: PipelineError = dataset_err.into();
        assert!(pipeline_err.to_string().contains("licenselist"));
        assert!(pipeline_err.to_string().contains("missing"));
    }

    #[test]
    fn test_unknown_field_format() {
        let err = FilterError::UnknownField {
            dataset: "shiplist",
            field: "1=1; --".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("1=1; --"));
        assert!(msg.contains("shiplist"));
    }
}
