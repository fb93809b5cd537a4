//! # JKPTG - read-only query API over vessel and land license datasets
//!
//! Serves filtered and grouped views of two Parquet datasets (vessel licenses
//! and land-use licenses) as JSON over HTTP.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Query string│────▶│   Filter    │────▶│   Fetcher   │────▶│   Reshape   │──▶ JSON
//! │  (routes)   │     │ ($1, $2...) │     │ (DataFusion)│     │ (nest/group)│
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Layered error types
//! - [`config`] - Dataset paths and output switches
//! - [`models`] - Datasets, column allow-lists, coordinates
//! - [`query`] - Filter builder and row fetcher
//! - [`transform`] - Reshaping and per-view pipelines
//! - [`validation`] - Response schema validation
//! - [`api`] - HTTP API server

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Querying
pub mod query;

// Reshaping
pub mod transform;

// Validation
pub mod validation;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{AppConfig, ConfigArgs, DatasetSources, OutputOptions};

pub use error::{DatasetError, FilterError, PipelineError, ServerError};

pub use models::{Coordinate, Dataset, Row};

pub use query::{Filter, FilterValue, LandFilters, MatchMode, RowFetcher, VesselFilters};

pub use transform::{
    group_by_license_number, nest_coordinates, shape_licenses, LicenseListing, QueryService,
};

pub use validation::{is_valid_record, validate_record, validate_rows};

// Server
pub mod server {
    pub use crate::api::server::{router, start_server, AppState};
}
