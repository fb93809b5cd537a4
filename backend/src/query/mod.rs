//! Query module.
//!
//! - Filter: optional named filters to a parameterized predicate
//! - Fetcher: predicate execution against the Parquet datasets

pub mod fetcher;
pub mod filter;

pub use fetcher::{batches_to_rows, RowFetcher};
pub use filter::{Clause, Filter, FilterBuilder, FilterValue, LandFilters, MatchMode, VesselFilters};
