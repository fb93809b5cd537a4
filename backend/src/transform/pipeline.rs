//! High-level query pipelines, one per API view.
//!
//! Each pipeline combines the steps of a request:
//! filter construction, fetch, reshaping and (optionally) response validation.
//! The HTTP routes and the CLI both go through [`QueryService`].
//!
//! # Example
//!
//! ```rust,ignore
//! use jkptg::{AppConfig, QueryService, VesselFilters};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = QueryService::new(AppConfig::default());
//!     let filters = VesselFilters { company: Some("acme".into()), ..Default::default() };
//!     let ships = service.ships(&filters).await?;
//!     println!("{} vessels", ships.len());
//!     Ok(())
//! }
//! ```

use chrono::NaiveDate;
use serde_json::Value;

use super::reshape::{shape_licenses, LicenseListing};
use crate::api::logs::{log_info_indent, log_query, log_warning};
use crate::config::{AppConfig, OutputOptions};
use crate::error::{PipelineError, PipelineResult};
use crate::models::{Dataset, Row};
use crate::query::{Filter, LandFilters, RowFetcher, VesselFilters};
use crate::validation::validate_rows;

/// Runs the request pipelines against the configured datasets.
#[derive(Debug, Clone)]
pub struct QueryService {
    fetcher: RowFetcher,
    config: AppConfig,
}

impl QueryService {
    pub fn new(config: AppConfig) -> Self {
        Self {
            fetcher: RowFetcher::new(config.sources.clone()),
            config,
        }
    }

    pub fn output(&self) -> OutputOptions {
        self.config.output
    }

    /// Evaluation date for `daysRemaining`.
    pub fn today(&self) -> NaiveDate {
        self.config.today()
    }

    // =========================================================================
    // Vessel licenses
    // =========================================================================

    /// `/shiplist`
    pub async fn ships(&self, filters: &VesselFilters) -> PipelineResult<Vec<Row>> {
        self.vessels(filters.to_filter()?).await
    }

    /// `/companies/{file_no}`
    pub async fn ships_by_file_no(&self, file_no: &str) -> PipelineResult<Vec<Row>> {
        let mut builder = Filter::builder(Dataset::Vessels);
        builder.exact("fileNo", Some(file_no))?;
        self.vessels(builder.build()).await
    }

    /// `/concessions/{name}`
    pub async fn ships_by_concession(&self, name: &str) -> PipelineResult<Vec<Row>> {
        let mut builder = Filter::builder(Dataset::Vessels);
        builder.contains("concession", Some(name))?;
        self.vessels(builder.build()).await
    }

    /// `/shiplist/expiring`
    pub async fn ships_expiring(&self) -> PipelineResult<Vec<Row>> {
        let today = self.today();
        let rows = self.fetcher.fetch_expiring(Dataset::Vessels, today).await?;
        log_query(Dataset::Vessels, format!("expiring as of {}: {} rows", today, rows.len()));
        self.check(Dataset::Vessels, &rows)?;
        Ok(rows)
    }

    /// `/concessions`
    pub async fn concessions(&self) -> PipelineResult<Vec<Value>> {
        self.distinct(Dataset::Vessels, "concession").await
    }

    async fn vessels(&self, filter: Filter) -> PipelineResult<Vec<Row>> {
        let rows = self.fetcher.fetch(&filter).await?;
        log_query(Dataset::Vessels, format!("WHERE {}: {} rows", filter, rows.len()));
        self.check(Dataset::Vessels, &rows)?;
        Ok(rows)
    }

    // =========================================================================
    // Land licenses
    // =========================================================================

    /// `/licenselist`
    pub async fn licenses(&self, filters: &LandFilters) -> PipelineResult<LicenseListing> {
        self.lands(filters.to_filter()?).await
    }

    /// `/regions/{name}`
    pub async fn licenses_by_region(&self, name: &str) -> PipelineResult<LicenseListing> {
        let mut builder = Filter::builder(Dataset::Lands);
        builder.contains("region", Some(name))?;
        self.lands(builder.build()).await
    }

    /// `/licenselist/expiring`
    pub async fn licenses_expiring(&self) -> PipelineResult<LicenseListing> {
        let today = self.today();
        let rows = self.fetcher.fetch_expiring(Dataset::Lands, today).await?;
        log_query(Dataset::Lands, format!("expiring as of {}: {} rows", today, rows.len()));
        self.shape(rows)
    }

    /// `/regions`
    pub async fn regions(&self) -> PipelineResult<Vec<Value>> {
        self.distinct(Dataset::Lands, "region").await
    }

    async fn lands(&self, filter: Filter) -> PipelineResult<LicenseListing> {
        let rows = self.fetcher.fetch(&filter).await?;
        log_query(Dataset::Lands, format!("WHERE {}: {} rows", filter, rows.len()));
        self.shape(rows)
    }

    fn shape(&self, rows: Vec<Row>) -> PipelineResult<LicenseListing> {
        let listing = shape_licenses(rows, self.config.output.group_licenses);
        if let LicenseListing::Grouped(ref groups) = listing {
            log_info_indent(format!("{} license numbers", groups.len()), 1);
        }

        if self.config.output.validate {
            match &listing {
                LicenseListing::Flat(rows) => self.check(Dataset::Lands, rows)?,
                LicenseListing::Grouped(groups) => {
                    for records in groups.values().filter_map(Value::as_array) {
                        let rows: Vec<Row> = records
                            .iter()
                            .filter_map(Value::as_object)
                            .cloned()
                            .collect();
                        self.check(Dataset::Lands, &rows)?;
                    }
                }
            }
        }

        Ok(listing)
    }

    // =========================================================================
    // Shared steps
    // =========================================================================

    async fn distinct(&self, dataset: Dataset, column: &str) -> PipelineResult<Vec<Value>> {
        let values = self.fetcher.distinct(dataset, column).await?;
        log_query(dataset, format!("DISTINCT {}: {} values", column, values.len()));
        Ok(values)
    }

    fn check(&self, dataset: Dataset, rows: &[Row]) -> PipelineResult<()> {
        if !self.config.output.validate {
            return Ok(());
        }

        validate_rows(dataset, rows).map_err(|errors| {
            log_warning(format!("{} response validation: {} violations", dataset, errors.len()));
            PipelineError::ResponseValidation { errors }
        })
    }
}
