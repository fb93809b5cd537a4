//! Filter builder: optional named filters to a parameterized predicate.
//!
//! A [`Filter`] is a conjunction of [`Clause`]s plus the parameter list bound
//! to their positional placeholders (`$1`, `$2`, ...). Field names must come
//! from the dataset's column allow-list; values never appear in the predicate
//! text, they only travel as bound parameters.
//!
//! ```text
//! VesselFilters { company: "acme", license_no: 12, .. }
//!     → "company" ILIKE $1 AND "licenseNo" = $2      params: ["%acme%", 12]
//! ```
//!
//! Empty strings and zero are treated exactly like absent filters.

use std::fmt;

use datafusion::arrow::datatypes::DataType;
use datafusion::common::ScalarValue;
use datafusion::logical_expr::expr::Placeholder;
use datafusion::logical_expr::{ident, Expr};
use serde::Deserialize;

use crate::error::{FilterError, FilterResult};
use crate::models::Dataset;

// =============================================================================
// Values and clauses
// =============================================================================

/// A bound filter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
}

impl FilterValue {
    /// Empty text and zero count as "no filter".
    pub fn is_active(&self) -> bool {
        match self {
            FilterValue::Text(s) => !s.is_empty(),
            FilterValue::Integer(n) => *n != 0,
        }
    }

    fn data_type(&self) -> DataType {
        match self {
            FilterValue::Text(_) => DataType::Utf8,
            FilterValue::Integer(_) => DataType::Int64,
        }
    }

    pub fn to_scalar(&self) -> ScalarValue {
        match self {
            FilterValue::Text(s) => ScalarValue::Utf8(Some(s.clone())),
            FilterValue::Integer(n) => ScalarValue::Int64(Some(*n)),
        }
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Integer(value)
    }
}

/// How a clause compares its column with the bound value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// `field = $n`
    Exact,
    /// `field ILIKE $n`, value bound as `%value%`
    Contains,
}

/// One `field <op> $position` comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub field: &'static str,
    pub mode: MatchMode,
    /// 1-based placeholder index.
    pub position: usize,
    data_type: DataType,
}

impl Clause {
    fn placeholder(&self) -> Expr {
        Expr::Placeholder(Placeholder::new(
            format!("${}", self.position),
            Some(self.data_type.clone()),
        ))
    }

    fn to_expr(&self) -> Expr {
        let column = ident(self.field);
        match self.mode {
            MatchMode::Exact => column.eq(self.placeholder()),
            MatchMode::Contains => column.ilike(self.placeholder()),
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.mode {
            MatchMode::Exact => "=",
            MatchMode::Contains => "ILIKE",
        };
        write!(f, "\"{}\" {} ${}", self.field, op, self.position)
    }
}

// =============================================================================
// Filter
// =============================================================================

/// A predicate over one dataset and its ordered parameter list.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    dataset: Dataset,
    clauses: Vec<Clause>,
    params: Vec<FilterValue>,
}

impl Filter {
    /// A filter that matches every row.
    pub fn all(dataset: Dataset) -> Self {
        Self {
            dataset,
            clauses: Vec::new(),
            params: Vec::new(),
        }
    }

    pub fn builder(dataset: Dataset) -> FilterBuilder {
        FilterBuilder {
            filter: Self::all(dataset),
        }
    }

    pub fn dataset(&self) -> Dataset {
        self.dataset
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn params(&self) -> &[FilterValue] {
        &self.params
    }

    /// The conjunction of all clauses, `None` when the filter matches everything.
    pub fn to_expr(&self) -> Option<Expr> {
        self.clauses
            .iter()
            .map(Clause::to_expr)
            .reduce(|acc, expr| acc.and(expr))
    }

    /// Parameters in placeholder order.
    pub fn param_values(&self) -> Vec<ScalarValue> {
        self.params.iter().map(FilterValue::to_scalar).collect()
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.clauses.is_empty() {
            return f.write_str("TRUE");
        }
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                f.write_str(" AND ")?;
            }
            write!(f, "{}", clause)?;
        }
        Ok(())
    }
}

/// Accumulates clauses in evaluation order.
#[derive(Debug)]
pub struct FilterBuilder {
    filter: Filter,
}

impl FilterBuilder {
    /// Add a clause if `value` is present and active.
    ///
    /// The field is checked against the allow-list even when the value is absent.
    pub fn add<V: Into<FilterValue>>(
        &mut self,
        field: &str,
        mode: MatchMode,
        value: Option<V>,
    ) -> FilterResult<&mut Self> {
        let dataset = self.filter.dataset;
        let field = dataset
            .columns()
            .iter()
            .copied()
            .find(|column| *column == field)
            .ok_or_else(|| FilterError::UnknownField {
                dataset: dataset.name(),
                field: field.to_string(),
            })?;

        let value: Option<FilterValue> = value.map(Into::into);
        let Some(value) = value.filter(FilterValue::is_active) else {
            return Ok(self);
        };

        let value = match (mode, value) {
            (MatchMode::Contains, FilterValue::Text(s)) => FilterValue::Text(format!("%{}%", s)),
            (MatchMode::Contains, FilterValue::Integer(n)) => FilterValue::Text(format!("%{}%", n)),
            (MatchMode::Exact, value) => value,
        };

        self.filter.clauses.push(Clause {
            field,
            mode,
            position: self.filter.params.len() + 1,
            data_type: value.data_type(),
        });
        self.filter.params.push(value);
        Ok(self)
    }

    pub fn exact<V: Into<FilterValue>>(&mut self, field: &str, value: Option<V>) -> FilterResult<&mut Self> {
        self.add(field, MatchMode::Exact, value)
    }

    pub fn contains<V: Into<FilterValue>>(&mut self, field: &str, value: Option<V>) -> FilterResult<&mut Self> {
        self.add(field, MatchMode::Contains, value)
    }

    pub fn build(self) -> Filter {
        self.filter
    }
}

// =============================================================================
// Query-string filters
// =============================================================================

/// Filters accepted by `/shiplist`.
#[derive(Debug, Clone, Default, Deserialize, clap::Args)]
pub struct VesselFilters {
    /// Filter by concession (partial match, e.g. Perak, Selangor)
    #[arg(long)]
    pub concession: Option<String>,

    /// Filter by company name (partial match)
    #[arg(long)]
    pub company: Option<String>,

    /// Filter by file number (e.g. SK 561)
    #[arg(long)]
    pub file_no: Option<String>,

    /// Filter by license number
    #[arg(long)]
    pub license_no: Option<i64>,
}

impl VesselFilters {
    pub fn to_filter(&self) -> FilterResult<Filter> {
        let mut builder = Filter::builder(Dataset::Vessels);
        builder
            .contains("concession", self.concession.as_deref())?
            .contains("company", self.company.as_deref())?
            .exact("fileNo", self.file_no.as_deref())?
            .exact("licenseNo", self.license_no)?;
        Ok(builder.build())
    }
}

/// Filters accepted by `/licenselist`.
#[derive(Debug, Clone, Default, Deserialize, clap::Args)]
pub struct LandFilters {
    /// Filter by region (partial match, e.g. PAHANG, JOHOR)
    #[arg(long)]
    pub region: Option<String>,

    /// Filter by company name (partial match)
    #[arg(long)]
    pub company: Option<String>,

    /// Filter by license number
    #[arg(long)]
    pub license_no: Option<String>,

    /// Filter by status (partial match)
    #[arg(long)]
    pub status: Option<String>,

    /// Filter by file number (e.g. SK 338)
    #[arg(long)]
    pub no_file: Option<String>,
}

impl LandFilters {
    pub fn to_filter(&self) -> FilterResult<Filter> {
        let mut builder = Filter::builder(Dataset::Lands);
        builder
            .contains("region", self.region.as_deref())?
            .contains("company", self.company.as_deref())?
            .exact("licenseNo", self.license_no.as_deref())?
            .contains("status", self.status.as_deref())?
            .exact("noFile", self.no_file.as_deref())?;
        Ok(builder.build())
    }
}
