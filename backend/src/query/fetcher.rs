//! Row fetcher: runs predicates against the Parquet datasets.
//!
//! Every call opens the dataset in a fresh DataFusion session, so nothing is
//! shared between requests and a replaced file is picked up on the next query.
//!
//! # Row encoding
//!
//! Arrow values are decoded one cell at a time into JSON:
//!
//! | Arrow type                  | JSON                      |
//! |-----------------------------|---------------------------|
//! | integers, floats, decimals  | number (NaN → null)       |
//! | Utf8 / LargeUtf8 / Utf8View | string                    |
//! | Date32 / Date64             | `"YYYY-MM-DD"`            |
//! | timestamps                  | `"YYYY-MM-DDTHH:MM:SS[.f]"`, `+00:00` when zoned |
//! | times                       | `"HH:MM:SS[.f]"`          |
//! | the rest                    | display string            |
//! | null                        | null                      |

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use datafusion::arrow::datatypes::DataType;
use datafusion::arrow::record_batch::RecordBatch;
use datafusion::common::ScalarValue;
use datafusion::dataframe::DataFrame;
use datafusion::error::DataFusionError;
use datafusion::functions::regex::regexp_replace;
use datafusion::logical_expr::{cast, ident, lit, try_cast, Expr};
use datafusion::prelude::{ParquetReadOptions, SessionContext};
use serde_json::{Number, Value};

use crate::config::DatasetSources;
use crate::error::{DatasetError, DatasetResult};
use crate::models::{Dataset, DateFormat, ExpiryColumn, Row, DAYS_REMAINING};
use crate::query::filter::Filter;

/// Days from 0001-01-01 (CE day 1) to 1970-01-01.
const UNIX_EPOCH_FROM_CE: i32 = 719_163;

/// `d/m/yyyy` (day and month one or two digits) rewritten to ISO order.
const DAY_MONTH_YEAR_PATTERN: &str = r"^\s*(\d{1,2})/(\d{1,2})/(\d{4})\s*$";
const DAY_MONTH_YEAR_TO_ISO: &str = "${3}-${2}-${1}";

/// Executes queries against the configured datasets.
#[derive(Debug, Clone)]
pub struct RowFetcher {
    sources: DatasetSources,
}

impl RowFetcher {
    pub fn new(sources: DatasetSources) -> Self {
        Self { sources }
    }

    pub fn sources(&self) -> &DatasetSources {
        &self.sources
    }

    /// `SELECT * FROM dataset [WHERE predicate]`, parameters bound positionally.
    pub async fn fetch(&self, filter: &Filter) -> DatasetResult<Vec<Row>> {
        let dataset = filter.dataset();
        let mut df = self.open(dataset).await?;

        if let Some(predicate) = filter.to_expr() {
            df = df
                .filter(predicate)
                .and_then(|df| df.with_param_values(filter.param_values()))
                .map_err(DatasetError::query(dataset.name()))?;
        }

        collect_rows(dataset, df).await
    }

    /// `SELECT *, <days> AS daysRemaining ORDER BY <expiry column>`.
    ///
    /// Rows are ordered by the raw expiry column (nulls last), not by the
    /// computed day count. For `d/m/yyyy` text that order is lexical.
    pub async fn fetch_expiring(&self, dataset: Dataset, today: NaiveDate) -> DatasetResult<Vec<Row>> {
        let expiry = dataset.expiry();
        let df = self
            .open(dataset)
            .await?
            .with_column(DAYS_REMAINING, days_remaining(expiry, today))
            .and_then(|df| df.sort(vec![ident(expiry.field).sort(true, false)]))
            .map_err(DatasetError::query(dataset.name()))?;

        collect_rows(dataset, df).await
    }

    /// `SELECT DISTINCT column ORDER BY column` (nulls last).
    pub async fn distinct(&self, dataset: Dataset, column: &str) -> DatasetResult<Vec<Value>> {
        if !dataset.has_column(column) {
            return Err(DatasetError::UnknownColumn {
                dataset: dataset.name(),
                column: column.to_string(),
            });
        }

        let df = self
            .open(dataset)
            .await?
            .select(vec![ident(column)])
            .and_then(DataFrame::distinct)
            .and_then(|df| df.sort(vec![ident(column).sort(true, false)]))
            .map_err(DatasetError::query(dataset.name()))?;

        let rows = collect_rows(dataset, df).await?;
        Ok(rows
            .into_iter()
            .map(|mut row| row.shift_remove(column).unwrap_or(Value::Null))
            .collect())
    }

    async fn open(&self, dataset: Dataset) -> DatasetResult<DataFrame> {
        let path = self.sources.path(dataset);
        let location = path
            .to_str()
            .ok_or_else(|| DatasetError::InvalidPath(path.to_path_buf()))?;

        SessionContext::new()
            .read_parquet(location, ParquetReadOptions::default())
            .await
            .map_err(DatasetError::query(dataset.name()))
    }
}

/// `(parsed end date) - today`, in days. Unparseable dates give null.
fn days_remaining(expiry: ExpiryColumn, today: NaiveDate) -> Expr {
    let end_date = match expiry.format {
        DateFormat::Native => try_cast(ident(expiry.field), DataType::Date32),
        DateFormat::DayMonthYear => {
            let iso = regexp_replace().call(vec![
                cast(ident(expiry.field), DataType::Utf8),
                lit(DAY_MONTH_YEAR_PATTERN),
                lit(DAY_MONTH_YEAR_TO_ISO),
            ]);
            try_cast(iso, DataType::Date32)
        }
    };

    cast(cast(end_date, DataType::Int32), DataType::Int64) - lit(epoch_days(today))
}

fn epoch_days(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce() - UNIX_EPOCH_FROM_CE)
}

async fn collect_rows(dataset: Dataset, df: DataFrame) -> DatasetResult<Vec<Row>> {
    let batches = df
        .collect()
        .await
        .map_err(DatasetError::query(dataset.name()))?;
    batches_to_rows(&batches).map_err(DatasetError::query(dataset.name()))
}

/// Decode record batches into rows, keeping the batch column order.
pub fn batches_to_rows(batches: &[RecordBatch]) -> Result<Vec<Row>, DataFusionError> {
    let mut rows = Vec::with_capacity(batches.iter().map(RecordBatch::num_rows).sum());

    for batch in batches {
        let schema = batch.schema();
        for index in 0..batch.num_rows() {
            let mut row = Row::with_capacity(schema.fields().len());
            for (field, column) in schema.fields().iter().zip(batch.columns()) {
                let scalar = ScalarValue::try_from_array(column.as_ref(), index)?;
                row.insert(field.name().clone(), scalar_to_json(scalar));
            }
            rows.push(row);
        }
    }

    Ok(rows)
}

fn scalar_to_json(scalar: ScalarValue) -> Value {
    if scalar.is_null() {
        return Value::Null;
    }

    match scalar {
        ScalarValue::Boolean(Some(v)) => Value::Bool(v),
        ScalarValue::Int8(Some(v)) => Value::from(v),
        ScalarValue::Int16(Some(v)) => Value::from(v),
        ScalarValue::Int32(Some(v)) => Value::from(v),
        ScalarValue::Int64(Some(v)) => Value::from(v),
        ScalarValue::UInt8(Some(v)) => Value::from(v),
        ScalarValue::UInt16(Some(v)) => Value::from(v),
        ScalarValue::UInt32(Some(v)) => Value::from(v),
        ScalarValue::UInt64(Some(v)) => Value::from(v),
        ScalarValue::Float32(Some(v)) => float(f64::from(v)),
        ScalarValue::Float64(Some(v)) => float(v),
        ScalarValue::Decimal128(Some(v), _, scale) => float(v as f64 / 10f64.powi(i32::from(scale))),
        ScalarValue::Utf8(Some(s)) | ScalarValue::LargeUtf8(Some(s)) | ScalarValue::Utf8View(Some(s)) => {
            Value::String(s)
        }
        ScalarValue::Date32(Some(days)) => date(
            days.checked_add(UNIX_EPOCH_FROM_CE)
                .and_then(NaiveDate::from_num_days_from_ce_opt),
        ),
        ScalarValue::Date64(Some(ms)) => date(DateTime::from_timestamp_millis(ms).map(|dt| dt.date_naive())),
        ScalarValue::TimestampSecond(Some(v), tz) => timestamp(DateTime::from_timestamp(v, 0), tz.is_some()),
        ScalarValue::TimestampMillisecond(Some(v), tz) => {
            timestamp(DateTime::from_timestamp_millis(v), tz.is_some())
        }
        ScalarValue::TimestampMicrosecond(Some(v), tz) => {
            timestamp(DateTime::from_timestamp_micros(v), tz.is_some())
        }
        ScalarValue::TimestampNanosecond(Some(v), tz) => {
            timestamp(Some(DateTime::from_timestamp_nanos(v)), tz.is_some())
        }
        ScalarValue::Time32Second(Some(v)) => time(i64::from(v), 1),
        ScalarValue::Time32Millisecond(Some(v)) => time(i64::from(v), 1_000),
        ScalarValue::Time64Microsecond(Some(v)) => time(v, 1_000_000),
        ScalarValue::Time64Nanosecond(Some(v)) => time(v, 1_000_000_000),
        ScalarValue::Dictionary(_, inner) => scalar_to_json(*inner),
        other => Value::String(other.to_string()),
    }
}

fn date(value: Option<NaiveDate>) -> Value {
    value
        .map(|date| Value::String(date.format("%Y-%m-%d").to_string()))
        .unwrap_or(Value::Null)
}

/// Timestamps without a zone are wall-clock values and carry no offset.
fn timestamp(value: Option<DateTime<Utc>>, zoned: bool) -> Value {
    let format = if zoned { "%Y-%m-%dT%H:%M:%S%.f%:z" } else { "%Y-%m-%dT%H:%M:%S%.f" };
    value
        .map(|dt| Value::String(dt.format(format).to_string()))
        .unwrap_or(Value::Null)
}

/// `value` counts `per_second` units since midnight.
fn time(value: i64, per_second: i64) -> Value {
    let secs = u32::try_from(value.div_euclid(per_second)).ok();
    let nanos = u32::try_from(value.rem_euclid(per_second) * (1_000_000_000 / per_second)).ok();
    secs.zip(nanos)
        .and_then(|(secs, nanos)| NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos))
        .map(|t| Value::String(t.format("%H:%M:%S%.f").to_string()))
        .unwrap_or(Value::Null)
}

fn float(v: f64) -> Value {
    Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null)
}
