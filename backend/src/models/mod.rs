//! Domain models for the license query service.
//!
//! - [`Dataset`] - the two Parquet datasets and their column allow-lists
//! - [`ExpiryColumn`] - where each dataset keeps its end-of-period date
//! - [`Coordinate`] - nested latitude/longitude of a land license
//! - [`Row`] - one fetched record, columns in native order

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One fetched record: column name to JSON value, in the dataset's column order.
pub type Row = Map<String, Value>;

// =============================================================================
// Field names
// =============================================================================

/// Grouping key of land license records.
pub const LICENSE_NO: &str = "licenseNo";

/// Derived day count added by the expiring views.
pub const DAYS_REMAINING: &str = "daysRemaining";

pub const LATITUDE: &str = "latitude";
pub const LONGITUDE: &str = "longitude";
pub const COORDINATE: &str = "coordinate";

const VESSEL_COLUMNS: &[&str] = &[
    "fileNo",
    "company",
    "shipName",
    "shipCapacity",
    "licenseNo",
    "concession",
    "licensePeriod",
    "project",
    "allowOptPeriod",
    "optTime",
    "royalty",
    "official",
    "licensePeriodStart",
    "licensePeriodEnd",
    "allowOptStart",
    "allowOptEnd",
    "optTimeStart",
    "optimeEnd",
];

const LAND_COLUMNS: &[&str] = &[
    "BilNo",
    "licenseNo",
    "company",
    "licenseDate",
    "expiredDate",
    "zone",
    "area_km2",
    "geometryPoint",
    "latitude",
    "longitude",
    "lat",
    "lng",
    "status",
    "remark",
    "noFile",
    "region",
];

// =============================================================================
// Datasets
// =============================================================================

/// A read-only Parquet dataset served by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dataset {
    /// Vessel licenses (`shiplist`).
    Vessels,
    /// Land-use licenses (`licenselist`).
    Lands,
}

/// How an expiry column stores its date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// A native date (or ISO `YYYY-MM-DD` text) the engine can cast directly.
    Native,
    /// Text formatted `day/month/year`, day and month possibly unpadded.
    DayMonthYear,
}

/// The column holding a dataset's end-of-period date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryColumn {
    pub field: &'static str,
    pub format: DateFormat,
}

impl Dataset {
    /// Name used in logs and errors.
    pub fn name(self) -> &'static str {
        match self {
            Dataset::Vessels => "shiplist",
            Dataset::Lands => "licenselist",
        }
    }

    /// Columns a filter may reference.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Dataset::Vessels => VESSEL_COLUMNS,
            Dataset::Lands => LAND_COLUMNS,
        }
    }

    pub fn has_column(self, field: &str) -> bool {
        self.columns().contains(&field)
    }

    pub fn expiry(self) -> ExpiryColumn {
        match self {
            Dataset::Vessels => ExpiryColumn {
                field: "licensePeriodEnd",
                format: DateFormat::Native,
            },
            Dataset::Lands => ExpiryColumn {
                field: "expiredDate",
                format: DateFormat::DayMonthYear,
            },
        }
    }
}

impl std::fmt::Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Coordinate
// =============================================================================

/// Location of a land license, nested out of the flat `latitude`/`longitude` columns.
///
/// Values are kept as the dataset stores them (text or number), null when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Coordinate {
    pub latitude: Value,
    pub longitude: Value,
}

impl Coordinate {
    pub fn new(latitude: Option<Value>, longitude: Option<Value>) -> Self {
        Self {
            latitude: latitude.unwrap_or(Value::Null),
            longitude: longitude.unwrap_or(Value::Null),
        }
    }
}

impl From<Coordinate> for Value {
    fn from(coordinate: Coordinate) -> Self {
        let mut object = Map::with_capacity(2);
        object.insert(LATITUDE.to_string(), coordinate.latitude);
        object.insert(LONGITUDE.to_string(), coordinate.longitude);
        Value::Object(object)
    }
}
