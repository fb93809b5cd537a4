//! Parquet fixtures shared by the integration tests.

#![allow(dead_code)]

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use datafusion::arrow::array::{
    ArrayRef, Date32Array, Float64Array, Int64Array, StringArray, TimestampNanosecondArray,
};
use datafusion::arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use datafusion::arrow::record_batch::RecordBatch;
use datafusion::parquet::arrow::ArrowWriter;
use jkptg::{AppConfig, DatasetSources, OutputOptions};
use tempfile::TempDir;

/// One vessel license row.
pub struct Ship {
    pub file_no: &'static str,
    pub company: &'static str,
    pub ship_name: &'static str,
    pub license_no: f64,
    pub concession: &'static str,
    /// ISO date, stored as a native Date32.
    pub period_end: Option<&'static str>,
}

/// One land license row.
pub struct Land {
    pub bil_no: i64,
    pub license_no: &'static str,
    pub company: &'static str,
    /// `d/m/yyyy` text.
    pub expired_date: Option<&'static str>,
    pub latitude: Option<&'static str>,
    pub longitude: Option<&'static str>,
    pub status: &'static str,
    pub no_file: &'static str,
    pub region: &'static str,
}

pub fn ships() -> Vec<Ship> {
    vec![
        Ship {
            file_no: "SK 561",
            company: "Acme Marine Sdn Bhd",
            ship_name: "MV Sri Selangor",
            license_no: 101.0,
            concession: "Selangor",
            period_end: Some("2025-01-01"),
        },
        Ship {
            file_no: "SK 562",
            company: "Borneo Dredging",
            ship_name: "MV Kedah Star",
            license_no: 102.0,
            concession: "Kedah",
            period_end: Some("2024-06-15"),
        },
        Ship {
            file_no: "SK 563",
            company: "Acme Marine Sdn Bhd",
            ship_name: "MV Utara",
            license_no: 103.0,
            concession: "North Selangor",
            period_end: Some("2026-12-31"),
        },
        Ship {
            file_no: "SK 564",
            company: "Pesisir Holdings",
            ship_name: "MV Perak",
            license_no: 104.0,
            concession: "Perak",
            period_end: None,
        },
    ]
}

pub fn lands() -> Vec<Land> {
    vec![
        Land {
            bil_no: 1,
            license_no: "A1",
            company: "X Sdn Bhd",
            expired_date: Some("31/12/2026"),
            latitude: Some("3.1"),
            longitude: Some("101.1"),
            status: "Aktif",
            no_file: "SK 338",
            region: "PAHANG",
        },
        Land {
            bil_no: 2,
            license_no: "A1",
            company: "Y Bhd",
            expired_date: Some("1/2/2025"),
            latitude: Some("3.2"),
            longitude: Some("101.2"),
            status: "Aktif",
            no_file: "SK 338",
            region: "PAHANG",
        },
        Land {
            bil_no: 3,
            license_no: "B2",
            company: "Z Enterprise",
            expired_date: Some("15/06/2024"),
            latitude: None,
            longitude: None,
            status: "Tamat",
            no_file: "SK 400",
            region: "JOHOR",
        },
        Land {
            bil_no: 4,
            license_no: "C3",
            company: "X Sdn Bhd",
            expired_date: Some("not a date"),
            latitude: Some("2.0"),
            longitude: Some("102.0"),
            status: "Dalam Proses",
            no_file: "SK 401",
            region: "Johor Bahru",
        },
    ]
}

pub fn date(iso: &str) -> NaiveDate {
    NaiveDate::parse_from_str(iso, "%Y-%m-%d").unwrap()
}

fn epoch_days(iso: &str) -> i32 {
    (date(iso) - NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()).num_days() as i32
}

fn write_batch(path: &Path, batch: RecordBatch) {
    let file = File::create(path).unwrap();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
}

pub fn write_ships(path: &Path, ships: &[Ship]) {
    let ends = Date32Array::from(ships.iter().map(|s| s.period_end.map(epoch_days)).collect::<Vec<_>>());
    write_ship_columns(path, ships, DataType::Date32, Arc::new(ends));
}

/// Same rows, `licensePeriodEnd` stored as a nanosecond timestamp (the pandas default).
pub fn write_ships_with_timestamp_ends(path: &Path, ships: &[Ship]) {
    let nanos = |iso: &str| i64::from(epoch_days(iso)) * 86_400 * 1_000_000_000;
    let ends = TimestampNanosecondArray::from(
        ships.iter().map(|s| s.period_end.map(nanos)).collect::<Vec<_>>(),
    );
    write_ship_columns(
        path,
        ships,
        DataType::Timestamp(TimeUnit::Nanosecond, None),
        Arc::new(ends),
    );
}

fn write_ship_columns(path: &Path, ships: &[Ship], end_type: DataType, ends: ArrayRef) {
    let schema = Arc::new(Schema::new(vec![
        Field::new("fileNo", DataType::Utf8, true),
        Field::new("company", DataType::Utf8, true),
        Field::new("shipName", DataType::Utf8, true),
        Field::new("licenseNo", DataType::Float64, true),
        Field::new("concession", DataType::Utf8, true),
        Field::new("licensePeriodEnd", end_type, true),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(ships.iter().map(|s| s.file_no))),
        Arc::new(StringArray::from_iter_values(ships.iter().map(|s| s.company))),
        Arc::new(StringArray::from_iter_values(ships.iter().map(|s| s.ship_name))),
        Arc::new(Float64Array::from_iter_values(ships.iter().map(|s| s.license_no))),
        Arc::new(StringArray::from_iter_values(ships.iter().map(|s| s.concession))),
        ends,
    ];
    write_batch(path, RecordBatch::try_new(schema, columns).unwrap());
}

pub fn write_lands(path: &Path, lands: &[Land]) {
    let schema = Arc::new(Schema::new(vec![
        Field::new("BilNo", DataType::Int64, true),
        Field::new("licenseNo", DataType::Utf8, true),
        Field::new("company", DataType::Utf8, true),
        Field::new("expiredDate", DataType::Utf8, true),
        Field::new("latitude", DataType::Utf8, true),
        Field::new("longitude", DataType::Utf8, true),
        Field::new("status", DataType::Utf8, true),
        Field::new("noFile", DataType::Utf8, true),
        Field::new("region", DataType::Utf8, true),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from_iter_values(lands.iter().map(|l| l.bil_no))),
        Arc::new(StringArray::from_iter_values(lands.iter().map(|l| l.license_no))),
        Arc::new(StringArray::from_iter_values(lands.iter().map(|l| l.company))),
        Arc::new(StringArray::from(lands.iter().map(|l| l.expired_date).collect::<Vec<_>>())),
        Arc::new(StringArray::from(lands.iter().map(|l| l.latitude).collect::<Vec<_>>())),
        Arc::new(StringArray::from(lands.iter().map(|l| l.longitude).collect::<Vec<_>>())),
        Arc::new(StringArray::from_iter_values(lands.iter().map(|l| l.status))),
        Arc::new(StringArray::from_iter_values(lands.iter().map(|l| l.no_file))),
        Arc::new(StringArray::from_iter_values(lands.iter().map(|l| l.region))),
    ];
    write_batch(path, RecordBatch::try_new(schema, columns).unwrap());
}

/// A vessel dataset whose `fileNo` column is numeric, which the ship schema rejects.
pub fn write_ships_with_numeric_file_no(path: &Path) {
    let schema = Arc::new(Schema::new(vec![
        Field::new("fileNo", DataType::Int64, true),
        Field::new("concession", DataType::Utf8, true),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(vec![561])),
        Arc::new(StringArray::from(vec!["Selangor"])),
    ];
    write_batch(path, RecordBatch::try_new(schema, columns).unwrap());
}

/// Both default datasets in a temp dir; keep the `TempDir` alive for the test.
pub fn fixture(output: OutputOptions) -> (TempDir, AppConfig) {
    let dir = TempDir::new().unwrap();
    let sources = DatasetSources {
        shiplist: dir.path().join("shiplist.parquet"),
        licenselist: dir.path().join("licenselist.parquet"),
    };
    write_ships(&sources.shiplist, &ships());
    write_lands(&sources.licenselist, &lands());

    let config = AppConfig {
        sources,
        output,
        as_of: Some(date("2025-01-01")),
    };
    (dir, config)
}

pub fn grouped() -> OutputOptions {
    OutputOptions {
        group_licenses: true,
        validate: true,
    }
}

pub fn flat() -> OutputOptions {
    OutputOptions {
        group_licenses: false,
        validate: true,
    }
}
