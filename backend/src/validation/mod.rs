//! JSON Schema validation for outgoing license records.
//!
//! Deployments that validate their responses check every record against the
//! schema of its dataset before it is sent. A record that does not match is a
//! server error, never a silently altered response.
//!
//! # Embedded Schemas
//!
//! Schemas are embedded at compile time from the `schemas/` directory
//! (JSON Schema Draft 7):
//! - `ship.json` - vessel license records
//! - `license.json` - land license records, with the nested `coordinate`
//!
//! Both accept an optional integer `daysRemaining` and extra columns.
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use jkptg::{models::Dataset, validation::is_valid_record};
//!
//! let ship = json!({ "fileNo": "SK 561", "licenseNo": 12.0, "daysRemaining": -3 });
//! assert!(is_valid_record(Dataset::Vessels, &ship));
//! ```

use jsonschema::Validator;
use once_cell::sync::Lazy;
use serde_json::Value;

use crate::models::{Dataset, Row};

static SHIP_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/ship.json")).expect("Invalid embedded schema")
});

static LICENSE_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/license.json")).expect("Invalid embedded schema")
});

static SHIP_VALIDATOR: Lazy<Validator> =
    Lazy::new(|| jsonschema::draft7::new(&SHIP_SCHEMA).expect("Invalid embedded schema"));

static LICENSE_VALIDATOR: Lazy<Validator> =
    Lazy::new(|| jsonschema::draft7::new(&LICENSE_SCHEMA).expect("Invalid embedded schema"));

fn validator_for(dataset: Dataset) -> &'static Validator {
    match dataset {
        Dataset::Vessels => &SHIP_VALIDATOR,
        Dataset::Lands => &LICENSE_VALIDATOR,
    }
}

fn collect_errors(validator: &Validator, data: &Value) -> Result<(), Vec<String>> {
    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate one record against its dataset schema.
pub fn validate_record(dataset: Dataset, record: &Value) -> Result<(), Vec<String>> {
    collect_errors(validator_for(dataset), record)
}

/// Quick check of one record.
pub fn is_valid_record(dataset: Dataset, record: &Value) -> bool {
    validator_for(dataset).is_valid(record)
}

/// Validate fetched rows, prefixing each violation with its row index.
pub fn validate_rows(dataset: Dataset, rows: &[Row]) -> Result<(), Vec<String>> {
    let validator = validator_for(dataset);
    let errors: Vec<String> = rows
        .iter()
        .enumerate()
        .filter_map(|(index, row)| {
            collect_errors(validator, &Value::Object(row.clone()))
                .err()
                .map(|errors| (index, errors))
        })
        .flat_map(|(index, errors)| {
            errors
                .into_iter()
                .map(move |e| format!("{} row {}: {}", dataset, index, e))
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
