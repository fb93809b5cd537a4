//! Reshape fetched land license rows for the response.
//!
//! # Architecture
//!
//! ```text
//! Fetched rows (flat)                      →  Grouped output
//! ┌──────────────────────────────────┐       ┌───────────────────────────────┐
//! │ licenseNo: A1, lat: 3.1, lng: 101│       │ "A1": [{coordinate: {..}, ..},│
//! │ licenseNo: A1, lat: 3.2, lng: 102│  →    │        {coordinate: {..}, ..}]│
//! │ licenseNo: B2, lat: 4.0, lng: 100│       │ "B2": [{coordinate: {..}, ..}]│
//! └──────────────────────────────────┘       └───────────────────────────────┘
//! ```
//!
//! Steps run in a fixed order: coordinates are nested first, `daysRemaining`
//! already comes from the query, grouping runs last.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::models::{Coordinate, Row, COORDINATE, LATITUDE, LICENSE_NO, LONGITUDE};

/// Land license response body: a flat list or a license-number mapping.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LicenseListing {
    Flat(Vec<Row>),
    Grouped(Map<String, Value>),
}

impl LicenseListing {
    /// Number of records, whatever the shape.
    pub fn record_count(&self) -> usize {
        match self {
            LicenseListing::Flat(rows) => rows.len(),
            LicenseListing::Grouped(groups) => groups
                .values()
                .filter_map(Value::as_array)
                .map(Vec::len)
                .sum(),
        }
    }
}

/// Nest coordinates, then group by license number if requested.
pub fn shape_licenses(rows: Vec<Row>, group: bool) -> LicenseListing {
    let rows = nest_coordinates(rows);
    if group {
        LicenseListing::Grouped(group_by_license_number(rows))
    } else {
        LicenseListing::Flat(rows)
    }
}

/// Replace `latitude`/`longitude` with a `coordinate` object on every row.
pub fn nest_coordinates(mut rows: Vec<Row>) -> Vec<Row> {
    rows.iter_mut().for_each(nest_row_coordinates);
    rows
}

fn nest_row_coordinates(row: &mut Row) {
    let has_flat = row.contains_key(LATITUDE) || row.contains_key(LONGITUDE);
    if !has_flat && row.contains_key(COORDINATE) {
        return;
    }

    let coordinate = Coordinate::new(row.shift_remove(LATITUDE), row.shift_remove(LONGITUDE));
    row.insert(COORDINATE.to_string(), coordinate.into());
}

/// Group rows by `licenseNo`, removing the key from each row body.
///
/// Keys keep first-occurrence order and each group keeps fetch order.
/// Text keys are used as-is, numbers by their JSON text, null or missing
/// license numbers as `"null"`.
pub fn group_by_license_number(rows: Vec<Row>) -> Map<String, Value> {
    let mut groups: Vec<(String, Vec<Value>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for mut row in rows {
        let key = license_key(row.shift_remove(LICENSE_NO));
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push((key, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(Value::Object(row));
    }

    groups
        .into_iter()
        .map(|(key, rows)| (key, Value::Array(rows)))
        .collect()
}

fn license_key(value: Option<Value>) -> String {
    match value {
        Some(Value::String(s)) => s,
        Some(Value::Null) | None => "null".to_string(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_nest_coordinates_moves_flat_fields() {
        let rows = nest_coordinates(vec![row(json!({
            "licenseNo": "A1",
            "latitude": "3.1390",
            "longitude": "101.6869",
            "status": "Aktif"
        }))]);

        assert_eq!(
            Value::Object(rows[0].clone()),
            json!({
                "licenseNo": "A1",
                "status": "Aktif",
                "coordinate": { "latitude": "3.1390", "longitude": "101.6869" }
            })
        );
        let keys: Vec<&str> = rows[0].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["licenseNo", "status", "coordinate"]);
    }

    #[test]
    fn test_nest_coordinates_without_flat_fields() {
        let rows = nest_coordinates(vec![row(json!({ "licenseNo": "A1" }))]);
        assert_eq!(rows[0]["coordinate"], json!({ "latitude": null, "longitude": null }));

        let partial = nest_coordinates(vec![row(json!({ "latitude": 3.5 }))]);
        assert_eq!(partial[0]["coordinate"], json!({ "latitude": 3.5, "longitude": null }));
    }

    #[test]
    fn test_nest_coordinates_is_idempotent() {
        let once = nest_coordinates(vec![
            row(json!({ "latitude": "1", "longitude": "2" })),
            row(json!({ "company": "X" })),
        ]);
        let twice = nest_coordinates(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_group_by_license_number() {
        let rows = vec![
            row(json!({ "licenseNo": "A1", "company": "X" })),
            row(json!({ "licenseNo": "A1", "company": "Y" })),
            row(json!({ "licenseNo": "B2", "company": "Z" })),
        ];

        let grouped = group_by_license_number(rows);

        assert_eq!(
            Value::Object(grouped),
            json!({
                "A1": [{ "company": "X" }, { "company": "Y" }],
                "B2": [{ "company": "Z" }]
            })
        );
    }

    #[test]
    fn test_group_preserves_first_occurrence_order() {
        let keys = ["C3", "A1", "C3", "B2", "A1", "C3"];
        let rows: Vec<Row> = keys
            .iter()
            .enumerate()
            .map(|(i, key)| row(json!({ "licenseNo": key, "seq": i })))
            .collect();

        let grouped = group_by_license_number(rows);

        let order: Vec<&str> = grouped.keys().map(String::as_str).collect();
        assert_eq!(order, vec!["C3", "A1", "B2"]);
        assert_eq!(grouped["C3"], json!([{ "seq": 0 }, { "seq": 2 }, { "seq": 5 }]));
        assert_eq!(grouped["A1"], json!([{ "seq": 1 }, { "seq": 4 }]));

        let total: usize = grouped.values().map(|v| v.as_array().unwrap().len()).sum();
        assert_eq!(total, keys.len());
    }

    #[test]
    fn test_group_key_for_non_text_license_numbers() {
        let grouped = group_by_license_number(vec![
            row(json!({ "licenseNo": 17, "company": "X" })),
            row(json!({ "licenseNo": null, "company": "Y" })),
            row(json!({ "company": "Z" })),
        ]);

        assert_eq!(grouped["17"], json!([{ "company": "X" }]));
        assert_eq!(grouped["null"], json!([{ "company": "Y" }, { "company": "Z" }]));
    }

    #[test]
    fn test_shape_licenses_modes() {
        let rows = vec![
            row(json!({ "licenseNo": "A1", "latitude": "1", "longitude": "2" })),
            row(json!({ "licenseNo": "A1", "latitude": "3", "longitude": "4" })),
        ];

        let flat = shape_licenses(rows.clone(), false);
        let LicenseListing::Flat(ref flat_rows) = flat else {
            panic!("expected flat listing");
        };
        assert_eq!(flat_rows[0]["licenseNo"], "A1");
        assert_eq!(flat.record_count(), 2);

        let grouped = shape_licenses(rows, true);
        assert_eq!(grouped.record_count(), 2);
        assert_eq!(
            serde_json::to_value(&grouped).unwrap(),
            json!({ "A1": [
                { "coordinate": { "latitude": "1", "longitude": "2" } },
                { "coordinate": { "latitude": "3", "longitude": "4" } }
            ] })
        );
    }
}
