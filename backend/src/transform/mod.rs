//! Transformation module.
//!
//! This module turns fetched rows into API responses:
//! - Reshape: coordinate nesting and license-number grouping
//! - Pipeline: filter, fetch, reshape and validate, per view

pub mod pipeline;
pub mod reshape;

pub use pipeline::QueryService;
pub use reshape::{group_by_license_number, nest_coordinates, shape_licenses, LicenseListing};
