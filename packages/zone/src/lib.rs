#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Zone metadata and boundary geometry loading.
//!
//! Reads the code → name tables and the zone polygons a dataset refers to,
//! normalizes codes, joins names onto polygons, reprojects to lon/lat,
//! simplifies for display, and derives the centroid of every zone. The
//! centroids are what flow records are later attached to.

pub mod boundaries;
pub mod metadata;
pub mod projection;

use faf_flows_zone_models::CodeError;
use thiserror::Error;

pub use boundaries::{BoundaryOptions, BoundaryRecord, BoundarySet, load_boundaries};
pub use metadata::load_zone_metadata;
pub use projection::SourceCrs;

/// Errors that can occur while loading zone data.
#[derive(Debug, Error)]
pub enum ZoneError {
    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// `GeoJSON` parsing or geometry conversion failed.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required column is absent from a table.
    #[error("Column '{column}' not found in {source_name}")]
    MissingColumn {
        /// Table the column was expected in.
        source_name: String,
        /// Expected column name.
        column: String,
    },

    /// A feature lacks the code property.
    #[error("Feature {index} in {source_name} has no '{property}' property")]
    MissingProperty {
        /// Boundary source name.
        source_name: String,
        /// Expected property name.
        property: String,
        /// Zero-based feature index.
        index: usize,
    },

    /// A code could not be normalized.
    #[error("Invalid zone code in {source_name} at {location}: {source}")]
    InvalidCode {
        /// Table or feature source name.
        source_name: String,
        /// Line or feature position.
        location: String,
        /// Underlying normalization error.
        source: CodeError,
    },

    /// The boundary source uses a coordinate system we cannot reproject.
    #[error("Unsupported coordinate reference system '{0}'")]
    UnsupportedCrs(String),

    /// Reprojected coordinates are not valid lon/lat values.
    #[error("Zone {code} has coordinates outside lon/lat range after reprojection")]
    OutOfRange {
        /// Zone code.
        code: String,
    },

    /// Data conversion error.
    #[error("Conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}
