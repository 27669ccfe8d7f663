#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Flow table loading.
//!
//! Turns one category's origin → destination table into [`FlowRecord`]s:
//! codes normalized to the dataset's scheme, predicted flows thresholded on
//! their confidence, and both ends attached to a centroid.

pub mod loader;

use faf_flows_zone_models::CodeError;
use thiserror::Error;

pub use faf_flows_flow_models::FlowRecord;
pub use loader::{CONFIDENCE_THRESHOLD, load_flows};

/// Errors that can occur while loading a flow table.
#[derive(Debug, Error)]
pub enum FlowError {
    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent from the table.
    #[error("Column '{column}' not found in {source_name}")]
    MissingColumn {
        /// Table name.
        source_name: String,
        /// Expected column name.
        column: String,
    },

    /// An origin or destination code could not be normalized.
    #[error("Invalid zone code in {source_name} at line {line}: {source}")]
    InvalidCode {
        /// Table name.
        source_name: String,
        /// One-based line number.
        line: u64,
        /// Underlying normalization error.
        source: CodeError,
    },

    /// A numeric cell did not hold a finite number.
    #[error("Invalid number '{value}' in column '{column}' of {source_name} at line {line}")]
    InvalidNumber {
        /// Table name.
        source_name: String,
        /// One-based line number.
        line: u64,
        /// Column name.
        column: String,
        /// Raw cell text.
        value: String,
    },

    /// An observed flow has a negative magnitude.
    #[error("Negative magnitude {value} in {source_name} at line {line}")]
    NegativeMagnitude {
        /// Table name.
        source_name: String,
        /// One-based line number.
        line: u64,
        /// Parsed value.
        value: f64,
    },
}
