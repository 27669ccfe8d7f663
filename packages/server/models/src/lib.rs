#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the flow server.
//!
//! These are separate from the dataset definition types so the TOML schema
//! and the JSON contract can change independently.

use faf_flows_dataset_models::{CategoryRef, DatasetDefinition, MeasureColumn};
use faf_flows_zone_models::CodeScheme;
use serde::{Deserialize, Serialize};

/// Service health.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Error body returned with every non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
}

/// A numeric field and how to label it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMeasure {
    /// Key in `summary.measureTotals` (or the primary magnitude column).
    pub column: String,
    /// Display label.
    pub label: String,
    /// Display unit.
    pub unit: Option<String>,
}

impl From<&MeasureColumn> for ApiMeasure {
    fn from(measure: &MeasureColumn) -> Self {
        Self {
            column: measure.column.clone(),
            label: measure.label.clone(),
            unit: measure.unit.clone(),
        }
    }
}

/// Everything a client needs to build its selectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDataset {
    /// Dataset id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Zone code scheme.
    pub scheme: CodeScheme,
    /// Categories in selector order.
    pub categories: Vec<CategoryRef>,
    /// Primary magnitude.
    pub magnitude: ApiMeasure,
    /// Secondary measures.
    pub measures: Vec<ApiMeasure>,
    /// Top-N menu; empty means every flow is drawn.
    pub top_n_choices: Vec<usize>,
    /// Preselected top-N.
    pub default_top_n: Option<usize>,
    /// Preselected origin code.
    pub default_origin: Option<String>,
    /// Rows in the top-destinations table.
    pub top_destinations: usize,
}

impl From<&DatasetDefinition> for ApiDataset {
    fn from(dataset: &DatasetDefinition) -> Self {
        Self {
            id: dataset.id.clone(),
            name: dataset.name.clone(),
            scheme: dataset.scheme,
            categories: dataset.categories.iter().map(CategoryRef::from).collect(),
            magnitude: ApiMeasure::from(&dataset.flows.magnitude),
            measures: dataset.flows.measures.iter().map(ApiMeasure::from).collect(),
            top_n_choices: dataset.top_n_choices.clone(),
            default_top_n: dataset.default_top_n,
            default_origin: dataset.default_origin.clone(),
            top_destinations: dataset.top_destinations,
        }
    }
}

/// Query parameters for the flows endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowQueryParams {
    /// Category id or name.
    pub category: String,
    /// Origin code or label. Defaults to the dataset's default origin.
    pub origin: Option<String>,
    /// Destination code, label, or `All`.
    pub dest: Option<String>,
    /// Number of links to draw.
    pub top: Option<usize>,
    /// Rows in the top-destinations table.
    pub top_destinations: Option<usize>,
    /// `trips` or `arc`.
    pub layer: Option<String>,
}
