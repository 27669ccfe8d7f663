#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Summary result types for a flow selection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Totals over a set of flow records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSummary {
    /// Number of records.
    pub count: u64,
    /// Sum of the primary magnitude.
    pub total_magnitude: f64,
    /// Sum of each secondary measure, keyed by column name.
    pub measure_totals: BTreeMap<String, f64>,
}

impl FlowSummary {
    /// Total of a secondary measure, `0.0` when no record carried it.
    #[must_use]
    pub fn measure_total(&self, column: &str) -> f64 {
        self.measure_totals.get(column).copied().unwrap_or(0.0)
    }
}

/// Aggregated magnitude shipped to one destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationTotal {
    /// Destination zone code.
    pub dest_code: String,
    /// Summed magnitude.
    pub total: f64,
}

/// A [`DestinationTotal`] with its display label resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelledDestination {
    /// Destination zone code.
    pub dest_code: String,
    /// Selector label, or the raw code when the zone has no metadata.
    pub label: String,
    /// Summed magnitude.
    pub total: f64,
}
