#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Flow record and trip segment types.

use std::collections::BTreeMap;
use std::str::FromStr;

use faf_flows_zone_models::{LonLat, code_from_label};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Selector value meaning "every destination".
pub const ALL_DESTINATIONS: &str = "All";

/// The two synthetic time marks every trip is animated between.
pub const TRIP_TIME_MARKS: [u32; 2] = [0, 2];

/// One origin → destination shipment (or predicted shipment).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowRecord {
    /// Normalized origin zone code.
    pub origin_code: String,
    /// Normalized destination zone code.
    pub dest_code: String,
    /// Primary magnitude (tons, or predicted value). Never negative.
    pub magnitude: f64,
    /// Model confidence, for predicted flows.
    pub confidence: Option<f64>,
    /// Origin centroid, if resolved.
    pub origin_centroid: Option<LonLat>,
    /// Destination centroid, if resolved.
    pub dest_centroid: Option<LonLat>,
    /// Secondary measures keyed by column name.
    #[serde(default)]
    pub measures: BTreeMap<String, f64>,
}

impl FlowRecord {
    /// Value of the given field. A measure the record does not carry
    /// counts as `0.0`.
    #[must_use]
    pub fn value_of(&self, field: &MagnitudeField) -> f64 {
        match field {
            MagnitudeField::Primary => self.magnitude,
            MagnitudeField::Measure(column) => self.measures.get(column).copied().unwrap_or(0.0),
        }
    }

    /// Both centroids, when both are resolved.
    #[must_use]
    pub const fn endpoints(&self) -> Option<(LonLat, LonLat)> {
        match (self.origin_centroid, self.dest_centroid) {
            (Some(origin), Some(dest)) => Some((origin, dest)),
            _ => None,
        }
    }
}

/// Which numeric field of a [`FlowRecord`] to rank or sum by.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum MagnitudeField {
    /// [`FlowRecord::magnitude`].
    #[default]
    Primary,
    /// A secondary measure, by column name.
    Measure(String),
}

/// Destination narrowing for a selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum DestinationFilter {
    /// Every destination.
    #[default]
    All,
    /// One destination zone, by normalized code.
    Zone(String),
}

impl DestinationFilter {
    /// Whether a destination code passes this filter.
    #[must_use]
    pub fn matches(&self, dest_code: &str) -> bool {
        match self {
            Self::All => true,
            Self::Zone(code) => code == dest_code,
        }
    }
}

impl FromStr for DestinationFilter {
    type Err = std::convert::Infallible;

    /// Accepts `"All"` (any case), a bare code, or a selector label such as
    /// `"061 - Los Angeles CA"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case(ALL_DESTINATIONS) {
            return Ok(Self::All);
        }
        Ok(Self::Zone(code_from_label(s).to_string()))
    }
}

impl std::fmt::Display for DestinationFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str(ALL_DESTINATIONS),
            Self::Zone(code) => f.write_str(code),
        }
    }
}

/// How trips are drawn by the map renderer.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LayerKind {
    /// Animated trips moving between the two time marks.
    #[default]
    Trips,
    /// Static great-circle arcs.
    Arc,
}

/// One renderable origin → destination line.
///
/// Field names on the wire are the ones the map renderer reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripSegment {
    /// `[[origin lon, origin lat], [dest lon, dest lat]]`.
    #[serde(rename = "coordinates")]
    pub path: [[f64; 2]; 2],
    /// Always [`TRIP_TIME_MARKS`].
    #[serde(rename = "timestamps")]
    pub time_marks: [u32; 2],
    /// Origin zone code.
    #[serde(rename = "orig_dms")]
    pub origin_code: String,
    /// Destination zone code.
    #[serde(rename = "dest_dms")]
    pub dest_code: String,
}

impl TripSegment {
    /// Builds a segment between two resolved centroids.
    #[must_use]
    pub fn new(origin_code: &str, dest_code: &str, origin: LonLat, dest: LonLat) -> Self {
        Self {
            path: [origin.to_array(), dest.to_array()],
            time_marks: TRIP_TIME_MARKS,
            origin_code: origin_code.to_string(),
            dest_code: dest_code.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> FlowRecord {
        FlowRecord {
            origin_code: "061".to_string(),
            dest_code: "064".to_string(),
            magnitude: 12.5,
            confidence: None,
            origin_centroid: Some(LonLat::new(-118.2, 34.0)),
            dest_centroid: None,
            measures: BTreeMap::from([("value_2017".to_string(), 40.0)]),
        }
    }

    #[test]
    fn value_of_reads_primary_and_measures() {
        let r = record();
        assert!((r.value_of(&MagnitudeField::Primary) - 12.5).abs() < f64::EPSILON);
        assert!(
            (r.value_of(&MagnitudeField::Measure("value_2017".to_string())) - 40.0).abs()
                < f64::EPSILON
        );
        assert!(r.value_of(&MagnitudeField::Measure("tmiles_2017".to_string())).abs() < f64::EPSILON);
    }

    #[test]
    fn endpoints_need_both_centroids() {
        let mut r = record();
        assert_eq!(r.endpoints(), None);
        r.dest_centroid = Some(LonLat::new(-121.5, 38.5));
        assert!(r.endpoints().is_some());
    }

    #[test]
    fn destination_filter_parses_labels() {
        assert_eq!("All".parse::<DestinationFilter>().unwrap(), DestinationFilter::All);
        assert_eq!("all".parse::<DestinationFilter>().unwrap(), DestinationFilter::All);
        assert_eq!(
            "064 - San Diego CA".parse::<DestinationFilter>().unwrap(),
            DestinationFilter::Zone("064".to_string())
        );
        assert_eq!(
            "06073".parse::<DestinationFilter>().unwrap(),
            DestinationFilter::Zone("06073".to_string())
        );
        assert!(DestinationFilter::All.matches("999"));
        assert!(!DestinationFilter::Zone("064".to_string()).matches("061"));
    }

    #[test]
    fn trip_segment_uses_renderer_column_names() {
        let trip = TripSegment::new(
            "061",
            "064",
            LonLat::new(-118.0, 34.0),
            LonLat::new(-117.0, 33.0),
        );
        let json = serde_json::to_value(&trip).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "coordinates": [[-118.0, 34.0], [-117.0, 33.0]],
                "timestamps": [0, 2],
                "orig_dms": "061",
                "dest_dms": "064",
            })
        );
    }

    #[test]
    fn layer_kind_parses_case_insensitively() {
        assert_eq!("arc".parse::<LayerKind>().unwrap(), LayerKind::Arc);
        assert_eq!("Trips".parse::<LayerKind>().unwrap(), LayerKind::Trips);
        assert_eq!(LayerKind::Arc.to_string(), "arc");
        assert!("heatmap".parse::<LayerKind>().is_err());
    }
}
