#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dataset definition types.
//!
//! A dataset bundles everything needed to turn a directory of exported
//! tables into flows on a map: where the zone metadata and boundary
//! polygons live, how the flow table columns are named, and which flow
//! file backs each commodity category. Definitions are deserialized from
//! TOML.

use faf_flows_zone_models::CodeScheme;
use serde::{Deserialize, Serialize};

/// Default polygon simplification tolerance, in degrees.
pub const DEFAULT_SIMPLIFY_TOLERANCE: f64 = 0.01;

/// Default number of destinations in the top-destinations table.
pub const DEFAULT_TOP_DESTINATIONS: usize = 5;

const fn default_simplify_tolerance() -> f64 {
    DEFAULT_SIMPLIFY_TOLERANCE
}

const fn default_top_destinations() -> usize {
    DEFAULT_TOP_DESTINATIONS
}

/// A complete dataset definition, deserialized from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetDefinition {
    /// Unique identifier (e.g. `"faf_zones"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Code scheme shared by zones, boundaries and flows.
    pub scheme: CodeScheme,
    /// Zone metadata source.
    pub zones: ZoneSourceConfig,
    /// Boundary polygon source.
    pub boundaries: BoundarySourceConfig,
    /// Flow table column mapping, shared by every category.
    pub flows: FlowColumns,
    /// Commodity categories in selector order.
    pub categories: Vec<CategoryConfig>,
    /// Menu of top-N link counts offered to the user. Empty means the map
    /// always shows every flow.
    #[serde(default)]
    pub top_n_choices: Vec<usize>,
    /// Preselected top-N value.
    #[serde(default)]
    pub default_top_n: Option<usize>,
    /// Preselected origin code.
    #[serde(default)]
    pub default_origin: Option<String>,
    /// Number of rows in the top-destinations table.
    #[serde(default = "default_top_destinations")]
    pub top_destinations: usize,
}

impl DatasetDefinition {
    /// Finds a category by id, or by name ignoring ASCII case.
    #[must_use]
    pub fn category(&self, key: &str) -> Option<&CategoryConfig> {
        self.categories
            .iter()
            .find(|c| c.id == key)
            .or_else(|| {
                self.categories
                    .iter()
                    .find(|c| c.name.eq_ignore_ascii_case(key))
            })
    }
}

/// Where zone metadata lives and how its columns are named.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneSourceConfig {
    /// Source path, relative to the data directory.
    pub path: String,
    /// Column holding the zone code (e.g. `"Numeric Label"`).
    pub code_column: String,
    /// Column holding the display name (e.g. `"Short Description"`).
    pub name_column: String,
    /// Optional state column (county metadata).
    #[serde(default)]
    pub state_column: Option<String>,
}

/// Where boundary polygons live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundarySourceConfig {
    /// `GeoJSON` `FeatureCollection` path, relative to the data directory.
    pub path: String,
    /// Feature property holding the zone code (e.g. `"FAF_Zone"`).
    pub code_property: String,
    /// Source CRS (e.g. `"EPSG:3857"`). Falls back to the file's `crs`
    /// member, then to EPSG:4326.
    #[serde(default)]
    pub crs: Option<String>,
    /// Simplification tolerance in degrees.
    #[serde(default = "default_simplify_tolerance")]
    pub simplify_tolerance: f64,
}

/// Column mapping for flow tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowColumns {
    /// Origin code column (e.g. `"dms_orig"`).
    pub origin_column: String,
    /// Destination code column (e.g. `"dms_dest"`).
    pub dest_column: String,
    /// The primary magnitude used for ranking and totals.
    pub magnitude: MeasureColumn,
    /// Secondary measures summed for display.
    #[serde(default)]
    pub measures: Vec<MeasureColumn>,
    /// Confidence column. When set, the table is treated as model
    /// predictions and low-confidence or non-positive rows are dropped.
    #[serde(default)]
    pub confidence_column: Option<String>,
    /// Precomputed centroid columns. When set, they replace the boundary
    /// centroid join.
    #[serde(default)]
    pub centroid_columns: Option<CentroidColumns>,
}

/// A numeric column with display metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasureColumn {
    /// Column name in the flow table.
    pub column: String,
    /// Display label (e.g. `"Total tons shipped"`).
    pub label: String,
    /// Display unit (e.g. `"thousand tons"`).
    #[serde(default)]
    pub unit: Option<String>,
}

/// Names of precomputed centroid coordinate columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CentroidColumns {
    /// Origin longitude column.
    pub origin_x: String,
    /// Origin latitude column.
    pub origin_y: String,
    /// Destination longitude column.
    pub dest_x: String,
    /// Destination latitude column.
    pub dest_y: String,
}

/// One commodity category and the flow file backing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    /// Stable identifier (e.g. `"sctg_02"`).
    pub id: String,
    /// Selector name (e.g. `"Cereal Grains"`).
    pub name: String,
    /// Flow table path, relative to the data directory.
    pub path: String,
}

/// Category identity as shown to callers, without its file path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRef {
    /// Category id, used in URLs.
    pub id: String,
    /// Display name.
    pub name: String,
}

impl From<&CategoryConfig> for CategoryRef {
    fn from(category: &CategoryConfig) -> Self {
        Self {
            id: category.id.clone(),
            name: category.name.clone(),
        }
    }
}
