//! Zone boundary polygons.
//!
//! Loading runs the same steps for every feature: normalize the code,
//! left-join the display name, reproject to lon/lat, take the centroid,
//! simplify for display. The resulting [`BoundarySet`] keeps both the
//! records and a ready-to-serve `FeatureCollection`.

use std::collections::BTreeMap;

use faf_flows_zone_models::{CodeScheme, LonLat, ZoneDirectory};
use geo::{Centroid as _, MultiPolygon, SimplifyVwPreserve as _};
use geojson::{Feature, FeatureCollection, GeoJson, JsonObject, JsonValue, feature::Id};

use crate::ZoneError;
use crate::projection::{SourceCrs, is_lon_lat};

/// Property added to every feature with the joined display name.
pub const DISPLAY_NAME_PROPERTY: &str = "display_name";

/// Property added to every feature with the joined state.
pub const STATE_PROPERTY: &str = "state";

/// Settings for [`load_boundaries`].
#[derive(Debug, Clone)]
pub struct BoundaryOptions<'a> {
    /// Human-readable source name for errors and logs.
    pub source_name: &'a str,
    /// Feature property holding the zone code.
    pub code_property: &'a str,
    /// Code scheme to normalize with.
    pub scheme: CodeScheme,
    /// Explicit source CRS. `None` reads the file's `crs` member.
    pub crs: Option<SourceCrs>,
    /// Simplification tolerance in degrees. `0.0` disables simplification.
    pub simplify_tolerance: f64,
}

/// One zone polygon with its joined metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryRecord {
    /// Normalized code.
    pub code: String,
    /// Simplified polygon in lon/lat.
    pub polygon: MultiPolygon<f64>,
    /// Joined display name; `None` when the code has no metadata.
    pub display_name: Option<String>,
    /// Joined state, for county schemes.
    pub state: Option<String>,
    /// Centroid of the unsimplified polygon.
    pub centroid: Option<LonLat>,
    /// Every non-geometry field, including the joined ones.
    pub properties: JsonObject,
}

/// All boundaries of a dataset plus their serialized form.
#[derive(Debug, Clone)]
pub struct BoundarySet {
    records: Vec<BoundaryRecord>,
    centroids: BTreeMap<String, LonLat>,
    feature_collection: FeatureCollection,
}

impl BoundarySet {
    /// The boundary records in source order.
    #[must_use]
    pub fn records(&self) -> &[BoundaryRecord] {
        &self.records
    }

    /// Centroid of a zone, if the zone has a boundary.
    #[must_use]
    pub fn centroid(&self, code: &str) -> Option<LonLat> {
        self.centroids.get(code).copied()
    }

    /// Code → centroid lookup.
    #[must_use]
    pub const fn centroids(&self) -> &BTreeMap<String, LonLat> {
        &self.centroids
    }

    /// The feature collection as a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::Json`] if serialization fails.
    pub fn to_geojson_string(&self) -> Result<String, ZoneError> {
        Ok(serde_json::to_string(&self.feature_collection)?)
    }
}

/// Parses, joins, reprojects and simplifies a boundary `FeatureCollection`.
///
/// Features with a null geometry are skipped. When several features share
/// a code, the first one provides the centroid.
///
/// # Errors
///
/// Returns [`ZoneError`] if the text is not a `FeatureCollection`, a
/// feature lacks the code property or has an invalid code, a geometry is
/// not a polygon, the CRS is unsupported, or reprojected coordinates fall
/// outside lon/lat range.
pub fn load_boundaries(
    geojson_text: &str,
    options: &BoundaryOptions<'_>,
    zones: &ZoneDirectory,
) -> Result<BoundarySet, ZoneError> {
    let GeoJson::FeatureCollection(collection) = geojson_text.parse::<GeoJson>()? else {
        return Err(ZoneError::Conversion {
            message: format!("{} is not a GeoJSON FeatureCollection", options.source_name),
        });
    };

    let crs = match options.crs {
        Some(crs) => crs,
        None => collection
            .foreign_members
            .as_ref()
            .and_then(|members| members.get("crs"))
            .and_then(SourceCrs::from_geojson_member)
            .transpose()?
            .unwrap_or_default(),
    };
    log::debug!("{}: reprojecting from {crs:?}", options.source_name);

    let mut records = Vec::with_capacity(collection.features.len());
    let mut centroids = BTreeMap::new();

    for (index, feature) in collection.features.into_iter().enumerate() {
        let Some(record) = load_feature(feature, index, crs, options, zones)? else {
            continue;
        };

        if let Some(centroid) = record.centroid {
            if centroids.contains_key(&record.code) {
                log::warn!(
                    "{}: duplicate boundary for zone {}, keeping the first centroid",
                    options.source_name,
                    record.code
                );
            } else {
                centroids.insert(record.code.clone(), centroid);
            }
        }
        records.push(record);
    }

    let unmatched = records.iter().filter(|r| r.display_name.is_none()).count();
    if unmatched > 0 {
        log::warn!(
            "{}: {unmatched} boundaries have no zone metadata",
            options.source_name
        );
    }
    log::info!(
        "Loaded {} boundaries from {}",
        records.len(),
        options.source_name
    );

    let feature_collection = FeatureCollection {
        bbox: None,
        features: records.iter().map(to_feature).collect(),
        foreign_members: None,
    };

    Ok(BoundarySet {
        records,
        centroids,
        feature_collection,
    })
}

fn load_feature(
    feature: Feature,
    index: usize,
    crs: SourceCrs,
    options: &BoundaryOptions<'_>,
    zones: &ZoneDirectory,
) -> Result<Option<BoundaryRecord>, ZoneError> {
    let mut properties = feature.properties.unwrap_or_default();

    let raw_code = properties
        .get(options.code_property)
        .and_then(code_text)
        .ok_or_else(|| ZoneError::MissingProperty {
            source_name: options.source_name.to_string(),
            property: options.code_property.to_string(),
            index,
        })?;

    let code = options
        .scheme
        .normalize(&raw_code)
        .map_err(|source| ZoneError::InvalidCode {
            source_name: options.source_name.to_string(),
            location: format!("feature {index}"),
            source,
        })?;

    let Some(geometry) = feature.geometry else {
        log::warn!(
            "{}: zone {code} has no geometry, skipping",
            options.source_name
        );
        return Ok(None);
    };

    let polygon = match geo::Geometry::<f64>::try_from(geometry)? {
        geo::Geometry::MultiPolygon(mp) => mp,
        geo::Geometry::Polygon(p) => MultiPolygon(vec![p]),
        _ => {
            return Err(ZoneError::Conversion {
                message: format!(
                    "{}: zone {code} geometry is not a polygon",
                    options.source_name
                ),
            });
        }
    };

    let polygon = crs.reproject(&polygon);
    if !is_lon_lat(&polygon) {
        return Err(ZoneError::OutOfRange { code });
    }

    let centroid = polygon.centroid().map(|p| LonLat::new(p.x(), p.y()));
    let polygon = simplify(polygon, options.simplify_tolerance);

    let display_name = zones.display_name(&code).map(ToString::to_string);
    let state = zones.state(&code).map(ToString::to_string);

    properties.insert(
        options.code_property.to_string(),
        JsonValue::String(code.clone()),
    );
    properties.insert(
        DISPLAY_NAME_PROPERTY.to_string(),
        display_name.clone().map_or(JsonValue::Null, JsonValue::String),
    );
    if options.scheme == CodeScheme::CountyFips || state.is_some() {
        properties.insert(
            STATE_PROPERTY.to_string(),
            state.clone().map_or(JsonValue::Null, JsonValue::String),
        );
    }

    Ok(Some(BoundaryRecord {
        code,
        polygon,
        display_name,
        state,
        centroid,
        properties,
    }))
}

/// Code properties come as strings (`"061"`) or numbers (`61`, `6037.0`).
fn code_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Topology-preserving Visvalingam-Whyatt simplification.
///
/// The tolerance is a distance in degrees; Visvalingam-Whyatt thresholds on
/// triangle area, so the square of the tolerance is used.
fn simplify(polygon: MultiPolygon<f64>, tolerance: f64) -> MultiPolygon<f64> {
    if tolerance <= 0.0 {
        return polygon;
    }
    polygon.simplify_vw_preserve(tolerance * tolerance)
}

fn to_feature(record: &BoundaryRecord) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(geojson::Value::from(
            &record.polygon,
        ))),
        id: Some(Id::String(record.code.clone())),
        properties: Some(record.properties.clone()),
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faf_flows_zone_models::ZoneRecord;
    use geo::CoordsIter as _;

    fn zones() -> ZoneDirectory {
        ZoneDirectory::new([ZoneRecord {
            code: "011".to_string(),
            display_name: "Birmingham AL".to_string(),
            state: None,
        }])
    }

    fn assert_close(actual: LonLat, expected: LonLat) {
        assert!(
            (actual.lon - expected.lon).abs() < 1e-9 && (actual.lat - expected.lat).abs() < 1e-9,
            "expected {expected:?}, got {actual:?}"
        );
    }

    fn options(crs: Option<SourceCrs>, tolerance: f64) -> BoundaryOptions<'static> {
        BoundaryOptions {
            source_name: "zones.geojson",
            code_property: "FAF_Zone",
            scheme: CodeScheme::FafZone,
            crs,
            simplify_tolerance: tolerance,
        }
    }

    const TWO_SQUARES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "FAF_Zone": 11, "SHAPE_Area": 4.0 },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0], [0.0, 0.0]]]
                }
            },
            {
                "type": "Feature",
                "properties": { "FAF_Zone": "99" },
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [[[[10.0, 10.0], [12.0, 10.0], [12.0, 12.0], [10.0, 12.0], [10.0, 10.0]]]]
                }
            },
            {
                "type": "Feature",
                "properties": { "FAF_Zone": "50" },
                "geometry": null
            }
        ]
    }"#;

    #[test]
    fn joins_names_and_computes_centroids() {
        let set = load_boundaries(TWO_SQUARES, &options(None, 0.0), &zones()).unwrap();
        assert_eq!(set.records().len(), 2, "null geometry should be skipped");

        let first = &set.records()[0];
        assert_eq!(first.code, "011");
        assert_eq!(first.display_name.as_deref(), Some("Birmingham AL"));
        assert_close(set.centroid("011").unwrap(), LonLat::new(1.0, 1.0));

        let second = &set.records()[1];
        assert_eq!(second.code, "099");
        assert_eq!(second.display_name, None, "unmatched codes keep a null name");
        assert_close(set.centroid("099").unwrap(), LonLat::new(11.0, 11.0));
        assert_eq!(set.centroid("050"), None);
    }

    #[test]
    fn serializes_every_non_geometry_field() {
        let set = load_boundaries(TWO_SQUARES, &options(None, 0.0), &zones()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&set.to_geojson_string().unwrap()).unwrap();

        let features = json["features"].as_array().unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[0]["properties"]["FAF_Zone"], "011");
        assert_eq!(features[0]["properties"]["display_name"], "Birmingham AL");
        assert_eq!(features[0]["properties"]["SHAPE_Area"], 4.0);
        assert_eq!(features[0]["geometry"]["type"], "MultiPolygon");
        assert!(features[1]["properties"]["display_name"].is_null());
    }

    #[test]
    fn reprojects_from_crs_member() {
        let text = r#"{
            "type": "FeatureCollection",
            "crs": { "type": "name", "properties": { "name": "EPSG:3857" } },
            "features": [{
                "type": "Feature",
                "properties": { "FAF_Zone": "11" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0.0, 0.0], [111319.49, 0.0], [111319.49, 111325.14], [0.0, 111325.14], [0.0, 0.0]]]
                }
            }]
        }"#;
        let set = load_boundaries(text, &options(None, 0.0), &zones()).unwrap();
        let centroid = set.centroid("011").unwrap();
        assert!((centroid.lon - 0.5).abs() < 1e-3, "lon was {}", centroid.lon);
        assert!((centroid.lat - 0.5).abs() < 1e-3, "lat was {}", centroid.lat);
    }

    #[test]
    fn projected_coordinates_without_crs_are_rejected() {
        let text = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": { "FAF_Zone": "11" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0.0, 0.0], [500000.0, 0.0], [500000.0, 500000.0], [0.0, 0.0]]]
                }
            }]
        }"#;
        let err = load_boundaries(text, &options(None, 0.0), &zones()).unwrap_err();
        assert!(matches!(err, ZoneError::OutOfRange { .. }), "got {err}");
    }

    #[test]
    fn simplification_drops_insignificant_vertices() {
        // A square with a barely-off-line vertex on its bottom edge.
        let text = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": { "FAF_Zone": "11" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0.0, 0.0], [1.0, 0.00001], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0], [0.0, 0.0]]]
                }
            }]
        }"#;
        let raw = load_boundaries(text, &options(Some(SourceCrs::Wgs84), 0.0), &zones()).unwrap();
        let simplified =
            load_boundaries(text, &options(Some(SourceCrs::Wgs84), 0.01), &zones()).unwrap();

        let raw_count = raw.records()[0].polygon.coords_count();
        let simplified_count = simplified.records()[0].polygon.coords_count();
        assert!(
            simplified_count < raw_count,
            "expected fewer vertices: {simplified_count} vs {raw_count}"
        );
        assert_eq!(raw.centroid("011"), simplified.centroid("011"));
    }

    #[test]
    fn missing_code_property_is_a_load_failure() {
        let text = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": { "OTHER": "11" },
                "geometry": null
            }]
        }"#;
        let err = load_boundaries(text, &options(None, 0.0), &zones()).unwrap_err();
        assert!(matches!(err, ZoneError::MissingProperty { index: 0, .. }), "got {err}");
    }

    #[test]
    fn non_collections_are_rejected() {
        let text = r#"{ "type": "Point", "coordinates": [0.0, 0.0] }"#;
        assert!(matches!(
            load_boundaries(text, &options(None, 0.0), &zones()),
            Err(ZoneError::Conversion { .. })
        ));
    }
}
