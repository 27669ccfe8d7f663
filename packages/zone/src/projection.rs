//! Source coordinate systems and their conversion to lon/lat.
//!
//! Boundary files in the wild come as plain WGS84, NAD83 geographic
//! (Census cartographic boundaries), or Web Mercator. NAD83 and WGS84
//! differ by about a metre across the continental US, far below what a
//! simplified boundary shows, so NAD83 is passed through unchanged.

use std::str::FromStr;

use geo::{Coord, MapCoords, MultiPolygon};

use crate::ZoneError;

/// Spherical Web Mercator earth radius in metres.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// A supported source coordinate reference system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceCrs {
    /// EPSG:4326 / OGC CRS84.
    #[default]
    Wgs84,
    /// EPSG:4269.
    Nad83,
    /// EPSG:3857 and its legacy aliases.
    WebMercator,
}

impl SourceCrs {
    /// Converts one source coordinate to `(lon, lat)` degrees.
    #[must_use]
    pub fn to_lon_lat(self, x: f64, y: f64) -> (f64, f64) {
        match self {
            Self::Wgs84 | Self::Nad83 => (x, y),
            Self::WebMercator => web_merc_to_lon_lat(x, y),
        }
    }

    /// Reprojects a polygon into lon/lat.
    #[must_use]
    pub fn reproject(self, polygon: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        if matches!(self, Self::Wgs84 | Self::Nad83) {
            return polygon.clone();
        }
        polygon.map_coords(move |c| {
            let (x, y) = self.to_lon_lat(c.x, c.y);
            Coord { x, y }
        })
    }

    /// Reads the legacy `GeoJSON` `crs` member
    /// (`{"type": "name", "properties": {"name": "EPSG:3857"}}`).
    ///
    /// Returns `None` when the member is absent or has no name.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::UnsupportedCrs`] if the named CRS is not one we
    /// can reproject.
    pub fn from_geojson_member(member: &serde_json::Value) -> Option<Result<Self, ZoneError>> {
        member
            .get("properties")
            .and_then(|p| p.get("name"))
            .and_then(serde_json::Value::as_str)
            .map(|name| name.parse())
    }
}

impl FromStr for SourceCrs {
    type Err = ZoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        if lower.ends_with("crs84") {
            return Ok(Self::Wgs84);
        }

        // "EPSG:4326", "urn:ogc:def:crs:EPSG::4326" and bare "4326" all end
        // in the numeric code.
        let code = lower.rsplit(':').next().unwrap_or_default();
        match code {
            "4326" => Ok(Self::Wgs84),
            "4269" => Ok(Self::Nad83),
            "3857" | "900913" | "102100" | "3785" => Ok(Self::WebMercator),
            _ => Err(ZoneError::UnsupportedCrs(s.trim().to_string())),
        }
    }
}

/// Inverse spherical Web Mercator: metres to `(lon, lat)` degrees.
#[must_use]
pub fn web_merc_to_lon_lat(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / EARTH_RADIUS).to_degrees();
    let lat = (2.0 * (y / EARTH_RADIUS).exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees();
    (lon, lat)
}

/// Whether every coordinate of a polygon is a valid lon/lat pair.
#[must_use]
pub fn is_lon_lat(polygon: &MultiPolygon<f64>) -> bool {
    use geo::CoordsIter as _;

    polygon
        .coords_iter()
        .all(|c| (-180.0..=180.0).contains(&c.x) && (-90.0..=90.0).contains(&c.y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    #[test]
    fn parses_common_spellings() {
        assert_eq!("EPSG:4326".parse::<SourceCrs>().unwrap(), SourceCrs::Wgs84);
        assert_eq!("epsg:4269".parse::<SourceCrs>().unwrap(), SourceCrs::Nad83);
        assert_eq!(
            "urn:ogc:def:crs:EPSG::3857".parse::<SourceCrs>().unwrap(),
            SourceCrs::WebMercator
        );
        assert_eq!(
            "urn:ogc:def:crs:OGC:1.3:CRS84".parse::<SourceCrs>().unwrap(),
            SourceCrs::Wgs84
        );
        assert!(matches!(
            "EPSG:2163".parse::<SourceCrs>(),
            Err(ZoneError::UnsupportedCrs(_))
        ));
    }

    #[test]
    fn reads_geojson_crs_member() {
        let member = serde_json::json!({
            "type": "name",
            "properties": { "name": "urn:ogc:def:crs:EPSG::3857" }
        });
        let crs = SourceCrs::from_geojson_member(&member).unwrap().unwrap();
        assert_eq!(crs, SourceCrs::WebMercator);
        assert!(SourceCrs::from_geojson_member(&serde_json::json!({})).is_none());
    }

    #[test]
    fn inverts_web_mercator() {
        let (lon, lat) = web_merc_to_lon_lat(0.0, 0.0);
        assert!(lon.abs() < 1e-9 && lat.abs() < 1e-9);

        let (la_lon, la_lat) = (-118.2437_f64, 34.0522_f64);
        let x = EARTH_RADIUS * la_lon.to_radians();
        let y = EARTH_RADIUS
            * (std::f64::consts::FRAC_PI_4 + la_lat.to_radians() / 2.0)
                .tan()
                .ln();
        let (lon, lat) = web_merc_to_lon_lat(x, y);
        assert!((lon - la_lon).abs() < 1e-9, "lon was {lon}");
        assert!((lat - la_lat).abs() < 1e-9, "lat was {lat}");
    }

    #[test]
    fn reprojects_polygons() {
        let square = MultiPolygon(vec![polygon![
            (x: 0.0, y: 0.0),
            (x: 111_319.49, y: 0.0),
            (x: 111_319.49, y: 111_325.14),
            (x: 0.0, y: 111_325.14),
            (x: 0.0, y: 0.0),
        ]]);
        let projected = SourceCrs::WebMercator.reproject(&square);
        assert!(is_lon_lat(&projected));
        let corner = projected.0[0].exterior().0[2];
        assert!((corner.x - 1.0).abs() < 1e-3, "x was {}", corner.x);
        assert!((corner.y - 1.0).abs() < 1e-3, "y was {}", corner.y);

        assert!(!is_lon_lat(&square));
        assert_eq!(SourceCrs::Nad83.reproject(&square), square);
    }
}
