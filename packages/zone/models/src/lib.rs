#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Zone identifier and metadata types.
//!
//! Freight flows are keyed by fixed-width numeric codes: three digits for
//! FAF zones, five digits for county FIPS codes. Source files frequently
//! store these as numbers, dropping the leading zeros, so every code that
//! enters the system goes through [`CodeScheme::normalize`] first.

pub mod fips;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// Separator between the code and the names in a zone label.
pub const LABEL_SEPARATOR: &str = " - ";

/// The identifier scheme a dataset's zones are keyed by.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CodeScheme {
    /// Freight Analysis Framework zone (e.g. `"061"`).
    FafZone,
    /// County FIPS code (e.g. `"06037"`).
    CountyFips,
}

impl CodeScheme {
    /// Number of digits a normalized code has in this scheme.
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            Self::FafZone => 3,
            Self::CountyFips => 5,
        }
    }

    /// Normalizes a raw code into this scheme's fixed-width form.
    ///
    /// # Errors
    ///
    /// See [`normalize_code`].
    pub fn normalize(self, raw: &str) -> Result<String, CodeError> {
        normalize_code(raw, self.width())
    }
}

/// Errors produced while normalizing a zone code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeError {
    /// The cell was empty after trimming.
    #[error("empty zone code")]
    Empty,

    /// The value is not a non-negative integer.
    #[error("invalid zone code '{raw}': expected digits")]
    NotNumeric {
        /// The offending raw value.
        raw: String,
    },

    /// The value has more significant digits than the scheme allows.
    #[error("zone code '{raw}' does not fit in {width} digits")]
    TooWide {
        /// The offending raw value.
        raw: String,
        /// The scheme width.
        width: usize,
    },
}

/// Zero-pads a numeric code to `width` digits.
///
/// Accepts integer text (`"61"`), already padded text (`"061"`) and the
/// float form spreadsheet exports produce (`"61.0"`). Normalizing an
/// already-normalized code returns it unchanged.
///
/// # Errors
///
/// Returns [`CodeError`] if the value is empty, not numeric, has a
/// non-zero fractional part, or has more than `width` significant digits.
pub fn normalize_code(raw: &str, width: usize) -> Result<String, CodeError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CodeError::Empty);
    }

    let digits = match trimmed.split_once('.') {
        Some((int_part, frac)) if frac.bytes().all(|b| b == b'0') => int_part,
        Some(_) => {
            return Err(CodeError::NotNumeric {
                raw: trimmed.to_string(),
            });
        }
        None => trimmed,
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CodeError::NotNumeric {
            raw: trimmed.to_string(),
        });
    }

    let significant = digits.trim_start_matches('0');
    if significant.len() > width {
        return Err(CodeError::TooWide {
            raw: trimmed.to_string(),
            width,
        });
    }

    Ok(format!("{significant:0>width$}"))
}

/// Extracts the code from a selector label such as `"061 - Los Angeles CA"`.
#[must_use]
pub fn code_from_label(label: &str) -> &str {
    label
        .split_once(LABEL_SEPARATOR)
        .map_or(label, |(code, _)| code)
        .trim()
}

/// A longitude/latitude pair in EPSG:4326 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LonLat {
    /// Longitude in degrees.
    pub lon: f64,
    /// Latitude in degrees.
    pub lat: f64,
}

impl LonLat {
    /// Creates a new point.
    #[must_use]
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Returns the point as an `[x, y]` pair.
    #[must_use]
    pub const fn to_array(self) -> [f64; 2] {
        [self.lon, self.lat]
    }
}

/// Human-readable metadata for one zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneRecord {
    /// Normalized fixed-width code.
    pub code: String,
    /// Display name (FAF short description or county name).
    pub display_name: String,
    /// State abbreviation, for county schemes.
    pub state: Option<String>,
}

impl ZoneRecord {
    /// Formats the selector label for this zone.
    #[must_use]
    pub fn label(&self) -> String {
        match &self.state {
            Some(state) => format!(
                "{code}{LABEL_SEPARATOR}{name}{LABEL_SEPARATOR}{state}",
                code = self.code,
                name = self.display_name,
            ),
            None => format!(
                "{code}{LABEL_SEPARATOR}{name}",
                code = self.code,
                name = self.display_name,
            ),
        }
    }
}

/// A selectable zone: its code and the label shown for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneOption {
    /// Normalized code.
    pub code: String,
    /// Label (`"code - name"`), or the raw code when no metadata matched.
    pub label: String,
}

/// Immutable code → [`ZoneRecord`] lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneDirectory {
    zones: BTreeMap<String, ZoneRecord>,
}

impl ZoneDirectory {
    /// Builds a directory from records. When several records share a code
    /// the first one is kept.
    #[must_use]
    pub fn new(records: impl IntoIterator<Item = ZoneRecord>) -> Self {
        let mut zones = BTreeMap::new();
        for record in records {
            zones.entry(record.code.clone()).or_insert(record);
        }
        Self { zones }
    }

    /// Number of zones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Whether the directory has no zones.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Looks up a zone.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&ZoneRecord> {
        self.zones.get(code)
    }

    /// The display name for a code, if the code is known.
    #[must_use]
    pub fn display_name(&self, code: &str) -> Option<&str> {
        self.get(code).map(|z| z.display_name.as_str())
    }

    /// The state for a code, if known.
    #[must_use]
    pub fn state(&self, code: &str) -> Option<&str> {
        self.get(code).and_then(|z| z.state.as_deref())
    }

    /// The selector label for a code. Unknown codes fall back to the raw
    /// code.
    #[must_use]
    pub fn label(&self, code: &str) -> String {
        self.get(code)
            .map_or_else(|| code.to_string(), ZoneRecord::label)
    }

    /// Builds selector options for the given codes, preserving their order.
    #[must_use]
    pub fn options<'a>(&self, codes: impl IntoIterator<Item = &'a str>) -> Vec<ZoneOption> {
        codes
            .into_iter()
            .map(|code| ZoneOption {
                code: code.to_string(),
                label: self.label(code),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_numeric_codes() {
        assert_eq!(normalize_code("61", 3).unwrap(), "061");
        assert_eq!(normalize_code("6037", 5).unwrap(), "06037");
        assert_eq!(normalize_code(" 1 ", 3).unwrap(), "001");
    }

    #[test]
    fn accepts_spreadsheet_float_form() {
        assert_eq!(normalize_code("6037.0", 5).unwrap(), "06037");
        assert_eq!(normalize_code("12.00", 3).unwrap(), "012");
    }

    #[test]
    fn normalization_is_idempotent() {
        for raw in ["1", "061", "999", "0", "20.0"] {
            let once = normalize_code(raw, 3).unwrap();
            let twice = normalize_code(&once, 3).unwrap();
            assert_eq!(once, twice, "normalizing {raw} twice changed it");
        }
    }

    #[test]
    fn extra_leading_zeros_are_dropped() {
        assert_eq!(normalize_code("00061", 3).unwrap(), "061");
    }

    #[test]
    fn rejects_bad_codes() {
        assert_eq!(normalize_code("  ", 3), Err(CodeError::Empty));
        assert!(matches!(
            normalize_code("ab1", 3),
            Err(CodeError::NotNumeric { .. })
        ));
        assert!(matches!(
            normalize_code("6.5", 3),
            Err(CodeError::NotNumeric { .. })
        ));
        assert!(matches!(
            normalize_code("-12", 3),
            Err(CodeError::NotNumeric { .. })
        ));
        assert!(matches!(
            normalize_code("1234", 3),
            Err(CodeError::TooWide { width: 3, .. })
        ));
    }

    #[test]
    fn scheme_widths() {
        assert_eq!(CodeScheme::FafZone.normalize("5").unwrap(), "005");
        assert_eq!(CodeScheme::CountyFips.normalize("1001").unwrap(), "01001");
        assert_eq!(CodeScheme::CountyFips.to_string(), "county_fips");
        assert_eq!(
            "faf_zone".parse::<CodeScheme>().unwrap(),
            CodeScheme::FafZone
        );
    }

    #[test]
    fn labels_fall_back_to_raw_code() {
        let dir = ZoneDirectory::new([ZoneRecord {
            code: "061".to_string(),
            display_name: "Los Angeles CA".to_string(),
            state: None,
        }]);
        assert_eq!(dir.label("061"), "061 - Los Angeles CA");
        assert_eq!(dir.label("999"), "999");
        assert_eq!(dir.display_name("999"), None);
    }

    #[test]
    fn first_record_wins_for_a_shared_code() {
        let record = |name: &str| ZoneRecord {
            code: "061".to_string(),
            display_name: name.to_string(),
            state: None,
        };
        let dir = ZoneDirectory::new([record("Los Angeles CA"), record("Remainder of CA")]);
        assert_eq!(dir.len(), 1);
        assert_eq!(dir.label("061"), "061 - Los Angeles CA");
    }

    #[test]
    fn county_labels_include_state() {
        let record = ZoneRecord {
            code: "06037".to_string(),
            display_name: "Los Angeles County".to_string(),
            state: Some("CA".to_string()),
        };
        assert_eq!(record.label(), "06037 - Los Angeles County - CA");
        assert_eq!(code_from_label(&record.label()), "06037");
        assert_eq!(code_from_label("06037"), "06037");
    }
}
