//! US state FIPS lookups used to label county codes.
//!
//! A county FIPS code is the two-digit state code followed by a three-digit
//! county code, so the state of any county can be recovered from its first
//! two digits.

/// `(state FIPS, abbreviation)` for the 50 states, DC and Puerto Rico.
pub const STATES: &[(&str, &str)] = &[
    ("01", "AL"),
    ("02", "AK"),
    ("04", "AZ"),
    ("05", "AR"),
    ("06", "CA"),
    ("08", "CO"),
    ("09", "CT"),
    ("10", "DE"),
    ("11", "DC"),
    ("12", "FL"),
    ("13", "GA"),
    ("15", "HI"),
    ("16", "ID"),
    ("17", "IL"),
    ("18", "IN"),
    ("19", "IA"),
    ("20", "KS"),
    ("21", "KY"),
    ("22", "LA"),
    ("23", "ME"),
    ("24", "MD"),
    ("25", "MA"),
    ("26", "MI"),
    ("27", "MN"),
    ("28", "MS"),
    ("29", "MO"),
    ("30", "MT"),
    ("31", "NE"),
    ("32", "NV"),
    ("33", "NH"),
    ("34", "NJ"),
    ("35", "NM"),
    ("36", "NY"),
    ("37", "NC"),
    ("38", "ND"),
    ("39", "OH"),
    ("40", "OK"),
    ("41", "OR"),
    ("42", "PA"),
    ("44", "RI"),
    ("45", "SC"),
    ("46", "SD"),
    ("47", "TN"),
    ("48", "TX"),
    ("49", "UT"),
    ("50", "VT"),
    ("51", "VA"),
    ("53", "WA"),
    ("54", "WV"),
    ("55", "WI"),
    ("56", "WY"),
    ("72", "PR"),
];

/// Two-letter abbreviation for a two-digit state FIPS code.
#[must_use]
pub fn state_abbr(state_fips: &str) -> Option<&'static str> {
    STATES
        .iter()
        .find(|(fips, _)| *fips == state_fips)
        .map(|(_, abbr)| *abbr)
}

/// State abbreviation for a normalized five-digit county FIPS code.
#[must_use]
pub fn county_state_abbr(county_fips: &str) -> Option<&'static str> {
    if county_fips.len() != 5 {
        return None;
    }
    county_fips.get(..2).and_then(state_abbr)
}
