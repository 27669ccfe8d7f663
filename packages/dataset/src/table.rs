//! Header lookup for exported tables.
//!
//! Spreadsheet exports are inconsistent about header whitespace and
//! casing (`" Numeric Label"`, `"FIPS"` vs `"fips"`), so columns are matched
//! after trimming and ignoring ASCII case.

/// Column positions of a table header row.
#[derive(Debug, Clone)]
pub struct ColumnIndex {
    headers: Vec<String>,
}

impl ColumnIndex {
    /// Builds an index from header cells.
    #[must_use]
    pub fn new<'a>(headers: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            headers: headers.into_iter().map(|h| h.trim().to_string()).collect(),
        }
    }

    /// Position of the column named `name`, if present.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.headers
            .iter()
            .position(|h| h == name)
            .or_else(|| self.headers.iter().position(|h| h.eq_ignore_ascii_case(name)))
    }
}
