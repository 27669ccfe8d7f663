//! Zone metadata tables: code → display name (and state, for counties).

use std::collections::BTreeSet;
use std::io::Read;

use faf_flows_dataset::table::ColumnIndex;
use faf_flows_dataset_models::ZoneSourceConfig;
use faf_flows_zone_models::{CodeError, CodeScheme, ZoneDirectory, ZoneRecord, fips};

use crate::ZoneError;

/// Reads a zone metadata table into a [`ZoneDirectory`].
///
/// Rows with a blank code (spreadsheet notes, totals) are skipped. When
/// several rows normalize to the same code the first row is kept. For
/// county schemes without a state column, or with a blank state cell, the
/// state abbreviation is derived from the FIPS prefix.
///
/// # Errors
///
/// Returns [`ZoneError::MissingColumn`] if the code or name column (or a
/// configured state column) is absent, [`ZoneError::InvalidCode`] if a
/// non-blank code cannot be normalized, or [`ZoneError::Csv`] if the table
/// is malformed.
pub fn load_zone_metadata<R: Read>(
    reader: R,
    config: &ZoneSourceConfig,
    scheme: CodeScheme,
    source_name: &str,
) -> Result<ZoneDirectory, ZoneError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let index = ColumnIndex::new(csv_reader.headers()?.iter());
    let column = |name: &str| {
        index.position(name).ok_or_else(|| ZoneError::MissingColumn {
            source_name: source_name.to_string(),
            column: name.to_string(),
        })
    };

    let code_idx = column(&config.code_column)?;
    let name_idx = column(&config.name_column)?;
    let state_idx = config.state_column.as_deref().map(column).transpose()?;

    let mut records = Vec::new();
    let mut seen = BTreeSet::new();
    let mut skipped = 0u64;

    for row in csv_reader.records() {
        let row = row?;
        let raw_code = row.get(code_idx).unwrap_or_default();

        let code = match scheme.normalize(raw_code) {
            Ok(code) => code,
            Err(CodeError::Empty) => {
                skipped += 1;
                continue;
            }
            Err(source) => {
                return Err(ZoneError::InvalidCode {
                    source_name: source_name.to_string(),
                    location: format!("line {}", row.position().map_or(0, csv::Position::line)),
                    source,
                });
            }
        };

        if !seen.insert(code.clone()) {
            log::warn!("{source_name}: duplicate row for zone {code}, keeping the first");
            continue;
        }

        let display_name = row.get(name_idx).unwrap_or_default().trim().to_string();

        let state = state_idx
            .and_then(|idx| row.get(idx))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .or_else(|| match scheme {
                CodeScheme::CountyFips => fips::county_state_abbr(&code).map(ToString::to_string),
                CodeScheme::FafZone => None,
            });

        records.push(ZoneRecord {
            code,
            display_name,
            state,
        });
    }

    if skipped > 0 {
        log::debug!("{source_name}: skipped {skipped} rows without a zone code");
    }

    let directory = ZoneDirectory::new(records);
    log::info!("Loaded {} zones from {source_name}", directory.len());
    Ok(directory)
}
