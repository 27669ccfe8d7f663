//! CSV flow table reader.

use std::collections::BTreeMap;
use std::io::Read;

use faf_flows_dataset::table::ColumnIndex;
use faf_flows_dataset_models::FlowColumns;
use faf_flows_flow_models::FlowRecord;
use faf_flows_zone_models::{CodeScheme, LonLat};

use crate::FlowError;

/// Predicted flows at or below this confidence are dropped.
pub const CONFIDENCE_THRESHOLD: f64 = 0.5;

struct Positions {
    origin: usize,
    dest: usize,
    magnitude: usize,
    confidence: Option<usize>,
    measures: Vec<(String, usize)>,
    centroids: Option<[usize; 4]>,
}

impl Positions {
    fn resolve(index: &ColumnIndex, columns: &FlowColumns, source_name: &str) -> Result<Self, FlowError> {
        let find = |name: &str| {
            index.position(name).ok_or_else(|| FlowError::MissingColumn {
                source_name: source_name.to_string(),
                column: name.to_string(),
            })
        };

        let measures = columns
            .measures
            .iter()
            .map(|m| find(&m.column).map(|idx| (m.column.clone(), idx)))
            .collect::<Result<Vec<_>, _>>()?;

        let centroids = match &columns.centroid_columns {
            Some(c) => Some([
                find(&c.origin_x)?,
                find(&c.origin_y)?,
                find(&c.dest_x)?,
                find(&c.dest_y)?,
            ]),
            None => None,
        };

        Ok(Self {
            origin: find(&columns.origin_column)?,
            dest: find(&columns.dest_column)?,
            magnitude: find(&columns.magnitude.column)?,
            confidence: columns.confidence_column.as_deref().map(find).transpose()?,
            measures,
            centroids,
        })
    }
}

/// Reads a flow table.
///
/// Centroids come from the configured centroid columns when the mapping has
/// them, otherwise from `boundary_centroids`. A code with no centroid is
/// left unresolved; that is not an error.
///
/// When a confidence column is configured, rows with a confidence at or
/// below [`CONFIDENCE_THRESHOLD`] (or blank), or a non-positive magnitude,
/// are dropped.
///
/// # Errors
///
/// Returns [`FlowError`] if a mapped column is missing, a code cannot be
/// normalized, a numeric cell is malformed, or an observed flow has a
/// negative magnitude.
pub fn load_flows<R: Read>(
    reader: R,
    columns: &FlowColumns,
    scheme: CodeScheme,
    boundary_centroids: Option<&BTreeMap<String, LonLat>>,
    source_name: &str,
) -> Result<Vec<FlowRecord>, FlowError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let index = ColumnIndex::new(csv_reader.headers()?.iter());
    let positions = Positions::resolve(&index, columns, source_name)?;

    let mut flows = Vec::new();
    let mut below_threshold = 0u64;
    let mut unresolved = 0u64;

    for row in csv_reader.records() {
        let row = row?;
        let line = row.position().map_or(0, csv::Position::line);
        let cell = |idx: usize| row.get(idx).unwrap_or_default().trim();

        let code = |idx: usize| {
            scheme
                .normalize(cell(idx))
                .map_err(|source| FlowError::InvalidCode {
                    source_name: source_name.to_string(),
                    line,
                    source,
                })
        };

        let number = |idx: usize, column: &str| -> Result<Option<f64>, FlowError> {
            let text = cell(idx);
            if text.is_empty() || text.eq_ignore_ascii_case("nan") {
                return Ok(None);
            }
            match text.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(Some(v)),
                _ => Err(FlowError::InvalidNumber {
                    source_name: source_name.to_string(),
                    line,
                    column: column.to_string(),
                    value: text.to_string(),
                }),
            }
        };

        let magnitude_column = &columns.magnitude.column;
        let magnitude = number(positions.magnitude, magnitude_column)?;

        let confidence = match (positions.confidence, &columns.confidence_column) {
            (Some(idx), Some(column)) => {
                let confidence = number(idx, column)?;
                let keep = confidence.is_some_and(|c| c > CONFIDENCE_THRESHOLD)
                    && magnitude.is_some_and(|m| m > 0.0);
                if !keep {
                    below_threshold += 1;
                    continue;
                }
                confidence
            }
            _ => None,
        };

        let magnitude = magnitude.ok_or_else(|| FlowError::InvalidNumber {
            source_name: source_name.to_string(),
            line,
            column: magnitude_column.clone(),
            value: String::new(),
        })?;
        if magnitude < 0.0 {
            return Err(FlowError::NegativeMagnitude {
                source_name: source_name.to_string(),
                line,
                value: magnitude,
            });
        }

        let origin_code = code(positions.origin)?;
        let dest_code = code(positions.dest)?;

        let mut measures = BTreeMap::new();
        for (column, idx) in &positions.measures {
            if let Some(value) = number(*idx, column)? {
                measures.insert(column.clone(), value);
            }
        }

        let (origin_centroid, dest_centroid) = match (positions.centroids, &columns.centroid_columns) {
            (Some([ox, oy, dx, dy]), Some(c)) => (
                point(number(ox, &c.origin_x)?, number(oy, &c.origin_y)?),
                point(number(dx, &c.dest_x)?, number(dy, &c.dest_y)?),
            ),
            _ => (
                boundary_centroids.and_then(|m| m.get(&origin_code).copied()),
                boundary_centroids.and_then(|m| m.get(&dest_code).copied()),
            ),
        };

        if origin_centroid.is_none() || dest_centroid.is_none() {
            unresolved += 1;
        }

        flows.push(FlowRecord {
            origin_code,
            dest_code,
            magnitude,
            confidence,
            origin_centroid,
            dest_centroid,
            measures,
        });
    }

    if below_threshold > 0 {
        log::debug!(
            "{source_name}: dropped {below_threshold} predicted flows at or below confidence {CONFIDENCE_THRESHOLD}"
        );
    }
    if unresolved > 0 {
        log::warn!("{source_name}: {unresolved} flows have an unresolved centroid");
    }
    log::info!("Loaded {} flows from {source_name}", flows.len());

    Ok(flows)
}

const fn point(x: Option<f64>, y: Option<f64>) -> Option<LonLat> {
    match (x, y) {
        (Some(lon), Some(lat)) => Some(LonLat::new(lon, lat)),
        _ => None,
    }
}
