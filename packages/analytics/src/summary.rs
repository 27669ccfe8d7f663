//! Totals and destination rankings for display.

use std::collections::BTreeMap;

use faf_flows_analytics_models::{DestinationTotal, FlowSummary};
use faf_flows_flow_models::{FlowRecord, MagnitudeField};

/// Count, primary total and per-measure totals.
#[must_use]
pub fn summarize<'a>(records: impl IntoIterator<Item = &'a FlowRecord>) -> FlowSummary {
    records
        .into_iter()
        .fold(FlowSummary::default(), |mut summary, record| {
            summary.count += 1;
            summary.total_magnitude += record.magnitude;
            for (column, value) in &record.measures {
                *summary.measure_totals.entry(column.clone()).or_insert(0.0) += value;
            }
            summary
        })
}

/// The `k` destinations receiving the most `field`, largest first.
///
/// Destinations with equal totals are ordered by code ascending.
#[must_use]
pub fn top_destinations<'a>(
    records: impl IntoIterator<Item = &'a FlowRecord>,
    k: usize,
    field: &MagnitudeField,
) -> Vec<DestinationTotal> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for record in records {
        *totals.entry(record.dest_code.as_str()).or_insert(0.0) += record.value_of(field);
    }

    // BTreeMap iteration is code-ascending and `sort_by` is stable, so ties
    // stay in code order.
    let mut ranked: Vec<DestinationTotal> = totals
        .into_iter()
        .map(|(dest_code, total)| DestinationTotal {
            dest_code: dest_code.to_string(),
            total,
        })
        .collect();
    ranked.sort_by(|a, b| b.total.total_cmp(&a.total));
    ranked.truncate(k);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter_by_origin;

    fn flow(origin: &str, dest: &str, magnitude: f64) -> FlowRecord {
        FlowRecord {
            origin_code: origin.to_string(),
            dest_code: dest.to_string(),
            magnitude,
            confidence: None,
            origin_centroid: None,
            dest_centroid: None,
            measures: BTreeMap::new(),
        }
    }

    fn sample() -> Vec<FlowRecord> {
        vec![
            flow("001", "002", 10.0),
            flow("001", "003", 30.0),
            flow("004", "002", 5.0),
        ]
    }

    #[test]
    fn empty_summary_is_zero() {
        let records: Vec<FlowRecord> = Vec::new();
        let summary = summarize(&records);
        assert_eq!(summary.count, 0);
        assert!(summary.total_magnitude.abs() < f64::EPSILON);
        assert!(summary.measure_totals.is_empty());
        assert!(top_destinations(&records, 5, &MagnitudeField::Primary).is_empty());
    }

    #[test]
    fn origin_scenario() {
        let records = sample();
        let subset = filter_by_origin(&records, "001");
        assert_eq!(subset.len(), 2);

        let summary = summarize(subset.iter().copied());
        assert_eq!(summary.count, 2);
        assert!((summary.total_magnitude - 40.0).abs() < f64::EPSILON);

        let top = top_destinations(subset.iter().copied(), 1, &MagnitudeField::Primary);
        assert_eq!(
            top,
            vec![DestinationTotal {
                dest_code: "003".to_string(),
                total: 30.0,
            }]
        );
    }

    #[test]
    fn sums_secondary_measures() {
        let mut records = sample();
        records[0].measures.insert("value_2017".to_string(), 2.5);
        records[1].measures.insert("value_2017".to_string(), 4.0);
        records[1].measures.insert("tmiles_2017".to_string(), 7.0);

        let summary = summarize(&records);
        assert!((summary.measure_total("value_2017") - 6.5).abs() < f64::EPSILON);
        assert!((summary.measure_total("tmiles_2017") - 7.0).abs() < f64::EPSILON);
        assert!(summary.measure_total("missing").abs() < f64::EPSILON);
    }

    #[test]
    fn groups_and_ranks_destinations() {
        let records = vec![
            flow("001", "005", 1.0),
            flow("001", "002", 4.0),
            flow("001", "005", 6.0),
            flow("001", "003", 2.0),
            flow("001", "004", 3.0),
        ];
        let top = top_destinations(&records, 10, &MagnitudeField::Primary);
        let codes: Vec<&str> = top.iter().map(|d| d.dest_code.as_str()).collect();
        assert_eq!(codes, vec!["005", "002", "004", "003"]);

        assert!(
            top.windows(2).all(|w| w[0].total >= w[1].total),
            "totals must be non-increasing"
        );
        let returned: f64 = top.iter().take(2).map(|d| d.total).sum();
        assert!(returned <= summarize(&records).total_magnitude);
    }

    #[test]
    fn ties_break_by_code_ascending() {
        let records = vec![
            flow("001", "009", 5.0),
            flow("001", "003", 5.0),
            flow("001", "007", 5.0),
            flow("001", "001", 1.0),
        ];
        let top = top_destinations(&records, 2, &MagnitudeField::Primary);
        let codes: Vec<&str> = top.iter().map(|d| d.dest_code.as_str()).collect();
        assert_eq!(codes, vec!["003", "007"]);
    }
}
