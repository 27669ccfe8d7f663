//! Selection filters and top-N ranking.

use std::collections::BTreeSet;

use faf_flows_flow_models::{DestinationFilter, FlowRecord, MagnitudeField};

/// Records whose origin is exactly `origin_code`.
#[must_use]
pub fn filter_by_origin<'a>(
    records: impl IntoIterator<Item = &'a FlowRecord>,
    origin_code: &str,
) -> Vec<&'a FlowRecord> {
    records
        .into_iter()
        .filter(|r| r.origin_code == origin_code)
        .collect()
}

/// Records passing the destination filter. [`DestinationFilter::All`]
/// passes everything through.
#[must_use]
pub fn filter_by_destination<'a>(
    records: impl IntoIterator<Item = &'a FlowRecord>,
    destination: &DestinationFilter,
) -> Vec<&'a FlowRecord> {
    records
        .into_iter()
        .filter(|r| destination.matches(&r.dest_code))
        .collect()
}

/// The `n` records with the largest `field`, largest first.
///
/// Equal values keep their input order. Fewer than `n` records returns all
/// of them.
#[must_use]
pub fn top_n<'a>(
    records: impl IntoIterator<Item = &'a FlowRecord>,
    n: usize,
    field: &MagnitudeField,
) -> Vec<&'a FlowRecord> {
    let mut ranked: Vec<&FlowRecord> = records.into_iter().collect();
    // `sort_by` is stable.
    ranked.sort_by(|a, b| b.value_of(field).total_cmp(&a.value_of(field)));
    ranked.truncate(n);
    ranked
}

/// Sorted unique origin codes.
#[must_use]
pub fn origin_codes<'a>(records: impl IntoIterator<Item = &'a FlowRecord>) -> Vec<String> {
    records
        .into_iter()
        .map(|r| r.origin_code.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(ToString::to_string)
        .collect()
}

/// Sorted unique destination codes reached from `origin_code`.
#[must_use]
pub fn destination_codes<'a>(
    records: impl IntoIterator<Item = &'a FlowRecord>,
    origin_code: &str,
) -> Vec<String> {
    filter_by_origin(records, origin_code)
        .into_iter()
        .map(|r| r.dest_code.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

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
    fn filters_by_exact_origin() {
        let records = sample();
        let subset = filter_by_origin(&records, "001");
        assert_eq!(subset.len(), 2);
        assert!(subset.iter().all(|r| r.origin_code == "001"));
        assert!(filter_by_origin(&records, "01").is_empty(), "no partial matching");
    }

    #[test]
    fn all_destinations_is_a_pass_through() {
        let records = sample();
        for origin in ["001", "004", "999"] {
            let by_origin = filter_by_origin(&records, origin);
            let both = filter_by_destination(by_origin.iter().copied(), &DestinationFilter::All);
            assert_eq!(both, by_origin, "origin {origin}");
        }
    }

    #[test]
    fn filters_by_destination_zone() {
        let records = sample();
        let subset = filter_by_destination(&records, &DestinationFilter::Zone("002".to_string()));
        assert_eq!(subset.len(), 2);
        assert!(subset.iter().all(|r| r.dest_code == "002"));
    }

    #[test]
    fn top_n_is_bounded_and_a_subset() {
        let records = sample();
        for n in 0..5 {
            let top = top_n(&records, n, &MagnitudeField::Primary);
            assert_eq!(top.len(), n.min(records.len()));
            assert!(
                top.iter().all(|t| records.iter().any(|r| std::ptr::eq(*t, r))),
                "top_n must return references into the input"
            );
        }
    }

    #[test]
    fn top_n_on_short_input_returns_everything_ranked() {
        let records = sample();
        let top = top_n(&records, 5, &MagnitudeField::Primary);
        let magnitudes: Vec<f64> = top.iter().map(|r| r.magnitude).collect();
        assert_eq!(magnitudes, vec![30.0, 10.0, 5.0]);
        assert_eq!(records[0].magnitude, 10.0, "input must be untouched");
    }

    #[test]
    fn top_n_keeps_input_order_for_ties() {
        let records = vec![
            flow("001", "010", 7.0),
            flow("001", "011", 9.0),
            flow("001", "012", 7.0),
            flow("001", "013", 7.0),
        ];
        let top = top_n(&records, 3, &MagnitudeField::Primary);
        let dests: Vec<&str> = top.iter().map(|r| r.dest_code.as_str()).collect();
        assert_eq!(dests, vec!["011", "010", "012"]);
    }

    #[test]
    fn top_n_can_rank_by_a_measure() {
        let mut records = sample();
        records[2].measures.insert("value_2017".to_string(), 100.0);
        let top = top_n(&records, 1, &MagnitudeField::Measure("value_2017".to_string()));
        assert_eq!(top[0].origin_code, "004");
    }

    #[test]
    fn empty_input_is_total() {
        let records: Vec<FlowRecord> = Vec::new();
        assert!(filter_by_origin(&records, "001").is_empty());
        assert!(filter_by_destination(&records, &DestinationFilter::All).is_empty());
        assert!(top_n(&records, 60, &MagnitudeField::Primary).is_empty());
        assert!(origin_codes(&records).is_empty());
    }

    #[test]
    fn lists_sorted_unique_codes() {
        let mut records = sample();
        records.push(flow("001", "002", 1.0));
        assert_eq!(origin_codes(&records), vec!["001", "004"]);
        assert_eq!(destination_codes(&records, "001"), vec!["002", "003"]);
        assert!(destination_codes(&records, "999").is_empty());
    }
}
