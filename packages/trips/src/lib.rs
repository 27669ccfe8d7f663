#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Turns flow records into renderer-ready trip segments.

use faf_flows_flow_models::{FlowRecord, TripSegment};

/// Trip segments for a selection, plus how many records could not be drawn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapedTrips {
    /// One segment per record with both centroids resolved, in input order.
    pub segments: Vec<TripSegment>,
    /// Records skipped because a centroid was unresolved.
    pub unresolved: usize,
}

/// Shapes one [`TripSegment`] per record whose centroids are both resolved.
#[must_use]
pub fn shape_trips<'a>(records: impl IntoIterator<Item = &'a FlowRecord>) -> ShapedTrips {
    let mut shaped = ShapedTrips::default();
    for record in records {
        match record.endpoints() {
            Some((origin, dest)) => shaped.segments.push(TripSegment::new(
                &record.origin_code,
                &record.dest_code,
                origin,
                dest,
            )),
            None => shaped.unresolved += 1,
        }
    }

    if shaped.unresolved > 0 {
        log::debug!(
            "{} of {} flows have no centroid and were left off the map",
            shaped.unresolved,
            shaped.unresolved + shaped.segments.len()
        );
    }
    shaped
}
