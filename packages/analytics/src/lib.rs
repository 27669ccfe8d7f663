#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filtering, ranking and aggregation over loaded flow records.
//!
//! Every operation borrows its input and returns a new collection of
//! references or plain totals, so the loaded flow set is never mutated and
//! can be shared across selections. Empty input is always valid and yields
//! an empty (or zero) result.

pub mod filter;
pub mod summary;

pub use filter::{destination_codes, filter_by_destination, filter_by_origin, origin_codes, top_n};
pub use summary::{summarize, top_destinations};
