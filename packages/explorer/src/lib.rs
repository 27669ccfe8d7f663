#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! The selection pipeline over one dataset.
//!
//! An [`Explorer`] owns a dataset definition and the source its files are
//! read from. Zone metadata, boundaries and per-category flow tables are
//! loaded lazily and memoized; each [`Selection`] then runs origin filter,
//! destination filter, summary, top-N ranking and trip shaping against the
//! cached data.

pub mod cache;

pub use faf_flows_dataset_models::CategoryRef;

use std::collections::BTreeMap;
use std::sync::Arc;

use faf_flows_analytics::{
    destination_codes, filter_by_destination, filter_by_origin, origin_codes, summarize,
    top_destinations, top_n,
};
use faf_flows_analytics_models::{FlowSummary, LabelledDestination};
use faf_flows_dataset::DatasetError;
use faf_flows_dataset::source::DataSource;
use faf_flows_dataset_models::{CategoryConfig, DatasetDefinition};
use faf_flows_flow::FlowError;
use faf_flows_flow_models::{
    ALL_DESTINATIONS, DestinationFilter, FlowRecord, LayerKind, MagnitudeField, TripSegment,
};
use faf_flows_trips::shape_trips;
use faf_flows_zone::{BoundaryOptions, BoundarySet, SourceCrs, ZoneError};
use faf_flows_zone_models::{CodeError, LonLat, ZoneDirectory, ZoneOption, code_from_label};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cache::MemoCache;

/// Errors that can occur while answering a selection.
#[derive(Debug, Error)]
pub enum ExplorerError {
    /// A dataset file could not be opened.
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// Zone metadata or boundaries failed to load.
    #[error(transparent)]
    Zone(#[from] ZoneError),

    /// A flow table failed to load.
    #[error(transparent)]
    Flow(#[from] FlowError),

    /// The dataset has no category with this id or name.
    #[error("Unknown category '{0}'")]
    UnknownCategory(String),

    /// A selected zone is not a valid code.
    #[error("Invalid zone '{value}': {source}")]
    InvalidZone {
        /// The value as given.
        value: String,
        /// Underlying normalization error.
        source: CodeError,
    },

    /// The requested top-N is not on the dataset's menu.
    #[error("Top-N {requested} is not one of {choices:?}")]
    InvalidTopN {
        /// Requested link count.
        requested: usize,
        /// Allowed link counts.
        choices: Vec<usize>,
    },
}

/// What the user picked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Category id or name.
    pub category: String,
    /// Origin code or selector label. `None` picks the dataset default
    /// (or the first origin).
    pub origin: Option<String>,
    /// Destination narrowing.
    pub destination: DestinationFilter,
    /// Number of links to draw. `None` uses the dataset default; when the
    /// dataset has no default every flow is drawn.
    pub top_n: Option<usize>,
    /// Size of the top-destinations table. `None` uses the dataset default.
    pub top_destinations: Option<usize>,
    /// How the renderer draws the trips.
    pub layer: LayerKind,
}

/// Everything the display layer needs for one selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionView {
    /// Dataset id.
    pub dataset: String,
    /// Selected category.
    pub category: CategoryRef,
    /// Selected origin. `None` when the category has no flows at all.
    pub origin: Option<ZoneOption>,
    /// Selected destination code, or `"All"`.
    pub destination: String,
    /// Totals over every flow matching the origin and destination.
    pub summary: FlowSummary,
    /// Largest destinations by primary magnitude.
    pub top_destinations: Vec<LabelledDestination>,
    /// Link count the trips were limited to.
    pub top_n: Option<usize>,
    /// Segments to draw.
    pub trips: Vec<TripSegment>,
    /// Flows among the drawn ones that have no centroid and are missing
    /// from `trips`.
    pub unresolved: usize,
    /// Requested layer kind.
    pub layer: LayerKind,
}

/// Lazy, memoizing access to one dataset.
pub struct Explorer {
    dataset: DatasetDefinition,
    source: Arc<dyn DataSource>,
    zones: MemoCache<String, ZoneDirectory>,
    boundaries: MemoCache<String, BoundarySet>,
    flows: MemoCache<String, Vec<FlowRecord>>,
}

impl std::fmt::Debug for Explorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Explorer")
            .field("dataset", &self.dataset.id)
            .field("zones", &self.zones.len())
            .field("boundaries", &self.boundaries.len())
            .field("flows", &self.flows.len())
            .finish_non_exhaustive()
    }
}

impl Explorer {
    /// Creates an explorer. Nothing is read until first use.
    #[must_use]
    pub fn new(dataset: DatasetDefinition, source: Arc<dyn DataSource>) -> Self {
        Self {
            dataset,
            source,
            zones: MemoCache::new(),
            boundaries: MemoCache::new(),
            flows: MemoCache::new(),
        }
    }

    /// The dataset definition.
    #[must_use]
    pub const fn dataset(&self) -> &DatasetDefinition {
        &self.dataset
    }

    /// Looks up a category by id or name.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::UnknownCategory`] if there is no match.
    pub fn category(&self, key: &str) -> Result<&CategoryConfig, ExplorerError> {
        self.dataset
            .category(key)
            .ok_or_else(|| ExplorerError::UnknownCategory(key.to_string()))
    }

    /// The zone metadata directory.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError`] if the metadata table cannot be loaded.
    pub fn zone_directory(&self) -> Result<Arc<ZoneDirectory>, ExplorerError> {
        let config = &self.dataset.zones;
        let identity = self.source.identity(&config.path);

        self.zones.get_or_try_load(&identity, || {
            let reader = self.source.open(&config.path)?;
            Ok(faf_flows_zone::load_zone_metadata(
                reader,
                config,
                self.dataset.scheme,
                &identity,
            )?)
        })
    }

    /// The boundary polygons, joined, reprojected and simplified.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError`] if the metadata or boundary source cannot
    /// be loaded.
    pub fn boundaries(&self) -> Result<Arc<BoundarySet>, ExplorerError> {
        let config = &self.dataset.boundaries;
        let identity = self.source.identity(&config.path);
        let key = format!(
            "{identity}|{}|{}|{}",
            config.code_property,
            config.crs.as_deref().unwrap_or("auto"),
            config.simplify_tolerance
        );

        self.boundaries.get_or_try_load(&key, || {
            let zones = self.zone_directory()?;
            let crs = config
                .crs
                .as_deref()
                .map(str::parse::<SourceCrs>)
                .transpose()?;
            let text = self.source.read_to_string(&config.path)?;

            let options = BoundaryOptions {
                source_name: &identity,
                code_property: &config.code_property,
                scheme: self.dataset.scheme,
                crs,
                simplify_tolerance: config.simplify_tolerance,
            };
            Ok(faf_flows_zone::load_boundaries(&text, &options, &zones)?)
        })
    }

    /// All flow records of a category.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError`] if the category is unknown or its table
    /// (or the boundaries it joins against) cannot be loaded.
    pub fn flows(&self, category: &str) -> Result<Arc<Vec<FlowRecord>>, ExplorerError> {
        let category = self.category(category)?;
        let columns = &self.dataset.flows;
        let identity = self.source.identity(&category.path);

        self.flows.get_or_try_load(&identity, || {
            let boundaries = match columns.centroid_columns {
                Some(_) => None,
                None => Some(self.boundaries()?),
            };
            let centroids: Option<&BTreeMap<String, LonLat>> =
                boundaries.as_deref().map(BoundarySet::centroids);

            let reader = self.source.open(&category.path)?;
            Ok(faf_flows_flow::load_flows(
                reader,
                columns,
                self.dataset.scheme,
                centroids,
                &identity,
            )?)
        })
    }

    /// Drops a category's cached flows so the next access reloads them.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::UnknownCategory`] if there is no match.
    pub fn invalidate_category(&self, category: &str) -> Result<bool, ExplorerError> {
        let category = self.category(category)?;
        Ok(self.flows.invalidate(&self.source.identity(&category.path)))
    }

    /// Sorted origin options for a category.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError`] if the category's data cannot be loaded.
    pub fn origin_options(&self, category: &str) -> Result<Vec<ZoneOption>, ExplorerError> {
        let flows = self.flows(category)?;
        let zones = self.zone_directory()?;
        let codes = origin_codes(flows.iter());
        Ok(zones.options(codes.iter().map(String::as_str)))
    }

    /// Destination options for an origin, led by the `All` sentinel.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError`] if the origin is not a valid code or the
    /// category's data cannot be loaded.
    pub fn destination_options(
        &self,
        category: &str,
        origin: &str,
    ) -> Result<Vec<ZoneOption>, ExplorerError> {
        let origin = self.normalize_zone(origin)?;
        let flows = self.flows(category)?;
        let zones = self.zone_directory()?;
        let codes = destination_codes(flows.iter(), &origin);

        let mut options = vec![ZoneOption {
            code: ALL_DESTINATIONS.to_string(),
            label: ALL_DESTINATIONS.to_string(),
        }];
        options.extend(zones.options(codes.iter().map(String::as_str)));
        Ok(options)
    }

    /// Runs a selection.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError`] if the category is unknown, a zone is not
    /// a valid code, the top-N is off the menu, or data cannot be loaded.
    /// A selection that matches nothing is not an error.
    pub fn select(&self, selection: &Selection) -> Result<SelectionView, ExplorerError> {
        let category = self.category(&selection.category)?;
        let top_n_limit = self.resolve_top_n(selection.top_n)?;
        let destination = match &selection.destination {
            DestinationFilter::All => DestinationFilter::All,
            DestinationFilter::Zone(code) => DestinationFilter::Zone(self.normalize_zone(code)?),
        };

        let flows = self.flows(&category.id)?;
        let zones = self.zone_directory()?;

        let origin = match &selection.origin {
            Some(origin) => Some(self.normalize_zone(origin)?),
            None => self.default_origin(&flows),
        };

        let Some(origin) = origin else {
            log::info!("Category {} has no flows", category.id);
            return Ok(SelectionView {
                dataset: self.dataset.id.clone(),
                category: category.into(),
                origin: None,
                destination: destination.to_string(),
                summary: FlowSummary::default(),
                top_destinations: Vec::new(),
                top_n: top_n_limit,
                trips: Vec::new(),
                unresolved: 0,
                layer: selection.layer,
            });
        };

        let by_origin = filter_by_origin(flows.iter(), &origin);
        let selected = filter_by_destination(by_origin, &destination);

        let summary = summarize(selected.iter().copied());
        let k = selection
            .top_destinations
            .unwrap_or(self.dataset.top_destinations);
        let top_destinations = top_destinations(selected.iter().copied(), k, &MagnitudeField::Primary)
            .into_iter()
            .map(|d| LabelledDestination {
                label: zones.label(&d.dest_code),
                dest_code: d.dest_code,
                total: d.total,
            })
            .collect();

        let drawn = match top_n_limit {
            Some(n) => top_n(selected.iter().copied(), n, &MagnitudeField::Primary),
            None => selected,
        };
        let shaped = shape_trips(drawn);

        log::debug!(
            "Selection {}/{origin}/{destination}: {} flows, {} trips",
            category.id,
            summary.count,
            shaped.segments.len()
        );

        Ok(SelectionView {
            dataset: self.dataset.id.clone(),
            category: category.into(),
            origin: Some(ZoneOption {
                label: zones.label(&origin),
                code: origin,
            }),
            destination: destination.to_string(),
            summary,
            top_destinations,
            top_n: top_n_limit,
            trips: shaped.segments,
            unresolved: shaped.unresolved,
            layer: selection.layer,
        })
    }

    fn normalize_zone(&self, value: &str) -> Result<String, ExplorerError> {
        self.dataset
            .scheme
            .normalize(code_from_label(value))
            .map_err(|source| ExplorerError::InvalidZone {
                value: value.to_string(),
                source,
            })
    }

    fn resolve_top_n(&self, requested: Option<usize>) -> Result<Option<usize>, ExplorerError> {
        let choices = &self.dataset.top_n_choices;
        match requested {
            None => Ok(self.dataset.default_top_n),
            Some(n) if choices.is_empty() || choices.contains(&n) => Ok(Some(n)),
            Some(n) => Err(ExplorerError::InvalidTopN {
                requested: n,
                choices: choices.clone(),
            }),
        }
    }

    /// The dataset's default origin when it has flows, else the first
    /// origin in code order.
    fn default_origin(&self, flows: &[FlowRecord]) -> Option<String> {
        let origins = origin_codes(flows.iter());
        self.dataset
            .default_origin
            .as_ref()
            .filter(|code| origins.contains(code))
            .cloned()
            .or_else(|| origins.into_iter().next())
    }
}
