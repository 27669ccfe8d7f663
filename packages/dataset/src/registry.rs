//! Compile-time registry of dataset definitions.
//!
//! Each entry is a `(name, toml_content)` pair embedded via `include_str!`.
//! Adding a dataset requires creating a TOML file in `datasets/` and adding
//! a corresponding entry here.

use faf_flows_dataset_models::DatasetDefinition;

use crate::{DatasetError, parse_definition};

/// Embedded TOML dataset definitions.
const DATASET_TOMLS: &[(&str, &str)] = &[
    ("faf_zones", include_str!("../datasets/faf_zones.toml")),
    ("gnn_counties", include_str!("../datasets/gnn_counties.toml")),
];

/// Id of the dataset used when none is requested.
pub const DEFAULT_DATASET: &str = "faf_zones";

/// Returns all registered datasets.
///
/// # Panics
///
/// Panics if any embedded TOML file fails to parse or validate. Since these
/// are compile-time constants, failures indicate a development error and
/// are caught by the tests below.
#[must_use]
pub fn all_datasets() -> Vec<DatasetDefinition> {
    DATASET_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            parse_definition(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse dataset '{name}': {e}"))
        })
        .collect()
}

/// Looks up a registered dataset by id.
///
/// # Errors
///
/// Returns [`DatasetError::UnknownDataset`] if no dataset has this id.
pub fn find_dataset(id: &str) -> Result<DatasetDefinition, DatasetError> {
    all_datasets()
        .into_iter()
        .find(|d| d.id == id)
        .ok_or_else(|| DatasetError::UnknownDataset(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use faf_flows_zone_models::CodeScheme;
    use std::collections::BTreeSet;

    #[test]
    fn loads_all_datasets() {
        let datasets = all_datasets();
        assert_eq!(datasets.len(), DATASET_TOMLS.len());
        for (dataset, (name, _)) in datasets.iter().zip(DATASET_TOMLS) {
            assert_eq!(&dataset.id, name, "registry key and dataset id differ");
        }
    }

    #[test]
    fn dataset_ids_are_unique() {
        let mut seen = BTreeSet::new();
        for dataset in all_datasets() {
            assert!(seen.insert(dataset.id.clone()), "Duplicate dataset ID: {}", dataset.id);
        }
    }

    #[test]
    fn default_dataset_is_registered() {
        assert!(find_dataset(DEFAULT_DATASET).is_ok());
        assert!(matches!(
            find_dataset("nope"),
            Err(DatasetError::UnknownDataset(_))
        ));
    }

    #[test]
    fn county_dataset_is_a_prediction_table() {
        let gnn = find_dataset("gnn_counties").unwrap();
        assert_eq!(gnn.scheme, CodeScheme::CountyFips);
        assert_eq!(gnn.flows.confidence_column.as_deref(), Some("exist_prob"));
        assert_eq!(gnn.top_n_choices, vec![25, 60, 100, 200]);
        assert_eq!(gnn.default_top_n, Some(60));
        assert_eq!(gnn.default_origin.as_deref(), Some("06037"));
        assert_eq!(gnn.categories.len(), 7);
    }

    #[test]
    fn faf_dataset_has_secondary_measures() {
        let faf = find_dataset("faf_zones").unwrap();
        assert_eq!(faf.scheme, CodeScheme::FafZone);
        assert!(faf.flows.confidence_column.is_none());
        let columns: Vec<_> = faf.flows.measures.iter().map(|m| m.column.as_str()).collect();
        assert_eq!(columns, ["value_2017", "tmiles_2017"]);

        let centroids = faf
            .flows
            .centroid_columns
            .as_ref()
            .expect("FAF flow files carry their own centroids");
        assert_eq!(centroids.origin_x, "centroid_x_orig");
        assert_eq!(centroids.dest_y, "centroid_y_dest");
    }
}
