#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dataset registry and data source access.
//!
//! Dataset definitions are TOML files embedded at compile time (see
//! [`registry`]) or read from disk with [`load_definition`]. The files a
//! definition points at are opened through the [`source::DataSource`]
//! trait so the pipeline can run against a directory or in-memory tables.

pub mod registry;
pub mod source;
pub mod table;

use std::collections::BTreeSet;
use std::path::Path;

pub use faf_flows_dataset_models::DatasetDefinition;
use thiserror::Error;

/// Errors that can occur while resolving datasets and their sources.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// A source file could not be opened or read.
    #[error("Failed to read '{path}': {source}")]
    Io {
        /// Path relative to the data source root.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A source path is not present in the data source.
    #[error("Source '{path}' not found")]
    NotFound {
        /// Path relative to the data source root.
        path: String,
    },

    /// TOML parsing failed.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// No registered dataset has the requested id.
    #[error("Unknown dataset '{0}'")]
    UnknownDataset(String),

    /// The definition parsed but is internally inconsistent.
    #[error("Invalid dataset '{id}': {message}")]
    Invalid {
        /// Dataset id.
        id: String,
        /// Description of what went wrong.
        message: String,
    },
}

/// Reads and validates a dataset definition from a TOML file.
///
/// # Errors
///
/// Returns [`DatasetError`] if the file cannot be read, is not valid TOML,
/// or fails [`validate`].
pub fn load_definition(path: &Path) -> Result<DatasetDefinition, DatasetError> {
    let content = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_definition(&content)
}

/// Picks the dataset to run against: a TOML file when `config` is given,
/// otherwise the registered dataset `id` (or [`registry::DEFAULT_DATASET`]).
///
/// # Errors
///
/// Returns [`DatasetError`] if the file cannot be loaded or no registered
/// dataset has the id.
pub fn resolve_definition(
    config: Option<&Path>,
    id: Option<&str>,
) -> Result<DatasetDefinition, DatasetError> {
    match config {
        Some(path) => {
            log::info!("Loading dataset definition from {}", path.display());
            load_definition(path)
        }
        None => registry::find_dataset(id.unwrap_or(registry::DEFAULT_DATASET)),
    }
}

/// Parses and validates a dataset definition from TOML text.
///
/// # Errors
///
/// Returns [`DatasetError`] if the text is not valid TOML or fails
/// [`validate`].
pub fn parse_definition(toml_str: &str) -> Result<DatasetDefinition, DatasetError> {
    let mut definition: DatasetDefinition = toml::de::from_str(toml_str)?;
    validate(&mut definition)?;
    Ok(definition)
}

/// Checks a definition for consistency and normalizes its default origin.
///
/// # Errors
///
/// Returns [`DatasetError::Invalid`] if there are no categories, category
/// ids repeat, the default top-N is not one of the choices, the simplify
/// tolerance is negative, or the default origin is not a valid code.
pub fn validate(definition: &mut DatasetDefinition) -> Result<(), DatasetError> {
    let invalid = |message: String| DatasetError::Invalid {
        id: definition.id.clone(),
        message,
    };

    if definition.categories.is_empty() {
        return Err(invalid("no categories defined".to_string()));
    }

    let mut seen = BTreeSet::new();
    for category in &definition.categories {
        if !seen.insert(category.id.as_str()) {
            return Err(invalid(format!("duplicate category id '{}'", category.id)));
        }
    }

    if let Some(default_top_n) = definition.default_top_n {
        let choices = &definition.top_n_choices;
        if !choices.is_empty() && !choices.contains(&default_top_n) {
            return Err(invalid(format!(
                "default_top_n {default_top_n} is not one of {choices:?}"
            )));
        }
    }

    if definition.boundaries.simplify_tolerance < 0.0 {
        return Err(invalid("simplify_tolerance must not be negative".to_string()));
    }

    if let Some(origin) = &definition.default_origin {
        let normalized = definition
            .scheme
            .normalize(origin)
            .map_err(|e| invalid(format!("default_origin: {e}")))?;
        definition.default_origin = Some(normalized);
    }

    Ok(())
}
