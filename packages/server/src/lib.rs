#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for freight flow exploration.
//!
//! Serves the dataset description, zone boundaries, selector options and
//! per-selection flow views as JSON. All reference data is loaded lazily
//! through a shared [`Explorer`] and memoized for the life of the process.

mod handlers;

use std::path::PathBuf;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use faf_flows_dataset::DatasetError;
use faf_flows_dataset::source::FsDataSource;
use faf_flows_explorer::Explorer;

/// Default data directory, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Shared application state.
pub struct AppState {
    /// The selection pipeline over the served dataset.
    pub explorer: Arc<Explorer>,
}

/// Runtime settings, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Registered dataset id (`FAF_FLOWS_DATASET`).
    pub dataset: Option<String>,
    /// Dataset definition file (`FAF_FLOWS_CONFIG`); wins over `dataset`.
    pub config: Option<PathBuf>,
    /// Directory the dataset's files are read from (`FAF_FLOWS_DATA_DIR`).
    pub data_dir: PathBuf,
    /// Bind address (`BIND_ADDR`).
    pub bind_addr: String,
    /// Port (`PORT`).
    pub port: u16,
}

impl ServerConfig {
    /// Reads the configuration from process environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, falling back to defaults
    /// for unset or unparsable values.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            dataset: lookup("FAF_FLOWS_DATASET"),
            config: lookup("FAF_FLOWS_CONFIG").map(PathBuf::from),
            data_dir: lookup("FAF_FLOWS_DATA_DIR")
                .map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from),
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: lookup("PORT").and_then(|p| p.parse().ok()).unwrap_or(8080),
        }
    }

    /// Builds the explorer this configuration describes.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if the dataset cannot be resolved.
    pub fn explorer(&self) -> Result<Explorer, DatasetError> {
        let dataset =
            faf_flows_dataset::resolve_definition(self.config.as_deref(), self.dataset.as_deref())?;
        log::info!(
            "Serving dataset '{}' from {}",
            dataset.id,
            self.data_dir.display()
        );
        Ok(Explorer::new(
            dataset,
            Arc::new(FsDataSource::new(&self.data_dir)),
        ))
    }
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(web::QueryConfig::default().error_handler(handlers::query_error))
            .route("/health", web::get().to(handlers::health))
            .route("/dataset", web::get().to(handlers::dataset))
            .route("/boundaries", web::get().to(handlers::boundaries))
            .route(
                "/categories/{category}/origins",
                web::get().to(handlers::origins),
            )
            .route(
                "/categories/{category}/origins/{origin}/destinations",
                web::get().to(handlers::destinations),
            )
            .route("/flows", web::get().to(handlers::flows)),
    );
}

/// Starts the flow API server.
///
/// Reads [`ServerConfig`] from the environment, resolves the dataset and
/// starts the Actix-Web HTTP server. Data files are not read until the
/// first request that needs them. The caller provides the async runtime
/// (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the dataset cannot be resolved,
/// or the HTTP server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = ServerConfig::from_env();
    let explorer = config
        .explorer()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    let state = web::Data::new(AppState {
        explorer: Arc::new(explorer),
    });

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn config_defaults() {
        let config = ServerConfig::from_lookup(|_| None);
        assert_eq!(config.dataset, None);
        assert_eq!(config.config, None);
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.bind_addr, "127.0.0.1");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn config_reads_environment_keys() {
        let env = BTreeMap::from([
            ("FAF_FLOWS_DATASET", "gnn_counties"),
            ("FAF_FLOWS_DATA_DIR", "/srv/faf"),
            ("BIND_ADDR", "0.0.0.0"),
            ("PORT", "not-a-port"),
        ]);
        let config = ServerConfig::from_lookup(|key| env.get(key).map(ToString::to_string));
        assert_eq!(config.dataset.as_deref(), Some("gnn_counties"));
        assert_eq!(config.data_dir, PathBuf::from("/srv/faf"));
        assert_eq!(config.bind_addr, "0.0.0.0");
        assert_eq!(config.port, 8080, "unparsable port falls back");

        let explorer = config.explorer().unwrap();
        assert_eq!(explorer.dataset().id, "gnn_counties");
    }
}
