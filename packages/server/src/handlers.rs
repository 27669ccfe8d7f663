//! HTTP handler functions for the flow API.
//!
//! Loading and selection work runs on the blocking pool via `web::block`;
//! the first request for a category parses its whole flow table.

use std::sync::Arc;

use actix_web::error::{InternalError, QueryPayloadError};
use actix_web::{HttpRequest, HttpResponse, web};
use faf_flows_explorer::{Explorer, ExplorerError, Selection};
use faf_flows_flow_models::{DestinationFilter, LayerKind};
use faf_flows_server_models::{ApiDataset, ApiError, ApiHealth, FlowQueryParams};
use serde::Serialize;

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/dataset`
///
/// Returns the dataset description the selectors are built from.
pub async fn dataset(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiDataset::from(state.explorer.dataset()))
}

/// `GET /api/boundaries`
///
/// Returns the simplified zone boundaries as a `GeoJSON` `FeatureCollection`.
pub async fn boundaries(state: web::Data<AppState>) -> HttpResponse {
    let explorer = Arc::clone(&state.explorer);
    let result = web::block(move || -> Result<String, ExplorerError> {
        Ok(explorer.boundaries()?.to_geojson_string()?)
    })
    .await;

    match result {
        Ok(Ok(body)) => HttpResponse::Ok()
            .content_type("application/geo+json")
            .body(body),
        Ok(Err(e)) => explorer_error(&e, "load boundaries"),
        Err(e) => blocking_error(&e, "load boundaries"),
    }
}

/// `GET /api/categories/{category}/origins`
///
/// Lists the origins present in a category, labelled.
pub async fn origins(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let category = path.into_inner();
    run(&state, "list origins", move |explorer| {
        explorer.origin_options(&category)
    })
    .await
}

/// `GET /api/categories/{category}/origins/{origin}/destinations`
///
/// Lists the destinations reached from an origin, led by `All`.
pub async fn destinations(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> HttpResponse {
    let (category, origin) = path.into_inner();
    run(&state, "list destinations", move |explorer| {
        explorer.destination_options(&category, &origin)
    })
    .await
}

/// `GET /api/flows`
///
/// Runs a selection and returns its summary, top destinations and trips.
pub async fn flows(
    state: web::Data<AppState>,
    params: web::Query<FlowQueryParams>,
) -> HttpResponse {
    let params = params.into_inner();

    let layer = match params.layer.as_deref().map(str::parse::<LayerKind>).transpose() {
        Ok(layer) => layer.unwrap_or_default(),
        Err(_) => {
            return bad_request(format!(
                "Unknown layer '{}', expected 'trips' or 'arc'",
                params.layer.unwrap_or_default()
            ));
        }
    };

    let destination = params
        .dest
        .as_deref()
        .map(|d| d.parse::<DestinationFilter>().unwrap_or_default())
        .unwrap_or_default();

    let selection = Selection {
        category: params.category,
        origin: params.origin,
        destination,
        top_n: params.top,
        top_destinations: params.top_destinations,
        layer,
    };

    run(&state, "select flows", move |explorer| {
        explorer.select(&selection)
    })
    .await
}

/// Runs `work` on the blocking pool and serializes its result.
async fn run<T, F>(state: &web::Data<AppState>, what: &'static str, work: F) -> HttpResponse
where
    T: Serialize + Send + 'static,
    F: FnOnce(&Explorer) -> Result<T, ExplorerError> + Send + 'static,
{
    let explorer = Arc::clone(&state.explorer);
    match web::block(move || work(&explorer)).await {
        Ok(Ok(value)) => HttpResponse::Ok().json(value),
        Ok(Err(e)) => explorer_error(&e, what),
        Err(e) => blocking_error(&e, what),
    }
}

fn explorer_error(e: &ExplorerError, what: &str) -> HttpResponse {
    let body = ApiError {
        error: e.to_string(),
    };
    match e {
        ExplorerError::UnknownCategory(_) => HttpResponse::NotFound().json(body),
        ExplorerError::InvalidZone { .. } | ExplorerError::InvalidTopN { .. } => {
            HttpResponse::BadRequest().json(body)
        }
        ExplorerError::Dataset(_) | ExplorerError::Zone(_) | ExplorerError::Flow(_) => {
            log::error!("Failed to {what}: {e}");
            HttpResponse::InternalServerError().json(body)
        }
    }
}

fn blocking_error(e: &actix_web::error::BlockingError, what: &str) -> HttpResponse {
    log::error!("Failed to {what}: {e}");
    HttpResponse::InternalServerError().json(ApiError {
        error: format!("Failed to {what}"),
    })
}

fn bad_request(message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiError { error: message })
}

/// Answers malformed query strings with an [`ApiError`] body instead of
/// actix's plain-text default.
pub fn query_error(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    log::debug!("Rejected query for {}: {err}", req.path());
    let response = bad_request(err.to_string());
    InternalError::from_response(err, response).into()
}
