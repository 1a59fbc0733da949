// HTTP surface: catalog browsing and single-word lookups as JSON

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error, info};

use crate::core::errors::LookupError;
use crate::core::types::{pair_code, DictionaryResult, Language};
use crate::services::catalog::{list_source_languages, list_target_languages};
use crate::services::dictionary::DictionaryGateway;
use crate::services::validation::validate_word;
use crate::utils::Metrics;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<DictionaryGateway>,
    pub metrics: Metrics,
}

type HandlerError = (StatusCode, Json<serde_json::Value>);

#[derive(Debug, Deserialize)]
pub struct LookupParams {
    #[serde(default)]
    pub text: String,
    pub from: String,
    pub to: String,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/languages", get(source_languages))
        .route("/languages/:from/targets", get(target_languages))
        .route("/lookup", get(lookup))
        .route("/metrics", get(metrics_endpoint))
        .route("/stats", get(stats_endpoint))
        .with_state(state)
        .layer(cors)
}

async fn root() -> &'static str {
    "Dictionary Lookup Service"
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Languages that can be translated from
async fn source_languages(
    State(state): State<AppState>,
) -> Result<Json<Vec<Language>>, HandlerError> {
    state.metrics.record_endpoint_request("/languages");

    let pairs = state
        .gateway
        .fetch_language_pairs()
        .await
        .map_err(upstream_error)?;

    Ok(Json(list_source_languages(&pairs)))
}

/// Languages that `from` can be translated into
async fn target_languages(
    State(state): State<AppState>,
    Path(from): Path<String>,
) -> Result<Json<Vec<Language>>, HandlerError> {
    state.metrics.record_endpoint_request("/languages/targets");

    let pairs = state
        .gateway
        .fetch_language_pairs()
        .await
        .map_err(upstream_error)?;

    Ok(Json(list_target_languages(&pairs, &from)))
}

/// Look up one word.
///
/// An unknown word is a `200` with no definitions; a failed upstream call
/// is a `502`.
async fn lookup(
    State(state): State<AppState>,
    Query(params): Query<LookupParams>,
) -> Result<Json<DictionaryResult>, HandlerError> {
    state.metrics.record_endpoint_request("/lookup");

    let word = validate_word(&params.text).map_err(|e| {
        debug!("Rejected lookup input {:?}: {}", params.text, e);
        state.metrics.record_validation_failure();
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
    })?;

    let lang = pair_code(&params.from, &params.to);
    let result = state
        .gateway
        .translate(word, &lang)
        .await
        .map_err(upstream_error)?;

    info!(
        "Lookup {:?} ({}) returned {} definitions",
        word,
        lang,
        result.definitions.len()
    );
    Ok(Json(result))
}

/// Prometheus metrics endpoint
async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [("Content-Type", "text/plain; version=0.0.4")],
        state.metrics.to_prometheus(),
    )
}

/// Detailed statistics endpoint (JSON)
async fn stats_endpoint(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let snapshot = state.metrics.snapshot();
    serde_json::to_value(snapshot).map(Json).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to serialize metrics: {}", e),
        )
    })
}

fn upstream_error(err: LookupError) -> HandlerError {
    error!("Dictionary API request failed: {}", err);
    (
        StatusCode::BAD_GATEWAY,
        Json(serde_json::json!({
            "error": err.to_string(),
            "upstream_status": err.upstream_status(),
        })),
    )
}
