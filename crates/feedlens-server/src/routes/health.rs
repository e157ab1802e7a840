//! Health and analyzer status routes.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(get_health))
        .route("/analyzer", get(get_analyzer))
}

/// GET /api/health: record source and analyzer readiness.
async fn get_health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let records = state.records();

    Json(serde_json::json!({
        "status": if records.is_some() { "ok" } else { "degraded" },
        "records": records.as_ref().map(|r| r.len()).unwrap_or(0),
        "columns": records.as_ref().map(|r| r.columns().len()).unwrap_or(0),
        "sourceError": state.source_error(),
        "analyzer": state.analyzer.name(),
        "workers": state.config.analyzer_workers,
    }))
}

/// GET /api/analyzer: configured providers (keys masked).
async fn get_analyzer(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "active": state.analyzer.name(),
        "config": state.analyzer_status,
    }))
}
