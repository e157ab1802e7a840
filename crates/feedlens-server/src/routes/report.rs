//! Feedback report routes: filter options, catalog, and the aggregate report.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use feedlens_aggregate::{filter_options, FilterSelection};
use tracing::error;

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/filters", get(get_filters))
        .route("/catalog", get(get_catalog))
        .route("/report", post(build_report))
        .route("/records/reload", post(reload_records))
}

fn no_records(state: &AppState) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(serde_json::json!({
            "error": "Record source unavailable",
            "detail": state.source_error(),
        })),
    )
}

/// GET /api/filters: option lists for the event, type and year selectors.
async fn get_filters(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let Some(records) = state.records() else {
        return no_records(&state);
    };
    let options = filter_options(&records, state.catalog.dimensions());
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "events": options.events,
            "eventTypes": options.event_types,
            "programYears": options.program_years,
        })),
    )
}

/// GET /api/catalog: the active question catalog and schema coverage.
async fn get_catalog(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let missing: Vec<String> = state
        .records()
        .map(|r| {
            state
                .catalog
                .missing_columns(&r)
                .into_iter()
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    Json(serde_json::json!({
        "catalog": state.catalog,
        "missingColumns": missing,
    }))
}

/// POST /api/report: aggregate table plus raw feedback for a selection.
async fn build_report(
    State(state): State<Arc<AppState>>,
    Json(selection): Json<FilterSelection>,
) -> impl IntoResponse {
    let Some(records) = state.records() else {
        return no_records(&state);
    };

    let worker_state = state.clone();
    let report = tokio::task::spawn_blocking(move || worker_state.report(&records, &selection)).await;

    let report = match report {
        Ok(report) => report,
        Err(e) => {
            error!("Report task failed: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "Report generation failed" })),
            );
        }
    };

    match serde_json::to_value(&report) {
        Ok(body) => (StatusCode::OK, Json(body)),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": e.to_string() })),
        ),
    }
}

/// POST /api/records/reload: re-read the record source.
async fn reload_records(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let worker_state = state.clone();
    match tokio::task::spawn_blocking(move || worker_state.reload_records()).await {
        Ok(Ok(count)) => (
            StatusCode::OK,
            Json(serde_json::json!({ "success": true, "records": count })),
        ),
        Ok(Err(e)) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "success": false, "error": e.to_string() })),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "success": false, "error": e.to_string() })),
        ),
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};

    use crate::routes::test_support::{send, state};

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_filters() {
        let dir = tempfile::tempdir().unwrap();
        let request = Request::get("/api/filters").body(Body::empty()).unwrap();
        let (status, body) = send(state(dir.path(), true), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["events"], serde_json::json!(["Demo Day", "Kickoff"]));
        assert_eq!(body["programYears"], serde_json::json!(["2023", "2024"]));
    }

    #[tokio::test]
    async fn test_filters_without_records() {
        let dir = tempfile::tempdir().unwrap();
        let request = Request::get("/api/filters").body(Body::empty()).unwrap();
        let (status, _) = send(state(dir.path(), false), request).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_report_default_selection() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = send(state(dir.path(), true), post_json("/api/report", "{}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["mode"], "event");
        assert_eq!(body["groups"], serde_json::json!([{"Event": "Kickoff"}, {"Event": "Demo Day"}]));

        let first = &body["rows"][0];
        assert_eq!(first["Event"], "Kickoff");
        assert_eq!(first["Question"], "Question 1- Net Promoter_Average");
        assert_eq!(first["Value"], 8.0);

        let summary = &body["rows"][1];
        assert_eq!(summary["Question"], "Question 4- Liked_Summary");
        assert_eq!(summary["Value"], "speakers food speakers");

        let themes = &body["rows"][2];
        assert_eq!(themes["Value"], "speakers (2 mentions)\nfood (1 mentions)");

        let demo_summary = &body["rows"][4];
        assert_eq!(demo_summary["Event"], "Demo Day");
        assert_eq!(demo_summary["Value"], "");

        assert_eq!(body["raw"].as_array().unwrap().len(), 3);
        assert!(body.get("message").is_none());
    }

    #[tokio::test]
    async fn test_report_year_then_type() {
        let dir = tempfile::tempdir().unwrap();
        let request = post_json("/api/report", r#"{"programYears": ["2023", "2024"]}"#);
        let (_, body) = send(state(dir.path(), true), request).await;
        assert_eq!(body["mode"], "year_then_type");
        assert_eq!(
            body["groups"],
            serde_json::json!([
                {"Program Year": "2023", "Event Type": "Workshop"},
                {"Program Year": "2024", "Event Type": "Webinar"},
                {"Program Year": "2024", "Event Type": "Workshop"},
            ])
        );
    }

    #[tokio::test]
    async fn test_report_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let request = post_json("/api/report", r#"{"events": ["Missing"]}"#);
        let (status, body) = send(state(dir.path(), true), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rows"], serde_json::json!([]));
        assert_eq!(body["message"], feedlens_aggregate::NO_DATA_MESSAGE);
    }

    #[tokio::test]
    async fn test_reload_records() {
        let dir = tempfile::tempdir().unwrap();
        let app_state = state(dir.path(), false);

        let (status, body) = send(app_state.clone(), post_json("/api/records/reload", "")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        std::fs::write(
            &app_state.config.data_paths.records_file,
            crate::routes::test_support::RECORDS,
        )
        .unwrap();
        let (status, body) = send(app_state.clone(), post_json("/api/records/reload", "")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["records"], 3);
        assert!(app_state.records().is_some());
    }

    #[tokio::test]
    async fn test_catalog_reports_missing_columns() {
        let dir = tempfile::tempdir().unwrap();
        let request = Request::get("/api/catalog").body(Body::empty()).unwrap();
        let (_, body) = send(state(dir.path(), true), request).await;
        assert_eq!(body["catalog"]["numeric"][0], "Question 1- Net Promoter");
        assert_eq!(body["missingColumns"], serde_json::json!([]));
    }
}
