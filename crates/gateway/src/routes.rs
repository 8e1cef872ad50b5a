use std::time::Duration;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use fetcher::{FetchRequest, FieldRecord};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let server = &state.config.server;

    let cors = if server.enable_cors {
        let origins = server
            .cors_origins
            .iter()
            .filter_map(|s| s.parse::<axum::http::HeaderValue>().ok())
            .collect::<Vec<_>>();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        // Same-origin only
        CorsLayer::new()
    };

    let request_timeout = Duration::from_secs(server.request_timeout_secs);
    let body_limit = server.max_body_bytes;

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/FetchLogContent", post(fetch_log_content_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                // Dropping the handler on timeout abandons its pending file reads
                .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, request_timeout))
                .layer(DefaultBodyLimit::max(body_limit))
                .layer(cors),
        )
        .with_state(state)
}

/// Root handler - shows API info
async fn root_handler() -> Json<serde_json::Value> {
    Json(json!({
        "name": "Log Fetch Gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "fetch": "POST /FetchLogContent",
            "health": "/health",
            "metrics": "/metrics"
        }
    }))
}

/// Health check handler
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let shutting_down = state.shutdown.is_cancelled();
    let status_code = if shutting_down {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (
        status_code,
        Json(json!({
            "status": if shutting_down { "shutting_down" } else { "healthy" },
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "active_fetches": state.metrics.active_count(),
        })),
    )
}

/// Metrics endpoint
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    let metrics = &state.metrics;

    Json(json!({
        "fetches": {
            "active": metrics.active_count(),
            "total": metrics.total_count(),
            "failed": metrics.failed_count(),
            "failed_by_code": metrics.failures_by_code(),
        },
        "files": {
            "read": metrics.files_read(),
            "skipped": metrics.files_skipped(),
        },
        "records": {
            "returned": metrics.records_returned(),
        }
    }))
}

/// POST /FetchLogContent — extract fields from the configured log files
async fn fetch_log_content_handler(
    State(state): State<AppState>,
    Json(request): Json<FetchRequest>,
) -> ApiResult<Json<Vec<FieldRecord>>> {
    let _guard = state.metrics.fetch_started();
    let cancel = state.shutdown.child_token();

    debug!(
        directory = ?request.directory(),
        explicit_paths = request.explicit_file_paths.len(),
        kinds = ?request.requested_field_kinds,
        "Fetch requested"
    );

    match state.pipeline.run_report(&request, &cancel).await {
        Ok(report) => {
            state.metrics.fetch_succeeded(&report.summary);
            Ok(Json(report.records))
        }
        Err(e) => {
            state.metrics.fetch_failed(e.code());
            Err(ApiError::from(e))
        }
    }
}
