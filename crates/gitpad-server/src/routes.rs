//! HTTP routes for the editor API.
//!
//! All responses are JSON. Errors come back as `{"error": "..."}` with a
//! 400 for anything the client can fix (bad content, bad filename) and a
//! 500 for everything else.

use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use gitpad_store::{StoreError, DEFAULT_HISTORY_LIMIT};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{debug, info, Span};

/// Create the router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/files", get(file_list))
        .route("/api/file/{filename}", get(file_read))
        .route("/api/file/{filename}", post(file_save))
        .route("/api/history/{filename}", get(file_history))
        .route("/api/restore/{filename}/{version}", post(file_restore))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, _span: &Span| {
                        info!(
                            status = %response.status(),
                            latency = ?latency,
                            "response"
                        );
                    },
                ),
        )
}

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize)]
struct ApiError {
    error: String,
}

impl ApiError {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    fn bad_request(msg: impl Into<String>) -> (StatusCode, Json<Self>) {
        (StatusCode::BAD_REQUEST, Json(Self::new(msg)))
    }

    fn internal(msg: impl Into<String>) -> (StatusCode, Json<Self>) {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(Self::new(msg)))
    }
}

/// Map a store failure onto the right status code.
fn store_error(err: StoreError) -> (StatusCode, Json<ApiError>) {
    if err.is_client_error() {
        ApiError::bad_request(err.to_string())
    } else {
        ApiError::internal(err.to_string())
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint.
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "healthy": true,
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn file_read(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, Json<ApiError>)> {
    match state.store.read(&filename).await {
        Ok(content) => Ok(Json(serde_json::json!({
            "content": content,
            "filename": filename
        }))),
        Err(e) => Err(store_error(e)),
    }
}

#[derive(Debug, Deserialize)]
struct SaveRequest {
    /// Document body; absent means empty.
    #[serde(default)]
    content: String,
}

async fn file_save(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    Json(req): Json<SaveRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<ApiError>)> {
    match state.store.write(&filename, &req.content).await {
        Ok(version) => Ok(Json(serde_json::json!({
            "success": true,
            "message": "File saved and committed",
            "commit": version.hash,
            "timestamp": version.timestamp
        }))),
        Err(e) => Err(store_error(e)),
    }
}

async fn file_history(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> impl IntoResponse {
    // History is best-effort: a file with no versions yet, or a store
    // whose history cannot be read, is an empty list rather than an error.
    let history = match state.store.history(&filename, DEFAULT_HISTORY_LIMIT) {
        Ok(records) => records,
        Err(e) => {
            debug!(filename = %filename, error = %e, "history unavailable");
            Vec::new()
        }
    };
    Json(serde_json::json!({ "history": history }))
}

async fn file_restore(
    State(state): State<AppState>,
    Path((filename, version)): Path<(String, String)>,
) -> Result<impl IntoResponse, (StatusCode, Json<ApiError>)> {
    match state.store.restore(&filename, &version).await {
        Ok(content) => Ok(Json(serde_json::json!({
            "success": true,
            "content": content,
            "message": format!("Restored to version {version}")
        }))),
        Err(e) => Err(store_error(e)),
    }
}

async fn file_list(State(state): State<AppState>) -> impl IntoResponse {
    let files = match state.store.list().await {
        Ok(files) => files,
        Err(e) => {
            debug!(error = %e, "file listing unavailable");
            Vec::new()
        }
    };
    Json(serde_json::json!({ "files": files }))
}
