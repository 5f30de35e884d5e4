//! Axum router and HTTP handlers.
//!
//! `build_router` is the single entry point; `main.rs` attaches middleware
//! so tests can drive the bare router.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tracing::error;

use crate::{
    api_types::{ErrorResponse, HealthResponse},
    state::AppState,
};

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/metrics", get(metrics))
        .route("/v1/health", get(health))
        .route("/v1/status", get(status_handler))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// GET /metrics
// ---------------------------------------------------------------------------

pub(crate) async fn metrics(State(st): State<Arc<AppState>>) -> Response {
    match pfx_metrics::encode_text(&st.registry) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, pfx_metrics::TEXT_CONTENT_TYPE)],
            body,
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "metrics encoding failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: err.to_string(),
                }),
            )
                .into_response()
        }
    }
}

// ---------------------------------------------------------------------------
// GET /v1/health
// ---------------------------------------------------------------------------

pub(crate) async fn health(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            ok: true,
            service: st.build.service.to_string(),
            version: st.build.version.to_string(),
        }),
    )
}

// ---------------------------------------------------------------------------
// GET /v1/status
// ---------------------------------------------------------------------------

pub(crate) async fn status_handler(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    (StatusCode::OK, Json(st.scrape_statuses().await))
}
