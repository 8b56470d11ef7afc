// src/routes/health.rs
//! API health check endpoint for the heatwatch backend.
//!
//! This module defines the `/health` route used by container orchestrators
//! and CI pipelines to verify that the service is running. It is a sibling
//! module in the `routes` directory and follows the Explicit Module Boundary
//! Pattern (EMBP):
//! - Internal to this file: endpoint handler(s) and related types
//! - Exports to the gateway (`mod.rs`): a subrouter containing the `/health` route

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

use crate::AppContext;

/// JSON response body for the `/health` endpoint.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    database: bool,
}

/// Handle `GET /health`.
///
/// Reports `ok` with 200 when the reading store answers a ping, otherwise
/// `degraded` with 503.
async fn health(State(ctx): State<AppContext>) -> (StatusCode, Json<HealthResponse>) {
    // ---
    match ctx.readings.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                database: true,
            }),
        ),
        Err(e) => {
            tracing::warn!("Health check: store ping failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "degraded",
                    database: false,
                }),
            )
        }
    }
}

/// Create a subrouter containing the `/health` route.
pub fn router() -> Router<AppContext> {
    Router::new().route("/health", get(health))
}
