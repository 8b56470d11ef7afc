use axum::{
    body::Bytes, extract::State, http::StatusCode, response::IntoResponse, routing::post, Json,
    Router,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use super::error::AppResult;
use crate::ingest::IngestOutcome;
use crate::simulator::{self, Profile};
use crate::{AppContext, Reading};

// ---

pub fn router() -> Router<AppContext> {
    // ---
    Router::new()
        .route("/ingest/external", post(ingest_external))
        .route("/ingest/internal", post(ingest_internal))
        .route("/simulate/internal", post(simulate_internal))
}

/// Body returned by every ingestion endpoint.
#[derive(Debug, Serialize)]
struct IngestResponse {
    message: &'static str,
    timestamp: String,
    temperature: f64,
    humidity: f64,
    apparent: f64,
}

impl IngestResponse {
    fn new(message: &'static str, reading: &Reading) -> Self {
        Self {
            message,
            timestamp: reading.timestamp_iso(),
            temperature: reading.temperature,
            humidity: reading.humidity,
            apparent: reading.apparent,
        }
    }
}

/// `POST /ingest/external`: pull the newest feed observation.
async fn ingest_external(State(ctx): State<AppContext>) -> AppResult<impl IntoResponse> {
    // ---
    info!("POST /ingest/external");

    let response = match ctx.ingest.ingest_external().await? {
        IngestOutcome::Created(reading) => (
            StatusCode::CREATED,
            Json(IngestResponse::new("New external data ingested", &reading)),
        ),
        // Repeats are 201 as well; only the message differs.
        IngestOutcome::AlreadyExists(reading) => (
            StatusCode::CREATED,
            Json(IngestResponse::new("Data already exists (not stored)", &reading)),
        ),
    };
    Ok(response)
}

/// `POST /ingest/internal`: accept `{temperature, humidity}` from a sensor.
async fn ingest_internal(
    State(ctx): State<AppContext>,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    // ---
    debug!("POST /ingest/internal ({} bytes)", body.len());

    // An absent or unparseable body is reported as missing data, not as a
    // JSON syntax error.
    let payload: Option<Value> = if body.is_empty() {
        None
    } else {
        serde_json::from_slice(&body).ok()
    };

    let reading = ctx.ingest.ingest_internal(payload.as_ref()).await?;
    Ok((
        StatusCode::CREATED,
        Json(IngestResponse::new("Internal data ingested successfully", &reading)),
    ))
}

/// `POST /simulate/internal`: store one synthetic reading on demand.
async fn simulate_internal(State(ctx): State<AppContext>) -> AppResult<impl IntoResponse> {
    // ---
    let reading = simulator::simulate_once(&ctx.ingest, Profile::Manual).await?;
    Ok((
        StatusCode::CREATED,
        Json(IngestResponse::new("Simulated internal data added", &reading)),
    ))
}
