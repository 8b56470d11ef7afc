use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::error::AppResult;
use crate::{AppContext, Reading, Source};

const DEFAULT_LOG_LIMIT: u32 = 50;
const MAX_LOG_LIMIT: u32 = 500;

// ---

pub fn router() -> Router<AppContext> {
    // ---
    Router::new()
        .route("/temperature-log", get(temperature_log))
        .route("/readings/{source}/latest", get(latest_reading))
}

/// Query parameters for the temperature log
#[derive(Debug, Deserialize)]
pub struct LogQuery {
    /// Readings per source (default 50, capped at 500).
    limit: Option<u32>,
}

#[derive(Debug, Serialize)]
struct TemperatureLog {
    internal: Vec<Reading>,
    external: Vec<Reading>,
}

/// `GET /temperature-log`: most recent readings of each source.
async fn temperature_log(
    query: Result<Query<LogQuery>, QueryRejection>,
    State(ctx): State<AppContext>,
) -> AppResult<Json<TemperatureLog>> {
    // ---
    let Query(params) = query?;
    let limit = params
        .limit
        .unwrap_or(DEFAULT_LOG_LIMIT)
        .clamp(1, MAX_LOG_LIMIT);
    debug!("GET /temperature-log - limit {}", limit);

    let internal = ctx.readings.recent(Source::Internal, limit).await?;
    let external = ctx.readings.recent(Source::External, limit).await?;

    info!(
        "Temperature log: {} internal, {} external readings",
        internal.len(),
        external.len()
    );
    Ok(Json(TemperatureLog { internal, external }))
}

/// `GET /readings/{source}/latest`: 404 until the source has reported.
async fn latest_reading(
    path: Result<Path<Source>, PathRejection>,
    State(ctx): State<AppContext>,
) -> AppResult<Json<Reading>> {
    let Path(source) = path?;
    let reading = ctx.readings.require_latest(source).await?;
    Ok(Json(reading))
}
