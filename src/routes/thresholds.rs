// src/routes/thresholds.rs
//! Threshold range endpoints.
//!
//! - `GET /thresholds`: current ranges and the derived safe bound
//! - `PUT /thresholds`: replace the whole set
//!
//! A replacement body is `{"ranges": [{"from": 18, "to": 26, "label": "Safe"}, ...]}`.
//! Bounds may be numbers or numeric strings (what an HTML form posts).
//! When `THRESHOLD_ADMIN_TOKEN` is configured the request must carry
//! `Authorization: Bearer <token>`.

use axum::{
    body::Bytes,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use super::error::AppResult;
use crate::error::Error;
use crate::models::numeric;
use crate::thresholds::{self, ThresholdRange, ThresholdSet, MSG_INVALID_VALUES};
use crate::AppContext;

// ---

pub fn router() -> Router<AppContext> {
    Router::new().route("/thresholds", get(get_thresholds).put(replace_thresholds))
}

#[derive(Debug, Serialize)]
struct ThresholdsResponse {
    ranges: Vec<ThresholdRange>,
    safe_threshold: f64,
}

impl ThresholdsResponse {
    fn new(ranges: Vec<ThresholdRange>) -> Self {
        Self {
            safe_threshold: thresholds::safe_upper_bound(&ranges),
            ranges,
        }
    }
}

async fn get_thresholds(State(ctx): State<AppContext>) -> AppResult<Json<ThresholdsResponse>> {
    let ranges = ctx.thresholds.current().await?;
    Ok(Json(ThresholdsResponse::new(ranges)))
}

async fn replace_thresholds(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<ThresholdsResponse>> {
    // ---
    authorize(&headers, ctx.config.admin_token.as_deref())?;

    let candidate = parse_ranges(&body)?;
    let set = ThresholdSet::validate(candidate, ctx.config.threshold_range_count as usize)?;
    ctx.thresholds.replace_all(&set).await?;

    info!(
        "Thresholds updated, safe bound now {:.1}°C",
        set.safe_upper_bound()
    );
    Ok(Json(ThresholdsResponse::new(set.into_ranges())))
}

fn authorize(headers: &HeaderMap, admin_token: Option<&str>) -> Result<(), Error> {
    // ---
    let Some(expected) = admin_token else {
        return Ok(());
    };

    let presented = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);

    match presented {
        Some(token) if token == expected => Ok(()),
        _ => Err(Error::Unauthorized(
            "You do not have permission to update thresholds.".into(),
        )),
    }
}

/// Read the candidate ranges without judging them; [`ThresholdSet::validate`]
/// does that. Only structurally unusable input is rejected here.
fn parse_ranges(body: &[u8]) -> Result<Vec<ThresholdRange>, Error> {
    // ---
    let invalid = || Error::Validation(MSG_INVALID_VALUES.into());

    let doc: Value = serde_json::from_slice(body).map_err(|_| invalid())?;
    let items = match &doc {
        Value::Array(items) => items,
        Value::Object(map) => map
            .get("ranges")
            .and_then(Value::as_array)
            .ok_or_else(invalid)?,
        _ => return Err(invalid()),
    };

    items
        .iter()
        .map(|item| -> Result<ThresholdRange, Error> {
            let from = item.get("from").and_then(numeric).ok_or_else(invalid)?;
            let to = item.get("to").and_then(numeric).ok_or_else(invalid)?;
            let label = item
                .get("label")
                .and_then(Value::as_str)
                .unwrap_or_default();
            Ok(ThresholdRange::new(from, to, label))
        })
        .collect()
}
