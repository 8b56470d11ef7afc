use axum::{extract::State, routing::get, Json, Router};

use super::error::AppResult;
use crate::dashboard::{self, Dashboard};
use crate::AppContext;

pub fn router() -> Router<AppContext> {
    Router::new().route("/dashboard", get(handler))
}

async fn handler(State(ctx): State<AppContext>) -> AppResult<Json<Dashboard>> {
    // ---
    let snapshot = dashboard::snapshot(ctx.readings.as_ref(), ctx.thresholds.as_ref()).await?;
    if snapshot.alert.state != dashboard::AlertState::NoAlert {
        tracing::info!("Dashboard alert: {}", snapshot.alert.message);
    }
    Ok(Json(snapshot))
}
