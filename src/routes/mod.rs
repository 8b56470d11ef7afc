use axum::Router;

use crate::AppContext;

mod dashboard;
mod error;
mod health;
mod ingest;
mod readings;
mod thresholds;

pub use error::{AppError, AppResult};

// ---

pub fn router(ctx: AppContext) -> Router {
    // ---
    Router::new()
        .merge(ingest::router())
        .merge(readings::router())
        .merge(dashboard::router())
        .merge(thresholds::router())
        .merge(health::router())
        .with_state(ctx)
}
