//! Process-wide application context.
//!
//! Built once in `main` and handed to the router and the simulator. Cloning
//! is cheap; every field is behind an `Arc`.

use std::sync::Arc;

use crate::config::Config;
use crate::feed::WeatherFeed;
use crate::ingest::IngestionService;
use crate::store::{ReadingStore, ThresholdStore};

#[derive(Clone)]
pub struct AppContext {
    /// Reading persistence.
    pub readings: Arc<dyn ReadingStore>,
    /// Threshold range persistence.
    pub thresholds: Arc<dyn ThresholdStore>,
    /// Shared ingestion pipeline (feed + reading store).
    pub ingest: Arc<IngestionService>,
    /// Immutable configuration snapshot.
    pub config: Arc<Config>,
}

impl AppContext {
    pub fn new(
        readings: Arc<dyn ReadingStore>,
        thresholds: Arc<dyn ThresholdStore>,
        feed: Arc<dyn WeatherFeed>,
        config: Config,
    ) -> Self {
        let ingest = Arc::new(IngestionService::new(
            readings.clone(),
            feed,
            config.backfill_limit as usize,
        ));

        Self {
            readings,
            thresholds,
            ingest,
            config: Arc::new(config),
        }
    }
}
