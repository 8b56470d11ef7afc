//! Reading ingestion.
//!
//! Three entry points share one normalization path (parse, derive apparent
//! temperature, tag with a source, store):
//! - [`IngestionService::ingest_external`]: newest feed observation
//! - [`IngestionService::ingest_internal`]: JSON payload from a sensor client
//! - [`IngestionService::backfill`]: recent feed history on startup
//!
//! External readings are idempotent by timestamp. A repeat is reported as
//! [`IngestOutcome::AlreadyExists`], never as an error.

use std::sync::Arc;

use chrono::{Local, NaiveDateTime, SubsecRound};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::feed::{self, WeatherFeed};
use crate::models::{numeric, Observation, Reading, Source};
use crate::store::ReadingStore;

pub const MSG_MISSING_JSON: &str = "Missing JSON data";
pub const MSG_INVALID_FIELDS: &str = "Invalid or missing fields";

// ---

/// Result of storing an external reading.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    Created(Reading),
    AlreadyExists(Reading),
}

impl IngestOutcome {
    pub fn reading(&self) -> &Reading {
        match self {
            IngestOutcome::Created(r) | IngestOutcome::AlreadyExists(r) => r,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, IngestOutcome::Created(_))
    }
}

/// Tally of a historical backfill run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BackfillReport {
    pub inserted: usize,
    pub skipped_existing: usize,
    pub skipped_malformed: usize,
    pub failed: usize,
}

pub struct IngestionService {
    readings: Arc<dyn ReadingStore>,
    feed: Arc<dyn WeatherFeed>,
    backfill_limit: usize,
}

impl IngestionService {
    pub fn new(
        readings: Arc<dyn ReadingStore>,
        feed: Arc<dyn WeatherFeed>,
        backfill_limit: usize,
    ) -> Self {
        Self {
            readings,
            feed,
            backfill_limit,
        }
    }

    /// Fetch the feed and store its newest observation.
    ///
    /// Nothing is written when the fetch or the parse fails.
    pub async fn ingest_external(&self) -> Result<IngestOutcome> {
        // ---
        let doc = self.feed.fetch().await?;
        let observation = feed::latest_observation(&doc)?;

        let outcome = self.store_external(observation).await?;
        info!(
            "External reading {} at {}",
            if outcome.is_created() { "stored" } else { "already present" },
            outcome.reading().timestamp_iso()
        );
        Ok(outcome)
    }

    /// Validate a sensor payload `{temperature, humidity}` and store it.
    ///
    /// `payload` is `None` when the request carried no parseable JSON.
    pub async fn ingest_internal(&self, payload: Option<&Value>) -> Result<Reading> {
        // ---
        let (temperature, humidity) = parse_internal_payload(payload)?;
        self.record_internal(temperature, humidity).await
    }

    /// Store an internal reading stamped with the current local time.
    pub async fn record_internal(&self, temperature: f64, humidity: f64) -> Result<Reading> {
        // ---
        let reading = Observation {
            timestamp: now_local(),
            temperature,
            humidity,
        }
        .into_reading(Source::Internal);

        self.readings.insert(&reading).await?;
        debug!(
            "Internal reading stored: {:.1}°C {:.1}% -> {:.1}°C apparent",
            reading.temperature, reading.humidity, reading.apparent
        );
        Ok(reading)
    }

    /// Load up to `backfill_limit` recent feed observations.
    ///
    /// Malformed entries and timestamps already stored are skipped; one bad
    /// entry never aborts the batch. Only a failure to fetch or to find the
    /// observation array is returned as an error.
    pub async fn backfill(&self) -> Result<BackfillReport> {
        // ---
        let doc = self.feed.fetch().await?;
        let entries = feed::observation_entries(&doc)?;

        let mut report = BackfillReport::default();
        for (i, entry) in entries.iter().take(self.backfill_limit).enumerate() {
            let observation = match feed::parse_entry(entry) {
                Ok(obs) => obs,
                Err(e) => {
                    debug!("Skipping feed entry {}: {}", i, e);
                    report.skipped_malformed += 1;
                    continue;
                }
            };

            match self.store_external(observation).await {
                Ok(IngestOutcome::Created(_)) => report.inserted += 1,
                Ok(IngestOutcome::AlreadyExists(_)) => report.skipped_existing += 1,
                Err(e) => {
                    warn!("Failed to store feed entry {}: {}", i, e);
                    report.failed += 1;
                }
            }
        }

        info!(
            "Backfill complete: {} inserted, {} already present, {} malformed, {} failed",
            report.inserted, report.skipped_existing, report.skipped_malformed, report.failed
        );
        Ok(report)
    }

    async fn store_external(&self, observation: Observation) -> Result<IngestOutcome> {
        // ---
        let reading = observation.into_reading(Source::External);

        if self.readings.exists(reading.timestamp, Source::External).await? {
            return Ok(IngestOutcome::AlreadyExists(reading));
        }

        // A concurrent ingest may win between the check and the insert; the
        // store's uniqueness rule turns that into DuplicateReading.
        match self.readings.insert(&reading).await {
            Ok(()) => Ok(IngestOutcome::Created(reading)),
            Err(Error::DuplicateReading { .. }) => Ok(IngestOutcome::AlreadyExists(reading)),
            Err(e) => Err(e),
        }
    }
}

/// Current local wall-clock time at the store's microsecond precision.
pub fn now_local() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(6)
}

fn parse_internal_payload(payload: Option<&Value>) -> Result<(f64, f64)> {
    // ---
    let fields = match payload.and_then(Value::as_object) {
        Some(map) if !map.is_empty() => map,
        _ => return Err(Error::Validation(MSG_MISSING_JSON.into())),
    };

    let field = |name: &str| {
        fields
            .get(name)
            .and_then(numeric)
            .filter(|v| v.is_finite())
            .ok_or_else(|| Error::Validation(MSG_INVALID_FIELDS.into()))
    };

    let temperature = field("temperature")?;
    let humidity = field("humidity")?;
    if !(0.0..=100.0).contains(&humidity) {
        return Err(Error::Validation(MSG_INVALID_FIELDS.into()));
    }

    Ok((temperature, humidity))
}
