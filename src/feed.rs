//! External weather feed (Bureau of Meteorology observation JSON).
//!
//! The feed document looks like
//!
//! ```json
//! { "observations": { "data": [
//!     { "local_date_time_full": "20250711143000", "air_temp": 21.4, "rel_hum": 63, ... },
//!     ...
//! ] } }
//! ```
//!
//! with the newest observation first. Fetching and parsing are split so
//! the parsing rules can be exercised without the network.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{numeric, Observation};

/// Compact timestamp used by `local_date_time_full`, e.g. `20250711143000`.
pub const FEED_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

// ---

/// Source of raw observation documents.
#[async_trait]
pub trait WeatherFeed: Send + Sync {
    /// Fetch the current observation document.
    ///
    /// Transport failures, non-success statuses and bodies that are not
    /// JSON are all [`Error::Network`].
    async fn fetch(&self) -> Result<Value>;
}

/// HTTP client for a BOM station feed.
#[derive(Debug, Clone)]
pub struct BomFeed {
    client: reqwest::Client,
    url: String,
}

impl BomFeed {
    /// Build a client whose requests give up after `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        // ---
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("heatwatch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl WeatherFeed for BomFeed {
    async fn fetch(&self) -> Result<Value> {
        // ---
        debug!("Fetching weather feed from: {}", self.url);

        let doc: Value = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(doc)
    }
}

/// The `observations.data` array of a feed document.
pub fn observation_entries(doc: &Value) -> Result<&[Value]> {
    // ---
    doc.get("observations")
        .and_then(|o| o.get("data"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .ok_or_else(|| Error::DataFormat("missing 'observations.data' array".into()))
}

/// Normalize one feed entry.
pub fn parse_entry(entry: &Value) -> Result<Observation> {
    // ---
    let temperature = numeric_field(entry, "air_temp")?;
    let humidity = numeric_field(entry, "rel_hum")?;
    if !(0.0..=100.0).contains(&humidity) {
        return Err(Error::DataFormat(format!("'rel_hum' out of range: {humidity}")));
    }

    let raw = entry
        .get("local_date_time_full")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::DataFormat("missing 'local_date_time_full'".into()))?;
    let timestamp = parse_feed_timestamp(raw)?;

    Ok(Observation {
        timestamp,
        temperature,
        humidity,
    })
}

/// The newest observation in the document.
pub fn latest_observation(doc: &Value) -> Result<Observation> {
    let entries = observation_entries(doc)?;
    let first = entries
        .first()
        .ok_or_else(|| Error::DataFormat("'observations.data' is empty".into()))?;
    parse_entry(first)
}

pub fn parse_feed_timestamp(raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), FEED_TIMESTAMP_FORMAT)
        .map_err(|e| Error::DataFormat(format!("bad 'local_date_time_full' {raw:?}: {e}")))
}

fn numeric_field(entry: &Value, name: &str) -> Result<f64> {
    let value = entry
        .get(name)
        .ok_or_else(|| Error::DataFormat(format!("missing '{name}'")))?;

    numeric(value)
        .filter(|v| v.is_finite())
        .ok_or_else(|| Error::DataFormat(format!("'{name}' is not numeric: {value}")))
}
