//! Data models for the heatwatch pipeline.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize, Serializer};

use crate::apparent;

// ---

/// Wire format for reading timestamps: local, offset-free ISO-8601.
/// The fractional part is only rendered when non-zero.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Where a reading came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Sensor payloads and simulated factory readings.
    Internal,
    /// Observations pulled from the weather feed.
    External,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Internal => "internal",
            Source::External => "external",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "internal" => Ok(Source::Internal),
            "external" => Ok(Source::External),
            other => Err(format!("unknown reading source '{other}'")),
        }
    }
}

/// Normalized observation before it is tagged with a source.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    // ---
    pub timestamp: NaiveDateTime,
    pub temperature: f64,
    pub humidity: f64,
}

/// A stored reading. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    // ---
    #[serde(serialize_with = "serialize_iso")]
    pub timestamp: NaiveDateTime,
    pub source: Source,
    pub temperature: f64,
    pub humidity: f64,
    pub apparent: f64,
}

impl Observation {
    // ---
    /// Tag the observation with its source and derive the apparent temperature.
    pub fn into_reading(self, source: Source) -> Reading {
        // ---
        Reading {
            apparent: apparent::compute(self.temperature, self.humidity),
            timestamp: self.timestamp,
            source,
            temperature: self.temperature,
            humidity: self.humidity,
        }
    }
}

impl Reading {
    /// Timestamp rendered in the wire format.
    pub fn timestamp_iso(&self) -> String {
        format_timestamp(&self.timestamp)
    }
}

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
}

/// Read a JSON number or numeric string as `f64`.
///
/// Sensor clients and the weather feed both send numbers as strings at
/// times; anything else (null, bool, "n/a") yields `None`.
pub fn numeric(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Serializes `NaiveDateTime` fields in [`TIMESTAMP_FORMAT`].
fn serialize_iso<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format_timestamp(ts))
}
