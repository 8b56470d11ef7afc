//! Persistence for readings and threshold ranges.
//!
//! Two traits describe what the rest of the service needs from storage;
//! [`PgStore`] backs them with PostgreSQL and [`MemoryStore`] keeps
//! everything in process (demo mode and tests).
//!
//! # Uniqueness
//!
//! External readings are unique per timestamp. Both backends enforce this
//! themselves and report a repeat as [`Error::DuplicateReading`], so callers
//! may skip the `exists` pre-check without racing each other. Internal
//! readings carry no uniqueness constraint.

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::error::{Error, Result};
use crate::models::{format_timestamp, Reading, Source};
use crate::thresholds::{self, ThresholdRange, ThresholdSet};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

// ---

/// Timestamped reading storage.
#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// Whether a reading exists for this exact key.
    async fn exists(&self, timestamp: NaiveDateTime, source: Source) -> Result<bool>;

    /// Insert one reading atomically.
    ///
    /// Returns [`Error::DuplicateReading`] if an external reading with the
    /// same timestamp is already stored.
    async fn insert(&self, reading: &Reading) -> Result<()>;

    /// Reading with the greatest timestamp for `source`.
    async fn latest(&self, source: Source) -> Result<Option<Reading>>;

    /// Up to `limit` readings for `source`, most recent first.
    async fn recent(&self, source: Source, limit: u32) -> Result<Vec<Reading>>;

    /// Cheap liveness probe used by the health endpoint.
    async fn ping(&self) -> Result<()>;

    /// Like [`ReadingStore::latest`] but treats "no readings" as an error.
    async fn require_latest(&self, source: Source) -> Result<Reading> {
        self.latest(source).await?.ok_or(Error::NotFound(source))
    }
}

/// Threshold range storage. The set is only ever replaced as a whole.
#[async_trait]
pub trait ThresholdStore: Send + Sync {
    /// Stored ranges in ascending `from` order.
    async fn load(&self) -> Result<Vec<ThresholdRange>>;

    /// Discard the stored set and install `set`, in one atomic step.
    async fn replace_all(&self, set: &ThresholdSet) -> Result<()>;

    /// Install the default ranges if nothing is stored. Returns whether
    /// anything was written.
    async fn seed_defaults(&self) -> Result<bool>;

    /// Stored ranges, or the defaults when the table is empty.
    async fn current(&self) -> Result<Vec<ThresholdRange>> {
        let ranges = self.load().await?;
        if ranges.is_empty() {
            Ok(thresholds::default_ranges())
        } else {
            Ok(ranges)
        }
    }
}

pub(crate) fn duplicate_of(reading: &Reading) -> Error {
    Error::DuplicateReading {
        timestamp: format_timestamp(&reading.timestamp),
        origin: reading.source,
    }
}
