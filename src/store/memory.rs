//! In-process store used when no database is configured.
//!
//! Data lives only as long as the process. The uniqueness check and the
//! insert happen under a single write lock.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tokio::sync::RwLock;

use super::{duplicate_of, ReadingStore, ThresholdStore};
use crate::error::Result;
use crate::models::{Reading, Source};
use crate::thresholds::{self, ThresholdRange, ThresholdSet};

#[derive(Debug, Default)]
pub struct MemoryStore {
    readings: RwLock<Vec<Reading>>,
    thresholds: RwLock<Vec<ThresholdRange>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of readings held, all sources.
    pub async fn len(&self) -> usize {
        self.readings.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ReadingStore for MemoryStore {
    async fn exists(&self, timestamp: NaiveDateTime, source: Source) -> Result<bool> {
        let readings = self.readings.read().await;
        Ok(readings
            .iter()
            .any(|r| r.source == source && r.timestamp == timestamp))
    }

    async fn insert(&self, reading: &Reading) -> Result<()> {
        // ---
        let mut readings = self.readings.write().await;

        let taken = reading.source == Source::External
            && readings
                .iter()
                .any(|r| r.source == reading.source && r.timestamp == reading.timestamp);
        if taken {
            return Err(duplicate_of(reading));
        }

        readings.push(reading.clone());
        Ok(())
    }

    async fn latest(&self, source: Source) -> Result<Option<Reading>> {
        // ---
        let readings = self.readings.read().await;
        // Later insertions win ties, matching `ORDER BY observed_at DESC, id DESC`.
        Ok(readings
            .iter()
            .filter(|r| r.source == source)
            .max_by_key(|r| r.timestamp)
            .cloned())
    }

    async fn recent(&self, source: Source, limit: u32) -> Result<Vec<Reading>> {
        // ---
        let readings = self.readings.read().await;
        let mut matching: Vec<Reading> = readings
            .iter()
            .rev()
            .filter(|r| r.source == source)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        matching.truncate(limit as usize);
        Ok(matching)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl ThresholdStore for MemoryStore {
    async fn load(&self) -> Result<Vec<ThresholdRange>> {
        let mut ranges = self.thresholds.read().await.clone();
        ranges.sort_by(|a, b| a.from.total_cmp(&b.from));
        Ok(ranges)
    }

    async fn replace_all(&self, set: &ThresholdSet) -> Result<()> {
        *self.thresholds.write().await = set.ranges().to_vec();
        Ok(())
    }

    async fn seed_defaults(&self) -> Result<bool> {
        let mut ranges = self.thresholds.write().await;
        if !ranges.is_empty() {
            return Ok(false);
        }
        *ranges = thresholds::default_ranges();
        Ok(true)
    }
}
