//! PostgreSQL store.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::PgPool;
use tracing::{debug, info};

use super::{duplicate_of, ReadingStore, ThresholdStore};
use crate::error::{Error, Result};
use crate::models::{Reading, Source};
use crate::thresholds::{self, ThresholdRange, ThresholdSet};

// ---

#[derive(Debug, sqlx::FromRow)]
struct ReadingRow {
    // ---
    observed_at: NaiveDateTime,
    source: String,
    temperature: f64,
    humidity: f64,
    apparent: f64,
}

impl TryFrom<ReadingRow> for Reading {
    type Error = Error;

    fn try_from(row: ReadingRow) -> Result<Self> {
        let source = row
            .source
            .parse::<Source>()
            .map_err(|e| Error::Database(sqlx::Error::Decode(e.into())))?;

        Ok(Reading {
            timestamp: row.observed_at,
            source,
            temperature: row.temperature,
            humidity: row.humidity,
            apparent: row.apparent,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ThresholdRow {
    temperature_from: f64,
    temperature_to: f64,
    label: String,
}

/// Readings and thresholds in PostgreSQL, see `schema.rs` for the tables.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReadingStore for PgStore {
    async fn exists(&self, timestamp: NaiveDateTime, source: Source) -> Result<bool> {
        // ---
        let found: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM readings WHERE observed_at = $1 AND source = $2
            )
            "#,
        )
        .bind(timestamp)
        .bind(source.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(found)
    }

    async fn insert(&self, reading: &Reading) -> Result<()> {
        // ---
        let result = sqlx::query(
            r#"
            INSERT INTO readings (observed_at, source, temperature, humidity, apparent)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(reading.timestamp)
        .bind(reading.source.as_str())
        .bind(reading.temperature)
        .bind(reading.humidity)
        .bind(reading.apparent)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                debug!("Unique violation on {} reading {}", reading.source, reading.timestamp);
                Err(duplicate_of(reading))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn latest(&self, source: Source) -> Result<Option<Reading>> {
        // ---
        let row: Option<ReadingRow> = sqlx::query_as(
            r#"
            SELECT observed_at, source, temperature, humidity, apparent
            FROM readings
            WHERE source = $1
            ORDER BY observed_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(source.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Reading::try_from).transpose()
    }

    async fn recent(&self, source: Source, limit: u32) -> Result<Vec<Reading>> {
        // ---
        let rows: Vec<ReadingRow> = sqlx::query_as(
            r#"
            SELECT observed_at, source, temperature, humidity, apparent
            FROM readings
            WHERE source = $1
            ORDER BY observed_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(source.as_str())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Reading::try_from).collect()
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl ThresholdStore for PgStore {
    async fn load(&self) -> Result<Vec<ThresholdRange>> {
        // ---
        let rows: Vec<ThresholdRow> = sqlx::query_as(
            r#"
            SELECT temperature_from, temperature_to, label
            FROM thresholds
            ORDER BY temperature_from ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| ThresholdRange::new(r.temperature_from, r.temperature_to, r.label))
            .collect())
    }

    async fn replace_all(&self, set: &ThresholdSet) -> Result<()> {
        // ---
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM thresholds")
            .execute(&mut *tx)
            .await?;

        for range in set.ranges() {
            sqlx::query(
                r#"
                INSERT INTO thresholds (temperature_from, temperature_to, label)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(range.from)
            .bind(range.to)
            .bind(&range.label)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!("Replaced threshold set with {} ranges", set.ranges().len());
        Ok(())
    }

    async fn seed_defaults(&self) -> Result<bool> {
        // ---
        let mut tx = self.pool.begin().await?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM thresholds")
            .fetch_one(&mut *tx)
            .await?;
        if count > 0 {
            return Ok(false);
        }

        for range in thresholds::default_ranges() {
            sqlx::query(
                r#"
                INSERT INTO thresholds (temperature_from, temperature_to, label)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(range.from)
            .bind(range.to)
            .bind(&range.label)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!("Seeded default threshold ranges");
        Ok(true)
    }
}
