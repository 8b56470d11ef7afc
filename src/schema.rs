//! Database schema management for `heatwatch`.
//!
//! Ensures required tables and indexes exist before serving requests.
//! Applied once on startup from `main.rs` (EMBP: single gateway call).

use anyhow::Result;
use sqlx::PgPool;

// ---

/// Create the database schema if missing (idempotent).
///
/// Creates the `readings` table with a partial unique index enforcing one
/// external reading per timestamp, and the `thresholds` table holding the
/// current risk ranges. Safe to call on every startup.
///
/// Errors are propagated if any SQL execution fails.
pub async fn create_schema(pool: &PgPool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS readings (
            id          BIGSERIAL        PRIMARY KEY,
            observed_at TIMESTAMP        NOT NULL,
            source      TEXT             NOT NULL CHECK (source IN ('internal', 'external')),
            temperature DOUBLE PRECISION NOT NULL,
            humidity    DOUBLE PRECISION NOT NULL,
            apparent    DOUBLE PRECISION NOT NULL
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // Storage-level idempotency for feed observations; internal readings
    // may share a timestamp.
    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS uq_readings_external_observed_at
            ON readings (observed_at, source)
            WHERE source = 'external';
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_readings_source_observed_at
            ON readings (source, observed_at DESC);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS thresholds (
            id               SERIAL           PRIMARY KEY,
            temperature_from DOUBLE PRECISION NOT NULL,
            temperature_to   DOUBLE PRECISION NOT NULL,
            label            TEXT             NOT NULL,
            CHECK (temperature_from < temperature_to)
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
