//! Database schema management for `shrimpwatch`.
//!
//! Ensures required tables and indexes exist before serving requests.
//! Applied once on startup from `main.rs`.

use anyhow::Result;
use sqlx::PgPool;

// ---

/// Create the schema if it is missing (idempotent).
///
/// Creates `users`, `login_logs` and `water_quality`. Safe to call on every
/// startup; no-op if the objects already exist. Readings are written by the
/// external ingestion process, so measurement columns are nullable.
///
/// Errors are propagated if any SQL execution fails.
pub async fn create_schema(pool: &PgPool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id         SERIAL PRIMARY KEY,
            name       TEXT        NOT NULL,
            email      TEXT        NOT NULL,
            password   TEXT        NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            CONSTRAINT uq_users_email UNIQUE (email)
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS login_logs (
            id         SERIAL PRIMARY KEY,
            email      TEXT        NOT NULL,
            login_time TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            status     TEXT        NOT NULL
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS water_quality (
            id               SERIAL PRIMARY KEY,
            salinity         DOUBLE PRECISION,
            ph               DOUBLE PRECISION,
            dissolved_oxygen DOUBLE PRECISION,
            nitrogen         DOUBLE PRECISION,
            hydrogen_sulfide DOUBLE PRECISION,
            bod              DOUBLE PRECISION,
            temperature      DOUBLE PRECISION,
            recorded_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_login_logs_email_time
            ON login_logs (email, login_time DESC);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_water_quality_recorded_at
            ON water_quality (recorded_at DESC);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
