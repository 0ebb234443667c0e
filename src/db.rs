//! Parameterized queries used by the route handlers and the quality monitor.

use sqlx::PgPool;

use crate::models::{LoginLog, NewUser, SessionStatus, User, UserProfile, WaterReading};

// ---

/// Measurements are cast so tables created with `NUMERIC` columns still
/// decode into `f64`.
const READING_COLUMNS: &str = "id, \
     salinity::float8 AS salinity, \
     ph::float8 AS ph, \
     dissolved_oxygen::float8 AS dissolved_oxygen, \
     nitrogen::float8 AS nitrogen, \
     hydrogen_sulfide::float8 AS hydrogen_sulfide, \
     bod::float8 AS bod, \
     temperature::float8 AS temperature, \
     recorded_at";

pub async fn find_user_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    // ---
    sqlx::query_as::<_, User>(
        "SELECT id, name, email, password, created_at FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await
}

pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
    // ---
    sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
        .bind(email)
        .fetch_one(pool)
        .await
}

/// Insert a user; `password_hash` must already be hashed.
pub async fn insert_user(
    pool: &PgPool,
    name: &str,
    email: &str,
    password_hash: &str,
) -> Result<NewUser, sqlx::Error> {
    // ---
    sqlx::query_as::<_, NewUser>(
        "INSERT INTO users (name, email, password) VALUES ($1, $2, $3) RETURNING name, email",
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await
}

pub async fn find_profile(pool: &PgPool, user_id: i32) -> Result<Option<UserProfile>, sqlx::Error> {
    // ---
    sqlx::query_as::<_, UserProfile>(
        "SELECT id, name, email, created_at FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Append an `online` row for a fresh login.
pub async fn record_login(pool: &PgPool, email: &str) -> Result<(), sqlx::Error> {
    // ---
    sqlx::query("INSERT INTO login_logs (email, login_time, status) VALUES ($1, NOW(), $2)")
        .bind(email)
        .bind(SessionStatus::Online.as_str())
        .execute(pool)
        .await?;
    Ok(())
}

/// Mark the member's most recent login row `offline`. Returns rows touched.
pub async fn record_logout(pool: &PgPool, email: &str) -> Result<u64, sqlx::Error> {
    // ---
    let result = sqlx::query(
        r#"
        UPDATE login_logs SET status = $1
        WHERE id = (
            SELECT id FROM login_logs
            WHERE email = $2
            ORDER BY login_time DESC, id DESC
            LIMIT 1
        )
        "#,
    )
    .bind(SessionStatus::Offline.as_str())
    .bind(email)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

pub async fn login_logs(pool: &PgPool, email: &str) -> Result<Vec<LoginLog>, sqlx::Error> {
    // ---
    sqlx::query_as::<_, LoginLog>(
        "SELECT email, login_time, status FROM login_logs WHERE email = $1 ORDER BY login_time DESC",
    )
    .bind(email)
    .fetch_all(pool)
    .await
}

/// Most recent readings, newest first.
pub async fn latest_readings(pool: &PgPool, limit: u32) -> Result<Vec<WaterReading>, sqlx::Error> {
    // ---
    let sql = format!(
        "SELECT {READING_COLUMNS} FROM water_quality ORDER BY recorded_at DESC, id DESC LIMIT $1"
    );
    sqlx::query_as::<_, WaterReading>(&sql)
        .bind(i64::from(limit))
        .fetch_all(pool)
        .await
}

pub async fn latest_reading(pool: &PgPool) -> Result<Option<WaterReading>, sqlx::Error> {
    // ---
    Ok(latest_readings(pool, 1).await?.into_iter().next())
}
