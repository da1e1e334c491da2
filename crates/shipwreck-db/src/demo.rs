//! Demo student-billing database.
//!
//! Used by `shipwreck-cli seed-demo` and by the test suites. The dataset is
//! small enough to check aggregates by hand: undergraduate active tuition is
//! 14250 for `2019FA` and 12480 for `2020SP`.

use std::path::Path;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::info;

use crate::DbError;

pub const STUDENT_BILLING_SQL: &str = include_str!("../sql/student_billing.sql");

/// Create the demo tables and rows on a writable SQLite pool.
pub async fn seed(pool: &SqlitePool) -> Result<(), DbError> {
    sqlx::raw_sql(STUDENT_BILLING_SQL).execute(pool).await?;
    Ok(())
}

/// Write the demo dataset to a SQLite file, creating it when missing.
pub async fn create_demo_database(path: &Path) -> Result<(), DbError> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    seed(&pool).await?;
    pool.close().await;

    info!(path = %path.display(), "Demo database written");
    Ok(())
}

/// A single-connection in-memory pool holding the demo dataset.
///
/// The pool keeps its one connection alive, since an in-memory SQLite
/// database disappears with the connection that created it.
pub async fn in_memory() -> Result<SqlitePool, DbError> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    seed(&pool).await?;
    Ok(pool)
}
