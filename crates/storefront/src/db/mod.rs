//! Database setup for the storefront.
//!
//! # Database
//!
//! A single `SQLite` file holds local data only (the products API is the
//! source of truth for the catalog):
//!
//! - `tower_sessions` - Session records, including each visitor's cart and
//!   offer deadline
//!
//! The session table is created by `SqliteStore::migrate` at startup.

use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

/// Create a `SQLite` connection pool, creating the database file if needed.
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is invalid or the database cannot be opened.
pub async fn create_pool(database_url: &SecretString) -> Result<SqlitePool, sqlx::Error> {
    let options =
        SqliteConnectOptions::from_str(database_url.expose_secret())?.create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

/// Whether the database answers a trivial query.
pub async fn is_ready(pool: &SqlitePool) -> bool {
    sqlx::query("SELECT 1").fetch_one(pool).await.is_ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_pool_is_ready() {
        let pool = create_pool(&SecretString::from("sqlite::memory:")).await.unwrap();
        assert!(is_ready(&pool).await);
    }
}
