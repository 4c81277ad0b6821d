//! Database operations for the Bazaar `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `users` - Accounts with argon2 password hashes and a role
//! - `products` - The catalog, queried read-only by order assembly
//! - `orders` / `order_line_items` - Orders with materialized price snapshots
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and are embedded in
//! the binary via `sqlx::migrate!`; they run on startup.
//!
//! All queries are runtime-checked (`query`/`query_as`), so the workspace
//! builds without a live database.

pub mod orders;
pub mod products;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Embedded migrations, run on startup.
#[must_use]
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}
