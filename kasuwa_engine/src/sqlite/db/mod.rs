//! # SQLite Database methods
//!
//! This module contains "low-level" SQLite database interactions.
//!
//! All these interactions are maintained by simple functions (rather than stateful structs)
//! that accept a `&mut SqliteConnection` argument. Callers can obtain a connection from a
//! pool, or create an atomic transaction as the need arises and call through to the functions
//! without any other changes.
use std::env;

use log::info;
use sqlx::{sqlite::SqlitePoolOptions, Error as SqlxError, SqlitePool};

pub mod carts;
pub mod notifications;
pub mod orders;
pub mod payments;
pub mod products;
pub mod reviews;
pub mod users;
pub mod wallets;
pub mod withdrawals;

const SQLITE_DB_URL: &str = "sqlite://data/kasuwa_store.db";

pub fn db_url() -> String {
    let result = env::var("KSW_DATABASE_URL").unwrap_or_else(|_| {
        info!("KSW_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("Using database URL: {result}");
    result
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect(url).await?;
    Ok(pool)
}

/// True when the error is a unique-key violation on a constraint whose message mentions
/// `column` (SQLite reports "UNIQUE constraint failed: table.column").
pub(crate) fn is_unique_violation(e: &sqlx::Error, column: &str) -> bool {
    match e {
        sqlx::Error::Database(db) => {
            db.kind() == sqlx::error::ErrorKind::UniqueViolation && db.message().contains(column)
        },
        _ => false,
    }
}
